use crate::ShredConfig;
use reddit_client::{Client, Comment, Post};
use shreddit_core::CoreError;
use tokio::time::sleep;
use tracing::info;

/// Applies the edit-then-delete mutation to one eligible comment. Returns
/// whether a network mutation actually happened (false in dry-run) so the
/// caller can pace successive mutated items. A failed edit aborts without
/// attempting the delete.
pub(crate) async fn shred_comment(
    client: &Client,
    cfg: &ShredConfig,
    comment: &Comment,
) -> Result<bool, CoreError> {
    if cfg.dry_run {
        info!("would shred comment: {}", comment.permalink);
        return Ok(false);
    }
    client
        .edit_comment(&comment.id, &cfg.replacement_comment)
        .await?;
    if !cfg.edit_only {
        // Two writes back to back trip the rate limiter; space them out.
        sleep(cfg.sleep).await;
        client.delete_comment(&comment.id).await?;
    }
    info!("shredded comment: {}", comment.permalink);
    Ok(true)
}

/// Posts have no edit step; eligible posts are deleted outright.
pub(crate) async fn shred_post(
    client: &Client,
    cfg: &ShredConfig,
    post: &Post,
) -> Result<bool, CoreError> {
    if cfg.dry_run {
        info!("would shred post: {}", post.permalink);
        return Ok(false);
    }
    client.delete_post(&post.id).await?;
    info!("shredded post: {}", post.permalink);
    Ok(true)
}
