mod executor;
pub mod filter;
pub mod pager;

use chrono::{DateTime, Utc};
use reddit_client::Client;
use shreddit_core::CoreError;
use std::time::Duration;
use tracing::{error, info};

use crate::executor::{shred_comment, shred_post};
use crate::filter::{eligibility, ShredItem, SkipReason};
use crate::pager::run_pages;

/// Replacement body applied to comments before deletion when none is
/// configured.
pub const DEFAULT_REPLACEMENT_COMMENT: &str = "[deleted]";

/// Default pause between requests, tuned to stay under Reddit's limiter.
pub const DEFAULT_SLEEP: Duration = Duration::from_secs(2);

/// Retention rules for one shredding run. Built once from external input
/// and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ShredConfig {
    pub username: String,
    pub dry_run: bool,
    pub skip_comments: bool,
    pub skip_posts: bool,
    pub skip_saved_comments: bool,
    pub skip_saved_posts: bool,
    /// Edit comments but leave them in place.
    pub edit_only: bool,
    /// Explicit cutoff; items created after this instant are preserved.
    pub before: Option<DateTime<Utc>>,
    /// Fallback cutoff of `now - max_days` when `before` is unset.
    pub max_days: Option<i64>,
    /// Items scoring above this are preserved.
    pub max_score: Option<i64>,
    pub replacement_comment: String,
    /// Pause between pages, between edit and delete of one comment, and
    /// between successive mutated items.
    pub sleep: Duration,
}

impl ShredConfig {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            dry_run: false,
            skip_comments: false,
            skip_posts: false,
            skip_saved_comments: false,
            skip_saved_posts: false,
            edit_only: false,
            before: None,
            max_days: None,
            max_score: None,
            replacement_comment: DEFAULT_REPLACEMENT_COMMENT.to_string(),
            sleep: DEFAULT_SLEEP,
        }
    }

    /// The effective age cutoff: the explicit `before`, else `now -
    /// max_days`, else now.
    fn cutoff(&self) -> DateTime<Utc> {
        if let Some(before) = self.before {
            return before;
        }
        let now = Utc::now();
        match self.max_days {
            Some(days) => now - chrono::Duration::days(days),
            None => now,
        }
    }
}

/// Walks the configured item streams and applies the retention rules to
/// every item, oldest pages first as Reddit returns them. Strictly
/// sequential; no two requests are ever in flight at once.
pub struct Shredder {
    client: Client,
    cfg: ShredConfig,
    before: DateTime<Utc>,
}

impl Shredder {
    pub fn new(client: Client, mut cfg: ShredConfig) -> Self {
        if cfg.replacement_comment.is_empty() {
            cfg.replacement_comment = DEFAULT_REPLACEMENT_COMMENT.to_string();
        }
        let before = cfg.cutoff();
        Self {
            client,
            cfg,
            before,
        }
    }

    /// Runs the four streams in a fixed order: comments, posts, saved
    /// comments, saved posts. A failure in any stream aborts the whole run;
    /// mutations already applied stay applied, and an interrupted walk
    /// restarts from the first page on the next run.
    pub async fn run(&self) -> Result<(), CoreError> {
        info!(
            "shredding content for u/{} created before {}",
            self.cfg.username, self.before
        );
        if !self.cfg.skip_comments {
            info!("shredding comments");
            if let Err(e) = run_pages(self.cfg.sleep, |after| self.shred_comments_page(after)).await
            {
                error!("failed while shredding comments: {}", e);
                return Err(e);
            }
        }
        if !self.cfg.skip_posts {
            info!("shredding posts");
            if let Err(e) = run_pages(self.cfg.sleep, |after| self.shred_posts_page(after)).await {
                error!("failed while shredding posts: {}", e);
                return Err(e);
            }
        }
        if !self.cfg.skip_saved_comments {
            info!("scanning saved comments");
            if let Err(e) =
                run_pages(self.cfg.sleep, |after| self.saved_comments_page(after)).await
            {
                error!("failed while scanning saved comments: {}", e);
                return Err(e);
            }
        }
        if !self.cfg.skip_saved_posts {
            info!("scanning saved posts");
            if let Err(e) = run_pages(self.cfg.sleep, |after| self.saved_posts_page(after)).await {
                error!("failed while scanning saved posts: {}", e);
                return Err(e);
            }
        }
        info!("done shredding for u/{}", self.cfg.username);
        Ok(())
    }

    async fn shred_comments_page(&self, after: String) -> Result<String, CoreError> {
        let listing = self.client.get_comments(&self.cfg.username, &after).await?;
        let next = listing.after();
        let mut mutated = false;
        for comment in listing.into_items() {
            if self.skip_item(&comment, "comment") {
                continue;
            }
            if mutated {
                tokio::time::sleep(self.cfg.sleep).await;
            }
            mutated = shred_comment(&self.client, &self.cfg, &comment).await?;
        }
        Ok(next)
    }

    async fn shred_posts_page(&self, after: String) -> Result<String, CoreError> {
        let listing = self.client.get_posts(&self.cfg.username, &after).await?;
        let next = listing.after();
        let mut mutated = false;
        for post in listing.into_items() {
            if self.skip_item(&post, "post") {
                continue;
            }
            if mutated {
                tokio::time::sleep(self.cfg.sleep).await;
            }
            mutated = shred_post(&self.client, &self.cfg, &post).await?;
        }
        Ok(next)
    }

    // Saved-stream shredding is an extension point for now: pages are
    // walked and eligible items reported, but nothing is unsaved.
    // TODO: wire Client::unsave_comment here once saved-stream semantics
    // are settled.
    async fn saved_comments_page(&self, after: String) -> Result<String, CoreError> {
        let listing = self
            .client
            .get_saved_comments(&self.cfg.username, &after)
            .await?;
        let next = listing.after();
        for comment in listing.into_items() {
            if self.skip_item(&comment, "saved comment") {
                continue;
            }
            info!("would unsave comment: {}", comment.permalink);
        }
        Ok(next)
    }

    async fn saved_posts_page(&self, after: String) -> Result<String, CoreError> {
        let listing = self
            .client
            .get_saved_posts(&self.cfg.username, &after)
            .await?;
        let next = listing.after();
        for post in listing.into_items() {
            if self.skip_item(&post, "saved post") {
                continue;
            }
            info!("would unsave post: {}", post.permalink);
        }
        Ok(next)
    }

    /// Logs the skip reason and returns true when the item must be
    /// preserved.
    fn skip_item(&self, item: &impl ShredItem, kind: &str) -> bool {
        match eligibility(item, self.before, self.cfg.max_score) {
            Some(SkipReason::CreatedAfterCutoff) => {
                info!(
                    "skipping {} created after cutoff ({}): {}",
                    kind,
                    item.created_utc(),
                    item.permalink()
                );
                true
            }
            Some(SkipReason::ScoreAboveMax) => {
                info!(
                    "skipping {} with score {} above max: {}",
                    kind,
                    item.score(),
                    item.permalink()
                );
                true
            }
            None => false,
        }
    }
}
