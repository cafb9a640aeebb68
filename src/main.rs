use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use reddit_client::{Client, ClientConfig, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use shreddit_core::ErrorExt;
use shredder::{ShredConfig, Shredder, DEFAULT_REPLACEMENT_COMMENT};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Overwrite and delete your Reddit account history.
#[derive(Debug, Parser)]
#[command(name = "shreddit", version, about)]
struct Cli {
    /// Reddit username.
    #[arg(short, long, env = "SHREDDIT_USERNAME")]
    username: String,

    /// Reddit account password.
    #[arg(short, long, env = "SHREDDIT_PASSWORD")]
    password: String,

    /// OAuth client ID of your Reddit "script" app.
    #[arg(long, env = "SHREDDIT_CLIENT_ID")]
    client_id: String,

    /// OAuth client secret of your Reddit "script" app.
    #[arg(long, env = "SHREDDIT_CLIENT_SECRET")]
    client_secret: String,

    /// Log what would be shredded without mutating anything.
    #[arg(long, env = "SHREDDIT_DRY_RUN")]
    dry_run: bool,

    /// Restrict the run to these item kinds. Defaults to all of them.
    #[arg(
        short,
        long = "thing-type",
        env = "SHREDDIT_THING_TYPES",
        value_delimiter = ','
    )]
    thing_types: Vec<ThingType>,

    /// Preserve items created after this instant (RFC 3339).
    #[arg(long, env = "SHREDDIT_BEFORE")]
    before: Option<DateTime<Utc>>,

    /// Preserve items newer than this many days. Ignored when --before is set.
    #[arg(long, env = "SHREDDIT_MAX_DAYS")]
    max_days: Option<i64>,

    /// Preserve items scoring above this.
    #[arg(long, env = "SHREDDIT_MAX_SCORE")]
    max_score: Option<i64>,

    /// Body written over each comment before deleting it.
    #[arg(
        short,
        long,
        env = "SHREDDIT_REPLACEMENT_COMMENT",
        default_value = DEFAULT_REPLACEMENT_COMMENT
    )]
    replacement_comment: String,

    /// Edit comments but leave them in place.
    #[arg(long, env = "SHREDDIT_EDIT_ONLY")]
    edit_only: bool,

    /// Seconds to pause between requests.
    #[arg(long, env = "SHREDDIT_SLEEP_SECS", default_value_t = 2)]
    sleep_secs: u64,

    /// User-Agent header sent to Reddit.
    #[arg(long, env = "SHREDDIT_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Base URL of the Reddit API.
    #[arg(long, env = "SHREDDIT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThingType {
    Comments,
    Posts,
    SavedComments,
    SavedPosts,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let wanted = |t: ThingType| cli.thing_types.is_empty() || cli.thing_types.contains(&t);

    let mut cfg = ShredConfig::new(cli.username.clone());
    cfg.dry_run = cli.dry_run;
    cfg.skip_comments = !wanted(ThingType::Comments);
    cfg.skip_posts = !wanted(ThingType::Posts);
    cfg.skip_saved_comments = !wanted(ThingType::SavedComments);
    cfg.skip_saved_posts = !wanted(ThingType::SavedPosts);
    cfg.edit_only = cli.edit_only;
    cfg.before = cli.before;
    cfg.max_days = cli.max_days;
    cfg.max_score = cli.max_score;
    cfg.replacement_comment = cli.replacement_comment;
    cfg.sleep = Duration::from_secs(cli.sleep_secs);

    let mut client_config = ClientConfig::new(
        cli.client_id,
        cli.client_secret,
        cli.username,
        cli.password,
    );
    client_config.base_url = cli.base_url;
    client_config.user_agent = cli.user_agent;

    let client = Client::new(client_config)
        .await
        .context("error creating Reddit client")?;

    if let Err(e) = Shredder::new(client, cfg).run().await {
        if e.is_rate_limited() {
            tracing::warn!("Reddit rate limit hit; rerun later or raise --sleep-secs");
        }
        return Err(e).context("error shredding");
    }
    Ok(())
}
