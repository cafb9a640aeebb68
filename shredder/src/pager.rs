use shreddit_core::CoreError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Drives one item stream across cursor pages. `fetch_page` receives the
/// current cursor (empty on the first call) and returns the next one; an
/// empty next cursor ends the walk, and any error ends it immediately.
/// Page-to-page pacing lives here and only here; pacing between mutations
/// on one page is the executor's concern.
pub async fn run_pages<F, Fut>(delay: Duration, mut fetch_page: F) -> Result<(), CoreError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, CoreError>>,
{
    let mut after = String::new();
    loop {
        after = fetch_page(after).await?;
        if after.is_empty() {
            debug!("no more pages");
            return Ok(());
        }
        sleep(delay).await;
    }
}
