use crate::browser::selector::Selector;
use crate::error::{LauncherError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

/// Polling interval for the wait helpers
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// The browser operations the login and launch steps need.
///
/// `click` and `fill` wait for their target to become visible before acting,
/// with an implementation-defined bound.
#[async_trait]
pub trait Page: Send + Sync {
    async fn goto(&self, url: &str) -> Result<()>;

    /// Current document address
    async fn url(&self) -> Result<String>;

    /// True only when the element is rendered, not merely present in the DOM
    async fn is_visible(&self, selector: &Selector) -> Result<bool>;

    async fn click(&self, selector: &Selector) -> Result<()>;

    async fn fill(&self, selector: &Selector, value: &str) -> Result<()>;

    /// Poll until one of `selectors` is visible; returns its index.
    async fn wait_for_any_visible(
        &self,
        selectors: &[&Selector],
        timeout: Duration,
    ) -> Result<usize> {
        let deadline = Instant::now() + timeout;
        loop {
            for (index, selector) in selectors.iter().enumerate() {
                if self.is_visible(selector).await? {
                    return Ok(index);
                }
            }

            if Instant::now() >= deadline {
                let what = selectors
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(" or ");
                return Err(LauncherError::WaitTimeout { what, timeout });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for_visible(&self, selector: &Selector, timeout: Duration) -> Result<()> {
        self.wait_for_any_visible(&[selector], timeout).await.map(|_| ())
    }
}
