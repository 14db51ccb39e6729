//! Chrome driven over the DevTools Protocol.

pub mod cdp;
pub mod launcher;
pub mod page;
pub mod selector;

pub use cdp::CDPClient;
pub use launcher::{discover_chrome, ChromeProcess};
pub use page::Page;
pub use selector::Selector;

use crate::config::schema::BrowserSettings;
use crate::error::{LauncherError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;

/// One Chrome process and the page the flow drives
pub struct BrowserSession {
    page: CdpPage,
    process: ChromeProcess,
}

impl BrowserSession {
    pub async fn launch(
        chrome_path: &Path,
        settings: &BrowserSettings,
        action_timeout: Duration,
    ) -> Result<Self> {
        let process = ChromeProcess::spawn(chrome_path, settings).await?;
        let ws_url = process.page_target().await?;
        let client = CDPClient::connect(&ws_url)
            .await
            .map_err(LauncherError::Browser)?;
        tracing::info!("CDP client connected on port {}", process.cdp_port());

        Ok(Self {
            page: CdpPage::new(client, action_timeout),
            process,
        })
    }

    pub fn page(&self) -> &CdpPage {
        &self.page
    }

    pub async fn close(mut self) {
        self.page.client.close().await;
        self.process.kill();
        tracing::info!("Browser session closed");
    }
}

/// [`Page`] backed by a CDP connection
pub struct CdpPage {
    client: CDPClient,
    action_timeout: Duration,
}

impl CdpPage {
    pub fn new(client: CDPClient, action_timeout: Duration) -> Self {
        Self {
            client,
            action_timeout,
        }
    }

    /// Run `body` against the element matched by `selector`. `body` sees the
    /// element as `el` and its value is returned; `false` if nothing matched.
    async fn with_element(&self, selector: &Selector, body: &str) -> Result<serde_json::Value> {
        let js = format!(
            "(function() {{ const el = {}; if (!el || el.nodeType !== 1) return false; {} }})()",
            selector.to_js(),
            body
        );
        self.client
            .evaluate(&js)
            .await
            .map_err(LauncherError::Browser)
    }

    async fn wait_until_loaded(&self) -> Result<()> {
        let deadline = Instant::now() + self.action_timeout;
        loop {
            match self.client.evaluate("document.readyState").await {
                Ok(state) if state.as_str() == Some("complete") => return Ok(()),
                Ok(_) => {}
                Err(e) if cdp::is_context_lost(&e) => {}
                Err(e) => return Err(LauncherError::Browser(e)),
            }

            if Instant::now() >= deadline {
                return Err(LauncherError::WaitTimeout {
                    what: "page load".to_string(),
                    timeout: self.action_timeout,
                });
            }
            tokio::time::sleep(page::POLL_INTERVAL).await;
        }
    }
}

const VISIBLE_JS: &str = "const rect = el.getBoundingClientRect(); \
    const style = window.getComputedStyle(el); \
    return rect.width > 0 && rect.height > 0 && style.visibility !== 'hidden' && style.display !== 'none';";

const CLICK_JS: &str = "el.scrollIntoView({block: 'center'}); el.click(); return true;";

#[async_trait]
impl Page for CdpPage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.client
            .navigate(url)
            .await
            .map_err(LauncherError::Browser)?;
        self.wait_until_loaded().await?;
        tracing::debug!("Navigated to: {}", url);
        Ok(())
    }

    async fn url(&self) -> Result<String> {
        let value = self
            .client
            .evaluate("window.location.href")
            .await
            .map_err(LauncherError::Browser)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| LauncherError::Browser("window.location.href is not a string".to_string()))
    }

    async fn is_visible(&self, selector: &Selector) -> Result<bool> {
        match self.with_element(selector, VISIBLE_JS).await {
            Ok(value) => Ok(value.as_bool().unwrap_or(false)),
            Err(LauncherError::Browser(e)) if cdp::is_context_lost(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn click(&self, selector: &Selector) -> Result<()> {
        self.wait_for_visible(selector, self.action_timeout).await?;

        let clicked = self.with_element(selector, CLICK_JS).await?;
        if clicked.as_bool() != Some(true) {
            return Err(LauncherError::Browser(format!("Element not found: {}", selector)));
        }
        tracing::debug!("Clicked element: {}", selector);
        Ok(())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> Result<()> {
        self.wait_for_visible(selector, self.action_timeout).await?;

        // Native value setter, then input/change events
        let body = format!(
            "el.focus(); \
             const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
             const setter = Object.getOwnPropertyDescriptor(proto, 'value').set; \
             setter.call(el, {}); \
             el.dispatchEvent(new Event('input', {{bubbles: true}})); \
             el.dispatchEvent(new Event('change', {{bubbles: true}})); \
             return true;",
            selector::js_str(value)
        );

        let filled = self.with_element(selector, &body).await?;
        if filled.as_bool() != Some(true) {
            return Err(LauncherError::Browser(format!("Element not found: {}", selector)));
        }
        tracing::debug!("Filled element: {}", selector);
        Ok(())
    }
}
