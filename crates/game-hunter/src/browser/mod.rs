//! Headless-browser automation for JS-rendered or gated pages.
//!
//! `BrowserLauncher` starts a browser and hands back one `BrowserPage`;
//! `BrowserSession` wraps that page with tolerant primitives (missing
//! elements read as absent, never fatal) and owns its teardown. Every
//! session gets its own browser process; sessions are never shared.

pub mod chromium;

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Starts browser pages.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a browser and open a blank page in it.
    async fn open(&self) -> Result<Box<dyn BrowserPage>>;
}

/// A single page in a dedicated browser process.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate and wait for the load to settle.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;
    /// Whether an element matching `css` is present right now.
    async fn exists(&self, css: &str) -> Result<bool>;
    /// Focus the element, type `text` and press Enter.
    async fn fill_and_submit(&mut self, css: &str, text: &str) -> Result<()>;
    /// Click the first element matching `css`.
    async fn click(&mut self, css: &str) -> Result<()>;
    /// Choose the option whose visible text (or value) equals `option`.
    async fn select_option(&mut self, css: &str, option: &str) -> Result<()>;
    /// Rendered text of the first match, `None` if absent.
    async fn read_text(&self, css: &str) -> Result<Option<String>>;
    /// Attribute of the first match, `None` if the element or attribute is absent.
    async fn read_attribute(&self, css: &str, attr: &str) -> Result<Option<String>>;
    /// Current DOM serialized as HTML.
    async fn html(&self) -> Result<String>;
    /// Current URL.
    async fn current_url(&self) -> Result<String>;
    /// Tear down the page and its browser process.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Launcher used when no browser is available.
///
/// Every browser step fails, so adapters fall back to their not-found path.
pub struct NoopBrowser;

#[async_trait]
impl BrowserLauncher for NoopBrowser {
    async fn open(&self) -> Result<Box<dyn BrowserPage>> {
        bail!("browser not available (HTTP-only mode)")
    }
}

/// A scoped browser page.
///
/// Callers run their steps and then call [`BrowserSession::release`]. A
/// session dropped without release still tears its browser down through the
/// page's own `Drop`.
pub struct BrowserSession {
    page: Option<Box<dyn BrowserPage>>,
    nav_timeout: Duration,
}

impl BrowserSession {
    /// Acquire a page from the launcher.
    pub async fn open(launcher: &dyn BrowserLauncher, nav_timeout: Duration) -> Result<Self> {
        let page = launcher.open().await?;
        Ok(Self {
            page: Some(page),
            nav_timeout,
        })
    }

    fn page(&self) -> Result<&dyn BrowserPage> {
        match self.page.as_deref() {
            Some(p) => Ok(p),
            None => bail!("browser session already released"),
        }
    }

    fn page_mut(&mut self) -> Result<&mut Box<dyn BrowserPage>> {
        match self.page.as_mut() {
            Some(p) => Ok(p),
            None => bail!("browser session already released"),
        }
    }

    pub async fn navigate(&mut self, url: &str) -> Result<()> {
        let timeout = self.nav_timeout;
        self.page_mut()?.navigate(url, timeout).await
    }

    /// Presence check; any browser error counts as absent.
    pub async fn exists(&self, css: &str) -> bool {
        match self.page() {
            Ok(p) => p.exists(css).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Poll until `css` appears or `timeout` elapses.
    pub async fn wait_for(&self, css: &str, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.exists(css).await {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                debug!("timed out waiting for {css}");
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn fill_and_submit(&mut self, css: &str, text: &str) -> Result<()> {
        self.page_mut()?.fill_and_submit(css, text).await
    }

    pub async fn click(&mut self, css: &str) -> Result<()> {
        self.page_mut()?.click(css).await
    }

    pub async fn select_option(&mut self, css: &str, option: &str) -> Result<()> {
        self.page_mut()?.select_option(css, option).await
    }

    pub async fn read_text(&self, css: &str) -> Option<String> {
        self.page().ok()?.read_text(css).await.ok().flatten()
    }

    pub async fn read_attribute(&self, css: &str, attr: &str) -> Option<String> {
        self.page().ok()?.read_attribute(css, attr).await.ok().flatten()
    }

    pub async fn html(&self) -> Result<String> {
        self.page()?.html().await
    }

    pub async fn current_url(&self) -> Result<String> {
        self.page()?.current_url().await
    }

    /// Close the page and its browser process.
    pub async fn release(mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("closing browser page failed: {e}");
            }
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if self.page.is_some() {
            debug!("browser session dropped without release");
        }
    }
}
