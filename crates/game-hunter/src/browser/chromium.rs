//! Chromium-backed browser pages using chromiumoxide.

use super::{BrowserLauncher, BrowserPage};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

static PROFILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. GAME_HUNTER_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("GAME_HUNTER_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.game-hunter/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = [
            home.join(".game-hunter/chromium/chrome-linux64/chrome"),
            home.join(".game-hunter/chromium/chrome"),
        ];
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    None
}

/// Launches one Chromium process per page.
pub struct ChromiumLauncher {
    executable: PathBuf,
    headless: bool,
}

impl ChromiumLauncher {
    /// Use `explicit` if given, otherwise search the usual locations.
    pub fn new(explicit: Option<PathBuf>, headless: bool) -> Result<Self> {
        let executable = match explicit {
            Some(p) if p.exists() => p,
            Some(p) => bail!("Chromium not found at {}", p.display()),
            None => find_chromium()
                .context("Chromium not found. Set GAME_HUNTER_CHROMIUM_PATH or browser.chromium_path.")?,
        };
        Ok(Self {
            executable,
            headless,
        })
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn open(&self) -> Result<Box<dyn BrowserPage>> {
        let profile = std::env::temp_dir().join(format!(
            "game-hunter-{}-{}",
            std::process::id(),
            PROFILE_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&self.executable)
            .user_data_dir(&profile)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .window_size(1280, 900);
        builder = if self.headless {
            builder.arg("--headless=new")
        } else {
            builder.with_head()
        };
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(p) => p,
            Err(e) => {
                handler_task.abort();
                let _ = std::fs::remove_dir_all(&profile);
                bail!("failed to create new page: {e}");
            }
        };

        Ok(Box::new(ChromiumPage {
            browser: Some(browser),
            page,
            handler_task,
            profile,
        }))
    }
}

/// A page owning its Chromium process.
pub struct ChromiumPage {
    browser: Option<Browser>,
    page: Page,
    handler_task: JoinHandle<()>,
    profile: PathBuf,
}

impl ChromiumPage {
    async fn eval(&self, script: String) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .context("JS execution failed")?;
        result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert JS result: {e:?}"))
    }

    async fn eval_string(&self, script: String) -> Result<Option<String>> {
        Ok(self.eval(script).await?.as_str().map(str::to_string))
    }
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => {
                let _ = tokio::time::timeout(timeout, self.page.wait_for_navigation()).await;
                Ok(())
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {}ms", timeout.as_millis()),
        }
    }

    async fn exists(&self, css: &str) -> Result<bool> {
        let script = format!("document.querySelector('{}') !== null", js_string(css));
        Ok(self.eval(script).await?.as_bool().unwrap_or(false))
    }

    async fn fill_and_submit(&mut self, css: &str, text: &str) -> Result<()> {
        let element = self
            .page
            .find_element(css)
            .await
            .with_context(|| format!("input {css} not found"))?;
        element.click().await?.type_str(text).await?.press_key("Enter").await?;
        Ok(())
    }

    async fn click(&mut self, css: &str) -> Result<()> {
        let element = self
            .page
            .find_element(css)
            .await
            .with_context(|| format!("element {css} not found"))?;
        element.click().await?;
        Ok(())
    }

    async fn select_option(&mut self, css: &str, option: &str) -> Result<()> {
        let script = format!(
            r#"(() => {{
                const s = document.querySelector('{}');
                if (!s) return false;
                const o = [...s.options].find(o => o.text.trim() === '{opt}' || o.value === '{opt}');
                if (!o) return false;
                s.value = o.value;
                s.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            js_string(css),
            opt = js_string(option)
        );
        if self.eval(script).await?.as_bool().unwrap_or(false) {
            Ok(())
        } else {
            bail!("option {option:?} not found in {css}")
        }
    }

    async fn read_text(&self, css: &str) -> Result<Option<String>> {
        let script = format!(
            "(() => {{ const el = document.querySelector('{}'); return el ? el.innerText : null; }})()",
            js_string(css)
        );
        self.eval_string(script).await
    }

    async fn read_attribute(&self, css: &str, attr: &str) -> Result<Option<String>> {
        let script = format!(
            "(() => {{ const el = document.querySelector('{}'); return el ? el.getAttribute('{}') : null; }})()",
            js_string(css),
            js_string(attr)
        );
        self.eval_string(script).await
    }

    async fn html(&self) -> Result<String> {
        self.eval_string("document.documentElement.outerHTML".to_string())
            .await?
            .context("page has no document")
    }

    async fn current_url(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .context("failed to get URL")?
            .map(|u| u.to_string())
            .unwrap_or_default();
        Ok(url)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let mut this = self;
        if let Some(mut browser) = this.browser.take() {
            let _ = browser.close().await;
            let _ = browser.wait().await;
        }
        Ok(())
    }
}

impl Drop for ChromiumPage {
    fn drop(&mut self) {
        self.handler_task.abort();
        let _ = std::fs::remove_dir_all(&self.profile);
    }
}

/// Escape a string for embedding in a single-quoted JS literal.
fn js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\0' => {}
            '<' => result.push_str("\\x3c"),
            '>' => result.push_str("\\x3e"),
            _ => result.push(ch),
        }
    }
    result
}
