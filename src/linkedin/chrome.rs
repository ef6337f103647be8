// src/linkedin/chrome.rs
//! `BrowserDriver` over a local Chrome driven through the DevTools protocol.
//!
//! `headless_chrome` is blocking, so every call runs on the blocking pool
//! with its own handle on the tab.

use async_trait::async_trait;
use headless_chrome::protocol::cdp::Network::CookieParam;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::driver::{BrowserDriver, DriverError};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(120);

pub struct ChromeBrowser {
    // Dropping the browser kills the Chrome process
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeBrowser {
    /// Launch Chrome and open the tab the session will drive
    pub async fn launch(headless: bool, chrome_path: Option<PathBuf>) -> Result<Self, DriverError> {
        let options = LaunchOptions::default_builder()
            .headless(headless)
            .sandbox(false)
            .path(chrome_path)
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .build()
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        let (browser, tab) = tokio::task::spawn_blocking(move || {
            let browser = Browser::new(options)?;
            let tab = browser.new_tab()?;
            anyhow::Ok((browser, tab))
        })
        .await?
        .map_err(|e| DriverError::Launch(format!("{:#}", e)))?;

        info!("Chrome launched (headless: {})", headless);
        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    async fn with_tab<T, F>(&self, action: F) -> Result<T, DriverError>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> anyhow::Result<T> + Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || action(&tab))
            .await?
            .map_err(|e| DriverError::Browser(format!("{:#}", e)))
    }
}

/// Turn a script body using `arguments[n]` into a single expression
fn wrap_script(script: &str, args: &[Value]) -> String {
    format!(
        "(function() {{ {} }}).apply(null, {})",
        script,
        Value::Array(args.to_vec())
    )
}

fn cookie_param(name: &str, value: &str, url: &str) -> Result<CookieParam, DriverError> {
    serde_json::from_value(json!({ "name": name, "value": value, "url": url }))
        .map_err(|e| DriverError::UnexpectedResponse(e.to_string()))
}

#[async_trait]
impl BrowserDriver for ChromeBrowser {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        debug!("Navigating to {}", url);
        let url = url.to_string();
        self.with_tab(move |tab| {
            tab.navigate_to(&url)?;
            Ok(())
        })
        .await
    }

    async fn wait_until_ready(&mut self, timeout: Duration) -> Result<(), DriverError> {
        let start = Instant::now();
        loop {
            let ready = self
                .execute_script(
                    "return document.readyState !== 'loading' && document.body !== null;",
                    Vec::new(),
                )
                .await?;

            if ready == Value::Bool(true) {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(DriverError::ReadyTimeout(timeout));
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    async fn execute_script(&mut self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        let expression = wrap_script(script, &args);
        self.with_tab(move |tab| {
            let result = tab.evaluate(&expression, false)?;
            Ok(result.value.unwrap_or(Value::Null))
        })
        .await
    }

    async fn page_source(&mut self) -> Result<String, DriverError> {
        self.with_tab(|tab| tab.get_content()).await
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        self.with_tab(|tab| Ok(tab.get_url())).await
    }

    async fn add_cookie(&mut self, name: &str, value: &str) -> Result<(), DriverError> {
        let url = self.current_url().await?;
        let cookie = cookie_param(name, value, &url)?;
        self.with_tab(move |tab| tab.set_cookies(vec![cookie])).await
    }

    async fn cookie(&mut self, name: &str) -> Result<Option<String>, DriverError> {
        let name = name.to_string();
        self.with_tab(move |tab| {
            let cookies = tab.get_cookies()?;
            Ok(cookies
                .into_iter()
                .find(|cookie| cookie.name == name)
                .map(|cookie| cookie.value))
        })
        .await
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.with_tab(|tab| tab.close(false).map(|_| ())).await?;
        info!("Chrome tab closed");
        Ok(())
    }
}
