// src/linkedin/driver.rs
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("browser call failed: {0}")]
    Browser(String),

    #[error("browser task panicked or was cancelled: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("browser error `{error}`: {message}")]
    Command { error: String, message: String },

    #[error("page not ready after {0:?}")]
    ReadyTimeout(Duration),

    #[error("unexpected browser response: {0}")]
    UnexpectedResponse(String),
}

/// Browser session used by a scraping run.
///
/// Methods take `&mut self`: a session holds login state and a navigation
/// position, so one run owns it exclusively.
#[async_trait]
pub trait BrowserDriver: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), DriverError>;

    /// Block until the current document reports basic readiness
    async fn wait_until_ready(&mut self, timeout: Duration) -> Result<(), DriverError>;

    async fn execute_script(&mut self, script: &str, args: Vec<Value>) -> Result<Value, DriverError>;

    async fn page_source(&mut self) -> Result<String, DriverError>;

    async fn current_url(&mut self) -> Result<String, DriverError>;

    async fn add_cookie(&mut self, name: &str, value: &str) -> Result<(), DriverError>;

    async fn cookie(&mut self, name: &str) -> Result<Option<String>, DriverError>;

    async fn scroll_to(&mut self, x: i64, y: i64) -> Result<(), DriverError> {
        self.execute_script(
            "window.scrollTo(arguments[0], arguments[1]);",
            vec![Value::from(x), Value::from(y)],
        )
        .await
        .map(|_| ())
    }

    /// Pick `value` in the `<select>` with the given element id
    async fn select_option(&mut self, element_id: &str, value: &str) -> Result<(), DriverError> {
        let found = self
            .execute_script(
                "const select = document.getElementById(arguments[0]);
                 if (!select) { return false; }
                 select.value = arguments[1];
                 select.dispatchEvent(new Event('change', { bubbles: true }));
                 return true;",
                vec![Value::from(element_id), Value::from(value)],
            )
            .await?;

        match found {
            Value::Bool(true) => Ok(()),
            _ => Err(DriverError::Command {
                error: "no such element".to_string(),
                message: format!("no <select> with id '{}'", element_id),
            }),
        }
    }

    async fn close(&mut self) -> Result<(), DriverError>;
}
