// src/core/config_manager.rs
//! Configuration: environment file plus scraper tuning from env vars

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::core::FsOps;
use crate::environment::EnvironmentConfig;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: EnvironmentConfig,
    pub scraper: ScraperSettings,
}

/// Timing and page knobs for a scraping session
#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub linkedin_url: String,
    pub session_cookie: String,
    pub ready_timeout: Duration,
    pub scroll_timeout: Duration,
    pub scroll_step: i64,
    pub scroll_pause: Duration,
    pub language: String,
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            linkedin_url: "https://www.linkedin.com".to_string(),
            session_cookie: "li_at".to_string(),
            ready_timeout: Duration::from_secs(10),
            scroll_timeout: Duration::from_secs(20),
            scroll_step: 1000,
            scroll_pause: Duration::from_millis(100),
            language: "en_US".to_string(),
            headless: true,
            chrome_path: None,
        }
    }
}

impl ConfigManager {
    /// Load all configurations
    pub fn load(config_path: &Path) -> Result<Self> {
        let environment = EnvironmentConfig::load(config_path)?;
        let scraper = Self::load_scraper(&environment)?;

        Ok(Self {
            environment,
            scraper,
        })
    }

    fn load_scraper(environment: &EnvironmentConfig) -> Result<ScraperSettings> {
        let defaults = ScraperSettings::default();

        let settings = ScraperSettings {
            linkedin_url: environment.linkedin_url.clone(),
            session_cookie: defaults.session_cookie,
            ready_timeout: Duration::from_secs(env_or("SCRAPER_READY_TIMEOUT_SECS", 10)?),
            scroll_timeout: Duration::from_secs(env_or("SCRAPER_SCROLL_TIMEOUT_SECS", 20)?),
            scroll_step: env_or("SCRAPER_SCROLL_STEP", defaults.scroll_step)?,
            scroll_pause: Duration::from_millis(env_or("SCRAPER_SCROLL_PAUSE_MS", 100)?),
            language: std::env::var("SCRAPER_LANGUAGE").unwrap_or(defaults.language),
            headless: env_or("SCRAPER_HEADLESS", defaults.headless)?,
            chrome_path: environment.chrome_path.clone(),
        };

        info!(
            "Scraper settings: ready timeout {:?}, scroll {:?} in steps of {}px",
            settings.ready_timeout, settings.scroll_timeout, settings.scroll_step
        );
        Ok(settings)
    }

    /// Ensure the database and log directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        for path in [&self.environment.database_path, &self.environment.log_path] {
            if let Some(parent) = path.parent() {
                FsOps::ensure_dir_exists(parent).await?;
            }
        }
        Ok(())
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        Err(_) => Ok(default),
    }
}
