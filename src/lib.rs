// src/lib.rs
//! LinkedIn profile scraper: browser-driven page walk, per-section HTML
//! extraction into a normalized `Profile`, and one-record-per-owner storage.

pub mod cli;
pub mod core;
pub mod environment;
pub mod linkedin;
pub mod types;

use anyhow::Result;

use crate::core::{ProfileStore, ScraperSettings};
use crate::linkedin::{ChromeBrowser, ProfileSession};
use crate::types::{ExtractionMode, ExtractionOutcome};

/// Run one session in a freshly launched Chrome and store the result under
/// `owner`.
pub async fn extract_profile<S: ProfileStore + ?Sized>(
    settings: &ScraperSettings,
    store: &S,
    token: &str,
    owner: &str,
    mode: ExtractionMode,
) -> Result<ExtractionOutcome> {
    let driver = ChromeBrowser::launch(settings.headless, settings.chrome_path.clone()).await?;
    ProfileSession::new(driver, settings.clone())
        .run(store, token, owner, mode)
        .await
}
