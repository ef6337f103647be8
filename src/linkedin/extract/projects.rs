// src/linkedin/extract/projects.rs
use scraper::Html;

use super::{list_items, queries, span_text, FieldError};
use crate::types::{Profile, Project};

/// Parse the projects details page.
///
/// Unlike the other list sections there is no per-item fallback: an item
/// without a name or a date range fails the whole page.
pub fn projects(html: &str, mut profile: Profile) -> Result<Profile, FieldError> {
    let document = Html::parse_document(html);
    let Some(items) = list_items(&document) else {
        profile.projects = Vec::new();
        return Ok(profile);
    };

    let mut projects = Vec::with_capacity(items.len());
    for (id, item) in items.into_iter().enumerate() {
        let name = span_text(item, &queries::PLAIN_TITLE)?;
        let time = span_text(item, &queries::SUBTITLE)?;
        let description = span_text(item, &queries::SUMMARY).unwrap_or_default();

        projects.push(Project {
            id,
            name,
            time,
            description,
        });
    }

    profile.projects = projects;
    Ok(profile)
}
