// src/linkedin/extract/education.rs
use scraper::Html;
use tracing::debug;

use super::{list_items, queries, span_text};
use crate::types::{Education, Profile};

pub fn education(html: &str, mut profile: Profile) -> Profile {
    let document = Html::parse_document(html);
    let Some(items) = list_items(&document) else {
        profile.education = Vec::new();
        return profile;
    };

    let mut education = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        let name = match span_text(item, &queries::LINKED_TITLE) {
            Ok(name) => name,
            Err(e) => {
                debug!("Skipping education #{}: {}", position, e);
                continue;
            }
        };

        let entity = span_text(item, &queries::SUBTITLE).unwrap_or_default();
        let time = span_text(item, &queries::CAPTION).unwrap_or_default();

        let mut entry = Education::new(education.len(), name, entity);
        entry.set_time(&time);
        education.push(entry);
    }

    profile.education = education;
    profile
}
