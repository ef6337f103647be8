// src/linkedin/extract/certifications.rs
use scraper::Html;
use tracing::debug;

use super::{list_items, queries, span_text};
use crate::types::{License, Profile};

/// Parse the licenses & certifications details page. Items without a name
/// are skipped and ids follow the kept items.
pub fn certifications(html: &str, mut profile: Profile) -> Profile {
    let document = Html::parse_document(html);
    let Some(items) = list_items(&document) else {
        profile.licences = Vec::new();
        return profile;
    };

    let mut licences = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        let name = match span_text(item, &queries::LINKED_TITLE) {
            Ok(name) => name,
            Err(e) => {
                debug!("Skipping certification #{}: {}", position, e);
                continue;
            }
        };

        let emitted_by = span_text(item, &queries::SUBTITLE).unwrap_or_default();
        let expedition = span_text(item, &queries::CAPTION).unwrap_or_default();

        licences.push(License::new(licences.len(), name, emitted_by, &expedition));
    }

    profile.licences = licences;
    profile
}
