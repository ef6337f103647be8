// src/linkedin/extract/experience.rs
//! Experience details page.
//!
//! LinkedIn folds several roles held at one employer under a single outer
//! entry with its own nested list. Such an entry becomes a parent experience;
//! any other entry is a leaf carrying its own dates and summary.

use scraper::{ElementRef, Html};
use tracing::debug;

use super::{find, find_all, list_items, queries, span_text, FieldError};
use crate::types::{Experience, Profile};

pub fn experience(html: &str, mut profile: Profile) -> Profile {
    let document = Html::parse_document(html);
    let Some(items) = list_items(&document) else {
        profile.experiences = Vec::new();
        return profile;
    };

    let mut experiences = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        let name = match entry_name(item) {
            Ok(name) => name,
            Err(e) => {
                debug!("Skipping experience #{}: {}", position, e);
                continue;
            }
        };

        let id = experiences.len();
        let roles = match roles(item) {
            Ok(roles) => roles,
            Err(e) => {
                debug!("Experience '{}' has no grouped roles: {}", name, e);
                Vec::new()
            }
        };

        let entry = match Experience::parent(id, name.clone(), roles) {
            Some(parent) => parent,
            None => leaf(id, name, item),
        };
        experiences.push(entry);
    }

    profile.experiences = experiences;
    profile
}

/// Linked company title first, plain title for employers without a page
fn entry_name(item: ElementRef<'_>) -> Result<String, FieldError> {
    span_text(item, &queries::LINKED_TITLE).or_else(|_| span_text(item, &queries::PLAIN_TITLE))
}

/// Roles of a grouped entry. A role without a name is dropped.
fn roles(item: ElementRef<'_>) -> Result<Vec<Experience>, FieldError> {
    let group = find(item, &queries::LIST)?;

    let mut roles = Vec::new();
    for sub_item in find_all(group, &queries::SUB_ITEM) {
        let Ok(name) = span_text(sub_item, &queries::LINKED_TITLE) else {
            continue;
        };
        roles.push(leaf(roles.len(), name, sub_item));
    }

    Ok(roles)
}

fn leaf(id: usize, name: String, scope: ElementRef<'_>) -> Experience {
    let time = span_text(scope, &queries::CAPTION).unwrap_or_default();
    let description = span_text(scope, &queries::SUMMARY).unwrap_or_default();
    Experience::leaf(id, name, time, description)
}
