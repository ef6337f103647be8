// src/linkedin/extract/contact.rs
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::OnceLock;

use super::{find, find_all, first_tag, span_text, text, FieldError, Query};
use crate::types::Profile;

const PHONE: Query = Query::new("li", "pv-contact-info__ci-container t-14");
const ENTRY: Query = Query::new("div", "pv-contact-info__ci-container t-14");
const WEBSITE: Query = Query::new("li", "pv-contact-info__ci-container link t-14");

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,7}$")
            .expect("email pattern is valid")
    })
}

/// Fill phone, email and website from the contact overlay. Each field falls
/// back to an empty string on its own.
pub fn contact_info(html: &str, mut profile: Profile) -> Profile {
    let document = Html::parse_document(html);
    let root = document.root_element();

    profile.phone_number = span_text(root, &PHONE).unwrap_or_default();
    profile.email = email(root).unwrap_or_default();
    profile.web_page = anchor_text(root, &WEBSITE).unwrap_or_default();

    profile
}

/// First contact entry whose link text is an email address
fn email(root: ElementRef<'_>) -> Result<String, FieldError> {
    find_all(root, &ENTRY)
        .into_iter()
        .filter_map(|entry| first_tag(entry, "a").ok().map(text))
        .find(|candidate| email_pattern().is_match(candidate))
        .ok_or(FieldError::Missing {
            tag: "a",
            class: "email",
        })
}

fn anchor_text(root: ElementRef<'_>, query: &Query) -> Result<String, FieldError> {
    let container = find(root, query)?;
    first_tag(container, "a").map(text)
}
