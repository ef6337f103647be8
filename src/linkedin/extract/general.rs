// src/linkedin/extract/general.rs
use scraper::Html;

use super::{find, first_tag, span_text, text, FieldError, Query};
use crate::types::Profile;

const NAME: Query = Query::new(
    "h1",
    "text-heading-xlarge inline t-24 v-align-middle break-words",
);
const TITLE: Query = Query::new("div", "text-body-medium break-words");
const ABOUT: Query = Query::new(
    "div",
    "pv-shared-text-with-see-more full-width t-14 t-normal t-black display-flex align-items-center",
);
const LOCATION: Query = Query::new(
    "span",
    "text-body-small inline t-black--light break-words",
);
const IDENTITY: Query = Query::new("div", "feed-identity-module__actor-meta break-words");

/// Read the profile landing page. Only the name is mandatory.
pub fn general_info(html: &str) -> Result<Profile, FieldError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let name = find(root, &NAME).map(text)?;
    let mut profile = Profile::new(name);

    profile.title = find(root, &TITLE).map(text).unwrap_or_default();
    profile.description = span_text(root, &ABOUT).unwrap_or_default();
    profile.location = find(root, &LOCATION).map(text).unwrap_or_default();

    Ok(profile)
}

/// Canonical username of the signed-in member, read from the feed's identity
/// card link (`/in/<username>/`).
pub fn resolve_username(html: &str) -> Result<String, FieldError> {
    let document = Html::parse_document(html);
    let card = find(document.root_element(), &IDENTITY)?;
    let link = first_tag(card, "a")?;
    let href = link.value().attr("href").ok_or(FieldError::MissingAttribute {
        tag: "a",
        attribute: "href",
    })?;

    username_from_href(href)
}

fn username_from_href(href: &str) -> Result<String, FieldError> {
    let (_, rest) = href
        .split_once("/in/")
        .ok_or_else(|| FieldError::MalformedLink(href.to_string()))?;

    let username = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if username.is_empty() {
        return Err(FieldError::MalformedLink(href.to_string()));
    }

    Ok(username.to_string())
}
