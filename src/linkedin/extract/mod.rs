// src/linkedin/extract/mod.rs
//! Per-section extractors turning LinkedIn markup into `Profile` fields.
//!
//! Lookups follow the page's class attributes: a query class without spaces
//! matches any element carrying that class, a query with spaces must equal the
//! whole class attribute. Every accessor returns `Result<_, FieldError>` and
//! each extractor decides whether a miss skips the item, defaults to an empty
//! string, or fails the call.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Profile;

pub mod certifications;
pub mod contact;
pub mod education;
pub mod experience;
pub mod general;
pub mod projects;

pub use certifications::certifications;
pub use contact::contact_info;
pub use education::education;
pub use experience::experience;
pub use general::{general_info, resolve_username};
pub use projects::projects;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("no <{tag}> matching class `{class}`")]
    Missing {
        tag: &'static str,
        class: &'static str,
    },

    #[error("no <{0}> element")]
    MissingTag(&'static str),

    #[error("<{tag}> has no `{attribute}` attribute")]
    MissingAttribute {
        tag: &'static str,
        attribute: &'static str,
    },

    #[error("`{0}` is not a profile link")]
    MalformedLink(String),
}

// ===== Queries =====

/// Tag plus class filter, as LinkedIn markup is only addressable by class.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Query {
    tag: &'static str,
    class: &'static str,
}

impl Query {
    pub(crate) const fn new(tag: &'static str, class: &'static str) -> Self {
        Self { tag, class }
    }

    fn matches(&self, element: &ElementRef<'_>) -> bool {
        let Some(attr) = element.value().attr("class") else {
            return false;
        };

        if self.class.contains(' ') {
            attr.split_whitespace().collect::<Vec<_>>().join(" ") == self.class
        } else {
            attr.split_whitespace().any(|class| class == self.class)
        }
    }

    fn missing(&self) -> FieldError {
        FieldError::Missing {
            tag: self.tag,
            class: self.class,
        }
    }
}

/// Queries shared by the details pages (certifications, experience,
/// education, projects).
pub(crate) mod queries {
    use super::Query;

    pub const LIST: Query = Query::new("ul", "pvs-list");
    pub const ITEM: Query = Query::new(
        "li",
        "pvs-list__paged-list-item artdeco-list__item pvs-list__item--line-separated pvs-list__item--one-column",
    );
    pub const SUB_ITEM: Query = Query::new("li", "pvs-list__paged-list-item pvs-list__item--one-column");
    pub const LINKED_TITLE: Query = Query::new(
        "div",
        "display-flex align-items-center mr1 hoverable-link-text t-bold",
    );
    pub const PLAIN_TITLE: Query = Query::new("div", "display-flex align-items-center mr1 t-bold");
    pub const SUBTITLE: Query = Query::new("span", "t-14 t-normal");
    pub const CAPTION: Query = Query::new("span", "t-14 t-normal t-black--light");
    pub const SUMMARY: Query = Query::new("div", "display-flex align-items-center t-14 t-normal t-black");
}

fn tag_selector(tag: &str) -> Option<Selector> {
    Selector::parse(tag).ok()
}

/// First descendant of `scope` matching `query`
pub(crate) fn find<'a>(scope: ElementRef<'a>, query: &Query) -> Result<ElementRef<'a>, FieldError> {
    find_all(scope, query)
        .into_iter()
        .next()
        .ok_or_else(|| query.missing())
}

/// All descendants of `scope` matching `query`, in document order
pub(crate) fn find_all<'a>(scope: ElementRef<'a>, query: &Query) -> Vec<ElementRef<'a>> {
    match tag_selector(query.tag) {
        Some(selector) => scope
            .select(&selector)
            .filter(|element| query.matches(element))
            .collect(),
        None => Vec::new(),
    }
}

/// First descendant with the given tag, whatever its classes
pub(crate) fn first_tag<'a>(
    scope: ElementRef<'a>,
    tag: &'static str,
) -> Result<ElementRef<'a>, FieldError> {
    tag_selector(tag)
        .and_then(|selector| scope.select(&selector).next())
        .ok_or(FieldError::MissingTag(tag))
}

pub(crate) fn text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text of the first `<span>` inside the element matched by `query`; the
/// visible copy of LinkedIn's duplicated labels.
pub(crate) fn span_text(scope: ElementRef<'_>, query: &Query) -> Result<String, FieldError> {
    let container = find(scope, query)?;
    first_tag(container, "span").map(text)
}

/// Items of the first section list, or `None` when the page has no list.
pub(crate) fn list_items<'a>(document: &'a Html) -> Option<Vec<ElementRef<'a>>> {
    let list = find(document.root_element(), &queries::LIST).ok()?;
    Some(find_all(list, &queries::ITEM))
}

// ===== Sections =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    General,
    Contact,
    Certifications,
    Experience,
    Education,
    Projects,
}

impl Section {
    /// Visiting order of a full session
    pub const ALL: [Section; 6] = [
        Section::General,
        Section::Contact,
        Section::Certifications,
        Section::Experience,
        Section::Education,
        Section::Projects,
    ];

    /// Page path below `/in/<username>/`
    pub fn path(&self) -> &'static str {
        match self {
            Section::General => "",
            Section::Contact => "overlay/contact-info/",
            Section::Certifications => "details/certifications/",
            Section::Experience => "details/experience/",
            Section::Education => "details/education/",
            Section::Projects => "details/projects/",
        }
    }

    /// Lazy-loaded pages that must be scrolled before reading the markup
    pub fn needs_scroll(&self) -> bool {
        !matches!(self, Section::Contact)
    }

    /// Run this section's extractor. The general section starts a fresh
    /// profile; the others update `profile`.
    pub fn apply(&self, html: &str, profile: Profile) -> Result<Profile, FieldError> {
        match self {
            Section::General => general_info(html),
            Section::Contact => Ok(contact_info(html, profile)),
            Section::Certifications => Ok(certifications(html, profile)),
            Section::Experience => Ok(experience(html, profile)),
            Section::Education => Ok(education(html, profile)),
            Section::Projects => projects(html, profile),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::General => "general info",
            Section::Contact => "contact info",
            Section::Certifications => "certifications",
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Projects => "projects",
        };
        f.write_str(name)
    }
}
