// src/types/profile.rs
//! Normalized LinkedIn profile entities

// ===== Aggregate Root =====

/// Everything scraped for one LinkedIn member.
///
/// `Default` hands every instance its own empty lists, so profiles built in
/// parallel sessions never share containers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub phone_number: String,
    pub web_page: String,
    pub email: String,
    pub aptitudes: Vec<String>,
    pub education: Vec<Education>,
    pub experiences: Vec<Experience>,
    pub licences: Vec<License>,
    pub projects: Vec<Project>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

// ===== Education =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Education {
    pub id: usize,
    pub name: String,
    pub entity: String,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
}

impl Education {
    pub fn new(id: usize, name: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            entity: entity.into(),
            time_start: None,
            time_end: None,
        }
    }

    /// Split a raw `"start - end"` range. Anything other than exactly one
    /// hyphen leaves both bounds untouched.
    pub fn set_time(&mut self, raw: &str) {
        let parts: Vec<&str> = raw.split('-').collect();
        if let [start, end] = parts.as_slice() {
            self.time_start = Some(start.trim().to_string());
            self.time_end = Some(end.trim().to_string());
        }
    }
}

// ===== Experience =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experience {
    pub id: usize,
    pub name: String,
    pub detail: ExperienceDetail,
}

/// A position either carries its own dates and summary, or delegates them to
/// the roles held at the same employer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperienceDetail {
    Leaf { time: String, description: String },
    Parent { roles: Vec<Experience> },
}

impl Experience {
    pub fn leaf(
        id: usize,
        name: impl Into<String>,
        time: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            detail: ExperienceDetail::Leaf {
                time: time.into(),
                description: description.into(),
            },
        }
    }

    /// Build a parent entry, or `None` when there are no roles to hold.
    pub fn parent(id: usize, name: impl Into<String>, roles: Vec<Experience>) -> Option<Self> {
        if roles.is_empty() {
            return None;
        }

        Some(Self {
            id,
            name: name.into(),
            detail: ExperienceDetail::Parent { roles },
        })
    }

    pub fn roles(&self) -> &[Experience] {
        match &self.detail {
            ExperienceDetail::Parent { roles } => roles,
            ExperienceDetail::Leaf { .. } => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.detail, ExperienceDetail::Leaf { .. })
    }
}

// ===== Licenses & Projects =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    pub id: usize,
    pub name: String,
    pub emitted_by: String,
    pub expedition: String,
}

impl License {
    /// `raw_expedition` looks like `"Issued: Jan 2023"`; only the part after
    /// the last colon is kept.
    pub fn new(id: usize, name: String, emitted_by: String, raw_expedition: &str) -> Self {
        let expedition = raw_expedition
            .rsplit(':')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        Self {
            id,
            name,
            emitted_by,
            expedition,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: usize,
    pub name: String,
    pub time: String,
    pub description: String,
}
