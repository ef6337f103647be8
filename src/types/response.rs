use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ===== Session Request/Outcome Types =====

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionMode {
    /// Scrape every section and persist the profile
    #[default]
    Full,
    /// Stop as soon as the session resolves a username
    ExistenceCheck,
    /// Stop once the profile page loads without a not-found redirect
    ExistenceCheckAndResolve,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    Success { username: String, run_id: Uuid },
    NotFound { username: String },
    AuthFailure { message: String },
    Exists { exists: bool },
}

impl ExtractionOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl fmt::Display for ExtractionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { username, run_id } => {
                write!(f, "profile '{}' persisted (run {})", username, run_id)
            }
            Self::NotFound { username } => write!(f, "no LinkedIn profile found for '{}'", username),
            Self::AuthFailure { message } => write!(f, "authentication failed: {}", message),
            Self::Exists { exists } => write!(f, "profile exists: {}", exists),
        }
    }
}

// ===== Stored Record =====

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredProfile {
    pub owner: String,
    pub data: String,
    pub run_id: String,
    pub last_modified: DateTime<Utc>,
}

impl StoredProfile {
    /// Decode the persisted JSON tree
    pub fn record(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.data)
    }
}
