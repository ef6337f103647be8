// src/types/mod.rs
pub mod profile;
pub mod response;

pub use profile::{Education, Experience, ExperienceDetail, License, Profile, Project};
pub use response::{ExtractionMode, ExtractionOutcome, StoredProfile};
