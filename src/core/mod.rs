// src/core/mod.rs
//! Configuration, persistence and file system services

pub mod config_manager;
pub mod database;
pub mod fs_ops;

pub use config_manager::{ConfigManager, ScraperSettings};
pub use database::{Database, ProfileRepository, ProfileStore};
pub use fs_ops::FsOps;
