//! Kalima Core Library
//!
//! This crate provides the core functionality for Kalima, including:
//! - Corpus model (words, units, sub-themes, typed relationships)
//! - Graph views (overview, unit detail, word focus)
//! - Multi-signal "learn next" recommendations
//! - Enrichment helpers (difficulty scoring, relationship seeding)
//! - Storage (SQLite) and JSON snapshots
//! - Request-shaped API adapters

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod storage;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::application::CorpusService;
    pub use crate::config::Config;
    pub use crate::domain::corpus::{CorpusRepository, CorpusSnapshot, Word, WordId};
    pub use crate::error::{Error, Result};
    pub use crate::infrastructure::corpus::{InMemoryCorpusRepository, SqliteCorpusRepository};
}
