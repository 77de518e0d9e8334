//! Application service layer
//!
//! This layer orchestrates repository fetches and the pure domain builders,
//! and provides the entry points used by the API and the CLI.

pub mod services;

pub use services::CorpusService;
