//! Application services

pub mod corpus_service;

pub use corpus_service::CorpusService;
