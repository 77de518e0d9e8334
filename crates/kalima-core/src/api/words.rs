//! Word lookup handlers

use serde::Serialize;

use crate::application::CorpusService;
use crate::domain::corpus::{CorpusRepository, Word};
use crate::error::Error;

use super::{ApiResponse, parse_limit};

/// Default number of search hits
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct SearchBody {
    pub words: Vec<Word>,
}

/// `GET /words/search?q=..&limit=..`
pub async fn search<R: CorpusRepository>(
    service: &CorpusService<R>,
    query: Option<&str>,
    limit: Option<&str>,
) -> ApiResponse {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return ApiResponse::from_error(&Error::InvalidInput("search query is required".to_string()));
    };
    let limit = match parse_limit(limit, DEFAULT_SEARCH_LIMIT) {
        Ok(limit) => limit,
        Err(e) => return ApiResponse::from_error(&e),
    };

    service
        .search(query, limit)
        .await
        .map(|words| SearchBody { words })
        .into()
}

/// `GET /stats`
pub async fn stats<R: CorpusRepository>(service: &CorpusService<R>) -> ApiResponse {
    service.stats().await.into()
}
