//! Recommendation handler

use serde::Serialize;

use crate::application::CorpusService;
use crate::domain::corpus::CorpusRepository;
use crate::domain::recommend::{DEFAULT_RECOMMENDATION_LIMIT, Recommendation};

use super::{ApiResponse, parse_limit, parse_word_id};

/// Response body: `{"recommendations": [{word, score, reasons}]}`
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationsBody {
    pub recommendations: Vec<Recommendation>,
}

/// `GET /recommendations?wordId=..&limit=..`
///
/// The id and limit are validated before the corpus is queried.
pub async fn recommendations<R: CorpusRepository>(
    service: &CorpusService<R>,
    word_id: Option<&str>,
    limit: Option<&str>,
) -> ApiResponse {
    let word_id = match parse_word_id(word_id) {
        Ok(id) => id,
        Err(e) => return ApiResponse::from_error(&e),
    };
    let limit = match parse_limit(limit, DEFAULT_RECOMMENDATION_LIMIT) {
        Ok(limit) => limit,
        Err(e) => return ApiResponse::from_error(&e),
    };

    service
        .recommend(word_id, limit)
        .await
        .map(|recommendations| RecommendationsBody { recommendations })
        .into()
}
