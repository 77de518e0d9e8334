//! Graph view handlers
//!
//! Bodies are `{nodes, links}`; the word focus body also carries
//! `hiddenThemeMates`.

use crate::application::CorpusService;
use crate::domain::corpus::CorpusRepository;
use crate::error::Error;

use super::{ApiResponse, parse_flag, parse_word_id};

/// `GET /graph/overview?bridges=true`
pub async fn overview<R: CorpusRepository>(
    service: &CorpusService<R>,
    bridges: Option<&str>,
) -> ApiResponse {
    let with_bridges = match parse_flag("bridges", bridges) {
        Ok(flag) => flag,
        Err(e) => return ApiResponse::from_error(&e),
    };
    service.overview(with_bridges).await.into()
}

/// `GET /graph/unit/{code}?relationships=true`
pub async fn unit_detail<R: CorpusRepository>(
    service: &CorpusService<R>,
    code: Option<&str>,
    relationships: Option<&str>,
) -> ApiResponse {
    let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
        return ApiResponse::from_error(&Error::InvalidInput("unit code is required".to_string()));
    };
    let with_relationships = match parse_flag("relationships", relationships) {
        Ok(flag) => flag,
        Err(e) => return ApiResponse::from_error(&e),
    };
    service.unit_detail(code, with_relationships).await.into()
}

/// `GET /graph/word/{id}`
pub async fn word_focus<R: CorpusRepository>(
    service: &CorpusService<R>,
    word_id: Option<&str>,
) -> ApiResponse {
    match parse_word_id(word_id) {
        Ok(id) => service.word_focus(id).await.into(),
        Err(e) => ApiResponse::from_error(&e),
    }
}
