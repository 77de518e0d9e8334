//! Request-shaped API adapters
//!
//! Each handler takes raw query parameters as they arrive from an HTTP layer
//! (`Option<&str>`), validates them before touching the corpus, and returns an
//! [`ApiResponse`] with a status code and a JSON body. Errors are rendered as
//! `{"error": message, "code": "E..."}`.

pub mod graph;
pub mod recommendations;
pub mod words;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::domain::corpus::WordId;
use crate::error::{Error, Result};

/// Status code plus JSON body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// 200 with the serialized payload
    pub fn ok(payload: impl Serialize) -> Self {
        match serde_json::to_value(payload) {
            Ok(body) => Self { status: 200, body },
            Err(e) => Self::from_error(&Error::Serialization(e)),
        }
    }

    /// Error response with the status mapped from the error kind
    pub fn from_error(error: &Error) -> Self {
        let status = error.http_status();
        if status >= 500 {
            warn!(code = error.code(), error = %error, "API request failed");
        }
        Self {
            status,
            body: json!({
                "error": error.to_string(),
                "code": error.code(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl<T: Serialize> From<Result<T>> for ApiResponse {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(payload) => Self::ok(payload),
            Err(e) => Self::from_error(&e),
        }
    }
}

/// Parse a required word id
pub fn parse_word_id(raw: Option<&str>) -> Result<WordId> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidInput("word id is required".to_string()))?;

    raw.parse()
        .map_err(|_| Error::InvalidInput(format!("word id must be an integer, got '{}'", raw)))
}

/// Parse an optional limit; negative values mean "nothing"
pub fn parse_limit(raw: Option<&str>, default: usize) -> Result<usize> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(raw) => {
            let limit: i64 = raw
                .parse()
                .map_err(|_| Error::InvalidInput(format!("limit must be an integer, got '{}'", raw)))?;
            Ok(usize::try_from(limit).unwrap_or(0))
        }
    }
}

/// Parse an optional boolean flag; absent means false
pub fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some(other) => Err(Error::InvalidInput(format!(
            "{} must be true or false, got '{}'",
            name, other
        ))),
    }
}
