//! Error types for Kalima

use thiserror::Error;

/// Result type alias using Kalima's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Kalima error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Entity errors (E001-E099)
    #[error("Word '{0}' not found. Run `kalima search <text>` to look up word ids.")]
    WordNotFound(i64),

    #[error("Unit '{0}' not found. Run `kalima overview` to see all units.")]
    UnitNotFound(String),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Serialization errors (E700-E799)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Input errors (E800-E899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::WordNotFound(_) => "E001",
            Self::UnitNotFound(_) => "E002",
            Self::DatabaseError(_) => "E400",
            Self::ConfigError(_) => "E600",
            Self::Serialization(_) => "E700",
            Self::InvalidInput(_) => "E800",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::WordNotFound(_) => Some("kalima search <text>".to_string()),
            Self::UnitNotFound(_) => Some("kalima overview".to_string()),
            Self::ConfigError(_) => Some("kalima config list".to_string()),
            _ => None,
        }
    }

    /// HTTP-equivalent status for this error
    pub fn http_status(&self) -> u16 {
        match self {
            Self::WordNotFound(_) | Self::UnitNotFound(_) => 404,
            Self::InvalidInput(_) => 400,
            _ => 500,
        }
    }

    /// Whether this error means the requested entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::WordNotFound(_) | Self::UnitNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_not_found_error() {
        let error = Error::WordNotFound(42);
        assert_eq!(error.code(), "E001");
        assert_eq!(error.suggestion(), Some("kalima search <text>".to_string()));
        assert_eq!(error.http_status(), 404);
        assert!(error.is_not_found());
        assert!(error.to_string().contains("42"));
    }

    #[test]
    fn test_unit_not_found_error() {
        let error = Error::UnitNotFound("Z".to_string());
        assert_eq!(error.code(), "E002");
        assert_eq!(error.http_status(), 404);
        assert!(error.to_string().contains("'Z'"));
    }

    #[test]
    fn test_invalid_input_error() {
        let error = Error::InvalidInput("word id is required".to_string());
        assert_eq!(error.code(), "E800");
        assert_eq!(error.suggestion(), None);
        assert_eq!(error.http_status(), 400);
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_other_errors_map_to_500() {
        assert_eq!(Error::Other("boom".into()).http_status(), 500);
        assert_eq!(Error::ConfigError("bad".into()).http_status(), 500);
        assert_eq!(Error::Other("boom".into()).code(), "E9999");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: Error = io_error.into();
        assert_eq!(error.code(), "E9999");
        assert!(error.to_string().contains("missing"));
    }
}
