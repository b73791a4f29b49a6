use thiserror::Error;

/// PDR tracker error types
///
/// The numeric core never fails on finite input; these only surface from
/// configuration, caller commands and snapshot export.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PdrError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type for tracker operations
pub type PdrResult<T> = Result<T, PdrError>;

impl From<serde_json::Error> for PdrError {
    fn from(err: serde_json::Error) -> Self {
        PdrError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for PdrError {
    fn from(err: std::io::Error) -> Self {
        PdrError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PdrError::InvalidConfig("particle_count must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: particle_count must be > 0"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: PdrError = parse.unwrap_err().into();
        assert!(matches!(err, PdrError::Serialization(_)));
    }
}
