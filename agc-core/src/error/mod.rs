//! Core error types for agc

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for agc operations
#[derive(Error, Debug)]
pub enum AgcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{} does not exist.", .0.display())]
    InputNotFound(PathBuf),

    #[error("{} is a directory.", .0.display())]
    InputIsDirectory(PathBuf),

    #[error("Malformed sequence file: {0}")]
    MalformedSequenceFile(String),

    #[error("Cannot align an empty sequence")]
    EmptyAlignmentInput,

    #[error("Degenerate alignment: {0}")]
    DegenerateAlignment(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for agc operations
pub type AgcResult<T> = Result<T, AgcError>;

impl AgcError {
    /// True for errors that signal a broken internal invariant rather than bad user input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AgcError::EmptyAlignmentInput | AgcError::DegenerateAlignment(_)
        )
    }
}

impl From<serde_json::Error> for AgcError {
    fn from(err: serde_json::Error) -> Self {
        AgcError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let io_error = AgcError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(format!("{}", io_error).contains("IO error"));

        let missing = AgcError::InputNotFound(PathBuf::from("reads.fasta.gz"));
        assert_eq!(format!("{}", missing), "reads.fasta.gz does not exist.");

        let dir = AgcError::InputIsDirectory(PathBuf::from("data"));
        assert_eq!(format!("{}", dir), "data is a directory.");

        let malformed = AgcError::MalformedSequenceFile("no header".to_string());
        assert_eq!(format!("{}", malformed), "Malformed sequence file: no header");

        assert_eq!(
            format!("{}", AgcError::EmptyAlignmentInput),
            "Cannot align an empty sequence"
        );

        let degenerate = AgcError::DegenerateAlignment("zero-length alignment".to_string());
        assert_eq!(
            format!("{}", degenerate),
            "Degenerate alignment: zero-length alignment"
        );

        let config_error = AgcError::Configuration("missing field".to_string());
        assert_eq!(format!("{}", config_error), "Configuration error: missing field");

        let input_error = AgcError::InvalidInput("negative value".to_string());
        assert_eq!(format!("{}", input_error), "Invalid input: negative value");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let agc_err: AgcError = io_err.into();

        match agc_err {
            AgcError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let parse_result: Result<serde_json::Value, serde_json::Error> =
            serde_json::from_str("{invalid json}");

        let agc_err: AgcError = parse_result.unwrap_err().into();
        match agc_err {
            AgcError::Serialization(msg) => assert!(msg.contains("key must be a string")),
            _ => panic!("Expected Serialization error variant"),
        }
    }

    #[test]
    fn test_internal_errors() {
        assert!(AgcError::EmptyAlignmentInput.is_internal());
        assert!(AgcError::DegenerateAlignment("x".to_string()).is_internal());
        assert!(!AgcError::MalformedSequenceFile("x".to_string()).is_internal());
        assert!(!AgcError::InputNotFound(PathBuf::from("x")).is_internal());
    }

    #[test]
    fn test_error_result_type() {
        fn returns_err() -> AgcResult<String> {
            Err(AgcError::InvalidInput("threshold".to_string()))
        }

        match returns_err().unwrap_err() {
            AgcError::InvalidInput(msg) => assert_eq!(msg, "threshold"),
            _ => panic!("Expected InvalidInput error"),
        }
    }
}
