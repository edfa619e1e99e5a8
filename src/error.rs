//! Error types for document enrichment.

use std::path::PathBuf;
use thiserror::Error;

/// Broad classification used to map errors onto transport semantics.
///
/// `Input` and `NotFound` are caller mistakes (4xx-equivalent); `Upstream`
/// means the document source is unreachable (5xx-equivalent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    NotFound,
    Upstream,
}

/// Errors produced by the enrichment pipeline.
#[derive(Debug, Error)]
pub enum EnrichError {
    // Input errors (exit code 2)
    #[error("invalid schema role \"{value}\": expected \"response\" or \"request\"")]
    InvalidRole { value: String },

    #[error("missing required parameter: {name}")]
    MissingParameter { name: &'static str },

    // Not-found errors (exit code 4)
    #[error("no operation \"{operation}\" registered for path {path}")]
    PathOperationNotFound { path: String, operation: String },

    #[error("no schema could be located for {operation} {path}")]
    SchemaNotFound { path: String, operation: String },

    // Upstream / IO errors (exit code 3)
    #[error("document fetch failed for group {group:?}: {message}")]
    DocumentFetch {
        group: Option<String>,
        message: String,
    },

    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid document: {message}")]
    InvalidDocument { message: String },
}

impl EnrichError {
    /// Classify this error for transport mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRole { .. }
            | Self::MissingParameter { .. }
            | Self::InvalidJson { .. }
            | Self::InvalidDocument { .. } => ErrorKind::Input,
            Self::PathOperationNotFound { .. } | Self::SchemaNotFound { .. } => ErrorKind::NotFound,
            Self::DocumentFetch { .. } | Self::FileNotFound { .. } | Self::ReadError { .. } => {
                ErrorKind::Upstream
            }
            #[cfg(feature = "remote")]
            Self::NetworkError { .. } => ErrorKind::Upstream,
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Input => 2,
            ErrorKind::Upstream => 3,
            ErrorKind::NotFound => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_classify_and_exit() {
        let err = EnrichError::InvalidRole {
            value: "both".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(err.exit_code(), 2);

        let err = EnrichError::MissingParameter { name: "path" };
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn not_found_errors_classify_and_exit() {
        let err = EnrichError::PathOperationNotFound {
            path: "/api/hr/employees/all".into(),
            operation: "patch".into(),
        };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.exit_code(), 4);

        let err = EnrichError::SchemaNotFound {
            path: "/api/hr/employees/all".into(),
            operation: "get".into(),
        };
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn upstream_errors_classify_and_exit() {
        let err = EnrichError::DocumentFetch {
            group: Some("hr".into()),
            message: "connection refused".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn fetch_error_mentions_group() {
        let err = EnrichError::DocumentFetch {
            group: Some("hr".into()),
            message: "timeout".into(),
        };
        assert!(err.to_string().contains("hr"));
    }
}
