//! Error types for the remote document inspection service.
//!
//! The pipeline itself has no error taxonomy: every stage is a no-op on
//! absence of its pattern. The failure classes here belong to the
//! collaborators (transport and remote service) and propagate unchanged
//! to the caller.

use thiserror::Error;

/// Result type alias for remote inspection operations.
pub type InspectResult<T> = Result<T, InspectError>;

/// Errors from the remote paragraph/run inspection service.
#[derive(Debug, Error)]
pub enum InspectError {
    /// Credentials or service URL missing from the environment
    #[error("{0} must be set in environment variables")]
    MissingConfiguration(&'static str),

    /// Service URL did not parse
    #[error("invalid service URL: {0}")]
    InvalidServiceUrl(#[from] url::ParseError),

    /// Transport-level failure talking to the service
    #[error("document service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service does not know the document
    #[error("document not found: {0}")]
    DocumentNotFound(String),

    /// Any other non-success response from the service
    #[error("document service returned {status}: {message}")]
    Service { status: u16, message: String },
}

impl InspectError {
    /// Whether retrying the same call could plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            InspectError::Http(err) => err.is_timeout() || err.is_connect(),
            InspectError::Service { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient_client_errors_are_not() {
        let server = InspectError::Service {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(server.is_transient());

        let client = InspectError::Service {
            status: 400,
            message: "bad request".into(),
        };
        assert!(!client.is_transient());

        assert!(!InspectError::DocumentNotFound("report.docx".into()).is_transient());
        assert!(!InspectError::MissingConfiguration("DOCPRESS_APP_SID").is_transient());
    }
}
