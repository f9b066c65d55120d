//! Error types for issuetrack
//!
//! The `Display` text of the request-level variants is the exact message
//! clients see in the `error` field of a response body.

use thiserror::Error;

/// Which mutation failed to find its target issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Update => write!(f, "update"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// A create request lacked `issue_title`, `issue_text` or `created_by`
    #[error("required field(s) missing")]
    Validation,

    #[error("missing _id")]
    MissingId,

    #[error("no update field(s) sent")]
    NoUpdateFields { id: String },

    #[error("could not {action}")]
    NotFound { id: String, action: Action },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(String),
}

impl Error {
    /// The issue id echoed back alongside the error, if the failure has one
    pub fn issue_id(&self) -> Option<&str> {
        match self {
            Error::NoUpdateFields { id } | Error::NotFound { id, .. } => Some(id),
            _ => None,
        }
    }

    /// True for outcomes caused by the request itself rather than the host
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Error::Validation
                | Error::MissingId
                | Error::NoUpdateFields { .. }
                | Error::NotFound { .. }
        )
    }
}
