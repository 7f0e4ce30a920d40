use thiserror::Error;
use crate::job::FailureKind;

/// Uniform failure type for every call made through the HTTP gateway.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HttpError {
    /// DNS, refused connection, aborted or timed out request.
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response. `message` is the response body text, or `HTTP <status>`
    /// when the body was empty or unreadable.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// 2xx response whose body was not the JSON we expected.
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl HttpError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Builds a status error, falling back to `HTTP <status>` for a blank body.
    pub fn from_status(status: u16, body: Option<String>) -> Self {
        let message = body
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));

        Self::Status { status, message }
    }
}

impl From<&HttpError> for FailureKind {
    fn from(err: &HttpError) -> Self {
        match err {
            HttpError::Transport(_) => FailureKind::Transport,
            HttpError::Status { .. } => FailureKind::Status,
            HttpError::Decode(_) => FailureKind::Decode,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Bad local input. No request was issued.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Http(#[from] HttpError),

    /// The remote answered 2xx but broke its response contract.
    #[error("{0}")]
    Protocol(String),
}

impl ClientError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
