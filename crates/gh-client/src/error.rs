//! Remote error carrying the HTTP status GitHub answered with
//!
//! Trait methods return `anyhow::Result`; implementations wrap failures in
//! [`ApiError`] so callers can classify them by status code with
//! [`status_of`] without knowing which client produced them.

use std::fmt;

/// Status GitHub uses for validation failures and secondary (abuse) rate limits
/// on comment creation
pub const STATUS_UNPROCESSABLE: u16 = 422;

/// Status of a resource that does not exist (or was already deleted)
pub const STATUS_NOT_FOUND: u16 = 404;

/// A failed GitHub API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code, if a response was received at all
    pub status: Option<u16>,
    /// Message from GitHub or the transport
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "GitHub API error ({}): {}", status, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Error for a response with the given status
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Error that never produced a response (network, TLS, serialization)
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

impl From<octocrab::Error> for ApiError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. } => {
                Self::with_status(source.status_code.as_u16(), source.message.clone())
            }
            _ => Self::transport(err.to_string()),
        }
    }
}

/// Extract the HTTP status from an error chain, if any link is an [`ApiError`]
pub fn status_of(err: &anyhow::Error) -> Option<u16> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ApiError>())
        .and_then(|api| api.status)
}
