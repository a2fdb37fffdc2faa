use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure taxonomy for outbound API calls.
///
/// Every variant is produced exactly once, at the transport boundary, and
/// logged there with the method name and parameters before being returned.
/// No layer retries; callers decide whether a failure is fatal.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote resource does not exist (HTTP 404).
    #[error("resource not found: {0}")]
    NotFound(String),

    /// No response arrived within the per-request timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The request never reached the remote service.
    #[error("network error: {0}")]
    Network(String),

    /// The remote service answered with a non-success status.
    #[error("remote service returned {status}: {body}")]
    Remote { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// A required environment variable is absent.
    #[error("missing configuration: {0} is not set")]
    MissingConfig(&'static str),
}

impl ApiError {
    /// Classify a `reqwest` send error. Status-bearing failures are handled
    /// separately by the caller, which still has the response body in hand.
    pub(crate) fn from_transport(method: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(method.to_owned())
        } else {
            // Connection refused, DNS failure, TLS trouble: nothing reached
            // the remote, so there is no status code to report.
            ApiError::Network(format!("{method}: {err}"))
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}
