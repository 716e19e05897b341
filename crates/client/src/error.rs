use thiserror::Error;

use quotegate_engine::ValidationError;

/// Error type for quote service calls.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request never got a response
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// Response body was not JSON
    #[error("unreadable response: {0}")]
    Parse(String),
    /// The service answered `ok: false` (or omitted what it promised)
    #[error("{0}")]
    Rejected(String),
    /// Endpoint not configured
    #[error("{0} endpoint is not configured")]
    NotConfigured(&'static str),
    /// Save or price attempted before lead capture
    #[error("missing lead token; complete lead capture first")]
    MissingLeadToken,
    /// Inputs failed local checks; no request was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
