//! Stop persistence service error types.

/// Errors that can occur when talking to the stop persistence service.
///
/// A commit rejected with field-level validation messages is not an error:
/// that outcome is `CommitOutcome::Invalid`, and the editing session keeps
/// the draft alive to let the operator correct it.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed
    #[error("unauthorized: check SHIPMENTS_API_KEY")]
    Unauthorized,

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}
