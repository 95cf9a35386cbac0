use thiserror::Error;

/// Failure talking to the inference backend.
///
/// Callers are not expected to branch on the variant; it exists so the
/// cause shows up in logs and error payloads.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("invalid inference endpoint: {0}")]
    Endpoint(String),
    #[error("inference request failed: {0}")]
    Request(String),
    #[error("inference request timed out after {0} ms")]
    Timeout(u64),
    /// `body` is kept for logging only and never rendered.
    #[error("inference service returned status {status}")]
    Status { status: u16, body: String },
    #[error("inference response was not valid JSON: {0}")]
    Decode(String),
    #[error("inference response missing content")]
    MissingContent,
}
