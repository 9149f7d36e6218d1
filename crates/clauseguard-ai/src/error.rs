use thiserror::Error;

/// Failures from the generation service, as surfaced to callers.
///
/// `RateLimited` is the transport-level signal and carries the service's
/// retry hint as a typed field; the client consumes it internally and
/// surfaces `RateLimitExhausted` once retries run out. Everything else
/// propagates on first occurrence.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("API key not configured")]
    NotConfigured,
    #[error("invalid API key")]
    InvalidCredential,
    #[error("rate limit exceeded")]
    RateLimited { retry_after_ms: Option<u64> },
    #[error("rate limit still exceeded after {attempts} attempts")]
    RateLimitExhausted { attempts: u32 },
    #[error("model {model} is not available for this API key")]
    ModelUnavailable { model: String },
    #[error("invalid request: {0}")]
    MalformedRequest(String),
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Service { status: u16, message: String },
}
