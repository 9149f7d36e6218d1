//! Generation-service layer: prompt construction, serialized rate-limited
//! chat-completion calls, and defensive normalization of the raw output.

pub mod client;
pub mod credentials;
pub mod error;
pub mod normalize;
pub mod prompt;

pub use client::{
    ChatRequest, ChatTransport, DEFAULT_API_URL, DEFAULT_MODEL, GenerationClient,
    HttpChatTransport, RetryPolicy,
};
pub use credentials::{Credentials, KEY_ENV_VAR, KEY_PLACEHOLDER};
pub use error::GenerationError;
pub use normalize::{Normalized, derive_snippet, normalize_response};
pub use prompt::{CONTRACT_MARKER, build_analysis_prompt, recover_contract_text};
