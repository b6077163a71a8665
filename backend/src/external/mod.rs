//! External AI provider integrations

pub mod chain;
pub mod gemini;
pub mod huggingface;
pub mod openai;

pub use chain::ProviderChain;
pub use gemini::GeminiClient;
pub use huggingface::HuggingFaceClient;
pub use openai::OpenAiClient;

use thiserror::Error;

/// Failure modes for a single provider attempt
///
/// These never reach a generation endpoint's caller: the fallback chain logs
/// them and moves to the next provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider is not configured")]
    Unavailable,

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("provider returned {status}: {message}")]
    Http { status: u16, message: String },

    #[error("provider reported an error: {0}")]
    Api(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}
