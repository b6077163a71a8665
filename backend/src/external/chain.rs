//! Provider fallback chain
//!
//! Tries the configured providers in a fixed priority order until one yields
//! text the extraction engine can turn into records. The chain is strictly
//! sequential and never retries a provider within a call: every attempt
//! spends paid API quota. Exhaustion is not an error; the caller substitutes
//! its deterministic default batch.

use shared::ImagePayload;
use std::time::Duration;

use crate::config::ProvidersConfig;

use super::{GeminiClient, HuggingFaceClient, OpenAiClient, ProviderError};

/// Name recorded when no provider produced the stored batch
pub const FALLBACK_SOURCE: &str = "fallback";

/// One configured provider in the chain
#[derive(Clone)]
pub enum Provider {
    OpenAi(OpenAiClient),
    Gemini(GeminiClient),
    HuggingFace(HuggingFaceClient),
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi(_) => "openai",
            Provider::Gemini(_) => "gemini",
            Provider::HuggingFace(_) => "huggingface",
        }
    }

    /// Whether the provider accepts an image payload alongside the prompt
    pub fn supports_vision(&self) -> bool {
        !matches!(self, Provider::HuggingFace(_))
    }

    async fn generate(
        &self,
        prompt: &str,
        image: Option<&ImagePayload>,
    ) -> Result<String, ProviderError> {
        match self {
            Provider::OpenAi(client) => client.generate(prompt, image).await,
            Provider::Gemini(client) => client.generate(prompt, image).await,
            Provider::HuggingFace(client) => client.generate(prompt).await,
        }
    }
}

/// Ordered fallback chain over the configured providers
#[derive(Clone)]
pub struct ProviderChain {
    providers: Vec<Provider>,
}

impl ProviderChain {
    /// Build the chain from configuration. Priority is fixed: OpenAI, then
    /// Gemini, then Hugging Face. Providers without a key stay in the chain
    /// but report `Unavailable` and are skipped.
    pub fn from_config(cfg: &ProvidersConfig) -> Self {
        let timeout = Duration::from_secs(cfg.request_timeout_secs);

        Self {
            providers: vec![
                Provider::OpenAi(OpenAiClient::new(cfg.openai_api_key.clone(), timeout)),
                Provider::Gemini(GeminiClient::new(cfg.gemini_api_key.clone(), timeout)),
                Provider::HuggingFace(HuggingFaceClient::new(
                    cfg.huggingface_api_key.clone(),
                    timeout,
                )),
            ],
        }
    }

    /// Run the chain. `extract` decides usability: the first provider whose
    /// output it accepts wins, and its name is returned alongside the
    /// records. `None` means every provider failed or was unusable.
    pub async fn generate<T, F>(
        &self,
        task: &str,
        prompt: &str,
        image: Option<&ImagePayload>,
        extract: F,
    ) -> Option<(T, &'static str)>
    where
        F: Fn(&str) -> Option<T>,
    {
        for provider in &self.providers {
            if image.is_some() && !provider.supports_vision() {
                continue;
            }

            match provider.generate(prompt, image).await {
                Ok(text) => match extract(&text) {
                    Some(records) => {
                        tracing::info!(task, provider = provider.name(), "provider result usable");
                        return Some((records, provider.name()));
                    }
                    None => {
                        tracing::warn!(
                            task,
                            provider = provider.name(),
                            "provider output unusable, trying next"
                        );
                    }
                },
                Err(ProviderError::Unavailable) => {
                    tracing::debug!(task, provider = provider.name(), "provider not configured");
                }
                Err(e) => {
                    tracing::warn!(
                        task,
                        provider = provider.name(),
                        error = %e,
                        "provider attempt failed, trying next"
                    );
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvidersConfig;

    fn keyed_config() -> ProvidersConfig {
        ProvidersConfig {
            openai_api_key: Some("sk-test".to_string()),
            gemini_api_key: Some("gm-test".to_string()),
            huggingface_api_key: Some("hf-test".to_string()),
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn test_chain_priority_order() {
        let chain = ProviderChain::from_config(&keyed_config());
        let names: Vec<&str> = chain.providers.iter().map(Provider::name).collect();
        assert_eq!(names, vec!["openai", "gemini", "huggingface"]);
    }

    #[test]
    fn test_vision_capability() {
        let chain = ProviderChain::from_config(&keyed_config());
        assert!(chain.providers[0].supports_vision());
        assert!(chain.providers[1].supports_vision());
        assert!(!chain.providers[2].supports_vision());
    }

    #[tokio::test]
    async fn test_unkeyed_chain_exhausts_to_none() {
        let chain = ProviderChain::from_config(&ProvidersConfig::default());
        let result = chain
            .generate("alerts", "prompt", None, |_| Some(()))
            .await;
        assert!(result.is_none());
    }
}
