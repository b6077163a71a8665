//! Hugging Face inference API client
//!
//! Text-only last resort in the provider chain. The inference API answers
//! with either a JSON array of generated texts or an object carrying an
//! `error` member, so the body is inspected as a generic value.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use super::ProviderError;

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
const MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.1";

/// Client for the Hugging Face inference API
#[derive(Clone)]
pub struct HuggingFaceClient {
    api_key: Option<String>,
    base_url: String,
    http_client: Client,
}

#[derive(Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
}

impl HuggingFaceClient {
    /// Create a new Hugging Face client
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string(), timeout)
    }

    /// Create a client with a custom base URL (for testing)
    pub fn with_base_url(api_key: Option<String>, base_url: String, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            base_url,
            http_client,
        }
    }

    /// Send one generation request and return the raw completion text.
    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::Unavailable)?;

        let request = InferenceRequest {
            inputs: prompt.to_string(),
            parameters: InferenceParameters {
                max_new_tokens: 500,
                temperature: 0.7,
            },
        };

        let response = self
            .http_client
            .post(format!("{}/models/{}", self.base_url, MODEL))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Http { status, message });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        // The API reports model errors (loading, rate limits) in a 200 body.
        if let Some(error) = body.get("error").and_then(Value::as_str) {
            return Err(ProviderError::Api(error.to_string()));
        }

        body.get(0)
            .and_then(|entry| entry.get("generated_text"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ProviderError::Malformed("response contained no generated text".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = InferenceRequest {
            inputs: "prompt".to_string(),
            parameters: InferenceParameters {
                max_new_tokens: 500,
                temperature: 0.7,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["inputs"], "prompt");
        assert_eq!(json["parameters"]["max_new_tokens"], 500);
    }
}
