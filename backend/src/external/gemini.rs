//! Google Gemini generateContent client
//!
//! Text requests go to the pro model; vision requests attach the image as an
//! inline base64 part on the flash model.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::ImagePayload;
use std::time::Duration;

use super::ProviderError;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const TEXT_MODEL: &str = "gemini-pro";
const VISION_MODEL: &str = "gemini-1.5-flash";

/// Client for the Gemini generateContent API
#[derive(Clone)]
pub struct GeminiClient {
    api_key: Option<String>,
    base_url: String,
    http_client: Client,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl GeminiClient {
    /// Create a new Gemini client
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
    pub async fn generate(
        &self,
        prompt: &str,
        image: Option<&ImagePayload>,
    ) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::Unavailable)?;

        let mut parts = vec![Part {
            text: Some(prompt.to_string()),
            inline_data: None,
        }];
        let model = match image {
            Some(image) => {
                parts.push(Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: image.mime_type.clone(),
                        data: image.base64_data.clone(),
                    }),
                });
                VISION_MODEL
            }
            None => TEXT_MODEL,
        };

        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, api_key
        );

        let response = self.http_client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::Http { status, message });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(ProviderError::Api(error.message));
        }

        body.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| {
                ProviderError::Malformed("response contained no candidate text".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vision_part_serialization() {
        let part = Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "image/jpeg".to_string(),
                data: "aGVsbG8=".to_string(),
            }),
        };

        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(json["inlineData"]["data"], "aGVsbG8=");
        assert!(json.get("text").is_none());
    }

    #[test]
    fn test_candidate_text_extraction() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"alerts\": []}"}]}}]}"#,
        )
        .unwrap();
        let text = body.candidates[0].content.parts[0].text.as_deref();
        assert_eq!(text, Some("{\"alerts\": []}"));
    }

    #[test]
    fn test_error_body_detection() {
        let body: GenerateResponse =
            serde_json::from_str(r#"{"error": {"message": "API key not valid"}}"#).unwrap();
        assert_eq!(body.error.unwrap().message, "API key not valid");
    }
}
