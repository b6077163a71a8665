//! OpenAI chat completions client
//!
//! Used for both plain text generation and vision analysis. Vision requests
//! attach the image as a data-URI content part on the vision model.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::ImagePayload;
use std::time::Duration;

use super::ProviderError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const TEXT_MODEL: &str = "gpt-3.5-turbo";
const VISION_MODEL: &str = "gpt-4o-mini";

/// Client for the OpenAI chat completions API
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: Option<String>,
    base_url: String,
    http_client: Client,
}

#[derive(Serialize)]
struct ChatRequest {
    model: &'static str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl OpenAiClient {
    /// Create a new OpenAI client
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
    ///
    /// A 2xx body carrying an `error` member is a failure: OpenAI-compatible
    /// gateways are known to report API-level errors that way.
    pub async fn generate(
        &self,
        prompt: &str,
        image: Option<&ImagePayload>,
    ) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::Unavailable)?;

        let (model, content, max_tokens) = match image {
            Some(image) => (
                VISION_MODEL,
                MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.to_data_uri(),
                        },
                    },
                ]),
                Some(500),
            ),
            None => (TEXT_MODEL, MessageContent::Text(prompt.to_string()), None),
        };

        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            temperature: 0.7,
            max_tokens,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
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

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(ProviderError::Api(error.message));
        }

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ProviderError::Malformed("response contained no message content".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_request_serialization() {
        let request = ChatRequest {
            model: TEXT_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Text("hello".to_string()),
            }],
            temperature: 0.7,
            max_tokens: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_vision_request_serialization() {
        let image = ImagePayload::from_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        let request = ChatRequest {
            model: VISION_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: "analyze".to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.to_data_uri(),
                        },
                    },
                ]),
            }],
            temperature: 0.7,
            max_tokens: Some(500),
        };

        let json = serde_json::to_value(&request).unwrap();
        let parts = json["messages"][0]["content"].as_array().unwrap();
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(
            parts[1]["image_url"]["url"],
            "data:image/png;base64,aGVsbG8="
        );
    }

    #[test]
    fn test_error_body_detection() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"error": {"message": "quota exceeded"}}"#).unwrap();
        assert_eq!(body.error.unwrap().message, "quota exceeded");
        assert!(body.choices.is_empty());
    }
}
