//! Text generation client
//!
//! Replies are expected to carry a small JSON object. Models often wrap it in
//! prose or a code fence, so the first complete JSON object is read out of
//! the surrounding text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Text generation failures
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Request(String),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("empty response from API")]
    EmptyResponse,

    #[error("malformed reply: {0}")]
    Malformed(String),
}

/// Prompt in, text out
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Client for the Anthropic messages API
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if config.api_key.is_empty() {
            tracing::warn!("ANTHROPIC_API_KEY not set; hints and rationales will use fallback text");
        }

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        tracing::debug!(model = %self.model, max_tokens, "Calling text generation API");

        let request = MessagesRequest {
            model: &self.model,
            max_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(e.to_string()))?;

        body.content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Read the string `key` from the JSON object embedded in `reply`
pub fn extract_json_field(reply: &str, key: &str) -> Result<String, LlmError> {
    let object = first_json_object(reply)
        .ok_or_else(|| LlmError::Malformed("no JSON object in reply".to_string()))?;

    object
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LlmError::Malformed(format!("missing \"{}\"", key)))
}

/// The first `{` in `text` that starts a complete JSON object, parsed
///
/// Only that one value is consumed; anything after it is ignored.
fn first_json_object(text: &str) -> Option<serde_json::Value> {
    text.match_indices('{').find_map(|(start, _)| {
        serde_json::Deserializer::from_str(&text[start..])
            .into_iter::<serde_json::Value>()
            .next()
            .and_then(Result::ok)
            .filter(serde_json::Value::is_object)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: String, api_key: &str) -> AnthropicClient {
        AnthropicClient::new(&LlmConfig {
            api_key: api_key.to_string(),
            base_url,
            model: "test-model".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_extract_plain_object() {
        assert_eq!(
            extract_json_field(r#"{"hint": "Think about sorting."}"#, "hint").unwrap(),
            "Think about sorting."
        );
    }

    #[test]
    fn test_extract_from_fenced_reply() {
        let reply = "Sure!\n```json\n{\"explanation\": \"They drill prefix sums.\"}\n```";
        assert_eq!(
            extract_json_field(reply, "explanation").unwrap(),
            "They drill prefix sums."
        );
    }

    #[test]
    fn test_extract_takes_first_of_two_objects() {
        let reply = r#"{"hint": "Use a stack."} and as an alternative {"hint": "Use recursion."}"#;
        assert_eq!(extract_json_field(reply, "hint").unwrap(), "Use a stack.");
    }

    #[test]
    fn test_extract_ignores_braces_in_surrounding_prose() {
        let reply = "For a set like {1, 2} consider:\n{\"hint\": \"Count duplicates.\"}\nThen loop over {i}.";
        assert_eq!(extract_json_field(reply, "hint").unwrap(), "Count duplicates.");
    }

    #[test]
    fn test_extract_rejects_missing_or_empty_key() {
        assert!(extract_json_field(r#"{"other": "x"}"#, "hint").is_err());
        assert!(extract_json_field(r#"{"hint": "  "}"#, "hint").is_err());
        assert!(extract_json_field("no json here", "hint").is_err());
    }

    #[tokio::test]
    async fn test_complete_sends_messages_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({
                "model": "test-model",
                "max_tokens": 200,
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "{\"hint\": \"ok\"}"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client(server.uri(), "key").complete("hello", 200).await.unwrap();
        assert_eq!(reply, "{\"hint\": \"ok\"}");
    }

    #[tokio::test]
    async fn test_complete_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        assert!(matches!(
            client(server.uri(), "key").complete("hello", 10).await,
            Err(LlmError::Api { status: 529, .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_key_never_calls_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert!(matches!(
            client(server.uri(), "").complete("hello", 10).await,
            Err(LlmError::MissingApiKey)
        ));
    }
}
