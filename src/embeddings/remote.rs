//! Remote embeddings over an OpenAI-compatible HTTP endpoint

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;

use super::{Embedder, EmbeddingError};

/// Request timeout duration
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedder backed by `POST {base_url}/v1/embeddings`
pub struct RemoteEmbedder {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    /// Learned from the first response
    dimensions: AtomicUsize,
}

impl RemoteEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dimensions: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("Text cannot be empty".to_string()));
        }

        tracing::debug!(model = %self.model, chars = text.len(), "Requesting embedding");

        let mut request = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .json(&EmbeddingRequest {
                model: &self.model,
                input: [text],
            });
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| EmbeddingError::Model("No embedding returned".to_string()))?;

        let known = self.dimensions.load(Ordering::Relaxed);
        if known == 0 {
            self.dimensions.store(embedding.len(), Ordering::Relaxed);
        } else if known != embedding.len() {
            return Err(EmbeddingError::Model(format!(
                "Embedding has wrong dimensions: expected {}, got {}",
                known,
                embedding.len()
            )));
        }

        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions.load(Ordering::Relaxed)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingProvider;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder(server: &MockServer) -> RemoteEmbedder {
        RemoteEmbedder::new(&EmbeddingConfig {
            provider: EmbeddingProvider::Remote,
            model: "test-embed".to_string(),
            api_key: "secret".to_string(),
            base_url: format!("{}/", server.uri()),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_embed_parses_first_vector() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(json!({"model": "test-embed", "input": ["two sum"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let embedder = embedder(&server);
        assert_eq!(embedder.dimensions(), 0);

        let vector = embedder.embed("two sum").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
        assert_eq!(embedder.dimensions(), 3);
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        match embedder(&server).embed("x").await {
            Err(EmbeddingError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "bad key");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_locally() {
        let server = MockServer::start().await;
        assert!(matches!(
            embedder(&server).embed("   ").await,
            Err(EmbeddingError::InvalidInput(_))
        ));
    }
}
