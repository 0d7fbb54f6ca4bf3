//! Problem embeddings for similarity search
//!
//! Vectors are computed over `"{title} {tags} {description}"` and stored on the
//! problem row as little-endian `f32` bytes.

#[cfg(feature = "local-embeddings")]
pub mod local;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{EmbeddingConfig, EmbeddingProvider};

#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbedder;
pub use remote::RemoteEmbedder;

/// Embedding failures
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Request(String),

    #[error("embedding service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("embedding model error: {0}")]
    Model(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unavailable(String),
}

/// Text-to-vector model
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Vector length; zero when not yet known
    fn dimensions(&self) -> usize;

    fn model_name(&self) -> &str;
}

/// Build the configured embedder
pub async fn from_config(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    match config.provider {
        EmbeddingProvider::Remote => Ok(Arc::new(RemoteEmbedder::new(config)?)),
        #[cfg(feature = "local-embeddings")]
        EmbeddingProvider::Local => Ok(Arc::new(LocalEmbedder::new(&config.model).await?)),
        #[cfg(not(feature = "local-embeddings"))]
        EmbeddingProvider::Local => Err(EmbeddingError::Unavailable(
            "local embeddings require the `local-embeddings` feature".to_string(),
        )),
    }
}

/// Calculate cosine similarity between two vectors
///
/// Mismatched lengths and zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

/// Encode a vector for the `embedding` column
pub fn serialize_embedding(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decode an `embedding` column; `None` when the length is not a multiple of 4
pub fn deserialize_embedding(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let vec1 = vec![1.0, 0.0, 0.0];
        let vec2 = vec![2.0, 0.0, 0.0];
        let vec3 = vec![0.0, 1.0, 0.0];

        assert!((cosine_similarity(&vec1, &vec2) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&vec1, &vec3).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate() {
        assert_eq!(cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_embedding_bytes_are_little_endian() {
        let bytes = serialize_embedding(&[1.0, -0.5]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
        assert_eq!(deserialize_embedding(&bytes), Some(vec![1.0, -0.5]));
    }

    #[test]
    fn test_truncated_embedding_rejected() {
        assert_eq!(deserialize_embedding(&[0, 0, 128]), None);
        assert_eq!(deserialize_embedding(&[]), Some(vec![]));
    }

    #[tokio::test]
    async fn test_local_provider_without_feature() {
        let config = EmbeddingConfig {
            provider: EmbeddingProvider::Local,
            model: "all-MiniLM-L6-v2".to_string(),
            api_key: String::new(),
            base_url: String::new(),
        };
        if cfg!(not(feature = "local-embeddings")) {
            assert!(matches!(
                from_config(&config).await,
                Err(EmbeddingError::Unavailable(_))
            ));
        }
    }
}
