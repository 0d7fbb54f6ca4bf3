//! In-process embeddings with fastembed
//!
//! The model is downloaded to the fastembed cache on first use.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::task;

use super::{Embedder, EmbeddingError};

/// Local fastembed model
pub struct LocalEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
    dimensions: usize,
}

impl LocalEmbedder {
    /// Load `model_name`, downloading it when not cached
    pub async fn new(model_name: &str) -> Result<Self, EmbeddingError> {
        let (embedding_model, dimensions) = model_info(model_name)?;

        tracing::info!(model = model_name, "Loading local embedding model");

        let mut options = InitOptions::default();
        options.model_name = embedding_model;
        options.show_download_progress = false;

        let model = task::spawn_blocking(move || TextEmbedding::try_new(options))
            .await
            .map_err(|e| EmbeddingError::Model(format!("Task join error: {}", e)))?
            .map_err(|e| EmbeddingError::Model(format!("Failed to load model: {}", e)))?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            model_name: model_name.to_string(),
            dimensions,
        })
    }
}

fn model_info(name: &str) -> Result<(EmbeddingModel, usize), EmbeddingError> {
    match name {
        "all-MiniLM-L6-v2" => Ok((EmbeddingModel::AllMiniLML6V2, 384)),
        "all-MiniLM-L12-v2" => Ok((EmbeddingModel::AllMiniLML12V2, 384)),
        "bge-small-en-v1.5" => Ok((EmbeddingModel::BGESmallENV15, 384)),
        "bge-base-en-v1.5" => Ok((EmbeddingModel::BGEBaseENV15, 768)),
        _ => Err(EmbeddingError::InvalidInput(format!(
            "Unsupported local embedding model: '{}'",
            name
        ))),
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput("Text cannot be empty".to_string()));
        }

        let model = Arc::clone(&self.model);
        let texts = vec![text.to_string()];

        let mut embeddings = task::spawn_blocking(move || {
            let mut guard = model
                .lock()
                .map_err(|e| format!("Mutex lock failed: {}", e))?;
            guard
                .embed(texts, None)
                .map_err(|e| format!("Embedding generation failed: {}", e))
        })
        .await
        .map_err(|e| EmbeddingError::Model(format!("Task join error: {}", e)))?
        .map_err(EmbeddingError::Model)?;

        let embedding = embeddings
            .pop()
            .ok_or_else(|| EmbeddingError::Model("No embedding returned".to_string()))?;

        if embedding.len() != self.dimensions {
            return Err(EmbeddingError::Model(format!(
                "Embedding has wrong dimensions: expected {}, got {}",
                self.dimensions,
                embedding.len()
            )));
        }

        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
