//! Pass-probability and hint-timing inference
//!
//! - [`features`]: pure feature construction
//! - [`classifier`]: on-disk classifier format and forward pass
//! - [`handle`]: long-lived, reloadable model handles shared across requests
//! - [`training`]: synthetic data and offline fitting used by the admin CLI

pub mod classifier;
pub mod features;
pub mod handle;
pub mod training;

use std::path::{Path, PathBuf};

pub use classifier::{BinaryClassifier, StandardScaler};
pub use features::{difficulty_features, hint_features, simulate_edit_count};
pub use handle::{ModelHandle, ModelRegistry};

/// Classifier artifact and inference errors
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected {expected} features, got {got}")]
    Shape { expected: usize, got: usize },

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("artifact check failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ModelError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
