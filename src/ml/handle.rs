//! Reloadable model handles
//!
//! Each classifier is loaded once at startup and shared through the
//! application state. Callers ask for a reload check before using it; the
//! files are only re-read when their modification time moved and their
//! content hash differs from what is loaded.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tokio::{sync::RwLock, task};

use crate::{
    config::ModelConfig,
    constants::{DIFFICULTY_FEATURE_DIM, HINT_FEATURE_DIM},
    utils::hash_files,
};

use super::{BinaryClassifier, ModelError, classifier::scaler_path};

struct Loaded {
    classifier: Arc<BinaryClassifier>,
    fingerprint: String,
    modified: Option<(SystemTime, SystemTime)>,
}

/// Shared handle to one classifier artifact
pub struct ModelHandle {
    name: &'static str,
    path: PathBuf,
    input_dim: usize,
    loaded: RwLock<Loaded>,
}

impl ModelHandle {
    /// Load the artifact at `path`, requiring `input_dim` features
    pub fn load(name: &'static str, path: impl Into<PathBuf>, input_dim: usize) -> Result<Self, ModelError> {
        let path = path.into();
        let loaded = read_artifact(&path, input_dim)?;

        tracing::info!(
            model = name,
            path = %path.display(),
            fingerprint = %&loaded.fingerprint[..12],
            "Loaded classifier"
        );

        Ok(Self {
            name,
            path,
            input_dim,
            loaded: RwLock::new(loaded),
        })
    }

    /// The classifier currently in use
    pub async fn current(&self) -> Arc<BinaryClassifier> {
        Arc::clone(&self.loaded.read().await.classifier)
    }

    /// Positive-class probability using the current classifier
    pub async fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        self.current().await.predict_proba(features)
    }

    /// Swap in the on-disk artifact if it changed
    ///
    /// Returns `Ok(true)` when a new classifier was installed. On error the
    /// previous classifier stays in place.
    pub async fn reload_if_changed(&self) -> Result<bool, ModelError> {
        let path = self.path.clone();
        let modified = task::spawn_blocking(move || modification_times(&path)).await?;

        {
            let current = self.loaded.read().await;
            if modified.is_some() && current.modified == modified {
                return Ok(false);
            }
        }

        let (path, input_dim) = (self.path.clone(), self.input_dim);
        let candidate = task::spawn_blocking(move || read_artifact(&path, input_dim)).await??;
        let mut current = self.loaded.write().await;

        if candidate.fingerprint == current.fingerprint {
            current.modified = candidate.modified;
            return Ok(false);
        }

        tracing::info!(
            model = self.name,
            old = %&current.fingerprint[..12],
            new = %&candidate.fingerprint[..12],
            "Reloaded classifier"
        );
        *current = candidate;
        Ok(true)
    }
}

fn modification_times(path: &Path) -> Option<(SystemTime, SystemTime)> {
    let model = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    let scaler = std::fs::metadata(scaler_path(path))
        .and_then(|m| m.modified())
        .ok()?;
    Some((model, scaler))
}

fn read_artifact(path: &Path, input_dim: usize) -> Result<Loaded, ModelError> {
    let modified = modification_times(path);
    let scaler = scaler_path(path);
    let fingerprint = hash_files(&[path, &scaler]).map_err(|e| ModelError::io(path, e))?;

    let classifier = BinaryClassifier::load(path)?;
    if classifier.input_dim() != input_dim {
        return Err(ModelError::Shape {
            expected: input_dim,
            got: classifier.input_dim(),
        });
    }

    Ok(Loaded {
        classifier: Arc::new(classifier),
        fingerprint,
        modified,
    })
}

/// The two classifiers the tutor uses
pub struct ModelRegistry {
    /// Pass probability from the 15-dimensional difficulty features
    pub difficulty: ModelHandle,
    /// Hint probability from `[time spent, edits]`
    pub hint_timing: ModelHandle,
}

impl ModelRegistry {
    /// Load both classifiers from their configured paths
    pub fn load(config: &ModelConfig) -> Result<Self, ModelError> {
        Ok(Self {
            difficulty: ModelHandle::load(
                "difficulty",
                &config.difficulty_model_path,
                DIFFICULTY_FEATURE_DIM,
            )?,
            hint_timing: ModelHandle::load(
                "hint_timing",
                &config.hint_timing_model_path,
                HINT_FEATURE_DIM,
            )?,
        })
    }

    /// Pick up changed artifacts; failures keep the running models
    pub async fn refresh(&self) {
        for handle in [&self.difficulty, &self.hint_timing] {
            if let Err(e) = handle.reload_if_changed().await {
                tracing::warn!(model = handle.name, "Keeping loaded classifier: {}", e);
            }
        }
    }
}
