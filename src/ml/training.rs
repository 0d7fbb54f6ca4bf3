//! Offline training for the two classifiers
//!
//! Used by `cpmentor-admin generate-data` and `train-models`. Both tasks are
//! fitted as logistic regression on standardised inputs; the resulting
//! artifacts use the same format the server loads.

use std::path::Path;
use std::sync::LazyLock;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::constants::TAG_VOCABULARY;

use super::{
    BinaryClassifier, ModelError, StandardScaler,
    classifier::{Activation, DenseLayer, Network, sigmoid},
    features::sample_poisson,
};

/// Labelled feature rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<f64>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn push(&mut self, features: Vec<f64>, label: bool) {
        self.features.push(features);
        self.labels.push(if label { 1.0 } else { 0.0 });
    }
}

/// Synthetic training sets for both classifiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingData {
    pub difficulty: Dataset,
    pub hint_timing: Dataset,
}

impl TrainingData {
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ModelError::io(parent, e))?;
        }
        let bytes = serde_json::to_vec(self).map_err(|e| ModelError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, bytes).map_err(|e| ModelError::io(path, e))
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path).map_err(|e| ModelError::io(path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| ModelError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Noise added to the synthetic pass score
static LABEL_NOISE: LazyLock<Normal<f64>> =
    LazyLock::new(|| Normal::new(0.0, 0.1).expect("valid noise distribution"));

/// Generate `n_submissions` synthetic observations
///
/// Pass labels follow `mean(tag success) * (1 - 0.3 * difficulty / 2)` plus
/// noise; hint labels mark long attempts with few edits.
pub fn generate_training_data<R: Rng + ?Sized>(rng: &mut R, n_submissions: usize) -> TrainingData {
    let n_tags = TAG_VOCABULARY.len();
    let mut difficulty = Dataset::default();
    let mut hint_timing = Dataset::default();

    for _ in 0..n_submissions {
        let success: Vec<f64> = (0..n_tags).map(|_| rng.random_range(0.3..0.9)).collect();
        let avg_time = rng.random_range(30.0..300.0);
        let avg_edits = rng.random_range(2.0..10.0);

        let tags: Vec<f64> = (0..n_tags)
            .map(|_| if rng.random_bool(0.4) { 1.0 } else { 0.0 })
            .collect();
        let level = f64::from(rng.random_range(0u8..3));

        let mut row = Vec::with_capacity(2 * n_tags + 3);
        row.extend(&tags);
        row.push(level);
        row.extend(&success);
        row.push(avg_time);
        row.push(avg_edits);

        let skill = success.iter().sum::<f64>() / n_tags as f64;
        let pass = (skill * (1.0 - 0.3 * level / 2.0) + LABEL_NOISE.sample(rng)).clamp(0.0, 1.0);
        difficulty.push(row, pass > 0.5);

        let time_spent = rng.random_range(10.0..600.0);
        let edits = f64::from(sample_poisson(rng, 5.0));
        hint_timing.push(vec![time_spent, edits], time_spent > 200.0 && edits < 5.0);
    }

    TrainingData {
        difficulty,
        hint_timing,
    }
}

/// Batch gradient descent on the logistic loss
#[derive(Debug, Clone)]
pub struct LogisticTrainer {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
}

impl Default for LogisticTrainer {
    fn default() -> Self {
        Self {
            epochs: 500,
            learning_rate: 0.5,
            l2: 1e-4,
        }
    }
}

impl LogisticTrainer {
    /// Fit scaler and weights on `data`
    pub fn fit(&self, data: &Dataset) -> Result<BinaryClassifier, ModelError> {
        let dim = data.features.first().map(Vec::len).ok_or_else(|| {
            ModelError::InvalidArtifact("cannot train on an empty dataset".to_string())
        })?;
        if let Some(row) = data.features.iter().find(|r| r.len() != dim) {
            return Err(ModelError::Shape {
                expected: dim,
                got: row.len(),
            });
        }

        let scaler = StandardScaler::fit(&data.features);
        let rows: Vec<Vec<f64>> = data.features.iter().map(|r| scaler.transform(r)).collect();
        let n = rows.len() as f64;

        let mut weights = vec![0.0; dim];
        let mut bias = 0.0;

        for epoch in 0..self.epochs {
            let mut grad_w = vec![0.0; dim];
            let mut grad_b = 0.0;

            for (x, y) in rows.iter().zip(&data.labels) {
                let z = weights.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + bias;
                let err = sigmoid(z) - y;
                for (g, v) in grad_w.iter_mut().zip(x) {
                    *g += err * v;
                }
                grad_b += err;
            }

            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= self.learning_rate * (g / n + self.l2 * *w);
            }
            bias -= self.learning_rate * grad_b / n;

            if epoch % 100 == 0 {
                tracing::debug!(epoch, "Training epoch");
            }
        }

        BinaryClassifier::new(
            Network {
                input_dim: dim,
                layers: vec![DenseLayer {
                    weights: vec![weights],
                    bias: vec![bias],
                    activation: Activation::Sigmoid,
                }],
            },
            scaler,
        )
    }
}

/// Fraction of rows classified correctly at the 0.5 threshold
pub fn accuracy(classifier: &BinaryClassifier, data: &Dataset) -> Result<f64, ModelError> {
    if data.is_empty() {
        return Ok(0.0);
    }
    let mut correct = 0usize;
    for (x, y) in data.features.iter().zip(&data.labels) {
        let predicted = if classifier.predict_proba(x)? > 0.5 { 1.0 } else { 0.0 };
        if predicted == *y {
            correct += 1;
        }
    }
    Ok(correct as f64 / data.len() as f64)
}
