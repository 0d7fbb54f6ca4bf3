//! Binary classifier artifacts
//!
//! A classifier is stored as two JSON files: the network (`<name>.json`) and
//! the input standardisation it was trained with (`<name>_scaler.json`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ModelError;

/// Layer activation function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Sigmoid,
    Linear,
}

impl Activation {
    fn apply(&self, x: f64) -> f64 {
        match self {
            Self::Relu => x.max(0.0),
            Self::Sigmoid => sigmoid(x),
            Self::Linear => x,
        }
    }
}

/// Numerically stable logistic function
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Fully connected layer; `weights[out][in]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    fn input_dim(&self) -> usize {
        self.weights.first().map(Vec::len).unwrap_or(0)
    }

    fn output_dim(&self) -> usize {
        self.weights.len()
    }

    fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(row, b)| {
                let z: f64 = row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + b;
                self.activation.apply(z)
            })
            .collect()
    }
}

/// Feed-forward network ending in a single sigmoid unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub input_dim: usize,
    pub layers: Vec<DenseLayer>,
}

impl Network {
    /// Check that layer shapes chain and end in one probability
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut width = self.input_dim;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.output_dim() == 0 || layer.bias.len() != layer.output_dim() {
                return Err(ModelError::InvalidArtifact(format!(
                    "layer {} has {} rows but {} biases",
                    i,
                    layer.output_dim(),
                    layer.bias.len()
                )));
            }
            if layer.weights.iter().any(|row| row.len() != width) {
                return Err(ModelError::InvalidArtifact(format!(
                    "layer {} expects {} inputs but receives {}",
                    i,
                    layer.input_dim(),
                    width
                )));
            }
            width = layer.output_dim();
        }

        match self.layers.last() {
            Some(last) if last.output_dim() == 1 && last.activation == Activation::Sigmoid => Ok(()),
            Some(_) => Err(ModelError::InvalidArtifact(
                "final layer must be a single sigmoid unit".to_string(),
            )),
            None => Err(ModelError::InvalidArtifact("network has no layers".to_string())),
        }
    }

    fn forward(&self, input: &[f64]) -> f64 {
        let mut activations = input.to_vec();
        for layer in &self.layers {
            activations = layer.forward(&activations);
        }
        activations.first().copied().unwrap_or(0.0)
    }
}

/// Per-feature standardisation: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit mean and population standard deviation column-wise
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let dim = rows.first().map(Vec::len).unwrap_or(0);
        let n = rows.len().max(1) as f64;

        let mean: Vec<f64> = (0..dim)
            .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n)
            .collect();
        let scale = (0..dim)
            .map(|j| {
                let var = rows.iter().map(|r| (r[j] - mean[j]).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                if std > 0.0 { std } else { 1.0 }
            })
            .collect();

        Self { mean, scale }
    }

    /// Standardise one feature vector
    pub fn transform(&self, input: &[f64]) -> Vec<f64> {
        input
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| {
                let s = if *s == 0.0 { 1.0 } else { *s };
                (x - m) / s
            })
            .collect()
    }
}

/// Scaler plus network: feature vector in, positive-class probability out
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryClassifier {
    pub network: Network,
    pub scaler: StandardScaler,
}

impl BinaryClassifier {
    /// Assemble and validate a classifier
    pub fn new(network: Network, scaler: StandardScaler) -> Result<Self, ModelError> {
        network.validate()?;
        if scaler.mean.len() != network.input_dim || scaler.scale.len() != network.input_dim {
            return Err(ModelError::InvalidArtifact(format!(
                "scaler covers {} features but network expects {}",
                scaler.mean.len(),
                network.input_dim
            )));
        }
        Ok(Self { network, scaler })
    }

    /// Number of input features
    pub fn input_dim(&self) -> usize {
        self.network.input_dim
    }

    /// Probability of the positive class
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.input_dim() {
            return Err(ModelError::Shape {
                expected: self.input_dim(),
                got: features.len(),
            });
        }
        let scaled = self.scaler.transform(features);
        Ok(self.network.forward(&scaled).clamp(0.0, 1.0))
    }

    /// Load a classifier and its paired scaler
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let network: Network = read_json(path)?;
        let scaler: StandardScaler = read_json(&scaler_path(path))?;
        Self::new(network, scaler)
    }

    /// Write the classifier and its paired scaler
    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ModelError::io(parent, e))?;
        }
        write_json(path, &self.network)?;
        write_json(&scaler_path(path), &self.scaler)
    }
}

/// `models/difficulty.json` → `models/difficulty_scaler.json`
pub fn scaler_path(model_path: &Path) -> PathBuf {
    let stem = model_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match model_path.extension() {
        Some(ext) => format!("{}_scaler.{}", stem, ext.to_string_lossy()),
        None => format!("{}_scaler", stem),
    };
    model_path.with_file_name(file_name)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ModelError> {
    let bytes = std::fs::read(path).map_err(|e| ModelError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| ModelError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ModelError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| ModelError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::write(path, bytes).map_err(|e| ModelError::io(path, e))
}
