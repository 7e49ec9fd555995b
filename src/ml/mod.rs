//! Classifier artifacts and inference (CPU-only, deploy-safe).
//!
//! A trained model is loaded once at startup from a JSON artifact (dense
//! network or decision forest) or, with the `onnx` feature, an ONNX file.

pub mod dense;
pub mod forest;
#[cfg(feature = "onnx")]
pub mod onnx;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::error::{Result, WineError};
use crate::features::{FeatureVector, FEATURE_COUNT};

pub use dense::{Activation, DenseClassifier, DenseLayer, DenseNetwork};
pub use forest::{ForestClassifier, TreeNode};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

/// A loaded, read-only binary classifier.
///
/// `predict` returns the raw class label. Implementations must be
/// deterministic and free of interior mutation so one instance can serve
/// concurrent requests.
#[cfg_attr(test, mockall::automock)]
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Short model family name for logs and health output.
    fn kind(&self) -> &'static str;

    /// Class labels this model can emit.
    fn classes(&self) -> Vec<f64>;
}

/// JSON model artifact, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Dense(DenseClassifier),
    Forest(ForestClassifier),
}

impl ModelArtifact {
    pub fn from_json(raw: &str) -> Result<Self> {
        Self::from_slice(raw.as_bytes())
    }

    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        let artifact: Self = serde_json::from_slice(raw)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<()> {
        let (input_dim, res) = match self {
            Self::Dense(m) => (m.network.input_dim, m.validate()),
            Self::Forest(m) => (m.n_features, m.validate()),
        };
        res.map_err(WineError::Artifact)?;
        if input_dim != FEATURE_COUNT {
            return Err(WineError::Artifact(format!(
                "model expects {input_dim} features, form provides {FEATURE_COUNT}"
            )));
        }
        Ok(())
    }

    pub fn into_classifier(self) -> Arc<dyn Classifier> {
        match self {
            Self::Dense(m) => Arc::new(m),
            Self::Forest(m) => Arc::new(m),
        }
    }
}

/// Load the classifier artifact at `path`.
///
/// The format is chosen by file extension: `.onnx` needs the `onnx` feature,
/// anything else is parsed as a JSON artifact.
pub fn load_classifier<P: AsRef<Path>>(path: P) -> Result<Arc<dyn Classifier>> {
    let path = path.as_ref();
    let is_onnx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("onnx"));

    let classifier = if is_onnx {
        load_onnx(path)?
    } else {
        let raw = std::fs::read(path)?;
        ModelArtifact::from_slice(&raw)?.into_classifier()
    };

    info!(
        path = %path.display(),
        kind = classifier.kind(),
        classes = ?classifier.classes(),
        "Loaded classifier"
    );
    Ok(classifier)
}

#[cfg(feature = "onnx")]
fn load_onnx(path: &Path) -> Result<Arc<dyn Classifier>> {
    Ok(Arc::new(OnnxClassifier::load(path, FEATURE_COUNT)?))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(path: &Path) -> Result<Arc<dyn Classifier>> {
    Err(WineError::UnsupportedModel(format!(
        "{} is an ONNX model; rebuild with --features onnx",
        path.display()
    )))
}

/// Reject inputs a model cannot score.
pub(crate) fn check_input(features: &FeatureVector, expected_dim: usize) -> Result<()> {
    if features.as_slice().len() != expected_dim {
        return Err(WineError::Validation(format!(
            "input dim mismatch: got {}, expected {expected_dim}",
            features.as_slice().len()
        )));
    }
    if !features.is_finite() {
        return Err(WineError::Validation(
            "input contains NaN or infinity".to_string(),
        ));
    }
    Ok(())
}

/// Index of the largest value; ties resolve to the lowest index.
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.iter().copied().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
