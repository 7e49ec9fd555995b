//! Dense neural network classifier (CPU-only).
//!
//! Small MLPs loaded from JSON. A single sigmoid/linear output is read as the
//! positive-class score and thresholded; wider outputs are read as per-class
//! scores and the argmax index is the label.

use serde::{Deserialize, Serialize};

use super::{argmax, check_input, Classifier};
use crate::error::{Result, WineError};
use crate::features::FeatureVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Tanh,
    Sigmoid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Weights shape: [out_dim][in_dim]
    pub weights: Vec<Vec<f64>>,
    /// Bias shape: [out_dim]
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    fn out_dim(&self) -> usize {
        self.weights.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseNetwork {
    /// Expected input dimension.
    pub input_dim: usize,

    /// Optional z-score normalization.
    #[serde(default)]
    pub input_mean: Option<Vec<f64>>,
    #[serde(default)]
    pub input_std: Option<Vec<f64>>,

    pub layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.input_dim == 0 {
            return Err("input_dim must be > 0".to_string());
        }
        if self.layers.is_empty() {
            return Err("layers must not be empty".to_string());
        }
        match (&self.input_mean, &self.input_std) {
            (Some(mean), Some(std)) => {
                if mean.len() != self.input_dim {
                    return Err(format!(
                        "input_mean length {} != input_dim {}",
                        mean.len(),
                        self.input_dim
                    ));
                }
                if std.len() != self.input_dim {
                    return Err(format!(
                        "input_std length {} != input_dim {}",
                        std.len(),
                        self.input_dim
                    ));
                }
                if mean.iter().any(|v| !v.is_finite()) {
                    return Err("input_mean must be finite".to_string());
                }
                if std.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                    return Err("input_std must be finite and > 0".to_string());
                }
            }
            (None, None) => {}
            _ => return Err("input_mean and input_std must be provided together".to_string()),
        }

        let mut expected_in = self.input_dim;
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.out_dim() == 0 {
                return Err(format!("layer[{idx}] out_dim must be > 0"));
            }
            if layer.bias.len() != layer.out_dim() {
                return Err(format!(
                    "layer[{idx}] bias len {} != out_dim {}",
                    layer.bias.len(),
                    layer.out_dim()
                ));
            }
            for (r, row) in layer.weights.iter().enumerate() {
                if row.len() != expected_in {
                    return Err(format!(
                        "layer[{idx}] weights row {r} len {} != expected in_dim {expected_in}",
                        row.len()
                    ));
                }
                if row.iter().any(|v| !v.is_finite()) {
                    return Err(format!("layer[{idx}] weights contain non-finite values"));
                }
            }
            if layer.bias.iter().any(|v| !v.is_finite()) {
                return Err(format!("layer[{idx}] bias contain non-finite values"));
            }
            expected_in = layer.out_dim();
        }
        Ok(())
    }

    pub fn output_dim(&self) -> usize {
        self.layers.last().map(|l| l.out_dim()).unwrap_or(0)
    }

    pub fn forward(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.input_dim {
            return Err(WineError::Validation(format!(
                "DenseNetwork input dim mismatch: got {}, expected {}",
                input.len(),
                self.input_dim
            )));
        }

        let mut x: Vec<f64> = input.to_vec();

        if let (Some(mean), Some(std)) = (&self.input_mean, &self.input_std) {
            for (i, v) in x.iter_mut().enumerate() {
                *v = (*v - mean[i]) / std[i].max(1e-12);
            }
        }

        for layer in &self.layers {
            x = layer
                .weights
                .iter()
                .zip(&layer.bias)
                .map(|(row, b)| {
                    let sum = row.iter().zip(&x).fold(*b, |acc, (w, xi)| acc + w * xi);
                    apply_activation(sum, layer.activation)
                })
                .collect();
        }

        Ok(x)
    }
}

fn default_threshold() -> f64 {
    0.5
}

/// Dense network plus the decision rule that turns its output into a label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseClassifier {
    #[serde(flatten)]
    pub network: DenseNetwork,

    /// Positive-class cutoff for single-output networks; a score must exceed it.
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Optional free-form metadata (versioning, training info, etc).
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl DenseClassifier {
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.network.validate()?;
        if !self.threshold.is_finite() {
            return Err("threshold must be finite".to_string());
        }
        Ok(())
    }
}

impl Classifier for DenseClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        check_input(features, self.network.input_dim)?;
        let out = self.network.forward(features.as_slice())?;
        if out.iter().any(|v| !v.is_finite()) {
            return Err(WineError::Internal(
                "DenseNetwork produced non-finite output".to_string(),
            ));
        }
        if let [score] = out.as_slice() {
            return Ok(if *score > self.threshold { 1.0 } else { 0.0 });
        }
        argmax(&out)
            .map(|i| i as f64)
            .ok_or_else(|| WineError::Internal("DenseNetwork produced no output".to_string()))
    }

    fn kind(&self) -> &'static str {
        "dense"
    }

    fn classes(&self) -> Vec<f64> {
        match self.network.output_dim() {
            1 => vec![0.0, 1.0],
            n => (0..n).map(|i| i as f64).collect(),
        }
    }
}

fn apply_activation(x: f64, act: Activation) -> f64 {
    match act {
        Activation::Linear => x,
        Activation::Relu => x.max(0.0),
        Activation::Tanh => x.tanh(),
        Activation::Sigmoid => sigmoid(x),
    }
}

fn sigmoid(x: f64) -> f64 {
    // Numerically-stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;

    /// Logistic model keyed on alcohol only.
    fn alcohol_model() -> DenseClassifier {
        let mut w = vec![0.0; FEATURE_COUNT];
        w[10] = 1.0;
        DenseClassifier {
            network: DenseNetwork {
                input_dim: FEATURE_COUNT,
                input_mean: None,
                input_std: None,
                layers: vec![DenseLayer {
                    weights: vec![w],
                    bias: vec![-10.5],
                    activation: Activation::Sigmoid,
                }],
            },
            threshold: 0.5,
            metadata: serde_json::json!({}),
        }
    }

    fn sample(alcohol: f64) -> FeatureVector {
        FeatureVector::new([7.4, 0.7, 0.0, 1.9, 0.076, 11.0, 34.0, 0.9978, 3.51, 0.56, alcohol])
    }

    #[test]
    fn sigmoid_output_is_thresholded() {
        let model = alcohol_model();
        model.validate().unwrap();
        assert_eq!(model.predict(&sample(9.4)).unwrap(), 0.0);
        assert_eq!(model.predict(&sample(12.8)).unwrap(), 1.0);
        assert_eq!(model.classes(), vec![0.0, 1.0]);
    }

    #[test]
    fn score_at_threshold_is_negative() {
        let model = alcohol_model();
        // sigmoid(0) == 0.5 exactly
        assert_eq!(model.predict(&sample(10.5)).unwrap(), 0.0);
        assert_eq!(model.predict(&sample(10.500001)).unwrap(), 1.0);
    }

    #[test]
    fn multi_output_uses_argmax() {
        let mut model = alcohol_model();
        let mut neg = vec![0.0; FEATURE_COUNT];
        neg[10] = -1.0;
        let mut pos = vec![0.0; FEATURE_COUNT];
        pos[10] = 1.0;
        model.network.layers = vec![DenseLayer {
            weights: vec![neg, pos],
            bias: vec![10.5, -10.5],
            activation: Activation::Linear,
        }];
        model.validate().unwrap();
        assert_eq!(model.predict(&sample(9.0)).unwrap(), 0.0);
        assert_eq!(model.predict(&sample(13.0)).unwrap(), 1.0);
    }

    #[test]
    fn normalization_is_applied() {
        let mut model = alcohol_model();
        model.network.input_mean = Some(vec![0.0; FEATURE_COUNT]);
        let mut std = vec![1.0; FEATURE_COUNT];
        std[10] = 2.0;
        model.network.input_std = Some(std);
        model.validate().unwrap();
        // 12.8 / 2 = 6.4 < 10.5
        assert_eq!(model.predict(&sample(12.8)).unwrap(), 0.0);
    }

    #[test]
    fn validates_shapes() {
        let mut bad = alcohol_model();
        bad.network.layers[0].weights = vec![vec![1.0, 2.0]];
        assert!(bad.validate().is_err());

        let mut bad = alcohol_model();
        bad.network.input_mean = Some(vec![0.0; FEATURE_COUNT]);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn rejects_nan_input() {
        let model = alcohol_model();
        assert!(model.predict(&sample(f64::NAN)).is_err());
    }

    #[test]
    fn parses_flat_json_artifact() {
        let raw = serde_json::json!({
            "input_dim": 11,
            "layers": [{
                "weights": [[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]],
                "bias": [-10.5],
                "activation": "sigmoid"
            }],
            "metadata": {"version": 3}
        });
        let model: DenseClassifier = serde_json::from_value(raw).unwrap();
        assert_eq!(model.threshold, 0.5);
        assert_eq!(model.network.layers[0].activation, Activation::Sigmoid);
        assert_eq!(model.predict(&sample(11.0)).unwrap(), 1.0);
    }
}
