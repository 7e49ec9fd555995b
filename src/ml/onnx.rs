//! ONNX classifier (pure Rust via `tract-onnx`).
//!
//! Lets a model exported from another toolchain run without Python in
//! production. The first output is read as either a single label or a row of
//! class scores.

use std::path::Path;

use tract_onnx::prelude::*;

use super::{argmax, check_input, Classifier};
use crate::error::{Result, WineError};
use crate::features::FeatureVector;

pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    input_dim: usize,
    output_dim: usize,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("input_dim", &self.input_dim)
            .field("output_dim", &self.output_dim)
            .finish()
    }
}

impl OnnxClassifier {
    /// Load an ONNX model and specialize it to a fixed `[1, input_dim]` f32 input.
    pub fn load(path: &Path, input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(WineError::Validation("input_dim must be > 0".to_string()));
        }

        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| WineError::Artifact(format!("onnx load failed: {e}")))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, input_dim)),
            )
            .map_err(|e| WineError::Artifact(format!("onnx input fact failed: {e}")))?;

        let plan = model
            .into_optimized()
            .map_err(|e| WineError::Artifact(format!("onnx optimize failed: {e}")))?
            .into_runnable()
            .map_err(|e| WineError::Artifact(format!("onnx runnable failed: {e}")))?;

        let mut classifier = Self {
            plan,
            input_dim,
            output_dim: 0,
        };

        // Infer output_dim by running a dummy forward pass.
        let dummy = classifier.run(&vec![0.0; input_dim])?;
        if dummy.is_empty() {
            return Err(WineError::Artifact(
                "onnx output has zero elements".to_string(),
            ));
        }
        classifier.output_dim = dummy.len();
        Ok(classifier)
    }

    fn run(&self, input: &[f32]) -> Result<Vec<f32>> {
        let tensor = tract_ndarray::Array2::<f32>::from_shape_vec((1, self.input_dim), input.to_vec())
            .map_err(|e| WineError::Internal(format!("onnx input reshape failed: {e}")))?
            .into_tvalue();

        let outputs = self
            .plan
            .run(tvec!(tensor))
            .map_err(|e| WineError::Internal(format!("onnx run failed: {e}")))?;
        let first = outputs
            .first()
            .ok_or_else(|| WineError::Internal("onnx produced no outputs".to_string()))?;

        // Label outputs are commonly int64; cast everything to f32.
        let values = first
            .cast_to::<f32>()
            .map_err(|e| WineError::Internal(format!("onnx output decode failed: {e}")))?;
        let arr = values
            .to_array_view::<f32>()
            .map_err(|e| WineError::Internal(format!("onnx output decode failed: {e}")))?;
        Ok(arr.iter().copied().collect())
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        check_input(features, self.input_dim)?;
        let input: Vec<f32> = features.as_slice().iter().map(|v| *v as f32).collect();
        let out: Vec<f64> = self.run(&input)?.into_iter().map(f64::from).collect();
        match out.as_slice() {
            [label] => Ok(*label),
            scores => argmax(scores)
                .map(|i| i as f64)
                .ok_or_else(|| WineError::Internal("onnx produced no scores".to_string())),
        }
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn classes(&self) -> Vec<f64> {
        match self.output_dim {
            1 => vec![0.0, 1.0],
            n => (0..n).map(|i| i as f64).collect(),
        }
    }
}
