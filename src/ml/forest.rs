//! Decision forest classifier.
//!
//! Trees use the scikit-learn array layout: node 0 is the root, a split sends
//! a sample left when `x[feature] <= threshold`, and a leaf carries per-class
//! weights. The forest averages each tree's normalized class distribution and
//! returns the label with the highest mean probability.

use serde::{Deserialize, Serialize};

use super::{argmax, check_input, Classifier};
use crate::error::{Result, WineError};
use crate::features::FeatureVector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize, n_classes: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {idx} splits on feature {feature}, model has {n_features}"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {idx} threshold is not finite"));
                    }
                    // Children must come after their parent; this rules out cycles.
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {idx} has invalid child index {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {idx} has {} class weights, expected {n_classes}",
                            value.len()
                        ));
                    }
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) {
                        return Err(format!("leaf {idx} weights must be finite and >= 0"));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {idx} weights sum to zero"));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_for(&self, x: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if x[*feature] <= *threshold { *left } else { *right },
                TreeNode::Leaf { value } => return value,
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestClassifier {
    pub n_features: usize,
    /// Label emitted for each class index.
    pub classes: Vec<f64>,
    pub trees: Vec<DecisionTree>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ForestClassifier {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.n_features == 0 {
            return Err("n_features must be > 0".to_string());
        }
        if self.classes.is_empty() {
            return Err("classes must not be empty".to_string());
        }
        if self.classes.iter().any(|c| !c.is_finite()) {
            return Err("classes must be finite".to_string());
        }
        if self.trees.is_empty() {
            return Err("trees must not be empty".to_string());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.classes.len())
                .map_err(|e| format!("tree[{t}]: {e}"))?;
        }
        Ok(())
    }

    /// Mean class probabilities across all trees.
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>> {
        check_input(features, self.n_features)?;
        let x = features.as_slice();
        let mut proba = vec![0.0_f64; self.classes.len()];
        for tree in &self.trees {
            let leaf = tree.leaf_for(x);
            let total: f64 = leaf.iter().sum();
            for (p, w) in proba.iter_mut().zip(leaf) {
                *p += w / total;
            }
        }
        let n = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        Ok(proba)
    }
}

impl Classifier for ForestClassifier {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let proba = self.predict_proba(features)?;
        argmax(&proba)
            .map(|i| self.classes[i])
            .ok_or_else(|| WineError::Internal("forest produced no class scores".to_string()))
    }

    fn kind(&self) -> &'static str {
        "forest"
    }

    fn classes(&self) -> Vec<f64> {
        self.classes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(feature: usize, threshold: f64, left: usize, right: usize) -> TreeNode {
        TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        }
    }

    fn leaf(bad: f64, good: f64) -> TreeNode {
        TreeNode::Leaf {
            value: vec![bad, good],
        }
    }

    /// Three stumps: alcohol, volatile acidity, sulphates.
    fn forest() -> ForestClassifier {
        ForestClassifier {
            n_features: 11,
            classes: vec![0.0, 1.0],
            trees: vec![
                DecisionTree {
                    nodes: vec![split(10, 10.5, 1, 2), leaf(9.0, 1.0), leaf(2.0, 8.0)],
                },
                DecisionTree {
                    nodes: vec![split(1, 0.5, 1, 2), leaf(3.0, 7.0), leaf(9.0, 1.0)],
                },
                DecisionTree {
                    nodes: vec![split(9, 0.65, 1, 2), leaf(6.0, 4.0), leaf(1.0, 3.0)],
                },
            ],
            metadata: serde_json::json!({}),
        }
    }

    fn sample(volatile: f64, sulphates: f64, alcohol: f64) -> FeatureVector {
        FeatureVector::new([7.4, volatile, 0.0, 1.9, 0.076, 11.0, 34.0, 0.9978, 3.51, sulphates, alcohol])
    }

    #[test]
    fn averages_tree_probabilities() {
        let model = forest();
        model.validate().unwrap();

        let reference = sample(0.7, 0.56, 9.4);
        let proba = model.predict_proba(&reference).unwrap();
        // (0.9 + 0.9 + 0.6) / 3 for the bad class
        assert!((proba[0] - 0.8).abs() < 1e-12);
        assert_eq!(model.predict(&reference).unwrap(), 0.0);

        let good = sample(0.3, 0.8, 12.0);
        assert_eq!(model.predict(&good).unwrap(), 1.0);
    }

    #[test]
    fn threshold_boundary_goes_left() {
        let model = forest();
        let at = model.predict_proba(&sample(0.5, 0.65, 10.5)).unwrap();
        // left leaves of all three trees: 0.9, 0.3, 0.6 bad
        assert!((at[0] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn custom_labels_are_returned() {
        let mut model = forest();
        model.classes = vec![3.0, 7.0];
        assert_eq!(model.predict(&sample(0.3, 0.8, 12.0)).unwrap(), 7.0);
        assert_eq!(model.classes(), vec![3.0, 7.0]);
    }

    #[test]
    fn rejects_backward_child_index() {
        let mut model = forest();
        model.trees[0].nodes[0] = split(10, 10.5, 0, 2);
        assert!(model.validate().unwrap_err().contains("invalid child index 0"));
    }

    #[test]
    fn rejects_out_of_range_feature() {
        let mut model = forest();
        model.trees[1].nodes[0] = split(11, 0.5, 1, 2);
        assert!(model.validate().is_err());
    }

    #[test]
    fn rejects_leaf_class_mismatch() {
        let mut model = forest();
        model.trees[2].nodes[1] = TreeNode::Leaf { value: vec![1.0] };
        assert!(model.validate().is_err());
    }

    #[test]
    fn node_json_is_untagged() {
        let nodes: Vec<TreeNode> = serde_json::from_str(
            r#"[{"feature": 2, "threshold": 0.25, "left": 1, "right": 2},
                {"value": [1, 0]}, {"value": [0, 1]}]"#,
        )
        .unwrap();
        assert_eq!(nodes[0], split(2, 0.25, 1, 2));
        assert_eq!(nodes[2], leaf(0.0, 1.0));
    }
}
