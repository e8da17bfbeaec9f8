//! Tree-ensemble inference over exported decision forests.
//!
//! Artifacts are JSON exports of fitted random forests. Each tree is stored
//! as parallel node arrays (`children_left`, `children_right`, `feature`,
//! `threshold`, `value`); a node is a leaf when its left child is `-1`.
//! Rows go left when `x[feature] <= threshold`.
//!
//! An ensemble is a list of estimators whose outputs are concatenated:
//!
//! - a *classifier* estimator yields one value, the class label whose
//!   averaged, normalized leaf distribution is highest (first on ties);
//! - a *regressor* estimator yields `n_outputs` values, the mean leaf vector.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ArtifactError, ModelError};

/// A fitted model mapping one feature row to a vector of outputs.
pub trait TabularModel: Send + Sync {
    /// Number of input features expected per row.
    fn n_features(&self) -> usize;

    /// Number of values produced per row.
    fn n_outputs(&self) -> usize;

    fn predict(&self, row: &[f64]) -> Result<Vec<f64>, ModelError>;
}

/// Marker in `children_left` / `children_right` for "no child".
const LEAF: i64 = -1;

/// One decision tree in array form.
#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl Tree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Check array shapes and that every child index points forward, which
    /// also rules out cycles.
    fn validate(&self, n_features: usize, leaf_width: usize) -> Result<(), ArtifactError> {
        let n = self.node_count();
        if n == 0 {
            return Err(ArtifactError::Invalid("tree has no nodes".into()));
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(ArtifactError::Invalid(format!(
                "tree node arrays disagree in length (expected {n})"
            )));
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left == LEAF {
                if self.value[node].len() != leaf_width {
                    return Err(ArtifactError::Invalid(format!(
                        "leaf {node} has {} values, expected {leaf_width}",
                        self.value[node].len()
                    )));
                }
                continue;
            }
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(ArtifactError::Invalid(format!(
                        "node {node} has out-of-order child {child}"
                    )));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(ArtifactError::Invalid(format!(
                    "node {node} splits on feature {feature}, model has {n_features}"
                )));
            }
        }
        Ok(())
    }

    /// Leaf values reached by `row`. Assumes the tree was validated.
    fn leaf(&self, row: &[f64]) -> &[f64] {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        &self.value[node]
    }
}

/// One member of an ensemble.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    Classifier { classes: Vec<f64>, trees: Vec<Tree> },
    Regressor { n_outputs: usize, trees: Vec<Tree> },
}

impl Estimator {
    fn trees(&self) -> &[Tree] {
        match self {
            Self::Classifier { trees, .. } | Self::Regressor { trees, .. } => trees,
        }
    }

    fn n_outputs(&self) -> usize {
        match self {
            Self::Classifier { .. } => 1,
            Self::Regressor { n_outputs, .. } => *n_outputs,
        }
    }

    fn leaf_width(&self) -> usize {
        match self {
            Self::Classifier { classes, .. } => classes.len(),
            Self::Regressor { n_outputs, .. } => *n_outputs,
        }
    }

    fn predict_into(&self, row: &[f64], out: &mut Vec<f64>) {
        let trees = self.trees();
        let mut acc = vec![0.0; self.leaf_width()];
        for tree in trees {
            let leaf = tree.leaf(row);
            let scale = match self {
                // Leaves may hold raw class counts; normalize per tree.
                Self::Classifier { .. } => {
                    let total: f64 = leaf.iter().sum();
                    if total > 0.0 {
                        1.0 / total
                    } else {
                        0.0
                    }
                }
                Self::Regressor { .. } => 1.0,
            };
            for (a, v) in acc.iter_mut().zip(leaf) {
                *a += v * scale;
            }
        }
        let count = trees.len() as f64;

        match self {
            Self::Classifier { classes, .. } => {
                let mut best = 0;
                for (i, p) in acc.iter().enumerate() {
                    if *p > acc[best] {
                        best = i;
                    }
                }
                out.push(classes[best]);
            }
            Self::Regressor { .. } => out.extend(acc.iter().map(|v| v / count)),
        }
    }
}

/// A validated collection of estimators sharing one feature space.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawEnsemble")]
pub struct TreeEnsemble {
    n_features: usize,
    estimators: Vec<Estimator>,
}

#[derive(Deserialize)]
struct RawEnsemble {
    n_features: usize,
    estimators: Vec<Estimator>,
}

impl TryFrom<RawEnsemble> for TreeEnsemble {
    type Error = ArtifactError;

    fn try_from(raw: RawEnsemble) -> Result<Self, Self::Error> {
        Self::new(raw.n_features, raw.estimators)
    }
}

impl TreeEnsemble {
    pub fn new(n_features: usize, estimators: Vec<Estimator>) -> Result<Self, ArtifactError> {
        if estimators.is_empty() {
            return Err(ArtifactError::Invalid("ensemble has no estimators".into()));
        }
        for (i, estimator) in estimators.iter().enumerate() {
            if estimator.trees().is_empty() {
                return Err(ArtifactError::Invalid(format!("estimator {i} has no trees")));
            }
            if estimator.leaf_width() == 0 {
                return Err(ArtifactError::Invalid(format!("estimator {i} has no outputs")));
            }
            for tree in estimator.trees() {
                tree.validate(n_features, estimator.leaf_width())?;
            }
        }
        Ok(Self {
            n_features,
            estimators,
        })
    }

    /// Load and validate an ensemble from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ArtifactError::Json {
            path: display,
            source,
        })
    }
}

impl TabularModel for TreeEnsemble {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_outputs(&self) -> usize {
        self.estimators.iter().map(Estimator::n_outputs).sum()
    }

    fn predict(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureCount {
                expected: self.n_features,
                got: row.len(),
            });
        }
        let mut out = Vec::with_capacity(self.n_outputs());
        for estimator in &self.estimators {
            estimator.predict_into(row, &mut out);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    /// Stump on feature 0 at 10.0.
    fn stump(left: Vec<f64>, right: Vec<f64>) -> serde_json::Value {
        json!({
            "children_left": [1, -1, -1],
            "children_right": [2, -1, -1],
            "feature": [0, -2, -2],
            "threshold": [10.0, -2.0, -2.0],
            "value": [[], left, right],
        })
    }

    fn ensemble(value: serde_json::Value) -> Result<TreeEnsemble, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn classifier_averages_normalized_distributions() {
        let model = ensemble(json!({
            "n_features": 2,
            "estimators": [{
                "kind": "classifier",
                "classes": [0.0, 1.0, 2.0],
                "trees": [
                    stump(vec![8.0, 1.0, 1.0], vec![0.0, 1.0, 9.0]),
                    // Fractions and counts mix freely after normalization.
                    stump(vec![0.2, 0.8, 0.0], vec![0.0, 0.4, 0.6]),
                ],
            }],
        }))
        .unwrap();

        // Left: class 0 averages (0.8 + 0.2) / 2 = 0.5, class 1 (0.1 + 0.8) / 2 = 0.45.
        assert_eq!(model.predict(&[3.0, 0.0]).unwrap(), vec![0.0]);
        assert_eq!(model.predict(&[30.0, 0.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn ties_resolve_to_first_class() {
        let model = ensemble(json!({
            "n_features": 1,
            "estimators": [{
                "kind": "classifier",
                "classes": [3.0, 7.0],
                "trees": [stump(vec![1.0, 1.0], vec![1.0, 1.0])],
            }],
        }))
        .unwrap();
        assert_eq!(model.predict(&[0.0]).unwrap(), vec![3.0]);
    }

    #[test]
    fn regressor_averages_leaf_vectors() {
        let model = ensemble(json!({
            "n_features": 1,
            "estimators": [{
                "kind": "regressor",
                "n_outputs": 2,
                "trees": [
                    stump(vec![1.0, 2.0], vec![3.0, 4.0]),
                    stump(vec![3.0, 4.0], vec![5.0, 6.0]),
                ],
            }],
        }))
        .unwrap();
        assert_eq!(model.predict(&[5.0]).unwrap(), vec![2.0, 3.0]);
        assert_eq!(model.predict(&[10.0]).unwrap(), vec![2.0, 3.0], "threshold goes left");
        assert_eq!(model.predict(&[10.5]).unwrap(), vec![4.0, 5.0]);
    }

    #[test]
    fn outputs_concatenate_across_estimators() {
        let model = ensemble(json!({
            "n_features": 1,
            "estimators": [
                { "kind": "classifier", "classes": [0.0, 1.0], "trees": [stump(vec![1.0, 0.0], vec![0.0, 1.0])] },
                { "kind": "regressor", "n_outputs": 1, "trees": [stump(vec![42.0], vec![7.0])] },
            ],
        }))
        .unwrap();
        assert_eq!(model.n_outputs(), 2);
        assert_eq!(model.predict(&[20.0]).unwrap(), vec![1.0, 7.0]);
    }

    #[test]
    fn wrong_feature_count_is_rejected() {
        let model = ensemble(json!({
            "n_features": 3,
            "estimators": [{ "kind": "regressor", "n_outputs": 1, "trees": [stump(vec![1.0], vec![2.0])] }],
        }))
        .unwrap();
        assert_matches!(
            model.predict(&[1.0]),
            Err(ModelError::FeatureCount { expected: 3, got: 1 })
        );
    }

    #[test]
    fn backward_child_is_rejected_at_load() {
        let result = ensemble(json!({
            "n_features": 1,
            "estimators": [{
                "kind": "regressor",
                "n_outputs": 1,
                "trees": [{
                    "children_left": [1, 0],
                    "children_right": [1, -1],
                    "feature": [0, 0],
                    "threshold": [0.0, 0.0],
                    "value": [[], [1.0]],
                }],
            }],
        }));
        assert!(result.is_err());
    }

    #[test]
    fn split_on_unknown_feature_is_rejected() {
        let mut tree = stump(vec![1.0], vec![2.0]);
        tree["feature"] = json!([4, -2, -2]);
        let result = ensemble(json!({
            "n_features": 2,
            "estimators": [{ "kind": "regressor", "n_outputs": 1, "trees": [tree] }],
        }));
        assert!(result.is_err());
    }

    #[test]
    fn leaf_width_must_match_outputs() {
        let result = TreeEnsemble::new(
            1,
            vec![Estimator::Regressor {
                n_outputs: 2,
                trees: vec![serde_json::from_value(stump(vec![1.0], vec![2.0])).unwrap()],
            }],
        );
        assert_matches!(result, Err(ArtifactError::Invalid(_)));
    }
}
