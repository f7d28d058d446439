//! Gradient-boosted tree ensemble
//!
//! Evaluates an additive ensemble of binary regression trees exported in the
//! layout of LightGBM's `dump_model()` (`tree_info[].tree_structure`).
//! Numerical splits compare `value <= threshold`; categorical splits test
//! membership of the integer code in a `"a||b||c"` category list.
//!
//! Models trained on pandas `category` columns carry a `pandas_categorical`
//! table and their categorical thresholds are positions in that table, so
//! raw values are encoded before the trees are walked.

use super::{models::MLModel, FeatureVector, ModelMetadata, Prediction};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// Tree ensemble regression model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsembleModel {
    pub metadata: ModelMetadata,
    /// Constant added to the summed leaf outputs
    #[serde(default)]
    pub base_score: f64,
    pub tree_info: Vec<Tree>,
    /// One category list per categorical feature, in feature order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pandas_categorical: Option<Vec<Vec<Value>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    #[serde(default)]
    pub tree_index: usize,
    pub tree_structure: TreeNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split(SplitNode),
    Leaf { leaf_value: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitNode {
    pub split_feature: usize,
    pub threshold: Threshold,
    #[serde(default = "default_decision")]
    pub decision_type: String,
    #[serde(default = "default_true")]
    pub default_left: bool,
    pub left_child: Box<TreeNode>,
    pub right_child: Box<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Value(f64),
    Categories(String),
}

fn default_decision() -> String {
    "<=".to_string()
}

fn default_true() -> bool {
    true
}

impl SplitNode {
    fn goes_left(&self, value: f64) -> Result<bool> {
        match (self.decision_type.as_str(), &self.threshold) {
            // missing or unseen category is never in the left set
            ("==", _) if value.is_nan() => Ok(false),
            _ if value.is_nan() => Ok(self.default_left),
            ("<=", Threshold::Value(t)) => Ok(value <= *t),
            ("==", Threshold::Categories(list)) => {
                let code = value.trunc() as i64;
                Ok(parse_categories(list)?.contains(&code))
            }
            ("==", Threshold::Value(t)) => Ok(value.trunc() == t.trunc()),
            (decision, _) => anyhow::bail!("unsupported split decision '{decision}'"),
        }
    }
}

fn parse_categories(list: &str) -> Result<Vec<i64>> {
    list.split("||")
        .map(|c| {
            c.trim()
                .parse::<i64>()
                .with_context(|| format!("invalid category '{c}' in split"))
        })
        .collect()
}

impl TreeNode {
    fn evaluate(&self, features: &[f64]) -> Result<f64> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { leaf_value } => return Ok(*leaf_value),
                TreeNode::Split(split) => {
                    let value = features.get(split.split_feature).copied().with_context(|| {
                        format!("split references feature {}", split.split_feature)
                    })?;
                    node = if split.goes_left(value)? {
                        split.left_child.as_ref()
                    } else {
                        split.right_child.as_ref()
                    };
                }
            }
        }
    }

    fn check(&self, n_features: usize) -> Result<()> {
        match self {
            TreeNode::Leaf { leaf_value } if leaf_value.is_finite() => Ok(()),
            TreeNode::Leaf { leaf_value } => anyhow::bail!("non-finite leaf value {leaf_value}"),
            TreeNode::Split(split) => {
                if split.split_feature >= n_features {
                    anyhow::bail!(
                        "split on feature {} but model has {} features",
                        split.split_feature,
                        n_features
                    );
                }
                match (split.decision_type.as_str(), &split.threshold) {
                    ("<=", Threshold::Value(_)) | ("==", Threshold::Value(_)) => {}
                    ("==", Threshold::Categories(list)) => {
                        parse_categories(list)?;
                    }
                    (decision, _) => anyhow::bail!("unsupported split decision '{decision}'"),
                }
                split.left_child.check(n_features)?;
                split.right_child.check(n_features)
            }
        }
    }
}

fn category_value(category: &Value) -> Option<f64> {
    match category {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl TreeEnsembleModel {
    fn categorical_indices(&self) -> Vec<usize> {
        self.metadata
            .feature_names
            .iter()
            .enumerate()
            .filter(|(_, name)| self.metadata.categorical_features.contains(name))
            .map(|(i, _)| i)
            .collect()
    }

    /// Replace raw categorical values by their category codes. Values missing
    /// from the table become NaN.
    fn encode<'a>(&self, features: &'a [f64]) -> Cow<'a, [f64]> {
        let Some(tables) = &self.pandas_categorical else {
            return Cow::Borrowed(features);
        };
        let mut encoded = features.to_vec();
        for (index, table) in self.categorical_indices().into_iter().zip(tables) {
            let value = encoded[index];
            encoded[index] = table
                .iter()
                .position(|category| category_value(category) == Some(value))
                .map_or(f64::NAN, |code| code as f64);
        }
        Cow::Owned(encoded)
    }
}

impl MLModel for TreeEnsembleModel {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        let expected = self.metadata.feature_names.len();
        if features.len() != expected {
            anyhow::bail!(
                "Feature count mismatch: expected {}, got {}",
                expected,
                features.len()
            );
        }

        let encoded = self.encode(&features.features);
        let mut value = self.base_score;
        for tree in &self.tree_info {
            value += tree
                .tree_structure
                .evaluate(&encoded)
                .with_context(|| format!("tree {}", tree.tree_index))?;
        }
        Ok(Prediction::new(value))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn validate(&self) -> Result<()> {
        if self.tree_info.is_empty() {
            anyhow::bail!("ensemble has no trees");
        }
        if let Some(tables) = &self.pandas_categorical {
            let categorical = self.categorical_indices().len();
            if tables.len() != categorical {
                anyhow::bail!(
                    "pandas_categorical has {} tables for {} categorical features",
                    tables.len(),
                    categorical
                );
            }
            if let Some(bad) = tables.iter().flatten().find(|c| category_value(c).is_none()) {
                anyhow::bail!("category {bad} is not numeric");
            }
        }

        let n_features = self.metadata.feature_names.len();
        for tree in &self.tree_info {
            tree.tree_structure
                .check(n_features)
                .with_context(|| format!("tree {}", tree.tree_index))?;
        }
        Ok(())
    }
}
