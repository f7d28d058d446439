//! Machine Learning Module
//!
//! Serving-side ML for demand prediction:
//! - Externally trained model artifacts (linear and tree ensembles)
//! - Static input schemas per model slot
//! - Model registry loaded once at startup
//! - Dispatch with a deterministic fallback heuristic
//!
//! Training happens offline; this crate only evaluates exported artifacts.

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod dispatcher;
pub mod ensemble;
pub mod fallback;
pub mod models;
pub mod registry;
pub mod schema;

pub use dispatcher::PredictionDispatcher;
pub use fallback::FallbackHeuristic;
pub use models::MLModel;
pub use registry::{ModelRegistry, ModelSlot};
pub use schema::ModelSchema;

/// ML Model Type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    LinearRegression,
    GradientBoosting,
}

/// ML Model Metadata, as exported alongside an artifact
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMetadata {
    pub model_id: String,
    pub model_type: ModelType,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub trained_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub training_samples: usize,
    /// Input columns in the order the model was trained on
    pub feature_names: Vec<String>,
    /// Columns the model treats as categorical
    #[serde(default)]
    pub categorical_features: Vec<String>,
}

/// Feature Vector for ML models
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector {
    pub features: Vec<f64>,
    pub feature_names: Vec<String>,
}

impl FeatureVector {
    pub fn new(features: Vec<f64>, feature_names: Vec<String>) -> Result<Self> {
        if features.len() != feature_names.len() {
            anyhow::bail!(
                "Feature count mismatch: {} features, {} names",
                features.len(),
                feature_names.len()
            );
        }
        Ok(Self {
            features,
            feature_names,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Value of a named feature
    pub fn get(&self, name: &str) -> Option<f64> {
        self.feature_names
            .iter()
            .position(|n| n == name)
            .map(|i| self.features[i])
    }
}

/// ML Prediction Result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    pub value: f64,
}

impl Prediction {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}
