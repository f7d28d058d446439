//! ML Model Definitions
//!
//! The predictor capability shared by every loaded artifact, plus the
//! linear regression artifact.

use super::{FeatureVector, ModelMetadata, ModelType, Prediction};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Trait for ML models
#[cfg_attr(test, mockall::automock)]
pub trait MLModel: Send + Sync {
    /// Predict a value from features
    fn predict(&self, features: &FeatureVector) -> Result<Prediction>;

    /// Get model metadata
    fn metadata(&self) -> &ModelMetadata;

    /// Get model type
    fn model_type(&self) -> ModelType {
        self.metadata().model_type
    }

    /// Structural checks run once when the artifact is loaded
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Simple Linear Regression Model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegressionModel {
    pub metadata: ModelMetadata,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegressionModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64, metadata: ModelMetadata) -> Self {
        Self {
            metadata,
            coefficients,
            intercept,
        }
    }
}

impl MLModel for LinearRegressionModel {
    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        if features.len() != self.coefficients.len() {
            anyhow::bail!(
                "Feature count mismatch: expected {}, got {}",
                self.coefficients.len(),
                features.len()
            );
        }

        let prediction: f64 = features
            .features
            .iter()
            .zip(self.coefficients.iter())
            .map(|(f, c)| f * c)
            .sum::<f64>()
            + self.intercept;

        Ok(Prediction::new(prediction))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn validate(&self) -> Result<()> {
        if self.coefficients.len() != self.metadata.feature_names.len() {
            anyhow::bail!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.metadata.feature_names.len()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(names: &[&str]) -> ModelMetadata {
        ModelMetadata {
            model_id: "test".to_string(),
            model_type: ModelType::LinearRegression,
            version: "0.1.0".to_string(),
            trained_at: None,
            training_samples: 100,
            feature_names: names.iter().map(|s| s.to_string()).collect(),
            categorical_features: vec![],
        }
    }

    #[test]
    fn test_linear_regression_predict() {
        let model = LinearRegressionModel::new(vec![2.0, 3.0, 1.0], 5.0, metadata(&["f1", "f2", "f3"]));

        let features = FeatureVector::new(
            vec![1.0, 2.0, 3.0],
            vec!["f1".to_string(), "f2".to_string(), "f3".to_string()],
        )
        .unwrap();

        let prediction = model.predict(&features).unwrap();
        // 2*1 + 3*2 + 1*3 + 5 = 2 + 6 + 3 + 5 = 16
        assert_eq!(prediction.value, 16.0);
        assert_eq!(model.model_type(), ModelType::LinearRegression);
    }

    #[test]
    fn test_linear_regression_rejects_wrong_width() {
        let model = LinearRegressionModel::new(vec![2.0, 3.0], 0.0, metadata(&["f1", "f2"]));
        let features = FeatureVector::new(vec![1.0], vec!["f1".to_string()]).unwrap();
        assert!(model.predict(&features).is_err());
    }

    #[test]
    fn test_linear_regression_validate() {
        assert!(LinearRegressionModel::new(vec![1.0], 0.0, metadata(&["f1"])).validate().is_ok());
        assert!(LinearRegressionModel::new(vec![1.0], 0.0, metadata(&["f1", "f2"]))
            .validate()
            .is_err());
    }
}
