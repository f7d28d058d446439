//! Prediction dispatch
//!
//! Routes a feature record to the model for its mode, or to the fallback
//! heuristic when that model is not loaded.

use rand::Rng;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{fallback::FallbackHeuristic, registry::ModelRegistry, ModelSlot};
use crate::domain::{FeatureRecord, PredictionError};

#[derive(Debug, Clone)]
pub struct PredictionDispatcher {
    registry: Arc<ModelRegistry>,
    fallback: FallbackHeuristic,
}

impl PredictionDispatcher {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self {
            registry,
            fallback: FallbackHeuristic::new(),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Non-negative demand estimate for `record`.
    pub fn predict(&self, record: &FeatureRecord) -> Result<f64, PredictionError> {
        self.predict_with_rng(record, &mut rand::thread_rng())
    }

    /// As [`predict`](Self::predict), drawing fallback noise from `rng`.
    pub fn predict_with_rng<R: Rng + ?Sized>(
        &self,
        record: &FeatureRecord,
        rng: &mut R,
    ) -> Result<f64, PredictionError> {
        let slot = ModelSlot::for_mode(record.mode());
        let Some(model) = self.registry.get(slot) else {
            let value = self.fallback.estimate(record, rng);
            debug!(slot = %slot, value, "model not loaded; using fallback heuristic");
            return Ok(value);
        };

        let input = match record {
            FeatureRecord::Environment(f) => f.to_model_input(),
            FeatureRecord::Date(f) => {
                // No forecast reading for the day: the model would extrapolate
                if !f.is_forecastable() {
                    return Err(PredictionError::OutOfForecastWindow { date: f.target_date });
                }
                f.to_model_input()
            }
        };

        let prediction = model.predict(&input).map_err(|e| {
            warn!(slot = %slot, error = %format!("{e:#}"), "model evaluation failed");
            PredictionError::Model {
                model_id: model.metadata().model_id.clone(),
                message: e.to_string(),
            }
        })?;

        debug!(slot = %slot, value = prediction.value, "model prediction");
        Ok(prediction.value.max(0.0))
    }
}
