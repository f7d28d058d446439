//! Model registry
//!
//! Holds the two optional predictor slots. Artifacts are loaded once at
//! startup; a missing, unreadable or schema-incompatible artifact leaves
//! its slot empty and requests for that mode are served by the fallback
//! heuristic.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::{
    ensemble::TreeEnsembleModel,
    models::{LinearRegressionModel, MLModel},
    schema::{ModelSchema, DATE_SCHEMA, ENVIRONMENT_SCHEMA},
};
use crate::config::ModelsConfig;
use crate::domain::PredictionMode;

/// Named predictor slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelSlot {
    /// Environment-driven model
    Lgbm,
    /// Date-driven model
    Forecast,
}

impl ModelSlot {
    pub fn id(&self) -> &'static str {
        match self {
            ModelSlot::Lgbm => "lgbm_model",
            ModelSlot::Forecast => "forecast_model",
        }
    }

    pub fn schema(&self) -> &'static ModelSchema {
        match self {
            ModelSlot::Lgbm => &ENVIRONMENT_SCHEMA,
            ModelSlot::Forecast => &DATE_SCHEMA,
        }
    }

    pub fn for_mode(mode: PredictionMode) -> Self {
        match mode {
            PredictionMode::Env => ModelSlot::Lgbm,
            PredictionMode::Date => ModelSlot::Forecast,
        }
    }
}

impl fmt::Display for ModelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// On-disk artifact, tagged by `kind`.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    Linear(LinearRegressionModel),
    TreeEnsemble(TreeEnsembleModel),
}

impl ModelArtifact {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse model artifact")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid artifact {}", path.display()))
    }

    pub fn into_model(self) -> Arc<dyn MLModel> {
        match self {
            ModelArtifact::Linear(model) => Arc::new(model),
            ModelArtifact::TreeEnsemble(model) => Arc::new(model),
        }
    }
}

/// Read-only after startup; shared by every request.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    lgbm: Option<Arc<dyn MLModel>>,
    forecast: Option<Arc<dyn MLModel>>,
}

impl fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("lgbm", &self.lgbm.as_ref().map(|m| m.metadata().model_id.clone()))
            .field("forecast", &self.forecast.as_ref().map(|m| m.metadata().model_id.clone()))
            .finish()
    }
}

impl ModelRegistry {
    /// Registry with both slots empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every configured artifact. Never fails: problems are logged and
    /// the affected slot stays empty.
    pub fn load_all(config: &ModelsConfig) -> Self {
        let mut registry = Self::empty();
        for (slot, path) in [
            (ModelSlot::Lgbm, config.lgbm_path.as_deref()),
            (ModelSlot::Forecast, config.forecast_path.as_deref()),
        ] {
            let Some(path) = path else {
                warn!(slot = %slot, "no artifact configured; fallback heuristic will serve this mode");
                continue;
            };
            match load_slot(slot, path) {
                Ok(model) => {
                    info!(
                        slot = %slot,
                        model_id = %model.metadata().model_id,
                        version = %model.metadata().version,
                        path = %path.display(),
                        "model loaded"
                    );
                    registry.set(slot, model);
                }
                Err(e) => {
                    error!(slot = %slot, path = %path.display(), error = %format!("{e:#}"), "model unavailable");
                }
            }
        }
        registry
    }

    /// Install a model without schema checks; used when wiring by hand.
    pub fn with_model(mut self, slot: ModelSlot, model: Arc<dyn MLModel>) -> Self {
        self.set(slot, model);
        self
    }

    fn set(&mut self, slot: ModelSlot, model: Arc<dyn MLModel>) {
        match slot {
            ModelSlot::Lgbm => self.lgbm = Some(model),
            ModelSlot::Forecast => self.forecast = Some(model),
        }
    }

    pub fn get(&self, slot: ModelSlot) -> Option<&Arc<dyn MLModel>> {
        match slot {
            ModelSlot::Lgbm => self.lgbm.as_ref(),
            ModelSlot::Forecast => self.forecast.as_ref(),
        }
    }

    pub fn is_available(&self, slot: ModelSlot) -> bool {
        self.get(slot).is_some()
    }
}

fn load_slot(slot: ModelSlot, path: &Path) -> Result<Arc<dyn MLModel>> {
    let model = ModelArtifact::load(path)?.into_model();
    model.validate().context("Artifact failed structural checks")?;
    slot.schema()
        .validate(model.metadata())
        .with_context(|| format!("Artifact does not match the {slot} input schema"))?;
    Ok(model)
}
