//! Fallback demand heuristic
//!
//! Used when the model for a mode is not loaded. It is a coarse weather
//! sensitivity curve around a per-region baseline, with bounded uniform
//! noise so repeated calls do not look like a constant.

use chrono::Datelike;
use rand::Rng;

use crate::domain::{DateFeatures, EnvironmentFeatures, FeatureRecord};

/// Baseline demand before adjustments.
pub const BASE_DEMAND: f64 = 60_000.0;
/// Region codes contribute `code mod REGION_SPREAD` to the baseline.
pub const REGION_SPREAD: i64 = 10_000;
/// Half-width of the uniform noise band.
pub const NOISE_AMPLITUDE: f64 = 1_500.0;

const HOLIDAY_FACTOR: f64 = 0.82;
const SUMMER_UPLIFT: f64 = 4_200.0;
const WINTER_UPLIFT: f64 = 2_600.0;

/// Per-unit sensitivities around the neutral readings.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sensitivity {
    neutral: f64,
    per_unit: f64,
}

const MIN_TEMP: Sensitivity = Sensitivity { neutral: 20.0, per_unit: 600.0 };
const GROUND_TEMP: Sensitivity = Sensitivity { neutral: 18.0, per_unit: 220.0 };
const HUMIDITY: Sensitivity = Sensitivity { neutral: 60.0, per_unit: 35.0 };
const PRESSURE: Sensitivity = Sensitivity { neutral: 1013.0, per_unit: 55.0 };
const SUNSHINE: Sensitivity = Sensitivity { neutral: 14.0, per_unit: 180.0 };

impl Sensitivity {
    fn apply(&self, reading: f64) -> f64 {
        (reading - self.neutral) * self.per_unit
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackHeuristic;

impl FallbackHeuristic {
    pub fn new() -> Self {
        Self
    }

    /// Deterministic part of the estimate.
    pub fn baseline(&self, record: &FeatureRecord) -> f64 {
        match record {
            FeatureRecord::Environment(f) => self.environment_baseline(f),
            FeatureRecord::Date(f) => self.date_baseline(f),
        }
    }

    /// Baseline plus noise drawn from `rng`, floored at zero.
    pub fn estimate<R: Rng + ?Sized>(&self, record: &FeatureRecord, rng: &mut R) -> f64 {
        let noise = rng.gen_range(-NOISE_AMPLITUDE..=NOISE_AMPLITUDE);
        (self.baseline(record) + noise).max(0.0)
    }

    fn region_base(region_code: i64) -> f64 {
        BASE_DEMAND + region_code.rem_euclid(REGION_SPREAD) as f64
    }

    fn environment_baseline(&self, f: &EnvironmentFeatures) -> f64 {
        let value = Self::region_base(f.region_code)
            + MIN_TEMP.apply(f.min_temp)
            + GROUND_TEMP.apply(f.ground_temp)
            + HUMIDITY.apply(f.humidity)
            + PRESSURE.apply(f.pressure)
            + SUNSHINE.apply(f.sunshine_hours);

        if f.is_holiday {
            value * HOLIDAY_FACTOR
        } else {
            value
        }
    }

    fn date_baseline(&self, f: &DateFeatures) -> f64 {
        let seasonal = match f.target_date.month() {
            7 | 8 => SUMMER_UPLIFT,
            12 | 1 | 2 => WINTER_UPLIFT,
            _ => 0.0,
        };
        Self::region_base(f.region_code) + seasonal
    }
}
