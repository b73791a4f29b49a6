use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{PdrError, PdrResult};

/// Plausible step-length bounds for one motion regime, in meters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepLengthRange {
    pub min: f64,
    pub max: f64,
}

impl StepLengthRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp into `[min, max]`. A NaN length lands on `min`.
    pub fn clamp(&self, length: f64) -> f64 {
        length.max(self.min).min(self.max)
    }

    pub fn contains(&self, length: f64) -> bool {
        length >= self.min && length <= self.max
    }
}

/// Variance thresholds for the three-way motion classifier
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionThresholds {
    pub accel_low: f64,
    pub accel_high: f64,
    pub gyro_low: f64,
    pub gyro_high: f64,
}

impl Default for MotionThresholds {
    fn default() -> Self {
        Self {
            accel_low: 1.0,
            accel_high: 4.0,
            gyro_low: 0.5,
            gyro_high: 2.0,
        }
    }
}

/// Tracker configuration. Immutable once a tracker is built.
///
/// Every field has a default, so a JSON file only needs the keys it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdrConfig {
    pub particle_count: usize,
    /// Total heading noise width in degrees (± half applied per particle)
    pub heading_noise: f64,
    /// Total step-length noise width in meters (± half applied per particle)
    pub step_len_noise: f64,
    /// Resample when effective sample size drops below this
    pub resample_threshold: f64,
    pub max_heading_bias: f64,
    pub heading_correction_gain: f64,
    pub step_length_walk_range: StepLengthRange,
    pub step_length_run_range: StepLengthRange,
    /// Acceleration magnitude (m/s², gravity included) a step peak must exceed
    pub step_threshold: f64,
    /// Minimum seconds between two detected steps
    pub refractory_period: f64,
    pub motion_thresholds: MotionThresholds,
    /// Samples kept for the classifier's rolling variance
    pub variance_window: usize,
    /// Meters-to-grid scale applied to each step before it reaches the filter
    pub grid_scale: f64,
    /// Weight of the secondary heading source when blending
    pub secondary_heading_weight: f64,
    /// Fixed RNG seed for reproducible particle noise
    pub seed: Option<u64>,
}

impl Default for PdrConfig {
    fn default() -> Self {
        Self {
            particle_count: 150,
            heading_noise: 10.0,
            step_len_noise: 0.1,
            resample_threshold: 75.0,
            max_heading_bias: 30.0,
            heading_correction_gain: 1.0,
            step_length_walk_range: StepLengthRange::new(0.4, 0.9),
            step_length_run_range: StepLengthRange::new(0.8, 1.8),
            step_threshold: 11.0,
            refractory_period: 0.2,
            motion_thresholds: MotionThresholds::default(),
            variance_window: 25,
            grid_scale: 5.0,
            secondary_heading_weight: 0.3,
            seed: None,
        }
    }
}

impl PdrConfig {
    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json_str(json: &str) -> PdrResult<Self> {
        let config: PdrConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> PdrResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            log::warn!("cannot read config {}: {}", path.display(), e);
            e
        })?;
        Self::from_json_str(&text)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> PdrResult<()> {
        if self.particle_count == 0 {
            return Err(invalid("particle_count must be > 0"));
        }
        check_non_negative("heading_noise", self.heading_noise)?;
        check_non_negative("step_len_noise", self.step_len_noise)?;
        check_non_negative("resample_threshold", self.resample_threshold)?;
        check_non_negative("max_heading_bias", self.max_heading_bias)?;
        check_finite("heading_correction_gain", self.heading_correction_gain)?;
        check_range("step_length_walk_range", &self.step_length_walk_range)?;
        check_range("step_length_run_range", &self.step_length_run_range)?;
        check_finite("step_threshold", self.step_threshold)?;
        if !(self.refractory_period.is_finite() && self.refractory_period > 0.0) {
            return Err(invalid("refractory_period must be a positive number of seconds"));
        }

        let t = &self.motion_thresholds;
        for (name, value) in [
            ("motion_thresholds.accel_low", t.accel_low),
            ("motion_thresholds.accel_high", t.accel_high),
            ("motion_thresholds.gyro_low", t.gyro_low),
            ("motion_thresholds.gyro_high", t.gyro_high),
        ] {
            check_non_negative(name, value)?;
        }
        if t.accel_low > t.accel_high || t.gyro_low > t.gyro_high {
            return Err(invalid("motion thresholds: low must not exceed high"));
        }

        if self.variance_window == 0 {
            return Err(invalid("variance_window must be > 0"));
        }
        if !(self.grid_scale.is_finite() && self.grid_scale > 0.0) {
            return Err(invalid("grid_scale must be positive"));
        }
        if !(0.0..=1.0).contains(&self.secondary_heading_weight) {
            return Err(invalid("secondary_heading_weight must be within [0, 1]"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> PdrError {
    log::warn!("rejected config: {}", msg);
    PdrError::InvalidConfig(msg.to_string())
}

fn check_finite(name: &str, value: f64) -> PdrResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(&format!("{} must be finite", name)))
    }
}

fn check_non_negative(name: &str, value: f64) -> PdrResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(&format!("{} must be finite and >= 0", name)))
    }
}

fn check_range(name: &str, range: &StepLengthRange) -> PdrResult<()> {
    check_non_negative(name, range.min)?;
    check_non_negative(name, range.max)?;
    if range.min > range.max {
        return Err(invalid(&format!("{}: min exceeds max", name)));
    }
    Ok(())
}
