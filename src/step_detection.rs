use crate::config::PdrConfig;
use crate::sensors::Triaxial;
use crate::session::SessionState;

/// Peak-style step detector over acceleration magnitude.
///
/// A step fires when the magnitude exceeds `threshold` and more than
/// `refractory_period` seconds have passed since the previous step. There is
/// no denoising; the refractory period alone keeps one footfall from
/// triggering twice.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepDetector {
    threshold: f64,
    refractory_period: f64,
}

impl StepDetector {
    pub fn new(threshold: f64, refractory_period: f64) -> Self {
        Self {
            threshold,
            refractory_period,
        }
    }

    pub fn from_config(config: &PdrConfig) -> Self {
        Self::new(config.step_threshold, config.refractory_period)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn refractory_period(&self) -> f64 {
        self.refractory_period
    }

    /// Returns true and records the step on `state` if one is detected.
    /// Otherwise `state` is left untouched.
    pub fn detect(&self, acceleration: &Triaxial, timestamp: f64, state: &mut SessionState) -> bool {
        if !acceleration.is_finite() || !timestamp.is_finite() {
            return false;
        }

        let magnitude = acceleration.magnitude();
        if magnitude <= self.threshold {
            return false;
        }
        if timestamp - state.last_step_time <= self.refractory_period {
            return false;
        }

        state.step_count += 1;
        state.last_step_time = timestamp;
        true
    }
}
