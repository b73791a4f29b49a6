use crate::config::PdrConfig;
use crate::error::{PdrError, PdrResult};
use crate::motion::VarianceWindow;
use crate::particle_filter::ParticleCloud;
use crate::sensors::SensorSample;
use crate::types::{DeviceContext, MotionState, Position};

/// Aggregate state of one dead-reckoning session.
///
/// Owned by whoever drives the sensor loop and mutated in place, one sample
/// at a time.
#[derive(Clone, Debug)]
pub struct SessionState {
    pub position: Position,
    /// Last corrected heading in degrees, `[0, 360)`
    pub heading: f64,
    /// Monotonic seconds of the most recent step; 0 until the first one
    pub last_step_time: f64,
    pub step_count: u64,
    pub last_accel_mag: f64,
    heading_bias: f64,
    pub device_context: DeviceContext,
    pub motion_state: MotionState,
    pub particles: ParticleCloud,
    pub variance_window: VarianceWindow,
    /// Most recent raw sample seen while tracking
    pub last_sample: Option<SensorSample>,
}

impl SessionState {
    /// Fresh session at the origin with a uniform particle population
    pub fn new(config: &PdrConfig) -> Self {
        SessionState {
            position: Position::origin(),
            heading: 0.0,
            last_step_time: 0.0,
            step_count: 0,
            last_accel_mag: 0.0,
            heading_bias: 0.0,
            device_context: DeviceContext::default(),
            motion_state: MotionState::default(),
            particles: ParticleCloud::from_config(config),
            variance_window: VarianceWindow::new(config.variance_window),
            last_sample: None,
        }
    }

    /// Back to the origin: particles reinitialized with uniform weight, step
    /// counters and cached readings cleared. Heading bias and device context
    /// are calibration inputs and survive the reset.
    pub fn reset(&mut self) {
        self.position = Position::origin();
        self.heading = 0.0;
        self.motion_state = MotionState::default();
        self.clear_tracking();
        self.particles.reinitialize(0.0, 0.0);
        log::info!("session reset to origin");
    }

    /// Move to a caller-chosen start point.
    ///
    /// The particle population is reinitialized at the new point so stale
    /// hypotheses do not pull the estimate back toward the old origin.
    pub fn set_start_position(&mut self, position: Position) -> PdrResult<()> {
        if !position.is_finite() {
            log::warn!("rejected start position {:?}", position);
            return Err(PdrError::InvalidParameters(format!(
                "start position must be finite, got ({}, {}, {})",
                position.x, position.y, position.z
            )));
        }
        self.position = position;
        self.clear_tracking();
        self.particles.reinitialize(position.x, position.y);
        log::info!(
            "start position set to ({:.2}, {:.2}, {:.2})",
            position.x,
            position.y,
            position.z
        );
        Ok(())
    }

    pub fn heading_bias(&self) -> f64 {
        self.heading_bias
    }

    /// Store a calibration bias, clamped into `±max_heading_bias`.
    /// Returns the value actually stored.
    pub fn set_heading_bias(&mut self, bias: f64, config: &PdrConfig) -> PdrResult<f64> {
        if !bias.is_finite() {
            return Err(PdrError::InvalidParameters(format!(
                "heading bias must be finite, got {}",
                bias
            )));
        }
        let limit = config.max_heading_bias;
        self.heading_bias = bias.max(-limit).min(limit);
        Ok(self.heading_bias)
    }

    fn clear_tracking(&mut self) {
        self.last_step_time = 0.0;
        self.step_count = 0;
        self.last_accel_mag = 0.0;
        self.variance_window.clear();
        self.last_sample = None;
    }
}
