use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PdrError;

/// Planar position with a pass-through altitude.
///
/// `z` is carried for the caller's rendering layer and never computed here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::default()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Horizontal distance, ignoring altitude
    pub fn planar_distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Motion regime labelled on every detected step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionState {
    #[default]
    Walking,
    Running,
    Stairs,
}

impl MotionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionState::Walking => "walking",
            MotionState::Running => "running",
            MotionState::Stairs => "stairs",
        }
    }
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotionState {
    type Err = PdrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walking" => Ok(MotionState::Walking),
            "running" => Ok(MotionState::Running),
            "stairs" => Ok(MotionState::Stairs),
            other => Err(PdrError::InvalidParameters(format!(
                "unknown motion state '{}'",
                other
            ))),
        }
    }
}

/// How the device is carried; selects step-length calibration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceContext {
    #[default]
    Holding,
    Pocket,
}

impl DeviceContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceContext::Holding => "holding",
            DeviceContext::Pocket => "pocket",
        }
    }
}

impl fmt::Display for DeviceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceContext {
    type Err = PdrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "holding" => Ok(DeviceContext::Holding),
            "pocket" => Ok(DeviceContext::Pocket),
            other => Err(PdrError::InvalidParameters(format!(
                "unknown device context '{}'",
                other
            ))),
        }
    }
}

/// Tracker phase state machine
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackingPhase {
    /// User is still picking a starting point; sensor updates are ignored
    #[default]
    SelectingStart,
    /// Steps are propagated through the particle filter
    Tracking,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        for state in [MotionState::Walking, MotionState::Running, MotionState::Stairs] {
            assert_eq!(state.as_str().parse::<MotionState>().unwrap(), state);
        }
        for ctx in [DeviceContext::Holding, DeviceContext::Pocket] {
            assert_eq!(ctx.to_string().parse::<DeviceContext>().unwrap(), ctx);
        }
    }

    #[test]
    fn test_unknown_label_rejected() {
        assert!("jogging".parse::<MotionState>().is_err());
        assert!("backpack".parse::<DeviceContext>().is_err());
    }

    #[test]
    fn test_phase_serde_names() {
        let json = serde_json::to_string(&TrackingPhase::SelectingStart).unwrap();
        assert_eq!(json, "\"selectingStart\"");
        let phase: TrackingPhase = serde_json::from_str("\"tracking\"").unwrap();
        assert_eq!(phase, TrackingPhase::Tracking);
    }

    #[test]
    fn test_planar_distance_ignores_altitude() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 12.0);
        assert_eq!(a.planar_distance(&b), 5.0);
    }
}
