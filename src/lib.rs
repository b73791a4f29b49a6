//! Pedestrian dead reckoning from phone motion sensors.
//!
//! Raw accelerometer and orientation samples are pushed into a
//! [`PdrTracker`]. Each detected step is classified, sized and turned into a
//! heading, then propagated through a particle filter whose weighted mean is
//! the position estimate.
//!
//! ```no_run
//! use pdr_tracker::{PdrConfig, PdrTracker, Position, SensorSample, Triaxial};
//!
//! let mut tracker = PdrTracker::new(PdrConfig::default()).unwrap();
//! tracker.set_start_position(Position::new(4.0, 2.0, 0.0)).unwrap();
//! tracker.confirm_start();
//!
//! let sample = SensorSample::new(1.0, Triaxial::new(0.3, 0.1, 12.4), 90.0);
//! if let Some(step) = tracker.process_sample(&sample) {
//!     println!("step {} -> {:?}", step.step_count, step.position);
//! }
//! ```

pub mod config;
pub mod error;
pub mod heading;
pub mod motion;
pub mod particle_filter;
pub mod sensors;
pub mod session;
pub mod snapshot;
pub mod step_detection;
pub mod step_length;
pub mod tracker;
pub mod types;

pub use config::{MotionThresholds, PdrConfig, StepLengthRange};
pub use error::{PdrError, PdrResult};
pub use particle_filter::{FilterUpdate, Particle, ParticleCloud};
pub use sensors::{SensorSample, Triaxial};
pub use session::SessionState;
pub use snapshot::Snapshot;
pub use tracker::{PdrTracker, StepUpdate};
pub use types::{DeviceContext, MotionState, Position, TrackingPhase};
