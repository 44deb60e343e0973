#![deny(clippy::unwrap_used)]
#![deny(unused_must_use)]
pub mod algorithm;
pub mod cloud;
pub mod error;
pub mod frame;
pub mod reference;
pub mod rotation;
mod utils;

pub use algorithm::laser_odometry::{
    Config, ImuSummary, LaserOdometry, OptimizationOutcome, Odometry, SweepReport, Transform,
};
pub use cloud::{FeatureCloud, FeaturePoint, SweepFeatures};
pub use error::{Error, Result};
pub use rotation::{Angle, EulerAngles};
pub use utils::{CollectTo, ToDegrees};
