//! Error types for the odometry engine.
//!
//! Processing a sweep never fails; errors are only raised where the engine is
//! configured or fed with malformed input.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IMU summary needs exactly 4 samples, got {0}")]
    ImuSampleCount(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
