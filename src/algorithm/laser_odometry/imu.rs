use nalgebra::{RealField, Scalar, Vector3};

use crate::{
    error::{Error, Result},
    rotation::EulerAngles,
};

/// IMU information integrated over one sweep by an external integrator.
///
/// Attitudes hold pitch in `x`, yaw in `y` and roll in `z`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImuSummary<T: Scalar> {
    /// Attitude at the start of the sweep.
    pub start: EulerAngles<T>,
    /// Attitude at the end of the sweep.
    pub end: EulerAngles<T>,
    /// Position drift from constant velocity motion, accumulated over the
    /// sweep.
    pub shift_from_start: Vector3<T>,
    /// Velocity change over the sweep.
    pub velocity_from_start: Vector3<T>,
}

impl<T: RealField + Copy> Default for ImuSummary<T> {
    fn default() -> Self {
        Self {
            start: EulerAngles::zeros(),
            end: EulerAngles::zeros(),
            shift_from_start: Vector3::zeros(),
            velocity_from_start: Vector3::zeros(),
        }
    }
}

impl<T: RealField + Copy> ImuSummary<T> {
    /// Build a summary from the four samples delivered per sweep: start
    /// `(pitch, yaw, roll)`, end `(pitch, yaw, roll)`, shift and velocity.
    pub fn from_samples(samples: &[Vector3<T>]) -> Result<Self> {
        let [start, end, shift, velocity] = samples else {
            return Err(Error::ImuSampleCount(samples.len()));
        };
        Ok(Self {
            start: EulerAngles::new(start.x, start.y, start.z),
            end: EulerAngles::new(end.x, end.y, end.z),
            shift_from_start: *shift,
            velocity_from_start: *velocity,
        })
    }
}
