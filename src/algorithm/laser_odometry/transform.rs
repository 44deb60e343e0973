use nalgebra::{RealField, Scalar, Vector3, Vector6};

use crate::rotation::{Angle, EulerAngles};

/// A rigid transform stored as three Euler angles and a translation.
///
/// The parameter vector used by the solver is ordered
/// `(rot.x, rot.y, rot.z, pos.x, pos.y, pos.z)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform<T: Scalar> {
    pub rot: EulerAngles<T>,
    pub pos: Vector3<T>,
}

impl<T: RealField + Copy> Default for Transform<T> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T: RealField + Copy> Transform<T> {
    pub fn identity() -> Self {
        Self {
            rot: EulerAngles::zeros(),
            pos: Vector3::zeros(),
        }
    }

    pub fn parameters(&self) -> Vector6<T> {
        let rot = self.rot.radians();
        Vector6::new(rot.x, rot.y, rot.z, self.pos.x, self.pos.y, self.pos.z)
    }

    /// Add a solver step to the parameters.
    ///
    /// Returns the number of components that turned non-finite and were
    /// reset to zero. Each component is reset on its own.
    pub fn apply_increment(&mut self, step: &Vector6<T>) -> usize {
        let mut reset = 0;
        let mut add_angle = |angle: &mut Angle<T>, delta: T| {
            let value = angle.rad() + delta;
            *angle = if value.is_finite() {
                Angle::new(value)
            } else {
                reset += 1;
                Angle::zero()
            };
        };
        add_angle(&mut self.rot.x, step[0]);
        add_angle(&mut self.rot.y, step[1]);
        add_angle(&mut self.rot.z, step[2]);

        for (pos, delta) in self.pos.iter_mut().zip(step.fixed_rows::<3>(3).iter()) {
            let value = *pos + *delta;
            *pos = if value.is_finite() {
                value
            } else {
                reset += 1;
                T::zero()
            };
        }
        reset
    }

    pub fn is_finite(&self) -> bool {
        self.rot.is_finite() && self.pos.iter().all(|x| x.is_finite())
    }
}
