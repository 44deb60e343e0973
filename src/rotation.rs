//! Rotations in the fixed Euler convention used by the odometry.
//!
//! Two application orders exist and are kept as separate functions:
//!
//! - [`rotate_zxy`] rotates about z, then x, then y, i.e. `v' = Ry·Rx·Rz·v`.
//!   This is the order used to compose and accumulate poses.
//! - [`rotate_yxz`] rotates about y, then x, then z, i.e. `v' = Rz·Rx·Ry·v`.
//!   This is the order in which the incremental sweep motion is re-applied.
//!
//! `rotate_zxy` with all three angles negated inverts `rotate_yxz`.

mod angle;

pub use angle::Angle;
use nalgebra::{Matrix3, RealField, Scalar, Vector3};

/// Three angles about the x, y and z axes.
///
/// For IMU attitudes `x` is pitch, `y` is yaw and `z` is roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles<T: Scalar> {
    pub x: Angle<T>,
    pub y: Angle<T>,
    pub z: Angle<T>,
}

impl<T: RealField + Copy> EulerAngles<T> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Self {
            x: Angle::new(x),
            y: Angle::new(y),
            z: Angle::new(z),
        }
    }

    pub fn zeros() -> Self {
        Self {
            x: Angle::zero(),
            y: Angle::zero(),
            z: Angle::zero(),
        }
    }

    pub fn radians(&self) -> Vector3<T> {
        Vector3::new(self.x.rad(), self.y.rad(), self.z.rad())
    }

    /// `Ry(y)·Rx(x)·Rz(z)`, the matrix form of [`rotate_zxy`].
    pub fn rotation_zxy(&self) -> Matrix3<T> {
        rotation_y(&self.y) * rotation_x(&self.x) * rotation_z(&self.z)
    }

    /// `Rz(z)·Rx(x)·Ry(y)`, the matrix form of [`rotate_yxz`].
    pub fn rotation_yxz(&self) -> Matrix3<T> {
        rotation_z(&self.z) * rotation_x(&self.x) * rotation_y(&self.y)
    }

    /// Partial derivatives of [`EulerAngles::rotation_yxz`] with respect to
    /// `x`, `y` and `z`, in that order.
    pub fn rotation_yxz_partials(&self) -> [Matrix3<T>; 3] {
        let (rx, ry, rz) = (
            rotation_x(&self.x),
            rotation_y(&self.y),
            rotation_z(&self.z),
        );
        [
            rz * derivative_x(&self.x) * ry,
            rz * rx * derivative_y(&self.y),
            derivative_z(&self.z) * rx * ry,
        ]
    }

    /// Extract the angles from a matrix of the form `Ry(y)·Rx(x)·Rz(z)`.
    ///
    /// `x` is recovered with `asin` and lies in `[-π/2, π/2]`. When `cos(x)`
    /// vanishes only `y ± z` is observable; `z` is then fixed to zero and the
    /// whole rotation about the vertical is assigned to `y`.
    pub fn from_rotation_zxy(m: &Matrix3<T>) -> Self {
        let one = T::one();
        let sin_x = -m[(1, 2)];
        let x = if sin_x >= one {
            T::frac_pi_2()
        } else if sin_x <= -one {
            -T::frac_pi_2()
        } else {
            sin_x.asin()
        };

        let gimbal_epsilon: T = nalgebra::convert(1e-6);
        if one - sin_x.abs() > gimbal_epsilon {
            Self::new(
                x,
                m[(0, 2)].atan2(m[(2, 2)]),
                m[(1, 0)].atan2(m[(1, 1)]),
            )
        } else {
            Self::new(x, (-m[(2, 0)]).atan2(m[(0, 0)]), T::zero())
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl<T: RealField + Copy> Default for EulerAngles<T> {
    fn default() -> Self {
        Self::zeros()
    }
}

#[inline]
fn rotate_x<T: RealField + Copy>(v: &mut Vector3<T>, angle: &Angle<T>) {
    let y = v.y;
    v.y = angle.cos() * y - angle.sin() * v.z;
    v.z = angle.sin() * y + angle.cos() * v.z;
}

#[inline]
fn rotate_y<T: RealField + Copy>(v: &mut Vector3<T>, angle: &Angle<T>) {
    let x = v.x;
    v.x = angle.cos() * x + angle.sin() * v.z;
    v.z = -angle.sin() * x + angle.cos() * v.z;
}

#[inline]
fn rotate_z<T: RealField + Copy>(v: &mut Vector3<T>, angle: &Angle<T>) {
    let x = v.x;
    v.x = angle.cos() * x - angle.sin() * v.y;
    v.y = angle.sin() * x + angle.cos() * v.y;
}

/// Rotate `v` about z by `z`, then about x by `x`, then about y by `y`.
#[inline]
pub fn rotate_zxy<T: RealField + Copy>(
    v: &mut Vector3<T>,
    z: &Angle<T>,
    x: &Angle<T>,
    y: &Angle<T>,
) {
    rotate_z(v, z);
    rotate_x(v, x);
    rotate_y(v, y);
}

/// Rotate `v` about y by `y`, then about x by `x`, then about z by `z`.
#[inline]
pub fn rotate_yxz<T: RealField + Copy>(
    v: &mut Vector3<T>,
    y: &Angle<T>,
    x: &Angle<T>,
    z: &Angle<T>,
) {
    rotate_y(v, y);
    rotate_x(v, x);
    rotate_z(v, z);
}

fn rotation_x<T: RealField + Copy>(a: &Angle<T>) -> Matrix3<T> {
    let (o, l) = (T::zero(), T::one());
    Matrix3::new(
        l, o, o, //
        o, a.cos(), -a.sin(),
        o, a.sin(), a.cos(),
    )
}

fn rotation_y<T: RealField + Copy>(a: &Angle<T>) -> Matrix3<T> {
    let (o, l) = (T::zero(), T::one());
    Matrix3::new(
        a.cos(), o, a.sin(), //
        o, l, o,
        -a.sin(), o, a.cos(),
    )
}

fn rotation_z<T: RealField + Copy>(a: &Angle<T>) -> Matrix3<T> {
    let (o, l) = (T::zero(), T::one());
    Matrix3::new(
        a.cos(), -a.sin(), o, //
        a.sin(), a.cos(), o,
        o, o, l,
    )
}

fn derivative_x<T: RealField + Copy>(a: &Angle<T>) -> Matrix3<T> {
    let o = T::zero();
    Matrix3::new(
        o, o, o, //
        o, -a.sin(), -a.cos(),
        o, a.cos(), -a.sin(),
    )
}

fn derivative_y<T: RealField + Copy>(a: &Angle<T>) -> Matrix3<T> {
    let o = T::zero();
    Matrix3::new(
        -a.sin(), o, a.cos(), //
        o, o, o,
        -a.cos(), o, -a.sin(),
    )
}

fn derivative_z<T: RealField + Copy>(a: &Angle<T>) -> Matrix3<T> {
    let o = T::zero();
    Matrix3::new(
        -a.sin(), -a.cos(), o, //
        a.cos(), -a.sin(), o,
        o, o, o,
    )
}
