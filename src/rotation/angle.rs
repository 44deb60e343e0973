use std::ops::Neg;

use nalgebra::{RealField, Scalar};

/// A scalar angle in radians with its sine and cosine cached.
///
/// The cache is filled on construction; replace the value with a new
/// [`Angle`] to change it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle<T: Scalar> {
    rad: T,
    sin: T,
    cos: T,
}

impl<T: RealField + Copy> Angle<T> {
    #[inline]
    pub fn new(rad: T) -> Self {
        let (sin, cos) = rad.sin_cos();
        Self { rad, sin, cos }
    }

    #[inline]
    pub fn zero() -> Self {
        Self {
            rad: T::zero(),
            sin: T::zero(),
            cos: T::one(),
        }
    }

    #[inline(always)]
    pub fn rad(&self) -> T {
        self.rad
    }

    #[inline(always)]
    pub fn sin(&self) -> T {
        self.sin
    }

    #[inline(always)]
    pub fn cos(&self) -> T {
        self.cos
    }

    /// The angle multiplied by `factor`, used to interpolate a rotation over
    /// a fraction of the sweep.
    #[inline]
    pub fn scaled(&self, factor: T) -> Self {
        Self::new(self.rad * factor)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.rad.is_finite()
    }
}

impl<T: RealField + Copy> Default for Angle<T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: RealField + Copy> From<T> for Angle<T> {
    fn from(rad: T) -> Self {
        Self::new(rad)
    }
}

impl<T: RealField + Copy> Neg for Angle<T> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self {
            rad: -self.rad,
            sin: -self.sin,
            cos: self.cos,
        }
    }
}
