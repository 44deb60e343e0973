use nalgebra::{Point3, RealField, Scalar};

use crate::frame::{Framed, frames};

/// A feature point produced by the upstream feature extractor.
///
/// `intensity` encodes two values: its integer part is the scan ring that
/// measured the point, and its fractional part is the measurement time
/// relative to the sweep start, multiplied by the scan period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeaturePoint<T: Scalar> {
    pub position: Point3<T>,
    pub intensity: T,
}

impl<T: RealField + Copy> FeaturePoint<T> {
    /// Encode a point measured on `ring` at `rel_time ∈ [0, 1]` of a sweep
    /// lasting `scan_period` seconds.
    pub fn new(position: Point3<T>, ring: u16, rel_time: T, scan_period: T) -> Self {
        let ring: T = nalgebra::convert(f64::from(ring));
        Self {
            position,
            intensity: ring + scan_period * rel_time,
        }
    }

    #[inline]
    pub fn with_intensity(position: Point3<T>, intensity: T) -> Self {
        Self {
            position,
            intensity,
        }
    }

    /// The scan ring id, as a real number so ring differences can be compared
    /// against a fractional window.
    #[inline]
    pub fn ring(&self) -> T {
        self.intensity.trunc()
    }

    /// The interpolation factor `s` of the point within its sweep.
    #[inline]
    pub fn relative_time(&self, scan_period: T) -> T {
        self.intensity.fract() / scan_period
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|x| x.is_finite())
    }
}

/// A cloud of feature points expressed in the frame `F`.
pub type FeatureCloud<T, F = frames::Lidar> = Framed<Vec<FeaturePoint<T>>, F>;

/// The four feature clouds extracted from one sweep.
///
/// The less-sharp and less-flat clouds are supersets of the sharp and flat
/// ones and become the reference clouds of the following sweep.
#[derive(Debug, Clone)]
pub struct SweepFeatures<T: Scalar> {
    pub corner_sharp: FeatureCloud<T>,
    pub corner_less_sharp: FeatureCloud<T>,
    pub surface_flat: FeatureCloud<T>,
    pub surface_less_flat: FeatureCloud<T>,
}

impl<T: Scalar> Default for SweepFeatures<T> {
    fn default() -> Self {
        Self {
            corner_sharp: Default::default(),
            corner_less_sharp: Default::default(),
            surface_flat: Default::default(),
            surface_less_flat: Default::default(),
        }
    }
}
