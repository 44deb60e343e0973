use nalgebra::{RealField, Scalar};
use serde::{Deserialize, Serialize};
use simba::scalar::SupersetOf;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    default,
    bound(
        serialize = "T: Serialize",
        deserialize = "T: Scalar + SupersetOf<f64> + Deserialize<'de>"
    )
)]
pub struct Config<T: Scalar> {
    /// Duration of one sweep in seconds.
    pub scan_period: T,

    /// Upper bound on Gauss-Newton iterations per sweep.
    pub max_iterations: usize,

    /// Rotation increment, in degrees, below which the solver stops.
    pub delta_r_abort: T,

    /// Translation increment, in centimeters, below which the solver stops.
    pub delta_t_abort: T,

    /// Matches farther than this, in meters, are rejected.
    pub max_correspondence_distance: T,

    /// Maximum ring difference between the points of one correspondence.
    pub ring_window: T,

    /// Correspondences are searched again every this many iterations.
    pub correspondence_refresh_interval: usize,

    /// Number of leading iterations in which every residual has full weight.
    pub full_weight_iterations: usize,

    /// Slope of the distance-based weight `1 - weight_decay * |d|`.
    pub weight_decay: T,

    /// Residuals whose weight is not above this value are discarded.
    pub min_weight: T,

    /// Fraction of the residual the linearized step tries to remove.
    pub residual_damping: T,

    /// Iterations with fewer selected residuals are skipped.
    pub min_correspondences: usize,

    /// Eigenvalues of `AᵀA` below these, in ascending order, mark a
    /// degenerate direction.
    pub degeneracy_thresholds: [T; 6],

    /// The corner reference is used only when it holds more points than this.
    pub min_reference_corners: usize,

    /// The surface reference is used only when it holds more points than this.
    pub min_reference_surfaces: usize,

    /// Empirical scale on the y rotation when accumulating the pose.
    pub rotation_y_scale: T,

    /// Empirical scale on the z translation when accumulating the pose.
    pub translation_z_scale: T,
}

impl<T: Scalar + SupersetOf<f64>> Default for Config<T> {
    fn default() -> Self {
        Self {
            scan_period: nalgebra::convert(0.1),
            max_iterations: 25,
            delta_r_abort: nalgebra::convert(0.1),
            delta_t_abort: nalgebra::convert(0.1),
            max_correspondence_distance: nalgebra::convert(5.0),
            ring_window: nalgebra::convert(2.5),
            correspondence_refresh_interval: 5,
            full_weight_iterations: 5,
            weight_decay: nalgebra::convert(1.8),
            min_weight: nalgebra::convert(0.1),
            residual_damping: nalgebra::convert(0.05),
            min_correspondences: 10,
            degeneracy_thresholds: std::array::from_fn(|_| nalgebra::convert(10.0)),
            min_reference_corners: 10,
            min_reference_surfaces: 100,
            rotation_y_scale: nalgebra::convert(1.05),
            translation_z_scale: nalgebra::convert(1.05),
        }
    }
}

impl<T: RealField + Copy> Config<T> {
    /// The squared correspondence cutoff, compared against k-d tree distances.
    #[inline]
    pub fn max_correspondence_distance_squared(&self) -> T {
        self.max_correspondence_distance * self.max_correspondence_distance
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: T| {
            if value.is_finite() && value > T::zero() {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{name} must be positive and finite")))
            }
        };
        let non_negative = |name: &str, value: T| {
            if value.is_finite() && value >= T::zero() {
                Ok(())
            } else {
                Err(Error::InvalidConfig(format!("{name} must be non-negative and finite")))
            }
        };

        positive("scan_period", self.scan_period)?;
        positive("max_correspondence_distance", self.max_correspondence_distance)?;
        positive("ring_window", self.ring_window)?;
        positive("residual_damping", self.residual_damping)?;
        positive("rotation_y_scale", self.rotation_y_scale)?;
        positive("translation_z_scale", self.translation_z_scale)?;
        non_negative("delta_r_abort", self.delta_r_abort)?;
        non_negative("delta_t_abort", self.delta_t_abort)?;
        non_negative("weight_decay", self.weight_decay)?;
        for threshold in self.degeneracy_thresholds {
            non_negative("degeneracy_thresholds", threshold)?;
        }

        let min_weight = self.min_weight;
        if !(min_weight.is_finite() && min_weight >= T::zero() && min_weight < T::one()) {
            return Err(Error::InvalidConfig("min_weight must lie in [0, 1)".into()));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig("max_iterations must be at least 1".into()));
        }
        if self.correspondence_refresh_interval == 0 {
            return Err(Error::InvalidConfig(
                "correspondence_refresh_interval must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
