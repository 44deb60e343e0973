//! Scan-to-scan laser odometry after Zhang and Singh, "LOAM: Lidar Odometry
//! and Mapping in Real-time", RSS 2014.

pub mod accumulate;
pub mod config;
pub mod correspondence;
pub mod degeneracy;
pub mod imu;
pub mod motion;
pub mod residual;
pub mod solver;
pub mod transform;

use log::debug;
use nalgebra::{RealField, Rotation3, UnitQuaternion, Vector3};

pub use config::Config;
pub use imu::ImuSummary;
pub use solver::OptimizationOutcome;
pub use transform::Transform;

use crate::{
    cloud::{FeatureCloud, FeaturePoint, SweepFeatures},
    error::Result,
    frame::frames,
    reference::ReferenceCloud,
    rotation::EulerAngles,
    utils::ToDegrees,
};

/// # Input
/// ```text
/// sweep k:     ├──── corner / surface features ────┤ + IMU summary
///                                                   │
///              reprojected to the sweep end ────────┤
///                                                   ▼
/// sweep k + 1: ├──── matched against sweep k ──────┤
/// ```
///
/// Sweeps must be fed one at a time and in order; the engine keeps the
/// previous sweep's features as the reference for the next one.
pub struct LaserOdometry<T: RealField> {
    config: Config<T>,
    initialized: bool,
    frame_count: usize,
    /// Motion within the last sweep, from its start to its end.
    transform: Transform<T>,
    /// Pose at the end of the last sweep, relative to the first one.
    transform_sum: Transform<T>,
    imu: ImuSummary<T>,
    last_corner: ReferenceCloud<T>,
    last_surface: ReferenceCloud<T>,
}

/// What [`LaserOdometry::process_sweep`] did with a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepReport {
    /// The first sweep only seeds the reference clouds.
    Bootstrapped,
    /// `optimization` is `None` when the reference clouds were too small to
    /// match against and only the motion prior was applied.
    Steady {
        optimization: Option<OptimizationOutcome>,
    },
}

/// The cumulative pose handed to downstream consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct Odometry<T: RealField> {
    pub translation: Vector3<T>,
    pub rotation: EulerAngles<T>,
    pub orientation: UnitQuaternion<T>,
}

impl<T> LaserOdometry<T>
where
    T: RealField + ToDegrees + Copy,
{
    pub fn new(config: Config<T>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            initialized: false,
            frame_count: 0,
            transform: Transform::identity(),
            transform_sum: Transform::identity(),
            imu: ImuSummary::default(),
            last_corner: ReferenceCloud::default(),
            last_surface: ReferenceCloud::default(),
        })
    }

    /// Replace the IMU summary used for the next sweep.
    #[inline]
    pub fn update_imu(&mut self, imu: ImuSummary<T>) {
        self.imu = imu;
    }

    /// Estimate the motion over one sweep and roll its features over as the
    /// reference for the next one.
    pub fn process_sweep(&mut self, features: SweepFeatures<T>) -> SweepReport {
        let SweepFeatures {
            mut corner_sharp,
            corner_less_sharp,
            mut surface_flat,
            surface_less_flat,
        } = features;

        if !self.initialized {
            self.last_corner = ReferenceCloud::new(corner_less_sharp.into_sweep_start());
            self.last_surface = ReferenceCloud::new(surface_less_flat.into_sweep_start());
            self.last_corner.build_index();
            self.last_surface.build_index();

            let start = self.imu.start;
            self.transform_sum.rot.x = start.x;
            self.transform_sum.rot.z = start.z;
            self.initialized = true;

            debug!(
                "bootstrapped with {} corner and {} surface reference points",
                self.last_corner.len(),
                self.last_surface.len()
            );
            return SweepReport::Bootstrapped;
        }

        self.frame_count += 1;
        self.transform.pos -= self.imu.velocity_from_start * self.config.scan_period;

        let optimization = if self.has_usable_reference() {
            corner_sharp.retain(FeaturePoint::is_finite);
            surface_flat.retain(FeaturePoint::is_finite);
            Some(self.optimize(&corner_sharp, &surface_flat))
        } else {
            debug!(
                "sweep {}: reference too small ({} corners, {} surfaces), optimization skipped",
                self.frame_count,
                self.last_corner.len(),
                self.last_surface.len()
            );
            None
        };

        self.transform_sum = accumulate::accumulate_pose(
            &self.transform_sum,
            &self.transform,
            &self.imu,
            &self.config,
        );

        self.roll_over_references(corner_less_sharp, surface_less_flat);

        if let Some(outcome) = &optimization {
            debug!(
                "sweep {}: {} iterations, converged {}, degenerate {}, {} residuals",
                self.frame_count,
                outcome.iterations,
                outcome.converged,
                outcome.degenerate,
                outcome.selected
            );
        }
        debug!(
            "sweep {}: pose {:?} rad, {:?} m",
            self.frame_count,
            self.transform_sum.rot.radians().as_slice(),
            self.transform_sum.pos.as_slice()
        );

        SweepReport::Steady { optimization }
    }

    fn has_usable_reference(&self) -> bool {
        self.last_corner.len() > self.config.min_reference_corners
            && self.last_surface.len() > self.config.min_reference_surfaces
    }

    /// Reproject this sweep's less strict features to its end and make them
    /// the reference of the next sweep.
    fn roll_over_references(
        &mut self,
        corner_less_sharp: FeatureCloud<T>,
        surface_less_flat: FeatureCloud<T>,
    ) {
        let scan_period = self.config.scan_period;
        let corners = self.transform.to_end(corner_less_sharp, &self.imu, scan_period);
        let surfaces = self.transform.to_end(surface_less_flat, &self.imu, scan_period);

        self.last_corner = ReferenceCloud::new(corners.into_next_sweep_start());
        self.last_surface = ReferenceCloud::new(surfaces.into_next_sweep_start());

        if self.has_usable_reference() {
            self.last_corner.build_index();
            self.last_surface.build_index();
        }
    }

    #[inline]
    pub fn config(&self) -> &Config<T> {
        &self.config
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of sweeps processed after the first one.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[inline]
    pub fn transform(&self) -> &Transform<T> {
        &self.transform
    }

    #[inline]
    pub fn transform_sum(&self) -> &Transform<T> {
        &self.transform_sum
    }

    #[inline]
    pub fn imu(&self) -> &ImuSummary<T> {
        &self.imu
    }

    /// The corner reference, expressed at the end of the last sweep.
    #[inline]
    pub fn last_corner_cloud(&self) -> &FeatureCloud<T, frames::SweepStart> {
        self.last_corner.cloud()
    }

    /// The surface reference, expressed at the end of the last sweep.
    #[inline]
    pub fn last_surface_cloud(&self) -> &FeatureCloud<T, frames::SweepStart> {
        self.last_surface.cloud()
    }

    pub fn odometry(&self) -> Odometry<T> {
        let rotation = self.transform_sum.rot;
        let matrix = Rotation3::from_matrix_unchecked(rotation.rotation_zxy());
        Odometry {
            translation: self.transform_sum.pos,
            rotation,
            orientation: UnitQuaternion::from_rotation_matrix(&matrix),
        }
    }
}

impl<T: RealField> std::fmt::Debug for LaserOdometry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaserOdometry")
            .field("initialized", &self.initialized)
            .field("frame_count", &self.frame_count)
            .field("transform", &self.transform)
            .field("transform_sum", &self.transform_sum)
            .field("last_corner", &self.last_corner)
            .field("last_surface", &self.last_surface)
            .finish_non_exhaustive()
    }
}
