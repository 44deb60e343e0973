//! Removal of the sensor's own motion during a sweep.
//!
//! The incremental transform of a sweep is assumed to grow linearly with
//! time, so a point measured at fraction `s` of the sweep moved by `s` times
//! the full transform.

use nalgebra::{Point3, RealField};

use super::{imu::ImuSummary, transform::Transform};
use crate::{
    cloud::{FeatureCloud, FeaturePoint},
    frame::{Framed, SweepStartFramed, frames},
    rotation::{rotate_yxz, rotate_zxy},
};

impl<T: RealField + Copy> Transform<T> {
    /// Express `point` in the frame of the sweep start by undoing the part of
    /// this transform that elapsed before it was measured.
    pub fn to_start(
        &self,
        point: &FeaturePoint<T>,
        scan_period: T,
    ) -> SweepStartFramed<Point3<T>> {
        let s = point.relative_time(scan_period);
        let mut v = point.position.coords - self.pos * s;
        rotate_zxy(
            &mut v,
            &self.rot.z.scaled(-s),
            &self.rot.x.scaled(-s),
            &self.rot.y.scaled(-s),
        );
        Framed::new(Point3::from(v))
    }

    /// Express every point of `cloud` in the frame of the sweep end.
    ///
    /// Points are first moved to the sweep start, then through the full
    /// transform, corrected by the nonlinear shift measured by the IMU and
    /// finally by the IMU attitude change over the sweep. The intensity of
    /// the result holds the bare ring id.
    pub fn to_end(
        &self,
        cloud: FeatureCloud<T>,
        imu: &ImuSummary<T>,
        scan_period: T,
    ) -> FeatureCloud<T, frames::SweepEnd> {
        cloud
            .into_inner()
            .into_iter()
            .map(|point| {
                let mut v = self.to_start(&point, scan_period).coords;

                rotate_yxz(&mut v, &self.rot.y, &self.rot.x, &self.rot.z);
                v += self.pos - imu.shift_from_start;

                rotate_zxy(&mut v, &imu.start.z, &imu.start.x, &imu.start.y);
                rotate_yxz(&mut v, &-imu.end.y, &-imu.end.x, &-imu.end.z);

                FeaturePoint::with_intensity(Point3::from(v), point.ring())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{point, vector};

    use super::*;
    use crate::rotation::EulerAngles;

    fn transform() -> Transform<f64> {
        Transform {
            rot: EulerAngles::new(0.02, -0.05, 0.01),
            pos: vector![0.3, 0.1, -0.05],
        }
    }

    #[test]
    fn test_start_of_sweep_is_unchanged() {
        let point = FeaturePoint::new(point![1.0, 2.0, 3.0], 4, 0.0, 0.1);
        let start = transform().to_start(&point, 0.1);
        assert_relative_eq!(*start, point.position, epsilon = 1e-12);
    }

    #[test]
    fn test_half_sweep_undoes_half_motion() {
        let transform = Transform {
            rot: EulerAngles::zeros(),
            pos: vector![0.4, 0.0, -0.2],
        };
        let point = FeaturePoint::new(point![1.0, 2.0, 3.0], 1, 0.5, 0.1);
        let start = transform.to_start(&point, 0.1);
        assert_relative_eq!(*start, point![0.8, 2.0, 3.1], epsilon = 1e-9);
    }

    #[test]
    fn test_end_of_sweep_round_trip() {
        let point = FeaturePoint::new(point![1.0, 2.0, 3.0], 4, 1.0, 0.1);
        let cloud: FeatureCloud<f64> = Framed::new(vec![point]);
        let end = transform().to_end(cloud, &ImuSummary::default(), 0.1);
        assert_relative_eq!(end[0].position, point.position, epsilon = 1e-9);
        assert_eq!(end[0].intensity, 4.0);
    }

    #[test]
    fn test_imu_attitude_change_is_compensated() {
        let imu = ImuSummary {
            start: EulerAngles::new(0.0, 0.1, 0.0),
            end: EulerAngles::new(0.0, 0.3, 0.0),
            ..Default::default()
        };
        let point = FeaturePoint::new(point![1.0, 0.0, 0.0], 0, 0.0, 0.1);
        let end = Transform::identity().to_end(Framed::new(vec![point]), &imu, 0.1);
        // a pure yaw change of 0.2 rotates the point back about y
        let expected = point![0.2_f64.cos(), 0.0, 0.2_f64.sin()];
        assert_relative_eq!(end[0].position, expected, epsilon = 1e-9);
    }
}
