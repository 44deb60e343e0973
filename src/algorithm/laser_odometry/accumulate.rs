use nalgebra::RealField;

use super::{config::Config, imu::ImuSummary, transform::Transform};
use crate::rotation::{EulerAngles, rotate_zxy};

/// Compose two rotations given in the `Ry·Rx·Rz` convention, `current`
/// applied after `last`.
pub fn accumulate_rotation<T: RealField + Copy>(
    current: &EulerAngles<T>,
    last: &EulerAngles<T>,
) -> EulerAngles<T> {
    EulerAngles::from_rotation_zxy(&(current.rotation_zxy() * last.rotation_zxy()))
}

/// Correct an accumulated rotation with the attitude change the IMU measured
/// over the sweep: `R = R_current · R_startᵀ · R_end`.
pub fn plugin_imu_rotation<T: RealField + Copy>(
    current: &EulerAngles<T>,
    imu_start: &EulerAngles<T>,
    imu_end: &EulerAngles<T>,
) -> EulerAngles<T> {
    let rotation =
        current.rotation_zxy() * imu_start.rotation_zxy().transpose() * imu_end.rotation_zxy();
    EulerAngles::from_rotation_zxy(&rotation)
}

/// Fold the incremental `transform` of a sweep into the cumulative pose
/// `sum`, returning the new cumulative pose.
pub fn accumulate_pose<T: RealField + Copy>(
    sum: &Transform<T>,
    transform: &Transform<T>,
    imu: &ImuSummary<T>,
    config: &Config<T>,
) -> Transform<T> {
    let inverse = EulerAngles {
        x: -transform.rot.x,
        y: (-transform.rot.y).scaled(config.rotation_y_scale),
        z: -transform.rot.z,
    };
    let rot = accumulate_rotation(&sum.rot, &inverse);

    let mut shift = transform.pos - imu.shift_from_start;
    shift.z = transform.pos.z * config.translation_z_scale - imu.shift_from_start.z;
    rotate_zxy(&mut shift, &rot.z, &rot.x, &rot.y);

    Transform {
        rot: plugin_imu_rotation(&rot, &imu.start, &imu.end),
        pos: sum.pos - shift,
    }
}
