//! Synthetic scenes shared by the integration tests.

#![allow(dead_code)]

use loam_odometry::{FeatureCloud, FeaturePoint, SweepFeatures};
use nalgebra::{Point3, Vector3, point, vector};

pub const SCAN_PERIOD: f64 = 0.1;

pub fn init_logger() {
    env_logger::builder().is_test(true).try_init().ok();
}

/// Orthonormal frame of the tilted test plane: `(normal, u, v)`.
pub fn plane_frame() -> (Vector3<f64>, Vector3<f64>, Vector3<f64>) {
    let normal = vector![0.2, -0.3, 1.0].normalize();
    let u = normal.cross(&vector![0.3, 1.0, 0.1]).normalize();
    let v = normal.cross(&u);
    (normal, u, v)
}

/// 200 points on two scan rings of a plane through `3·n`, ring 0 first.
pub fn plane_rings() -> Vec<(Point3<f64>, u16)> {
    let (normal, u, v) = plane_frame();
    rings_on_plane(Point3::from(normal * 3.0), u, v)
}

/// 200 points on two scan rings of the ground plane `z = -1.5`.
pub fn ground_rings() -> Vec<(Point3<f64>, u16)> {
    rings_on_plane(point![0.0, 0.0, -1.5], Vector3::x(), Vector3::y())
}

/// Two rows of 100 points spanning `center ± 5·u`, at `-0.5·v` for ring 0
/// and `+0.5·v` for ring 1.
fn rings_on_plane(
    center: Point3<f64>,
    u: Vector3<f64>,
    v: Vector3<f64>,
) -> Vec<(Point3<f64>, u16)> {
    [(0_u16, -0.5), (1, 0.5)]
        .into_iter()
        .flat_map(|(ring, b)| {
            (0..100).map(move |k| {
                let a = -5.0 + 10.0 * f64::from(k) / 99.0;
                (center + u * a + v * b, ring)
            })
        })
        .collect()
}

/// Points measured at the very start of a sweep.
pub fn at_sweep_start(points: &[(Point3<f64>, u16)]) -> FeatureCloud<f64> {
    points
        .iter()
        .map(|&(position, ring)| FeaturePoint::new(position, ring, 0.0, SCAN_PERIOD))
        .collect()
}

/// Move every point by `offset`.
pub fn shifted(points: &[(Point3<f64>, u16)], offset: Vector3<f64>) -> Vec<(Point3<f64>, u16)> {
    points.iter().map(|&(position, ring)| (position + offset, ring)).collect()
}

/// Points measured at the very end of a sweep.
pub fn at_sweep_end(points: &[(Point3<f64>, u16)]) -> FeatureCloud<f64> {
    points
        .iter()
        .map(|&(position, ring)| FeaturePoint::new(position, ring, 1.0, SCAN_PERIOD))
        .collect()
}

/// `count` scattered corner points far away from the test plane.
pub fn far_corners(count: usize) -> FeatureCloud<f64> {
    (0..count)
        .map(|k| {
            let t = k as f64;
            let position = point![40.0 + 0.7 * t, -30.0 + 0.3 * t, 12.0 + 0.11 * t];
            FeaturePoint::new(position, (k % 4) as u16, 0.0, SCAN_PERIOD)
        })
        .collect()
}

pub fn sweep(corners: FeatureCloud<f64>, surfaces: FeatureCloud<f64>) -> SweepFeatures<f64> {
    SweepFeatures {
        corner_sharp: corners.clone(),
        corner_less_sharp: corners,
        surface_flat: surfaces.clone(),
        surface_less_flat: surfaces,
    }
}
