//! Point-to-edge and point-to-plane residuals and their Jacobian rows.

use nalgebra::{Point3, RealField, Scalar, Vector3, Vector6};

use super::{config::Config, transform::Transform};

/// The distance of a feature to its matched primitive together with the
/// direction in which that distance grows, both scaled by the residual
/// weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficient<T: Scalar> {
    pub normal: Vector3<T>,
    pub distance: T,
}

/// A feature point kept for the current iteration. `point` is the raw
/// measurement, before reprojection to the start of the sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedPoint<T: Scalar> {
    pub point: Point3<T>,
    pub coefficient: Coefficient<T>,
}

/// Unit gradient and distance of `i` to the line through `j` and `l`.
pub fn edge_residual<T: RealField + Copy>(
    i: &Point3<T>,
    j: &Point3<T>,
    l: &Point3<T>,
) -> (Vector3<T>, T) {
    let cross = (i - j).cross(&(i - l));
    let jl = j - l;
    let area = cross.norm();
    let length = jl.norm();
    (jl.cross(&cross) / area / length, area / length)
}

/// Unit normal and signed distance of `i` to the plane through `j`, `l` and
/// `m`.
pub fn plane_residual<T: RealField + Copy>(
    i: &Point3<T>,
    j: &Point3<T>,
    l: &Point3<T>,
    m: &Point3<T>,
) -> (Vector3<T>, T) {
    let normal = (j - l).cross(&(j - m));
    let normal = normal / normal.norm();
    (normal, (i - j).dot(&normal))
}

/// Weight of an edge residual at `iteration`.
pub fn edge_weight<T: RealField + Copy>(distance: T, iteration: usize, config: &Config<T>) -> T {
    if iteration < config.full_weight_iterations {
        T::one()
    } else {
        T::one() - config.weight_decay * distance.abs()
    }
}

/// Weight of a plane residual at `iteration`; the distance is taken relative
/// to the range of the point.
pub fn plane_weight<T: RealField + Copy>(
    distance: T,
    range: T,
    iteration: usize,
    config: &Config<T>,
) -> T {
    if iteration < config.full_weight_iterations {
        T::one()
    } else {
        T::one() - config.weight_decay * distance.abs() / range
    }
}

impl<T: RealField + Copy> Coefficient<T> {
    /// Scale a residual by its weight, or reject it when the weight is not
    /// above the configured minimum or the residual is degenerate.
    pub fn weighted(
        normal: Vector3<T>,
        distance: T,
        weight: T,
        config: &Config<T>,
    ) -> Option<Self> {
        if weight <= config.min_weight || distance == T::zero() {
            return None;
        }
        let coefficient = Self {
            normal: normal * weight,
            distance: distance * weight,
        };
        coefficient.is_finite().then_some(coefficient)
    }

    fn is_finite(&self) -> bool {
        self.distance.is_finite() && self.normal.iter().all(|x| x.is_finite())
    }
}

impl<T: RealField + Copy> SelectedPoint<T> {
    /// The Jacobian row of this residual with respect to the parameters of
    /// `transform` and the target value of the row.
    ///
    /// The point is linearized as if measured at the end of the sweep, where
    /// its reprojection reads `M·(p - t)` with `M = (Rz·Rx·Ry)ᵀ`.
    pub fn jacobian_row(&self, transform: &Transform<T>, damping: T) -> (Vector6<T>, T) {
        let Coefficient { normal, distance } = self.coefficient;
        let rotation = transform.rot.rotation_yxz();
        let [partial_x, partial_y, partial_z] = transform.rot.rotation_yxz_partials();
        let relative = self.point.coords - transform.pos;

        let grad_rot = Vector3::new(
            (partial_x.transpose() * relative).dot(&normal),
            (partial_y.transpose() * relative).dot(&normal),
            (partial_z.transpose() * relative).dot(&normal),
        );
        let grad_trans = -(rotation * normal);

        let row = Vector6::new(
            grad_rot.x,
            grad_rot.y,
            grad_rot.z,
            grad_trans.x,
            grad_trans.y,
            grad_trans.z,
        );
        (row, -damping * distance)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::{point, vector};

    use super::*;
    use crate::rotation::{EulerAngles, rotate_zxy};

    #[test]
    fn test_edge_residual_points_away_from_line() {
        let (normal, distance) = edge_residual(
            &point![0.0, 0.3, 2.0],
            &point![1.0, 0.0, 0.0],
            &point![-1.0, 0.0, 0.0],
        );
        assert_relative_eq!(distance, (0.09_f64 + 4.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(normal, vector![0.0, 0.3, 2.0].normalize(), epsilon = 1e-12);
    }

    #[test]
    fn test_plane_residual_is_signed() {
        let j: Point3<f64> = point![0.0, 0.0, 1.0];
        let l = point![1.0, 0.0, 1.0];
        let m = point![0.0, 1.0, 1.0];
        let (normal, above) = plane_residual(&point![0.2, 0.2, 1.5], &j, &l, &m);
        let (_, below) = plane_residual(&point![0.2, 0.2, 0.5], &j, &l, &m);
        assert_relative_eq!(normal.z.abs(), 1.0);
        assert_relative_eq!(above, -below);
        assert_relative_eq!(above.abs(), 0.5);
    }

    #[test]
    fn test_weights_decay_after_warm_up() {
        let config = Config::<f64>::default();
        assert_eq!(edge_weight(0.3, 4, &config), 1.0);
        assert_relative_eq!(edge_weight(0.3, 5, &config), 1.0 - 1.8 * 0.3, epsilon = 1e-12);
        assert_relative_eq!(edge_weight(-0.3, 7, &config), 1.0 - 1.8 * 0.3, epsilon = 1e-12);
        assert_relative_eq!(plane_weight(0.4, 2.0, 5, &config), 1.0 - 1.8 * 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_weight_cutoff() {
        let config = Config::<f64>::default();
        let normal = vector![0.0, 0.0, 1.0];
        // 1 - 1.8 * 0.5 = 0.1, which is not above the cutoff
        let weight = edge_weight(0.5, 5, &config);
        assert!(Coefficient::weighted(normal, 0.5, weight, &config).is_none());

        let weight = edge_weight(0.4, 5, &config);
        let coefficient = Coefficient::weighted(normal, 0.4, weight, &config).expect("kept");
        assert_relative_eq!(coefficient.distance, 0.4 * 0.28, epsilon = 1e-12);
        assert_relative_eq!(coefficient.normal.z, 0.28, epsilon = 1e-12);

        assert!(Coefficient::weighted(normal, 0.0, 1.0, &config).is_none());
        assert!(Coefficient::weighted(vector![f64::NAN, 0.0, 0.0], 0.2, 1.0, &config).is_none());
    }

    #[test]
    fn test_jacobian_matches_finite_differences() {
        let transform = Transform {
            rot: EulerAngles::new(0.05, -0.1, 0.2),
            pos: vector![0.3, -0.2, 0.1],
        };
        let point = point![2.0, -1.0, 4.0];
        let normal = vector![0.2, -0.5, 0.8].normalize();
        let selected = SelectedPoint {
            point,
            coefficient: Coefficient {
                normal,
                distance: 0.5,
            },
        };

        let reproject = |transform: &Transform<f64>| {
            let mut v = point.coords - transform.pos;
            let rot = transform.rot;
            rotate_zxy(&mut v, &-rot.z, &-rot.x, &-rot.y);
            v.dot(&normal)
        };

        let (row, target) = selected.jacobian_row(&transform, 0.05);
        assert_relative_eq!(target, -0.025);

        let h = 1e-6;
        for k in 0..6 {
            let mut step = Vector6::zeros();
            step[k] = h;
            let mut bumped = transform;
            bumped.apply_increment(&step);
            let numeric = (reproject(&bumped) - reproject(&transform)) / h;
            assert_relative_eq!(row[k], numeric, epsilon = 1e-5);
        }
    }
}
