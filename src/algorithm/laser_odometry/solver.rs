use log::{trace, warn};
use nalgebra::{Matrix6, RealField, Vector6};

use super::{
    LaserOdometry,
    correspondence::Correspondences,
    degeneracy::DegeneracyProjection,
    residual::{
        Coefficient, SelectedPoint, edge_residual, edge_weight, plane_residual, plane_weight,
    },
};
use crate::{cloud::FeaturePoint, utils::ToDegrees};

/// What happened while optimizing the transform of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizationOutcome {
    /// Iterations run, including those skipped for lack of residuals.
    pub iterations: usize,
    /// Whether the step fell below both abort thresholds.
    pub converged: bool,
    /// Whether degenerate directions were removed from the steps.
    pub degenerate: bool,
    /// Residuals selected in the last iteration.
    pub selected: usize,
}

impl<T> LaserOdometry<T>
where
    T: RealField + ToDegrees + Copy,
{
    /// Gauss-Newton refinement of the incremental transform against the
    /// reference clouds.
    pub(super) fn optimize(
        &mut self,
        corners: &[FeaturePoint<T>],
        surfaces: &[FeaturePoint<T>],
    ) -> OptimizationOutcome {
        let mut outcome = OptimizationOutcome::default();
        let mut correspondences = Correspondences::default();
        let mut selected = Vec::with_capacity(corners.len() + surfaces.len());
        let mut projection: Option<DegeneracyProjection<T>> = None;

        for iteration in 0..self.config.max_iterations {
            outcome.iterations = iteration + 1;

            if iteration % self.config.correspondence_refresh_interval == 0 {
                let transform = self.transform;
                let scan_period = self.config.scan_period;
                correspondences = Correspondences::search(
                    corners,
                    surfaces,
                    &self.last_corner,
                    &self.last_surface,
                    &self.config,
                    |point| *transform.to_start(point, scan_period),
                );
                trace!(
                    "iteration {iteration}: matched {}/{} corners, {}/{} surfaces",
                    correspondences.edge_count(),
                    corners.len(),
                    correspondences.plane_count(),
                    surfaces.len()
                );
            }

            selected.clear();
            self.select_edges(corners, &correspondences, iteration, &mut selected);
            self.select_planes(surfaces, &correspondences, iteration, &mut selected);
            outcome.selected = selected.len();

            if selected.len() < self.config.min_correspondences {
                trace!("iteration {iteration}: {} residuals, skipped", selected.len());
                continue;
            }

            let (ata, atb) = self.normal_equations(&selected);
            let Some(mut step) = solve(&ata, &atb) else {
                warn!("iteration {iteration}: normal equations could not be solved");
                continue;
            };

            let guard = projection.get_or_insert_with(|| {
                let guard = DegeneracyProjection::from_normal_matrix(
                    &ata,
                    &self.config.degeneracy_thresholds,
                );
                if guard.is_degenerate() {
                    warn!(
                        "{} degenerate directions, updates along them are suppressed",
                        guard.degenerate_directions()
                    );
                }
                guard
            });
            if guard.is_degenerate() {
                outcome.degenerate = true;
                step = guard.project(&step);
            }

            let reset = self.transform.apply_increment(&step);
            if reset > 0 {
                warn!("iteration {iteration}: reset {reset} non-finite transform components");
            }

            let delta_r = step
                .fixed_rows::<3>(0)
                .map(ToDegrees::to_degrees)
                .norm();
            let delta_t = step.fixed_rows::<3>(3).norm() * nalgebra::convert::<_, T>(100.0);
            trace!(
                "iteration {iteration}: {} residuals, step {delta_r:.4} deg {delta_t:.4} cm",
                selected.len()
            );

            if delta_r < self.config.delta_r_abort && delta_t < self.config.delta_t_abort {
                outcome.converged = true;
                break;
            }
        }
        outcome
    }

    fn select_edges(
        &self,
        corners: &[FeaturePoint<T>],
        correspondences: &Correspondences,
        iteration: usize,
        selected: &mut Vec<SelectedPoint<T>>,
    ) {
        let config = &self.config;
        let reference = self.last_corner.points();
        for (point, edge) in corners.iter().zip(&correspondences.edges) {
            let Some(edge) = edge else {
                continue;
            };
            let i = self.transform.to_start(point, config.scan_period);
            let (normal, distance) =
                edge_residual(&i, &reference[edge.j].position, &reference[edge.l].position);
            let weight = edge_weight(distance, iteration, config);
            let Some(coefficient) = Coefficient::weighted(normal, distance, weight, config) else {
                continue;
            };
            selected.push(SelectedPoint {
                point: point.position,
                coefficient,
            });
        }
    }

    fn select_planes(
        &self,
        surfaces: &[FeaturePoint<T>],
        correspondences: &Correspondences,
        iteration: usize,
        selected: &mut Vec<SelectedPoint<T>>,
    ) {
        let config = &self.config;
        let reference = self.last_surface.points();
        for (point, plane) in surfaces.iter().zip(&correspondences.planes) {
            let Some(plane) = plane else {
                continue;
            };
            let i = self.transform.to_start(point, config.scan_period);
            let (normal, distance) = plane_residual(
                &i,
                &reference[plane.j].position,
                &reference[plane.l].position,
                &reference[plane.m].position,
            );
            let weight = plane_weight(distance, i.coords.norm(), iteration, config);
            let Some(coefficient) = Coefficient::weighted(normal, distance, weight, config) else {
                continue;
            };
            selected.push(SelectedPoint {
                point: point.position,
                coefficient,
            });
        }
    }

    /// `AᵀA` and `Aᵀb` accumulated row by row.
    fn normal_equations(&self, selected: &[SelectedPoint<T>]) -> (Matrix6<T>, Vector6<T>) {
        let mut ata = Matrix6::zeros();
        let mut atb = Vector6::zeros();
        for point in selected {
            let (row, target) = point.jacobian_row(&self.transform, self.config.residual_damping);
            ata += row * row.transpose();
            atb += row * target;
        }
        (ata, atb)
    }
}

/// Least-squares solution of `AᵀA·x = Aᵀb` that tolerates a rank deficient
/// `AᵀA`: singular values below the numerical rank tolerance are ignored.
fn solve<T: RealField + Copy>(ata: &Matrix6<T>, atb: &Vector6<T>) -> Option<Vector6<T>> {
    let svd = ata.svd(true, true);
    let tolerance = svd.singular_values.max() * T::default_epsilon() * nalgebra::convert(6.0);
    let step = svd.solve(atb, tolerance).ok()?;
    step.iter().all(|x| x.is_finite()).then_some(step)
}
