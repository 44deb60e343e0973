//! Detection of poorly constrained directions in the normal equations,
//! following Zhang, Kaess and Singh, "On Degeneracy of Optimization-based
//! State Estimation Problems", ICRA 2016.

use std::cmp::Ordering;

use nalgebra::{Matrix6, RealField, Vector6};

/// Projection that removes the degenerate directions from a solver step.
#[derive(Debug, Clone, PartialEq)]
pub struct DegeneracyProjection<T: RealField> {
    projection: Matrix6<T>,
    degenerate_directions: usize,
}

impl<T: RealField + Copy> DegeneracyProjection<T> {
    /// Inspect `AᵀA`. Its eigenvalues are visited in ascending order and each
    /// one below the matching threshold marks its eigenvector as degenerate;
    /// the scan stops at the first eigenvalue that is large enough.
    pub fn from_normal_matrix(ata: &Matrix6<T>, thresholds: &[T; 6]) -> Self {
        let eigen = ata.symmetric_eigen();
        let mut order: [usize; 6] = std::array::from_fn(|i| i);
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[a]
                .partial_cmp(&eigen.eigenvalues[b])
                .unwrap_or(Ordering::Equal)
        });

        // eigenvectors as rows, smallest eigenvalue first
        let vectors = Matrix6::from_fn(|row, col| eigen.eigenvectors[(col, order[row])]);
        let mut kept = vectors;
        let mut degenerate_directions = 0;
        for (row, (&index, threshold)) in order.iter().zip(thresholds).enumerate() {
            if eigen.eigenvalues[index] >= *threshold {
                break;
            }
            kept.row_mut(row).fill(T::zero());
            degenerate_directions += 1;
        }

        let inverse = vectors.try_inverse().unwrap_or_else(|| vectors.transpose());
        Self {
            projection: inverse * kept,
            degenerate_directions,
        }
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.degenerate_directions > 0
    }

    #[inline]
    pub fn degenerate_directions(&self) -> usize {
        self.degenerate_directions
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix6<T> {
        &self.projection
    }

    #[inline]
    pub fn project(&self, step: &Vector6<T>) -> Vector6<T> {
        self.projection * step
    }
}
