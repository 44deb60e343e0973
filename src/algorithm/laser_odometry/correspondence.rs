//! Nearest-feature matching against the previous sweep.
//!
//! The reference clouds are ordered by scan ring, as produced by the feature
//! extractor, so the secondary points are searched by walking away from the
//! nearest neighbour in index order until the ring window is left.

use nalgebra::{Point3, RealField};

use super::config::Config;
use crate::{cloud::FeaturePoint, reference::ReferenceCloud};

/// An edge through the reference points `j` and `l`, which lie on different
/// scan rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeCorrespondence {
    pub j: usize,
    pub l: usize,
}

/// A plane through the reference points `j`, `l` and `m`. `j` and `l` share a
/// scan ring, `m` lies on a neighbouring one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneCorrespondence {
    pub j: usize,
    pub l: usize,
    pub m: usize,
}

/// Correspondences of one sweep's features, position-aligned with the
/// sharp-corner and flat-surface clouds. `None` marks a feature without a
/// match.
#[derive(Debug, Clone, Default)]
pub struct Correspondences {
    pub edges: Vec<Option<EdgeCorrespondence>>,
    pub planes: Vec<Option<PlaneCorrespondence>>,
}

/// Closest candidate seen so far in a neighbourhood scan.
struct Closest<T> {
    index: Option<usize>,
    distance_squared: T,
}

impl<T: RealField + Copy> Closest<T> {
    fn within(cutoff_squared: T) -> Self {
        Self {
            index: None,
            distance_squared: cutoff_squared,
        }
    }

    fn offer(&mut self, index: usize, distance_squared: T) {
        if distance_squared < self.distance_squared {
            self.index = Some(index);
            self.distance_squared = distance_squared;
        }
    }
}

/// The nearest reference point, if it lies strictly within the cutoff.
fn nearest_within<T: RealField + Copy>(
    reference: &ReferenceCloud<T>,
    query: &Point3<T>,
    config: &Config<T>,
) -> Option<usize> {
    let (index, distance_squared) = reference.nearest(query)?;
    (distance_squared < config.max_correspondence_distance_squared()).then_some(index)
}

/// Visit the points around `j` in index order, walking forward and then
/// backward until a ring farther than `window` from the ring of `j` is met.
fn visit_ring_neighbourhood<T: RealField + Copy>(
    points: &[FeaturePoint<T>],
    j: usize,
    window: T,
    mut visit: impl FnMut(usize, &FeaturePoint<T>),
) {
    let ring = points[j].ring();
    for (index, point) in points.iter().enumerate().skip(j + 1) {
        if point.ring() > ring + window {
            break;
        }
        visit(index, point);
    }
    for (index, point) in points.iter().enumerate().take(j).rev() {
        if point.ring() < ring - window {
            break;
        }
        visit(index, point);
    }
}

/// Find the edge matching `query`, a sharp-corner point already expressed at
/// the start of the sweep.
pub fn find_edge<T: RealField + Copy>(
    reference: &ReferenceCloud<T>,
    query: &Point3<T>,
    config: &Config<T>,
) -> Option<EdgeCorrespondence> {
    let j = nearest_within(reference, query, config)?;
    let points = reference.points();
    let ring = points[j].ring();
    let window = config.ring_window;

    let mut second = Closest::within(config.max_correspondence_distance_squared());
    visit_ring_neighbourhood(points, j, window, |index, point| {
        let delta = point.ring() - ring;
        if delta != T::zero() && delta.abs() <= window {
            second.offer(index, nalgebra::distance_squared(&point.position, query));
        }
    });

    second.index.map(|l| EdgeCorrespondence { j, l })
}

/// Find the plane matching `query`, a flat-surface point already expressed at
/// the start of the sweep.
pub fn find_plane<T: RealField + Copy>(
    reference: &ReferenceCloud<T>,
    query: &Point3<T>,
    config: &Config<T>,
) -> Option<PlaneCorrespondence> {
    let j = nearest_within(reference, query, config)?;
    let points = reference.points();
    let ring = points[j].ring();
    let window = config.ring_window;

    let mut same_ring = Closest::within(config.max_correspondence_distance_squared());
    let mut other_ring = Closest::within(config.max_correspondence_distance_squared());
    visit_ring_neighbourhood(points, j, window, |index, point| {
        let delta = point.ring() - ring;
        let distance_squared = nalgebra::distance_squared(&point.position, query);
        if delta == T::zero() {
            same_ring.offer(index, distance_squared);
        } else if delta.abs() <= window {
            other_ring.offer(index, distance_squared);
        }
    });

    Some(PlaneCorrespondence {
        j,
        l: same_ring.index?,
        m: other_ring.index?,
    })
}

impl Correspondences {
    /// Match every point of both feature clouds, given a function that
    /// reprojects a point to the start of the sweep.
    pub fn search<T: RealField + Copy>(
        corners: &[FeaturePoint<T>],
        surfaces: &[FeaturePoint<T>],
        last_corner: &ReferenceCloud<T>,
        last_surface: &ReferenceCloud<T>,
        config: &Config<T>,
        to_start: impl Fn(&FeaturePoint<T>) -> Point3<T>,
    ) -> Self {
        Self {
            edges: corners
                .iter()
                .map(|point| find_edge(last_corner, &to_start(point), config))
                .collect(),
            planes: surfaces
                .iter()
                .map(|point| find_plane(last_surface, &to_start(point), config))
                .collect(),
        }
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().flatten().count()
    }

    pub fn plane_count(&self) -> usize {
        self.planes.iter().flatten().count()
    }
}
