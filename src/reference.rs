use std::fmt;

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::{Point3, RealField};

use crate::{
    cloud::{FeatureCloud, FeaturePoint},
    frame::frames,
};

/// The previous sweep's features, expressed at the start of the current
/// sweep, together with a k-d tree over them.
///
/// The index is optional: a cloud too small to be matched against is kept
/// unindexed and every query returns `None`. The tree is built once from the
/// whole cloud and never modified, so planar clouds whose points share a
/// coordinate, and duplicated points, are indexed like any other cloud.
pub struct ReferenceCloud<T: RealField> {
    cloud: FeatureCloud<T, frames::SweepStart>,
    index: Option<ImmutableKdTree<f64, 3>>,
}

impl<T: RealField> fmt::Debug for ReferenceCloud<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceCloud")
            .field("len", &self.cloud.len())
            .field("indexed", &self.index.is_some())
            .finish()
    }
}

impl<T: RealField + Copy> Default for ReferenceCloud<T> {
    fn default() -> Self {
        Self {
            cloud: Default::default(),
            index: None,
        }
    }
}

impl<T: RealField + Copy> ReferenceCloud<T> {
    /// Take ownership of `cloud`, dropping points with non-finite coordinates.
    pub fn new(mut cloud: FeatureCloud<T, frames::SweepStart>) -> Self {
        cloud.retain(FeaturePoint::is_finite);
        Self { cloud, index: None }
    }

    /// Index the cloud. An empty cloud stays unindexed.
    pub fn build_index(&mut self) {
        if self.cloud.is_empty() {
            self.index = None;
            return;
        }
        let coordinates: Vec<[f64; 3]> = self
            .cloud
            .iter()
            .map(|point| to_query(&point.position))
            .collect();
        self.index = Some(ImmutableKdTree::new_from_slice(&coordinates));
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// The index and squared distance of the point nearest to `query`.
    pub fn nearest(&self, query: &Point3<T>) -> Option<(usize, T)> {
        let tree = self.index.as_ref()?;
        let nearest = tree.nearest_one::<SquaredEuclidean>(&to_query(query));
        let distance: T = nalgebra::convert(nearest.distance);
        Some((nearest.item as usize, distance))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cloud.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cloud.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[FeaturePoint<T>] {
        &self.cloud
    }

    #[inline]
    pub fn cloud(&self) -> &FeatureCloud<T, frames::SweepStart> {
        &self.cloud
    }
}

#[inline]
fn to_query<T: RealField + Copy>(point: &Point3<T>) -> [f64; 3] {
    [
        point.x.to_subset_unchecked(),
        point.y.to_subset_unchecked(),
        point.z.to_subset_unchecked(),
    ]
}
