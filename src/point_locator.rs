use rayon::prelude::*;

use crate::triangulation::FaceId;

/// A trait to locate one or several query points within a triangulation.
pub trait PointLocator {
    /// Locates one query point within a triangulation.
    ///
    /// Returns [`None`] if the query point does not lie in any finite face of the triangulation.
    fn locate_one(&self, point: &[f64; 2]) -> Option<FaceId>;

    /// Locates several query points within a triangulation.
    fn locate_many(&self, points: &[[f64; 2]]) -> Vec<Option<FaceId>> {
        points.iter().map(|point| self.locate_one(point)).collect()
    }

    /// Locates several query points within a triangulation in parallel.
    fn par_locate_many(&self, points: &[[f64; 2]]) -> Vec<Option<FaceId>>
    where
        Self: std::marker::Sync,
    {
        points
            .par_iter()
            .map(|point| self.locate_one(point))
            .collect()
    }
}
