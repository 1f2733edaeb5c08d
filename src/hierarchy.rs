use std::collections::HashMap;

use anyhow::{ensure, Result};
use itertools::Itertools;

use crate::delaunay::DelaunayTriangulation;
use crate::distance::{DistanceComparator, Euclidean};
use crate::level_generator::RandomLeveler;
use crate::point::Point;
use crate::point_locator::PointLocator;
use crate::triangulation::{FaceId, LevelTriangulation, Location, VertexId};

/// Number of levels of a hierarchy, the base level included.
pub const MAX_LEVEL: usize = 5;

/// Minimum number of vertices for a level to be used by the cascading search.
pub const MIN_SIZE: usize = 20;

/// Expected ratio between the numbers of vertices of two consecutive levels.
pub const RATIO: f64 = 30.;

/// Links between the copies of a point in two adjacent levels.
///
/// These are handles into the vertex storage of the level above (`up`) and below (`down`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyLinks {
    pub up: Option<VertexId>,
    pub down: Option<VertexId>,
}

/// A triangulation hierarchy.
///
/// This is a stack of [`MAX_LEVEL`] triangulations. The base level (level 0) holds all the
/// points and is the triangulation the hierarchy behaves as. Every inserted point is also
/// inserted in the levels `1..=k`, `k` being drawn at random so that each level holds about
/// [`RATIO`] times fewer points than the level below. The copies of a point in two adjacent
/// levels are linked together with [`HierarchyLinks`].
///
/// The upper levels are only there to speed up point location, which is the geometric analogue
/// of a search in a skip list: the point is located in the sparsest level first, then the vertex
/// of the located face nearest to the point is followed down to the level below, where the
/// search starts again from one of its incident faces. This takes *O*(log(*n*)) expected time,
/// against *O*(√*n*) for a walk in the base triangulation alone.
///
/// Every level is a [`LevelTriangulation`] whose vertices carry [`HierarchyLinks`], and "nearest"
/// is decided by a [`DistanceComparator`].
///
/// # Example
///
/// ```
/// use triangulation_hierarchy::{DelaunayHierarchy, LocateType};
///
/// let mut hierarchy = DelaunayHierarchy::new();
/// hierarchy.insert_many([[0., 0.], [1., 0.], [0., 1.], [1., 1.]])?;
///
/// let location = hierarchy.locate([0.2, 0.3]);
/// assert_eq!(location.locate_type, LocateType::Face);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct Hierarchy<T = DelaunayTriangulation<HierarchyLinks>, C = Euclidean> {
    levels: [T; MAX_LEVEL],
    leveler: RandomLeveler,
    comparator: C,
}

/// A hierarchy of Delaunay triangulations using Euclidean distances.
pub type DelaunayHierarchy = Hierarchy<DelaunayTriangulation<HierarchyLinks>, Euclidean>;

impl<T> Default for Hierarchy<T, Euclidean>
where
    T: LevelTriangulation<Data = HierarchyLinks> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Hierarchy<T, Euclidean>
where
    T: LevelTriangulation<Data = HierarchyLinks> + Default,
{
    /// Creates an empty hierarchy.
    pub fn new() -> Self {
        Self::with_comparator(Euclidean)
    }

    /// Creates an empty hierarchy whose levels are drawn from a generator seeded with `seed`.
    pub fn with_seed(seed: u64) -> Self {
        let mut hierarchy = Self::new();
        hierarchy.leveler = RandomLeveler::with_seed(seed);
        hierarchy
    }
}

impl<T, C> Hierarchy<T, C>
where
    T: LevelTriangulation<Data = HierarchyLinks> + Default,
    C: DistanceComparator,
{
    /// Creates an empty hierarchy using a custom distance comparison.
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            levels: std::array::from_fn(|_| T::default()),
            leveler: RandomLeveler::new(),
            comparator,
        }
    }
}

impl<T, C> Hierarchy<T, C>
where
    T: LevelTriangulation<Data = HierarchyLinks>,
    C: DistanceComparator,
{
    /// The base triangulation, which holds every point.
    pub fn base(&self) -> &T {
        &self.levels[0]
    }

    /// The triangulation of the given level, if `level < MAX_LEVEL`.
    pub fn level(&self, level: usize) -> Option<&T> {
        self.levels.get(level)
    }

    /// Returns the number of finite vertices of the base triangulation.
    pub fn number_of_vertices(&self) -> usize {
        self.base().number_of_vertices()
    }

    /// An iterator over the finite vertices of the base triangulation.
    pub fn vertices(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        self.base().vertices()
    }

    /// Returns the coordinates of a finite vertex of the base triangulation.
    pub fn point(&self, vertex: VertexId) -> Option<Point> {
        self.base().point(vertex)
    }

    /// Returns the links of `vertex` in the given level.
    pub fn links(&self, level: usize, vertex: VertexId) -> Option<HierarchyLinks> {
        self.levels.get(level)?.data(vertex).copied()
    }

    /// Inserts a point and returns the corresponding vertex of the base triangulation.
    ///
    /// Inserting a point that is already in the hierarchy returns the existing vertex.
    pub fn insert(&mut self, point: impl Into<Point>) -> Result<VertexId> {
        let level = self.leveler.random_level();
        self.insert_at_level(point.into(), level)
    }

    /// Same as [`insert`](Self::insert).
    pub fn push_back(&mut self, point: impl Into<Point>) -> Result<VertexId> {
        self.insert(point)
    }

    /// Inserts several points in order.
    ///
    /// Returns the number of vertices that were actually added to the base triangulation, which
    /// is lower than the number of points if some of them were already there.
    pub fn insert_many<P, I>(&mut self, points: I) -> Result<usize>
    where
        P: Into<Point>,
        I: IntoIterator<Item = P>,
    {
        let before = self.number_of_vertices();
        for point in points {
            self.insert(point)?;
        }
        Ok(self.number_of_vertices() - before)
    }

    /// Inserts a point in the levels `0..=level`.
    pub(crate) fn insert_at_level(&mut self, point: Point, level: usize) -> Result<VertexId> {
        ensure!(
            point.is_finite(),
            "Cannot insert {:?}: coordinates should be finite.",
            point
        );
        ensure!(
            level < MAX_LEVEL,
            "Cannot insert {:?} at level {}: there are only {} levels.",
            point,
            level,
            MAX_LEVEL
        );
        let (_, positions) = self.locate_in_levels(&point);
        let first = self.levels[0].insert(point, positions[0])?;
        tracing::trace!(?point, level, vertex = first.index(), "Inserted point");

        let mut previous = first;
        for upper in 1..=level {
            let vertex = self.levels[upper].insert(point, positions[upper])?;
            self.link(upper, vertex, previous);
            previous = vertex;
        }
        Ok(first)
    }

    /// Links `vertex` of level `level` with its copy `below` in the level below.
    fn link(&mut self, level: usize, vertex: VertexId, below: VertexId) {
        if let Some(links) = self.levels[level].data_mut(vertex) {
            links.down = Some(below);
        }
        if let Some(links) = self.levels[level - 1].data_mut(below) {
            links.up = Some(vertex);
        }
    }

    /// Removes a vertex of the base triangulation, along with its copies in the upper levels.
    pub fn remove(&mut self, vertex: VertexId) -> Result<()> {
        let mut current = Some(vertex);
        for (level, triangulation) in self.levels.iter_mut().enumerate() {
            let Some(vertex) = current else {
                break;
            };
            current = triangulation.data(vertex).and_then(|links| links.up);
            triangulation.remove(vertex)?;
            tracing::trace!(level, vertex = vertex.index(), "Removed vertex");
        }
        Ok(())
    }

    /// Same as [`remove`](Self::remove).
    pub fn remove_first(&mut self, vertex: VertexId) -> Result<()> {
        self.remove(vertex)
    }

    /// Same as [`remove`](Self::remove).
    pub fn remove_second(&mut self, vertex: VertexId) -> Result<()> {
        self.remove(vertex)
    }

    /// Same as [`remove`](Self::remove).
    pub fn remove_degree_3(&mut self, vertex: VertexId) -> Result<()> {
        self.remove(vertex)
    }

    /// Returns the highest level a vertex of the base triangulation was copied to.
    pub fn vertex_level(&self, vertex: VertexId) -> Option<usize> {
        self.base().point(vertex)?;
        let mut links = self.links(0, vertex)?;
        let mut level = 0;
        while let Some(up) = links.up {
            if level + 1 == MAX_LEVEL {
                break;
            }
            level += 1;
            links = self.links(level, up)?;
        }
        Some(level)
    }

    /// Locates a point in the base triangulation.
    pub fn locate(&self, point: impl Into<Point>) -> Location {
        self.locate_in_levels(&point.into()).0
    }

    /// Returns the face of the base triangulation containing a point.
    ///
    /// If the point is outside the convex hull, this is an infinite face. There is no face at
    /// all as long as the triangulation is degenerate.
    pub fn locate_face(&self, point: impl Into<Point>) -> Option<FaceId> {
        self.locate(point).face
    }

    /// Locates a point with a walk in the base triangulation only, starting from `hint`.
    pub fn locate_from_hint(&self, point: impl Into<Point>, hint: Option<FaceId>) -> Location {
        self.base().locate(&point.into(), hint)
    }

    /// Cascading point location.
    ///
    /// Returns the location in the base triangulation, along with the face located at each
    /// level visited on the way down.
    fn locate_in_levels(&self, point: &Point) -> (Location, [Option<FaceId>; MAX_LEVEL]) {
        let mut positions = [None; MAX_LEVEL];
        let mut level = (1..MAX_LEVEL)
            .rev()
            .find(|&level| self.levels[level].number_of_vertices() >= MIN_SIZE)
            .unwrap_or(0);

        let mut hint = None;
        while level > 0 {
            let location = self.levels[level].locate(point, hint);
            positions[level] = location.face;
            hint = location
                .face
                .and_then(|face| self.nearest_vertex(level, face, point))
                .and_then(|vertex| self.links(level, vertex)?.down)
                .and_then(|below| self.levels[level - 1].incident_face(below));
            level -= 1;
        }

        let location = self.levels[0].locate(point, hint);
        positions[0] = location.face;
        (location, positions)
    }

    /// Returns the finite vertex of `face` nearest to `point`.
    ///
    /// The infinite vertex is never the nearest, and ties go to the first vertex of the face.
    fn nearest_vertex(&self, level: usize, face: FaceId, point: &Point) -> Option<VertexId> {
        let triangulation = &self.levels[level];
        let mut nearest: Option<(VertexId, Point)> = None;
        for vertex in triangulation.face_vertices(face)? {
            if triangulation.is_infinite(vertex) {
                continue;
            }
            let Some(candidate) = triangulation.point(vertex) else {
                continue;
            };
            match nearest {
                Some((_, best)) if !self.comparator.closer(&candidate, &best, point) => {}
                _ => nearest = Some((vertex, candidate)),
            }
        }
        nearest.map(|(vertex, _)| vertex)
    }

    /// Removes every vertex from every level.
    pub fn clear(&mut self) {
        for triangulation in &mut self.levels {
            triangulation.clear();
        }
    }

    /// Exchanges the levels of two hierarchies.
    ///
    /// The random generators and distance comparisons stay where they are.
    pub fn swap(&mut self, other: &mut Self) {
        let (base, upper) = self.levels.split_at_mut(1);
        let (other_base, other_upper) = other.levels.split_at_mut(1);
        base[0].swap(&mut other_base[0]);
        for (mine, theirs) in upper.iter_mut().zip(other_upper) {
            std::mem::swap(mine, theirs);
        }
    }

    /// Checks every level, and the links between them.
    ///
    /// This is meant for debugging purposes: every violation is reported with a
    /// [`tracing::debug!`] event.
    pub fn is_valid(&self) -> bool {
        let mut result = true;
        for (level, triangulation) in self.levels.iter().enumerate() {
            if !triangulation.is_valid() {
                tracing::debug!(level, "Level is not a valid triangulation");
                result = false;
            }
        }

        for vertex in self.base().vertices() {
            if self.links(0, vertex).and_then(|links| links.down).is_some() {
                tracing::debug!(
                    vertex = vertex.index(),
                    "Vertex of the base level has a down link"
                );
                result = false;
            }
        }

        for (lower, upper) in (0..MAX_LEVEL).tuple_windows() {
            for vertex in self.levels[upper].vertices() {
                let Some(below) = self.links(upper, vertex).and_then(|links| links.down) else {
                    tracing::debug!(level = upper, vertex = vertex.index(), "Missing down link");
                    result = false;
                    continue;
                };
                if self.links(lower, below).and_then(|links| links.up) != Some(vertex) {
                    tracing::debug!(
                        level = upper,
                        vertex = vertex.index(),
                        "Down link is not reciprocal"
                    );
                    result = false;
                }
                let point = self.levels[upper].point(vertex);
                if point.is_none() || point != self.levels[lower].point(below) {
                    tracing::debug!(
                        level = upper,
                        vertex = vertex.index(),
                        "Vertex is not linked to a copy of its point"
                    );
                    result = false;
                }
            }
            for vertex in self.levels[lower].vertices() {
                let Some(above) = self.links(lower, vertex).and_then(|links| links.up) else {
                    continue;
                };
                if self.links(upper, above).and_then(|links| links.down) != Some(vertex) {
                    tracing::debug!(
                        level = lower,
                        vertex = vertex.index(),
                        "Up link is not reciprocal"
                    );
                    result = false;
                }
            }
        }
        result
    }

    /// Replaces the content of `self` with a deep copy of the levels of `other`.
    ///
    /// The random generator of `self` is left untouched.
    ///
    /// Each level is copied on its own, which leaves the links of the copied vertices pointing to
    /// vertices of `other`. They are then fixed level by level, from the bottom up: the old
    /// handle of a copied vertex can be recovered by following its (old) up link in `other`, and
    /// then the down link from there.
    pub fn copy_triangulation(&mut self, other: &Self) {
        for (mine, theirs) in self.levels.iter_mut().zip(&other.levels) {
            mine.copy_triangulation(theirs);
        }

        // Copied vertices of the current level, by handle in `other`
        let mut copies = self.old_handles(other, 0);
        for level in 1..MAX_LEVEL {
            let vertices: Vec<VertexId> = self.levels[level].vertices().collect();
            for &vertex in &vertices {
                let below = self
                    .links(level, vertex)
                    .and_then(|links| links.down)
                    .and_then(|old| copies.get(&old).copied());
                if let Some(links) = self.levels[level].data_mut(vertex) {
                    links.down = below;
                }
                if let Some(below) = below {
                    if let Some(links) = self.levels[level - 1].data_mut(below) {
                        links.up = Some(vertex);
                    }
                }
            }
            copies = self.old_handles(other, level);
        }
    }

    /// Maps the handles in `other` of the vertices of a freshly copied level to their new handles.
    ///
    /// Only the vertices that have a copy in the level above can be found this way, but these are
    /// the only ones that need to be.
    fn old_handles(&self, other: &Self, level: usize) -> HashMap<VertexId, VertexId> {
        let Some(other_upper) = other.levels.get(level + 1) else {
            return HashMap::new();
        };
        self.levels[level]
            .vertices()
            .filter_map(|vertex| {
                let above = self.links(level, vertex)?.up?;
                let old = other_upper.data(above)?.down?;
                Some((old, vertex))
            })
            .collect()
    }
}

impl<T, C> Clone for Hierarchy<T, C>
where
    T: LevelTriangulation<Data = HierarchyLinks> + Default,
    C: DistanceComparator + Clone,
{
    /// Copies the hierarchy, with a freshly seeded random generator.
    fn clone(&self) -> Self {
        let mut copy = Self::with_comparator(self.comparator.clone());
        copy.copy_triangulation(self);
        copy
    }

    /// Copies the levels of `source`, keeping the random generator of `self`.
    fn clone_from(&mut self, source: &Self) {
        self.comparator = source.comparator.clone();
        self.copy_triangulation(source);
    }
}

impl<T, C> PointLocator for Hierarchy<T, C>
where
    T: LevelTriangulation<Data = HierarchyLinks>,
    C: DistanceComparator,
{
    fn locate_one(&self, point: &[f64; 2]) -> Option<FaceId> {
        let location = self.locate(point);
        location.is_inside().then_some(location.face).flatten()
    }
}
