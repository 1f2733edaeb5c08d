use anyhow::Result;

use crate::point::Point;

/// Handle of a vertex within one triangulation.
///
/// This is an index into the triangulation's vertex storage, so it is only meaningful for the
/// triangulation that returned it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub(crate) usize);

/// Handle of a face within one triangulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub(crate) usize);

impl VertexId {
    /// The raw index of the vertex in its triangulation's storage.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl FaceId {
    /// The raw index of the face in its triangulation's storage.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Classification of a located point with respect to the returned face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocateType {
    /// The point is the vertex with index [`Location::index`] of the face.
    Vertex,
    /// The point is on the edge opposite to the vertex with index [`Location::index`].
    Edge,
    /// The point is strictly inside a finite face.
    Face,
    /// The point is outside the convex hull; the face is an infinite face whose finite edge
    /// separates the point from the triangulation. The index is the one of the infinite vertex.
    OutsideConvexHull,
    /// The triangulation has no face yet (fewer than three points, or only collinear points).
    OutsideAffineHull,
}

/// Result of a point location query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Location {
    pub face: Option<FaceId>,
    pub locate_type: LocateType,
    pub index: usize,
}

impl Location {
    pub(crate) fn outside_affine_hull() -> Self {
        Self {
            face: None,
            locate_type: LocateType::OutsideAffineHull,
            index: 0,
        }
    }

    /// Returns `true` if the point lies in (or on the boundary of) a finite face.
    pub fn is_inside(&self) -> bool {
        matches!(
            self.locate_type,
            LocateType::Vertex | LocateType::Edge | LocateType::Face
        )
    }
}

/// The capabilities a planar triangulation must offer to be one level of a
/// [`Hierarchy`](crate::Hierarchy).
///
/// The triangulation is expected to have a single infinite vertex that closes the convex hull,
/// so that every face has exactly three vertices and three neighbors.
pub trait LevelTriangulation {
    /// Data attached to every vertex, copied along with the vertex.
    type Data;

    /// Inserts a point, starting the search for its position from `hint` if given.
    ///
    /// Inserting a point that is already a vertex returns the existing vertex.
    fn insert(&mut self, point: Point, hint: Option<FaceId>) -> Result<VertexId>;

    /// Removes a finite vertex.
    fn remove(&mut self, vertex: VertexId) -> Result<()>;

    /// Locates a point, starting the search from `hint` if given.
    fn locate(&self, point: &Point, hint: Option<FaceId>) -> Location;

    /// An iterator over the finite vertices.
    fn vertices(&self) -> Box<dyn Iterator<Item = VertexId> + '_>;

    /// Returns `true` if `vertex` is the infinite vertex.
    fn is_infinite(&self, vertex: VertexId) -> bool;

    /// Returns the number of finite vertices.
    fn number_of_vertices(&self) -> usize;

    /// Returns one of the faces incident to `vertex`, if any.
    fn incident_face(&self, vertex: VertexId) -> Option<FaceId>;

    /// Returns the three vertices of `face`, in counter-clockwise order.
    fn face_vertices(&self, face: FaceId) -> Option<[VertexId; 3]>;

    /// Returns the coordinates of a finite vertex.
    fn point(&self, vertex: VertexId) -> Option<Point>;

    /// Returns the data attached to a vertex.
    fn data(&self, vertex: VertexId) -> Option<&Self::Data>;

    /// Returns the data attached to a vertex, for modification.
    fn data_mut(&mut self, vertex: VertexId) -> Option<&mut Self::Data>;

    /// Checks the combinatorial and geometric consistency of the triangulation.
    fn is_valid(&self) -> bool;

    /// Removes every finite vertex.
    fn clear(&mut self);

    /// Replaces the content of `self` with a deep copy of `other`.
    ///
    /// Handles are allowed to change in the process, but the data attached to each vertex is
    /// copied verbatim.
    fn copy_triangulation(&mut self, other: &Self);

    /// Exchanges the content of two triangulations.
    fn swap(&mut self, other: &mut Self)
    where
        Self: Sized,
    {
        std::mem::swap(self, other);
    }
}
