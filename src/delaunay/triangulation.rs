use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, ensure, Result};
use smallvec::{smallvec, SmallVec};

use crate::delaunay::arena::Arena;
use crate::point::{Point, Positioning};
use crate::point_locator::PointLocator;
use crate::triangulation::{FaceId, LevelTriangulation, LocateType, Location, VertexId};

/// Placeholder for neighbors that are not connected yet.
const NO_FACE: FaceId = FaceId(usize::MAX);

/// A two-dimensional Delaunay triangulation.
///
/// The convex hull is closed with a single *infinite* vertex: every edge of the hull is shared by
/// a finite face and an infinite face made of the edge and the infinite vertex. This way every
/// face has exactly three vertices and three neighbors, which keeps the walking and insertion
/// algorithms free of special cases.
///
/// Faces store their vertices in counter-clockwise order, and the `i`-th neighbor of a face is
/// the one sharing the edge opposite to its `i`-th vertex.
///
/// Points are inserted incrementally with the Bowyer-Watson algorithm: the faces whose
/// circumcircle contains the new point are removed, and the resulting star-shaped hole is
/// re-triangulated by connecting its boundary to the new point. Finding the first face in
/// conflict is done by walking from a hint face, which is where a [`Hierarchy`] makes the
/// difference.
///
/// As long as the triangulation has fewer than three vertices, or only collinear ones, it has
/// no face at all and vertices are simply stored.
///
/// Each vertex carries some data of type `D`.
///
/// [`Hierarchy`]: crate::Hierarchy
#[derive(Debug)]
pub struct DelaunayTriangulation<D = ()> {
    vertices: Arena<Vertex<D>>,
    faces: Arena<Face>,
    infinite: VertexId,
}

#[derive(Debug, Clone)]
struct Vertex<D> {
    point: Point,
    face: Option<FaceId>,
    data: D,
}

#[derive(Debug, Clone, Copy)]
struct Face {
    vertices: [VertexId; 3],
    neighbors: [FaceId; 3],
}

/// Index following `i` in counter-clockwise order.
fn ccw(i: usize) -> usize {
    (i + 1) % 3
}

/// Index following `i` in clockwise order.
fn cw(i: usize) -> usize {
    (i + 2) % 3
}

impl<D: Default> Default for DelaunayTriangulation<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Default + Clone> Clone for DelaunayTriangulation<D> {
    fn clone(&self) -> Self {
        let mut copy = Self::new();
        copy.copy_triangulation(self);
        copy
    }
}

impl<D: Default> DelaunayTriangulation<D> {
    /// Creates an empty triangulation.
    pub fn new() -> Self {
        let mut vertices = Arena::new();
        let infinite = VertexId(vertices.add(Vertex {
            point: Point::new(f64::INFINITY, f64::INFINITY),
            face: None,
            data: D::default(),
        }));
        Self {
            vertices,
            faces: Arena::new(),
            infinite,
        }
    }

    fn add_vertex(&mut self, point: Point) -> VertexId {
        VertexId(self.vertices.add(Vertex {
            point,
            face: None,
            data: D::default(),
        }))
    }
}

impl<D> DelaunayTriangulation<D> {
    /// Returns the number of faces, including the infinite ones.
    pub fn number_of_faces(&self) -> usize {
        self.faces.len()
    }

    /// An iterator over the finite faces.
    pub fn finite_faces(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces
            .iter()
            .filter(|(_, face)| !face.vertices.contains(&self.infinite))
            .map(|(idx, _)| FaceId(idx))
    }

    /// Returns the corners of a finite face, in counter-clockwise order.
    pub fn triangle(&self, face: FaceId) -> Option<[Point; 3]> {
        let face = self.faces.get(face.0)?;
        if face.vertices.contains(&self.infinite) {
            return None;
        }
        Some(face.vertices.map(|v| self.coords(v)))
    }

    /// Returns the vertex of the triangulation located exactly at `point`, if any.
    pub fn vertex_at(&self, point: &Point) -> Option<VertexId> {
        if self.faces.is_empty() {
            return self.finite_vertices().find(|&v| self.coords(v) == *point);
        }
        let location = self.locate_from(point, None);
        match (location.locate_type, location.face) {
            (LocateType::Vertex, Some(face)) => Some(self.face(face).vertices[location.index]),
            _ => None,
        }
    }

    fn finite_vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices
            .iter()
            .map(|(idx, _)| VertexId(idx))
            .filter(|&v| v != self.infinite)
    }

    fn face(&self, face: FaceId) -> &Face {
        self.faces
            .get(face.0)
            .expect("Face should be in the triangulation")
    }

    fn face_mut(&mut self, face: FaceId) -> &mut Face {
        self.faces
            .get_mut(face.0)
            .expect("Face should be in the triangulation")
    }

    fn coords(&self, vertex: VertexId) -> Point {
        self.vertices
            .get(vertex.0)
            .expect("Vertex should be in the triangulation")
            .point
    }

    fn set_incident_face(&mut self, vertex: VertexId, face: FaceId) {
        self.vertices
            .entry(vertex.0)
            .and_modify(|vertex| vertex.face = Some(face));
    }

    /// Index of the infinite vertex in `face`, if it is an infinite face.
    fn infinite_index(&self, face: FaceId) -> Option<usize> {
        self.face(face)
            .vertices
            .iter()
            .position(|&v| v == self.infinite)
    }

    /// Index of the vertex of `face` that is not on the edge `(a, b)`.
    fn mirror_index(&self, face: FaceId, a: VertexId, b: VertexId) -> usize {
        self.face(face)
            .vertices
            .iter()
            .position(|&v| v != a && v != b)
            .expect("Neighboring faces should share an edge")
    }

    fn add_face(&mut self, vertices: [VertexId; 3]) -> FaceId {
        FaceId(self.faces.add(Face {
            vertices,
            neighbors: [NO_FACE; 3],
        }))
    }

    /// Returns `true` if `point` lies strictly inside the circumcircle of `face`.
    ///
    /// The "circumcircle" of an infinite face is the open half-plane on the outer side of its
    /// finite edge, plus the interior of the edge itself.
    fn in_conflict(&self, face: FaceId, point: &Point) -> bool {
        let vertices = self.face(face).vertices;
        match self.infinite_index(face) {
            Some(i) => {
                let p = self.coords(vertices[ccw(i)]);
                let q = self.coords(vertices[cw(i)]);
                match point.position(p, q) {
                    Positioning::Left => true,
                    Positioning::Right => false,
                    Positioning::On => point.is_strictly_between(p, q),
                }
            }
            None => {
                let [a, b, c] = vertices.map(|v| self.coords(v));
                point.is_in_circle(a, b, c)
            }
        }
    }

    fn locate_from(&self, point: &Point, hint: Option<FaceId>) -> Location {
        let start = hint
            .filter(|face| self.faces.contains(face.0))
            .or_else(|| self.faces.iter().next().map(|(idx, _)| FaceId(idx)));
        match start {
            Some(start) => self.walk(point, start),
            None => Location::outside_affine_hull(),
        }
    }

    /// Locates a point by walking from `start` towards it.
    ///
    /// At each step, we cross an edge that separates the current face from the point. The first
    /// edge tested rotates with each step, which is enough to prevent the walk from cycling.
    fn walk(&self, point: &Point, start: FaceId) -> Location {
        let mut current = start;
        if let Some(i) = self.infinite_index(current) {
            current = self.face(current).neighbors[i];
        }
        let mut previous = None;
        for step in 0..=self.faces.len() {
            let face = self.face(current);
            let next = (0..3).map(|k| (k + step) % 3).find_map(|i| {
                let neighbor = face.neighbors[i];
                if Some(neighbor) == previous {
                    // We just came from there
                    return None;
                }
                let p = self.coords(face.vertices[ccw(i)]);
                let q = self.coords(face.vertices[cw(i)]);
                matches!(point.position(p, q), Positioning::Right).then_some(neighbor)
            });
            let Some(neighbor) = next else {
                return self.classify(point, current);
            };
            if let Some(i) = self.infinite_index(neighbor) {
                return Location {
                    face: Some(neighbor),
                    locate_type: LocateType::OutsideConvexHull,
                    index: i,
                };
            }
            previous = Some(current);
            current = neighbor;
        }
        tracing::warn!(
            ?point,
            "Walk did not terminate, falling back to an exhaustive search"
        );
        self.locate_exhaustively(point)
    }

    /// Classifies a point that lies in the closed finite face `face`.
    fn classify(&self, point: &Point, face: FaceId) -> Location {
        let vertices = self.face(face).vertices;
        let on: SmallVec<[usize; 3]> = (0..3)
            .filter(|&i| {
                let p = self.coords(vertices[ccw(i)]);
                let q = self.coords(vertices[cw(i)]);
                matches!(point.position(p, q), Positioning::On)
            })
            .collect();
        let (locate_type, index) = match on.as_slice() {
            [i] => (LocateType::Edge, *i),
            [i, j] => (LocateType::Vertex, 3 - i - j),
            _ => (LocateType::Face, 0),
        };
        Location {
            face: Some(face),
            locate_type,
            index,
        }
    }

    fn locate_exhaustively(&self, point: &Point) -> Location {
        let containing = self.finite_faces().find(|&face| {
            let vertices = self.face(face).vertices;
            (0..3).all(|i| {
                let p = self.coords(vertices[ccw(i)]);
                let q = self.coords(vertices[cw(i)]);
                !matches!(point.position(p, q), Positioning::Right)
            })
        });
        if let Some(face) = containing {
            return self.classify(point, face);
        }
        self.faces
            .iter()
            .map(|(idx, _)| FaceId(idx))
            .find_map(|face| {
                let i = self.infinite_index(face)?;
                self.in_conflict(face, point).then_some(Location {
                    face: Some(face),
                    locate_type: LocateType::OutsideConvexHull,
                    index: i,
                })
            })
            .unwrap_or_else(Location::outside_affine_hull)
    }

    /// Finds three vertices that are not collinear, returned in counter-clockwise order.
    fn find_non_collinear(&self, vertices: &[VertexId]) -> Option<[VertexId; 3]> {
        let (&a, &b) = (vertices.first()?, vertices.get(1)?);
        let (pa, pb) = (self.coords(a), self.coords(b));
        vertices[2..]
            .iter()
            .find_map(|&c| match self.coords(c).position(pa, pb) {
                Positioning::Left => Some([a, b, c]),
                Positioning::Right => Some([b, a, c]),
                Positioning::On => None,
            })
    }

    /// Builds the first finite face and the three infinite faces around it.
    fn create_initial_faces(&mut self, corners: [VertexId; 3]) {
        let infinite_vertex = self.infinite;
        let finite = self.add_face(corners);
        let infinite: [FaceId; 3] = std::array::from_fn(|i| {
            self.add_face([corners[cw(i)], corners[ccw(i)], infinite_vertex])
        });
        self.face_mut(finite).neighbors = infinite;
        for i in 0..3 {
            self.face_mut(infinite[i]).neighbors = [infinite[cw(i)], infinite[ccw(i)], finite];
        }
        for vertex in corners {
            self.set_incident_face(vertex, finite);
        }
        self.set_incident_face(infinite_vertex, infinite[0]);
    }

    /// Inserts an existing vertex in the faces, `start` being a face in conflict with it.
    fn insert_in_hole(&mut self, vertex: VertexId, start: FaceId) {
        let point = self.coords(vertex);

        // Find the faces whose circumcircle contains the point. They form a connected region.
        let mut hole = Vec::new();
        let mut in_hole = HashSet::new();
        let mut stack: SmallVec<[FaceId; 16]> = smallvec![start];
        while let Some(face) = stack.pop() {
            if !in_hole.insert(face) {
                continue;
            }
            hole.push(face);
            for &neighbor in &self.face(face).neighbors {
                if !in_hole.contains(&neighbor) && self.in_conflict(neighbor, &point) {
                    stack.push(neighbor);
                }
            }
        }

        // Edges of the hole's boundary, seen from the inside, with the face on the other side
        let mut boundary = Vec::with_capacity(hole.len() + 2);
        for &face in &hole {
            let Face {
                vertices,
                neighbors,
            } = *self.face(face);
            for i in 0..3 {
                if !in_hole.contains(&neighbors[i]) {
                    boundary.push((vertices[ccw(i)], vertices[cw(i)], neighbors[i]));
                }
            }
        }
        for face in hole {
            self.faces.remove(face.0);
        }

        // Connect the new vertex to every boundary edge
        let mut by_first = HashMap::with_capacity(boundary.len());
        let mut by_second = HashMap::with_capacity(boundary.len());
        let mut created = Vec::with_capacity(boundary.len());
        for (a, b, outside) in boundary {
            let new_face = self.add_face([vertex, a, b]);
            self.face_mut(new_face).neighbors[0] = outside;
            let mirror = self.mirror_index(outside, a, b);
            self.face_mut(outside).neighbors[mirror] = new_face;
            self.set_incident_face(a, new_face);
            self.set_incident_face(b, new_face);
            by_first.insert(a, new_face);
            by_second.insert(b, new_face);
            created.push((new_face, a, b));
        }
        // The boundary is a cycle, so each vertex starts exactly one edge and ends exactly one
        for &(new_face, a, b) in &created {
            let neighbors = &mut self.face_mut(new_face).neighbors;
            neighbors[1] = by_first[&b];
            neighbors[2] = by_second[&a];
        }
        if let Some(&(new_face, ..)) = created.first() {
            self.set_incident_face(vertex, new_face);
        }
    }

    /// Builds the faces from the stored vertices, if they span the plane.
    fn triangulate_affine_hull(&mut self) {
        let vertices: Vec<VertexId> = self.finite_vertices().collect();
        let Some(corners) = self.find_non_collinear(&vertices) else {
            return;
        };
        self.create_initial_faces(corners);
        let mut hint = self.vertices.get(corners[0].0).and_then(|v| v.face);
        for vertex in vertices {
            if corners.contains(&vertex) {
                continue;
            }
            let point = self.coords(vertex);
            let face = self
                .locate_from(&point, hint)
                .face
                .expect("Points can always be located in a two-dimensional triangulation");
            self.insert_in_hole(vertex, face);
            hint = self.vertices.get(vertex.0).and_then(|v| v.face);
        }
    }

    /// Throws away every face and triangulates the remaining vertices from scratch.
    fn retriangulate(&mut self) {
        self.faces.clear();
        for (_, vertex) in self.vertices.iter_mut() {
            vertex.face = None;
        }
        self.triangulate_affine_hull();
    }

    fn check_faces(&self) -> bool {
        // The geometric checks below need every vertex of every face
        for (idx, face) in self.faces.iter() {
            if let Some(vertex) = face.vertices.iter().find(|v| !self.vertices.contains(v.0)) {
                tracing::debug!(face = idx, ?vertex, "Vertex is not in the triangulation");
                return false;
            }
        }

        let mut result = true;
        for (idx, face) in self.faces.iter() {
            let id = FaceId(idx);
            for i in 0..3 {
                let neighbor = face.neighbors[i];
                let (a, b) = (face.vertices[ccw(i)], face.vertices[cw(i)]);
                let Some(other) = self.faces.get(neighbor.0) else {
                    tracing::debug!(face = idx, ?neighbor, "Neighbor is not in the triangulation");
                    result = false;
                    continue;
                };
                let Some(mirror) = other.vertices.iter().position(|&v| v != a && v != b) else {
                    tracing::debug!(face = idx, ?neighbor, "Neighbors do not share an edge");
                    result = false;
                    continue;
                };
                let shares_edge =
                    other.vertices[ccw(mirror)] == b && other.vertices[cw(mirror)] == a;
                if !shares_edge || other.neighbors[mirror] != id {
                    tracing::debug!(face = idx, ?neighbor, "Neighbors are not reciprocal");
                    result = false;
                    continue;
                }
                // Local Delaunay property (local convexity of the hull for infinite faces)
                let opposite = other.vertices[mirror];
                if opposite != self.infinite && self.in_conflict(id, &self.coords(opposite)) {
                    tracing::debug!(face = idx, ?neighbor, "Edge is not locally Delaunay");
                    result = false;
                }
            }
            if !face.vertices.contains(&self.infinite) {
                let [a, b, c] = face.vertices.map(|v| self.coords(v));
                if !matches!(c.position(a, b), Positioning::Left) {
                    tracing::debug!(face = idx, "Face is not counter-clockwise");
                    result = false;
                }
            }
        }
        result
    }

    fn check_vertices(&self) -> bool {
        let mut result = true;
        for (idx, vertex) in self.vertices.iter() {
            let incident = vertex
                .face
                .and_then(|face| self.faces.get(face.0))
                .map_or(false, |face| face.vertices.contains(&VertexId(idx)));
            if !incident {
                tracing::debug!(vertex = idx, "Vertex has no valid incident face");
                result = false;
            }
        }
        result
    }
}

impl<D: Default + Clone> LevelTriangulation for DelaunayTriangulation<D> {
    type Data = D;

    fn insert(&mut self, point: Point, hint: Option<FaceId>) -> Result<VertexId> {
        ensure!(
            point.is_finite(),
            "Cannot insert {:?}: coordinates should be finite.",
            point
        );
        if self.faces.is_empty() {
            if let Some(existing) = self.vertex_at(&point) {
                return Ok(existing);
            }
            let vertex = self.add_vertex(point);
            self.triangulate_affine_hull();
            return Ok(vertex);
        }
        let location = self.locate_from(&point, hint);
        let face = location
            .face
            .ok_or_else(|| anyhow!("Could not locate {:?} in the triangulation.", point))?;
        if location.locate_type == LocateType::Vertex {
            return Ok(self.face(face).vertices[location.index]);
        }
        let vertex = self.add_vertex(point);
        self.insert_in_hole(vertex, face);
        Ok(vertex)
    }

    /// Removes a vertex.
    ///
    /// The remaining vertices are triangulated again from scratch. Their handles are preserved,
    /// but face handles are not.
    fn remove(&mut self, vertex: VertexId) -> Result<()> {
        ensure!(
            !self.is_infinite(vertex),
            "The infinite vertex cannot be removed."
        );
        self.vertices
            .remove(vertex.0)
            .ok_or_else(|| anyhow!("Vertex with index {} does not exist.", vertex.0))?;
        self.retriangulate();
        Ok(())
    }

    fn locate(&self, point: &Point, hint: Option<FaceId>) -> Location {
        self.locate_from(point, hint)
    }

    fn vertices(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        Box::new(self.finite_vertices())
    }

    fn is_infinite(&self, vertex: VertexId) -> bool {
        vertex == self.infinite
    }

    fn number_of_vertices(&self) -> usize {
        self.vertices.len() - 1
    }

    fn incident_face(&self, vertex: VertexId) -> Option<FaceId> {
        self.vertices.get(vertex.0)?.face
    }

    fn face_vertices(&self, face: FaceId) -> Option<[VertexId; 3]> {
        Some(self.faces.get(face.0)?.vertices)
    }

    fn point(&self, vertex: VertexId) -> Option<Point> {
        if self.is_infinite(vertex) {
            return None;
        }
        Some(self.vertices.get(vertex.0)?.point)
    }

    fn data(&self, vertex: VertexId) -> Option<&D> {
        Some(&self.vertices.get(vertex.0)?.data)
    }

    fn data_mut(&mut self, vertex: VertexId) -> Option<&mut D> {
        Some(&mut self.vertices.get_mut(vertex.0)?.data)
    }

    /// Checks the validity of the triangulation.
    ///
    /// This is meant for debugging purposes: every violation is reported with a
    /// [`tracing::debug!`] event.
    fn is_valid(&self) -> bool {
        if !self.vertices.contains(self.infinite.0) {
            tracing::debug!("The infinite vertex is missing");
            return false;
        }
        let n = self.number_of_vertices();
        if self.faces.is_empty() {
            // Lower-dimensional triangulation: all the vertices should be collinear
            let vertices: Vec<_> = self.finite_vertices().collect();
            if self.find_non_collinear(&vertices).is_some() {
                tracing::debug!(n, "Vertices span the plane but there is no face");
                return false;
            }
            return self.vertices.iter().all(|(_, vertex)| vertex.face.is_none());
        }
        if self.faces.len() != 2 * n - 2 {
            tracing::debug!(
                n,
                faces = self.faces.len(),
                "Wrong number of faces for the number of vertices"
            );
            return false;
        }
        self.check_faces() && self.check_vertices()
    }

    fn clear(&mut self) {
        *self = Self::new();
    }

    /// Copies `other` into `self`, compacting the storage along the way.
    fn copy_triangulation(&mut self, other: &Self) {
        let mut vertex_ids = HashMap::with_capacity(other.vertices.len());
        let mut vertices = Arena::with_capacity(other.vertices.len());
        for (idx, vertex) in other.vertices.iter() {
            vertex_ids.insert(idx, VertexId(vertices.add(vertex.clone())));
        }
        let mut face_ids = HashMap::with_capacity(other.faces.len());
        let mut faces = Arena::with_capacity(other.faces.len());
        for (idx, &face) in other.faces.iter() {
            face_ids.insert(idx, FaceId(faces.add(face)));
        }
        for (_, face) in faces.iter_mut() {
            face.vertices = face.vertices.map(|v: VertexId| vertex_ids[&v.0]);
            face.neighbors = face.neighbors.map(|f: FaceId| face_ids[&f.0]);
        }
        for (_, vertex) in vertices.iter_mut() {
            vertex.face = vertex.face.map(|f| face_ids[&f.0]);
        }
        self.infinite = vertex_ids[&other.infinite.0];
        self.vertices = vertices;
        self.faces = faces;
    }
}

impl<D: Default + Clone> PointLocator for DelaunayTriangulation<D> {
    fn locate_one(&self, point: &[f64; 2]) -> Option<FaceId> {
        let location = self.locate(&Point::from(point), None);
        location.is_inside().then_some(location.face).flatten()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::prelude::*;
    use rand::Rng;
    use rand_chacha::ChaCha8Rng;

    prop_compose! {
        fn coords_in_range(xmin: f64, xmax: f64, ymin: f64, ymax: f64)
                          (x in xmin..xmax, y in ymin..ymax) -> [f64; 2] {
           [x, y]
        }
    }

    pub(crate) fn random_points(n: usize, seed: u64) -> Vec<[f64; 2]> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n)
            .map(|_| [rng.gen::<f64>() * 10., rng.gen::<f64>() * 10.])
            .collect()
    }

    fn triangulate(points: &[[f64; 2]]) -> Result<(DelaunayTriangulation, Vec<VertexId>)> {
        let mut triangulation = DelaunayTriangulation::new();
        let vertices = points
            .iter()
            .map(|p| triangulation.insert(p.into(), None))
            .collect::<Result<_>>()?;
        Ok((triangulation, vertices))
    }

    fn infinite_face_count(triangulation: &DelaunayTriangulation) -> usize {
        triangulation.number_of_faces() - triangulation.finite_faces().count()
    }

    #[test]
    fn empty_triangulation() {
        let triangulation = DelaunayTriangulation::<()>::new();

        assert_eq!(triangulation.number_of_vertices(), 0);
        assert_eq!(triangulation.number_of_faces(), 0);
        assert!(triangulation.is_valid());
        assert_eq!(
            triangulation.locate(&Point::new(0., 0.), None),
            Location::outside_affine_hull()
        );
        assert_eq!(triangulation.locate_one(&[0., 0.]), None);
    }

    #[test]
    fn single_triangle() -> Result<()> {
        //
        //  2
        //  +
        //  |\
        //  | \
        //  |  \
        //  +---+
        //  0   1
        //
        let (triangulation, vertices) = triangulate(&[[0., 0.], [1., 0.], [0., 1.]])?;

        assert_eq!(triangulation.number_of_vertices(), 3);
        assert_eq!(triangulation.number_of_faces(), 4);
        assert_eq!(triangulation.finite_faces().count(), 1);
        assert!(triangulation.is_valid());

        let inside = triangulation.locate(&Point::new(0.25, 0.25), None);
        assert_eq!(inside.locate_type, LocateType::Face);
        let face = inside.face.unwrap();
        assert!(Point::new(0.25, 0.25).is_inside(triangulation.triangle(face).unwrap()));

        let outside = triangulation.locate(&Point::new(1., 1.), None);
        assert_eq!(outside.locate_type, LocateType::OutsideConvexHull);
        let face = outside.face.unwrap();
        let outside_vertices = triangulation.face_vertices(face).unwrap();
        assert!(triangulation.is_infinite(outside_vertices[outside.index]));

        let on_vertex = triangulation.locate(&Point::new(1., 0.), None);
        assert_eq!(on_vertex.locate_type, LocateType::Vertex);
        let face = on_vertex.face.unwrap();
        assert_eq!(
            triangulation.face_vertices(face).unwrap()[on_vertex.index],
            vertices[1]
        );

        let on_edge = triangulation.locate(&Point::new(0.5, 0.5), None);
        assert_eq!(on_edge.locate_type, LocateType::Edge);
        let face = on_edge.face.unwrap();
        assert_eq!(
            triangulation.face_vertices(face).unwrap()[on_edge.index],
            vertices[0]
        );

        Ok(())
    }

    #[test]
    fn collinear_points_have_no_face() -> Result<()> {
        let (mut triangulation, _) = triangulate(&[[0., 0.], [1., 1.], [2., 2.], [3., 3.]])?;

        assert_eq!(triangulation.number_of_vertices(), 4);
        assert_eq!(triangulation.number_of_faces(), 0);
        assert!(triangulation.is_valid());
        assert_eq!(
            triangulation.locate(&Point::new(1., 0.), None).locate_type,
            LocateType::OutsideAffineHull
        );

        // One point off the line is enough to span the plane
        triangulation.insert(Point::new(3., 0.), None)?;

        assert_eq!(triangulation.number_of_vertices(), 5);
        assert_eq!(triangulation.number_of_faces(), 2 * 5 - 2);
        assert!(triangulation.is_valid());

        Ok(())
    }

    #[test]
    fn axis_aligned_collinear_points() -> Result<()> {
        let (mut triangulation, _) = triangulate(&[[0., 1.], [0., 2.], [0., 0.]])?;

        assert_eq!(triangulation.number_of_faces(), 0);
        assert!(triangulation.is_valid());

        triangulation.insert(Point::new(-1., 0.), None)?;

        assert_eq!(triangulation.finite_faces().count(), 2);
        assert!(triangulation.is_valid());
        let location = triangulation.locate(&Point::new(0., 2.), None);
        assert_eq!(location.locate_type, LocateType::Vertex);

        Ok(())
    }

    #[test]
    fn duplicate_points_are_inserted_once() -> Result<()> {
        let (mut triangulation, vertices) = triangulate(&[[0., 0.], [0., 0.]])?;
        assert_eq!(vertices[0], vertices[1]);
        assert_eq!(triangulation.number_of_vertices(), 1);

        triangulation.insert(Point::new(1., 0.), None)?;
        triangulation.insert(Point::new(0., 1.), None)?;
        let again = triangulation.insert(Point::new(1., 0.), None)?;

        assert_eq!(triangulation.number_of_vertices(), 3);
        assert_eq!(triangulation.point(again), Some(Point::new(1., 0.)));
        assert!(triangulation.is_valid());

        Ok(())
    }

    #[test]
    fn non_finite_points_are_rejected() {
        let mut triangulation = DelaunayTriangulation::<()>::new();

        assert!(triangulation.insert(Point::new(f64::NAN, 0.), None).is_err());
        assert!(triangulation
            .insert(Point::new(0., f64::NEG_INFINITY), None)
            .is_err());
        assert_eq!(triangulation.number_of_vertices(), 0);
    }

    #[test]
    fn insert_on_hull_edge() -> Result<()> {
        let (mut triangulation, _) = triangulate(&[[0., 0.], [2., 0.], [0., 2.]])?;

        triangulation.insert(Point::new(1., 0.), None)?;

        assert_eq!(triangulation.number_of_vertices(), 4);
        assert_eq!(triangulation.finite_faces().count(), 2);
        assert_eq!(infinite_face_count(&triangulation), 4);
        assert!(triangulation.is_valid());

        Ok(())
    }

    #[test]
    fn square_grid_with_cocircular_points() -> Result<()> {
        let points: Vec<_> = (0..5)
            .flat_map(|i| (0..5).map(move |j| [i as f64, j as f64]))
            .collect();

        let (triangulation, _) = triangulate(&points)?;

        assert_eq!(triangulation.number_of_vertices(), 25);
        // 16 squares cut in two triangles each
        assert_eq!(triangulation.finite_faces().count(), 32);
        assert_eq!(infinite_face_count(&triangulation), 16);
        assert!(triangulation.is_valid());

        Ok(())
    }

    #[test]
    fn locate_with_hint() -> Result<()> {
        let points = random_points(200, 42);
        let (triangulation, vertices) = triangulate(&points)?;

        for (i, query) in random_points(50, 7).iter().enumerate() {
            let query = Point::from(query);
            let unseeded = triangulation.locate(&query, None);
            let hint = triangulation.incident_face(vertices[i]);
            let seeded = triangulation.locate(&query, hint);

            assert_eq!(seeded.locate_type, unseeded.locate_type);
            if seeded.locate_type == LocateType::Face {
                assert_eq!(seeded.face, unseeded.face);
            }
        }

        Ok(())
    }

    #[test]
    fn remove_vertices() -> Result<()> {
        let points = random_points(60, 3);
        let (mut triangulation, vertices) = triangulate(&points)?;

        for (removed, &vertex) in vertices.iter().enumerate().step_by(3) {
            triangulation.remove(vertex)?;
            assert!(triangulation.is_valid());
            assert_eq!(triangulation.point(vertex), None);
            assert!(triangulation.vertex_at(&points[removed].into()).is_none());
        }
        assert_eq!(triangulation.number_of_vertices(), 40);

        // The remaining handles are still valid
        for (idx, &vertex) in vertices.iter().enumerate() {
            if idx % 3 != 0 {
                assert_eq!(triangulation.point(vertex), Some(points[idx].into()));
            }
        }

        Ok(())
    }

    #[test]
    fn remove_down_to_a_lower_dimension() -> Result<()> {
        let (mut triangulation, vertices) = triangulate(&[[0., 0.], [1., 0.], [0., 1.]])?;

        triangulation.remove(vertices[2])?;

        assert_eq!(triangulation.number_of_vertices(), 2);
        assert_eq!(triangulation.number_of_faces(), 0);
        assert!(triangulation.is_valid());

        Ok(())
    }

    #[test]
    fn remove_missing_vertex_returns_error() -> Result<()> {
        let (mut triangulation, vertices) = triangulate(&[[0., 0.], [1., 0.], [0., 1.]])?;
        triangulation.remove(vertices[0])?;

        assert!(triangulation.remove(vertices[0]).is_err());
        assert!(triangulation.remove(VertexId(1000)).is_err());
        assert!(triangulation.remove(triangulation.infinite).is_err());

        Ok(())
    }

    #[test]
    fn copy_compacts_storage() -> Result<()> {
        let points = random_points(40, 11);
        let (mut triangulation, vertices) = triangulate(&points)?;
        for &vertex in vertices.iter().take(10) {
            triangulation.remove(vertex)?;
        }

        let copy = triangulation.clone();

        assert!(copy.is_valid());
        assert_eq!(copy.number_of_vertices(), 30);
        assert_eq!(copy.number_of_faces(), triangulation.number_of_faces());
        let max_index = copy.vertices().map(|v| v.index()).max().unwrap();
        assert_eq!(max_index, 30);
        for (idx, point) in points.iter().enumerate().skip(10) {
            let vertex = copy.vertex_at(&point.into()).unwrap();
            assert_eq!(copy.point(vertex), Some(points[idx].into()));
        }

        Ok(())
    }

    #[test]
    fn copy_carries_vertex_data() -> Result<()> {
        let mut triangulation = DelaunayTriangulation::<usize>::new();
        for (idx, point) in random_points(20, 5).iter().enumerate() {
            let vertex = triangulation.insert(point.into(), None)?;
            *triangulation.data_mut(vertex).unwrap() = idx;
        }

        let copy = triangulation.clone();

        for vertex in triangulation.vertices() {
            let point = triangulation.point(vertex).unwrap();
            let copied = copy.vertex_at(&point).unwrap();
            assert_eq!(copy.data(copied), triangulation.data(vertex));
        }

        Ok(())
    }

    #[test]
    fn dangling_handles_make_triangulation_invalid() -> Result<()> {
        let (mut triangulation, _) = triangulate(&random_points(20, 4))?;
        let face = triangulation.finite_faces().next().unwrap();
        triangulation.face_mut(face).vertices[0] = VertexId(1000);

        assert!(!triangulation.is_valid());

        let (mut triangulation, _) = triangulate(&random_points(20, 4))?;
        triangulation.face_mut(face).neighbors[1] = FaceId(1000);

        assert!(!triangulation.is_valid());

        Ok(())
    }

    #[test]
    fn clear_triangulation() -> Result<()> {
        let (mut triangulation, _) = triangulate(&random_points(30, 1))?;

        triangulation.clear();

        assert_eq!(triangulation.number_of_vertices(), 0);
        assert_eq!(triangulation.number_of_faces(), 0);
        assert!(triangulation.is_valid());

        Ok(())
    }

    #[test]
    fn same_counts_as_delaunator() -> Result<()> {
        let points = random_points(500, 2024);
        let (triangulation, _) = triangulate(&points)?;

        let reference = delaunator::triangulate(
            &points
                .iter()
                .map(|&[x, y]| delaunator::Point { x, y })
                .collect::<Vec<_>>(),
        );

        assert!(triangulation.is_valid());
        assert_eq!(
            triangulation.finite_faces().count(),
            reference.triangles.len() / 3
        );
        assert_eq!(infinite_face_count(&triangulation), reference.hull.len());

        Ok(())
    }

    #[test]
    fn delaunay_proptest() {
        let (xmin, xmax) = (0., 10.);
        let (ymin, ymax) = (0., 10.);

        proptest!(|(points in proptest::collection::vec(coords_in_range(xmin, xmax, ymin, ymax), 3..60),
                    queries in proptest::collection::vec(coords_in_range(xmin, xmax, ymin, ymax), 20))| {
            let (triangulation, _) = triangulate(&points).unwrap();

            assert!(triangulation.is_valid());

            // Check results using the winding number
            for query in queries.iter().map(Point::from) {
                let location = triangulation.locate(&query, None);
                if location.locate_type == LocateType::Face {
                    let triangle = triangulation.triangle(location.face.unwrap()).unwrap();
                    assert!(query.is_inside(triangle));
                }
            }
        });
    }
}
