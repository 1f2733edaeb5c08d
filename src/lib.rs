//! Point location in planar triangulations with a triangulation hierarchy.
//!
//! A [`Hierarchy`] is a stack of triangulations, each one holding a random sample of the points
//! of the level below. Point location starts in the sparsest level and walks its way down to
//! the base triangulation, using the result of each level as a starting point for the next. This
//! is the approach described by Devillers in [The Delaunay Hierarchy].
//!
//! The levels can be any triangulation implementing [`LevelTriangulation`]. The crate ships a
//! Delaunay triangulation, and [`DelaunayHierarchy`] is the corresponding hierarchy.
//!
//! # Example
//!
//! ```
//! use triangulation_hierarchy::{DelaunayHierarchy, PointLocator};
//!
//! let mut hierarchy = DelaunayHierarchy::new();
//! hierarchy.insert_many([[0., 0.], [2., 0.], [2., 2.], [0., 2.], [1., 0.5]])?;
//!
//! let faces = hierarchy.locate_many(&[[1., 1.5], [3., 3.]]);
//! assert!(faces[0].is_some());
//! assert_eq!(faces[1], None);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! [The Delaunay Hierarchy]: https://doi.org/10.1142/S0129054102001047

mod delaunay;
mod distance;
mod hierarchy;
mod level_generator;
mod point;
mod point_locator;
mod triangulation;

pub use delaunay::DelaunayTriangulation;
pub use distance::{DistanceComparator, Euclidean};
pub use hierarchy::{DelaunayHierarchy, Hierarchy, HierarchyLinks, MAX_LEVEL, MIN_SIZE, RATIO};
pub use level_generator::{RandomLeveler, DEFAULT_SEED};
pub use point::{Point, Positioning};
pub use point_locator::PointLocator;
pub use triangulation::{FaceId, LevelTriangulation, LocateType, Location, VertexId};
