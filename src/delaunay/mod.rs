mod arena;
pub(crate) mod triangulation;

pub use triangulation::DelaunayTriangulation;
