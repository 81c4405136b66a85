//! Constructive Solid Geometry on triangle meshes using BSP (Binary Space
//! Partitioning) trees.
//!
//! Meshes enter as [`TriangulatedSurface`] plus a local-to-world transform and
//! become [`Csg`] solids. Solids combine with [`Csg::union`], [`Csg::subtract`]
//! and [`Csg::intersect`], and the result is exported again with
//! [`Csg::to_mesh`].
//!
//! ```
//! use bsp_csg::{Csg, TriangulatedSurface};
//! use nalgebra::{Matrix4, Point3};
//!
//! let a = TriangulatedSurface::cuboid(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
//! let b = TriangulatedSurface::cuboid(Point3::new(0.5, 0.0, 0.0), Point3::new(1.5, 1.0, 1.0));
//!
//! let a = Csg::from_mesh(&a, &Matrix4::identity())?;
//! let b = Csg::from_mesh(&b, &Matrix4::identity())?;
//!
//! let mesh = a.subtract(&b)?.to_mesh();
//! assert!(!mesh.is_empty());
//! # Ok::<(), bsp_csg::CsgError>(())
//! ```
//!
//! Geometry is kept in `f64` inside the kernel; meshes use `f32`.

mod bsp;
mod csg;
mod error;
mod mesh;
mod options;
mod plane;
mod polygon;
mod split;
mod vertex;

pub use bsp::BspNode;
pub use csg::Csg;
pub use error::{CsgError, Result};
pub use mesh::{Aabb, TriangulatedSurface};
pub use options::{CsgOptions, SplitStats, DEFAULT_MAX_DEPTH};
pub use plane::{Classification, Plane, PlaneSide, PLANE_EPSILON};
pub use polygon::Polygon;
pub use split::Partition;
pub use vertex::Vertex;
