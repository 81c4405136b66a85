//! Binary Space Partitioning tree for CSG on polygon solids.
//!
//! A tree is built from the boundary polygons of a closed solid. Each node
//! splits space with the plane of a divider polygon; the front side of every
//! divider is outside the solid and the back side is inside (or further
//! subdivided). The tree supports:
//!
//! - Building and extending a tree from polygons ([`BspNode::build`])
//! - Complementing the solid it represents ([`BspNode::invert`])
//! - Removing polygon area inside the solid ([`BspNode::clip_polygons`],
//!   [`BspNode::clip_to`])
//! - Flattening back to polygons ([`BspNode::all_polygons`])
//!
//! # Example
//!
//! ```ignore
//! use bsp_csg::BspNode;
//!
//! let mut a = BspNode::from_polygons(cube_a)?;
//! let b = BspNode::from_polygons(cube_b)?;
//!
//! // Remove the part of A's surface inside B
//! a.clip_to(&b)?;
//! let surface = a.all_polygons();
//! ```

mod clip;
mod node;

pub use node::BspNode;
