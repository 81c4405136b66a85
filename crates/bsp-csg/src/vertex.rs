//! Polygon vertex carrying position, normal and texture coordinates.

use nalgebra::{Matrix4, Point3, Vector2, Vector3};

/// A vertex of a CSG polygon.
///
/// Vertices have no identity beyond their value; every polygon owns its own
/// copies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
    pub uv: Vector2<f64>,
}

impl Vertex {
    /// Creates a new vertex.
    pub fn new(position: Point3<f64>, normal: Vector3<f64>, uv: Vector2<f64>) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// Creates a vertex with only a position; normal and UV are zero.
    pub fn from_position(position: Point3<f64>) -> Self {
        Self::new(position, Vector3::zeros(), Vector2::zeros())
    }

    /// Moves this vertex toward `other` by fraction `t`.
    ///
    /// Position, normal and UV are all blended linearly. The normal is not
    /// renormalized afterwards.
    pub fn lerp(&mut self, other: &Vertex, t: f64) {
        self.position += (other.position - self.position) * t;
        self.normal += (other.normal - self.normal) * t;
        self.uv += (other.uv - self.uv) * t;
    }

    /// Returns a new vertex `t` of the way from `self` to `other`.
    pub fn interpolate(&self, other: &Vertex, t: f64) -> Vertex {
        let mut vertex = *self;
        vertex.lerp(other, t);
        vertex
    }

    /// Transforms the position by a homogeneous matrix, dividing by the
    /// resulting `w`. Normal and UV are left as they are.
    pub fn apply_transform(&mut self, matrix: &Matrix4<f64>) {
        let h = matrix * self.position.to_homogeneous();
        self.position = Point3::new(h.x / h.w, h.y / h.w, h.z / h.w);
    }
}
