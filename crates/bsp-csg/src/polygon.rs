//! Convex planar polygon used by the BSP tree.

use nalgebra::{Matrix4, Point3, Vector3};

use crate::{Classification, Plane, PlaneSide, Vertex};

/// A convex polygon in 3D space, defined by an ordered list of vertices.
///
/// Vertex order is winding order; the front face is the side the derived
/// normal points to. The plane is derived from the first three vertices and
/// re-derived whenever the vertex list is replaced.
///
/// Vertices must be coplanar and the first three must not be collinear. This
/// is not checked; degenerate input produces a NaN plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vertex>,
    plane: Plane,
}

impl Polygon {
    /// Creates a new polygon from a list of vertices.
    ///
    /// # Panics (debug builds only)
    /// Panics if fewer than 3 vertices are provided.
    pub fn new(vertices: Vec<Vertex>) -> Self {
        debug_assert!(vertices.len() >= 3, "Polygon must have at least 3 vertices");
        let plane = derive_plane(&vertices);
        Self { vertices, plane }
    }

    /// Creates a polygon with a known plane, skipping derivation.
    pub(crate) fn from_parts(vertices: Vec<Vertex>, plane: Plane) -> Self {
        Self { vertices, plane }
    }

    /// Re-derives the normal and plane constant from the current vertices.
    pub fn calculate_properties(&mut self) {
        self.plane = derive_plane(&self.vertices);
    }

    /// Replaces the vertex list and re-derives the plane.
    pub fn set_vertices(&mut self, vertices: Vec<Vertex>) {
        debug_assert!(vertices.len() >= 3, "Polygon must have at least 3 vertices");
        self.vertices = vertices;
        self.calculate_properties();
    }

    /// Returns the vertices of the polygon.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Returns the plane that this polygon lies on.
    #[inline]
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Returns the unit normal.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.plane.normal()
    }

    /// Returns the plane constant `w` (`normal · v = w` for every vertex).
    #[inline]
    pub fn w(&self) -> f64 {
        self.plane.w()
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the polygon has no vertices (always false for valid polygons).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Computes the centroid (average of the vertex positions).
    pub fn centroid(&self) -> Point3<f64> {
        let sum: Vector3<f64> = self.vertices.iter().map(|v| v.position.coords).sum();
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Flips the polygon: negates the plane and reverses the winding.
    pub fn invert(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }

    /// Returns a flipped copy of this polygon.
    pub fn inverted(&self) -> Self {
        let mut polygon = self.clone();
        polygon.invert();
        polygon
    }

    /// Classifies a vertex against this polygon's plane.
    #[inline]
    pub fn classify_vertex(&self, vertex: &Vertex) -> PlaneSide {
        self.plane.classify_point(&vertex.position)
    }

    /// Classifies another polygon against this polygon's plane.
    ///
    /// Returns:
    /// - `Coplanar` if all vertices lie on the plane
    /// - `Front` if no vertex is behind the plane
    /// - `Back` if no vertex is in front of the plane
    /// - `Spanning` if vertices are on both sides
    pub fn classify_side(&self, other: &Polygon) -> Classification {
        Classification::combine(other.vertices.iter().map(|v| self.classify_vertex(v)))
    }

    /// Transforms every vertex position and re-derives the plane.
    pub fn apply_transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            vertex.apply_transform(matrix);
        }
        self.calculate_properties();
    }
}

fn derive_plane(vertices: &[Vertex]) -> Plane {
    Plane::from_points(
        &vertices[0].position,
        &vertices[1].position,
        &vertices[2].position,
    )
}
