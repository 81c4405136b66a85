//! Triangulated surfaces exchanged with the rest of the engine.

use nalgebra::{Point3, Vector2, Vector3};

use crate::error::{CsgError, Result};

/// An indexed triangle mesh with per-vertex normals and texture coordinates.
///
/// This is the single-precision boundary format of the kernel: meshes come in
/// as `TriangulatedSurface` and results go out as `TriangulatedSurface`.
/// `normals` and `uvs` are either empty or hold one entry per position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangulatedSurface {
    pub positions: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub uvs: Vec<Vector2<f32>>,
    pub faces: Vec<[u32; 3]>,
}

impl TriangulatedSurface {
    /// Creates a mesh from its attribute lists.
    pub fn new(
        positions: Vec<Point3<f32>>,
        normals: Vec<Vector3<f32>>,
        uvs: Vec<Vector2<f32>>,
        faces: Vec<[u32; 3]>,
    ) -> Self {
        Self {
            positions,
            normals,
            uvs,
            faces,
        }
    }

    /// Generates an axis-aligned box spanning `min` to `max`.
    ///
    /// Each side gets its own four vertices so normals and UVs stay flat;
    /// triangles wind counter-clockwise when viewed from outside.
    pub fn cuboid(min: Point3<f32>, max: Point3<f32>) -> Self {
        let corners = [
            Point3::new(min.x, min.y, min.z), // 0: left-bottom-back
            Point3::new(max.x, min.y, min.z), // 1: right-bottom-back
            Point3::new(max.x, max.y, min.z), // 2: right-top-back
            Point3::new(min.x, max.y, min.z), // 3: left-top-back
            Point3::new(min.x, min.y, max.z), // 4: left-bottom-front
            Point3::new(max.x, min.y, max.z), // 5: right-bottom-front
            Point3::new(max.x, max.y, max.z), // 6: right-top-front
            Point3::new(min.x, max.y, max.z), // 7: left-top-front
        ];

        let sides: [([usize; 4], Vector3<f32>); 6] = [
            ([4, 5, 6, 7], Vector3::z()),  // front
            ([1, 0, 3, 2], -Vector3::z()), // back
            ([0, 4, 7, 3], -Vector3::x()), // left
            ([5, 1, 2, 6], Vector3::x()),  // right
            ([7, 6, 2, 3], Vector3::y()),  // top
            ([0, 1, 5, 4], -Vector3::y()), // bottom
        ];
        let quad_uvs = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
        ];

        let mut mesh = Self::default();
        for (indices, normal) in sides {
            let base = mesh.positions.len() as u32;
            for (corner, uv) in indices.iter().zip(quad_uvs) {
                mesh.positions.push(corners[*corner]);
                mesh.normals.push(normal);
                mesh.uvs.push(uv);
            }
            mesh.faces.push([base, base + 1, base + 2]);
            mesh.faces.push([base, base + 2, base + 3]);
        }
        mesh
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns true if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Returns the bounds of all positions, or `None` for a mesh without
    /// vertices.
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().map(|p| p.cast::<f64>()))
    }

    /// Checks that every face index is in range and that the attribute lists
    /// line up with the positions.
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.positions.len();

        for (attribute, actual) in [("normals", self.normals.len()), ("uvs", self.uvs.len())] {
            if actual != 0 && actual != vertex_count {
                return Err(CsgError::AttributeCountMismatch {
                    attribute,
                    expected: vertex_count,
                    actual,
                });
            }
        }

        for (face, indices) in self.faces.iter().enumerate() {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(CsgError::FaceIndexOutOfRange {
                    face,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(())
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Creates a box from its corners.
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Returns the smallest box containing all points, or `None` if there are
    /// none.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |bounds, p| Self {
            min: bounds.min.inf(&p),
            max: bounds.max.sup(&p),
        }))
    }

    /// Returns true if the point lies inside or on the box.
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    /// Returns the extent along each axis.
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn cuboid_layout() {
        let mesh = TriangulatedSurface::cuboid(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 2.0, 3.0),
        );

        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.normals.len(), 24);
        assert_eq!(mesh.uvs.len(), 24);
        assert!(mesh.validate().is_ok());

        let bounds = mesh.bounding_box().unwrap();
        assert_abs_diff_eq!(bounds.min, Point3::new(0.0, 0.0, 0.0));
        assert_abs_diff_eq!(bounds.max, Point3::new(1.0, 2.0, 3.0));
        assert_abs_diff_eq!(bounds.size(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn cuboid_winding_matches_normals() {
        let mesh = TriangulatedSurface::cuboid(
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, 1.0, 1.0),
        );

        for [a, b, c] in &mesh.faces {
            let (pa, pb, pc) = (
                mesh.positions[*a as usize],
                mesh.positions[*b as usize],
                mesh.positions[*c as usize],
            );
            let geometric = (pb - pa).cross(&(pc - pa)).normalize();
            assert_abs_diff_eq!(geometric, mesh.normals[*a as usize], epsilon = 1e-6);
        }
    }

    #[test]
    fn validate_rejects_bad_index() {
        let mut mesh = TriangulatedSurface::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        mesh.faces.push([0, 1, 24]);

        assert_eq!(
            mesh.validate(),
            Err(CsgError::FaceIndexOutOfRange {
                face: 12,
                index: 24,
                vertex_count: 24,
            })
        );
    }

    #[test]
    fn validate_rejects_mismatched_attributes() {
        let mut mesh = TriangulatedSurface::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        mesh.uvs.pop();

        assert_eq!(
            mesh.validate(),
            Err(CsgError::AttributeCountMismatch {
                attribute: "uvs",
                expected: 24,
                actual: 23,
            })
        );

        // Missing attributes altogether are fine
        mesh.uvs.clear();
        mesh.normals.clear();
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        let mesh = TriangulatedSurface::default();
        assert!(mesh.is_empty());
        assert!(mesh.bounding_box().is_none());
    }

    #[test]
    fn aabb_contains() {
        let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert!(bounds.contains(&Point3::new(0.5, 1.0, 0.0)));
        assert!(!bounds.contains(&Point3::new(0.5, 1.1, 0.0)));
    }
}
