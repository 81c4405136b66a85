//! Boolean operations on solids.

use nalgebra::{Matrix3, Matrix4, Point3, Vector2, Vector3};

use crate::error::{CsgError, Result};
use crate::{Aabb, BspNode, CsgOptions, Polygon, SplitStats, TriangulatedSurface, Vertex};

/// Direction used for ray-parity containment tests, skewed off every axis and
/// diagonal.
fn ray_direction() -> Vector3<f64> {
    Vector3::new(0.831_7, 0.461_9, 0.307_9).normalize()
}

/// A solid ready for boolean operations.
///
/// Holds the BSP tree of the solid in world space together with the transform
/// that took the source mesh there, so results can be exported back into the
/// mesh's local space.
///
/// Operations never modify their operands: every boolean works on clones of
/// both trees and wraps the result in a new `Csg`, which keeps the first
/// operand's transform.
#[derive(Debug, Clone)]
pub struct Csg {
    tree: BspNode,
    transform: Matrix4<f64>,
    inverse: Matrix4<f64>,
}

impl Csg {
    /// Builds a solid from a closed, consistently wound triangle mesh placed in
    /// the world by `transform`.
    ///
    /// # Errors
    /// Fails if the mesh does not validate, the transform is singular, or the
    /// tree cannot be built.
    pub fn from_mesh(mesh: &TriangulatedSurface, transform: &Matrix4<f32>) -> Result<Self> {
        Self::from_mesh_with(mesh, transform, &CsgOptions::default(), &mut SplitStats::new())
    }

    /// Same as [`from_mesh`](Self::from_mesh) with explicit options and stats.
    pub fn from_mesh_with(
        mesh: &TriangulatedSurface,
        transform: &Matrix4<f32>,
        options: &CsgOptions,
        stats: &mut SplitStats,
    ) -> Result<Self> {
        mesh.validate()?;
        let transform = transform.cast::<f64>();
        let polygons = mesh_to_polygons(mesh, &transform);
        log::debug!("building CSG solid from {} triangles", polygons.len());
        Self::from_polygons_with(polygons, transform, options, stats)
    }

    /// Builds a solid from polygons that are already in world space.
    pub fn from_polygons(polygons: Vec<Polygon>, transform: Matrix4<f64>) -> Result<Self> {
        Self::from_polygons_with(
            polygons,
            transform,
            &CsgOptions::default(),
            &mut SplitStats::new(),
        )
    }

    fn from_polygons_with(
        polygons: Vec<Polygon>,
        transform: Matrix4<f64>,
        options: &CsgOptions,
        stats: &mut SplitStats,
    ) -> Result<Self> {
        let inverse = transform.try_inverse().ok_or(CsgError::SingularTransform)?;
        let mut tree = BspNode::new();
        tree.build_with(polygons, options, stats)?;
        Ok(Self {
            tree,
            transform,
            inverse,
        })
    }

    /// Returns the BSP tree of this solid.
    #[inline]
    pub fn tree(&self) -> &BspNode {
        &self.tree
    }

    /// Returns the local-to-world transform.
    #[inline]
    pub fn transform(&self) -> &Matrix4<f64> {
        &self.transform
    }

    /// Returns the boundary polygons in world space.
    pub fn polygons(&self) -> Vec<Polygon> {
        self.tree.all_polygons()
    }

    /// Returns the number of boundary polygons.
    pub fn polygon_count(&self) -> usize {
        self.tree.polygon_count()
    }

    /// Returns true if the solid has no boundary (e.g. `A - A`).
    pub fn is_empty(&self) -> bool {
        self.polygon_count() == 0
    }

    /// Returns the world-space bounds of the boundary, if there is one.
    pub fn bounding_box(&self) -> Option<Aabb> {
        let polygons = self.polygons();
        Aabb::from_points(
            polygons
                .iter()
                .flat_map(|p| p.vertices().iter().map(|v| v.position)),
        )
    }

    /// Returns a solid covering the space in either solid.
    ///
    /// ```text
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   A   |            |       |
    ///     |    +--+----+   =   |       +----+
    ///     +----+--+    |       +----+       |
    ///          |   B   |            |       |
    ///          |       |            |       |
    ///          +-------+            +-------+
    /// ```
    pub fn union(&self, other: &Csg) -> Result<Csg> {
        self.union_with(other, &CsgOptions::default(), &mut SplitStats::new())
    }

    /// Same as [`union`](Self::union) with explicit options and stats.
    pub fn union_with(
        &self,
        other: &Csg,
        options: &CsgOptions,
        stats: &mut SplitStats,
    ) -> Result<Csg> {
        let mut a = self.tree.clone();
        let mut b = other.tree.clone();

        log::trace!("union: clipping operands against each other");
        a.clip_to_with(&b, stats)?;
        b.clip_to_with(&a, stats)?;
        log::trace!("union: removing coplanar duplicates");
        b.invert();
        b.clip_to_with(&a, stats)?;
        b.invert();
        log::trace!("union: merging trees");
        a.build_with(b.all_polygons(), options, stats)?;

        Ok(self.finish("union", a, stats))
    }

    /// Returns a solid covering the space in this solid but not in `other`.
    ///
    /// ```text
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   A   |            |       |
    ///     |    +--+----+   =   |    +--+
    ///     +----+--+    |       +----+
    ///          |   B   |
    ///          |       |
    ///          +-------+
    /// ```
    pub fn subtract(&self, other: &Csg) -> Result<Csg> {
        self.subtract_with(other, &CsgOptions::default(), &mut SplitStats::new())
    }

    /// Same as [`subtract`](Self::subtract) with explicit options and stats.
    pub fn subtract_with(
        &self,
        other: &Csg,
        options: &CsgOptions,
        stats: &mut SplitStats,
    ) -> Result<Csg> {
        let mut a = self.tree.clone();
        let mut b = other.tree.clone();

        log::trace!("subtract: clipping complement against operand");
        a.invert();
        a.clip_to_with(&b, stats)?;
        b.clip_to_with(&a, stats)?;
        log::trace!("subtract: removing coplanar duplicates");
        b.invert();
        b.clip_to_with(&a, stats)?;
        b.invert();
        log::trace!("subtract: merging trees");
        a.build_with(b.all_polygons(), options, stats)?;
        a.invert();

        Ok(self.finish("subtract", a, stats))
    }

    /// Returns a solid covering the space in both solids.
    ///
    /// ```text
    ///     +-------+
    ///     |       |
    ///     |   A   |
    ///     |    +--+----+   =   +--+
    ///     +----+--+    |       +--+
    ///          |   B   |
    ///          |       |
    ///          +-------+
    /// ```
    pub fn intersect(&self, other: &Csg) -> Result<Csg> {
        self.intersect_with(other, &CsgOptions::default(), &mut SplitStats::new())
    }

    /// Same as [`intersect`](Self::intersect) with explicit options and stats.
    pub fn intersect_with(
        &self,
        other: &Csg,
        options: &CsgOptions,
        stats: &mut SplitStats,
    ) -> Result<Csg> {
        let mut a = self.tree.clone();
        let mut b = other.tree.clone();

        log::trace!("intersect: clipping operands against complements");
        a.invert();
        b.clip_to_with(&a, stats)?;
        b.invert();
        a.clip_to_with(&b, stats)?;
        b.clip_to_with(&a, stats)?;
        log::trace!("intersect: merging trees");
        a.build_with(b.all_polygons(), options, stats)?;
        a.invert();

        Ok(self.finish("intersect", a, stats))
    }

    fn finish(&self, operation: &str, tree: BspNode, stats: &SplitStats) -> Csg {
        log::debug!(
            "{operation}: {} polygons in {} nodes ({stats:?})",
            tree.polygon_count(),
            tree.node_count()
        );
        Csg {
            tree,
            transform: self.transform,
            inverse: self.inverse,
        }
    }

    /// Exports the boundary as a triangle mesh in this solid's local space.
    ///
    /// Each polygon is fanned into triangles `(v0, v[i-1], v[i])`, reversed
    /// when the transform mirrors so local winding matches the source mesh.
    /// Every emitted vertex carries its polygon's normal, mapped back into
    /// local space.
    pub fn to_mesh(&self) -> TriangulatedSurface {
        let normal_matrix: Matrix3<f64> = self.transform.fixed_view::<3, 3>(0, 0).transpose();
        let mirrored = is_mirroring(&self.transform);
        let mut mesh = TriangulatedSurface::default();

        for polygon in self.tree.all_polygons() {
            let normal = (normal_matrix * polygon.normal()).normalize().cast::<f32>();
            let base = mesh.positions.len() as u32;

            for vertex in polygon.vertices() {
                let mut local = *vertex;
                local.apply_transform(&self.inverse);
                mesh.positions.push(local.position.cast::<f32>());
                mesh.normals.push(normal);
                mesh.uvs.push(local.uv.cast::<f32>());
            }
            for i in 2..polygon.len() as u32 {
                if mirrored {
                    mesh.faces.push([base, base + i, base + i - 1]);
                } else {
                    mesh.faces.push([base, base + i - 1, base + i]);
                }
            }
        }

        mesh
    }

    /// Returns true if the world-space `point` is inside the solid.
    ///
    /// Counts boundary crossings along a fixed ray. Points on the boundary,
    /// or rays grazing an edge, give an unspecified answer.
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let direction = ray_direction();
        let mut crossings = 0usize;

        for polygon in self.tree.all_polygons() {
            let vertices = polygon.vertices();
            for i in 2..vertices.len() {
                if ray_hits_triangle(
                    point,
                    &direction,
                    &vertices[0].position,
                    &vertices[i - 1].position,
                    &vertices[i].position,
                ) {
                    crossings += 1;
                }
            }
        }

        crossings % 2 == 1
    }
}

/// Returns true if the linear part of `transform` flips handedness.
fn is_mirroring(transform: &Matrix4<f64>) -> bool {
    transform.fixed_view::<3, 3>(0, 0).clone_owned().determinant() < 0.0
}

/// Converts mesh triangles into world-space polygons.
///
/// Faces are rewound under a mirroring transform so they keep facing out of
/// the solid.
fn mesh_to_polygons(mesh: &TriangulatedSurface, transform: &Matrix4<f64>) -> Vec<Polygon> {
    let mirrored = is_mirroring(transform);
    let vertex = |index: u32| {
        let i = index as usize;
        let normal = mesh.normals.get(i).map_or_else(Vector3::zeros, |n| n.cast::<f64>());
        let uv = mesh.uvs.get(i).map_or_else(Vector2::zeros, |uv| uv.cast::<f64>());
        let mut vertex = Vertex::new(mesh.positions[i].cast::<f64>(), normal, uv);
        vertex.apply_transform(transform);
        vertex
    };

    mesh.faces
        .iter()
        .map(|&[a, b, c]| {
            let order = if mirrored { [a, c, b] } else { [a, b, c] };
            Polygon::new(order.into_iter().map(&vertex).collect())
        })
        .collect()
}

/// Möller-Trumbore ray/triangle test, counting only hits in front of the origin.
fn ray_hits_triangle(
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> bool {
    let e1 = b - a;
    let e2 = c - a;
    let p = direction.cross(&e2);
    let det = e1.dot(&p);
    if det.abs() < 1e-12 {
        return false;
    }

    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(&p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return false;
    }

    let q = s.cross(&e1);
    let v = direction.dot(&q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return false;
    }

    e2.dot(&q) * inv_det > 1e-9
}
