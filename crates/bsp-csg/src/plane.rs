//! Plane representation and point classification.

use nalgebra::{Point3, Vector3};

/// Default epsilon for plane classification.
/// Points within this distance of the plane are considered "on" the plane.
pub const PLANE_EPSILON: f64 = 1e-5;

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal)
    Front,
    /// Point is behind the plane (negative side of normal)
    Back,
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane,
}

/// Classification of a polygon relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No vertex is behind the plane, at least one is in front
    Front,
    /// No vertex is in front of the plane, at least one is behind
    Back,
    /// All vertices are on the plane
    Coplanar,
    /// Vertices are on both sides (spans the plane)
    Spanning,
}

impl Classification {
    /// Folds per-vertex sides into a polygon classification.
    ///
    /// An empty iterator classifies as `Coplanar`.
    pub fn combine<I>(sides: I) -> Self
    where
        I: IntoIterator<Item = PlaneSide>,
    {
        let mut front = false;
        let mut back = false;

        for side in sides {
            match side {
                PlaneSide::Front => front = true,
                PlaneSide::Back => back = true,
                PlaneSide::OnPlane => {}
            }
        }

        match (front, back) {
            (false, false) => Classification::Coplanar,
            (true, false) => Classification::Front,
            (false, true) => Classification::Back,
            (true, true) => Classification::Spanning,
        }
    }
}

/// A plane in 3D space, represented as `normal · point = w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    normal: Vector3<f64>,
    w: f64,
}

impl Plane {
    /// Creates a plane from a unit normal and offset. The normal is taken as is.
    pub fn new(normal: Vector3<f64>, w: f64) -> Self {
        Self { normal, w }
    }

    /// Creates a plane from three points.
    /// The normal direction follows the right-hand rule: (b - a) × (c - a).
    ///
    /// Collinear points yield a NaN normal; the caller is responsible for
    /// passing non-degenerate input.
    pub fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Self {
        let normal = (b - a).cross(&(c - a)).normalize();
        let w = normal.dot(&a.coords);
        Self { normal, w }
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn w(&self) -> f64 {
        self.w
    }

    /// Computes the signed distance from a point to the plane.
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.w
    }

    /// Classifies which side of the plane a point lies on.
    /// Uses the default `PLANE_EPSILON` tolerance.
    #[inline]
    pub fn classify_point(&self, point: &Point3<f64>) -> PlaneSide {
        self.classify_point_with_epsilon(point, PLANE_EPSILON)
    }

    /// Classifies which side of the plane a point lies on, with a custom epsilon.
    pub fn classify_point_with_epsilon(&self, point: &Point3<f64>, epsilon: f64) -> PlaneSide {
        let dist = self.signed_distance(point);
        if dist > epsilon {
            PlaneSide::Front
        } else if dist < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }

    /// Flips the plane in place.
    #[inline]
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    /// Returns a new plane with the normal flipped (facing the opposite direction).
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// Returns the interpolation parameter at which the segment `start -> end`
    /// meets the plane, `t = (w - n·start) / (n·(end - start))`.
    ///
    /// Returns `None` if the segment is parallel to the plane. The value is not
    /// clamped to `[0, 1]`.
    pub fn intersect_segment(&self, start: &Point3<f64>, end: &Point3<f64>) -> Option<f64> {
        let denom = self.normal.dot(&(end - start));
        if denom.abs() < f64::EPSILON {
            return None;
        }
        Some((self.w - self.normal.dot(&start.coords)) / denom)
    }
}
