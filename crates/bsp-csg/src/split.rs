//! Polygon splitting against another polygon's plane.

use crate::error::{CsgError, Result};
use crate::{Classification, PlaneSide, Polygon};

/// Output buckets of [`Polygon::subdivide`].
#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// Coplanar fragments facing the same way as the divider.
    pub coplanar_front: Vec<Polygon>,
    /// Coplanar fragments facing away from the divider.
    pub coplanar_back: Vec<Polygon>,
    /// Fragments in front of the divider.
    pub front: Vec<Polygon>,
    /// Fragments behind the divider.
    pub back: Vec<Polygon>,
    /// Number of input polygons that spanned the divider and were cut.
    pub splits: usize,
}

impl Partition {
    /// Creates an empty partition.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Polygon {
    /// Cuts `other` by this polygon's plane.
    ///
    /// A polygon that does not span the plane is returned unchanged as the only
    /// element. A spanning polygon yields up to two fragments, each lying
    /// entirely on one side of the plane; fragments with fewer than three
    /// vertices are dropped.
    pub fn tessellate(&self, other: &Polygon) -> Vec<Polygon> {
        match self.classify_side(other) {
            Classification::Spanning => self.split_spanning(other),
            _ => vec![other.clone()],
        }
    }

    /// Tessellates `other` against this polygon and sorts the fragments into
    /// the buckets of `out`.
    ///
    /// Coplanar fragments go to `coplanar_front` when their normal agrees with
    /// this polygon's normal and to `coplanar_back` otherwise.
    ///
    /// # Errors
    /// Returns [`CsgError::SpanningFragment`] if a fragment still spans the
    /// plane after tessellation.
    pub fn subdivide(&self, other: &Polygon, out: &mut Partition) -> Result<()> {
        match self.classify_side(other) {
            Classification::Spanning => {
                out.splits += 1;
                for fragment in self.split_spanning(other) {
                    let side = self.classify_side(&fragment);
                    self.route(fragment, side, out)?;
                }
                Ok(())
            }
            side => self.route(other.clone(), side, out),
        }
    }

    fn route(&self, fragment: Polygon, side: Classification, out: &mut Partition) -> Result<()> {
        match side {
            Classification::Front => out.front.push(fragment),
            Classification::Back => out.back.push(fragment),
            Classification::Coplanar => {
                if self.normal().dot(&fragment.normal()) > 0.0 {
                    out.coplanar_front.push(fragment);
                } else {
                    out.coplanar_back.push(fragment);
                }
            }
            Classification::Spanning => {
                return Err(CsgError::SpanningFragment {
                    divider: *self.plane(),
                    centroid: fragment.centroid(),
                });
            }
        }
        Ok(())
    }

    /// Walks the vertex ring of a spanning polygon and builds the front and
    /// back vertex lists, inserting an interpolated vertex wherever an edge
    /// crosses the plane.
    fn split_spanning(&self, other: &Polygon) -> Vec<Polygon> {
        let vertices = other.vertices();
        let n = vertices.len();

        let mut front_verts = Vec::with_capacity(n + 1);
        let mut back_verts = Vec::with_capacity(n + 1);

        let sides: Vec<PlaneSide> = vertices.iter().map(|v| self.classify_vertex(v)).collect();

        for i in 0..n {
            let j = (i + 1) % n;
            let (vi, vj) = (&vertices[i], &vertices[j]);
            let (si, sj) = (sides[i], sides[j]);

            if si != PlaneSide::Back {
                front_verts.push(*vi);
            }
            if si != PlaneSide::Front {
                back_verts.push(*vi);
            }

            let crosses = matches!(
                (si, sj),
                (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
            );
            if !crosses {
                continue;
            }
            // An edge from front to back is never parallel to the plane.
            if let Some(t) = self.plane().intersect_segment(&vi.position, &vj.position) {
                let boundary = vi.interpolate(vj, t);
                front_verts.push(boundary);
                back_verts.push(boundary);
            }
        }

        // Fragments keep the plane of the polygon they were cut from.
        [front_verts, back_verts]
            .into_iter()
            .filter(|verts| verts.len() >= 3)
            .map(|verts| Polygon::from_parts(verts, *other.plane()))
            .collect()
    }
}
