//! Clipping polygon sets against a BSP tree.

use crate::error::Result;
use crate::{Partition, Polygon, SplitStats};

use super::node::BspNode;

impl BspNode {
    /// Removes the parts of `polygons` that lie inside the solid represented
    /// by this tree.
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Result<Vec<Polygon>> {
        self.clip_polygons_with(polygons, &mut SplitStats::new())
    }

    /// Removes the parts of `polygons` that lie inside the solid represented
    /// by this tree, recording splits and dropped fragments in `stats`.
    ///
    /// A tree without a divider returns the input unchanged. Otherwise each
    /// polygon is subdivided against the divider; coplanar fragments facing
    /// the divider's way travel with the front fragments, the others with the
    /// back fragments. Front fragments reaching a missing front child survive,
    /// back fragments reaching a missing back child are inside the solid and
    /// are dropped. The result lists surviving front fragments before back
    /// fragments.
    pub fn clip_polygons_with(
        &self,
        polygons: Vec<Polygon>,
        stats: &mut SplitStats,
    ) -> Result<Vec<Polygon>> {
        let mut result = Vec::with_capacity(polygons.len());
        let mut stack: Vec<(&BspNode, Vec<Polygon>)> = vec![(self, polygons)];

        while let Some((node, polygons)) = stack.pop() {
            let Some(divider) = node.divider() else {
                result.extend(polygons);
                continue;
            };

            let mut partition = Partition::new();
            for polygon in &polygons {
                divider.subdivide(polygon, &mut partition)?;
            }
            stats.polygons_split += partition.splits;

            let Partition {
                mut coplanar_front,
                mut coplanar_back,
                mut front,
                mut back,
                ..
            } = partition;
            front.append(&mut coplanar_front);
            back.append(&mut coplanar_back);

            // Back is pushed first so the front subtree is finished before it.
            match node.back() {
                Some(child) if !back.is_empty() => stack.push((child, back)),
                Some(_) => {}
                None => stats.fragments_clipped += back.len(),
            }
            match node.front() {
                Some(child) if !front.is_empty() => stack.push((child, front)),
                Some(_) => {}
                None => result.extend(front),
            }
        }

        Ok(result)
    }

    /// Clips every polygon held by this tree against `other`, removing the
    /// area that lies inside the solid `other` represents.
    pub fn clip_to(&mut self, other: &BspNode) -> Result<()> {
        self.clip_to_with(other, &mut SplitStats::new())
    }

    /// Same as [`clip_to`](Self::clip_to), recording into `stats`.
    pub fn clip_to_with(&mut self, other: &BspNode, stats: &mut SplitStats) -> Result<()> {
        let mut stack: Vec<&mut BspNode> = vec![self];

        while let Some(node) = stack.pop() {
            let BspNode {
                coplanar_front,
                coplanar_back,
                front,
                back,
                ..
            } = node;

            *coplanar_front = other.clip_polygons_with(std::mem::take(coplanar_front), stats)?;
            *coplanar_back = other.clip_polygons_with(std::mem::take(coplanar_back), stats)?;

            stack.extend(front.as_deref_mut());
            stack.extend(back.as_deref_mut());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vertex;
    use nalgebra::Point3;

    fn make_polygon(points: &[[f64; 3]]) -> Polygon {
        Polygon::new(
            points
                .iter()
                .map(|p| Vertex::from_position(Point3::new(p[0], p[1], p[2])))
                .collect(),
        )
    }

    /// Outward-facing quads of the cube [0, 1]^3.
    fn unit_cube() -> Vec<Polygon> {
        vec![
            make_polygon(&[[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]]),
            make_polygon(&[[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]]),
            make_polygon(&[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]]),
            make_polygon(&[[1.0, 0.0, 1.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0]]),
            make_polygon(&[[0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]),
            make_polygon(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]]),
        ]
    }

    #[test]
    fn empty_tree_keeps_everything() {
        let tree = BspNode::new();
        let polys = unit_cube();

        assert_eq!(tree.clip_polygons(polys.clone()).unwrap(), polys);
    }

    #[test]
    fn clip_removes_inside_keeps_outside() {
        let tree = BspNode::from_polygons(unit_cube()).unwrap();

        // Horizontal square fully inside the cube
        let inside = make_polygon(&[
            [0.2, 0.5, 0.2],
            [0.2, 0.5, 0.8],
            [0.8, 0.5, 0.8],
            [0.8, 0.5, 0.2],
        ]);
        // Same square moved outside
        let outside = make_polygon(&[
            [2.2, 0.5, 0.2],
            [2.2, 0.5, 0.8],
            [2.8, 0.5, 0.8],
            [2.8, 0.5, 0.2],
        ]);

        let mut stats = SplitStats::new();
        let kept = tree
            .clip_polygons_with(vec![inside, outside.clone()], &mut stats)
            .unwrap();

        assert_eq!(kept, vec![outside]);
        assert_eq!(stats.fragments_clipped, 1);
    }

    #[test]
    fn clip_cuts_crossing_polygon() {
        let tree = BspNode::from_polygons(unit_cube()).unwrap();

        // Horizontal square from x = 0.5 to x = 1.5, half inside the cube
        let crossing = make_polygon(&[
            [0.5, 0.5, 0.2],
            [0.5, 0.5, 0.8],
            [1.5, 0.5, 0.8],
            [1.5, 0.5, 0.2],
        ]);

        let kept = tree.clip_polygons(vec![crossing]).unwrap();

        assert_eq!(kept.len(), 1);
        for v in kept[0].vertices() {
            assert!(v.position.x >= 1.0 - 1e-9, "vertex {:?} is inside the cube", v.position);
        }
    }

    #[test]
    fn clip_to_removes_polygons_inside_other() {
        let cube = BspNode::from_polygons(unit_cube()).unwrap();

        let inner = make_polygon(&[
            [0.2, 0.5, 0.2],
            [0.2, 0.5, 0.8],
            [0.8, 0.5, 0.8],
            [0.8, 0.5, 0.2],
        ]);
        let outer = make_polygon(&[
            [0.2, 3.0, 0.2],
            [0.2, 3.0, 0.8],
            [0.8, 3.0, 0.8],
            [0.8, 3.0, 0.2],
        ]);
        let mut tree = BspNode::from_polygons(vec![outer.clone(), inner]).unwrap();

        tree.clip_to(&cube).unwrap();

        assert_eq!(tree.all_polygons(), vec![outer]);
        // Structure survives clipping
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn clip_to_inverted_keeps_only_inside() {
        let mut cube = BspNode::from_polygons(unit_cube()).unwrap();
        cube.invert();

        let inner = make_polygon(&[
            [0.2, 0.5, 0.2],
            [0.2, 0.5, 0.8],
            [0.8, 0.5, 0.8],
            [0.8, 0.5, 0.2],
        ]);
        let outer = make_polygon(&[
            [0.2, 3.0, 0.2],
            [0.2, 3.0, 0.8],
            [0.8, 3.0, 0.8],
            [0.8, 3.0, 0.2],
        ]);
        let mut tree = BspNode::from_polygons(vec![outer, inner.clone()]).unwrap();

        tree.clip_to(&cube).unwrap();

        assert_eq!(tree.all_polygons(), vec![inner]);
    }
}
