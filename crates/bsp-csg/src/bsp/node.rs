//! BSP tree node implementation.

use crate::error::{CsgError, Result};
use crate::{CsgOptions, Partition, Polygon, SplitStats};

/// A node in the BSP tree.
///
/// Each node partitions space using the plane of its divider polygon and
/// stores the polygons that are coplanar with that plane. Polygons on the
/// front or back of the plane live in the respective child subtrees.
///
/// A node without a divider is an empty tree: it represents unbounded, empty
/// space. Within a built tree, a missing front child is outside the solid and a
/// missing back child is inside it.
///
/// # Coplanar Polygon Storage
///
/// Coplanar polygons are separated by their facing direction relative to
/// the divider's normal:
/// - `coplanar_front`: polygons whose normal points the same direction as the divider
/// - `coplanar_back`: polygons whose normal points opposite to the divider
///
/// Both buckets belong to the node that owns the divider.
///
/// # Stack Safety
///
/// Every traversal, including `Clone` and `Drop`, walks the tree with an
/// explicit work stack, so tree depth never translates into call depth.
#[derive(Debug, Default)]
pub struct BspNode {
    /// The polygon whose plane splits space at this node.
    pub(crate) divider: Option<Polygon>,

    /// Polygons coplanar with the divider, facing the SAME direction.
    pub(crate) coplanar_front: Vec<Polygon>,

    /// Polygons coplanar with the divider, facing the OPPOSITE direction.
    pub(crate) coplanar_back: Vec<Polygon>,

    /// Subtree in FRONT of the divider.
    pub(crate) front: Option<Box<BspNode>>,

    /// Subtree BEHIND the divider.
    pub(crate) back: Option<Box<BspNode>>,
}

impl BspNode {
    /// Creates an empty node with no divider, polygons or children.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from a polygon set using the default options.
    pub fn from_polygons(polygons: Vec<Polygon>) -> Result<Self> {
        let mut node = Self::new();
        node.build(polygons)?;
        Ok(node)
    }

    /// Returns the divider polygon, if the node has one.
    #[inline]
    pub fn divider(&self) -> Option<&Polygon> {
        self.divider.as_ref()
    }

    /// Returns coplanar polygons facing the same direction as the divider.
    #[inline]
    pub fn coplanar_front(&self) -> &[Polygon] {
        &self.coplanar_front
    }

    /// Returns coplanar polygons facing opposite to the divider.
    #[inline]
    pub fn coplanar_back(&self) -> &[Polygon] {
        &self.coplanar_back
    }

    /// Returns all polygons held by this node (both facings).
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.coplanar_front.iter().chain(self.coplanar_back.iter())
    }

    /// Returns a reference to the front child subtree.
    #[inline]
    pub fn front(&self) -> Option<&BspNode> {
        self.front.as_deref()
    }

    /// Returns a reference to the back child subtree.
    #[inline]
    pub fn back(&self) -> Option<&BspNode> {
        self.back.as_deref()
    }

    /// Checks if this node has any children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }

    /// Inserts polygons into the tree using the default options.
    pub fn build(&mut self, polygons: Vec<Polygon>) -> Result<()> {
        self.build_with(polygons, &CsgOptions::default(), &mut SplitStats::new())
    }

    /// Inserts polygons into the tree.
    ///
    /// A node without a divider adopts a copy of the first polygon as its
    /// divider. Every polygon is subdivided against the divider; coplanar
    /// fragments stay on the node, front and back fragments are pushed into
    /// the existing child on that side, or into a new child if there is none.
    ///
    /// # Errors
    /// - [`CsgError::DepthLimitExceeded`] if the tree would grow deeper than
    ///   `options.max_depth()`.
    /// - [`CsgError::SpanningFragment`] if splitting breaks its invariant.
    ///
    /// On error the tree is left partially built and should be discarded.
    pub fn build_with(
        &mut self,
        polygons: Vec<Polygon>,
        options: &CsgOptions,
        stats: &mut SplitStats,
    ) -> Result<()> {
        let limit = options.max_depth();
        let mut stack: Vec<(&mut BspNode, Vec<Polygon>, usize)> = vec![(self, polygons, 1)];

        while let Some((node, polygons, depth)) = stack.pop() {
            if polygons.is_empty() {
                continue;
            }
            if depth > limit {
                log::warn!(
                    "BSP build reached depth {depth} with {} polygons left, aborting",
                    polygons.len()
                );
                return Err(CsgError::DepthLimitExceeded { limit });
            }

            let BspNode {
                divider,
                coplanar_front,
                coplanar_back,
                front,
                back,
            } = node;

            let divider = divider.get_or_insert_with(|| polygons[0].clone());
            let mut partition = Partition::new();
            for polygon in &polygons {
                divider.subdivide(polygon, &mut partition)?;
            }
            stats.polygons_split += partition.splits;

            coplanar_front.append(&mut partition.coplanar_front);
            coplanar_back.append(&mut partition.coplanar_back);

            if !partition.front.is_empty() {
                let child = front.get_or_insert_with(|| {
                    stats.nodes_created += 1;
                    Box::new(BspNode::new())
                });
                stack.push((child.as_mut(), partition.front, depth + 1));
            }
            if !partition.back.is_empty() {
                let child = back.get_or_insert_with(|| {
                    stats.nodes_created += 1;
                    Box::new(BspNode::new())
                });
                stack.push((child.as_mut(), partition.back, depth + 1));
            }
        }

        Ok(())
    }

    /// Converts the solid represented by this tree into its complement.
    ///
    /// Flips every polygon (divider included) and swaps the front and back
    /// subtrees of every node.
    pub fn invert(&mut self) {
        let mut stack: Vec<&mut BspNode> = vec![self];

        while let Some(node) = stack.pop() {
            let BspNode {
                divider,
                coplanar_front,
                coplanar_back,
                front,
                back,
            } = node;

            for polygon in coplanar_front.iter_mut().chain(coplanar_back.iter_mut()) {
                polygon.invert();
            }
            if let Some(divider) = divider {
                divider.invert();
            }
            std::mem::swap(front, back);

            stack.extend(front.as_deref_mut());
            stack.extend(back.as_deref_mut());
        }
    }

    /// Collects all polygons in pre-order: this node's polygons, then the
    /// front subtree, then the back subtree.
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = Vec::with_capacity(self.polygon_count());
        let mut stack: Vec<&BspNode> = vec![self];

        while let Some(node) = stack.pop() {
            result.extend(node.polygons().cloned());
            stack.extend(node.back());
            stack.extend(node.front());
        }

        result
    }

    /// Returns the total number of polygons in this subtree.
    pub fn polygon_count(&self) -> usize {
        self.nodes().map(|n| n.coplanar_front.len() + n.coplanar_back.len()).sum()
    }

    /// Returns the number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(&BspNode, usize)> = vec![(self, 1)];

        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(node.front().map(|n| (n, depth + 1)));
            stack.extend(node.back().map(|n| (n, depth + 1)));
        }

        max_depth
    }

    /// Iterates over every node of this subtree (no particular order).
    fn nodes(&self) -> impl Iterator<Item = &BspNode> {
        let mut stack: Vec<&BspNode> = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.front());
            stack.extend(node.back());
            Some(node)
        })
    }

    /// Copies the node's own data without its children.
    fn shallow_clone(&self) -> Self {
        Self {
            divider: self.divider.clone(),
            coplanar_front: self.coplanar_front.clone(),
            coplanar_back: self.coplanar_back.clone(),
            front: None,
            back: None,
        }
    }
}

impl Clone for BspNode {
    fn clone(&self) -> Self {
        let mut root = self.shallow_clone();
        let mut stack: Vec<(&BspNode, &mut BspNode)> = vec![(self, &mut root)];

        while let Some((src, dst)) = stack.pop() {
            let BspNode { front, back, .. } = dst;
            if let Some(src_front) = src.front() {
                let child = front.insert(Box::new(src_front.shallow_clone()));
                stack.push((src_front, child.as_mut()));
            }
            if let Some(src_back) = src.back() {
                let child = back.insert(Box::new(src_back.shallow_clone()));
                stack.push((src_back, child.as_mut()));
            }
        }

        root
    }
}

impl Drop for BspNode {
    fn drop(&mut self) {
        let mut stack: Vec<Box<BspNode>> = Vec::new();
        stack.extend(self.front.take());
        stack.extend(self.back.take());

        while let Some(mut node) = stack.pop() {
            stack.extend(node.front.take());
            stack.extend(node.back.take());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Classification, Vertex};
    use nalgebra::Point3;

    fn make_triangle(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Polygon {
        Polygon::new(
            [a, b, c]
                .iter()
                .map(|p| Vertex::from_position(Point3::new(p[0], p[1], p[2])))
                .collect(),
        )
    }

    #[test]
    fn new_node_is_empty_leaf() {
        let node = BspNode::new();

        assert!(node.is_leaf());
        assert!(node.divider().is_none());
        assert_eq!(node.polygon_count(), 0);
        assert_eq!(node.depth(), 1);
        assert!(node.all_polygons().is_empty());
    }

    #[test]
    fn build_empty_keeps_node_unsplit() {
        let node = BspNode::from_polygons(vec![]).unwrap();
        assert!(node.divider().is_none());
        assert!(node.is_leaf());
    }

    #[test]
    fn build_single_polygon() {
        let poly = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let node = BspNode::from_polygons(vec![poly.clone()]).unwrap();

        assert_eq!(node.divider(), Some(&poly));
        assert_eq!(node.coplanar_front(), &[poly][..]);
        assert_eq!(node.depth(), 1);
    }

    #[test]
    fn build_two_parallel_polygons() {
        // Normal +Z; the second polygon lies in front of the first
        let poly1 = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let poly2 = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);

        let node = BspNode::from_polygons(vec![poly1, poly2.clone()]).unwrap();

        assert_eq!(node.polygon_count(), 2);
        assert_eq!(node.depth(), 2);
        assert!(node.back().is_none());
        assert_eq!(node.front().unwrap().coplanar_front(), &[poly2][..]);
    }

    #[test]
    fn build_keeps_both_coplanar_facings_on_node() {
        let up = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let down = make_triangle([2.0, 0.0, 0.0], [2.0, 1.0, 0.0], [3.0, 0.0, 0.0]);

        let node = BspNode::from_polygons(vec![up.clone(), down.clone()]).unwrap();

        assert_eq!(node.depth(), 1);
        assert_eq!(node.coplanar_front(), &[up][..]);
        assert_eq!(node.coplanar_back(), &[down][..]);
    }

    #[test]
    fn build_spanning_polygon_gets_split() {
        let splitter = make_triangle([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]);
        let spanning = make_triangle([-0.5, -1.0, 0.5], [0.5, -1.0, 0.5], [0.5, 1.0, 0.5]);

        let mut stats = SplitStats::new();
        let mut node = BspNode::new();
        node.build_with(vec![splitter, spanning], &CsgOptions::default(), &mut stats)
            .unwrap();

        assert_eq!(node.polygon_count(), 3);
        assert_eq!(stats.polygons_split, 1);
        assert_eq!(stats.nodes_created, 2);

        let divider = node.divider().unwrap();
        for p in node.front().unwrap().polygons() {
            assert_eq!(divider.classify_side(p), Classification::Front);
        }
        for p in node.back().unwrap().polygons() {
            assert_eq!(divider.classify_side(p), Classification::Back);
        }
    }

    #[test]
    fn build_extends_existing_children() {
        let base = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let first = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let second = make_triangle([0.0, 0.0, 2.0], [1.0, 0.0, 2.0], [0.0, 1.0, 2.0]);

        let mut node = BspNode::from_polygons(vec![base, first]).unwrap();
        node.build(vec![second]).unwrap();

        assert_eq!(node.polygon_count(), 3);
        assert_eq!(node.depth(), 3);
    }

    #[test]
    fn build_respects_depth_limit() {
        let polys = vec![
            make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]),
            make_triangle([0.0, 0.0, 2.0], [1.0, 0.0, 2.0], [0.0, 1.0, 2.0]),
        ];

        let mut node = BspNode::new();
        let err = node
            .build_with(polys.clone(), &CsgOptions::new().with_max_depth(2), &mut SplitStats::new())
            .unwrap_err();
        assert_eq!(err, CsgError::DepthLimitExceeded { limit: 2 });

        let mut node = BspNode::new();
        node.build_with(polys, &CsgOptions::new().with_max_depth(3), &mut SplitStats::new())
            .unwrap();
        assert_eq!(node.depth(), 3);
    }

    #[test]
    fn invert_swaps_children_and_flips_polygons() {
        let poly1 = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let poly2 = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let mut node = BspNode::from_polygons(vec![poly1.clone(), poly2.clone()]).unwrap();

        node.invert();

        assert!(node.front().is_none());
        let back = node.back().unwrap();
        assert_eq!(back.coplanar_front(), &[poly2.inverted()][..]);
        assert_eq!(node.divider(), Some(&poly1.inverted()));
        assert_eq!(node.coplanar_front(), &[poly1.inverted()][..]);
    }

    #[test]
    fn double_invert_restores_polygons() {
        let polys = vec![
            make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]),
            make_triangle([-0.5, -1.0, 0.5], [0.5, -1.0, 0.5], [0.5, 1.0, 0.5]),
            make_triangle([0.0, 0.0, -1.0], [0.0, 1.0, -1.0], [1.0, 0.0, -1.0]),
        ];
        let original = BspNode::from_polygons(polys).unwrap();

        let mut node = original.clone();
        node.invert();
        assert_ne!(node.all_polygons(), original.all_polygons());
        node.invert();

        assert_eq!(node.all_polygons(), original.all_polygons());
    }

    #[test]
    fn all_polygons_pre_order() {
        let base = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let above = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let below = make_triangle([0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -1.0]);

        let node = BspNode::from_polygons(vec![base.clone(), below.clone(), above.clone()])
            .unwrap();

        assert_eq!(node.all_polygons(), vec![base, above, below]);
        assert_eq!(node.node_count(), 3);
    }

    #[test]
    fn clone_is_deep() {
        let polys = vec![
            make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]),
        ];
        let original = BspNode::from_polygons(polys).unwrap();
        let mut copy = original.clone();

        assert_eq!(copy.all_polygons(), original.all_polygons());
        assert_eq!(copy.depth(), original.depth());

        copy.invert();
        assert!(original.back().is_none());
        assert!(copy.back().is_some());
    }

    #[test]
    fn deep_tree_clone_and_drop() {
        // A stack of parallel slabs makes a degenerate, list-like tree.
        let polys: Vec<Polygon> = (0..3_000)
            .map(|i| {
                let z = i as f64;
                make_triangle([0.0, 0.0, z], [1.0, 0.0, z], [0.0, 1.0, z])
            })
            .collect();

        let mut node = BspNode::new();
        node.build_with(polys, &CsgOptions::new().with_max_depth(10_000), &mut SplitStats::new())
            .unwrap();
        assert_eq!(node.depth(), 3_000);

        let copy = node.clone();
        assert_eq!(copy.polygon_count(), 3_000);
        drop(node);
        drop(copy);
    }
}
