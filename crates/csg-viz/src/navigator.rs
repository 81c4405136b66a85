//! Stepping through a BSP tree from the viewer.

use bsp_csg::{BspNode, PlaneSide};
use macroquad::prelude::*;
use nalgebra::Point3;

use crate::draw_polygon;

/// Child chosen at one level of the walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Front,
    Back,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Direction::Front => "F",
            Direction::Back => "B",
        }
    }
}

/// Position in a tree, kept as the path from the root.
///
/// The path is re-resolved against the tree every frame, so it stays valid
/// only while the tree keeps its shape. An invalid path shows nothing.
#[derive(Debug, Default)]
pub struct TreeNavigator {
    path: Vec<Direction>,
}

impl TreeNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &[Direction] {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Descends into the front child. Returns false if there is none.
    pub fn go_front(&mut self, tree: &BspNode) -> bool {
        self.descend(tree, Direction::Front)
    }

    /// Descends into the back child. Returns false if there is none.
    pub fn go_back(&mut self, tree: &BspNode) -> bool {
        self.descend(tree, Direction::Back)
    }

    fn descend(&mut self, tree: &BspNode, direction: Direction) -> bool {
        let child = self.current_node(tree).and_then(|node| match direction {
            Direction::Front => node.front(),
            Direction::Back => node.back(),
        });
        if child.is_some() {
            self.path.push(direction);
        }
        child.is_some()
    }

    /// Steps up one level. Returns false at the root.
    pub fn go_parent(&mut self) -> bool {
        self.path.pop().is_some()
    }

    pub fn go_root(&mut self) {
        self.path.clear();
    }

    /// Handles F, B, P and R. Returns true if the position changed.
    pub fn update(&mut self, tree: &BspNode) -> bool {
        let mut changed = false;
        if is_key_pressed(KeyCode::F) {
            changed |= self.go_front(tree);
        }
        if is_key_pressed(KeyCode::B) {
            changed |= self.go_back(tree);
        }
        if is_key_pressed(KeyCode::P) {
            changed |= self.go_parent();
        }
        if is_key_pressed(KeyCode::R) && !self.path.is_empty() {
            self.go_root();
            changed = true;
        }
        changed
    }

    pub fn current_node<'a>(&self, tree: &'a BspNode) -> Option<&'a BspNode> {
        self.path.iter().try_fold(tree, |node, direction| match direction {
            Direction::Front => node.front(),
            Direction::Back => node.back(),
        })
    }

    /// Draws the current subtree, ordered for the viewer at `eye`.
    pub fn render(&self, tree: &BspNode, eye: Point3<f64>) {
        if let Some(node) = self.current_node(tree) {
            render_node_back_to_front(node, eye);
        }
    }

    /// Formats the path as `root` or e.g. `B -> F -> B`.
    pub fn path_label(&self) -> String {
        if self.path.is_empty() {
            return "root".to_string();
        }
        self.path
            .iter()
            .map(|d| d.label())
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Draws the status lines for the current node starting at `y`.
    pub fn draw_ui(&self, tree: &BspNode, y: f32) {
        let node = self.current_node(tree);
        let polygons = node.map_or(0, BspNode::polygon_count);
        let has_front = node.is_some_and(|n| n.front().is_some());
        let has_back = node.is_some_and(|n| n.back().is_some());
        let is_leaf = node.is_none_or(BspNode::is_leaf);

        let mut children = String::new();
        if has_front {
            children.push_str("[F]ront ");
        }
        if has_back {
            children.push_str("[B]ack ");
        }
        if is_leaf {
            children.push_str("(leaf)");
        }

        let lines = [
            (format!("Subtree: {polygons} polygons"), 18.0, WHITE),
            (format!("Path: {} (depth {})", self.path_label(), self.depth()), 18.0, YELLOW),
            (
                format!("Children: {children}"),
                18.0,
                if is_leaf { ORANGE } else { GREEN },
            ),
            ("[P]arent | [R]oot".to_string(), 16.0, DARKGRAY),
        ];
        for (row, (text, size, color)) in lines.into_iter().enumerate() {
            draw_text(&text, 10.0, y + 20.0 * row as f32, size, color);
        }
    }
}

enum Step<'a> {
    Visit(&'a BspNode),
    Draw(&'a BspNode),
}

/// Renders a subtree back to front as seen from `eye`.
///
/// Nodes on the far side of each divider are drawn first, then the node's own
/// polygons, then the near side.
fn render_node_back_to_front(root: &BspNode, eye: Point3<f64>) {
    let mut stack = vec![Step::Visit(root)];

    while let Some(step) = stack.pop() {
        let node = match step {
            Step::Draw(node) => {
                node.polygons().for_each(draw_polygon);
                continue;
            }
            Step::Visit(node) => node,
        };
        let Some(divider) = node.divider() else {
            continue;
        };

        let (near, far) = match divider.plane().classify_point(&eye) {
            PlaneSide::Front | PlaneSide::OnPlane => (node.front(), node.back()),
            PlaneSide::Back => (node.back(), node.front()),
        };

        // Pushed in reverse drawing order
        stack.extend(near.map(Step::Visit));
        stack.push(Step::Draw(node));
        stack.extend(far.map(Step::Visit));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo_operands;

    #[test]
    fn navigation_follows_existing_children() {
        let (a, _) = demo_operands().unwrap();
        let tree = a.tree();
        let mut navigator = TreeNavigator::new();

        // The root of a convex solid has everything behind its divider
        assert!(!navigator.go_front(tree));
        assert!(navigator.go_back(tree));
        assert_eq!(navigator.path(), &[Direction::Back]);

        let subtree = navigator.current_node(tree).unwrap();
        assert!(subtree.polygon_count() < tree.polygon_count());

        assert_eq!(navigator.path_label(), "B");

        assert!(navigator.go_parent());
        assert!(!navigator.go_parent());
        assert_eq!(navigator.depth(), 0);
    }
}
