//! Shared visualization utilities for the CSG viewer.

use std::hash::{Hash, Hasher};

use bsp_csg::{Csg, CsgOptions, Polygon, SplitStats, TriangulatedSurface};
use macroquad::models::{draw_mesh, Mesh, Vertex};
use macroquad::prelude::*;
use nalgebra::{Matrix4, Point3, Rotation3, Translation3, Unit, Vector3};

pub mod navigator;
pub use navigator::TreeNavigator;

/// Generates a deterministic color from a polygon's vertices using hashing.
/// This ensures split polygons get consistent colors across frames.
pub fn polygon_color(polygon: &Polygon) -> Color {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for v in polygon.vertices() {
        v.position.x.to_bits().hash(&mut hasher);
        v.position.y.to_bits().hash(&mut hasher);
        v.position.z.to_bits().hash(&mut hasher);
    }
    let hash = hasher.finish();

    let r = ((hash >> 16) & 0xFF) as u8;
    let g = ((hash >> 8) & 0xFF) as u8;
    let b = (hash & 0xFF) as u8;

    // Keep colors away from black
    Color::from_rgba(r.max(40), g.max(40), b.max(40), 255)
}

/// Draws a single polygon by triangulating it (fan triangulation) using a Mesh.
pub fn draw_polygon(polygon: &Polygon) {
    let verts = polygon.vertices();
    if verts.len() < 3 {
        return;
    }

    let color = polygon_color(polygon);

    let mesh_vertices: Vec<Vertex> = verts
        .iter()
        .map(|v| {
            let p = v.position.cast::<f32>();
            let uv = v.uv.cast::<f32>();
            Vertex::new2(vec3(p.x, p.y, p.z), vec2(uv.x, uv.y), color)
        })
        .collect();

    let mut indices: Vec<u16> = Vec::with_capacity((verts.len() - 2) * 3);
    for i in 2..verts.len() {
        indices.extend([0, (i - 1) as u16, i as u16]);
    }

    draw_mesh(&Mesh {
        vertices: mesh_vertices,
        indices,
        texture: None,
    });
}

/// Boolean operation shown by the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Union,
    Subtract,
    Intersect,
}

impl Operation {
    /// Returns a human readable name.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Union => "union",
            Operation::Subtract => "subtract",
            Operation::Intersect => "intersect",
        }
    }

    /// Runs the operation on `a` and `b`, collecting split statistics.
    pub fn apply(self, a: &Csg, b: &Csg) -> bsp_csg::Result<(Csg, SplitStats)> {
        let options = CsgOptions::default();
        let mut stats = SplitStats::new();
        let result = match self {
            Operation::Union => a.union_with(b, &options, &mut stats)?,
            Operation::Subtract => a.subtract_with(b, &options, &mut stats)?,
            Operation::Intersect => a.intersect_with(b, &options, &mut stats)?,
        };
        Ok((result, stats))
    }
}

/// Builds a cube of edge length `size` centered on the origin.
pub fn centered_cube(size: f32) -> TriangulatedSurface {
    let half = size / 2.0;
    TriangulatedSurface::cuboid(Point3::new(-half, -half, -half), Point3::new(half, half, half))
}

/// Returns a transform rotating by `angle` around `axis` and then moving by
/// `offset`.
pub fn placement(axis: Vector3<f32>, angle: f32, offset: Vector3<f32>) -> Matrix4<f32> {
    let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle);
    Translation3::from(offset).to_homogeneous() * rotation.to_homogeneous()
}

/// Builds the two solids shown by the viewer: an axis-aligned cube and a
/// smaller, tilted cube poking out of one of its corners.
pub fn demo_operands() -> bsp_csg::Result<(Csg, Csg)> {
    let a = Csg::from_mesh(&centered_cube(10.0), &Matrix4::identity())?;
    let b = Csg::from_mesh(
        &centered_cube(7.0),
        &placement(Vector3::new(1.0, 1.0, 0.0), 0.6, Vector3::new(4.0, 3.0, 2.0)),
    )?;
    Ok((a, b))
}

/// Camera circling the origin, steered by mouse drag, scroll and arrow keys.
///
/// Angles are in radians; `pitch` is kept short of the poles.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

const PITCH_LIMIT: f32 = 1.5;
const KEY_STEP: f32 = 0.02;
const DRAG_SPEED: f32 = 2.0;

impl OrbitCamera {
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            zoom_speed: 5.0,
            min_distance: 10.0,
            max_distance: 200.0,
        }
    }

    /// Sets the scroll zoom speed and the distance range.
    pub fn with_zoom(mut self, speed: f32, min: f32, max: f32) -> Self {
        self.zoom_speed = speed;
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Applies this frame's input.
    pub fn update(&mut self) {
        let mut turn = (0.0, 0.0);
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            turn = (-delta.x * DRAG_SPEED, -delta.y * DRAG_SPEED);
        }
        for (key, yaw, pitch) in [
            (KeyCode::Left, KEY_STEP, 0.0),
            (KeyCode::Right, -KEY_STEP, 0.0),
            (KeyCode::Up, 0.0, KEY_STEP),
            (KeyCode::Down, 0.0, -KEY_STEP),
        ] {
            if is_key_down(key) {
                turn.0 += yaw;
                turn.1 += pitch;
            }
        }
        self.orbit(turn.0, turn.1);
        self.zoom(mouse_wheel().1);
    }

    /// Turns the camera around the origin.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        self.yaw += yaw;
        self.pitch = (self.pitch + pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Moves the camera toward the origin by `steps` scroll steps.
    pub fn zoom(&mut self, steps: f32) {
        self.distance =
            (self.distance - steps * self.zoom_speed).clamp(self.min_distance, self.max_distance);
    }

    /// Eye position in kernel precision, used for classifying against dividers.
    pub fn eye_point(&self) -> Point3<f64> {
        let (yaw, pitch) = (self.yaw as f64, self.pitch as f64);
        let distance = self.distance as f64;
        Point3::new(
            distance * pitch.cos() * yaw.sin(),
            distance * pitch.sin(),
            distance * pitch.cos() * yaw.cos(),
        )
    }

    pub fn to_camera3d(&self) -> Camera3D {
        let eye = self.eye_point().cast::<f32>();
        Camera3D {
            position: vec3(eye.x, eye.y, eye.z),
            up: vec3(0.0, 1.0, 0.0),
            target: vec3(0.0, 0.0, 0.0),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_operations_produce_solids() {
        let (a, b) = demo_operands().unwrap();
        let center = Point3::new(0.0, 0.0, 0.0);
        let corner = Point3::new(4.6, 3.4, 2.1);

        for op in [Operation::Union, Operation::Subtract, Operation::Intersect] {
            let (result, _) = op.apply(&a, &b).unwrap();
            assert!(!result.is_empty(), "{} is empty", op.name());
            assert!(result.to_mesh().validate().is_ok());
        }

        let (difference, stats) = Operation::Subtract.apply(&a, &b).unwrap();
        assert!(stats.polygons_split > 0);
        assert!(difference.contains(&center));
        assert!(!difference.contains(&corner));

        let (overlap, _) = Operation::Intersect.apply(&a, &b).unwrap();
        assert!(overlap.contains(&corner));
        assert!(!overlap.contains(&center));
    }

    #[test]
    fn camera_orbit_and_zoom_stay_in_range() {
        let mut camera = OrbitCamera::new(40.0, 0.0, 0.0).with_zoom(3.0, 10.0, 50.0);

        camera.orbit(0.0, 10.0);
        assert_eq!(camera.pitch, 1.5);
        camera.zoom(100.0);
        assert_eq!(camera.distance, 10.0);
        camera.zoom(-100.0);
        assert_eq!(camera.distance, 50.0);

        let eye = camera.eye_point();
        assert!((eye.coords.norm() - 50.0).abs() < 1e-4);
        assert!(eye.y > 49.0);
    }

    #[test]
    fn polygon_color_is_stable() {
        let (a, _) = demo_operands().unwrap();
        let polygons = a.polygons();
        assert_eq!(polygon_color(&polygons[0]), polygon_color(&polygons[0].clone()));
    }
}
