use bsp_csg::{Csg, SplitStats};
use csg_viz::{demo_operands, OrbitCamera, Operation, TreeNavigator};
use macroquad::prelude::*;

fn run(operation: Operation, a: &Csg, b: &Csg) -> Option<(Csg, SplitStats)> {
    println!("Running {}...", operation.name());
    match operation.apply(a, b) {
        Ok((result, stats)) => {
            println!(
                "{}: {} polygons, depth {}, {} splits, {} fragments clipped",
                operation.name(),
                result.polygon_count(),
                result.tree().depth(),
                stats.polygons_split,
                stats.fragments_clipped
            );
            Some((result, stats))
        }
        Err(err) => {
            eprintln!("{} failed: {err}", operation.name());
            None
        }
    }
}

#[macroquad::main("CSG Visualization")]
async fn main() {
    let (a, b) = match demo_operands() {
        Ok(operands) => operands,
        Err(err) => {
            eprintln!("Failed to build operands: {err}");
            return;
        }
    };

    let mut operation = Operation::Subtract;
    let Some((mut result, mut stats)) = run(operation, &a, &b) else {
        return;
    };

    let mut camera = OrbitCamera::new(40.0, 0.6, 0.4).with_zoom(3.0, 10.0, 150.0);
    let mut navigator = TreeNavigator::new();

    loop {
        let requested = if is_key_pressed(KeyCode::U) {
            Some(Operation::Union)
        } else if is_key_pressed(KeyCode::S) {
            Some(Operation::Subtract)
        } else if is_key_pressed(KeyCode::I) {
            Some(Operation::Intersect)
        } else {
            None
        };
        if let Some(next) = requested.filter(|&next| next != operation) {
            if let Some((next_result, next_stats)) = run(next, &a, &b) {
                operation = next;
                result = next_result;
                stats = next_stats;
                navigator.go_root();
            }
        }

        camera.update();
        navigator.update(result.tree());

        clear_background(Color::from_rgba(15, 15, 25, 255));
        set_camera(&camera.to_camera3d());

        navigator.render(result.tree(), camera.eye_point());

        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(8.0, 0.0, 0.0), RED);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 8.0, 0.0), GREEN);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, 8.0), BLUE);

        set_default_camera();

        draw_text(
            &format!(
                "CSG {} - Total: {} polygons",
                operation.name(),
                result.polygon_count()
            ),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        draw_text(
            &format!(
                "Tree depth: {} | Splits: {} | Clipped: {}",
                result.tree().depth(),
                stats.polygons_split,
                stats.fragments_clipped
            ),
            10.0,
            45.0,
            18.0,
            GRAY,
        );

        navigator.draw_ui(result.tree(), 70.0);

        draw_text("[U]nion | [S]ubtract | [I]ntersect", 10.0, 155.0, 16.0, DARKGRAY);
        draw_text("Drag mouse to rotate, scroll to zoom", 10.0, 175.0, 16.0, DARKGRAY);
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 195.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
