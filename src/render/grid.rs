use glam::Vec2;

use crate::grid::TileRect;
use crate::render::camera::Camera;

/// Line segments outlining every tile in `range`, in screen space.
pub fn build_grid_lines(camera: &Camera, range: TileRect) -> Vec<(Vec2, Vec2)> {
    let mut lines = Vec::with_capacity((range.width() + range.height() + 2) as usize);
    let top = camera.tile_to_screen(range.min_x, range.min_y).y;
    let bottom = camera.tile_to_screen(range.min_x, range.max_y + 1).y;
    let left = camera.tile_to_screen(range.min_x, range.min_y).x;
    let right = camera.tile_to_screen(range.max_x + 1, range.min_y).x;

    for x in range.min_x..=range.max_x + 1 {
        let sx = camera.tile_to_screen(x, range.min_y).x;
        lines.push((Vec2::new(sx, top), Vec2::new(sx, bottom)));
    }
    for y in range.min_y..=range.max_y + 1 {
        let sy = camera.tile_to_screen(range.min_x, y).y;
        lines.push((Vec2::new(left, sy), Vec2::new(right, sy)));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CameraSettings;

    #[test]
    fn test_line_count_and_extent() {
        let mut camera = Camera::new(&CameraSettings::default());
        camera.set_world(10, 10);
        camera.set_viewport(320.0, 320.0);
        let range = TileRect { min_x: 0, min_y: 0, max_x: 2, max_y: 1 };
        let lines = build_grid_lines(&camera, range);
        assert_eq!(lines.len(), 4 + 3);
        assert_eq!(lines[0], (Vec2::new(0.0, 0.0), Vec2::new(0.0, 64.0)));
        assert_eq!(lines.last(), Some(&(Vec2::new(0.0, 64.0), Vec2::new(96.0, 64.0))));
    }
}
