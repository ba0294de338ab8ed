//! Brush, erase and flood fill over a `TileGrid`.
//!
//! Every operation takes a grid by reference and returns the edited copy.

use crate::grid::{TileGrid, TileRect, TileRef};

/// Brush width in cells. Always odd so the brush centers on the hovered cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushSize(u32);

impl BrushSize {
    pub const SINGLE: Self = Self(1);

    /// Round `size` up to the next odd value within `[1, max]`.
    pub fn new(size: u32, max: u32) -> Self {
        let max = if max % 2 == 0 { max.saturating_sub(1) } else { max }.max(1);
        let size = size.max(1) | 1;
        Self(size.min(max))
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn grow(&self, max: u32) -> Self {
        Self::new(self.0 + 2, max)
    }

    pub fn shrink(&self, max: u32) -> Self {
        Self::new(self.0.saturating_sub(2), max)
    }
}

impl Default for BrushSize {
    fn default() -> Self {
        Self::SINGLE
    }
}

/// Cells covered by a brush of width `radius` centered at `(cx, cy)`,
/// clipped to the grid.
pub fn brush_footprint(grid: &TileGrid, cx: i32, cy: i32, radius: u32) -> Option<TileRect> {
    let half = (radius.max(1) / 2) as i32;
    grid.clip(TileRect {
        min_x: cx.saturating_sub(half),
        min_y: cy.saturating_sub(half),
        max_x: cx.saturating_add(half),
        max_y: cy.saturating_add(half),
    })
}

/// Write `tile` into every cell of the brush footprint.
pub fn apply_brush(
    grid: &TileGrid,
    layer: usize,
    cx: i32,
    cy: i32,
    radius: u32,
    tile: TileRef,
) -> TileGrid {
    let mut next = grid.clone();
    brush_in_place(&mut next, layer, cx, cy, radius, tile);
    next
}

/// Same footprint as `apply_brush`, writing the layer's erase value: `EMPTY`
/// on object layers, the default tile on the floor.
pub fn erase(grid: &TileGrid, layer: usize, cx: i32, cy: i32, radius: u32) -> TileGrid {
    let value = grid.erase_value(layer);
    apply_brush(grid, layer, cx, cy, radius, value)
}

/// Set or clear blocking on every collision cell under the brush.
pub fn paint_collision(grid: &TileGrid, cx: i32, cy: i32, radius: u32, blocked: bool) -> TileGrid {
    let mut next = grid.clone();
    if let Some(rect) = brush_footprint(grid, cx, cy, radius) {
        for (x, y) in rect.iter() {
            next.set_blocked(x, y, blocked);
        }
    }
    next
}

/// Replace the 4-connected region matching the cell at `(sx, sy)` with `tile`.
pub fn flood_fill(grid: &TileGrid, layer: usize, sx: i32, sy: i32, tile: TileRef) -> TileGrid {
    let mut next = grid.clone();
    let filled = fill_in_place(&mut next, layer, sx, sy, tile);
    if filled > 0 {
        log::debug!("flood fill at ({sx}, {sy}) on layer {layer} changed {filled} cells");
    }
    next
}

fn brush_in_place(
    grid: &mut TileGrid,
    layer: usize,
    cx: i32,
    cy: i32,
    radius: u32,
    tile: TileRef,
) -> usize {
    let Some(rect) = brush_footprint(grid, cx, cy, radius) else {
        return 0;
    };
    rect.iter()
        .filter(|&(x, y)| grid.set_cell(layer, x, y, tile))
        .count()
}

fn fill_in_place(grid: &mut TileGrid, layer: usize, sx: i32, sy: i32, tile: TileRef) -> usize {
    if !grid.contains(sx, sy) || layer >= grid.layer_count() {
        return 0;
    }
    let replacement = grid.normalize(layer, tile);
    let target = grid.get(layer, sx, sy);
    if target == replacement {
        return 0;
    }

    let width = grid.width() as usize;
    let mut visited = vec![false; grid.cell_count()];
    let mut stack = vec![(sx, sy)];
    visited[sy as usize * width + sx as usize] = true;
    let mut changed = 0;

    while let Some((x, y)) = stack.pop() {
        if grid.get(layer, x, y) != target {
            continue;
        }
        grid.set_cell(layer, x, y, replacement);
        changed += 1;

        for (nx, ny) in [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)] {
            if !grid.contains(nx, ny) {
                continue;
            }
            let idx = ny as usize * width + nx as usize;
            if !visited[idx] {
                visited[idx] = true;
                stack.push((nx, ny));
            }
        }
    }

    changed
}

/// Bresenham line between two cells, both ends included.
pub fn stroke_line(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let mut points = Vec::new();

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        points.push((x, y));

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{FLOOR_LAYER, OBJECT_LAYER};

    const FLOOR: TileRef = TileRef::new(0, 1, 33);
    const CRATE: TileRef = TileRef::new(1, 0, 0);
    const WALL: TileRef = TileRef::new(1, 4, 2);

    #[test]
    fn test_brush_size_is_odd_and_capped() {
        assert_eq!(BrushSize::new(0, 15).get(), 1);
        assert_eq!(BrushSize::new(4, 15).get(), 5);
        assert_eq!(BrushSize::new(40, 15).get(), 15);
        assert_eq!(BrushSize::new(40, 8).get(), 7);
        assert_eq!(BrushSize::SINGLE.grow(15).get(), 3);
        assert_eq!(BrushSize::SINGLE.shrink(15).get(), 1);
    }

    #[test]
    fn test_brush_centered() {
        let grid = TileGrid::new(10, 10, FLOOR);
        let next = apply_brush(&grid, OBJECT_LAYER, 5, 5, 3, CRATE);
        assert_eq!(next.cells_differing(&grid), 9);
        assert_eq!(next.get(OBJECT_LAYER, 4, 4), CRATE);
        assert_eq!(next.get(OBJECT_LAYER, 6, 6), CRATE);
        assert_eq!(next.get(OBJECT_LAYER, 7, 5), TileRef::EMPTY);
    }

    #[test]
    fn test_brush_corner_clipped() {
        let grid = TileGrid::new(10, 10, FLOOR);
        let next = apply_brush(&grid, OBJECT_LAYER, 0, 0, 5, CRATE);
        assert_eq!(next.cells_differing(&grid), 9);
        for y in 0..10 {
            for x in 0..10 {
                let expected = if x <= 2 && y <= 2 { CRATE } else { TileRef::EMPTY };
                assert_eq!(next.get(OBJECT_LAYER, x, y), expected, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_brush_fully_outside_is_noop() {
        let grid = TileGrid::new(4, 4, FLOOR);
        let next = apply_brush(&grid, OBJECT_LAYER, -5, -5, 3, CRATE);
        assert_eq!(next, grid);
    }

    #[test]
    fn test_erase_asymmetry() {
        let grid = TileGrid::new(5, 5, FLOOR);
        let painted = apply_brush(&grid, FLOOR_LAYER, 2, 2, 3, WALL);
        let painted = apply_brush(&painted, OBJECT_LAYER, 2, 2, 3, CRATE);

        let floor_erased = erase(&painted, FLOOR_LAYER, 2, 2, 3);
        assert_eq!(floor_erased.get(FLOOR_LAYER, 2, 2), FLOOR);

        let objects_erased = erase(&painted, OBJECT_LAYER, 2, 2, 3);
        assert_eq!(objects_erased.get(OBJECT_LAYER, 2, 2), TileRef::EMPTY);
        assert_eq!(objects_erased.get(FLOOR_LAYER, 2, 2), WALL);
    }

    #[test]
    fn test_fill_containment() {
        let mut grid = TileGrid::new(5, 5, WALL);
        for y in 1..=3 {
            for x in 1..=3 {
                grid = grid.with_cell(FLOOR_LAYER, x, y, FLOOR);
            }
        }
        let filled = flood_fill(&grid, FLOOR_LAYER, 2, 2, CRATE);
        assert_eq!(filled.cells_differing(&grid), 9);
        for x in 0..5 {
            assert_eq!(filled.get(FLOOR_LAYER, x, 0), WALL);
            assert_eq!(filled.get(FLOOR_LAYER, x, 4), WALL);
        }
        assert_eq!(filled.get(FLOOR_LAYER, 3, 3), CRATE);
    }

    #[test]
    fn test_fill_is_four_connected() {
        // Diagonal neighbours must not leak.
        let grid = TileGrid::new(3, 3, WALL)
            .with_cell(FLOOR_LAYER, 0, 0, FLOOR)
            .with_cell(FLOOR_LAYER, 1, 1, FLOOR);
        let filled = flood_fill(&grid, FLOOR_LAYER, 0, 0, CRATE);
        assert_eq!(filled.get(FLOOR_LAYER, 0, 0), CRATE);
        assert_eq!(filled.get(FLOOR_LAYER, 1, 1), FLOOR);
    }

    #[test]
    fn test_fill_noop_cases() {
        let grid = TileGrid::new(4, 4, FLOOR);
        assert_eq!(flood_fill(&grid, FLOOR_LAYER, 9, 9, CRATE), grid);
        assert_eq!(flood_fill(&grid, FLOOR_LAYER, 0, 0, FLOOR), grid);
        // EMPTY on the floor means the default floor tile, which is already there.
        assert_eq!(flood_fill(&grid, FLOOR_LAYER, 0, 0, TileRef::EMPTY), grid);
        assert_eq!(flood_fill(&grid, 5, 0, 0, CRATE), grid);
    }

    #[test]
    fn test_fill_whole_grid() {
        let grid = TileGrid::new(64, 64, FLOOR);
        let filled = flood_fill(&grid, OBJECT_LAYER, 10, 10, CRATE);
        assert_eq!(filled.cells_differing(&grid), 64 * 64);
    }

    #[test]
    fn test_collision_brush() {
        let grid = TileGrid::new(4, 4, FLOOR).with_collision_layer();
        let next = paint_collision(&grid, 0, 0, 3, true);
        assert!(next.is_blocked(1, 1));
        assert!(!next.is_blocked(2, 2));
        let cleared = paint_collision(&next, 0, 0, 1, false);
        assert!(!cleared.is_blocked(0, 0));
        assert!(cleared.is_blocked(1, 0));
    }

    #[test]
    fn test_stroke_line_is_gapless() {
        let points = stroke_line(0, 0, 5, 2);
        assert_eq!(points.first(), Some(&(0, 0)));
        assert_eq!(points.last(), Some(&(5, 2)));
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert!((a.0 - b.0).abs() <= 1 && (a.1 - b.1).abs() <= 1);
        }
        assert_eq!(stroke_line(3, 3, 3, 3), vec![(3, 3)]);
    }
}
