use glam::Vec2;

use crate::grid::{TileGrid, TileRect};
use crate::paint;
use crate::render::camera::Camera;
use crate::render::canvas::{Canvas, Rgba};
use crate::render::grid::build_grid_lines;
use crate::settings::DisplaySettings;
use crate::tile::{AssetRegistry, Lookup};

/// Upper bound on minimap samples per axis.
const MINIMAP_SAMPLES: u32 = 64;
/// Gap between the minimap and the viewport corner.
const MINIMAP_PADDING: f32 = 8.0;
/// Grid lines are skipped when tiles get smaller than this on screen.
const MIN_GRID_LINE_SPACING: f32 = 4.0;

/// Which preview the cursor shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
    Brush,
    Eraser,
}

/// Brush footprint outline drawn under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPreview {
    pub x: i32,
    pub y: i32,
    pub size: u32,
    pub mode: PreviewMode,
}

/// Per-frame overlay switches and transient UI state.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    pub grid_lines: bool,
    pub collision: bool,
    pub minimap: bool,
    /// Layer indices not drawn this frame.
    pub hidden_layers: Vec<usize>,
    pub cursor: Option<CursorPreview>,
}

impl Overlay {
    pub fn is_hidden(&self, layer: usize) -> bool {
        self.hidden_layers.contains(&layer)
    }
}

/// What a frame ended up drawing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub visible: Option<TileRect>,
    pub tiles_drawn: usize,
    pub placeholders: usize,
    /// Source ids referenced by visible cells that are not ready yet.
    pub missing_sources: Vec<i32>,
}

/// Draws a tile grid through a [`Canvas`]. Holds only colours; all frame
/// state comes in as arguments.
pub struct Renderer {
    bg_color: Rgba,
    grid_color: Rgba,
    brush_color: Rgba,
    eraser_color: Rgba,
    placeholder_color: Rgba,
    collision_color: Rgba,
    minimap_bg_color: Rgba,
    minimap_view_color: Rgba,
    minimap_size: f32,
}

impl Renderer {
    pub fn new(display: &DisplaySettings) -> Self {
        Self {
            bg_color: display.bg_color,
            grid_color: display.grid_color,
            brush_color: display.brush_color,
            eraser_color: display.eraser_color,
            placeholder_color: display.placeholder_color,
            collision_color: display.collision_color,
            minimap_bg_color: display.minimap_bg_color,
            minimap_view_color: display.minimap_view_color,
            minimap_size: display.minimap_size.max(16.0),
        }
    }

    /// Draw one frame: background, visible cells of every shown layer from
    /// bottom to top, then the enabled overlays.
    pub fn render<C: Canvas>(
        &self,
        canvas: &mut C,
        grid: &TileGrid,
        camera: &Camera,
        assets: &AssetRegistry<C::Image>,
        overlay: &Overlay,
    ) -> FrameStats {
        let viewport = camera.viewport();
        canvas.fill_rect(Vec2::ZERO, viewport, self.bg_color);

        let mut stats = FrameStats {
            visible: camera.visible_tile_range(viewport.x, viewport.y),
            ..FrameStats::default()
        };

        if let Some(range) = stats.visible {
            self.draw_cells(canvas, grid, camera, assets, overlay, range, &mut stats);
            if overlay.collision {
                self.draw_collision(canvas, grid, camera, range);
            }
            if overlay.grid_lines && camera.scaled_tile_size() >= MIN_GRID_LINE_SPACING {
                for (from, to) in build_grid_lines(camera, range) {
                    canvas.line(from, to, 1.0, self.grid_color);
                }
            }
        }

        if let Some(cursor) = overlay.cursor {
            self.draw_cursor(canvas, grid, camera, cursor);
        }
        if overlay.minimap {
            self.draw_minimap(canvas, grid, camera, assets);
        }

        if !stats.missing_sources.is_empty() {
            log::trace!("frame references unloaded sources {:?}", stats.missing_sources);
        }
        stats
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_cells<C: Canvas>(
        &self,
        canvas: &mut C,
        grid: &TileGrid,
        camera: &Camera,
        assets: &AssetRegistry<C::Image>,
        overlay: &Overlay,
        range: TileRect,
        stats: &mut FrameStats,
    ) {
        for layer in 0..grid.layer_count() {
            if overlay.is_hidden(layer) {
                continue;
            }
            for (x, y) in range.iter() {
                let tile = grid.get(layer, x, y);
                if tile.is_empty() {
                    continue;
                }
                let (min, max) = camera.tile_screen_rect(x, y);
                match assets.lookup(tile.source) {
                    Lookup::Ready(source) if source.contains(tile.x as u32, tile.y as u32) => {
                        let uv = source.tile_uv(tile.x as u32, tile.y as u32);
                        canvas.draw_tile(&source.image, uv, min, max);
                        stats.tiles_drawn += 1;
                    }
                    Lookup::Ready(_) => {
                        canvas.fill_rect(min, max, self.placeholder_color);
                        stats.placeholders += 1;
                    }
                    Lookup::Pending | Lookup::Unknown => {
                        canvas.fill_rect(min, max, self.placeholder_color);
                        stats.placeholders += 1;
                        if !stats.missing_sources.contains(&tile.source) {
                            stats.missing_sources.push(tile.source);
                        }
                    }
                }
            }
        }
    }

    fn draw_collision<C: Canvas>(
        &self,
        canvas: &mut C,
        grid: &TileGrid,
        camera: &Camera,
        range: TileRect,
    ) {
        if !grid.has_collision() {
            return;
        }
        for (x, y) in range.iter().filter(|&(x, y)| grid.is_blocked(x, y)) {
            let (min, max) = camera.tile_screen_rect(x, y);
            canvas.fill_rect(min, max, self.collision_color);
        }
    }

    fn draw_cursor<C: Canvas>(
        &self,
        canvas: &mut C,
        grid: &TileGrid,
        camera: &Camera,
        cursor: CursorPreview,
    ) {
        let Some(area) = paint::brush_footprint(grid, cursor.x, cursor.y, cursor.size) else {
            return;
        };
        let (min, _) = camera.tile_screen_rect(area.min_x, area.min_y);
        let (_, max) = camera.tile_screen_rect(area.max_x, area.max_y);
        let color = match cursor.mode {
            PreviewMode::Brush => self.brush_color,
            PreviewMode::Eraser => self.eraser_color,
        };
        canvas.stroke_rect(min, max, 2.0, color);
    }

    /// Downsampled overview in the bottom-right corner with the current
    /// viewport outlined. Samples at most `MINIMAP_SAMPLES` cells per axis.
    fn draw_minimap<C: Canvas>(
        &self,
        canvas: &mut C,
        grid: &TileGrid,
        camera: &Camera,
        assets: &AssetRegistry<C::Image>,
    ) {
        let (w, h) = (grid.width(), grid.height());
        let longest = w.max(h);
        let scale = self.minimap_size / longest as f32;
        let size = Vec2::new(w as f32, h as f32) * scale;
        let origin = camera.viewport() - size - Vec2::splat(MINIMAP_PADDING);
        if origin.x < 0.0 || origin.y < 0.0 {
            return;
        }
        canvas.fill_rect(origin, origin + size, self.minimap_bg_color);

        let step = longest.div_ceil(MINIMAP_SAMPLES).max(1);
        for y in (0..h).step_by(step as usize) {
            for x in (0..w).step_by(step as usize) {
                let tile = grid.top_ref(x as i32, y as i32);
                if tile.is_empty() {
                    continue;
                }
                let color = assets
                    .get(tile.source)
                    .and_then(|s| s.color(tile.x as u32, tile.y as u32))
                    .unwrap_or_else(|| fallback_color(tile.source, tile.x, tile.y));
                let min = origin + Vec2::new(x as f32, y as f32) * scale;
                let max = (min + Vec2::splat(step as f32 * scale)).min(origin + size);
                canvas.fill_rect(min, max, color);
            }
        }

        let world_px = camera.tile_size();
        let view_min = camera.screen_to_world(Vec2::ZERO) / world_px * scale;
        let view_max = camera.screen_to_world(camera.viewport()) / world_px * scale;
        let min = (origin + view_min).clamp(origin, origin + size);
        let max = (origin + view_max).clamp(origin, origin + size);
        canvas.stroke_rect(min, max, 1.0, self.minimap_view_color);
    }
}

/// Stable colour for a tile whose sheet has no sampled colour.
fn fallback_color(source: i32, x: u16, y: u16) -> Rgba {
    let h = (source as u32)
        .wrapping_mul(2_654_435_761)
        .wrapping_add((x as u32).wrapping_mul(97))
        .wrapping_add((y as u32).wrapping_mul(31));
    [
        64 + (h & 0x7f) as u8,
        64 + ((h >> 8) & 0x7f) as u8,
        64 + ((h >> 16) & 0x7f) as u8,
        255,
    ]
}
