use glam::Vec2;

use crate::grid::TileRect;
use crate::settings::CameraSettings;

/// 2D pan/zoom camera over a tile grid.
///
/// `offset` is the screen-space position of the viewport's top-left corner
/// measured in scaled pixels (world pixels times zoom), so a screen point
/// `p` sits over world pixel `(p + offset) / zoom`.
#[derive(Debug, Clone)]
pub struct Camera {
    pub offset: Vec2,
    zoom: f32,
    tile_size: f32,
    zoom_min: f32,
    zoom_max: f32,
    /// How far past the grid edge the viewport may travel, in screen pixels.
    pan_margin: f32,
    /// Extra tiles drawn around the visible range.
    cull_margin: i32,
    viewport: Vec2,
    world_tiles: (u32, u32),
}

impl Camera {
    pub fn new(settings: &CameraSettings) -> Self {
        let zoom_min = settings.zoom_min.max(0.01);
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0_f32.clamp(zoom_min, settings.zoom_max.max(zoom_min)),
            tile_size: settings.tile_size.max(1) as f32,
            zoom_min,
            zoom_max: settings.zoom_max.max(zoom_min),
            pan_margin: settings.pan_margin.max(0.0),
            cull_margin: settings.cull_margin as i32,
            viewport: Vec2::ZERO,
            world_tiles: (0, 0),
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// On-screen size of one tile in pixels.
    pub fn scaled_tile_size(&self) -> f32 {
        self.tile_size * self.zoom
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.viewport = Vec2::new(width, height);
        }
    }

    /// Grid size in tiles. Zoom is kept; a size change re-clamps the offset
    /// so a smaller map can't leave the viewport past its edge.
    pub fn set_world(&mut self, width: u32, height: u32) {
        if self.world_tiles == (width, height) {
            return;
        }
        self.world_tiles = (width, height);
        self.clamp_offset();
    }

    /// Tile index under a screen point. May be outside the grid.
    pub fn world_to_tile(&self, px: f32, py: f32) -> (i32, i32) {
        let s = self.scaled_tile_size();
        (
            ((px + self.offset.x) / s).floor() as i32,
            ((py + self.offset.y) / s).floor() as i32,
        )
    }

    /// Unscaled world pixel under a screen point.
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen + self.offset) / self.zoom
    }

    /// Screen position of a tile's top-left corner.
    pub fn tile_to_screen(&self, x: i32, y: i32) -> Vec2 {
        Vec2::new(x as f32, y as f32) * self.scaled_tile_size() - self.offset
    }

    /// Screen rectangle (min, max) covered by a tile.
    pub fn tile_screen_rect(&self, x: i32, y: i32) -> (Vec2, Vec2) {
        let min = self.tile_to_screen(x, y);
        (min, min + Vec2::splat(self.scaled_tile_size()))
    }

    /// Inclusive tile rectangle intersecting a viewport of the given size,
    /// widened by the cull margin and clamped to the grid.
    pub fn visible_tile_range(&self, viewport_w: f32, viewport_h: f32) -> Option<TileRect> {
        let (world_w, world_h) = self.world_tiles;
        if viewport_w <= 0.0 || viewport_h <= 0.0 || world_w == 0 || world_h == 0 {
            return None;
        }
        let s = self.scaled_tile_size();
        let m = self.cull_margin;
        let min_x = (self.offset.x / s).floor() as i32 - m;
        let min_y = (self.offset.y / s).floor() as i32 - m;
        let max_x = ((self.offset.x + viewport_w) / s).ceil() as i32 - 1 + m;
        let max_y = ((self.offset.y + viewport_h) / s).ceil() as i32 - 1 + m;

        let rect = TileRect {
            min_x: min_x.max(0),
            min_y: min_y.max(0),
            max_x: max_x.min(world_w as i32 - 1),
            max_y: max_y.min(world_h as i32 - 1),
        };
        (rect.min_x <= rect.max_x && rect.min_y <= rect.max_y).then_some(rect)
    }

    /// Move the viewport by a screen-space delta, then clamp to the grid.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset += Vec2::new(dx, dy);
        self.clamp_offset();
    }

    /// Multiply zoom by `factor`, keeping the world point under the focal
    /// screen position fixed. Returns false if nothing changed.
    pub fn zoom_at(&mut self, factor: f32, focal_x: f32, focal_y: f32) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let new_zoom = (self.zoom * factor).clamp(self.zoom_min, self.zoom_max);
        if new_zoom == self.zoom {
            return false;
        }
        let focal = Vec2::new(focal_x, focal_y);
        let world = self.screen_to_world(focal);
        self.zoom = new_zoom;
        self.offset = world * new_zoom - focal;
        self.clamp_offset();
        true
    }

    /// Back to zoom 1 at the grid origin.
    pub fn reset(&mut self) {
        self.zoom = 1.0_f32.clamp(self.zoom_min, self.zoom_max);
        self.offset = Vec2::ZERO;
        self.clamp_offset();
    }

    /// Center the viewport on a tile.
    pub fn center_on_tile(&mut self, x: i32, y: i32) {
        let s = self.scaled_tile_size();
        let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) * s;
        self.offset = center - self.viewport * 0.5;
        self.clamp_offset();
    }

    /// Keep the viewport within `pan_margin` of the grid on each axis. A grid
    /// smaller than the viewport is centered instead.
    fn clamp_offset(&mut self) {
        let s = self.scaled_tile_size();
        let content = Vec2::new(self.world_tiles.0 as f32, self.world_tiles.1 as f32) * s;
        self.offset.x = clamp_axis(self.offset.x, content.x, self.viewport.x, self.pan_margin);
        self.offset.y = clamp_axis(self.offset.y, content.y, self.viewport.y, self.pan_margin);
    }
}

fn clamp_axis(offset: f32, content: f32, viewport: f32, margin: f32) -> f32 {
    let lo = -margin;
    let hi = content - viewport + margin;
    if hi < lo {
        (content - viewport) * 0.5
    } else {
        offset.clamp(lo, hi)
    }
}
