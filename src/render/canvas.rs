use glam::Vec2;

use crate::tile::UvRect;

/// RGBA, unmultiplied.
pub type Rgba = [u8; 4];

/// Drawing surface the renderer paints into. Coordinates are viewport-local
/// screen pixels.
pub trait Canvas {
    /// Backend handle for a decoded tile sheet.
    type Image;

    fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Rgba);
    fn stroke_rect(&mut self, min: Vec2, max: Vec2, width: f32, color: Rgba);
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);
    fn draw_tile(&mut self, image: &Self::Image, uv: UvRect, min: Vec2, max: Vec2);
}

/// Canvas over an egui painter. `origin` is the screen position of the
/// viewport's top-left corner.
pub struct EguiCanvas<'a> {
    painter: &'a egui::Painter,
    origin: egui::Vec2,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(painter: &'a egui::Painter, origin: egui::Pos2) -> Self {
        Self {
            painter,
            origin: origin.to_vec2(),
        }
    }

    fn pos(&self, p: Vec2) -> egui::Pos2 {
        egui::pos2(p.x, p.y) + self.origin
    }

    fn rect(&self, min: Vec2, max: Vec2) -> egui::Rect {
        egui::Rect::from_min_max(self.pos(min), self.pos(max))
    }
}

fn color32(c: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}

impl Canvas for EguiCanvas<'_> {
    type Image = egui::TextureHandle;

    fn fill_rect(&mut self, min: Vec2, max: Vec2, color: Rgba) {
        self.painter.rect_filled(self.rect(min, max), 0.0, color32(color));
    }

    fn stroke_rect(&mut self, min: Vec2, max: Vec2, width: f32, color: Rgba) {
        self.painter.rect_stroke(
            self.rect(min, max),
            0.0,
            egui::Stroke::new(width, color32(color)),
            egui::StrokeKind::Inside,
        );
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.painter.line_segment(
            [self.pos(from), self.pos(to)],
            egui::Stroke::new(width, color32(color)),
        );
    }

    fn draw_tile(&mut self, image: &Self::Image, uv: UvRect, min: Vec2, max: Vec2) {
        let uv = egui::Rect::from_min_max(
            egui::pos2(uv.min.x, uv.min.y),
            egui::pos2(uv.max.x, uv.max.y),
        );
        self.painter
            .image(image.id(), self.rect(min, max), uv, egui::Color32::WHITE);
    }
}
