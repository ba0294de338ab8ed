use wardmap::Editor;
use wardmap::TileRef;
use wardmap::tile::AssetRegistry;

/// Tile picker panel state.
pub struct TilePickerState {
    /// Source shown in the picker.
    pub source: Option<i32>,
    pub zoom: f32,
}

impl Default for TilePickerState {
    fn default() -> Self {
        Self { source: None, zoom: 1.0 }
    }
}

impl TilePickerState {
    /// Step the paint reference through the tiles of its sheet, row-major.
    pub fn cycle(&self, editor: &mut Editor, assets: &AssetRegistry<egui::TextureHandle>, step: i32) {
        let current = editor.tools().paint_ref;
        let Some(source) = assets.get(current.source) else {
            return;
        };
        let count = (source.cols() * source.rows()) as i32;
        if count == 0 {
            return;
        }
        let index = current.y as i32 * source.cols() as i32 + current.x as i32;
        let next = (index + step).rem_euclid(count);
        let cols = source.cols() as i32;
        editor.set_paint_ref(TileRef::new(current.source, (next % cols) as u16, (next / cols) as u16));
    }
}

/// Bottom panel listing loaded sheets; clicking a tile makes it the paint
/// reference.
pub fn draw_tile_picker(
    ctx: &egui::Context,
    editor: &mut Editor,
    assets: &AssetRegistry<egui::TextureHandle>,
    state: &mut TilePickerState,
) {
    egui::TopBottomPanel::bottom("tile_picker")
        .default_height(220.0)
        .resizable(true)
        .show(ctx, |ui| {
            let paint_ref = editor.tools().paint_ref;
            if state.source.is_none_or(|id| assets.get(id).is_none()) {
                state.source = assets.ready().map(|(id, _)| id).next();
            }

            ui.horizontal(|ui| {
                ui.heading("Tiles");
                let current_name = state
                    .source
                    .and_then(|id| assets.get(id))
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| "None".to_string());
                egui::ComboBox::from_id_salt("tile_source_selector")
                    .selected_text(current_name)
                    .show_ui(ui, |ui| {
                        for (id, source) in assets.ready() {
                            let label = format!("{id}: {}", source.name);
                            ui.selectable_value(&mut state.source, Some(id), label);
                        }
                    });
                ui.add(egui::Slider::new(&mut state.zoom, 0.5..=4.0).text("zoom"));
            });

            let Some((id, source)) = state.source.and_then(|id| assets.get(id).map(|s| (id, s))) else {
                ui.label("No tile sheets loaded. Use File > Load Tile Sheet.");
                return;
            };
            let (cols, rows) = (source.cols(), source.rows());
            if cols == 0 || rows == 0 {
                ui.label("Sheet is smaller than one tile.");
                return;
            }

            let display_size = egui::vec2(source.image_width as f32, source.image_height as f32) * state.zoom;
            egui::ScrollArea::both().show(ui, |ui| {
                let (response, painter) = ui.allocate_painter(display_size, egui::Sense::click());
                let rect = response.rect;

                painter.image(
                    source.image.id(),
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );

                let cell = source.tile_size as f32 * state.zoom;
                let grid_color = egui::Color32::from_rgba_premultiplied(100, 100, 100, 120);
                for c in 0..=cols {
                    let x = rect.left() + c as f32 * cell;
                    painter.line_segment(
                        [egui::pos2(x, rect.top()), egui::pos2(x, rect.top() + rows as f32 * cell)],
                        egui::Stroke::new(1.0, grid_color),
                    );
                }
                for r in 0..=rows {
                    let y = rect.top() + r as f32 * cell;
                    painter.line_segment(
                        [egui::pos2(rect.left(), y), egui::pos2(rect.left() + cols as f32 * cell, y)],
                        egui::Stroke::new(1.0, grid_color),
                    );
                }

                if paint_ref.source == id && source.contains(paint_ref.x as u32, paint_ref.y as u32) {
                    let min = rect.left_top() + egui::vec2(paint_ref.x as f32, paint_ref.y as f32) * cell;
                    let sel_rect = egui::Rect::from_min_size(min, egui::vec2(cell, cell));
                    painter.rect_filled(sel_rect, 0.0, egui::Color32::from_rgba_unmultiplied(255, 255, 0, 60));
                    painter.rect_stroke(
                        sel_rect,
                        0.0,
                        egui::Stroke::new(2.0, egui::Color32::YELLOW),
                        egui::StrokeKind::Outside,
                    );
                }

                if response.clicked()
                    && let Some(pos) = response.interact_pointer_pos()
                {
                    let local = pos - rect.left_top();
                    let col = (local.x / cell) as u32;
                    let row = (local.y / cell) as u32;
                    if source.contains(col, row) {
                        editor.set_paint_ref(TileRef::new(id, col as u16, row as u16));
                    }
                }
            });
        });
}
