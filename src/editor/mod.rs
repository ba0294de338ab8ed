//! The editing session: owns the current map, its history and the camera,
//! and turns pointer gestures into paint operations.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;

use crate::gesture::{PointerButton, PointerModifiers, WheelOutcome};
use crate::grid::{FLOOR_LAYER, OBJECT_LAYER, TileGrid, TileRef};
use crate::history::History;
use crate::keybindings::Action;
use crate::map::{MapRecord, SourceRecord};
use crate::notice::Notice;
use crate::paint::{self, BrushSize};
use crate::render::{Camera, CursorPreview, Overlay, PreviewMode};
use crate::settings::Settings;
use crate::tools::{ActiveTarget, Tool, ToolState};

/// Overlay switches the user toggles. Not part of the map, so undo never
/// touches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    pub show_grid: bool,
    pub show_minimap: bool,
    pub show_collision: bool,
    pub hidden_layers: Vec<usize>,
}

impl ViewOptions {
    pub fn toggle_layer(&mut self, layer: usize) {
        if let Some(i) = self.hidden_layers.iter().position(|&l| l == layer) {
            self.hidden_layers.remove(i);
        } else {
            self.hidden_layers.push(layer);
        }
    }
}

/// Map identity and metadata carried between load and save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapMeta {
    pub id: String,
    pub name: String,
    pub metadata: BTreeMap<String, String>,
    pub sources: Vec<SourceRecord>,
    pub created_at: u64,
}

impl MapMeta {
    fn untitled() -> Self {
        let now = crate::map::now_secs();
        Self {
            id: format!("map-{now}"),
            name: "Untitled".to_string(),
            metadata: BTreeMap::new(),
            sources: Vec::new(),
            created_at: now,
        }
    }

    fn from_record(record: &MapRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            metadata: record.metadata.clone(),
            sources: record.sources.clone(),
            created_at: record.created_at,
        }
    }
}

/// A primary-button gesture in progress.
struct Stroke {
    last: (i32, i32),
    label: &'static str,
}

pub struct Editor {
    grid: TileGrid,
    history: History,
    pub camera: Camera,
    tools: ToolState,
    pub view: ViewOptions,
    pub meta: MapMeta,
    settings: Settings,
    hover: Option<(i32, i32)>,
    stroke: Option<Stroke>,
    pan_from: Option<Vec2>,
    notices: Vec<Notice>,
    reported_missing: BTreeSet<i32>,
}

impl Editor {
    /// Start a session on a blank map of the default size.
    pub fn new(settings: Settings) -> Self {
        let grid = blank_grid(
            &settings,
            settings.grid.default_width,
            settings.grid.default_height,
        );
        let mut camera = Camera::new(&settings.camera);
        camera.set_world(grid.width(), grid.height());
        Self {
            history: History::new(grid.clone(), settings.history.undo_limit),
            grid,
            camera,
            tools: ToolState::new(
                BrushSize::new(settings.paint.default_brush, settings.paint.max_brush),
                TileRef::new(settings.grid.default_floor.source, 0, 0),
            ),
            view: ViewOptions {
                show_grid: settings.display.show_grid,
                show_minimap: settings.display.show_minimap,
                show_collision: settings.display.show_collision,
                hidden_layers: Vec::new(),
            },
            meta: MapMeta::untitled(),
            settings,
            hover: None,
            stroke: None,
            pan_from: None,
            notices: Vec::new(),
            reported_missing: BTreeSet::new(),
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Cell under the pointer, if the pointer is over the surface.
    pub fn hover(&self) -> Option<(i32, i32)> {
        self.hover
    }

    pub fn is_panning(&self) -> bool {
        self.pan_from.is_some()
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.camera.set_viewport(width, height);
    }

    /// Overlay state for the next frame.
    pub fn overlay(&self) -> Overlay {
        let cursor = match (self.hover, self.tools.tool) {
            (Some((x, y)), tool) if tool.is_continuous() && self.pan_from.is_none() => {
                Some(CursorPreview {
                    x,
                    y,
                    size: self.tools.brush.get(),
                    mode: if tool == Tool::Eraser {
                        PreviewMode::Eraser
                    } else {
                        PreviewMode::Brush
                    },
                })
            }
            _ => None,
        };
        Overlay {
            grid_lines: self.view.show_grid,
            collision: self.view.show_collision,
            minimap: self.view.show_minimap,
            hidden_layers: self.view.hidden_layers.clone(),
            cursor,
        }
    }

    // Gestures

    pub fn pointer_down(&mut self, button: PointerButton, pos: Vec2, modifiers: PointerModifiers) {
        self.hover = Some(self.cell_at(pos));
        if button == PointerButton::Secondary || modifiers.pan {
            self.pan_from = Some(pos);
            return;
        }
        if self.stroke.is_some() || self.pan_from.is_some() {
            return;
        }
        let cell = self.cell_at(pos);
        match self.tools.tool {
            Tool::Brush | Tool::Eraser => self.stamp(cell),
            Tool::Fill => self.fill(cell),
            Tool::Picker => {
                self.pick(cell);
                return;
            }
        }
        self.stroke = Some(Stroke {
            last: cell,
            label: self.tools.commit_label(),
        });
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        if let Some(from) = self.pan_from {
            let delta = pos - from;
            self.camera.pan(-delta.x, -delta.y);
            self.pan_from = Some(pos);
        }
        let cell = self.cell_at(pos);
        self.hover = Some(cell);

        let Some(last) = self.stroke.as_ref().map(|s| s.last) else {
            return;
        };
        if !self.tools.tool.is_continuous() || last == cell {
            return;
        }
        for (x, y) in paint::stroke_line(last.0, last.1, cell.0, cell.1).into_iter().skip(1) {
            self.stamp((x, y));
        }
        if let Some(stroke) = &mut self.stroke {
            stroke.last = cell;
        }
    }

    pub fn pointer_up(&mut self, button: PointerButton) {
        match button {
            PointerButton::Secondary => self.pan_from = None,
            PointerButton::Primary => {
                self.pan_from = None;
                self.finish_stroke();
            }
        }
    }

    /// The pointer left the surface: ends any gesture.
    pub fn pointer_leave(&mut self) {
        self.pan_from = None;
        self.finish_stroke();
        self.hover = None;
    }

    /// Modified wheel zooms around the pointer; otherwise the delta is
    /// handed back for the host to scroll with.
    pub fn wheel(&mut self, delta: f32, modifiers: PointerModifiers, pos: Vec2) -> WheelOutcome {
        if !modifiers.zoom {
            return WheelOutcome::Scroll(delta);
        }
        if delta == 0.0 || !delta.is_finite() {
            return WheelOutcome::Unchanged;
        }
        let factor = self.settings.camera.zoom_step.powf(delta.signum());
        if self.camera.zoom_at(factor, pos.x, pos.y) {
            self.hover = Some(self.cell_at(pos));
            WheelOutcome::Zoomed
        } else {
            WheelOutcome::Unchanged
        }
    }

    fn cell_at(&self, pos: Vec2) -> (i32, i32) {
        self.camera.world_to_tile(pos.x, pos.y)
    }

    fn stamp(&mut self, (x, y): (i32, i32)) {
        let size = self.tools.brush.get();
        self.grid = match (self.tools.tool, self.tools.target) {
            (Tool::Eraser, ActiveTarget::Layer(layer)) => paint::erase(&self.grid, layer, x, y, size),
            (_, ActiveTarget::Layer(layer)) => {
                paint::apply_brush(&self.grid, layer, x, y, size, self.tools.paint_ref)
            }
            (tool, ActiveTarget::Collision) => {
                paint::paint_collision(&self.grid, x, y, size, tool != Tool::Eraser)
            }
        };
    }

    fn fill(&mut self, (x, y): (i32, i32)) {
        match self.tools.target {
            ActiveTarget::Layer(layer) => {
                self.grid = paint::flood_fill(&self.grid, layer, x, y, self.tools.paint_ref);
            }
            ActiveTarget::Collision => log::debug!("fill does not apply to the collision layer"),
        }
    }

    fn pick(&mut self, (x, y): (i32, i32)) {
        let ActiveTarget::Layer(layer) = self.tools.target else {
            return;
        };
        let tile = self.grid.get(layer, x, y);
        if tile.is_empty() {
            self.notify(Notice::NothingToPick);
        } else {
            log::debug!("picked {tile} at ({x}, {y})");
            self.tools.paint_ref = tile;
        }
    }

    /// Commit the in-flight stroke if it changed anything.
    fn finish_stroke(&mut self) {
        let Some(stroke) = self.stroke.take() else {
            return;
        };
        if self.grid != *self.history.current() {
            self.history.commit(self.grid.clone(), stroke.label);
        } else {
            log::debug!("{} gesture changed nothing", stroke.label);
        }
    }

    // Tool state

    pub fn select_tool(&mut self, tool: Tool) {
        if self.tools.tool != tool {
            self.finish_stroke();
            self.tools.tool = tool;
        }
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.tools.brush = BrushSize::new(size, self.settings.paint.max_brush);
    }

    /// Returns false if the target does not exist on this map.
    pub fn set_active_target(&mut self, target: ActiveTarget) -> bool {
        if !self.target_exists(target) {
            log::debug!("ignoring unavailable target {target:?}");
            return false;
        }
        self.finish_stroke();
        self.tools.target = target;
        true
    }

    fn target_exists(&self, target: ActiveTarget) -> bool {
        match target {
            ActiveTarget::Layer(layer) => layer < self.grid.layer_count(),
            ActiveTarget::Collision => self.grid.has_collision(),
        }
    }

    pub fn set_paint_ref(&mut self, tile: TileRef) {
        self.tools.paint_ref = tile;
    }

    // History

    pub fn undo(&mut self) -> bool {
        self.finish_stroke();
        let restored = self.history.undo().cloned();
        match restored {
            Some(grid) => {
                self.restore(grid);
                true
            }
            None => {
                self.notify(Notice::NothingToUndo);
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        self.finish_stroke();
        let restored = self.history.redo().cloned();
        match restored {
            Some(grid) => {
                self.restore(grid);
                true
            }
            None => {
                self.notify(Notice::NothingToRedo);
                false
            }
        }
    }

    /// Swap in a snapshot, which may have a different size after a resize.
    fn restore(&mut self, grid: TileGrid) {
        self.grid = grid;
        self.camera.set_world(self.grid.width(), self.grid.height());
        if !self.target_exists(self.tools.target) {
            self.tools.target = ActiveTarget::default();
        }
    }

    /// Change how many snapshots history keeps. Shrinking evicts the oldest.
    pub fn set_undo_limit(&mut self, limit: usize) {
        self.settings.history.undo_limit = limit.max(1);
        self.history.set_max_depth(limit);
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    // Map lifecycle

    pub fn new_map(&mut self, width: u32, height: u32) {
        let (width, height) = self.clamp_dimensions(width, height);
        let grid = blank_grid(&self.settings, width, height);
        self.replace_map(grid);
        // Loaded sheets stay registered, so their paths carry over.
        let sources = std::mem::take(&mut self.meta.sources);
        self.meta = MapMeta::untitled();
        self.meta.sources = sources;
        log::info!("new map {width}x{height}");
    }

    /// Replace the current map with a loaded one. On failure the current map
    /// is kept and a notice is queued.
    pub fn load_record(&mut self, record: &MapRecord) -> bool {
        let grid_settings = &self.settings.grid;
        if record.width > grid_settings.max_width || record.height > grid_settings.max_height {
            let msg = format!(
                "map is {}x{}, larger than the {}x{} maximum",
                record.width, record.height, grid_settings.max_width, grid_settings.max_height
            );
            self.notify(Notice::LoadFailed(msg));
            return false;
        }
        match record.to_grid() {
            Ok(grid) => {
                self.replace_map(grid);
                let previous = std::mem::take(&mut self.meta.sources);
                self.meta = MapMeta::from_record(record);
                self.meta.sources.extend(
                    previous
                        .into_iter()
                        .filter(|p| !record.sources.iter().any(|s| s.id == p.id)),
                );
                log::info!("loaded map '{}' ({}x{})", record.name, record.width, record.height);
                true
            }
            Err(e) => {
                self.notify(Notice::LoadFailed(e.to_string()));
                false
            }
        }
    }

    pub fn to_record(&self) -> MapRecord {
        let mut record = MapRecord::from_grid(self.meta.id.clone(), self.meta.name.clone(), &self.grid);
        record.metadata = self.meta.metadata.clone();
        record.sources = self.meta.sources.clone();
        if self.meta.created_at != 0 {
            record.created_at = self.meta.created_at;
        }
        record
    }

    /// Resize the current map as an undoable edit.
    pub fn resize_map(&mut self, width: u32, height: u32) {
        self.finish_stroke();
        let (width, height) = self.clamp_dimensions(width, height);
        if (width, height) == (self.grid.width(), self.grid.height()) {
            return;
        }
        let grid = self.grid.resized(width, height);
        self.history.commit(grid.clone(), "Resize");
        self.restore(grid);
    }

    fn replace_map(&mut self, grid: TileGrid) {
        self.stroke = None;
        self.pan_from = None;
        self.history.reset(grid.clone());
        self.reported_missing.clear();
        self.view.hidden_layers.retain(|&l| l < grid.layer_count());
        self.restore(grid);
    }

    fn clamp_dimensions(&mut self, width: u32, height: u32) -> (u32, u32) {
        let max_w = self.settings.grid.max_width.max(1);
        let max_h = self.settings.grid.max_height.max(1);
        let applied = (width.clamp(1, max_w), height.clamp(1, max_h));
        if applied != (width, height) {
            self.notify(Notice::InvalidDimensions {
                requested: (width, height),
                applied,
            });
        }
        applied
    }

    // Camera

    pub fn reset_camera(&mut self) {
        self.camera.reset();
    }

    fn zoom_at_center(&mut self, factor: f32) {
        let center = self.camera.viewport() * 0.5;
        self.camera.zoom_at(factor, center.x, center.y);
    }

    // Notices

    fn notify(&mut self, notice: Notice) {
        log::log!(notice.level(), "{notice}");
        self.notices.push(notice);
    }

    /// Drain queued notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Queue a `SourceNotReady` notice for each id not reported since the
    /// last map change.
    pub fn report_missing_sources(&mut self, ids: &[i32]) {
        for &id in ids {
            if self.reported_missing.insert(id) {
                self.notify(Notice::SourceNotReady(id));
            }
        }
    }

    /// Run a bound action. Returns false for actions the host has to handle
    /// (file dialogs).
    pub fn apply_action(&mut self, action: Action) -> bool {
        let max_brush = self.settings.paint.max_brush;
        let zoom_step = self.settings.camera.zoom_step;
        match action {
            Action::Undo => {
                self.undo();
            }
            Action::Redo => {
                self.redo();
            }
            Action::ToolBrush => self.select_tool(Tool::Brush),
            Action::ToolEraser => self.select_tool(Tool::Eraser),
            Action::ToolFill => self.select_tool(Tool::Fill),
            Action::ToolPicker => self.select_tool(Tool::Picker),
            Action::BrushGrow => self.tools.brush = self.tools.brush.grow(max_brush),
            Action::BrushShrink => self.tools.brush = self.tools.brush.shrink(max_brush),
            Action::TargetFloor => {
                self.set_active_target(ActiveTarget::Layer(FLOOR_LAYER));
            }
            Action::TargetObjects => {
                self.set_active_target(ActiveTarget::Layer(OBJECT_LAYER));
            }
            Action::TargetCollision => {
                self.set_active_target(ActiveTarget::Collision);
            }
            Action::ToggleGrid => self.view.show_grid = !self.view.show_grid,
            Action::ToggleMinimap => self.view.show_minimap = !self.view.show_minimap,
            Action::ToggleCollision => self.view.show_collision = !self.view.show_collision,
            Action::ZoomIn => self.zoom_at_center(zoom_step),
            Action::ZoomOut => self.zoom_at_center(1.0 / zoom_step),
            Action::ResetCamera => self.reset_camera(),
            Action::NewMap | Action::OpenMap | Action::SaveMap | Action::LoadTileSource => {
                return false;
            }
        }
        true
    }
}

fn blank_grid(settings: &Settings, width: u32, height: u32) -> TileGrid {
    let grid = TileGrid::new(width, height, settings.grid.default_floor);
    if settings.grid.collision {
        grid.with_collision_layer()
    } else {
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: TileRef = TileRef::new(0, 1, 33);
    const PAINT: TileRef = TileRef::new(1, 0, 0);

    fn editor(w: u32, h: u32) -> Editor {
        let mut settings = Settings::default();
        settings.grid.default_width = w;
        settings.grid.default_height = h;
        let mut editor = Editor::new(settings);
        editor.set_viewport(800.0, 600.0);
        editor
    }

    fn at(editor: &Editor, x: i32, y: i32) -> Vec2 {
        let (min, max) = editor.camera.tile_screen_rect(x, y);
        (min + max) * 0.5
    }

    fn click(editor: &mut Editor, x: i32, y: i32) {
        let pos = at(editor, x, y);
        editor.pointer_down(PointerButton::Primary, pos, PointerModifiers::NONE);
        editor.pointer_up(PointerButton::Primary);
    }

    #[test]
    fn test_end_to_end_paint_undo_redo() {
        let mut ed = editor(10, 10);
        let baseline = ed.grid().clone();
        ed.set_paint_ref(PAINT);
        click(&mut ed, 5, 5);

        let painted = ed.grid().clone();
        assert_eq!(painted.cells_differing(&baseline), 1);
        assert_eq!(painted.get(FLOOR_LAYER, 5, 5), PAINT);
        assert_eq!(ed.history().len(), 2);

        assert!(ed.undo());
        assert_eq!(*ed.grid(), baseline);
        assert_eq!(ed.grid().get(FLOOR_LAYER, 5, 5), FLOOR);
        assert!(ed.redo());
        assert_eq!(*ed.grid(), painted);
    }

    #[test]
    fn test_drag_is_one_commit_without_gaps() {
        let mut ed = editor(20, 5);
        ed.set_paint_ref(PAINT);
        ed.pointer_down(PointerButton::Primary, at(&ed, 1, 2), PointerModifiers::NONE);
        ed.pointer_move(at(&ed, 4, 2));
        ed.pointer_move(at(&ed, 12, 2));
        ed.pointer_up(PointerButton::Primary);

        assert_eq!(ed.history().len(), 2);
        for x in 1..=12 {
            assert_eq!(ed.grid().get(FLOOR_LAYER, x, 2), PAINT, "gap at x={x}");
        }
        assert_eq!(ed.grid().get(FLOOR_LAYER, 13, 2), FLOOR);
    }

    #[test]
    fn test_noop_gesture_commits_nothing() {
        let mut ed = editor(5, 5);
        ed.set_paint_ref(FLOOR);
        click(&mut ed, 2, 2);
        assert_eq!(ed.history().len(), 1);

        click(&mut ed, 50, 50);
        assert_eq!(ed.history().len(), 1);
    }

    #[test]
    fn test_pointer_leave_ends_stroke() {
        let mut ed = editor(5, 5);
        ed.set_paint_ref(PAINT);
        ed.pointer_down(PointerButton::Primary, at(&ed, 0, 0), PointerModifiers::NONE);
        ed.pointer_leave();
        assert!(!ed.is_stroking());
        assert_eq!(ed.history().len(), 2);
        assert_eq!(ed.hover(), None);
    }

    #[test]
    fn test_erase_resets_floor_and_clears_objects() {
        let mut ed = editor(5, 5);
        ed.set_paint_ref(PAINT);
        click(&mut ed, 1, 1);
        ed.set_active_target(ActiveTarget::Layer(OBJECT_LAYER));
        click(&mut ed, 1, 1);
        assert_eq!(ed.grid().get(OBJECT_LAYER, 1, 1), PAINT);

        ed.select_tool(Tool::Eraser);
        click(&mut ed, 1, 1);
        assert!(ed.grid().get(OBJECT_LAYER, 1, 1).is_empty());
        ed.set_active_target(ActiveTarget::Layer(FLOOR_LAYER));
        click(&mut ed, 1, 1);
        assert_eq!(ed.grid().get(FLOOR_LAYER, 1, 1), FLOOR);
    }

    #[test]
    fn test_fill_is_single_commit() {
        let mut ed = editor(6, 6);
        ed.select_tool(Tool::Fill);
        ed.set_paint_ref(PAINT);
        click(&mut ed, 0, 0);
        assert_eq!(ed.history().len(), 2);
        assert_eq!(ed.history().labels().last(), Some("Fill"));
        for (x, y) in [(0, 0), (5, 5), (3, 2)] {
            assert_eq!(ed.grid().get(FLOOR_LAYER, x, y), PAINT);
        }
    }

    #[test]
    fn test_picker_sets_paint_ref_without_editing() {
        let mut ed = editor(5, 5);
        ed.set_paint_ref(PAINT);
        click(&mut ed, 3, 3);
        ed.set_paint_ref(TileRef::new(9, 9, 9));

        ed.select_tool(Tool::Picker);
        let before = ed.grid().clone();
        click(&mut ed, 3, 3);
        assert_eq!(ed.tools().paint_ref, PAINT);
        assert_eq!(ed.tools().tool, Tool::Picker);
        assert_eq!(*ed.grid(), before);
        assert_eq!(ed.history().len(), 2);
    }

    #[test]
    fn test_picker_on_empty_cell() {
        let mut ed = editor(5, 5);
        ed.set_active_target(ActiveTarget::Layer(OBJECT_LAYER));
        ed.select_tool(Tool::Picker);
        let before = ed.tools().paint_ref;
        click(&mut ed, 0, 0);
        assert_eq!(ed.tools().paint_ref, before);
        assert_eq!(ed.take_notices(), vec![Notice::NothingToPick]);
    }

    #[test]
    fn test_secondary_drag_pans_without_painting() {
        let mut ed = editor(100, 100);
        ed.set_paint_ref(PAINT);
        let start = Vec2::new(400.0, 300.0);
        ed.pointer_down(PointerButton::Secondary, start, PointerModifiers::NONE);
        ed.pointer_move(start - Vec2::new(64.0, 32.0));
        ed.pointer_up(PointerButton::Secondary);
        assert_eq!(ed.camera.offset, Vec2::new(64.0, 32.0));
        assert_eq!(ed.history().len(), 1);

        let pan = PointerModifiers { pan: true, zoom: false };
        ed.pointer_down(PointerButton::Primary, start, pan);
        assert!(ed.is_panning());
        ed.pointer_up(PointerButton::Primary);
        assert_eq!(ed.history().len(), 1);
    }

    #[test]
    fn test_wheel() {
        let mut ed = editor(100, 100);
        let pos = Vec2::new(100.0, 100.0);
        assert_eq!(ed.wheel(3.0, PointerModifiers::NONE, pos), WheelOutcome::Scroll(3.0));
        let zoom = PointerModifiers { pan: false, zoom: true };
        assert_eq!(ed.wheel(1.0, zoom, pos), WheelOutcome::Zoomed);
        assert!((ed.camera.zoom() - 1.1).abs() < 1e-6);
        assert_eq!(ed.wheel(0.0, zoom, pos), WheelOutcome::Unchanged);
        for _ in 0..100 {
            ed.wheel(1.0, zoom, pos);
        }
        assert_eq!(ed.wheel(1.0, zoom, pos), WheelOutcome::Unchanged);
    }

    #[test]
    fn test_undo_redo_boundaries_notify() {
        let mut ed = editor(3, 3);
        assert!(!ed.undo());
        assert!(!ed.redo());
        assert_eq!(
            ed.take_notices(),
            vec![Notice::NothingToUndo, Notice::NothingToRedo]
        );
        assert!(ed.take_notices().is_empty());
    }

    #[test]
    fn test_new_map_clamps_and_resets_history() {
        let mut ed = editor(5, 5);
        ed.set_paint_ref(PAINT);
        click(&mut ed, 0, 0);
        ed.new_map(0, 1000);
        assert_eq!((ed.grid().width(), ed.grid().height()), (1, 256));
        assert_eq!(ed.history().len(), 1);
        assert!(!ed.history().can_undo());
        assert_eq!(
            ed.take_notices(),
            vec![Notice::InvalidDimensions {
                requested: (0, 1000),
                applied: (1, 256)
            }]
        );
    }

    #[test]
    fn test_load_record_and_failure_keeps_map() {
        let mut ed = editor(4, 4);
        ed.set_paint_ref(PAINT);
        click(&mut ed, 2, 2);
        ed.meta.name = "Ward C".to_string();
        let record = ed.to_record();

        let mut other = editor(8, 8);
        assert!(other.load_record(&record));
        assert_eq!(other.grid(), ed.grid());
        assert_eq!(other.meta.name, "Ward C");
        assert_eq!(other.history().len(), 1);

        let mut broken = record.clone();
        broken.layers[0].cells.truncate(3);
        assert!(!other.load_record(&broken));
        assert_eq!(other.grid(), ed.grid());
        assert!(matches!(other.take_notices().as_slice(), [Notice::LoadFailed(_)]));

        let mut huge = record;
        huge.width = 10_000;
        assert!(!other.load_record(&huge));
    }

    #[test]
    fn test_resize_is_undoable() {
        let mut ed = editor(4, 4);
        ed.set_paint_ref(PAINT);
        click(&mut ed, 1, 1);
        ed.resize_map(6, 2);
        assert_eq!((ed.grid().width(), ed.grid().height()), (6, 2));
        assert_eq!(ed.grid().get(FLOOR_LAYER, 1, 1), PAINT);
        assert_eq!(ed.grid().get(FLOOR_LAYER, 5, 1), FLOOR);
        assert!(ed.undo());
        assert_eq!((ed.grid().width(), ed.grid().height()), (4, 4));
    }

    fn sheet(id: i32, path: &str) -> SourceRecord {
        SourceRecord {
            id,
            path: path.to_string(),
            tile_size: 32,
        }
    }

    #[test]
    fn test_new_map_keeps_sheet_paths() {
        let mut ed = editor(4, 4);
        ed.meta.sources.push(sheet(0, "/sheets/floors.png"));
        ed.new_map(10, 10);

        let record = ed.to_record();
        assert_eq!(record.referenced_sources(), vec![0]);
        assert_eq!(record.sources, vec![sheet(0, "/sheets/floors.png")]);
        assert_eq!(ed.meta.name, "Untitled");
    }

    #[test]
    fn test_load_record_prefers_its_own_sheet_paths() {
        let mut ed = editor(4, 4);
        ed.meta.sources.push(sheet(0, "/sheets/hospital.png"));
        ed.meta.sources.push(sheet(1, "/sheets/props.png"));

        let mut record = editor(3, 3).to_record();
        record.sources = vec![sheet(0, "/sheets/clinic.png")];
        assert!(ed.load_record(&record));
        assert_eq!(
            ed.meta.sources,
            vec![sheet(0, "/sheets/clinic.png"), sheet(1, "/sheets/props.png")]
        );
    }

    #[test]
    fn test_undo_limit_applies_to_history() {
        let mut ed = editor(5, 5);
        ed.set_paint_ref(PAINT);
        for x in 0..5 {
            click(&mut ed, x, 0);
        }
        assert_eq!(ed.history().len(), 6);
        ed.set_undo_limit(3);
        assert_eq!(ed.history().len(), 3);
        assert_eq!(ed.settings().history.undo_limit, 3);
        assert_eq!(*ed.history().current(), *ed.grid());
    }

    #[test]
    fn test_collision_brush() {
        let mut ed = editor(5, 5);
        assert!(ed.set_active_target(ActiveTarget::Collision));
        ed.set_brush_size(3);
        click(&mut ed, 2, 2);
        assert!(ed.grid().is_blocked(1, 1));
        assert!(ed.grid().is_blocked(3, 3));
        assert!(!ed.grid().is_blocked(0, 0));
        ed.select_tool(Tool::Eraser);
        ed.set_brush_size(1);
        click(&mut ed, 2, 2);
        assert!(!ed.grid().is_blocked(2, 2));
        assert_eq!(ed.history().labels().last(), Some("Collision"));
    }

    #[test]
    fn test_missing_sources_reported_once() {
        let mut ed = editor(3, 3);
        ed.report_missing_sources(&[4, 7]);
        ed.report_missing_sources(&[4]);
        assert_eq!(
            ed.take_notices(),
            vec![Notice::SourceNotReady(4), Notice::SourceNotReady(7)]
        );
    }

    #[test]
    fn test_overlay_cursor_follows_tool() {
        let mut ed = editor(5, 5);
        ed.pointer_move(at(&ed, 2, 2));
        ed.set_brush_size(3);
        let cursor = ed.overlay().cursor.unwrap();
        assert_eq!((cursor.x, cursor.y, cursor.size), (2, 2, 3));
        assert_eq!(cursor.mode, PreviewMode::Brush);
        ed.select_tool(Tool::Eraser);
        assert_eq!(ed.overlay().cursor.unwrap().mode, PreviewMode::Eraser);
        ed.select_tool(Tool::Fill);
        assert!(ed.overlay().cursor.is_none());
    }

    #[test]
    fn test_apply_action() {
        let mut ed = editor(5, 5);
        assert!(ed.apply_action(Action::ToolFill));
        assert_eq!(ed.tools().tool, Tool::Fill);
        assert!(ed.apply_action(Action::BrushGrow));
        assert_eq!(ed.tools().brush.get(), 3);
        let grid = ed.view.show_grid;
        assert!(ed.apply_action(Action::ToggleGrid));
        assert_eq!(ed.view.show_grid, !grid);
        assert!(ed.apply_action(Action::TargetCollision));
        assert_eq!(ed.tools().target, ActiveTarget::Collision);
        assert!(!ed.apply_action(Action::SaveMap));
    }
}
