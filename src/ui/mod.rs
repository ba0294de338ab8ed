mod map_view;
mod tile_picker;
mod tools_panel;

use std::path::PathBuf;

use wardmap::Editor;
use wardmap::keybindings::{Action, Keybindings};
use wardmap::render::{FrameStats, Renderer};
use wardmap::tile::AssetRegistry;

pub use map_view::MapViewState;
pub use tile_picker::TilePickerState;

/// Actions the UI wants the app to execute (can't borrow mutably inside egui closures).
pub enum UiAction {
    None,
    NewMap { width: u32, height: u32 },
    OpenMap,
    OpenRecent(PathBuf),
    SaveMap,
    SaveMapAs,
    LoadTileSheet,
    Quit,
}

/// Dialog and panel state owned by the app between frames.
pub struct UiState {
    pub map_view: MapViewState,
    pub tile_picker: TilePickerState,
    /// Open "New Map" / "Resize" dialog with its pending size.
    pub size_dialog: Option<SizeDialog>,
    /// Last notice shown in the status bar.
    pub status: Option<(String, bool)>,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            map_view: MapViewState::default(),
            tile_picker: TilePickerState::default(),
            size_dialog: None,
            status: None,
        }
    }
}

#[derive(Clone, Copy)]
pub struct SizeDialog {
    pub kind: SizeDialogKind,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum SizeDialogKind {
    NewMap,
    Resize,
}

/// Draw all egui UI panels and the map view. Called each frame within egui context.
#[allow(clippy::too_many_arguments)]
pub fn draw_ui(
    ctx: &egui::Context,
    editor: &mut Editor,
    assets: &AssetRegistry<egui::TextureHandle>,
    renderer: &Renderer,
    keybindings: &Keybindings,
    state: &mut UiState,
    recent_files: &[PathBuf],
) -> (UiAction, FrameStats) {
    let mut action = UiAction::None;
    let shortcut = |a: Action| keybindings.display(a);

    // Menu bar
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button(format!("New...  {}", shortcut(Action::NewMap))).clicked() {
                    let grid = &editor.settings().grid;
                    state.size_dialog = Some(SizeDialog {
                        kind: SizeDialogKind::NewMap,
                        width: grid.default_width,
                        height: grid.default_height,
                    });
                    ui.close();
                }
                if ui.button(format!("Open...  {}", shortcut(Action::OpenMap))).clicked() {
                    action = UiAction::OpenMap;
                    ui.close();
                }
                ui.menu_button("Open Recent", |ui| {
                    if recent_files.is_empty() {
                        ui.label("(none)");
                    }
                    for path in recent_files {
                        let name = path
                            .file_name()
                            .map(|n| n.to_string_lossy().to_string())
                            .unwrap_or_default();
                        if ui.button(name).on_hover_text(path.display().to_string()).clicked() {
                            action = UiAction::OpenRecent(path.clone());
                            ui.close();
                        }
                    }
                });
                if ui.button(format!("Save  {}", shortcut(Action::SaveMap))).clicked() {
                    action = UiAction::SaveMap;
                    ui.close();
                }
                if ui.button("Save As...").clicked() {
                    action = UiAction::SaveMapAs;
                    ui.close();
                }
                ui.separator();
                if ui.button(format!("Load Tile Sheet...  {}", shortcut(Action::LoadTileSource))).clicked() {
                    action = UiAction::LoadTileSheet;
                    ui.close();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    action = UiAction::Quit;
                    ui.close();
                }
            });
            ui.menu_button("Edit", |ui| {
                let can_undo = editor.history().can_undo();
                if ui.add_enabled(can_undo, egui::Button::new(format!("Undo  {}", shortcut(Action::Undo)))).clicked() {
                    editor.undo();
                    ui.close();
                }
                let can_redo = editor.history().can_redo();
                if ui.add_enabled(can_redo, egui::Button::new(format!("Redo  {}", shortcut(Action::Redo)))).clicked() {
                    editor.redo();
                    ui.close();
                }
                ui.separator();
                if ui.button("Resize Map...").clicked() {
                    state.size_dialog = Some(SizeDialog {
                        kind: SizeDialogKind::Resize,
                        width: editor.grid().width(),
                        height: editor.grid().height(),
                    });
                    ui.close();
                }
                ui.horizontal(|ui| {
                    ui.label("Undo limit:");
                    let mut limit = editor.settings().history.undo_limit;
                    if ui.add(egui::DragValue::new(&mut limit).range(1..=1000)).changed() {
                        editor.set_undo_limit(limit);
                    }
                });
            });
            ui.menu_button("View", |ui| {
                ui.checkbox(&mut editor.view.show_grid, "Grid Lines");
                ui.checkbox(&mut editor.view.show_minimap, "Minimap");
                ui.add_enabled(
                    editor.grid().has_collision(),
                    egui::Checkbox::new(&mut editor.view.show_collision, "Collision Overlay"),
                );
                ui.separator();
                if ui.button(format!("Reset Camera  {}", shortcut(Action::ResetCamera))).clicked() {
                    editor.reset_camera();
                    ui.close();
                }
            });
        });
    });

    // Status bar
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let tools = editor.tools();
            ui.label(format!("{}  size {}", tools.tool.label(), tools.brush.get()));
            ui.separator();
            ui.label(format!("Paint: {}", tools.paint_ref));
            ui.separator();
            if let Some((x, y)) = editor.hover()
                && editor.grid().contains(x, y)
            {
                ui.label(format!("Cell: ({x}, {y})"));
                ui.separator();
            }
            ui.label(format!("Zoom: {:.0}%", editor.camera.zoom() * 100.0));
            ui.separator();
            ui.label(format!(
                "Undo: {}  Redo: {}",
                editor.history().undo_depth(),
                editor.history().redo_depth()
            ));
            if let Some((msg, is_error)) = &state.status {
                ui.separator();
                if *is_error {
                    ui.colored_label(egui::Color32::from_rgb(255, 120, 100), msg);
                } else {
                    ui.label(msg);
                }
            }
        });
    });

    tools_panel::draw_tools_panel(ctx, editor);
    tile_picker::draw_tile_picker(ctx, editor, assets, &mut state.tile_picker);

    if let Some(dialog) = &mut state.size_dialog {
        let max = (editor.settings().grid.max_width, editor.settings().grid.max_height);
        let title = match dialog.kind {
            SizeDialogKind::NewMap => "New Map",
            SizeDialogKind::Resize => "Resize Map",
        };
        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Grid::new("size_dialog_grid").show(ui, |ui| {
                    ui.label("Width:");
                    ui.add(egui::DragValue::new(&mut dialog.width).range(1..=max.0));
                    ui.end_row();
                    ui.label("Height:");
                    ui.add(egui::DragValue::new(&mut dialog.height).range(1..=max.1));
                    ui.end_row();
                });
                if editor.history().dirty && dialog.kind == SizeDialogKind::NewMap {
                    ui.small("Unsaved changes will be lost.");
                }
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() { confirmed = true; }
                    if ui.button("Cancel").clicked() { cancelled = true; }
                });
            });
        if confirmed {
            match dialog.kind {
                SizeDialogKind::NewMap => {
                    action = UiAction::NewMap { width: dialog.width, height: dialog.height };
                }
                SizeDialogKind::Resize => editor.resize_map(dialog.width, dialog.height),
            }
        }
        if confirmed || cancelled {
            state.size_dialog = None;
        }
    }

    let stats = map_view::draw_map_view(ctx, editor, assets, renderer, &mut state.map_view, &mut state.tile_picker);

    (action, stats)
}
