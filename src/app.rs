use std::path::{Path, PathBuf};
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes, WindowId};

use wardmap::Editor;
use wardmap::keybindings::{Action, Keybindings};
use wardmap::map::{self, MapRecord, SourceRecord};
use wardmap::render::Renderer;
use wardmap::settings::Settings;
use wardmap::tile::loader::{self, DecodedSheet};
use wardmap::tile::{AssetRegistry, TileSource};

use crate::gpu::Gpu;
use crate::input::InputState;
use crate::ui::{SizeDialog, SizeDialogKind, UiAction, UiState};

const APP_NAME: &str = "wardmap";

/// Tile sheet picked in the file dialog, awaiting tile-size confirmation.
struct PendingSheet {
    path: PathBuf,
    tile_size: u32,
}

/// Top-level application state.
pub struct App {
    gpu: Option<GpuState>,
    editor: Editor,
    assets: AssetRegistry<egui::TextureHandle>,
    renderer: Renderer,
    input: InputState,
    keybindings: Keybindings,
    ui: UiState,
    bg_color: [u8; 4],
    /// Where the current map was last loaded from or saved to.
    map_path: Option<PathBuf>,
    recent_files: Vec<PathBuf>,
    pending_sheet: Option<PendingSheet>,
    quit_requested: bool,
}

/// Everything that requires the window to exist.
struct GpuState {
    window: Arc<Window>,
    gpu: Gpu,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl App {
    pub fn new() -> Self {
        let settings = Settings::load();
        Self {
            gpu: None,
            renderer: Renderer::new(&settings.display),
            bg_color: settings.display.bg_color,
            editor: Editor::new(settings),
            assets: AssetRegistry::new(),
            input: InputState::new(),
            keybindings: Keybindings::load(),
            ui: UiState::new(),
            map_path: None,
            recent_files: map::load_recent_files(),
            pending_sheet: None,
            quit_requested: false,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(APP_NAME)
            .with_inner_size(winit::dpi::LogicalSize::new(1280u32, 800u32));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let gpu = pollster::block_on(Gpu::new(window.clone()));

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx,
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, gpu.surface_format, None, 1, false);
        window.request_redraw();

        self.gpu = Some(GpuState {
            window,
            gpu,
            egui_state,
            egui_renderer,
        });
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.gpu else { return };

        // Let egui process the event first
        let egui_response = state.egui_state.on_window_event(&state.window, &event);

        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
                return;
            }
            WindowEvent::Resized(new_size) => {
                state.gpu.resize(new_size.width, new_size.height);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
                if self.quit_requested {
                    event_loop.exit();
                }
                return;
            }
            _ => {}
        }

        if !egui_response.consumed {
            self.input.handle_event(&event);
        }
        if egui_response.repaint || !self.input.keys_just_pressed.is_empty() {
            state.window.request_redraw();
        }
    }
}

impl App {
    fn egui_ctx(&self) -> Option<egui::Context> {
        self.gpu.as_ref().map(|state| state.egui_state.egui_ctx().clone())
    }

    /// Keyboard shortcuts gathered since the last frame.
    fn process_input(&mut self) {
        let actions = self.input.triggered_actions(&self.keybindings);
        self.input.begin_frame();
        for action in actions {
            if !self.editor.apply_action(action) {
                self.run_host_action(action);
            }
        }
    }

    fn run_host_action(&mut self, action: Action) {
        match action {
            Action::NewMap => self.open_new_map_dialog(),
            Action::OpenMap => self.open_map_dialog(),
            Action::SaveMap => self.save_map(false),
            Action::LoadTileSource => self.pick_tile_sheet(),
            other => log::debug!("unhandled host action {other:?}"),
        }
    }

    fn redraw(&mut self) {
        self.process_input();
        let Some(egui_ctx) = self.egui_ctx() else { return };
        let Some(state) = &mut self.gpu else { return };
        let raw_input = state.egui_state.take_egui_input(&state.window);

        let mut action = UiAction::None;
        let mut sheet_confirmed = false;
        let full_output = egui_ctx.run(raw_input, |ctx| {
            let (ui_action, _stats) = crate::ui::draw_ui(
                ctx,
                &mut self.editor,
                &self.assets,
                &self.renderer,
                &self.keybindings,
                &mut self.ui,
                &self.recent_files,
            );
            action = ui_action;

            // Tile size dialog
            let mut cancelled = false;
            if let Some(pending) = &mut self.pending_sheet {
                egui::Window::new("Tile Size")
                    .collapsible(false)
                    .resizable(false)
                    .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                    .show(ctx, |ui| {
                        ui.label(pending.path.display().to_string());
                        ui.horizontal(|ui| {
                            ui.label("Tile size:");
                            ui.add(egui::DragValue::new(&mut pending.tile_size).range(1..=512));
                        });
                        ui.add_space(4.0);
                        ui.horizontal(|ui| {
                            if ui.button("Load").clicked() { sheet_confirmed = true; }
                            if ui.button("Cancel").clicked() { cancelled = true; }
                        });
                    });
            }
            if cancelled {
                self.pending_sheet = None;
            }
        });

        self.handle_ui_action(action);
        if sheet_confirmed && let Some(pending) = self.pending_sheet.take() {
            self.load_tile_sheet(&egui_ctx, &pending.path, pending.tile_size);
        }
        self.decode_next_pending(&egui_ctx);
        for notice in self.editor.take_notices() {
            self.ui.status = Some((notice.to_string(), notice.is_error()));
        }

        let Some(state) = &mut self.gpu else { return };
        state
            .egui_state
            .handle_platform_output(&state.window, full_output.platform_output);

        let title = match (&self.map_path, self.editor.history().dirty) {
            (Some(path), dirty) => format!(
                "{APP_NAME} - {}{}",
                path.display(),
                if dirty { " *" } else { "" }
            ),
            (None, true) => format!("{APP_NAME} - {} *", self.editor.meta.name),
            (None, false) => format!("{APP_NAME} - {}", self.editor.meta.name),
        };
        state.window.set_title(&title);

        let output = match state.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = state.window.inner_size();
                state.gpu.resize(size.width, size.height);
                state.window.request_redraw();
                return;
            }
            Err(e) => {
                log::error!("surface error: {e}");
                return;
            }
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [state.gpu.config.width, state.gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, delta) in &full_output.textures_delta.set {
            state
                .egui_renderer
                .update_texture(&state.gpu.device, &state.gpu.queue, *id, delta);
        }

        let mut encoder = state
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("egui_encoder") });
        state.egui_renderer.update_buffers(
            &state.gpu.device,
            &state.gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let [r, g, b, _] = self.bg_color.map(|c| c as f64 / 255.0);
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a: 1.0 }),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            state.egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        state.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        for id in &full_output.textures_delta.free {
            state.egui_renderer.free_texture(id);
        }

        let repaint_now = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .is_some_and(|v| v.repaint_delay.is_zero());
        if repaint_now || self.assets.next_pending().is_some() {
            state.window.request_redraw();
        }
    }

    fn handle_ui_action(&mut self, action: UiAction) {
        match action {
            UiAction::None => {}
            UiAction::NewMap { width, height } => {
                self.editor.new_map(width, height);
                self.map_path = None;
            }
            UiAction::OpenMap => self.open_map_dialog(),
            UiAction::OpenRecent(path) => self.open_map(path),
            UiAction::SaveMap => self.save_map(false),
            UiAction::SaveMapAs => self.save_map(true),
            UiAction::LoadTileSheet => self.pick_tile_sheet(),
            UiAction::Quit => self.quit_requested = true,
        }
    }

    fn open_new_map_dialog(&mut self) {
        let grid = &self.editor.settings().grid;
        self.ui.size_dialog = Some(SizeDialog {
            kind: SizeDialogKind::NewMap,
            width: grid.default_width,
            height: grid.default_height,
        });
    }

    fn open_map_dialog(&mut self) {
        let file = rfd::FileDialog::new()
            .add_filter("Ward map", &["wmap", "json"])
            .set_title("Open Map")
            .pick_file();
        if let Some(path) = file {
            self.open_map(path);
        }
    }

    fn open_map(&mut self, path: PathBuf) {
        let record = match map::load(&path) {
            Ok(record) => record,
            Err(e) => {
                log::error!("Failed to open {}: {e}", path.display());
                self.ui.status = Some((format!("Failed to open: {e}"), true));
                return;
            }
        };
        if !self.editor.load_record(&record) {
            return;
        }
        self.reserve_sources(&record, &path);
        map::push_recent(&mut self.recent_files, path.clone());
        map::save_recent_files(&self.recent_files);
        self.ui.status = Some((format!("Opened {}", path.display()), false));
        self.map_path = Some(path);
    }

    /// Queue every referenced sheet the map records a path for, unless the
    /// registry already holds that same file under the id.
    fn reserve_sources(&mut self, record: &MapRecord, map_path: &Path) {
        for id in record.referenced_sources() {
            if let Some(source) = record.sources.iter().find(|s| s.id == id) {
                self.assets.require(id, resolve_sheet_path(map_path, &source.path));
            }
        }
    }

    fn save_map(&mut self, ask_path: bool) {
        let path = match (&self.map_path, ask_path) {
            (Some(path), false) => path.clone(),
            _ => {
                let file = rfd::FileDialog::new()
                    .add_filter("Ward map", &["wmap"])
                    .add_filter("JSON", &["json"])
                    .set_file_name(format!("{}.wmap", self.editor.meta.name))
                    .set_title("Save Map")
                    .save_file();
                let Some(path) = file else { return };
                path
            }
        };

        let mut record = self.editor.to_record();
        record.updated_at = map::now_secs();
        match map::save(&record, &path) {
            Ok(()) => {
                log::info!("Saved map to {}", path.display());
                self.editor.mark_saved();
                map::push_recent(&mut self.recent_files, path.clone());
                map::save_recent_files(&self.recent_files);
                self.ui.status = Some((format!("Saved {}", path.display()), false));
                self.map_path = Some(path);
            }
            Err(e) => {
                log::error!("Failed to save: {e}");
                self.ui.status = Some((format!("Failed to save: {e}"), true));
            }
        }
    }

    fn pick_tile_sheet(&mut self) {
        let file = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg"])
            .set_title("Load Tile Sheet")
            .pick_file();
        if let Some(path) = file {
            self.pending_sheet = Some(PendingSheet {
                path,
                tile_size: self.editor.settings().camera.tile_size,
            });
        }
    }

    /// Decode a sheet chosen by the user and register it under a fresh id.
    fn load_tile_sheet(&mut self, ctx: &egui::Context, path: &Path, tile_size: u32) {
        let sheet = match loader::decode_sheet(path, tile_size) {
            Ok(sheet) => sheet,
            Err(e) => {
                log::error!("Failed to load tile sheet {}: {e}", path.display());
                self.ui.status = Some((e, true));
                return;
            }
        };
        let id = self.assets.next_free_id();
        self.assets.insert_from_file(id, upload_sheet(ctx, sheet), path.to_path_buf());
        self.editor.meta.sources.retain(|s| s.id != id);
        self.editor.meta.sources.push(SourceRecord {
            id,
            path: path.to_string_lossy().into_owned(),
            tile_size,
        });
        self.ui.tile_picker.source = Some(id);
    }

    /// Decode at most one reserved source per frame.
    fn decode_next_pending(&mut self, ctx: &egui::Context) {
        let Some((id, path)) = self.assets.next_pending() else { return };
        let Some(path) = path else {
            self.assets.remove(id);
            return;
        };
        let tile_size = self
            .editor
            .meta
            .sources
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.tile_size)
            .unwrap_or(self.editor.settings().camera.tile_size);
        match loader::decode_sheet(&path, tile_size) {
            Ok(sheet) => self.assets.insert(id, upload_sheet(ctx, sheet)),
            Err(e) => {
                log::warn!("tile source {id} ({}): {e}", path.display());
                self.assets.remove(id);
                self.ui.status = Some((format!("Tile source {id}: {e}"), true));
            }
        }
    }
}

fn upload_sheet(ctx: &egui::Context, sheet: DecodedSheet) -> TileSource<egui::TextureHandle> {
    let image = egui::ColorImage::from_rgba_unmultiplied(
        [sheet.width as usize, sheet.height as usize],
        &sheet.pixels,
    );
    let handle = ctx.load_texture(&sheet.name, image, egui::TextureOptions::NEAREST);
    TileSource {
        name: sheet.name,
        image: handle,
        image_width: sheet.width,
        image_height: sheet.height,
        tile_size: sheet.tile_size,
        colors: sheet.colors,
    }
}

/// Relative sheet paths are stored relative to the map file.
fn resolve_sheet_path(map_path: &Path, sheet: &str) -> PathBuf {
    let sheet = Path::new(sheet);
    if sheet.is_absolute() {
        return sheet.to_path_buf();
    }
    map_path
        .parent()
        .map(|dir| dir.join(sheet))
        .unwrap_or_else(|| sheet.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_sheet_path() {
        let map = Path::new("/maps/ward/level1.wmap");
        assert_eq!(
            resolve_sheet_path(map, "tiles/floor.png"),
            PathBuf::from("/maps/ward/tiles/floor.png")
        );
        assert_eq!(
            resolve_sheet_path(map, "/abs/floor.png"),
            PathBuf::from("/abs/floor.png")
        );
    }
}
