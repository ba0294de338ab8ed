use glam::Vec2;

use wardmap::Editor;
use wardmap::gesture::{PointerButton, PointerModifiers, WheelOutcome};
use wardmap::render::{EguiCanvas, FrameStats, Renderer};
use wardmap::tile::AssetRegistry;

use super::TilePickerState;

/// Pointer bookkeeping for the map view between frames.
#[derive(Default)]
pub struct MapViewState {
    was_inside: bool,
}

/// Central panel: feeds pointer input to the editor, then draws the map.
pub fn draw_map_view(
    ctx: &egui::Context,
    editor: &mut Editor,
    assets: &AssetRegistry<egui::TextureHandle>,
    renderer: &Renderer,
    state: &mut MapViewState,
    picker: &mut TilePickerState,
) -> FrameStats {
    let mut stats = FrameStats::default();
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE)
        .show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            editor.set_viewport(rect.width(), rect.height());

            handle_pointer(ui, &response, editor, assets, state, picker);

            let mut canvas = EguiCanvas::new(&painter, rect.min);
            stats = renderer.render(&mut canvas, editor.grid(), &editor.camera, assets, &editor.overlay());
            editor.report_missing_sources(&stats.missing_sources);
        });
    stats
}

fn handle_pointer(
    ui: &egui::Ui,
    response: &egui::Response,
    editor: &mut Editor,
    assets: &AssetRegistry<egui::TextureHandle>,
    state: &mut MapViewState,
    picker: &mut TilePickerState,
) {
    let rect = response.rect;
    let (pos, pressed, released, scroll, zoom_delta, modifiers, space) = ui.input(|i| {
        let buttons = [
            egui::PointerButton::Primary,
            egui::PointerButton::Secondary,
            egui::PointerButton::Middle,
        ];
        (
            i.pointer.latest_pos(),
            buttons.map(|b| i.pointer.button_pressed(b)),
            buttons.map(|b| i.pointer.button_released(b)),
            i.raw_scroll_delta.y,
            i.zoom_delta(),
            i.modifiers,
            i.key_down(egui::Key::Space),
        )
    });
    let mods = PointerModifiers {
        pan: space,
        zoom: modifiers.command,
    };
    let inside = response.contains_pointer();
    let local = pos.map(|p| Vec2::new(p.x - rect.min.x, p.y - rect.min.y));

    if inside && let Some(local) = local {
        editor.pointer_move(local);
        if pressed[0] {
            editor.pointer_down(PointerButton::Primary, local, mods);
        }
        if pressed[1] || pressed[2] {
            editor.pointer_down(PointerButton::Secondary, local, mods);
        }

        // egui turns Ctrl+wheel into a zoom delta.
        let wheel = if zoom_delta != 1.0 {
            Some(((zoom_delta - 1.0).signum(), PointerModifiers { zoom: true, ..mods }))
        } else if scroll != 0.0 {
            Some((scroll.signum(), mods))
        } else {
            None
        };
        if let Some((delta, wheel_mods)) = wheel
            && let WheelOutcome::Scroll(d) = editor.wheel(delta, wheel_mods, local)
        {
            picker.cycle(editor, assets, if d > 0.0 { -1 } else { 1 });
        }
    }

    if released[0] {
        editor.pointer_up(PointerButton::Primary);
    }
    if released[1] || released[2] {
        editor.pointer_up(PointerButton::Secondary);
    }
    if state.was_inside && !inside {
        editor.pointer_leave();
    }
    state.was_inside = inside;
}
