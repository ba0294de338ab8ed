use wardmap::Editor;
use wardmap::tools::{ActiveTarget, Tool};

/// Draw the tools panel (left side): tool, brush, target layer and layer
/// visibility.
pub fn draw_tools_panel(ctx: &egui::Context, editor: &mut Editor) {
    egui::SidePanel::left("tools_panel").default_width(180.0).show(ctx, |ui| {
        ui.heading("Tools");
        let keys = ["B", "E", "F", "I"];
        for (tool, key) in Tool::ALL.into_iter().zip(keys) {
            let selected = editor.tools().tool == tool;
            if ui.selectable_label(selected, format!("[{key}] {}", tool.label())).clicked() {
                editor.select_tool(tool);
            }
        }
        ui.separator();

        ui.heading("Brush");
        let mut size = editor.tools().brush.get();
        let max = editor.settings().paint.max_brush;
        if ui
            .add(egui::Slider::new(&mut size, 1..=max).step_by(2.0).text("size"))
            .changed()
        {
            editor.set_brush_size(size);
        }
        ui.small("[ / ]: change size");
        ui.separator();

        ui.heading("Paint Into");
        let target = editor.tools().target;
        let layers: Vec<(usize, String)> = editor
            .grid()
            .layers()
            .iter()
            .enumerate()
            .map(|(i, l)| (i, l.name.clone()))
            .collect();
        for (index, name) in &layers {
            ui.horizontal(|ui| {
                let mut visible = !editor.view.hidden_layers.contains(index);
                if ui.checkbox(&mut visible, "").on_hover_text("Visible").changed() {
                    editor.view.toggle_layer(*index);
                }
                let active = target == ActiveTarget::Layer(*index);
                if ui.selectable_label(active, name).clicked() {
                    editor.set_active_target(ActiveTarget::Layer(*index));
                }
            });
        }
        if editor.grid().has_collision() {
            ui.horizontal(|ui| {
                ui.checkbox(&mut editor.view.show_collision, "").on_hover_text("Show overlay");
                let active = target == ActiveTarget::Collision;
                if ui.selectable_label(active, "collision").clicked() {
                    editor.set_active_target(ActiveTarget::Collision);
                    editor.view.show_collision = true;
                }
            });
        }
        ui.separator();

        ui.heading("Map");
        let grid = editor.grid();
        ui.label(format!("{}  ({}x{})", editor.meta.name, grid.width(), grid.height()));
        ui.separator();
        ui.small("Left drag: use tool");
        ui.small("Right drag / Space+drag: pan");
        ui.small("Ctrl+wheel: zoom");
        ui.small("Wheel: cycle paint tile");
    });
}
