use glam::Vec2;

use wardmap::Editor;
use wardmap::gesture::{PointerButton, PointerModifiers};
use wardmap::grid::{FLOOR_LAYER, TileRef};
use wardmap::map::{self, MapRecord};
use wardmap::settings::Settings;

const FLOOR: TileRef = TileRef::new(0, 1, 33);
const PAINT: TileRef = TileRef::new(1, 0, 0);

fn editor(w: u32, h: u32) -> Editor {
    let mut settings = Settings::default();
    settings.grid.default_floor = FLOOR;
    settings.grid.default_width = w;
    settings.grid.default_height = h;
    let mut editor = Editor::new(settings);
    editor.set_viewport(800.0, 600.0);
    editor
}

fn tile_center(editor: &Editor, x: i32, y: i32) -> Vec2 {
    let (min, max) = editor.camera.tile_screen_rect(x, y);
    (min + max) * 0.5
}

#[test]
fn paint_commit_undo_redo() {
    let mut ed = editor(10, 10);
    let baseline = ed.grid().clone();
    for y in 0..10 {
        for x in 0..10 {
            assert_eq!(baseline.get(FLOOR_LAYER, x, y), FLOOR);
        }
    }

    ed.set_paint_ref(PAINT);
    ed.set_brush_size(1);
    let pos = tile_center(&ed, 5, 5);
    ed.pointer_down(PointerButton::Primary, pos, PointerModifiers::NONE);
    ed.pointer_up(PointerButton::Primary);

    let painted = ed.grid().clone();
    assert_eq!(painted.cells_differing(&baseline), 1);
    assert_eq!(painted.get(FLOOR_LAYER, 5, 5), PAINT);

    assert!(ed.undo());
    assert_eq!(*ed.grid(), baseline);
    assert!(ed.redo());
    assert_eq!(*ed.grid(), painted);
}

#[test]
fn saved_map_reloads_into_a_fresh_editor() {
    let mut ed = editor(6, 4);
    ed.set_paint_ref(PAINT);
    let pos = tile_center(&ed, 2, 1);
    ed.pointer_down(PointerButton::Primary, pos, PointerModifiers::NONE);
    ed.pointer_up(PointerButton::Primary);
    ed.meta.name = "Ward A".to_string();

    let record = ed.to_record();
    let bytes = map::encode_binary(&record).expect("encode");
    let decoded: MapRecord = map::decode_binary(&bytes).expect("decode");

    let mut other = editor(3, 3);
    assert!(other.load_record(&decoded));
    assert_eq!(other.grid(), ed.grid());
    assert_eq!(other.meta.name, "Ward A");
    assert!(!other.history().can_undo());
    assert!(!other.history().dirty);
}
