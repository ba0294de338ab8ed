use std::collections::HashMap;
use std::path::Path;

use winit::keyboard::KeyCode;

/// Modifier keys for a keybinding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { ctrl: false, shift: false, alt: false };
    pub const CTRL: Self = Self { ctrl: true, shift: false, alt: false };
    pub const CTRL_SHIFT: Self = Self { ctrl: true, shift: true, alt: false };
}

impl std::fmt::Display for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ctrl { write!(f, "Ctrl+")?; }
        if self.shift { write!(f, "Shift+")?; }
        if self.alt { write!(f, "Alt+")?; }
        Ok(())
    }
}

/// A key combination: modifiers + key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct KeyCombo {
    pub modifiers: Modifiers,
    #[serde(with = "keycode_serde")]
    pub key: KeyCode,
}

impl KeyCombo {
    pub const fn new(modifiers: Modifiers, key: KeyCode) -> Self {
        Self { modifiers, key }
    }
}

mod keycode_serde {
    use super::*;
    use serde::{Serializer, Deserializer, Deserialize};

    pub fn serialize<S: Serializer>(key: &KeyCode, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(key_name(*key))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<KeyCode, D::Error> {
        let name = String::deserialize(d)?;
        key_from_name(&name).ok_or_else(|| serde::de::Error::custom(format!("unknown key: {name}")))
    }
}

impl std::fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.modifiers, key_name(self.key))
    }
}

/// All bindable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Action {
    Undo,
    Redo,
    NewMap,
    OpenMap,
    SaveMap,
    LoadTileSource,
    ToolBrush,
    ToolEraser,
    ToolFill,
    ToolPicker,
    BrushGrow,
    BrushShrink,
    TargetFloor,
    TargetObjects,
    TargetCollision,
    ToggleGrid,
    ToggleMinimap,
    ToggleCollision,
    ZoomIn,
    ZoomOut,
    ResetCamera,
}

/// All actions with their display names, for the editor UI.
pub const ALL_ACTIONS: &[(Action, &str)] = &[
    (Action::Undo, "Undo"),
    (Action::Redo, "Redo"),
    (Action::NewMap, "New Map"),
    (Action::OpenMap, "Open Map"),
    (Action::SaveMap, "Save Map"),
    (Action::LoadTileSource, "Load Tile Sheet"),
    (Action::ToolBrush, "Tool: Brush"),
    (Action::ToolEraser, "Tool: Eraser"),
    (Action::ToolFill, "Tool: Fill"),
    (Action::ToolPicker, "Tool: Picker"),
    (Action::BrushGrow, "Brush Size Increase"),
    (Action::BrushShrink, "Brush Size Decrease"),
    (Action::TargetFloor, "Target: Floor"),
    (Action::TargetObjects, "Target: Objects"),
    (Action::TargetCollision, "Target: Collision"),
    (Action::ToggleGrid, "Toggle Grid Lines"),
    (Action::ToggleMinimap, "Toggle Minimap"),
    (Action::ToggleCollision, "Toggle Collision Overlay"),
    (Action::ZoomIn, "Zoom In"),
    (Action::ZoomOut, "Zoom Out"),
    (Action::ResetCamera, "Reset Camera"),
];

/// Keybinding configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Keybindings {
    pub bindings: HashMap<Action, KeyCombo>,
}

impl Keybindings {
    pub fn defaults() -> Self {
        let none = Modifiers::NONE;
        let ctrl = Modifiers::CTRL;
        let b = HashMap::from([
            (Action::Undo, KeyCombo::new(ctrl, KeyCode::KeyZ)),
            (Action::Redo, KeyCombo::new(ctrl, KeyCode::KeyY)),
            (Action::NewMap, KeyCombo::new(ctrl, KeyCode::KeyN)),
            (Action::OpenMap, KeyCombo::new(ctrl, KeyCode::KeyO)),
            (Action::SaveMap, KeyCombo::new(ctrl, KeyCode::KeyS)),
            (Action::LoadTileSource, KeyCombo::new(Modifiers::CTRL_SHIFT, KeyCode::KeyT)),
            (Action::ToolBrush, KeyCombo::new(none, KeyCode::KeyB)),
            (Action::ToolEraser, KeyCombo::new(none, KeyCode::KeyE)),
            (Action::ToolFill, KeyCombo::new(none, KeyCode::KeyF)),
            (Action::ToolPicker, KeyCombo::new(none, KeyCode::KeyI)),
            (Action::BrushGrow, KeyCombo::new(none, KeyCode::BracketRight)),
            (Action::BrushShrink, KeyCombo::new(none, KeyCode::BracketLeft)),
            (Action::TargetFloor, KeyCombo::new(none, KeyCode::Digit1)),
            (Action::TargetObjects, KeyCombo::new(none, KeyCode::Digit2)),
            (Action::TargetCollision, KeyCombo::new(none, KeyCode::Digit3)),
            (Action::ToggleGrid, KeyCombo::new(none, KeyCode::KeyG)),
            (Action::ToggleMinimap, KeyCombo::new(none, KeyCode::KeyM)),
            (Action::ToggleCollision, KeyCombo::new(none, KeyCode::KeyC)),
            (Action::ZoomIn, KeyCombo::new(none, KeyCode::Equal)),
            (Action::ZoomOut, KeyCombo::new(none, KeyCode::Minus)),
            (Action::ResetCamera, KeyCombo::new(none, KeyCode::Home)),
        ]);
        Self { bindings: b }
    }

    /// The action bound to a key press with the given modifiers, if any.
    pub fn action_for(&self, key: KeyCode, modifiers: Modifiers) -> Option<Action> {
        ALL_ACTIONS
            .iter()
            .map(|(action, _)| *action)
            .find(|action| self.bindings.get(action) == Some(&KeyCombo { modifiers, key }))
    }

    /// Get the display string for an action's keybinding.
    pub fn display(&self, action: Action) -> String {
        self.bindings.get(&action).map_or_else(
            || "Unbound".to_string(),
            |c| c.to_string(),
        )
    }

    /// Load keybindings from the config file. Falls back to defaults on
    /// error; actions missing from the file keep their default binding.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let mut keybindings = Self::defaults();
        if path.exists()
            && let Ok(data) = std::fs::read_to_string(path)
        {
            match serde_json::from_str::<HashMap<Action, KeyCombo>>(&data) {
                Ok(bindings) => keybindings.bindings.extend(bindings),
                Err(e) => log::warn!("ignoring {}: {e}", path.display()),
            }
        }
        keybindings
    }

    /// Save keybindings to the config file.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(data) = serde_json::to_string_pretty(&self.bindings)
            && let Err(e) = std::fs::write(path, data)
        {
            log::warn!("could not write {}: {e}", path.display());
        }
    }
}

fn config_path() -> std::path::PathBuf {
    crate::settings::config_dir().join("keybindings.json")
}

/// Display name for a key code.
fn key_name(key: KeyCode) -> &'static str {
    match key {
        KeyCode::KeyA => "A",
        KeyCode::KeyB => "B",
        KeyCode::KeyC => "C",
        KeyCode::KeyD => "D",
        KeyCode::KeyE => "E",
        KeyCode::KeyF => "F",
        KeyCode::KeyG => "G",
        KeyCode::KeyH => "H",
        KeyCode::KeyI => "I",
        KeyCode::KeyJ => "J",
        KeyCode::KeyK => "K",
        KeyCode::KeyL => "L",
        KeyCode::KeyM => "M",
        KeyCode::KeyN => "N",
        KeyCode::KeyO => "O",
        KeyCode::KeyP => "P",
        KeyCode::KeyQ => "Q",
        KeyCode::KeyR => "R",
        KeyCode::KeyS => "S",
        KeyCode::KeyT => "T",
        KeyCode::KeyU => "U",
        KeyCode::KeyV => "V",
        KeyCode::KeyW => "W",
        KeyCode::KeyX => "X",
        KeyCode::KeyY => "Y",
        KeyCode::KeyZ => "Z",
        KeyCode::Digit0 => "0",
        KeyCode::Digit1 => "1",
        KeyCode::Digit2 => "2",
        KeyCode::Digit3 => "3",
        KeyCode::Digit4 => "4",
        KeyCode::Digit5 => "5",
        KeyCode::Digit6 => "6",
        KeyCode::Digit7 => "7",
        KeyCode::Digit8 => "8",
        KeyCode::Digit9 => "9",
        KeyCode::F1 => "F1",
        KeyCode::F2 => "F2",
        KeyCode::F3 => "F3",
        KeyCode::F4 => "F4",
        KeyCode::F5 => "F5",
        KeyCode::F6 => "F6",
        KeyCode::F7 => "F7",
        KeyCode::F8 => "F8",
        KeyCode::F9 => "F9",
        KeyCode::F10 => "F10",
        KeyCode::F11 => "F11",
        KeyCode::F12 => "F12",
        KeyCode::Tab => "Tab",
        KeyCode::Delete => "Delete",
        KeyCode::Backspace => "Backspace",
        KeyCode::Enter => "Enter",
        KeyCode::Escape => "Escape",
        KeyCode::Space => "Space",
        KeyCode::BracketLeft => "[",
        KeyCode::BracketRight => "]",
        KeyCode::Minus => "-",
        KeyCode::Equal => "=",
        KeyCode::Home => "Home",
        _ => "?",
    }
}

/// Reverse lookup: display name → KeyCode.
fn key_from_name(name: &str) -> Option<KeyCode> {
    match name {
        "A" => Some(KeyCode::KeyA),
        "B" => Some(KeyCode::KeyB),
        "C" => Some(KeyCode::KeyC),
        "D" => Some(KeyCode::KeyD),
        "E" => Some(KeyCode::KeyE),
        "F" => Some(KeyCode::KeyF),
        "G" => Some(KeyCode::KeyG),
        "H" => Some(KeyCode::KeyH),
        "I" => Some(KeyCode::KeyI),
        "J" => Some(KeyCode::KeyJ),
        "K" => Some(KeyCode::KeyK),
        "L" => Some(KeyCode::KeyL),
        "M" => Some(KeyCode::KeyM),
        "N" => Some(KeyCode::KeyN),
        "O" => Some(KeyCode::KeyO),
        "P" => Some(KeyCode::KeyP),
        "Q" => Some(KeyCode::KeyQ),
        "R" => Some(KeyCode::KeyR),
        "S" => Some(KeyCode::KeyS),
        "T" => Some(KeyCode::KeyT),
        "U" => Some(KeyCode::KeyU),
        "V" => Some(KeyCode::KeyV),
        "W" => Some(KeyCode::KeyW),
        "X" => Some(KeyCode::KeyX),
        "Y" => Some(KeyCode::KeyY),
        "Z" => Some(KeyCode::KeyZ),
        "0" => Some(KeyCode::Digit0),
        "1" => Some(KeyCode::Digit1),
        "2" => Some(KeyCode::Digit2),
        "3" => Some(KeyCode::Digit3),
        "4" => Some(KeyCode::Digit4),
        "5" => Some(KeyCode::Digit5),
        "6" => Some(KeyCode::Digit6),
        "7" => Some(KeyCode::Digit7),
        "8" => Some(KeyCode::Digit8),
        "9" => Some(KeyCode::Digit9),
        "F1" => Some(KeyCode::F1),
        "F2" => Some(KeyCode::F2),
        "F3" => Some(KeyCode::F3),
        "F4" => Some(KeyCode::F4),
        "F5" => Some(KeyCode::F5),
        "F6" => Some(KeyCode::F6),
        "F7" => Some(KeyCode::F7),
        "F8" => Some(KeyCode::F8),
        "F9" => Some(KeyCode::F9),
        "F10" => Some(KeyCode::F10),
        "F11" => Some(KeyCode::F11),
        "F12" => Some(KeyCode::F12),
        "Tab" => Some(KeyCode::Tab),
        "Delete" => Some(KeyCode::Delete),
        "Backspace" => Some(KeyCode::Backspace),
        "Enter" => Some(KeyCode::Enter),
        "Escape" => Some(KeyCode::Escape),
        "Space" => Some(KeyCode::Space),
        "[" => Some(KeyCode::BracketLeft),
        "]" => Some(KeyCode::BracketRight),
        "-" => Some(KeyCode::Minus),
        "=" => Some(KeyCode::Equal),
        "Home" => Some(KeyCode::Home),
        _ => None,
    }
}
