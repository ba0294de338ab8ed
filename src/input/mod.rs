use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use wardmap::keybindings::{Action, Keybindings, Modifiers};

/// Keyboard state between frames. Pointer input reaches the editor through
/// egui instead, since the map view is an egui widget.
#[derive(Default)]
pub struct InputState {
    pub keys_held: HashSet<KeyCode>,
    /// Keys pressed since the last `begin_frame`, in press order.
    pub keys_just_pressed: Vec<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to clear per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_just_pressed.clear();
    }

    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if event.state == ElementState::Pressed {
                        if self.keys_held.insert(key) {
                            self.keys_just_pressed.push(key);
                        }
                    } else {
                        self.keys_held.remove(&key);
                    }
                }
            }
            // Key-up events are lost while unfocused.
            WindowEvent::Focused(false) => self.keys_held.clear(),
            _ => {}
        }
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers {
            ctrl: self.key_held(KeyCode::ControlLeft)
                || self.key_held(KeyCode::ControlRight)
                || self.key_held(KeyCode::SuperLeft)
                || self.key_held(KeyCode::SuperRight),
            shift: self.key_held(KeyCode::ShiftLeft) || self.key_held(KeyCode::ShiftRight),
            alt: self.key_held(KeyCode::AltLeft) || self.key_held(KeyCode::AltRight),
        }
    }

    /// Actions triggered by this frame's key presses.
    pub fn triggered_actions(&self, keybindings: &Keybindings) -> Vec<Action> {
        let modifiers = self.modifiers();
        self.keys_just_pressed
            .iter()
            .filter_map(|&key| keybindings.action_for(key, modifiers))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_and_actions() {
        let mut input = InputState::new();
        input.keys_held.insert(KeyCode::ControlLeft);
        input.keys_held.insert(KeyCode::KeyZ);
        input.keys_just_pressed.push(KeyCode::KeyZ);
        assert_eq!(input.modifiers(), Modifiers::CTRL);
        assert_eq!(
            input.triggered_actions(&Keybindings::defaults()),
            vec![Action::Undo]
        );
        input.begin_frame();
        assert!(input.triggered_actions(&Keybindings::defaults()).is_empty());
    }
}
