use serde::{Deserialize, Serialize};

use crate::grid::TileRef;

/// All user-configurable settings, persisted to JSON.
#[derive(Default, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub camera: CameraSettings,
    pub grid: GridSettings,
    pub history: HistorySettings,
    pub paint: PaintSettings,
    pub display: DisplaySettings,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CameraSettings {
    /// Tile edge in world pixels at zoom 1.
    pub tile_size: u32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    /// Zoom multiplier per wheel notch.
    pub zoom_step: f32,
    /// How far (screen pixels) the viewport may travel past the grid edge.
    pub pan_margin: f32,
    /// Tiles drawn beyond each visible edge.
    pub cull_margin: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            tile_size: 32,
            zoom_min: 0.25,
            zoom_max: 4.0,
            zoom_step: 1.1,
            pan_margin: 64.0,
            cull_margin: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GridSettings {
    pub default_width: u32,
    pub default_height: u32,
    /// Largest grid a map may have; bounds flood-fill latency.
    pub max_width: u32,
    pub max_height: u32,
    pub default_floor: TileRef,
    /// Attach a collision layer to new maps.
    pub collision: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            default_width: 40,
            default_height: 30,
            max_width: 256,
            max_height: 256,
            default_floor: TileRef::new(0, 1, 33),
            collision: true,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct HistorySettings {
    pub undo_limit: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { undo_limit: 100 }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PaintSettings {
    pub max_brush: u32,
    pub default_brush: u32,
}

impl Default for PaintSettings {
    fn default() -> Self {
        Self {
            max_brush: 15,
            default_brush: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DisplaySettings {
    pub bg_color: [u8; 4],
    pub grid_color: [u8; 4],
    pub brush_color: [u8; 4],
    pub eraser_color: [u8; 4],
    pub placeholder_color: [u8; 4],
    pub collision_color: [u8; 4],
    pub minimap_bg_color: [u8; 4],
    pub minimap_view_color: [u8; 4],
    /// Longest minimap edge in screen pixels.
    pub minimap_size: f32,
    pub show_grid: bool,
    pub show_minimap: bool,
    pub show_collision: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            bg_color: [38, 38, 46, 255],
            grid_color: [0, 0, 0, 60],
            brush_color: [80, 255, 130, 255],
            eraser_color: [255, 80, 80, 255],
            placeholder_color: [255, 0, 255, 90],
            collision_color: [255, 40, 40, 90],
            minimap_bg_color: [0, 0, 0, 180],
            minimap_view_color: [255, 255, 80, 255],
            minimap_size: 160.0,
            show_grid: true,
            show_minimap: true,
            show_collision: false,
        }
    }
}

impl Settings {
    /// Load settings from config file. Falls back to defaults on error.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Self {
        if path.exists()
            && let Ok(data) = std::fs::read_to_string(path)
        {
            match serde_json::from_str::<Settings>(&data) {
                Ok(settings) => return settings,
                Err(e) => log::warn!("ignoring {}: {e}", path.display()),
            }
        }
        Self::default()
    }

    /// Save settings to config file.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &std::path::Path) {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(self) {
            Ok(data) => {
                if let Err(e) = std::fs::write(path, data) {
                    log::warn!("could not write {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("could not serialize settings: {e}"),
        }
    }
}

pub(crate) fn config_dir() -> std::path::PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    std::path::PathBuf::from(home).join(".config/wardmap")
}

fn config_path() -> std::path::PathBuf {
    config_dir().join("settings.json")
}
