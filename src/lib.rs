//! Tile-grid map editing engine: layered grids, paint tools, snapshot
//! undo/redo and a culling 2D camera/renderer.

pub mod editor;
pub mod gesture;
pub mod grid;
pub mod history;
pub mod keybindings;
pub mod map;
pub mod notice;
pub mod paint;
pub mod render;
pub mod settings;
pub mod tile;
pub mod tools;

pub use editor::Editor;
pub use grid::{TileGrid, TileRef};
pub use notice::Notice;
