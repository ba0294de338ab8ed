pub mod camera;
mod canvas;
mod grid;
mod renderer;

pub use camera::Camera;
pub use canvas::{Canvas, EguiCanvas, Rgba};
pub use grid::build_grid_lines;
pub use renderer::{CursorPreview, FrameStats, Overlay, PreviewMode, Renderer};
