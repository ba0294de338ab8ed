use crate::grid::{FLOOR_LAYER, TileRef};
use crate::paint::BrushSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Brush,
    Eraser,
    Fill,
    Picker,
}

impl Tool {
    pub const ALL: [Tool; 4] = [Tool::Brush, Tool::Eraser, Tool::Fill, Tool::Picker];

    pub fn label(&self) -> &'static str {
        match self {
            Tool::Brush => "Brush",
            Tool::Eraser => "Eraser",
            Tool::Fill => "Fill",
            Tool::Picker => "Picker",
        }
    }

    /// Brush and eraser keep acting while the pointer is dragged.
    pub fn is_continuous(&self) -> bool {
        matches!(self, Tool::Brush | Tool::Eraser)
    }
}

/// What the paint tools write into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveTarget {
    Layer(usize),
    Collision,
}

impl Default for ActiveTarget {
    fn default() -> Self {
        ActiveTarget::Layer(FLOOR_LAYER)
    }
}

/// Current tool plus the parameters the tools share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolState {
    pub tool: Tool,
    pub brush: BrushSize,
    pub paint_ref: TileRef,
    pub target: ActiveTarget,
}

impl ToolState {
    pub fn new(brush: BrushSize, paint_ref: TileRef) -> Self {
        Self {
            tool: Tool::Brush,
            brush,
            paint_ref,
            target: ActiveTarget::default(),
        }
    }

    /// History label for a gesture made with the current tool.
    pub fn commit_label(&self) -> &'static str {
        match (self.tool, self.target) {
            (Tool::Brush | Tool::Eraser, ActiveTarget::Collision) => "Collision",
            (Tool::Brush, _) => "Brush",
            (Tool::Eraser, _) => "Erase",
            (Tool::Fill, _) => "Fill",
            (Tool::Picker, _) => "Pick",
        }
    }
}
