//! Pointer and wheel input as the editor sees it, independent of the
//! windowing backend.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Performs the active tool's action.
    Primary,
    /// Always pans.
    Secondary,
}

/// Modifier state relevant to gestures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerModifiers {
    /// Turns a primary drag into a pan.
    pub pan: bool,
    /// Turns the wheel into zoom.
    pub zoom: bool,
}

impl PointerModifiers {
    pub const NONE: Self = Self { pan: false, zoom: false };
}

/// What a wheel event did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelOutcome {
    Zoomed,
    /// Zoom was requested but already at a bound.
    Unchanged,
    /// Not consumed; the host may scroll something else by this delta.
    Scroll(f32),
}
