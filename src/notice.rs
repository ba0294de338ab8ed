use std::fmt;

/// A non-fatal, user-facing message queued by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NothingToUndo,
    NothingToRedo,
    /// Requested map dimensions were out of range and got clamped.
    InvalidDimensions {
        requested: (u32, u32),
        applied: (u32, u32),
    },
    /// A visible cell references a tile source that is not decoded yet.
    SourceNotReady(i32),
    /// A map could not be loaded or saved; the current map is unchanged.
    LoadFailed(String),
    /// The picker was used on an empty cell.
    NothingToPick,
}

impl Notice {
    pub fn level(&self) -> log::Level {
        match self {
            Notice::LoadFailed(_) | Notice::InvalidDimensions { .. } => log::Level::Warn,
            Notice::SourceNotReady(_) => log::Level::Info,
            Notice::NothingToUndo | Notice::NothingToRedo | Notice::NothingToPick => {
                log::Level::Debug
            }
        }
    }

    pub fn is_error(&self) -> bool {
        self.level() == log::Level::Warn
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NothingToUndo => write!(f, "Nothing to undo"),
            Notice::NothingToRedo => write!(f, "Nothing to redo"),
            Notice::InvalidDimensions { requested, applied } => write!(
                f,
                "Map size {}x{} is out of range, using {}x{}",
                requested.0, requested.1, applied.0, applied.1
            ),
            Notice::SourceNotReady(id) => write!(f, "Tile source {id} is not loaded yet"),
            Notice::LoadFailed(msg) => write!(f, "Load failed: {msg}"),
            Notice::NothingToPick => write!(f, "Nothing to pick here"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let n = Notice::InvalidDimensions {
            requested: (0, 900),
            applied: (1, 256),
        };
        assert_eq!(n.to_string(), "Map size 0x900 is out of range, using 1x256");
        assert!(n.is_error());
        assert!(!Notice::NothingToUndo.is_error());
    }
}
