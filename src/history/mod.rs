use std::collections::VecDeque;

use crate::grid::TileGrid;

/// One committed user gesture.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub snapshot: TileGrid,
    pub label: String,
    /// Monotonic commit number, unique within a session.
    pub index: u64,
}

/// Bounded undo/redo history of grid snapshots.
///
/// The buffer always holds at least the baseline entry; `pointer` indexes
/// the entry matching the current grid. Committing behind the tip discards
/// the redo branch, and the oldest entries are evicted past `max_depth`.
pub struct History {
    entries: VecDeque<HistoryEntry>,
    pointer: usize,
    max_depth: usize,
    next_index: u64,
    /// Set to true on commit/undo/redo, cleared by `mark_saved()`.
    pub dirty: bool,
}

impl History {
    pub fn new(baseline: TileGrid, max_depth: usize) -> Self {
        let mut history = Self {
            entries: VecDeque::new(),
            pointer: 0,
            max_depth: max_depth.max(1),
            next_index: 0,
            dirty: false,
        };
        history.reset(baseline);
        history
    }

    /// Drop everything and start over from a single baseline entry.
    pub fn reset(&mut self, baseline: TileGrid) {
        self.entries.clear();
        self.entries.push_back(HistoryEntry {
            snapshot: baseline,
            label: "Baseline".to_string(),
            index: self.next_index,
        });
        self.next_index += 1;
        self.pointer = 0;
        self.dirty = false;
    }

    pub fn commit(&mut self, grid: TileGrid, label: impl Into<String>) {
        self.entries.truncate(self.pointer + 1);
        let label = label.into();
        log::info!("commit #{}: {label}", self.next_index);
        self.entries.push_back(HistoryEntry {
            snapshot: grid,
            label,
            index: self.next_index,
        });
        self.next_index += 1;
        while self.entries.len() > self.max_depth {
            self.entries.pop_front();
        }
        self.pointer = self.entries.len() - 1;
        self.dirty = true;
    }

    /// Step back. `None` when already at the oldest entry.
    pub fn undo(&mut self) -> Option<&TileGrid> {
        if self.pointer == 0 {
            return None;
        }
        log::debug!("undo {}", self.entries[self.pointer].label);
        self.pointer -= 1;
        self.dirty = true;
        Some(&self.entries[self.pointer].snapshot)
    }

    /// Step forward. `None` when already at the tip.
    pub fn redo(&mut self) -> Option<&TileGrid> {
        if self.pointer + 1 >= self.entries.len() {
            return None;
        }
        self.pointer += 1;
        log::debug!("redo {}", self.entries[self.pointer].label);
        self.dirty = true;
        Some(&self.entries[self.pointer].snapshot)
    }

    /// Snapshot at the pointer.
    pub fn current(&self) -> &TileGrid {
        &self.entries[self.pointer].snapshot
    }

    pub fn current_entry(&self) -> &HistoryEntry {
        &self.entries[self.pointer]
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.entries.len()
    }

    pub fn undo_depth(&self) -> usize {
        self.pointer
    }

    pub fn redo_depth(&self) -> usize {
        self.entries.len() - 1 - self.pointer
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Change the cap, evicting the oldest entries if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        while self.entries.len() > self.max_depth {
            if self.pointer == 0 {
                self.entries.pop_back();
            } else {
                self.entries.pop_front();
                self.pointer -= 1;
            }
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }
}
