use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Reference to one tile inside an external tile sheet, or the empty sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRef {
    /// Tile sheet id in the asset registry. Negative means empty.
    pub source: i32,
    /// Column in the tile sheet.
    pub x: u16,
    /// Row in the tile sheet.
    pub y: u16,
}

impl TileRef {
    pub const EMPTY: Self = Self { source: -1, x: 0, y: 0 };

    pub const fn new(source: i32, x: u16, y: u16) -> Self {
        Self { source, x, y }
    }

    pub fn is_empty(&self) -> bool {
        self.source < 0
    }
}

impl Default for TileRef {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Display for TileRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "empty")
        } else {
            write!(f, "{}:{},{}", self.source, self.x, self.y)
        }
    }
}

/// What a layer stores when a cell is erased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    /// Opaque ground layer. Never holds `EMPTY`; erasing writes `default`.
    Floor { default: TileRef },
    /// Transparent layer drawn over the floor. Erasing writes `EMPTY`.
    Objects,
}

impl LayerKind {
    pub fn erase_value(&self) -> TileRef {
        match self {
            LayerKind::Floor { default } => *default,
            LayerKind::Objects => TileRef::EMPTY,
        }
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, LayerKind::Objects)
    }

    /// Map a requested write onto a value the layer may hold.
    pub fn normalize(&self, tile: TileRef) -> TileRef {
        match self {
            LayerKind::Floor { default } if tile.is_empty() => *default,
            _ => tile,
        }
    }
}

/// One row of cells as parallel arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Row {
    source: Vec<i32>,
    tile_x: Vec<u16>,
    tile_y: Vec<u16>,
}

impl Row {
    fn filled(width: usize, tile: TileRef) -> Self {
        Self {
            source: vec![tile.source; width],
            tile_x: vec![tile.x; width],
            tile_y: vec![tile.y; width],
        }
    }

    fn get(&self, x: usize) -> Option<TileRef> {
        Some(TileRef {
            source: *self.source.get(x)?,
            x: *self.tile_x.get(x)?,
            y: *self.tile_y.get(x)?,
        })
    }

    fn set(&mut self, x: usize, tile: TileRef) {
        self.source[x] = tile.source;
        self.tile_x[x] = tile.x;
        self.tile_y[x] = tile.y;
    }
}

/// A named sheet of tile references. Rows are shared between grid versions
/// and copied only when written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub kind: LayerKind,
    width: usize,
    rows: Vec<Arc<Row>>,
}

impl Layer {
    /// Create a layer filled with its erase value.
    pub fn new(name: impl Into<String>, kind: LayerKind, width: u32, height: u32) -> Self {
        let row = Arc::new(Row::filled(width as usize, kind.erase_value()));
        Self {
            name: name.into(),
            kind,
            width: width as usize,
            rows: vec![row; height as usize],
        }
    }

    /// Build a layer from row-major cells. Returns `None` if the cell count
    /// does not match `width * height`.
    pub fn from_cells(
        name: impl Into<String>,
        kind: LayerKind,
        width: u32,
        height: u32,
        cells: &[TileRef],
    ) -> Option<Self> {
        let w = width as usize;
        if w == 0 || cells.len() != w * height as usize {
            return None;
        }
        let rows = cells
            .chunks(w)
            .map(|chunk| {
                let mut row = Row::filled(w, TileRef::EMPTY);
                for (x, tile) in chunk.iter().enumerate() {
                    row.set(x, kind.normalize(*tile));
                }
                Arc::new(row)
            })
            .collect();
        Some(Self { name: name.into(), kind, width: w, rows })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, x: usize, y: usize) -> Option<TileRef> {
        self.rows.get(y)?.get(x)
    }

    /// Write one cell. Returns true if the stored value changed.
    pub(crate) fn set(&mut self, x: usize, y: usize, tile: TileRef) -> bool {
        let tile = self.kind.normalize(tile);
        let Some(row) = self.rows.get_mut(y) else {
            return false;
        };
        match row.get(x) {
            Some(current) if current != tile => {
                Arc::make_mut(row).set(x, tile);
                true
            }
            _ => false,
        }
    }

    /// Row-major iterator over every cell.
    pub fn cells(&self) -> impl Iterator<Item = TileRef> + '_ {
        self.rows
            .iter()
            .flat_map(move |row| (0..self.width).filter_map(move |x| row.get(x)))
    }

    /// True when row `y` is the same allocation in both layers.
    #[cfg(test)]
    pub(crate) fn shares_row(&self, other: &Layer, y: usize) -> bool {
        match (self.rows.get(y), other.rows.get(y)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Boolean blocking mask parallel to the tile layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionLayer {
    width: usize,
    rows: Vec<Arc<Vec<bool>>>,
}

impl CollisionLayer {
    pub fn new(width: u32, height: u32) -> Self {
        let row = Arc::new(vec![false; width as usize]);
        Self {
            width: width as usize,
            rows: vec![row; height as usize],
        }
    }

    pub fn from_cells(width: u32, height: u32, cells: &[bool]) -> Option<Self> {
        let w = width as usize;
        if w == 0 || cells.len() != w * height as usize {
            return None;
        }
        let rows = cells.chunks(w).map(|chunk| Arc::new(chunk.to_vec())).collect();
        Some(Self { width: w, rows })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        self.rows.get(y)?.get(x).copied()
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, blocked: bool) -> bool {
        let Some(row) = self.rows.get_mut(y) else {
            return false;
        };
        match row.get(x) {
            Some(&current) if current != blocked => {
                Arc::make_mut(row)[x] = blocked;
                true
            }
            _ => false,
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = bool> + '_ {
        self.rows.iter().flat_map(|row| row.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: TileRef = TileRef::new(0, 1, 33);

    #[test]
    fn test_floor_never_stores_empty() {
        let mut layer = Layer::new("floor", LayerKind::Floor { default: FLOOR }, 4, 4);
        layer.set(1, 1, TileRef::new(2, 3, 4));
        layer.set(1, 1, TileRef::EMPTY);
        assert_eq!(layer.get(1, 1), Some(FLOOR));
    }

    #[test]
    fn test_objects_erase_to_empty() {
        let kind = LayerKind::Objects;
        assert_eq!(kind.erase_value(), TileRef::EMPTY);
        assert!(kind.is_transparent());
        let layer = Layer::new("objects", kind, 3, 2);
        assert!(layer.cells().all(|t| t.is_empty()));
        assert_eq!(layer.cells().count(), 6);
    }

    #[test]
    fn test_write_copies_only_touched_row() {
        let original = Layer::new("objects", LayerKind::Objects, 8, 8);
        let mut edited = original.clone();
        assert!(edited.set(2, 5, TileRef::new(1, 0, 0)));
        assert!(!edited.shares_row(&original, 5));
        assert!(edited.shares_row(&original, 4));
        assert_eq!(original.get(2, 5), Some(TileRef::EMPTY));
    }

    #[test]
    fn test_unchanged_write_keeps_sharing() {
        let original = Layer::new("objects", LayerKind::Objects, 4, 4);
        let mut edited = original.clone();
        assert!(!edited.set(0, 0, TileRef::EMPTY));
        assert!(edited.shares_row(&original, 0));
    }

    #[test]
    fn test_from_cells_rejects_bad_shape() {
        let cells = vec![TileRef::EMPTY; 5];
        assert!(Layer::from_cells("x", LayerKind::Objects, 2, 3, &cells).is_none());
        assert!(CollisionLayer::from_cells(2, 3, &[false; 5]).is_none());
    }

    #[test]
    fn test_collision_set_and_get() {
        let mut collision = CollisionLayer::new(3, 3);
        assert!(collision.set(2, 2, true));
        assert!(!collision.set(2, 2, true));
        assert_eq!(collision.get(2, 2), Some(true));
        assert_eq!(collision.get(3, 0), None);
    }
}
