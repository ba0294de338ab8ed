//! Multi-layer tile grid.
//!
//! A `TileGrid` is a value: every edit returns a new grid and leaves the
//! input untouched. Rows are shared between versions, so keeping old grids
//! around for undo costs one pointer per row rather than a full copy.

mod layer;

pub use layer::{CollisionLayer, Layer, LayerKind, TileRef};

/// Index of the floor layer in grids built by `TileGrid::new`.
pub const FLOOR_LAYER: usize = 0;
/// Index of the object layer in grids built by `TileGrid::new`.
pub const OBJECT_LAYER: usize = 1;

/// Inclusive rectangle of tile indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TileRect {
    pub fn width(&self) -> u32 {
        (self.max_x - self.min_x + 1).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.max_y - self.min_y + 1).max(0) as u32
    }

    pub fn tile_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Row-major iterator over every tile in the rectangle.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> {
        let TileRect { min_x, min_y, max_x, max_y } = *self;
        (min_y..=max_y).flat_map(move |y| (min_x..=max_x).map(move |x| (x, y)))
    }
}

/// Shape problems found when assembling a grid from external data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    ZeroDimension { width: u32, height: u32 },
    NoLayers,
    LayerShape { layer: String, expected: usize, found: usize },
    CollisionShape { expected: usize, found: usize },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::ZeroDimension { width, height } => {
                write!(f, "grid dimensions must be positive (got {width}x{height})")
            }
            GridError::NoLayers => write!(f, "grid has no layers"),
            GridError::LayerShape { layer, expected, found } => {
                write!(f, "layer '{layer}' has {found} cells, expected {expected}")
            }
            GridError::CollisionShape { expected, found } => {
                write!(f, "collision layer has {found} cells, expected {expected}")
            }
        }
    }
}

impl std::error::Error for GridError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    collision: Option<CollisionLayer>,
}

impl TileGrid {
    /// Create a blank grid: a floor layer filled with `default_floor` and an
    /// empty object layer. Zero dimensions are raised to 1.
    pub fn new(width: u32, height: u32, default_floor: TileRef) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            layers: vec![
                Layer::new("floor", LayerKind::Floor { default: default_floor }, width, height),
                Layer::new("objects", LayerKind::Objects, width, height),
            ],
            collision: None,
        }
    }

    /// Assemble a grid from prebuilt layers, checking every shape invariant.
    pub fn from_layers(
        width: u32,
        height: u32,
        layers: Vec<Layer>,
        collision: Option<CollisionLayer>,
    ) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension { width, height });
        }
        if layers.is_empty() {
            return Err(GridError::NoLayers);
        }
        let expected = width as usize * height as usize;
        for layer in &layers {
            let found = layer.width() * layer.height();
            if layer.width() != width as usize || layer.height() != height as usize {
                return Err(GridError::LayerShape {
                    layer: layer.name.clone(),
                    expected,
                    found,
                });
            }
        }
        if let Some(c) = &collision
            && (c.width() != width as usize || c.height() != height as usize)
        {
            return Err(GridError::CollisionShape {
                expected,
                found: c.width() * c.height(),
            });
        }
        Ok(Self { width, height, layers, collision })
    }

    /// Same grid with an all-clear collision layer attached (if it had none).
    pub fn with_collision_layer(&self) -> Self {
        let mut next = self.clone();
        if next.collision.is_none() {
            next.collision = Some(CollisionLayer::new(self.width, self.height));
        }
        next
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_by_name(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.name == name)
    }

    pub fn collision(&self) -> Option<&CollisionLayer> {
        self.collision.as_ref()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Clip a rectangle to the grid. `None` if nothing is left.
    pub fn clip(&self, rect: TileRect) -> Option<TileRect> {
        let clipped = TileRect {
            min_x: rect.min_x.max(0),
            min_y: rect.min_y.max(0),
            max_x: rect.max_x.min(self.width as i32 - 1),
            max_y: rect.max_y.min(self.height as i32 - 1),
        };
        (clipped.min_x <= clipped.max_x && clipped.min_y <= clipped.max_y).then_some(clipped)
    }

    /// Read a cell. Anything out of range reads as `EMPTY`.
    pub fn get(&self, layer: usize, x: i32, y: i32) -> TileRef {
        if !self.contains(x, y) {
            return TileRef::EMPTY;
        }
        self.layers
            .get(layer)
            .and_then(|l| l.get(x as usize, y as usize))
            .unwrap_or(TileRef::EMPTY)
    }

    /// New grid with one cell changed. Out-of-range writes return an
    /// unchanged copy.
    pub fn with_cell(&self, layer: usize, x: i32, y: i32, tile: TileRef) -> Self {
        let mut next = self.clone();
        next.set_cell(layer, x, y, tile);
        next
    }

    /// In-place write used by the paint engine on its private copy.
    pub(crate) fn set_cell(&mut self, layer: usize, x: i32, y: i32, tile: TileRef) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        match self.layers.get_mut(layer) {
            Some(l) => l.set(x as usize, y as usize, tile),
            None => false,
        }
    }

    /// Value written by erase on `layer`.
    pub fn erase_value(&self, layer: usize) -> TileRef {
        self.layers
            .get(layer)
            .map(|l| l.kind.erase_value())
            .unwrap_or(TileRef::EMPTY)
    }

    /// Value `tile` turns into when written to `layer`.
    pub fn normalize(&self, layer: usize, tile: TileRef) -> TileRef {
        self.layers
            .get(layer)
            .map(|l| l.kind.normalize(tile))
            .unwrap_or(tile)
    }

    pub fn has_collision(&self) -> bool {
        self.collision.is_some()
    }

    /// Out of range or no collision layer reads as not blocked.
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        self.collision
            .as_ref()
            .and_then(|c| c.get(x as usize, y as usize))
            .unwrap_or(false)
    }

    pub fn with_collision(&self, x: i32, y: i32, blocked: bool) -> Self {
        let mut next = self.clone();
        next.set_blocked(x, y, blocked);
        next
    }

    pub(crate) fn set_blocked(&mut self, x: i32, y: i32, blocked: bool) -> bool {
        if !self.contains(x, y) {
            return false;
        }
        match &mut self.collision {
            Some(c) => c.set(x as usize, y as usize, blocked),
            None => false,
        }
    }

    /// Topmost non-empty reference at a cell, or `EMPTY`.
    pub fn top_ref(&self, x: i32, y: i32) -> TileRef {
        (0..self.layers.len())
            .rev()
            .map(|i| self.get(i, x, y))
            .find(|t| !t.is_empty())
            .unwrap_or(TileRef::EMPTY)
    }

    /// New grid of a different size. The overlapping region is kept; new
    /// cells take each layer's erase value.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut next = Self {
            width,
            height,
            layers: self
                .layers
                .iter()
                .map(|l| Layer::new(l.name.clone(), l.kind, width, height))
                .collect(),
            collision: self.collision.as_ref().map(|_| CollisionLayer::new(width, height)),
        };
        let keep_w = width.min(self.width) as i32;
        let keep_h = height.min(self.height) as i32;
        for y in 0..keep_h {
            for x in 0..keep_w {
                for layer in 0..self.layers.len() {
                    next.set_cell(layer, x, y, self.get(layer, x, y));
                }
                next.set_blocked(x, y, self.is_blocked(x, y));
            }
        }
        next
    }

    /// Number of cells (across all layers and collision) that differ from
    /// `other`. Grids of different shape differ everywhere.
    pub fn cells_differing(&self, other: &TileGrid) -> usize {
        if self.width != other.width
            || self.height != other.height
            || self.layers.len() != other.layers.len()
        {
            return self.cell_count().max(other.cell_count()) * self.layers.len().max(1);
        }
        let mut count = 0;
        for (a, b) in self.layers.iter().zip(&other.layers) {
            count += a.cells().zip(b.cells()).filter(|(p, q)| p != q).count();
        }
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if self.is_blocked(x, y) != other.is_blocked(x, y) {
                    count += 1;
                }
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLOOR: TileRef = TileRef::new(0, 1, 33);
    const CRATE: TileRef = TileRef::new(1, 0, 0);

    #[test]
    fn test_new_grid() {
        let grid = TileGrid::new(10, 8, FLOOR);
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 8);
        assert_eq!(grid.layer_count(), 2);
        assert_eq!(grid.get(FLOOR_LAYER, 9, 7), FLOOR);
        assert_eq!(grid.get(OBJECT_LAYER, 9, 7), TileRef::EMPTY);
        assert_eq!(grid.layer_by_name("objects"), Some(OBJECT_LAYER));
        assert!(!grid.has_collision());
    }

    #[test]
    fn test_zero_dimensions_raised() {
        let grid = TileGrid::new(0, 0, FLOOR);
        assert_eq!((grid.width(), grid.height()), (1, 1));
    }

    #[test]
    fn test_out_of_range_reads_are_empty() {
        let grid = TileGrid::new(4, 4, FLOOR);
        assert_eq!(grid.get(FLOOR_LAYER, -1, 0), TileRef::EMPTY);
        assert_eq!(grid.get(FLOOR_LAYER, 4, 0), TileRef::EMPTY);
        assert_eq!(grid.get(7, 0, 0), TileRef::EMPTY);
        assert!(!grid.is_blocked(100, 100));
    }

    #[test]
    fn test_with_cell_leaves_input_untouched() {
        let grid = TileGrid::new(4, 4, FLOOR);
        let next = grid.with_cell(OBJECT_LAYER, 2, 3, CRATE);
        assert_eq!(grid.get(OBJECT_LAYER, 2, 3), TileRef::EMPTY);
        assert_eq!(next.get(OBJECT_LAYER, 2, 3), CRATE);
        assert_eq!(next.cells_differing(&grid), 1);
    }

    #[test]
    fn test_out_of_range_write_is_noop() {
        let grid = TileGrid::new(4, 4, FLOOR);
        let next = grid.with_cell(OBJECT_LAYER, -1, 2, CRATE);
        assert_eq!(next, grid);
        let next = grid.with_cell(9, 0, 0, CRATE);
        assert_eq!(next, grid);
    }

    #[test]
    fn test_collision_layer() {
        let grid = TileGrid::new(4, 4, FLOOR);
        assert_eq!(grid.with_collision(1, 1, true), grid);

        let grid = grid.with_collision_layer();
        let blocked = grid.with_collision(1, 1, true);
        assert!(blocked.is_blocked(1, 1));
        assert!(!grid.is_blocked(1, 1));
        assert_eq!(blocked.cells_differing(&grid), 1);
    }

    #[test]
    fn test_top_ref() {
        let grid = TileGrid::new(3, 3, FLOOR).with_cell(OBJECT_LAYER, 1, 1, CRATE);
        assert_eq!(grid.top_ref(1, 1), CRATE);
        assert_eq!(grid.top_ref(0, 0), FLOOR);
    }

    #[test]
    fn test_resized_keeps_overlap() {
        let grid = TileGrid::new(4, 4, FLOOR)
            .with_collision_layer()
            .with_cell(OBJECT_LAYER, 1, 1, CRATE)
            .with_cell(OBJECT_LAYER, 3, 3, CRATE)
            .with_collision(1, 1, true);
        let smaller = grid.resized(2, 2);
        assert_eq!(smaller.get(OBJECT_LAYER, 1, 1), CRATE);
        assert!(smaller.is_blocked(1, 1));

        let larger = grid.resized(6, 5);
        assert_eq!(larger.get(OBJECT_LAYER, 3, 3), CRATE);
        assert_eq!(larger.get(FLOOR_LAYER, 5, 4), FLOOR);
        assert_eq!(larger.get(OBJECT_LAYER, 5, 4), TileRef::EMPTY);
    }

    #[test]
    fn test_from_layers_validates_shape() {
        let floor = Layer::new("floor", LayerKind::Floor { default: FLOOR }, 3, 3);
        let short = Layer::new("objects", LayerKind::Objects, 3, 2);
        let err = TileGrid::from_layers(3, 3, vec![floor.clone(), short], None).unwrap_err();
        assert!(matches!(err, GridError::LayerShape { .. }));

        let err = TileGrid::from_layers(3, 3, vec![], None).unwrap_err();
        assert_eq!(err, GridError::NoLayers);

        let err = TileGrid::from_layers(3, 3, vec![floor.clone()], Some(CollisionLayer::new(2, 3)))
            .unwrap_err();
        assert!(matches!(err, GridError::CollisionShape { .. }));

        assert!(TileGrid::from_layers(3, 3, vec![floor], Some(CollisionLayer::new(3, 3))).is_ok());
    }
}
