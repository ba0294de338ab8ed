use glam::Vec2;

/// Normalised texture coordinates of one tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub min: Vec2,
    pub max: Vec2,
}

/// A tile sheet divided into a grid of square tiles.
///
/// `I` is whatever handle the drawing backend uses for the decoded image.
pub struct TileSource<I> {
    pub name: String,
    pub image: I,
    pub image_width: u32,
    pub image_height: u32,
    pub tile_size: u32,
    /// Average colour of every tile, row-major. Used by the minimap.
    pub colors: Vec<[u8; 4]>,
}

impl<I> TileSource<I> {
    pub fn cols(&self) -> u32 {
        self.image_width / self.tile_size.max(1)
    }

    pub fn rows(&self) -> u32 {
        self.image_height / self.tile_size.max(1)
    }

    pub fn contains(&self, col: u32, row: u32) -> bool {
        col < self.cols() && row < self.rows()
    }

    /// UV rectangle for the tile at (col, row) in the sheet grid.
    pub fn tile_uv(&self, col: u32, row: u32) -> UvRect {
        let w = self.image_width.max(1) as f32;
        let h = self.image_height.max(1) as f32;
        let ts = self.tile_size as f32;
        let u0 = col as f32 * ts / w;
        let v0 = row as f32 * ts / h;
        UvRect {
            min: Vec2::new(u0, v0),
            max: Vec2::new(u0 + ts / w, v0 + ts / h),
        }
    }

    pub fn color(&self, col: u32, row: u32) -> Option<[u8; 4]> {
        if !self.contains(col, row) {
            return None;
        }
        self.colors.get((row * self.cols() + col) as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> TileSource<()> {
        TileSource {
            name: "hospital".to_string(),
            image: (),
            image_width: 128,
            image_height: 64,
            tile_size: 32,
            colors: (0..8).map(|i| [i as u8, 0, 0, 255]).collect(),
        }
    }

    #[test]
    fn test_grid_shape() {
        let s = sheet();
        assert_eq!((s.cols(), s.rows()), (4, 2));
        assert!(s.contains(3, 1));
        assert!(!s.contains(4, 0));
    }

    #[test]
    fn test_tile_uv() {
        let uv = sheet().tile_uv(1, 1);
        assert_eq!(uv.min, Vec2::new(0.25, 0.5));
        assert_eq!(uv.max, Vec2::new(0.5, 1.0));
    }

    #[test]
    fn test_tile_color() {
        let s = sheet();
        assert_eq!(s.color(2, 1), Some([6, 0, 0, 255]));
        assert_eq!(s.color(0, 5), None);
    }
}
