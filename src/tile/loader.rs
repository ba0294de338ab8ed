//! Decoding tile sheets from disk.

use image::RgbaImage;

/// Decoded RGBA pixels of a tile sheet plus per-tile average colours.
pub struct DecodedSheet {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
    pub pixels: Vec<u8>,
    pub colors: Vec<[u8; 4]>,
}

/// Load a tile sheet image file.
pub fn decode_sheet(path: &std::path::Path, tile_size: u32) -> Result<DecodedSheet, String> {
    if tile_size == 0 {
        return Err("Tile size must be positive".to_string());
    }
    let img = image::open(path)
        .map_err(|e| format!("Failed to load image: {e}"))?
        .to_rgba8();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(from_image(name, img, tile_size))
}

pub fn from_image(name: String, img: RgbaImage, tile_size: u32) -> DecodedSheet {
    let (width, height) = img.dimensions();
    let colors = average_colors(&img, tile_size);
    DecodedSheet {
        name,
        width,
        height,
        tile_size,
        pixels: img.into_raw(),
        colors,
    }
}

/// Mean RGBA of every whole tile, row-major. Partial tiles at the right and
/// bottom edges are ignored.
pub fn average_colors(img: &RgbaImage, tile_size: u32) -> Vec<[u8; 4]> {
    let ts = tile_size.max(1);
    let cols = img.width() / ts;
    let rows = img.height() / ts;
    let mut colors = Vec::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let mut sum = [0u64; 4];
            for y in row * ts..(row + 1) * ts {
                for x in col * ts..(col + 1) * ts {
                    let p = img.get_pixel(x, y).0;
                    for (s, c) in sum.iter_mut().zip(p) {
                        *s += c as u64;
                    }
                }
            }
            let n = (ts as u64) * (ts as u64);
            colors.push(sum.map(|s| (s / n) as u8));
        }
    }
    colors
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_average_colors() {
        let mut img = RgbaImage::from_pixel(4, 2, Rgba([0, 0, 0, 255]));
        for y in 0..2 {
            for x in 2..4 {
                img.put_pixel(x, y, Rgba([200, 100, 50, 255]));
            }
        }
        img.put_pixel(0, 0, Rgba([40, 40, 40, 255]));
        let colors = average_colors(&img, 2);
        assert_eq!(colors, vec![[10, 10, 10, 255], [200, 100, 50, 255]]);
    }

    #[test]
    fn test_partial_tiles_ignored() {
        let img = RgbaImage::from_pixel(5, 3, Rgba([1, 2, 3, 4]));
        let sheet = from_image("odd".to_string(), img, 2);
        assert_eq!(sheet.colors.len(), 2);
        assert_eq!(sheet.pixels.len(), 5 * 3 * 4);
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = decode_sheet(std::path::Path::new("/nonexistent/sheet.png"), 32);
        assert!(err.is_err());
        assert!(decode_sheet(std::path::Path::new("x.png"), 0).is_err());
    }
}
