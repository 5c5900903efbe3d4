//! Product image loading.
//!
//! Grid items name their image by file (`product1.png` ...). Files are looked
//! up under the configured asset directory and decoded to RGBA8. A missing or
//! unreadable file is not fatal: a generated gradient tile takes its place
//! and a warning is logged, so an asset-less checkout still shows a grid.

use std::path::Path;

use crate::error::TextureError;

/// Edge length of generated placeholder tiles.
pub const PLACEHOLDER_SIZE: u32 = 64;

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImage {
    /// Raw RGBA pixel data (width * height * 4 bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ProductImage {
    /// Decode an image file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|source| TextureError::ImageLoad {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self {
            data: img.into_raw(),
            width,
            height,
        })
    }

    /// Diagonal gradient tile. `index` picks the hue so neighbors differ.
    pub fn placeholder(index: usize) -> Self {
        const PALETTE: [[u8; 3]; 4] = [
            [212, 175, 55],
            [120, 144, 156],
            [176, 132, 92],
            [96, 125, 139],
        ];
        let start = PALETTE[index % PALETTE.len()];
        let end = [245, 245, 245];

        let size = PLACEHOLDER_SIZE;
        let span = (2 * (size - 1)).max(1) as f32;
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let t = (x + y) as f32 / span;
                data.push(lerp_u8(start[0], end[0], t));
                data.push(lerp_u8(start[1], end[1], t));
                data.push(lerp_u8(start[2], end[2], t));
                data.push(255);
            }
        }
        Self {
            data,
            width: size,
            height: size,
        }
    }

    /// Load `dir/src`, falling back to a placeholder.
    pub fn load_or_placeholder(dir: &Path, src: &str, index: usize) -> Self {
        let path = dir.join(src);
        match Self::load(&path) {
            Ok(image) => image,
            Err(err) => {
                tracing::warn!(%err, "using placeholder for product image");
                Self::placeholder(index)
            }
        }
    }
}

/// Load every image in `sources` from `dir`, in order.
pub fn load_all<'a>(
    dir: &Path,
    sources: impl IntoIterator<Item = &'a str>,
) -> Vec<(String, ProductImage)> {
    sources
        .into_iter()
        .enumerate()
        .map(|(i, src)| (src.to_string(), ProductImage::load_or_placeholder(dir, src, i)))
        .collect()
}

fn lerp_u8(a: u8, b: u8, t: f32) -> u8 {
    let a = a as f32;
    let b = b as f32;
    (a + (b - a) * t).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_dimensions() {
        let img = ProductImage::placeholder(0);
        assert_eq!(img.width, PLACEHOLDER_SIZE);
        assert_eq!(img.height, PLACEHOLDER_SIZE);
        assert_eq!(img.data.len(), (PLACEHOLDER_SIZE * PLACEHOLDER_SIZE * 4) as usize);
    }

    #[test]
    fn test_placeholder_gradient_endpoints() {
        let img = ProductImage::placeholder(0);
        assert_eq!(&img.data[0..4], &[212, 175, 55, 255]);
        let last = img.data.len() - 4;
        assert_eq!(&img.data[last..], &[245, 245, 245, 255]);
    }

    #[test]
    fn test_placeholders_vary_by_index() {
        assert_ne!(ProductImage::placeholder(0), ProductImage::placeholder(1));
        assert_eq!(ProductImage::placeholder(0), ProductImage::placeholder(4));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ProductImage::load("does/not/exist.png").unwrap_err();
        assert!(err.to_string().contains("exist.png"));
    }

    #[test]
    fn test_load_all_falls_back() {
        let images = load_all(Path::new("no-such-dir"), ["product1.png", "product2.png"]);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].0, "product1.png");
        assert_eq!(images[1].1, ProductImage::placeholder(1));
    }

    #[test]
    fn test_lerp_u8() {
        assert_eq!(lerp_u8(0, 255, 0.0), 0);
        assert_eq!(lerp_u8(0, 255, 1.0), 255);
        assert_eq!(lerp_u8(0, 255, 0.5), 128);
    }
}
