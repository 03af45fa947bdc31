//! Texture decoding into RGBA8 pixels ready for GPU upload.

use std::path::Path;

use anyhow::{Context, Result, ensure};

/// Decoded RGBA8 image, rows top to bottom.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl TextureData {
    pub const BYTES_PER_PIXEL: u32 = 4;

    /// Wrap raw RGBA8 pixels. Fails if the buffer size doesn't match.
    pub fn new_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * Self::BYTES_PER_PIXEL as usize;
        ensure!(
            data.len() == expected,
            "RGBA8 data is {} bytes, expected {} for {}x{}",
            data.len(),
            expected,
            width,
            height
        );
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Decode an image file (PNG) into RGBA8.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading texture from {:?}", path);

        let img = image::open(path).with_context(|| format!("Failed to open image {:?}", path))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = rgba.into_raw();

        log::info!("Loaded texture {}x{} with {} bytes", width, height, data.len());

        Self::new_rgba8(width, height, data)
    }

    /// Single-colour texture; `[128, 128, 255, 255]` is a flat normal map.
    pub fn solid(size: u32, rgba: [u8; 4]) -> Self {
        let data = rgba.repeat(size as usize * size as usize);
        Self {
            data,
            width: size,
            height: size,
        }
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * Self::BYTES_PER_PIXEL
    }

    pub fn is_valid(&self) -> bool {
        let expected = self.bytes_per_row() as usize * self.height as usize;
        self.data.len() == expected && self.width > 0 && self.height > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(TextureData::new_rgba8(2, 2, vec![0; 15]).is_err());
        assert!(TextureData::new_rgba8(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn solid_texture_is_valid() {
        let tex = TextureData::solid(4, [128, 128, 255, 255]);
        assert!(tex.is_valid());
        assert_eq!(tex.bytes_per_row(), 16);
        assert_eq!(&tex.data[60..64], &[128, 128, 255, 255]);
    }

    #[test]
    fn loads_png_from_disk() {
        let path = std::env::temp_dir().join(format!("texture-load-{}.png", std::process::id()));
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        img.save(&path).expect("save png");

        let tex = TextureData::load(&path).expect("load png");
        let _ = std::fs::remove_file(&path);
        assert_eq!((tex.width, tex.height), (3, 2));
        assert!(tex.is_valid());
        assert_eq!(&tex.data[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn missing_file_fails() {
        assert!(TextureData::load("definitely-not-here.png").is_err());
    }
}
