//! Standalone image decoding (background panorama)

use std::path::Path;
use vitrine_core::{ContentHash, Result, VitrineError};

/// A decoded RGBA8 image
#[derive(Debug, Clone)]
pub struct LoadedTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub hash: ContentHash,
}

/// Decode an image file (PNG, JPEG, HDR, ...) to RGBA8.
///
/// HDR panoramas are clamped to [0, 1] on conversion.
pub fn decode_texture<P: AsRef<Path>>(path: P) -> Result<LoadedTexture> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("texture")
        .to_string();

    let img = image::load_from_memory(&bytes).map_err(|e| {
        VitrineError::ImportError(format!("Failed to decode image '{}': {}", path.display(), e))
    })?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    Ok(LoadedTexture {
        name,
        width,
        height,
        rgba: rgba.into_raw(),
        hash: ContentHash::from_bytes(&bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sky.png");
        let img = image::RgbImage::from_pixel(4, 2, image::Rgb([10, 20, 30]));
        img.save(&path).unwrap();

        let tex = decode_texture(&path).unwrap();
        assert_eq!(tex.name, "sky");
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(tex.rgba.len(), 4 * 2 * 4);
        assert_eq!(&tex.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = decode_texture("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, VitrineError::IoError(_)));
    }

    #[test]
    fn undecodable_bytes_are_import_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"nope").unwrap();
        assert!(matches!(
            decode_texture(&path).unwrap_err(),
            VitrineError::ImportError(_)
        ));
    }
}
