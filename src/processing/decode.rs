use std::path::Path;

use image::{ImageError, ImageReader, RgbaImage};
use tracing::debug;

use crate::error::PreviewError;

/// Decodes an image file to RGBA8, sniffing the format from its contents.
pub fn decode_rgba8(path: &Path) -> Result<RgbaImage, PreviewError> {
    let img = ImageReader::open(path)
        .map_err(ImageError::IoError)?
        .with_guessed_format()
        .map_err(ImageError::IoError)?
        .decode()?;
    let img = img.to_rgba8();
    debug!(path = %path.display(), width = img.width(), height = img.height(), "decoded image");
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        image::RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();
        let img = decode_rgba8(&path).unwrap();
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode_rgba8(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, PreviewError::Image(ImageError::IoError(_))));
    }

    #[test]
    fn garbage_bytes_are_an_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        let err = decode_rgba8(&path).unwrap_err();
        assert!(matches!(err, PreviewError::Image(_)));
    }
}
