use fast_image_resize as fir;
use image::RgbaImage;
use serde::Deserialize;

use crate::error::PreviewError;

/// Resampling filter used when rescaling the label's source image.
///
/// `Nearest` is the default: redraw latency during interactive resizes
/// matters more than quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    #[default]
    Nearest,
    Bilinear,
    CatmullRom,
}

impl ResampleFilter {
    fn algorithm(self) -> fir::ResizeAlg {
        match self {
            Self::Nearest => fir::ResizeAlg::Nearest,
            Self::Bilinear => fir::ResizeAlg::Convolution(fir::FilterType::Bilinear),
            Self::CatmullRom => fir::ResizeAlg::Convolution(fir::FilterType::CatmullRom),
        }
    }
}

/// Returns a freshly allocated copy of `source` scaled to `width`×`height`.
///
/// The source is never modified, so callers can rescale from the same
/// original as often as they like without compounding resampling loss.
pub fn resample(
    source: &RgbaImage,
    width: u32,
    height: u32,
    filter: ResampleFilter,
) -> Result<RgbaImage, PreviewError> {
    if width == 0 || height == 0 {
        return Err(PreviewError::Resample(format!(
            "target size {width}x{height} must be positive"
        )));
    }
    if source.dimensions() == (width, height) {
        return Ok(source.clone());
    }

    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .map_err(|err| PreviewError::Resample(format!("invalid source buffer: {err}")))?;
    let mut dst_image = fir::images::Image::new(width, height, fir::PixelType::U8x4);
    let options = fir::ResizeOptions::new().resize_alg(filter.algorithm());
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .map_err(|err| PreviewError::Resample(err.to_string()))?;
    RgbaImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| PreviewError::Resample("resized buffer has the wrong length".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn nearest_keeps_solid_color() {
        let source = RgbaImage::from_pixel(8, 4, Rgba([10, 20, 30, 255]));
        let out = resample(&source, 3, 2, ResampleFilter::Nearest).unwrap();
        assert_eq!(out.dimensions(), (3, 2));
        assert!(out.pixels().all(|p| p.0 == [10, 20, 30, 255]));
    }

    #[test]
    fn same_size_is_a_copy() {
        let source = RgbaImage::from_pixel(5, 5, Rgba([1, 2, 3, 4]));
        let out = resample(&source, 5, 5, ResampleFilter::CatmullRom).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn zero_target_is_rejected() {
        let source = RgbaImage::new(4, 4);
        assert!(matches!(
            resample(&source, 0, 4, ResampleFilter::Bilinear),
            Err(PreviewError::Resample(_))
        ));
    }
}
