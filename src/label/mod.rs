//! Static image label that rescales its picture to the container on every
//! redraw.

mod canvas;

use std::sync::Arc;

use image::RgbaImage;
use tracing::{debug, trace};

use crate::error::PreviewError;
use crate::processing::layout::{Placement, ScaleMode, scale_rect};
use crate::processing::resample::{ResampleFilter, resample};

pub use canvas::{Canvas, PixelCanvas};

/// Displays one image scaled to its container while preserving aspect ratio.
///
/// The original image is kept untouched next to the scaled display copy, so
/// repeated resizes always resample from full quality.
#[derive(Debug, Default)]
pub struct ImageFitLabel {
    source: Option<Arc<RgbaImage>>,
    current: Option<Arc<RgbaImage>>,
    placement: Option<Placement>,
    filter: ResampleFilter,
    mode: ScaleMode,
    redraw_requested: bool,
}

impl ImageFitLabel {
    pub fn new(filter: ResampleFilter, mode: ScaleMode) -> Self {
        Self {
            filter,
            mode,
            ..Self::default()
        }
    }

    /// Stores `image` as both the source and the current display copy and
    /// requests a redraw.
    pub fn set_image(&mut self, image: RgbaImage) {
        let (width, height) = image.dimensions();
        debug!(width, height, "label image set");
        let image = Arc::new(image);
        self.source = Some(Arc::clone(&image));
        self.current = Some(image);
        self.placement = None;
        self.redraw_requested = true;
    }

    /// Rescales the source to the canvas and draws it centered.
    ///
    /// Returns `Ok(None)` without touching the canvas when no image is set.
    pub fn on_redraw<C>(&mut self, canvas: &mut C) -> Result<Option<Placement>, PreviewError>
    where
        C: Canvas + ?Sized,
    {
        self.redraw_requested = false;
        let Some(source) = self.source.as_ref() else {
            return Ok(None);
        };

        let (container_w, container_h) = canvas.size();
        let placement = scale_rect(
            container_w,
            container_h,
            source.width(),
            source.height(),
            self.mode,
        );
        let scaled = resample(source, placement.width, placement.height, self.filter)?;
        canvas.draw_image(placement.x, placement.y, &scaled);
        trace!(
            container_w,
            container_h,
            x = placement.x,
            y = placement.y,
            width = placement.width,
            height = placement.height,
            "label redrawn"
        );

        self.current = Some(Arc::new(scaled));
        self.placement = Some(placement);
        Ok(Some(placement))
    }

    /// Returns and clears the pending redraw request.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    pub fn source_image(&self) -> Option<&RgbaImage> {
        self.source.as_deref()
    }

    /// The most recent display copy; equals the source until the first redraw.
    pub fn display_image(&self) -> Option<&RgbaImage> {
        self.current.as_deref()
    }

    /// Placement used by the most recent redraw.
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    pub fn scale_mode(&self) -> ScaleMode {
        self.mode
    }

    pub fn set_scale_mode(&mut self, mode: ScaleMode) {
        if self.mode != mode {
            self.mode = mode;
            self.redraw_requested = self.source.is_some();
        }
    }
}
