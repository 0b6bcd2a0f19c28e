//! Aspect-preserving placement of an image inside a container.
//!
//! All sizes are in whole pixels. Zero-sized inputs are treated as one pixel
//! so every helper stays total.

use serde::Deserialize;

/// Axis a source image is scaled to before the other one is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleAxis {
    Width,
    Height,
}

/// How an image is fitted into its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleMode {
    /// Whole image visible, letterboxed on one axis.
    #[default]
    Fit,
    /// Container fully covered, overflow cropped.
    Fill,
}

/// Scaled size and top-left offset of an image inside a container.
///
/// Offsets are signed: a filled image hangs over the container edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Picks the constraining axis for an aspect fit.
///
/// Scaling to width is chosen exactly when `cw / pw < ch / ph`. This covers
/// the "both overflow", "one axis overflows" and "both smaller" cases with a
/// single comparison. Ties resolve to [`ScaleAxis::Height`]; both axes yield
/// the same size there.
pub fn choose_scale_axis(src_w: u32, src_h: u32, container_w: u32, container_h: u32) -> ScaleAxis {
    let (pw, ph) = (u64::from(src_w.max(1)), u64::from(src_h.max(1)));
    let (cw, ch) = (u64::from(container_w.max(1)), u64::from(container_h.max(1)));
    // cw / pw < ch / ph, cross-multiplied to stay exact at the boundaries
    if cw * ph < ch * pw {
        ScaleAxis::Width
    } else {
        ScaleAxis::Height
    }
}

/// Scales `(src_w, src_h)` so that its width becomes `target_w`.
pub fn scale_to_width(src_w: u32, src_h: u32, target_w: u32) -> (u32, u32) {
    let target_w = target_w.max(1);
    let h = f64::from(src_h.max(1)) * f64::from(target_w) / f64::from(src_w.max(1));
    (target_w, clamp_dim(h))
}

/// Scales `(src_w, src_h)` so that its height becomes `target_h`.
pub fn scale_to_height(src_w: u32, src_h: u32, target_h: u32) -> (u32, u32) {
    let target_h = target_h.max(1);
    let w = f64::from(src_w.max(1)) * f64::from(target_h) / f64::from(src_h.max(1));
    (clamp_dim(w), target_h)
}

fn clamp_dim(value: f64) -> u32 {
    value.round().clamp(1.0, f64::from(u32::MAX)) as u32
}

pub fn fit_size(src_w: u32, src_h: u32, container_w: u32, container_h: u32) -> (u32, u32) {
    match choose_scale_axis(src_w, src_h, container_w, container_h) {
        ScaleAxis::Width => scale_to_width(src_w, src_h, container_w),
        ScaleAxis::Height => scale_to_height(src_w, src_h, container_h),
    }
}

pub fn fill_size(src_w: u32, src_h: u32, container_w: u32, container_h: u32) -> (u32, u32) {
    // the fill axis is the one the fit leaves slack on
    let (pw, ph) = (u64::from(src_w.max(1)), u64::from(src_h.max(1)));
    let (cw, ch) = (u64::from(container_w.max(1)), u64::from(container_h.max(1)));
    if cw * ph > ch * pw {
        scale_to_width(src_w, src_h, container_w)
    } else {
        scale_to_height(src_w, src_h, container_h)
    }
}

/// Offset that centers `inner` inside `outer`, truncated toward zero.
///
/// Never clamped: an inner box larger than the outer one yields negative
/// offsets.
pub fn center_offset(inner_w: u32, inner_h: u32, outer_w: u32, outer_h: u32) -> (i32, i32) {
    let ox = (i64::from(outer_w) - i64::from(inner_w)) / 2;
    let oy = (i64::from(outer_h) - i64::from(inner_h)) / 2;
    (saturate_i32(ox), saturate_i32(oy))
}

fn saturate_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Scales a source rectangle into a destination rectangle and centers it.
pub fn scale_rect(
    dest_w: u32,
    dest_h: u32,
    src_w: u32,
    src_h: u32,
    mode: ScaleMode,
) -> Placement {
    let (width, height) = match mode {
        ScaleMode::Fit => fit_size(src_w, src_h, dest_w, dest_h),
        ScaleMode::Fill => fill_size(src_w, src_h, dest_w, dest_h),
    };
    let (x, y) = center_offset(width, height, dest_w, dest_h);
    Placement {
        x,
        y,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_fit_is_identity() {
        assert_eq!(fit_size(640, 480, 640, 480), (640, 480));
        assert_eq!(center_offset(640, 480, 640, 480), (0, 0));
    }

    #[test]
    fn width_boundary_matches_branch_chain() {
        // pw == cw with a shorter image: the old chain left the size alone,
        // scaling to width keeps it too
        assert_eq!(choose_scale_axis(400, 50, 400, 100), ScaleAxis::Width);
        assert_eq!(fit_size(400, 50, 400, 100), (400, 50));
    }

    #[test]
    fn height_boundary_matches_branch_chain() {
        assert_eq!(choose_scale_axis(200, 100, 400, 100), ScaleAxis::Height);
        assert_eq!(fit_size(200, 100, 400, 100), (200, 100));
    }

    #[test]
    fn zero_sizes_do_not_divide_by_zero() {
        let (w, h) = fit_size(0, 0, 0, 0);
        assert!(w >= 1 && h >= 1);
    }

    #[test]
    fn odd_slack_truncates_toward_zero() {
        assert_eq!(center_offset(10, 10, 13, 13), (1, 1));
        assert_eq!(center_offset(13, 13, 10, 10), (-1, -1));
    }
}
