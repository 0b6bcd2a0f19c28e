use layer_preview::processing::layout::{
    Placement, ScaleAxis, ScaleMode, choose_scale_axis, fit_size, scale_rect,
};

fn assert_centered(p: Placement, container: (u32, u32)) {
    // offset + size / 2 == container / 2, within integer truncation
    let cx = 2 * i64::from(p.x) + i64::from(p.width);
    let cy = 2 * i64::from(p.y) + i64::from(p.height);
    assert!((cx - i64::from(container.0)).abs() <= 1, "x not centered: {p:?} in {container:?}");
    assert!((cy - i64::from(container.1)).abs() <= 1, "y not centered: {p:?} in {container:?}");
}

#[test]
fn wide_photo_in_short_strip_scales_to_height() {
    // 1920x1080 into 400x100: height is the tighter axis
    assert_eq!(choose_scale_axis(1920, 1080, 400, 100), ScaleAxis::Height);
    let p = scale_rect(400, 100, 1920, 1080, ScaleMode::Fit);
    assert_eq!(
        p,
        Placement {
            x: 111,
            y: 0,
            width: 178,
            height: 100
        }
    );
}

#[test]
fn square_in_tall_container_scales_to_width() {
    assert_eq!(choose_scale_axis(100, 100, 50, 200), ScaleAxis::Width);
    let p = scale_rect(50, 200, 100, 100, ScaleMode::Fit);
    assert_eq!(
        p,
        Placement {
            x: 0,
            y: 75,
            width: 50,
            height: 50
        }
    );
}

#[test]
fn fill_overhangs_with_negative_offset() {
    let p = scale_rect(50, 200, 100, 100, ScaleMode::Fill);
    assert_eq!(
        p,
        Placement {
            x: -75,
            y: 0,
            width: 200,
            height: 200
        }
    );
}

#[test]
fn small_image_is_upscaled_to_fit() {
    // both axes smaller than the container
    let p = scale_rect(500, 120, 40, 30, ScaleMode::Fit);
    assert_eq!((p.width, p.height), (160, 120));
    assert_eq!((p.x, p.y), (170, 0));
}

#[test]
fn fit_keeps_aspect_and_touches_one_edge() {
    let sources = [(1920, 1080), (1080, 1920), (640, 480), (3, 7), (1, 1), (4000, 10)];
    let containers = [(500, 120), (360, 120), (120, 500), (1, 1), (333, 333)];
    for &(sw, sh) in &sources {
        for &(cw, ch) in &containers {
            let (w, h) = fit_size(sw, sh, cw, ch);
            assert!(w == cw || h == ch, "{sw}x{sh} in {cw}x{ch} gave {w}x{h}");
            assert!(w <= cw && h <= ch, "{sw}x{sh} in {cw}x{ch} overflows: {w}x{h}");
            // the derived axis is off by at most half a pixel, unless clamped to 1
            let err = (i64::from(w) * i64::from(sh) - i64::from(h) * i64::from(sw)).abs();
            let bound = i64::from(sw.max(sh));
            assert!(
                2 * err <= bound || w.min(h) == 1,
                "{sw}x{sh} in {cw}x{ch}: {w}x{h} distorts the aspect ratio"
            );
        }
    }
}

#[test]
fn placements_are_centered() {
    for mode in [ScaleMode::Fit, ScaleMode::Fill] {
        for &(cw, ch) in &[(500, 120), (121, 77), (50, 200)] {
            let p = scale_rect(cw, ch, 1920, 1080, mode);
            assert_centered(p, (cw, ch));
        }
    }
}

#[test]
fn repeated_layout_is_stable() {
    let first = scale_rect(437, 119, 1920, 1080, ScaleMode::Fit);
    let second = scale_rect(437, 119, 1920, 1080, ScaleMode::Fit);
    assert_eq!(first, second);
}

#[test]
fn zero_sized_inputs_produce_a_pixel() {
    let p = scale_rect(0, 0, 0, 0, ScaleMode::Fit);
    assert_eq!((p.width, p.height), (1, 1));
}
