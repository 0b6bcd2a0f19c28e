use layer_preview::gpu::preview::{MINIMUM_SIZE_HINT, SIZE_HINT};
use layer_preview::gpu::quad::{INDICES_PER_QUAD, ScreenQuad, index_byte_offset, index_range};
use layer_preview::gpu::{
    LayerPreview, LayerSlot, LayeredQuadPreview, PreviewState, PreviewSurface, SLOT_COUNT,
    TextureHandle,
};
use layer_preview::PreviewError;

fn handle(raw: u64) -> Option<TextureHandle> {
    TextureHandle::from_raw(raw)
}

#[test]
fn geometry_tiles_the_viewport() {
    let quad = ScreenQuad::new(SLOT_COUNT);
    assert_eq!(quad.quad_count(), 3);
    assert_eq!(quad.positions.len(), 12);
    assert_eq!(quad.tex_coords.len(), 12);
    assert_eq!(quad.indices.len(), 18);

    // left edge of the first quad and right edge of the last one
    assert_eq!(quad.positions[0], [-1.0, -1.0, 0.0]);
    assert!((quad.positions[9][0] - 1.0).abs() < 1e-6);
    // neighbouring quads share an edge
    assert!((quad.positions[1][0] - quad.positions[4][0]).abs() < 1e-6);
}

#[test]
fn indices_stay_within_their_quad() {
    let quad = ScreenQuad::new(4);
    for slot in 0..4 {
        let range = index_range(slot);
        assert_eq!(range.len() as u32, INDICES_PER_QUAD);
        let first_vertex = slot as u32 * 4;
        for &i in &quad.indices[range.start as usize..range.end as usize] {
            assert!((first_vertex..first_vertex + 4).contains(&i));
        }
    }
    assert_eq!(index_byte_offset(2), 48);
}

#[test]
fn single_slot_draws_its_own_range() {
    for k in 0..SLOT_COUNT {
        let mut preview = LayerPreview::new();
        preview.set_texture(k, handle(42)).unwrap();
        let plan: Vec<_> = preview.draw_plan().collect();
        let start = 6 * k as u32;
        assert_eq!(plan, vec![(k, start..start + 6)]);
    }
}

#[test]
fn empty_slots_draw_nothing() {
    let mut preview = LayerPreview::new();
    assert_eq!(preview.draw_plan().count(), 0);

    preview.set_layer(LayerSlot::Foreground, handle(5));
    preview.set_layer(LayerSlot::Foreground, None);
    assert_eq!(preview.draw_plan().count(), 0);
}

#[test]
fn draw_plan_follows_slot_order() {
    let mut preview = LayeredQuadPreview::<4>::new();
    preview.set_texture(3, handle(1)).unwrap();
    preview.set_texture(0, handle(2)).unwrap();
    preview.set_texture(2, handle(3)).unwrap();
    let slots: Vec<_> = preview.draw_plan().map(|(slot, _)| slot).collect();
    assert_eq!(slots, vec![0, 2, 3]);
}

#[test]
fn out_of_range_slot_leaves_state_untouched() {
    let mut preview = LayerPreview::new();
    let err = preview.set_texture(SLOT_COUNT, handle(1)).unwrap_err();
    assert!(matches!(err, PreviewError::SlotOutOfRange { slot: 3, count: 3 }));
    assert_eq!(preview.draw_plan().count(), 0);
}

#[test]
fn set_texture_requests_redraw() {
    let mut preview = LayerPreview::new();
    preview.set_texture(1, handle(8)).unwrap();
    assert!(preview.take_redraw_request());
    assert!(!preview.take_redraw_request());
    assert_eq!(preview.texture(1), handle(8));
}

#[test]
fn starts_disabled_with_size_hints() {
    let mut preview = LayerPreview::new();
    assert!(!preview.is_enabled());
    assert_eq!(LayerPreview::size_hint(), SIZE_HINT);
    assert_eq!(LayerPreview::minimum_size_hint(), MINIMUM_SIZE_HINT);
    assert_eq!(SIZE_HINT, (500, 120));
    assert_eq!(MINIMUM_SIZE_HINT, (360, 120));

    preview.set_enabled(true);
    assert!(preview.is_enabled());
    assert!(preview.take_redraw_request());
}

#[test]
fn resize_tracks_viewport_and_aspect() {
    let mut preview = LayerPreview::new();
    preview.resize(500, 120);
    assert_eq!(preview.viewport(), (500, 120));
    assert!((preview.aspect_ratio() - 500.0 / 120.0).abs() < 1e-6);

    // zero height does not divide by zero
    preview.resize(10, 0);
    assert!(preview.aspect_ratio().is_finite());
}

#[test]
fn teardown_without_initialize_disposes() {
    let mut preview = LayerPreview::new();
    preview.set_layer(LayerSlot::Background, handle(1));
    preview.teardown();
    assert_eq!(preview.state(), PreviewState::Disposed);
    // a second teardown is harmless
    preview.teardown();
    assert_eq!(preview.state(), PreviewState::Disposed);
}
