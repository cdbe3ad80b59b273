use super::*;

#[test]
fn pointer_clamps_into_surface() {
    let p = PointerState::clamped(true, -5, 400, 100, 50);
    assert_eq!(p, PointerState { active: true, x: 0, y: 49 });

    let p = PointerState::clamped(true, 10, 10, 0, 0);
    assert_eq!((p.x, p.y), (0, 0));
}

#[test]
fn frame_counter_phase_wraps_on_cycle() {
    let mut c = FrameCounter::new();
    for _ in 0..65 {
        c.advance();
    }
    assert_eq!(c.value(), 65);
    assert_eq!(c.phase(Some(60)), FrameIndex(5));
    assert_eq!(c.phase(None), FrameIndex(65));
    assert_eq!(c.phase(Some(0)), FrameIndex(65));

    c.reset();
    assert_eq!(c.value(), 0);
}

#[test]
fn rgba_slice_conversion() {
    let px = Rgba8::from_slice(&[1, 2, 3, 4, 5]);
    assert_eq!(px, Rgba8::new(1, 2, 3, 4));
    assert_eq!(px.to_array(), [1, 2, 3, 4]);
    assert_eq!(Rgba8::rgb(9, 8, 7).a, 255);
}
