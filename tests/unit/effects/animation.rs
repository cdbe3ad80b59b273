use super::*;

const DARK: Rgba8 = Rgba8::rgb(20, 30, 40);
const LIGHT: Rgba8 = Rgba8::new(250, 240, 230, 200);

fn single_light(width: u32, height: u32, x: i64, y: i64) -> PixelBuffer {
    let mut buf = PixelBuffer::filled(width, height, DARK).unwrap();
    buf.set(x, y, LIGHT).unwrap();
    buf
}

fn cfg(animation: AnimationType, percent: f64) -> EffectConfig {
    EffectConfig {
        animation,
        light_object_threshold_percent: percent,
        ..EffectConfig::default()
    }
}

fn fill_with_alpha(a: u8) -> Rgba8 {
    Rgba8::new(FILL_RGB[0], FILL_RGB[1], FILL_RGB[2], a)
}

#[test]
fn light_fraction_counts_strictly_above_threshold() {
    let mut buf = PixelBuffer::filled(2, 2, DARK).unwrap();
    buf.set(0, 0, Rgba8::rgb(201, 201, 201)).unwrap();
    buf.set(1, 0, Rgba8::rgb(200, 255, 255)).unwrap();
    assert_eq!(light_fraction(&buf, 200), 0.25);
    assert!(dominates(&buf, 200, 25.0));
    assert!(!dominates(&buf, 200, 26.0));
}

#[test]
fn no_light_pixels_returns_borrowed_input() {
    let buf = PixelBuffer::filled(10, 10, DARK).unwrap();
    for animation in [AnimationType::Shake, AnimationType::Carousel] {
        let out = apply_animation(&buf, FrameIndex(7), &cfg(animation, 5.0)).unwrap();
        match out {
            Cow::Borrowed(b) => assert!(std::ptr::eq(b, &buf)),
            Cow::Owned(_) => panic!("animation should not fire"),
        }
    }
}

#[test]
fn disabled_animation_and_empty_buffer_never_fire() {
    let buf = single_light(4, 4, 1, 1);
    let out = apply_animation(&buf, FrameIndex(3), &cfg(AnimationType::None, 0.0)).unwrap();
    assert!(matches!(out, Cow::Borrowed(_)));

    let empty = PixelBuffer::new(0, 0).unwrap();
    let out = apply_animation(&empty, FrameIndex(3), &cfg(AnimationType::Shake, 0.0)).unwrap();
    assert!(matches!(out, Cow::Borrowed(_)));
}

#[test]
fn shake_offset_is_rounded_and_bounded() {
    assert_eq!(shake_offset(FrameIndex(0)), (4, 3));
    for f in 0..500 {
        let (tx, ty) = shake_offset(FrameIndex(f));
        assert!((-5..=5).contains(&tx) && (-5..=5).contains(&ty));
    }
}

#[test]
fn shake_moves_single_light_pixel() {
    let (w, h, sx, sy) = (10u32, 10u32, 5i64, 5i64);
    let buf = single_light(w, h, sx, sy);
    for f in 0..=120 {
        let frame = FrameIndex(f);
        let out = apply_animation(&buf, frame, &cfg(AnimationType::Shake, 0.5))
            .unwrap()
            .into_owned();
        let (tx, ty) = shake_offset(frame);
        let dx = (sx + tx).clamp(0, i64::from(w) - 1);
        let dy = (sy + ty).clamp(0, i64::from(h) - 1);
        assert_eq!(out.get(sx, sy).unwrap(), fill_with_alpha(LIGHT.a), "frame {f}");
        if (dx, dy) != (sx, sy) {
            assert_eq!(out.get(dx, dy).unwrap(), LIGHT, "frame {f}");
        }
    }
}

#[test]
fn shake_clamps_at_edges() {
    let buf = single_light(3, 3, 2, 2);
    // frame 0 shifts by (+4, +3): destination clamps to the corner it started in
    let out = apply_shake(&buf, FrameIndex(0), 200).unwrap();
    assert_eq!(out.get(2, 2).unwrap(), fill_with_alpha(LIGHT.a));
    for (x, y) in [(0, 0), (1, 1), (2, 1), (1, 2)] {
        assert_eq!(out.get(x, y).unwrap(), DARK);
    }
}

#[test]
fn carousel_moves_single_light_pixel() {
    let (w, h, sx, sy) = (100u32, 4u32, 10i64, 2i64);
    let buf = single_light(w, h, sx, sy);
    for f in 0..=120 {
        let frame = FrameIndex(f);
        let out = apply_animation(&buf, frame, &cfg(AnimationType::Carousel, 0.1))
            .unwrap()
            .into_owned();
        let dx = (sx + (carousel_offset(frame, w) % u64::from(w)) as i64) % i64::from(w);
        assert_eq!(out.get(sx, sy).unwrap(), fill_with_alpha(LIGHT.a), "frame {f}");
        if dx != sx {
            assert_eq!(out.get(dx, sy).unwrap(), LIGHT, "frame {f}");
        }
    }
}

#[test]
fn carousel_full_turn_lands_on_source_and_fills_it() {
    assert_eq!(carousel_offset(FrameIndex(720), 100), 100);
    let buf = single_light(100, 1, 42, 0);
    let out = apply_carousel(&buf, FrameIndex(720), 200).unwrap();
    assert_eq!(out.get(42, 0).unwrap(), fill_with_alpha(LIGHT.a));
    assert_eq!(out.get(41, 0).unwrap(), DARK);
    assert_eq!(out.get(43, 0).unwrap(), DARK);
}

#[test]
fn carousel_frame_zero_fills_light_pixel_in_place() {
    let buf = single_light(100, 1, 10, 0);
    assert_eq!(carousel_offset(FrameIndex(0), 100), 0);
    let out = apply_carousel(&buf, FrameIndex(0), 200).unwrap();
    assert_eq!(out.get(10, 0).unwrap(), Rgba8::new(100, 150, 255, LIGHT.a));
}

#[test]
fn carousel_wraps_past_right_edge() {
    let buf = single_light(100, 1, 99, 0);
    // 144 frames -> offset 20
    assert_eq!(carousel_offset(FrameIndex(144), 100), 20);
    let out = apply_carousel(&buf, FrameIndex(144), 200).unwrap();
    assert_eq!(out.get(19, 0).unwrap(), LIGHT);
    assert_eq!(out.get(99, 0).unwrap(), fill_with_alpha(LIGHT.a));
}

#[test]
fn non_light_pixels_pass_through() {
    let mut buf = single_light(20, 1, 0, 0);
    buf.set(10, 0, Rgba8::rgb(1, 2, 3)).unwrap();
    let out = apply_carousel(&buf, FrameIndex(72), 200).unwrap();
    assert_eq!(out.get(10, 0).unwrap(), Rgba8::rgb(1, 2, 3));
}
