use super::*;

fn params(wi: f32, wt: f32, bi: f32, bt: f32) -> ColorGradeParams {
    ColorGradeParams {
        white_intensity: wi,
        white_threshold: wt,
        blue_intensity: bi,
        blue_threshold: bt,
    }
}

fn gradient(width: u32, height: u32) -> PixelBuffer {
    let mut bytes = Vec::with_capacity((width * height * 4) as usize);
    for i in 0..width * height {
        let v = (i * 37 % 256) as u8;
        bytes.extend_from_slice(&[v, v.wrapping_mul(3), 255 - v, (i * 11 % 256) as u8]);
    }
    PixelBuffer::from_raw(width, height, bytes).unwrap()
}

#[test]
fn preserves_dimensions_and_alpha() {
    let input = gradient(13, 7);
    for p in [
        ColorGradeParams::default(),
        params(0.3, 0.2, 0.8, 0.15),
        params(1.0, 0.0, 1.0, 1.0),
    ] {
        let out = apply_color_grade(&input, &p).unwrap();
        assert_eq!((out.width(), out.height()), (input.width(), input.height()));
        for (a, b) in input.as_bytes().chunks_exact(4).zip(out.as_bytes().chunks_exact(4)) {
            assert_eq!(a[3], b[3]);
        }
    }
}

#[test]
fn zero_intensity_is_identity_and_idempotent() {
    let input = gradient(9, 9);
    let p = params(0.0, 0.5, 0.0, 0.1);
    let once = apply_color_grade(&input, &p).unwrap();
    let twice = apply_color_grade(&once, &p).unwrap();
    assert_eq!(once, input);
    assert_eq!(twice, input);
    assert_eq!(apply_color_grade(&input, &ColorGradeParams::neutral()).unwrap(), input);
}

#[test]
fn white_stays_white() {
    let input = PixelBuffer::filled(10, 10, Rgba8::new(255, 255, 255, 255)).unwrap();
    let out = apply_color_grade(&input, &params(1.0, 0.5, 1.0, 0.1)).unwrap();
    assert_eq!(out, input);
}

#[test]
fn black_turns_blue() {
    let input = PixelBuffer::filled(10, 10, Rgba8::new(0, 0, 0, 255)).unwrap();
    let out = apply_color_grade(&input, &params(1.0, 0.5, 1.0, 0.3)).unwrap();
    for px in out.as_bytes().chunks_exact(4) {
        assert_eq!(px, &[0, 0, 255, 255]);
    }
}

#[test]
fn mid_tones_are_untouched() {
    let px = Rgba8::new(100, 100, 100, 200);
    assert_eq!(grade_pixel(px, &ColorGradeParams::default()), px);
}

#[test]
fn partial_whitening_moves_fraction_of_distance() {
    // brightness 0.75, threshold 0.5 -> amt 0.5
    let px = Rgba8::new(191, 191, 192, 255);
    let out = grade_pixel(px, &params(1.0, 0.5, 0.0, 0.1));
    assert!(out.r > 191 && out.r < 255);
    assert_eq!(out.a, 255);

    let half = grade_pixel(px, &params(0.5, 0.5, 0.0, 0.1));
    assert!(half.r > 191 && half.r < out.r);
}

#[test]
fn invalid_params_are_rejected() {
    let input = gradient(2, 2);
    assert!(apply_color_grade(&input, &params(1.5, 0.5, 1.0, 0.1)).is_err());
    assert!(apply_color_grade(&input, &params(1.0, f32::NAN, 1.0, 0.1)).is_err());
}
