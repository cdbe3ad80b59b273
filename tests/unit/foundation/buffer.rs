use super::*;

#[test]
fn from_raw_rejects_wrong_length() {
    assert!(PixelBuffer::from_raw(2, 2, vec![0u8; 16]).is_ok());
    let err = PixelBuffer::from_raw(2, 2, vec![0u8; 15]).unwrap_err();
    assert!(matches!(err, SkyError::Validation(_)));
}

#[test]
fn get_set_roundtrip_and_row_major_layout() {
    let mut buf = PixelBuffer::new(3, 2).unwrap();
    buf.set(2, 1, Rgba8::new(10, 20, 30, 40)).unwrap();
    assert_eq!(buf.get(2, 1).unwrap(), Rgba8::new(10, 20, 30, 40));

    let i = (3 + 2) * 4;
    assert_eq!(&buf.as_bytes()[i..i + 4], &[10, 20, 30, 40]);
    assert_eq!(buf.get(0, 0).unwrap(), Rgba8::TRANSPARENT);
}

#[test]
fn out_of_range_access_reports_bounds() {
    let mut buf = PixelBuffer::filled(4, 4, Rgba8::rgb(1, 1, 1)).unwrap();
    for (x, y) in [(-1, 0), (0, -1), (4, 0), (0, 4)] {
        assert!(matches!(buf.get(x, y), Err(SkyError::Bounds { .. })));
        assert!(matches!(
            buf.set(x, y, Rgba8::TRANSPARENT),
            Err(SkyError::Bounds { .. })
        ));
    }
    assert!(buf.get(3, 3).is_ok());
}

#[test]
fn clone_is_deep() {
    let base = PixelBuffer::filled(2, 2, Rgba8::rgb(5, 5, 5)).unwrap();
    let mut copy = base.clone();
    copy.set(0, 0, Rgba8::rgb(9, 9, 9)).unwrap();
    assert_eq!(base.get(0, 0).unwrap(), Rgba8::rgb(5, 5, 5));
    assert_ne!(base, copy);
}

#[test]
fn empty_buffer_is_valid() {
    let buf = PixelBuffer::new(0, 7).unwrap();
    assert!(buf.is_empty());
    assert_eq!(buf.pixel_count(), 0);
    assert!(!buf.contains(0, 0));
}
