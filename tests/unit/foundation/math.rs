use super::*;

#[test]
fn unpremultiply_keeps_opaque_and_clears_transparent() {
    let src = [200u8, 100, 50, 255, 90, 80, 70, 0];
    let mut back = [1u8; 8];
    unpremultiply_rgba8(&mut back, &src);
    assert_eq!(&back[0..4], &[200, 100, 50, 255]);
    assert_eq!(&back[4..8], &[0, 0, 0, 0]);
}

#[test]
fn unpremultiply_half_alpha() {
    let src = [64u8, 0, 0, 128];
    let mut dst = [0u8; 4];
    unpremultiply_rgba8(&mut dst, &src);
    assert_eq!(dst[3], 128);
    assert!((i32::from(dst[0]) - 128).abs() <= 1);
}

#[test]
fn db_gain() {
    assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
    assert!((db_to_gain(-20.0) - 0.1).abs() < 1e-6);
}
