/// Convert premultiplied RGBA8 pixels to straight alpha into `dst`.
pub(crate) fn unpremultiply_rgba8(dst: &mut [u8], src_premul: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u32::from(s[3]);
        if a == 0 {
            d.copy_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let un = |c: u8| -> u8 { ((u32::from(c) * 255 + a / 2) / a).min(255) as u8 };
        d[0] = un(s[0]);
        d[1] = un(s[1]);
        d[2] = un(s[2]);
        d[3] = s[3];
    }
}

/// Linear amplitude factor for a gain in decibels.
pub(crate) fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
