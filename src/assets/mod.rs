//! Input asset handling: audio probing/decoding, background images, colors, text.

pub mod color;
pub mod decode;
pub mod media;
pub mod text;
