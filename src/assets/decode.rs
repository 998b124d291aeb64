use std::path::Path;

use anyhow::Context;

use crate::assets::media::has_extension_in;
use crate::foundation::core::Canvas;
use crate::foundation::error::{PipelineError, PipelineResult};

/// Still-image types accepted as a background (lowercase extensions).
pub const ACCEPTED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Return `true` when `path` has an accepted image extension (case-insensitive).
pub fn is_accepted_image(path: &Path) -> bool {
    has_extension_in(path, ACCEPTED_IMAGE_EXTENSIONS)
}

/// Decode encoded image bytes and scale them to exactly fill `canvas`.
///
/// The image is stretched, never cropped, so the aspect ratio follows the canvas.
pub fn decode_image_to_canvas(bytes: &[u8], canvas: Canvas) -> PipelineResult<image::RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode background image from memory")?;
    let rgba = dyn_img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(PipelineError::validation("background image has zero size"));
    }
    if rgba.dimensions() == (canvas.width, canvas.height) {
        return Ok(rgba);
    }
    Ok(image::imageops::resize(
        &rgba,
        canvas.width,
        canvas.height,
        image::imageops::FilterType::Triangle,
    ))
}

/// Read `source`, scale to `canvas`, and write the result as PNG to `dest`.
pub fn prepare_background_png(source: &Path, canvas: Canvas, dest: &Path) -> PipelineResult<()> {
    let bytes = std::fs::read(source)
        .with_context(|| format!("read background image '{}'", source.display()))?;
    let scaled = decode_image_to_canvas(&bytes, canvas)?;
    scaled
        .save_with_format(dest, image::ImageFormat::Png)
        .with_context(|| format!("write scaled background '{}'", dest.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
