use crate::foundation::core::Canvas;
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::foundation::math::unpremultiply_rgba8;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**, matching what `vello_cpu` and `tiny_skia` produce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl RasterFrame {
    /// Fully transparent frame of `canvas` size.
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.rgba_len()],
        }
    }

    /// Wrap premultiplied bytes, checking that the length matches `canvas`.
    pub fn from_premul(canvas: Canvas, data: Vec<u8>) -> PipelineResult<Self> {
        if data.len() != canvas.rgba_len() {
            return Err(PipelineError::encode(format!(
                "raster byte length {} does not match {}x{} rgba8",
                data.len(),
                canvas.width,
                canvas.height
            )));
        }
        Ok(Self {
            width: canvas.width,
            height: canvas.height,
            data,
        })
    }

    /// Canvas this frame was rendered for.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// `true` when every pixel has zero alpha.
    pub fn is_fully_transparent(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Convert to a straight-alpha image for PNG output.
    pub fn to_straight_image(&self) -> PipelineResult<image::RgbaImage> {
        let mut straight = vec![0u8; self.data.len()];
        unpremultiply_rgba8(&mut straight, &self.data);
        image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| PipelineError::encode("raster buffer does not match its dimensions"))
    }
}
