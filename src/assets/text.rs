use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::render::backend::RasterFrame;

/// Styling of the text overlay layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size_px: f32,
    /// Font family stack passed to the SVG text engine.
    pub font_family: String,
    /// Extra font file to register next to the system fonts.
    pub font_file: Option<PathBuf>,
    /// Glyph fill color.
    pub fill: Rgb8,
    /// Glyph outline color.
    pub stroke: Rgb8,
    /// Glyph outline width in pixels; `0` disables the outline.
    pub stroke_width_px: f32,
    /// Top of the text box as a fraction of canvas height.
    pub top_ratio: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size_px: 50.0,
            font_family: "sans-serif".to_owned(),
            font_file: None,
            fill: Rgb8::WHITE,
            stroke: Rgb8::BLACK,
            stroke_width_px: 1.0,
            top_ratio: 0.05,
        }
    }
}

impl TextStyle {
    pub(crate) fn validate(&self) -> PipelineResult<()> {
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(PipelineError::validation(
                "text font_size_px must be finite and > 0",
            ));
        }
        if !self.stroke_width_px.is_finite() || self.stroke_width_px < 0.0 {
            return Err(PipelineError::validation(
                "text stroke_width_px must be finite and >= 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.top_ratio) {
            return Err(PipelineError::validation("text top_ratio must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Rasterize `text` horizontally centred near the top of a transparent canvas.
pub fn render_text_layer(text: &str, style: &TextStyle, canvas: Canvas) -> PipelineResult<RasterFrame> {
    style.validate()?;
    let svg = text_svg(text, style, canvas);

    let fontdb = build_fontdb(style);
    if fontdb.faces().next().is_none() {
        tracing::warn!("no fonts available; text overlay will be blank");
    }
    let opts = usvg::Options {
        fontdb,
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(svg.as_bytes(), &opts).context("parse text overlay svg")?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
        .ok_or_else(|| PipelineError::validation("failed to allocate text overlay pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    RasterFrame::from_premul(canvas, pixmap.data().to_vec())
}

fn text_svg(text: &str, style: &TextStyle, canvas: Canvas) -> String {
    let w = canvas.width;
    let h = canvas.height;
    let size = style.font_size_px;
    // Baseline sits roughly one ascent below the requested top edge.
    let baseline = (h as f32) * style.top_ratio + size * 0.8;
    let stroke = if style.stroke_width_px > 0.0 {
        format!(
            r#" stroke="{}" stroke-width="{}" paint-order="stroke""#,
            style.stroke.to_hex(),
            style.stroke_width_px
        )
    } else {
        String::new()
    };
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><text x="{cx}" y="{baseline}" text-anchor="middle" font-family="{family}" font-size="{size}" fill="{fill}"{stroke}>{body}</text></svg>"#,
        cx = f64::from(w) / 2.0,
        family = escape_xml(&style.font_family),
        fill = style.fill.to_hex(),
        body = escape_xml(text),
    )
}

fn build_fontdb(style: &TextStyle) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    if let Some(path) = style.font_file.as_deref()
        && let Err(e) = db.load_font_file(path)
    {
        tracing::warn!(font = %path.display(), "failed to load font file: {e}");
    }
    Arc::new(db)
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() && c != '\t' => {}
            c => out.push(c),
        }
    }
    out
}
