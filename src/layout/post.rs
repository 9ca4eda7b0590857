//! Card geometry: where title, body and image go.

use serde::{Deserialize, Serialize};

use crate::assets::fonts::PostFonts;
use crate::foundation::core::{Canvas, OG_HEIGHT, OG_WIDTH, Point, Rect};
use crate::foundation::error::{PreviewError, PreviewResult, RenderError};
use crate::layout::PostContent;
use crate::layout::text::{TextBrushRgba8, TextLayoutEngine};

/// Geometry of the post card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels when the post carries an image.
    pub image_height: u32,
    /// Inset between the canvas edge and any content.
    pub padding_px: f32,
    /// Title font size.
    pub title_size_px: f32,
    /// Body font size.
    pub body_size_px: f32,
    /// Vertical space between title and body.
    pub block_gap_px: f32,
    /// Vertical space between the text and the image box.
    pub image_gap_px: f32,
    /// Body lines kept before ellipsizing.
    pub body_max_lines: usize,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            width: OG_WIDTH,
            image_height: OG_HEIGHT,
            padding_px: 64.0,
            title_size_px: 64.0,
            body_size_px: 36.0,
            block_gap_px: 24.0,
            image_gap_px: 32.0,
            body_max_lines: 2,
        }
    }
}

impl LayoutMetrics {
    /// Reject metrics that cannot produce a drawable card.
    pub fn validate(&self) -> PreviewResult<()> {
        Canvas::new(self.width, self.image_height).map_err(PreviewError::from)?;
        let lengths = [
            ("padding_px", self.padding_px),
            ("block_gap_px", self.block_gap_px),
            ("image_gap_px", self.image_gap_px),
        ];
        for (name, v) in lengths {
            if !v.is_finite() || v < 0.0 {
                return Err(PreviewError::config(format!("{name} must be finite and >= 0")));
            }
        }
        for (name, v) in [
            ("title_size_px", self.title_size_px),
            ("body_size_px", self.body_size_px),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(PreviewError::config(format!("{name} must be finite and > 0")));
            }
        }
        if self.padding_px * 2.0 >= self.width as f32 {
            return Err(PreviewError::config("padding_px leaves no room for content"));
        }
        if self.body_max_lines == 0 {
            return Err(PreviewError::config("body_max_lines must be >= 1"));
        }
        Ok(())
    }

    /// Width available to text.
    pub fn content_width(&self) -> f32 {
        self.width as f32 - 2.0 * self.padding_px
    }
}

/// Which face a text block is shaped and drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceRole {
    /// Bold title face.
    Title,
    /// Regular body face.
    Body,
}

/// One positioned text block.
pub struct TextBlock {
    /// Face the glyphs belong to.
    pub role: FaceRole,
    /// Text as laid out, after folding and ellipsizing.
    pub text: String,
    /// `true` when the source text was cut.
    pub truncated: bool,
    /// Top-left corner of the layout on the canvas.
    pub origin: Point,
    /// Shaped layout.
    pub layout: parley::Layout<TextBrushRgba8>,
}

impl TextBlock {
    /// Layout height in pixels.
    pub fn height(&self) -> f64 {
        f64::from(self.layout.height())
    }
}

/// Shaping engines for the two faces of the card.
pub struct PostTextEngines {
    title: TextLayoutEngine,
    body: TextLayoutEngine,
}

impl PostTextEngines {
    /// Build one engine per face.
    pub fn new(fonts: &PostFonts) -> Result<Self, RenderError> {
        Ok(Self {
            title: TextLayoutEngine::new(&fonts.title)?,
            body: TextLayoutEngine::new(&fonts.regular)?,
        })
    }
}

/// Placement of every element on the canvas.
///
/// Title and body stack top-down from the padding. With an image the canvas is
/// `width x image_height` and the image box fills what the text leaves, otherwise the canvas
/// shrinks to the text plus padding.
pub struct PostLayout {
    /// Final surface size.
    pub canvas: Canvas,
    /// Title block, absent when the title is blank.
    pub title: Option<TextBlock>,
    /// Body block, absent when the body is blank.
    pub body: Option<TextBlock>,
    /// Area the image is drawn into, absent without an image or when text leaves no room.
    pub image_box: Option<Rect>,
}

impl PostLayout {
    /// Lay out `content` on the card.
    ///
    /// `engines` may be `None` only when the content has no text.
    pub fn compute(
        content: &PostContent,
        has_image: bool,
        metrics: &LayoutMetrics,
        engines: Option<&mut PostTextEngines>,
        brush: TextBrushRgba8,
    ) -> Result<Self, RenderError> {
        let pad = f64::from(metrics.padding_px);
        let mut title = None;
        let mut body = None;

        if content.has_text() {
            let engines = engines.ok_or_else(|| {
                RenderError::FontUnavailable("post has text but no font was loaded".into())
            })?;
            let max_w = metrics.content_width();

            if content.has_title() {
                let fitted = engines.title.fit_single_line(
                    &content.title,
                    metrics.title_size_px,
                    brush,
                    max_w,
                )?;
                title = Some(TextBlock {
                    role: FaceRole::Title,
                    text: fitted.text,
                    truncated: fitted.truncated,
                    origin: Point::new(pad, pad),
                    layout: fitted.layout,
                });
            }

            if content.has_body() {
                let top = match &title {
                    Some(t) => t.origin.y + t.height() + f64::from(metrics.block_gap_px),
                    None => pad,
                };
                let fitted = engines.body.fit_lines(
                    &content.body,
                    metrics.body_size_px,
                    brush,
                    max_w,
                    metrics.body_max_lines,
                )?;
                body = Some(TextBlock {
                    role: FaceRole::Body,
                    text: fitted.text,
                    truncated: fitted.truncated,
                    origin: Point::new(pad, top),
                    layout: fitted.layout,
                });
            }
        }

        let text_bottom = [&title, &body]
            .into_iter()
            .flatten()
            .map(|b| b.origin.y + b.height())
            .fold(pad, f64::max);
        let has_text = title.is_some() || body.is_some();

        let (canvas, image_box) = if has_image {
            let canvas = Canvas::new(metrics.width, metrics.image_height)?;
            let top = if has_text {
                text_bottom + f64::from(metrics.image_gap_px)
            } else {
                pad
            };
            let bottom = f64::from(metrics.image_height) - pad;
            let image_box = (bottom - top >= 1.0)
                .then(|| Rect::new(pad, top, f64::from(metrics.width) - pad, bottom));
            (canvas, image_box)
        } else {
            let natural = (text_bottom + pad).ceil() as u32;
            (Canvas::new(metrics.width, natural)?, None)
        };

        Ok(Self {
            canvas,
            title,
            body,
            image_box,
        })
    }

    /// Blocks in paint order.
    pub fn blocks(&self) -> impl Iterator<Item = &TextBlock> {
        self.title.iter().chain(self.body.iter())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/post.rs"]
mod tests;
