//! Parley text shaping with width fitting.

use std::borrow::Cow;

use crate::assets::fonts::FontFace;
use crate::foundation::core::Rgb8;
use crate::foundation::error::RenderError;

/// Appended to text that had to be cut to fit.
pub const ELLIPSIS: char = '\u{2026}';

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl TextBrushRgba8 {
    /// Fully opaque brush of color `c`.
    pub fn opaque(c: Rgb8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: 255,
        }
    }
}

/// Text that went through fitting, plus its final layout.
pub struct FittedText {
    /// Text actually laid out (may end with [`ELLIPSIS`]).
    pub text: String,
    /// Shaped layout of `text`.
    pub layout: parley::Layout<TextBrushRgba8>,
    /// `true` when part of the input was dropped.
    pub truncated: bool,
}

/// Builds Parley layouts against exactly one registered face.
///
/// Keeping a single face per engine means the glyph ids in every layout belong to that face,
/// which is what the rasterizer draws with.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
    weight: parley::fontique::FontWeight,
    style: parley::fontique::FontStyle,
}

impl TextLayoutEngine {
    /// Register `face` in a fresh font context.
    pub fn new(face: &FontFace) -> Result<Self, RenderError> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::new(face.bytes.clone()), None);

        let (family_id, info) = families
            .iter()
            .find_map(|(id, fonts)| {
                fonts
                    .iter()
                    .find(|f| f.index() == face.index)
                    .map(|f| (*id, f.clone()))
            })
            .or_else(|| {
                families
                    .first()
                    .and_then(|(id, fonts)| fonts.first().map(|f| (*id, f.clone())))
            })
            .ok_or_else(|| {
                RenderError::FontUnavailable("no font families registered from font bytes".into())
            })?;

        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| RenderError::FontUnavailable("registered font family has no name".into()))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            weight: info.weight(),
            style: info.style(),
        })
    }

    /// Family name the engine shapes with.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape and lay out plain text, wrapping at `max_width_px` when given.
    pub fn layout_plain(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: Option<f32>,
    ) -> Result<parley::Layout<TextBrushRgba8>, RenderError> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(RenderError::layout("text size_px must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(self.weight));
        builder.push_default(parley::style::StyleProperty::FontStyle(self.style));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(max_width_px);
        layout.align(
            max_width_px,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }

    /// Lay out `text` on one line, cutting it with an ellipsis when wider than `max_width_px`.
    ///
    /// Line breaks in the input are folded into spaces.
    pub fn fit_single_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: f32,
    ) -> Result<FittedText, RenderError> {
        let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let layout = self.layout_plain(&flat, size_px, brush, None)?;
        if layout.width() <= max_width_px {
            return Ok(FittedText {
                text: flat,
                layout,
                truncated: false,
            });
        }

        let cut = longest_fitting_prefix(&flat, |candidate| {
            Ok(self.layout_plain(candidate, size_px, brush, None)?.width() <= max_width_px)
        })?;
        let layout = self.layout_plain(&cut, size_px, brush, None)?;
        Ok(FittedText {
            text: cut,
            layout,
            truncated: true,
        })
    }

    /// Wrap `text` at `max_width_px` and keep at most `max_lines` lines, ellipsizing the last one
    /// when text was dropped.
    pub fn fit_lines(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: f32,
        max_lines: usize,
    ) -> Result<FittedText, RenderError> {
        let text = text.trim();
        let layout = self.layout_plain(text, size_px, brush, Some(max_width_px))?;
        if layout.lines().count() <= max_lines {
            return Ok(FittedText {
                text: text.to_owned(),
                layout,
                truncated: false,
            });
        }

        // Nothing past the end of the last kept line can survive.
        let keep_end = layout
            .lines()
            .nth(max_lines.saturating_sub(1))
            .map(|line| line.text_range().end)
            .unwrap_or(text.len());
        let head = &text[..keep_end];

        let cut = longest_fitting_prefix(head, |candidate| {
            Ok(self
                .layout_plain(candidate, size_px, brush, Some(max_width_px))?
                .lines()
                .count()
                <= max_lines)
        })?;
        let layout = self.layout_plain(&cut, size_px, brush, Some(max_width_px))?;
        Ok(FittedText {
            text: cut,
            layout,
            truncated: true,
        })
    }
}

/// Longest `prefix + ELLIPSIS` (cut on char boundaries) accepted by `fits`.
///
/// Falls back to a lone ellipsis when not even one character fits.
fn longest_fitting_prefix(
    text: &str,
    mut fits: impl FnMut(&str) -> Result<bool, RenderError>,
) -> Result<String, RenderError> {
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let candidate = |chars: usize| format!("{}{ELLIPSIS}", text[..bounds[chars]].trim_end());

    let (mut lo, mut hi) = (0usize, bounds.len() - 1);
    while lo < hi {
        let mid = lo + (hi - lo).div_ceil(2);
        if fits(&candidate(mid))? {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(candidate(lo))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/text.rs"]
mod tests;
