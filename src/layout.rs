//! Post content and its placement on the og:image canvas.

pub mod post;
pub mod text;

use serde::{Deserialize, Serialize};

/// Text fields of the post being composed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostContent {
    /// Post title, rendered on one line in the title face.
    pub title: String,
    /// Post body, wrapped and clamped in the regular face.
    pub body: String,
}

impl PostContent {
    /// Content with both fields set.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// `true` when the title has visible characters.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// `true` when the body has visible characters.
    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }

    /// `true` when anything needs glyphs.
    pub fn has_text(&self) -> bool {
        self.has_title() || self.has_body()
    }
}

/// Source region `(x, y, w, h)` of a `src_w`x`src_h` image that, scaled uniformly, covers a
/// `dst_w`x`dst_h` box. The region is centered and keeps the box aspect ratio.
pub fn cover_crop(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32, u32, u32) {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return (0, 0, src_w, src_h);
    }
    let scale = (f64::from(dst_w) / f64::from(src_w)).max(f64::from(dst_h) / f64::from(src_h));
    let w = (f64::from(dst_w) / scale).round().clamp(1.0, f64::from(src_w)) as u32;
    let h = (f64::from(dst_h) / scale).round().clamp(1.0, f64::from(src_h)) as u32;
    ((src_w - w) / 2, (src_h - h) / 2, w, h)
}

#[cfg(test)]
#[path = "../tests/unit/layout/content.rs"]
mod tests;
