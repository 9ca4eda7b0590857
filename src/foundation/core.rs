//! Colors, canvas sizes and og:image constants.

use crate::foundation::error::RenderError;

pub use kurbo::{Point, Rect, Vec2};

/// Canonical og:image width in pixels.
pub const OG_WIDTH: u32 = 1200;
/// Canonical og:image height in pixels, used whenever the post carries an image.
pub const OG_HEIGHT: u32 = 630;

/// One sRGB color with 8-bit channels.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Construct a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Add `delta` to every channel, clamping each one independently to `[0, 255]`.
    pub fn offset(self, delta: i16) -> Self {
        fn ch(c: u8, delta: i16) -> u8 {
            (i16::from(c) + delta).clamp(0, 255) as u8
        }
        Self::new(ch(self.r, delta), ch(self.g, delta), ch(self.b, delta))
    }

    /// Channel-wise mean of two colors, rounding halves up.
    pub fn midpoint(self, other: Self) -> Self {
        fn ch(a: u8, b: u8) -> u8 {
            ((u16::from(a) + u16::from(b) + 1) / 2) as u8
        }
        Self::new(
            ch(self.r, other.r),
            ch(self.g, other.g),
            ch(self.b, other.b),
        )
    }

    /// Integer Rec. 601 luma, used to order colors from light to dark.
    pub fn luma(self) -> u32 {
        (299 * u32::from(self.r) + 587 * u32::from(self.g) + 114 * u32::from(self.b)) / 1000
    }

    /// Channels as an array.
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Opaque RGBA bytes (identical in straight and premultiplied form).
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// `#rrggbb` representation.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from(v: [u8; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Pixel dimensions of a raster surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas that the CPU rasterizer can allocate (non-zero, each side <= `u16::MAX`).
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 || width > u32::from(u16::MAX) || height > u32::from(u16::MAX)
        {
            return Err(RenderError::UnsupportedSize { width, height });
        }
        Ok(Self { width, height })
    }

    /// Size as `u16` pair, as expected by `vello_cpu`.
    pub fn as_u16(self) -> (u16, u16) {
        (self.width as u16, self.height as u16)
    }

    /// Tightly-packed RGBA8 byte length.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// Full canvas rectangle anchored at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
