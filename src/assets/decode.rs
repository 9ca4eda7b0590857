//! Decoding user images into straight-alpha RGBA8.

use std::sync::Arc;

use crate::foundation::error::SampleError;

/// User-supplied raster image: the encoded bytes plus the decoded straight-alpha RGBA8 buffer.
///
/// Handles are shared as `Arc<SourceImage>`; the pipeline drops its reference when the image is
/// removed or replaced, and in-flight renders keep their own reference until they finish.
#[derive(Clone)]
pub struct SourceImage {
    encoded: Arc<[u8]>,
    pixels: image::RgbaImage,
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("encoded_len", &self.encoded.len())
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .finish()
    }
}

impl SourceImage {
    /// Decode encoded image bytes (any format enabled in the `image` crate).
    pub fn decode(bytes: impl Into<Arc<[u8]>>) -> Result<Self, SampleError> {
        let encoded = bytes.into();
        let dyn_img = image::load_from_memory(&encoded)
            .map_err(|e| SampleError::Decode(e.to_string()))?;
        let pixels = dyn_img.to_rgba8();
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(SampleError::NoPixels);
        }
        Ok(Self { encoded, pixels })
    }

    /// Wrap an already-decoded buffer, e.g. one produced by the UI's own decoder.
    pub fn from_rgba(pixels: image::RgbaImage) -> Result<Self, SampleError> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(SampleError::NoPixels);
        }
        Ok(Self {
            encoded: Arc::from(Vec::<u8>::new()),
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Original encoded bytes (empty when constructed from raw pixels).
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// Decoded straight-alpha pixels.
    pub fn rgba(&self) -> &image::RgbaImage {
        &self.pixels
    }
}

/// Premultiply straight-alpha RGBA8 in place, rounding to nearest.
pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Inverse of [`premultiply_rgba8_in_place`]; fully transparent pixels stay black.
pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
