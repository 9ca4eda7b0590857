//! Normalizing rendered surfaces to the og:image frame and encoding them.

pub mod artifact;

use std::io::Cursor;

use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::composite::artifact::Artifact;
use crate::foundation::core::{OG_HEIGHT, OG_WIDTH, Rgb8};
use crate::foundation::error::CompositeError;
use crate::render::RenderSurface;

/// Copies a rendered surface into the fixed-width og:image frame and encodes it as PNG.
#[derive(Clone, Copy, Debug)]
pub struct Compositor {
    fill: Rgb8,
}

impl Compositor {
    /// Compositor filling any uncovered area with `fill`.
    pub fn new(fill: Rgb8) -> Self {
        Self { fill }
    }

    /// Color used for uncovered pixels.
    pub fn fill(&self) -> Rgb8 {
        self.fill
    }

    /// Place `surface` at 1:1 scale in a `1200 x (630 | surface height)` target and encode it.
    ///
    /// Surface pixels past the target edges are cropped; target pixels the surface does not
    /// reach get the fill color.
    #[tracing::instrument(skip_all, fields(width = surface.width, height = surface.height, has_image))]
    pub fn composite(
        &self,
        surface: &RenderSurface,
        has_image: bool,
    ) -> Result<Artifact, CompositeError> {
        if surface.width == 0 || surface.height == 0 || surface.data.is_empty() {
            return Err(CompositeError::EmptySurface {
                width: surface.width,
                height: surface.height,
            });
        }
        let expected = surface.width as usize * surface.height as usize * 4;
        if surface.data.len() != expected {
            return Err(CompositeError::InvalidSurface(format!(
                "{}x{} surface has {} bytes, expected {expected}",
                surface.width,
                surface.height,
                surface.data.len()
            )));
        }

        let width = OG_WIDTH;
        let height = if has_image { OG_HEIGHT } else { surface.height };

        let mut target = self.fill.to_rgba8().repeat(width as usize * height as usize);
        let copy_w = surface.width.min(width) as usize * 4;
        let src_stride = surface.width as usize * 4;
        let dst_stride = width as usize * 4;
        for y in 0..surface.height.min(height) as usize {
            let src = &surface.data[y * src_stride..y * src_stride + copy_w];
            target[y * dst_stride..y * dst_stride + copy_w].copy_from_slice(src);
        }
        if surface.premultiplied {
            unpremultiply_rgba8_in_place(&mut target);
        }

        let raster = image::RgbaImage::from_raw(width, height, target).ok_or_else(|| {
            CompositeError::InvalidSurface("target buffer does not match its size".into())
        })?;
        let mut png = Vec::new();
        raster
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| CompositeError::Encode(e.to_string()))?;

        tracing::debug!(width, height, png_bytes = png.len(), "encoded artifact");
        Ok(Artifact::from_png(width, height, png))
    }
}

#[cfg(test)]
#[path = "../tests/unit/composite/compositor.rs"]
mod tests;
