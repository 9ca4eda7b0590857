//! Off-screen rendering of the post card.

pub mod cpu;

use std::sync::Arc;

use crate::assets::decode::SourceImage;
use crate::foundation::error::RenderError;
use crate::gradient::GradientSpec;
use crate::layout::PostContent;

/// Rendered surface as tightly packed RGBA8 bytes.
#[derive(Clone, Debug)]
pub struct RenderSurface {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Pixel bytes, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Everything a backend needs to paint one card.
#[derive(Clone, Debug, Default)]
pub struct RenderInput {
    /// Title and body text.
    pub content: PostContent,
    /// Background gradient; empty means the renderer's default background.
    pub gradient: GradientSpec,
    /// Attached image, if any.
    pub image: Option<Arc<SourceImage>>,
}

impl RenderInput {
    /// `true` when an image is attached.
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// Paints a [`RenderInput`] into a [`RenderSurface`].
///
/// Implementations are called from blocking worker threads and may be shared between them.
pub trait RenderBackend: Send + Sync {
    /// Render one card.
    fn render(&self, input: &RenderInput) -> Result<RenderSurface, RenderError>;
}
