//! Error taxonomy.

/// Convenience result type used across the preview pipeline.
pub type PreviewResult<T> = Result<T, PreviewError>;

/// Failures while extracting dominant colors from a source image.
///
/// These never reach the end user: the pipeline degrades to an empty gradient.
#[derive(thiserror::Error, Debug)]
pub enum SampleError {
    /// The encoded bytes could not be decoded as a raster image.
    #[error("sample error: undecodable image: {0}")]
    Decode(String),

    /// The image decoded, but no pixel was opaque enough to be counted.
    #[error("sample error: image has no readable pixels")]
    NoPixels,

    /// The background sampling task died before producing a result.
    #[error("sample error: worker failed: {0}")]
    Worker(String),

    /// The image was removed or replaced before sampling finished.
    #[error("sample error: image was replaced before sampling finished")]
    Superseded,
}

/// Failures while painting the post layout into an off-screen surface.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    /// Text needs glyphs but no usable font could be loaded.
    #[error("render error: font unavailable: {0}")]
    FontUnavailable(String),

    /// Requested surface dimensions are zero or exceed the rasterizer limits.
    #[error("render error: unsupported surface size {width}x{height}")]
    UnsupportedSize {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// Text shaping or layout failed.
    #[error("render error: layout failed: {0}")]
    Layout(String),

    /// The rasterizer could not produce the surface.
    #[error("render error: rasterizer failed: {0}")]
    Rasterizer(String),
}

/// Failures while normalizing and encoding the rendered surface.
#[derive(thiserror::Error, Debug)]
pub enum CompositeError {
    /// The surface has a zero dimension or no pixel data.
    #[error("composite error: empty surface ({width}x{height})")]
    EmptySurface {
        /// Surface width in pixels.
        width: u32,
        /// Surface height in pixels.
        height: u32,
    },

    /// Pixel buffer length does not match the declared dimensions.
    #[error("composite error: invalid surface: {0}")]
    InvalidSurface(String),

    /// The image encoder rejected the target raster.
    #[error("composite error: encode failed: {0}")]
    Encode(String),
}

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum PreviewError {
    /// Color sampling failed.
    #[error(transparent)]
    Sample(#[from] SampleError),

    /// Layout rendering failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Compositing or encoding failed.
    #[error(transparent)]
    Composite(#[from] CompositeError),

    /// Invalid user-provided configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PreviewError {
    /// Build a [`PreviewError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl RenderError {
    pub(crate) fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    pub(crate) fn rasterizer(msg: impl Into<String>) -> Self {
        Self::Rasterizer(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
