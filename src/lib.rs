//! og-preview turns a short text+image post into its social-media preview image.
//!
//! The flow mirrors what a post composer does while the user types:
//!
//! - [`PreviewPipeline::attach`] decodes the image, samples its dominant colors and derives a
//!   135° background [`GradientSpec`]
//! - [`PreviewPipeline::set_content`] updates title and body
//! - [`PreviewPipeline::generate`] renders the card off-screen, normalizes it to the og:image
//!   frame and publishes an [`Artifact`] (PNG plus `data:` URL)
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod assets;
pub mod composite;
pub mod foundation;
pub mod gradient;
pub mod layout;
pub mod pipeline;
pub mod render;
pub mod sample;

pub use assets::decode::SourceImage;
pub use assets::fonts::{FontSource, PostFonts, load_fonts};
pub use composite::Compositor;
pub use composite::artifact::{ARTIFACT_FILE_NAME, Artifact};
pub use foundation::core::{Canvas, OG_HEIGHT, OG_WIDTH, Rgb8};
pub use foundation::error::{
    CompositeError, PreviewError, PreviewResult, RenderError, SampleError,
};
pub use gradient::{GradientSpec, synthesize};
pub use layout::PostContent;
pub use layout::post::LayoutMetrics;
pub use pipeline::meta::OgImageMeta;
pub use pipeline::preview::PreviewPipeline;
pub use pipeline::{
    GenerateOutcome, ImageState, OutputState, PipelineState, PreviewListener, PreviewOpts,
};
pub use render::cpu::{CpuRenderer, CpuRendererOpts};
pub use render::{RenderBackend, RenderInput, RenderSurface};
pub use sample::{ColorSample, ColorSampler, SamplerOpts};
