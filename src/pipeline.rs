//! Orchestration of sampling, rendering and compositing for the post preview.

pub mod meta;
pub mod preview;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::composite::artifact::Artifact;
use crate::foundation::error::{PreviewError, PreviewResult};
use crate::gradient::GradientSpec;
use crate::render::cpu::CpuRendererOpts;
use crate::sample::SamplerOpts;

/// Options for [`preview::PreviewPipeline`], loadable from JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewOpts {
    /// Dominant-color extraction.
    pub sampler: SamplerOpts,
    /// Card rendering.
    pub renderer: CpuRendererOpts,
}

impl PreviewOpts {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> PreviewResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| PreviewError::config(format!("invalid preview options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Validate every section.
    pub fn validate(&self) -> PreviewResult<()> {
        self.sampler.validate()?;
        self.renderer.validate()
    }
}

/// Image side of the pipeline state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageState {
    /// No image attached.
    Idle,
    /// Image attached; its gradient is empty or still being sampled.
    ImageAttached,
    /// Image attached and a gradient derived from it.
    GradientReady,
}

/// Output side of the pipeline state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputState {
    /// Nothing generated yet.
    Empty,
    /// At least one generate request is running.
    Generating,
    /// An artifact is published and nothing is running.
    ArtifactReady,
}

/// Snapshot of both state machines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
    /// Image side.
    pub image: ImageState,
    /// Output side.
    pub output: OutputState,
}

/// Result of one generate request.
#[derive(Clone, Debug)]
pub enum GenerateOutcome {
    /// The artifact was published as the current one.
    Current(Arc<Artifact>),
    /// A newer request published first; this result was dropped.
    Superseded {
        /// Sequence number of the dropped request.
        sequence: u64,
    },
}

impl GenerateOutcome {
    /// Published artifact, if this request won.
    pub fn artifact(&self) -> Option<&Arc<Artifact>> {
        match self {
            Self::Current(a) => Some(a),
            Self::Superseded { .. } => None,
        }
    }

    /// `true` when the artifact was published.
    pub fn is_current(&self) -> bool {
        matches!(self, Self::Current(_))
    }
}

/// Observer for pipeline publications, e.g. the page that owns the og:image meta tags.
pub trait PreviewListener: Send + Sync {
    /// A new artifact became the page's social-preview image.
    fn artifact_ready(&self, artifact: &Arc<Artifact>);

    /// The stored gradient changed (empty when cleared).
    fn gradient_changed(&self, _gradient: &GradientSpec) {}
}

#[cfg(test)]
#[path = "../tests/unit/pipeline/opts.rs"]
mod tests;
