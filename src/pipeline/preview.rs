//! The stateful preview pipeline.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::assets::decode::SourceImage;
use crate::composite::Compositor;
use crate::composite::artifact::Artifact;
use crate::foundation::error::{PreviewResult, RenderError, SampleError};
use crate::gradient::{GradientSpec, synthesize};
use crate::layout::PostContent;
use crate::pipeline::{
    GenerateOutcome, ImageState, OutputState, PipelineState, PreviewListener, PreviewOpts,
};
use crate::render::cpu::CpuRenderer;
use crate::render::{RenderBackend, RenderInput};
use crate::sample::ColorSampler;

struct Inner {
    content: PostContent,
    image: Option<Arc<SourceImage>>,
    gradient: GradientSpec,
    image_state: ImageState,
    // Bumped on every attach/remove; sampling results from older epochs are dropped.
    image_epoch: u64,
    next_sequence: u64,
    published_sequence: u64,
    in_flight: usize,
    artifact: Option<Arc<Artifact>>,
}

impl Inner {
    fn new() -> Self {
        Self {
            content: PostContent::default(),
            image: None,
            gradient: GradientSpec::empty(),
            image_state: ImageState::Idle,
            image_epoch: 0,
            next_sequence: 0,
            published_sequence: 0,
            in_flight: 0,
            artifact: None,
        }
    }

    /// Store `gradient`, returning it when it differs from the previous one.
    fn replace_gradient(&mut self, gradient: GradientSpec) -> Option<GradientSpec> {
        if self.gradient == gradient {
            return None;
        }
        self.gradient = gradient.clone();
        Some(gradient)
    }

    fn output_state(&self) -> OutputState {
        if self.in_flight > 0 {
            OutputState::Generating
        } else if self.artifact.is_some() {
            OutputState::ArtifactReady
        } else {
            OutputState::Empty
        }
    }
}

struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.in_flight = inner.in_flight.saturating_sub(1);
    }
}

/// Live og:image preview for one post being composed.
///
/// All methods take `&self`; state sits behind a mutex that is never held across an await.
/// Heavy work (decode, sampling, render, encode) runs on tokio's blocking pool, so the pipeline
/// must be driven from inside a tokio runtime.
pub struct PreviewPipeline {
    sampler: Arc<ColorSampler>,
    backend: Arc<dyn RenderBackend>,
    compositor: Compositor,
    listener: Option<Arc<dyn PreviewListener>>,
    announced: Mutex<u64>,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for PreviewPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewPipeline")
            .field("state", &self.state())
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

impl PreviewPipeline {
    /// Pipeline rendering with [`CpuRenderer`].
    pub fn new(opts: PreviewOpts) -> PreviewResult<Self> {
        let renderer = CpuRenderer::new(opts.renderer.clone())?;
        Self::with_backend(opts, Arc::new(renderer))
    }

    /// Pipeline rendering with a caller-provided backend.
    pub fn with_backend(opts: PreviewOpts, backend: Arc<dyn RenderBackend>) -> PreviewResult<Self> {
        opts.validate()?;
        Ok(Self {
            sampler: Arc::new(ColorSampler::new(opts.sampler)?),
            backend,
            compositor: Compositor::new(opts.renderer.background),
            listener: None,
            announced: Mutex::new(0),
            inner: Mutex::new(Inner::new()),
        })
    }

    /// Register the observer for published artifacts and gradient changes.
    pub fn with_listener(mut self, listener: Arc<dyn PreviewListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state of both state machines.
    pub fn state(&self) -> PipelineState {
        let inner = self.lock();
        PipelineState {
            image: inner.image_state,
            output: inner.output_state(),
        }
    }

    /// Current gradient (empty without a sampled image).
    pub fn gradient(&self) -> GradientSpec {
        self.lock().gradient.clone()
    }

    /// Current post text.
    pub fn content(&self) -> PostContent {
        self.lock().content.clone()
    }

    /// Attached image, if any.
    pub fn image(&self) -> Option<Arc<SourceImage>> {
        self.lock().image.clone()
    }

    /// Most recently published artifact.
    pub fn artifact(&self) -> Option<Arc<Artifact>> {
        self.lock().artifact.clone()
    }

    /// Replace the post text. Takes effect for the next [`generate`](Self::generate).
    pub fn set_content(&self, content: PostContent) {
        self.lock().content = content;
    }

    /// Attach a new image, replacing any previous one, and derive its gradient.
    ///
    /// The previous image and gradient are released as soon as the call starts, even if the new
    /// bytes then fail to decode.
    ///
    /// Errors are informational: on a sampling failure the image stays attached with an empty
    /// gradient, and on a decode failure no image is attached. A newer attach or a remove while
    /// this one is running makes it return [`SampleError::Superseded`] without touching state.
    #[tracing::instrument(skip_all)]
    pub async fn attach(&self, bytes: impl Into<Arc<[u8]>>) -> Result<GradientSpec, SampleError> {
        let bytes = bytes.into();
        let (epoch, cleared) = {
            let mut inner = self.lock();
            inner.image_epoch += 1;
            inner.image = None;
            inner.image_state = ImageState::Idle;
            let cleared = inner.replace_gradient(GradientSpec::empty());
            (inner.image_epoch, cleared)
        };
        self.announce_gradient(cleared);

        let decoded = tokio::task::spawn_blocking(move || SourceImage::decode(bytes))
            .await
            .map_err(|e| SampleError::Worker(e.to_string()))
            .and_then(|r| r);

        let image = {
            let mut inner = self.lock();
            if inner.image_epoch != epoch {
                tracing::debug!("image replaced while decoding; dropping result");
                return Err(SampleError::Superseded);
            }
            match decoded {
                Ok(image) => {
                    let image = Arc::new(image);
                    inner.image = Some(Arc::clone(&image));
                    inner.image_state = ImageState::ImageAttached;
                    image
                }
                Err(e) => {
                    tracing::warn!(error = %e, "image could not be decoded; nothing attached");
                    return Err(e);
                }
            }
        };

        let sampler = Arc::clone(&self.sampler);
        let sampled = tokio::task::spawn_blocking(move || sampler.sample(&image))
            .await
            .map_err(|e| SampleError::Worker(e.to_string()))
            .and_then(|r| r);

        let (result, changed) = {
            let mut inner = self.lock();
            if inner.image_epoch != epoch {
                tracing::debug!("image replaced while sampling; dropping sample");
                return Err(SampleError::Superseded);
            }
            match sampled {
                Ok(sample) => {
                    let gradient = synthesize(&sample);
                    inner.image_state = if gradient.is_empty() {
                        ImageState::ImageAttached
                    } else {
                        ImageState::GradientReady
                    };
                    let changed = inner.replace_gradient(gradient.clone());
                    (Ok(gradient), changed)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "sampling failed; using default background");
                    inner.image_state = ImageState::ImageAttached;
                    let changed = inner.replace_gradient(GradientSpec::empty());
                    (Err(e), changed)
                }
            }
        };
        self.announce_gradient(changed);
        result
    }

    /// Detach the image and clear its gradient.
    pub fn remove(&self) {
        let cleared = {
            let mut inner = self.lock();
            inner.image_epoch += 1;
            inner.image = None;
            inner.image_state = ImageState::Idle;
            inner.replace_gradient(GradientSpec::empty())
        };
        self.announce_gradient(cleared);
    }

    /// Render and encode the current inputs.
    ///
    /// Inputs are captured when the call starts. The artifact is published only when no
    /// later-started request has already published one; otherwise the outcome is
    /// [`GenerateOutcome::Superseded`]. Failures leave the published artifact untouched.
    #[tracing::instrument(skip_all, fields(sequence = tracing::field::Empty))]
    pub async fn generate(&self) -> PreviewResult<GenerateOutcome> {
        let (sequence, input) = {
            let mut inner = self.lock();
            inner.next_sequence += 1;
            inner.in_flight += 1;
            let input = RenderInput {
                content: inner.content.clone(),
                gradient: inner.gradient.clone(),
                image: inner.image.clone(),
            };
            (inner.next_sequence, input)
        };
        let _in_flight = InFlight { inner: &self.inner };
        tracing::Span::current().record("sequence", sequence);

        let backend = Arc::clone(&self.backend);
        let compositor = self.compositor;
        let mut artifact = tokio::task::spawn_blocking(move || -> PreviewResult<Artifact> {
            let surface = backend.render(&input)?;
            Ok(compositor.composite(&surface, input.has_image())?)
        })
        .await
        .map_err(|e| RenderError::rasterizer(format!("render task failed: {e}")))??;
        artifact.sequence = sequence;
        let artifact = Arc::new(artifact);

        let published = {
            let mut inner = self.lock();
            if sequence > inner.published_sequence {
                inner.published_sequence = sequence;
                inner.artifact = Some(Arc::clone(&artifact));
                true
            } else {
                false
            }
        };

        if !published {
            tracing::debug!(sequence, "newer artifact already published; dropping result");
            return Ok(GenerateOutcome::Superseded { sequence });
        }
        self.announce_artifact(&artifact);
        Ok(GenerateOutcome::Current(artifact))
    }

    fn announce_artifact(&self, artifact: &Arc<Artifact>) {
        let Some(listener) = &self.listener else {
            return;
        };
        let mut last = self.announced.lock().unwrap_or_else(PoisonError::into_inner);
        if artifact.sequence() > *last {
            *last = artifact.sequence();
            listener.artifact_ready(artifact);
        }
    }

    fn announce_gradient(&self, changed: Option<GradientSpec>) {
        if let (Some(listener), Some(gradient)) = (&self.listener, changed) {
            listener.gradient_changed(&gradient);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/preview.rs"]
mod tests;
