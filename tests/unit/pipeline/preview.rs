use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::foundation::core::Rgb8;
use crate::render::RenderSurface;

/// Paints the first gradient stop (or gray) over the whole surface.
struct FlatBackend;

impl RenderBackend for FlatBackend {
    fn render(&self, input: &RenderInput) -> Result<RenderSurface, RenderError> {
        let height = if input.has_image() { 630 } else { 100 };
        let c = input
            .gradient
            .stops()
            .first()
            .copied()
            .unwrap_or(Rgb8::new(128, 128, 128));
        Ok(RenderSurface {
            width: 1200,
            height,
            data: c.to_rgba8().repeat(1200 * height as usize),
            premultiplied: true,
        })
    }
}

/// Renders like [`FlatBackend`] on the first call and fails on every later one.
#[derive(Default)]
struct FailAfterFirst {
    calls: AtomicUsize,
}

impl RenderBackend for FailAfterFirst {
    fn render(&self, input: &RenderInput) -> Result<RenderSurface, RenderError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            FlatBackend.render(input)
        } else {
            Err(RenderError::rasterizer("boom"))
        }
    }
}

#[derive(Default)]
struct CountingListener {
    artifacts: AtomicUsize,
    gradients: Mutex<Vec<GradientSpec>>,
}

impl PreviewListener for CountingListener {
    fn artifact_ready(&self, _artifact: &Arc<Artifact>) {
        self.artifacts.fetch_add(1, Ordering::SeqCst);
    }

    fn gradient_changed(&self, gradient: &GradientSpec) {
        self.gradients.lock().unwrap().push(gradient.clone());
    }
}

fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn flat_pipeline() -> PreviewPipeline {
    PreviewPipeline::with_backend(PreviewOpts::default(), Arc::new(FlatBackend)).unwrap()
}

#[test]
fn starts_idle_and_empty() {
    let p = flat_pipeline();
    assert_eq!(
        p.state(),
        PipelineState {
            image: ImageState::Idle,
            output: OutputState::Empty,
        }
    );
    assert!(p.gradient().is_empty());
    assert!(p.artifact().is_none());
    assert!(p.image().is_none());
}

#[test]
fn invalid_opts_are_rejected() {
    let mut opts = PreviewOpts::default();
    opts.sampler.max_colors = 0;
    assert!(PreviewPipeline::with_backend(opts, Arc::new(FlatBackend)).is_err());
}

#[tokio::test]
async fn attach_uniform_image_reaches_gradient_ready() {
    let p = flat_pipeline();
    let gradient = p.attach(png(8, 8, [200, 100, 50, 255])).await.unwrap();
    assert_eq!(
        gradient.stops(),
        &[
            Rgb8::new(250, 150, 100),
            Rgb8::new(190, 90, 50),
            Rgb8::new(130, 30, 0),
        ]
    );
    assert_eq!(p.gradient(), gradient);
    assert_eq!(p.state().image, ImageState::GradientReady);
    assert!(p.image().is_some());
}

#[tokio::test]
async fn undecodable_bytes_attach_nothing() {
    let p = flat_pipeline();
    let err = p.attach(b"not an image".to_vec()).await.unwrap_err();
    assert!(matches!(err, SampleError::Decode(_)));
    assert_eq!(p.state().image, ImageState::Idle);
    assert!(p.image().is_none());
    assert!(p.gradient().is_empty());
}

#[tokio::test]
async fn undecodable_replacement_releases_previous_image() {
    let p = flat_pipeline();
    p.attach(png(8, 8, [200, 100, 50, 255])).await.unwrap();
    assert!(p.image().is_some());

    let err = p.attach(b"not an image".to_vec()).await.unwrap_err();
    assert!(matches!(err, SampleError::Decode(_)));
    assert!(p.image().is_none());
    assert!(p.gradient().is_empty());
    assert_eq!(p.state().image, ImageState::Idle);
}

#[tokio::test]
async fn transparent_image_stays_attached_without_gradient() {
    let p = flat_pipeline();
    let err = p.attach(png(4, 4, [10, 20, 30, 0])).await.unwrap_err();
    assert!(matches!(err, SampleError::NoPixels));
    assert_eq!(p.state().image, ImageState::ImageAttached);
    assert!(p.image().is_some());
    assert!(p.gradient().is_empty());
}

#[tokio::test]
async fn remove_clears_image_and_gradient() {
    let listener = Arc::new(CountingListener::default());
    let p = flat_pipeline().with_listener(listener.clone());
    p.attach(png(4, 4, [200, 100, 50, 255])).await.unwrap();
    p.remove();

    assert_eq!(p.state().image, ImageState::Idle);
    assert!(p.gradient().is_empty());
    assert!(p.image().is_none());

    let seen = listener.gradients.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].stops().len(), 3);
    assert!(seen[1].is_empty());
}

#[tokio::test]
async fn generate_publishes_and_sizes_by_image_presence() {
    let listener = Arc::new(CountingListener::default());
    let p = flat_pipeline().with_listener(listener.clone());

    let first = p.generate().await.unwrap();
    let a = first.artifact().unwrap();
    assert_eq!((a.width(), a.height()), (1200, 100));
    assert_eq!(a.sequence(), 1);
    assert_eq!(p.state().output, OutputState::ArtifactReady);

    p.attach(png(4, 4, [200, 100, 50, 255])).await.unwrap();
    let second = p.generate().await.unwrap();
    let b = second.artifact().unwrap();
    assert_eq!((b.width(), b.height()), (1200, 630));
    assert_eq!(b.sequence(), 2);
    assert_eq!(p.artifact().unwrap().sequence(), 2);
    assert_eq!(listener.artifacts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_generate_keeps_previous_artifact() {
    let listener = Arc::new(CountingListener::default());
    let p = PreviewPipeline::with_backend(
        PreviewOpts::default(),
        Arc::new(FailAfterFirst::default()),
    )
    .unwrap()
    .with_listener(listener.clone());

    let first = p.generate().await.unwrap();
    let first = first.artifact().unwrap().clone();
    assert_eq!(first.sequence(), 1);

    let err = p.generate().await.unwrap_err();
    assert!(matches!(
        err,
        crate::foundation::error::PreviewError::Render(RenderError::Rasterizer(_))
    ));

    let kept = p.artifact().unwrap();
    assert_eq!(kept.sequence(), 1);
    assert!(Arc::ptr_eq(&kept, &first));
    assert_eq!(p.state().output, OutputState::ArtifactReady);
    assert_eq!(listener.artifacts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn set_content_is_visible_immediately() {
    let p = flat_pipeline();
    p.set_content(PostContent::new("Hello", "World"));
    assert_eq!(p.content(), PostContent::new("Hello", "World"));
}
