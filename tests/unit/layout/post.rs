use super::*;
use crate::assets::fonts::{FontSource, load_fonts};
use crate::foundation::core::Rgb8;

fn brush() -> TextBrushRgba8 {
    TextBrushRgba8::opaque(Rgb8::new(255, 255, 255))
}

fn engines() -> Option<PostTextEngines> {
    let fonts = load_fonts(&FontSource::System).ok()?;
    PostTextEngines::new(&fonts).ok()
}

#[test]
fn default_metrics_validate() {
    LayoutMetrics::default().validate().unwrap();
    assert_eq!(LayoutMetrics::default().content_width(), 1072.0);
}

#[test]
fn invalid_metrics_are_config_errors() {
    let m = LayoutMetrics {
        padding_px: 600.0,
        ..LayoutMetrics::default()
    };
    assert!(matches!(m.validate(), Err(PreviewError::Config(_))));

    let m = LayoutMetrics {
        body_size_px: f32::NAN,
        ..LayoutMetrics::default()
    };
    assert!(matches!(m.validate(), Err(PreviewError::Config(_))));

    let m = LayoutMetrics {
        width: 0,
        ..LayoutMetrics::default()
    };
    assert!(m.validate().is_err());
}

#[test]
fn empty_content_without_image_is_just_padding() {
    let layout = PostLayout::compute(
        &PostContent::default(),
        false,
        &LayoutMetrics::default(),
        None,
        brush(),
    )
    .unwrap();
    assert_eq!(layout.canvas, Canvas::new(1200, 128).unwrap());
    assert!(layout.title.is_none());
    assert!(layout.body.is_none());
    assert!(layout.image_box.is_none());
}

#[test]
fn image_only_fills_the_padded_canvas() {
    let layout = PostLayout::compute(
        &PostContent::default(),
        true,
        &LayoutMetrics::default(),
        None,
        brush(),
    )
    .unwrap();
    assert_eq!(layout.canvas, Canvas::new(1200, 630).unwrap());
    assert_eq!(layout.image_box, Some(Rect::new(64.0, 64.0, 1136.0, 566.0)));
}

#[test]
fn text_without_engines_is_font_unavailable() {
    let err = PostLayout::compute(
        &PostContent::new("Hello", ""),
        false,
        &LayoutMetrics::default(),
        None,
        brush(),
    )
    .err()
    .unwrap();
    assert!(matches!(err, RenderError::FontUnavailable(_)));
}

#[test]
fn title_and_body_stack_and_set_natural_height() {
    let Some(mut engines) = engines() else {
        eprintln!("no system font available; skipping");
        return;
    };
    let m = LayoutMetrics::default();
    let layout = PostLayout::compute(
        &PostContent::new("Hello", "World"),
        false,
        &m,
        Some(&mut engines),
        brush(),
    )
    .unwrap();

    let title = layout.title.as_ref().unwrap();
    let body = layout.body.as_ref().unwrap();
    assert_eq!(title.role, FaceRole::Title);
    assert_eq!(body.role, FaceRole::Body);
    assert_eq!(title.origin, Point::new(64.0, 64.0));
    assert!(body.origin.y >= title.origin.y + title.height() + 24.0 - 1e-6);

    let expected = (body.origin.y + body.height() + 64.0).ceil() as u32;
    assert_eq!(layout.canvas.width, 1200);
    assert_eq!(layout.canvas.height, expected);
    assert!(layout.image_box.is_none());
    assert_eq!(layout.blocks().count(), 2);
}

#[test]
fn image_box_sits_below_text() {
    let Some(mut engines) = engines() else {
        eprintln!("no system font available; skipping");
        return;
    };
    let layout = PostLayout::compute(
        &PostContent::new("Hello", ""),
        true,
        &LayoutMetrics::default(),
        Some(&mut engines),
        brush(),
    )
    .unwrap();
    let title = layout.title.as_ref().unwrap();
    let image_box = layout.image_box.unwrap();
    assert_eq!(layout.canvas.height, 630);
    assert!((image_box.y0 - (title.origin.y + title.height() + 32.0)).abs() < 1e-6);
    assert_eq!(image_box.y1, 566.0);
}
