use super::*;
use crate::assets::fonts::{FontSource, load_fonts};

fn white() -> TextBrushRgba8 {
    TextBrushRgba8::opaque(Rgb8::new(255, 255, 255))
}

fn engine() -> Option<TextLayoutEngine> {
    let fonts = load_fonts(&FontSource::System).ok()?;
    TextLayoutEngine::new(&fonts.regular).ok()
}

#[test]
fn longest_prefix_respects_the_predicate() {
    let out = longest_fitting_prefix("abcdef", |c| Ok(c.chars().count() <= 4)).unwrap();
    assert_eq!(out, "abc\u{2026}");

    let out = longest_fitting_prefix("abcdef", |_| Ok(false)).unwrap();
    assert_eq!(out, "\u{2026}");
}

#[test]
fn longest_prefix_cuts_on_char_boundaries_and_trims_spaces() {
    let out = longest_fitting_prefix("héllo wörld", |c| Ok(c.chars().count() <= 7)).unwrap();
    assert_eq!(out, "héllo\u{2026}");
}

#[test]
fn longest_prefix_propagates_errors() {
    let err = longest_fitting_prefix("abc", |_| Err(RenderError::layout("boom"))).unwrap_err();
    assert!(matches!(err, RenderError::Layout(_)));
}

#[test]
fn rejects_non_positive_sizes() {
    let Some(mut engine) = engine() else {
        eprintln!("no system font available; skipping");
        return;
    };
    assert!(engine.layout_plain("x", 0.0, white(), None).is_err());
    assert!(!engine.family_name().is_empty());
}

#[test]
fn short_title_is_kept_verbatim() {
    let Some(mut engine) = engine() else {
        eprintln!("no system font available; skipping");
        return;
    };
    let fitted = engine
        .fit_single_line("Hello\nthere", 64.0, white(), 1072.0)
        .unwrap();
    assert_eq!(fitted.text, "Hello there");
    assert!(!fitted.truncated);
    assert_eq!(fitted.layout.lines().count(), 1);
}

#[test]
fn long_title_is_ellipsized_to_width() {
    let Some(mut engine) = engine() else {
        eprintln!("no system font available; skipping");
        return;
    };
    let long = "A remarkably long headline ".repeat(12);
    let fitted = engine.fit_single_line(&long, 64.0, white(), 600.0).unwrap();
    assert!(fitted.truncated);
    assert!(fitted.text.ends_with(ELLIPSIS));
    assert!(fitted.layout.width() <= 600.0);
    assert!(fitted.text.chars().count() < long.chars().count());
}

#[test]
fn body_is_clamped_to_max_lines() {
    let Some(mut engine) = engine() else {
        eprintln!("no system font available; skipping");
        return;
    };
    let long = "words that keep going and going ".repeat(40);
    let fitted = engine.fit_lines(&long, 36.0, white(), 1072.0, 2).unwrap();
    assert!(fitted.truncated);
    assert!(fitted.text.ends_with(ELLIPSIS));
    assert!(fitted.layout.lines().count() <= 2);

    let short = engine.fit_lines("World", 36.0, white(), 1072.0, 2).unwrap();
    assert!(!short.truncated);
    assert_eq!(short.text, "World");
}
