use super::*;

fn sample(colors: &[(u8, u8, u8)]) -> ColorSample {
    ColorSample::from_colors(
        colors
            .iter()
            .map(|&(r, g, b)| Rgb8::new(r, g, b))
            .collect::<Vec<_>>(),
    )
}

#[test]
fn empty_sample_gives_empty_spec() {
    let spec = synthesize(&ColorSample::empty());
    assert!(spec.is_empty());
    assert_eq!(spec.to_css(), None);
}

#[test]
fn single_color_lightens_midpoints_and_darkens() {
    let spec = synthesize(&sample(&[(200, 100, 50)]));
    assert_eq!(
        spec.stops(),
        &[
            Rgb8::new(250, 150, 100),
            Rgb8::new(190, 90, 50),
            Rgb8::new(130, 30, 0),
        ]
    );
}

#[test]
fn single_color_middle_is_rounded_mean_for_every_channel_value() {
    for v in (0u8..=255).step_by(5) {
        let c = Rgb8::new(v, v.wrapping_mul(7), 255 - v);
        let spec = synthesize(&ColorSample::from_colors(vec![c]));
        assert_eq!(spec.stops().len(), 3);

        let (l, d) = (lighten(c), darken(c));
        let mean = |a: u8, b: u8| ((u16::from(a) + u16::from(b)) as f64 / 2.0).round() as u8;
        assert_eq!(
            spec.stops()[1],
            Rgb8::new(mean(l.r, d.r), mean(l.g, d.g), mean(l.b, d.b))
        );
    }
}

#[test]
fn lighten_and_darken_clamp_at_the_edges() {
    assert_eq!(lighten(Rgb8::new(230, 205, 0)), Rgb8::new(255, 255, 50));
    assert_eq!(darken(Rgb8::new(69, 70, 255)), Rgb8::new(0, 0, 185));

    let spec = synthesize(&sample(&[(255, 255, 255)]));
    assert_eq!(spec.stops()[0], Rgb8::new(255, 255, 255));
    assert_eq!(spec.stops()[2], Rgb8::new(185, 185, 185));

    let spec = synthesize(&sample(&[(0, 0, 0)]));
    assert_eq!(spec.stops()[0], Rgb8::new(50, 50, 50));
    assert_eq!(spec.stops()[1], Rgb8::new(25, 25, 25));
    assert_eq!(spec.stops()[2], Rgb8::new(0, 0, 0));
}

#[test]
fn two_colors_bracket_their_midpoint() {
    let (c1, c2) = ((10, 21, 255), (0, 200, 4));
    let spec = synthesize(&sample(&[c1, c2]));
    let stops = spec.stops();
    assert_eq!(stops.len(), 3);
    assert_eq!(stops[0], Rgb8::new(10, 21, 255));
    assert_eq!(stops[2], Rgb8::new(0, 200, 4));

    let exact = [
        (f64::from(c1.0) + f64::from(c2.0)) / 2.0,
        (f64::from(c1.1) + f64::from(c2.1)) / 2.0,
        (f64::from(c1.2) + f64::from(c2.2)) / 2.0,
    ];
    let mid = stops[1].to_array();
    for (got, want) in mid.iter().zip(exact) {
        assert!((f64::from(*got) - want).abs() <= 1.0, "{got} vs {want}");
    }
}

#[test]
fn three_colors_interleave_midpoints() {
    let spec = synthesize(&sample(&[(0, 0, 0), (100, 100, 100), (201, 201, 201)]));
    assert_eq!(
        spec.stops(),
        &[
            Rgb8::new(0, 0, 0),
            Rgb8::new(50, 50, 50),
            Rgb8::new(100, 100, 100),
            Rgb8::new(151, 151, 151),
            Rgb8::new(201, 201, 201),
        ]
    );
}

#[test]
fn css_uses_135deg_and_even_spacing() {
    let spec = synthesize(&sample(&[(200, 100, 50)]));
    assert_eq!(
        spec.to_css().unwrap(),
        "linear-gradient(135deg, rgb(250, 150, 100) 0%, rgb(190, 90, 50) 50%, rgb(130, 30, 0) 100%)"
    );

    let spec = synthesize(&sample(&[(0, 0, 0), (100, 100, 100), (201, 201, 201)]));
    let css = spec.to_css().unwrap();
    assert!(css.contains("rgb(50, 50, 50) 25%"));
    assert!(css.contains("rgb(201, 201, 201) 100%"));
}
