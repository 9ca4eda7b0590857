//! Gradient synthesis from sampled colors.

pub mod raster;

use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgb8;
use crate::sample::ColorSample;

/// Per-channel lift applied to a lone sampled color for the first stop.
pub const LIGHTEN_DELTA: i16 = 50;
/// Per-channel drop applied to a lone sampled color for the last stop.
pub const DARKEN_DELTA: i16 = -70;
/// Axis of the rendered background gradient, CSS convention (0deg points up, clockwise).
pub const GRADIENT_ANGLE_DEG: f64 = 135.0;

/// Equally spaced gradient stops, first to last along the 135° axis.
///
/// Either empty (no background override) or at least two stops.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradientSpec(Vec<Rgb8>);

impl GradientSpec {
    /// The empty spec; renderers fall back to their default background.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Stops in order.
    pub fn stops(&self) -> &[Rgb8] {
        &self.0
    }

    /// `true` when there is no gradient.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// CSS `linear-gradient(...)` for the live on-page background, or `None` when empty.
    pub fn to_css(&self) -> Option<String> {
        if self.0.len() < 2 {
            return None;
        }
        let last = (self.0.len() - 1) as f64;
        let stops = self
            .0
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let pct = (i as f64) * 100.0 / last;
                format!("rgb({}, {}, {}) {}%", c.r, c.g, c.b, trim_pct(pct))
            })
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!(
            "linear-gradient({}deg, {stops})",
            GRADIENT_ANGLE_DEG as i64
        ))
    }
}

fn trim_pct(pct: f64) -> String {
    let s = format!("{pct:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_owned()
}

/// Lighter variant of `c` (+50 per channel, clamped).
pub fn lighten(c: Rgb8) -> Rgb8 {
    c.offset(LIGHTEN_DELTA)
}

/// Darker variant of `c` (-70 per channel, clamped).
pub fn darken(c: Rgb8) -> Rgb8 {
    c.offset(DARKEN_DELTA)
}

/// Derive gradient stops from a color sample.
///
/// - one color `C`: `[lighten(C), midpoint(lighten(C), darken(C)), darken(C)]`
/// - two or more colors: the colors in order with their pairwise midpoints between them
/// - no colors: the empty spec
pub fn synthesize(sample: &ColorSample) -> GradientSpec {
    match sample.colors() {
        [] => GradientSpec::empty(),
        [c] => {
            let light = lighten(*c);
            let dark = darken(*c);
            GradientSpec(vec![light, light.midpoint(dark), dark])
        }
        [first, rest @ ..] => {
            let mut stops = Vec::with_capacity(sample.len() * 2 - 1);
            stops.push(*first);
            let mut prev = *first;
            for &c in rest {
                stops.push(prev.midpoint(c));
                stops.push(c);
                prev = c;
            }
            GradientSpec(stops)
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/gradient/synth.rs"]
mod tests;
