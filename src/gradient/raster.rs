//! Software rasterization of linear gradients.

use crate::foundation::core::{Canvas, Rgb8};

/// Rasterize equally spaced `stops` as a CSS-style linear gradient into opaque RGBA8.
///
/// `angle_deg` follows CSS: 0deg points up, angles grow clockwise, and the gradient line is
/// long enough that the first and last stops land exactly on opposite corners.
pub fn rasterize_linear_gradient(stops: &[Rgb8], canvas: Canvas, angle_deg: f64) -> Vec<u8> {
    let (w, h) = (canvas.width as usize, canvas.height as usize);
    let mut bytes = vec![0u8; canvas.rgba8_len()];
    if stops.is_empty() {
        return bytes;
    }

    let theta = angle_deg.to_radians();
    let (dx, dy) = (theta.sin(), -theta.cos());
    let line_len = (f64::from(canvas.width) * dx).abs() + (f64::from(canvas.height) * dy).abs();
    let (cx, cy) = (f64::from(canvas.width) / 2.0, f64::from(canvas.height) / 2.0);

    for y in 0..h {
        let py = (y as f64) + 0.5 - cy;
        for x in 0..w {
            let px = (x as f64) + 0.5 - cx;
            let t = if line_len > 0.0 {
                (px * dx + py * dy) / line_len + 0.5
            } else {
                0.0
            };
            let idx = (y * w + x) * 4;
            bytes[idx..idx + 4].copy_from_slice(&sample_stops(stops, t).to_rgba8());
        }
    }
    bytes
}

/// Color at position `t` (clamped to `[0, 1]`) of equally spaced stops.
pub fn sample_stops(stops: &[Rgb8], t: f64) -> Rgb8 {
    match stops {
        [] => Rgb8::default(),
        [only] => *only,
        _ => {
            let segments = (stops.len() - 1) as f64;
            let pos = t.clamp(0.0, 1.0) * segments;
            let seg = (pos.floor() as usize).min(stops.len() - 2);
            let local = pos - seg as f64;
            let (a, b) = (stops[seg], stops[seg + 1]);
            let lerp = |a: u8, b: u8| -> u8 {
                let af = f64::from(a);
                let bf = f64::from(b);
                (af + (bf - af) * local).round().clamp(0.0, 255.0) as u8
            };
            Rgb8::new(lerp(a.r, b.r), lerp(a.g, b.g), lerp(a.b, b.b))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gradient/raster.rs"]
mod tests;
