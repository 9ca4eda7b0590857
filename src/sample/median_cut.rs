//! Median-cut color quantization.

use crate::foundation::core::Rgb8;

/// A set of pixels that median cut may split further.
struct ColorBox {
    pixels: Vec<[u8; 3]>,
}

impl ColorBox {
    /// Widest channel and its value range.
    fn widest_channel(&self) -> (usize, u8) {
        let mut lo = [u8::MAX; 3];
        let mut hi = [u8::MIN; 3];
        for px in &self.pixels {
            for c in 0..3 {
                lo[c] = lo[c].min(px[c]);
                hi[c] = hi[c].max(px[c]);
            }
        }
        (0..3)
            .map(|c| (c, hi[c].saturating_sub(lo[c])))
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .unwrap_or((0, 0))
    }

    fn mean(&self) -> Rgb8 {
        let n = self.pixels.len().max(1) as u64;
        let mut sum = [0u64; 3];
        for px in &self.pixels {
            for c in 0..3 {
                sum[c] += u64::from(px[c]);
            }
        }
        let ch = |s: u64| ((s + n / 2) / n).min(255) as u8;
        Rgb8::new(ch(sum[0]), ch(sum[1]), ch(sum[2]))
    }

    /// Split at the median of the widest channel. Requires a non-zero range.
    fn split(mut self, channel: usize) -> (Self, Self) {
        let c0 = channel;
        let c1 = (channel + 1) % 3;
        let c2 = (channel + 2) % 3;
        self.pixels.sort_unstable_by_key(|p| (p[c0], p[c1], p[c2]));

        // Move the cut off the median so equal values stay together when possible.
        let mid = self.pixels.len() / 2;
        let pivot = self.pixels[mid][c0];
        let first_eq = self.pixels.partition_point(|p| p[c0] < pivot);
        let cut = if first_eq > 0 {
            first_eq
        } else {
            self.pixels.partition_point(|p| p[c0] <= pivot)
        };

        let upper = self.pixels.split_off(cut);
        (self, Self { pixels: upper })
    }
}

/// Quantize `pixels` into at most `max_colors` representative colors.
///
/// Boxes holding a single distinct color are never split, so a uniform image yields exactly one
/// color. Output is ordered by population (largest first), then lighter first.
pub fn quantize(pixels: Vec<[u8; 3]>, max_colors: usize) -> Vec<Rgb8> {
    if pixels.is_empty() || max_colors == 0 {
        return Vec::new();
    }

    let mut boxes = vec![ColorBox { pixels }];
    while boxes.len() < max_colors {
        let candidate = boxes
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let (channel, range) = b.widest_channel();
                (i, channel, range, b.pixels.len())
            })
            .filter(|&(_, _, range, _)| range > 0)
            .max_by(|a, b| a.2.cmp(&b.2).then(a.3.cmp(&b.3)).then(b.0.cmp(&a.0)));

        let Some((index, channel, _, _)) = candidate else {
            break;
        };
        let (lower, upper) = boxes.swap_remove(index).split(channel);
        boxes.push(lower);
        boxes.push(upper);
    }

    rank_by_population(boxes.iter().map(|b| (b.pixels.len(), b.mean())))
}

/// Merge `(population, color)` entries sharing a color, then order largest first and lighter
/// first on ties.
fn rank_by_population(entries: impl IntoIterator<Item = (usize, Rgb8)>) -> Vec<Rgb8> {
    let mut ranked: Vec<(usize, Rgb8)> = Vec::new();
    for (count, color) in entries {
        match ranked.iter_mut().find(|(_, c)| *c == color) {
            Some((population, _)) => *population += count,
            None => ranked.push((count, color)),
        }
    }
    ranked.sort_by(|a, b| {
        b.0.cmp(&a.0)
            .then(b.1.luma().cmp(&a.1.luma()))
            .then(a.1.to_array().cmp(&b.1.to_array()))
    });
    ranked.into_iter().map(|(_, c)| c).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/sample/median_cut.rs"]
mod tests;
