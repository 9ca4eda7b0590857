//! Dominant-color extraction.
//!
//! The sampler downsamples the decoded image so the work is bounded by `max_side²`, drops
//! pixels that are too transparent to be meaningful, then quantizes what is left with median cut.

pub mod median_cut;

use serde::{Deserialize, Serialize};

use crate::assets::decode::SourceImage;
use crate::foundation::core::Rgb8;
use crate::foundation::error::{PreviewError, PreviewResult, SampleError};

/// Options controlling dominant-color extraction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerOpts {
    /// Upper bound on the number of extracted colors (1..=3).
    pub max_colors: usize,
    /// Longest side, in pixels, of the downsampled working image.
    pub max_side: u32,
    /// Pixels with alpha below this value are ignored.
    pub min_alpha: u8,
}

impl Default for SamplerOpts {
    fn default() -> Self {
        Self {
            max_colors: 2,
            max_side: 64,
            min_alpha: 125,
        }
    }
}

impl SamplerOpts {
    /// Reject option combinations the sampler cannot honor.
    pub fn validate(&self) -> PreviewResult<()> {
        if !(1..=3).contains(&self.max_colors) {
            return Err(PreviewError::config("sampler max_colors must be in 1..=3"));
        }
        if self.max_side == 0 {
            return Err(PreviewError::config("sampler max_side must be > 0"));
        }
        Ok(())
    }
}

/// Ordered dominant colors of one image, most representative first.
///
/// Either empty (no image, or extraction failed) or fully populated; never partial.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorSample(Vec<Rgb8>);

impl ColorSample {
    /// The empty sample.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Wrap already-extracted colors.
    pub fn from_colors(colors: impl Into<Vec<Rgb8>>) -> Self {
        Self(colors.into())
    }

    /// Extracted colors in order.
    pub fn colors(&self) -> &[Rgb8] {
        &self.0
    }

    /// Number of colors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Median-cut dominant-color sampler.
#[derive(Clone, Debug, Default)]
pub struct ColorSampler {
    opts: SamplerOpts,
}

impl ColorSampler {
    /// Construct a sampler with validated options.
    pub fn new(opts: SamplerOpts) -> PreviewResult<Self> {
        opts.validate()?;
        Ok(Self { opts })
    }

    /// Options in effect.
    pub fn opts(&self) -> &SamplerOpts {
        &self.opts
    }

    /// Extract up to `max_colors` dominant colors from `image`.
    #[tracing::instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn sample(&self, image: &SourceImage) -> Result<ColorSample, SampleError> {
        let working = downsample(image.rgba(), self.opts.max_side);

        let pixels: Vec<[u8; 3]> = working
            .pixels()
            .filter(|p| p.0[3] >= self.opts.min_alpha)
            .map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect();
        if pixels.is_empty() {
            return Err(SampleError::NoPixels);
        }

        let colors = median_cut::quantize(pixels, self.opts.max_colors);
        tracing::debug!(colors = colors.len(), "sampled dominant colors");
        Ok(ColorSample(colors))
    }
}

fn downsample(img: &image::RgbaImage, max_side: u32) -> std::borrow::Cow<'_, image::RgbaImage> {
    let (w, h) = img.dimensions();
    let longest = w.max(h);
    if longest <= max_side {
        return std::borrow::Cow::Borrowed(img);
    }
    let scale = f64::from(max_side) / f64::from(longest);
    let nw = ((f64::from(w) * scale).round() as u32).max(1);
    let nh = ((f64::from(h) * scale).round() as u32).max(1);
    std::borrow::Cow::Owned(image::imageops::resize(
        img,
        nw,
        nh,
        image::imageops::FilterType::Triangle,
    ))
}

#[cfg(test)]
#[path = "../tests/unit/sample/sampler.rs"]
mod tests;
