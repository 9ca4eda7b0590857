//! Encoded preview image and its download/reference forms.

use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::PreviewResult;

/// File name offered for download.
pub const ARTIFACT_FILE_NAME: &str = "og-image.png";
/// MIME type of every artifact.
pub const ARTIFACT_MIME: &str = "image/png";

/// Encoded og:image produced by one generate request.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    width: u32,
    height: u32,
    png: Vec<u8>,
    url: String,
    pub(crate) sequence: u64,
}

impl std::fmt::Debug for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artifact")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_len", &self.png.len())
            .field("sequence", &self.sequence)
            .finish()
    }
}

impl Artifact {
    pub(crate) fn from_png(width: u32, height: u32, png: Vec<u8>) -> Self {
        let url = format!(
            "data:{ARTIFACT_MIME};base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&png)
        );
        Self {
            width,
            height,
            png,
            url,
            sequence: 0,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// PNG bytes.
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    /// `data:` URL usable as an image source or og:image reference.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download file name.
    pub fn file_name(&self) -> &'static str {
        ARTIFACT_FILE_NAME
    }

    /// Sequence number of the generate request that produced this artifact.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Write the PNG into `dir` as [`ARTIFACT_FILE_NAME`] and return the written path.
    pub fn save_to(&self, dir: impl AsRef<Path>) -> PreviewResult<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output dir '{}'", dir.display()))?;
        let path = dir.join(ARTIFACT_FILE_NAME);
        std::fs::write(&path, &self.png)
            .with_context(|| format!("write artifact '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = self.png.len(), "saved artifact");
        Ok(path)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/artifact.rs"]
mod tests;
