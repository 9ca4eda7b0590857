//! Font face resolution for title and body text.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::error::RenderError;

/// Environment override for the regular (body) font file.
pub const FONT_ENV: &str = "OG_PREVIEW_FONT";
/// Environment override for the bold (title) font file.
pub const BOLD_FONT_ENV: &str = "OG_PREVIEW_BOLD_FONT";

/// Where the renderer gets its font faces from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FontSource {
    /// Query the host's installed fonts for a sans-serif face.
    #[default]
    System,
    /// Load faces from explicit font files. `bold` falls back to `regular`.
    Files {
        /// Body font file.
        regular: PathBuf,
        /// Title font file.
        #[serde(default)]
        bold: Option<PathBuf>,
    },
}

impl FontSource {
    /// Apply `OG_PREVIEW_FONT` / `OG_PREVIEW_BOLD_FONT` overrides, if set.
    pub fn with_env_overrides(self) -> Self {
        let regular = std::env::var_os(FONT_ENV).map(PathBuf::from);
        let bold = std::env::var_os(BOLD_FONT_ENV).map(PathBuf::from);
        match (regular, self) {
            (Some(regular), _) => Self::Files { regular, bold },
            (None, Self::Files { regular, bold: b }) => Self::Files {
                regular,
                bold: bold.or(b),
            },
            (None, Self::System) => Self::System,
        }
    }
}

/// Raw font data plus the face index inside it (non-zero for collections).
///
/// Shaping and rasterization share `bytes` without copying it.
#[derive(Clone)]
pub struct FontFace {
    /// Font file bytes.
    pub bytes: Arc<Vec<u8>>,
    /// Face index within `bytes`.
    pub index: u32,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .finish()
    }
}

impl FontFace {
    /// `vello_cpu` handle over the same bytes used for shaping.
    pub(crate) fn to_font_data(&self) -> vello_cpu::peniko::FontData {
        vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::new(self.bytes.clone()),
            self.index,
        )
    }
}

/// Faces used by the post layout.
#[derive(Clone, Debug)]
pub struct PostFonts {
    /// Body text face.
    pub regular: FontFace,
    /// Title face.
    pub title: FontFace,
}

/// Resolve a [`FontSource`] into loaded faces.
#[tracing::instrument]
pub fn load_fonts(source: &FontSource) -> Result<PostFonts, RenderError> {
    match source {
        FontSource::Files { regular, bold } => {
            let regular = read_face(regular)?;
            let title = match bold {
                Some(p) => read_face(p)?,
                None => regular.clone(),
            };
            Ok(PostFonts { regular, title })
        }
        FontSource::System => load_system_fonts(),
    }
}

fn read_face(path: &Path) -> Result<FontFace, RenderError> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read font file '{}'", path.display()))
        .map_err(|e| RenderError::FontUnavailable(format!("{e:#}")))?;
    Ok(FontFace {
        bytes: Arc::new(bytes),
        index: 0,
    })
}

fn load_system_fonts() -> Result<PostFonts, RenderError> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    tracing::debug!(faces = db.len(), "loaded system font database");

    let regular = query_face(&db, usvg::fontdb::Weight::NORMAL)
        .ok_or_else(|| RenderError::FontUnavailable("no system fonts installed".to_owned()))?;
    let title = query_face(&db, usvg::fontdb::Weight::BOLD).unwrap_or_else(|| regular.clone());
    Ok(PostFonts { regular, title })
}

fn query_face(db: &usvg::fontdb::Database, weight: usvg::fontdb::Weight) -> Option<FontFace> {
    use usvg::fontdb::Family;

    let families = [
        Family::Name("Inter"),
        Family::Name("DejaVu Sans"),
        Family::Name("Liberation Sans"),
        Family::Name("Noto Sans"),
        Family::Name("Helvetica"),
        Family::Name("Arial"),
        Family::SansSerif,
    ];
    let query = usvg::fontdb::Query {
        families: &families,
        weight,
        ..Default::default()
    };

    let id = db
        .query(&query)
        .or_else(|| db.faces().next().map(|f| f.id))?;
    db.with_face_data(id, |data, index| FontFace {
        bytes: Arc::new(data.to_vec()),
        index,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
