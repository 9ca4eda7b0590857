//! og:image meta tags for a published artifact.

use crate::composite::artifact::{ARTIFACT_MIME, Artifact};

/// Social-preview meta tags pointing at a published artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OgImageMeta {
    /// Image reference, usually [`Artifact::url`] or a hosted copy of it.
    pub url: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Image MIME type.
    pub mime: &'static str,
}

impl OgImageMeta {
    /// Tags for `artifact`, referencing its `data:` URL.
    pub fn for_artifact(artifact: &Artifact) -> Self {
        Self::hosted(artifact, artifact.url())
    }

    /// Tags for `artifact` served from `url`.
    pub fn hosted(artifact: &Artifact, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            width: artifact.width(),
            height: artifact.height(),
            mime: ARTIFACT_MIME,
        }
    }

    /// `(property, content)` pairs in document order.
    pub fn tags(&self) -> Vec<(&'static str, String)> {
        vec![
            ("og:image", self.url.clone()),
            ("og:image:type", self.mime.to_owned()),
            ("og:image:width", self.width.to_string()),
            ("og:image:height", self.height.to_string()),
            ("twitter:card", "summary_large_image".to_owned()),
            ("twitter:image", self.url.clone()),
        ]
    }

    /// `<meta>` elements, one per line.
    pub fn to_html(&self) -> String {
        self.tags()
            .into_iter()
            .map(|(property, content)| {
                let attr = if property.starts_with("twitter:") {
                    "name"
                } else {
                    "property"
                };
                format!(
                    r#"<meta {attr}="{property}" content="{}">"#,
                    escape_attr(&content)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/meta.rs"]
mod tests;
