//! `vello_cpu` implementation of [`RenderBackend`](crate::render::RenderBackend).

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use kurbo::Shape;
use serde::{Deserialize, Serialize};

use crate::assets::decode::{SourceImage, premultiply_rgba8_in_place};
use crate::assets::fonts::{FontSource, PostFonts, load_fonts};
use crate::foundation::core::{Canvas, Rect, Rgb8};
use crate::foundation::error::{PreviewError, PreviewResult, RenderError};
use crate::gradient::{GRADIENT_ANGLE_DEG, GradientSpec, raster::rasterize_linear_gradient};
use crate::layout::post::{FaceRole, LayoutMetrics, PostLayout, PostTextEngines, TextBlock};
use crate::layout::text::TextBrushRgba8;
use crate::layout::{PostContent, cover_crop};
use crate::render::{RenderBackend, RenderInput, RenderSurface};

/// Options for [`CpuRenderer`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuRendererOpts {
    /// Card geometry.
    pub metrics: LayoutMetrics,
    /// Fill used when the gradient is empty.
    pub background: Rgb8,
    /// Title and body color.
    pub text_color: Rgb8,
    /// Corner radius of the image box.
    pub image_corner_radius_px: f64,
    /// Where faces come from.
    pub font: FontSource,
}

impl Default for CpuRendererOpts {
    fn default() -> Self {
        Self {
            metrics: LayoutMetrics::default(),
            background: Rgb8::new(0x1f, 0x29, 0x37),
            text_color: Rgb8::new(255, 255, 255),
            image_corner_radius_px: 16.0,
            font: FontSource::System,
        }
    }
}

impl CpuRendererOpts {
    /// Reject options that cannot render.
    pub fn validate(&self) -> PreviewResult<()> {
        self.metrics.validate()?;
        if !self.image_corner_radius_px.is_finite() || self.image_corner_radius_px < 0.0 {
            return Err(PreviewError::config(
                "image_corner_radius_px must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// Software renderer built on `vello_cpu` and Parley.
///
/// Fonts and their shaping engines are resolved on first use and kept for the lifetime of the
/// renderer, so a post without text never touches the font system.
pub struct CpuRenderer {
    opts: CpuRendererOpts,
    fonts: OnceLock<Result<Arc<PostFonts>, String>>,
    engines: Mutex<Option<PostTextEngines>>,
}

impl std::fmt::Debug for CpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuRenderer")
            .field("opts", &self.opts)
            .field("fonts_loaded", &self.fonts.get().is_some())
            .finish()
    }
}

impl CpuRenderer {
    /// Validate `opts` and apply font environment overrides.
    pub fn new(mut opts: CpuRendererOpts) -> PreviewResult<Self> {
        opts.validate()?;
        opts.font = opts.font.with_env_overrides();
        Ok(Self {
            opts,
            fonts: OnceLock::new(),
            engines: Mutex::new(None),
        })
    }

    /// Effective options.
    pub fn opts(&self) -> &CpuRendererOpts {
        &self.opts
    }

    /// Canvas size `content` would render at.
    pub fn measure(&self, content: &PostContent, has_image: bool) -> Result<Canvas, RenderError> {
        Ok(self.layout(content, has_image)?.canvas)
    }

    fn brush(&self) -> TextBrushRgba8 {
        TextBrushRgba8::opaque(self.opts.text_color)
    }

    fn fonts(&self) -> Result<Arc<PostFonts>, RenderError> {
        self.fonts
            .get_or_init(|| {
                load_fonts(&self.opts.font)
                    .map(Arc::new)
                    .map_err(|e| match e {
                        RenderError::FontUnavailable(msg) => msg,
                        other => other.to_string(),
                    })
            })
            .clone()
            .map_err(RenderError::FontUnavailable)
    }

    /// Shaping engines, built on first call. `None` for posts without text.
    fn engines_for(
        &self,
        content: &PostContent,
    ) -> Result<Option<MutexGuard<'_, Option<PostTextEngines>>>, RenderError> {
        if !content.has_text() {
            return Ok(None);
        }
        let mut guard = self.engines.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_none() {
            let fonts = self.fonts()?;
            *guard = Some(PostTextEngines::new(&fonts)?);
        }
        Ok(Some(guard))
    }

    fn layout(&self, content: &PostContent, has_image: bool) -> Result<PostLayout, RenderError> {
        let mut engines = self.engines_for(content)?;
        PostLayout::compute(
            content,
            has_image,
            &self.opts.metrics,
            engines.as_deref_mut().and_then(Option::as_mut),
            self.brush(),
        )
    }

    fn paint_background(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        canvas: Canvas,
        gradient: &GradientSpec,
    ) -> Result<(), RenderError> {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        if gradient.is_empty() {
            let bg = self.opts.background;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, 255));
        } else {
            let bytes = rasterize_linear_gradient(gradient.stops(), canvas, GRADIENT_ANGLE_DEG);
            let pixmap = pixmap_from_premul_bytes(&bytes, canvas.width, canvas.height)?;
            ctx.set_paint(image_paint(pixmap));
        }
        ctx.fill_rect(&rect_to_cpu(canvas.rect()));
        Ok(())
    }

    fn paint_image(
        &self,
        ctx: &mut vello_cpu::RenderContext,
        image: &SourceImage,
        image_box: Rect,
    ) -> Result<(), RenderError> {
        let x0 = image_box.x0.round();
        let y0 = image_box.y0.round();
        let w = (image_box.x1.round() - x0).max(1.0) as u32;
        let h = (image_box.y1.round() - y0).max(1.0) as u32;

        let (cx, cy, cw, ch) = cover_crop(image.width(), image.height(), w, h);
        let cropped = image::imageops::crop_imm(image.rgba(), cx, cy, cw, ch).to_image();
        let scaled = if (cw, ch) == (w, h) {
            cropped
        } else {
            image::imageops::resize(&cropped, w, h, image::imageops::FilterType::Triangle)
        };
        let mut bytes = scaled.into_raw();
        premultiply_rgba8_in_place(&mut bytes);
        let pixmap = pixmap_from_premul_bytes(&bytes, w, h)?;

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((x0, y0)));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(image_paint(pixmap));

        let local = Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
        let radius = self
            .opts
            .image_corner_radius_px
            .min(f64::from(w.min(h)) / 2.0);
        if radius > 0.0 {
            let shape = local.to_rounded_rect(radius).to_path(0.1);
            ctx.fill_path(&bezpath_to_cpu(&shape));
        } else {
            ctx.fill_rect(&rect_to_cpu(local));
        }
        Ok(())
    }
}

impl RenderBackend for CpuRenderer {
    #[tracing::instrument(skip_all, fields(has_image = input.has_image(), stops = input.gradient.stops().len()))]
    fn render(&self, input: &RenderInput) -> Result<RenderSurface, RenderError> {
        let layout = self.layout(&input.content, input.has_image())?;
        let canvas = layout.canvas;
        let (w16, h16) = canvas.as_u16();
        let mut ctx = vello_cpu::RenderContext::new(w16, h16);

        self.paint_background(&mut ctx, canvas, &input.gradient)?;

        if let (Some(image_box), Some(image)) = (layout.image_box, input.image.as_deref()) {
            self.paint_image(&mut ctx, image, image_box)?;
        }

        if layout.blocks().next().is_some() {
            let fonts = self.fonts()?;
            let title_font = fonts.title.to_font_data();
            let body_font = fonts.regular.to_font_data();
            for block in layout.blocks() {
                let font = match block.role {
                    FaceRole::Title => &title_font,
                    FaceRole::Body => &body_font,
                };
                paint_text(&mut ctx, block, font);
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        let data = pixmap.data_as_u8_slice().to_vec();
        if data.len() != canvas.rgba8_len() {
            return Err(RenderError::rasterizer(format!(
                "pixmap has {} bytes, expected {}",
                data.len(),
                canvas.rgba8_len()
            )));
        }
        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            "rendered post card"
        );
        Ok(RenderSurface {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        })
    }
}

fn paint_text(
    ctx: &mut vello_cpu::RenderContext,
    block: &TextBlock,
    font: &vello_cpu::peniko::FontData,
) {
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((
        block.origin.x,
        block.origin.y,
    )));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    for line in block.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };

            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));

            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

fn image_paint(pixmap: vello_cpu::Pixmap) -> vello_cpu::Image {
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> Result<vello_cpu::Pixmap, RenderError> {
    let w: u16 = width
        .try_into()
        .map_err(|_| RenderError::UnsupportedSize { width, height })?;
    let h: u16 = height
        .try_into()
        .map_err(|_| RenderError::UnsupportedSize { width, height })?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(RenderError::rasterizer("premultiplied byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
