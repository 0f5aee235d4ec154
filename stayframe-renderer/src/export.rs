//! Template export.
//!
//! An [`ExportRenderer`] loads every image a template references, waits for
//! all of them, then composites the background and each element in draw
//! order onto a tiny-skia pixmap. The result is an [`ExportSurface`] that
//! can be encoded to PNG, JPEG or WebP.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fontdue::Font;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use stayframe_core::{
    Element, ElementKind, FontWeight, MediaSource, Rect, Rgba, Template, TextAlign, TextStyle,
};
use tiny_skia::{
    BlendMode, Color, FilterQuality, Paint, Pattern, Pixmap, PixmapPaint, SpreadMode, Transform,
};
use tracing::{debug, info, warn};

use crate::assets::{decode_image, image_sources, AssetFetcher, DefaultFetcher};
use crate::cache::{AssetCache, CacheStats};
use crate::error::{RenderError, RenderResult};
use crate::fit;
use crate::fonts::{FontBook, FontConfig, FontRequest};
use crate::surface::ExportSurface;
use crate::text::{layout_text, rasterize_line, GlyphMeasure, LineLayout};

/// Label drawn on video placeholders.
pub const VIDEO_LABEL: &str = "VIDEO";

/// User agent sent with HTTP asset requests.
pub const DEFAULT_USER_AGENT: &str = concat!("stayframe/", env!("CARGO_PKG_VERSION"));

/// Per-export options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    /// Output width in logical pixels (default: template width).
    pub width: Option<u32>,
    /// Output height in logical pixels (default: template height).
    pub height: Option<u32>,
    /// Device pixels per logical pixel (default: 1.0).
    pub pixel_ratio: f32,
    /// Cap on the longer logical side; aspect ratio is preserved.
    pub max_dimension: Option<u32>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            pixel_ratio: 1.0,
            max_dimension: None,
        }
    }
}

/// Configuration for an [`ExportRenderer`].
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Font sources.
    pub fonts: FontConfig,
    /// Give up on an asset after this long. `None` waits indefinitely.
    pub asset_timeout: Option<Duration>,
    /// User agent for HTTP assets.
    pub user_agent: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            fonts: FontConfig::default(),
            asset_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Output dimensions after applying [`ExportOptions`] to a template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSize {
    /// Logical width.
    pub width: u32,
    /// Logical height.
    pub height: u32,
    /// Buffer width in device pixels.
    pub pixel_width: u32,
    /// Buffer height in device pixels.
    pub pixel_height: u32,
    /// Device pixels per template pixel, horizontally.
    pub scale_x: f32,
    /// Device pixels per template pixel, vertically.
    pub scale_y: f32,
    /// Device pixels per logical pixel.
    pub pixel_ratio: f32,
}

impl ResolvedSize {
    /// Resolution text is rasterized at.
    #[must_use]
    pub fn device_scale(&self) -> f32 {
        self.scale_x.max(self.scale_y)
    }
}

/// Compute output and buffer sizes for `template`.
///
/// # Errors
///
/// Returns [`RenderError::InvalidOptions`] for a non-positive pixel ratio or
/// zero width/height, and a core error for a template with an invalid
/// canvas size.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn resolve_size(template: &Template, options: &ExportOptions) -> RenderResult<ResolvedSize> {
    template.validate()?;
    let pixel_ratio = options.pixel_ratio;
    if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
        return Err(RenderError::InvalidOptions(format!(
            "pixel ratio must be positive, got {pixel_ratio}"
        )));
    }
    if options.width == Some(0) || options.height == Some(0) {
        return Err(RenderError::InvalidOptions(
            "width and height must be positive".to_string(),
        ));
    }

    let mut width = options
        .width
        .unwrap_or_else(|| (template.width.round() as u32).max(1));
    let mut height = options
        .height
        .unwrap_or_else(|| (template.height.round() as u32).max(1));

    if let Some(max) = options.max_dimension.filter(|max| *max > 0) {
        let longest = width.max(height);
        if longest > max {
            let ratio = max as f32 / longest as f32;
            width = ((width as f32 * ratio).round() as u32).max(1);
            height = ((height as f32 * ratio).round() as u32).max(1);
        }
    }

    let pixel_width = ((width as f32 * pixel_ratio).round() as u32).max(1);
    let pixel_height = ((height as f32 * pixel_ratio).round() as u32).max(1);

    Ok(ResolvedSize {
        width,
        height,
        pixel_width,
        pixel_height,
        scale_x: pixel_width as f32 / template.width,
        scale_y: pixel_height as f32 / template.height,
        pixel_ratio,
    })
}

/// Outcome of an asset preload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadReport {
    /// Distinct image sources referenced by the template.
    pub requested: usize,
    /// Sources already settled by an earlier preload.
    pub cached: usize,
    /// Sources loaded by this preload.
    pub loaded: usize,
    /// Sources that failed, in sorted order.
    pub failed: Vec<String>,
}

/// Renders templates to bitmaps.
///
/// A renderer keeps its decoded assets and resolved fonts between renders,
/// so exporting several variants of the same template fetches each image
/// once.
pub struct ExportRenderer {
    config: RendererConfig,
    fonts: FontBook,
    cache: AssetCache,
    fetcher: Arc<dyn AssetFetcher>,
}

impl std::fmt::Debug for ExportRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportRenderer")
            .field("config", &self.config)
            .field("fonts", &self.fonts)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl ExportRenderer {
    /// Create a renderer with system fonts and the default fetcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: RendererConfig) -> RenderResult<Self> {
        let fetcher = DefaultFetcher::new(&config.user_agent)?;
        let fonts = FontBook::new(&config.fonts);
        Ok(Self::with_parts(config, fonts, Arc::new(fetcher)))
    }

    /// Assemble a renderer from explicit parts.
    #[must_use]
    pub fn with_parts(
        config: RendererConfig,
        fonts: FontBook,
        fetcher: Arc<dyn AssetFetcher>,
    ) -> Self {
        Self {
            config,
            fonts,
            cache: AssetCache::new(),
            fetcher,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Font book in use.
    #[must_use]
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Decoded asset cache.
    #[must_use]
    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    /// Asset cache statistics so far.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Load every image `template` references that is not already settled.
    ///
    /// All loads run concurrently and this returns once every one of them
    /// has completed or failed. Failures are logged and remembered; they
    /// never fail the preload.
    pub async fn preload(&mut self, template: &Template) -> PreloadReport {
        let sources = image_sources(template);
        let mut report = PreloadReport {
            requested: sources.len(),
            ..PreloadReport::default()
        };
        let pending: Vec<String> = sources
            .into_iter()
            .filter(|src| !self.cache.is_settled(src))
            .map(str::to_string)
            .collect();
        report.cached = report.requested - pending.len();
        if pending.is_empty() {
            return report;
        }

        debug!("Preloading {} assets for {}", pending.len(), template.id);
        let fontdb = self.fonts.database();
        let timeout = self.config.asset_timeout;
        let loads = pending.into_iter().map(|src| {
            let fetcher = Arc::clone(&self.fetcher);
            let fontdb = Arc::clone(&fontdb);
            async move {
                let result = load_asset(fetcher.as_ref(), &src, &fontdb, timeout).await;
                (src, result)
            }
        });

        for (src, result) in join_all(loads).await {
            match result {
                Ok(pixmap) => {
                    debug!("Loaded {src} ({}x{})", pixmap.width(), pixmap.height());
                    self.cache.insert(src, pixmap);
                    report.loaded += 1;
                }
                Err(e) => {
                    warn!("Skipping image: {e}");
                    self.cache.mark_failed(src.clone(), e.to_string());
                    report.failed.push(src);
                }
            }
        }
        report
    }

    /// Resolve every font `template` needs. Returns how many resolved.
    pub fn preload_fonts(&mut self, template: &Template) -> usize {
        let mut requests: Vec<FontRequest> = Vec::new();
        let mut seen = HashSet::new();
        let styles = template
            .elements
            .iter()
            .filter_map(|element| element.kind.text_style().cloned())
            .chain(
                template
                    .elements
                    .iter()
                    .any(|element| matches!(element.kind, ElementKind::Video(_)))
                    .then(|| video_label_style(12.0)),
            );
        for style in styles {
            let request = FontRequest::from_style(&style);
            if seen.insert(request.clone()) {
                requests.push(request);
            }
        }
        self.fonts.preload(requests)
    }

    /// Render `template` with `options`.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid template or options, or if the output
    /// buffer cannot be allocated. Missing assets and fonts do not fail the
    /// render.
    pub async fn render(
        &mut self,
        template: &Template,
        options: &ExportOptions,
    ) -> RenderResult<ExportSurface> {
        let size = resolve_size(template, options)?;
        let started = Instant::now();

        let report = self.preload(template).await;
        self.preload_fonts(template);

        let mut pixmap = Pixmap::new(size.pixel_width, size.pixel_height).ok_or_else(|| {
            RenderError::Surface(format!(
                "cannot allocate {}x{} pixmap",
                size.pixel_width, size.pixel_height
            ))
        })?;
        pixmap.fill(to_color(Rgba::parse_or(
            &template.background_color,
            Rgba::WHITE,
        )));

        let base = Transform::from_scale(size.scale_x, size.scale_y);
        let device_scale = size.device_scale();
        for element in template.draw_order() {
            self.draw_element(&mut pixmap, element, base, device_scale);
        }

        info!(
            "Exported {} at {}x{} ({}x{} px, {} assets, {} failed) in {:?}",
            template.id,
            size.width,
            size.height,
            size.pixel_width,
            size.pixel_height,
            report.requested,
            report.failed.len(),
            started.elapsed()
        );
        Ok(ExportSurface::new(
            pixmap,
            size.width,
            size.height,
            size.pixel_ratio,
        ))
    }

    /// Release cached assets and report cache statistics.
    #[must_use]
    pub fn dispose(mut self) -> CacheStats {
        let stats = self.cache.stats();
        debug!(
            "Disposing renderer: {} images ({} bytes), {} hits, {} misses, {} failures",
            self.cache.len(),
            self.cache.size_bytes(),
            stats.hits,
            stats.misses,
            stats.failures
        );
        self.cache.clear();
        stats
    }

    fn draw_element(
        &mut self,
        canvas: &mut Pixmap,
        element: &Element,
        base: Transform,
        device_scale: f32,
    ) {
        let rect = element.transform.rect();
        if !rect.is_positive() {
            debug!("Skipping {}: empty box", element.id);
            return;
        }
        let center = rect.center();
        let transform = base
            .pre_translate(center.x, center.y)
            .pre_concat(Transform::from_rotate(element.transform.rotation))
            .pre_translate(-center.x, -center.y);
        let opacity = element.transform.opacity.clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return;
        }

        match &element.kind {
            ElementKind::Text(style) | ElementKind::Watermark(style) => {
                self.draw_text(canvas, style, rect, transform, opacity, device_scale);
            }
            ElementKind::Image(media) => {
                self.draw_image(canvas, element, media, rect, transform, opacity);
            }
            ElementKind::Video(_) => {
                self.draw_video(canvas, rect, transform, opacity, device_scale);
            }
        }
    }

    fn draw_text(
        &mut self,
        canvas: &mut Pixmap,
        style: &TextStyle,
        rect: Rect,
        transform: Transform,
        opacity: f32,
        device_scale: f32,
    ) {
        let text = style.display_text();
        if text.trim().is_empty() {
            return;
        }
        let font = self.fonts.resolve(&FontRequest::from_style(style));
        let Some(font) = font else {
            debug!("No font resolved for {:?}, skipping text", style.font_family);
            return;
        };

        let measure = GlyphMeasure::new(&font, style.font_size, style.letter_spacing);
        let layout = layout_text(
            &text,
            rect,
            style.text_align,
            style.font_size,
            style.line_height,
            &measure,
        );
        let color = Rgba::parse_or(&style.color, Rgba::BLACK).with_opacity(opacity);
        for line in &layout.lines {
            draw_line(canvas, &font, style, line, color, transform, device_scale);
        }
    }

    fn draw_image(
        &mut self,
        canvas: &mut Pixmap,
        element: &Element,
        media: &MediaSource,
        rect: Rect,
        transform: Transform,
        opacity: f32,
    ) {
        if media.src.trim().is_empty() {
            debug!("Skipping {}: no image selected", element.id);
            return;
        }
        let Some(image) = self.cache.get(&media.src) else {
            debug!("Skipping {}: image not loaded", element.id);
            return;
        };
        #[allow(clippy::cast_precision_loss)]
        let placement = fit::place(
            media.object_fit,
            image.width() as f32,
            image.height() as f32,
            rect,
        );
        let Some(placement) = placement else {
            return;
        };
        let dest = placement.dest;
        let Some(dest_rect) = tiny_skia::Rect::from_xywh(dest.x, dest.y, dest.width, dest.height)
        else {
            return;
        };

        let paint = Paint {
            shader: Pattern::new(
                (*image).as_ref(),
                SpreadMode::Pad,
                FilterQuality::Bicubic,
                opacity,
                placement.image_transform(),
            ),
            ..Paint::default()
        };
        canvas.fill_rect(dest_rect, &paint, transform, None);
    }

    fn draw_video(
        &mut self,
        canvas: &mut Pixmap,
        rect: Rect,
        transform: Transform,
        opacity: f32,
        device_scale: f32,
    ) {
        let Some(box_rect) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
        else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(to_color(Rgba::BLACK.with_opacity(opacity)));
        canvas.fill_rect(box_rect, &paint, transform, None);

        let label = video_label_style((rect.height.min(rect.width) * 0.1).clamp(12.0, 48.0));
        self.draw_text(canvas, &label, rect, transform, opacity, device_scale);
    }
}

fn video_label_style(font_size: f32) -> TextStyle {
    TextStyle {
        font_family: "sans-serif".to_string(),
        font_size,
        font_weight: FontWeight::BOLD,
        color: "#ffffff".to_string(),
        text_align: TextAlign::Center,
        ..TextStyle::new(VIDEO_LABEL)
    }
}

async fn load_asset(
    fetcher: &dyn AssetFetcher,
    src: &str,
    fontdb: &Arc<usvg::fontdb::Database>,
    timeout: Option<Duration>,
) -> RenderResult<Pixmap> {
    let bytes = match timeout {
        Some(limit) => tokio::time::timeout(limit, fetcher.fetch(src))
            .await
            .map_err(|_elapsed| RenderError::Timeout(src.to_string()))??,
        None => fetcher.fetch(src).await?,
    };
    decode_image(src, &bytes, fontdb)
}

fn draw_line(
    canvas: &mut Pixmap,
    font: &Font,
    style: &TextStyle,
    line: &LineLayout,
    color: Rgba,
    transform: Transform,
    device_scale: f32,
) {
    let Some(raster) = rasterize_line(
        font,
        &line.text,
        style.font_size,
        style.letter_spacing,
        device_scale,
        color,
    ) else {
        return;
    };
    let inv = 1.0 / device_scale;
    let left = line.x - raster.origin_x * inv;
    let top = line.center_y - raster.middle_y * inv;
    let paint = PixmapPaint {
        opacity: 1.0,
        blend_mode: BlendMode::SourceOver,
        quality: FilterQuality::Bilinear,
    };
    canvas.draw_pixmap(
        0,
        0,
        raster.pixmap.as_ref(),
        &paint,
        transform.pre_translate(left, top).pre_scale(inv, inv),
        None,
    );
}

fn to_color(color: Rgba) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a)
}

/// Render `template` with a fresh renderer and dispose it.
///
/// # Errors
///
/// See [`ExportRenderer::new`] and [`ExportRenderer::render`].
pub async fn export_template(
    template: &Template,
    options: &ExportOptions,
    config: RendererConfig,
) -> RenderResult<ExportSurface> {
    let mut renderer = ExportRenderer::new(config)?;
    let surface = renderer.render(template, options).await;
    let _stats = renderer.dispose();
    surface
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use stayframe_core::{Catalog, ObjectFit, Transform as Frame, VideoSource};

    #[derive(Default)]
    struct MapFetcher {
        assets: HashMap<String, Vec<u8>>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl AssetFetcher for MapFetcher {
        async fn fetch(&self, src: &str) -> RenderResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.assets
                .get(src)
                .cloned()
                .ok_or_else(|| RenderError::asset(src, "not found"))
        }
    }

    fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn image(id: &str, frame: Frame, src: &str, fit: ObjectFit) -> Element {
        Element::new(ElementKind::Image(MediaSource::new(src, fit)))
            .with_id(id)
            .with_transform(frame)
    }

    fn video(id: &str, frame: Frame) -> Element {
        Element::new(ElementKind::Video(VideoSource::new("clip.mp4", ObjectFit::Cover)))
            .with_id(id)
            .with_transform(frame)
    }

    fn renderer(fetcher: Arc<MapFetcher>) -> ExportRenderer {
        ExportRenderer::with_parts(RendererConfig::default(), FontBook::empty(), fetcher)
    }

    fn blank(width: f32, height: f32) -> Template {
        let mut template = Catalog::builtin().get("classic-meme").unwrap();
        template.width = width;
        template.height = height;
        template.background_color = "#00ff00".into();
        template.elements.clear();
        template
    }

    #[test]
    fn test_resolve_size_defaults_to_template() {
        let template = blank(800.0, 600.0);
        let size = resolve_size(&template, &ExportOptions::default()).unwrap();
        assert_eq!((size.width, size.height), (800, 600));
        assert_eq!((size.pixel_width, size.pixel_height), (800, 600));
        assert!((size.scale_x - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_resolve_size_max_dimension_and_ratio() {
        let template = blank(1080.0, 1920.0);
        let options = ExportOptions {
            max_dimension: Some(960),
            pixel_ratio: 2.0,
            ..ExportOptions::default()
        };
        let size = resolve_size(&template, &options).unwrap();
        assert_eq!((size.width, size.height), (540, 960));
        assert_eq!((size.pixel_width, size.pixel_height), (1080, 1920));
        assert!((size.device_scale() - 1.0).abs() < 1e-6);

        // Already small enough: untouched.
        let options = ExportOptions {
            max_dimension: Some(4000),
            ..ExportOptions::default()
        };
        assert_eq!(resolve_size(&template, &options).unwrap().height, 1920);
    }

    #[test]
    fn test_resolve_size_rejects_bad_options() {
        let template = blank(100.0, 100.0);
        for pixel_ratio in [0.0, -1.0, f32::NAN] {
            let options = ExportOptions {
                pixel_ratio,
                ..ExportOptions::default()
            };
            assert!(matches!(
                resolve_size(&template, &options),
                Err(RenderError::InvalidOptions(_))
            ));
        }
        let options = ExportOptions {
            width: Some(0),
            ..ExportOptions::default()
        };
        assert!(resolve_size(&template, &options).is_err());
        assert!(matches!(
            resolve_size(&blank(0.0, 100.0), &ExportOptions::default()),
            Err(RenderError::Core(_))
        ));
    }

    #[test]
    fn test_options_json_shape() {
        let options: ExportOptions =
            serde_json::from_str(r#"{"pixelRatio":2,"maxDimension":512}"#).unwrap();
        assert_eq!(options.max_dimension, Some(512));
        assert!((options.pixel_ratio - 2.0).abs() < f32::EPSILON);
        assert_eq!(options.width, None);
    }

    #[tokio::test]
    async fn test_background_fill() {
        let mut renderer = renderer(Arc::new(MapFetcher::default()));
        let surface = renderer
            .render(&blank(10.0, 10.0), &ExportOptions::default())
            .await
            .unwrap();
        assert_eq!(surface.pixel(5, 5), Some(Rgba::opaque(0, 255, 0)));
    }

    #[tokio::test]
    async fn test_each_source_fetched_once() {
        let mut assets = HashMap::new();
        assets.insert("red.png".to_string(), png(4, 4, [255, 0, 0, 255]));
        let fetcher = Arc::new(MapFetcher {
            assets,
            ..MapFetcher::default()
        });
        let mut template = blank(20.0, 10.0);
        for (i, x) in [0.0, 10.0].into_iter().enumerate() {
            template.elements.push(image(
                &format!("img-{i}"),
                Frame::from_xywh(x, 0.0, 10.0, 10.0),
                "red.png",
                ObjectFit::Cover,
            ));
        }
        template.elements.push(image(
            "missing",
            Frame::from_xywh(0.0, 0.0, 5.0, 5.0),
            "missing.png",
            ObjectFit::Cover,
        ));

        let mut renderer = renderer(Arc::clone(&fetcher));
        let surface = renderer
            .render(&template, &ExportOptions::default())
            .await
            .unwrap();
        renderer
            .render(&template, &ExportOptions::default())
            .await
            .unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(surface.pixel(15, 5), Some(Rgba::opaque(255, 0, 0)));

        let report = renderer.preload(&template).await;
        assert_eq!((report.requested, report.cached), (2, 2));
        assert_eq!(renderer.dispose().failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_asset_timeout_is_a_failure() {
        let mut assets = HashMap::new();
        assets.insert("slow.png".to_string(), png(1, 1, [0, 0, 0, 255]));
        let fetcher = Arc::new(MapFetcher {
            assets,
            delay: Some(Duration::from_secs(30)),
            ..MapFetcher::default()
        });
        let config = RendererConfig {
            asset_timeout: Some(Duration::from_secs(1)),
            ..RendererConfig::default()
        };
        let mut renderer = ExportRenderer::with_parts(config, FontBook::empty(), fetcher);
        let mut template = blank(10.0, 10.0);
        template.elements.push(image(
            "slow",
            Frame::from_xywh(0.0, 0.0, 10.0, 10.0),
            "slow.png",
            ObjectFit::Fill,
        ));
        let report = renderer.preload(&template).await;
        assert_eq!(report.failed, vec!["slow.png".to_string()]);
        assert!(renderer
            .cache()
            .failure("slow.png")
            .unwrap()
            .contains("Timed out"));
    }

    #[tokio::test]
    async fn test_video_placeholder_is_black() {
        let mut template = blank(100.0, 100.0);
        template
            .elements
            .push(video("clip", Frame::from_xywh(0.0, 0.0, 100.0, 50.0)));
        let mut renderer = renderer(Arc::new(MapFetcher::default()));
        let surface = renderer
            .render(&template, &ExportOptions::default())
            .await
            .unwrap();
        assert_eq!(surface.pixel(2, 2), Some(Rgba::BLACK));
        assert_eq!(surface.pixel(50, 80), Some(Rgba::opaque(0, 255, 0)));
    }

    #[tokio::test]
    async fn test_text_without_fonts_is_skipped() {
        let mut template = blank(100.0, 100.0);
        let mut style = TextStyle::new("HELLO");
        style.color = "#ff0000".into();
        template.elements.push(
            Element::new(ElementKind::Text(style))
                .with_id("caption")
                .with_transform(Frame::from_xywh(0.0, 0.0, 100.0, 100.0)),
        );
        let mut renderer = renderer(Arc::new(MapFetcher::default()));
        let surface = renderer
            .render(&template, &ExportOptions::default())
            .await
            .unwrap();
        for y in 0..100 {
            for x in 0..100 {
                assert_eq!(surface.pixel(x, y), Some(Rgba::opaque(0, 255, 0)));
            }
        }
        assert_eq!(renderer.fonts().resolved_count(), 1);
    }

    #[tokio::test]
    async fn test_rotation_about_center() {
        let mut template = blank(100.0, 100.0);
        let mut frame = Frame::from_xywh(40.0, 0.0, 20.0, 100.0);
        frame.rotation = 90.0;
        template.elements.push(video("bar", frame));
        let mut renderer = renderer(Arc::new(MapFetcher::default()));
        let surface = renderer
            .render(&template, &ExportOptions::default())
            .await
            .unwrap();
        // A vertical bar turned a quarter becomes horizontal through the center.
        assert_eq!(surface.pixel(5, 50), Some(Rgba::BLACK));
        assert_eq!(surface.pixel(50, 5), Some(Rgba::opaque(0, 255, 0)));
    }
}
