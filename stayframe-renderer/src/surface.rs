//! Finished export surface and output encoding.

use std::io::Cursor;
use std::str::FromStr;

use base64::Engine;
use image::ImageEncoder;
use serde::{Deserialize, Serialize};
use stayframe_core::Rgba;
use tiny_skia::Pixmap;

use crate::error::{RenderError, RenderResult};

/// Default JPEG quality, matching the browser canvas default.
pub const DEFAULT_QUALITY: f32 = 0.92;

/// Output image format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG, lossless with alpha.
    #[default]
    Png,
    /// JPEG, alpha flattened onto white.
    Jpeg,
    /// WebP, lossless.
    WebP,
}

impl ImageFormat {
    /// MIME type.
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Conventional file extension.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::from_extension(&lower)
            .or_else(|| match lower.as_str() {
                "image/png" => Some(Self::Png),
                "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
                "image/webp" => Some(Self::WebP),
                _ => None,
            })
            .ok_or_else(|| RenderError::InvalidOptions(format!("unknown image format '{s}'")))
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Encoded image bytes with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// MIME type.
    pub mime: &'static str,
}

/// A rendered template, ready to encode.
#[derive(Debug, Clone)]
pub struct ExportSurface {
    pixmap: Pixmap,
    logical_width: u32,
    logical_height: u32,
    pixel_ratio: f32,
}

impl ExportSurface {
    pub(crate) fn new(
        pixmap: Pixmap,
        logical_width: u32,
        logical_height: u32,
        pixel_ratio: f32,
    ) -> Self {
        Self {
            pixmap,
            logical_width,
            logical_height,
            pixel_ratio,
        }
    }

    /// Buffer width in device pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Buffer height in device pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Size before the pixel ratio was applied.
    #[must_use]
    pub fn logical_size(&self) -> (u32, u32) {
        (self.logical_width, self.logical_height)
    }

    /// Device pixels per logical pixel.
    #[must_use]
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Straight-alpha color at a device pixel.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let c = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba {
            r: c.red(),
            g: c.green(),
            b: c.blue(),
            a: c.alpha(),
        })
    }

    /// The underlying premultiplied pixmap.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha RGBA bytes, row-major.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    /// Encode the surface.
    ///
    /// `quality` (0-1) applies to JPEG only.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode(&self, format: ImageFormat, quality: f32) -> RenderResult<Vec<u8>> {
        match format {
            ImageFormat::Png => self
                .pixmap
                .encode_png()
                .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}"))),
            ImageFormat::Jpeg => self.encode_jpeg(quality),
            ImageFormat::WebP => {
                let mut buf = Cursor::new(Vec::new());
                image::codecs::webp::WebPEncoder::new_lossless(&mut buf)
                    .write_image(
                        &self.to_rgba8(),
                        self.width(),
                        self.height(),
                        image::ColorType::Rgba8.into(),
                    )
                    .map_err(|e| RenderError::Encode(format!("WebP encoding failed: {e}")))?;
                Ok(buf.into_inner())
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn encode_jpeg(&self, quality: f32) -> RenderResult<Vec<u8>> {
        let quality = if quality.is_finite() {
            quality.clamp(0.0, 1.0)
        } else {
            DEFAULT_QUALITY
        };
        let quality = ((quality * 100.0).round() as u8).max(1);

        let mut rgb = Vec::with_capacity(self.pixmap.pixels().len() * 3);
        for p in self.pixmap.pixels() {
            // Premultiplied over white: c + 255 * (1 - a).
            let inv = 255 - u16::from(p.alpha());
            for c in [p.red(), p.green(), p.blue()] {
                rgb.push((u16::from(c) + inv).min(255) as u8);
            }
        }

        let mut buf = Cursor::new(Vec::new());
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality)
            .write_image(&rgb, self.width(), self.height(), image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;
        Ok(buf.into_inner())
    }

    /// Encode and wrap as a `data:` URL.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_data_url(&self, format: ImageFormat, quality: f32) -> RenderResult<String> {
        let bytes = self.encode(format, quality)?;
        Ok(format!(
            "data:{};base64,{}",
            format.mime(),
            base64::engine::general_purpose::STANDARD.encode(bytes)
        ))
    }

    /// Encode into a [`Blob`].
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_blob(&self, format: ImageFormat, quality: f32) -> RenderResult<Blob> {
        Ok(Blob {
            bytes: self.encode(format, quality)?,
            mime: format.mime(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_red() -> ExportSurface {
        let mut pixmap = Pixmap::new(4, 2).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(255, 0, 0, 128));
        ExportSurface::new(pixmap, 2, 1, 2.0)
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<ImageFormat>().unwrap(), ImageFormat::Png);
        assert_eq!("jpeg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert_eq!("image/webp".parse::<ImageFormat>().unwrap(), ImageFormat::WebP);
        assert!("gif".parse::<ImageFormat>().is_err());
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_sizes_and_pixels() {
        let surface = half_red();
        assert_eq!((surface.width(), surface.height()), (4, 2));
        assert_eq!(surface.logical_size(), (2, 1));
        let px = surface.pixel(0, 0).unwrap();
        assert_eq!(px.r, 255);
        assert!((i16::from(px.a) - 128).abs() <= 1);
        assert!(surface.pixel(4, 0).is_none());
    }

    #[test]
    fn test_png_export_produces_valid_bytes() {
        let png = half_red().encode(ImageFormat::Png, DEFAULT_QUALITY).unwrap();
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 2));
    }

    #[test]
    fn test_jpeg_flattens_onto_white() {
        let jpeg = half_red().encode(ImageFormat::Jpeg, 1.0).unwrap();
        assert_eq!(&jpeg[0..3], &[0xFF, 0xD8, 0xFF]);
        let decoded = image::load_from_memory(&jpeg).unwrap().to_rgb8();
        let [r, g, b] = decoded.get_pixel(1, 1).0;
        assert!(r > 240, "r = {r}");
        // Half-transparent red over white is pink, not dark red.
        assert!(g > 100 && b > 100, "g = {g}, b = {b}");
    }

    #[test]
    fn test_webp_is_riff() {
        let webp = half_red().encode(ImageFormat::WebP, DEFAULT_QUALITY).unwrap();
        assert_eq!(&webp[0..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");
    }

    #[test]
    fn test_data_url_and_blob() {
        let surface = half_red();
        let url = surface.to_data_url(ImageFormat::Png, DEFAULT_QUALITY).unwrap();
        assert!(url.starts_with("data:image/png;base64,iVBOR"));
        let blob = surface.to_blob(ImageFormat::Jpeg, 0.5).unwrap();
        assert_eq!(blob.mime, "image/jpeg");
        assert!(!blob.bytes.is_empty());
    }
}
