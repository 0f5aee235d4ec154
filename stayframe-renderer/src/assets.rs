//! Asset fetching and decoding.
//!
//! Supports loading images from `data:` URIs, HTTP(S) URLs and local files.
//! Raster formats decode with the `image` crate; SVG rasterizes with resvg.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use stayframe_core::{ElementKind, Template};
use tiny_skia::{ColorU8, Pixmap};
use url::Url;

use crate::error::{RenderError, RenderResult};

/// Where an asset URL points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// Inline `data:` URI.
    Data,
    /// Remote HTTP(S) resource.
    Http(Url),
    /// Local file.
    File(PathBuf),
}

impl AssetSource {
    /// Classify an asset URL.
    ///
    /// Anything that is not a URL with a known scheme is treated as a local
    /// path.
    ///
    /// # Errors
    ///
    /// Returns an error for URLs with an unsupported scheme.
    pub fn parse(src: &str) -> RenderResult<Self> {
        if src.starts_with("data:") {
            return Ok(Self::Data);
        }
        match Url::parse(src) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Self::Http(url)),
                "file" => url
                    .to_file_path()
                    .map(Self::File)
                    .map_err(|()| RenderError::asset(src, "invalid file URL")),
                // Windows drive letters parse as one-letter schemes.
                scheme if scheme.len() == 1 => Ok(Self::File(PathBuf::from(src))),
                scheme => Err(RenderError::asset(
                    src,
                    format!("unsupported scheme '{scheme}'"),
                )),
            },
            Err(_) => Ok(Self::File(PathBuf::from(src))),
        }
    }
}

/// Distinct image URLs referenced by a template, in sorted order.
///
/// Only image elements count; empty sources are ignored.
#[must_use]
pub fn image_sources(template: &Template) -> BTreeSet<&str> {
    template
        .elements
        .iter()
        .filter_map(|element| match &element.kind {
            ElementKind::Image(media) if !media.src.trim().is_empty() => Some(media.src.as_str()),
            _ => None,
        })
        .collect()
}

/// Decode the payload of a `data:` URI.
///
/// Supports formats like: `data:image/png;base64,iVBORw0KGgo...` and
/// percent-encoded payloads such as `data:image/svg+xml,%3Csvg...`.
///
/// # Errors
///
/// Returns an error if the URI is malformed.
pub fn decode_data_uri(uri: &str) -> RenderResult<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::asset(uri, "not a data URI"))?;
    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::asset(uri, "missing comma"))?;

    if metadata.ends_with(";base64") {
        use base64::Engine;
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| RenderError::asset(truncate(uri), format!("bad base64: {e}")))
    } else {
        percent_decode(payload)
            .ok_or_else(|| RenderError::asset(truncate(uri), "bad percent-encoding"))
    }
}

fn percent_decode(input: &str) -> Option<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = input.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Some(out)
}

/// Shorten long data URIs for error messages.
fn truncate(src: &str) -> String {
    const MAX: usize = 64;
    match src.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &src[..idx]),
        None => src.to_string(),
    }
}

/// Fetches raw asset bytes.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch the bytes behind `src`.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset cannot be retrieved.
    async fn fetch(&self, src: &str) -> RenderResult<Vec<u8>>;
}

/// Fetcher for data URIs, HTTP(S) via reqwest and local files.
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    client: reqwest::Client,
}

impl DefaultFetcher {
    /// Create a fetcher with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(user_agent: &str) -> RenderResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| RenderError::InvalidOptions(format!("HTTP client: {e}")))?;
        Ok(Self::with_client(client))
    }

    /// Use an existing HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetFetcher for DefaultFetcher {
    async fn fetch(&self, src: &str) -> RenderResult<Vec<u8>> {
        match AssetSource::parse(src)? {
            AssetSource::Data => decode_data_uri(src),
            AssetSource::Http(url) => {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|e| RenderError::asset(src, e))?;
                let body = response.bytes().await.map_err(|e| RenderError::asset(src, e))?;
                Ok(body.to_vec())
            }
            AssetSource::File(path) => tokio::fs::read(&path)
                .await
                .map_err(|e| RenderError::asset(src, e)),
        }
    }
}

/// Whether `bytes` look like an SVG document.
#[must_use]
pub fn is_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    trimmed.starts_with("<svg") || (trimmed.starts_with("<?xml") && trimmed.contains("<svg"))
}

/// Decode image bytes into a premultiplied pixmap.
///
/// SVG documents are rasterized at their intrinsic size using `fontdb` for
/// any text they contain.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image.
pub fn decode_image(
    src: &str,
    bytes: &[u8],
    fontdb: &Arc<usvg::fontdb::Database>,
) -> RenderResult<Pixmap> {
    if is_svg(bytes) {
        return rasterize_svg(src, bytes, fontdb);
    }

    let rgba = image::load_from_memory(bytes)
        .map_err(|e| RenderError::asset(truncate(src), format!("decode failed: {e}")))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| RenderError::asset(truncate(src), "image has zero size"))?;
    for (dst, px) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = px.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

fn rasterize_svg(
    src: &str,
    bytes: &[u8],
    fontdb: &Arc<usvg::fontdb::Database>,
) -> RenderResult<Pixmap> {
    let options = usvg::Options {
        fontdb: Arc::clone(fontdb),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_data(bytes, &options)
        .map_err(|e| RenderError::asset(truncate(src), format!("SVG parsing failed: {e}")))?;
    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or_else(|| RenderError::asset(truncate(src), "SVG has zero size"))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    Ok(pixmap)
}
