//! # StayFrame CLI
//!
//! Command-line front end for the StayFrame template engine.
//!
//! ## Usage
//!
//! ```bash
//! stayframe list --app-type meme
//! stayframe layout --container 1280x720 --template story-reel --zoom 1.5
//! stayframe export --template classic-meme --set top-text="HELLO" \
//!     --image background=https://example.com/cat.jpg --out meme.png
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `ExportArgs` converts into `ExportOptions` and `RendererConfig`
//! - Text and image overrides go through `EditorStore`, so locked
//!   watermarks stay locked

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use stayframe_core::{
    compute_layout, AppType, Catalog, ContentLayout, EditorSettings, EditorStore, ElementId,
    PropertyUpdate, Template,
};
use stayframe_renderer::{
    ExportOptions, ExportRenderer, FontConfig, ImageFormat, RendererConfig, DEFAULT_QUALITY,
    DEFAULT_USER_AGENT,
};

/// Command-line arguments for stayframe.
#[derive(Debug, Clone, Parser)]
#[command(name = "stayframe")]
#[command(about = "StayFrame template catalog, layout and export tool")]
#[command(version)]
pub struct CliArgs {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List catalog templates
    List(ListArgs),
    /// Compute where a template lands inside a container
    Layout(LayoutArgs),
    /// Render a template to an image file
    Export(ExportArgs),
}

/// Arguments for `stayframe list`.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Only templates for this app (quote, meme, reel)
    #[arg(long)]
    pub app_type: Option<AppType>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `stayframe layout`.
#[derive(Debug, Clone, Args)]
pub struct LayoutArgs {
    /// Container size, e.g. 1280x720
    #[arg(long)]
    pub container: Size,

    /// Catalog template id
    #[arg(long)]
    pub template: String,

    /// Zoom multiplier
    #[arg(long, default_value = "1.0")]
    pub zoom: f32,
}

/// Where the template to export comes from.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct TemplateSource {
    /// Catalog template id
    #[arg(long)]
    pub template: Option<String>,

    /// Template JSON file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Arguments for `stayframe export`.
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Template to export
    #[command(flatten)]
    pub source: TemplateSource,

    /// Output file
    #[arg(long, short)]
    pub out: PathBuf,

    /// Output format (png, jpeg, webp); defaults from the output extension
    #[arg(long)]
    pub format: Option<ImageFormat>,

    /// JPEG quality from 0 to 1
    #[arg(long, env = "STAYFRAME_QUALITY", default_value_t = DEFAULT_QUALITY)]
    pub quality: f32,

    /// Output width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Output height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Cap on the longer output side
    #[arg(long, env = "STAYFRAME_MAX_DIMENSION")]
    pub max_dimension: Option<u32>,

    /// Device pixels per output pixel
    #[arg(long, env = "STAYFRAME_PIXEL_RATIO", default_value = "1.0")]
    pub pixel_ratio: f32,

    /// Replace the text of an element: ELEMENT=TEXT
    #[arg(long = "set", value_name = "ELEMENT=TEXT")]
    pub set: Vec<Assignment>,

    /// Replace the source of an image or video element: ELEMENT=URL
    #[arg(long = "image", value_name = "ELEMENT=URL")]
    pub image: Vec<Assignment>,

    /// Extra font directory (repeatable)
    #[arg(long = "font-dir", env = "STAYFRAME_FONT_DIRS", value_delimiter = ',')]
    pub font_dirs: Vec<PathBuf>,

    /// Do not load installed system fonts
    #[arg(long)]
    pub no_system_fonts: bool,

    /// Give up on an asset after this many milliseconds
    #[arg(long, env = "STAYFRAME_ASSET_TIMEOUT_MS")]
    pub asset_timeout_ms: Option<u64>,

    /// Allow editing locked watermarks
    #[arg(long, env = "STAYFRAME_PRO")]
    pub pro: bool,
}

/// A `WIDTHxHEIGHT` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f32>()
                .map_err(|e| format!("bad dimension '{v}': {e}"))
        };
        Ok(Self {
            width: parse(w)?,
            height: parse(h)?,
        })
    }
}

/// An `ELEMENT=VALUE` override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// Target element.
    pub element: ElementId,
    /// New value.
    pub value: String,
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((element, value)) if !element.trim().is_empty() => Ok(Self {
                element: ElementId::from(element.trim()),
                value: value.to_string(),
            }),
            _ => Err(format!("expected ELEMENT=VALUE, got '{s}'")),
        }
    }
}

impl From<&ExportArgs> for ExportOptions {
    fn from(args: &ExportArgs) -> Self {
        Self {
            width: args.width,
            height: args.height,
            pixel_ratio: args.pixel_ratio,
            max_dimension: args.max_dimension,
        }
    }
}

impl From<&ExportArgs> for RendererConfig {
    fn from(args: &ExportArgs) -> Self {
        Self {
            fonts: FontConfig {
                load_system_fonts: !args.no_system_fonts,
                font_dirs: args.font_dirs.clone(),
            },
            asset_timeout: args.asset_timeout_ms.map(Duration::from_millis),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// One row of `stayframe list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    /// Template id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Target app.
    pub app_type: AppType,
    /// Catalog grouping.
    pub category: String,
    /// Canvas size.
    pub size: String,
    /// Number of elements.
    pub elements: usize,
}

impl From<&Template> for TemplateSummary {
    fn from(template: &Template) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            app_type: template.app_type,
            category: template.category.clone(),
            size: format!("{}x{}", template.width, template.height),
            elements: template.elements.len(),
        }
    }
}

/// Catalog templates, optionally filtered by app.
#[must_use]
pub fn list_templates(catalog: &Catalog, app_type: Option<AppType>) -> Vec<TemplateSummary> {
    catalog
        .all()
        .iter()
        .filter(|t| app_type.is_none() || app_type == Some(t.app_type))
        .map(TemplateSummary::from)
        .collect()
}

fn app_label(app_type: AppType) -> &'static str {
    match app_type {
        AppType::Quote => "quote",
        AppType::Meme => "meme",
        AppType::Reel => "reel",
    }
}

/// Run `stayframe list`, writing to `out`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn run_list(args: &ListArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let rows = list_templates(&Catalog::builtin(), args.app_type);
    if args.json {
        serde_json::to_writer_pretty(&mut *out, &rows)?;
        writeln!(out)?;
        return Ok(());
    }
    for row in rows {
        writeln!(
            out,
            "{:<16} {:<10} {:>11}  {}",
            row.id,
            app_label(row.app_type),
            row.size,
            row.name
        )?;
    }
    Ok(())
}

/// Compute the layout for `args`.
///
/// # Errors
///
/// Returns an error if the template id is unknown.
pub fn layout_for(args: &LayoutArgs) -> anyhow::Result<ContentLayout> {
    let template = Catalog::builtin()
        .get(&args.template)
        .with_context(|| format!("Unknown template '{}'", args.template))?;
    Ok(compute_layout(
        args.container.width,
        args.container.height,
        template.width,
        template.height,
        args.zoom,
    ))
}

/// Run `stayframe layout`, printing the layout as JSON.
///
/// # Errors
///
/// Returns an error if the template id is unknown or writing fails.
pub fn run_layout(args: &LayoutArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let layout = layout_for(args)?;
    serde_json::to_writer_pretty(&mut *out, &layout)?;
    writeln!(out)?;
    Ok(())
}

/// Load the template named by `source`.
///
/// # Errors
///
/// Returns an error for an unknown id or an unreadable or invalid file.
pub fn load_template(source: &TemplateSource) -> anyhow::Result<Template> {
    if let Some(path) = &source.file {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template {}", path.display()))?;
        return Template::from_json(&json)
            .with_context(|| format!("Invalid template JSON in {}", path.display()));
    }
    let id = source
        .template
        .as_deref()
        .context("Either --template or --file is required")?;
    Catalog::builtin()
        .get(id)
        .with_context(|| format!("Unknown template '{id}'"))
}

/// Apply `--set` and `--image` overrides through the editor store.
///
/// # Errors
///
/// Returns an error if an element does not exist, is locked, or does not
/// accept the override.
pub fn apply_overrides(
    template: Template,
    texts: &[Assignment],
    images: &[Assignment],
    pro_mode: bool,
) -> anyhow::Result<Template> {
    let mut store = EditorStore::new(EditorSettings {
        pro_mode,
        ..EditorSettings::default()
    });
    store.load_template(template)?;

    let updates = texts
        .iter()
        .map(|a| (a, PropertyUpdate::Content(a.value.clone())))
        .chain(
            images
                .iter()
                .map(|a| (a, PropertyUpdate::Source(a.value.clone()))),
        );
    for (assignment, update) in updates {
        store
            .apply(&assignment.element, &update)
            .with_context(|| format!("Cannot set {} of {}", update.name(), assignment.element))?;
    }
    store.snapshot().context("Template vanished from the store")
}

/// Output format for `args`: explicit, else from the file extension, else PNG.
#[must_use]
pub fn output_format(args: &ExportArgs) -> ImageFormat {
    args.format.unwrap_or_else(|| {
        args.out
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .unwrap_or_default()
    })
}

/// What `stayframe export` wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Output file.
    pub path: PathBuf,
    /// Format written.
    pub format: ImageFormat,
    /// Buffer width in pixels.
    pub width: u32,
    /// Buffer height in pixels.
    pub height: u32,
    /// Bytes written.
    pub bytes: usize,
}

/// Run `stayframe export`.
///
/// # Errors
///
/// Returns an error if the template cannot be loaded or edited, rendering
/// or encoding fails, or the output cannot be written.
pub async fn run_export(args: &ExportArgs) -> anyhow::Result<ExportSummary> {
    let template = load_template(&args.source)?;
    let template = apply_overrides(template, &args.set, &args.image, args.pro)?;
    let format = output_format(args);

    let mut renderer =
        ExportRenderer::new(RendererConfig::from(args)).context("Failed to create renderer")?;
    let surface = renderer
        .render(&template, &ExportOptions::from(args))
        .await
        .with_context(|| format!("Failed to render {}", template.id))?;
    let stats = renderer.dispose();
    tracing::debug!(
        "Asset cache: {} hits, {} misses, {} failures",
        stats.hits,
        stats.misses,
        stats.failures
    );

    let bytes = surface
        .encode(format, args.quality)
        .with_context(|| format!("Failed to encode {format}"))?;
    write_output(&args.out, &bytes).await?;

    tracing::info!(
        "Wrote {} ({}x{}, {} bytes)",
        args.out.display(),
        surface.width(),
        surface.height(),
        bytes.len()
    );
    Ok(ExportSummary {
        path: args.out.clone(),
        format,
        width: surface.width(),
        height: surface.height(),
        bytes: bytes.len(),
    })
}

async fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
