//! Template elements - the layers a template is composed of.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Point, Rect};

/// Unique identifier for an element within a template.
///
/// Catalog elements use readable ids (`"top-text"`); elements created at
/// runtime get a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    Left,
    /// Centered.
    #[default]
    Center,
    /// Flush right.
    Right,
}

/// Font slant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic (oblique faces are accepted as italic).
    #[serde(alias = "oblique")]
    Italic,
}

/// Case transform applied to text content before layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    /// Content is used as written.
    #[default]
    None,
    /// All characters upper-cased.
    Uppercase,
    /// All characters lower-cased.
    Lowercase,
    /// First letter of each word upper-cased.
    Capitalize,
}

impl TextTransform {
    /// Apply the transform to `text`.
    #[must_use]
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::None => text.to_string(),
            Self::Uppercase => text.to_uppercase(),
            Self::Lowercase => text.to_lowercase(),
            Self::Capitalize => {
                let mut out = String::with_capacity(text.len());
                let mut at_word_start = true;
                for ch in text.chars() {
                    if at_word_start && ch.is_alphabetic() {
                        out.extend(ch.to_uppercase());
                    } else {
                        out.push(ch);
                    }
                    at_word_start = ch.is_whitespace();
                }
                out
            }
        }
    }
}

/// Numeric font weight (100-900).
///
/// Deserializes from numbers, numeric strings, or `"normal"`/`"bold"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "FontWeightRepr", into = "u16")]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// Regular weight.
    pub const NORMAL: Self = Self(400);
    /// Bold weight.
    pub const BOLD: Self = Self(700);
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl From<FontWeight> for u16 {
    fn from(weight: FontWeight) -> Self {
        weight.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FontWeightRepr {
    Number(u16),
    Text(String),
}

impl TryFrom<FontWeightRepr> for FontWeight {
    type Error = String;

    fn try_from(repr: FontWeightRepr) -> Result<Self, Self::Error> {
        let value = match repr {
            FontWeightRepr::Number(n) => n,
            FontWeightRepr::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "normal" | "regular" => 400,
                "bold" => 700,
                "lighter" => 300,
                "bolder" => 800,
                other => other
                    .parse()
                    .map_err(|_| format!("unknown font weight: {s}"))?,
            },
        };
        if (1..=1000).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("font weight out of range: {value}"))
        }
    }
}

/// How media is fitted into its element box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectFit {
    /// Fill the box, cropping the overflowing axis.
    #[default]
    Cover,
    /// Fit inside the box, letterboxing the remainder.
    Contain,
    /// Stretch to the box.
    Fill,
    /// Natural size.
    None,
    /// The smaller of `none` and `contain`.
    ScaleDown,
}

fn default_font_family() -> String {
    "Inter, sans-serif".to_string()
}

fn default_font_size() -> f32 {
    32.0
}

fn default_color() -> String {
    "#000000".to_string()
}

fn default_line_height() -> f32 {
    1.2
}

fn default_opacity() -> f32 {
    1.0
}

fn default_true() -> bool {
    true
}

/// Typography and content of a text or watermark element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    /// Text content; newlines are preserved.
    pub content: String,
    /// CSS font stack, e.g. `"Impact, Arial Black, sans-serif"`.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Font size in template pixels.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Font weight.
    #[serde(default)]
    pub font_weight: FontWeight,
    /// Font slant.
    #[serde(default)]
    pub font_style: FontStyle,
    /// CSS color.
    #[serde(default = "default_color")]
    pub color: String,
    /// Horizontal alignment.
    #[serde(default)]
    pub text_align: TextAlign,
    /// Line height as a multiple of the font size.
    #[serde(default = "default_line_height")]
    pub line_height: f32,
    /// Extra spacing after each character, in template pixels.
    #[serde(default)]
    pub letter_spacing: f32,
    /// Case transform.
    #[serde(default)]
    pub text_transform: TextTransform,
}

impl TextStyle {
    /// Create a style with default typography.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            font_weight: FontWeight::default(),
            font_style: FontStyle::default(),
            color: default_color(),
            text_align: TextAlign::default(),
            line_height: default_line_height(),
            letter_spacing: 0.0,
            text_transform: TextTransform::default(),
        }
    }

    /// Content after the case transform.
    #[must_use]
    pub fn display_text(&self) -> String {
        self.text_transform.apply(&self.content)
    }
}

/// An image or video source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSource {
    /// Opaque asset URL; empty until the user picks an asset.
    #[serde(default)]
    pub src: String,
    /// Fit policy.
    #[serde(default)]
    pub object_fit: ObjectFit,
}

impl MediaSource {
    /// Create a media source.
    #[must_use]
    pub fn new(src: impl Into<String>, object_fit: ObjectFit) -> Self {
        Self {
            src: src.into(),
            object_fit,
        }
    }
}

/// Playback flags of a video element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PlaybackFlags {
    /// Start playing automatically.
    #[serde(default = "default_true")]
    pub autoplay: bool,
    /// Restart at the end.
    #[serde(default = "default_true", rename = "loop")]
    pub looped: bool,
    /// Start muted.
    #[serde(default = "default_true")]
    pub muted: bool,
    /// Show player controls.
    #[serde(default)]
    pub controls: bool,
}

impl Default for PlaybackFlags {
    fn default() -> Self {
        Self {
            autoplay: true,
            looped: true,
            muted: true,
            controls: false,
        }
    }
}

/// A video clip with playback flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSource {
    /// Clip source.
    #[serde(flatten)]
    pub media: MediaSource,
    /// Playback behavior in the interactive view.
    #[serde(flatten)]
    pub playback: PlaybackFlags,
}

impl VideoSource {
    /// Create a video source with default playback flags.
    #[must_use]
    pub fn new(src: impl Into<String>, object_fit: ObjectFit) -> Self {
        Self {
            media: MediaSource::new(src, object_fit),
            playback: PlaybackFlags::default(),
        }
    }
}

/// The type of content an element contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// Editable, draggable text.
    Text(TextStyle),

    /// A still image.
    Image(MediaSource),

    /// A video clip.
    Video(VideoSource),

    /// Attribution text; never interactive and usually locked.
    Watermark(TextStyle),
}

impl ElementKind {
    /// Short type name as used in JSON.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Video(_) => "video",
            Self::Watermark(_) => "watermark",
        }
    }

    /// Text style for text and watermark elements.
    #[must_use]
    pub fn text_style(&self) -> Option<&TextStyle> {
        match self {
            Self::Text(style) | Self::Watermark(style) => Some(style),
            Self::Image(_) | Self::Video(_) => None,
        }
    }

    /// Media source for image and video elements.
    #[must_use]
    pub fn media(&self) -> Option<&MediaSource> {
        match self {
            Self::Image(media) | Self::Video(VideoSource { media, .. }) => Some(media),
            Self::Text(_) | Self::Watermark(_) => None,
        }
    }
}

/// Position, size and compositing attributes of an element, in template pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Rotation in degrees, clockwise, about the element center.
    #[serde(default)]
    pub rotation: f32,
    /// Opacity from 0 to 1.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Optional z-index for layering; unset sorts as 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

impl Transform {
    /// Create a transform with no rotation, full opacity and no z-index.
    #[must_use]
    pub const fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
            opacity: 1.0,
            z_index: None,
        }
    }

    /// The element box.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_xywh(0.0, 0.0, 100.0, 100.0)
    }
}

/// A template element with content and transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Position and size.
    #[serde(flatten)]
    pub transform: Transform,
    /// Element content type.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Create a new element with the given kind and a generated id.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            transform: Transform::default(),
            kind,
        }
    }

    /// Set the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ElementId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the z-index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.transform.z_index = Some(z_index);
        self
    }

    /// Whether clicks and hit tests see this element.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        !matches!(self.kind, ElementKind::Watermark(_))
    }

    /// Whether the element can be repositioned by dragging.
    #[must_use]
    pub fn is_draggable(&self) -> bool {
        matches!(self.kind, ElementKind::Text(_))
    }

    /// Check if a point (in template coordinates) is within this element,
    /// taking its rotation into account.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        let rect = self.transform.rect();
        let local = point.rotate_around(rect.center(), -self.transform.rotation);
        rect.contains(local)
    }
}
