//! Typed property edits coming from the element inspector.

use serde::{Deserialize, Serialize};

use crate::element::{
    Element, ElementKind, FontStyle, FontWeight, ObjectFit, PlaybackFlags, TextAlign,
    TextStyle, TextTransform,
};
use crate::{CoreError, CoreResult};

/// A single property edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "property", content = "value", rename_all = "camelCase")]
pub enum PropertyUpdate {
    /// Move to `(x, y)` in template pixels.
    Position {
        /// X position.
        x: f32,
        /// Y position.
        y: f32,
    },
    /// Resize to `width` x `height`.
    Size {
        /// Width.
        width: f32,
        /// Height.
        height: f32,
    },
    /// Rotation in degrees.
    Rotation(f32),
    /// Opacity, clamped to 0-1.
    Opacity(f32),
    /// Layer order; `None` resets to catalog order.
    ZIndex(Option<i32>),
    /// Text content.
    Content(String),
    /// CSS font stack.
    FontFamily(String),
    /// Font size in template pixels.
    FontSize(f32),
    /// Font weight.
    FontWeight(FontWeight),
    /// Font slant.
    FontStyle(FontStyle),
    /// CSS color.
    Color(String),
    /// Horizontal alignment.
    TextAlign(TextAlign),
    /// Line height multiplier.
    LineHeight(f32),
    /// Letter spacing in template pixels.
    LetterSpacing(f32),
    /// Case transform.
    TextTransform(TextTransform),
    /// Image or video source URL.
    Source(String),
    /// Media fit policy.
    ObjectFit(ObjectFit),
    /// Video playback flags.
    Playback(PlaybackFlags),
}

impl PropertyUpdate {
    /// Property name, for logs and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Position { .. } => "position",
            Self::Size { .. } => "size",
            Self::Rotation(_) => "rotation",
            Self::Opacity(_) => "opacity",
            Self::ZIndex(_) => "zIndex",
            Self::Content(_) => "content",
            Self::FontFamily(_) => "fontFamily",
            Self::FontSize(_) => "fontSize",
            Self::FontWeight(_) => "fontWeight",
            Self::FontStyle(_) => "fontStyle",
            Self::Color(_) => "color",
            Self::TextAlign(_) => "textAlign",
            Self::LineHeight(_) => "lineHeight",
            Self::LetterSpacing(_) => "letterSpacing",
            Self::TextTransform(_) => "textTransform",
            Self::Source(_) => "src",
            Self::ObjectFit(_) => "objectFit",
            Self::Playback(_) => "playback",
        }
    }

    /// Apply the edit to `element`.
    ///
    /// Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the property does not exist on this element type
    /// or the value is invalid. The element is left untouched on error.
    pub fn apply_to(&self, element: &mut Element) -> CoreResult<bool> {
        let name = self.name();
        let t = &mut element.transform;
        let changed = match self {
            Self::Position { x, y } => {
                finite(name, *x)?;
                finite(name, *y)?;
                replace(&mut t.x, *x) | replace(&mut t.y, *y)
            }
            Self::Size { width, height } => {
                non_negative(name, *width)?;
                non_negative(name, *height)?;
                replace(&mut t.width, *width) | replace(&mut t.height, *height)
            }
            Self::Rotation(deg) => replace(&mut t.rotation, finite(name, *deg)? % 360.0),
            Self::Opacity(o) => replace(&mut t.opacity, finite(name, *o)?.clamp(0.0, 1.0)),
            Self::ZIndex(z) => replace(&mut t.z_index, *z),
            Self::Content(_)
            | Self::FontFamily(_)
            | Self::FontSize(_)
            | Self::FontWeight(_)
            | Self::FontStyle(_)
            | Self::Color(_)
            | Self::TextAlign(_)
            | Self::LineHeight(_)
            | Self::LetterSpacing(_)
            | Self::TextTransform(_) => {
                let style = match &mut element.kind {
                    ElementKind::Text(style) | ElementKind::Watermark(style) => style,
                    other => return Err(mismatch(&element.id, name, other)),
                };
                self.apply_text(style)?
            }
            Self::Source(src) => match &mut element.kind {
                ElementKind::Image(media) => replace(&mut media.src, src.clone()),
                ElementKind::Video(video) => replace(&mut video.media.src, src.clone()),
                other => return Err(mismatch(&element.id, name, other)),
            },
            Self::ObjectFit(fit) => match &mut element.kind {
                ElementKind::Image(media) => replace(&mut media.object_fit, *fit),
                ElementKind::Video(video) => replace(&mut video.media.object_fit, *fit),
                other => return Err(mismatch(&element.id, name, other)),
            },
            Self::Playback(flags) => match &mut element.kind {
                ElementKind::Video(video) => replace(&mut video.playback, *flags),
                other => return Err(mismatch(&element.id, name, other)),
            },
        };
        Ok(changed)
    }

    fn apply_text(&self, style: &mut TextStyle) -> CoreResult<bool> {
        let name = self.name();
        let changed = match self {
            Self::Content(content) => replace(&mut style.content, content.clone()),
            Self::FontFamily(family) => {
                if family.trim().is_empty() {
                    return Err(invalid(name, family));
                }
                replace(&mut style.font_family, family.clone())
            }
            Self::FontSize(size) => {
                if !(size.is_finite() && *size > 0.0) {
                    return Err(invalid(name, size));
                }
                replace(&mut style.font_size, *size)
            }
            Self::FontWeight(weight) => replace(&mut style.font_weight, *weight),
            Self::FontStyle(slant) => replace(&mut style.font_style, *slant),
            Self::Color(color) => {
                color.parse::<crate::Rgba>()?;
                replace(&mut style.color, color.clone())
            }
            Self::TextAlign(align) => replace(&mut style.text_align, *align),
            Self::LineHeight(lh) => {
                if !(lh.is_finite() && *lh > 0.0) {
                    return Err(invalid(name, lh));
                }
                replace(&mut style.line_height, *lh)
            }
            Self::LetterSpacing(ls) => replace(&mut style.letter_spacing, finite(name, *ls)?),
            Self::TextTransform(tt) => replace(&mut style.text_transform, *tt),
            _ => false,
        };
        Ok(changed)
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn invalid(property: &'static str, value: impl std::fmt::Display) -> CoreError {
    CoreError::InvalidValue {
        property,
        value: value.to_string(),
    }
}

fn finite(property: &'static str, value: f32) -> CoreResult<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(property, value))
    }
}

fn non_negative(property: &'static str, value: f32) -> CoreResult<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid(property, value))
    }
}

fn mismatch(id: &crate::ElementId, property: &str, kind: &ElementKind) -> CoreError {
    CoreError::InvalidOperation {
        element: id.to_string(),
        reason: format!("{property} does not apply to {} elements", kind.type_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{MediaSource, Transform, VideoSource};

    fn text() -> Element {
        Element::new(ElementKind::Text(TextStyle::new("hello")))
            .with_transform(Transform::from_xywh(0.0, 0.0, 100.0, 50.0))
    }

    #[test]
    fn test_apply_reports_changes() {
        let mut element = text();
        assert!(PropertyUpdate::Content("bye".into()).apply_to(&mut element).unwrap());
        assert!(!PropertyUpdate::Content("bye".into()).apply_to(&mut element).unwrap());
        assert_eq!(element.kind.text_style().unwrap().content, "bye");
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut element = text();
        PropertyUpdate::Opacity(1.7).apply_to(&mut element).unwrap();
        assert!((element.transform.opacity - 1.0).abs() < f32::EPSILON);
        PropertyUpdate::Opacity(-0.3).apply_to(&mut element).unwrap();
        assert!(element.transform.opacity.abs() < f32::EPSILON);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let mut image = Element::new(ElementKind::Image(MediaSource::new("a.png", ObjectFit::Cover)));
        let err = PropertyUpdate::FontSize(20.0).apply_to(&mut image).unwrap_err();
        assert!(matches!(err, CoreError::InvalidOperation { .. }));

        let mut element = text();
        assert!(PropertyUpdate::Source("x.png".into()).apply_to(&mut element).is_err());
        assert!(PropertyUpdate::Playback(PlaybackFlags::default())
            .apply_to(&mut image)
            .is_err());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut element = text();
        assert!(PropertyUpdate::FontSize(0.0).apply_to(&mut element).is_err());
        assert!(PropertyUpdate::Size { width: -1.0, height: 10.0 }
            .apply_to(&mut element)
            .is_err());
        assert!(PropertyUpdate::Position { x: f32::NAN, y: 0.0 }
            .apply_to(&mut element)
            .is_err());
        assert!(PropertyUpdate::Color("not-a-color".into())
            .apply_to(&mut element)
            .is_err());
        assert!((element.transform.width - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_source_swap_on_video() {
        let mut video = Element::new(ElementKind::Video(VideoSource::new("", ObjectFit::Cover)));
        PropertyUpdate::Source("clip.mp4".into()).apply_to(&mut video).unwrap();
        assert_eq!(video.kind.media().unwrap().src, "clip.mp4");
    }

    #[test]
    fn test_json_shape() {
        let update: PropertyUpdate =
            serde_json::from_str(r#"{"property":"position","value":{"x":80,"y":12}}"#).unwrap();
        assert_eq!(update, PropertyUpdate::Position { x: 80.0, y: 12.0 });
        let update: PropertyUpdate =
            serde_json::from_str(r#"{"property":"objectFit","value":"contain"}"#).unwrap();
        assert_eq!(update, PropertyUpdate::ObjectFit(ObjectFit::Contain));
    }
}
