//! Built-in template catalog.
//!
//! Catalog entries are static data. Lookups hand out clones so edits never
//! reach the catalog.

use std::collections::BTreeSet;

use crate::element::{
    Element, ElementKind, FontWeight, MediaSource, ObjectFit, TextAlign, TextStyle,
    TextTransform, Transform, VideoSource,
};
use crate::template::{AppType, Template};
use crate::{CoreError, CoreResult};

/// Watermark text stamped on every built-in template.
pub const WATERMARK_TEXT: &str = "made with stayframe.app";

/// A read-only collection of templates.
#[derive(Debug, Clone)]
pub struct Catalog {
    templates: Vec<Template>,
}

impl Catalog {
    /// The built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            templates: vec![
                classic_meme(),
                caption_meme(),
                minimal_quote(),
                photo_quote(),
                story_reel(),
            ],
        }
    }

    /// Build a catalog from arbitrary templates.
    ///
    /// # Errors
    ///
    /// Returns an error if a template is invalid or two templates share an id.
    pub fn from_templates(templates: Vec<Template>) -> CoreResult<Self> {
        let mut ids = BTreeSet::new();
        for template in &templates {
            template.validate()?;
            if !ids.insert(template.id.as_str()) {
                return Err(CoreError::InvalidTemplate(format!(
                    "duplicate template id {}",
                    template.id
                )));
            }
        }
        Ok(Self { templates })
    }

    /// All templates in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Template] {
        &self.templates
    }

    /// A working copy of the template with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TemplateNotFound`] for unknown ids.
    pub fn get(&self, id: &str) -> CoreResult<Template> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| CoreError::TemplateNotFound(id.to_string()))
    }

    /// Templates targeting one app.
    pub fn by_app_type(&self, app_type: AppType) -> impl Iterator<Item = &Template> {
        self.templates.iter().filter(move |t| t.app_type == app_type)
    }

    /// Distinct categories, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        self.templates
            .iter()
            .map(|t| t.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog has no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn text(id: &str, rect: (f32, f32, f32, f32), style: TextStyle) -> Element {
    Element::new(ElementKind::Text(style))
        .with_id(id)
        .with_transform(Transform::from_xywh(rect.0, rect.1, rect.2, rect.3))
}

fn image(id: &str, rect: (f32, f32, f32, f32), fit: ObjectFit) -> Element {
    Element::new(ElementKind::Image(MediaSource::new("", fit)))
        .with_id(id)
        .with_transform(Transform::from_xywh(rect.0, rect.1, rect.2, rect.3))
}

fn watermark(canvas_width: f32, canvas_height: f32, color: &str) -> Element {
    let style = TextStyle {
        font_size: 14.0,
        color: color.to_string(),
        text_align: TextAlign::Right,
        ..TextStyle::new(WATERMARK_TEXT)
    };
    Element::new(ElementKind::Watermark(style))
        .with_id("watermark")
        .with_transform(Transform {
            opacity: 0.7,
            ..Transform::from_xywh(canvas_width - 260.0, canvas_height - 36.0, 250.0, 28.0)
        })
        .with_z_index(100)
}

fn impact(content: &str) -> TextStyle {
    TextStyle {
        font_family: "Impact, Anton, Arial Black, sans-serif".to_string(),
        font_size: 60.0,
        font_weight: FontWeight::BOLD,
        color: "#ffffff".to_string(),
        text_transform: TextTransform::Uppercase,
        line_height: 1.1,
        ..TextStyle::new(content)
    }
}

fn classic_meme() -> Template {
    Template {
        id: "classic-meme".to_string(),
        name: "Classic Meme".to_string(),
        category: "classic".to_string(),
        app_type: AppType::Meme,
        aspect_ratio: "1:1".to_string(),
        width: 800.0,
        height: 800.0,
        background_color: "#000000".to_string(),
        elements: vec![
            image("background", (0.0, 0.0, 800.0, 800.0), ObjectFit::Cover),
            text("top-text", (40.0, 20.0, 720.0, 100.0), impact("TOP TEXT")).with_z_index(1),
            text("bottom-text", (40.0, 680.0, 720.0, 100.0), impact("BOTTOM TEXT"))
                .with_z_index(1),
            watermark(800.0, 800.0, "#ffffff"),
        ],
    }
}

fn caption_meme() -> Template {
    let caption = TextStyle {
        font_size: 40.0,
        font_weight: FontWeight(600),
        text_align: TextAlign::Left,
        ..TextStyle::new("When the build passes on the first try")
    };
    Template {
        id: "caption-meme".to_string(),
        name: "Caption Above".to_string(),
        category: "modern".to_string(),
        app_type: AppType::Meme,
        aspect_ratio: "4:5".to_string(),
        width: 1080.0,
        height: 1350.0,
        background_color: "#ffffff".to_string(),
        elements: vec![
            text("caption", (40.0, 30.0, 1000.0, 240.0), caption),
            image("photo", (0.0, 300.0, 1080.0, 1050.0), ObjectFit::Cover),
            watermark(1080.0, 1350.0, "#ffffff"),
        ],
    }
}

fn minimal_quote() -> Template {
    let quote = TextStyle {
        font_family: "Playfair Display, Georgia, serif".to_string(),
        font_size: 56.0,
        color: "#2b2b2b".to_string(),
        line_height: 1.35,
        ..TextStyle::new("\u{201c}Simplicity is the ultimate sophistication.\u{201d}")
    };
    let author = TextStyle {
        font_size: 32.0,
        color: "#6b6b6b".to_string(),
        letter_spacing: 2.0,
        text_transform: TextTransform::Uppercase,
        ..TextStyle::new("Leonardo da Vinci")
    };
    Template {
        id: "minimal-quote".to_string(),
        name: "Minimal Quote".to_string(),
        category: "minimal".to_string(),
        app_type: AppType::Quote,
        aspect_ratio: "1:1".to_string(),
        width: 1080.0,
        height: 1080.0,
        background_color: "#f5f0e8".to_string(),
        elements: vec![
            text("quote", (90.0, 300.0, 900.0, 360.0), quote),
            text("author", (90.0, 700.0, 900.0, 60.0), author),
            watermark(1080.0, 1080.0, "#6b6b6b"),
        ],
    }
}

fn photo_quote() -> Template {
    let quote = TextStyle {
        font_family: "Montserrat, Helvetica, sans-serif".to_string(),
        font_size: 64.0,
        font_weight: FontWeight::BOLD,
        color: "#ffffff".to_string(),
        line_height: 1.25,
        ..TextStyle::new("Stay hungry. Stay foolish.")
    };
    Template {
        id: "photo-quote".to_string(),
        name: "Photo Quote".to_string(),
        category: "bold".to_string(),
        app_type: AppType::Quote,
        aspect_ratio: "4:5".to_string(),
        width: 1080.0,
        height: 1350.0,
        background_color: "#1a1a1a".to_string(),
        elements: vec![
            image("photo", (0.0, 0.0, 1080.0, 1350.0), ObjectFit::Cover),
            text("quote", (100.0, 450.0, 880.0, 450.0), quote).with_z_index(1),
            watermark(1080.0, 1350.0, "#ffffff"),
        ],
    }
}

fn story_reel() -> Template {
    let caption = TextStyle {
        font_size: 72.0,
        font_weight: FontWeight(800),
        color: "#ffffff".to_string(),
        ..TextStyle::new("Your caption here")
    };
    Template {
        id: "story-reel".to_string(),
        name: "Story Reel".to_string(),
        category: "story".to_string(),
        app_type: AppType::Reel,
        aspect_ratio: "9:16".to_string(),
        width: 1080.0,
        height: 1920.0,
        background_color: "#000000".to_string(),
        elements: vec![
            Element::new(ElementKind::Video(VideoSource::new("", ObjectFit::Cover)))
                .with_id("clip")
                .with_transform(Transform::from_xywh(0.0, 0.0, 1080.0, 1920.0)),
            text("caption", (80.0, 1450.0, 920.0, 260.0), caption).with_z_index(1),
            watermark(1080.0, 1920.0, "#ffffff"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_are_valid() {
        let catalog = Catalog::builtin();
        assert!(!catalog.is_empty());
        for template in catalog.all() {
            template.validate().expect("valid builtin template");
            assert!(
                template
                    .elements
                    .iter()
                    .any(|e| matches!(e.kind, ElementKind::Watermark(_))),
                "{} has no watermark",
                template.id
            );
        }
        Catalog::from_templates(catalog.all().to_vec()).expect("unique ids");
    }

    #[test]
    fn test_get_returns_working_copy() {
        let catalog = Catalog::builtin();
        let mut copy = catalog.get("classic-meme").expect("exists");
        copy.elements.clear();
        assert!(!catalog.get("classic-meme").expect("exists").is_empty());
        assert!(matches!(
            catalog.get("missing"),
            Err(CoreError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_filters() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.by_app_type(AppType::Reel).count(), 1);
        let categories = catalog.categories();
        let mut sorted = categories.clone();
        sorted.sort_unstable();
        assert_eq!(categories, sorted);
    }
}
