//! Templates: a canvas size, a background and an ordered list of elements.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, Element, ElementId};

/// Which StayFrame app a template targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppType {
    /// Quote graphics.
    Quote,
    /// Memes.
    Meme,
    /// Short-video reels.
    Reel,
}

impl std::str::FromStr for AppType {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quote" | "quotes" => Ok(Self::Quote),
            "meme" | "memes" => Ok(Self::Meme),
            "reel" | "reels" => Ok(Self::Reel),
            other => Err(CoreError::InvalidTemplate(format!("unknown app type: {other}"))),
        }
    }
}

/// A template design.
///
/// Catalog templates are never mutated; the editor works on a clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Stable template id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Catalog grouping, e.g. `"classic"`.
    pub category: String,
    /// Target app.
    pub app_type: AppType,
    /// Display aspect ratio, e.g. `"9:16"`.
    pub aspect_ratio: String,
    /// Canvas width in pixels.
    pub width: f32,
    /// Canvas height in pixels.
    pub height: f32,
    /// CSS background color.
    pub background_color: String,
    /// Elements in catalog order.
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Template {
    /// Get an element by id.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    pub(crate) fn element_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| &e.id == id)
    }

    /// Catalog index of an element.
    #[must_use]
    pub fn position_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }

    /// Check if the template contains an element.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.element(id).is_some()
    }

    /// Check if the template has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements in compositing order: ascending z-index (unset = 0),
    /// catalog order for ties.
    #[must_use]
    pub fn draw_order(&self) -> Vec<&Element> {
        let mut ordered: Vec<&Element> = self.elements.iter().collect();
        // sort_by_key is stable, which keeps catalog order for equal z.
        ordered.sort_by_key(|e| e.transform.z_index.unwrap_or(0));
        ordered
    }

    /// Check structural validity: positive canvas size and unique element ids.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTemplate`] describing the first problem found.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(CoreError::InvalidTemplate(format!(
                "{}: canvas size must be positive, got {}x{}",
                self.id, self.width, self.height
            )));
        }
        let mut seen = HashSet::new();
        for element in &self.elements {
            if !seen.insert(&element.id) {
                return Err(CoreError::InvalidTemplate(format!(
                    "{}: duplicate element id {}",
                    self.id, element.id
                )));
            }
        }
        Ok(())
    }

    /// Serialize the template to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(CoreError::Serialization)
    }

    /// Deserialize and validate a template from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the template is invalid.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let template: Self = serde_json::from_str(json)?;
        template.validate()?;
        Ok(template)
    }
}
