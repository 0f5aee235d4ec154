//! Editor state: the working template, the selection and edit settings.
//!
//! [`EditorStore`] is the single owner of UI state. The interactive view and
//! the export path both read from it; every mutation goes through a setter
//! so the selection invariant holds and the revision counter advances.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, Element, ElementId, ElementKind, PropertyUpdate, Template};

/// Feature flags controlling what the editor may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Lock watermark properties unless `pro_mode` is set.
    pub watermark_lock: bool,
    /// Pro accounts may edit watermarks.
    pub pro_mode: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            watermark_lock: true,
            pro_mode: false,
        }
    }
}

/// Editor state shared by the canvas view and the inspector.
#[derive(Debug, Clone, Default)]
pub struct EditorStore {
    template: Option<Template>,
    selected: Option<ElementId>,
    settings: EditorSettings,
    revision: u64,
}

impl EditorStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// The working template, if one is loaded.
    #[must_use]
    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    /// A copy of the working template, e.g. for export.
    #[must_use]
    pub fn snapshot(&self) -> Option<Template> {
        self.template.clone()
    }

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> EditorSettings {
        self.settings
    }

    /// Monotonic counter bumped on every state change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Load a working copy of a template, clearing the selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is structurally invalid.
    pub fn load_template(&mut self, template: Template) -> CoreResult<()> {
        template.validate()?;
        tracing::debug!(
            "Loaded template {} ({} elements)",
            template.id,
            template.elements.len()
        );
        self.template = Some(template);
        self.selected = None;
        self.bump();
        Ok(())
    }

    /// Unload the working template.
    pub fn clear_template(&mut self) {
        let had_template = self.template.take().is_some();
        let had_selection = self.selected.take().is_some();
        if had_template || had_selection {
            self.bump();
        }
    }

    /// The selected element id.
    #[must_use]
    pub fn selected_id(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// The selected element.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        let id = self.selected.as_ref()?;
        self.template.as_ref()?.element(id)
    }

    /// Select an element of the active template.
    ///
    /// # Errors
    ///
    /// Returns an error if no template is loaded or the element does not exist.
    pub fn select(&mut self, id: &ElementId) -> CoreResult<()> {
        let template = self.template.as_ref().ok_or(CoreError::NoActiveTemplate)?;
        if !template.contains(id) {
            return Err(CoreError::ElementNotFound(id.to_string()));
        }
        if self.selected.as_ref() != Some(id) {
            self.selected = Some(id.clone());
            self.bump();
        }
        Ok(())
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.bump();
        }
    }

    /// Enable or disable pro mode.
    pub fn set_pro_mode(&mut self, pro_mode: bool) {
        if self.settings.pro_mode != pro_mode {
            self.settings.pro_mode = pro_mode;
            self.bump();
        }
    }

    /// Whether an element's properties are currently locked.
    #[must_use]
    pub fn is_locked(&self, element: &Element) -> bool {
        matches!(element.kind, ElementKind::Watermark(_))
            && self.settings.watermark_lock
            && !self.settings.pro_mode
    }

    /// Apply a property edit to an element of the active template.
    ///
    /// Returns whether the element changed.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no template, the element does not exist,
    /// the element is locked, or the edit is invalid for the element.
    pub fn apply(&mut self, id: &ElementId, update: &PropertyUpdate) -> CoreResult<bool> {
        let locked = {
            let template = self.template.as_ref().ok_or(CoreError::NoActiveTemplate)?;
            let element = template
                .element(id)
                .ok_or_else(|| CoreError::ElementNotFound(id.to_string()))?;
            self.is_locked(element)
        };
        if locked {
            tracing::debug!("Rejected {} edit on locked element {id}", update.name());
            return Err(CoreError::Locked(id.to_string()));
        }

        let element = self
            .template
            .as_mut()
            .and_then(|t| t.element_mut(id))
            .ok_or_else(|| CoreError::ElementNotFound(id.to_string()))?;
        let changed = update.apply_to(element)?;
        if changed {
            self.bump();
        }
        Ok(changed)
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;

    fn store_with(template_id: &str) -> EditorStore {
        let mut store = EditorStore::new(EditorSettings::default());
        store
            .load_template(Catalog::builtin().get(template_id).expect("template"))
            .expect("load");
        store
    }

    #[test]
    fn test_selection_must_exist() {
        let mut store = EditorStore::default();
        assert!(matches!(
            store.select(&"top-text".into()),
            Err(CoreError::NoActiveTemplate)
        ));

        let mut store = store_with("classic-meme");
        store.select(&"top-text".into()).expect("select");
        assert_eq!(store.selected_id().map(ElementId::as_str), Some("top-text"));
        assert!(store.select(&"nope".into()).is_err());
        assert_eq!(store.selected_id().map(ElementId::as_str), Some("top-text"));
    }

    #[test]
    fn test_loading_clears_selection() {
        let mut store = store_with("classic-meme");
        store.select(&"top-text".into()).unwrap();
        store
            .load_template(Catalog::builtin().get("minimal-quote").unwrap())
            .unwrap();
        assert!(store.selected_id().is_none());
        store.clear_template();
        assert!(store.template().is_none());
    }

    #[test]
    fn test_watermark_lock_and_pro_mode() {
        let mut store = store_with("classic-meme");
        let mark: ElementId = "watermark".into();
        let edit = PropertyUpdate::Content("my brand".into());

        assert!(matches!(store.apply(&mark, &edit), Err(CoreError::Locked(_))));
        store.set_pro_mode(true);
        assert!(store.apply(&mark, &edit).expect("unlocked"));
    }

    #[test]
    fn test_revision_tracks_changes_only() {
        let mut store = store_with("classic-meme");
        let id: ElementId = "top-text".into();
        let before = store.revision();
        assert!(!store.apply(&id, &PropertyUpdate::Rotation(0.0)).unwrap());
        assert_eq!(store.revision(), before);
        assert!(store.apply(&id, &PropertyUpdate::Rotation(15.0)).unwrap());
        assert_eq!(store.revision(), before + 1);
    }

    #[test]
    fn test_snapshot_leaves_template_loaded() {
        let mut store = store_with("classic-meme");
        let id: ElementId = "top-text".into();
        store.select(&id).unwrap();
        let before = store.revision();

        let mut copy = store.snapshot().expect("snapshot");
        copy.elements.clear();

        assert!(store.template().is_some_and(|t| t.contains(&id)));
        assert_eq!(store.selected_id(), Some(&id));
        assert_eq!(store.revision(), before);
    }

    #[test]
    fn test_catalog_is_untouched_by_edits() {
        let mut store = store_with("classic-meme");
        store
            .apply(&"top-text".into(), &PropertyUpdate::Content("edited".into()))
            .unwrap();
        let pristine = Catalog::builtin().get("classic-meme").unwrap();
        let element = pristine.element(&"top-text".into()).unwrap();
        assert_eq!(element.kind.text_style().unwrap().content, "TOP TEXT");
    }
}
