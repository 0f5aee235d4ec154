//! Font discovery and resolution.
//!
//! A [`FontBook`] owns a fontdb database and hands out fontdue faces for
//! CSS-style font requests. Each distinct request is resolved once; a
//! request that matches nothing falls back to the default sans-serif face,
//! then to any face at all.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use fontdue::{Font, FontSettings};
use stayframe_core::{FontStyle, TextStyle};
use usvg::fontdb::{self, Database, Family, Query, Weight, ID};

/// One entry of a CSS font-family stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FamilyName {
    /// A specific family such as `Inter`.
    Named(String),
    /// `serif`.
    Serif,
    /// `sans-serif` (also `system-ui`).
    SansSerif,
    /// `monospace`.
    Monospace,
    /// `cursive`.
    Cursive,
    /// `fantasy`.
    Fantasy,
}

impl FamilyName {
    fn as_fontdb(&self) -> Family<'_> {
        match self {
            Self::Named(name) => Family::Name(name),
            Self::Serif => Family::Serif,
            Self::SansSerif => Family::SansSerif,
            Self::Monospace => Family::Monospace,
            Self::Cursive => Family::Cursive,
            Self::Fantasy => Family::Fantasy,
        }
    }
}

/// Parse a CSS font-family list such as `"Playfair Display", Georgia, serif`.
#[must_use]
pub fn parse_family_stack(stack: &str) -> Vec<FamilyName> {
    stack
        .split(',')
        .map(|part| part.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|name| !name.is_empty())
        .map(|name| match name.to_ascii_lowercase().as_str() {
            "serif" => FamilyName::Serif,
            "sans-serif" | "system-ui" | "ui-sans-serif" => FamilyName::SansSerif,
            "monospace" | "ui-monospace" => FamilyName::Monospace,
            "cursive" => FamilyName::Cursive,
            "fantasy" => FamilyName::Fantasy,
            _ => FamilyName::Named(name.to_string()),
        })
        .collect()
}

/// A font request derived from a text style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontRequest {
    /// CSS font-family stack.
    pub family: String,
    /// Weight 100-900.
    pub weight: u16,
    /// Italic slant.
    pub italic: bool,
}

impl FontRequest {
    /// Request matching `style`.
    #[must_use]
    pub fn from_style(style: &TextStyle) -> Self {
        Self {
            family: style.font_family.clone(),
            weight: style.font_weight.0,
            italic: style.font_style == FontStyle::Italic,
        }
    }
}

/// Where fonts come from.
#[derive(Debug, Clone)]
pub struct FontConfig {
    /// Load the platform's installed fonts.
    pub load_system_fonts: bool,
    /// Extra directories scanned recursively for font files.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            load_system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

/// Resolved font faces for an export.
pub struct FontBook {
    db: Arc<Database>,
    resolved: HashMap<FontRequest, Option<Arc<Font>>>,
    faces: HashMap<ID, Arc<Font>>,
    warned_empty: bool,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .field("resolved", &self.resolved.len())
            .finish_non_exhaustive()
    }
}

impl FontBook {
    /// Build a font book from `config`.
    #[must_use]
    pub fn new(config: &FontConfig) -> Self {
        let mut db = Database::new();
        if config.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &config.font_dirs {
            db.load_fonts_dir(dir);
        }
        tracing::debug!("Font database ready with {} faces", db.len());
        Self::with_database(Arc::new(db))
    }

    /// Wrap an existing database.
    #[must_use]
    pub fn with_database(db: Arc<Database>) -> Self {
        Self {
            db,
            resolved: HashMap::new(),
            faces: HashMap::new(),
            warned_empty: false,
        }
    }

    /// A font book with no faces; text falls back to fixed-advance layout.
    #[must_use]
    pub fn empty() -> Self {
        Self::with_database(Arc::new(Database::new()))
    }

    /// The underlying database, shared with the SVG rasterizer.
    #[must_use]
    pub fn database(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }

    /// Number of faces available.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Number of distinct requests resolved so far.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    /// Resolve every request up front. Returns how many resolved to a face.
    pub fn preload<I>(&mut self, requests: I) -> usize
    where
        I: IntoIterator<Item = FontRequest>,
    {
        requests
            .into_iter()
            .filter(|request| self.resolve(request).is_some())
            .count()
    }

    /// Face for `request`, or `None` when no face is installed at all.
    pub fn resolve(&mut self, request: &FontRequest) -> Option<Arc<Font>> {
        if let Some(cached) = self.resolved.get(request) {
            return cached.clone();
        }
        let font = self.lookup(request);
        self.resolved.insert(request.clone(), font.clone());
        font
    }

    fn lookup(&mut self, request: &FontRequest) -> Option<Arc<Font>> {
        if self.db.len() == 0 {
            if !self.warned_empty {
                tracing::warn!("No fonts available; text elements will be skipped");
                self.warned_empty = true;
            }
            return None;
        }

        let stack = parse_family_stack(&request.family);
        let families: Vec<Family<'_>> = stack.iter().map(FamilyName::as_fontdb).collect();
        let style = if request.italic {
            fontdb::Style::Italic
        } else {
            fontdb::Style::Normal
        };
        let query = Query {
            families: &families,
            weight: Weight(request.weight),
            stretch: fontdb::Stretch::Normal,
            style,
        };

        let id = if let Some(id) = self.db.query(&query) {
            id
        } else {
            let fallback = Query {
                families: &[Family::SansSerif],
                ..query
            };
            let id = self
                .db
                .query(&fallback)
                .or_else(|| self.db.faces().next().map(|face| face.id))?;
            tracing::debug!(
                "No face for '{}' ({}), using default",
                request.family,
                request.weight
            );
            id
        };
        self.load_face(id)
    }

    fn load_face(&mut self, id: ID) -> Option<Arc<Font>> {
        if let Some(font) = self.faces.get(&id) {
            return Some(Arc::clone(font));
        }
        let parsed = self.db.with_face_data(id, |data, index| {
            Font::from_bytes(
                data.to_vec(),
                FontSettings {
                    collection_index: index,
                    ..FontSettings::default()
                },
            )
        })?;
        match parsed {
            Ok(font) => {
                let font = Arc::new(font);
                self.faces.insert(id, Arc::clone(&font));
                Some(font)
            }
            Err(e) => {
                tracing::warn!("Failed to parse font face {id:?}: {e}");
                None
            }
        }
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new(&FontConfig::default())
    }
}
