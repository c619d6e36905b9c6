use std::fmt;
use std::sync::Arc;

use fontdue::{Font, FontSettings};
use usvg::fontdb;

use crate::error::Error;

/// A loaded font face used both for measuring footprints and for drawing.
#[derive(Clone)]
pub struct Typeface {
    font: Arc<Font>,
    family_name: String,
}

impl fmt::Debug for Typeface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Typeface")
            .field("family_name", &self.family_name)
            .finish()
    }
}

impl Typeface {
    /// Loads a TrueType/OpenType font from memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, Error> {
        Self::from_collection(data, 0)
    }

    fn from_collection(data: Vec<u8>, index: u32) -> Result<Self, Error> {
        let settings = FontSettings {
            collection_index: index,
            ..FontSettings::default()
        };
        let font =
            Font::from_bytes(data.as_slice(), settings).map_err(|e| Error::Font(e.to_string()))?;
        let family_name =
            extract_font_family_name(&data).unwrap_or_else(|| "sans-serif".to_string());

        Ok(Self {
            font: Arc::new(font),
            family_name,
        })
    }

    /// Picks a bold sans-serif face from the fonts installed on this machine,
    /// falling back to any face at all.
    pub fn system_default() -> Result<Self, Error> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        let families = [fontdb::Family::SansSerif];
        let bold = fontdb::Query {
            families: &families,
            weight: fontdb::Weight::BOLD,
            ..fontdb::Query::default()
        };
        let regular = fontdb::Query {
            families: &families,
            ..fontdb::Query::default()
        };

        let id = db
            .query(&bold)
            .or_else(|| db.query(&regular))
            .or_else(|| db.faces().next().map(|face| face.id))
            .ok_or_else(|| Error::Font("No system fonts available".into()))?;

        let (data, index) = db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| Error::Font("Failed to read system font data".into()))?;

        log::debug!("using system font face {id:?} (collection index {index})");
        Self::from_collection(data, index)
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub(crate) fn font(&self) -> &Font {
        &self.font
    }
}

fn extract_font_family_name(font_data: &[u8]) -> Option<String> {
    let mut db = fontdb::Database::new();
    db.load_font_source(fontdb::Source::Binary(Arc::new(font_data.to_vec())));
    for face in db.faces() {
        if let Some((name, _)) = face.families.first() {
            return Some(name.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Typeface::from_bytes(vec![0, 1, 2, 3]),
            Err(Error::Font(_))
        ));
    }

    #[test]
    fn test_family_name_read_from_font_data() {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let id = db.faces().next().unwrap().id;
        let data = db.with_face_data(id, |data, _| data.to_vec()).unwrap();
        assert!(extract_font_family_name(&data).is_some());
        assert!(extract_font_family_name(&[0, 1, 2, 3]).is_none());
    }

    #[test]
    fn test_system_default_has_family() {
        let face = Typeface::system_default().unwrap();
        assert!(!face.family_name().is_empty());
    }
}
