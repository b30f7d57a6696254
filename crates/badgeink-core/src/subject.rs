//! The photograph a badge is composited onto.

use serde::{Deserialize, Serialize};

/// A selected subject: opaque id, display name and source image reference.
///
/// Supplied by the host once a user picks something; the editor never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    /// URL or path of the source image.
    #[serde(alias = "image")]
    pub image_url: String,
}

impl Subject {
    pub fn new(id: impl Into<String>, name: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image_url: image_url.into(),
        }
    }

    /// Base used for export file names and share titles.
    ///
    /// Falls back to the id when the name is blank.
    pub fn filename_base(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() { self.id.trim() } else { name }
    }

    /// Parse a subject from the host's JSON navigation state.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_camel_case() {
        let subject =
            Subject::from_json(r#"{"id":"7","name":"Cafe Blue","imageUrl":"https://x/y.jpg"}"#)
                .unwrap();
        assert_eq!(subject.image_url, "https://x/y.jpg");
        assert_eq!(subject.name, "Cafe Blue");
    }

    #[test]
    fn test_from_json_image_alias() {
        let subject = Subject::from_json(r#"{"id":"7","name":"Cafe","image":"a.png"}"#).unwrap();
        assert_eq!(subject.image_url, "a.png");
    }

    #[test]
    fn test_filename_base_falls_back_to_id() {
        assert_eq!(Subject::new("42", "  Diner ", "a.png").filename_base(), "Diner");
        assert_eq!(Subject::new("42", "   ", "a.png").filename_base(), "42");
    }
}
