use serde::{Deserialize, Serialize};

/// Journal shown for figures whose paper is missing from the journal mapping.
pub const UNKNOWN_JOURNAL: &str = "Unknown";

/// A figure extracted from an article, as produced by corpus preparation.
///
/// `descriptions` holds the body paragraphs that reference the figure and
/// `image` the base64-encoded image bytes (empty when the image was not found).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureRecord {
    /// Article identifier.
    pub pii: String,
    /// Figure identifier within the article.
    pub figure_id: String,
    /// Caption text, empty when the figure had none.
    #[serde(default)]
    pub caption: String,
    /// Paragraphs referencing the figure.
    #[serde(default)]
    pub descriptions: Vec<String>,
    /// Base64-encoded image.
    #[serde(default)]
    pub image: String,
    /// Journal the article belongs to, attached after loading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
}

impl FigureRecord {
    /// Returns the journal name, or `"Unknown"` when none was attached.
    pub fn journal(&self) -> &str {
        self.journal.as_deref().unwrap_or(UNKNOWN_JOURNAL)
    }

    /// Returns whether an image payload is present.
    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }

    /// Returns the decoded size of the base64 image payload in bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use figtag::FigureRecord;
    ///
    /// let record: FigureRecord = serde_json::from_str(
    ///     r#"{"pii":"S1","figure_id":"f1","image":"aGVsbG8="}"#,
    /// ).unwrap();
    /// assert_eq!(record.image_size(), 5); // "hello"
    /// ```
    pub fn image_size(&self) -> usize {
        let payload = self.image.trim_end();
        let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
        (payload.len() / 4 * 3).saturating_sub(padding)
    }
}
