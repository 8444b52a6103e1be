use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::Label;
use crate::corpus::CorpusError;

/// Column holding the caption text.
pub const CAPTION_FIELD: &str = "caption";
/// Column written with the canonical tag name.
pub const TAG_FIELD: &str = "tag";
/// Column written with the tag's priority label.
pub const LABEL_FIELD: &str = "label";

/// One row of the caption corpus.
///
/// Only `caption` is interpreted; every other field (figure id, article
/// identifiers, journal) is carried through untouched and in its original
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptionRow {
    fields: Map<String, Value>,
}

impl CaptionRow {
    /// Wraps an already parsed JSON object.
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builds a row holding only a caption, mostly useful in tests.
    ///
    /// # Examples
    ///
    /// ```
    /// use figtag::CaptionRow;
    ///
    /// let row = CaptionRow::with_caption(Some("TEM image"));
    /// assert_eq!(row.caption(), Some("TEM image"));
    ///
    /// let empty = CaptionRow::with_caption(None);
    /// assert_eq!(empty.caption(), None);
    /// ```
    pub fn with_caption(caption: Option<&str>) -> Self {
        let mut fields = Map::new();
        fields.insert(
            CAPTION_FIELD.to_string(),
            caption.map_or(Value::Null, |c| Value::String(c.to_string())),
        );
        Self { fields }
    }

    /// Returns the caption text when present and a string.
    ///
    /// Null, missing and non-string captions all read as `None`.
    pub fn caption(&self) -> Option<&str> {
        self.str_field(CAPTION_FIELD)
    }

    /// Returns a passthrough field as a string, if it is one.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Returns all fields of the row.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Inserts or replaces a field.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }
}

/// A caption row that matched a tag definition.
///
/// Serializes as the original row followed by `tag` and `label` columns.
/// Existing `tag`/`label` columns on the source row are replaced, so
/// relabelling an already labelled corpus yields the same shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "CaptionRow")]
pub struct LabelledRow {
    row: CaptionRow,
    tag: String,
    label: Label,
}

impl LabelledRow {
    /// Attaches a tag to a row.
    pub fn new(row: CaptionRow, tag: impl Into<String>, label: Label) -> Self {
        Self {
            row,
            tag: tag.into(),
            label,
        }
    }

    /// Returns the source row.
    pub fn row(&self) -> &CaptionRow {
        &self.row
    }

    /// Returns the caption text of the source row.
    pub fn caption(&self) -> Option<&str> {
        self.row.caption()
    }

    /// Returns the canonical tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the tag's priority label.
    pub fn label(&self) -> Label {
        self.label
    }
}

impl TryFrom<CaptionRow> for LabelledRow {
    type Error = CorpusError;

    fn try_from(row: CaptionRow) -> Result<Self, Self::Error> {
        let tag = row
            .str_field(TAG_FIELD)
            .ok_or(CorpusError::Unlabelled { field: TAG_FIELD })?
            .to_string();
        let label = row
            .fields
            .get(LABEL_FIELD)
            .and_then(Value::as_u64)
            .and_then(|l| u32::try_from(l).ok())
            .ok_or(CorpusError::Unlabelled { field: LABEL_FIELD })?;

        Ok(Self {
            row,
            tag,
            label: Label::new(label),
        })
    }
}

impl Serialize for LabelledRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let passthrough = self
            .row
            .fields
            .iter()
            .filter(|(key, _)| key.as_str() != TAG_FIELD && key.as_str() != LABEL_FIELD);

        let mut map = serializer.serialize_map(None)?;
        for (key, value) in passthrough {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(TAG_FIELD, &self.tag)?;
        map.serialize_entry(LABEL_FIELD, &self.label)?;
        map.end()
    }
}
