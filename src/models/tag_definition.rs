use serde::{Deserialize, Serialize};

use super::Label;
use crate::vocabulary::VocabularyError;

/// A named caption category with one or more literal match terms.
///
/// The `name` is the canonical display name assigned to matching captions.
/// `synonyms` are matched case-insensitively as plain substrings; they are
/// never interpreted as regular expressions.
///
/// Deserialization goes through [`TagDefinition::new`], so a stored
/// definition is validated the same way as one built in code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTagDefinition")]
pub struct TagDefinition {
    label: Label,
    name: String,
    synonyms: Vec<String>,
}

/// Unvalidated serialized shape of a [`TagDefinition`].
#[derive(Deserialize)]
struct RawTagDefinition {
    label: Label,
    name: String,
    synonyms: Vec<String>,
}

impl TryFrom<RawTagDefinition> for TagDefinition {
    type Error = VocabularyError;

    fn try_from(raw: RawTagDefinition) -> Result<Self, Self::Error> {
        Self::new(raw.label, raw.name, raw.synonyms)
    }
}

impl TagDefinition {
    /// Creates a tag definition, rejecting empty names and synonym lists.
    ///
    /// # Examples
    ///
    /// ```
    /// use figtag::{Label, TagDefinition};
    ///
    /// let tem = TagDefinition::new(Label::new(0), "TEM", vec!["TEM".to_string()]).unwrap();
    /// assert_eq!(tem.name(), "TEM");
    /// assert_eq!(tem.synonyms(), &["TEM"]);
    ///
    /// assert!(TagDefinition::new(Label::new(1), "AFM", Vec::new()).is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `VocabularyError::InvalidTagDefinition` if the name is blank,
    /// the synonym list is empty, or any synonym is blank.
    pub fn new(
        label: Label,
        name: impl Into<String>,
        synonyms: Vec<String>,
    ) -> Result<Self, VocabularyError> {
        let name = name.into();
        let invalid = |reason: &str| VocabularyError::InvalidTagDefinition {
            index: label.get() as usize,
            reason: reason.to_string(),
        };

        if name.trim().is_empty() {
            return Err(invalid("canonical name is empty"));
        }
        if synonyms.is_empty() {
            return Err(invalid("synonym list is empty"));
        }
        if synonyms.iter().any(|s| s.trim().is_empty()) {
            return Err(invalid("synonym list contains an empty string"));
        }

        Ok(Self {
            label,
            name,
            synonyms,
        })
    }

    /// Creates a definition whose only match term is its own name.
    ///
    /// # Errors
    ///
    /// Returns `VocabularyError::InvalidTagDefinition` if the name is blank.
    pub fn single(label: Label, name: impl Into<String>) -> Result<Self, VocabularyError> {
        let name = name.into();
        let synonyms = vec![name.clone()];
        Self::new(label, name, synonyms)
    }

    /// Creates a definition without validation, for static tables.
    pub(crate) fn from_trusted_parts(label: Label, name: String, synonyms: Vec<String>) -> Self {
        Self {
            label,
            name,
            synonyms,
        }
    }

    /// Returns the priority label.
    pub fn label(&self) -> Label {
        self.label
    }

    /// Returns the canonical display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the literal match terms in definition order.
    pub fn synonyms(&self) -> &[String] {
        &self.synonyms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_uses_name_as_only_synonym() {
        let tag = TagDefinition::single(Label::new(2), "EBSD").unwrap();

        assert_eq!(tag.label(), Label::new(2));
        assert_eq!(tag.name(), "EBSD");
        assert_eq!(tag.synonyms(), &["EBSD"]);
    }

    #[test]
    fn new_rejects_blank_name() {
        let err = TagDefinition::new(Label::new(4), "  ", vec!["x".to_string()]).unwrap_err();
        assert!(matches!(
            err,
            VocabularyError::InvalidTagDefinition { index: 4, .. }
        ));
    }

    #[test]
    fn new_rejects_blank_synonym() {
        let err = TagDefinition::new(
            Label::new(0),
            "SEM",
            vec!["SEM".to_string(), String::new()],
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty string"));
    }

    #[test]
    fn deserialize_validates_like_new() {
        let tag: TagDefinition =
            serde_json::from_str(r#"{"label":0,"name":"TEM","synonyms":["TEM","transmission"]}"#)
                .unwrap();
        assert_eq!(tag.synonyms(), &["TEM", "transmission"]);

        let err = serde_json::from_str::<TagDefinition>(r#"{"label":0,"name":"TEM","synonyms":[]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("synonym list is empty"));

        assert!(
            serde_json::from_str::<TagDefinition>(r#"{"label":1,"name":"","synonyms":["x"]}"#)
                .is_err()
        );
    }

    #[test]
    fn serialized_definition_reads_back() {
        let tag = TagDefinition::single(Label::new(3), "EDS").unwrap();
        let json = serde_json::to_string(&tag).unwrap();

        assert_eq!(json, r#"{"label":3,"name":"EDS","synonyms":["EDS"]}"#);
        assert_eq!(serde_json::from_str::<TagDefinition>(&json).unwrap(), tag);
    }
}
