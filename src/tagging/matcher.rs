//! First-match-wins caption classification.

use regex::{Regex, RegexBuilder};

use super::LabelError;
use crate::models::{Label, TagDefinition};

/// A tag definition compiled into a case-insensitive literal alternation.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    label: Label,
    name: String,
    regex: Regex,
}

impl CompiledPattern {
    /// Compiles one definition; synonyms are escaped so they match literally.
    fn compile(definition: &TagDefinition) -> Result<Self, LabelError> {
        let alternation = definition
            .synonyms()
            .iter()
            .map(|synonym| regex::escape(synonym))
            .collect::<Vec<_>>()
            .join("|");

        let regex = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .map_err(|source| LabelError::Pattern {
                tag: definition.name().to_string(),
                source,
            })?;

        Ok(Self {
            label: definition.label(),
            name: definition.name().to_string(),
            regex,
        })
    }

    /// Returns the priority label of the source definition.
    pub fn label(&self) -> Label {
        self.label
    }

    /// Returns the canonical tag name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether any synonym occurs in the text.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Ordered set of compiled tag patterns.
///
/// Precedence is purely positional: when a caption contains synonyms of
/// several definitions, the one compiled first wins, regardless of which
/// synonym is longer or more specific.
///
/// # Examples
///
/// ```
/// use figtag::{Label, TagDefinition};
/// use figtag::tagging::TagMatcher;
///
/// let definitions = vec![
///     TagDefinition::single(Label::new(0), "TEM").unwrap(),
///     TagDefinition::single(Label::new(1), "STEM").unwrap(),
/// ];
/// let matcher = TagMatcher::compile(&definitions).unwrap();
///
/// // "STEM" contains "TEM", and TEM is defined first.
/// let hit = matcher.classify(Some("HAADF-STEM micrograph")).unwrap();
/// assert_eq!(hit.name(), "TEM");
/// assert_eq!(hit.label(), Label::new(0));
///
/// assert!(matcher.classify(Some("")).is_none());
/// assert!(matcher.classify(None).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct TagMatcher {
    patterns: Vec<CompiledPattern>,
}

impl TagMatcher {
    /// Compiles definitions in order.
    ///
    /// # Errors
    ///
    /// Returns `LabelError::InvalidDefinition` if a definition's label is not
    /// its position in `definitions` or it has no synonyms, and
    /// `LabelError::Pattern` if an alternation exceeds the regex engine's
    /// size limits.
    pub fn compile(definitions: &[TagDefinition]) -> Result<Self, LabelError> {
        let patterns = definitions
            .iter()
            .enumerate()
            .map(|(index, definition)| {
                check_definition(index, definition)?;
                CompiledPattern::compile(definition)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Returns the compiled patterns in priority order.
    pub fn patterns(&self) -> &[CompiledPattern] {
        &self.patterns
    }

    /// Returns the first pattern matching the caption.
    ///
    /// Missing and empty captions never match.
    pub fn classify(&self, caption: Option<&str>) -> Option<&CompiledPattern> {
        let caption = caption.filter(|c| !c.is_empty())?;
        self.patterns.iter().find(|pattern| pattern.is_match(caption))
    }
}

/// An empty alternation would match every caption, and a label must be the
/// definition's priority index.
fn check_definition(index: usize, definition: &TagDefinition) -> Result<(), LabelError> {
    let invalid = |reason: String| LabelError::InvalidDefinition {
        tag: definition.name().to_string(),
        index,
        reason,
    };

    if definition.synonyms().iter().all(|s| s.is_empty()) {
        return Err(invalid("has no synonyms".to_string()));
    }
    if usize::try_from(definition.label().get()).ok() != Some(index) {
        return Err(invalid(format!("has label {}", definition.label())));
    }
    Ok(())
}
