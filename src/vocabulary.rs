//! Tag vocabulary loading and validation.
//!
//! A vocabulary is an ordered list of tag definitions plus an optional
//! allow-list of canonical names to retain after labelling. On disk it is a
//! JSON document:
//!
//! ```json
//! {
//!   "tags": [
//!     "TEM",
//!     ["SEM", "scanning electron microscopy", "SEM image"]
//!   ],
//!   "retain": ["TEM", "SEM"]
//! }
//! ```
//!
//! Each entry of `tags` is either a single string or a list of strings whose
//! first element is the canonical name. Entries are normalized into
//! [`TagDefinition`]s once at load time; anything else is rejected with
//! [`VocabularyError::InvalidTagDefinition`].

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Label, TagDefinition};

/// Errors raised while loading a vocabulary.
#[derive(Debug, Error)]
pub enum VocabularyError {
    /// A `tags` entry has the wrong shape.
    #[error("invalid tag definition at index {index}: {reason}")]
    InvalidTagDefinition { index: usize, reason: String },

    /// Two definitions share a canonical name.
    #[error("duplicate canonical tag name '{name}' at index {index}")]
    DuplicateTag { name: String, index: usize },

    /// The allow-list names a tag that no definition produces.
    #[error("retained tag '{0}' is not defined in the vocabulary")]
    UnknownRetainedTag(String),

    /// The vocabulary file could not be read.
    #[error("failed to read vocabulary file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The vocabulary document is not valid JSON of the expected shape.
    #[error("failed to parse vocabulary: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Raw on-disk shape; `tags` entries are validated by hand for clear errors.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct VocabularyFile {
    tags: Vec<Value>,
    #[serde(default)]
    retain: Option<Vec<String>>,
}

/// Ordered tag definitions plus the allow-list applied after labelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    definitions: Vec<TagDefinition>,
    retain: Option<Vec<String>>,
}

impl Vocabulary {
    /// Builds a vocabulary from validated definitions and an optional allow-list.
    ///
    /// # Errors
    ///
    /// Returns an error if a definition's label is not its position, two
    /// definitions share a canonical name, or the allow-list names an
    /// undefined tag.
    pub fn new(
        definitions: Vec<TagDefinition>,
        retain: Option<Vec<String>>,
    ) -> Result<Self, VocabularyError> {
        let mut names = HashSet::new();
        for (index, definition) in definitions.iter().enumerate() {
            if usize::try_from(definition.label().get()).ok() != Some(index) {
                return Err(VocabularyError::InvalidTagDefinition {
                    index,
                    reason: format!("label {} does not match its position", definition.label()),
                });
            }
            if !names.insert(definition.name()) {
                return Err(VocabularyError::DuplicateTag {
                    name: definition.name().to_string(),
                    index,
                });
            }
        }

        if let Some(retain) = &retain
            && let Some(unknown) = retain.iter().find(|name| !names.contains(name.as_str()))
        {
            return Err(VocabularyError::UnknownRetainedTag(unknown.clone()));
        }

        Ok(Self {
            definitions,
            retain,
        })
    }

    /// Parses a vocabulary document.
    ///
    /// # Examples
    ///
    /// ```
    /// use figtag::Vocabulary;
    ///
    /// let vocabulary = Vocabulary::from_json_str(
    ///     r#"{"tags": ["TEM", ["AFM", "atomic force microscopy"]], "retain": ["AFM"]}"#,
    /// ).unwrap();
    ///
    /// assert_eq!(vocabulary.definitions().len(), 2);
    /// assert_eq!(vocabulary.definitions()[1].synonyms().len(), 2);
    /// assert!(vocabulary.retains("AFM"));
    /// assert!(!vocabulary.retains("TEM"));
    ///
    /// let err = Vocabulary::from_json_str(r#"{"tags": ["TEM", 42]}"#).unwrap_err();
    /// assert!(err.to_string().contains("index 1"));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or any entry is invalid.
    pub fn from_json_str(json: &str) -> Result<Self, VocabularyError> {
        let file: VocabularyFile = serde_json::from_str(json).map_err(VocabularyError::Parse)?;
        let definitions = file
            .tags
            .iter()
            .enumerate()
            .map(|(index, entry)| definition_from_entry(index, entry))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(definitions, file.retain)
    }

    /// Loads a vocabulary document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn load(path: &Path) -> Result<Self, VocabularyError> {
        let json = fs::read_to_string(path).map_err(|source| VocabularyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Returns the built-in microscopy vocabulary and its default allow-list.
    pub fn builtin() -> Self {
        let definitions = BUILTIN_TAGS
            .iter()
            .enumerate()
            .map(|(index, terms)| builtin_definition(index, terms))
            .collect();
        let retain = BUILTIN_RETAIN.iter().map(|s| (*s).to_string()).collect();

        Self {
            definitions,
            retain: Some(retain),
        }
    }

    /// Returns the definitions in priority order.
    pub fn definitions(&self) -> &[TagDefinition] {
        &self.definitions
    }

    /// Returns the allow-list, or `None` when every tag is retained.
    pub fn retained(&self) -> Option<&[String]> {
        self.retain.as_deref()
    }

    /// Returns whether rows with this tag survive the allow-list.
    pub fn retains(&self, tag: &str) -> bool {
        self.retain
            .as_ref()
            .is_none_or(|retain| retain.iter().any(|name| name == tag))
    }

    /// Drops the allow-list so every matched tag is retained.
    #[must_use]
    pub fn retain_all(mut self) -> Self {
        self.retain = None;
        self
    }
}

/// Normalizes one `tags` entry into a definition labelled by its position.
fn definition_from_entry(index: usize, entry: &Value) -> Result<TagDefinition, VocabularyError> {
    let invalid = |reason: String| VocabularyError::InvalidTagDefinition { index, reason };
    let label = u32::try_from(index)
        .map(Label::new)
        .map_err(|_| invalid("too many tag definitions".to_string()))?;

    match entry {
        Value::String(name) => TagDefinition::single(label, name.clone()),
        Value::Array(items) => {
            let synonyms = items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| invalid(format!("synonym {item} is not a string")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let name = synonyms
                .first()
                .cloned()
                .ok_or_else(|| invalid("synonym list is empty".to_string()))?;
            TagDefinition::new(label, name, synonyms)
        }
        other => Err(invalid(format!(
            "expected a string or a list of strings, found {other}"
        ))),
    }
}

/// Builds a definition from the static table, which is known to be well formed.
fn builtin_definition(index: usize, terms: &[&str]) -> TagDefinition {
    let synonyms: Vec<String> = terms.iter().map(|s| (*s).to_string()).collect();
    let name = synonyms[0].clone();
    #[allow(clippy::cast_possible_truncation)]
    let label = Label::new(index as u32);
    TagDefinition::from_trusted_parts(label, name, synonyms)
}

/// Canonical names retained by default.
const BUILTIN_RETAIN: &[&str] = &[
    "TEM",
    "SEM",
    "EDS",
    "FIB",
    "AFM",
    "microstructure",
    "EBSD",
    "Optical microscopy",
    "STM",
    "PFM",
    "MFM",
];

/// Microscopy vocabulary; the first term of each entry is the canonical name.
const BUILTIN_TAGS: &[&[&str]] = &[
    // Scanning probe microscopy
    &[
        "AFM",
        "atomic force microscopy",
        "AFM image",
        "AFM topography",
        "phase imaging",
        "contact mode",
        "tapping mode",
        "non-contact",
    ],
    &["STM", "scanning tunneling microscopy", "tunneling current"],
    &["KPFM", "Kelvin probe force microscopy", "surface potential map"],
    &["MFM", "magnetic force microscopy"],
    &["PFM", "piezoresponse force microscopy"],
    &["C-AFM", "conductive AFM", "current mapping"],
    &["SNOM", "NSOM", "near-field scanning optical microscopy"],
    // Electron microscopy: SEM / FIB
    &[
        "SEM",
        "scanning electron microscopy",
        "SEM image",
        "secondary electron",
        "backscattered electron",
        "BSE micrograph",
    ],
    &[
        "EBSD",
        "electron backscatter diffraction",
        "orientation map",
        "inverse pole figure",
        "IPF",
        "grain orientation",
    ],
    &["EDS", "EDX", "energy dispersive X-ray spectroscopy", "elemental mapping"],
    &["CL", "cathodoluminescence microscopy"],
    &["FIB", "focused ion beam", "FIB milling", "cross-section"],
    &["FIB-SEM", "serial sectioning", "3D reconstruction"],
    // Transmission electron microscopy
    &["TEM", "transmission electron microscopy"],
    &["HRTEM", "high resolution TEM", "lattice fringes"],
    &["STEM", "scanning transmission electron microscopy"],
    &["HAADF", "high-angle annular dark field", "Z-contrast"],
    &["BF", "bright field TEM"],
    &["DF", "dark field TEM"],
    &["SAED", "SAD", "selected area electron diffraction"],
    &["CBED", "convergent beam electron diffraction"],
    &["EELS", "electron energy loss spectroscopy"],
    &["STEM-EDS", "atomic resolution mapping"],
    &["in-situ TEM", "heating TEM", "biasing TEM"],
    // Optical and confocal microscopy
    &["Optical microscopy", "optical micrograph", "optical photograph"],
    &["Polarized optical microscopy", "POM"],
    &["Confocal microscopy", "laser scanning confocal microscopy"],
    &["Fluorescence microscopy"],
    &["Phase contrast microscopy"],
    &["Dark field optical microscopy"],
    &["Interference microscopy"],
    // Microstructure and morphology
    &["microstructure", "microstructural evolution"],
    &["grain size", "grain size distribution", "GSD"],
    &["particle size", "particle size distribution", "PSD"],
    &["porosity", "pore size distribution"],
    &["agglomeration", "clustering"],
    &["surface roughness", "Ra", "RMS roughness"],
    &["fractography", "fracture surface"],
    &["crack", "crack propagation", "crack deflection"],
    &["interface", "interfacial region", "interphase"],
    &["coating thickness", "film thickness"],
    &["columnar grains", "equiaxed grains"],
    // Crystallography and image analysis
    &["lattice fringe", "interplanar spacing", "d-spacing"],
    &["lattice parameter", "lattice constant"],
    &["FFT", "fast Fourier transform", "FFT pattern"],
    &["moire pattern", "moire fringes"],
    &["defects", "dislocations", "stacking fault"],
    &["twins", "grain boundary", "sub-grain boundary"],
    &["orientation relationship"],
    &["phase contrast"],
    // 3D and advanced microscopy
    &["3D microscopy", "3D microstructure"],
    &["electron tomography", "TEM tomography"],
    &["X-ray microscopy", "X-ray micro-CT", "nano-CT"],
    &["serial sectioning"],
    &["correlative microscopy", "multi-modal microscopy"],
    // Imaging and mapping terms
    &["elemental map", "composition map"],
    &["current map"],
    &["strain mapping"],
    &["orientation mapping"],
    &["phase mapping"],
    &["contrast mechanism"],
    &["image segmentation"],
    &["image processing"],
];
