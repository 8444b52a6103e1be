//! Keyword tagging of figure captions.
//!
//! The pipeline has three stages:
//!
//! - [`TagMatcher`] compiles ordered tag definitions into case-insensitive
//!   literal patterns and assigns each caption the first definition it matches.
//! - [`Labeller`] splits the corpus into fixed-size chunks, classifies them in
//!   parallel and reassembles the results in input order.
//! - [`normalize`] counts rows per tag and rescales the counts onto the
//!   `[7, 27]` display range used for tag-cloud sizing.
//!
//! # Examples
//!
//! ```
//! use figtag::{CaptionRow, Label, TagDefinition};
//! use figtag::tagging::{LabellerBuilder, TagMatcher, normalize};
//!
//! let definitions = vec![
//!     TagDefinition::single(Label::new(0), "TEM").unwrap(),
//!     TagDefinition::single(Label::new(1), "AFM").unwrap(),
//! ];
//! let matcher = TagMatcher::compile(&definitions).unwrap();
//! let labeller = LabellerBuilder::new().chunk_size(2).build().unwrap();
//!
//! let rows = vec![
//!     CaptionRow::with_caption(Some("TEM image of grain boundary")),
//!     CaptionRow::with_caption(Some("unrelated text")),
//!     CaptionRow::with_caption(Some("AFM topography scan")),
//! ];
//! let labelled = labeller.label(&rows, &matcher).unwrap();
//!
//! assert_eq!(labelled.len(), 2);
//! assert_eq!(labelled[0].tag(), "TEM");
//! assert_eq!(labelled[1].tag(), "AFM");
//!
//! let weights = normalize(&labelled);
//! assert!(weights.iter().all(|w| w.weight == 27.0));
//! ```

use thiserror::Error;

mod labeller;
mod matcher;
mod weights;

pub use labeller::{
    DEFAULT_CHUNK_SIZE, Labeller, LabellerBuilder, LabellerConfig, chunk_count,
};
pub use matcher::{CompiledPattern, TagMatcher};
pub use weights::{TagCount, TagWeight, WEIGHT_FLOOR, WEIGHT_SPAN, normalize, rescale, tag_counts};

/// Errors that abort a labelling pass.
#[derive(Debug, Error)]
pub enum LabelError {
    /// Chunks must hold at least one row.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    /// A definition is out of position or has nothing to match.
    #[error("tag definition '{tag}' at index {index} {reason}")]
    InvalidDefinition {
        tag: String,
        index: usize,
        reason: String,
    },

    /// A tag definition could not be compiled.
    #[error("failed to compile pattern for tag '{tag}'")]
    Pattern {
        tag: String,
        #[source]
        source: regex::Error,
    },

    /// The worker pool could not be started.
    #[error("failed to start labelling worker pool")]
    ThreadPool(#[source] rayon::ThreadPoolBuildError),
}
