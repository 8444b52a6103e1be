pub mod catalog;
pub mod corpus;
pub mod models;
pub mod pipeline;
pub mod tagging;
pub mod tui;
pub mod utils;
pub mod vocabulary;

pub use catalog::Catalog;
pub use models::{CaptionRow, FigureRecord, Label, LabelledRow, TagDefinition};
pub use pipeline::{LabelReport, label_corpus, run_labelling};
pub use tagging::{LabelError, Labeller, LabellerBuilder, LabellerConfig, TagMatcher};
pub use vocabulary::{Vocabulary, VocabularyError};
