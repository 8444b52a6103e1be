mod caption_row;
mod figure;
mod label;
mod tag_definition;

pub use caption_row::{CAPTION_FIELD, CaptionRow, LABEL_FIELD, LabelledRow, TAG_FIELD};
pub use figure::{FigureRecord, UNKNOWN_JOURNAL};
pub use label::Label;
pub use tag_definition::TagDefinition;
