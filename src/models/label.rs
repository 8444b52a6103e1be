use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority index of a tag definition.
///
/// Labels are assigned in definition order starting at zero, so a lower label
/// always wins when several definitions match the same caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(u32);

impl Label {
    /// Creates a new label.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the underlying index value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_serializes_as_raw_integer() {
        let label = Label::new(7);
        let json = serde_json::to_string(&label).unwrap();
        assert_eq!(json, "7");

        let deserialized: Label = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, label);
    }

    #[test]
    fn labels_order_by_priority() {
        assert!(Label::new(0) < Label::new(1));
        assert_eq!(Label::new(3).to_string(), "3");
    }
}
