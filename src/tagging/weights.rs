//! Tag frequency counting and display-weight rescaling.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::LabelledRow;

/// Weight assigned to a tag with a vanishingly small share of the corpus.
pub const WEIGHT_FLOOR: f64 = 7.0;
/// Span added on top of the floor for the most frequent tag.
pub const WEIGHT_SPAN: f64 = 20.0;

/// Number of rows carrying a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Display weight of a tag, in `[WEIGHT_FLOOR, WEIGHT_FLOOR + WEIGHT_SPAN]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagWeight {
    pub tag: String,
    pub weight: f64,
}

/// Counts rows per tag, most frequent first; ties are ordered by name.
pub fn tag_counts<'a>(tags: impl IntoIterator<Item = &'a str>) -> Vec<TagCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tag in tags {
        *counts.entry(tag).or_default() += 1;
    }

    let mut counts: Vec<TagCount> = counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    counts
}

/// Rescales counts so the most frequent tag weighs exactly 27.
///
/// `weight = round(count * 20 / max_count + 7, 2)`, returned ascending by
/// weight. An empty input yields an empty mapping.
///
/// # Examples
///
/// ```
/// use figtag::tagging::{TagCount, rescale};
///
/// let weights = rescale(&[
///     TagCount { tag: "TEM".into(), count: 4 },
///     TagCount { tag: "AFM".into(), count: 1 },
/// ]);
///
/// assert_eq!(weights[0].tag, "AFM");
/// assert_eq!(weights[0].weight, 12.0);
/// assert_eq!(weights[1].tag, "TEM");
/// assert_eq!(weights[1].weight, 27.0);
///
/// assert!(rescale(&[]).is_empty());
/// ```
pub fn rescale(counts: &[TagCount]) -> Vec<TagWeight> {
    let Some(max_count) = counts.iter().map(|c| c.count).max().filter(|max| *max > 0) else {
        return Vec::new();
    };

    #[allow(clippy::cast_precision_loss)]
    let mut weights: Vec<TagWeight> = counts
        .iter()
        .map(|c| TagWeight {
            tag: c.tag.clone(),
            weight: round2(c.count as f64 * WEIGHT_SPAN / max_count as f64 + WEIGHT_FLOOR),
        })
        .collect();
    weights.sort_by(|a, b| a.weight.total_cmp(&b.weight));
    weights
}

/// Computes display weights over labelled rows.
pub fn normalize(rows: &[LabelledRow]) -> Vec<TagWeight> {
    rescale(&tag_counts(rows.iter().map(LabelledRow::tag)))
}

/// Rounds to two decimals, ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
