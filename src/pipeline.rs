//! End-to-end labelling run: read corpus, label, filter, write, report.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::corpus;
use crate::models::{CaptionRow, LabelledRow};
use crate::tagging::{
    LabelError, Labeller, LabellerConfig, TagCount, TagMatcher, TagWeight, normalize, tag_counts,
};
use crate::vocabulary::Vocabulary;

/// Summary of one labelling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelReport {
    /// Rows read from the input corpus.
    pub total_rows: usize,
    /// Rows matching any tag definition.
    pub tagged_rows: usize,
    /// Rows whose tag survived the allow-list.
    pub retained_rows: usize,
    /// Retained rows per tag, most frequent first.
    pub tag_counts: Vec<TagCount>,
    /// Display weights over all tagged rows, ascending.
    pub weights: Vec<TagWeight>,
}

/// Labels rows in memory and applies the vocabulary's allow-list.
///
/// Weights are computed before the allow-list is applied, so they describe
/// every tag the vocabulary found.
///
/// # Errors
///
/// Returns an error if the vocabulary cannot be compiled or labelling fails.
pub fn label_corpus(
    rows: &[CaptionRow],
    vocabulary: &Vocabulary,
    config: LabellerConfig,
) -> Result<(Vec<LabelledRow>, LabelReport), LabelError> {
    let matcher = TagMatcher::compile(vocabulary.definitions())?;
    let labelled = Labeller::new(config)?.label(rows, &matcher)?;
    let weights = normalize(&labelled);
    let tagged_rows = labelled.len();

    let retained: Vec<LabelledRow> = labelled
        .into_iter()
        .filter(|row| vocabulary.retains(row.tag()))
        .collect();

    let report = LabelReport {
        total_rows: rows.len(),
        tagged_rows,
        retained_rows: retained.len(),
        tag_counts: tag_counts(retained.iter().map(LabelledRow::tag)),
        weights,
    };
    Ok((retained, report))
}

/// Labels the corpus at `input` and writes retained rows to `output`.
///
/// # Errors
///
/// Returns an error if reading, labelling or writing fails. Nothing is
/// written when labelling fails.
pub fn run_labelling(
    input: &Path,
    output: &Path,
    vocabulary: &Vocabulary,
    config: LabellerConfig,
) -> Result<LabelReport> {
    let rows = corpus::read_rows(input)
        .with_context(|| format!("Failed to read corpus {}", input.display()))?;

    let (retained, report) =
        label_corpus(&rows, vocabulary, config).context("Failed to label corpus")?;

    crate::utils::ensure_parent_directory(output)?;
    corpus::write_jsonl(output, &retained)
        .with_context(|| format!("Failed to write labelled corpus {}", output.display()))?;

    info!(
        total = report.total_rows,
        tagged = report.tagged_rows,
        retained = report.retained_rows,
        output = %output.display(),
        "labelled corpus written"
    );
    Ok(report)
}

/// Recomputes display weights from an already labelled corpus.
///
/// # Errors
///
/// Returns an error if the corpus cannot be read or a row lacks tag columns.
pub fn weights_for(path: &Path) -> Result<Vec<TagWeight>> {
    let labelled = corpus::read_labelled(path)
        .with_context(|| format!("Failed to read labelled corpus {}", path.display()))?;
    Ok(normalize(&labelled))
}
