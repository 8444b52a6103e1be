//! Chunked, parallel caption labelling.
//!
//! Rows are split into contiguous chunks of `chunk_size`. Each chunk is
//! classified on its own by a rayon worker and the per-chunk results are
//! concatenated in chunk order, so the output keeps the input order of the
//! rows that matched.

use rayon::prelude::*;
use tracing::{debug, info};

use super::{LabelError, TagMatcher};
use crate::models::{CaptionRow, LabelledRow};

/// Rows per chunk when none is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Chunking and worker-pool settings for a labelling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabellerConfig {
    /// Maximum rows per chunk; must be positive.
    pub chunk_size: usize,
    /// Worker threads. `0` uses one per logical CPU, `1` runs on the calling thread.
    pub parallelism: usize,
}

impl Default for LabellerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallelism: 0,
        }
    }
}

/// Builder for constructing `Labeller` instances.
///
/// # Examples
///
/// ```
/// use figtag::tagging::LabellerBuilder;
///
/// let labeller = LabellerBuilder::new()
///     .chunk_size(2)
///     .parallelism(4)
///     .build()
///     .unwrap();
/// assert_eq!(labeller.config().chunk_size, 2);
///
/// assert!(LabellerBuilder::new().chunk_size(0).build().is_err());
/// ```
#[derive(Debug, Default)]
pub struct LabellerBuilder {
    chunk_size: Option<usize>,
    parallelism: Option<usize>,
}

impl LabellerBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of rows per chunk.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Sets the number of worker threads.
    pub fn parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    /// Builds the `Labeller`.
    ///
    /// # Errors
    ///
    /// Returns `LabelError::InvalidChunkSize` if the chunk size is zero.
    pub fn build(self) -> Result<Labeller, LabelError> {
        let defaults = LabellerConfig::default();
        Labeller::new(LabellerConfig {
            chunk_size: self.chunk_size.unwrap_or(defaults.chunk_size),
            parallelism: self.parallelism.unwrap_or(defaults.parallelism),
        })
    }
}

/// Applies a `TagMatcher` to a row set chunk by chunk.
#[derive(Debug, Clone)]
pub struct Labeller {
    config: LabellerConfig,
}

impl Labeller {
    /// Creates a labeller from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `LabelError::InvalidChunkSize` if `chunk_size` is zero.
    pub fn new(config: LabellerConfig) -> Result<Self, LabelError> {
        if config.chunk_size == 0 {
            return Err(LabelError::InvalidChunkSize);
        }
        Ok(Self { config })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> LabellerConfig {
        self.config
    }

    /// Labels every row and drops those without a match.
    ///
    /// Output rows keep their relative input order. Every output row's label
    /// is the priority index of its tag.
    ///
    /// # Errors
    ///
    /// Returns `LabelError::ThreadPool` if the worker pool cannot be created.
    /// No partial output is produced.
    pub fn label(
        &self,
        rows: &[CaptionRow],
        matcher: &TagMatcher,
    ) -> Result<Vec<LabelledRow>, LabelError> {
        let chunk_size = self.config.chunk_size;
        let chunks = chunk_count(rows.len(), chunk_size);
        info!(
            rows = rows.len(),
            chunks,
            chunk_size,
            parallelism = self.config.parallelism,
            "commencing caption labelling"
        );

        let per_chunk: Vec<Vec<LabelledRow>> = if self.config.parallelism == 1 {
            rows.chunks(chunk_size)
                .enumerate()
                .map(|(index, chunk)| label_chunk(index, chunk, matcher))
                .collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.parallelism)
                .build()
                .map_err(LabelError::ThreadPool)?;
            pool.install(|| {
                rows.par_chunks(chunk_size)
                    .enumerate()
                    .map(|(index, chunk)| label_chunk(index, chunk, matcher))
                    .collect()
            })
        };

        let labelled: Vec<LabelledRow> = per_chunk.into_iter().flatten().collect();
        info!(
            rows = rows.len(),
            tagged = labelled.len(),
            "caption labelling complete"
        );
        Ok(labelled)
    }
}

/// Number of chunks needed to cover `rows` rows, `ceil(rows / chunk_size)`.
pub fn chunk_count(rows: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    rows.div_ceil(chunk_size)
}

/// Classifies one chunk; rows without a match are dropped.
fn label_chunk(index: usize, chunk: &[CaptionRow], matcher: &TagMatcher) -> Vec<LabelledRow> {
    let labelled: Vec<LabelledRow> = chunk
        .iter()
        .filter_map(|row| {
            matcher
                .classify(row.caption())
                .map(|hit| LabelledRow::new(row.clone(), hit.name(), hit.label()))
        })
        .collect();
    debug!(chunk = index, rows = chunk.len(), tagged = labelled.len(), "chunk labelled");
    labelled
}
