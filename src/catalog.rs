//! In-memory figure catalog backing the viewer.
//!
//! A [`Catalog`] holds the figure records of a corpus with their journals
//! attached and answers the two questions the viewer asks: which figures
//! match a keyword ([`search_figures`]) and what is available under a given
//! journal or paper (the browse helpers on [`Catalog`]).

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::models::{CaptionRow, FigureRecord, UNKNOWN_JOURNAL};

mod search;

pub use search::{SNIPPET_CONTEXT, SearchHit, SearchScope, SearchSummary, search_figures, summarize};

/// Builds a pii → journal mapping from corpus rows with `pii` and `journal` columns.
///
/// Rows missing either column are ignored; when a pii appears with several
/// journals, the last row read wins.
pub fn journal_mapping(rows: &[CaptionRow]) -> HashMap<String, String> {
    let mut mapping = HashMap::new();
    for row in rows {
        if let (Some(pii), Some(journal)) = (row.str_field("pii"), row.str_field("journal")) {
            mapping.insert(pii.to_string(), journal.to_string());
        }
    }
    mapping
}

/// Number of figures in one journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalFigures {
    pub journal: String,
    pub figures: usize,
}

/// Dataset-level counts shown when nothing is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub journals: usize,
    pub papers: usize,
    pub figures: usize,
    /// Figures per journal, most figures first.
    pub per_journal: Vec<JournalFigures>,
}

/// Figure records indexed for search and browsing.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<FigureRecord>,
}

impl Catalog {
    /// Creates a catalog, attaching journals from `journals` by pii.
    ///
    /// Records whose pii is not in the mapping keep any journal they already
    /// carry, or read as `"Unknown"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use figtag::FigureRecord;
    /// use figtag::catalog::Catalog;
    ///
    /// let record: FigureRecord =
    ///     serde_json::from_str(r#"{"pii":"S1","figure_id":"f1"}"#).unwrap();
    /// let journals = HashMap::from([("S1".to_string(), "Acta Materialia".to_string())]);
    ///
    /// let catalog = Catalog::new(vec![record], &journals);
    /// assert_eq!(catalog.journals(), vec!["Acta Materialia"]);
    /// ```
    pub fn new(mut records: Vec<FigureRecord>, journals: &HashMap<String, String>) -> Self {
        for record in &mut records {
            if let Some(journal) = journals.get(&record.pii) {
                record.journal = Some(journal.clone());
            }
        }
        Self { records }
    }

    /// Returns all records in corpus order.
    pub fn records(&self) -> &[FigureRecord] {
        &self.records
    }

    /// Returns whether the catalog holds no figures.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Searches the catalog; see [`search_figures`].
    pub fn search(&self, query: &str, scope: SearchScope) -> Vec<SearchHit> {
        search_figures(&self.records, query, scope)
    }

    /// Summarizes search hits against this catalog.
    pub fn summarize(&self, hits: &[SearchHit]) -> SearchSummary {
        summarize(&self.records, hits)
    }

    /// Returns the distinct journals, sorted.
    pub fn journals(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(FigureRecord::journal)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns the distinct papers of a journal, sorted.
    pub fn papers(&self, journal: &str) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.journal() == journal)
            .map(|r| r.pii.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns the figure ids of a paper, sorted.
    pub fn figures(&self, pii: &str) -> Vec<&str> {
        let mut figures: Vec<&str> = self
            .records
            .iter()
            .filter(|r| r.pii == pii)
            .map(|r| r.figure_id.as_str())
            .collect();
        figures.sort_unstable();
        figures
    }

    /// Looks up one figure.
    pub fn find(&self, pii: &str, figure_id: &str) -> Option<&FigureRecord> {
        self.records
            .iter()
            .find(|r| r.pii == pii && r.figure_id == figure_id)
    }

    /// Returns dataset-level counts.
    pub fn overview(&self) -> Overview {
        let mut per_journal: HashMap<&str, usize> = HashMap::new();
        for record in &self.records {
            *per_journal.entry(record.journal()).or_default() += 1;
        }

        let mut per_journal: Vec<JournalFigures> = per_journal
            .into_iter()
            .map(|(journal, figures)| JournalFigures {
                journal: journal.to_string(),
                figures,
            })
            .collect();
        per_journal.sort_by(|a, b| {
            b.figures
                .cmp(&a.figures)
                .then_with(|| a.journal.cmp(&b.journal))
        });

        Overview {
            journals: per_journal.len(),
            papers: self
                .records
                .iter()
                .map(|r| r.pii.as_str())
                .collect::<BTreeSet<_>>()
                .len(),
            figures: self.records.len(),
            per_journal,
        }
    }
}

/// Returns `true` if the journal name is the placeholder for unmapped papers.
pub fn is_unknown_journal(journal: &str) -> bool {
    journal == UNKNOWN_JOURNAL
}
