//! Keyword search over captions and descriptions.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::models::FigureRecord;

/// Characters of context kept on each side of a match.
pub const SNIPPET_CONTEXT: usize = 50;

/// Which parts of a figure record a search looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchScope {
    pub captions: bool,
    pub descriptions: bool,
}

impl Default for SearchScope {
    fn default() -> Self {
        Self {
            captions: true,
            descriptions: true,
        }
    }
}

/// A matching figure with a context snippet around the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Index of the record in the searched slice.
    pub index: usize,
    /// Where the match was found, e.g. `Caption: ...grain boundary...`.
    pub snippet: String,
}

/// Counts of distinct figures, papers and journals among search hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    pub figures: usize,
    pub papers: usize,
    pub journals: usize,
}

/// Finds records containing `query`, case-insensitively.
///
/// An empty query matches nothing. When both the caption and a description
/// match, the snippet is taken from the first matching description.
///
/// # Examples
///
/// ```
/// use figtag::FigureRecord;
/// use figtag::catalog::{SearchScope, search_figures};
///
/// let record: FigureRecord = serde_json::from_str(
///     r#"{"pii":"S1","figure_id":"f1","caption":"TEM image of a grain boundary"}"#,
/// ).unwrap();
///
/// let hits = search_figures(&[record], "grain", SearchScope::default());
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].snippet, "Caption: ...TEM image of a grain boundary...");
/// ```
pub fn search_figures(records: &[FigureRecord], query: &str, scope: SearchScope) -> Vec<SearchHit> {
    let Some(pattern) = query_pattern(query) else {
        return Vec::new();
    };

    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            match_record(record, &pattern, scope).map(|snippet| SearchHit { index, snippet })
        })
        .collect()
}

/// Summarizes hits against the records they index.
pub fn summarize(records: &[FigureRecord], hits: &[SearchHit]) -> SearchSummary {
    let matched = || hits.iter().filter_map(|hit| records.get(hit.index));
    SearchSummary {
        figures: hits.len(),
        papers: matched().map(|r| r.pii.as_str()).collect::<HashSet<_>>().len(),
        journals: matched().map(FigureRecord::journal).collect::<HashSet<_>>().len(),
    }
}

fn query_pattern(query: &str) -> Option<Regex> {
    if query.is_empty() {
        return None;
    }
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .ok()
}

fn match_record(record: &FigureRecord, pattern: &Regex, scope: SearchScope) -> Option<String> {
    let mut snippet = None;

    if scope.captions {
        snippet = context_snippet(&record.caption, pattern).map(|s| format!("Caption: {s}"));
    }

    if scope.descriptions {
        let described = record
            .descriptions
            .iter()
            .enumerate()
            .find_map(|(i, desc)| {
                context_snippet(desc, pattern).map(|s| format!("Description {}: {s}", i + 1))
            });
        if described.is_some() {
            snippet = described;
        }
    }

    snippet
}

/// Returns `...context...` around the first match, at char boundaries.
fn context_snippet(text: &str, pattern: &Regex) -> Option<String> {
    let found = pattern.find(text)?;

    let start = text[..found.start()]
        .char_indices()
        .rev()
        .nth(SNIPPET_CONTEXT - 1)
        .map_or(0, |(i, _)| i);
    let end = text[found.end()..]
        .char_indices()
        .nth(SNIPPET_CONTEXT)
        .map_or(text.len(), |(i, _)| found.end() + i);

    Some(format!("...{}...", &text[start..end]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pii: &str, figure_id: &str, caption: &str, descriptions: &[&str]) -> FigureRecord {
        FigureRecord {
            pii: pii.to_string(),
            figure_id: figure_id.to_string(),
            caption: caption.to_string(),
            descriptions: descriptions.iter().map(|d| (*d).to_string()).collect(),
            image: String::new(),
            journal: None,
        }
    }

    #[test]
    fn empty_query_matches_nothing() {
        let records = vec![record("S1", "f1", "TEM image", &[])];
        assert!(search_figures(&records, "", SearchScope::default()).is_empty());
    }

    #[test]
    fn search_is_case_insensitive() {
        let records = vec![record("S1", "f1", "Bright-field TEM image", &[])];
        let hits = search_figures(&records, "tem", SearchScope::default());

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 0);
    }

    #[test]
    fn description_snippet_wins_over_caption() {
        let records = vec![record(
            "S1",
            "f1",
            "EBSD map",
            &["No match here.", "The EBSD map in Fig. 2 shows texture."],
        )];
        let hits = search_figures(&records, "ebsd", SearchScope::default());

        assert!(hits[0].snippet.starts_with("Description 2: ..."));
    }

    #[test]
    fn scope_restricts_searched_fields() {
        let records = vec![
            record("S1", "f1", "dislocation network", &[]),
            record("S1", "f2", "overview", &["dislocation density increases"]),
        ];

        let captions_only = SearchScope {
            captions: true,
            descriptions: false,
        };
        let hits = search_figures(&records, "dislocation", captions_only);
        assert_eq!(hits.iter().map(|h| h.index).collect::<Vec<_>>(), vec![0]);

        let descriptions_only = SearchScope {
            captions: false,
            descriptions: true,
        };
        let hits = search_figures(&records, "dislocation", descriptions_only);
        assert_eq!(hits.iter().map(|h| h.index).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn snippet_keeps_fifty_characters_of_context() {
        let before = "a".repeat(80);
        let after = "b".repeat(80);
        let caption = format!("{before}MATCH{after}");
        let records = vec![record("S1", "f1", &caption, &[])];

        let hits = search_figures(&records, "match", SearchScope::default());
        let expected = format!("Caption: ...{}MATCH{}...", "a".repeat(50), "b".repeat(50));
        assert_eq!(hits[0].snippet, expected);
    }

    #[test]
    fn snippet_respects_multibyte_boundaries() {
        let caption = format!("{}µm scale bar", "é".repeat(60));
        let records = vec![record("S1", "f1", &caption, &[])];

        let hits = search_figures(&records, "scale", SearchScope::default());
        assert_eq!(hits.len(), 1);
        assert!(hits[0].snippet.contains("µm scale bar"));
    }

    #[test]
    fn query_is_matched_literally() {
        let records = vec![record("S1", "f1", "strain (a.u.)", &[])];

        assert_eq!(search_figures(&records, "(a.u.)", SearchScope::default()).len(), 1);
        assert!(search_figures(&records, "(a+u)", SearchScope::default()).is_empty());
    }

    #[test]
    fn summary_counts_distinct_papers_and_journals() {
        let mut records = vec![
            record("S1", "f1", "TEM", &[]),
            record("S1", "f2", "TEM", &[]),
            record("S2", "f1", "TEM", &[]),
        ];
        records[0].journal = Some("Acta Materialia".into());
        records[1].journal = Some("Acta Materialia".into());
        records[2].journal = Some("Scripta Materialia".into());

        let hits = search_figures(&records, "tem", SearchScope::default());
        let summary = summarize(&records, &hits);

        assert_eq!(
            summary,
            SearchSummary {
                figures: 3,
                papers: 2,
                journals: 2
            }
        );
    }
}
