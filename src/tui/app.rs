use std::time::Instant;

use crate::catalog::{Catalog, Overview, SearchHit, SearchScope, SearchSummary};
use crate::models::FigureRecord;

/// Top-level viewer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Keyword search over captions and descriptions.
    Search,
    /// Journal → paper → figure navigation.
    Browse,
}

/// Panel focus in search mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Query input is focused (typing edits the query)
    Query,
    /// Result list is focused (j/k navigation, Enter opens in browse)
    Results,
    /// Detail panel is focused (j/k scrolling)
    Detail,
}

/// Panel focus in browse mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseFocus {
    Journals,
    Papers,
    Figures,
    Detail,
}

/// Application state for the figure viewer.
#[derive(Debug, Clone)]
pub struct App {
    catalog: Catalog,
    mode: ViewMode,
    /// Query input buffer
    query: String,
    scope: SearchScope,
    hits: Vec<SearchHit>,
    selected_hit: Option<usize>,
    focus: Focus,
    /// When the query was last edited (for debouncing search)
    search_changed_at: Option<Instant>,
    search_pending: bool,
    browse_focus: BrowseFocus,
    journals: Vec<String>,
    papers: Vec<String>,
    figures: Vec<String>,
    journal_index: Option<usize>,
    paper_index: Option<usize>,
    figure_index: Option<usize>,
    detail_scroll: u16,
}

impl App {
    /// Creates a viewer over a catalog, starting in search mode.
    ///
    /// # Examples
    ///
    /// ```
    /// use figtag::catalog::Catalog;
    /// use figtag::tui::{App, Focus, ViewMode};
    ///
    /// let app = App::new(Catalog::default());
    /// assert_eq!(app.mode(), ViewMode::Search);
    /// assert_eq!(app.focus(), Focus::Query);
    /// assert!(app.hits().is_empty());
    /// ```
    pub fn new(catalog: Catalog) -> Self {
        let journals = catalog.journals().into_iter().map(String::from).collect();
        Self {
            catalog,
            mode: ViewMode::Search,
            query: String::new(),
            scope: SearchScope::default(),
            hits: Vec::new(),
            selected_hit: None,
            focus: Focus::Query,
            search_changed_at: None,
            search_pending: false,
            browse_focus: BrowseFocus::Journals,
            journals,
            papers: Vec::new(),
            figures: Vec::new(),
            journal_index: None,
            paper_index: None,
            figure_index: None,
            detail_scroll: 0,
        }
    }

    /// Returns the underlying catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the current mode.
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Returns the search-mode focus.
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Returns the browse-mode focus.
    pub fn browse_focus(&self) -> BrowseFocus {
        self.browse_focus
    }

    /// Returns the query buffer.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns which fields searches look at.
    pub fn scope(&self) -> SearchScope {
        self.scope
    }

    /// Returns the current search hits.
    pub fn hits(&self) -> &[SearchHit] {
        &self.hits
    }

    /// Returns the selected hit index.
    pub fn selected_hit(&self) -> Option<usize> {
        self.selected_hit
    }

    /// Returns the record behind a hit.
    pub fn hit_record(&self, hit: &SearchHit) -> Option<&FigureRecord> {
        self.catalog.records().get(hit.index)
    }

    /// Returns counts over the current hits.
    pub fn summary(&self) -> SearchSummary {
        self.catalog.summarize(&self.hits)
    }

    /// Returns dataset-level counts.
    pub fn overview(&self) -> Overview {
        self.catalog.overview()
    }

    /// Switches between search and browse mode.
    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
        self.detail_scroll = 0;
    }

    // --- Search mode ---

    /// Adds a character to the query and marks a search as pending.
    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
        self.mark_search_changed();
    }

    /// Removes the last query character and marks a search as pending.
    pub fn pop_query_char(&mut self) {
        self.query.pop();
        self.mark_search_changed();
    }

    fn mark_search_changed(&mut self) {
        self.search_changed_at = Some(Instant::now());
        self.search_pending = true;
    }

    /// Returns whether a search is pending and the query has been idle for
    /// at least `debounce_ms` milliseconds.
    pub fn should_search(&self, debounce_ms: u64) -> bool {
        if !self.search_pending {
            return false;
        }
        match self.search_changed_at {
            Some(changed_at) => changed_at.elapsed().as_millis() >= u128::from(debounce_ms),
            None => false,
        }
    }

    /// Runs the query against the catalog and resets the hit selection.
    pub fn run_search(&mut self) {
        self.hits = self.catalog.search(&self.query, self.scope);
        self.selected_hit = None;
        self.search_pending = false;
        self.detail_scroll = 0;
    }

    /// Toggles whether captions are searched and reruns the search.
    pub fn toggle_caption_scope(&mut self) {
        self.scope.captions = !self.scope.captions;
        self.run_search();
    }

    /// Toggles whether descriptions are searched and reruns the search.
    pub fn toggle_description_scope(&mut self) {
        self.scope.descriptions = !self.scope.descriptions;
        self.run_search();
    }

    /// Cycles search focus: `Query` -> `Results` -> `Detail` -> `Query`.
    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Query => Focus::Results,
            Focus::Results => Focus::Detail,
            Focus::Detail => Focus::Query,
        };
        self.auto_select_on_results_focus();
    }

    /// Cycles search focus backwards.
    pub fn prev_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Query => Focus::Detail,
            Focus::Results => Focus::Query,
            Focus::Detail => Focus::Results,
        };
        self.auto_select_on_results_focus();
    }

    fn auto_select_on_results_focus(&mut self) {
        if self.focus == Focus::Results && self.selected_hit.is_none() && !self.hits.is_empty() {
            self.selected_hit = Some(0);
        }
    }

    /// Moves the hit selection down, wrapping at the end.
    pub fn select_next_hit(&mut self) {
        self.selected_hit = wrap_next(self.selected_hit, self.hits.len());
        self.detail_scroll = 0;
    }

    /// Moves the hit selection up, wrapping at the start.
    pub fn select_previous_hit(&mut self) {
        self.selected_hit = wrap_previous(self.selected_hit, self.hits.len());
        self.detail_scroll = 0;
    }

    /// Returns focus to the query input and clears the hit selection.
    pub fn reset_search_focus(&mut self) {
        self.focus = Focus::Query;
        self.selected_hit = None;
    }

    /// Opens the selected hit in browse mode with its figure selected.
    ///
    /// Returns `false` when no hit is selected.
    pub fn open_selected_hit(&mut self) -> bool {
        let Some(record) = self
            .selected_hit
            .and_then(|i| self.hits.get(i))
            .and_then(|hit| self.catalog.records().get(hit.index))
        else {
            return false;
        };
        let (journal, pii, figure_id) = (
            record.journal().to_string(),
            record.pii.clone(),
            record.figure_id.clone(),
        );

        self.select_figure(&journal, &pii, &figure_id);
        self.set_mode(ViewMode::Browse);
        self.browse_focus = BrowseFocus::Figures;
        true
    }

    // --- Browse mode ---

    /// Returns the journals available in browse mode.
    pub fn journals(&self) -> &[String] {
        &self.journals
    }

    /// Returns the papers of the selected journal.
    pub fn papers(&self) -> &[String] {
        &self.papers
    }

    /// Returns the figures of the selected paper.
    pub fn figures(&self) -> &[String] {
        &self.figures
    }

    /// Returns the selected journal index.
    pub fn journal_index(&self) -> Option<usize> {
        self.journal_index
    }

    /// Returns the selected paper index.
    pub fn paper_index(&self) -> Option<usize> {
        self.paper_index
    }

    /// Returns the selected figure index.
    pub fn figure_index(&self) -> Option<usize> {
        self.figure_index
    }

    /// Cycles browse focus: `Journals` -> `Papers` -> `Figures` -> `Detail`.
    pub fn next_browse_focus(&mut self) {
        self.browse_focus = match self.browse_focus {
            BrowseFocus::Journals => BrowseFocus::Papers,
            BrowseFocus::Papers => BrowseFocus::Figures,
            BrowseFocus::Figures => BrowseFocus::Detail,
            BrowseFocus::Detail => BrowseFocus::Journals,
        };
    }

    /// Cycles browse focus backwards.
    pub fn prev_browse_focus(&mut self) {
        self.browse_focus = match self.browse_focus {
            BrowseFocus::Journals => BrowseFocus::Detail,
            BrowseFocus::Papers => BrowseFocus::Journals,
            BrowseFocus::Figures => BrowseFocus::Papers,
            BrowseFocus::Detail => BrowseFocus::Figures,
        };
    }

    /// Moves the selection in the focused browse list.
    ///
    /// Changing the journal selects its first paper and figure; changing the
    /// paper selects its first figure.
    pub fn browse_move(&mut self, down: bool) {
        let step = |current, len| {
            if down {
                wrap_next(current, len)
            } else {
                wrap_previous(current, len)
            }
        };

        match self.browse_focus {
            BrowseFocus::Journals => {
                self.journal_index = step(self.journal_index, self.journals.len());
                self.refresh_papers();
            }
            BrowseFocus::Papers => {
                self.paper_index = step(self.paper_index, self.papers.len());
                self.refresh_figures();
            }
            BrowseFocus::Figures => {
                self.figure_index = step(self.figure_index, self.figures.len());
            }
            BrowseFocus::Detail => {
                if down {
                    self.scroll_detail_down(1);
                } else {
                    self.scroll_detail_up(1);
                }
                return;
            }
        }
        self.detail_scroll = 0;
    }

    /// Clears the browse selection, showing the dataset overview.
    pub fn clear_browse_selection(&mut self) {
        self.journal_index = None;
        self.papers.clear();
        self.paper_index = None;
        self.figures.clear();
        self.figure_index = None;
        self.browse_focus = BrowseFocus::Journals;
        self.detail_scroll = 0;
    }

    /// Selects a specific figure in browse mode.
    ///
    /// Returns `false` if the figure is not in the catalog.
    pub fn select_figure(&mut self, journal: &str, pii: &str, figure_id: &str) -> bool {
        let Some(journal_index) = self.journals.iter().position(|j| j == journal) else {
            return false;
        };
        self.journal_index = Some(journal_index);
        self.refresh_papers();

        let Some(paper_index) = self.papers.iter().position(|p| p == pii) else {
            return false;
        };
        self.paper_index = Some(paper_index);
        self.refresh_figures();

        let Some(figure_index) = self.figures.iter().position(|f| f == figure_id) else {
            return false;
        };
        self.figure_index = Some(figure_index);
        self.detail_scroll = 0;
        true
    }

    fn refresh_papers(&mut self) {
        self.papers = self
            .journal_index
            .and_then(|i| self.journals.get(i))
            .map(|journal| {
                self.catalog
                    .papers(journal)
                    .into_iter()
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        self.paper_index = (!self.papers.is_empty()).then_some(0);
        self.refresh_figures();
    }

    fn refresh_figures(&mut self) {
        self.figures = self
            .paper_index
            .and_then(|i| self.papers.get(i))
            .map(|pii| {
                self.catalog
                    .figures(pii)
                    .into_iter()
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        self.figure_index = (!self.figures.is_empty()).then_some(0);
    }

    // --- Shared ---

    /// Returns the figure shown in the detail panel of the current mode.
    pub fn selected_record(&self) -> Option<&FigureRecord> {
        match self.mode {
            ViewMode::Search => self
                .selected_hit
                .and_then(|i| self.hits.get(i))
                .and_then(|hit| self.catalog.records().get(hit.index)),
            ViewMode::Browse => {
                let pii = self.paper_index.and_then(|i| self.papers.get(i))?;
                let figure_id = self.figure_index.and_then(|i| self.figures.get(i))?;
                self.catalog.find(pii, figure_id)
            }
        }
    }

    /// Returns the snippet of the selected hit in search mode.
    pub fn selected_snippet(&self) -> Option<&str> {
        match self.mode {
            ViewMode::Search => self
                .selected_hit
                .and_then(|i| self.hits.get(i))
                .map(|hit| hit.snippet.as_str()),
            ViewMode::Browse => None,
        }
    }

    /// Returns the detail panel scroll offset.
    pub fn detail_scroll(&self) -> u16 {
        self.detail_scroll
    }

    /// Scrolls the detail panel down.
    pub fn scroll_detail_down(&mut self, amount: u16) {
        self.detail_scroll = self.detail_scroll.saturating_add(amount);
    }

    /// Scrolls the detail panel up.
    pub fn scroll_detail_up(&mut self, amount: u16) {
        self.detail_scroll = self.detail_scroll.saturating_sub(amount);
    }
}

fn wrap_next(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) if i + 1 < len => i + 1,
        Some(_) => 0,
        None => 0,
    })
}

fn wrap_previous(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        None | Some(0) => len - 1,
        Some(i) => i - 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(pii: &str, figure_id: &str, caption: &str) -> FigureRecord {
        FigureRecord {
            pii: pii.to_string(),
            figure_id: figure_id.to_string(),
            caption: caption.to_string(),
            descriptions: Vec::new(),
            image: String::new(),
            journal: None,
        }
    }

    fn sample_app() -> App {
        let records = vec![
            record("S1", "f0005", "TEM image of precipitates"),
            record("S1", "f0010", "SEM fractography"),
            record("S2", "f0005", "EBSD orientation map"),
            record("S3", "f0001", "TEM tomography"),
        ];
        let journals = HashMap::from([
            ("S1".to_string(), "Acta Materialia".to_string()),
            ("S2".to_string(), "Acta Materialia".to_string()),
            ("S3".to_string(), "Scripta Materialia".to_string()),
        ]);
        App::new(Catalog::new(records, &journals))
    }

    #[test]
    fn app_initializes_in_search_mode() {
        let app = sample_app();

        assert_eq!(app.mode(), ViewMode::Search);
        assert_eq!(app.focus(), Focus::Query);
        assert_eq!(app.journals(), &["Acta Materialia", "Scripta Materialia"]);
        assert!(app.selected_record().is_none());
    }

    #[test]
    fn run_search_populates_hits() {
        let mut app = sample_app();
        for c in "tem".chars() {
            app.push_query_char(c);
        }
        app.run_search();

        assert_eq!(app.hits().len(), 2);
        assert_eq!(app.summary().papers, 2);
        assert!(!app.should_search(0));
    }

    #[test]
    fn should_search_respects_debounce() {
        let mut app = sample_app();
        assert!(!app.should_search(0));

        app.push_query_char('t');
        assert!(app.should_search(0));
        assert!(!app.should_search(60_000));
    }

    #[test]
    fn focusing_results_selects_first_hit() {
        let mut app = sample_app();
        app.push_query_char('t');
        app.push_query_char('e');
        app.push_query_char('m');
        app.run_search();

        app.next_focus();
        assert_eq!(app.focus(), Focus::Results);
        assert_eq!(app.selected_hit(), Some(0));
        assert_eq!(app.selected_record().unwrap().figure_id, "f0005");
        assert!(app.selected_snippet().unwrap().starts_with("Caption: "));
    }

    #[test]
    fn hit_selection_wraps() {
        let mut app = sample_app();
        app.push_query_char('m');
        app.run_search();
        let len = app.hits().len();
        assert!(len > 1);

        app.select_previous_hit();
        assert_eq!(app.selected_hit(), Some(len - 1));
        app.select_next_hit();
        assert_eq!(app.selected_hit(), Some(0));
    }

    #[test]
    fn toggling_scope_reruns_search() {
        let mut app = sample_app();
        app.push_query_char('t');
        app.push_query_char('e');
        app.push_query_char('m');
        app.run_search();
        assert_eq!(app.hits().len(), 2);

        app.toggle_caption_scope();
        assert!(!app.scope().captions);
        assert!(app.hits().is_empty());
    }

    #[test]
    fn opening_hit_jumps_to_browse_selection() {
        let mut app = sample_app();
        for c in "tomography".chars() {
            app.push_query_char(c);
        }
        app.run_search();
        app.next_focus();

        assert!(app.open_selected_hit());
        assert_eq!(app.mode(), ViewMode::Browse);
        assert_eq!(app.browse_focus(), BrowseFocus::Figures);
        let selected = app.selected_record().unwrap();
        assert_eq!(selected.pii, "S3");
        assert_eq!(selected.figure_id, "f0001");
    }

    #[test]
    fn open_without_selection_does_nothing() {
        let mut app = sample_app();
        assert!(!app.open_selected_hit());
        assert_eq!(app.mode(), ViewMode::Search);
    }

    #[test]
    fn browse_cascade_selects_first_paper_and_figure() {
        let mut app = sample_app();
        app.set_mode(ViewMode::Browse);
        assert!(app.selected_record().is_none());

        app.browse_move(true);
        assert_eq!(app.journal_index(), Some(0));
        assert_eq!(app.papers(), &["S1", "S2"]);
        assert_eq!(app.figures(), &["f0005", "f0010"]);
        assert_eq!(app.selected_record().unwrap().caption, "TEM image of precipitates");

        app.next_browse_focus();
        app.browse_move(true);
        assert_eq!(app.paper_index(), Some(1));
        assert_eq!(app.figures(), &["f0005"]);
        assert_eq!(app.selected_record().unwrap().pii, "S2");
    }

    #[test]
    fn clear_browse_selection_returns_to_overview() {
        let mut app = sample_app();
        app.set_mode(ViewMode::Browse);
        app.browse_move(true);
        app.clear_browse_selection();

        assert!(app.selected_record().is_none());
        assert!(app.papers().is_empty());
        assert_eq!(app.overview().figures, 4);
    }

    #[test]
    fn select_figure_rejects_unknown_figure() {
        let mut app = sample_app();
        assert!(!app.select_figure("Acta Materialia", "S1", "f9999"));
        assert!(!app.select_figure("Nature", "S1", "f0005"));
        assert!(app.select_figure("Acta Materialia", "S1", "f0010"));
    }

    #[test]
    fn wrap_helpers_handle_empty_lists() {
        assert_eq!(wrap_next(None, 0), None);
        assert_eq!(wrap_previous(Some(3), 0), None);
        assert_eq!(wrap_next(Some(0), 1), Some(0));
        assert_eq!(wrap_previous(Some(0), 1), Some(0));
    }
}
