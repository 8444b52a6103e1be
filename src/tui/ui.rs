//! UI rendering for the viewer.
//!
//! Search mode shows a query bar above a result list and a detail panel.
//! Browse mode stacks journal, paper and figure lists beside the detail
//! panel, falling back to a dataset overview when nothing is selected.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::{App, BrowseFocus, Focus, ViewMode};
use crate::catalog::{Overview, is_unknown_journal};
use crate::models::FigureRecord;

/// Caption characters shown in list previews.
const PREVIEW_CHARS: usize = 40;

/// Main rendering function.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Mode tabs
            Constraint::Min(0),    // Mode content
            Constraint::Length(1), // Shortcut bar
        ])
        .split(frame.area());

    render_mode_tabs(frame, app, chunks[0]);
    match app.mode() {
        ViewMode::Search => render_search_mode(frame, app, chunks[1]),
        ViewMode::Browse => render_browse_mode(frame, app, chunks[1]),
    }
    render_shortcut_bar(frame, app, chunks[2]);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn bold(text: &str) -> Span<'static> {
    Span::styled(text.to_string(), Style::default().add_modifier(Modifier::BOLD))
}

fn highlight_style() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::REVERSED)
}

fn render_mode_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tab = |label: &'static str, active: bool| {
        if active {
            Span::styled(
                format!(" {label} "),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            )
        } else {
            Span::raw(format!(" {label} "))
        }
    };

    let line = Line::from(vec![
        bold("Figure Viewer "),
        tab("Search", app.mode() == ViewMode::Search),
        Span::raw(" "),
        tab("Browse", app.mode() == ViewMode::Browse),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_search_mode(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Query input
            Constraint::Length(1), // Scope and summary
            Constraint::Min(0),    // Results and detail
        ])
        .split(area);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[2]);

    render_query_input(frame, app, rows[0]);
    render_search_status(frame, app, rows[1]);
    render_result_list(frame, app, columns[0]);
    render_detail(frame, app, columns[1], app.focus() == Focus::Detail);
}

fn render_query_input(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus() == Focus::Query;
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Search keywords")
        .border_style(focus_style(is_focused));

    let mut content = app.query().to_string();
    if is_focused {
        content.push('█');
    } else if content.is_empty() {
        content.push_str("e.g. TEM, microstructure, dislocation");
    }

    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn render_search_status(frame: &mut Frame, app: &App, area: Rect) {
    let check = |on: bool| if on { "[x]" } else { "[ ]" };
    let scope = app.scope();
    let mut spans = vec![
        Span::raw(format!("{} captions  ", check(scope.captions))),
        Span::raw(format!("{} descriptions", check(scope.descriptions))),
    ];

    if !app.query().is_empty() {
        let summary = app.summary();
        let text = if summary.figures == 0 {
            "  |  No figures found matching your search query".to_string()
        } else {
            format!(
                "  |  {} figures, {} papers, {} journals",
                summary.figures, summary.papers, summary.journals
            )
        };
        spans.push(Span::styled(text, Style::default().fg(Color::DarkGray)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_result_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Results ({})", app.hits().len()))
        .border_style(focus_style(app.focus() == Focus::Results));

    let items: Vec<ListItem> = app
        .hits()
        .iter()
        .filter_map(|hit| app.hit_record(hit))
        .map(|record| ListItem::new(figure_heading(record)))
        .collect();

    let list = List::new(items).block(block).highlight_style(highlight_style());
    let mut state = ListState::default();
    state.select(app.selected_hit());
    frame.render_stateful_widget(list, area, &mut state);
}

/// `figure_id - pii (journal)` with a dimmed caption preview.
fn figure_heading(record: &FigureRecord) -> Line<'static> {
    Line::from(vec![
        Span::styled(record.figure_id.clone(), Style::default().fg(Color::Cyan)),
        Span::raw(format!(" - {} ({}) ", record.pii, record.journal())),
        Span::styled(
            preview(&record.caption, PREVIEW_CHARS),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        ),
    ])
}

/// Truncates to `max_chars` characters, appending `...` when cut.
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn render_browse_mode(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(area);
    let lists = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(35),
            Constraint::Percentage(35),
        ])
        .split(columns[0]);

    let focus = app.browse_focus();
    render_browse_list(
        frame,
        lists[0],
        "Journals",
        app.journals(),
        app.journal_index(),
        focus == BrowseFocus::Journals,
    );
    render_browse_list(
        frame,
        lists[1],
        "Papers (PII)",
        app.papers(),
        app.paper_index(),
        focus == BrowseFocus::Papers,
    );
    render_browse_list(
        frame,
        lists[2],
        "Figures",
        app.figures(),
        app.figure_index(),
        focus == BrowseFocus::Figures,
    );

    if app.selected_record().is_some() {
        render_detail(frame, app, columns[1], focus == BrowseFocus::Detail);
    } else {
        render_overview(frame, &app.overview(), columns[1]);
    }
}

fn render_browse_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    entries: &[String],
    selected: Option<usize>,
    focused: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{title} ({})", entries.len()))
        .border_style(focus_style(focused));

    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| {
            if is_unknown_journal(entry) {
                ListItem::new(Span::styled(
                    entry.clone(),
                    Style::default().fg(Color::DarkGray),
                ))
            } else {
                ListItem::new(entry.clone())
            }
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(highlight_style());
    let mut state = ListState::default();
    state.select(selected);
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect, focused: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Figure")
        .border_style(focus_style(focused));

    let content = match app.selected_record() {
        Some(record) => figure_detail(record, app.selected_snippet()),
        None => Text::from("No figure selected"),
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll(), 0));
    frame.render_widget(paragraph, area);
}

/// Builds the detail text for a figure: metadata, match, caption, descriptions, image.
pub(crate) fn figure_detail(record: &FigureRecord, snippet: Option<&str>) -> Text<'static> {
    let mut text = Text::default();

    text.lines.push(Line::from(vec![
        bold("Figure ID: "),
        Span::raw(record.figure_id.clone()),
    ]));
    text.lines.push(Line::from(vec![
        bold("Paper ID (PII): "),
        Span::raw(record.pii.clone()),
    ]));
    text.lines.push(Line::from(vec![
        bold("Journal: "),
        Span::raw(record.journal().to_string()),
    ]));

    if let Some(snippet) = snippet {
        text.lines.push(Line::from(""));
        text.lines.push(Line::from(vec![
            bold("Match: "),
            Span::styled(snippet.to_string(), Style::default().fg(Color::Yellow)),
        ]));
    }

    text.lines.push(Line::from(""));
    text.lines.push(Line::from("---"));
    if record.has_image() {
        #[allow(clippy::cast_precision_loss)]
        let kib = record.image_size() as f64 / 1024.0;
        text.lines.push(Line::from(vec![
            bold("Image: "),
            Span::styled(
                format!("{kib:.1} KiB embedded (not rendered in terminal)"),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    } else {
        text.lines.push(Line::from(Span::styled(
            "No image available for this figure",
            Style::default().fg(Color::Yellow),
        )));
    }

    if !record.caption.is_empty() {
        text.lines.push(Line::from(""));
        text.lines.push(Line::from(bold("Caption")));
        text.lines.push(Line::from(record.caption.clone()));
    }

    text.lines.push(Line::from(""));
    if record.descriptions.is_empty() {
        text.lines.push(Line::from(Span::styled(
            "No descriptions available for this figure",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        text.lines.push(Line::from(bold("Descriptions from Paper")));
        for (i, description) in record.descriptions.iter().enumerate() {
            if i > 0 {
                text.lines.push(Line::from("---"));
            }
            text.lines.push(Line::from(bold(&format!("Description {}:", i + 1))));
            text.lines.push(Line::from(description.clone()));
        }
    }

    text
}

fn render_overview(frame: &mut Frame, overview: &Overview, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Dataset Overview");

    let mut text = Text::default();
    text.lines.push(Line::from(
        "Select a journal, paper, and figure on the left to view details",
    ));
    text.lines.push(Line::from(""));
    text.lines.push(Line::from(vec![
        bold("Total Journals: "),
        Span::raw(overview.journals.to_string()),
    ]));
    text.lines.push(Line::from(vec![
        bold("Total Papers: "),
        Span::raw(overview.papers.to_string()),
    ]));
    text.lines.push(Line::from(vec![
        bold("Total Figures: "),
        Span::raw(overview.figures.to_string()),
    ]));

    if !overview.per_journal.is_empty() {
        text.lines.push(Line::from(""));
        text.lines.push(Line::from(bold("Figures by Journal")));
        for entry in &overview.per_journal {
            text.lines.push(Line::from(format!(
                "  {:>6}  {}",
                entry.figures, entry.journal
            )));
        }
    }

    frame.render_widget(Paragraph::new(text).block(block), area);
}

/// Shows context-aware shortcuts for the current mode and focus.
fn render_shortcut_bar(frame: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::default().fg(Color::Cyan);
    let sep_style = Style::default().fg(Color::DarkGray);

    let mut shortcuts: Vec<(&str, &str)> = vec![("Tab", "next panel"), ("Esc", "reset")];
    match (app.mode(), app.focus(), app.browse_focus()) {
        (ViewMode::Search, Focus::Query, _) => {
            shortcuts.insert(0, ("Ctrl+C", "quit"));
            shortcuts.push(("Enter", "search"));
        }
        (ViewMode::Search, Focus::Results, _) => {
            shortcuts.insert(0, ("q", "quit"));
            shortcuts.extend([
                ("j/k", "navigate"),
                ("Enter", "view in browse"),
                ("c/d", "toggle captions/descriptions"),
                ("b", "browse"),
            ]);
        }
        (ViewMode::Search, Focus::Detail, _) => {
            shortcuts.insert(0, ("q", "quit"));
            shortcuts.extend([("j/k", "scroll"), ("b", "browse")]);
        }
        (ViewMode::Browse, _, BrowseFocus::Detail) => {
            shortcuts.insert(0, ("q", "quit"));
            shortcuts.extend([("j/k", "scroll"), ("s", "search")]);
        }
        (ViewMode::Browse, _, _) => {
            shortcuts.insert(0, ("q", "quit"));
            shortcuts.extend([("j/k", "select"), ("Enter", "next list"), ("s", "search")]);
        }
    }

    let mut spans = Vec::new();
    for (i, (key, action)) in shortcuts.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", sep_style));
        }
        spans.push(Span::styled(key, key_style));
        spans.push(Span::raw(format!(": {action}")));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
