//! Keyboard event handling for the viewer.
//!
//! Maps crossterm keyboard events to application state changes. Key behavior
//! depends on the current mode and the focused panel.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, BrowseFocus, Focus, ViewMode};

/// Handles a keyboard event and updates the app state accordingly.
///
/// Returns `true` if the application should quit, `false` otherwise.
///
/// # Event Handling
///
/// - `Ctrl+C`: quit from anywhere
/// - `q`: quit, except while typing a query
/// - `Tab` / `Shift+Tab`: cycle panels within the current mode
/// - `Esc`: search mode returns to the query input; browse mode clears the selection
/// - `b` / `s`: switch to browse / search mode (outside the query input)
///
/// # Examples
///
/// ```
/// use figtag::catalog::Catalog;
/// use figtag::tui::{App, event::handle_key_event};
/// use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
///
/// let mut app = App::new(Catalog::default());
/// let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
/// assert!(handle_key_event(&mut app, key));
/// ```
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    let typing = app.mode() == ViewMode::Search && app.focus() == Focus::Query;
    if !typing && key.code == KeyCode::Char('q') && key.modifiers.is_empty() {
        return true;
    }

    match app.mode() {
        ViewMode::Search => handle_search_mode(app, key),
        ViewMode::Browse => handle_browse_mode(app, key),
    }

    false
}

fn handle_search_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => app.next_focus(),
        KeyCode::BackTab => app.prev_focus(),
        KeyCode::Esc => app.reset_search_focus(),
        _ => match app.focus() {
            Focus::Query => handle_query_input(app, key),
            Focus::Results => handle_result_list(app, key),
            Focus::Detail => handle_detail(app, key),
        },
    }
}

/// Character input edits the query; Enter searches immediately.
fn handle_query_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            app.push_query_char(c);
        }
        KeyCode::Backspace => app.pop_query_char(),
        KeyCode::Enter => {
            app.run_search();
            app.next_focus();
        }
        _ => {}
    }
}

fn handle_result_list(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next_hit(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous_hit(),
        KeyCode::Char('c') if key.modifiers.is_empty() => app.toggle_caption_scope(),
        KeyCode::Char('d') if key.modifiers.is_empty() => app.toggle_description_scope(),
        KeyCode::Char('b') if key.modifiers.is_empty() => app.set_mode(ViewMode::Browse),
        KeyCode::Enter => {
            app.open_selected_hit();
        }
        _ => {}
    }
}

fn handle_detail(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.scroll_detail_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_detail_up(1),
        KeyCode::Char('b') if key.modifiers.is_empty() => app.set_mode(ViewMode::Browse),
        _ => {}
    }
}

fn handle_browse_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => app.next_browse_focus(),
        KeyCode::BackTab => app.prev_browse_focus(),
        KeyCode::Esc => app.clear_browse_selection(),
        KeyCode::Char('j') | KeyCode::Down => app.browse_move(true),
        KeyCode::Char('k') | KeyCode::Up => app.browse_move(false),
        KeyCode::Enter if app.browse_focus() != BrowseFocus::Detail => app.next_browse_focus(),
        KeyCode::Char('s' | '/') if key.modifiers.is_empty() => {
            app.set_mode(ViewMode::Search);
            app.reset_search_focus();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::models::FigureRecord;
    use std::collections::HashMap;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn sample_app() -> App {
        let records: Vec<FigureRecord> = vec![
            serde_json::from_str(r#"{"pii":"S1","figure_id":"f1","caption":"TEM image"}"#)
                .unwrap(),
            serde_json::from_str(r#"{"pii":"S2","figure_id":"f1","caption":"AFM scan"}"#)
                .unwrap(),
        ];
        App::new(Catalog::new(records, &HashMap::new()))
    }

    #[test]
    fn ctrl_c_quits_from_query_input() {
        let mut app = sample_app();
        assert_eq!(app.focus(), Focus::Query);

        let quit = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(handle_key_event(&mut app, quit));
    }

    #[test]
    fn q_is_typed_into_query_but_quits_elsewhere() {
        let mut app = sample_app();
        assert!(!handle_key_event(&mut app, key(KeyCode::Char('q'))));
        assert_eq!(app.query(), "q");

        handle_key_event(&mut app, key(KeyCode::Tab));
        assert!(handle_key_event(&mut app, key(KeyCode::Char('q'))));
    }

    #[test]
    fn typing_and_enter_run_search_and_focus_results() {
        let mut app = sample_app();
        for c in "afm".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        handle_key_event(&mut app, key(KeyCode::Backspace));
        handle_key_event(&mut app, key(KeyCode::Char('m')));
        assert_eq!(app.query(), "afm");

        handle_key_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.hits().len(), 1);
        assert_eq!(app.focus(), Focus::Results);
        assert_eq!(app.selected_hit(), Some(0));
    }

    #[test]
    fn enter_on_result_opens_browse_mode() {
        let mut app = sample_app();
        for c in "tem".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        handle_key_event(&mut app, key(KeyCode::Enter));
        handle_key_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.mode(), ViewMode::Browse);
        assert_eq!(app.selected_record().unwrap().pii, "S1");
    }

    #[test]
    fn esc_returns_to_query_input() {
        let mut app = sample_app();
        handle_key_event(&mut app, key(KeyCode::Tab));
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus(), Focus::Detail);

        handle_key_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.focus(), Focus::Query);
        assert_eq!(app.selected_hit(), None);
    }

    #[test]
    fn mode_switch_keys() {
        let mut app = sample_app();
        handle_key_event(&mut app, key(KeyCode::Tab));
        handle_key_event(&mut app, key(KeyCode::Char('b')));
        assert_eq!(app.mode(), ViewMode::Browse);

        handle_key_event(&mut app, key(KeyCode::Char('s')));
        assert_eq!(app.mode(), ViewMode::Search);
        assert_eq!(app.focus(), Focus::Query);
    }

    #[test]
    fn browse_navigation_with_enter_advances_panels() {
        let mut app = sample_app();
        app.set_mode(ViewMode::Browse);

        handle_key_event(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.journal_index(), Some(0));

        handle_key_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.browse_focus(), BrowseFocus::Papers);
        handle_key_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.paper_index(), Some(1));

        handle_key_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.browse_focus(), BrowseFocus::Journals);
        assert!(app.selected_record().is_none());
    }
}
