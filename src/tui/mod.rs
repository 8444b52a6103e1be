//! Terminal viewer for figure corpora.
//!
//! Provides a search mode (keyword query over captions and descriptions) and
//! a browse mode (journal → paper → figure) using ratatui for rendering and
//! crossterm for terminal management.

use std::io;
use std::panic;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self as crossterm_event, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::catalog::{Catalog, journal_mapping};
use crate::corpus;

mod app;
pub mod event;
mod ui;

pub use app::{App, BrowseFocus, Focus, ViewMode};

/// Idle time after the last query keystroke before searching.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Enables raw mode and enters the alternate screen.
///
/// # Errors
///
/// Returns an error if terminal initialization fails.
fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout)).context("failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
///
/// # Errors
///
/// Returns an error if terminal restoration fails.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Best-effort restoration usable from a panic hook.
fn restore_terminal_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Installs a panic hook that restores the terminal, then defers to the previous hook.
fn init_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal_panic();
        original_hook(panic_info);
    }));
}

/// Runs the viewer until the user quits.
///
/// # Errors
///
/// Returns an error if event polling, rendering, or terminal operations fail.
/// Terminal state is restored on both paths.
pub fn run_event_loop(app: &mut App) -> Result<()> {
    let mut terminal = init_terminal()?;

    let result = run_event_loop_internal(app, &mut terminal);

    if let Err(e) = restore_terminal(&mut terminal) {
        eprintln!("Error restoring terminal: {e}");
    }

    result
}

fn run_event_loop_internal(
    app: &mut App,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<()> {
    loop {
        if app.should_search(SEARCH_DEBOUNCE_MS) {
            app.run_search();
        }

        terminal.draw(|frame| ui::draw(frame, app))?;

        if crossterm_event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = crossterm_event::read()?
            && event::handle_key_event(app, key)
        {
            break;
        }
    }

    Ok(())
}

/// Builds the viewer catalog from a figure file and an optional labelled
/// corpus supplying `pii` → `journal`.
///
/// # Errors
///
/// Returns an error if either file cannot be read or parsed.
pub fn load_catalog(figures: &Path, journals: Option<&Path>) -> Result<Catalog> {
    let records = corpus::read_figures(figures)
        .with_context(|| format!("Failed to load figures from {}", figures.display()))?;

    let mapping = match journals {
        Some(path) => {
            let rows = corpus::read_rows(path)
                .with_context(|| format!("Failed to load journals from {}", path.display()))?;
            journal_mapping(&rows)
        }
        None => Default::default(),
    };

    Ok(Catalog::new(records, &mapping))
}

/// Entry point for the viewer.
///
/// # Errors
///
/// Returns an error if loading the corpus or running the terminal fails.
pub fn run(figures: &Path, journals: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(figures, journals)?;

    init_panic_hook();

    let mut app = App::new(catalog);
    run_event_loop(&mut app).context("TUI event loop failed")?;

    Ok(())
}
