use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use figtag::catalog::SearchScope;
use figtag::tagging::{DEFAULT_CHUNK_SIZE, LabelError, LabellerConfig};
use figtag::{Catalog, LabelReport, VocabularyError, pipeline, tui, utils};
use thiserror::Error;

/// figtag - keyword tagging and browsing for figure-caption corpora
#[derive(Parser)]
#[command(name = "figtag")]
#[command(about = "Keyword tagging and browsing for scientific figure captions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Tag captions in a JSON-lines corpus against a keyword vocabulary
    Label(LabelCommand),
    /// Print tag-cloud weights for a labelled corpus
    Weights(WeightsCommand),
    /// Search figure captions and descriptions
    Search(SearchCommand),
    /// Launch the interactive figure viewer
    View(ViewCommand),
    /// List the tags of the active vocabulary
    Tags(TagsCommand),
}

/// Tag captions in a corpus
#[derive(Parser)]
struct LabelCommand {
    /// JSON-lines corpus with a `caption` column
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Where to write the labelled rows
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Vocabulary JSON file (defaults to the config directory, then built-in)
    #[arg(short, long, value_name = "FILE")]
    vocabulary: Option<PathBuf>,

    /// Rows per labelling chunk
    #[arg(long, value_name = "ROWS", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Worker threads (0 uses one per CPU)
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    jobs: usize,

    /// Write a JSON run report to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Keep every matched tag, ignoring the vocabulary's allow-list
    #[arg(long)]
    all_tags: bool,
}

/// Print tag weights
#[derive(Parser)]
struct WeightsCommand {
    /// Labelled JSON-lines corpus with `tag` and `label` columns
    #[arg(value_name = "LABELLED")]
    labelled: PathBuf,
}

/// Search figures
#[derive(Parser)]
struct SearchCommand {
    /// JSON-lines figure records
    #[arg(value_name = "FIGURES")]
    figures: PathBuf,

    /// Keyword to look for, case-insensitive
    #[arg(value_name = "QUERY")]
    query: String,

    /// Labelled corpus supplying the journal of each paper
    #[arg(long, value_name = "FILE")]
    journals: Option<PathBuf>,

    /// Only search captions
    #[arg(long, conflicts_with = "descriptions_only")]
    captions_only: bool,

    /// Only search descriptions
    #[arg(long)]
    descriptions_only: bool,
}

/// Launch the viewer
#[derive(Parser)]
struct ViewCommand {
    /// JSON-lines figure records
    #[arg(value_name = "FIGURES")]
    figures: PathBuf,

    /// Labelled corpus supplying the journal of each paper
    #[arg(long, value_name = "FILE")]
    journals: Option<PathBuf>,
}

/// List vocabulary tags
#[derive(Parser)]
struct TagsCommand {
    /// Vocabulary JSON file (defaults to the config directory, then built-in)
    #[arg(short, long, value_name = "FILE")]
    vocabulary: Option<PathBuf>,
}

/// Invalid command-line input not covered by library error types.
#[derive(Debug, Error)]
enum CliError {
    #[error("search query cannot be empty")]
    EmptyQuery,
}

fn main() {
    let cli = Cli::parse();

    // The viewer owns the terminal, so it runs without a log subscriber.
    if !matches!(cli.command, Commands::View(_)) {
        init_tracing();
    }

    let result = match &cli.command {
        Commands::Label(cmd) => handle_label(cmd),
        Commands::Weights(cmd) => handle_weights(cmd),
        Commands::Search(cmd) => handle_search(cmd),
        Commands::View(cmd) => tui::run(&cmd.figures, cmd.journals.as_deref()),
        Commands::Tags(cmd) => handle_tags(cmd),
    };

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are bad vocabularies or tag definitions, a zero chunk size
/// and empty queries.
/// Everything else, I/O and malformed corpora included, is internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.is::<VocabularyError>()
            || cause.is::<CliError>()
            || matches!(
                cause.downcast_ref::<LabelError>(),
                Some(LabelError::InvalidChunkSize | LabelError::InvalidDefinition { .. })
            )
    })
}

fn handle_label(cmd: &LabelCommand) -> Result<()> {
    let mut vocabulary = utils::resolve_vocabulary(cmd.vocabulary.as_deref())?;
    if cmd.all_tags {
        vocabulary = vocabulary.retain_all();
    }

    let config = LabellerConfig {
        chunk_size: cmd.chunk_size,
        parallelism: cmd.jobs,
    };
    let report = pipeline::run_labelling(&cmd.input, &cmd.output, &vocabulary, config)?;

    if let Some(path) = &cmd.report {
        write_report(path, &report)?;
    }

    println!(
        "Labelled {} of {} rows, kept {} in {}",
        report.tagged_rows,
        report.total_rows,
        report.retained_rows,
        cmd.output.display()
    );
    for count in &report.tag_counts {
        println!("  {:<24} {}", count.tag, count.count);
    }
    Ok(())
}

fn write_report(path: &Path, report: &LabelReport) -> Result<()> {
    utils::ensure_parent_directory(path)?;
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write report {}", path.display()))
}

fn handle_weights(cmd: &WeightsCommand) -> Result<()> {
    for weight in pipeline::weights_for(&cmd.labelled)? {
        println!("{}\t{:.2}", weight.tag, weight.weight);
    }
    Ok(())
}

fn handle_search(cmd: &SearchCommand) -> Result<()> {
    let query = search_query(&cmd.query)?;

    let catalog = tui::load_catalog(&cmd.figures, cmd.journals.as_deref())?;
    let scope = search_scope(cmd.captions_only, cmd.descriptions_only);
    print!("{}", format_search(&catalog, query, scope));
    Ok(())
}

/// Trims surrounding whitespace; a blank query is rejected.
fn search_query(raw: &str) -> Result<&str, CliError> {
    let query = raw.trim();
    if query.is_empty() {
        return Err(CliError::EmptyQuery);
    }
    Ok(query)
}

fn search_scope(captions_only: bool, descriptions_only: bool) -> SearchScope {
    SearchScope {
        captions: !descriptions_only,
        descriptions: !captions_only,
    }
}

/// Renders search hits followed by a one-line summary.
fn format_search(catalog: &Catalog, query: &str, scope: SearchScope) -> String {
    let hits = catalog.search(query, scope);
    if hits.is_empty() {
        return "No figures found matching your search query\n".to_string();
    }

    let mut out = String::new();
    for hit in &hits {
        if let Some(record) = catalog.records().get(hit.index) {
            out.push_str(&format!(
                "{} {} ({})\n  {}\n",
                record.pii,
                record.figure_id,
                record.journal(),
                hit.snippet
            ));
        }
    }

    let summary = catalog.summarize(&hits);
    out.push_str(&format!(
        "Found {} figures in {} papers across {} journals\n",
        summary.figures, summary.papers, summary.journals
    ));
    out
}

fn handle_tags(cmd: &TagsCommand) -> Result<()> {
    let vocabulary = utils::resolve_vocabulary(cmd.vocabulary.as_deref())?;
    for definition in vocabulary.definitions() {
        let marker = if vocabulary.retains(definition.name()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:>3}  {:<24} {}",
            definition.label(),
            definition.name(),
            definition.synonyms().join(", ")
        );
    }
    Ok(())
}
