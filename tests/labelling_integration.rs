//! End-to-end labelling over JSON-lines files on disk.

use anyhow::Result;
use figtag::corpus::{self, CorpusError};
use figtag::tagging::LabellerConfig;
use figtag::{LabelError, Vocabulary, VocabularyError, label_corpus, run_labelling, utils};
use std::fs;
use tempfile::tempdir;

const CORPUS: &str = r#"{"figure_id":"f0005","pii":"S1","journal":"Acta Materialia","caption":"Bright-field TEM image of dislocation networks"}
{"figure_id":"f0010","pii":"S1","journal":"Acta Materialia","caption":"EBSD orientation map after annealing"}

{"figure_id":"f0015","pii":"S2","journal":"Scripta Materialia","caption":"Hardness versus load at 300 K"}
{"figure_id":"f0020","pii":"S2","journal":"Scripta Materialia","caption":null}
{"figure_id":"f0025","pii":"S3","journal":"Materials Letters","caption":"AFM topography of the film surface"}
{"figure_id":"f0030","pii":"S3","journal":"Materials Letters","caption":"Raman spectra of the coating"}
"#;

#[test]
fn builtin_vocabulary_labels_and_filters_corpus() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("captions.jsonl");
    let output = dir.path().join("labelled.jsonl");
    fs::write(&input, CORPUS)?;

    let config = LabellerConfig {
        chunk_size: 2,
        parallelism: 2,
    };
    let report = run_labelling(&input, &output, &Vocabulary::builtin(), config)?;

    assert_eq!(report.total_rows, 6);
    // "Ra" (surface roughness) also matches inside "Raman"; that tag is not retained.
    assert_eq!(report.tagged_rows, 4);
    assert_eq!(report.retained_rows, 3);
    assert!(report.weights.iter().any(|w| w.tag == "surface roughness"));

    let labelled = corpus::read_labelled(&output)?;
    let tags: Vec<&str> = labelled.iter().map(|row| row.tag()).collect();
    assert_eq!(tags, vec!["TEM", "EBSD", "AFM"]);
    assert_eq!(labelled[0].row().str_field("journal"), Some("Acta Materialia"));
    assert_eq!(labelled[2].label().get(), 0);

    Ok(())
}

#[test]
fn all_tags_keeps_rows_outside_allow_list() -> Result<()> {
    let rows = corpus::parse_jsonl(CORPUS.as_bytes())?;
    let vocabulary = Vocabulary::builtin().retain_all();

    let (retained, report) = label_corpus(&rows, &vocabulary, LabellerConfig::default())?;

    assert_eq!(retained.len(), 4);
    assert_eq!(report.retained_rows, report.tagged_rows);
    assert_eq!(retained[3].tag(), "surface roughness");
    Ok(())
}

#[test]
fn custom_vocabulary_file_drives_labelling() -> Result<()> {
    let dir = tempdir()?;
    let vocab_path = dir.path().join("vocabulary.json");
    fs::write(
        &vocab_path,
        r#"{"tags": [["annealing", "anneal"], "dislocation"], "retain": ["dislocation"]}"#,
    )?;
    let vocabulary = utils::resolve_vocabulary(Some(&vocab_path))?;
    let rows = corpus::parse_jsonl(CORPUS.as_bytes())?;

    let (retained, report) = label_corpus(&rows, &vocabulary, LabellerConfig::default())?;

    assert_eq!(report.tagged_rows, 2);
    assert_eq!(retained.len(), 1);
    assert_eq!(retained[0].tag(), "dislocation");
    assert_eq!(retained[0].label().get(), 1);
    Ok(())
}

#[test]
fn relabelling_labelled_output_is_stable() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("captions.jsonl");
    let first = dir.path().join("first.jsonl");
    let second = dir.path().join("second.jsonl");
    fs::write(&input, CORPUS)?;

    let vocabulary = Vocabulary::builtin();
    run_labelling(&input, &first, &vocabulary, LabellerConfig::default())?;
    run_labelling(&first, &second, &vocabulary, LabellerConfig::default())?;

    assert_eq!(fs::read_to_string(&first)?, fs::read_to_string(&second)?);
    Ok(())
}

#[test]
fn malformed_line_is_reported_with_line_number() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.jsonl");
    fs::write(&input, "{\"caption\":\"TEM\"}\n\n{not json}\n").unwrap();

    let err = corpus::read_rows(&input).unwrap_err();
    assert!(matches!(err, CorpusError::Json { line: 3, .. }));
}

#[test]
fn invalid_inputs_surface_typed_errors() {
    let err = Vocabulary::from_json_str(r#"{"tags": ["TEM"], "retain": ["XRD"]}"#).unwrap_err();
    assert!(matches!(err, VocabularyError::UnknownRetainedTag(ref tag) if tag == "XRD"));

    let rows = corpus::parse_jsonl(CORPUS.as_bytes()).unwrap();
    let config = LabellerConfig {
        chunk_size: 0,
        parallelism: 1,
    };
    let err = label_corpus(&rows, &Vocabulary::builtin(), config).unwrap_err();
    assert!(matches!(err, LabelError::InvalidChunkSize));
}
