use std::fs;
use std::path::Path;

use manuscript::Config;
use manuscript::batch::{self, OutputFormat, Status};
use pretty_assertions::assert_eq;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

#[test]
fn converts_every_markdown_file() {
    let staging = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write(staging.path(), "Alpha_Manuscript.md", "# Alpha\n\nBody text.");
    write(staging.path(), "Beta_v4.2.md", "# Beta\n\n- one\n- two");
    write(staging.path(), "notes.txt", "ignored");

    let config = Config::compiled_default();
    let report = batch::run(
        staging.path(),
        output.path(),
        None,
        OutputFormat::Docx,
        &config,
    )
    .unwrap();

    let names: Vec<_> = report.files.iter().map(|f| f.output_name.as_str()).collect();
    assert_eq!(names, vec!["Alpha_KDP.docx", "Beta_KDP.docx"]);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failed(), 0);
    assert!(output.path().join("Alpha_KDP.docx").is_file());
    assert!(output.path().join("Beta_KDP.docx").is_file());
}

#[test]
fn filter_is_case_insensitive() {
    let staging = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write(staging.path(), "AIXORD_FOR_CLAUDE.md", "text");
    write(staging.path(), "AIXORD_FOR_GEMINI.md", "text");

    let found = batch::discover_manuscripts(staging.path(), Some("claude")).unwrap();
    assert_eq!(found, vec![staging.path().join("AIXORD_FOR_CLAUDE.md")]);

    let report = batch::run(
        staging.path(),
        output.path(),
        Some("nothing"),
        OutputFormat::Docx,
        &Config::compiled_default(),
    )
    .unwrap();
    assert!(report.files.is_empty());
}

#[test]
fn output_dir_is_created() {
    let staging = tempfile::tempdir().unwrap();
    let root = tempfile::tempdir().unwrap();
    let output = root.path().join("nested").join("out");
    write(staging.path(), "Book.md", "text");

    batch::run(
        staging.path(),
        &output,
        None,
        OutputFormat::Typst,
        &Config::compiled_default(),
    )
    .unwrap();

    let typst = fs::read_to_string(output.join("Book_KDP.typ")).unwrap();
    assert!(typst.ends_with("text\n\n"));
}

#[test]
fn one_failure_does_not_stop_the_batch() {
    let staging = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write(staging.path(), "Good.md", "fine");
    // Not valid UTF-8
    fs::write(staging.path().join("Bad.md"), [0xff, 0xfe, 0x00]).unwrap();

    let report = batch::run(
        staging.path(),
        output.path(),
        None,
        OutputFormat::Docx,
        &Config::compiled_default(),
    )
    .unwrap();

    assert_eq!(report.files.len(), 2);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);
    let bad = &report.files[0];
    assert_eq!(bad.output_name, "Bad_KDP.docx");
    assert!(bad.outcome.is_err());
    assert!(report.line(bad).starts_with("Bad_KDP.docx: ERROR - "));
}

#[test]
fn page_estimate_and_short_files() {
    let staging = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let mut config = Config::compiled_default();
    config.page.words_per_page = 10;
    config.page.minimum_pages = 3;
    write(staging.path(), "Long.md", &words(30));
    write(staging.path(), "Short.md", &words(10));

    let report = batch::run(
        staging.path(),
        output.path(),
        None,
        OutputFormat::Docx,
        &config,
    )
    .unwrap();

    let long = report.files[0].outcome.as_ref().unwrap();
    assert_eq!(long.words, 30);
    assert_eq!(long.pages, 3.0);
    assert_eq!(long.status(3), Status::Ok);

    let short = report.short();
    assert_eq!(short.len(), 1);
    assert_eq!(short[0].output_name, "Short_KDP.docx");
    assert_eq!(
        report.line(short[0]),
        "Short_KDP.docx: 10 words, ~1.0 pages - NEEDS 2+ PAGES"
    );
}

#[test]
fn missing_staging_dir_fails_the_batch() {
    let root = tempfile::tempdir().unwrap();
    let result = batch::run(
        &root.path().join("staging"),
        &root.path().join("output"),
        None,
        OutputFormat::Docx,
        &Config::compiled_default(),
    );
    assert!(matches!(result, Err(manuscript::Error::MissingStagingDir(_))));
}
