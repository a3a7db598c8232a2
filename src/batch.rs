//! Staging-directory conversion.
//!
//! Every `*.md` file in the staging directory is converted on its own; one
//! bad manuscript is reported and the rest of the batch carries on.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{BatchConfig, Config};
use crate::document::Document;
use crate::docx::DocxExporter;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Docx,
    Pdf,
    Typst,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Typst => "typ",
        }
    }
}

/// Length figures for one converted manuscript.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub words: usize,
    pub pages: f64,
}

impl Conversion {
    fn measure(doc: &Document, words_per_page: u32) -> Self {
        Self {
            words: doc.word_count(),
            pages: doc.page_estimate(words_per_page),
        }
    }

    pub fn status(&self, minimum_pages: u32) -> Status {
        let minimum = f64::from(minimum_pages);
        if self.pages >= minimum {
            Status::Ok
        } else {
            Status::Short {
                missing: minimum - self.pages,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    Ok,
    /// Under the minimum page count by `missing` pages.
    Short { missing: f64 },
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::Short { missing } => write!(f, "NEEDS {missing:.0}+ PAGES"),
        }
    }
}

/// Convert one manuscript file and write the result to `output`.
pub fn convert_file(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    config: &Config,
) -> Result<Conversion> {
    let markdown = fs::read_to_string(input)?;
    let doc = crate::markdown_to_document(&markdown, config);
    let title = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match format {
        OutputFormat::Docx => {
            let mut writer = BufWriter::new(File::create(output)?);
            DocxExporter::new(&config.page)
                .with_title(title)
                .export(&doc, &mut writer)?;
            writer.flush()?;
        }
        OutputFormat::Pdf => fs::write(output, crate::document_to_pdf(&doc, config)?)?,
        OutputFormat::Typst => fs::write(
            output,
            crate::typst::document_to_typst(&doc, &config.page),
        )?,
    }

    log::debug!("{} -> {}", input.display(), output.display());
    Ok(Conversion::measure(&doc, config.page.words_per_page))
}

/// Output file name for a manuscript stem: configured suffixes removed, the
/// output suffix and format extension appended.
pub fn output_name(stem: &str, format: OutputFormat, batch: &BatchConfig) -> String {
    let base = batch
        .strip_suffixes
        .iter()
        .filter(|suffix| !suffix.is_empty())
        .fold(stem.to_string(), |name, suffix| name.replace(suffix.as_str(), ""));
    format!("{base}{}.{}", batch.output_suffix, format.extension())
}

/// Markdown files in `staging`, sorted, optionally narrowed to stems that
/// contain `filter` (case-insensitive).
pub fn discover_manuscripts(staging: &Path, filter: Option<&str>) -> Result<Vec<PathBuf>> {
    if !staging.is_dir() {
        return Err(Error::MissingStagingDir(staging.to_path_buf()));
    }

    let needle = filter.map(str::to_lowercase);
    let mut files = Vec::new();
    for entry in fs::read_dir(staging)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if needle.as_ref().is_some_and(|n| !stem.contains(n.as_str())) {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Outcome for a single manuscript in a batch.
#[derive(Debug)]
pub struct FileReport {
    pub source: PathBuf,
    pub output_name: String,
    pub outcome: Result<Conversion>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub minimum_pages: u32,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }

    /// Converted files that come in under the minimum page count.
    pub fn short(&self) -> Vec<&FileReport> {
        self.files
            .iter()
            .filter(|f| {
                matches!(&f.outcome, Ok(c) if c.status(self.minimum_pages) != Status::Ok)
            })
            .collect()
    }

    /// One report line per file.
    pub fn line(&self, file: &FileReport) -> String {
        match &file.outcome {
            Ok(c) => format!(
                "{}: {} words, ~{:.1} pages - {}",
                file.output_name,
                group_thousands(c.words),
                c.pages,
                c.status(self.minimum_pages)
            ),
            Err(e) => format!("{}: ERROR - {e}", file.output_name),
        }
    }
}

/// Convert every matching manuscript in `staging` into `output_dir`.
pub fn run(
    staging: &Path,
    output_dir: &Path,
    filter: Option<&str>,
    format: OutputFormat,
    config: &Config,
) -> Result<BatchReport> {
    let sources = discover_manuscripts(staging, filter)?;
    fs::create_dir_all(output_dir)?;

    log::info!("Converting {} manuscript(s)", sources.len());

    let mut report = BatchReport {
        files: Vec::with_capacity(sources.len()),
        minimum_pages: config.page.minimum_pages,
    };

    for source in sources {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output_name = output_name(&stem, format, &config.batch);
        let outcome = convert_file(&source, &output_dir.join(&output_name), format, config);

        match &outcome {
            Ok(c) if c.status(config.page.minimum_pages) != Status::Ok => {
                log::warn!("{output_name} is under {} pages", config.page.minimum_pages);
            }
            Ok(_) => {}
            Err(e) => log::warn!("{} failed: {e}", source.display()),
        }

        report.files.push(FileReport {
            source,
            output_name,
            outcome,
        });
    }

    Ok(report)
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
