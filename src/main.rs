use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use manuscript::Config;
use manuscript::batch::{self, OutputFormat};

const DEFAULT_CONFIG_PATH: &str = "manuscript.toml";

#[derive(Parser)]
#[command(name = "manuscript")]
#[command(about = "Convert manuscript markup to print-ready DOCX or PDF")]
struct Cli {
    /// Config file (defaults to ./manuscript.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a single manuscript
    Convert {
        /// Input manuscript file
        input: PathBuf,

        /// Output file (defaults to input name with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Convert every manuscript in the staging directory
    Batch {
        /// Only convert files whose name contains this text
        filter: Option<String>,

        /// Staging directory (overrides config)
        #[arg(long)]
        staging: Option<PathBuf>,

        /// Output directory (overrides config)
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every conversion succeeded.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Convert {
            input,
            output,
            format,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(format.extension()));
            let conversion = batch::convert_file(&input, &output, format, &config)
                .with_context(|| format!("converting {}", input.display()))?;

            println!("Created {}", output.display());
            println!(
                "{} words, ~{:.1} pages - {}",
                conversion.words,
                conversion.pages,
                conversion.status(config.page.minimum_pages)
            );
            Ok(true)
        }
        Command::Batch {
            filter,
            staging,
            output,
            format,
        } => {
            let staging = staging.unwrap_or_else(|| config.batch.staging_dir.clone());
            let output = output.unwrap_or_else(|| config.batch.output_dir.clone());

            let report = batch::run(&staging, &output, filter.as_deref(), format, &config)?;
            if report.files.is_empty() {
                match filter {
                    Some(filter) => println!("No files matching '{filter}' found"),
                    None => println!("No markdown files found in staging directory"),
                }
                return Ok(true);
            }

            println!("{}", "=".repeat(60));
            for file in &report.files {
                println!("  {}", report.line(file));
            }
            println!("{}", "=".repeat(60));
            println!(
                "\nConverted: {}/{} files",
                report.succeeded(),
                report.files.len()
            );
            println!("Output directory: {}", output.display());

            let short = report.short();
            if !short.is_empty() {
                println!(
                    "\nWARNING: {} file(s) under {} pages (KDP minimum)",
                    short.len(),
                    config.page.minimum_pages
                );
            }

            Ok(report.failed() == 0)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("config file not found: {}", path.display());
            }
            Ok(Config::load(path)?)
        }
        None => Ok(Config::load(Path::new(DEFAULT_CONFIG_PATH))?),
    }
}
