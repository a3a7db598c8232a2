//! Error types for manuscript conversion.
//!
//! Parsing and rendering never fail; everything here comes from reading
//! inputs or writing artifacts.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Typst compilation failed: {0}")]
    Typst(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Failed to parse config file at {path}: {source}")]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Staging directory not found: {0}")]
    MissingStagingDir(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
