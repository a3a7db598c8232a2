use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

static DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub page: PageConfig,
    pub rule: RuleConfig,
    pub batch: BatchConfig,
}

/// Page geometry in inches, plus the length heuristics used for reporting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    /// Page numbers in the footer (PDF only).
    pub numbers: bool,
    pub words_per_page: u32,
    pub minimum_pages: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: 6.0,
            height: 9.0,
            margin: 0.75,
            numbers: false,
            words_per_page: 275,
            minimum_pages: 24,
        }
    }
}

/// Horizontal rules are drawn as a line of repeated glyphs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub glyph: String,
    pub width: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            glyph: "─".to_string(),
            width: 40,
        }
    }
}

impl RuleConfig {
    pub fn line(&self) -> String {
        self.glyph.repeat(self.width)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub staging_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Removed from manuscript file stems when naming outputs.
    pub strip_suffixes: Vec<String>,
    pub output_suffix: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            staging_dir: PathBuf::from("staging"),
            output_dir: PathBuf::from("output"),
            strip_suffixes: vec!["_Manuscript".to_string(), "_v4.2".to_string()],
            output_suffix: "_KDP".to_string(),
        }
    }
}

impl Config {
    /// Defaults shipped with the crate. `build.rs` checks the file is valid TOML.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Load config from a TOML file. A missing file yields the compiled defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                return Ok(Self::compiled_default());
            }
            Err(e) => return Err(e.into()),
        };

        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn compiled_default_matches_struct_defaults() {
        let config = Config::compiled_default();
        assert_eq!(config.page.width, 6.0);
        assert_eq!(config.page.height, 9.0);
        assert_eq!(config.page.margin, 0.75);
        assert_eq!(config.page.words_per_page, 275);
        assert_eq!(config.page.minimum_pages, 24);
        assert_eq!(config.rule.line(), "─".repeat(40));
        assert_eq!(config.batch.strip_suffixes, vec!["_Manuscript", "_v4.2"]);
        assert_eq!(config.batch.output_suffix, "_KDP");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str("[rule]\nglyph = \"*\"\n").unwrap();
        assert_eq!(config.rule.line(), "*".repeat(40));
        assert_eq!(config.page.words_per_page, 275);
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.page.minimum_pages, 24);
    }

    #[test]
    fn invalid_file_names_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[page\nwidth = ").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }
}
