use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::filters::ProjectFilter;
use crate::ingest::IngestOptions;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("delimiter must be a single ASCII character or \\t, got '{0}'")]
    Delimiter(String),
    #[error("failed to read condition file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid condition file {}: {source}", path.display())]
    Condition {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

/// Accepts `,`, `;`, `|`, a literal tab, or the two-character escape `\t`.
pub fn parse_delimiter(value: &str) -> Result<u8, ConfigError> {
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        _ if value.len() == 1 && value.is_ascii() => Ok(value.as_bytes()[0]),
        _ => Err(ConfigError::Delimiter(value.to_string())),
    }
}

pub fn ingest_options(delimiter: &str) -> Result<IngestOptions, ConfigError> {
    Ok(IngestOptions {
        delimiter: parse_delimiter(delimiter)?,
    })
}

/// Loads a comparison condition. Absent keys leave their dimension
/// unconstrained, so `{}` selects every record.
pub fn load_condition(path: &Path) -> Result<ProjectFilter, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_condition(&raw).map_err(|source| ConfigError::Condition {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_condition(raw: &str) -> Result<ProjectFilter, serde_json::Error> {
    serde_json::from_str(raw)
}
