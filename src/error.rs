//! Error type shared by the extractors, scan counters and the batch driver.
//!
//! A field that is simply not present in a file is **not** an error; that is
//! reported as [`crate::run::Field::NotFound`]. Everything here is fatal for the
//! batch, except where the run processor explicitly guards a call.
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: missing column (tried {tried:?})")]
    MissingColumn { path: PathBuf, tried: Vec<String> },
    #[error("{path}: malformed line {line:?}")]
    Malformed { path: PathBuf, line: String },
    #[error("{path}: no data rows")]
    NoData { path: PathBuf },
    #[error("{path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("walking {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("input folder {0} is not a directory")]
    NotADirectory(PathBuf),
}

impl ExtractError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }

    pub fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv { path: path.to_path_buf(), source }
    }

    pub fn missing_column(path: &Path, tried: &[&str]) -> Self {
        Self::MissingColumn {
            path: path.to_path_buf(),
            tried: tried.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn malformed(path: &Path, line: &str) -> Self {
        Self::Malformed { path: path.to_path_buf(), line: line.to_string() }
    }
}
