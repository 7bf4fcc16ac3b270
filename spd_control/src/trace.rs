//! Golden-trace loading.
//!
//! A golden trace is a flat text file of decimal floating-point values
//! separated by any whitespace, one expected controller output per
//! sample, in sample order.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors loading a golden trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Trace file does not exist.
    #[error("golden trace not found: {path}")]
    NotFound { path: PathBuf },

    /// Trace file could not be read.
    #[error("failed to read golden trace: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// A token is not a decimal float.
    #[error("malformed value {token:?} at index {index}")]
    Malformed { index: usize, token: String },

    /// The trace contains no values.
    #[error("golden trace is empty")]
    Empty,
}

/// Parse a whitespace-separated trace from a reader.
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<f32>, TraceError> {
    let mut values = Vec::new();
    for line in reader.lines() {
        for token in line?.split_whitespace() {
            let value = token.parse::<f32>().map_err(|_| TraceError::Malformed {
                index: values.len(),
                token: token.to_string(),
            })?;
            values.push(value);
        }
    }

    if values.is_empty() {
        return Err(TraceError::Empty);
    }
    Ok(values)
}

/// Load a golden trace from `path`.
///
/// # Errors
///
/// A missing or empty file is an error; comparison cannot proceed
/// without reference values.
pub fn load_trace(path: &Path) -> Result<Vec<f32>, TraceError> {
    let file = std::fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TraceError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            TraceError::Io { source: e }
        }
    })?;
    parse_trace(std::io::BufReader::new(file))
}
