use std::path::PathBuf;

use thiserror::Error;

/// Errors shared by every gridvid crate.
///
/// The first three variants are the fatal taxonomy: none of them is retried,
/// the caller reports the cause and aborts the current operation.
#[derive(Error, Debug)]
pub enum GridError {
    /// The frame source could not open its input.
    #[error("cannot open source {path}: {reason}")]
    SourceOpen {
        /// Input that failed to open.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// Metadata file missing or unparseable.
    #[error("cannot load metadata {path}: {reason}")]
    ConfigLoad {
        /// Metadata file path.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// Archive blob missing or corrupt.
    #[error("cannot load archive {path}: {reason}")]
    ArchiveLoad {
        /// Archive file path.
        path: PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// A grid matrix does not match the sequence it is added to.
    #[error("grid shape mismatch: expected {expected_rows}×{expected_cols}, got {rows}×{cols}")]
    ShapeMismatch {
        /// Rows of the sequence.
        expected_rows: usize,
        /// Columns of the sequence.
        expected_cols: usize,
        /// Rows of the rejected matrix.
        rows: usize,
        /// Columns of the rejected matrix.
        cols: usize,
    },

    /// A grid matrix uses another cell mode than its sequence.
    #[error("grid mode mismatch: sequence is {expected}, matrix is {found}")]
    ModeMismatch {
        /// Mode of the sequence.
        expected: crate::reduce::GridMode,
        /// Mode of the rejected matrix.
        found: crate::reduce::GridMode,
    },

    /// A raw pixel buffer is shorter than its declared dimensions.
    #[error("pixel buffer too small: {len} bytes for {width}×{height}")]
    InvalidBuffer {
        /// Buffer length in bytes.
        len: usize,
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },

    /// Failure while writing an output file.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl GridError {
    /// Shorthand for [`GridError::ArchiveLoad`].
    pub fn archive(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArchiveLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for [`GridError::ConfigLoad`].
    pub fn config(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Shorthand for [`GridError::SourceOpen`].
    pub fn source_open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::SourceOpen {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_path_and_cause() {
        let e = GridError::archive("videoContent.gvz", "bad magic");
        let msg = e.to_string();
        assert!(msg.contains("videoContent.gvz"));
        assert!(msg.contains("bad magic"));
    }
}
