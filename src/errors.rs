use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{FieldName, FileName};

/// Error type for archive encoding, decoding, and container I/O.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("not a swath archive (bad magic bytes)")]
    BadMagic,
    #[error("unsupported archive format version {found} (expected {expected})")]
    UnsupportedVersion { expected: u8, found: u8 },
    #[error("archive payload could not be decompressed: {0}")]
    Decompress(io::Error),
    #[error("archive payload could not be decoded: {0}")]
    Decode(String),
    #[error("archive is missing required field '{0}'")]
    MissingField(FieldName),
    #[error("archive field '{field}' holds {found}, expected {expected}")]
    FieldKind {
        field: FieldName,
        expected: &'static str,
        found: &'static str,
    },
    #[error("packed records are corrupt: {0}")]
    CorruptPacked(String),
}

/// Error type for splitter configuration, per-file, and run-level failures.
#[derive(Debug, Error)]
pub enum SplitterError {
    #[error("source directory '{}' does not exist", path.display())]
    SourceDirectoryMissing { path: PathBuf },
    #[error("failed to read '{file}': {source}")]
    ReadFailure {
        file: FileName,
        #[source]
        source: ArchiveError,
    },
    #[error("failed to split '{file}' after {parts_written} part(s): {source}")]
    WriteFailure {
        file: FileName,
        parts_written: usize,
        #[source]
        source: ArchiveError,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SplitterError {
    /// File name associated with a per-file failure, if any.
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::ReadFailure { file, .. } | Self::WriteFailure { file, .. } => Some(file),
            _ => None,
        }
    }
}
