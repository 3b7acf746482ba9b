use std::env;
use std::path::PathBuf;

use crate::constants::archive::{
    DEFAULT_COMPRESSION_LEVEL, DEFAULT_EXTENSION, MAX_COMPRESSION_LEVEL, MIN_COMPRESSION_LEVEL,
};
use crate::constants::chunking::DEFAULT_CHUNK_SIZE;
use crate::constants::config::{
    DEFAULT_DEST_DIR, DEFAULT_SOURCE_DIR, ENV_CHUNK_SIZE, ENV_DEST_DIR, ENV_SOURCE_DIR,
};
use crate::errors::SplitterError;

/// Top-level splitter configuration.
#[derive(Clone, Debug)]
pub struct SplitterConfig {
    /// Directory scanned (non-recursively) for source archives.
    pub source_dir: PathBuf,
    /// Directory receiving chunk archives; created on first write.
    pub dest_dir: PathBuf,
    /// Maximum records per chunk.
    pub chunk_size: usize,
    /// Archive file extension (without the leading dot) for sources and outputs.
    pub extension: String,
    /// zstd level used when writing chunk archives.
    pub compression_level: i32,
    /// Exclude sources whose names already match the part naming pattern.
    ///
    /// Keeps a destination that overlaps the source directory from being re-split.
    pub skip_part_files: bool,
    /// Plan chunks and report them without writing anything.
    pub dry_run: bool,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            dest_dir: PathBuf::from(DEFAULT_DEST_DIR),
            chunk_size: DEFAULT_CHUNK_SIZE,
            extension: DEFAULT_EXTENSION.to_string(),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            skip_part_files: true,
            dry_run: false,
        }
    }
}

impl SplitterConfig {
    /// Config for explicit directories with all other settings at their defaults.
    pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            ..Self::default()
        }
    }

    /// Override the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Override the archive extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Enable or disable dry-run planning.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Build a config from environment overrides on top of the defaults.
    pub fn from_env() -> Result<Self, SplitterError> {
        Self::resolve(None, None, None)
    }

    /// Resolve directories and chunk size by explicit value, then environment, then default.
    pub fn resolve(
        source_dir: Option<PathBuf>,
        dest_dir: Option<PathBuf>,
        chunk_size: Option<usize>,
    ) -> Result<Self, SplitterError> {
        let defaults = Self::default();
        let source_dir = source_dir
            .or_else(|| env_path(ENV_SOURCE_DIR))
            .unwrap_or(defaults.source_dir);
        let dest_dir = dest_dir
            .or_else(|| env_path(ENV_DEST_DIR))
            .unwrap_or(defaults.dest_dir);
        let chunk_size = match chunk_size {
            Some(value) => value,
            None => match env_value(ENV_CHUNK_SIZE) {
                Some(raw) => parse_chunk_size(&raw).map_err(SplitterError::Configuration)?,
                None => defaults.chunk_size,
            },
        };
        Ok(Self {
            source_dir,
            dest_dir,
            chunk_size,
            ..defaults
        })
    }

    /// Validate settings that would otherwise fail mid-run.
    pub fn validate(&self) -> Result<(), SplitterError> {
        if self.chunk_size == 0 {
            return Err(SplitterError::Configuration(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        let extension = self.extension.trim_start_matches('.');
        if extension.is_empty() || extension.contains(['/', '\\']) {
            return Err(SplitterError::Configuration(format!(
                "invalid archive extension '{}'",
                self.extension
            )));
        }
        if !(MIN_COMPRESSION_LEVEL..=MAX_COMPRESSION_LEVEL).contains(&self.compression_level) {
            return Err(SplitterError::Configuration(format!(
                "compression level {} outside {}..={}",
                self.compression_level, MIN_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL
            )));
        }
        Ok(())
    }

    /// Extension without a leading dot.
    pub fn normalized_extension(&self) -> &str {
        self.extension.trim_start_matches('.')
    }
}

/// Parse a positive chunk size.
pub fn parse_chunk_size(raw: &str) -> Result<usize, String> {
    let parsed = raw.trim().parse::<usize>().map_err(|_| {
        format!(
            "Could not parse chunk size value '{}' as a positive integer",
            raw
        )
    })?;
    if parsed == 0 {
        return Err("chunk size must be greater than zero".to_string());
    }
    Ok(parsed)
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_value(key).map(PathBuf::from)
}
