#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Archive container format (named fields, zstd-compressed bitcode).
pub mod archive;
/// Binary entry points shared by `swath_split` and `swath_inspect`.
pub mod app;
/// Chunk boundary planning and part file naming.
pub mod chunking;
/// Splitter configuration types.
pub mod config;
/// Centralized constants used across the archive format, naming, and configuration.
pub mod constants;
/// Record, record-sequence, and provenance types.
pub mod data;
/// Sequential run driver and run report.
pub mod driver;
/// Aggregate output metrics.
pub mod metrics;
/// Source archive reader.
pub mod reader;
/// Input/output transports (filesystem today).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Chunk archive writer.
pub mod writer;

mod errors;

pub use archive::{Archive, Field, PackedRecords, read_archive, write_archive};
pub use chunking::{ChunkBounds, ChunkPlan, PartName, parse_part_file_name, part_file_name};
pub use config::SplitterConfig;
pub use data::{Provenance, Record, RecordSequence, SourceContents};
pub use driver::{FileOutcome, RunReport, Splitter};
pub use errors::{ArchiveError, SplitterError};
pub use metrics::{IncompleteSplit, OutputTotals};
pub use reader::read_source;
pub use types::{FieldName, FileName, FileStem, Label};
pub use writer::{ChunkWriter, PartOutcome, SplitOutcome};
