use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::archive::{Archive, Field, write_archive};
use crate::chunking::{ChunkPlan, part_file_name, source_stem};
use crate::config::SplitterConfig;
use crate::constants::archive::{CHUNK_INFO_FIELD, LABEL_FIELD, RECORDS_FIELD};
use crate::constants::report::BYTES_PER_MB;
use crate::data::{Provenance, Record, SourceContents};
use crate::errors::{ArchiveError, SplitterError};
use crate::types::FileName;

/// One planned or written chunk archive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PartOutcome {
    /// Output file name inside the destination directory.
    pub file_name: FileName,
    /// Provenance embedded in the chunk.
    pub provenance: Provenance,
    /// Bytes written, `None` for dry-run plans.
    pub bytes: Option<u64>,
}

/// Result of splitting one source archive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SplitOutcome {
    /// Source archive file name.
    pub file: FileName,
    /// Records found in the source.
    pub records: usize,
    /// Number of chunks (`ceil(records / chunk_size)`).
    pub total_parts: usize,
    /// Chunks in ascending part order.
    pub parts: Vec<PartOutcome>,
}

impl SplitOutcome {
    /// Total bytes written across all parts.
    pub fn bytes_written(&self) -> u64 {
        self.parts.iter().filter_map(|part| part.bytes).sum()
    }
}

/// Writes chunk archives for one source at a time into a destination directory.
#[derive(Clone, Debug)]
pub struct ChunkWriter {
    dest_dir: PathBuf,
    chunk_size: usize,
    extension: String,
    compression_level: i32,
}

impl ChunkWriter {
    /// Create a writer; `chunk_size` must be positive.
    pub fn new(dest_dir: impl Into<PathBuf>, chunk_size: usize) -> Result<Self, SplitterError> {
        let config = SplitterConfig {
            dest_dir: dest_dir.into(),
            chunk_size,
            ..SplitterConfig::default()
        };
        Self::from_config(&config)
    }

    /// Create a writer from validated splitter settings.
    pub fn from_config(config: &SplitterConfig) -> Result<Self, SplitterError> {
        config.validate()?;
        Ok(Self {
            dest_dir: config.dest_dir.clone(),
            chunk_size: config.chunk_size,
            extension: config.normalized_extension().to_string(),
            compression_level: config.compression_level,
        })
    }

    /// Destination directory.
    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    /// Records per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Compute the chunk layout for `source_file` without writing anything.
    pub fn plan(
        &self,
        source_file: &str,
        record_count: usize,
    ) -> Result<SplitOutcome, SplitterError> {
        let plan = ChunkPlan::new(record_count, self.chunk_size)?;
        let stem = source_stem(Path::new(source_file));
        let parts = (0..plan.total_parts())
            .filter_map(|index| plan.provenance(source_file, index))
            .map(|provenance| PartOutcome {
                file_name: self.part_name(&stem, &provenance),
                provenance,
                bytes: None,
            })
            .collect();
        Ok(SplitOutcome {
            file: source_file.to_string(),
            records: record_count,
            total_parts: plan.total_parts(),
            parts,
        })
    }

    /// Split `contents` into chunk archives named after `source_file`.
    ///
    /// Records are moved into their chunk in order. The destination directory is
    /// created before the first chunk is written. A failure stops this source and
    /// leaves already written chunks in place.
    pub fn write_chunks(
        &self,
        source_file: &str,
        contents: SourceContents,
    ) -> Result<SplitOutcome, SplitterError> {
        let SourceContents { records, label } = contents;
        let mut outcome = self.plan(source_file, records.len())?;
        let mut remaining = records.into_records().into_iter();

        for index in 0..outcome.parts.len() {
            let write_failure = |source: ArchiveError| SplitterError::WriteFailure {
                file: source_file.to_string(),
                parts_written: index,
                source,
            };
            if index == 0 {
                self.ensure_dest_dir().map_err(write_failure)?;
            }
            let part = &mut outcome.parts[index];
            let chunk: Vec<Record> = remaining
                .by_ref()
                .take(part.provenance.chunk_size as usize)
                .collect();
            let archive = Archive::new()
                .with_field(RECORDS_FIELD, Field::Records(chunk))
                .with_field(LABEL_FIELD, Field::Text(label.clone()))
                .with_field(CHUNK_INFO_FIELD, Field::ChunkInfo(part.provenance.clone()));
            let path = self.dest_dir.join(&part.file_name);
            let bytes =
                write_archive(&path, &archive, self.compression_level).map_err(write_failure)?;
            let size_mb = bytes as f64 / BYTES_PER_MB;
            debug!(
                file = %part.file_name,
                records = part.provenance.chunk_size,
                size_mb,
                "[swath_split] chunk written"
            );
            part.bytes = Some(bytes);
        }
        Ok(outcome)
    }

    fn part_name(&self, stem: &str, provenance: &Provenance) -> FileName {
        part_file_name(
            stem,
            provenance.part_number as usize,
            provenance.total_parts as usize,
            &self.extension,
        )
    }

    fn ensure_dest_dir(&self) -> Result<(), ArchiveError> {
        fs::create_dir_all(&self.dest_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::read_archive;
    use crate::data::RecordSequence;
    use tempfile::tempdir;

    fn contents(count: usize, label: &str) -> SourceContents {
        SourceContents {
            records: (0..count)
                .map(|idx| Record::new(format!("obs-{idx}").into_bytes()))
                .collect(),
            label: label.to_string(),
        }
    }

    #[test]
    fn writes_three_parts_for_1200_records() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("out");
        let writer = ChunkWriter::new(&dest, 500).unwrap();

        let outcome = writer
            .write_chunks("X.swz", contents(1200, "2020"))
            .unwrap();
        assert_eq!(outcome.total_parts, 3);
        let names: Vec<&str> = outcome
            .parts
            .iter()
            .map(|part| part.file_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["X_part_1of3.swz", "X_part_2of3.swz", "X_part_3of3.swz"]
        );

        let last = read_archive(&dest.join("X_part_3of3.swz")).unwrap();
        let info = last.chunk_info(CHUNK_INFO_FIELD).unwrap().unwrap();
        assert_eq!((info.start_index, info.end_index), (1000, 1200));
        assert_eq!(info.chunk_size, 200);
        assert_eq!(info.original_file, "X.swz");
        assert_eq!(last.text(LABEL_FIELD).unwrap(), Some("2020"));
        match last.get(RECORDS_FIELD) {
            Some(Field::Records(records)) => {
                assert_eq!(records.len(), 200);
                assert_eq!(records[0].payload(), b"obs-1000");
            }
            other => panic!("unexpected records field: {other:?}"),
        }
        assert!(outcome.bytes_written() > 0);
    }

    #[test]
    fn empty_sequence_writes_nothing_and_creates_no_dir() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("never_created");
        let writer = ChunkWriter::new(&dest, 500).unwrap();
        let outcome = writer
            .write_chunks("empty.swz", SourceContents {
                records: RecordSequence::default(),
                label: "x".into(),
            })
            .unwrap();
        assert_eq!(outcome.total_parts, 0);
        assert!(outcome.parts.is_empty());
        assert!(!dest.exists());
    }

    #[test]
    fn existing_destination_is_reused() {
        let temp = tempdir().unwrap();
        let writer = ChunkWriter::new(temp.path(), 2).unwrap();
        let first = writer.write_chunks("a.swz", contents(3, "l")).unwrap();
        let second = writer.write_chunks("a.swz", contents(3, "l")).unwrap();
        assert_eq!(first.parts, second.parts);
    }

    #[test]
    fn dry_run_plan_touches_nothing() {
        let temp = tempdir().unwrap();
        let dest = temp.path().join("plan_only");
        let writer = ChunkWriter::new(&dest, 500).unwrap();
        let outcome = writer.plan("X.swz", 500).unwrap();
        assert_eq!(outcome.total_parts, 1);
        assert_eq!(outcome.parts[0].file_name, "X_part_1of1.swz");
        assert_eq!(outcome.parts[0].bytes, None);
        assert!(!dest.exists());
    }

    #[test]
    fn destination_blocked_by_file_is_a_write_failure() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("blocked");
        fs::write(&blocker, b"file, not dir").unwrap();
        let writer = ChunkWriter::new(&blocker, 10).unwrap();
        match writer.write_chunks("orbit.swz", contents(25, "l")) {
            Err(SplitterError::WriteFailure {
                file,
                parts_written,
                ..
            }) => {
                assert_eq!(file, "orbit.swz");
                assert_eq!(parts_written, 0);
            }
            other => panic!("expected write failure, got {other:?}"),
        }
    }

    #[test]
    fn zero_chunk_size_is_rejected_up_front() {
        assert!(matches!(
            ChunkWriter::new("/tmp/unused", 0),
            Err(SplitterError::Configuration(_))
        ));
    }
}
