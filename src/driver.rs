use std::path::PathBuf;

use serde_json::{Value, json};
use tracing::{info, warn};

use crate::config::SplitterConfig;
use crate::errors::SplitterError;
use crate::metrics::{IncompleteSplit, OutputTotals, incomplete_splits};
use crate::reader::read_source;
use crate::transport::fs::{ArchiveDirectory, ScannedFile};
use crate::types::FileName;
use crate::writer::{ChunkWriter, SplitOutcome};

/// Result of processing one source archive.
#[derive(Debug)]
pub struct FileOutcome {
    /// Source archive file name.
    pub file: FileName,
    /// Split (or dry-run plan) on success; the per-file failure otherwise.
    pub result: Result<SplitOutcome, SplitterError>,
}

/// Everything a splitter run observed.
#[derive(Debug)]
pub struct RunReport {
    /// Directory scanned for sources.
    pub source_dir: PathBuf,
    /// Directory receiving chunk archives.
    pub dest_dir: PathBuf,
    /// Extension used for sources and outputs, without the dot.
    pub extension: String,
    /// Maximum records per chunk.
    pub chunk_size: usize,
    /// True when nothing was written.
    pub dry_run: bool,
    /// Source archives in processing order.
    pub sources: Vec<ScannedFile>,
    /// Per-file results in processing order.
    pub outcomes: Vec<FileOutcome>,
    /// Part archives present in the destination after the run.
    pub outputs: OutputTotals,
    /// Part groups in the destination with missing part numbers.
    pub incomplete: Vec<IncompleteSplit>,
}

impl RunReport {
    fn empty(config: &SplitterConfig) -> Self {
        Self {
            source_dir: config.source_dir.clone(),
            dest_dir: config.dest_dir.clone(),
            extension: config.normalized_extension().to_string(),
            chunk_size: config.chunk_size,
            dry_run: config.dry_run,
            sources: Vec::new(),
            outcomes: Vec::new(),
            outputs: OutputTotals::default(),
            incomplete: Vec::new(),
        }
    }

    /// True when enumeration found no source archives.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Successful per-file outcomes.
    pub fn succeeded(&self) -> impl Iterator<Item = &SplitOutcome> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
    }

    /// Failed per-file outcomes.
    pub fn failed(&self) -> impl Iterator<Item = &SplitterError> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().err())
    }

    /// Parts written (or planned, for dry runs) during this run.
    pub fn parts_this_run(&self) -> usize {
        self.succeeded().map(|outcome| outcome.parts.len()).sum()
    }

    /// JSON rendering used by `--json`.
    pub fn to_json(&self) -> Value {
        let success_status = if self.dry_run { "planned" } else { "split" };
        let outcomes: Vec<Value> = self
            .outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(split) => json!({
                    "file": outcome.file,
                    "status": success_status,
                    "records": split.records,
                    "total_parts": split.total_parts,
                    "bytes_written": split.bytes_written(),
                    "parts": split.parts,
                }),
                Err(err) => {
                    let parts_written = match err {
                        SplitterError::WriteFailure { parts_written, .. } => *parts_written,
                        _ => 0,
                    };
                    json!({
                        "file": outcome.file,
                        "status": "failed",
                        "parts_written": parts_written,
                        "error": err.to_string(),
                    })
                }
            })
            .collect();
        json!({
            "source_dir": self.source_dir,
            "dest_dir": self.dest_dir,
            "extension": self.extension,
            "chunk_size": self.chunk_size,
            "dry_run": self.dry_run,
            "sources": self.sources,
            "outcomes": outcomes,
            "outputs": self.outputs,
            "incomplete": self.incomplete,
        })
    }
}

/// Sequential driver: enumerate sources, split each, then scan the destination.
pub struct Splitter {
    config: SplitterConfig,
}

impl Splitter {
    /// Create a driver for `config`.
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Run over every source archive.
    ///
    /// Only configuration errors and a missing source directory are returned as
    /// errors; per-file failures are recorded in the report and the run continues.
    pub fn run(&self) -> Result<RunReport, SplitterError> {
        self.config.validate()?;
        let extension = self.config.normalized_extension();
        let mut report = RunReport::empty(&self.config);

        report.sources = ArchiveDirectory::new(&self.config.source_dir, extension)
            .list_sources(self.config.skip_part_files)
            .inspect_err(|err| warn!("[swath_split] {err}"))?;
        if report.sources.is_empty() {
            info!(
                source_dir = %self.config.source_dir.display(),
                "[swath_split] no source archives found"
            );
            return Ok(report);
        }
        info!(
            sources = report.sources.len(),
            chunk_size = self.config.chunk_size,
            dry_run = self.config.dry_run,
            "[swath_split] starting split"
        );

        let writer = ChunkWriter::from_config(&self.config)?;
        for source in &report.sources {
            let result = self.split_one(&writer, source);
            match &result {
                Ok(outcome) => info!(
                    file = %source.name,
                    records = outcome.records,
                    parts = outcome.total_parts,
                    "[swath_split] source split"
                ),
                Err(err) => warn!(file = %source.name, "[swath_split] {err}"),
            }
            report.outcomes.push(FileOutcome {
                file: source.name.clone(),
                result,
            });
        }

        let parts = ArchiveDirectory::new(&self.config.dest_dir, extension).list_parts();
        report.outputs = OutputTotals::from_parts(&parts);
        report.incomplete = incomplete_splits(&parts);
        for split in &report.incomplete {
            warn!(
                stem = %split.stem,
                missing = ?split.missing,
                "[swath_split] destination holds an incomplete split"
            );
        }
        Ok(report)
    }

    fn split_one(
        &self,
        writer: &ChunkWriter,
        source: &ScannedFile,
    ) -> Result<SplitOutcome, SplitterError> {
        let contents = read_source(&source.path)?;
        if self.config.dry_run {
            return writer.plan(&source.name, contents.records.len());
        }
        writer.write_chunks(&source.name, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{Archive, Field, write_archive};
    use crate::constants::archive::{DEFAULT_COMPRESSION_LEVEL, LABEL_FIELD, RECORDS_FIELD};
    use crate::data::Record;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_source(dir: &Path, name: &str, count: usize) {
        let records = (0..count)
            .map(|idx| Record::new(idx.to_le_bytes().to_vec()))
            .collect();
        let archive = Archive::new()
            .with_field(RECORDS_FIELD, Field::Records(records))
            .with_field(LABEL_FIELD, Field::Text("2020".into()));
        write_archive(&dir.join(name), &archive, DEFAULT_COMPRESSION_LEVEL).unwrap();
    }

    #[test]
    fn missing_source_dir_is_fatal() {
        let temp = tempdir().unwrap();
        let config = SplitterConfig::new(temp.path().join("absent"), temp.path().join("out"));
        assert!(matches!(
            Splitter::new(config).run(),
            Err(SplitterError::SourceDirectoryMissing { .. })
        ));
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn empty_source_dir_reports_nothing() {
        let temp = tempdir().unwrap();
        let config = SplitterConfig::new(temp.path(), temp.path().join("out"));
        let report = Splitter::new(config).run().unwrap();
        assert!(report.is_empty());
        assert!(report.outcomes.is_empty());
        assert_eq!(report.outputs, OutputTotals::default());
    }

    #[test]
    fn dry_run_plans_without_writing() {
        let temp = tempdir().unwrap();
        write_source(temp.path(), "orbit.swz", 1200);
        let dest = temp.path().join("out");
        let config = SplitterConfig::new(temp.path(), &dest)
            .with_chunk_size(500)
            .with_dry_run(true);
        let report = Splitter::new(config).run().unwrap();
        assert_eq!(report.parts_this_run(), 3);
        assert_eq!(report.outputs.files, 0);
        assert!(!dest.exists());
        let json = report.to_json();
        assert_eq!(json["outcomes"][0]["status"], "planned");
        assert_eq!(json["outcomes"][0]["total_parts"], 3);
    }

    #[test]
    fn failures_are_recorded_and_run_continues() {
        let temp = tempdir().unwrap();
        write_source(temp.path(), "a_good.swz", 3);
        fs::write(temp.path().join("b_broken.swz"), b"junk").unwrap();
        write_source(temp.path(), "c_good.swz", 5);
        let config = SplitterConfig::new(temp.path(), temp.path().join("out")).with_chunk_size(2);

        let report = Splitter::new(config).run().unwrap();
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.succeeded().count(), 2);
        let failures: Vec<_> = report.failed().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].file(), Some("b_broken.swz"));
        assert_eq!(report.outputs.files, 2 + 3);
        assert!(report.incomplete.is_empty());
        assert_eq!(report.to_json()["outcomes"][1]["status"], "failed");
    }
}
