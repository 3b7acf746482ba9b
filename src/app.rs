use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};

use crate::archive::{Field, read_archive};
use crate::config::{SplitterConfig, parse_chunk_size};
use crate::constants::archive::{
    CHUNK_INFO_FIELD, DEFAULT_COMPRESSION_LEVEL, DEFAULT_EXTENSION, LABEL_FIELD,
};
use crate::constants::report::SOURCE_NAME_HINT;
use crate::driver::{RunReport, Splitter};
use crate::errors::SplitterError;
use crate::metrics::bytes_to_mb;
use crate::transport::fs::display_name;

#[derive(Debug, Parser)]
#[command(
    name = "swath_split",
    version,
    disable_help_subcommand = true,
    about = "Split large swath archives into bounded-size chunk archives",
    long_about = "Split every swath archive in a source directory into chunk archives of at most --chunk-size records, each carrying the source label and provenance.",
    after_help = "Directories and chunk size are resolved in order by explicit arg, environment variables (SWATH_SPLIT_SOURCE_DIR, SWATH_SPLIT_DEST_DIR, SWATH_SPLIT_CHUNK_SIZE), then built-in defaults."
)]
struct SplitCli {
    #[arg(
        long = "source-dir",
        value_name = "DIR",
        help = "Directory scanned (non-recursively) for source archives"
    )]
    source_dir: Option<PathBuf>,
    #[arg(
        long = "dest-dir",
        value_name = "DIR",
        help = "Directory receiving chunk archives (created on first write)"
    )]
    dest_dir: Option<PathBuf>,
    #[arg(
        long = "chunk-size",
        value_parser = parse_chunk_size,
        help = "Maximum records per chunk"
    )]
    chunk_size: Option<usize>,
    #[arg(
        long,
        default_value = DEFAULT_EXTENSION,
        help = "Archive file extension for sources and outputs"
    )]
    extension: String,
    #[arg(
        long = "compression-level",
        default_value_t = DEFAULT_COMPRESSION_LEVEL,
        help = "zstd compression level for chunk archives (1-22)"
    )]
    compression_level: i32,
    #[arg(
        long = "include-part-files",
        help = "Also split sources whose names already look like chunk outputs"
    )]
    include_part_files: bool,
    #[arg(long = "dry-run", help = "Plan chunks without writing anything")]
    dry_run: bool,
    #[arg(long, help = "Print the run report as JSON instead of text")]
    json: bool,
}

#[derive(Debug, Parser)]
#[command(
    name = "swath_inspect",
    version,
    disable_help_subcommand = true,
    about = "Show fields, label, and provenance of swath archives"
)]
struct InspectCli {
    #[arg(value_name = "FILE", required = true, help = "Archive files to inspect")]
    files: Vec<PathBuf>,
}

/// Install the `tracing` subscriber used by the binaries (`RUST_LOG`, default `info`).
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Entry point for `swath_split`.
///
/// Returns normally after per-file failures and after a missing source directory;
/// only argument and configuration errors are returned.
pub fn run_split_archives<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) =
        parse_cli::<SplitCli, _>(std::iter::once("swath_split".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    let mut config = SplitterConfig::resolve(cli.source_dir, cli.dest_dir, cli.chunk_size)?;
    config.extension = cli.extension;
    config.compression_level = cli.compression_level;
    config.skip_part_files = !cli.include_part_files;
    config.dry_run = cli.dry_run;
    config.validate()?;

    if !cli.json {
        print_banner(&config);
    }

    let report = match Splitter::new(config).run() {
        Ok(report) => report,
        Err(SplitterError::SourceDirectoryMissing { path }) => {
            println!("ERROR: source directory {} does not exist!", path.display());
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Entry point for `swath_inspect`.
pub fn run_inspect_archive<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let Some(cli) =
        parse_cli::<InspectCli, _>(std::iter::once("swath_inspect".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    for path in &cli.files {
        println!("=== {} ===", display_name(path));
        let archive = match read_archive(path) {
            Ok(archive) => archive,
            Err(err) => {
                println!("  unreadable: {err}");
                continue;
            }
        };
        for (name, field) in archive.fields() {
            match field {
                Field::Text(value) => println!("  {name}: text {value:?}"),
                Field::Records(records) => println!("  {name}: {} record(s)", records.len()),
                Field::PackedRecords(packed) => {
                    println!("  {name}: {} packed record(s)", packed.len())
                }
                Field::ChunkInfo(_) => println!("  {name}: chunk info"),
            }
        }
        if let Ok(Some(label)) = archive.text(LABEL_FIELD) {
            println!("  label: {label}");
        }
        if let Ok(Some(info)) = archive.chunk_info(CHUNK_INFO_FIELD) {
            println!("  provenance: {}", serde_json::to_string(info)?);
            if !info.is_consistent() {
                println!("  WARNING: provenance bounds and part numbers disagree");
            }
        }
    }
    Ok(())
}

fn print_banner(config: &SplitterConfig) {
    println!("=== swath archive splitter ===");
    println!("source directory: {}", config.source_dir.display());
    println!("destination directory: {}", config.dest_dir.display());
    println!("chunk size: {} records", config.chunk_size);
    if config.dry_run {
        println!("mode: dry run (nothing is written)");
    }
    println!();
}

fn print_report(report: &RunReport) {
    if report.is_empty() {
        println!(
            "No .{} archives found in the source directory.",
            report.extension
        );
        println!("Expected files such as: {SOURCE_NAME_HINT}");
        return;
    }

    println!("Source archives to split: {}", report.sources.len());
    for source in &report.sources {
        println!("  - {} ({:.1} MB)", source.name, bytes_to_mb(source.bytes));
    }
    println!();

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(split) if report.dry_run => println!(
                "~ {}: {} records -> {} part(s) planned",
                outcome.file, split.records, split.total_parts
            ),
            Ok(split) => println!(
                "✓ {}: {} records -> {} part(s), {:.1} MB",
                outcome.file,
                split.records,
                split.total_parts,
                bytes_to_mb(split.bytes_written())
            ),
            Err(err) => println!("✗ {err}"),
        }
    }

    println!();
    println!("=== split complete ===");
    let failed = report.failed().count();
    if failed > 0 {
        println!("Files failed: {failed} of {}", report.outcomes.len());
    }
    if report.outputs.files > 0 {
        println!("Total parts in destination: {}", report.outputs.files);
        println!(
            "Total size of all parts: {:.1} MB",
            report.outputs.megabytes()
        );
    }
    for split in &report.incomplete {
        println!(
            "Incomplete split '{}': {} of {} part(s) present, missing {:?}",
            split.stem, split.present, split.total_parts, split.missing
        );
    }
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn help_and_version_exit_cleanly() {
        assert!(run_split_archives(args(&["--help"])).is_ok());
        assert!(run_split_archives(args(&["--version"])).is_ok());
        assert!(run_inspect_archive(args(&["--help"])).is_ok());
    }

    #[test]
    fn zero_chunk_size_is_an_argument_error() {
        assert!(run_split_archives(args(&["--chunk-size", "0"])).is_err());
    }

    #[test]
    fn missing_source_dir_returns_normally() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("absent");
        let dest = temp.path().join("out");
        let result = run_split_archives(args(&[
            "--source-dir",
            missing.to_str().unwrap(),
            "--dest-dir",
            dest.to_str().unwrap(),
        ]));
        assert!(result.is_ok());
        assert!(!dest.exists());
    }

    #[test]
    fn cli_parses_all_flags() {
        let cli = SplitCli::try_parse_from([
            "swath_split",
            "--source-dir",
            "/in",
            "--dest-dir",
            "/out",
            "--chunk-size",
            "250",
            "--extension",
            "arc",
            "--compression-level",
            "9",
            "--include-part-files",
            "--dry-run",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.source_dir, Some(PathBuf::from("/in")));
        assert_eq!(cli.dest_dir, Some(PathBuf::from("/out")));
        assert_eq!(cli.chunk_size, Some(250));
        assert_eq!(cli.extension, "arc");
        assert_eq!(cli.compression_level, 9);
        assert!(cli.include_part_files && cli.dry_run && cli.json);
    }
}
