use std::path::Path;

use tracing::debug;

use crate::archive::{Archive, read_archive};
use crate::constants::archive::{LABEL_FIELD, RECORDS_FIELD};
use crate::constants::chunking::DEFAULT_LABEL;
use crate::data::{RecordSequence, SourceContents};
use crate::errors::{ArchiveError, SplitterError};
use crate::transport::fs::display_name;

/// Read a source archive into a normalized record sequence and its label.
///
/// Fails as a whole: either both values are extracted or a `ReadFailure` is returned.
pub fn read_source(path: &Path) -> Result<SourceContents, SplitterError> {
    let file = display_name(path);
    let contents = read_archive(path)
        .and_then(extract_contents)
        .map_err(|source| SplitterError::ReadFailure {
            file: file.clone(),
            source,
        })?;
    debug!(
        file = %file,
        records = contents.records.len(),
        label = %contents.label,
        "[swath_split] source archive loaded"
    );
    Ok(contents)
}

/// Pull the record sequence and label out of a decoded archive.
pub fn extract_contents(mut archive: Archive) -> Result<SourceContents, ArchiveError> {
    let label = archive
        .text(LABEL_FIELD)?
        .unwrap_or(DEFAULT_LABEL)
        .to_string();
    let field = archive.take_required(RECORDS_FIELD)?;
    let records = RecordSequence::from_field(RECORDS_FIELD, field)?;
    Ok(SourceContents { records, label })
}
