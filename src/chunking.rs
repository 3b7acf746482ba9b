use std::path::Path;

use crate::constants::chunking::{PART_MARKER, PART_OF};
use crate::data::Provenance;
use crate::errors::SplitterError;
use crate::types::{FileName, FileStem};

/// Half-open `[start, end)` index range of one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkBounds {
    /// First index covered.
    pub start: usize,
    /// One past the last index covered.
    pub end: usize,
}

impl ChunkBounds {
    /// Number of records covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the range covers nothing.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Chunk boundaries for a sequence of `total_len` records split every `chunk_size`.
///
/// Chunks cover `[0, total_len)` exactly once, ascend, and only the last may be short.
/// An empty sequence yields zero chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkPlan {
    total_len: usize,
    chunk_size: usize,
}

impl ChunkPlan {
    /// Build a plan; `chunk_size` must be positive.
    pub fn new(total_len: usize, chunk_size: usize) -> Result<Self, SplitterError> {
        if chunk_size == 0 {
            return Err(SplitterError::Configuration(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            total_len,
            chunk_size,
        })
    }

    /// Number of chunks, `ceil(total_len / chunk_size)`.
    pub fn total_parts(&self) -> usize {
        self.total_len.div_ceil(self.chunk_size)
    }

    /// Sequence length the plan covers.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Nominal records per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// True when the plan produces no chunks.
    pub fn is_empty(&self) -> bool {
        self.total_len == 0
    }

    /// Bounds of chunk `index`, or `None` past the last chunk.
    pub fn bounds(&self, index: usize) -> Option<ChunkBounds> {
        if index >= self.total_parts() {
            return None;
        }
        let start = index * self.chunk_size;
        let end = start.saturating_add(self.chunk_size).min(self.total_len);
        Some(ChunkBounds { start, end })
    }

    /// Iterate bounds in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ChunkBounds> + '_ {
        (0..self.total_parts()).filter_map(|index| self.bounds(index))
    }

    /// Provenance for chunk `index` of `original_file`.
    pub fn provenance(&self, original_file: &str, index: usize) -> Option<Provenance> {
        let bounds = self.bounds(index)?;
        Some(Provenance {
            original_file: original_file.to_string(),
            part_number: index as u64 + 1,
            total_parts: self.total_parts() as u64,
            chunk_size: bounds.len() as u64,
            start_index: bounds.start as u64,
            end_index: bounds.end as u64,
        })
    }
}

/// Parsed components of an output part file name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartName {
    /// Stem of the source archive.
    pub stem: FileStem,
    /// 1-based part number.
    pub part_number: usize,
    /// Total parts for the source archive.
    pub total_parts: usize,
}

/// Output file name for one part: `{stem}_part_{part}of{total}.{extension}`.
///
/// Numbers are not zero-padded, so lexical order matches part order only below ten parts.
pub fn part_file_name(
    stem: &str,
    part_number: usize,
    total_parts: usize,
    extension: &str,
) -> FileName {
    format!("{stem}{PART_MARKER}{part_number}{PART_OF}{total_parts}.{extension}")
}

/// Parse a file name produced by [`part_file_name`].
///
/// Returns `None` unless the name has exactly the expected extension and
/// `1 <= part <= total`.
pub fn parse_part_file_name(name: &str, extension: &str) -> Option<PartName> {
    let path = Path::new(name);
    let ext = path.extension()?.to_str()?;
    if ext != extension {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (source_stem, counter) = stem.rsplit_once(PART_MARKER)?;
    let (part, total) = counter.split_once(PART_OF)?;
    if source_stem.is_empty() || !is_ascii_number(part) || !is_ascii_number(total) {
        return None;
    }
    let part_number = part.parse::<usize>().ok()?;
    let total_parts = total.parse::<usize>().ok()?;
    if part_number == 0 || part_number > total_parts {
        return None;
    }
    Some(PartName {
        stem: source_stem.to_string(),
        part_number,
        total_parts,
    })
}

fn is_ascii_number(raw: &str) -> bool {
    !raw.is_empty() && raw.bytes().all(|byte| byte.is_ascii_digit())
}

/// File stem used when naming parts for `path`.
pub fn source_stem(path: &Path) -> FileStem {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
