use std::fs;
use std::path::Path;

use crate::constants::archive::{FORMAT_VERSION, HEADER_LEN, MAGIC};
use crate::data::{Provenance, Record};
use crate::errors::ArchiveError;
use crate::types::FieldName;

/// Array-of-objects record representation: one contiguous buffer plus end offsets.
///
/// This form cannot be sliced into further sequences directly and is normalized
/// into list form on read.
#[derive(Clone, Debug, Default, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub struct PackedRecords {
    /// Exclusive end offset of each element within `data`.
    pub offsets: Vec<u64>,
    /// Concatenated element payloads.
    pub data: Vec<u8>,
}

impl PackedRecords {
    /// Pack records into a single buffer, preserving order.
    pub fn pack(records: &[Record]) -> Self {
        let mut offsets = Vec::with_capacity(records.len());
        let mut data = Vec::with_capacity(records.iter().map(Record::len).sum());
        for record in records {
            data.extend_from_slice(record.payload());
            offsets.push(data.len() as u64);
        }
        Self { offsets, data }
    }

    /// Number of packed elements.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// True when no elements are packed.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Materialize one record per packed element.
    pub fn unpack(self) -> Result<Vec<Record>, ArchiveError> {
        let total = self.data.len();
        let mut records = Vec::with_capacity(self.offsets.len());
        let mut start = 0usize;
        for (idx, &end) in self.offsets.iter().enumerate() {
            let end = usize::try_from(end).map_err(|_| {
                ArchiveError::CorruptPacked(format!("offset {idx} does not fit in memory"))
            })?;
            if end < start || end > total {
                return Err(ArchiveError::CorruptPacked(format!(
                    "offset {idx} ({end}) outside {start}..={total}"
                )));
            }
            records.push(Record::new(&self.data[start..end]));
            start = end;
        }
        if start != total {
            return Err(ArchiveError::CorruptPacked(format!(
                "{} trailing byte(s) after last element",
                total - start
            )));
        }
        Ok(records)
    }
}

/// Value stored under one archive field name.
#[derive(Clone, Debug, PartialEq, Eq, bitcode::Encode, bitcode::Decode)]
pub enum Field {
    /// Scalar text value.
    Text(String),
    /// Record sequence in list form.
    Records(Vec<Record>),
    /// Record sequence in packed form.
    PackedRecords(PackedRecords),
    /// Chunk provenance.
    ChunkInfo(Provenance),
}

impl Field {
    /// Human-readable kind used in error messages and inspection output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Records(_) => "records",
            Self::PackedRecords(_) => "packed records",
            Self::ChunkInfo(_) => "chunk info",
        }
    }
}

/// Self-describing container of named fields.
///
/// Field order is preserved; inserting an existing name replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Archive {
    fields: Vec<(FieldName, Field)>,
}

impl Archive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`Archive::insert`].
    pub fn with_field(mut self, name: impl Into<FieldName>, field: Field) -> Self {
        self.insert(name, field);
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, name: impl Into<FieldName>, field: Field) {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = field,
            None => self.fields.push((name, field)),
        }
    }

    /// Borrow a field by name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, field)| field)
    }

    /// Remove a field by name and return its value.
    pub fn take(&mut self, name: &str) -> Option<Field> {
        let pos = self.fields.iter().position(|(existing, _)| existing == name)?;
        Some(self.fields.remove(pos).1)
    }

    /// Remove a required field, failing when it is absent.
    pub fn take_required(&mut self, name: &str) -> Result<Field, ArchiveError> {
        self.take(name)
            .ok_or_else(|| ArchiveError::MissingField(name.to_string()))
    }

    /// Text value of `name`, `None` when absent, error when not text.
    pub fn text(&self, name: &str) -> Result<Option<&str>, ArchiveError> {
        match self.get(name) {
            None => Ok(None),
            Some(Field::Text(value)) => Ok(Some(value)),
            Some(other) => Err(kind_error(name, "text", other)),
        }
    }

    /// Provenance value of `name`, `None` when absent, error when not chunk info.
    pub fn chunk_info(&self, name: &str) -> Result<Option<&Provenance>, ArchiveError> {
        match self.get(name) {
            None => Ok(None),
            Some(Field::ChunkInfo(info)) => Ok(Some(info)),
            Some(other) => Err(kind_error(name, "chunk info", other)),
        }
    }

    /// Field names in stored order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate `(name, field)` pairs in stored order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the archive holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Encode to the on-disk byte layout (header followed by a zstd frame).
    pub fn encode(&self, level: i32) -> Result<Vec<u8>, ArchiveError> {
        let body = bitcode::encode(&self.fields);
        let compressed = zstd::encode_all(body.as_slice(), level)?;
        let mut out = Vec::with_capacity(HEADER_LEN + compressed.len());
        out.extend_from_slice(MAGIC);
        out.push(FORMAT_VERSION);
        out.extend_from_slice(&compressed);
        Ok(out)
    }

    /// Decode from the on-disk byte layout.
    pub fn decode(bytes: &[u8]) -> Result<Self, ArchiveError> {
        if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
            return Err(ArchiveError::BadMagic);
        }
        let version = bytes[MAGIC.len()];
        if version != FORMAT_VERSION {
            return Err(ArchiveError::UnsupportedVersion {
                expected: FORMAT_VERSION,
                found: version,
            });
        }
        let raw = zstd::decode_all(&bytes[HEADER_LEN..]).map_err(ArchiveError::Decompress)?;
        let fields: Vec<(FieldName, Field)> =
            bitcode::decode(&raw).map_err(|err| ArchiveError::Decode(err.to_string()))?;
        Ok(Self { fields })
    }
}

fn kind_error(name: &str, expected: &'static str, found: &Field) -> ArchiveError {
    ArchiveError::FieldKind {
        field: name.to_string(),
        expected,
        found: found.kind(),
    }
}

/// Read and decode an archive file.
pub fn read_archive(path: &Path) -> Result<Archive, ArchiveError> {
    let bytes = fs::read(path)?;
    Archive::decode(&bytes)
}

/// Encode and write an archive file, replacing any existing file.
///
/// Returns the number of bytes written.
pub fn write_archive(path: &Path, archive: &Archive, level: i32) -> Result<u64, ArchiveError> {
    let bytes = archive.encode(level)?;
    fs::write(path, &bytes)?;
    Ok(bytes.len() as u64)
}
