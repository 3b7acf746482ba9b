use serde::{Deserialize, Serialize};

use crate::archive::{Field, PackedRecords};
use crate::chunking::ChunkBounds;
use crate::errors::ArchiveError;
use crate::types::{FieldName, FileName, Label};

/// One opaque element of a measurement sequence.
///
/// The payload is carried byte-for-byte from source to chunk and is never parsed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, bitcode::Encode, bitcode::Decode)]
pub struct Record {
    payload: Vec<u8>,
}

impl Record {
    /// Wrap an opaque payload.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Borrow the opaque payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True when the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Consume the record and return its payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

/// Ordered, randomly indexable record sequence.
///
/// Order is chronological by convention and is preserved by every operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordSequence {
    records: Vec<Record>,
}

impl RecordSequence {
    /// Build a sequence from records already in list form.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Normalize an archive field into list form.
    ///
    /// List-form fields are used as-is; packed fields are materialized into one
    /// record per packed element. Other field kinds are rejected.
    pub fn from_field(name: &str, field: Field) -> Result<Self, ArchiveError> {
        match field {
            Field::Records(records) => Ok(Self::new(records)),
            Field::PackedRecords(packed) => Ok(Self::new(packed.unpack()?)),
            other => Err(ArchiveError::FieldKind {
                field: FieldName::from(name),
                expected: "a record sequence",
                found: other.kind(),
            }),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the sequence holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Contiguous records covered by `bounds` (`end` exclusive).
    ///
    /// Returns `None` when the bounds fall outside the sequence.
    pub fn slice(&self, bounds: ChunkBounds) -> Option<&[Record]> {
        self.records.get(bounds.start..bounds.end)
    }

    /// Iterate records in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Borrow all records.
    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// Consume the sequence and return its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Pack the sequence into the contiguous array-of-objects representation.
    pub fn to_packed(&self) -> PackedRecords {
        PackedRecords::pack(&self.records)
    }
}

impl From<Vec<Record>> for RecordSequence {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<Record> for RecordSequence {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSequence {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Everything the reader extracts from one source archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceContents {
    /// Normalized record sequence.
    pub records: RecordSequence,
    /// Label copied verbatim to every chunk.
    pub label: Label,
}

/// Provenance attached to each chunk at creation time.
#[derive(
    Clone, Debug, PartialEq, Eq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
pub struct Provenance {
    /// Source archive file name (with extension).
    pub original_file: FileName,
    /// 1-based part number.
    pub part_number: u64,
    /// Number of parts produced from the source archive.
    pub total_parts: u64,
    /// Records in this chunk (`end_index - start_index`).
    pub chunk_size: u64,
    /// First source index covered by this chunk.
    pub start_index: u64,
    /// Source index one past the last record covered by this chunk.
    pub end_index: u64,
}

impl Provenance {
    /// Chunk bounds described by this record.
    pub fn bounds(&self) -> ChunkBounds {
        ChunkBounds {
            start: self.start_index as usize,
            end: self.end_index as usize,
        }
    }

    /// True when the record satisfies the size and part-number invariants.
    pub fn is_consistent(&self) -> bool {
        self.end_index >= self.start_index
            && self.end_index - self.start_index == self.chunk_size
            && self.part_number >= 1
            && self.part_number <= self.total_parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(count: usize) -> Vec<Record> {
        (0..count)
            .map(|idx| Record::new(format!("swath-{idx}").into_bytes()))
            .collect()
    }

    #[test]
    fn packed_field_normalizes_into_list_form() {
        let original = RecordSequence::new(records(5));
        let packed = original.to_packed();
        let normalized =
            RecordSequence::from_field("swath_array", Field::PackedRecords(packed)).unwrap();
        assert_eq!(normalized, original);
    }

    #[test]
    fn text_field_is_not_a_record_sequence() {
        let err = RecordSequence::from_field("swath_array", Field::Text("x".into())).unwrap_err();
        match err {
            ArchiveError::FieldKind { field, found, .. } => {
                assert_eq!(field, "swath_array");
                assert_eq!(found, "text");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn slice_respects_exclusive_end() {
        let sequence = RecordSequence::new(records(4));
        let slice = sequence
            .slice(ChunkBounds { start: 1, end: 3 })
            .expect("in range");
        assert_eq!(slice, &sequence.as_slice()[1..3]);
        assert!(sequence.slice(ChunkBounds { start: 2, end: 5 }).is_none());
    }

    #[test]
    fn provenance_consistency_checks_bounds_and_parts() {
        let mut info = Provenance {
            original_file: "orbit.swz".into(),
            part_number: 2,
            total_parts: 3,
            chunk_size: 500,
            start_index: 500,
            end_index: 1000,
        };
        assert!(info.is_consistent());
        assert_eq!(info.bounds(), ChunkBounds { start: 500, end: 1000 });
        info.part_number = 4;
        assert!(!info.is_consistent());
        info.part_number = 3;
        info.chunk_size = 499;
        assert!(!info.is_consistent());
    }
}
