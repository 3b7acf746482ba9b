use std::collections::BTreeMap;

use serde::Serialize;

use crate::chunking::PartName;
use crate::constants::report::BYTES_PER_MB;
use crate::transport::fs::ScannedFile;
use crate::types::FileStem;

/// Aggregate count and size of part archives found in a directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OutputTotals {
    /// Number of part files.
    pub files: usize,
    /// Sum of part file sizes in bytes.
    pub bytes: u64,
}

impl OutputTotals {
    /// Sum counts and sizes over scanned part files.
    pub fn from_parts(parts: &[(ScannedFile, PartName)]) -> Self {
        parts.iter().fold(Self::default(), |mut totals, (file, _)| {
            totals.files += 1;
            totals.bytes += file.bytes;
            totals
        })
    }

    /// Total size in megabytes.
    pub fn megabytes(&self) -> f64 {
        bytes_to_mb(self.bytes)
    }
}

/// Part numbers missing for one split source in the destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IncompleteSplit {
    /// Source stem shared by the part files.
    pub stem: FileStem,
    /// Part count encoded in the file names.
    pub total_parts: usize,
    /// Distinct part numbers found.
    pub present: usize,
    /// Part numbers with no file, ascending.
    pub missing: Vec<usize>,
}

/// Group parts by `(stem, total_parts)` and report groups with missing part numbers.
///
/// A partially failed split leaves such a group behind until it is re-run.
pub fn incomplete_splits(parts: &[(ScannedFile, PartName)]) -> Vec<IncompleteSplit> {
    let mut groups: BTreeMap<(&str, usize), Vec<usize>> = BTreeMap::new();
    for (_, part) in parts {
        groups
            .entry((part.stem.as_str(), part.total_parts))
            .or_default()
            .push(part.part_number);
    }
    groups
        .into_iter()
        .filter_map(|((stem, total_parts), mut seen)| {
            seen.sort_unstable();
            seen.dedup();
            let missing: Vec<usize> = (1..=total_parts)
                .filter(|number| seen.binary_search(number).is_err())
                .collect();
            if missing.is_empty() {
                return None;
            }
            Some(IncompleteSplit {
                stem: stem.to_string(),
                total_parts,
                present: seen.len(),
                missing,
            })
        })
        .collect()
}

/// Convert bytes to megabytes.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn part(stem: &str, number: usize, total: usize, bytes: u64) -> (ScannedFile, PartName) {
        let name = format!("{stem}_part_{number}of{total}.swz");
        (
            ScannedFile {
                path: PathBuf::from("/out").join(&name),
                name,
                bytes,
            },
            PartName {
                stem: stem.to_string(),
                part_number: number,
                total_parts: total,
            },
        )
    }

    #[test]
    fn totals_sum_files_and_bytes() {
        let parts = vec![part("a", 1, 2, 1024 * 1024), part("a", 2, 2, 1024 * 1024)];
        let totals = OutputTotals::from_parts(&parts);
        assert_eq!(totals.files, 2);
        assert_eq!(totals.bytes, 2 * 1024 * 1024);
        assert!((totals.megabytes() - 2.0).abs() < 1e-9);
        assert_eq!(OutputTotals::from_parts(&[]), OutputTotals::default());
    }

    #[test]
    fn incomplete_splits_report_missing_parts() {
        let parts = vec![
            part("a", 1, 3, 10),
            part("a", 3, 3, 10),
            part("b", 1, 1, 10),
            part("c", 2, 2, 10),
        ];
        let incomplete = incomplete_splits(&parts);
        assert_eq!(
            incomplete,
            vec![
                IncompleteSplit {
                    stem: "a".into(),
                    total_parts: 3,
                    present: 2,
                    missing: vec![2],
                },
                IncompleteSplit {
                    stem: "c".into(),
                    total_parts: 2,
                    present: 1,
                    missing: vec![1],
                },
            ]
        );
    }
}
