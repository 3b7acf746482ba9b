use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::chunking::{PartName, parse_part_file_name};
use crate::errors::SplitterError;
use crate::types::FileName;

/// A file found by a directory scan, with its size at scan time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScannedFile {
    /// Full path.
    pub path: PathBuf,
    /// Bare file name.
    pub name: FileName,
    /// Size in bytes (0 when metadata is unavailable).
    pub bytes: u64,
}

/// Filesystem transport that lists archives directly under one directory.
pub struct ArchiveDirectory {
    root: PathBuf,
    extension: String,
}

impl ArchiveDirectory {
    /// Scan `root` for files with `extension` (no leading dot).
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// Directory being scanned.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files (or symlinks to files) directly under the root with a matching extension,
    /// sorted by path.
    ///
    /// Subdirectories are never descended into. A missing root is reported as
    /// `SourceDirectoryMissing`.
    pub fn list_archives(&self) -> Result<Vec<ScannedFile>, SplitterError> {
        if !self.root.is_dir() {
            return Err(SplitterError::SourceDirectoryMissing {
                path: self.root.clone(),
            });
        }
        let mut files: Vec<ScannedFile> = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.into_path()),
                Err(err) => {
                    debug!(
                        root = %self.root.display(),
                        error = %err,
                        "[swath_split] skipping unreadable directory entry"
                    );
                    None
                }
            })
            // `is_file` follows symlinks.
            .filter(|path| path.is_file())
            .filter(|path| has_extension(path, &self.extension))
            .map(|path| ScannedFile {
                name: display_name(&path),
                bytes: file_size(&path),
                path,
            })
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// Source archives to split, optionally skipping files already named like parts.
    pub fn list_sources(&self, skip_part_files: bool) -> Result<Vec<ScannedFile>, SplitterError> {
        let mut files = self.list_archives()?;
        if skip_part_files {
            files.retain(|file| {
                let is_part = parse_part_file_name(&file.name, &self.extension).is_some();
                if is_part {
                    debug!(
                        file = %file.name,
                        "[swath_split] skipping previously split output"
                    );
                }
                !is_part
            });
        }
        Ok(files)
    }

    /// Part archives directly under the root, with parsed names.
    ///
    /// A missing root yields an empty list.
    pub fn list_parts(&self) -> Vec<(ScannedFile, PartName)> {
        if !self.root.is_dir() {
            return Vec::new();
        }
        self.list_archives()
            .unwrap_or_default()
            .into_iter()
            .filter_map(|file| {
                let part = parse_part_file_name(&file.name, &self.extension)?;
                Some((file, part))
            })
            .collect()
    }
}

/// True if the path has exactly `extension` (case-sensitive, no leading dot).
///
/// `orbit.swz` and `orbit.SWZ` share a stem, so only one of them may be a source.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == extension)
}

/// Bare file name of `path`, falling back to the full path when it has none.
pub fn display_name(path: &Path) -> FileName {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Best-effort file size in bytes.
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|meta| meta.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lists_matching_files_non_recursively_in_path_order() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        for name in ["charlie.swz", "alpha.swz", "bravo.SWZ", "notes.txt"] {
            fs::write(root.join(name), name.as_bytes()).unwrap();
        }
        let nested = root.join("new_data_all");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("delta.swz"), b"nested").unwrap();

        let files = ArchiveDirectory::new(root, "swz").list_archives().unwrap();
        let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.swz", "charlie.swz"]);
        assert_eq!(files[0].bytes, "alpha.swz".len() as u64);
    }

    #[test]
    fn missing_root_is_reported() {
        let temp = tempdir().unwrap();
        let missing = temp.path().join("absent");
        let err = ArchiveDirectory::new(&missing, "swz")
            .list_archives()
            .unwrap_err();
        assert!(matches!(
            err,
            SplitterError::SourceDirectoryMissing { ref path } if *path == missing
        ));
        assert!(ArchiveDirectory::new(&missing, "swz").list_parts().is_empty());
    }

    #[test]
    fn part_files_are_skipped_and_listed_separately() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        for name in ["orbit.swz", "orbit_part_1of2.swz", "orbit_part_2of2.swz"] {
            fs::write(root.join(name), b"x").unwrap();
        }
        let dir = ArchiveDirectory::new(root, "swz");

        let sources = dir.list_sources(true).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "orbit.swz");
        assert_eq!(dir.list_sources(false).unwrap().len(), 3);

        let parts = dir.list_parts();
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|(_, part)| part.stem == "orbit"));
        assert_eq!(parts[1].1.part_number, 2);
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        let temp = tempdir().unwrap();
        for name in ["orbit.swz", "orbit.SWZ", "orbit.Swz"] {
            fs::write(temp.path().join(name), b"x").unwrap();
        }
        let files = ArchiveDirectory::new(temp.path(), "swz").list_archives().unwrap();
        let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
        assert_eq!(names, vec!["orbit.swz"]);
        assert!(!has_extension(Path::new("orbit.SWZ"), "swz"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_archives_are_listed() {
        let temp = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let target = outside.path().join("linked.swz");
        fs::write(&target, b"linked").unwrap();
        std::os::unix::fs::symlink(&target, temp.path().join("linked.swz")).unwrap();
        fs::create_dir(temp.path().join("dir.swz")).unwrap();

        let files = ArchiveDirectory::new(temp.path(), "swz").list_archives().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "linked.swz");
        assert_eq!(files[0].bytes, "linked".len() as u64);
    }
}
