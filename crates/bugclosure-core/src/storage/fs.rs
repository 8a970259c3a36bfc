//! Filesystem-backed storage provider.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use super::{FileId, ReadStream, StorageProvider, WriteStream};
use crate::error::{LogError, Result};

/// Stores each logical directory as a subdirectory of `root`.
///
/// ```text
/// root/
/// └── BugClosure/
///     ├── BugClosure_20261014.txt
///     └── BugClosure_20261014(1).txt
/// ```
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// On-disk path of a file this provider created.
    pub fn path_of(&self, file: &FileId) -> PathBuf {
        PathBuf::from(file.as_str())
    }

    fn dir_path(&self, directory: &str) -> PathBuf {
        self.root.join(directory)
    }
}

impl StorageProvider for FsStorage {
    fn list_names(&self, directory: &str) -> Result<Vec<String>> {
        let dir = self.dir_path(directory);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn create_file(&self, directory: &str, name: &str) -> Result<FileId> {
        let dir = self.dir_path(directory);
        fs::create_dir_all(&dir)?;

        let path = dir.join(name);
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| LogError::OpenFile {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(FileId::new(path.to_string_lossy()))
    }

    fn open_write(&self, file: &FileId) -> Result<WriteStream> {
        let handle = OpenOptions::new().append(true).open(self.path_of(file))?;
        Ok(Box::new(handle))
    }

    fn open_read(&self, file: &FileId) -> Result<ReadStream> {
        Ok(Box::new(File::open(self.path_of(file))?))
    }

    fn byte_length(&self, file: &FileId) -> Result<u64> {
        Ok(fs::metadata(self.path_of(file))?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_missing_directory_lists_empty() {
        let temp = TempDir::new().unwrap();
        let storage = FsStorage::new(temp.path());
        assert!(storage.list_names("nope").unwrap().is_empty());
    }

    #[test]
    fn test_create_write_read() {
        let temp = TempDir::new().unwrap();
        let storage = FsStorage::new(temp.path());

        let id = storage.create_file("logs", "a.txt").unwrap();
        assert!(temp.path().join("logs").join("a.txt").exists());

        let mut w = storage.open_write(&id).unwrap();
        w.write_all(b"line one\n").unwrap();
        w.flush().unwrap();

        assert_eq!(storage.byte_length(&id).unwrap(), 9);
        assert_eq!(storage.read_to_string(&id).unwrap(), "line one\n");
        assert_eq!(storage.list_names("logs").unwrap(), vec!["a.txt"]);
    }

    #[test]
    fn test_create_existing_fails() {
        let temp = TempDir::new().unwrap();
        let storage = FsStorage::new(temp.path());

        storage.create_file("logs", "a.txt").unwrap();
        let err = storage.create_file("logs", "a.txt").unwrap_err();
        assert!(matches!(err, LogError::OpenFile { .. }));
    }

    #[test]
    fn test_subdirectories_not_listed() {
        let temp = TempDir::new().unwrap();
        let storage = FsStorage::new(temp.path());
        fs::create_dir_all(temp.path().join("logs").join("nested")).unwrap();
        storage.create_file("logs", "b.txt").unwrap();

        assert_eq!(storage.list_names("logs").unwrap(), vec!["b.txt"]);
    }
}
