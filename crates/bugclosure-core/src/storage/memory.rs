//! In-memory storage provider.
//!
//! Bytes written to a stream stay private to that stream until it is
//! flushed, the same visibility a buffered file gives, so flush ordering
//! is observable through [`StorageProvider::open_read`].

use std::collections::BTreeMap;
use std::io::{self, Cursor, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{FileId, ReadStream, StorageProvider, WriteStream};
use crate::error::{LogError, Result};

type Contents = Arc<Mutex<Vec<u8>>>;

/// Map of `directory -> name -> contents`, cheap to clone and share.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<BTreeMap<String, BTreeMap<String, Contents>>>>,
    faults: Arc<Faults>,
}

#[derive(Default)]
struct Faults {
    create: AtomicBool,
    open_write: AtomicBool,
    probe: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create_file` fail until cleared.
    pub fn fail_create(&self, fail: bool) {
        self.faults.create.store(fail, Ordering::SeqCst);
    }

    /// Make `open_write` fail until cleared.
    pub fn fail_open_write(&self, fail: bool) {
        self.faults.open_write.store(fail, Ordering::SeqCst);
    }

    /// Make `byte_length` fail until cleared.
    pub fn fail_probe(&self, fail: bool) {
        self.faults.probe.store(fail, Ordering::SeqCst);
    }

    /// Ids of every file under `directory`, in name order.
    pub fn files(&self, directory: &str) -> Vec<FileId> {
        self.files
            .lock()
            .get(directory)
            .map(|dir| dir.keys().map(|name| file_id(directory, name)).collect())
            .unwrap_or_default()
    }

    fn contents(&self, file: &FileId) -> Result<Contents> {
        let (directory, name) = split_id(file)?;
        self.files
            .lock()
            .get(directory)
            .and_then(|dir| dir.get(name))
            .cloned()
            .ok_or_else(|| LogError::Storage(format!("no such file: {file}")))
    }
}

impl StorageProvider for MemoryStorage {
    fn list_names(&self, directory: &str) -> Result<Vec<String>> {
        Ok(self
            .files
            .lock()
            .get(directory)
            .map(|dir| dir.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn create_file(&self, directory: &str, name: &str) -> Result<FileId> {
        if self.faults.create.load(Ordering::SeqCst) {
            return Err(LogError::OpenFile {
                name: name.to_string(),
                reason: "injected create failure".into(),
            });
        }

        let mut files = self.files.lock();
        let dir = files.entry(directory.to_string()).or_default();
        if dir.contains_key(name) {
            return Err(LogError::OpenFile {
                name: name.to_string(),
                reason: "already exists".into(),
            });
        }
        dir.insert(name.to_string(), Arc::default());
        Ok(file_id(directory, name))
    }

    fn open_write(&self, file: &FileId) -> Result<WriteStream> {
        if self.faults.open_write.load(Ordering::SeqCst) {
            return Err(LogError::OpenFile {
                name: file.to_string(),
                reason: "injected open failure".into(),
            });
        }
        Ok(Box::new(MemorySink {
            target: self.contents(file)?,
            pending: Vec::new(),
        }))
    }

    fn open_read(&self, file: &FileId) -> Result<ReadStream> {
        let snapshot = self.contents(file)?.lock().clone();
        Ok(Box::new(Cursor::new(snapshot)))
    }

    fn byte_length(&self, file: &FileId) -> Result<u64> {
        if self.faults.probe.load(Ordering::SeqCst) {
            return Err(LogError::SizeProbe {
                file: file.to_string(),
                reason: "injected probe failure".into(),
            });
        }
        Ok(self.contents(file)?.lock().len() as u64)
    }
}

struct MemorySink {
    target: Contents,
    pending: Vec<u8>,
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            self.target.lock().append(&mut self.pending);
        }
        Ok(())
    }
}

impl Drop for MemorySink {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

fn file_id(directory: &str, name: &str) -> FileId {
    FileId::new(format!("{directory}/{name}"))
}

fn split_id(file: &FileId) -> Result<(&str, &str)> {
    file.as_str()
        .rsplit_once('/')
        .ok_or_else(|| LogError::Storage(format!("malformed file id: {file}")))
}
