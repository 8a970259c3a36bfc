//! Storage capability used by the rotating writer.
//!
//! The pipeline never touches a filesystem directly. Everything goes
//! through a [`StorageProvider`], which can list names under a logical
//! directory, create a named file, and hand out byte streams for it:
//! - [`FsStorage`]: files under a root directory on disk
//! - [`MemoryStorage`]: in-process store with failure injection

use std::fmt;
use std::io::{Read, Write};

use crate::error::Result;

mod fs;
mod memory;

pub use fs::FsStorage;
pub use memory::MemoryStorage;

/// Opaque identifier of a file created by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Byte sink returned by [`StorageProvider::open_write`].
pub type WriteStream = Box<dyn Write + Send>;

/// Byte source returned by [`StorageProvider::open_read`].
pub type ReadStream = Box<dyn Read + Send>;

/// Object store the log files live in.
pub trait StorageProvider: Send + Sync + 'static {
    /// Names of every file under `directory`. A missing directory is empty.
    fn list_names(&self, directory: &str) -> Result<Vec<String>>;

    /// Create `name` under `directory`. Fails if it already exists.
    fn create_file(&self, directory: &str, name: &str) -> Result<FileId>;

    /// Open an appending write stream.
    fn open_write(&self, file: &FileId) -> Result<WriteStream>;

    /// Open a read stream over everything flushed so far.
    fn open_read(&self, file: &FileId) -> Result<ReadStream>;

    /// Number of bytes flushed to `file`.
    fn byte_length(&self, file: &FileId) -> Result<u64>;

    /// Read a whole file as UTF-8 (lossy).
    fn read_to_string(&self, file: &FileId) -> Result<String> {
        let mut bytes = Vec::new();
        self.open_read(file)?.read_to_end(&mut bytes)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
