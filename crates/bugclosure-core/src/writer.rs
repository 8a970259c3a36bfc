//! Size-rotating text file writer.
//!
//! Owns the single active log file. Write, rotate, flush and close all go
//! through one mutex, so a lifecycle flush can run while the consumer is
//! mid-write without tearing a line.

use std::io::{BufWriter, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::SharedConfig;
use crate::error::{LogError, Result};
use crate::namer;
use crate::report::ErrorReporter;
use crate::storage::{FileId, StorageProvider, WriteStream};

struct ActiveFile {
    id: FileId,
    stream: BufWriter<WriteStream>,
}

/// Writer that appends lines to the current file and rotates by size.
pub struct RotatingWriter {
    storage: Arc<dyn StorageProvider>,
    config: SharedConfig,
    reporter: ErrorReporter,
    active: Mutex<Option<ActiveFile>>,
}

impl RotatingWriter {
    pub(crate) fn new(
        storage: Arc<dyn StorageProvider>,
        config: SharedConfig,
        reporter: ErrorReporter,
    ) -> Self {
        Self {
            storage,
            config,
            reporter,
            active: Mutex::new(None),
        }
    }

    /// Append `line` plus a newline, rotating first if needed.
    ///
    /// On an open failure nothing is written and the next call starts
    /// rotation from scratch.
    pub fn write(&self, line: &str) -> Result<()> {
        let mut active = self.active.lock();

        if self.needs_rotation((*active).as_ref()) {
            if let Some(mut previous) = active.take() {
                // Old stream is closed before the new file exists
                if let Err(e) = previous.stream.flush() {
                    self.reporter.report("flush before rotation", &e.into());
                }
            }
            *active = Some(self.open_next()?);
        }

        if let Some(file) = active.as_mut() {
            file.stream.write_all(line.as_bytes())?;
            file.stream.write_all(b"\n")?;
            file.stream.flush()?;
        }
        Ok(())
    }

    /// Push buffered bytes of the active file to storage. Never rotates.
    pub fn flush(&self) -> Result<()> {
        if let Some(file) = self.active.lock().as_mut() {
            file.stream.flush()?;
        }
        Ok(())
    }

    /// Flush and release the active file. Calling it again is a no-op.
    pub fn close(&self) -> Result<()> {
        let mut active = self.active.lock();
        let Some(mut file) = active.take() else {
            return Ok(());
        };
        let flushed = file.stream.flush();
        drop(file);
        flushed.map_err(LogError::from)
    }

    /// Identifier of the file currently written to.
    pub fn active_file(&self) -> Option<FileId> {
        self.active.lock().as_ref().map(|f| f.id.clone())
    }

    fn needs_rotation(&self, active: Option<&ActiveFile>) -> bool {
        let Some(file) = active else {
            return true;
        };
        let limit = self.config.load().max_file_bytes;
        match self.storage.byte_length(&file.id) {
            Ok(len) => len > limit,
            Err(e) => {
                // Fail open: an unknown size never forces a new file
                self.reporter.report("size probe", &e);
                false
            }
        }
    }

    fn open_next(&self) -> Result<ActiveFile> {
        let config = self.config.load();
        let directory = config.base_directory.as_str();

        let existing = self.storage.list_names(directory).unwrap_or_else(|e| {
            self.reporter.report("list log files", &e);
            Vec::new()
        });
        let name = namer::next_name_today(&config.base_file_name, &existing);

        let id = self.storage.create_file(directory, &name)?;
        let stream = self.storage.open_write(&id)?;
        tracing::debug!(file = %id, "opened log file");

        Ok(ActiveFile {
            id,
            stream: BufWriter::new(stream),
        })
    }
}

impl Drop for RotatingWriter {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
