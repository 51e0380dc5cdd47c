//! Journal writer.

use crate::errors::JournalError;
use crate::frame::{FrameKind, JournalHeader, RecordFrame, FRAME_HEADER_SIZE, HEADER_SIZE};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::path::Path;

/// Options for journal writing.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Whether to fsync after each append (default: false).
    pub sync: bool,
    /// Whether to create the file if it doesn't exist (default: true).
    pub create: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sync: false,
            create: true,
        }
    }
}

/// Append-only writer.
///
/// Each append writes one frame with a single `write_all`. If that write
/// fails the file is cut back to its previous length, so a frame is either
/// fully present or absent.
pub struct JournalWriter {
    file: File,
    sync: bool,
    len: u64,
}

impl JournalWriter {
    /// Opens or creates a journal, positioned for appending.
    ///
    /// An empty file gets a fresh header; an existing one must carry a valid
    /// header.
    pub fn open<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self, JournalError> {
        let mut file = OpenOptions::new()
            .create(options.create)
            .write(true)
            .read(true)
            .open(path)?;

        let len = file.metadata()?.len();
        let len = if len == 0 {
            file.write_all(&JournalHeader::new().to_bytes())?;
            file.flush()?;
            if options.sync {
                file.sync_all()?;
            }
            HEADER_SIZE as u64
        } else if len < HEADER_SIZE as u64 {
            return Err(JournalError::FileNotEmpty);
        } else {
            let mut header_bytes = [0u8; HEADER_SIZE];
            file.seek(io::SeekFrom::Start(0))?;
            file.read_exact(&mut header_bytes)?;
            JournalHeader::from_bytes(&header_bytes)?;
            len
        };
        file.seek(io::SeekFrom::Start(len))?;

        Ok(Self {
            file,
            sync: options.sync,
            len,
        })
    }

    /// Current file length.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the journal holds no frames.
    pub fn is_empty(&self) -> bool {
        self.len == HEADER_SIZE as u64
    }

    /// Serializes `record` as JSON and appends it as one frame.
    pub fn append_record(&mut self, kind: FrameKind, record: &Value) -> Result<(), JournalError> {
        let bytes = serde_json::to_vec(record)?;
        self.append_raw(kind, &bytes)
    }

    /// Appends a raw frame.
    pub fn append_raw(&mut self, kind: FrameKind, payload: &[u8]) -> Result<(), JournalError> {
        let frame = RecordFrame::new(kind, payload.len())?;

        let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
        buf.extend_from_slice(&frame.to_bytes());
        buf.extend_from_slice(payload);

        if let Err(e) = self.write_frame(&buf) {
            // A failed rollback is dropped; the write error is reported.
            let _ = self.truncate_to(self.len);
            return Err(e);
        }
        self.len += buf.len() as u64;
        Ok(())
    }

    fn write_frame(&mut self, buf: &[u8]) -> Result<(), JournalError> {
        self.file.write_all(buf)?;
        self.file.flush()?;
        if self.sync {
            self.file.sync_data()?;
        }
        Ok(())
    }

    /// Cuts the file back to `offset`, dropping everything after it.
    ///
    /// Used to discard a torn trailing frame before appending again.
    pub fn truncate_to(&mut self, offset: u64) -> Result<(), JournalError> {
        if offset < HEADER_SIZE as u64 {
            return Err(JournalError::TruncateIntoHeader(offset));
        }
        self.file.set_len(offset)?;
        self.file.seek(io::SeekFrom::Start(offset))?;
        if self.sync {
            self.file.sync_all()?;
        }
        self.len = offset;
        Ok(())
    }

    /// Flushes and closes the writer.
    pub fn finish(mut self) -> Result<(), JournalError> {
        self.file.flush()?;
        if self.sync {
            self.file.sync_all()?;
        }
        Ok(())
    }
}

impl Drop for JournalWriter {
    fn drop(&mut self) {
        let _ = self.file.flush();
        if self.sync {
            let _ = self.file.sync_all();
        }
    }
}
