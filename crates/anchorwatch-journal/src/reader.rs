//! Journal reader.

use crate::errors::JournalError;
use crate::frame::{FrameKind, JournalHeader, RecordFrame, FRAME_HEADER_SIZE, HEADER_SIZE};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read mode for handling truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Truncated frames are errors.
    Strict,
    /// A truncated trailing frame is treated as end-of-file.
    Permissive,
}

/// Sequential reader over journal frames.
///
/// [`position`](Self::position) only advances past complete frames, so after a
/// permissive read hits a truncated tail it marks the end of the valid prefix.
pub struct JournalReader {
    file: BufReader<File>,
    mode: ReadMode,
    position: u64,
    len: u64,
}

impl JournalReader {
    /// Opens a journal and validates its header.
    pub fn open<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self, JournalError> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        let mut file = BufReader::new(file);

        let mut header_bytes = [0u8; HEADER_SIZE];
        file.read_exact(&mut header_bytes)?;
        JournalHeader::from_bytes(&header_bytes)?;

        Ok(Self {
            file,
            mode,
            position: HEADER_SIZE as u64,
            len,
        })
    }

    /// Offset just past the last complete frame read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads the next frame, returning `Ok(None)` at end-of-file.
    pub fn read_frame(&mut self) -> Result<Option<(FrameKind, Vec<u8>)>, JournalError> {
        if self.position >= self.len {
            return Ok(None);
        }
        // The stream sits at `position` here: frames are only ever read whole.
        let start = self.position;

        let mut header = [0u8; FRAME_HEADER_SIZE];
        if !self.fill(&mut header, start)? {
            return Ok(None);
        }
        let frame = RecordFrame::from_bytes(&header, start)?;

        let mut payload = vec![0u8; frame.len as usize];
        if !self.fill(&mut payload, start)? {
            return Ok(None);
        }

        self.position = start + FRAME_HEADER_SIZE as u64 + frame.len as u64;
        Ok(Some((frame.kind, payload)))
    }

    /// Reads the next known frame and parses its JSON payload.
    ///
    /// Frames of unknown kind are skipped.
    pub fn read_record(&mut self) -> Result<Option<(FrameKind, Value)>, JournalError> {
        loop {
            match self.read_frame()? {
                None => return Ok(None),
                Some((FrameKind::Unknown(_), _)) => continue,
                Some((kind, payload)) => {
                    let text = std::str::from_utf8(&payload)?;
                    let value: Value = serde_json::from_str(text)?;
                    return Ok(Some((kind, value)));
                }
            }
        }
    }

    fn fill(&mut self, buf: &mut [u8], frame_start: u64) -> Result<bool, JournalError> {
        match self.file.read_exact(buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => match self.mode {
                ReadMode::Permissive => Ok(false),
                ReadMode::Strict => Err(JournalError::TruncatedFrame {
                    offset: frame_start,
                }),
            },
            Err(e) => Err(e.into()),
        }
    }
}
