//! Append-only framed journal for anchor event records.
//!
//! A journal is a 16-byte header followed by frames. Each frame is an 8-byte
//! header (kind, reserved, little-endian length) and a UTF-8 JSON payload.
//! Frames are written whole or not at all; a torn trailing frame left by a
//! crash is reported in [`ReadMode::Strict`] and treated as end-of-file in
//! [`ReadMode::Permissive`].
//!
//! ```rust
//! use anchorwatch_journal::{FrameKind, JournalReader, JournalWriter, ReadMode, WriteOptions};
//! use serde_json::json;
//!
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("records.awj");
//!
//! let mut writer = JournalWriter::open(&path, WriteOptions::default())?;
//! writer.append_record(FrameKind::Commit, &json!({"event": {"id": "e-1"}}))?;
//! writer.finish()?;
//!
//! let mut reader = JournalReader::open(&path, ReadMode::Strict)?;
//! while let Some((kind, record)) = reader.read_record()? {
//!     println!("{:?}: {}", kind, record);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![deny(missing_docs)]

/// Error types for journal operations.
pub mod errors;
/// Header and frame layout.
pub mod frame;
/// Journal reader.
pub mod reader;
/// Journal writer.
pub mod writer;

pub use errors::JournalError;
pub use frame::{FrameKind, JournalHeader, RecordFrame, MAX_PAYLOAD_SIZE};
pub use reader::{JournalReader, ReadMode};
pub use writer::{JournalWriter, WriteOptions};
