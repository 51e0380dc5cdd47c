use crate::errors::JournalError;

/// File magic.
pub const MAGIC: &[u8; 4] = b"AWJ1";

/// Format version written and accepted.
pub const VERSION: u16 = 1;

/// Bytes in the file header.
pub const HEADER_SIZE: usize = 16;

/// Bytes in each frame header.
pub const FRAME_HEADER_SIZE: usize = 8;

/// Largest accepted payload, 16 MiB.
pub const MAX_PAYLOAD_SIZE: u32 = 16 << 20;

const KIND_COMMIT: u8 = 0x01;
const KIND_SETTLEMENT: u8 = 0x02;
const KIND_ANCHOR_SNAPSHOT: u8 = 0x03;

/// The 16-byte file header.
///
/// Layout: magic (4), version (u16 LE), flags (u16 LE, zero), 8 zero bytes.
/// Nonzero flags or padding mean a format this build does not understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalHeader {
    /// Format version.
    pub version: u16,
}

fn header_error(reason: impl Into<String>) -> JournalError {
    JournalError::InvalidHeader(reason.into())
}

impl JournalHeader {
    /// Header for the format this build writes.
    pub fn new() -> Self {
        Self { version: VERSION }
    }

    /// Encodes the header.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..4].copy_from_slice(MAGIC);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes
    }

    /// Decodes a header, refusing foreign files and unknown versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, JournalError> {
        let Some(bytes) = bytes.get(..HEADER_SIZE) else {
            return Err(header_error(format!("{} bytes, need {}", bytes.len(), HEADER_SIZE)));
        };
        let (magic, rest) = bytes.split_at(MAGIC.len());
        if magic != MAGIC {
            return Err(header_error(format!("not an anchor journal (magic {:02x?})", magic)));
        }

        let version = u16::from_le_bytes([rest[0], rest[1]]);
        if version != VERSION {
            return Err(header_error(format!(
                "unsupported version {}, this build reads {}",
                version, VERSION
            )));
        }
        if rest[2..].iter().any(|&b| b != 0) {
            return Err(header_error("flags or padding set"));
        }

        Ok(Self { version })
    }
}

impl Default for JournalHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Record frame kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// An event record plus the anchor snapshot committed with it.
    Commit,
    /// Ledger settlement of a previously committed event.
    Settlement,
    /// Standalone anchor snapshot (revocation).
    AnchorSnapshot,
    /// Kind written by a newer format; skipped by readers.
    Unknown(u8),
}

impl FrameKind {
    /// Decodes a kind byte.
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            KIND_COMMIT => FrameKind::Commit,
            KIND_SETTLEMENT => FrameKind::Settlement,
            KIND_ANCHOR_SNAPSHOT => FrameKind::AnchorSnapshot,
            other => FrameKind::Unknown(other),
        }
    }

    /// Encodes the kind byte.
    pub fn to_byte(self) -> u8 {
        match self {
            FrameKind::Commit => KIND_COMMIT,
            FrameKind::Settlement => KIND_SETTLEMENT,
            FrameKind::AnchorSnapshot => KIND_ANCHOR_SNAPSHOT,
            FrameKind::Unknown(b) => b,
        }
    }
}

/// The 8-byte header in front of every record.
///
/// Layout: kind (1), 3 zero bytes, payload length (u32 LE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordFrame {
    /// What the payload holds.
    pub kind: FrameKind,
    /// Payload length in bytes.
    pub len: u32,
}

impl RecordFrame {
    /// Frame for a payload of `len` bytes; oversized payloads are refused.
    pub fn new(kind: FrameKind, len: usize) -> Result<Self, JournalError> {
        match u32::try_from(len) {
            Ok(len) if len <= MAX_PAYLOAD_SIZE => Ok(Self { kind, len }),
            _ => Err(JournalError::PayloadTooLarge {
                size: len as u64,
                max: MAX_PAYLOAD_SIZE,
            }),
        }
    }

    /// Encodes the frame header.
    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut bytes = [0u8; FRAME_HEADER_SIZE];
        bytes[0] = self.kind.to_byte();
        bytes[4..].copy_from_slice(&self.len.to_le_bytes());
        bytes
    }

    /// Decodes the frame header that starts at file position `offset`.
    pub fn from_bytes(bytes: &[u8], offset: u64) -> Result<Self, JournalError> {
        let invalid = |reason: String| JournalError::InvalidFrame { offset, reason };

        let Some(bytes) = bytes.get(..FRAME_HEADER_SIZE) else {
            return Err(invalid(format!("{} header bytes, need {}", bytes.len(), FRAME_HEADER_SIZE)));
        };
        if bytes[1..4] != [0u8; 3] {
            return Err(invalid("reserved bytes set".to_string()));
        }

        let len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if len > MAX_PAYLOAD_SIZE {
            return Err(invalid(format!("length {} over the {} byte limit", len, MAX_PAYLOAD_SIZE)));
        }

        Ok(Self {
            kind: FrameKind::from_byte(bytes[0]),
            len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_rejects_foreign_magic() {
        let mut bytes = JournalHeader::new().to_bytes();
        bytes[0..4].copy_from_slice(b"NRJ1");
        assert!(JournalHeader::from_bytes(&bytes).is_err());
    }

    #[test]
    fn header_rejects_other_versions_and_flags() {
        let mut bytes = JournalHeader::new().to_bytes();
        bytes[4] = 0x02;
        let err = JournalHeader::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("unsupported version 2"));

        let mut bytes = JournalHeader::new().to_bytes();
        bytes[6] = 0x01;
        assert!(JournalHeader::from_bytes(&bytes).is_err());
    }

    #[test]
    fn frame_reports_its_offset() {
        let mut bytes = RecordFrame::new(FrameKind::Commit, 100).unwrap().to_bytes();
        bytes[2] = 0x01;
        match RecordFrame::from_bytes(&bytes, 4096).unwrap_err() {
            JournalError::InvalidFrame { offset, .. } => assert_eq!(offset, 4096),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn frame_rejects_oversized_payload() {
        assert!(RecordFrame::new(FrameKind::Settlement, MAX_PAYLOAD_SIZE as usize + 1).is_err());
    }

    #[test]
    fn kinds_survive_byte_encoding() {
        for kind in [
            FrameKind::Commit,
            FrameKind::Settlement,
            FrameKind::AnchorSnapshot,
            FrameKind::Unknown(0x7f),
        ] {
            assert_eq!(FrameKind::from_byte(kind.to_byte()), kind);
        }
    }
}
