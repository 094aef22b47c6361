//! Message envelope header
//!
//! The header is 24 bytes and precedes every payload.

use crate::format::{Cursor, primitive};
use crate::{CHECKSUM_SIZE, COMMAND_SIZE, HEADER_SIZE, MAGIC_SIZE, Result};

/// Message envelope header (24 bytes)
///
/// # Wire Format
///
/// ```text
/// 0                   1                   2                   3
/// 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                        Magic Number (4)                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// +                   Command, NUL-padded (12)                    +
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                   Payload Length, LE (4)                      |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  Checksum: SHA256d[..4] (4)                   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    magic: [u8; MAGIC_SIZE],
    command: [u8; COMMAND_SIZE],
    payload_len: u32,
    checksum: [u8; CHECKSUM_SIZE],
}

impl MessageHeader {
    /// Create a new message header
    #[must_use]
    pub const fn new(
        magic: [u8; MAGIC_SIZE],
        command: [u8; COMMAND_SIZE],
        payload_len: u32,
        checksum: [u8; CHECKSUM_SIZE],
    ) -> Self {
        Self {
            magic,
            command,
            payload_len,
            checksum,
        }
    }

    /// Get magic number
    #[must_use]
    pub const fn magic(&self) -> [u8; MAGIC_SIZE] {
        self.magic
    }

    /// Get raw NUL-padded command bytes
    #[must_use]
    pub const fn command_bytes(&self) -> &[u8; COMMAND_SIZE] {
        &self.command
    }

    /// Get command name with trailing NULs stripped
    #[must_use]
    pub fn command(&self) -> String {
        primitive::command_text(&self.command)
    }

    /// Get payload length
    #[must_use]
    pub const fn payload_len(&self) -> u32 {
        self.payload_len
    }

    /// Get checksum
    #[must_use]
    pub const fn checksum(&self) -> [u8; CHECKSUM_SIZE] {
        self.checksum
    }

    /// Size of the whole framed message this header announces
    #[must_use]
    pub const fn frame_len(&self) -> usize {
        HEADER_SIZE + self.payload_len as usize
    }

    /// Convert to bytes
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];

        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..16].copy_from_slice(&self.command);
        bytes[16..20].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.checksum);

        bytes
    }

    /// Parse from bytes.
    ///
    /// Fails with [`crate::Error::BufferOverrun`] if fewer than 24 bytes are
    /// given. Content is not validated.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes.to_vec());
        let magic = cursor.take_array()?;
        let command = cursor.take_array()?;
        let payload_len = u32::from_le_bytes(cursor.take_array()?);
        let checksum = cursor.take_array()?;

        Ok(Self::new(magic, command, payload_len, checksum))
    }
}
