//! Message envelope codec (frame/unframe)
//!
//! ```text
//! [MAGIC (4)] [COMMAND (12)] [LENGTH (4)] [CHECKSUM (4)] [PAYLOAD (LENGTH)]
//! ```

use bytes::Bytes;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use super::MessageHeader;
use crate::format::{Cursor, primitive};
use crate::{CHECKSUM_OFFSET, CHECKSUM_SIZE, Error, HEADER_SIZE, LENGTH_OFFSET, MAGIC_SIZE, Result};

/// First four bytes of `SHA256(SHA256(payload))`
#[must_use]
pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let digest = Sha256::digest(Sha256::digest(payload));
    let mut checksum = [0u8; CHECKSUM_SIZE];
    checksum.copy_from_slice(&digest[..CHECKSUM_SIZE]);
    checksum
}

/// Length of the first complete message at the start of `bytes`.
///
/// Returns `None` until the header's length field and the whole payload it
/// announces are available. Pure function of its input; call it again once
/// more bytes have arrived.
#[must_use]
pub fn first_available_message_length(bytes: &[u8]) -> Option<usize> {
    let len_field: [u8; 4] = bytes.get(LENGTH_OFFSET..CHECKSUM_OFFSET)?.try_into().ok()?;
    let total = usize::try_from(u32::from_le_bytes(len_field))
        .ok()?
        .checked_add(HEADER_SIZE)?;
    (bytes.len() >= total).then_some(total)
}

/// Frame `payload` under `magic` and `command`.
///
/// # Format
///
/// ```text
/// [HEADER (24 bytes)] [PAYLOAD (variable)]
/// ```
pub fn encode_frame(magic: &[u8], command: &str, payload: &[u8]) -> Result<Vec<u8>> {
    let magic: [u8; MAGIC_SIZE] = magic
        .try_into()
        .map_err(|_| Error::BadMagicNumber { len: magic.len() })?;
    let command = primitive::command_bytes(command)?;
    let payload_len = u32::try_from(payload.len()).map_err(|_| Error::InvalidSize {
        expected: crate::SizeLimit::Maximum(u32::MAX as usize),
        got: payload.len(),
    })?;

    let header = MessageHeader::new(magic, command, payload_len, checksum(payload));

    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(payload);
    Ok(bytes)
}

/// A verified frame: header plus the payload it covers
#[derive(Debug, Clone)]
pub struct Frame {
    header: MessageHeader,
    payload: Bytes,
}

impl Frame {
    /// Envelope header
    #[must_use]
    pub const fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// Payload bytes, checksum already verified
    #[must_use]
    pub const fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Split into header and payload
    #[must_use]
    pub fn into_parts(self) -> (MessageHeader, Bytes) {
        (self.header, self.payload)
    }
}

/// Unframe exactly one message.
///
/// # Errors
///
/// Returns an error if:
/// - The buffer ends before the length field ([`Error::BufferOverrun`])
/// - The declared length plus 24 is not the buffer length
///   ([`Error::WrongMessageLength`])
/// - The payload checksum does not match the header ([`Error::BadChecksum`])
pub fn decode_frame(bytes: impl Into<Bytes>) -> Result<Frame> {
    let bytes = bytes.into();
    let mut cursor = Cursor::new(bytes.clone());

    let magic = cursor.take_array()?;
    let command = cursor.take_array()?;
    let declared = u32::from_le_bytes(cursor.take_array()?);
    let available = bytes.len().saturating_sub(HEADER_SIZE);

    if usize::try_from(declared).ok().and_then(|len| len.checked_add(HEADER_SIZE))
        != Some(bytes.len())
    {
        debug!(declared, framed = bytes.len(), "message length mismatch");
        return Err(Error::WrongMessageLength {
            provided: declared as usize,
            available,
        });
    }

    let payload = bytes.slice(HEADER_SIZE..);
    let computed = checksum(&payload);
    let required = cursor.take_array()?;
    if computed != required {
        debug!(?computed, ?required, "message checksum mismatch");
        return Err(Error::BadChecksum { computed, required });
    }

    let header = MessageHeader::new(magic, command, declared, required);
    trace!(
        magic = ?header.magic(),
        command = %header.command(),
        len = declared,
        "unframed message"
    );
    Ok(Frame { header, payload })
}
