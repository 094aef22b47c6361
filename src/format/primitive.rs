//! Primitive codecs: fixed bytes, command, integers, varint, varstring

use bytes::Bytes;

use super::{Cursor, Value};
use crate::{COMMAND_SIZE, Error, Result, SizeLimit};

/// Byte order of a multi-byte integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

/// Fixed-width integer codec configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntFormat {
    width: usize,
    signed: bool,
    endian: Endian,
}

const SUPPORTED_WIDTHS: &[usize] = &[1, 2, 4, 8];

impl IntFormat {
    /// Unsigned 8-bit
    pub const U8: Self = Self::fixed(1, false, Endian::Little);
    /// Unsigned 16-bit, little-endian
    pub const U16: Self = Self::fixed(2, false, Endian::Little);
    /// Unsigned 16-bit, big-endian (network ports)
    pub const U16_BE: Self = Self::fixed(2, false, Endian::Big);
    /// Signed 32-bit, little-endian
    pub const I32: Self = Self::fixed(4, true, Endian::Little);
    /// Unsigned 32-bit, little-endian
    pub const U32: Self = Self::fixed(4, false, Endian::Little);
    /// Signed 64-bit, little-endian
    pub const I64: Self = Self::fixed(8, true, Endian::Little);
    /// Unsigned 64-bit, little-endian
    pub const U64: Self = Self::fixed(8, false, Endian::Little);

    const fn fixed(width: usize, signed: bool, endian: Endian) -> Self {
        Self {
            width,
            signed,
            endian,
        }
    }

    /// Configure an integer codec of `width` bytes.
    ///
    /// Width must be 1, 2, 4 or 8. Endianness is ignored for single bytes.
    pub fn new(width: usize, signed: bool, endian: Endian) -> Result<Self> {
        if !SUPPORTED_WIDTHS.contains(&width) {
            return Err(Error::InvalidSize {
                expected: SizeLimit::OneOf(SUPPORTED_WIDTHS),
                got: width,
            });
        }
        let endian = if width == 1 { Endian::Little } else { endian };
        Ok(Self::fixed(width, signed, endian))
    }

    /// Width in bytes
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Whether values are two's complement
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        self.signed
    }

    /// Byte order
    #[must_use]
    pub const fn endian(&self) -> Endian {
        self.endian
    }

    /// Inclusive range of representable values
    #[must_use]
    pub const fn range(&self) -> (i128, i128) {
        let bits = (self.width * 8) as u32;
        if self.signed {
            (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
        } else {
            (0, (1i128 << bits) - 1)
        }
    }

    pub(crate) fn decode(&self, cursor: &mut Cursor) -> Result<i128> {
        let raw = cursor.take(self.width)?;
        let mut le = [0u8; 8];
        match self.endian {
            Endian::Little => le[..self.width].copy_from_slice(&raw),
            Endian::Big => {
                for (slot, byte) in le.iter_mut().zip(raw.iter().rev()) {
                    *slot = *byte;
                }
            }
        }

        let unsigned = u64::from_le_bytes(le);
        if self.signed {
            let shift = 64 - self.width * 8;
            Ok(i128::from(((unsigned << shift) as i64) >> shift))
        } else {
            Ok(i128::from(unsigned))
        }
    }

    pub(crate) fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        let (min, max) = self.range();
        let Some(number) = value.as_integer() else {
            return Err(Error::bad_value("integer", value));
        };
        if number < min || number > max {
            return Err(Error::bad_value(
                format!("integer in {min}..={max}"),
                number,
            ));
        }

        // Truncation keeps the two's complement bit pattern of in-range values.
        let le = (number as u64).to_le_bytes();
        match self.endian {
            Endian::Little => out.extend_from_slice(&le[..self.width]),
            Endian::Big => out.extend(le[..self.width].iter().rev()),
        }
        Ok(())
    }
}

/// Decode a fixed-length byte string
pub(crate) fn decode_bytes(cursor: &mut Cursor, len: usize) -> Result<Value> {
    Ok(Value::Bytes(cursor.take(len)?))
}

/// Encode a fixed-length byte string; text is taken as its UTF-8 bytes
pub(crate) fn encode_bytes(value: &Value, len: usize, out: &mut Vec<u8>) -> Result<()> {
    let bytes = match value {
        Value::Bytes(bytes) => bytes.as_ref(),
        Value::Text(text) => text.as_bytes(),
        other => {
            return Err(Error::PropertyTypeMismatch {
                expected: "bytes",
                got: other.type_name(),
            });
        }
    };
    if bytes.len() != len {
        return Err(Error::BadPropertyValue {
            expected: format!("{len} bytes"),
            got: format!("{} bytes", bytes.len()),
        });
    }
    out.extend_from_slice(bytes);
    Ok(())
}

/// Decode a 12-byte NUL-padded command name
pub(crate) fn decode_command(cursor: &mut Cursor) -> Result<String> {
    Ok(command_text(&cursor.take(COMMAND_SIZE)?))
}

/// Command text of raw NUL-padded bytes
pub(crate) fn command_text(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |last| last + 1);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Encode a command name, right-padded with NUL to 12 bytes
pub(crate) fn encode_command(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    let Value::Text(command) = value else {
        return Err(Error::PropertyTypeMismatch {
            expected: "text",
            got: value.type_name(),
        });
    };
    out.extend_from_slice(&command_bytes(command)?);
    Ok(())
}

pub(crate) fn command_bytes(command: &str) -> Result<[u8; COMMAND_SIZE]> {
    let raw = command.as_bytes();
    if raw.len() > COMMAND_SIZE {
        return Err(Error::InvalidSize {
            expected: SizeLimit::Maximum(COMMAND_SIZE),
            got: raw.len(),
        });
    }
    let mut padded = [0u8; COMMAND_SIZE];
    padded[..raw.len()].copy_from_slice(raw);
    Ok(padded)
}

/// Decode a variable-length integer
pub fn decode_varint(cursor: &mut Cursor) -> Result<u64> {
    let prefix = cursor.take_u8()?;
    let value = match prefix {
        0xfd => u64::from(u16::from_le_bytes(cursor.take_array()?)),
        0xfe => u64::from(u32::from_le_bytes(cursor.take_array()?)),
        0xff => u64::from_le_bytes(cursor.take_array()?),
        small => u64::from(small),
    };
    Ok(value)
}

/// Encode a variable-length integer in its shortest form
pub fn encode_varint(value: u64, out: &mut Vec<u8>) {
    if value < 0xfd {
        out.push(value as u8);
    } else if let Ok(value) = u16::try_from(value) {
        out.push(0xfd);
        out.extend_from_slice(&value.to_le_bytes());
    } else if let Ok(value) = u32::try_from(value) {
        out.push(0xfe);
        out.extend_from_slice(&value.to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

pub(crate) fn encode_varint_value(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    let number = value
        .as_integer()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| Error::bad_value("non-negative integer", value))?;
    encode_varint(number, out);
    Ok(())
}

/// Read a varint length and clamp it to `usize` for a bounded read
pub(crate) fn decode_length(cursor: &mut Cursor) -> Result<usize> {
    let len = decode_varint(cursor)?;
    Ok(usize::try_from(len).unwrap_or(usize::MAX))
}

/// Decode a varint-prefixed byte string
pub(crate) fn decode_varstring(cursor: &mut Cursor) -> Result<Bytes> {
    let len = decode_length(cursor)?;
    cursor.take(len)
}

/// Encode text or bytes with a varint length prefix
pub(crate) fn encode_varstring(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    let bytes = match value {
        Value::Bytes(bytes) => bytes.as_ref(),
        Value::Text(text) => text.as_bytes(),
        other => return Err(Error::bad_value("text or bytes", other.type_name())),
    };
    encode_varint(bytes.len() as u64, out);
    out.extend_from_slice(bytes);
    Ok(())
}
