//! Wire codec error types

use std::fmt;

use thiserror::Error;

/// Size bound that a list, fixed-size field or integer width failed to meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeLimit {
    /// At least this many.
    Minimum(usize),
    /// At most this many.
    Maximum(usize),
    /// Exactly one of these values.
    OneOf(&'static [usize]),
}

impl fmt::Display for SizeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minimum(min) => write!(f, "at least {min}"),
            Self::Maximum(max) => write!(f, "at most {max}"),
            Self::OneOf(values) => write!(f, "one of {values:?}"),
        }
    }
}

/// Wire codec errors
///
/// Every variant carries the details needed to log or react to the failure.
/// Use [`Error::kind`] to match on the symbolic kind alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A read needed more bytes than remain in the buffer
    #[error("buffer overrun: need {required} bytes, {available} available")]
    BufferOverrun {
        /// Bytes left in the buffer
        available: usize,
        /// Bytes the read needed
        required: usize,
    },

    /// Declared payload length disagrees with the framed size
    #[error("wrong message length: header declares {provided} bytes, {available} framed")]
    WrongMessageLength {
        /// Length found in the header
        provided: usize,
        /// Payload bytes actually present after the header
        available: usize,
    },

    /// Payload checksum disagrees with the header
    #[error("bad checksum: computed {computed:02x?}, header carries {required:02x?}")]
    BadChecksum {
        /// Checksum of the payload as received
        computed: [u8; 4],
        /// Checksum found in the header
        required: [u8; 4],
    },

    /// Magic number is not exactly four bytes
    #[error("bad magic number: expected 4 bytes, got {len}")]
    BadMagicNumber {
        /// Length of the supplied magic number
        len: usize,
    },

    /// A required field has no value
    #[error("missing property `{property}`{}", command_suffix(.command.as_deref()))]
    MissingProperty {
        /// Message command, when raised while building a message
        command: Option<String>,
        /// Name of the missing field
        property: String,
    },

    /// A supplied field is not part of the schema
    #[error("extraneous property `{property}`{}", command_suffix(.command.as_deref()))]
    ExtraneousProperty {
        /// Message command, when raised while building a message
        command: Option<String>,
        /// Name of the unexpected field
        property: String,
    },

    /// Value has the wrong shape for the codec
    #[error("property type mismatch: expected {expected}, got {got}")]
    PropertyTypeMismatch {
        /// Shape the codec accepts
        expected: &'static str,
        /// Shape that was supplied
        got: &'static str,
    },

    /// Value has the right shape but fails validation
    #[error("bad property value: expected {expected}, got {got}")]
    BadPropertyValue {
        /// Description of what the codec accepts
        expected: String,
        /// Rendering of the rejected value
        got: String,
    },

    /// Length or count outside the configured bounds
    #[error("invalid size: expected {expected}, got {got}")]
    InvalidSize {
        /// Bound that was violated
        expected: SizeLimit,
        /// Offending length or count
        got: usize,
    },

    /// Intentionally unimplemented feature
    #[error("{object}::{method} is not implemented")]
    NotImplemented {
        /// Object the method belongs to
        object: &'static str,
        /// Method that was called
        method: &'static str,
    },
}

fn command_suffix(command: Option<&str>) -> String {
    command.map_or_else(String::new, |command| format!(" in `{command}` message"))
}

/// Symbolic error kind, without details
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// See [`Error::BufferOverrun`]
    BufferOverrun,
    /// See [`Error::WrongMessageLength`]
    WrongMessageLength,
    /// See [`Error::BadChecksum`]
    BadChecksum,
    /// See [`Error::BadMagicNumber`]
    BadMagicNumber,
    /// See [`Error::MissingProperty`]
    MissingProperty,
    /// See [`Error::ExtraneousProperty`]
    ExtraneousProperty,
    /// See [`Error::PropertyTypeMismatch`]
    PropertyTypeMismatch,
    /// See [`Error::BadPropertyValue`]
    BadPropertyValue,
    /// See [`Error::InvalidSize`]
    InvalidSize,
    /// See [`Error::NotImplemented`]
    NotImplemented,
}

impl Error {
    /// Symbolic kind of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BufferOverrun { .. } => ErrorKind::BufferOverrun,
            Self::WrongMessageLength { .. } => ErrorKind::WrongMessageLength,
            Self::BadChecksum { .. } => ErrorKind::BadChecksum,
            Self::BadMagicNumber { .. } => ErrorKind::BadMagicNumber,
            Self::MissingProperty { .. } => ErrorKind::MissingProperty,
            Self::ExtraneousProperty { .. } => ErrorKind::ExtraneousProperty,
            Self::PropertyTypeMismatch { .. } => ErrorKind::PropertyTypeMismatch,
            Self::BadPropertyValue { .. } => ErrorKind::BadPropertyValue,
            Self::InvalidSize { .. } => ErrorKind::InvalidSize,
            Self::NotImplemented { .. } => ErrorKind::NotImplemented,
        }
    }

    pub(crate) fn bad_value(expected: impl Into<String>, got: impl fmt::Debug) -> Self {
        Self::BadPropertyValue {
            expected: expected.into(),
            got: format!("{got:?}"),
        }
    }

    /// Attach the message command to a property error raised by a compound.
    pub(crate) fn in_command(self, command: &str) -> Self {
        match self {
            Self::MissingProperty {
                command: None,
                property,
            } => Self::MissingProperty {
                command: Some(command.to_owned()),
                property,
            },
            Self::ExtraneousProperty {
                command: None,
                property,
            } => Self::ExtraneousProperty {
                command: Some(command.to_owned()),
                property,
            },
            other => other,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BufferOverrun => "BufferOverrun",
            Self::WrongMessageLength => "WrongMessageLength",
            Self::BadChecksum => "BadChecksum",
            Self::BadMagicNumber => "BadMagicNumber",
            Self::MissingProperty => "MissingProperty",
            Self::ExtraneousProperty => "ExtraneousProperty",
            Self::PropertyTypeMismatch => "PropertyTypeMismatch",
            Self::BadPropertyValue => "BadPropertyValue",
            Self::InvalidSize => "InvalidSize",
            Self::NotImplemented => "NotImplemented",
        };
        write!(f, "{name}")
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
