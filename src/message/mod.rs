//! Message definitions, values and dispatch
//!
//! A [`MessageDef`] is an immutable schema: a command tag plus an ordered
//! field list. A [`Message`] is a validated value of that schema.

pub mod catalog;
mod envelope;
mod header;
mod registry;

pub use envelope::{
    Frame, checksum, decode_frame, encode_frame, first_available_message_length,
};
pub use header::MessageHeader;
pub use registry::{Registry, message_from_binary};

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, instrument, trace};

use crate::format::{Compound, Cursor, Field, Fields, Format, Value, primitive};
use crate::{Error, MAGIC_SIZE, Result};

#[derive(Debug)]
struct Schema {
    command: String,
    payload: Compound,
}

/// Schema of one message kind.
///
/// Cheap to clone; clones share the same immutable schema.
#[derive(Debug, Clone)]
pub struct MessageDef {
    schema: Arc<Schema>,
}

impl MessageDef {
    /// Define a message kind from its command and ordered fields.
    ///
    /// Fails with [`Error::InvalidSize`] if the command is longer than 12
    /// bytes.
    pub fn new<N: Into<String>>(
        command: impl Into<String>,
        fields: impl IntoIterator<Item = (N, Format)>,
    ) -> Result<Self> {
        let command = command.into();
        primitive::command_bytes(&command)?;
        Ok(Self::from_parts(command, Compound::new(fields)))
    }

    /// Define a message whose command is known to fit.
    fn from_parts(command: String, payload: Compound) -> Self {
        debug_assert!(command.len() <= crate::COMMAND_SIZE);
        Self {
            schema: Arc::new(Schema { command, payload }),
        }
    }

    /// Command tag
    #[must_use]
    pub fn command(&self) -> &str {
        &self.schema.command
    }

    /// Payload fields in wire order
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        self.schema.payload.fields()
    }

    /// Build a message from field values.
    ///
    /// Every value is checked against its format up front, in declaration
    /// order; the first failure is returned.
    pub fn message(&self, values: Fields) -> Result<Message> {
        self.schema
            .payload
            .validate(&values)
            .map_err(|err| err.in_command(self.command()))?;

        Ok(Message {
            def: self.clone(),
            command: self.command().to_owned(),
            magic: None,
            values,
        })
    }

    /// Unframe and decode a full message (header and payload).
    ///
    /// The header's command is not checked against this definition: the
    /// payload is read with this schema and the message keeps the command
    /// found on the wire, which [`Message::encode`] writes back. Use
    /// [`Registry::decode`] to pick the definition by command.
    #[instrument(level = "trace", skip_all, fields(command = %self.command()))]
    pub fn decode(&self, bytes: impl Into<Bytes>) -> Result<Message> {
        let (header, payload) = envelope::decode_frame(bytes)?.into_parts();
        if header.command_bytes() != &primitive::command_bytes(self.command())? {
            debug!(framed = %header.command(), "decoding under a different command");
        }
        let values = self.decode_payload(payload)?;

        Ok(Message {
            def: self.clone(),
            command: header.command(),
            magic: Some(header.magic()),
            values,
        })
    }

    /// Decode payload bytes into field values
    pub fn decode_payload(&self, payload: impl Into<Bytes>) -> Result<Fields> {
        let mut cursor = Cursor::new(payload);
        let values = self.schema.payload.decode(&mut cursor)?;
        if !cursor.is_exhausted() {
            trace!(
                command = %self.command(),
                unread = cursor.remaining(),
                "ignoring trailing payload bytes"
            );
        }
        Ok(values)
    }
}

impl PartialEq for MessageDef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.schema, &other.schema)
            || (self.schema.command == other.schema.command
                && self.schema.payload == other.schema.payload)
    }
}

impl Eq for MessageDef {}

/// A validated message value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    def: MessageDef,
    command: String,
    magic: Option<[u8; MAGIC_SIZE]>,
    values: Fields,
}

impl Message {
    /// Command tag
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Magic number the message was framed with, if it was decoded
    #[must_use]
    pub const fn magic(&self) -> Option<[u8; MAGIC_SIZE]> {
        self.magic
    }

    /// Schema this message follows
    #[must_use]
    pub const fn definition(&self) -> &MessageDef {
        &self.def
    }

    /// All field values
    #[must_use]
    pub const fn values(&self) -> &Fields {
        &self.values
    }

    /// One field value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Take the field values
    #[must_use]
    pub fn into_values(self) -> Fields {
        self.values
    }

    /// Encode the payload alone
    pub fn payload(&self) -> Result<Vec<u8>> {
        let mut payload = Vec::new();
        self.def
            .schema
            .payload
            .encode_fields(&self.values, &mut payload)
            .map_err(|err| err.in_command(&self.command))?;
        Ok(payload)
    }

    /// Encode the full framed message under a 4-byte `magic` number
    #[instrument(level = "trace", skip_all, fields(command = %self.command))]
    pub fn encode(&self, magic: &[u8]) -> Result<Vec<u8>> {
        if magic.len() != MAGIC_SIZE {
            debug!(len = magic.len(), "rejecting magic number");
            return Err(Error::BadMagicNumber { len: magic.len() });
        }
        let payload = self.payload()?;
        envelope::encode_frame(magic, &self.command, &payload)
    }

    /// View as an alert, if this is an `alert` message
    #[must_use]
    pub fn as_alert(&self) -> Option<Alert<'_>> {
        (self.command == catalog::ALERT_COMMAND).then_some(Alert { message: self })
    }
}

/// An `alert` message.
///
/// Alert signatures and payload interpretation are not supported; the
/// corresponding methods always fail with [`Error::NotImplemented`].
#[derive(Debug, Clone, Copy)]
pub struct Alert<'a> {
    message: &'a Message,
}

impl Alert<'_> {
    /// Serialized alert payload
    #[must_use]
    pub fn payload(&self) -> Option<&[u8]> {
        self.message.get("payload").and_then(Value::as_bytes)
    }

    /// Signature over the payload
    #[must_use]
    pub fn signature(&self) -> Option<&[u8]> {
        self.message.get("signature").and_then(Value::as_bytes)
    }

    /// Verify the signature against `public_key`
    pub fn verify(&self, _public_key: &[u8]) -> Result<bool> {
        Err(Error::NotImplemented {
            object: "alert",
            method: "verify",
        })
    }

    /// Interpret the payload
    pub fn info(&self) -> Result<Fields> {
        Err(Error::NotImplemented {
            object: "alert",
            method: "info",
        })
    }
}
