//! p2pwire - Declarative codec for the Bitcoin-style peer-to-peer wire protocol
//!
//! Typed, named fields are described once as [`Format`] descriptors and turned
//! into an exact byte layout and back. Payloads are framed into messages
//! carrying a magic number, a command name, a length and a double SHA-256
//! checksum.
//!
//! # Quick Start
//!
//! ```rust
//! use p2pwire::{catalog, fields, message_from_binary, Network, Value};
//!
//! // Build a message; every field is validated eagerly
//! let ping = catalog::PING.message(fields! { "nonce" => [7u8; 8] })?;
//!
//! // Frame it for the wire
//! let bytes = ping.encode(&Network::Mainnet.magic())?;
//!
//! // Dispatch raw bytes back to a typed message by command
//! let decoded = message_from_binary(bytes)?.expect("ping is a standard command");
//! assert_eq!(decoded.command(), "ping");
//! assert_eq!(decoded.get("nonce"), Some(&Value::from([7u8; 8])));
//! # Ok::<(), p2pwire::Error>(())
//! ```
//!
//! # Features
//!
//! - **Composable formats** - integers of any width and byte order, varints,
//!   bounded lists and ordered compounds nest freely
//! - **AuxPoW headers** - merge-mined block headers are detected from the
//!   version flag before any field is consumed
//! - **Strict framing** - length and checksum are verified before the
//!   payload is interpreted
//! - **Immutable schemas** - message definitions are built once and shared
//!   freely across threads

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]

mod error;
pub mod format;
pub mod message;
mod network;

pub use error::{Error, ErrorKind, Result, SizeLimit};
pub use format::{Compound, Cursor, Field, Fields, Format, Value};
pub use message::{
    Alert, Message, MessageDef, MessageHeader, Registry, catalog, checksum,
    first_available_message_length, message_from_binary,
};
pub use network::Network;

/// Magic number size in bytes
pub const MAGIC_SIZE: usize = 4;

/// Command name size in bytes
pub const COMMAND_SIZE: usize = 12;

/// Checksum size in bytes
pub const CHECKSUM_SIZE: usize = 4;

/// Offset of the payload length within the header
pub const LENGTH_OFFSET: usize = MAGIC_SIZE + COMMAND_SIZE;

/// Offset of the checksum within the header
pub const CHECKSUM_OFFSET: usize = LENGTH_OFFSET + 4;

/// Envelope header size in bytes
pub const HEADER_SIZE: usize = CHECKSUM_OFFSET + CHECKSUM_SIZE;

/// Maximum entries in an `inv`, `getdata` or `notfound` message
pub const MAX_INVENTORY_ENTRIES: usize = 50_000;

/// Maximum entries in an `addr` message
pub const MAX_ADDR_ENTRIES: usize = 1_000;

/// Version bit marking a block header as merge-mined (AuxPoW)
pub const AUXPOW_VERSION_FLAG: u32 = 1 << 8;
