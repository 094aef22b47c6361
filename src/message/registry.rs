//! Command-to-definition dispatch

use std::collections::HashMap;
use std::sync::LazyLock;

use bytes::Bytes;
use tracing::debug;

use super::{Message, MessageDef, catalog};
use crate::format::{Cursor, primitive};
use crate::{COMMAND_SIZE, MAGIC_SIZE, Result};

static STANDARD: LazyLock<Registry> =
    LazyLock::new(|| Registry::new(catalog::standard().into_iter().cloned()));

static AUXPOW: LazyLock<Registry> = LazyLock::new(|| {
    Registry::new(
        catalog::standard()
            .into_iter()
            .cloned()
            .chain([catalog::AUXPOW_HEADERS.clone()]),
    )
});

/// Message definitions keyed by command
#[derive(Debug, Clone, Default)]
pub struct Registry {
    by_command: HashMap<String, MessageDef>,
}

impl Registry {
    /// Build a registry; a later definition replaces an earlier one with the
    /// same command.
    pub fn new(defs: impl IntoIterator<Item = MessageDef>) -> Self {
        let by_command = defs
            .into_iter()
            .map(|def| (def.command().to_owned(), def))
            .collect();
        Self { by_command }
    }

    /// Every standard message, `headers` carrying plain block headers
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// The standard messages with `headers` accepting AuxPoW block headers
    #[must_use]
    pub fn auxpow() -> &'static Self {
        &AUXPOW
    }

    /// Add or replace a definition
    pub fn insert(&mut self, def: MessageDef) -> Option<MessageDef> {
        self.by_command.insert(def.command().to_owned(), def)
    }

    /// Definition for `command`
    #[must_use]
    pub fn get(&self, command: &str) -> Option<&MessageDef> {
        self.by_command.get(command)
    }

    /// Registered commands, in no particular order
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.by_command.keys().map(String::as_str)
    }

    /// Number of definitions
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_command.len()
    }

    /// Whether no definitions are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_command.is_empty()
    }

    /// Decode a full message, choosing its definition by the command field.
    ///
    /// Returns `Ok(None)` for a command with no registered definition.
    pub fn decode(&self, bytes: impl Into<Bytes>) -> Result<Option<Message>> {
        let bytes = bytes.into();
        let command = {
            let mut cursor = Cursor::new(bytes.clone());
            cursor.take(MAGIC_SIZE)?;
            primitive::command_text(&cursor.take(COMMAND_SIZE)?)
        };

        match self.get(&command) {
            Some(def) => def.decode(bytes).map(Some),
            None => {
                debug!(%command, "no definition for command");
                Ok(None)
            }
        }
    }
}

/// Decode a full message against the standard registry.
///
/// Returns `Ok(None)` when the command is not a standard one.
pub fn message_from_binary(bytes: impl Into<Bytes>) -> Result<Option<Message>> {
    Registry::standard().decode(bytes)
}
