//! Protocol composites: addresses, inventory, transactions, block headers

use std::sync::LazyLock;

use super::{Cursor, Format, Value};
use crate::{AUXPOW_VERSION_FLAG, Error, Result};

/// Network address as carried in `addr` (with timestamp)
#[must_use]
pub fn network_address() -> Format {
    Format::compound([
        ("timestamp", Format::U32),
        ("services", Format::U64),
        ("address", Format::IpAddress),
        ("port", Format::U16_BE),
    ])
}

/// Network address as carried in `version` (no timestamp)
#[must_use]
pub fn network_address_without_timestamp() -> Format {
    Format::compound([
        ("services", Format::U64),
        ("address", Format::IpAddress),
        ("port", Format::U16_BE),
    ])
}

/// Inventory entry type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum InventoryType {
    /// Data with this hash should be ignored
    Error = 0,
    /// Transaction hash
    Transaction = 1,
    /// Block hash
    Block = 2,
    /// Block hash, reply with a Merkle block
    FilteredBlock = 3,
}

impl InventoryType {
    /// Convert from the wire tag
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Error),
            1 => Some(Self::Transaction),
            2 => Some(Self::Block),
            3 => Some(Self::FilteredBlock),
            _ => None,
        }
    }

    /// Convert to the wire tag
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }
}

impl From<InventoryType> for Value {
    fn from(value: InventoryType) -> Self {
        Self::from(value.as_u32())
    }
}

/// Inventory vector: type tag and hash
#[must_use]
pub fn inventory_vector() -> Format {
    Format::compound([("type", Format::U32), ("hash", Format::BYTES32)])
}

/// Reference to a previous transaction output
#[must_use]
pub fn out_point() -> Format {
    Format::compound([("hash", Format::BYTES32), ("index", Format::U32)])
}

/// Transaction input
#[must_use]
pub fn tx_in() -> Format {
    Format::compound([
        ("previous_output", out_point()),
        ("signature_script", Format::VarString),
        ("sequence", Format::U32),
    ])
}

/// Transaction output
#[must_use]
pub fn tx_out() -> Format {
    Format::compound([("value", Format::I64), ("pk_script", Format::VarString)])
}

/// Transaction with at least one input and one output
#[must_use]
pub fn tx() -> Format {
    Format::compound([
        ("version", Format::U32),
        ("tx_in", Format::bounded_list(tx_in(), Some(1), None)),
        ("tx_out", Format::bounded_list(tx_out(), Some(1), None)),
        ("lock_time", Format::U32),
    ])
}

fn header_fields() -> Vec<(&'static str, Format)> {
    vec![
        ("version", Format::U32),
        ("prev_block", Format::BYTES32),
        ("merkle_root", Format::BYTES32),
        ("timestamp", Format::U32),
        ("bits", Format::U32),
        ("nonce", Format::U32),
    ]
}

/// Standalone block header, followed by its transaction count
#[must_use]
pub fn block_header() -> Format {
    let mut fields = header_fields();
    fields.push(("txn_count", Format::VarInt));
    Format::compound(fields)
}

/// Block header as embedded in an AuxPoW header (no transaction count)
#[must_use]
pub fn block_header_without_txn_count() -> Format {
    Format::compound(header_fields())
}

/// Merkle branch: hashes plus a side mask
#[must_use]
pub fn merkle_branch() -> Format {
    Format::compound([
        ("branch_hash", Format::list(Format::BYTES32)),
        ("branch_side_mask", Format::I32),
    ])
}

/// Merge-mined block header carrying the parent chain's proof of work
#[must_use]
pub fn block_header_auxpow() -> Format {
    let mut fields = header_fields();
    fields.extend([
        ("coinbase_txn", tx()),
        ("block_hash", Format::BYTES32),
        ("coinbase_branch", merkle_branch()),
        ("blockchain_branch", merkle_branch()),
        ("parent_block", block_header_without_txn_count()),
        ("txn_count", Format::VarInt),
    ]);
    Format::compound(fields)
}

static PLAIN_HEADER: LazyLock<Format> = LazyLock::new(block_header);
static AUXPOW_HEADER: LazyLock<Format> = LazyLock::new(block_header_auxpow);

/// Block header layout, selected by bit 8 of the version field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockHeaderLayout {
    /// Six header fields plus transaction count
    Plain,
    /// Header fields, AuxPoW proof, parent header, transaction count
    AuxPow,
}

impl BlockHeaderLayout {
    /// Layout for a given version
    #[must_use]
    pub const fn from_version(version: u32) -> Self {
        if version & AUXPOW_VERSION_FLAG != 0 {
            Self::AuxPow
        } else {
            Self::Plain
        }
    }

    /// Peek the little-endian version at the cursor without consuming it
    pub fn detect(cursor: &Cursor) -> Result<Self> {
        let version = u32::from_le_bytes(cursor.peek_array()?);
        Ok(Self::from_version(version))
    }

    /// Layout for a header value about to be encoded
    pub fn of_value(value: &Value) -> Result<Self> {
        let Value::Struct(fields) = value else {
            return Err(Error::PropertyTypeMismatch {
                expected: "struct",
                got: value.type_name(),
            });
        };
        let version = fields.get("version").ok_or_else(|| Error::MissingProperty {
            command: None,
            property: "version".into(),
        })?;
        let version = version
            .as_integer()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| Error::bad_value("32-bit unsigned version", version))?;
        Ok(Self::from_version(version))
    }

    /// Format implementing this layout
    #[must_use]
    pub fn format(self) -> &'static Format {
        match self {
            Self::Plain => &PLAIN_HEADER,
            Self::AuxPow => &AUXPOW_HEADER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Fields, fields};

    fn header_values(version: u32) -> Fields {
        fields! {
            "version" => version,
            "prev_block" => [0x11u8; 32],
            "merkle_root" => [0x22u8; 32],
            "timestamp" => 1_700_000_000u32,
            "bits" => 0x1d00_ffffu32,
            "nonce" => 42u32,
        }
    }

    fn coinbase() -> Value {
        Value::Struct(fields! {
            "version" => 1u32,
            "tx_in" => vec![Value::Struct(fields! {
                "previous_output" => fields! { "hash" => [0u8; 32], "index" => u32::MAX },
                "signature_script" => vec![0x03u8, 0x01, 0x02, 0x03],
                "sequence" => u32::MAX,
            })],
            "tx_out" => vec![Value::Struct(fields! {
                "value" => 5_000_000_000i64,
                "pk_script" => vec![0x51u8],
            })],
            "lock_time" => 0u32,
        })
    }

    fn branch(len: usize) -> Fields {
        fields! {
            "branch_hash" => (0..len).map(|i| Value::from([i as u8; 32])).collect::<Vec<_>>(),
            "branch_side_mask" => 0i32,
        }
    }

    fn plain_header(version: u32) -> Value {
        let mut values = header_values(version);
        values.insert("txn_count".into(), Value::from(0u8));
        Value::Struct(values)
    }

    fn auxpow_header(version: u32) -> Value {
        let mut values = header_values(version);
        values.insert("coinbase_txn".into(), coinbase());
        values.insert("block_hash".into(), Value::from([0x33u8; 32]));
        values.insert("coinbase_branch".into(), Value::Struct(branch(2)));
        values.insert("blockchain_branch".into(), Value::Struct(branch(0)));
        values.insert("parent_block".into(), Value::Struct(header_values(2)));
        values.insert("txn_count".into(), Value::from(0u8));
        Value::Struct(values)
    }

    #[test]
    fn test_plain_layout_selected() {
        let value = plain_header(0x0000_0001);
        let encoded = Format::BlockHeader.encode(&value).unwrap();
        assert_eq!(encoded.len(), 81);
        assert_eq!(
            BlockHeaderLayout::detect(&Cursor::new(encoded.clone())).unwrap(),
            BlockHeaderLayout::Plain
        );

        let decoded = Format::BlockHeader.decode_from(encoded).unwrap();
        assert_eq!(decoded, value);
        assert!(decoded.get("parent_block").is_none());
    }

    #[test]
    fn test_auxpow_layout_selected() {
        let value = auxpow_header(0x0000_0100);
        let encoded = Format::BlockHeader.encode(&value).unwrap();
        assert_eq!(
            BlockHeaderLayout::detect(&Cursor::new(encoded.clone())).unwrap(),
            BlockHeaderLayout::AuxPow
        );

        let mut cursor = Cursor::new(encoded);
        let decoded = Format::BlockHeader.decode(&mut cursor).unwrap();
        assert!(cursor.is_exhausted());
        assert_eq!(decoded, value);
        assert_eq!(
            decoded.get("parent_block").and_then(|p| p.get("version")),
            Some(&Value::Integer(2))
        );
        assert!(decoded.get("parent_block").and_then(|p| p.get("txn_count")).is_none());
    }

    #[test]
    fn test_layout_from_version_bit() {
        assert_eq!(BlockHeaderLayout::from_version(1), BlockHeaderLayout::Plain);
        assert_eq!(BlockHeaderLayout::from_version(0x100), BlockHeaderLayout::AuxPow);
        assert_eq!(
            BlockHeaderLayout::from_version(0x0062_0102),
            BlockHeaderLayout::AuxPow
        );
        assert_eq!(BlockHeaderLayout::from_version(0x0200), BlockHeaderLayout::Plain);
    }

    #[test]
    fn test_detect_needs_four_bytes() {
        assert!(matches!(
            BlockHeaderLayout::detect(&Cursor::new(vec![0u8, 1])),
            Err(Error::BufferOverrun {
                available: 2,
                required: 4
            })
        ));
    }

    #[test]
    fn test_auxpow_layout_rejects_plain_fields() {
        let err = Format::BlockHeader.encode(&plain_header(0x100)).unwrap_err();
        assert!(matches!(err, Error::MissingProperty { .. }));
    }

    #[test]
    fn test_tx_requires_inputs_and_outputs() {
        let mut values = coinbase().as_struct().cloned().unwrap();
        values.insert("tx_in".into(), Value::List(vec![]));
        assert!(matches!(
            tx().encode(&Value::Struct(values)),
            Err(Error::InvalidSize { got: 0, .. })
        ));

        let mut values = coinbase().as_struct().cloned().unwrap();
        values.insert("tx_out".into(), Value::List(vec![]));
        assert!(matches!(
            tx().encode(&Value::Struct(values)),
            Err(Error::InvalidSize { got: 0, .. })
        ));
    }

    #[test]
    fn test_network_address_layout() {
        let value = Value::Struct(fields! {
            "timestamp" => 0x5555_3b4cu32,
            "services" => 1u64,
            "address" => "127.0.0.1",
            "port" => 8333u16,
        });
        let encoded = network_address().encode(&value).unwrap();
        assert_eq!(encoded.len(), 30);
        assert_eq!(&encoded[28..], &[0x20, 0x8d]);
        assert_eq!(network_address().decode_from(encoded).unwrap(), value);
    }

    #[test]
    fn test_inventory_type_tags() {
        for tag in 0..4 {
            assert_eq!(InventoryType::from_u32(tag).map(InventoryType::as_u32), Some(tag));
        }
        assert!(InventoryType::from_u32(4).is_none());
    }
}
