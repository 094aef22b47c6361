//! Format descriptors
//!
//! A [`Format`] pairs a decoder and an encoder for one data shape. Formats
//! compose: lists and compounds hold child formats, including other lists
//! and compounds.

mod cursor;
mod ip;
pub(crate) mod primitive;
mod protocol;
mod value;

pub use cursor::Cursor;
pub use ip::{IP_ADDRESS_SIZE, IPV4_MAPPED_PREFIX, ip_from_text, ip_to_text};
pub use primitive::{Endian, IntFormat, decode_varint, encode_varint};
pub use protocol::{
    BlockHeaderLayout, InventoryType, block_header, block_header_auxpow,
    block_header_without_txn_count, inventory_vector, merkle_branch, network_address,
    network_address_without_timestamp, out_point, tx, tx_in, tx_out,
};
pub use value::{Fields, Value};

use bytes::Bytes;

use crate::{Error, Result, SizeLimit};

/// A paired decode/encode capability for one data shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Format {
    /// Exactly N raw bytes
    Bytes(usize),
    /// 12-byte NUL-padded command name
    Command,
    /// Fixed-width integer
    Integer(IntFormat),
    /// Variable-length integer
    VarInt,
    /// Varint length followed by raw bytes
    VarString,
    /// Varint count followed by that many items
    List(ListFormat),
    /// Ordered named fields
    Compound(Compound),
    /// 16-byte IP address rendered as text
    IpAddress,
    /// Plain or AuxPoW block header, chosen by the version flag
    BlockHeader,
}

impl Format {
    /// Unsigned 8-bit integer
    pub const U8: Self = Self::Integer(IntFormat::U8);
    /// Unsigned 16-bit little-endian integer
    pub const U16: Self = Self::Integer(IntFormat::U16);
    /// Unsigned 16-bit big-endian integer
    pub const U16_BE: Self = Self::Integer(IntFormat::U16_BE);
    /// Signed 32-bit little-endian integer
    pub const I32: Self = Self::Integer(IntFormat::I32);
    /// Unsigned 32-bit little-endian integer
    pub const U32: Self = Self::Integer(IntFormat::U32);
    /// Signed 64-bit little-endian integer
    pub const I64: Self = Self::Integer(IntFormat::I64);
    /// Unsigned 64-bit little-endian integer
    pub const U64: Self = Self::Integer(IntFormat::U64);
    /// 8 raw bytes (nonces)
    pub const BYTES8: Self = Self::Bytes(8);
    /// 32 raw bytes (hashes)
    pub const BYTES32: Self = Self::Bytes(32);
    /// 4 raw bytes (magic numbers)
    pub const MAGIC: Self = Self::Bytes(crate::MAGIC_SIZE);

    /// Configure an integer format; see [`IntFormat::new`]
    pub fn integer(width: usize, signed: bool, endian: Endian) -> Result<Self> {
        IntFormat::new(width, signed, endian).map(Self::Integer)
    }

    /// Unbounded list of `item`
    #[must_use]
    pub fn list(item: Format) -> Self {
        Self::List(ListFormat::new(item, None, None))
    }

    /// List of `item` with inclusive count bounds
    #[must_use]
    pub fn bounded_list(item: Format, min: Option<usize>, max: Option<usize>) -> Self {
        Self::List(ListFormat::new(item, min, max))
    }

    /// Compound of `(name, format)` pairs in declaration order
    pub fn compound<N: Into<String>>(fields: impl IntoIterator<Item = (N, Format)>) -> Self {
        Self::Compound(Compound::new(fields))
    }

    /// Decode one value, advancing the cursor past it
    pub fn decode(&self, cursor: &mut Cursor) -> Result<Value> {
        match self {
            Self::Bytes(len) => primitive::decode_bytes(cursor, *len),
            Self::Command => primitive::decode_command(cursor).map(Value::Text),
            Self::Integer(int) => int.decode(cursor).map(Value::Integer),
            Self::VarInt => primitive::decode_varint(cursor).map(Value::from),
            Self::VarString => primitive::decode_varstring(cursor).map(Value::Bytes),
            Self::List(list) => list.decode(cursor).map(Value::List),
            Self::Compound(compound) => compound.decode(cursor).map(Value::Struct),
            Self::IpAddress => Ok(Value::Text(ip_to_text(&cursor.take_array()?))),
            Self::BlockHeader => BlockHeaderLayout::detect(cursor)?.format().decode(cursor),
        }
    }

    /// Decode one value from the start of `bytes`
    pub fn decode_from(&self, bytes: impl Into<Bytes>) -> Result<Value> {
        self.decode(&mut Cursor::new(bytes))
    }

    /// Encode `value` into a fresh buffer
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.encode_into(value, &mut out)?;
        Ok(out)
    }

    /// Append the encoding of `value` to `out`.
    ///
    /// On error `out` may hold a partial encoding; [`Format::encode`] never
    /// exposes it.
    pub fn encode_into(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::Bytes(len) => primitive::encode_bytes(value, *len, out),
            Self::Command => primitive::encode_command(value, out),
            Self::Integer(int) => int.encode(value, out),
            Self::VarInt => primitive::encode_varint_value(value, out),
            Self::VarString => primitive::encode_varstring(value, out),
            Self::List(list) => list.encode(value, out),
            Self::Compound(compound) => compound.encode(value, out),
            Self::IpAddress => {
                let Value::Text(text) = value else {
                    return Err(Error::bad_value("IP address text", value.type_name()));
                };
                out.extend_from_slice(&ip_from_text(text)?);
                Ok(())
            }
            Self::BlockHeader => BlockHeaderLayout::of_value(value)?
                .format()
                .encode_into(value, out),
        }
    }
}

/// Varint-counted list with optional inclusive bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFormat {
    item: Box<Format>,
    min: Option<usize>,
    max: Option<usize>,
}

impl ListFormat {
    /// Create a list of `item`
    #[must_use]
    pub fn new(item: Format, min: Option<usize>, max: Option<usize>) -> Self {
        Self {
            item: Box::new(item),
            min,
            max,
        }
    }

    /// Format of each item
    #[must_use]
    pub fn item(&self) -> &Format {
        &self.item
    }

    /// Inclusive minimum count
    #[must_use]
    pub const fn min(&self) -> Option<usize> {
        self.min
    }

    /// Inclusive maximum count
    #[must_use]
    pub const fn max(&self) -> Option<usize> {
        self.max
    }

    fn check_count(&self, count: usize) -> Result<()> {
        if let Some(min) = self.min.filter(|&min| count < min) {
            return Err(Error::InvalidSize {
                expected: SizeLimit::Minimum(min),
                got: count,
            });
        }
        if let Some(max) = self.max.filter(|&max| count > max) {
            return Err(Error::InvalidSize {
                expected: SizeLimit::Maximum(max),
                got: count,
            });
        }
        Ok(())
    }

    fn decode(&self, cursor: &mut Cursor) -> Result<Vec<Value>> {
        let count = primitive::decode_length(cursor)?;
        self.check_count(count)?;

        // A hostile count must not drive the allocation.
        let mut items = Vec::with_capacity(count.min(cursor.remaining()));
        for _ in 0..count {
            items.push(self.item.decode(cursor)?);
        }
        Ok(items)
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        let Value::List(items) = value else {
            return Err(Error::PropertyTypeMismatch {
                expected: "list",
                got: value.type_name(),
            });
        };
        self.check_count(items.len())?;

        encode_varint(items.len() as u64, out);
        for item in items {
            self.item.encode_into(item, out)?;
        }
        Ok(())
    }
}

/// A named field of a compound or message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    format: Format,
}

impl Field {
    /// Create a field
    pub fn new(name: impl Into<String>, format: Format) -> Self {
        Self {
            name: name.into(),
            format,
        }
    }

    /// Field name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field format
    #[must_use]
    pub const fn format(&self) -> &Format {
        &self.format
    }
}

/// Ordered named fields, visited in declaration order in both directions.
///
/// Encoding is strict: every declared field must be present and no other
/// field may be.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    fields: Vec<Field>,
}

impl Compound {
    /// Create a compound from `(name, format)` pairs
    pub fn new<N: Into<String>>(fields: impl IntoIterator<Item = (N, Format)>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|(name, format)| Field::new(name, format))
                .collect(),
        }
    }

    /// Declared fields in order
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a declared field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Decode every field in order
    pub fn decode(&self, cursor: &mut Cursor) -> Result<Fields> {
        let mut values = Fields::new();
        for field in &self.fields {
            let value = field.format.decode(cursor)?;
            values.insert(field.name.clone(), value);
        }
        Ok(values)
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<()> {
        let Value::Struct(values) = value else {
            return Err(Error::PropertyTypeMismatch {
                expected: "struct",
                got: value.type_name(),
            });
        };
        self.encode_fields(values, out)
    }

    /// Encode every field of `values` in declaration order
    pub fn encode_fields(&self, values: &Fields, out: &mut Vec<u8>) -> Result<()> {
        self.check_extraneous(values)?;
        for field in &self.fields {
            field.format.encode_into(self.require(values, field)?, out)?;
        }
        Ok(())
    }

    /// Validate `values` field by field without keeping the encoding
    pub fn validate(&self, values: &Fields) -> Result<()> {
        self.check_extraneous(values)?;
        for field in &self.fields {
            let value = self.require(values, field)?;
            if let Err(err) = field.format.encode(value) {
                tracing::debug!(property = field.name(), error = %err, "invalid property");
                return Err(err);
            }
        }
        Ok(())
    }

    fn require<'v>(&self, values: &'v Fields, field: &Field) -> Result<&'v Value> {
        values.get(&field.name).ok_or_else(|| Error::MissingProperty {
            command: None,
            property: field.name.clone(),
        })
    }

    fn check_extraneous(&self, values: &Fields) -> Result<()> {
        match values.keys().find(|name| self.field(name).is_none()) {
            Some(name) => Err(Error::ExtraneousProperty {
                command: None,
                property: name.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;

    fn point() -> Format {
        Format::compound([("x", Format::U16), ("y", Format::I32)])
    }

    #[test]
    fn test_compound_field_order() {
        let value = Value::Struct(fields! { "y" => -2i32, "x" => 1u16 });
        let encoded = point().encode(&value).unwrap();
        assert_eq!(encoded, vec![1, 0, 0xfe, 0xff, 0xff, 0xff]);
        assert_eq!(point().decode_from(encoded).unwrap(), value);
    }

    #[test]
    fn test_compound_missing_field() {
        let value = Value::Struct(fields! { "x" => 1u16 });
        assert_eq!(
            point().encode(&value).unwrap_err(),
            Error::MissingProperty {
                command: None,
                property: "y".into()
            }
        );
    }

    #[test]
    fn test_compound_extraneous_field() {
        let value = Value::Struct(fields! { "x" => 1u16, "y" => 2i32, "z" => 3u8 });
        assert_eq!(
            point().encode(&value).unwrap_err(),
            Error::ExtraneousProperty {
                command: None,
                property: "z".into()
            }
        );
    }

    #[test]
    fn test_compound_type_mismatch() {
        assert!(matches!(
            point().encode(&Value::Integer(1)),
            Err(Error::PropertyTypeMismatch {
                expected: "struct",
                ..
            })
        ));
    }

    #[test]
    fn test_nested_lists_of_compounds() {
        let format = Format::list(Format::list(point()));
        let value = Value::List(vec![
            Value::List(vec![Value::Struct(fields! { "x" => 1u16, "y" => 2i32 })]),
            Value::List(vec![]),
        ]);
        let encoded = format.encode(&value).unwrap();
        assert_eq!(encoded[0], 2);
        assert_eq!(format.decode_from(encoded).unwrap(), value);
    }

    #[test]
    fn test_list_bounds() {
        let format = Format::bounded_list(Format::U8, Some(1), Some(2));

        assert_eq!(
            format.encode(&Value::List(vec![])).unwrap_err(),
            Error::InvalidSize {
                expected: SizeLimit::Minimum(1),
                got: 0
            }
        );
        assert_eq!(
            format
                .encode(&Value::List(vec![1u8.into(), 2u8.into(), 3u8.into()]))
                .unwrap_err(),
            Error::InvalidSize {
                expected: SizeLimit::Maximum(2),
                got: 3
            }
        );
        assert!(matches!(
            format.decode_from(vec![3u8, 1, 2, 3]),
            Err(Error::InvalidSize { got: 3, .. })
        ));
    }

    #[test]
    fn test_list_hostile_count() {
        let mut bytes = vec![0xff];
        bytes.extend_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(
            Format::list(Format::U32).decode_from(bytes),
            Err(Error::BufferOverrun { .. })
        ));
    }

    #[test]
    fn test_list_type_mismatch() {
        assert!(matches!(
            Format::list(Format::U8).encode(&Value::from("abc")),
            Err(Error::PropertyTypeMismatch {
                expected: "list",
                got: "text"
            })
        ));
    }

    #[test]
    fn test_ip_address_format() {
        let encoded = Format::IpAddress.encode(&Value::from("10.0.0.1")).unwrap();
        assert_eq!(encoded.len(), IP_ADDRESS_SIZE);
        assert_eq!(
            Format::IpAddress.decode_from(encoded).unwrap(),
            Value::from("10.0.0.1")
        );
        assert!(matches!(
            Format::IpAddress.encode(&Value::Integer(1)),
            Err(Error::BadPropertyValue { .. })
        ));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn int_format_strategy() -> impl Strategy<Value = IntFormat> {
            prop_oneof![
                Just(IntFormat::U8),
                Just(IntFormat::U16),
                Just(IntFormat::U16_BE),
                Just(IntFormat::I32),
                Just(IntFormat::U32),
                Just(IntFormat::I64),
                Just(IntFormat::U64),
            ]
        }

        proptest! {
            /// Property: every in-range integer survives a round trip
            #[test]
            fn prop_integer_roundtrip(format in int_format_strategy(), seed in any::<i128>()) {
                let (min, max) = format.range();
                let span = (max - min) as u128 + 1;
                let value = min + (seed.unsigned_abs() % span) as i128;

                let format = Format::Integer(format);
                let encoded = format.encode(&Value::Integer(value)).unwrap();
                prop_assert_eq!(encoded.len(), format_width(&format));
                prop_assert_eq!(format.decode_from(encoded).unwrap(), Value::Integer(value));
            }

            /// Property: varints decode to what was encoded and consume it all
            #[test]
            fn prop_varint_roundtrip(value in any::<u64>()) {
                let mut out = Vec::new();
                encode_varint(value, &mut out);
                let mut cursor = Cursor::new(out);
                prop_assert_eq!(decode_varint(&mut cursor).unwrap(), value);
                prop_assert!(cursor.is_exhausted());
            }

            /// Property: well-formed list bytes re-encode to the same bytes
            #[test]
            fn prop_list_bytes_roundtrip(items in prop::collection::vec(any::<u32>(), 0..300)) {
                let mut bytes = Vec::new();
                encode_varint(items.len() as u64, &mut bytes);
                for item in &items {
                    bytes.extend_from_slice(&item.to_le_bytes());
                }

                let format = Format::list(Format::U32);
                let decoded = format.decode_from(bytes.clone()).unwrap();
                prop_assert_eq!(format.encode(&decoded).unwrap(), bytes);
            }

            /// Property: decoding never reads past a truncated buffer
            #[test]
            fn prop_truncation_is_overrun(items in prop::collection::vec(any::<u16>(), 1..50), cut in 1usize..100) {
                let format = Format::list(Format::U16);
                let value = Value::List(items.into_iter().map(Value::from).collect());
                let encoded = format.encode(&value).unwrap();
                let keep = encoded.len().saturating_sub(cut);
                let result = format.decode_from(encoded[..keep].to_vec());
                let overrun = matches!(result, Err(Error::BufferOverrun { .. }));
                prop_assert!(overrun, "expected overrun, got {:?}", result);
            }
        }

        fn format_width(format: &Format) -> usize {
            match format {
                Format::Integer(int) => int.width(),
                _ => unreachable!(),
            }
        }
    }
}
