//! Dynamic values produced and consumed by format descriptors

use std::collections::BTreeMap;

use bytes::Bytes;

/// Named field values of a compound or message
pub type Fields = BTreeMap<String, Value>;

/// A decoded (or to-be-encoded) value.
///
/// Integers are carried as `i128` so the full range of both `u64` and `i64`
/// survives a round trip exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Any fixed-width integer or varint
    Integer(i128),
    /// Raw bytes
    Bytes(Bytes),
    /// UTF-8 text (commands, IP addresses)
    Text(String),
    /// Homogeneous list
    List(Vec<Value>),
    /// Named fields
    Struct(Fields),
}

impl Value {
    /// Short name of the value's shape, used in error details
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Bytes(_) => "bytes",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Struct(_) => "struct",
        }
    }

    /// Integer payload, if any
    #[must_use]
    pub const fn as_integer(&self) -> Option<i128> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Byte payload, if any
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Text payload, if any
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// List items, if any
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Struct fields, if any
    #[must_use]
    pub const fn as_struct(&self) -> Option<&Fields> {
        match self {
            Self::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Look up a field of a struct value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_struct().and_then(|fields| fields.get(name))
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Integer(i128::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(u8, u16, u32, u64, i8, i16, i32, i64);

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        // usize is at most 64 bits on every supported target
        Self::Integer(value as i128)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(value))
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(value))
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(value: [u8; N]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(&value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<Fields> for Value {
    fn from(value: Fields) -> Self {
        Self::Struct(value)
    }
}

/// Build a [`Fields`] map from `name => value` pairs.
///
/// ```
/// use p2pwire::{fields, Value};
///
/// let addr = fields! {
///     "services" => 1u64,
///     "address" => "127.0.0.1",
///     "port" => 8333u16,
/// };
/// assert_eq!(addr["port"], Value::Integer(8333));
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(
            fields.insert(::std::string::String::from($name), $crate::Value::from($value));
        )+
        fields
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_conversions_are_exact() {
        assert_eq!(Value::from(u64::MAX), Value::Integer(i128::from(u64::MAX)));
        assert_eq!(Value::from(i64::MIN), Value::Integer(i128::from(i64::MIN)));
    }

    #[test]
    fn test_struct_get() {
        let value = Value::Struct(fields! { "nonce" => vec![1u8, 2] });
        assert_eq!(value.get("nonce").and_then(Value::as_bytes), Some(&[1u8, 2][..]));
        assert!(value.get("missing").is_none());
        assert!(Value::Integer(1).get("nonce").is_none());
    }
}
