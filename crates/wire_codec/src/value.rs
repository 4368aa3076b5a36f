//! Generic tagged value tree and its encoder

use bytes::{BufMut, Bytes, BytesMut};

use crate::tag::TypeTag;

/// Any value expressible on the wire
///
/// Array items are written without their own tag; the array header carries
/// the element tag. Items are not checked against it, which lets tests and
/// fuzzers build deliberately inconsistent messages.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Byte(u8),
    Boolean(bool),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    UInt64(u64),
    Double(f64),
    String(String),
    Variant(Box<WireValue>),
    Array {
        element: TypeTag,
        items: Vec<WireValue>,
    },
    DictEntry(Box<WireValue>, Box<WireValue>),
}

impl WireValue {
    /// Wrap in a variant
    pub fn variant(inner: WireValue) -> Self {
        Self::Variant(Box::new(inner))
    }

    /// Dictionary entry `key → value`
    pub fn entry(key: WireValue, value: WireValue) -> Self {
        Self::DictEntry(Box::new(key), Box::new(value))
    }

    /// Array of dictionary entries
    pub fn dict(entries: Vec<WireValue>) -> Self {
        Self::Array {
            element: TypeTag::DictEntry,
            items: entries,
        }
    }

    pub fn tag(&self) -> TypeTag {
        match self {
            Self::Byte(_) => TypeTag::Byte,
            Self::Boolean(_) => TypeTag::Boolean,
            Self::UInt16(_) => TypeTag::UInt16,
            Self::Int32(_) => TypeTag::Int32,
            Self::UInt32(_) => TypeTag::UInt32,
            Self::UInt64(_) => TypeTag::UInt64,
            Self::Double(_) => TypeTag::Double,
            Self::String(_) => TypeTag::String,
            Self::Variant(_) => TypeTag::Variant,
            Self::Array { .. } => TypeTag::Array,
            Self::DictEntry(..) => TypeTag::DictEntry,
        }
    }

    /// Encode as a standalone message
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        encode_value(self, &mut buf);
        buf.freeze()
    }

    fn put_body(&self, dst: &mut BytesMut) {
        match self {
            Self::Byte(v) => dst.put_u8(*v),
            Self::Boolean(v) => dst.put_u8(u8::from(*v)),
            Self::UInt16(v) => dst.put_u16_le(*v),
            Self::Int32(v) => dst.put_i32_le(*v),
            Self::UInt32(v) => dst.put_u32_le(*v),
            Self::UInt64(v) => dst.put_u64_le(*v),
            Self::Double(v) => dst.put_f64_le(*v),
            Self::String(s) => {
                dst.put_u32_le(s.len() as u32);
                dst.put_slice(s.as_bytes());
            }
            Self::Variant(inner) => encode_value(inner, dst),
            Self::Array { element, items } => {
                dst.put_u8(element.as_byte());
                dst.put_u32_le(items.len() as u32);
                for item in items {
                    item.put_body(dst);
                }
            }
            Self::DictEntry(key, value) => {
                encode_value(key, dst);
                encode_value(value, dst);
            }
        }
    }
}

/// Append `value` (tag + body) to `dst`
pub fn encode_value(value: &WireValue, dst: &mut BytesMut) {
    dst.put_u8(value.tag().as_byte());
    value.put_body(dst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_array_layout() {
        let value = WireValue::Array {
            element: TypeTag::UInt16,
            items: vec![WireValue::UInt16(32), WireValue::UInt16(33)],
        };
        assert_eq!(
            value.to_bytes().as_ref(),
            &[b'a', b'q', 2, 0, 0, 0, 32, 0, 33, 0]
        );
    }

    #[test]
    fn test_dict_entry_layout() {
        let value = WireValue::dict(vec![WireValue::entry(
            WireValue::UInt16(34),
            WireValue::variant(WireValue::Double(337.0)),
        )]);
        let bytes = value.to_bytes();
        assert_eq!(&bytes[..6], &[b'a', b'e', 1, 0, 0, 0]);
        assert_eq!(&bytes[6..11], &[b'q', 34, 0, b'v', b'd']);
        assert_eq!(&bytes[11..], &337.0f64.to_le_bytes());
    }

    #[test]
    fn test_string_layout() {
        let bytes = WireValue::String("ok".into()).to_bytes();
        assert_eq!(bytes.as_ref(), &[b's', 2, 0, 0, 0, b'o', b'k']);
    }
}
