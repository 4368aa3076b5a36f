//! Type tags

use std::fmt;

/// One-byte type tag preceding every encoded value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    Byte = b'y',
    Boolean = b'b',
    UInt16 = b'q',
    Int32 = b'i',
    UInt32 = b'u',
    UInt64 = b't',
    Double = b'd',
    String = b's',
    Variant = b'v',
    Array = b'a',
    DictEntry = b'e',
}

impl TypeTag {
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            b'y' => Self::Byte,
            b'b' => Self::Boolean,
            b'q' => Self::UInt16,
            b'i' => Self::Int32,
            b'u' => Self::UInt32,
            b't' => Self::UInt64,
            b'd' => Self::Double,
            b's' => Self::String,
            b'v' => Self::Variant,
            b'a' => Self::Array,
            b'e' => Self::DictEntry,
            _ => return None,
        })
    }

    /// Body size for fixed-width types
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Byte | Self::Boolean => Some(1),
            Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 => Some(4),
            Self::UInt64 | Self::Double => Some(8),
            Self::String | Self::Variant | Self::Array | Self::DictEntry => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.as_byte() as char)
    }
}

/// Render a raw tag byte for error messages
pub(crate) fn describe(byte: u8) -> String {
    if byte.is_ascii_graphic() {
        format!("'{}'", byte as char)
    } else {
        format!("0x{byte:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_bytes_round_trip() {
        for byte in b"ybqiutdsvae" {
            let tag = TypeTag::from_byte(*byte).unwrap();
            assert_eq!(tag.as_byte(), *byte);
        }
        assert_eq!(TypeTag::from_byte(b'{'), None);
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe(b's'), "'s'");
        assert_eq!(describe(0x00), "0x00");
    }
}
