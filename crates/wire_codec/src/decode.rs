//! Message decoders

use contracts::{AttributeKey, AttributeMask, AttributeValue, Snapshot};
use tracing::trace;

use crate::error::DecodeError;
use crate::reader::WireReader;
use crate::tag::{describe, TypeTag};

/// Nesting limit when skipping values of unknown attributes
const MAX_SKIP_DEPTH: usize = 32;

/// Decode a reply dictionary into a range-valid snapshot
///
/// Entries with unknown wire codes are skipped whatever their value type.
/// Known codes must carry a variant holding a double inside the key's range.
///
/// # Errors
/// Any malformed or invalid entry fails the whole reply.
pub fn decode_reply(bytes: &[u8]) -> Result<Snapshot, DecodeError> {
    let mut reader = WireReader::new(bytes);
    let snapshot = read_dictionary(&mut reader)?;
    reader.finish()?;
    Ok(snapshot)
}

/// Decode an update notification into its change mask and snapshot
///
/// Unknown mask bits are ignored. Flagged keys may be absent from the
/// payload, but every known key in the payload must be flagged.
///
/// # Errors
/// Same rules as [`decode_reply`], plus [`DecodeError::MaskMismatch`].
pub fn decode_update(bytes: &[u8]) -> Result<(AttributeMask, Snapshot), DecodeError> {
    let mut reader = WireReader::new(bytes);
    expect_envelope(&mut reader, TypeTag::UInt64, "change mask")?;
    let raw = reader.read_u64()?;
    let mask = AttributeMask::from_bits_truncate(raw);
    if raw != mask.bits() {
        trace!(
            raw = format_args!("{raw:#x}"),
            "ignoring unknown change mask bits"
        );
    }

    let snapshot = read_dictionary(&mut reader)?;
    reader.finish()?;

    if let Some(key) = snapshot.values.keys().find(|key| !mask.contains(**key)) {
        return Err(DecodeError::MaskMismatch { key: *key, mask });
    }

    Ok((mask, snapshot))
}

/// Decode an attribute request into the set of requested keys
///
/// Unknown wire codes are ignored.
pub fn decode_request(bytes: &[u8]) -> Result<AttributeMask, DecodeError> {
    let mut reader = WireReader::new(bytes);
    expect_envelope(&mut reader, TypeTag::Array, "request array")?;
    let element = reader.read_u8()?;
    if element != TypeTag::UInt16.as_byte() {
        return Err(DecodeError::malformed(format!(
            "expected request elements {}, found {}",
            TypeTag::UInt16,
            describe(element)
        )));
    }

    let count = reader.read_u32()?;
    let mut mask = AttributeMask::EMPTY;
    for _ in 0..count {
        let code = reader.read_u16()?;
        match AttributeKey::from_wire_code(code) {
            Some(key) => mask.insert(key),
            None => trace!(code, "ignoring unknown requested attribute"),
        }
    }
    reader.finish()?;
    Ok(mask)
}

fn expect_envelope(
    reader: &mut WireReader<'_>,
    expected: TypeTag,
    what: &str,
) -> Result<(), DecodeError> {
    match reader.peek_tag() {
        None => Err(DecodeError::malformed(format!(
            "empty message, expected {what}"
        ))),
        Some(byte) if byte == expected.as_byte() => {
            reader.read_u8()?;
            Ok(())
        }
        Some(byte) => Err(DecodeError::malformed(format!(
            "expected {what} {expected}, found {}",
            describe(byte)
        ))),
    }
}

fn read_dictionary(reader: &mut WireReader<'_>) -> Result<Snapshot, DecodeError> {
    expect_envelope(reader, TypeTag::Array, "dictionary array")?;
    let element = reader.read_u8()?;
    if element != TypeTag::DictEntry.as_byte() {
        return Err(DecodeError::malformed(format!(
            "expected dictionary entries {}, found {}",
            TypeTag::DictEntry,
            describe(element)
        )));
    }

    let count = reader.read_u32()?;
    let mut snapshot = Snapshot::new();
    for _ in 0..count {
        if let Some((key, value)) = read_entry(reader)? {
            if !key.in_range(value) {
                return Err(DecodeError::OutOfRange { key, value });
            }
            if snapshot.insert(key, value).is_some() {
                return Err(DecodeError::DuplicateKey(key));
            }
        }
    }
    Ok(snapshot)
}

/// One dictionary entry; `None` for unknown wire codes
fn read_entry(
    reader: &mut WireReader<'_>,
) -> Result<Option<(AttributeKey, AttributeValue)>, DecodeError> {
    let key_tag = reader.read_u8()?;
    if key_tag != TypeTag::UInt16.as_byte() {
        return Err(DecodeError::WrongKeyType { found: key_tag });
    }
    let code = reader.read_u16()?;

    let value_tag = reader.read_u8()?;
    if value_tag != TypeTag::Variant.as_byte() {
        return Err(DecodeError::ExpectedVariant { found: value_tag });
    }

    let Some(key) = AttributeKey::from_wire_code(code) else {
        trace!(code, "skipping unknown attribute code");
        skip_value(reader, 0)?;
        return Ok(None);
    };

    let inner_tag = reader.read_u8()?;
    if inner_tag != TypeTag::Double.as_byte() {
        return Err(DecodeError::WrongValueType(inner_tag));
    }
    Ok(Some((key, reader.read_f64()?)))
}

fn skip_value(reader: &mut WireReader<'_>, depth: usize) -> Result<(), DecodeError> {
    let byte = reader.read_u8()?;
    let tag = TypeTag::from_byte(byte).ok_or_else(|| {
        DecodeError::malformed(format!("unknown type tag {}", describe(byte)))
    })?;
    skip_body(reader, tag, depth)
}

fn skip_body(reader: &mut WireReader<'_>, tag: TypeTag, depth: usize) -> Result<(), DecodeError> {
    if depth >= MAX_SKIP_DEPTH {
        return Err(DecodeError::malformed("value nesting too deep"));
    }
    if let Some(size) = tag.fixed_size() {
        return reader.skip(size);
    }
    match tag {
        TypeTag::String => {
            let len = reader.read_u32()? as usize;
            reader.skip(len)
        }
        TypeTag::Variant => skip_value(reader, depth + 1),
        TypeTag::Array => {
            let byte = reader.read_u8()?;
            let element = TypeTag::from_byte(byte).ok_or_else(|| {
                DecodeError::malformed(format!("unknown array element tag {}", describe(byte)))
            })?;
            let count = reader.read_u32()?;
            for _ in 0..count {
                skip_body(reader, element, depth + 1)?;
            }
            Ok(())
        }
        TypeTag::DictEntry => {
            skip_value(reader, depth + 1)?;
            skip_value(reader, depth + 1)
        }
        _ => Ok(()),
    }
}
