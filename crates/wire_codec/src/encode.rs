//! Message encoders

use bytes::{Bytes, BytesMut};
use contracts::{AttributeMask, Snapshot};

use crate::tag::TypeTag;
use crate::value::{encode_value, WireValue};

/// Encode an attribute request: fixed-size array of uint16 wire codes
///
/// An empty mask yields an empty array.
pub fn encode_request(keys: AttributeMask) -> Bytes {
    WireValue::Array {
        element: TypeTag::UInt16,
        items: keys
            .iter()
            .map(|key| WireValue::UInt16(key.wire_code()))
            .collect(),
    }
    .to_bytes()
}

/// Encode a reply dictionary `code → variant(double)`
pub fn encode_reply(snapshot: &Snapshot) -> Bytes {
    snapshot_dict(snapshot).to_bytes()
}

/// Encode an update notification: change mask followed by the dictionary
///
/// Values are written as given. A snapshot holding keys outside `mask`
/// produces a message that consumers reject.
pub fn encode_update(mask: AttributeMask, snapshot: &Snapshot) -> Bytes {
    let mut buf = BytesMut::new();
    encode_value(&WireValue::UInt64(mask.bits()), &mut buf);
    encode_value(&snapshot_dict(snapshot), &mut buf);
    buf.freeze()
}

fn snapshot_dict(snapshot: &Snapshot) -> WireValue {
    WireValue::dict(
        snapshot
            .iter()
            .map(|(key, value)| {
                WireValue::entry(
                    WireValue::UInt16(key.wire_code()),
                    WireValue::variant(WireValue::Double(value)),
                )
            })
            .collect(),
    )
}
