//! # Wire Codec
//!
//! Encoding and decoding of position-attribute messages.
//!
//! Every value on the wire is a one-byte type tag followed by its body
//! (little-endian). Tags reuse the bus type codes (`q` uint16, `t` uint64,
//! `d` double, `v` variant, `a` array, `e` dict entry, ...).
//!
//! | Message      | Shape                                    |
//! |--------------|------------------------------------------|
//! | Request      | `a` of `q` wire codes                    |
//! | Reply        | `a` of `e` : `q` code → `v` of `d` value |
//! | Notification | `t` change mask, then a reply dictionary |
//!
//! Decoding is pure: no I/O, no shared state. A single invalid field fails
//! the whole message.
//!
//! ## Example
//!
//! ```
//! use contracts::{AttributeKey, Snapshot};
//! use wire_codec::{decode_reply, encode_reply};
//!
//! let snapshot = Snapshot::new().with(AttributeKey::Latitude, 47.31608607);
//! let bytes = encode_reply(&snapshot);
//! assert_eq!(decode_reply(&bytes).unwrap(), snapshot);
//! ```

mod decode;
mod encode;
mod error;
mod reader;
mod tag;
mod value;

pub use decode::{decode_reply, decode_request, decode_update};
pub use encode::{encode_reply, encode_request, encode_update};
pub use error::DecodeError;
pub use tag::TypeTag;
pub use value::{encode_value, WireValue};
