//! HubLink TLV Message Codec
//!
//! This crate encodes and decodes HubLink message bodies: the TLV record
//! streams exchanged between a host and its hub co-processor. It is driven
//! entirely by a frozen [`Registry`](hublink_schema::Registry) from the
//! `hublink-schema` crate; no per-message Rust types exist, so a schema
//! update never touches codec code.
//!
//! # Codec Overview
//!
//! - **Bodies** are record sequences. Each record is a 1-byte tag, a
//!   2-byte big-endian length and a payload. Scalars inside payloads are
//!   little-endian.
//! - **Values** travel as an owned [`Value`] tree inside a
//!   [`MessageValue`], one slot per descriptor field. `None` slots mean an
//!   optional field is absent.
//! - **Tolerance**: unknown tags are skipped, duplicate tags take the last
//!   value, records may outgrow the width a field needs, and a terminal
//!   tag ends the scan early. Anything else wrong in the input surfaces as
//!   a [`DecodeError`] naming the field path and byte offset.
//!
//! # Example
//!
//! ```rust,ignore
//! use hublink_codec::{decode_message, encode_message, MessageValue, Value};
//! use hublink_schema::Direction;
//!
//! let mut body = MessageValue::new(2);
//! body.set(0, Value::U32(42));
//! let bytes = encode_message(&registry, 0x0021, Direction::Response, &body)?;
//! let decoded = decode_message(&registry, 0x0021, Direction::Response, &bytes)?;
//! ```

pub mod constants;
mod error;
mod field;
mod message;
mod value;
mod wire;

pub use error::*;
pub use message::*;
pub use value::*;
