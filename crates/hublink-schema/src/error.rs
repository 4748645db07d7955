//! Schema error types.

use thiserror::Error;

use crate::descriptor::Direction;

/// Errors raised while validating descriptor tables during registry
/// construction. Each one identifies the offending type or message by name
/// so a bad generated table can be traced back to its source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A narrow offset carries a value that does not fit in one table byte.
    #[error("type {owner}: field {field} has narrow offset {offset}, above 255")]
    NarrowOffsetOverflow {
        /// Type or message that declares the field.
        owner: &'static str,
        /// Field name.
        field: &'static str,
        /// Declared offset value.
        offset: u16,
    },

    /// A narrow offset appears after a wide one in the same struct.
    #[error("type {owner}: field {field} reverts to a narrow offset after a wide one")]
    OffsetWidthRegression {
        /// Type or message that declares the field.
        owner: &'static str,
        /// Field name.
        field: &'static str,
    },

    /// Field offsets are not strictly increasing.
    #[error("type {owner}: field {field} offset {offset} does not advance past the previous field")]
    NonMonotonicOffset {
        /// Type or message that declares the field.
        owner: &'static str,
        /// Field name.
        field: &'static str,
        /// Declared offset value.
        offset: u16,
    },

    /// An offset points at or past the end of the native struct.
    #[error("type {owner}: field {field} offset {offset} is outside the native size {native_size}")]
    OffsetOutOfBounds {
        /// Type or message that declares the field.
        owner: &'static str,
        /// Field name.
        field: &'static str,
        /// Declared offset value.
        offset: u16,
        /// Declared native size of the struct.
        native_size: u16,
    },

    /// A nested variable-length field has no count sibling.
    #[error("type {owner}: field {field} is variable-length but declares no count sibling")]
    MissingCountSibling {
        /// Type that declares the field.
        owner: &'static str,
        /// Field name.
        field: &'static str,
    },

    /// A count sibling does not precede the field it counts.
    #[error("type {owner}: field {field} count sibling at offset {len_offset} does not precede the field at offset {offset}")]
    MisplacedCountSibling {
        /// Type or message that declares the field.
        owner: &'static str,
        /// Field name.
        field: &'static str,
        /// Declared count sibling offset.
        len_offset: u16,
        /// Declared field offset.
        offset: u16,
    },

    /// A field references a type index outside the type table.
    #[error("type {owner}: field {field} references type index {index}, table has {count} types")]
    TypeIndexOutOfRange {
        /// Type or message that declares the field.
        owner: &'static str,
        /// Field name.
        field: &'static str,
        /// Referenced type index.
        index: u16,
        /// Number of types in the table.
        count: usize,
    },

    /// Aggregate references form a cycle.
    #[error("type {owner} participates in a type reference cycle")]
    CyclicTypeReference {
        /// A type on the cycle.
        owner: &'static str,
    },

    /// Message tags are not strictly ascending.
    #[error("message {message}: tag 0x{tag:02X} does not ascend past the previous tag")]
    NonAscendingTag {
        /// Message name.
        message: &'static str,
        /// Offending tag.
        tag: u8,
    },

    /// A message declares no terminal field.
    #[error("message {message} has no terminal field")]
    MissingTerminal {
        /// Message name.
        message: &'static str,
    },

    /// A field other than the highest-tagged one is marked terminal.
    #[error("message {message}: field {field} is terminal but does not carry the highest tag")]
    MisplacedTerminal {
        /// Message name.
        message: &'static str,
        /// Offending field name.
        field: &'static str,
    },

    /// A record payload can outgrow the 16-bit length header.
    #[error("message {message}: tag 0x{tag:02X} payload can reach {size} bytes, above the {max} byte record limit")]
    RecordOverflow {
        /// Message name.
        message: &'static str,
        /// Offending tag.
        tag: u8,
        /// Worst-case payload size.
        size: usize,
        /// Largest payload a record length can describe.
        max: usize,
    },

    /// A message-level array count cannot be derived from the record extent.
    #[error("message {message}: tag 0x{tag:02X} count cannot be derived from the record extent, elements are variable-size")]
    UnderivableCount {
        /// Message name.
        message: &'static str,
        /// Offending tag.
        tag: u8,
    },

    /// Two service entries share a message id and direction.
    #[error("duplicate service entry for {direction} message 0x{message_id:04X}")]
    DuplicateService {
        /// Duplicated message id.
        message_id: u16,
        /// Duplicated direction.
        direction: Direction,
    },
}

/// Errors raised when a lookup against a frozen registry misses.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    /// No type descriptor at the given index.
    #[error("unknown type index {0}")]
    UnknownType(u16),

    /// No service entry for the given message id and direction.
    #[error("unknown {direction} message 0x{id:04X}")]
    UnknownMessage {
        /// Requested message id.
        id: u16,
        /// Requested direction.
        direction: Direction,
    },
}
