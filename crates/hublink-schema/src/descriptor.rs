//! Descriptor types for the compiled-in schema tables.
//!
//! A schema is a set of struct-like type descriptors plus, per message, an
//! ordered list of TLV field descriptors. The tables are plain `static`
//! data: every descriptor is `Copy`, field lists are `&'static` slices and
//! names are `&'static str`, so a whole catalogue can be declared as
//! constants and handed to [`Registry::new`](crate::Registry::new) once at
//! startup.

use std::fmt;

/// Width in bytes of a fixed-size scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarWidth {
    /// 8-bit scalar.
    One,
    /// 16-bit scalar.
    Two,
    /// 32-bit scalar.
    Four,
    /// 64-bit scalar.
    Eight,
}

impl ScalarWidth {
    /// Number of bytes the scalar occupies on the wire.
    pub const fn bytes(self) -> usize {
        match self {
            ScalarWidth::One => 1,
            ScalarWidth::Two => 2,
            ScalarWidth::Four => 4,
            ScalarWidth::Eight => 8,
        }
    }
}

/// Byte offset of a field within its containing native struct.
///
/// Offsets come in two width classes mirroring how the generated tables
/// store them: a narrow offset occupies one table byte, a wide offset two.
/// A struct whose layout crosses the 255-byte boundary switches to wide
/// offsets and must not switch back. [`Registry::new`](crate::Registry::new)
/// rejects tables that violate this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeOffset {
    value: u16,
    wide: bool,
}

impl NativeOffset {
    /// A narrow (one table byte) offset. Values above 255 are rejected when
    /// the registry is built.
    pub const fn narrow(value: u16) -> Self {
        NativeOffset { value, wide: false }
    }

    /// A wide (two table bytes) offset.
    pub const fn wide(value: u16) -> Self {
        NativeOffset { value, wide: true }
    }

    /// The offset value in bytes.
    pub const fn value(self) -> u16 {
        self.value
    }

    /// Whether this offset uses the wide table encoding.
    pub const fn is_wide(self) -> bool {
        self.wide
    }
}

impl fmt::Display for NativeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Index of a type descriptor within the registry's type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeIndex(pub u16);

impl fmt::Display for TypeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Element type of an array field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElemKind {
    /// Fixed-width scalar elements.
    Scalar(ScalarWidth),
    /// Aggregate elements laid out back to back.
    Aggregate(TypeIndex),
}

/// The closed set of field shapes the codec understands.
///
/// Variable-length fields (`Str`, `VarArray`) are laid out differently
/// depending on where they sit. As a message-level record the payload
/// extent gives the length, so nothing extra goes on the wire. Nested
/// inside an aggregate there is no extent to consult, so an inline count
/// precedes the data: one byte if the declared maximum fits in a byte, two
/// bytes little-endian otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Fixed-width unsigned scalar, little-endian on the wire.
    Scalar(ScalarWidth),
    /// Variable-length string, raw bytes with no terminator.
    Str {
        /// Longest permitted string in bytes.
        max_len: u16,
        /// Offset of the length sibling in the native struct, where the
        /// generated tables declare one. Required for nested strings.
        len_offset: Option<NativeOffset>,
    },
    /// Array with a count fixed by the schema.
    FixedArray {
        /// Element type.
        elem: ElemKind,
        /// Exact element count.
        count: u16,
    },
    /// Array with a caller-chosen count up to a declared maximum.
    VarArray {
        /// Element type.
        elem: ElemKind,
        /// Largest permitted element count.
        max_count: u16,
        /// Offset of the count sibling in the native struct, where the
        /// generated tables declare one. Required for nested arrays.
        len_offset: Option<NativeOffset>,
    },
    /// Embedded aggregate, encoded as its fields back to back with no
    /// framing of its own.
    Aggregate(TypeIndex),
}

/// Width in bytes of the inline count that precedes a nested
/// variable-length field.
pub const fn count_prefix_width(max: u16) -> usize {
    if max <= u8::MAX as u16 {
        1
    } else {
        2
    }
}

/// One field of a struct-like type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name, used in diagnostics and field paths.
    pub name: &'static str,
    /// Offset of the field in the native struct.
    pub offset: NativeOffset,
    /// Shape of the field.
    pub kind: FieldKind,
}

/// An ordered field list plus the native size of the struct it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Type name, used in diagnostics.
    pub name: &'static str,
    /// Fields in declaration order.
    pub fields: &'static [FieldDescriptor],
    /// Size in bytes of the native struct.
    pub native_size: u16,
}

/// Numeric message identifier, unique per direction.
pub type MessageId = u16;

/// Direction a message travels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host to hub.
    Request,
    /// Hub to host, answering a request.
    Response,
    /// Hub to host, unsolicited.
    Indication,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Request => write!(f, "request"),
            Direction::Response => write!(f, "response"),
            Direction::Indication => write!(f, "indication"),
        }
    }
}

/// One TLV-framed field of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvFieldDescriptor {
    /// Record tag, unique within the message.
    pub tag: u8,
    /// Whether the field may be omitted.
    pub optional: bool,
    /// Whether a record with this tag ends the scan. Exactly one field per
    /// message is terminal and it carries the highest tag.
    pub terminal: bool,
    /// Layout of the record payload.
    pub field: FieldDescriptor,
}

/// An ordered TLV field list plus the native size of the message struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDescriptor {
    /// Message name, used in diagnostics.
    pub name: &'static str,
    /// Fields in ascending tag order.
    pub fields: &'static [TlvFieldDescriptor],
    /// Size in bytes of the native message struct.
    pub native_size: u16,
}

impl MessageDescriptor {
    /// Find a field and its slot index by tag.
    pub fn field_by_tag(&self, tag: u8) -> Option<(usize, &'static TlvFieldDescriptor)> {
        self.fields.iter().enumerate().find(|(_, tf)| tf.tag == tag)
    }

    /// Find a field's slot index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|tf| tf.field.name == name)
    }
}
