//! Codec error types.

use std::fmt;

use hublink_schema::LookupError;
use thiserror::Error;

/// One step of a field path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment {
    /// A named field.
    Field(&'static str),
    /// An array element.
    Index(usize),
}

/// Dotted path from the message root to the field a diagnostic refers to,
/// such as `track.points[2].fix.lat`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// An empty path. Displays as `record`; used for diagnostics raised
    /// before a record has been matched to a field.
    pub fn root() -> Self {
        FieldPath::default()
    }

    /// A path starting at a named message field.
    pub fn from_field(name: &'static str) -> Self {
        FieldPath {
            segments: vec![PathSegment::Field(name)],
        }
    }

    pub(crate) fn push_field(&mut self, name: &'static str) {
        self.segments.push(PathSegment::Field(name));
    }

    pub(crate) fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub(crate) fn pop(&mut self) {
        self.segments.pop();
    }

    /// Segments from the message root outward.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "record");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Errors raised while decoding a message body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The registry has no entry for the requested message or type.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The input ended inside a record or value.
    #[error("truncated input at {path}, offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        /// Field the read belonged to.
        path: FieldPath,
        /// Byte offset of the failed read within the message body.
        offset: usize,
        /// Bytes the read required.
        needed: usize,
        /// Bytes that were left.
        available: usize,
    },

    /// A mandatory field had no record in the input.
    #[error("message {message}: mandatory field {field} (tag 0x{tag:02X}) missing from input")]
    MissingMandatoryField {
        /// Message name.
        message: &'static str,
        /// Missing field name.
        field: &'static str,
        /// Tag the record would have carried.
        tag: u8,
    },

    /// An array record carried more elements than the schema permits.
    #[error("array too long at {path}, offset {offset}: {count} elements, maximum {max}")]
    ArrayTooLong {
        /// Field the array belongs to.
        path: FieldPath,
        /// Byte offset of the array within the message body.
        offset: usize,
        /// Element count found.
        count: usize,
        /// Largest permitted count.
        max: usize,
    },

    /// A string carried more bytes than the schema permits.
    #[error("field too long at {path}, offset {offset}: {len} bytes, maximum {max}")]
    FieldTooLong {
        /// Field the string belongs to.
        path: FieldPath,
        /// Byte offset of the string within the message body.
        offset: usize,
        /// Byte length found.
        len: usize,
        /// Largest permitted length.
        max: usize,
    },
}

/// Errors raised while encoding a message body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The registry has no entry for the requested message or type.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// A mandatory field slot held no value.
    #[error("message {message}: mandatory field {field} (tag 0x{tag:02X}) has no value")]
    MissingMandatoryField {
        /// Message name.
        message: &'static str,
        /// Unset field name.
        field: &'static str,
        /// Tag the record would have carried.
        tag: u8,
    },

    /// The encoded body outgrew the service entry's ceiling.
    #[error("encoded message reached {size} bytes, above the declared maximum {max}")]
    MessageTooLarge {
        /// Encoded size at the point the ceiling was crossed.
        size: usize,
        /// Declared ceiling.
        max: usize,
    },

    /// A value array holds more elements than the schema permits.
    #[error("array too long at {path}, offset {offset}: {count} elements, maximum {max}")]
    ArrayTooLong {
        /// Field the array belongs to.
        path: FieldPath,
        /// Byte offset the array would start at in the output.
        offset: usize,
        /// Element count supplied.
        count: usize,
        /// Largest permitted count.
        max: usize,
    },

    /// A value string holds more bytes than the schema permits.
    #[error("field too long at {path}, offset {offset}: {len} bytes, maximum {max}")]
    FieldTooLong {
        /// Field the string belongs to.
        path: FieldPath,
        /// Byte offset the string would start at in the output.
        offset: usize,
        /// Byte length supplied.
        len: usize,
        /// Largest permitted length.
        max: usize,
    },

    /// A value's shape does not match its descriptor.
    #[error("value shape mismatch at {path}: descriptor expects {expected}, value is {found}")]
    ValueMismatch {
        /// Field the value belongs to.
        path: FieldPath,
        /// What the descriptor called for.
        expected: String,
        /// What the value actually is.
        found: String,
    },
}
