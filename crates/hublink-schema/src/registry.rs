//! Schema registry: table validation and frozen lookup.
//!
//! [`Registry::new`] walks the descriptor tables once, rejects anything the
//! codec could not handle safely and precomputes wire footprints. The
//! frozen registry is immutable, so it can be shared across threads behind
//! an `Arc` with no further locking; per-call codec state lives entirely on
//! the caller's stack.

use crate::descriptor::{
    count_prefix_width, Direction, ElemKind, FieldDescriptor, FieldKind, MessageDescriptor,
    MessageId, TlvFieldDescriptor, TypeDescriptor, TypeIndex,
};
use crate::error::{LookupError, SchemaError};
use crate::service::{ServiceEntry, ServiceTable};

/// Largest payload a record's 16-bit length header can describe.
const MAX_RECORD_PAYLOAD: usize = u16::MAX as usize;

/// Precomputed wire footprint of a type in nested position, inline count
/// prefixes included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireSize {
    /// Worst-case encoded size in bytes.
    pub max: usize,
    /// Exact encoded size when the type contains no variable-length fields,
    /// `None` otherwise.
    pub fixed: Option<usize>,
}

/// A validated, frozen schema: the type table plus the service table.
#[derive(Debug)]
pub struct Registry {
    types: &'static [TypeDescriptor],
    services: ServiceTable,
    wire: Vec<WireSize>,
}

impl Registry {
    /// Validate descriptor tables and freeze them into a registry.
    ///
    /// Every structural rule the codec relies on is enforced here, so the
    /// codec itself never has to re-check the tables on a per-message
    /// basis. Returns the first violation found.
    pub fn new(
        types: &'static [TypeDescriptor],
        services: &'static [ServiceEntry],
    ) -> Result<Self, SchemaError> {
        for t in types {
            check_field_layout(t.name, t.fields.iter(), t.native_size, types.len(), true)?;
        }
        check_type_cycles(types)?;
        let wire = compute_wire_sizes(types);

        for entry in services {
            check_message(&entry.message, types, &wire)?;
        }
        let services = ServiceTable::new(services)?;

        log::debug!(
            "schema registry frozen: {} types, {} service entries",
            types.len(),
            services.len()
        );
        Ok(Registry {
            types,
            services,
            wire,
        })
    }

    /// Look up a type descriptor by index.
    pub fn type_at(&self, index: TypeIndex) -> Result<&'static TypeDescriptor, LookupError> {
        self.types
            .get(index.0 as usize)
            .ok_or(LookupError::UnknownType(index.0))
    }

    /// Look up a message descriptor by id and direction.
    pub fn message_at(
        &self,
        id: MessageId,
        direction: Direction,
    ) -> Result<&'static MessageDescriptor, LookupError> {
        Ok(&self.services.lookup(id, direction)?.message)
    }

    /// The service table.
    pub fn services(&self) -> &ServiceTable {
        &self.services
    }

    /// Precomputed nested-position wire footprint of a type.
    pub fn wire_size(&self, index: TypeIndex) -> Result<WireSize, LookupError> {
        self.wire
            .get(index.0 as usize)
            .copied()
            .ok_or(LookupError::UnknownType(index.0))
    }

    /// Number of types in the table.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}

/// The single type a field's kind can reference, if any.
fn referenced_type(kind: &FieldKind) -> Option<TypeIndex> {
    match kind {
        FieldKind::Aggregate(index) => Some(*index),
        FieldKind::FixedArray {
            elem: ElemKind::Aggregate(index),
            ..
        }
        | FieldKind::VarArray {
            elem: ElemKind::Aggregate(index),
            ..
        } => Some(*index),
        _ => None,
    }
}

/// Offset and reference discipline for one field list.
///
/// `require_count_sibling` is set for struct-like types, whose nested
/// variable-length fields must name the struct member holding their count.
/// Message-level fields take their length from the record extent, so the
/// sibling is optional there.
fn check_field_layout<'a, I>(
    owner: &'static str,
    fields: I,
    native_size: u16,
    type_count: usize,
    require_count_sibling: bool,
) -> Result<(), SchemaError>
where
    I: Iterator<Item = &'a FieldDescriptor>,
{
    let mut prev_offset: Option<u16> = None;
    let mut wide_seen = false;

    for f in fields {
        let off = f.offset;
        if !off.is_wide() && off.value() > u8::MAX as u16 {
            return Err(SchemaError::NarrowOffsetOverflow {
                owner,
                field: f.name,
                offset: off.value(),
            });
        }
        if wide_seen && !off.is_wide() {
            return Err(SchemaError::OffsetWidthRegression {
                owner,
                field: f.name,
            });
        }
        wide_seen |= off.is_wide();

        if let Some(prev) = prev_offset {
            if off.value() <= prev {
                return Err(SchemaError::NonMonotonicOffset {
                    owner,
                    field: f.name,
                    offset: off.value(),
                });
            }
        }
        prev_offset = Some(off.value());

        if off.value() >= native_size {
            return Err(SchemaError::OffsetOutOfBounds {
                owner,
                field: f.name,
                offset: off.value(),
                native_size,
            });
        }

        if let FieldKind::Str { len_offset, .. } | FieldKind::VarArray { len_offset, .. } = f.kind
        {
            match len_offset {
                Some(lo) => {
                    if !lo.is_wide() && lo.value() > u8::MAX as u16 {
                        return Err(SchemaError::NarrowOffsetOverflow {
                            owner,
                            field: f.name,
                            offset: lo.value(),
                        });
                    }
                    if lo.value() >= native_size {
                        return Err(SchemaError::OffsetOutOfBounds {
                            owner,
                            field: f.name,
                            offset: lo.value(),
                            native_size,
                        });
                    }
                    if lo.value() >= off.value() {
                        return Err(SchemaError::MisplacedCountSibling {
                            owner,
                            field: f.name,
                            len_offset: lo.value(),
                            offset: off.value(),
                        });
                    }
                }
                None if require_count_sibling => {
                    return Err(SchemaError::MissingCountSibling {
                        owner,
                        field: f.name,
                    });
                }
                None => {}
            }
        }

        if let Some(target) = referenced_type(&f.kind) {
            if target.0 as usize >= type_count {
                return Err(SchemaError::TypeIndexOutOfRange {
                    owner,
                    field: f.name,
                    index: target.0,
                    count: type_count,
                });
            }
        }
    }
    Ok(())
}

fn check_type_cycles(types: &'static [TypeDescriptor]) -> Result<(), SchemaError> {
    // 0 = unvisited, 1 = on the current path, 2 = done
    let mut state = vec![0u8; types.len()];
    for index in 0..types.len() {
        visit(types, index, &mut state)?;
    }
    Ok(())
}

fn visit(
    types: &'static [TypeDescriptor],
    index: usize,
    state: &mut [u8],
) -> Result<(), SchemaError> {
    match state[index] {
        1 => {
            return Err(SchemaError::CyclicTypeReference {
                owner: types[index].name,
            })
        }
        2 => return Ok(()),
        _ => {}
    }
    state[index] = 1;
    for f in types[index].fields {
        if let Some(target) = referenced_type(&f.kind) {
            visit(types, target.0 as usize, state)?;
        }
    }
    state[index] = 2;
    Ok(())
}

fn compute_wire_sizes(types: &'static [TypeDescriptor]) -> Vec<WireSize> {
    let mut memo: Vec<Option<WireSize>> = vec![None; types.len()];
    for index in 0..types.len() {
        type_wire_size(types, index, &mut memo);
    }
    memo.into_iter().flatten().collect()
}

fn type_wire_size(
    types: &'static [TypeDescriptor],
    index: usize,
    memo: &mut Vec<Option<WireSize>>,
) -> WireSize {
    if let Some(ws) = memo[index] {
        return ws;
    }
    let mut max = 0usize;
    let mut fixed = true;
    for f in types[index].fields {
        let (f_max, f_fixed) = field_wire_size(types, &f.kind, memo);
        max += f_max;
        fixed &= f_fixed;
    }
    let ws = WireSize {
        max,
        fixed: if fixed { Some(max) } else { None },
    };
    memo[index] = Some(ws);
    ws
}

/// Worst-case nested wire footprint of one field, inline count prefix
/// included, plus whether the footprint is exact.
fn field_wire_size(
    types: &'static [TypeDescriptor],
    kind: &FieldKind,
    memo: &mut Vec<Option<WireSize>>,
) -> (usize, bool) {
    match *kind {
        FieldKind::Scalar(width) => (width.bytes(), true),
        FieldKind::Str { max_len, .. } => (count_prefix_width(max_len) + max_len as usize, false),
        FieldKind::FixedArray { elem, count } => {
            let (e_max, e_fixed) = elem_wire_size(types, elem, memo);
            (count as usize * e_max, e_fixed)
        }
        FieldKind::VarArray {
            elem, max_count, ..
        } => {
            let (e_max, _) = elem_wire_size(types, elem, memo);
            (count_prefix_width(max_count) + max_count as usize * e_max, false)
        }
        FieldKind::Aggregate(index) => {
            let ws = type_wire_size(types, index.0 as usize, memo);
            (ws.max, ws.fixed.is_some())
        }
    }
}

fn elem_wire_size(
    types: &'static [TypeDescriptor],
    elem: ElemKind,
    memo: &mut Vec<Option<WireSize>>,
) -> (usize, bool) {
    match elem {
        ElemKind::Scalar(width) => (width.bytes(), true),
        ElemKind::Aggregate(index) => {
            let ws = type_wire_size(types, index.0 as usize, memo);
            (ws.max, ws.fixed.is_some())
        }
    }
}

/// Worst-case record payload for a message-level field. The record extent
/// replaces the inline count at the top level, so no prefix is added for
/// the field itself; prefixes inside nested aggregates still count.
fn record_payload_max(wire: &[WireSize], kind: &FieldKind) -> usize {
    match *kind {
        FieldKind::Scalar(width) => width.bytes(),
        FieldKind::Str { max_len, .. } => max_len as usize,
        FieldKind::FixedArray { elem, count } => count as usize * elem_max(wire, elem),
        FieldKind::VarArray {
            elem, max_count, ..
        } => max_count as usize * elem_max(wire, elem),
        FieldKind::Aggregate(index) => wire[index.0 as usize].max,
    }
}

fn elem_max(wire: &[WireSize], elem: ElemKind) -> usize {
    match elem {
        ElemKind::Scalar(width) => width.bytes(),
        ElemKind::Aggregate(index) => wire[index.0 as usize].max,
    }
}

fn elem_fixed(wire: &[WireSize], elem: ElemKind) -> bool {
    match elem {
        ElemKind::Scalar(_) => true,
        ElemKind::Aggregate(index) => wire[index.0 as usize].fixed.is_some(),
    }
}

fn check_message(
    msg: &MessageDescriptor,
    types: &'static [TypeDescriptor],
    wire: &[WireSize],
) -> Result<(), SchemaError> {
    check_field_layout(
        msg.name,
        msg.fields.iter().map(|tf: &TlvFieldDescriptor| &tf.field),
        msg.native_size,
        types.len(),
        false,
    )?;

    let last = match msg.fields.last() {
        Some(last) => last,
        None => return Err(SchemaError::MissingTerminal { message: msg.name }),
    };
    if !last.terminal {
        return Err(SchemaError::MissingTerminal { message: msg.name });
    }

    let mut prev_tag: Option<u8> = None;
    for tf in msg.fields {
        if let Some(prev) = prev_tag {
            if tf.tag <= prev {
                return Err(SchemaError::NonAscendingTag {
                    message: msg.name,
                    tag: tf.tag,
                });
            }
        }
        prev_tag = Some(tf.tag);

        if tf.terminal && tf.tag != last.tag {
            return Err(SchemaError::MisplacedTerminal {
                message: msg.name,
                field: tf.field.name,
            });
        }

        let payload_max = record_payload_max(wire, &tf.field.kind);
        if payload_max > MAX_RECORD_PAYLOAD {
            return Err(SchemaError::RecordOverflow {
                message: msg.name,
                tag: tf.tag,
                size: payload_max,
                max: MAX_RECORD_PAYLOAD,
            });
        }

        if let FieldKind::VarArray { elem, .. } = tf.field.kind {
            if !elem_fixed(wire, elem) {
                return Err(SchemaError::UnderivableCount {
                    message: msg.name,
                    tag: tf.tag,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{NativeOffset, ScalarWidth};

    // A small catalogue exercising every descriptor shape: a fixed scalar
    // struct, a struct embedding it, and a variable-length struct on top.
    static GPS_FIX_FIELDS: [FieldDescriptor; 3] = [
        FieldDescriptor {
            name: "lat",
            offset: NativeOffset::narrow(0),
            kind: FieldKind::Scalar(ScalarWidth::Four),
        },
        FieldDescriptor {
            name: "lon",
            offset: NativeOffset::narrow(4),
            kind: FieldKind::Scalar(ScalarWidth::Four),
        },
        FieldDescriptor {
            name: "alt",
            offset: NativeOffset::narrow(8),
            kind: FieldKind::Scalar(ScalarWidth::Two),
        },
    ];

    static TRACK_POINT_FIELDS: [FieldDescriptor; 2] = [
        FieldDescriptor {
            name: "fix",
            offset: NativeOffset::narrow(0),
            kind: FieldKind::Aggregate(TypeIndex(0)),
        },
        FieldDescriptor {
            name: "flags",
            offset: NativeOffset::narrow(12),
            kind: FieldKind::Scalar(ScalarWidth::One),
        },
    ];

    static TRACK_FIELDS: [FieldDescriptor; 2] = [
        FieldDescriptor {
            name: "name",
            offset: NativeOffset::narrow(1),
            kind: FieldKind::Str {
                max_len: 12,
                len_offset: Some(NativeOffset::narrow(0)),
            },
        },
        FieldDescriptor {
            name: "points",
            offset: NativeOffset::narrow(16),
            kind: FieldKind::VarArray {
                elem: ElemKind::Aggregate(TypeIndex(1)),
                max_count: 4,
                len_offset: Some(NativeOffset::narrow(14)),
            },
        },
    ];

    static TYPES: [TypeDescriptor; 3] = [
        TypeDescriptor {
            name: "gps_fix",
            fields: &GPS_FIX_FIELDS,
            native_size: 12,
        },
        TypeDescriptor {
            name: "track_point",
            fields: &TRACK_POINT_FIELDS,
            native_size: 16,
        },
        TypeDescriptor {
            name: "track",
            fields: &TRACK_FIELDS,
            native_size: 64,
        },
    ];

    static UPLOAD_FIELDS: [TlvFieldDescriptor; 2] = [
        TlvFieldDescriptor {
            tag: 0x01,
            optional: false,
            terminal: false,
            field: FieldDescriptor {
                name: "track",
                offset: NativeOffset::narrow(0),
                kind: FieldKind::Aggregate(TypeIndex(2)),
            },
        },
        TlvFieldDescriptor {
            tag: 0x10,
            optional: true,
            terminal: true,
            field: FieldDescriptor {
                name: "timestamp",
                offset: NativeOffset::narrow(64),
                kind: FieldKind::Scalar(ScalarWidth::Eight),
            },
        },
    ];

    static SERVICES: [ServiceEntry; 1] = [ServiceEntry {
        message_id: 0x0030,
        direction: Direction::Request,
        message: MessageDescriptor {
            name: "track_upload",
            fields: &UPLOAD_FIELDS,
            native_size: 80,
        },
        max_encoded_size: 128,
    }];

    #[test]
    fn test_registry_accepts_valid_tables() {
        let registry = Registry::new(&TYPES, &SERVICES).unwrap();
        assert_eq!(registry.type_count(), 3);
        assert_eq!(registry.services().len(), 1);
        assert_eq!(registry.type_at(TypeIndex(1)).unwrap().name, "track_point");
        assert_eq!(
            registry
                .message_at(0x0030, Direction::Request)
                .unwrap()
                .name,
            "track_upload"
        );
    }

    #[test]
    fn test_registry_rejects_unknown_lookups() {
        let registry = Registry::new(&TYPES, &SERVICES).unwrap();
        assert_eq!(
            registry.type_at(TypeIndex(3)).unwrap_err(),
            LookupError::UnknownType(3)
        );
        assert_eq!(
            registry
                .message_at(0x0030, Direction::Response)
                .unwrap_err(),
            LookupError::UnknownMessage {
                id: 0x0030,
                direction: Direction::Response,
            }
        );
    }

    #[test]
    fn test_wire_sizes() {
        let registry = Registry::new(&TYPES, &SERVICES).unwrap();

        // gps_fix: 4 + 4 + 2, all fixed
        assert_eq!(
            registry.wire_size(TypeIndex(0)).unwrap(),
            WireSize {
                max: 10,
                fixed: Some(10),
            }
        );
        // track_point: gps_fix + flags byte
        assert_eq!(
            registry.wire_size(TypeIndex(1)).unwrap(),
            WireSize {
                max: 11,
                fixed: Some(11),
            }
        );
        // track: (1 + 12) for the name, (1 + 4 * 11) for the points
        assert_eq!(
            registry.wire_size(TypeIndex(2)).unwrap(),
            WireSize {
                max: 58,
                fixed: None,
            }
        );
    }

    static NARROW_OVERFLOW_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor {
        name: "tail",
        offset: NativeOffset::narrow(300),
        kind: FieldKind::Scalar(ScalarWidth::One),
    }];

    #[test]
    fn test_rejects_narrow_offset_above_255() {
        static TYPES: [TypeDescriptor; 1] = [TypeDescriptor {
            name: "big",
            fields: &NARROW_OVERFLOW_FIELDS,
            native_size: 400,
        }];
        let err = Registry::new(&TYPES, &[]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::NarrowOffsetOverflow {
                owner: "big",
                field: "tail",
                offset: 300,
            }
        );
    }

    static WIDTH_REGRESSION_FIELDS: [FieldDescriptor; 2] = [
        FieldDescriptor {
            name: "head",
            offset: NativeOffset::wide(100),
            kind: FieldKind::Scalar(ScalarWidth::One),
        },
        FieldDescriptor {
            name: "tail",
            offset: NativeOffset::narrow(120),
            kind: FieldKind::Scalar(ScalarWidth::One),
        },
    ];

    #[test]
    fn test_rejects_narrow_offset_after_wide() {
        static TYPES: [TypeDescriptor; 1] = [TypeDescriptor {
            name: "mixed",
            fields: &WIDTH_REGRESSION_FIELDS,
            native_size: 200,
        }];
        let err = Registry::new(&TYPES, &[]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::OffsetWidthRegression {
                owner: "mixed",
                field: "tail",
            }
        );
    }

    static STALLED_FIELDS: [FieldDescriptor; 2] = [
        FieldDescriptor {
            name: "a",
            offset: NativeOffset::narrow(4),
            kind: FieldKind::Scalar(ScalarWidth::Four),
        },
        FieldDescriptor {
            name: "b",
            offset: NativeOffset::narrow(4),
            kind: FieldKind::Scalar(ScalarWidth::Four),
        },
    ];

    #[test]
    fn test_rejects_non_monotonic_offsets() {
        static TYPES: [TypeDescriptor; 1] = [TypeDescriptor {
            name: "stalled",
            fields: &STALLED_FIELDS,
            native_size: 16,
        }];
        let err = Registry::new(&TYPES, &[]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::NonMonotonicOffset {
                owner: "stalled",
                field: "b",
                offset: 4,
            }
        );
    }

    static OUT_OF_BOUNDS_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor {
        name: "beyond",
        offset: NativeOffset::narrow(12),
        kind: FieldKind::Scalar(ScalarWidth::One),
    }];

    #[test]
    fn test_rejects_offset_outside_native_size() {
        static TYPES: [TypeDescriptor; 1] = [TypeDescriptor {
            name: "short",
            fields: &OUT_OF_BOUNDS_FIELDS,
            native_size: 12,
        }];
        let err = Registry::new(&TYPES, &[]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::OffsetOutOfBounds {
                owner: "short",
                field: "beyond",
                offset: 12,
                native_size: 12,
            }
        );
    }

    static NO_SIBLING_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor {
        name: "label",
        offset: NativeOffset::narrow(0),
        kind: FieldKind::Str {
            max_len: 8,
            len_offset: None,
        },
    }];

    #[test]
    fn test_rejects_nested_var_field_without_sibling() {
        static TYPES: [TypeDescriptor; 1] = [TypeDescriptor {
            name: "bare",
            fields: &NO_SIBLING_FIELDS,
            native_size: 16,
        }];
        let err = Registry::new(&TYPES, &[]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingCountSibling {
                owner: "bare",
                field: "label",
            }
        );
    }

    static LATE_SIBLING_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor {
        name: "label",
        offset: NativeOffset::narrow(2),
        kind: FieldKind::Str {
            max_len: 8,
            len_offset: Some(NativeOffset::narrow(6)),
        },
    }];

    #[test]
    fn test_rejects_sibling_that_follows_its_field() {
        static TYPES: [TypeDescriptor; 1] = [TypeDescriptor {
            name: "backwards",
            fields: &LATE_SIBLING_FIELDS,
            native_size: 16,
        }];
        let err = Registry::new(&TYPES, &[]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MisplacedCountSibling {
                owner: "backwards",
                field: "label",
                len_offset: 6,
                offset: 2,
            }
        );
    }

    static DANGLING_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor {
        name: "inner",
        offset: NativeOffset::narrow(0),
        kind: FieldKind::Aggregate(TypeIndex(9)),
    }];

    #[test]
    fn test_rejects_type_index_out_of_range() {
        static TYPES: [TypeDescriptor; 1] = [TypeDescriptor {
            name: "dangling",
            fields: &DANGLING_FIELDS,
            native_size: 8,
        }];
        let err = Registry::new(&TYPES, &[]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::TypeIndexOutOfRange {
                owner: "dangling",
                field: "inner",
                index: 9,
                count: 1,
            }
        );
    }

    static CYCLE_A_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor {
        name: "b",
        offset: NativeOffset::narrow(0),
        kind: FieldKind::Aggregate(TypeIndex(1)),
    }];

    static CYCLE_B_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor {
        name: "a",
        offset: NativeOffset::narrow(0),
        kind: FieldKind::Aggregate(TypeIndex(0)),
    }];

    #[test]
    fn test_rejects_type_reference_cycle() {
        static TYPES: [TypeDescriptor; 2] = [
            TypeDescriptor {
                name: "cycle_a",
                fields: &CYCLE_A_FIELDS,
                native_size: 8,
            },
            TypeDescriptor {
                name: "cycle_b",
                fields: &CYCLE_B_FIELDS,
                native_size: 8,
            },
        ];
        let err = Registry::new(&TYPES, &[]).unwrap_err();
        assert!(matches!(err, SchemaError::CyclicTypeReference { .. }));
    }

    #[test]
    fn test_rejects_non_ascending_tags() {
        static FIELDS: [TlvFieldDescriptor; 2] = [
            TlvFieldDescriptor {
                tag: 0x05,
                optional: false,
                terminal: false,
                field: FieldDescriptor {
                    name: "first",
                    offset: NativeOffset::narrow(0),
                    kind: FieldKind::Scalar(ScalarWidth::One),
                },
            },
            TlvFieldDescriptor {
                tag: 0x03,
                optional: false,
                terminal: true,
                field: FieldDescriptor {
                    name: "second",
                    offset: NativeOffset::narrow(1),
                    kind: FieldKind::Scalar(ScalarWidth::One),
                },
            },
        ];
        static SERVICES: [ServiceEntry; 1] = [ServiceEntry {
            message_id: 0x0001,
            direction: Direction::Request,
            message: MessageDescriptor {
                name: "shuffled",
                fields: &FIELDS,
                native_size: 4,
            },
            max_encoded_size: 32,
        }];
        let err = Registry::new(&[], &SERVICES).unwrap_err();
        assert_eq!(
            err,
            SchemaError::NonAscendingTag {
                message: "shuffled",
                tag: 0x03,
            }
        );
    }

    #[test]
    fn test_rejects_message_without_terminal() {
        static FIELDS: [TlvFieldDescriptor; 1] = [TlvFieldDescriptor {
            tag: 0x01,
            optional: false,
            terminal: false,
            field: FieldDescriptor {
                name: "only",
                offset: NativeOffset::narrow(0),
                kind: FieldKind::Scalar(ScalarWidth::One),
            },
        }];
        static SERVICES: [ServiceEntry; 1] = [ServiceEntry {
            message_id: 0x0001,
            direction: Direction::Request,
            message: MessageDescriptor {
                name: "open_ended",
                fields: &FIELDS,
                native_size: 4,
            },
            max_encoded_size: 32,
        }];
        let err = Registry::new(&[], &SERVICES).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingTerminal {
                message: "open_ended",
            }
        );
    }

    #[test]
    fn test_rejects_terminal_below_highest_tag() {
        static FIELDS: [TlvFieldDescriptor; 2] = [
            TlvFieldDescriptor {
                tag: 0x01,
                optional: false,
                terminal: true,
                field: FieldDescriptor {
                    name: "early",
                    offset: NativeOffset::narrow(0),
                    kind: FieldKind::Scalar(ScalarWidth::One),
                },
            },
            TlvFieldDescriptor {
                tag: 0x02,
                optional: false,
                terminal: true,
                field: FieldDescriptor {
                    name: "late",
                    offset: NativeOffset::narrow(1),
                    kind: FieldKind::Scalar(ScalarWidth::One),
                },
            },
        ];
        static SERVICES: [ServiceEntry; 1] = [ServiceEntry {
            message_id: 0x0001,
            direction: Direction::Request,
            message: MessageDescriptor {
                name: "double_stop",
                fields: &FIELDS,
                native_size: 4,
            },
            max_encoded_size: 32,
        }];
        let err = Registry::new(&[], &SERVICES).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MisplacedTerminal {
                message: "double_stop",
                field: "early",
            }
        );
    }

    #[test]
    fn test_rejects_record_payload_overflow() {
        static FIELDS: [TlvFieldDescriptor; 1] = [TlvFieldDescriptor {
            tag: 0x01,
            optional: false,
            terminal: true,
            field: FieldDescriptor {
                name: "samples",
                offset: NativeOffset::narrow(0),
                kind: FieldKind::VarArray {
                    elem: ElemKind::Scalar(ScalarWidth::Eight),
                    max_count: 10000,
                    len_offset: None,
                },
            },
        }];
        static SERVICES: [ServiceEntry; 1] = [ServiceEntry {
            message_id: 0x0001,
            direction: Direction::Request,
            message: MessageDescriptor {
                name: "firehose",
                fields: &FIELDS,
                native_size: 4,
            },
            max_encoded_size: 65536,
        }];
        let err = Registry::new(&[], &SERVICES).unwrap_err();
        assert_eq!(
            err,
            SchemaError::RecordOverflow {
                message: "firehose",
                tag: 0x01,
                size: 80000,
                max: 65535,
            }
        );
    }

    static VAR_INNER_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor {
        name: "note",
        offset: NativeOffset::narrow(1),
        kind: FieldKind::Str {
            max_len: 10,
            len_offset: Some(NativeOffset::narrow(0)),
        },
    }];

    #[test]
    fn test_rejects_extent_count_over_variable_elements() {
        static TYPES: [TypeDescriptor; 1] = [TypeDescriptor {
            name: "annotated",
            fields: &VAR_INNER_FIELDS,
            native_size: 12,
        }];
        static FIELDS: [TlvFieldDescriptor; 1] = [TlvFieldDescriptor {
            tag: 0x01,
            optional: false,
            terminal: true,
            field: FieldDescriptor {
                name: "notes",
                offset: NativeOffset::narrow(0),
                kind: FieldKind::VarArray {
                    elem: ElemKind::Aggregate(TypeIndex(0)),
                    max_count: 3,
                    len_offset: None,
                },
            },
        }];
        static SERVICES: [ServiceEntry; 1] = [ServiceEntry {
            message_id: 0x0001,
            direction: Direction::Request,
            message: MessageDescriptor {
                name: "note_batch",
                fields: &FIELDS,
                native_size: 40,
            },
            max_encoded_size: 64,
        }];
        let err = Registry::new(&TYPES, &SERVICES).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnderivableCount {
                message: "note_batch",
                tag: 0x01,
            }
        );
    }

    #[test]
    fn test_message_offsets_follow_struct_rules() {
        static FIELDS: [TlvFieldDescriptor; 2] = [
            scalar_field_at("a", 0x01, 8),
            scalar_field_at("b", 0x02, 2),
        ];
        static SERVICES: [ServiceEntry; 1] = [ServiceEntry {
            message_id: 0x0001,
            direction: Direction::Request,
            message: MessageDescriptor {
                name: "rewound",
                fields: &FIELDS,
                native_size: 16,
            },
            max_encoded_size: 32,
        }];
        let err = Registry::new(&[], &SERVICES).unwrap_err();
        assert_eq!(
            err,
            SchemaError::NonMonotonicOffset {
                owner: "rewound",
                field: "b",
                offset: 2,
            }
        );
    }

    const fn scalar_field_at(name: &'static str, tag: u8, offset: u16) -> TlvFieldDescriptor {
        TlvFieldDescriptor {
            tag,
            optional: false,
            terminal: tag == 0x02,
            field: FieldDescriptor {
                name,
                offset: NativeOffset::narrow(offset),
                kind: FieldKind::Scalar(ScalarWidth::One),
            },
        }
    }
}
