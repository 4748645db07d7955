//! Field-level encode and decode.
//!
//! A field's wire layout depends on where it sits. As a message-level
//! record the payload extent bounds it, so variable-length data carries no
//! inline count. Nested inside an aggregate the extent is gone: strings
//! and variable arrays carry an inline count (one byte, or two bytes
//! little-endian when the declared maximum needs them) and everything else
//! is laid back to back with no framing of its own.

use bytes::BufMut;
use hublink_schema::{
    count_prefix_width, ElemKind, FieldDescriptor, FieldKind, Registry, ScalarWidth, TypeIndex,
};

use crate::error::{DecodeError, EncodeError, FieldPath};
use crate::value::Value;
use crate::wire::Reader;

// ============================================================================
// Encoding
// ============================================================================

/// Encode one field value. Message-level records pass `nested = false`;
/// aggregate interiors pass `true` to get inline counts.
pub(crate) fn encode_field(
    registry: &Registry,
    field: &FieldDescriptor,
    value: &Value,
    nested: bool,
    out: &mut Vec<u8>,
    path: &mut FieldPath,
) -> Result<(), EncodeError> {
    match field.kind {
        FieldKind::Scalar(width) => encode_scalar(width, value, out, path),
        FieldKind::Str { max_len, .. } => {
            let s = match value {
                Value::Str(s) => s,
                _ => return Err(mismatch(path, "string", value)),
            };
            if s.len() > max_len as usize {
                return Err(EncodeError::FieldTooLong {
                    path: path.clone(),
                    offset: out.len(),
                    len: s.len(),
                    max: max_len as usize,
                });
            }
            if nested {
                put_count(out, s.len(), max_len);
            }
            out.put_slice(s.as_bytes());
            Ok(())
        }
        FieldKind::FixedArray { elem, count } => {
            let items = match value {
                Value::Array(items) => items,
                _ => return Err(mismatch(path, format!("array of {} elements", count), value)),
            };
            if items.len() != count as usize {
                return Err(EncodeError::ValueMismatch {
                    path: path.clone(),
                    expected: format!("array of {} elements", count),
                    found: format!("array of {} elements", items.len()),
                });
            }
            encode_elems(registry, elem, items, out, path)
        }
        FieldKind::VarArray {
            elem, max_count, ..
        } => {
            let items = match value {
                Value::Array(items) => items,
                _ => return Err(mismatch(path, "array", value)),
            };
            if items.len() > max_count as usize {
                return Err(EncodeError::ArrayTooLong {
                    path: path.clone(),
                    offset: out.len(),
                    count: items.len(),
                    max: max_count as usize,
                });
            }
            if nested {
                put_count(out, items.len(), max_count);
            }
            encode_elems(registry, elem, items, out, path)
        }
        FieldKind::Aggregate(index) => encode_struct(registry, index, value, out, path),
    }
}

fn encode_scalar(
    width: ScalarWidth,
    value: &Value,
    out: &mut Vec<u8>,
    path: &FieldPath,
) -> Result<(), EncodeError> {
    match (width, value) {
        (ScalarWidth::One, Value::U8(v)) => out.put_u8(*v),
        (ScalarWidth::Two, Value::U16(v)) => out.put_u16_le(*v),
        (ScalarWidth::Four, Value::U32(v)) => out.put_u32_le(*v),
        (ScalarWidth::Eight, Value::U64(v)) => out.put_u64_le(*v),
        _ => return Err(mismatch(path, scalar_name(width), value)),
    }
    Ok(())
}

fn encode_elems(
    registry: &Registry,
    elem: ElemKind,
    items: &[Value],
    out: &mut Vec<u8>,
    path: &mut FieldPath,
) -> Result<(), EncodeError> {
    for (i, item) in items.iter().enumerate() {
        path.push_index(i);
        let result = match elem {
            ElemKind::Scalar(width) => encode_scalar(width, item, out, path),
            ElemKind::Aggregate(index) => encode_struct(registry, index, item, out, path),
        };
        path.pop();
        result?;
    }
    Ok(())
}

fn encode_struct(
    registry: &Registry,
    index: TypeIndex,
    value: &Value,
    out: &mut Vec<u8>,
    path: &mut FieldPath,
) -> Result<(), EncodeError> {
    let desc = registry.type_at(index)?;
    let fields = match value {
        Value::Struct(fields) => fields,
        _ => return Err(mismatch(path, format!("struct {}", desc.name), value)),
    };
    if fields.len() != desc.fields.len() {
        return Err(EncodeError::ValueMismatch {
            path: path.clone(),
            expected: format!("struct {} with {} fields", desc.name, desc.fields.len()),
            found: format!("struct with {} fields", fields.len()),
        });
    }
    for (f, v) in desc.fields.iter().zip(fields) {
        path.push_field(f.name);
        let result = encode_field(registry, f, v, true, out, path);
        path.pop();
        result?;
    }
    Ok(())
}

/// Write the inline count preceding a nested variable-length field. The
/// caller has already bounded `count` by the declared maximum.
fn put_count(out: &mut Vec<u8>, count: usize, max: u16) {
    if count_prefix_width(max) == 1 {
        out.put_u8(count as u8);
    } else {
        out.put_u16_le(count as u16);
    }
}

fn scalar_name(width: ScalarWidth) -> &'static str {
    match width {
        ScalarWidth::One => "u8",
        ScalarWidth::Two => "u16",
        ScalarWidth::Four => "u32",
        ScalarWidth::Eight => "u64",
    }
}

fn mismatch(path: &FieldPath, expected: impl Into<String>, value: &Value) -> EncodeError {
    EncodeError::ValueMismatch {
        path: path.clone(),
        expected: expected.into(),
        found: value.kind_name().to_string(),
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode one field value. Message-level records pass a sub-cursor over
/// the record payload and `nested = false`; aggregate interiors share the
/// running cursor and pass `true`.
pub(crate) fn decode_field(
    registry: &Registry,
    field: &FieldDescriptor,
    r: &mut Reader<'_>,
    nested: bool,
    path: &mut FieldPath,
) -> Result<Value, DecodeError> {
    match field.kind {
        FieldKind::Scalar(width) => decode_scalar(width, r, path),
        FieldKind::Str { max_len, .. } => {
            let len = if nested {
                take_count(r, max_len, path)?
            } else {
                r.remaining()
            };
            if len > max_len as usize {
                return Err(DecodeError::FieldTooLong {
                    path: path.clone(),
                    offset: r.offset(),
                    len,
                    max: max_len as usize,
                });
            }
            let bytes = r.take(len).map_err(|s| s.at(path))?;
            Ok(Value::Str(String::from_utf8_lossy(bytes).into_owned()))
        }
        FieldKind::FixedArray { elem, count } => {
            let mut items = Vec::with_capacity(count as usize);
            for i in 0..count as usize {
                path.push_index(i);
                let item = decode_elem(registry, elem, r, path);
                path.pop();
                items.push(item?);
            }
            Ok(Value::Array(items))
        }
        FieldKind::VarArray {
            elem, max_count, ..
        } => {
            let start = r.offset();
            if nested {
                let count = take_count(r, max_count, path)?;
                if count > max_count as usize {
                    return Err(DecodeError::ArrayTooLong {
                        path: path.clone(),
                        offset: start,
                        count,
                        max: max_count as usize,
                    });
                }
                let mut items = Vec::with_capacity(count);
                for i in 0..count {
                    path.push_index(i);
                    let item = decode_elem(registry, elem, r, path);
                    path.pop();
                    items.push(item?);
                }
                Ok(Value::Array(items))
            } else {
                // The record extent drives the count: elements until it
                // runs out. A partial trailing element reads short and
                // surfaces as truncated input.
                let mut items = Vec::new();
                while r.remaining() > 0 {
                    path.push_index(items.len());
                    let item = decode_elem(registry, elem, r, path);
                    path.pop();
                    items.push(item?);
                }
                if items.len() > max_count as usize {
                    return Err(DecodeError::ArrayTooLong {
                        path: path.clone(),
                        offset: start,
                        count: items.len(),
                        max: max_count as usize,
                    });
                }
                Ok(Value::Array(items))
            }
        }
        FieldKind::Aggregate(index) => decode_struct(registry, index, r, path),
    }
}

fn decode_scalar(
    width: ScalarWidth,
    r: &mut Reader<'_>,
    path: &FieldPath,
) -> Result<Value, DecodeError> {
    let value = match width {
        ScalarWidth::One => Value::U8(r.take_u8().map_err(|s| s.at(path))?),
        ScalarWidth::Two => Value::U16(r.take_u16_le().map_err(|s| s.at(path))?),
        ScalarWidth::Four => Value::U32(r.take_u32_le().map_err(|s| s.at(path))?),
        ScalarWidth::Eight => Value::U64(r.take_u64_le().map_err(|s| s.at(path))?),
    };
    Ok(value)
}

fn decode_elem(
    registry: &Registry,
    elem: ElemKind,
    r: &mut Reader<'_>,
    path: &mut FieldPath,
) -> Result<Value, DecodeError> {
    match elem {
        ElemKind::Scalar(width) => decode_scalar(width, r, path),
        ElemKind::Aggregate(index) => decode_struct(registry, index, r, path),
    }
}

fn decode_struct(
    registry: &Registry,
    index: TypeIndex,
    r: &mut Reader<'_>,
    path: &mut FieldPath,
) -> Result<Value, DecodeError> {
    let desc = registry.type_at(index)?;
    let mut fields = Vec::with_capacity(desc.fields.len());
    for f in desc.fields {
        path.push_field(f.name);
        let value = decode_field(registry, f, r, true, path);
        path.pop();
        fields.push(value?);
    }
    Ok(Value::Struct(fields))
}

/// Read the inline count preceding a nested variable-length field.
fn take_count(r: &mut Reader<'_>, max: u16, path: &FieldPath) -> Result<usize, DecodeError> {
    if count_prefix_width(max) == 1 {
        Ok(r.take_u8().map_err(|s| s.at(path))? as usize)
    } else {
        Ok(r.take_u16_le().map_err(|s| s.at(path))? as usize)
    }
}
