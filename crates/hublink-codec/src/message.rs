//! Message encode and decode.
//!
//! A message body is a sequence of self-describing records:
//!
//! | Field   | Size (bytes) | Description                                    |
//! |---------|--------------|------------------------------------------------|
//! | tag     | 1            | Record tag, unique within a message.           |
//! | length  | 2            | Payload length in bytes, big-endian.           |
//! | payload | up to 65535  | Field data, laid out per the field descriptor. |
//!
//! Encoding walks the descriptor in ascending tag order and emits one
//! record per present field. Decoding scans records as they arrive,
//! skipping unknown tags so an older host keeps working against a newer
//! hub, and stops at the terminal tag or when fewer bytes than a header
//! remain. Mandatory fields are checked once the scan ends.

use hublink_schema::{Direction, MessageDescriptor, MessageId, Registry};

use crate::constants::{PREALLOC_CEILING, RECORD_HEADER_SIZE};
use crate::error::{DecodeError, EncodeError, FieldPath};
use crate::field::{decode_field, encode_field};
use crate::value::MessageValue;
use crate::wire::{patch_record_len, put_record_header, Reader};

/// Encode a message body against its service entry, looked up by id and
/// direction.
pub fn encode_message(
    registry: &Registry,
    id: MessageId,
    direction: Direction,
    value: &MessageValue,
) -> Result<Vec<u8>, EncodeError> {
    let entry = registry.services().lookup(id, direction)?;
    encode_records(registry, &entry.message, value, entry.max_encoded_size)
}

/// Decode a message body against its service entry, looked up by id and
/// direction.
pub fn decode_message(
    registry: &Registry,
    id: MessageId,
    direction: Direction,
    buf: &[u8],
) -> Result<MessageValue, DecodeError> {
    let entry = registry.services().lookup(id, direction)?;
    decode_records(registry, &entry.message, buf)
}

/// Encode a message body against an explicit descriptor.
pub fn encode_records(
    registry: &Registry,
    desc: &MessageDescriptor,
    value: &MessageValue,
    max_encoded_size: usize,
) -> Result<Vec<u8>, EncodeError> {
    if value.len() != desc.fields.len() {
        return Err(EncodeError::ValueMismatch {
            path: FieldPath::root(),
            expected: format!("{} with {} field slots", desc.name, desc.fields.len()),
            found: format!("{} field slots", value.len()),
        });
    }

    let mut out = Vec::with_capacity(max_encoded_size.min(PREALLOC_CEILING));
    for (slot, tf) in desc.fields.iter().enumerate() {
        let field_value = match value.get(slot) {
            Some(v) => v,
            None if tf.optional => continue,
            None => {
                return Err(EncodeError::MissingMandatoryField {
                    message: desc.name,
                    field: tf.field.name,
                    tag: tf.tag,
                });
            }
        };

        let start = put_record_header(&mut out, tf.tag);
        let mut path = FieldPath::from_field(tf.field.name);
        encode_field(registry, &tf.field, field_value, false, &mut out, &mut path)?;
        let payload_len = out.len() - start - RECORD_HEADER_SIZE;
        patch_record_len(&mut out, start, payload_len);

        if out.len() > max_encoded_size {
            return Err(EncodeError::MessageTooLarge {
                size: out.len(),
                max: max_encoded_size,
            });
        }
    }
    Ok(out)
}

/// Decode a message body against an explicit descriptor.
pub fn decode_records(
    registry: &Registry,
    desc: &MessageDescriptor,
    buf: &[u8],
) -> Result<MessageValue, DecodeError> {
    let mut value = MessageValue::new(desc.fields.len());
    let mut r = Reader::new(buf);

    // Fewer than a header's worth of trailing bytes ends the scan; the
    // mandatory check below decides whether that is an error.
    while r.remaining() >= RECORD_HEADER_SIZE {
        let record_offset = r.offset();
        let tag = r.take_u8().map_err(|s| s.at(&FieldPath::root()))?;
        let len = r.take_u16_be().map_err(|s| s.at(&FieldPath::root()))? as usize;
        let matched = desc.field_by_tag(tag);

        if len > r.remaining() {
            let path = match matched {
                Some((_, tf)) => FieldPath::from_field(tf.field.name),
                None => FieldPath::root(),
            };
            return Err(DecodeError::TruncatedInput {
                path,
                offset: r.offset(),
                needed: len,
                available: r.remaining(),
            });
        }

        let (slot, tf) = match matched {
            Some(found) => found,
            None => {
                // Unknown tags are skipped for forward compatibility.
                r.take(len).map_err(|s| s.at(&FieldPath::root()))?;
                log::trace!(
                    "[{}] skipping unknown tag 0x{:02X} ({} bytes) at offset {}",
                    desc.name,
                    tag,
                    len,
                    record_offset
                );
                continue;
            }
        };

        let mut record = r.sub(len).map_err(|s| s.at(&FieldPath::root()))?;
        let mut path = FieldPath::from_field(tf.field.name);
        let field_value = decode_field(registry, &tf.field, &mut record, false, &mut path)?;

        if value.is_present(slot) {
            log::trace!(
                "[{}] duplicate record for tag 0x{:02X}, last value wins",
                desc.name,
                tag
            );
        }
        value.set(slot, field_value);

        if tf.terminal {
            break;
        }
    }

    for (slot, tf) in desc.fields.iter().enumerate() {
        if !tf.optional && !value.is_present(slot) {
            return Err(DecodeError::MissingMandatoryField {
                message: desc.name,
                field: tf.field.name,
                tag: tf.tag,
            });
        }
    }
    Ok(value)
}
