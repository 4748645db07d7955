//! Service table mapping message ids to descriptors.

use crate::descriptor::{Direction, MessageDescriptor, MessageId};
use crate::error::{LookupError, SchemaError};

/// One entry of the service table.
#[derive(Debug, Clone, Copy)]
pub struct ServiceEntry {
    /// Message id carried by the transport.
    pub message_id: MessageId,
    /// Direction this entry describes. The same id may appear once per
    /// direction, typically as a request and response pair.
    pub direction: Direction,
    /// Descriptor of the message body.
    pub message: MessageDescriptor,
    /// Largest encoded body the transport accepts for this message.
    pub max_encoded_size: usize,
}

/// Frozen mapping from `(message id, direction)` to a service entry.
///
/// Entries are scanned linearly. Service tables are small and lookups sit
/// outside the per-byte hot path.
#[derive(Debug, Clone, Copy)]
pub struct ServiceTable {
    entries: &'static [ServiceEntry],
}

impl ServiceTable {
    /// Wrap a static entry table, rejecting duplicate `(id, direction)`
    /// pairs.
    pub(crate) fn new(entries: &'static [ServiceEntry]) -> Result<Self, SchemaError> {
        for (i, entry) in entries.iter().enumerate() {
            for other in &entries[i + 1..] {
                if entry.message_id == other.message_id && entry.direction == other.direction {
                    return Err(SchemaError::DuplicateService {
                        message_id: entry.message_id,
                        direction: entry.direction,
                    });
                }
            }
        }
        Ok(ServiceTable { entries })
    }

    /// Find the entry for a message id and direction.
    pub fn lookup(
        &self,
        id: MessageId,
        direction: Direction,
    ) -> Result<&'static ServiceEntry, LookupError> {
        self.entries
            .iter()
            .find(|e| e.message_id == id && e.direction == direction)
            .ok_or(LookupError::UnknownMessage { id, direction })
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in table order.
    pub fn entries(&self) -> &'static [ServiceEntry] {
        self.entries
    }
}
