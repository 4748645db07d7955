//! Wire-level constants.

// ============================================================================
// Record Framing
// ============================================================================

/// Size in bytes of a record tag.
pub const TAG_SIZE: usize = 1;

/// Size in bytes of a record length.
pub const LEN_SIZE: usize = 2;

/// Size in bytes of a full record header.
pub const RECORD_HEADER_SIZE: usize = TAG_SIZE + LEN_SIZE;

/// Largest payload one record can carry.
pub const MAX_RECORD_PAYLOAD: usize = u16::MAX as usize;

// ============================================================================
// Buffers
// ============================================================================

/// Cap on the encode buffer preallocation. Messages may declare larger
/// ceilings; the buffer grows past this on demand.
pub const PREALLOC_CEILING: usize = 1024;
