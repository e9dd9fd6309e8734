//! CRC-32/ISO-HDLC (the classic reflected CRC-32 used by zlib and friends).
//!
//! Built on `crc32fast`, the same crate and call pattern the persistence
//! layer's WAL writer/reader use for their own checksums: construct with a
//! starting state, call `update` across however many buffers make up the
//! record, then finalize once. `crc32_update`/`crc32` wrap that pattern
//! behind the wire format's own two-call shape (`crc32_update(crc, data)`
//! continues a raw, non-finalized accumulator; `crc32` is the one-shot
//! convenience that starts fresh and applies the final XOR).

use crc32fast::Hasher;

/// Continues a CRC-32 computation from a raw (non-finalized) accumulator.
///
/// Pass `0xFFFF_FFFF` as `crc` to start a new computation, and XOR the final
/// result with `0xFFFF_FFFF` yourself, or just call [`crc32`] for the common
/// one-shot case.
pub fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    let mut hasher = Hasher::new_with_initial(crc ^ 0xFFFF_FFFF);
    hasher.update(data);
    hasher.finalize() ^ 0xFFFF_FFFF
}

/// Computes the CRC-32/ISO-HDLC checksum of a complete buffer.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
