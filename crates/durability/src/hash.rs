//! Content hash for snapshot deduplication
//!
//! 32-bit FNV-1a over the canonical snapshot bytes. Fast and
//! non-cryptographic; it only has to detect "same content as last time".

/// FNV-1a 32-bit offset basis
pub const FNV32_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// FNV-1a 32-bit prime
pub const FNV32_PRIME: u32 = 0x0100_0193;

/// Compute the 32-bit FNV-1a hash of `bytes`
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    let mut hash = FNV32_OFFSET_BASIS;
    for byte in bytes {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(FNV32_PRIME);
    }
    hash
}
