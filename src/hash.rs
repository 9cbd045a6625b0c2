//! Term hashing — the frozen derivation from a canonical term to a `TagId`.
//!
//! SHA-256 of the exact term bytes; digest bytes 0..20 become the limbs:
//! limb 0 is the little-endian u32 of bytes 0..4 (widened, keeping the
//! time-index limb small), limbs 1-2 are little-endian u64s of bytes 4..12
//! and 12..20. This mapping is the wire-compatibility contract: any change
//! breaks every persisted or transmitted identifier.

use sha2::{Digest, Sha256};

use crate::TagId;

/// Returns the `TagId` formed by hashing the given byte string exactly.
///
/// The empty literal is hardwired to [`TagId::NIL`].
pub fn term_id(term: &[u8]) -> TagId {
    if term.is_empty() {
        return TagId::NIL;
    }

    let digest: [u8; 32] = Sha256::digest(term).into();
    TagId::from_limbs([
        u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as u64,
        u64::from_le_bytes([
            digest[4], digest[5], digest[6], digest[7], digest[8], digest[9], digest[10],
            digest[11],
        ]),
        u64::from_le_bytes([
            digest[12], digest[13], digest[14], digest[15], digest[16], digest[17], digest[18],
            digest[19],
        ]),
    ])
}

/// Returns the `TagId` formed by hashing the given token string.
pub fn token_id(token: &str) -> TagId {
    term_id(token.as_bytes())
}

/// Returns the `TagId` of a full tag expression (canonicalized terms,
/// combined per operator).
pub fn expr_id(expr: &str) -> TagId {
    crate::TagExpr::new().with(expr).id()
}
