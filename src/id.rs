//! `TagId` — the fixed-width identifier every tag expression resolves to.
//!
//! A `TagId` is 192 bits stored as three `u64` limbs, limb 0 most
//! significant. Ordering is lexicographic over the limbs, so byte-wise
//! comparison of the big-endian form agrees with `Ord`.
//!
//! Limb 0 doubles as a time index when an ID is minted from a clock:
//! the top 48 bits hold signed Unix seconds and the low 16 bits hold
//! fractional precision, so `(limb0 >> 16)` is always a plain Unix
//! timestamp for time-derived IDs. Path-derived IDs (see [`crate::expr`])
//! ignore that convention and treat all 192 bits as hash space.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::hash::term_id;

/// Maps one decimal nanosecond (0..1e9) onto the full 64-bit range.
const NANOSEC_STEP: u64 = 0x4_4B82_FA1C; // (1 << 64) / 1e9

/// Bits of limb 1 randomized by [`TagId::now`]; slightly finer than 1 ns.
pub const ENTROPY_MASK: u64 = 0x3_FFFF_FFFF;

const PRIME_1: u64 = (1 << 63) - 471;
const PRIME_2: u64 = (1 << 62) - 143;
const PRIME_3: u64 = (1 << 55) - 99;

static ENTROPY_SEED: AtomicU64 = AtomicU64::new((1 << 63) - 301);

/// Stable 192-bit identifier: three ordered `u64` limbs.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagId([u64; 3]);

impl TagId {
    /// The zero identifier; derived from the empty expression.
    pub const NIL: TagId = TagId([0; 3]);

    /// Reserved wildcard identifier.
    pub const WILDCARD: TagId = TagId([1, 1, 1]);

    /// Forms a `TagId` from three ordered integers.
    ///
    /// The first is signed to reflect that times before 1970-01-01 are valid.
    pub const fn from_ints(x0: i64, x1: u64, x2: u64) -> Self {
        TagId([x0 as u64, x1, x2])
    }

    pub const fn from_limbs(limbs: [u64; 3]) -> Self {
        TagId(limbs)
    }

    pub const fn limbs(&self) -> [u64; 3] {
        self.0
    }

    pub const fn is_nil(&self) -> bool {
        self.0[0] == 0 && self.0[1] == 0 && self.0[2] == 0
    }

    pub const fn is_set(&self) -> bool {
        !self.is_nil()
    }

    pub const fn is_wildcard(&self) -> bool {
        self.0[0] == 1 && self.0[1] == 1 && self.0[2] == 1
    }

    /// Commutative combinator: limb-wise wrapping sum.
    ///
    /// Associative and order independent, which is what makes With-joined
    /// tag terms order independent (`a.b.cc == b.cc.a`). Overflow is normal.
    pub const fn with(self, other: TagId) -> TagId {
        TagId([
            self.0[0].wrapping_add(other.0[0]),
            self.0[1].wrapping_add(other.0[1]),
            self.0[2].wrapping_add(other.0[2]),
        ])
    }

    /// Non-commutative combinator: limb-wise wrapping difference.
    pub const fn then(self, other: TagId) -> TagId {
        TagId([
            self.0[0].wrapping_sub(other.0[0]),
            self.0[1].wrapping_sub(other.0[1]),
            self.0[2].wrapping_sub(other.0[2]),
        ])
    }

    /// Combines this ID with the hash of the given byte string.
    pub fn with_literal(self, literal: &[u8]) -> TagId {
        self.with(term_id(literal))
    }

    /// Combines this ID with the hash of the given token.
    pub fn with_token(self, token: &str) -> TagId {
        self.with_literal(token.as_bytes())
    }

    /// Combines this ID with the ID of a full tag expression.
    pub fn with_expr(self, expr: &str) -> TagId {
        self.with(crate::expr::TagExpr::new().with(expr).id())
    }

    /// Full 192-bit addition with carry propagation across limbs.
    pub const fn add(self, other: TagId) -> TagId {
        let (l2, carry2) = self.0[2].overflowing_add(other.0[2]);
        let (l1a, carry1a) = self.0[1].overflowing_add(other.0[1]);
        let (l1, carry1b) = l1a.overflowing_add(carry2 as u64);
        let carry1 = (carry1a as u64) + (carry1b as u64);
        let l0 = self.0[0].wrapping_add(other.0[0]).wrapping_add(carry1);
        TagId([l0, l1, l2])
    }

    /// Full 192-bit subtraction with borrow propagation across limbs.
    pub const fn sub(self, other: TagId) -> TagId {
        let (l2, borrow2) = self.0[2].overflowing_sub(other.0[2]);
        let (l1a, borrow1a) = self.0[1].overflowing_sub(other.0[1]);
        let (l1, borrow1b) = l1a.overflowing_sub(borrow2 as u64);
        let borrow1 = (borrow1a as u64) + (borrow1b as u64);
        let l0 = self.0[0].wrapping_sub(other.0[0]).wrapping_sub(borrow1);
        TagId([l0, l1, l2])
    }

    /// Big-endian 24-byte form; byte order agrees with `Ord`.
    pub const fn to_bytes(self) -> [u8; 24] {
        let mut out = [0u8; 24];
        let mut i = 0;
        while i < 3 {
            let limb = self.0[i].to_be_bytes();
            let mut j = 0;
            while j < 8 {
                out[i * 8 + j] = limb[j];
                j += 1;
            }
            i += 1;
        }
        out
    }

    /// Forms a `TagId` from the last 24 bytes (or fewer) of the input.
    ///
    /// Shorter input is left-padded with zeros.
    pub fn from_bytes(input: &[u8]) -> TagId {
        let mut buf = [0u8; 24];
        let take = input.len().min(24);
        buf[24 - take..].copy_from_slice(&input[input.len() - take..]);

        let mut limbs = [0u64; 3];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&buf[i * 8..i * 8 + 8]);
            *limb = u64::from_be_bytes(bytes);
        }
        TagId(limbs)
    }

    /// Storage key form: limb 0 bit-inverted so higher time values sort first
    /// under an ascending byte-wise scan.
    pub const fn as_key(self) -> [u8; 24] {
        TagId([!self.0[0], self.0[1], self.0[2]]).to_bytes()
    }

    /// Inverse of [`TagId::as_key`].
    pub fn from_key(key: &[u8; 24]) -> TagId {
        let id = TagId::from_bytes(key);
        TagId([!id.0[0], id.0[1], id.0[2]])
    }

    /// Forms a `TagId` from the given time: limb 0 carries Unix seconds with
    /// 16 bits of fixed precision, limb 1 the remaining fractional bits.
    pub fn from_time(t: SystemTime) -> TagId {
        let (secs, ns_f64) = time_parts(t);
        TagId([((secs as u64) << 16) | (ns_f64 >> 48), ns_f64 << 16, 0])
    }

    /// The current time as a `TagId`, statistically unique even when called
    /// in rapid succession: limbs 1-2 are mixed with a process-local seed.
    pub fn now() -> TagId {
        let (secs, ns_f64) = time_parts(SystemTime::now());
        let mut id = TagId([((secs as u64) << 16) | (ns_f64 >> 48), ns_f64 << 16, 0]);

        let prev = ENTROPY_SEED.load(Ordering::Relaxed);
        let seed = (PRIME_1.wrapping_mul(ns_f64).wrapping_add(0xCCCC_AAAA_CCCC_AAAA))
            ^ PRIME_2.wrapping_mul(prev);
        id.0[1] ^= seed & ENTROPY_MASK;
        id.0[2] = seed.wrapping_add(PRIME_3.wrapping_mul(ns_f64));
        ENTROPY_SEED.store(seed, Ordering::Relaxed);
        id
    }

    /// Unix UTC seconds carried in limb 0 (time-derived IDs only).
    pub const fn unix_secs(&self) -> i64 {
        (self.0[0] as i64) >> 16
    }

    /// Unix UTC milliseconds carried in limb 0.
    pub const fn unix_ms(&self) -> i64 {
        (self.0[0].wrapping_mul(125) as i64) >> 13 // 1000 / 2^16 == 125 / 2^13
    }

    /// Big-endian hex with leading zeros trimmed; `"0"` for nil.
    pub fn to_hex(&self) -> String {
        let full = hex::encode(self.to_bytes());
        let trimmed = full.trim_start_matches('0');
        if trimmed.is_empty() {
            "0".to_owned()
        } else {
            trimmed.to_owned()
        }
    }

    /// Short 7-nibble suffix of limb 2, for logs and labels.
    pub fn label(&self) -> String {
        format!("{:07x}", self.0[2] & 0x0FFF_FFFF)
    }
}

fn time_parts(t: SystemTime) -> (i64, u64) {
    let (secs, nanos) = match t.duration_since(UNIX_EPOCH) {
        Ok(d) => (d.as_secs() as i64, d.subsec_nanos()),
        Err(e) => {
            let d = e.duration();
            let mut secs = -(d.as_secs() as i64);
            let mut nanos = d.subsec_nanos();
            if nanos > 0 {
                secs -= 1;
                nanos = 1_000_000_000 - nanos;
            }
            (secs, nanos)
        }
    };
    // Spread 0..1e9 decimal nanoseconds over the full 64-bit range.
    (secs, (nanos as u64).wrapping_mul(NANOSEC_STEP))
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TagId({})", self.to_hex())
    }
}
