//! Deterministic tag addressing for hypermedia nodes.
//!
//! A [`TagId`] is a 192-bit identifier derived from a hierarchical tag
//! expression such as `amp.attr.cell-properties`. Derivation is pure: every
//! peer that spells the same canonical expression derives the same bits, so
//! identifiers travel on the wire and into storage without any coordination.
//!
//! The ID is three 64-bit limbs, limb 0 most significant. Expression-derived
//! IDs keep limb 0 narrow (a widened 32-bit hash word); time-based IDs from
//! [`TagId::now`] put `unix_secs << 16` there, so lexicographic byte order is
//! also time order.
//!
//! [`TagExpr`] is the immutable builder over expressions, and [`TagRegistry`]
//! maps derived identifiers to the value types ([`Prototype`]s) that own
//! them. [`builtins::bootstrap`] produces a sealed registry with the standard
//! session vocabulary.

extern crate self as amp_tag;

pub mod builtins;
pub mod error;
pub mod expr;
pub mod hash;
pub mod id;
pub mod registry;

pub use amp_tag_macro::Prototype;

pub use error::TagError;
pub use expr::{CANONIC_THEN, CANONIC_WITH, TagExpr, TagSpec};
pub use hash::{expr_id, term_id, token_id};
pub use id::TagId;
pub use registry::{Prototype, PrototypeDef, TagRegistry};
