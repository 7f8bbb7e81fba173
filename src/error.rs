//! Error types backing `Status::Error`.
//!
//! Architectural exceptions (overflow, invalid opcode) are never surfaced
//! here — they're handled in-band by squash-and-resume. Only
//! programming-invariant violations and malformed external configuration
//! reach `SimError`.

use thiserror::Error;

/// Fallible outcomes of constructing or driving a [`crate::Simulator`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A `CacheConfig` failed validation before a cache was constructed.
    #[error("invalid cache config for {kind}: {reason}")]
    InvalidCacheConfig {
        /// Which cache (`"instruction"` or `"data"`) failed validation.
        kind: &'static str,
        /// Human-readable description of which derived quantity was not
        /// a power of two, or which field was zero.
        reason: String,
    },

    /// A cache set had every way valid but no way at LRU rank zero
    /// during miss resolution. Indicates `lruRank` stopped being a
    /// permutation of `[0..ways)` — a logic bug in the replacement
    /// policy, not bad input.
    #[error("cache invariant violated: no way at LRU rank zero in a full set")]
    NoLruZeroWay,

    /// `stall(Stage::Wb)` was requested. Illegal per §4.3 — there is no
    /// stage downstream of WB to hold a bubble for.
    #[error("illegal stall requested at the writeback stage")]
    StallAtWriteback,
}
