//! Cache configuration and the external-facing validation step that
//! turns a malformed config into a [`SimError`] instead of a panic.

use crate::error::SimError;

/// Distinguishes the instruction cache from the data cache. Informational
/// only — used for tracing labels and error messages, never for
/// hit/miss logic (§4.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CacheKind {
    Instruction,
    Data,
}

impl CacheKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CacheKind::Instruction => "instruction",
            CacheKind::Data => "data",
        }
    }
}

/// Whether an access is a read or a write. Informational only — hit/miss
/// is independent of read vs. write in this behavioral cache model
/// (§4.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MemOp {
    Read,
    Write,
}

/// User-supplied cache parameters (§3).
///
/// `cache_size` must be a multiple of `block_size * ways`; `block_size`
/// and the derived `num_sets = cache_size / (block_size * ways)` must be
/// powers of two. Byte offset is always 2 bits (word-addressed).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheConfig {
    pub cache_size: u32,
    pub block_size: u32,
    pub ways: u32,
    pub miss_latency: u32,
}

impl CacheConfig {
    /// Validates the config, returning the error a caller at the crate
    /// boundary (e.g. a binary reading a config file) should surface
    /// instead of letting `Cache::new` panic.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidCacheConfig`] if any field is zero, if
    /// `cache_size` is not a multiple of `block_size * ways`, or if
    /// `block_size` or the derived set count is not a power of two.
    pub fn validate(&self, kind: CacheKind) -> Result<(), SimError> {
        let reason = |msg: &str| SimError::InvalidCacheConfig {
            kind: kind.label(),
            reason: msg.to_string(),
        };

        if self.cache_size == 0 || self.block_size == 0 || self.ways == 0 || self.miss_latency == 0
        {
            return Err(reason("cacheSize, blockSize, ways, and missLatency must all be positive"));
        }

        let block_times_ways = self
            .block_size
            .checked_mul(self.ways)
            .ok_or_else(|| reason("blockSize * ways overflows u32"))?;

        if self.cache_size % block_times_ways != 0 {
            return Err(reason("cacheSize must be a multiple of blockSize * ways"));
        }
        if !self.block_size.is_power_of_two() {
            return Err(reason("blockSize must be a power of two"));
        }

        let num_sets = self.cache_size / block_times_ways;
        if !num_sets.is_power_of_two() {
            return Err(reason("cacheSize / (blockSize * ways) must be a power of two"));
        }

        Ok(())
    }

    #[must_use]
    pub(crate) fn num_sets(&self) -> u32 {
        self.cache_size / (self.block_size * self.ways)
    }

    /// `log2(blockSize / 4)`, floored to zero for sub-word block sizes
    /// (`blockSize < 4`) the way the original integer-division formula
    /// degenerates there.
    #[must_use]
    pub(crate) fn block_offset_bits(&self) -> u32 {
        let words_per_block = self.block_size / 4;
        if words_per_block == 0 {
            0
        } else {
            words_per_block.trailing_zeros()
        }
    }

    #[must_use]
    pub(crate) fn index_bits(&self) -> u32 {
        self.num_sets().trailing_zeros()
    }

    #[must_use]
    pub(crate) fn tag_bits(&self) -> u32 {
        32 - self.block_offset_bits() - self.index_bits() - 2
    }
}
