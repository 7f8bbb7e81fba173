//! Set-associative cache model (C1): a behavioral hit/miss oracle with
//! LRU replacement. This is not a data-bearing cache — it never models
//! write-back, coherence, or multiple levels (see Non-goals, §1).

pub mod config;

pub use config::{CacheConfig, CacheKind, MemOp};

use crate::error::SimError;

/// One way within a [`CacheSet`].
#[derive(Clone, Copy, Debug, Default)]
struct CacheWay {
    valid: bool,
    tag: u32,
    /// Permutation of `[0..ways)`; rank 0 = least recently used.
    lru_rank: u32,
}

/// One set of `ways` parallel ways.
#[derive(Clone, Debug)]
struct CacheSet {
    ways: Vec<CacheWay>,
}

impl CacheSet {
    fn new(ways: u32) -> Self {
        let ways = (0..ways)
            .map(|j| CacheWay {
                valid: false,
                tag: 0,
                lru_rank: j,
            })
            .collect();
        Self { ways }
    }

    /// Promotes `way` to most-recently-used, shifting every rank above
    /// its old rank down by one. Preserves the invariant that `lru_rank`
    /// is always a permutation of `[0..ways)`.
    fn touch(&mut self, way: usize) {
        let old_rank = self.ways[way].lru_rank;
        let top = (self.ways.len() - 1) as u32;
        for w in &mut self.ways {
            if w.lru_rank > old_rank {
                w.lru_rank -= 1;
            }
        }
        self.ways[way].lru_rank = top;
    }

    /// The way currently at LRU rank zero — the next victim.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NoLruZeroWay`] if no way has rank zero. Per
    /// §4.1 this can only happen if `lru_rank` has stopped being a
    /// permutation of `[0..ways)`, which is a logic bug in
    /// [`CacheSet::touch`], not a consequence of any external input —
    /// but per §7/`Status::ERROR` it is reported to the caller rather
    /// than crashing the process outright.
    fn lru_victim(&self) -> Result<usize, SimError> {
        self.ways
            .iter()
            .position(|w| w.lru_rank == 0)
            .ok_or(SimError::NoLruZeroWay)
    }
}

/// A single-level set-associative cache: per-access hit/miss oracle with
/// LRU replacement (§4.1).
#[derive(Debug)]
pub struct Cache {
    kind: CacheKind,
    config: CacheConfig,
    sets: Vec<CacheSet>,
    hits: u64,
    misses: u64,
}

impl Cache {
    /// Allocates `numSets` cache sets, every way starting invalid with a
    /// deterministic initial LRU ranking (`lruRank[j] = j`).
    ///
    /// # Panics
    ///
    /// Panics if `config` does not satisfy its preconditions (positive
    /// fields; `cacheSize` a multiple of `blockSize * ways`; `blockSize`
    /// and the derived set count powers of two). Callers accepting
    /// externally-supplied configuration should call
    /// [`CacheConfig::validate`] first and surface a
    /// [`crate::SimError::InvalidCacheConfig`] instead of reaching this
    /// panic.
    #[must_use]
    pub fn new(config: CacheConfig, kind: CacheKind) -> Self {
        config
            .validate(kind)
            .unwrap_or_else(|e| panic!("Cache::new called with invalid config: {e}"));

        let num_sets = config.num_sets();
        let sets = (0..num_sets).map(|_| CacheSet::new(config.ways)).collect();

        Self {
            kind,
            config,
            sets,
            hits: 0,
            misses: 0,
        }
    }

    #[must_use]
    pub fn kind(&self) -> CacheKind {
        self.kind
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// The `missLatency` this cache was configured with (§4.1): the
    /// number of cycles a miss keeps the probing stage's stall latch
    /// asserted, counting the cycle the miss was detected on.
    #[must_use]
    pub fn miss_latency(&self) -> u32 {
        self.config.miss_latency
    }

    /// Decomposes `address` (MSB-first) into `(tag, set_index)`,
    /// discarding the intra-block word offset and the 2-bit byte
    /// offset.
    fn decompose(&self, address: u32) -> (u32, usize) {
        let block_offset_bits = self.config.block_offset_bits();
        let index_bits = self.config.index_bits();
        let tag_bits = self.config.tag_bits();

        let index_shift = block_offset_bits + 2;
        let index_mask = (1u32 << index_bits) - 1;
        let index = (address >> index_shift) & index_mask;
        let tag = address >> (32 - tag_bits);
        (tag, index as usize)
    }

    /// Probes the cache for `address`. Returns `Ok(true)` on hit,
    /// `Ok(false)` on miss. `op` is informational only (§4.1) — hit/miss
    /// does not depend on it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NoLruZeroWay`] if miss resolution finds every
    /// way in the set valid but none at LRU rank zero (§4.1, §7).
    pub fn access(&mut self, address: u32, op: MemOp) -> Result<bool, SimError> {
        let (tag, index) = self.decompose(address);
        let set = &mut self.sets[index];

        if let Some(way) = set.ways.iter().position(|w| w.valid && w.tag == tag) {
            set.touch(way);
            self.hits += 1;
            tracing::trace!(
                cache = self.kind.label(),
                address,
                ?op,
                "cache hit"
            );
            return Ok(true);
        }

        let victim = set.lru_victim()?;
        set.ways[victim].valid = true;
        set.ways[victim].tag = tag;
        set.touch(victim);
        self.misses += 1;
        tracing::trace!(
            cache = self.kind.label(),
            address,
            ?op,
            "cache miss"
        );
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(cache_size: u32, block_size: u32, ways: u32) -> Cache {
        Cache::new(
            CacheConfig {
                cache_size,
                block_size,
                ways,
                miss_latency: 1,
            },
            CacheKind::Instruction,
        )
    }

    /// S1 — PSET5 Q1, direct-mapped 8x1x1.
    #[test]
    fn s1_direct_mapped_eight_sets() {
        let mut c = cache(8, 1, 1);
        let addrs = [3, 180, 43, 2, 191, 88, 190, 14, 181, 44, 186, 253];
        let expected_hits = [
            false, false, false, true, false, false, true, false, true, false, false, false,
        ];
        for (addr, expect_hit) in addrs.into_iter().zip(expected_hits) {
            assert_eq!(c.access(addr, MemOp::Read).unwrap(), expect_hit, "addr={addr}");
        }
        assert_eq!(c.hits(), 3);
        assert_eq!(c.misses(), 9);
    }

    /// S2 — PSET5 Q2 associative, 64B 8B 2-way: thrashing, all misses.
    #[test]
    fn s2_associative_all_miss() {
        let mut c = cache(64, 8, 2);
        for _ in 0..500 {
            assert!(!c.access(0, MemOp::Read).unwrap());
            assert!(!c.access(32, MemOp::Read).unwrap());
            assert!(!c.access(96, MemOp::Read).unwrap());
        }
        assert_eq!(c.misses(), 1500);
        assert_eq!(c.hits(), 0);
    }

    /// S3 — PSET5 Q2 direct-mapped, 64B 8B 1-way: conflict misses.
    #[test]
    fn s3_direct_mapped_conflict_misses() {
        let mut c = cache(64, 8, 1);
        assert!(!c.access(0, MemOp::Write).unwrap());
        assert!(!c.access(32, MemOp::Write).unwrap());
        assert!(!c.access(96, MemOp::Write).unwrap());

        for _ in 0..500 {
            assert!(c.access(0, MemOp::Read).unwrap());
            assert!(!c.access(32, MemOp::Read).unwrap());
            assert!(!c.access(96, MemOp::Read).unwrap());
        }
        assert_eq!(c.hits(), 500);
        assert_eq!(c.misses(), 1003);
    }

    #[test]
    #[should_panic(expected = "invalid config")]
    fn new_panics_on_bad_config() {
        let _ = cache(24, 4, 1);
    }

    #[test]
    fn lru_rank_stays_a_permutation() {
        let mut c = cache(64, 8, 2);
        for addr in [0u32, 32, 0, 64, 32, 96, 0] {
            c.access(addr, MemOp::Read).unwrap();
        }
        for set in &c.sets {
            let mut ranks: Vec<u32> = set.ways.iter().map(|w| w.lru_rank).collect();
            ranks.sort_unstable();
            assert_eq!(ranks, (0..set.ways.len() as u32).collect::<Vec<_>>());
        }
    }

    /// A set whose `lru_rank`s have been corrupted so that none is zero
    /// reports `SimError::NoLruZeroWay` from `lru_victim` rather than
    /// panicking, and `access` propagates that error out of a miss.
    #[test]
    fn corrupted_lru_ranks_report_no_lru_zero_way() {
        let mut c = cache(64, 8, 2);
        for way in &mut c.sets[0].ways {
            way.lru_rank = 1;
        }
        assert_eq!(c.sets[0].lru_victim(), Err(SimError::NoLruZeroWay));
        assert_eq!(c.access(0, MemOp::Read), Err(SimError::NoLruZeroWay));
    }
}
