//! Final simulation statistics: the record `finalize` hands to the
//! output dumper.

/// The counters `finalize` reports. Deliberately just dynamic
/// instructions, cycle count, per-cache hit/miss pairs, and load
/// stalls — this core has no branch predictor, no FP pipeline, and no
/// privilege modes to report statistics for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationStats {
    pub dynamic_instructions: u64,
    pub cycle_count: u64,
    pub i_hits: u64,
    pub i_misses: u64,
    pub d_hits: u64,
    pub d_misses: u64,
    pub load_stalls: u64,
}
