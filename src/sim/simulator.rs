//! Public driver API (C6): `Simulator`, `SimConfig`, `Status`.
//!
//! `Simulator::new` takes a single validated [`SimConfig`] covering both
//! caches and returns `Result<Simulator, SimError>` instead of an
//! out-parameter status code.

use crate::cache::{Cache, CacheConfig, CacheKind};
use crate::error::SimError;
use crate::pipeline::Stage;
use crate::sim::collaborators::{Emulator, OutputSink, PipelineSnapshot};
use crate::sim::scheduler::{Scheduler, TickOutcome};
use crate::stats::SimulationStats;

/// The two cache configurations a simulation run is parameterized by
/// (§3, §4.6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    pub icache: CacheConfig,
    pub dcache: CacheConfig,
}

/// Outcome of a driver call (§7).
#[derive(Debug)]
pub enum Status {
    /// The requested cycles completed without reaching a halt.
    Success,
    /// The pipeline drained a halt instruction out of WB.
    Halt,
    /// An unrecoverable programming invariant was violated.
    Error(SimError),
}

/// Owns the pipeline, both caches, and the two external collaborators
/// for one simulation run (§5: "explicit simulator context" REDESIGN,
/// replacing module-level global mutable state).
pub struct Simulator {
    icache: Cache,
    dcache: Cache,
    scheduler: Scheduler,
    emulator: Box<dyn Emulator>,
    output: Box<dyn OutputSink>,
    output_basename: String,
    halted: bool,
}

impl Simulator {
    /// Validates `config`, constructs both caches, and binds the two
    /// external collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidCacheConfig`] if either cache
    /// configuration fails validation (§3).
    pub fn new(
        config: SimConfig,
        emulator: Box<dyn Emulator>,
        output: Box<dyn OutputSink>,
        output_basename: impl Into<String>,
    ) -> Result<Self, SimError> {
        config.icache.validate(CacheKind::Instruction)?;
        config.dcache.validate(CacheKind::Data)?;

        Ok(Self {
            icache: Cache::new(config.icache, CacheKind::Instruction),
            dcache: Cache::new(config.dcache, CacheKind::Data),
            scheduler: Scheduler::new(),
            emulator,
            output,
            output_basename: output_basename.into(),
            halted: false,
        })
    }

    /// Drives up to `n` cycles (`n == 0` means unbounded), stopping early
    /// on a halt. Each completed cycle's pipeline contents are handed to
    /// the output sink as one [`PipelineSnapshot`] row, matching the
    /// "one row per cycle" contract (§6) — except the cycle a halt
    /// retires from WB, which step 2 (§4.5) returns on before step 6's
    /// snapshot emission is ever reached, so no row is emitted for it.
    pub fn run_cycles(&mut self, n: u64) -> Status {
        if self.halted {
            return Status::Halt;
        }

        let unbounded = n == 0;
        let mut remaining = n;
        loop {
            if !unbounded && remaining == 0 {
                return Status::Success;
            }

            match self.scheduler.tick(self.emulator.as_mut(), &mut self.icache, &mut self.dcache) {
                Ok(outcome) => {
                    if outcome == TickOutcome::Halted {
                        self.halted = true;
                        return Status::Halt;
                    }
                    self.emit_snapshot();
                    if !unbounded {
                        remaining -= 1;
                    }
                }
                Err(error) => {
                    tracing::error!(%error, "fatal invariant violation, aborting run");
                    return Status::Error(error);
                }
            }
        }
    }

    /// Repeatedly invokes `run_cycles(1)` until it reports `Halt` (or an
    /// error). `run_cycles(a); run_cycles(b)` matches `run_cycles(a + b)`
    /// for any split, so chaining single-cycle calls here is equivalent
    /// to one bulk call.
    pub fn run_till_halt(&mut self) -> Status {
        loop {
            match self.run_cycles(1) {
                Status::Success => {}
                terminal => return terminal,
            }
        }
    }

    /// Emits the final architectural dump and the [`SimulationStats`]
    /// record (§4.6).
    pub fn finalize(&mut self) -> Status {
        self.emulator.dump_reg_mem(&self.output_basename);

        let stats = SimulationStats {
            dynamic_instructions: self.emulator.din(),
            cycle_count: self.scheduler.cycle_count(),
            i_hits: self.icache.hits(),
            i_misses: self.icache.misses(),
            d_hits: self.dcache.hits(),
            d_misses: self.dcache.misses(),
            load_stalls: self.scheduler.load_stalls(),
        };
        self.output.dump_sim_stats(stats, &self.output_basename);
        Status::Success
    }

    fn emit_snapshot(&mut self) {
        let regs = self.scheduler.pipeline_registers();
        let snapshot = PipelineSnapshot {
            cycle: self.scheduler.cycle_count(),
            if_instr: regs.at(Stage::If).instruction,
            id_instr: regs.at(Stage::Id).instruction,
            ex_instr: regs.at(Stage::Ex).instruction,
            mem_instr: regs.at(Stage::Mem).instruction,
            wb_instr: regs.at(Stage::Wb).instruction,
        };
        self.output.dump_pipe_state(snapshot, &self.output_basename);
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("icache", &self.icache)
            .field("dcache", &self.dcache)
            .field("scheduler", &self.scheduler)
            .field("output_basename", &self.output_basename)
            .field("halted", &self.halted)
            .finish_non_exhaustive()
    }
}
