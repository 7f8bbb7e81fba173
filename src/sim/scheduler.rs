//! Cycle scheduler (C5): the six-step per-cycle orchestration (§4.5)
//! that ties the advance unit, the two caches, the hazard detector, and
//! the exception/halt tracker together. `Scheduler` owns every piece of
//! state that must survive across cycles; it knows nothing about
//! `runCycles`/`runTillHalt` call boundaries — that's `Simulator`'s job.

use crate::cache::{Cache, MemOp};
use crate::error::SimError;
use crate::instruction::InstructionInfo;
use crate::pipeline::hazards::{self, DependencyDedupeRing};
use crate::pipeline::registers::{PipelineRegisters, Stage};
use crate::pipeline::{advance, ExceptionHaltTracker};
use crate::sim::collaborators::Emulator;

/// The four stall latches the scheduler arbitrates between. `Stage::Wb`
/// has no corresponding latch — nothing ever stalls at writeback.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct StallLatches {
    if_stall: bool,
    id_stall: bool,
    ex_stall: bool,
    mem_stall: bool,
}

impl StallLatches {
    /// The stage to pass to [`advance::stall`] this cycle, per the
    /// MEM > EX > ID > IF arbitration (§4.5 detail floor): downstream
    /// stalls take priority because upstream stages are already blocked
    /// by them.
    fn highest_priority(self) -> Option<Stage> {
        if self.mem_stall {
            Some(Stage::Mem)
        } else if self.ex_stall {
            Some(Stage::Ex)
        } else if self.id_stall {
            Some(Stage::Id)
        } else if self.if_stall {
            Some(Stage::If)
        } else {
            None
        }
    }
}

/// Per-cycle orchestration state (§4.5). Constructed once by
/// [`crate::Simulator`] and driven one cycle at a time via [`Scheduler::tick`].
#[derive(Debug)]
pub struct Scheduler {
    regs: PipelineRegisters,
    stalls: StallLatches,
    pending_squash: Option<Stage>,
    icache_delay: u32,
    dcache_delay: u32,
    exception_halt: ExceptionHaltTracker,
    dedupe: DependencyDedupeRing,
    cycle_count: u64,
    load_stalls: u64,
}

/// What happened during one [`Scheduler::tick`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The cycle completed normally; the run may continue.
    Advanced,
    /// A halt instruction retired from WB this cycle. The caller must
    /// stop invoking `tick`.
    Halted,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: PipelineRegisters::new(),
            stalls: StallLatches::default(),
            pending_squash: None,
            icache_delay: 0,
            dcache_delay: 0,
            exception_halt: ExceptionHaltTracker::new(),
            dedupe: DependencyDedupeRing::new(),
            cycle_count: 0,
            load_stalls: 0,
        }
    }

    #[must_use]
    pub fn pipeline_registers(&self) -> &PipelineRegisters {
        &self.regs
    }

    #[must_use]
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    #[must_use]
    pub fn load_stalls(&self) -> u64 {
        self.load_stalls
    }

    /// Runs exactly one cycle per §4.5's six steps.
    ///
    /// # Errors
    ///
    /// Propagates [`SimError`] from the advance unit (only reachable if
    /// the stall arbitration ever named [`Stage::Wb`], which would be a
    /// logic bug in this module, not external input) or from a cache
    /// probe finding no LRU-rank-zero way during miss resolution (§4.1,
    /// §7 — likewise only reachable on a logic bug in the replacement
    /// policy).
    pub fn tick(
        &mut self,
        emulator: &mut dyn Emulator,
        icache: &mut Cache,
        dcache: &mut Cache,
    ) -> Result<TickOutcome, SimError> {
        let stalled_stage = self.advance_pipeline(emulator)?;

        if self.regs.at(Stage::Wb).is_halt {
            self.cycle_count += 1;
            tracing::info!(cycle = self.cycle_count, "halt retired from WB");
            return Ok(TickOutcome::Halted);
        }

        self.probe_caches_and_derive_stalls(stalled_stage, icache, dcache)?;
        self.detect_hazards();
        self.latch_exception_or_halt();

        self.cycle_count += 1;
        tracing::trace!(
            cycle = self.cycle_count,
            if_pc = self.regs.at(Stage::If).pc,
            raw_words = ?self.regs.raw_words(),
            if_stall = self.stalls.if_stall,
            id_stall = self.stalls.id_stall,
            mem_stall = self.stalls.mem_stall,
            "cycle advanced"
        );
        Ok(TickOutcome::Advanced)
    }

    /// Step 1: apply the asserted stall, or a deferred squash followed by
    /// a normal/bubble-fed propagate. Returns the stage that was stalled
    /// this cycle, if any — step 3 needs it to decide whether to skip a
    /// cache probe for a slot that didn't move.
    fn advance_pipeline(&mut self, emulator: &mut dyn Emulator) -> Result<Option<Stage>, SimError> {
        if let Some(stage) = self.stalls.highest_priority() {
            self.regs = advance::stall(&self.regs, stage)?;
            return Ok(Some(stage));
        }

        let base = match self.pending_squash.take() {
            Some(stage) => advance::squash(&self.regs, stage),
            None => self.regs,
        };

        let incoming = if self.exception_halt.is_handling() {
            InstructionInfo::NOP
        } else {
            emulator.execute_instruction()
        };

        self.regs = advance::propagate(&base, incoming);
        Ok(None)
    }

    /// Step 3: reset the latches, probe each cache at most once for the
    /// slot that's actually eligible this cycle, and re-derive the
    /// stalls from the miss-delay countdowns.
    fn probe_caches_and_derive_stalls(
        &mut self,
        stalled_stage: Option<Stage>,
        icache: &mut Cache,
        dcache: &mut Cache,
    ) -> Result<(), SimError> {
        self.stalls = StallLatches::default();

        let if_slot = *self.regs.at(Stage::If);
        if stalled_stage.is_none() && !if_slot.is_bubble() {
            let hit = icache.access(if_slot.pc, MemOp::Read)?;
            if !hit {
                self.icache_delay = icache.miss_latency();
            }
        }

        let mem_slot = *self.regs.at(Stage::Mem);
        let mem_was_stalled = stalled_stage == Some(Stage::Mem);
        if !mem_was_stalled && !mem_slot.is_bubble() && (mem_slot.opcode.is_load() || mem_slot.opcode.is_store())
        {
            let (address, op) = if mem_slot.opcode.is_load() {
                (mem_slot.load_address, MemOp::Read)
            } else {
                (mem_slot.store_address, MemOp::Write)
            };
            let hit = dcache.access(address, op)?;
            if !hit {
                self.dcache_delay = dcache.miss_latency();
            }
        }

        self.stalls.if_stall = self.icache_delay > 0;
        self.stalls.mem_stall = self.dcache_delay > 0;
        self.icache_delay = self.icache_delay.saturating_sub(1);
        self.dcache_delay = self.dcache_delay.saturating_sub(1);
        Ok(())
    }

    /// Step 4: OR the three hazard classes into `ID_stall` (§4.5 permits
    /// collapsing all three into the ID/EX boundary stall since
    /// `advance::stall(Id)` already produces exactly the bubble each
    /// class needs).
    fn detect_hazards(&mut self) {
        let (signals, new_load_stalls) = hazards::detect(&self.regs, &mut self.dedupe);
        self.load_stalls += new_load_stalls;
        if signals.any() {
            self.stalls.id_stall = true;
        }
    }

    /// Step 5: let the exception/halt tracker inspect the post-advance
    /// registers and schedule next cycle's squash, if any.
    fn latch_exception_or_halt(&mut self) {
        self.pending_squash = self.exception_halt.observe(&self.regs);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
