//! In-memory test doubles for the [`crate::sim::Emulator`] and
//! [`crate::sim::OutputSink`] collaborator traits.
//!
//! A hand-written deterministic double for the "plays back a scripted
//! instruction stream" case, plus a recording sink for asserting on
//! what the driver emitted. Gated behind
//! `#[cfg(any(test, feature = "test-utils"))]` so downstream integration
//! tests can pull it in without shipping it in a plain release build.

use crate::instruction::InstructionInfo;
use crate::sim::{Emulator, OutputSink, PipelineSnapshot};
use crate::stats::SimulationStats;

/// An [`Emulator`] that plays back a fixed, pre-decoded instruction
/// stream and returns [`InstructionInfo::NOP`] forever once exhausted —
/// exactly the "drain to bubbles" behavior a real emulator never
/// exhibits, but which lets scripted tests run a fixed program without a
/// halt instruction and simply stop via `run_cycles(n)`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedEmulator {
    script: Vec<InstructionInfo>,
    cursor: usize,
    din: u64,
}

impl ScriptedEmulator {
    /// Builds an emulator that will return each of `script`'s entries in
    /// order, one per [`Emulator::execute_instruction`] call, then
    /// bubbles forever.
    #[must_use]
    pub fn new(script: Vec<InstructionInfo>) -> Self {
        Self {
            script,
            cursor: 0,
            din: 0,
        }
    }
}

impl Emulator for ScriptedEmulator {
    fn execute_instruction(&mut self) -> InstructionInfo {
        let info = self
            .script
            .get(self.cursor)
            .copied()
            .unwrap_or(InstructionInfo::NOP);
        self.cursor += 1;
        if !info.is_bubble() {
            self.din += 1;
        }
        info
    }

    fn din(&self) -> u64 {
        self.din
    }

    fn dump_reg_mem(&mut self, _basename: &str) {}
}

/// An [`OutputSink`] that records every snapshot and the final stats
/// record in memory instead of writing to a file, so tests can assert
/// on exactly what the driver emitted.
#[derive(Clone, Debug, Default)]
pub struct RecordingOutputSink {
    /// Every [`PipelineSnapshot`] handed to `dump_pipe_state`, in order.
    pub snapshots: Vec<PipelineSnapshot>,
    /// The `SimulationStats` record handed to `dump_sim_stats`, if
    /// `finalize` has been called.
    pub stats: Option<SimulationStats>,
}

impl RecordingOutputSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for RecordingOutputSink {
    fn dump_pipe_state(&mut self, snapshot: PipelineSnapshot, _basename: &str) {
        self.snapshots.push(snapshot);
    }

    fn dump_sim_stats(&mut self, stats: SimulationStats, _basename: &str) {
        self.stats = Some(stats);
    }
}
