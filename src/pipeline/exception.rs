//! Exception & halt tracker (C4): an explicit three-state machine in
//! place of a pair of independent `handling_exception`/`handling_halt`
//! booleans, which made it easy to end up in combinations that didn't
//! correspond to any real pipeline condition.
//!
//! Exceptions are imprecise: the fault is detected when the faulting
//! instruction reaches the stage that would physically detect it
//! (invalid decode → ID; signed overflow → EX). Detection schedules a
//! squash at that stage on the *next* cycle and returns to `Normal`.

use crate::pipeline::registers::{PipelineRegisters, Stage};

/// The tracker's state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExceptionHaltState {
    #[default]
    Normal,
    /// An exception was observed in IF; waiting for the faulting
    /// instruction (identified by its `din`) to reach its detection
    /// stage. Tracking by `din` rather than by stage contents alone
    /// matters because bubbles fed in while handling are also
    /// `!is_valid` (they're NOPs) and must not be mistaken for the
    /// original faulting instruction.
    ExceptionPending { triggering_din: u64 },
    /// A halt instruction has entered the pipeline; sticky for the rest
    /// of the run.
    HaltDraining,
}

/// Tracks the exception/halt state machine across cycles and decides
/// whether a squash should be applied and at which stage.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExceptionHaltTracker {
    state: ExceptionHaltState,
}

impl ExceptionHaltTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> ExceptionHaltState {
        self.state
    }

    /// Once latched, halt-draining is sticky for the rest of the run.
    #[must_use]
    pub fn is_halt_draining(&self) -> bool {
        self.state == ExceptionHaltState::HaltDraining
    }

    /// True while either an exception or a halt is in flight: the
    /// scheduler should feed bubbles to `propagate` instead of fetching
    /// a new instruction from the emulator.
    #[must_use]
    pub fn is_handling(&self) -> bool {
        matches!(
            self.state,
            ExceptionHaltState::ExceptionPending { .. } | ExceptionHaltState::HaltDraining
        )
    }

    /// Observes the updated pipeline registers after this cycle's
    /// advance and returns the squash target to apply *next* cycle, if
    /// any.
    ///
    /// Mirrors `handleHalt()`/`handleException()` (§4.4): halt latching
    /// is checked first and is sticky; exception detection only
    /// progresses the state machine while not already halt-draining.
    /// Halt and exception handling are logically separate latches that
    /// happen to share the "feed bubbles" behavior.
    pub fn observe(&mut self, regs: &PipelineRegisters) -> Option<Stage> {
        if regs.at(Stage::If).is_halt {
            self.state = ExceptionHaltState::HaltDraining;
        }

        if self.is_halt_draining() {
            return None;
        }

        match self.state {
            ExceptionHaltState::Normal => {
                let if_slot = regs.at(Stage::If);
                if if_slot.is_overflow || !if_slot.is_valid {
                    // Detection stage depends on which condition fired:
                    // invalid decode is caught in ID, overflow in EX. At
                    // the moment of latching we don't yet know which one
                    // will still be true once the instruction reaches
                    // its stage, so both are watched for on later calls,
                    // keyed to this specific instruction's din so a
                    // bubble fed in ahead of it (also `!is_valid`, being
                    // a NOP) can't be mistaken for it.
                    self.state = ExceptionHaltState::ExceptionPending {
                        triggering_din: if_slot.instruction_id,
                    };
                }
                None
            }
            ExceptionHaltState::ExceptionPending { triggering_din } => {
                let id_slot = regs.at(Stage::Id);
                let ex_slot = regs.at(Stage::Ex);
                if id_slot.instruction_id == triggering_din && !id_slot.is_valid {
                    self.state = ExceptionHaltState::Normal;
                    Some(Stage::Id)
                } else if ex_slot.instruction_id == triggering_din && ex_slot.is_overflow {
                    self.state = ExceptionHaltState::Normal;
                    Some(Stage::Ex)
                } else {
                    None
                }
            }
            ExceptionHaltState::HaltDraining => unreachable!("handled above"),
        }
    }
}
