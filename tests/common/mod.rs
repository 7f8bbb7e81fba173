//! Shared instruction-builder helpers for the integration test suite.
//!
//! These construct pre-decoded [`InstructionInfo`] values directly —
//! this crate never decodes raw MIPS words itself (that's the external
//! emulator's job), so tests script the *already-decoded* metadata the
//! emulator would have handed back.

#![allow(dead_code)] // not every helper is used by every test binary

use mips_pipe_core::{
    Funct, InstructionInfo, Opcode, OutputSink, PipelineSnapshot, SimulationStats,
    EXCEPTION_HANDLER_PC, HALT_SENTINEL,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Installs a `tracing-subscriber` `fmt` layer the first time any test
/// calls it, so the `trace!`/`debug!` events the scheduler and hazard
/// detector emit are visible with `cargo test -- --nocapture` (filtered
/// by `RUST_LOG`, e.g. `RUST_LOG=mips_pipe_core=debug`). Idempotent —
/// every scenario test calls this, only the first call installs anything.
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// An [`OutputSink`] that forwards every call to a shared, interior-
/// mutable [`RecordingOutputSink`], letting a test keep a handle it can
/// inspect after [`mips_pipe_core::Simulator`] has taken ownership of
/// the boxed sink. Single-threaded, so `Rc<RefCell<_>>` is enough —
/// no need for `Arc<Mutex<_>>`.
#[derive(Clone, Default)]
pub struct SharedSink(pub Rc<RefCell<mips_pipe_core::testing::RecordingOutputSink>>);

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for SharedSink {
    fn dump_pipe_state(&mut self, snapshot: PipelineSnapshot, basename: &str) {
        self.0.borrow_mut().dump_pipe_state(snapshot, basename);
    }

    fn dump_sim_stats(&mut self, stats: SimulationStats, basename: &str) {
        self.0.borrow_mut().dump_sim_stats(stats, basename);
    }
}

/// A plain non-memory, non-branching instruction with a fresh `din`.
/// Counts as valid, touches no registers, never halts or overflows.
pub fn plain(pc: u32, din: u64) -> InstructionInfo {
    InstructionInfo {
        pc,
        instruction: pc + 1, // any nonzero word; only `0` means bubble
        instruction_id: din,
        is_valid: true,
        ..InstructionInfo::NOP
    }
}

/// `LW $rt, offset($rs)` with a given effective load address.
pub fn lw(pc: u32, din: u64, rs: u8, rt: u8, load_address: u32) -> InstructionInfo {
    InstructionInfo {
        opcode: Opcode::Lw,
        rs,
        rt,
        load_address,
        ..plain(pc, din)
    }
}

/// `SW $rt, offset($rs)` with a given effective store address.
pub fn sw(pc: u32, din: u64, rs: u8, rt: u8, store_address: u32) -> InstructionInfo {
    InstructionInfo {
        opcode: Opcode::Sw,
        rs,
        rt,
        store_address,
        ..plain(pc, din)
    }
}

/// R-type `ADD $rd, $rs, $rt`.
pub fn add(pc: u32, din: u64, rs: u8, rt: u8, rd: u8) -> InstructionInfo {
    InstructionInfo {
        opcode: Opcode::RType,
        funct: Funct::Add,
        rs,
        rt,
        rd,
        ..plain(pc, din)
    }
}

/// `ADDI $rt, $rs, immediate`.
pub fn addi(pc: u32, din: u64, rs: u8, rt: u8, immediate: i16) -> InstructionInfo {
    InstructionInfo {
        opcode: Opcode::Addi,
        rs,
        rt,
        immediate,
        ..plain(pc, din)
    }
}

/// `BEQ $rs, $rt, offset`.
pub fn beq(pc: u32, din: u64, rs: u8, rt: u8) -> InstructionInfo {
    InstructionInfo {
        opcode: Opcode::Beq,
        rs,
        rt,
        ..plain(pc, din)
    }
}

/// The architectural halt sentinel.
pub fn halt(pc: u32, din: u64) -> InstructionInfo {
    InstructionInfo {
        instruction: HALT_SENTINEL,
        is_halt: true,
        ..plain(pc, din)
    }
}

/// An `ADDI` that functional execution has flagged as a signed overflow.
pub fn overflowing_addi(pc: u32, din: u64, rs: u8, rt: u8) -> InstructionInfo {
    InstructionInfo {
        is_overflow: true,
        ..addi(pc, din, rs, rt, i16::MAX)
    }
}

/// The handler instruction the emulator fetches after redirecting PC to
/// [`EXCEPTION_HANDLER_PC`] — just another plain instruction, but at the
/// architecturally-meaningful address so tests can assert on it.
pub fn handler_entry(din: u64) -> InstructionInfo {
    plain(EXCEPTION_HANDLER_PC, din)
}

/// An instruction that fails to decode (`is_valid = false`).
pub fn invalid(pc: u32, din: u64) -> InstructionInfo {
    InstructionInfo {
        is_valid: false,
        instruction: pc + 1,
        instruction_id: din,
        ..InstructionInfo::NOP
    }
}
