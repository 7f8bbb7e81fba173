//! Core of a cycle-accurate functional simulator for a five-stage
//! in-order MIPS pipeline with split instruction/data caches.
//!
//! This crate implements exactly the two tightly coupled subsystems whose
//! joint correctness is the hard engineering problem:
//! 1. **Pipeline control** ([`pipeline`]): advancing five in-flight
//!    instructions per cycle through `{IF, ID, EX, MEM, WB}` while
//!    honoring structural stalls, data hazards, imprecise exception
//!    handling, halt draining, and cache-miss stalls.
//! 2. **Cache model** ([`cache`]): set-associative addressing, tag
//!    matching, LRU replacement, and hit/miss accounting.
//!
//! The instruction emulator, the backing memory store, the output
//! dumper, program loading, and CLI/config parsing are deliberately out
//! of scope — this crate depends on the first two as the [`Emulator`]
//! and [`OutputSink`] traits ([`sim::collaborators`]) and never
//! implements them.
//!
//! The [`Simulator`] type is the public entry point: construct one with
//! [`Simulator::new`], drive it with [`Simulator::run_cycles`] or
//! [`Simulator::run_till_halt`], and call [`Simulator::finalize`] exactly
//! once at the end of a run.

/// Set-associative cache model (C1): a behavioral hit/miss oracle with
/// LRU replacement.
pub mod cache;
/// Ambient error types backing `Status::Error` (C7).
pub mod error;
/// Decoded instruction metadata produced by the external emulator
/// (the data model shared by every other module).
pub mod instruction;
/// Pipeline control unit: register file, advance primitives, hazard
/// detector, and exception/halt tracker (C2-C4).
pub mod pipeline;
/// Cycle scheduler and public driver API (C5-C6).
pub mod sim;
/// Final simulation statistics (`finalize`'s output record).
pub mod stats;
/// In-memory test doubles for the [`Emulator`] and [`OutputSink`]
/// collaborator traits, shared between this crate's own unit tests and
/// its `tests/` integration suite.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use cache::{Cache, CacheConfig, CacheKind, MemOp};
pub use error::SimError;
pub use instruction::{Funct, InstructionInfo, Opcode, EXCEPTION_HANDLER_PC, HALT_SENTINEL};
pub use pipeline::{
    DependencyDedupeRing, ExceptionHaltState, ExceptionHaltTracker, HazardSignals,
    PipelineRegisters, Stage,
};
pub use sim::{Emulator, OutputSink, PipelineSnapshot, SimConfig, Simulator, Status};
pub use stats::SimulationStats;
