//! Pipeline control unit: the five-slot register file (C3's substrate),
//! the advance primitives (C3), the hazard detector (C2), and the
//! exception/halt tracker (C4).

pub mod advance;
pub mod exception;
pub mod hazards;
pub mod registers;

pub use advance::{propagate, squash, stall};
pub use exception::{ExceptionHaltState, ExceptionHaltTracker};
pub use hazards::{DependencyDedupeRing, HazardSignals};
pub use registers::{PipelineRegisters, Stage};
