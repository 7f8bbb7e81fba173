//! The driver layer: external collaborator traits (C6 boundary), the
//! per-cycle scheduler (C5), and the public `Simulator` API (C6).

pub mod collaborators;
pub mod scheduler;
pub mod simulator;

pub use collaborators::{Emulator, OutputSink, PipelineSnapshot};
pub use simulator::{SimConfig, Simulator, Status};
