//! Hazard detector (C2): a pure function over the five in-flight
//! instructions, plus the bounded dependency-dedupe ring used to avoid
//! double-counting `loadStalls` across the two-cycle window a load-use
//! or load-branch hazard can span (§4.2).

use crate::instruction::InstructionInfo;
use crate::pipeline::registers::{PipelineRegisters, Stage};

/// Bounded ordered set of at most five recent `(consumer din, producer
/// din)` pairs, used to dedupe repeated hazard detections for the same
/// dynamic instruction pair (§4.2, §5 — "No operation may allocate
/// without bound").
#[derive(Clone, Debug, Default)]
pub struct DependencyDedupeRing {
    entries: [(u64, u64); 5],
    len: usize,
    next: usize,
}

impl DependencyDedupeRing {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn contains(&self, pair: (u64, u64)) -> bool {
        self.entries[..self.len].contains(&pair)
    }

    fn insert(&mut self, pair: (u64, u64)) {
        self.entries[self.next] = pair;
        self.next = (self.next + 1) % self.entries.len();
        self.len = (self.len + 1).min(self.entries.len());
    }

    /// Records `pair` if not already present, returning whether it was
    /// newly recorded (i.e. whether a counter tracking distinct pairs
    /// should increment).
    fn record_if_new(&mut self, pair: (u64, u64)) -> bool {
        if self.contains(pair) {
            false
        } else {
            self.insert(pair);
            true
        }
    }
}

/// The three stall signals the hazard detector can assert in one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HazardSignals {
    pub load_use_stall: bool,
    pub load_branch_stall: bool,
    pub arithmetic_branch_stall: bool,
}

impl HazardSignals {
    #[must_use]
    pub fn any(self) -> bool {
        self.load_use_stall || self.load_branch_stall || self.arithmetic_branch_stall
    }
}

fn producer_dest_reg(producer: &InstructionInfo) -> Option<u8> {
    if producer.opcode.writes_rt() && producer.rt != 0 {
        Some(producer.rt)
    } else if producer.opcode == crate::instruction::Opcode::RType
        && producer.funct.writes_rd()
        && producer.rd != 0
    {
        Some(producer.rd)
    } else {
        None
    }
}

fn consumer_reads(consumer: &InstructionInfo, reg: u8) -> bool {
    (consumer.opcode.reads_rs(consumer.funct) && consumer.rs == reg)
        || (consumer.opcode.reads_rt(consumer.funct) && consumer.rt == reg)
}

fn branch_sources(branch: &InstructionInfo) -> (Option<u8>, Option<u8>) {
    if branch.opcode.is_two_operand_branch() {
        (Some(branch.rs), Some(branch.rt))
    } else if branch.opcode.is_one_operand_branch() {
        (Some(branch.rs), None)
    } else {
        (None, None)
    }
}

/// Runs the hazard detector over the current in-flight snapshot,
/// recording newly-detected load-use/load-branch pairs in `dedupe` and
/// returning the three stall signals plus how many *distinct* pairs were
/// newly recorded this cycle (the amount `loadStalls` should increment
/// by; always 0 or 1 in practice, since ID holds at most one consumer).
pub fn detect(regs: &PipelineRegisters, dedupe: &mut DependencyDedupeRing) -> (HazardSignals, u64) {
    let id = regs.at(Stage::Id);
    let ex = regs.at(Stage::Ex);
    let mem = regs.at(Stage::Mem);

    let mut signals = HazardSignals::default();
    let mut new_load_stalls = 0u64;

    // Load-use: load in EX, ID instruction reads the load's RT.
    if ex.opcode.is_load() && ex.rt != 0 && consumer_reads(id, ex.rt) {
        signals.load_use_stall = true;
        tracing::debug!(consumer = id.instruction_id, producer = ex.instruction_id, "load-use hazard");
        if dedupe.record_if_new((id.instruction_id, ex.instruction_id)) {
            new_load_stalls += 1;
        }
    }

    // Load-branch: branch in ID, producing load in EX or MEM.
    if id.opcode.is_branch() {
        let (rs, rt) = branch_sources(id);
        for producer in [ex, mem] {
            if !producer.opcode.is_load() || producer.rt == 0 {
                continue;
            }
            let matches = rs == Some(producer.rt) || rt == Some(producer.rt);
            if matches {
                signals.load_branch_stall = true;
                tracing::debug!(
                    consumer = id.instruction_id,
                    producer = producer.instruction_id,
                    "load-branch hazard"
                );
                if dedupe.record_if_new((id.instruction_id, producer.instruction_id)) {
                    new_load_stalls += 1;
                }
            }
        }
    }

    // Arithmetic-branch: branch in ID, ALU producer still in EX. Loads
    // are excluded here — a load producer in EX is a load-branch
    // hazard, handled above, not an arithmetic one.
    if id.opcode.is_branch() && !ex.opcode.is_load() {
        if let Some(dest) = producer_dest_reg(ex) {
            let (rs, rt) = branch_sources(id);
            if rs == Some(dest) || rt == Some(dest) {
                signals.arithmetic_branch_stall = true;
                tracing::debug!(
                    consumer = id.instruction_id,
                    producer = ex.instruction_id,
                    "arithmetic-branch hazard"
                );
                // Arithmetic-branch stalls never touch loadStalls/dedupe —
                // only load-use and load-branch hazards are counted.
            }
        }
    }

    (signals, new_load_stalls)
}
