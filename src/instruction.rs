//! Decoded instruction metadata produced by the (external) instruction
//! emulator and consumed read-only by the pipeline core.
//!
//! This module owns the closed opcode/funct enumerations the hazard
//! detector queries instead of scanning parallel arrays of opcodes,
//! so a new instruction can't silently bypass the classifier.

/// Architectural halt sentinel: `0xfeedfeed`.
pub const HALT_SENTINEL: u32 = 0xfeed_feed;

/// The emulator's next PC after handling an architectural exception.
pub const EXCEPTION_HANDLER_PC: u32 = 0x0000_8000;

/// I-type/R-type opcodes this core's hazard detector understands.
///
/// Only the opcodes the classification tables (§4.2) name are
/// represented; an encoded word whose top six bits don't match any
/// variant decodes to `Opcode::Other` and never participates in hazard
/// checks (it still propagates through the pipeline normally — the
/// hazard detector simply has nothing to say about it).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Opcode {
    /// R-type: operation selected by `funct`.
    #[default]
    RType,
    Addi,
    Addiu,
    Andi,
    Ori,
    Slti,
    Sltiu,
    Lui,
    Lw,
    Lbu,
    Lhu,
    Sw,
    Sb,
    Sh,
    Beq,
    Bne,
    Bgtz,
    Blez,
    Jr,
    /// Any opcode the hazard detector does not classify.
    Other,
}

impl Opcode {
    /// True for the three load opcodes (`LBU, LHU, LW`).
    #[must_use]
    pub fn is_load(self) -> bool {
        matches!(self, Opcode::Lw | Opcode::Lbu | Opcode::Lhu)
    }

    /// True for the three store opcodes (`SB, SH, SW`).
    #[must_use]
    pub fn is_store(self) -> bool {
        matches!(self, Opcode::Sw | Opcode::Sb | Opcode::Sh)
    }

    /// True for two-operand branches (`BEQ, BNE`) that read both RS and RT.
    #[must_use]
    pub fn is_two_operand_branch(self) -> bool {
        matches!(self, Opcode::Beq | Opcode::Bne)
    }

    /// True for one-operand branches (`BGTZ, BLEZ`) that read only RS.
    #[must_use]
    pub fn is_one_operand_branch(self) -> bool {
        matches!(self, Opcode::Bgtz | Opcode::Blez)
    }

    /// True for any branch opcode.
    #[must_use]
    pub fn is_branch(self) -> bool {
        self.is_two_operand_branch() || self.is_one_operand_branch()
    }

    /// True for the "writes-RT producers" class (§4.2): I-type
    /// instructions whose destination register is RT.
    #[must_use]
    pub fn writes_rt(self) -> bool {
        matches!(
            self,
            Opcode::Addi
                | Opcode::Addiu
                | Opcode::Andi
                | Opcode::Lbu
                | Opcode::Lhu
                | Opcode::Lui
                | Opcode::Lw
                | Opcode::Ori
                | Opcode::Slti
                | Opcode::Sltiu
        )
    }

    /// True for the "RS-reader consumers" class (§4.2): instructions
    /// that read the RS field in ID as a source operand. For an R-type
    /// instruction (`opcode == RType`), this only holds for the funct
    /// codes the classifier recognizes as ALU ops — an R-type with an
    /// unclassified funct (e.g. a MULT/DIV/SYSCALL-style encoding this
    /// core doesn't model) reads nothing as far as the hazard detector
    /// is concerned.
    #[must_use]
    pub fn reads_rs(self, funct: Funct) -> bool {
        matches!(
            self,
            Opcode::Addi
                | Opcode::Addiu
                | Opcode::Andi
                | Opcode::Ori
                | Opcode::Slti
                | Opcode::Sltiu
                | Opcode::Lw
                | Opcode::Sh
                | Opcode::Sw
                | Opcode::Lbu
                | Opcode::Lhu
                | Opcode::Sb
                | Opcode::Jr
        ) || (self == Opcode::RType && funct.writes_rd())
    }

    /// True for the "RT-reader consumers" class (§4.2): instructions that
    /// read the RT field in ID as a source operand. Loads are explicitly
    /// excluded — a load's RT is a destination, not a source. As with
    /// [`Opcode::reads_rs`], an R-type instruction only counts if `funct`
    /// is one of the classified ALU ops.
    #[must_use]
    pub fn reads_rt(self, funct: Funct) -> bool {
        self.is_store() || (self == Opcode::RType && funct.writes_rd())
    }
}

/// R-type function codes this core's hazard detector understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Funct {
    #[default]
    Add,
    Addu,
    And,
    Nor,
    Or,
    Slt,
    Sltu,
    Sll,
    Srl,
    Sub,
    Subu,
    /// Any R-type function the hazard detector does not classify.
    Other,
}

impl Funct {
    /// True for the "writes-RD producers" class (§4.2): R-type ALU
    /// operations that write their result to RD.
    #[must_use]
    pub fn writes_rd(self) -> bool {
        !matches!(self, Funct::Other)
    }
}

/// Functional-execution metadata for one dynamic instruction instance.
///
/// Produced by the (external) instruction emulator; the pipeline core
/// treats every field as read-only.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstructionInfo {
    /// Program counter of this instruction.
    pub pc: u32,
    /// Raw 32-bit encoded instruction word. `0` denotes a bubble/NOP.
    pub instruction: u32,
    pub opcode: Opcode,
    pub funct: Funct,
    pub rs: u8,
    pub rt: u8,
    pub rd: u8,
    pub shamt: u8,
    pub immediate: i16,
    pub address: u32,
    /// Effective address computed by functional execution. Valid only
    /// when `opcode.is_load()`.
    pub load_address: u32,
    /// Effective address computed by functional execution. Valid only
    /// when `opcode.is_store()`.
    pub store_address: u32,
    /// `false` iff the encoded word does not decode to a supported
    /// instruction.
    pub is_valid: bool,
    /// `true` iff functional execution detected signed overflow.
    pub is_overflow: bool,
    /// `true` iff this is the architectural halt sentinel.
    pub is_halt: bool,
    /// Monotonically increasing dynamic instance number assigned at IF.
    /// `0` is reserved for bubbles (see `NOP`); the emulator is expected
    /// to number real instructions starting at `1`, which is what lets
    /// the exception tracker (`pipeline::exception`) tell a genuine
    /// invalid-decode instruction apart from an incidental bubble fed in
    /// while it drains toward its detection stage.
    pub instruction_id: u64,
}

impl InstructionInfo {
    /// The canonical bubble/NOP fill value: zero encoded word, all
    /// predicate flags false, register fields zero (so it never
    /// participates in a hazard check).
    pub const NOP: InstructionInfo = InstructionInfo {
        pc: 0,
        instruction: 0,
        opcode: Opcode::RType,
        funct: Funct::Other,
        rs: 0,
        rt: 0,
        rd: 0,
        shamt: 0,
        immediate: 0,
        address: 0,
        load_address: 0,
        store_address: 0,
        is_valid: false,
        is_overflow: false,
        is_halt: false,
        instruction_id: 0,
    };

    /// `true` for the canonical bubble fill (zero encoded word).
    #[must_use]
    pub fn is_bubble(&self) -> bool {
        self.instruction == 0
    }
}

impl Default for InstructionInfo {
    fn default() -> Self {
        Self::NOP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nop_is_bubble_and_inert() {
        let nop = InstructionInfo::NOP;
        assert!(nop.is_bubble());
        assert!(!nop.is_valid);
        assert!(!nop.is_overflow);
        assert!(!nop.is_halt);
        assert_eq!(nop.rs, 0);
        assert_eq!(nop.rt, 0);
        assert_eq!(nop.rd, 0);
    }

    #[test]
    fn opcode_classification_excludes_loads_from_rt_readers() {
        assert!(Opcode::Lw.is_load());
        assert!(!Opcode::Lw.reads_rt(Funct::Other));
        assert!(Opcode::Sw.reads_rt(Funct::Other));
        assert!(!Opcode::Sw.is_load());
    }

    #[test]
    fn r_type_reads_both_rs_and_rt_only_for_a_classified_funct() {
        assert!(Opcode::RType.reads_rs(Funct::Add));
        assert!(Opcode::RType.reads_rt(Funct::Add));
        assert!(!Opcode::RType.reads_rs(Funct::Other));
        assert!(!Opcode::RType.reads_rt(Funct::Other));
    }
}
