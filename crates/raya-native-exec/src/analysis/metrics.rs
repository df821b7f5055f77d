//! Instruction-mix heuristics attached to compilation candidates
//!
//! The numbers here feed the backend's cost model. The scanner never uses them
//! to decide where a candidate starts or ends.

use std::ops::AddAssign;

use crate::ops::Opcode;

/// Summary of the operand traffic and instruction mix of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    /// Linear-memory loads
    pub memory_reads: usize,
    /// Linear-memory stores
    pub memory_writes: usize,
    /// Operand-stack pops
    pub stack_reads: usize,
    /// Operand-stack pushes
    pub stack_writes: usize,

    /// Every instruction in the run, classified or not
    pub all_ops: usize,
    /// Integer operations
    pub integer_ops: usize,
    /// Floating-point operations
    pub float_ops: usize,
}

impl Metrics {
    /// Zero all counters
    #[inline]
    pub fn reset(&mut self) {
        *self = Metrics::default();
    }

    /// Contribution of a single instruction with opcode byte `op`.
    ///
    /// `all_ops` is always 1. Opcodes missing from the table contribute nothing
    /// else.
    pub fn for_opcode(op: u8) -> Metrics {
        let mut m = Metrics {
            all_ops: 1,
            ..Metrics::default()
        };

        let Some(opcode) = Opcode::from_u8(op) else {
            return m;
        };

        // Add to this table as backends support more opcodes.
        match opcode {
            Opcode::I64Const | Opcode::GetLocal => {
                m.integer_ops = 1;
                m.stack_writes = 1;
            }
            Opcode::SetLocal => {
                m.integer_ops = 1;
                m.stack_reads = 1;
            }
            Opcode::I64Eqz => {
                m.integer_ops = 1;
                m.stack_reads = 1;
                m.stack_writes = 1;
            }
            Opcode::I64Eq | Opcode::I64Ne
            | Opcode::I64LtU | Opcode::I64GtU | Opcode::I64LeU | Opcode::I64GeU
            | Opcode::I64Shl | Opcode::I64ShrU | Opcode::I64ShrS
            | Opcode::I64DivU | Opcode::I64RemU | Opcode::I64DivS | Opcode::I64RemS
            | Opcode::I64Add | Opcode::I64Sub | Opcode::I64Mul
            | Opcode::I64And | Opcode::I64Or | Opcode::I64Xor => {
                m.integer_ops = 1;
                m.stack_reads = 2;
                m.stack_writes = 1;
            }
            _ => {}
        }
        m
    }
}

impl AddAssign for Metrics {
    fn add_assign(&mut self, rhs: Metrics) {
        self.memory_reads += rhs.memory_reads;
        self.memory_writes += rhs.memory_writes;
        self.stack_reads += rhs.stack_reads;
        self.stack_writes += rhs.stack_writes;
        self.all_ops += rhs.all_ops;
        self.integer_ops += rhs.integer_ops;
        self.float_ops += rhs.float_ops;
    }
}
