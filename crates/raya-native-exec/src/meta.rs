//! Per-function instruction metadata handed over by the bytecode decoder
//!
//! The decoder owns these records; the scanner and backends only read them.

use rustc_hash::FxHashSet;

/// Byte offsets that some branch in the function may jump to
pub type InboundTargets = FxHashSet<usize>;

/// One decoded opcode occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionMetadata {
    /// Opcode byte
    pub op: u8,
    /// Byte offset of this instruction in the function's instruction stream
    pub start: usize,
    /// Number of bytes the instruction occupies (opcode + immediates)
    pub size: usize,
}

impl InstructionMetadata {
    /// Offset one past the last byte of this instruction
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.size
    }
}

/// Decoded view of one function body
#[derive(Debug, Clone, Default)]
pub struct BytecodeMetadata {
    /// Instructions in stream order
    pub instructions: Vec<InstructionMetadata>,
    /// Offsets reachable through branches
    pub inbound_targets: InboundTargets,
}

impl BytecodeMetadata {
    /// Create metadata from already-decoded parts
    pub fn new(instructions: Vec<InstructionMetadata>, inbound_targets: InboundTargets) -> Self {
        BytecodeMetadata {
            instructions,
            inbound_targets,
        }
    }

    /// Append an instruction directly after the previous one.
    ///
    /// Returns the start offset assigned to it.
    pub fn push(&mut self, op: u8, size: usize) -> usize {
        let start = self.instructions.last().map_or(0, InstructionMetadata::end);
        self.instructions.push(InstructionMetadata { op, start, size });
        start
    }

    /// Record that `offset` is the destination of some branch
    pub fn add_inbound_target(&mut self, offset: usize) {
        self.inbound_targets.insert(offset);
    }

    /// Whether a branch lands on `offset`
    #[inline]
    pub fn is_inbound_target(&self, offset: usize) -> bool {
        self.inbound_targets.contains(&offset)
    }

    /// Total bytecode length covered by the instructions
    pub fn code_len(&self) -> usize {
        self.instructions.last().map_or(0, InstructionMetadata::end)
    }
}
