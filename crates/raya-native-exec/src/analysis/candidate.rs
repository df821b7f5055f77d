//! Compilation candidates: bytecode ranges selected for native code

use std::ops::Range;

use super::metrics::Metrics;

/// A contiguous run of instructions a backend may translate to native code
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationCandidate {
    /// Byte offset of the first instruction
    pub start: usize,
    /// Byte offset one past the last instruction
    pub end: usize,
    /// Index of the first instruction
    pub start_instruction: usize,
    /// Index one past the last instruction
    pub end_instruction: usize,
    /// Heuristics about the instructions in the range
    pub metrics: Metrics,
}

impl CompilationCandidate {
    /// Byte range in the bytecode this candidate would replace (end exclusive)
    #[inline]
    pub fn bounds(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Instruction indices covered by this candidate
    #[inline]
    pub fn instruction_range(&self) -> Range<usize> {
        self.start_instruction..self.end_instruction
    }

    /// Number of instructions in the candidate
    #[inline]
    pub fn len(&self) -> usize {
        self.end_instruction - self.start_instruction
    }

    /// True before the first instruction has been accepted
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.metrics.all_ops == 0
    }

    pub(crate) fn reset(&mut self) {
        *self = CompilationCandidate::default();
    }
}
