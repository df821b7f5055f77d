//! Native blocks and the per-function table the interpreter dispatches through

use crate::analysis::CompilationCandidate;
use crate::runtime::trampoline::{self, CodeSlot};
use crate::runtime::ExecutableRegion;

/// Compiled native code standing in for one candidate's bytecode range
#[derive(Debug)]
pub struct NativeBlock {
    candidate: CompilationCandidate,
    region: ExecutableRegion,
    slot: CodeSlot,
}

impl NativeBlock {
    /// Wrap a loaded region; the slot starts out pointing at its first byte
    pub fn new(candidate: CompilationCandidate, region: ExecutableRegion) -> Self {
        let slot = CodeSlot::new(region.as_ptr());
        NativeBlock {
            candidate,
            region,
            slot,
        }
    }

    /// Bytecode offset where the interpreter enters this block
    pub fn start(&self) -> usize {
        self.candidate.start
    }

    /// Bytecode offset where the interpreter resumes afterwards
    pub fn resume_offset(&self) -> usize {
        self.candidate.end
    }

    /// The bytecode range this block replaces
    pub fn candidate(&self) -> &CompilationCandidate {
        &self.candidate
    }

    /// The executable memory backing this block
    pub fn region(&self) -> &ExecutableRegion {
        &self.region
    }

    /// The slot the trampoline jumps through
    pub fn slot(&self) -> &CodeSlot {
        &self.slot
    }

    /// Run the block against one interpreter frame and return the bytecode
    /// offset to resume at.
    ///
    /// # Safety
    /// `stack` and `locals` must be the live storage of a frame of the function
    /// this block was compiled from, sized for everything the block touches.
    /// If the slot has been retargeted, the new code must outlive the call.
    pub unsafe fn execute(&self, stack: &mut [u64], locals: &mut [u64]) -> usize {
        trampoline::invoke(&self.slot, stack, locals);
        self.candidate.end
    }
}

/// All native blocks of one function, ordered by start offset
#[derive(Debug, Default)]
pub struct NativeBlockTable {
    blocks: Vec<NativeBlock>,
}

impl NativeBlockTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block. Blocks must arrive in ascending, non-overlapping order.
    pub fn push(&mut self, block: NativeBlock) {
        debug_assert!(
            self.blocks.last().map_or(true, |prev| prev.resume_offset() <= block.start()),
            "native blocks must be pushed in ascending order"
        );
        self.blocks.push(block);
    }

    /// The block entered at bytecode offset `offset`, if any
    pub fn lookup(&self, offset: usize) -> Option<&NativeBlock> {
        self.blocks
            .binary_search_by_key(&offset, NativeBlock::start)
            .ok()
            .map(|idx| &self.blocks[idx])
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the function has no native blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks in ascending offset order
    pub fn iter(&self) -> std::slice::Iter<'_, NativeBlock> {
        self.blocks.iter()
    }

    /// Total bytes of native code across all blocks
    pub fn code_size(&self) -> usize {
        self.blocks.iter().map(|b| b.region.len()).sum()
    }
}

impl<'a> IntoIterator for &'a NativeBlockTable {
    type Item = &'a NativeBlock;
    type IntoIter = std::slice::Iter<'a, NativeBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
