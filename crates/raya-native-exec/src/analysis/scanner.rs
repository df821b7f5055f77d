//! Compilation candidate scanner
//!
//! Walks a function's decoded instructions once and emits the maximal runs of
//! instructions the backend can compile. A run never continues across an
//! inbound branch target: the interpreter can only enter native code at the
//! start of a block, so a target reached mid-run closes the run and may open
//! the next one.

use tracing::{debug, trace};

use super::candidate::CompilationCandidate;
use super::metrics::Metrics;
use super::supported::SupportedOpcodes;
use crate::meta::{BytecodeMetadata, InboundTargets, InstructionMetadata};

/// Shortest run worth compiling; below this the cost of entering and leaving
/// native code outweighs the gain
pub const MIN_CANDIDATE_INSTRUCTIONS: usize = 3;

/// Error channel of the scanner.
///
/// Nothing raises this today: the scanner trusts the decoder's output.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ScanError {
    #[error("Malformed instruction metadata at index {index}: {reason}")]
    MalformedMetadata { index: usize, reason: String },
}

/// Tunables for candidate selection
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Minimum instructions in an emitted candidate (default: 3)
    pub min_run_len: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            min_run_len: MIN_CANDIDATE_INSTRUCTIONS,
        }
    }
}

/// Splits functions into compilation candidates for one backend
#[derive(Debug, Clone)]
pub struct Scanner {
    supported: SupportedOpcodes,
    config: ScannerConfig,
}

impl Scanner {
    /// Create a scanner for a backend's supported opcode set
    pub fn new(supported: SupportedOpcodes) -> Self {
        Self::with_config(supported, ScannerConfig::default())
    }

    /// Create a scanner with custom configuration
    pub fn with_config(supported: SupportedOpcodes, config: ScannerConfig) -> Self {
        Scanner { supported, config }
    }

    /// The opcode set this scanner accepts
    pub fn supported(&self) -> &SupportedOpcodes {
        &self.supported
    }

    /// The active configuration
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Scan a function, emitting the ranges of bytecode that could be
    /// compiled into native code, in ascending offset order.
    pub fn scan_func(&self, meta: &BytecodeMetadata) -> Result<Vec<CompilationCandidate>, ScanError> {
        self.scan_instructions(&meta.instructions, &meta.inbound_targets)
    }

    /// Same as [`Scanner::scan_func`] over borrowed parts
    pub fn scan_instructions(
        &self,
        instructions: &[InstructionMetadata],
        inbound_targets: &InboundTargets,
    ) -> Result<Vec<CompilationCandidate>, ScanError> {
        let mut finished = Vec::new();
        let mut in_progress = CompilationCandidate::default();

        for (i, inst) in instructions.iter().enumerate() {
            if self.is_disqualified(inst, inbound_targets, in_progress.metrics.all_ops) {
                self.finish(&mut in_progress, &mut finished);

                // A branch target can't continue a run, but it can open one.
                if self.is_disqualified(inst, inbound_targets, 0) {
                    continue;
                }
            }

            if in_progress.is_empty() {
                in_progress.start = inst.start;
                in_progress.start_instruction = i;
            }
            in_progress.end = inst.end();
            in_progress.end_instruction = i + 1;
            in_progress.metrics += Metrics::for_opcode(inst.op);
        }

        // A run may legitimately reach the end of the function.
        self.finish(&mut in_progress, &mut finished);

        debug!(
            instructions = instructions.len(),
            candidates = finished.len(),
            "scanned function for native candidates"
        );
        Ok(finished)
    }

    /// Whether `inst` cannot extend a run that currently holds `run_len`
    /// instructions.
    fn is_disqualified(&self, inst: &InstructionMetadata, inbound_targets: &InboundTargets, run_len: usize) -> bool {
        !self.supported.contains(inst.op) || is_mid_run_target(inst, inbound_targets, run_len)
    }

    /// Emit the run if it is long enough, then start over either way.
    fn finish(&self, in_progress: &mut CompilationCandidate, finished: &mut Vec<CompilationCandidate>) {
        if in_progress.is_empty() {
            return;
        }
        if in_progress.metrics.all_ops >= self.config.min_run_len {
            trace!(
                start = in_progress.start,
                end = in_progress.end,
                ops = in_progress.metrics.all_ops,
                "candidate emitted"
            );
            finished.push(in_progress.clone());
        } else {
            trace!(
                start = in_progress.start,
                ops = in_progress.metrics.all_ops,
                "run too short, discarded"
            );
        }
        in_progress.reset();
    }
}

/// The function entry may be a target without consequence; any other target
/// reached while a run is open would be a jump into the middle of native code.
fn is_mid_run_target(inst: &InstructionMetadata, inbound_targets: &InboundTargets, run_len: usize) -> bool {
    run_len > 0 && inst.start > 0 && inbound_targets.contains(&inst.start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Opcode;

    fn meta_of(ops: &[Opcode]) -> BytecodeMetadata {
        let mut meta = BytecodeMetadata::default();
        for &op in ops {
            // Immediates give instructions differing widths
            let size = match op {
                Opcode::I64Const => 2,
                Opcode::GetLocal | Opcode::SetLocal | Opcode::Call => 2,
                _ => 1,
            };
            meta.push(op as u8, size);
        }
        meta
    }

    fn baseline() -> Scanner {
        Scanner::new(SupportedOpcodes::baseline())
    }

    #[test]
    fn test_empty_function() {
        let out = baseline().scan_func(&BytecodeMetadata::default()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_nothing_supported() {
        let meta = meta_of(&[Opcode::Call, Opcode::Nop, Opcode::F64Add, Opcode::Return]);
        let out = baseline().scan_func(&meta).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_whole_function_candidate() {
        let meta = meta_of(&[
            Opcode::GetLocal,
            Opcode::I64Const,
            Opcode::I64Mul,
            Opcode::SetLocal,
        ]);
        let out = baseline().scan_func(&meta).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].bounds(), (0, meta.code_len()));
        assert_eq!(out[0].instruction_range(), 0..4);
        assert_eq!(out[0].metrics.all_ops, 4);
    }

    #[test]
    fn test_entry_target_does_not_split() {
        let mut meta = meta_of(&[Opcode::I64Const, Opcode::I64Const, Opcode::I64Add]);
        meta.add_inbound_target(0);
        let out = baseline().scan_func(&meta).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].instruction_range(), 0..3);
    }

    #[test]
    fn test_split_by_unsupported_call() {
        let meta = meta_of(&[
            Opcode::I64Const,
            Opcode::I64Const,
            Opcode::I64Add,
            Opcode::Call,
            Opcode::I64Const,
            Opcode::I64Const,
            Opcode::I64Sub,
        ]);
        let out = baseline().scan_func(&meta).unwrap();
        assert_eq!(out.len(), 2);

        assert_eq!(out[0].instruction_range(), 0..3);
        assert_eq!(out[0].bounds(), (0, 5));
        assert_eq!(out[0].metrics.all_ops, 3);
        assert_eq!(out[0].metrics.integer_ops, 3);

        assert_eq!(out[1].instruction_range(), 4..7);
        assert_eq!(out[1].bounds(), (7, 12));
        assert_eq!(out[1].metrics.all_ops, 3);
        assert_eq!(out[1].metrics.integer_ops, 3);
    }

    #[test]
    fn test_two_instructions_too_short() {
        let meta = meta_of(&[Opcode::I64Const, Opcode::I64Const]);
        let out = baseline().scan_func(&meta).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_inbound_target_starts_new_candidate() {
        let mut meta = meta_of(&[
            Opcode::I64Const,
            Opcode::I64Const,
            Opcode::GetLocal,
            Opcode::I64Add,
            Opcode::SetLocal,
        ]);
        let target = meta.instructions[2].start;
        meta.add_inbound_target(target);

        let out = baseline().scan_func(&meta).unwrap();
        // The leading pair is too short; the run opened by the target survives.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].instruction_range(), 2..5);
        assert_eq!(out[0].start, target);
        assert_eq!(out[0].end, meta.code_len());
    }

    #[test]
    fn test_inbound_target_closes_long_run() {
        let mut meta = meta_of(&[
            Opcode::I64Const,
            Opcode::I64Const,
            Opcode::I64Add,
            Opcode::GetLocal,
            Opcode::I64Eqz,
            Opcode::SetLocal,
        ]);
        meta.add_inbound_target(meta.instructions[3].start);

        let out = baseline().scan_func(&meta).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].instruction_range(), 0..3);
        assert_eq!(out[1].instruction_range(), 3..6);
        assert_eq!(out[0].end, out[1].start);
    }

    #[test]
    fn test_unsupported_target_belongs_to_no_candidate() {
        let mut meta = meta_of(&[
            Opcode::I64Const,
            Opcode::I64Const,
            Opcode::I64Add,
            Opcode::Loop,
            Opcode::GetLocal,
            Opcode::I64Const,
            Opcode::I64Sub,
        ]);
        meta.add_inbound_target(meta.instructions[3].start);

        let out = baseline().scan_func(&meta).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].instruction_range(), 0..3);
        assert_eq!(out[1].instruction_range(), 4..7);
    }

    #[test]
    fn test_metrics_sum_over_range() {
        let meta = meta_of(&[
            Opcode::Call,
            Opcode::GetLocal,
            Opcode::GetLocal,
            Opcode::I64LtU,
            Opcode::I64Eqz,
            Opcode::SetLocal,
            Opcode::Return,
        ]);
        let out = baseline().scan_func(&meta).unwrap();
        assert_eq!(out.len(), 1);

        let c = &out[0];
        let mut expected = Metrics::default();
        for inst in &meta.instructions[c.instruction_range()] {
            expected += Metrics::for_opcode(inst.op);
        }
        assert_eq!(c.metrics, expected);
        assert_eq!(c.metrics.stack_reads, 4);
        assert_eq!(c.metrics.stack_writes, 4);
        assert_eq!(c.metrics.integer_ops, 5);
    }

    #[test]
    fn test_unclassified_supported_opcode_counts() {
        let mut supported = SupportedOpcodes::baseline();
        supported.insert(Opcode::Nop as u8);
        let scanner = Scanner::new(supported);

        let meta = meta_of(&[Opcode::Nop, Opcode::I64Const, Opcode::Nop]);
        let out = scanner.scan_func(&meta).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].metrics.all_ops, 3);
        assert_eq!(out[0].metrics.integer_ops, 1);
    }

    #[test]
    fn test_configured_minimum() {
        let scanner = Scanner::with_config(
            SupportedOpcodes::baseline(),
            ScannerConfig { min_run_len: 2 },
        );
        let meta = meta_of(&[Opcode::I64Const, Opcode::I64Const, Opcode::Call, Opcode::GetLocal]);
        let out = scanner.scan_func(&meta).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].instruction_range(), 0..2);
    }

    #[test]
    fn test_candidates_ordered_and_disjoint() {
        let mut ops = Vec::new();
        for i in 0..40 {
            ops.push(match i % 7 {
                0 | 1 => Opcode::GetLocal,
                2 => Opcode::I64Add,
                3 if i % 2 == 0 => Opcode::Call,
                3 => Opcode::I64Const,
                4 => Opcode::SetLocal,
                5 => Opcode::Br,
                _ => Opcode::I64Const,
            });
        }
        let mut meta = meta_of(&ops);
        for idx in [9, 17, 30] {
            meta.add_inbound_target(meta.instructions[idx].start);
        }

        let out = baseline().scan_func(&meta).unwrap();
        assert!(!out.is_empty());
        for c in &out {
            assert!(c.start <= c.end);
            assert!(c.len() >= MIN_CANDIDATE_INSTRUCTIONS);
            // Only the first instruction of a candidate may be a target
            for inst in &meta.instructions[c.start_instruction + 1..c.end_instruction] {
                assert!(!meta.is_inbound_target(inst.start));
            }
        }
        for pair in out.windows(2) {
            assert!(pair[0].end <= pair[1].start);
            assert!(pair[0].end_instruction <= pair[1].start_instruction);
        }
    }
}
