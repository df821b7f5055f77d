//! Bytecode analysis: supported opcode sets, metrics, and candidate scanning

pub mod candidate;
pub mod metrics;
pub mod scanner;
pub mod supported;

pub use candidate::CompilationCandidate;
pub use metrics::Metrics;
pub use scanner::{ScanError, Scanner, ScannerConfig, MIN_CANDIDATE_INSTRUCTIONS};
pub use supported::SupportedOpcodes;
