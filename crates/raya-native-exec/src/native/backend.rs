//! Backend seam: the machine-code generator the compile driver hands candidates to

use crate::analysis::{CompilationCandidate, SupportedOpcodes};
use crate::meta::BytecodeMetadata;

/// Error while generating machine code for a candidate
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Unsupported opcode {opcode:#04x} at offset {offset}")]
    UnsupportedOpcode { opcode: u8, offset: usize },
    #[error("Code generation failed: {0}")]
    Codegen(String),
}

/// A native code generator.
///
/// Generated code is entered through the trampoline in
/// [`crate::runtime::trampoline`] and must follow its register convention:
/// operand stack base and locals base arrive in fixed scratch registers, and
/// the block leaves with a plain `ret`.
pub trait NativeBackend: Send + Sync {
    /// Backend name (for diagnostics)
    fn name(&self) -> &str;

    /// Opcodes this backend can compile. Constant for the backend's lifetime.
    fn supported_opcodes(&self) -> &SupportedOpcodes;

    /// Generate machine code for one candidate.
    ///
    /// `code` is the function's raw bytecode (for immediates) and `meta` its
    /// decoded instructions; the candidate's instruction range indexes `meta`.
    fn build(
        &self,
        candidate: &CompilationCandidate,
        code: &[u8],
        meta: &BytecodeMetadata,
    ) -> Result<Vec<u8>, BackendError>;
}
