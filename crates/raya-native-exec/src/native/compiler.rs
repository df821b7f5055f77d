//! Compile driver: scan a function, build every candidate, and load the results
//! into executable memory.

use tracing::{debug, trace};

use super::backend::{BackendError, NativeBackend};
use super::block::{NativeBlock, NativeBlockTable};
use crate::analysis::{CompilationCandidate, ScanError, Scanner, ScannerConfig};
use crate::meta::BytecodeMetadata;
use crate::runtime::{ExecMemoryError, ExecutableRegion, HOST_SUPPORTED};

/// Error while compiling a function to native blocks
#[derive(Debug, thiserror::Error)]
pub enum NativeCompileError {
    #[error("Native execution is not supported on this host")]
    UnsupportedHost,
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Backend failed on candidate at offset {start}: {source}")]
    Backend { start: usize, source: BackendError },
    #[error("Backend produced no code for candidate at offset {start}")]
    EmptyCode { start: usize },
    #[error("Native block at offset {start} is {size} bytes (limit {limit})")]
    CodeTooLarge { start: usize, size: usize, limit: usize },
    #[error(transparent)]
    Memory(#[from] ExecMemoryError),
}

/// Configuration for native compilation
#[derive(Debug, Clone)]
pub struct NativeExecConfig {
    /// Candidate selection tunables
    pub scanner: ScannerConfig,
    /// Maximum machine code per candidate in bytes (default: 64 KiB)
    pub max_code_size: usize,
}

impl Default for NativeExecConfig {
    fn default() -> Self {
        NativeExecConfig {
            scanner: ScannerConfig::default(),
            max_code_size: 64 * 1024,
        }
    }
}

/// Turns functions into native block tables using one backend
pub struct NativeCompiler<B: NativeBackend> {
    backend: B,
    scanner: Scanner,
    max_code_size: usize,
}

impl<B: NativeBackend> NativeCompiler<B> {
    /// Create a compiler with default configuration
    pub fn new(backend: B) -> Result<Self, NativeCompileError> {
        Self::with_config(backend, NativeExecConfig::default())
    }

    /// Create a compiler with custom configuration
    pub fn with_config(backend: B, config: NativeExecConfig) -> Result<Self, NativeCompileError> {
        if !HOST_SUPPORTED {
            return Err(NativeCompileError::UnsupportedHost);
        }
        let scanner = Scanner::with_config(backend.supported_opcodes().clone(), config.scanner);
        Ok(NativeCompiler {
            backend,
            scanner,
            max_code_size: config.max_code_size,
        })
    }

    /// The backend in use
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The scanner configured for this backend
    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    /// Candidates the backend would be asked to build for this function
    pub fn scan(&self, meta: &BytecodeMetadata) -> Result<Vec<CompilationCandidate>, ScanError> {
        self.scanner.scan_func(meta)
    }

    /// Compile every candidate of a function.
    ///
    /// Any failure abandons the whole function; the interpreter keeps running
    /// its bytecode.
    pub fn compile_function(
        &self,
        code: &[u8],
        meta: &BytecodeMetadata,
    ) -> Result<NativeBlockTable, NativeCompileError> {
        let candidates = self.scanner.scan_func(meta)?;
        let mut table = NativeBlockTable::new();

        for candidate in candidates {
            let start = candidate.start;
            let machine_code = self
                .backend
                .build(&candidate, code, meta)
                .map_err(|source| NativeCompileError::Backend { start, source })?;

            if machine_code.is_empty() {
                return Err(NativeCompileError::EmptyCode { start });
            }
            if machine_code.len() > self.max_code_size {
                return Err(NativeCompileError::CodeTooLarge {
                    start,
                    size: machine_code.len(),
                    limit: self.max_code_size,
                });
            }

            let region = ExecutableRegion::load(&machine_code)?;
            trace!(
                start,
                end = candidate.end,
                bytes = region.len(),
                "native block loaded"
            );
            table.push(NativeBlock::new(candidate, region));
        }

        debug!(
            backend = self.backend.name(),
            blocks = table.len(),
            bytes = table.code_size(),
            "compiled function to native blocks"
        );
        Ok(table)
    }
}
