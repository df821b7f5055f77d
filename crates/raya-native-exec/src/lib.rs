//! Raya Native Execution
//!
//! The boundary between the bytecode interpreter and JIT-generated machine code:
//! - **Analysis**: scan a function's decoded instructions for maximal runs the
//!   backend can compile (`analysis` module)
//! - **Runtime**: executable memory and the trampoline that enters a native
//!   block with the frame's operand stack and locals (`runtime` module)
//! - **Native**: the backend trait, native block tables, and the compile driver
//!   tying them together (`native` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use raya_native_exec::{NativeCompiler, BytecodeMetadata};
//!
//! let compiler = NativeCompiler::new(my_backend)?;
//! let blocks = compiler.compile_function(&code, &meta)?;
//!
//! // In the interpreter loop
//! if let Some(block) = blocks.lookup(ip) {
//!     ip = unsafe { block.execute(&mut stack, &mut locals) };
//! }
//! ```

#![warn(rust_2018_idioms)]

pub mod analysis;
pub mod meta;
pub mod native;
pub mod ops;
pub mod runtime;

pub use analysis::{CompilationCandidate, Metrics, ScanError, Scanner, ScannerConfig, SupportedOpcodes};
pub use meta::{BytecodeMetadata, InboundTargets, InstructionMetadata};
pub use native::{
    BackendError, NativeBackend, NativeBlock, NativeBlockTable, NativeCompileError, NativeCompiler,
    NativeExecConfig,
};
pub use ops::Opcode;
pub use runtime::{CodeSlot, ExecMemoryError, ExecutableRegion};
