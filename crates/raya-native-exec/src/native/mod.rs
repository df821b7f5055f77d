//! Native compilation: the backend seam, native blocks, and the compile driver

pub mod backend;
pub mod block;
pub mod compiler;

pub use backend::{BackendError, NativeBackend};
pub use block::{NativeBlock, NativeBlockTable};
pub use compiler::{NativeCompileError, NativeCompiler, NativeExecConfig};
