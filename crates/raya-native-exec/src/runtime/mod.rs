//! Runtime support for native blocks: executable memory and the trampoline

pub mod exec_mem;
pub mod trampoline;

pub use exec_mem::{ExecMemoryError, ExecutableRegion};
pub use trampoline::{invoke, CodeSlot, HOST_SUPPORTED};
