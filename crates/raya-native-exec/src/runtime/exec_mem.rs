//! Executable memory for native blocks
//!
//! Machine code is copied into a private anonymous mapping which is then
//! flipped from read/write to read/execute, so no page is ever writable and
//! executable at once.

use tracing::warn;

/// Error while mapping native code into memory
#[derive(Debug, thiserror::Error)]
pub enum ExecMemoryError {
    #[error("Failed to map {len} bytes: {source}")]
    Map { len: usize, source: std::io::Error },
    #[error("Failed to make {len} bytes executable: {source}")]
    Protect { len: usize, source: std::io::Error },
    #[error("Executable memory is not supported on this platform")]
    Unsupported,
}

/// A block of machine code in executable memory
pub struct ExecutableRegion {
    base: *const u8,
    len: usize,
}

// Safety: the region is immutable after loading (PROT_READ|PROT_EXEC).
// Multiple threads can safely read/execute from the same region.
unsafe impl Send for ExecutableRegion {}
unsafe impl Sync for ExecutableRegion {}

impl ExecutableRegion {
    /// Copy `code` into freshly mapped executable memory.
    ///
    /// Empty input yields an empty region with a null base.
    #[cfg(unix)]
    pub fn load(code: &[u8]) -> Result<Self, ExecMemoryError> {
        if code.is_empty() {
            return Ok(ExecutableRegion {
                base: std::ptr::null(),
                len: 0,
            });
        }

        let len = code.len();
        unsafe {
            let ptr = libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANON,
                -1,
                0,
            );
            if ptr == libc::MAP_FAILED {
                let source = std::io::Error::last_os_error();
                warn!(len, error = %source, "mmap for native code failed");
                return Err(ExecMemoryError::Map { len, source });
            }

            std::ptr::copy_nonoverlapping(code.as_ptr(), ptr as *mut u8, len);
            flush_icache(ptr as *const u8, len);

            // W^X: drop write, add execute
            if libc::mprotect(ptr, len, libc::PROT_READ | libc::PROT_EXEC) != 0 {
                let source = std::io::Error::last_os_error();
                warn!(len, error = %source, "mprotect for native code failed");
                libc::munmap(ptr, len);
                return Err(ExecMemoryError::Protect { len, source });
            }

            Ok(ExecutableRegion {
                base: ptr as *const u8,
                len,
            })
        }
    }

    #[cfg(not(unix))]
    pub fn load(_code: &[u8]) -> Result<Self, ExecMemoryError> {
        Err(ExecMemoryError::Unsupported)
    }

    /// Address of the first byte of code
    pub fn as_ptr(&self) -> *const u8 {
        self.base
    }

    /// Size of the code in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the region holds no code
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl std::fmt::Debug for ExecutableRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutableRegion")
            .field("base", &self.base)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(unix)]
impl Drop for ExecutableRegion {
    fn drop(&mut self) {
        if !self.base.is_null() && self.len > 0 {
            unsafe {
                libc::munmap(self.base as *mut libc::c_void, self.len);
            }
        }
    }
}

/// Make freshly written code visible to instruction fetch
#[cfg(all(target_arch = "aarch64", target_os = "linux"))]
unsafe fn flush_icache(start: *const u8, len: usize) {
    extern "C" {
        fn __clear_cache(start: *mut libc::c_char, end: *mut libc::c_char);
    }
    __clear_cache(start as *mut libc::c_char, start.add(len) as *mut libc::c_char);
}

#[cfg(all(target_arch = "aarch64", target_vendor = "apple"))]
unsafe fn flush_icache(start: *const u8, len: usize) {
    extern "C" {
        fn sys_icache_invalidate(start: *mut libc::c_void, len: usize);
    }
    sys_icache_invalidate(start as *mut libc::c_void, len);
}

// x86 keeps instruction and data caches coherent.
#[cfg(all(
    unix,
    not(all(target_arch = "aarch64", any(target_os = "linux", target_vendor = "apple")))
))]
unsafe fn flush_icache(_start: *const u8, _len: usize) {}
