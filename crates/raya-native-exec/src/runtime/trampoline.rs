//! Interpreter-to-native trampoline and calling convention
//!
//! Native blocks do not follow the C ABI on entry. The interpreter reaches them
//! through `jitcall`, which loads the block address out of a [`CodeSlot`] and
//! tail-jumps to it with the frame storage in fixed scratch registers:
//!
//! | host    | operand stack | locals | clobbered |
//! |---------|---------------|--------|-----------|
//! | x86_64  | `r10`         | `r11`  | `rax`     |
//! | aarch64 | `x9`          | `x10`  | `x16`     |
//!
//! All of these are caller-saved under every host ABI, so the native block may
//! use them freely. It must preserve the callee-saved registers of the host ABI
//! and leave with a plain `ret`, which returns straight to the caller of
//! `jitcall`.

use std::sync::atomic::{AtomicPtr, Ordering};

/// Whether this host has a trampoline at all
pub const HOST_SUPPORTED: bool = cfg!(any(target_arch = "x86_64", target_arch = "aarch64"));

/// Pointer-sized cell holding the entry address of a native block.
///
/// The trampoline reads the address through the slot on every call, so the
/// slot can be pointed at different code after the fact.
#[repr(transparent)]
#[derive(Debug)]
pub struct CodeSlot(AtomicPtr<u8>);

impl CodeSlot {
    /// Create a slot pointing at `entry`
    pub fn new(entry: *const u8) -> Self {
        CodeSlot(AtomicPtr::new(entry as *mut u8))
    }

    /// Current entry address
    pub fn entry(&self) -> *const u8 {
        self.0.load(Ordering::Acquire)
    }

    /// Point the slot at different code
    pub fn retarget(&self, entry: *const u8) {
        self.0.store(entry as *mut u8, Ordering::Release);
    }
}

#[cfg(all(target_arch = "x86_64", not(windows)))]
#[unsafe(naked)]
unsafe extern "C" fn jitcall(code: *const CodeSlot, stack: *mut u64, locals: *mut u64) {
    // System V: rdi, rsi, rdx
    core::arch::naked_asm!(
        "mov rax, qword ptr [rdi]",
        "mov r10, rsi",
        "mov r11, rdx",
        "jmp rax",
    )
}

#[cfg(all(target_arch = "x86_64", windows))]
#[unsafe(naked)]
unsafe extern "C" fn jitcall(code: *const CodeSlot, stack: *mut u64, locals: *mut u64) {
    // Microsoft x64: rcx, rdx, r8
    core::arch::naked_asm!(
        "mov rax, qword ptr [rcx]",
        "mov r10, rdx",
        "mov r11, r8",
        "jmp rax",
    )
}

#[cfg(target_arch = "aarch64")]
#[unsafe(naked)]
unsafe extern "C" fn jitcall(code: *const CodeSlot, stack: *mut u64, locals: *mut u64) {
    core::arch::naked_asm!(
        "ldr x16, [x0]",
        "mov x9, x1",
        "mov x10, x2",
        "br x16",
    )
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
unsafe extern "C" fn jitcall(_code: *const CodeSlot, _stack: *mut u64, _locals: *mut u64) {
    // Unreachable: the compile driver refuses to build when !HOST_SUPPORTED.
    std::process::abort()
}

/// Run the native block `slot` points at against one interpreter frame.
///
/// # Safety
/// - `slot` must point at executable code following the convention above, and
///   that code must stay mapped for the duration of the call.
/// - The code must only touch `stack` and `locals` within their lengths; it is
///   built for the frame shape of one function and nothing checks that here.
pub unsafe fn invoke(slot: &CodeSlot, stack: &mut [u64], locals: &mut [u64]) {
    jitcall(slot, stack.as_mut_ptr(), locals.as_mut_ptr())
}
