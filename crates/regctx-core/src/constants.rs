//! # Thread State Protocol Constants
//!
//! Fixed integers shared with the kernel's `thread_get_state()` /
//! `thread_set_state()` interface.
//!
//! These are part of the wire contract: the kernel trusts the caller's flavor
//! and count, so a wrong value either fails the call or reinterprets the wrong
//! number of words. They are never derived at runtime.
//!
//! ## Organization
//!
//! - Thread state flavors
//! - Thread state counts
//! - Blob geometry

use libc::c_int;

// ============================================================================
// Thread State Flavors
// ============================================================================

/// x86-64 thread state flavor (flavor 4)
///
/// Used with `thread_get_state()` and `thread_set_state()` to read/write
/// x86-64 general-purpose registers (RAX, RBX, RCX, RDX, RDI, RSI, RBP, RSP,
/// R8-R15, RIP, RFLAGS, CS, FS, GS).
///
/// See: [x86_THREAD_STATE64](https://github.com/apple-oss-distributions/xnu/blob/main/osfmk/mach/i386/thread_status.h)
pub const X86_THREAD_STATE64: c_int = 4;

/// ARM64 thread state flavor (flavor 6)
///
/// Used with `thread_get_state()` and `thread_set_state()` to read/write
/// ARM64 general-purpose registers (X0-X28, FP, LR, SP, PC, CPSR).
///
/// See: [ARM_THREAD_STATE64](https://github.com/apple-oss-distributions/xnu/blob/main/osfmk/mach/arm/thread_status.h)
pub const ARM_THREAD_STATE64: c_int = 6;

// ============================================================================
// Thread State Counts
// ============================================================================

/// x86-64 thread state count (168 bytes / 4 = 42 u32 values)
pub const X86_THREAD_STATE64_COUNT: u32 = 42;

/// ARM64 thread state count (272 bytes / 4 = 68 u32 values)
///
/// Each 64-bit register is stored as two u32 values; CPSR and the trailing
/// pad word take one each.
pub const ARM_THREAD_STATE64_COUNT: u32 = 68;

// ============================================================================
// Blob Geometry
// ============================================================================

/// Size of one thread-state word (`natural_t`) in bytes
pub const STATE_WORD_SIZE: usize = 4;

/// Largest general-register word count across supported architectures
///
/// Used to size inline buffers so a state round trip never allocates.
pub const MAX_THREAD_STATE_COUNT: usize = ARM_THREAD_STATE64_COUNT as usize;

/// Mask for extracting the lower 32 bits of a u64
pub const U32_MASK: u64 = 0xFFFF_FFFF;
