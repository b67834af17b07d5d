//! # x86-64 General-Register Thread State
//!
//! Local definition of `x86_thread_state64_t`, used whenever the platform does
//! not declare it (every non-x86-64 build, including arm64 hosts debugging
//! translated x86-64 threads).
//!
//! ## Thread State Structure
//!
//! ```rs
//! Offset   0-127:  RAX RBX RCX RDX RDI RSI RBP RSP R8-R15 (16 × u64)
//! Offset 128:      RIP
//! Offset 136:      RFLAGS
//! Offset 144-167:  CS FS GS
//! Total: 21 u64s = 168 bytes = 42 u32s
//! ```
//!
//! ## References
//!
//! - [X86_THREAD_STATE64 structure](https://github.com/apple-oss-distributions/xnu/blob/main/osfmk/mach/i386/_structs.h)

use std::mem::{offset_of, size_of};

use super::{DeclaredStruct, RegisterField};
use crate::constants::{STATE_WORD_SIZE, X86_THREAD_STATE64_COUNT};
use crate::types::X86_64_REGISTER_COUNT;

/// C name of the type this module defines.
pub const TYPE_NAME: &str = "x86_thread_state64_t";

/// x86-64 thread state structure matching the kernel's `x86_thread_state64_t`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct X86ThreadState64
{
    /// RAX - Accumulator register
    pub rax: u64,
    /// RBX - Base register
    pub rbx: u64,
    /// RCX - Counter register
    pub rcx: u64,
    /// RDX - Data register
    pub rdx: u64,
    /// RDI - Destination index register
    pub rdi: u64,
    /// RSI - Source index register
    pub rsi: u64,
    /// RBP - Base pointer (frame pointer)
    pub rbp: u64,
    /// RSP - Stack pointer
    pub rsp: u64,
    pub r8: u64,
    pub r9: u64,
    pub r10: u64,
    pub r11: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,
    /// RIP - Instruction pointer (program counter)
    pub rip: u64,
    /// RFLAGS - Flags register
    pub rflags: u64,
    /// CS - Code segment selector
    pub cs: u64,
    /// FS - Segment selector
    pub fs: u64,
    /// GS - Segment selector
    pub gs: u64,
}

const _: () = assert!(size_of::<X86ThreadState64>() == 168);
const _: () = assert!(size_of::<X86ThreadState64>() == X86_THREAD_STATE64_COUNT as usize * STATE_WORD_SIZE);
const _: () = assert!(offset_of!(X86ThreadState64, rip) == 128);
const _: () = assert!(offset_of!(X86ThreadState64, gs) == 160);
const _: () = assert!(size_of::<X86ThreadState64>() / size_of::<u64>() == X86_64_REGISTER_COUNT);

/// Shape of [`X86ThreadState64`], read from the type itself.
#[must_use]
pub fn synthesized() -> DeclaredStruct
{
    macro_rules! field {
        ($name:ident) => {
            RegisterField::new(stringify!($name), offset_of!(X86ThreadState64, $name), size_of::<u64>())
        };
    }

    DeclaredStruct {
        type_name: TYPE_NAME,
        size: size_of::<X86ThreadState64>(),
        fields: vec![
            field!(rax),
            field!(rbx),
            field!(rcx),
            field!(rdx),
            field!(rdi),
            field!(rsi),
            field!(rbp),
            field!(rsp),
            field!(r8),
            field!(r9),
            field!(r10),
            field!(r11),
            field!(r12),
            field!(r13),
            field!(r14),
            field!(r15),
            field!(rip),
            field!(rflags),
            field!(cs),
            field!(fs),
            field!(gs),
        ],
    }
}
