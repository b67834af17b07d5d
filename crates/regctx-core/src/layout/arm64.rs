//! # ARM64 General-Register Thread State
//!
//! Local definition of `arm_thread_state64_t`, used whenever the platform does
//! not declare it (every non-arm64 build).
//!
//! ## Thread State Structure
//!
//! ```rs
//! Offset   0-231:  X0-X28 (29 × u64)
//! Offset 232:      FP (X29)
//! Offset 240:      LR (X30)
//! Offset 248:      SP
//! Offset 256:      PC
//! Offset 264:      CPSR (u32)
//! Offset 268:      padding (u32)
//! Total: 272 bytes = 68 u32s
//! ```
//!
//! The trailing pad word is an explicit field so that the blob size is exactly
//! the struct size, with nothing left to implicit tail padding.
//!
//! ## References
//!
//! - [ARM_THREAD_STATE64 structure](https://github.com/apple-oss-distributions/xnu/blob/main/osfmk/mach/arm/_structs.h)
//! - [ARM64 Register Layout](https://developer.arm.com/documentation/102374/0101/Registers-in-AArch64---general-purpose-registers)

use std::mem::{offset_of, size_of};

use super::{DeclaredStruct, RegisterField};
use crate::constants::{ARM_THREAD_STATE64_COUNT, STATE_WORD_SIZE};
use crate::types::{ARM64_REGISTERS, ARM64_REGISTER_COUNT};

/// C name of the type this module defines.
pub const TYPE_NAME: &str = "arm_thread_state64_t";

/// Number of numbered general-purpose registers stored in `x` (X0-X28).
pub const GENERAL_REGISTER_COUNT: usize = 29;

/// ARM64 thread state structure matching the kernel's `arm_thread_state64_t`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArmThreadState64
{
    /// X0-X28
    pub x: [u64; GENERAL_REGISTER_COUNT],
    /// Frame pointer (X29)
    pub fp: u64,
    /// Link register (X30)
    pub lr: u64,
    /// Stack pointer
    pub sp: u64,
    /// Program counter
    pub pc: u64,
    /// Current Program Status Register
    pub cpsr: u32,
    pub pad: u32,
}

const _: () = assert!(size_of::<ArmThreadState64>() == 272);
const _: () = assert!(size_of::<ArmThreadState64>() == ARM_THREAD_STATE64_COUNT as usize * STATE_WORD_SIZE);
const _: () = assert!(offset_of!(ArmThreadState64, fp) == 232);
const _: () = assert!(offset_of!(ArmThreadState64, cpsr) == 264);
const _: () = assert!(offset_of!(ArmThreadState64, pad) == 268);

/// Named fields after `x`, as (name, offset, width).
const TRAILING_FIELDS: [(&str, usize, usize); 6] = [
    ("fp", offset_of!(ArmThreadState64, fp), size_of::<u64>()),
    ("lr", offset_of!(ArmThreadState64, lr), size_of::<u64>()),
    ("sp", offset_of!(ArmThreadState64, sp), size_of::<u64>()),
    ("pc", offset_of!(ArmThreadState64, pc), size_of::<u64>()),
    ("cpsr", offset_of!(ArmThreadState64, cpsr), size_of::<u32>()),
    ("pad", offset_of!(ArmThreadState64, pad), size_of::<u32>()),
];

const _: () = assert!(GENERAL_REGISTER_COUNT + TRAILING_FIELDS.len() == ARM64_REGISTER_COUNT);

/// Shape of [`ArmThreadState64`], read from the type itself.
#[must_use]
pub fn synthesized() -> DeclaredStruct
{
    let base = offset_of!(ArmThreadState64, x);
    let mut fields: Vec<RegisterField> = ARM64_REGISTERS[..GENERAL_REGISTER_COUNT]
        .iter()
        .enumerate()
        .map(|(idx, def)| RegisterField::new(def.name, base + idx * size_of::<u64>(), size_of::<u64>()))
        .collect();

    fields.extend(
        TRAILING_FIELDS
            .iter()
            .map(|&(name, offset, width)| RegisterField::new(name, offset, width)),
    );

    DeclaredStruct {
        type_name: TYPE_NAME,
        size: size_of::<ArmThreadState64>(),
        fields,
    }
}
