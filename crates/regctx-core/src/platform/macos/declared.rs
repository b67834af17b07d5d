//! Thread-state declarations provided by the macOS system bindings.
//!
//! - `libc` declares the native architecture's general-register struct
//!   (`__darwin_arm_thread_state64` on Apple Silicon,
//!   `__darwin_x86_thread_state64` on Intel)
//! - `mach2` declares `x86_THREAD_STATE64` on Intel
//!
//! Everything else is left to this crate's own definitions.

#[cfg(any(target_arch = "aarch64", target_arch = "x86_64"))]
use std::mem::{offset_of, size_of};

use crate::guard::Symbol;
#[cfg(any(target_arch = "aarch64", target_arch = "x86_64"))]
use crate::layout::RegisterField;
use crate::layout::DeclaredStruct;
use crate::types::Architecture;

/// The struct `libc` declares for `architecture`, with offsets read from it.
pub fn thread_state_struct(architecture: Architecture) -> Option<DeclaredStruct>
{
    match architecture {
        #[cfg(target_arch = "aarch64")]
        Architecture::Arm64 => Some(arm64()),
        #[cfg(target_arch = "x86_64")]
        Architecture::X86_64 => Some(x86_64()),
        _ => None,
    }
}

/// The value of a flavor or count constant the system bindings declare.
pub fn constant(symbol: Symbol) -> Option<i64>
{
    match symbol {
        #[cfg(target_arch = "x86_64")]
        Symbol::FlavorConstant(Architecture::X86_64) => Some(i64::from(mach2::thread_status::x86_THREAD_STATE64)),
        _ => None,
    }
}

#[cfg(target_arch = "aarch64")]
fn arm64() -> DeclaredStruct
{
    use libc::__darwin_arm_thread_state64 as State;

    use crate::layout::arm64::GENERAL_REGISTER_COUNT;
    use crate::types::ARM64_REGISTERS;

    let base = offset_of!(State, __x);
    let mut fields: Vec<RegisterField> = ARM64_REGISTERS[..GENERAL_REGISTER_COUNT]
        .iter()
        .enumerate()
        .map(|(idx, def)| RegisterField::new(def.name, base + idx * size_of::<u64>(), size_of::<u64>()))
        .collect();

    fields.extend([
        RegisterField::new("fp", offset_of!(State, __fp), size_of::<u64>()),
        RegisterField::new("lr", offset_of!(State, __lr), size_of::<u64>()),
        RegisterField::new("sp", offset_of!(State, __sp), size_of::<u64>()),
        RegisterField::new("pc", offset_of!(State, __pc), size_of::<u64>()),
        RegisterField::new("cpsr", offset_of!(State, __cpsr), size_of::<u32>()),
        RegisterField::new("pad", offset_of!(State, __pad), size_of::<u32>()),
    ]);

    DeclaredStruct {
        type_name: "__darwin_arm_thread_state64",
        size: size_of::<State>(),
        fields,
    }
}

#[cfg(target_arch = "x86_64")]
fn x86_64() -> DeclaredStruct
{
    use libc::__darwin_x86_thread_state64 as State;

    macro_rules! field {
        ($name:literal, $member:ident) => {
            RegisterField::new($name, offset_of!(State, $member), size_of::<u64>())
        };
    }

    DeclaredStruct {
        type_name: "__darwin_x86_thread_state64",
        size: size_of::<State>(),
        fields: vec![
            field!("rax", __rax),
            field!("rbx", __rbx),
            field!("rcx", __rcx),
            field!("rdx", __rdx),
            field!("rdi", __rdi),
            field!("rsi", __rsi),
            field!("rbp", __rbp),
            field!("rsp", __rsp),
            field!("r8", __r8),
            field!("r9", __r9),
            field!("r10", __r10),
            field!("r11", __r11),
            field!("r12", __r12),
            field!("r13", __r13),
            field!("r14", __r14),
            field!("r15", __r15),
            field!("rip", __rip),
            field!("rflags", __rflags),
            field!("cs", __cs),
            field!("fs", __fs),
            field!("gs", __gs),
        ],
    }
}
