//! Canonical register sets.
//!
//! These tables are the architecture-neutral names every layout must expose,
//! listed in kernel blob order. A layout whose fields deviate from its table is
//! rejected at construction time.

use super::Architecture;

/// Semantic role of a register within its architecture
///
/// Roles let tooling find the program counter, stack pointer and friends
/// without hard-coding per-architecture names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterRole
{
    /// General-purpose integer register
    General,
    /// Program counter (RIP on x86-64, PC on arm64)
    ProgramCounter,
    /// Stack pointer (RSP on x86-64, SP on arm64)
    StackPointer,
    /// Frame pointer (RBP on x86-64, FP/X29 on arm64)
    FramePointer,
    /// Link register holding the return address (LR/X30, arm64 only)
    LinkRegister,
    /// Flags or status register (RFLAGS on x86-64, CPSR on arm64)
    Status,
    /// Segment selector (CS, FS, GS on x86-64)
    Segment,
    /// Alignment padding with no architectural meaning
    Padding,
}

/// One register of a canonical register set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterDef
{
    /// Canonical lowercase name
    pub name: &'static str,
    /// Width in bytes (8, or 4 for arm64 `cpsr` and `pad`)
    pub width: usize,
    /// Semantic role
    pub role: RegisterRole,
}

const fn reg(name: &'static str, width: usize, role: RegisterRole) -> RegisterDef
{
    RegisterDef { name, width, role }
}

const fn gpr(name: &'static str) -> RegisterDef
{
    reg(name, 8, RegisterRole::General)
}

/// Number of canonical x86-64 registers.
pub const X86_64_REGISTER_COUNT: usize = 21;

/// Number of canonical arm64 registers (X0-X28, FP, LR, SP, PC, CPSR, pad).
pub const ARM64_REGISTER_COUNT: usize = 35;

/// x86-64 general-register thread state, in `x86_thread_state64_t` order.
pub static X86_64_REGISTERS: [RegisterDef; X86_64_REGISTER_COUNT] = [
    gpr("rax"),
    gpr("rbx"),
    gpr("rcx"),
    gpr("rdx"),
    gpr("rdi"),
    gpr("rsi"),
    reg("rbp", 8, RegisterRole::FramePointer),
    reg("rsp", 8, RegisterRole::StackPointer),
    gpr("r8"),
    gpr("r9"),
    gpr("r10"),
    gpr("r11"),
    gpr("r12"),
    gpr("r13"),
    gpr("r14"),
    gpr("r15"),
    reg("rip", 8, RegisterRole::ProgramCounter),
    reg("rflags", 8, RegisterRole::Status),
    reg("cs", 8, RegisterRole::Segment),
    reg("fs", 8, RegisterRole::Segment),
    reg("gs", 8, RegisterRole::Segment),
];

/// ARM64 general-register thread state, in `arm_thread_state64_t` order.
pub static ARM64_REGISTERS: [RegisterDef; ARM64_REGISTER_COUNT] = [
    gpr("x0"),
    gpr("x1"),
    gpr("x2"),
    gpr("x3"),
    gpr("x4"),
    gpr("x5"),
    gpr("x6"),
    gpr("x7"),
    gpr("x8"),
    gpr("x9"),
    gpr("x10"),
    gpr("x11"),
    gpr("x12"),
    gpr("x13"),
    gpr("x14"),
    gpr("x15"),
    gpr("x16"),
    gpr("x17"),
    gpr("x18"),
    gpr("x19"),
    gpr("x20"),
    gpr("x21"),
    gpr("x22"),
    gpr("x23"),
    gpr("x24"),
    gpr("x25"),
    gpr("x26"),
    gpr("x27"),
    gpr("x28"),
    reg("fp", 8, RegisterRole::FramePointer),
    reg("lr", 8, RegisterRole::LinkRegister),
    reg("sp", 8, RegisterRole::StackPointer),
    reg("pc", 8, RegisterRole::ProgramCounter),
    reg("cpsr", 4, RegisterRole::Status),
    reg("pad", 4, RegisterRole::Padding),
];

/// Resolve a register name (or architectural alias) to its canonical index
///
/// Matching is case-insensitive. On arm64 `x29` resolves to `fp` and `x30`
/// to `lr`.
///
/// ## Example
///
/// ```rust
/// use regctx_core::types::{register_index, Architecture};
///
/// assert_eq!(register_index(Architecture::X86_64, "RIP"), Some(16));
/// assert_eq!(register_index(Architecture::Arm64, "x30"), register_index(Architecture::Arm64, "lr"));
/// assert_eq!(register_index(Architecture::Arm64, "rax"), None);
/// ```
#[must_use]
pub fn register_index(architecture: Architecture, name: &str) -> Option<usize>
{
    let name = name.trim();
    let canonical = match architecture {
        Architecture::Arm64 if name.eq_ignore_ascii_case("x29") => "fp",
        Architecture::Arm64 if name.eq_ignore_ascii_case("x30") => "lr",
        _ => name,
    };

    architecture
        .registers()
        .iter()
        .position(|def| def.name.eq_ignore_ascii_case(canonical))
}

/// Canonical name of the register holding `role`, if the architecture has one.
#[must_use]
pub fn register_for_role(architecture: Architecture, role: RegisterRole) -> Option<&'static str>
{
    architecture
        .registers()
        .iter()
        .find(|def| def.role == role)
        .map(|def| def.name)
}
