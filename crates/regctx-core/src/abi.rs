//! # Calling Conventions
//!
//! Role-based access to a [`RegisterSnapshot`]: program counter, stack and
//! frame pointers, and the registers a function call uses for arguments and
//! return values.
//!
//! | | System V AMD64 | AAPCS64 |
//! |-|----------------|---------|
//! | Arguments | `rdi rsi rdx rcx r8 r9` | `x0`-`x7` |
//! | Return value | `rax` | `x0` |
//! | Return address | on the stack | `lr` |
//!
//! ## Example
//!
//! ```rust
//! use regctx_core::types::{Architecture, RegisterSnapshot};
//!
//! let mut regs = RegisterSnapshot::zeroed(Architecture::X86_64);
//! regs.set_argument(1, 0x1000)?;
//! regs.set_pc(0x1_0000_3f00)?;
//!
//! assert_eq!(regs.get("rsi"), Some(0x1000));
//! assert_eq!(regs.pc(), Some(0x1_0000_3f00));
//! assert_eq!(regs.link_register(), None);
//! # Ok::<(), regctx_core::RegctxError>(())
//! ```

use std::fmt;

use crate::error::{RegctxError, RegctxResult};
use crate::types::{register_for_role, Architecture, RegisterRole, RegisterSnapshot};

const SYSV_ARGUMENTS: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];
const AAPCS64_ARGUMENTS: [&str; 8] = ["x0", "x1", "x2", "x3", "x4", "x5", "x6", "x7"];

/// Function-call register usage of an architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallingConvention
{
    /// System V AMD64 ABI (macOS and Linux on x86-64)
    SysV64,
    /// Procedure Call Standard for the Arm 64-bit Architecture
    Aapcs64,
}

impl CallingConvention
{
    #[must_use]
    pub const fn for_architecture(architecture: Architecture) -> Self
    {
        match architecture {
            Architecture::X86_64 => CallingConvention::SysV64,
            Architecture::Arm64 => CallingConvention::Aapcs64,
        }
    }

    #[must_use]
    pub const fn architecture(self) -> Architecture
    {
        match self {
            CallingConvention::SysV64 => Architecture::X86_64,
            CallingConvention::Aapcs64 => Architecture::Arm64,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str
    {
        match self {
            CallingConvention::SysV64 => "System V AMD64",
            CallingConvention::Aapcs64 => "AAPCS64",
        }
    }

    /// Integer argument registers, in argument order.
    #[must_use]
    pub const fn argument_registers(self) -> &'static [&'static str]
    {
        match self {
            CallingConvention::SysV64 => &SYSV_ARGUMENTS,
            CallingConvention::Aapcs64 => &AAPCS64_ARGUMENTS,
        }
    }

    /// Register carrying argument `index` (zero-based), if it is passed in one.
    #[must_use]
    pub fn argument_register(self, index: usize) -> Option<&'static str>
    {
        self.argument_registers().get(index).copied()
    }

    #[must_use]
    pub const fn return_register(self) -> &'static str
    {
        match self {
            CallingConvention::SysV64 => "rax",
            CallingConvention::Aapcs64 => "x0",
        }
    }

    /// Register holding the return address, when it is not kept on the stack.
    #[must_use]
    pub fn link_register(self) -> Option<&'static str>
    {
        register_for_role(self.architecture(), RegisterRole::LinkRegister)
    }
}

impl fmt::Display for CallingConvention
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

impl RegisterSnapshot
{
    #[must_use]
    pub const fn calling_convention(&self) -> CallingConvention
    {
        CallingConvention::for_architecture(self.architecture())
    }

    /// Program counter (`rip` / `pc`).
    #[must_use]
    pub fn pc(&self) -> Option<u64>
    {
        self.role_value(RegisterRole::ProgramCounter)
    }

    /// ## Errors
    ///
    /// Never fails for a supported architecture; the `Result` mirrors [`RegisterSnapshot::set`].
    pub fn set_pc(&mut self, value: u64) -> RegctxResult<()>
    {
        self.set_role(RegisterRole::ProgramCounter, value)
    }

    /// Stack pointer (`rsp` / `sp`).
    #[must_use]
    pub fn sp(&self) -> Option<u64>
    {
        self.role_value(RegisterRole::StackPointer)
    }

    /// ## Errors
    ///
    /// Never fails for a supported architecture; the `Result` mirrors [`RegisterSnapshot::set`].
    pub fn set_sp(&mut self, value: u64) -> RegctxResult<()>
    {
        self.set_role(RegisterRole::StackPointer, value)
    }

    /// Frame pointer (`rbp` / `fp`).
    #[must_use]
    pub fn fp(&self) -> Option<u64>
    {
        self.role_value(RegisterRole::FramePointer)
    }

    /// Link register; always `None` on x86-64.
    #[must_use]
    pub fn link_register(&self) -> Option<u64>
    {
        self.role_value(RegisterRole::LinkRegister)
    }

    /// Integer return value (`rax` / `x0`).
    #[must_use]
    pub fn return_value(&self) -> Option<u64>
    {
        self.get(self.calling_convention().return_register())
    }

    /// Integer argument `index` (zero-based), if passed in a register.
    #[must_use]
    pub fn argument(&self, index: usize) -> Option<u64>
    {
        self.calling_convention()
            .argument_register(index)
            .and_then(|name| self.get(name))
    }

    /// Set integer argument `index` (zero-based)
    ///
    /// ## Errors
    ///
    /// - `UnknownRegister`: argument `index` is not passed in a register
    pub fn set_argument(&mut self, index: usize, value: u64) -> RegctxResult<()>
    {
        let name = self
            .calling_convention()
            .argument_register(index)
            .ok_or_else(|| RegctxError::UnknownRegister {
                architecture: self.architecture(),
                name: format!("argument {index}"),
            })?;
        self.set(name, value).map(drop)
    }

    fn role_value(&self, role: RegisterRole) -> Option<u64>
    {
        register_for_role(self.architecture(), role).and_then(|name| self.get(name))
    }

    fn set_role(&mut self, role: RegisterRole, value: u64) -> RegctxResult<()>
    {
        let name = register_for_role(self.architecture(), role).ok_or_else(|| RegctxError::UnknownRegister {
            architecture: self.architecture(),
            name: format!("{role:?}"),
        })?;
        self.set(name, value).map(drop)
    }
}
