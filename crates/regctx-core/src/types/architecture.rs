//! CPU architecture tag.

use std::fmt;
use std::str::FromStr;

use libc::c_int;

use crate::constants;
use crate::error::{RegctxError, RegctxResult};
use crate::types::registers::{RegisterDef, ARM64_REGISTERS, X86_64_REGISTERS};

/// CPU architecture whose general-purpose thread state can be accessed
///
/// Each architecture selects exactly one register layout, one thread-state
/// flavor and one word count. The tag describes the *target thread*, which can
/// differ from the architecture of the running binary (a translated x86-64
/// thread on an arm64 host, for example).
///
/// ## Example
///
/// ```rust
/// use regctx_core::types::Architecture;
///
/// let arch: Architecture = "aarch64".parse()?;
/// assert_eq!(arch, Architecture::Arm64);
/// assert_eq!(arch.thread_state_flavor(), 6);
/// assert_eq!(arch.opposite(), Architecture::X86_64);
/// # Ok::<(), regctx_core::RegctxError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Architecture
{
    /// 64-bit x86 (Intel/AMD)
    ///
    /// 21 general-register fields, all 64-bit, including the CS/FS/GS
    /// segment selectors.
    X86_64,
    /// 64-bit ARM (Apple Silicon)
    ///
    /// X0-X28, FP (X29), LR (X30), SP, PC, a 32-bit CPSR and a 32-bit pad word.
    Arm64,
}

impl Architecture
{
    /// Every supported architecture, in registry order.
    pub const ALL: [Architecture; 2] = [Architecture::X86_64, Architecture::Arm64];

    /// Architecture of the currently running binary
    ///
    /// This is resolved from `target_arch` at compile time. The target thread
    /// may run a different architecture under translation.
    ///
    /// ## Errors
    ///
    /// - `UnsupportedArchitecture`: the binary was built for neither x86-64 nor arm64
    pub fn host() -> RegctxResult<Self>
    {
        #[cfg(target_arch = "aarch64")]
        {
            Ok(Architecture::Arm64)
        }

        #[cfg(target_arch = "x86_64")]
        {
            Ok(Architecture::X86_64)
        }

        #[cfg(not(any(target_arch = "aarch64", target_arch = "x86_64")))]
        {
            Err(RegctxError::UnsupportedArchitecture(std::env::consts::ARCH.to_string()))
        }
    }

    /// Order in which to try flavors on a thread of unknown architecture
    ///
    /// `host` first and then the other one. Without a supported host this is
    /// [`ALL`](Self::ALL).
    #[must_use]
    pub const fn probe_order(host: Option<Self>) -> [Self; 2]
    {
        match host {
            Some(host) => [host, host.opposite()],
            None => Self::ALL,
        }
    }

    /// The other supported architecture.
    #[must_use]
    pub const fn opposite(self) -> Self
    {
        match self {
            Architecture::X86_64 => Architecture::Arm64,
            Architecture::Arm64 => Architecture::X86_64,
        }
    }

    /// Canonical lowercase name (`x86_64` or `arm64`).
    #[must_use]
    pub const fn name(self) -> &'static str
    {
        match self {
            Architecture::X86_64 => "x86_64",
            Architecture::Arm64 => "arm64",
        }
    }

    /// Protocol flavor of the general-register thread state.
    #[must_use]
    pub const fn thread_state_flavor(self) -> c_int
    {
        match self {
            Architecture::X86_64 => constants::X86_THREAD_STATE64,
            Architecture::Arm64 => constants::ARM_THREAD_STATE64,
        }
    }

    /// Protocol word count of the general-register thread state.
    #[must_use]
    pub const fn thread_state_word_count(self) -> u32
    {
        match self {
            Architecture::X86_64 => constants::X86_THREAD_STATE64_COUNT,
            Architecture::Arm64 => constants::ARM_THREAD_STATE64_COUNT,
        }
    }

    /// Canonical register set, in kernel blob order.
    #[must_use]
    pub fn registers(self) -> &'static [RegisterDef]
    {
        match self {
            Architecture::X86_64 => &X86_64_REGISTERS,
            Architecture::Arm64 => &ARM64_REGISTERS,
        }
    }

    /// Architecture owning a general-register flavor, if any.
    #[must_use]
    pub fn from_flavor(flavor: c_int) -> Option<Self>
    {
        Self::ALL.into_iter().find(|arch| arch.thread_state_flavor() == flavor)
    }
}

impl fmt::Display for Architecture
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

impl FromStr for Architecture
{
    type Err = RegctxError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_ascii_lowercase().as_str() {
            "x86_64" | "x86-64" | "amd64" | "x64" => Ok(Architecture::X86_64),
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            _ => Err(RegctxError::UnsupportedArchitecture(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_architecture_from_str()
    {
        assert_eq!("x86_64".parse::<Architecture>().unwrap(), Architecture::X86_64);
        assert_eq!("AMD64".parse::<Architecture>().unwrap(), Architecture::X86_64);
        assert_eq!("arm64".parse::<Architecture>().unwrap(), Architecture::Arm64);
        assert_eq!("AArch64".parse::<Architecture>().unwrap(), Architecture::Arm64);

        let err = "riscv64".parse::<Architecture>().unwrap_err();
        assert!(matches!(err, RegctxError::UnsupportedArchitecture(ref name) if name == "riscv64"));
    }

    #[test]
    fn test_architecture_display_round_trips()
    {
        for arch in Architecture::ALL {
            assert_eq!(arch.to_string().parse::<Architecture>().unwrap(), arch);
        }
    }

    #[test]
    fn test_from_flavor()
    {
        assert_eq!(Architecture::from_flavor(4), Some(Architecture::X86_64));
        assert_eq!(Architecture::from_flavor(6), Some(Architecture::Arm64));
        assert_eq!(Architecture::from_flavor(5), None);
    }

    #[cfg(any(target_arch = "aarch64", target_arch = "x86_64"))]
    #[test]
    fn test_host_is_supported()
    {
        let host = Architecture::host().unwrap();
        assert_eq!(host.name(), std::env::consts::ARCH.replace("aarch64", "arm64"));
    }
}
