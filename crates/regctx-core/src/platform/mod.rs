//! # Platform Implementations
//!
//! What the build target declares, and the backends that move thread state.
//!
//! - [`HostDeclarations`]: the thread-state types and constants the build
//!   target's system bindings (`libc`, `mach2`) already provide
//! - [`SimulatedKernel`]: in-memory thread-state backend, any platform
//! - **macOS**: `MachThreadState`, calling `thread_get_state()` / `thread_set_state()`
//!   - See: [Apple Mach Kernel Programming](https://developer.apple.com/library/archive/documentation/Darwin/Conceptual/KernelProgramming/Mach/Mach.html)

use std::env;

use crate::guard::{PlatformDeclarations, Symbol};
use crate::layout::DeclaredStruct;
use crate::types::Architecture;

#[cfg(target_os = "macos")]
pub mod macos;
pub mod simulated;

#[cfg(target_os = "macos")]
pub use macos::MachThreadState;
pub use simulated::{SimulatedKernel, ThreadAccess};

/// Declarations of the build target
///
/// On macOS the native architecture's thread-state struct comes from `libc`
/// (`__darwin_arm_thread_state64` or `__darwin_x86_thread_state64`), and on
/// Intel the flavor constant from `mach2`. Nothing else is declared, and on
/// other operating systems nothing is declared at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostDeclarations;

impl PlatformDeclarations for HostDeclarations
{
    fn describe(&self) -> String
    {
        format!("{}-{}", env::consts::OS, env::consts::ARCH)
    }

    fn declared_struct(&self, architecture: Architecture) -> Option<DeclaredStruct>
    {
        #[cfg(target_os = "macos")]
        {
            macos::declared::thread_state_struct(architecture)
        }

        #[cfg(not(target_os = "macos"))]
        {
            let _ = architecture;
            None
        }
    }

    fn declared_constant(&self, symbol: Symbol) -> Option<i64>
    {
        #[cfg(target_os = "macos")]
        {
            macos::declared::constant(symbol)
        }

        #[cfg(not(target_os = "macos"))]
        {
            let _ = symbol;
            None
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn test_host_declares_nothing_off_macos()
    {
        assert!(Symbol::ALL.iter().all(|symbol| !HostDeclarations.declares(*symbol)));
    }

    #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
    #[test]
    fn test_host_declares_native_struct_only()
    {
        assert!(HostDeclarations.declares(Symbol::ThreadStateType(Architecture::Arm64)));
        assert!(!HostDeclarations.declares(Symbol::ThreadStateType(Architecture::X86_64)));
    }

    #[test]
    fn test_describe_names_target()
    {
        assert!(HostDeclarations.describe().contains(env::consts::OS));
    }
}
