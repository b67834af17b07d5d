//! Common module for library exports

pub use crate::abi::CallingConvention;
pub use crate::accessor::{ThreadContext, ThreadStateBackend};
pub use crate::config::{AccessorConfig, MismatchPolicy};
pub use crate::error::{RegctxError, RegctxResult};
pub use crate::guard::{ConflictFlags, DeclarationTable, PlatformDeclarations, Symbol};
pub use crate::layout::{LayoutRegistry, RegisterLayout};
#[cfg(target_os = "macos")]
pub use crate::platform::MachThreadState;
pub use crate::platform::{HostDeclarations, SimulatedKernel, ThreadAccess};
pub use crate::types::{Architecture, RegisterSnapshot, ThreadHandle};
