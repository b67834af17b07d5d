//! # Types
//!
//! Architecture-neutral types shared by the layout registry and the thread
//! context accessor.

pub mod architecture;
pub mod registers;
pub mod snapshot;
pub mod thread;

// Re-export all public types
pub use architecture::Architecture;
pub use registers::{
    register_for_role, register_index, RegisterDef, RegisterRole, ARM64_REGISTERS, ARM64_REGISTER_COUNT, X86_64_REGISTERS,
    X86_64_REGISTER_COUNT,
};
pub use snapshot::RegisterSnapshot;
pub use thread::ThreadHandle;
