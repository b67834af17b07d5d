//! # macOS Platform Support
//!
//! Thread-state access through the Mach kernel.
//!
//! ## Key Mach APIs Used
//!
//! - `thread_get_state()`: Read thread registers (declared in [`ffi`])
//! - `thread_set_state()`: Write thread registers (declared in [`ffi`])
//!
//! ## Dependencies
//!
//! - **libc crate**: Mach type definitions and the native thread-state struct
//! - **mach2 crate**: Flavor constants where it declares them
//! - **extern "C"**: The thread-state calls themselves
//!
//! ## References
//!
//! - [Apple Mach Kernel Programming](https://developer.apple.com/library/archive/documentation/Darwin/Conceptual/KernelProgramming/Mach/Mach.html)

pub mod backend;
pub mod declared;
pub mod ffi;

pub use backend::MachThreadState;
