//! # regctx-core
//!
//! Cross-architecture access to the general-purpose registers of a thread.
//!
//! The kernel moves a thread's registers as an opaque "thread state" blob
//! tagged with a flavor and a word count, and the platform headers usually
//! declare the blob's layout only for the host's own architecture. This crate
//! provides both layouts and presents them through one architecture-neutral
//! [`RegisterSnapshot`](types::RegisterSnapshot):
//!
//! - [`layout`]: the exact binary layout of each architecture's blob
//! - [`guard`]: one-time negotiation deciding, per type and constant, whether
//!   the platform's declaration or this crate's is the active one
//! - [`accessor`]: reading and writing a thread's registers through a
//!   [`ThreadStateBackend`](accessor::ThreadStateBackend)
//! - [`abi`]: calling-convention roles on top of a snapshot
//!
//! ## Platform Support
//!
//! - **macOS**: Real thread-state access through Mach (`thread_get_state`, `thread_set_state`)
//! - **Anywhere**: Layouts, negotiation, and the in-memory
//!   [`SimulatedKernel`](platform::SimulatedKernel) backend
//!
//! ## Example
//!
//! ```rust
//! use regctx_core::prelude::*;
//!
//! let kernel = SimulatedKernel::new();
//! let thread = kernel.spawn(Architecture::X86_64);
//! let context = ThreadContext::new(&kernel)?.with_config(AccessorConfig::default().with_mismatch_policy(MismatchPolicy::BestEffort));
//!
//! let regs = context.modify(thread, Architecture::X86_64, |regs| regs.set_pc(0x1_0000_0f00))?;
//! assert_eq!(regs.get("rip"), Some(0x1_0000_0f00));
//! # Ok::<(), RegctxError>(())
//! ```
//!
//! ## Why unsafe code is needed
//!
//! The macOS backend calls the Mach thread-state functions directly. Those
//! calls are wrapped in a safe [`ThreadStateBackend`](accessor::ThreadStateBackend)
//! implementation; everything else is safe Rust.

#![allow(unsafe_code)] // Required for the Mach thread-state calls

pub mod abi;
pub mod accessor;
pub mod config;
pub mod constants;
pub mod error;
pub mod guard;
pub mod kern;
pub mod layout;
pub mod platform;
pub mod prelude;
pub mod types;

pub use accessor::{ThreadContext, ThreadStateBackend};
pub use error::{RegctxError, RegctxResult};
pub use layout::{LayoutRegistry, RegisterLayout};
pub use types::{Architecture, RegisterSnapshot, ThreadHandle};
