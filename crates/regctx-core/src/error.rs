//! # Error Types
//!
//! Error handling for layout construction and thread-state access.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::kern::KernReturn;
use crate::types::{Architecture, ThreadHandle};

/// Main error type for register context operations
///
/// ## Error Categories
///
/// 1. **Construction errors**: UnsupportedArchitecture, MalformedLayout. These
///    abort initialisation and are never retried.
/// 2. **Access errors**: InvalidThreadHandle, PermissionDenied,
///    ArchitectureMismatch, TruncatedState, StateCallFailed
/// 3. **Snapshot errors**: IncompleteSnapshot, UnknownRegister, ValueOutOfRange
/// 4. **Configuration errors**: InvalidConfig
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegctxError
{
    /// No register layout exists for the requested architecture
    #[error("Unsupported architecture: {0}")]
    UnsupportedArchitecture(String),

    /// A layout violated a construction-time invariant
    ///
    /// Examples:
    /// - Size not a multiple of 4 bytes, or word count disagreeing with size
    /// - Overlapping, misaligned or missing fields
    /// - Flavor differing from the protocol constant
    ///
    /// A correct build never produces this error.
    #[error("Malformed {architecture} layout: {reason}")]
    MalformedLayout
    {
        /// Architecture whose layout failed validation
        architecture: Architecture,
        /// Which invariant was violated
        reason: String,
    },

    /// The handle does not refer to a live, accessible thread
    ///
    /// This happens when:
    /// - The port name is not a thread port in our IPC space
    /// - The thread has terminated
    #[error("Invalid thread handle {thread}: {code}")]
    InvalidThreadHandle
    {
        /// Handle passed by the caller
        thread: ThreadHandle,
        /// Kernel return code
        code: KernReturn,
    },

    /// Insufficient rights to inspect or modify the target thread
    ///
    /// On macOS the caller needs a thread port obtained through `task_for_pid()`,
    /// which requires root or the `com.apple.security.cs.debugger` entitlement.
    #[error("Permission denied for thread {thread}: {code}")]
    PermissionDenied
    {
        /// Handle passed by the caller
        thread: ThreadHandle,
        /// Kernel return code
        code: KernReturn,
    },

    /// The requested architecture cannot be serviced for this thread
    #[error(
        "Architecture mismatch on thread {thread}: requested {requested}, thread services {}",
        .serviced.map_or("neither flavor", |arch| arch.name())
    )]
    ArchitectureMismatch
    {
        /// Handle passed by the caller
        thread: ThreadHandle,
        /// Architecture the caller asked for
        requested: Architecture,
        /// Architecture the kernel services for the thread, if known
        serviced: Option<Architecture>,
    },

    /// A write was attempted with a snapshot lacking required registers
    ///
    /// The kernel overwrites the whole register file, so partial writes are
    /// refused before any kernel call.
    #[error("Incomplete {architecture} snapshot: missing {}", .missing.join(", "))]
    IncompleteSnapshot
    {
        /// Architecture of the snapshot
        architecture: Architecture,
        /// Canonical names of the absent registers, in layout order
        missing: Vec<&'static str>,
    },

    /// A register name is not part of the architecture's register set
    #[error("Unknown {architecture} register: {name}")]
    UnknownRegister
    {
        /// Architecture that was searched
        architecture: Architecture,
        /// Name as given by the caller
        name: String,
    },

    /// A value does not fit its register
    #[error("Value {value:#x} does not fit {width}-byte register {register}")]
    ValueOutOfRange
    {
        /// Canonical register name
        register: &'static str,
        /// Register width in bytes
        width: usize,
        /// Rejected value
        value: u64,
    },

    /// The kernel returned fewer state words than the layout requires
    #[error("Truncated thread state from {thread}: expected {expected} words, got {actual}")]
    TruncatedState
    {
        /// Handle passed by the caller
        thread: ThreadHandle,
        /// Layout word count
        expected: u32,
        /// Count reported by the kernel
        actual: u32,
    },

    /// A thread-state call failed with an unclassified kernel return code
    #[error("{operation} failed on thread {thread}: {code}")]
    StateCallFailed
    {
        /// Description of the operation that failed
        operation: &'static str,
        /// Handle passed by the caller
        thread: ThreadHandle,
        /// Kernel return code
        code: KernReturn,
    },

    /// A configuration value could not be parsed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RegctxError
{
    /// True for errors that can only come from building layouts.
    #[must_use]
    pub const fn is_construction_error(&self) -> bool
    {
        matches!(
            self,
            RegctxError::UnsupportedArchitecture(_) | RegctxError::MalformedLayout { .. }
        )
    }

    pub(crate) fn malformed(architecture: Architecture, reason: impl Into<String>) -> Self
    {
        RegctxError::MalformedLayout {
            architecture,
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for `Result<T, RegctxError>`
///
/// ```rust
/// use regctx_core::error::RegctxResult;
/// fn foo() -> RegctxResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type RegctxResult<T> = std::result::Result<T, RegctxError>;
