//! Thread handle type.

use std::fmt;

/// Opaque handle to a target thread
///
/// On macOS this is the Mach thread port (`thread_act_t`) obtained from an
/// enumeration call such as `task_threads()`. This crate only consumes handles;
/// obtaining them (and suspending the thread before writing) is the caller's
/// responsibility.
///
/// ## Example
///
/// ```rust
/// use regctx_core::types::ThreadHandle;
///
/// let thread = ThreadHandle::from(0x1503);
/// assert_eq!(thread.raw(), 0x1503);
/// assert_eq!(thread.to_string(), "0x1503");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadHandle(pub u32);

impl ThreadHandle
{
    /// Get the raw port value
    #[must_use]
    pub const fn raw(self) -> u32
    {
        self.0
    }
}

impl From<u32> for ThreadHandle
{
    fn from(value: u32) -> Self
    {
        Self(value)
    }
}

impl From<ThreadHandle> for u32
{
    fn from(handle: ThreadHandle) -> Self
    {
        handle.0
    }
}

impl fmt::Display for ThreadHandle
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{:#x}", self.0)
    }
}
