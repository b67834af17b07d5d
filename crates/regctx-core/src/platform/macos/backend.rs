//! Mach thread-state backend.

use libc::{c_int, mach_msg_type_number_t};
use tracing::trace;

use super::ffi;
use crate::accessor::{ThreadContext, ThreadStateBackend};
use crate::config::AccessorConfig;
use crate::error::RegctxResult;
use crate::kern::{KernReturn, KERN_INVALID_ARGUMENT};
use crate::types::ThreadHandle;

/// [`ThreadStateBackend`] calling the real `thread_get_state()` / `thread_set_state()`
///
/// Handles must be thread ports of a task the caller holds rights on, which
/// needs root or the `com.apple.security.cs.debugger` entitlement for other
/// processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MachThreadState;

impl ThreadStateBackend for MachThreadState
{
    fn get_state(&self, thread: ThreadHandle, flavor: c_int, state: &mut [u32], count: &mut u32) -> Result<(), KernReturn>
    {
        let capacity = mach_msg_type_number_t::try_from(state.len()).map_err(|_| KernReturn(KERN_INVALID_ARGUMENT))?;
        let mut filled: mach_msg_type_number_t = (*count).min(capacity);

        // SAFETY: `filled` never exceeds the length of `state`, so the kernel
        // writes at most `state.len()` words.
        let kr = unsafe { ffi::thread_get_state(thread.raw(), flavor, state.as_mut_ptr(), &mut filled) };
        trace!(thread = %thread, flavor, kr, words = filled, "thread_get_state");
        KernReturn::check(kr)?;

        *count = filled;
        Ok(())
    }

    fn set_state(&self, thread: ThreadHandle, flavor: c_int, state: &[u32]) -> Result<(), KernReturn>
    {
        let count = mach_msg_type_number_t::try_from(state.len()).map_err(|_| KernReturn(KERN_INVALID_ARGUMENT))?;

        // SAFETY: the kernel reads exactly `count` words, the length of `state`.
        let kr = unsafe { ffi::thread_set_state(thread.raw(), flavor, state.as_ptr(), count) };
        trace!(thread = %thread, flavor, kr, words = count, "thread_set_state");
        KernReturn::check(kr)
    }
}

impl ThreadContext<MachThreadState>
{
    /// Accessor over the real kernel, configured from the environment
    ///
    /// ## Errors
    ///
    /// - `MalformedLayout`: the global registry failed to build
    /// - `InvalidConfig`: `REGCTX_MISMATCH_POLICY` does not parse
    pub fn native() -> RegctxResult<Self>
    {
        Ok(ThreadContext::new(MachThreadState)?.with_config(AccessorConfig::from_env()?))
    }
}
