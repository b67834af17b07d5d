//! # macOS Thread-State FFI Declarations
//!
//! `extern "C"` declarations for the Mach thread-state calls, which the
//! `mach2` crate does not expose with the signatures used here.
//!
//! ## Safety Notes
//!
//! Both functions are `unsafe`: they hand raw buffers to the kernel, and a
//! buffer shorter than the count passed in lets the kernel write past it.
//! [`MachThreadState`](super::MachThreadState) wraps them and always derives
//! the count from the slice it passes.
//!
//! ## References
//!
//! - [thread_get_state(3) man page](https://developer.apple.com/documentation/kernel/1418576-thread_get_state/)
//! - [thread_set_state(3) man page](https://developer.apple.com/documentation/kernel/1418827-thread_set_state/)

// Doc comments in extern blocks are kept for readers even though rustdoc ignores them
#![allow(unused_doc_comments)]

use libc::{c_int, kern_return_t, mach_msg_type_number_t, natural_t, thread_act_t};

#[link(name = "c", kind = "dylib")]
extern "C" {
    /// Read thread state (registers) from a thread
    ///
    /// ## Parameters
    ///
    /// - `target_act`: Thread port (from `task_threads()`)
    /// - `flavor`: State flavor (`x86_THREAD_STATE64` = 4, `ARM_THREAD_STATE64` = 6, ...)
    /// - `old_state`: Output buffer for state words
    /// - `old_state_count`: In: buffer capacity in words. Out: words filled
    ///
    /// ## Returns
    ///
    /// - `KERN_SUCCESS` (0) on success
    /// - `KERN_INVALID_ARGUMENT` if the flavor is not serviced or the buffer is too small
    /// - `MACH_SEND_INVALID_DEST` if the thread port is dead
    pub fn thread_get_state(
        target_act: thread_act_t,
        flavor: c_int,
        old_state: *mut natural_t,
        old_state_count: *mut mach_msg_type_number_t,
    ) -> kern_return_t;

    /// Write thread state (registers) to a thread
    ///
    /// The thread should be suspended; the new state takes effect when it resumes.
    ///
    /// ## Returns
    ///
    /// - `KERN_SUCCESS` (0) on success
    /// - `KERN_INVALID_ARGUMENT` if the flavor or count is wrong for the thread
    /// - `KERN_PROTECTION_FAILURE` if the caller lacks rights
    pub fn thread_set_state(
        target_act: thread_act_t,
        flavor: c_int,
        new_state: *const natural_t,
        new_state_count: mach_msg_type_number_t,
    ) -> kern_return_t;
}
