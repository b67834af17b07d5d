//! # Kernel Return Codes
//!
//! Mach thread-state calls return `kern_return_t` values. This module names the
//! codes relevant to `thread_get_state()` / `thread_set_state()` and classifies
//! them into the accessor's failure categories.
//!
//! The values are kernel protocol constants and are defined here so that
//! classification works on every build target, including the simulated backend
//! on non-Mach hosts. On macOS they are checked against `mach2` in tests.
//!
//! ## References
//!
//! - [kern_return.h](https://github.com/apple-oss-distributions/xnu/blob/main/osfmk/mach/kern_return.h)
//! - [message.h](https://github.com/apple-oss-distributions/xnu/blob/main/osfmk/mach/message.h)

use std::fmt;

/// `kern_return_t`
pub type KernReturnCode = i32;

pub const KERN_SUCCESS: KernReturnCode = 0;
pub const KERN_PROTECTION_FAILURE: KernReturnCode = 2;
pub const KERN_INVALID_ARGUMENT: KernReturnCode = 4;
pub const KERN_FAILURE: KernReturnCode = 5;
pub const KERN_NO_ACCESS: KernReturnCode = 8;
pub const KERN_INVALID_NAME: KernReturnCode = 15;
pub const KERN_INVALID_RIGHT: KernReturnCode = 17;
pub const KERN_INVALID_CAPABILITY: KernReturnCode = 20;
pub const KERN_TERMINATED: KernReturnCode = 37;
/// The destination port of the MIG request is dead or not a send right
pub const MACH_SEND_INVALID_DEST: KernReturnCode = 0x1000_0003;

/// How a kernel return code bears on a thread-state request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernClass
{
    /// The call succeeded
    Success,
    /// The handle is not a live thread port
    InvalidThread,
    /// The caller lacks rights on the thread
    PermissionDenied,
    /// The kernel refused the flavor (or its count) for this thread
    FlavorRejected,
    /// Anything else
    Other,
}

/// A raw kernel return code
///
/// ## Example
///
/// ```rust
/// use regctx_core::kern::{KernClass, KernReturn, KERN_PROTECTION_FAILURE};
///
/// let kr = KernReturn(KERN_PROTECTION_FAILURE);
/// assert_eq!(kr.class(), KernClass::PermissionDenied);
/// assert_eq!(kr.to_string(), "KERN_PROTECTION_FAILURE (0x2)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KernReturn(pub KernReturnCode);

impl KernReturn
{
    pub const SUCCESS: KernReturn = KernReturn(KERN_SUCCESS);

    /// Turn a raw return code into a `Result`.
    pub fn check(code: KernReturnCode) -> Result<(), KernReturn>
    {
        if code == KERN_SUCCESS {
            Ok(())
        } else {
            Err(KernReturn(code))
        }
    }

    #[must_use]
    pub const fn code(self) -> KernReturnCode
    {
        self.0
    }

    /// Symbolic name, when the code is one we know.
    #[must_use]
    pub const fn name(self) -> Option<&'static str>
    {
        match self.0 {
            KERN_SUCCESS => Some("KERN_SUCCESS"),
            KERN_PROTECTION_FAILURE => Some("KERN_PROTECTION_FAILURE"),
            KERN_INVALID_ARGUMENT => Some("KERN_INVALID_ARGUMENT"),
            KERN_FAILURE => Some("KERN_FAILURE"),
            KERN_NO_ACCESS => Some("KERN_NO_ACCESS"),
            KERN_INVALID_NAME => Some("KERN_INVALID_NAME"),
            KERN_INVALID_RIGHT => Some("KERN_INVALID_RIGHT"),
            KERN_INVALID_CAPABILITY => Some("KERN_INVALID_CAPABILITY"),
            KERN_TERMINATED => Some("KERN_TERMINATED"),
            MACH_SEND_INVALID_DEST => Some("MACH_SEND_INVALID_DEST"),
            _ => None,
        }
    }

    #[must_use]
    pub const fn class(self) -> KernClass
    {
        match self.0 {
            KERN_SUCCESS => KernClass::Success,
            MACH_SEND_INVALID_DEST | KERN_INVALID_NAME | KERN_INVALID_RIGHT | KERN_INVALID_CAPABILITY | KERN_TERMINATED => {
                KernClass::InvalidThread
            }
            KERN_PROTECTION_FAILURE | KERN_NO_ACCESS => KernClass::PermissionDenied,
            KERN_INVALID_ARGUMENT => KernClass::FlavorRejected,
            _ => KernClass::Other,
        }
    }
}

impl fmt::Display for KernReturn
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self.name() {
            Some(name) => write!(f, "{name} ({:#x})", self.0),
            None => write!(f, "kern_return_t {:#x}", self.0),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_classification()
    {
        assert_eq!(KernReturn(KERN_SUCCESS).class(), KernClass::Success);
        assert_eq!(KernReturn(MACH_SEND_INVALID_DEST).class(), KernClass::InvalidThread);
        assert_eq!(KernReturn(KERN_TERMINATED).class(), KernClass::InvalidThread);
        assert_eq!(KernReturn(KERN_NO_ACCESS).class(), KernClass::PermissionDenied);
        assert_eq!(KernReturn(KERN_INVALID_ARGUMENT).class(), KernClass::FlavorRejected);
        assert_eq!(KernReturn(KERN_FAILURE).class(), KernClass::Other);
        assert_eq!(KernReturn(-304).class(), KernClass::Other);
    }

    #[test]
    fn test_check()
    {
        assert_eq!(KernReturn::check(KERN_SUCCESS), Ok(()));
        assert_eq!(KernReturn::check(KERN_TERMINATED), Err(KernReturn(KERN_TERMINATED)));
    }

    #[test]
    fn test_display_unknown_code()
    {
        assert_eq!(KernReturn(999).to_string(), "kern_return_t 0x3e7");
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_codes_match_mach2()
    {
        use mach2::kern_return as kr;

        assert_eq!(KERN_SUCCESS, kr::KERN_SUCCESS);
        assert_eq!(KERN_PROTECTION_FAILURE, kr::KERN_PROTECTION_FAILURE);
        assert_eq!(KERN_INVALID_ARGUMENT, kr::KERN_INVALID_ARGUMENT);
        assert_eq!(KERN_FAILURE, kr::KERN_FAILURE);
        assert_eq!(KERN_NO_ACCESS, kr::KERN_NO_ACCESS);
        assert_eq!(KERN_INVALID_NAME, kr::KERN_INVALID_NAME);
        assert_eq!(KERN_INVALID_RIGHT, kr::KERN_INVALID_RIGHT);
        assert_eq!(KERN_INVALID_CAPABILITY, kr::KERN_INVALID_CAPABILITY);
        assert_eq!(KERN_TERMINATED, kr::KERN_TERMINATED);
    }
}
