//! Tests for error types

use regctx_core::kern::{KernReturn, KERN_FAILURE, KERN_PROTECTION_FAILURE, MACH_SEND_INVALID_DEST};
use regctx_core::types::{Architecture, ThreadHandle};
use regctx_core::RegctxError;

#[test]
fn test_error_display()
{
    let error = RegctxError::UnsupportedArchitecture("riscv64".to_string());
    assert_eq!(error.to_string(), "Unsupported architecture: riscv64");

    let error = RegctxError::InvalidThreadHandle {
        thread: ThreadHandle(0x1003),
        code: KernReturn(MACH_SEND_INVALID_DEST),
    };
    assert_eq!(
        error.to_string(),
        "Invalid thread handle 0x1003: MACH_SEND_INVALID_DEST (0x10000003)"
    );

    let error = RegctxError::PermissionDenied {
        thread: ThreadHandle(0x1003),
        code: KernReturn(KERN_PROTECTION_FAILURE),
    };
    assert!(error.to_string().contains("KERN_PROTECTION_FAILURE"));
}

#[test]
fn test_architecture_mismatch_display()
{
    let error = RegctxError::ArchitectureMismatch {
        thread: ThreadHandle(0x1003),
        requested: Architecture::X86_64,
        serviced: Some(Architecture::Arm64),
    };
    assert_eq!(
        error.to_string(),
        "Architecture mismatch on thread 0x1003: requested x86_64, thread services arm64"
    );

    let error = RegctxError::ArchitectureMismatch {
        thread: ThreadHandle(0x1003),
        requested: Architecture::X86_64,
        serviced: None,
    };
    assert!(error.to_string().ends_with("neither flavor"));
}

#[test]
fn test_incomplete_snapshot_display()
{
    let error = RegctxError::IncompleteSnapshot {
        architecture: Architecture::Arm64,
        missing: vec!["x3", "cpsr"],
    };
    assert_eq!(error.to_string(), "Incomplete arm64 snapshot: missing x3, cpsr");
}

#[test]
fn test_unknown_kern_return_display()
{
    let error = RegctxError::StateCallFailed {
        operation: "thread_get_state",
        thread: ThreadHandle(1),
        code: KernReturn(0x1234),
    };
    assert_eq!(error.to_string(), "thread_get_state failed on thread 0x1: kern_return_t 0x1234");

    let error = RegctxError::StateCallFailed {
        operation: "thread_set_state",
        thread: ThreadHandle(1),
        code: KernReturn(KERN_FAILURE),
    };
    assert!(error.to_string().contains("KERN_FAILURE"));
}

#[test]
fn test_construction_errors()
{
    assert!(RegctxError::UnsupportedArchitecture("mips".to_string()).is_construction_error());
    assert!(RegctxError::MalformedLayout {
        architecture: Architecture::X86_64,
        reason: "gap".to_string()
    }
    .is_construction_error());
    assert!(!RegctxError::InvalidConfig("x".to_string()).is_construction_error());
}

#[test]
fn test_error_is_std_error()
{
    fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
    assert_error::<RegctxError>();
}
