//! Tests for architecture tags, register tables and snapshots

use regctx_core::types::{register_for_role, register_index, Architecture, RegisterRole, RegisterSnapshot, ThreadHandle};
use regctx_core::RegctxError;

#[test]
fn test_architecture_parsing()
{
    assert_eq!("x86_64".parse::<Architecture>(), Ok(Architecture::X86_64));
    assert_eq!("AMD64".parse::<Architecture>(), Ok(Architecture::X86_64));
    assert_eq!("aarch64".parse::<Architecture>(), Ok(Architecture::Arm64));
    assert_eq!("arm64".parse::<Architecture>(), Ok(Architecture::Arm64));
    assert!(matches!(
        "riscv64".parse::<Architecture>(),
        Err(RegctxError::UnsupportedArchitecture(_))
    ));
}

#[test]
fn test_architecture_protocol_constants()
{
    assert_eq!(Architecture::X86_64.thread_state_flavor(), 4);
    assert_eq!(Architecture::X86_64.thread_state_word_count(), 42);
    assert_eq!(Architecture::Arm64.thread_state_flavor(), 6);
    assert_eq!(Architecture::Arm64.thread_state_word_count(), 68);
    assert_eq!(Architecture::from_flavor(6), Some(Architecture::Arm64));
    assert_eq!(Architecture::from_flavor(7), None);
}

#[test]
fn test_architecture_opposite()
{
    for arch in Architecture::ALL {
        assert_ne!(arch.opposite(), arch);
        assert_eq!(arch.opposite().opposite(), arch);
    }
}

#[test]
fn test_probe_order()
{
    assert_eq!(
        Architecture::probe_order(Some(Architecture::Arm64)),
        [Architecture::Arm64, Architecture::X86_64]
    );
    assert_eq!(
        Architecture::probe_order(Some(Architecture::X86_64)),
        [Architecture::X86_64, Architecture::Arm64]
    );
    // Unsupported host
    assert_eq!(Architecture::probe_order(None), Architecture::ALL);
}

#[test]
fn test_register_tables()
{
    assert_eq!(Architecture::X86_64.registers().len(), 21);
    assert_eq!(Architecture::Arm64.registers().len(), 35);

    let total: usize = Architecture::Arm64.registers().iter().map(|def| def.width).sum();
    assert_eq!(total, 272);
    let total: usize = Architecture::X86_64.registers().iter().map(|def| def.width).sum();
    assert_eq!(total, 168);
}

#[test]
fn test_register_index_aliases()
{
    assert_eq!(register_index(Architecture::Arm64, "x29"), register_index(Architecture::Arm64, "fp"));
    assert_eq!(register_index(Architecture::Arm64, "X30"), register_index(Architecture::Arm64, "lr"));
    assert_eq!(register_index(Architecture::X86_64, "RAX"), Some(0));
    assert_eq!(register_index(Architecture::X86_64, "x29"), None);
}

#[test]
fn test_register_roles()
{
    assert_eq!(register_for_role(Architecture::X86_64, RegisterRole::ProgramCounter), Some("rip"));
    assert_eq!(register_for_role(Architecture::Arm64, RegisterRole::Padding), Some("pad"));
    assert_eq!(register_for_role(Architecture::X86_64, RegisterRole::LinkRegister), None);
}

#[test]
fn test_snapshot_new_is_empty()
{
    let regs = RegisterSnapshot::new(Architecture::Arm64);
    assert!(regs.is_empty());
    assert!(!regs.is_complete());
    assert_eq!(regs.missing().len(), 35);
}

#[test]
fn test_snapshot_zeroed_is_complete()
{
    let regs = RegisterSnapshot::zeroed(Architecture::X86_64);
    assert!(regs.is_complete());
    assert_eq!(regs.len(), 21);
    assert!(regs.iter().all(|(_, value)| value == 0));
}

#[test]
fn test_snapshot_set_returns_previous()
{
    let mut regs = RegisterSnapshot::zeroed(Architecture::X86_64);
    assert_eq!(regs.set("rax", 5).unwrap(), Some(0));
    assert_eq!(regs.set("RAX", 6).unwrap(), Some(5));
    assert_eq!(regs.get("rax"), Some(6));
    assert_eq!(regs.remove("rax"), Some(6));
    assert_eq!(regs.missing(), vec!["rax"]);
}

#[test]
fn test_snapshot_unknown_register()
{
    let mut regs = RegisterSnapshot::new(Architecture::Arm64);
    let err = regs.set("rax", 1).unwrap_err();
    assert_eq!(
        err,
        RegctxError::UnknownRegister {
            architecture: Architecture::Arm64,
            name: "rax".to_string()
        }
    );
}

#[test]
fn test_snapshot_narrow_register_range()
{
    let mut regs = RegisterSnapshot::new(Architecture::Arm64);
    assert!(regs.set("cpsr", 0xFFFF_FFFF).is_ok());

    let err = regs.set("cpsr", 0x1_0000_0000).unwrap_err();
    assert!(matches!(err, RegctxError::ValueOutOfRange { register: "cpsr", width: 4, .. }));
    assert_eq!(regs.get("cpsr"), Some(0xFFFF_FFFF));
}

#[test]
fn test_snapshot_iterates_in_layout_order()
{
    let mut regs = RegisterSnapshot::new(Architecture::X86_64);
    regs.set("gs", 3).unwrap();
    regs.set("rax", 1).unwrap();
    regs.set("rip", 2).unwrap();

    let names: Vec<_> = regs.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["rax", "rip", "gs"]);
}

#[test]
fn test_snapshot_display()
{
    let mut regs = RegisterSnapshot::new(Architecture::Arm64);
    regs.set("pc", 0x1_0000_4000).unwrap();

    assert_eq!(regs.to_string(), "    pc=0x0000000100004000\n");
}

#[test]
fn test_thread_handle_conversions()
{
    let thread = ThreadHandle::from(0x2a03);
    let raw: u32 = thread.into();
    assert_eq!(raw, 0x2a03);
    assert_eq!(thread.to_string(), "0x2a03");
}
