//! Tests for register layouts and the layout registry

use regctx_core::constants::STATE_WORD_SIZE;
use regctx_core::guard::DeclarationTable;
use regctx_core::layout::{arm64, x86_64, DeclaredStruct, LayoutProvenance, LayoutRegistry, Provenance, RegisterLayout};
use regctx_core::types::{Architecture, RegisterSnapshot, ARM64_REGISTERS, X86_64_REGISTERS};
use regctx_core::RegctxError;

fn bare_registry() -> LayoutRegistry
{
    LayoutRegistry::from_platform(&DeclarationTable::new("bare")).unwrap()
}

fn assert_malformed(result: Result<RegisterLayout, RegctxError>, arch: Architecture)
{
    match result {
        Err(RegctxError::MalformedLayout { architecture, .. }) => assert_eq!(architecture, arch),
        other => panic!("expected MalformedLayout, got {other:?}"),
    }
}

#[test]
fn test_x86_64_layout_shape()
{
    let registry = bare_registry();
    let layout = registry.layout_for(Architecture::X86_64).unwrap();

    assert_eq!(layout.flavor(), 4);
    assert_eq!(layout.fields().len(), 21);
    assert_eq!(layout.size(), 168);
    assert_eq!(layout.word_count(), 42);
    assert_eq!(layout.type_name(), "x86_thread_state64_t");

    for (idx, field) in layout.fields().iter().enumerate() {
        assert_eq!(field.offset, idx * 8, "{}", field.name);
        assert_eq!(field.width, 8, "{}", field.name);
    }
    assert_eq!(layout.field("rip").map(|field| field.offset), Some(128));
    assert_eq!(layout.field("gs").map(|field| field.end()), Some(168));
}

#[test]
fn test_arm64_layout_shape()
{
    let registry = bare_registry();
    let layout = registry.layout_for(Architecture::Arm64).unwrap();

    assert_eq!(layout.flavor(), 6);
    assert_eq!(layout.fields().len(), 35);
    assert_eq!(layout.size(), 272);
    assert_eq!(layout.word_count(), 68);
    assert_eq!(layout.type_name(), "arm_thread_state64_t");

    let offset = |name: &str| layout.field(name).map(|field| (field.offset, field.width));
    assert_eq!(offset("x0"), Some((0, 8)));
    assert_eq!(offset("x28"), Some((224, 8)));
    assert_eq!(offset("fp"), Some((232, 8)));
    assert_eq!(offset("lr"), Some((240, 8)));
    assert_eq!(offset("sp"), Some((248, 8)));
    assert_eq!(offset("pc"), Some((256, 8)));
    assert_eq!(offset("cpsr"), Some((264, 4)));
    assert_eq!(offset("pad"), Some((268, 4)));
}

#[test]
fn test_word_count_covers_size()
{
    for layout in bare_registry().iter() {
        assert_eq!(layout.word_count() as usize * STATE_WORD_SIZE, layout.size());
        assert_eq!(layout.empty_state().len(), layout.word_count() as usize);
    }
}

#[test]
fn test_synthesized_provenance()
{
    for layout in bare_registry().iter() {
        assert_eq!(layout.provenance(), LayoutProvenance::SYNTHESIZED);
    }
}

#[test]
fn test_unsupported_architecture()
{
    let registry = LayoutRegistry::with_architectures(&DeclarationTable::new("x86 only"), &[Architecture::X86_64]).unwrap();

    assert!(registry.layout_for(Architecture::X86_64).is_ok());
    assert!(matches!(
        registry.layout_for(Architecture::Arm64),
        Err(RegctxError::UnsupportedArchitecture(_))
    ));
}

#[test]
fn test_global_registry_is_shared()
{
    let first = LayoutRegistry::global().unwrap();
    let second = LayoutRegistry::global().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    for arch in Architecture::ALL {
        let layout = first.layout_for(arch).unwrap();
        assert_eq!(layout.flavor(), arch.thread_state_flavor());
        assert_eq!(layout.word_count(), arch.thread_state_word_count());
    }
}

#[test]
fn test_size_not_word_multiple_is_malformed()
{
    let mut structure = x86_64::synthesized();
    structure.size = 170;
    assert_malformed(
        RegisterLayout::new(Architecture::X86_64, structure, 4, 42, LayoutProvenance::SYNTHESIZED),
        Architecture::X86_64,
    );
}

#[test]
fn test_count_disagreeing_with_size_is_malformed()
{
    assert_malformed(
        RegisterLayout::new(Architecture::X86_64, x86_64::synthesized(), 4, 40, LayoutProvenance::SYNTHESIZED),
        Architecture::X86_64,
    );
}

#[test]
fn test_wrong_flavor_is_malformed()
{
    assert_malformed(
        RegisterLayout::new(Architecture::Arm64, arm64::synthesized(), 4, 68, LayoutProvenance::SYNTHESIZED),
        Architecture::Arm64,
    );
}

#[test]
fn test_overlapping_fields_are_malformed()
{
    let mut structure = arm64::synthesized();
    structure.fields[1].offset = 0;
    assert_malformed(
        RegisterLayout::new(Architecture::Arm64, structure, 6, 68, LayoutProvenance::SYNTHESIZED),
        Architecture::Arm64,
    );
}

#[test]
fn test_misaligned_field_is_malformed()
{
    let mut structure = arm64::synthesized();
    structure.fields[1].offset = 12;
    assert_malformed(
        RegisterLayout::new(Architecture::Arm64, structure, 6, 68, LayoutProvenance::SYNTHESIZED),
        Architecture::Arm64,
    );
}

#[test]
fn test_missing_trailing_field_is_malformed()
{
    let mut structure = arm64::synthesized();
    structure.fields.pop();
    assert_malformed(
        RegisterLayout::new(Architecture::Arm64, structure, 6, 68, LayoutProvenance::SYNTHESIZED),
        Architecture::Arm64,
    );
}

#[test]
fn test_renamed_field_is_malformed()
{
    let mut structure = x86_64::synthesized();
    structure.fields[0].name = "eax";
    assert_malformed(
        RegisterLayout::new(Architecture::X86_64, structure, 4, 42, LayoutProvenance::SYNTHESIZED),
        Architecture::X86_64,
    );
}

#[test]
fn test_interior_gap_is_malformed()
{
    // A hole after rflags pushes the segment registers past the end of the struct.
    let mut structure = x86_64::synthesized();
    for field in &mut structure.fields[18..] {
        field.offset += 8;
    }

    let result = RegisterLayout::new(Architecture::X86_64, structure, 4, 42, LayoutProvenance::SYNTHESIZED);
    match result {
        Err(RegctxError::MalformedLayout { reason, .. }) => assert!(reason.contains("ends at 176"), "{reason}"),
        other => panic!("expected MalformedLayout, got {other:?}"),
    }
}

#[test]
fn test_decode_pairs_words_little_endian()
{
    let registry = bare_registry();
    let layout = registry.layout_for(Architecture::X86_64).unwrap();

    let mut words = layout.empty_state();
    words[0] = 0xdead_beef;
    words[1] = 0x0000_0001;
    words[32] = 0x0000_3f00;
    words[33] = 0x0000_0001;

    let regs = layout.decode(&words).unwrap();
    assert!(regs.is_complete());
    assert_eq!(regs.get("rax"), Some(0x1_dead_beef));
    assert_eq!(regs.get("rip"), Some(0x1_0000_3f00));
    assert_eq!(regs.get("rbx"), Some(0));
}

#[test]
fn test_decode_narrow_fields_zero_extend()
{
    let registry = bare_registry();
    let layout = registry.layout_for(Architecture::Arm64).unwrap();

    let mut words = layout.empty_state();
    words[66] = 0x8000_0000;
    words[67] = 0xffff_ffff;

    let regs = layout.decode(&words).unwrap();
    assert_eq!(regs.get("cpsr"), Some(0x8000_0000));
    assert_eq!(regs.get("pad"), Some(0xffff_ffff));
    assert_eq!(regs.get("pc"), Some(0));
}

#[test]
fn test_decode_rejects_wrong_length()
{
    let registry = bare_registry();
    let layout = registry.layout_for(Architecture::Arm64).unwrap();

    assert!(matches!(
        layout.decode(&[0; 42]),
        Err(RegctxError::MalformedLayout { .. })
    ));
}

#[test]
fn test_encode_splits_values()
{
    let registry = bare_registry();
    let layout = registry.layout_for(Architecture::Arm64).unwrap();

    let mut regs = RegisterSnapshot::zeroed(Architecture::Arm64);
    regs.set("x1", 0x1122_3344_5566_7788).unwrap();
    regs.set("cpsr", 0x6000_1000).unwrap();

    let words = layout.encode(&regs).unwrap();
    assert_eq!(words.len(), 68);
    assert_eq!(words[2], 0x5566_7788);
    assert_eq!(words[3], 0x1122_3344);
    assert_eq!(words[66], 0x6000_1000);
    assert_eq!(layout.decode(&words).unwrap(), regs);
}

#[test]
fn test_encode_incomplete_snapshot()
{
    let registry = bare_registry();
    let layout = registry.layout_for(Architecture::X86_64).unwrap();

    let mut regs = RegisterSnapshot::zeroed(Architecture::X86_64);
    regs.remove("r9");
    regs.remove("fs");

    assert_eq!(
        layout.encode(&regs),
        Err(RegctxError::IncompleteSnapshot {
            architecture: Architecture::X86_64,
            missing: vec!["r9", "fs"],
        })
    );
}

#[test]
fn test_encode_other_architecture()
{
    let registry = bare_registry();
    let layout = registry.layout_for(Architecture::X86_64).unwrap();

    assert!(matches!(
        layout.encode(&RegisterSnapshot::zeroed(Architecture::Arm64)),
        Err(RegctxError::UnsupportedArchitecture(_))
    ));
}

#[test]
fn test_declared_struct_is_plain_data()
{
    let structure: DeclaredStruct = arm64::synthesized();
    assert_eq!(structure.size, std::mem::size_of::<arm64::ArmThreadState64>());
    assert_eq!(structure.fields.len(), ARM64_REGISTERS.len());

    let structure = x86_64::synthesized();
    assert_eq!(structure.size, std::mem::size_of::<x86_64::X86ThreadState64>());
    assert_eq!(structure.fields.len(), X86_64_REGISTERS.len());
    assert_eq!(Provenance::Platform.to_string(), "platform");
}

#[test]
fn test_synthesized_fields_follow_register_tables()
{
    let names = |structure: DeclaredStruct| structure.fields.iter().map(|field| field.name).collect::<Vec<_>>();

    let expected: Vec<&str> = ARM64_REGISTERS.iter().map(|def| def.name).collect();
    assert_eq!(names(arm64::synthesized()), expected);
    assert_eq!(expected.len(), arm64::GENERAL_REGISTER_COUNT + 6);
    assert_eq!(expected[28], "x28");
    assert_eq!(expected[29], "fp");
    assert_eq!(expected[34], "pad");

    let expected: Vec<&str> = X86_64_REGISTERS.iter().map(|def| def.name).collect();
    assert_eq!(names(x86_64::synthesized()), expected);
}
