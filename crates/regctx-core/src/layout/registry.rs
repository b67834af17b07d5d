//! # Layout Registry
//!
//! Table of validated [`RegisterLayout`]s, one per supported architecture.
//!
//! Each part of a layout is sourced independently. The struct shape, the
//! flavor constant and the word-count constant are each taken from the platform
//! when the [conflict guard](crate::guard) reports it declared, and from this
//! crate otherwise:
//!
//! | Part | Platform-declared | Not declared |
//! |------|-------------------|--------------|
//! | Struct shape | platform type, offsets read from it | `#[repr(C)]` struct in [`x86_64`](super::x86_64) / [`arm64`](super::arm64) |
//! | Flavor | platform constant | protocol constant (4 / 6) |
//! | Word count | platform constant | `size_of::<struct>() / 4` |
//!
//! Every combination is validated by [`RegisterLayout::new`]; a registry that
//! builds at all is bit-compatible with the kernel protocol.

use std::sync::Arc;

use libc::c_int;
use once_cell::sync::OnceCell;
use tracing::{debug, info};

use super::{arm64, x86_64, DeclaredStruct, LayoutProvenance, Provenance, RegisterLayout};
use crate::constants::STATE_WORD_SIZE;
use crate::error::{RegctxError, RegctxResult};
use crate::guard::{ConflictFlags, PlatformDeclarations, Symbol};
use crate::platform::HostDeclarations;
use crate::types::Architecture;

static GLOBAL: OnceCell<Arc<LayoutRegistry>> = OnceCell::new();

/// Validated layouts for a set of architectures
///
/// ## Example
///
/// ```rust
/// use regctx_core::layout::LayoutRegistry;
/// use regctx_core::types::Architecture;
///
/// let registry = LayoutRegistry::global()?;
/// let layout = registry.layout_for(Architecture::Arm64)?;
/// assert_eq!(layout.flavor(), 6);
/// assert_eq!(layout.word_count(), 68);
/// assert_eq!(layout.size(), 272);
/// # Ok::<(), regctx_core::RegctxError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LayoutRegistry
{
    flags: ConflictFlags,
    layouts: Vec<RegisterLayout>,
}

impl LayoutRegistry
{
    /// Process-wide registry built from the host's declarations
    ///
    /// Built on first call; later calls return the same registry. A failed
    /// build is not cached, so the error is reported again to every caller.
    ///
    /// ## Errors
    ///
    /// - `MalformedLayout`: a host declaration disagrees with the kernel protocol
    pub fn global() -> RegctxResult<Arc<LayoutRegistry>>
    {
        GLOBAL
            .get_or_try_init(|| -> RegctxResult<Arc<LayoutRegistry>> {
                let registry = Self::build(ConflictFlags::host().clone(), &HostDeclarations, &Architecture::ALL)?;
                info!(platform = registry.flags.platform(), "layout registry initialised");
                Ok(Arc::new(registry))
            })
            .cloned()
    }

    /// Build a registry for every architecture from `platform`'s declarations
    ///
    /// ## Errors
    ///
    /// - `MalformedLayout`: a declaration disagrees with the kernel protocol
    pub fn from_platform(platform: &dyn PlatformDeclarations) -> RegctxResult<Self>
    {
        Self::with_architectures(platform, &Architecture::ALL)
    }

    /// Build a registry holding only `architectures`
    ///
    /// ## Errors
    ///
    /// - `MalformedLayout`: a declaration disagrees with the kernel protocol
    pub fn with_architectures(platform: &dyn PlatformDeclarations, architectures: &[Architecture]) -> RegctxResult<Self>
    {
        Self::build(ConflictFlags::negotiate(platform), platform, architectures)
    }

    fn build(
        flags: ConflictFlags,
        platform: &dyn PlatformDeclarations,
        architectures: &[Architecture],
    ) -> RegctxResult<Self>
    {
        let mut layouts: Vec<RegisterLayout> = Vec::with_capacity(architectures.len());
        for &arch in architectures {
            if layouts.iter().any(|layout| layout.architecture() == arch) {
                continue;
            }
            layouts.push(build_layout(arch, &flags, platform)?);
        }
        layouts.sort_by_key(RegisterLayout::architecture);

        Ok(Self { flags, layouts })
    }

    /// The layout for `architecture`
    ///
    /// ## Errors
    ///
    /// - `UnsupportedArchitecture`: the registry holds no layout for `architecture`
    pub fn layout_for(&self, architecture: Architecture) -> RegctxResult<&RegisterLayout>
    {
        self.layouts
            .iter()
            .find(|layout| layout.architecture() == architecture)
            .ok_or_else(|| RegctxError::UnsupportedArchitecture(format!("no register layout registered for {architecture}")))
    }

    /// The layout servicing `flavor`, if any.
    #[must_use]
    pub fn layout_for_flavor(&self, flavor: c_int) -> Option<&RegisterLayout>
    {
        self.layouts.iter().find(|layout| layout.flavor() == flavor)
    }

    /// Conflict flags the registry was built with.
    #[must_use]
    pub fn flags(&self) -> &ConflictFlags
    {
        &self.flags
    }

    /// Architectures with a layout, in [`Architecture::ALL`] order.
    pub fn architectures(&self) -> impl Iterator<Item = Architecture> + '_
    {
        self.layouts.iter().map(RegisterLayout::architecture)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisterLayout>
    {
        self.layouts.iter()
    }
}

fn build_layout(
    arch: Architecture,
    flags: &ConflictFlags,
    platform: &dyn PlatformDeclarations,
) -> RegctxResult<RegisterLayout>
{
    let (structure, structure_source) = if flags.is_declared(Symbol::ThreadStateType(arch)) {
        let declared = platform.declared_struct(arch).ok_or_else(|| {
            RegctxError::malformed(arch, format!("{} negotiated as declared but not provided", Symbol::ThreadStateType(arch)))
        })?;
        (declared, Provenance::Platform)
    } else {
        (synthesized_struct(arch), Provenance::Synthesized)
    };

    let (flavor, flavor_source) = match declared_constant(arch, Symbol::FlavorConstant(arch), flags, platform)? {
        Some(value) => (value, Provenance::Platform),
        None => (arch.thread_state_flavor(), Provenance::Synthesized),
    };

    let (word_count, count_source) = match declared_constant(arch, Symbol::CountConstant(arch), flags, platform)? {
        Some(value) => (value, Provenance::Platform),
        None => {
            let words = u32::try_from(structure.size / STATE_WORD_SIZE)
                .map_err(|_| RegctxError::malformed(arch, format!("{} bytes is too large", structure.size)))?;
            (words, Provenance::Synthesized)
        }
    };

    debug!(
        architecture = %arch,
        type_name = structure.type_name,
        structure = %structure_source,
        flavor,
        flavor_source = %flavor_source,
        word_count,
        count_source = %count_source,
        "building register layout"
    );

    RegisterLayout::new(
        arch,
        structure,
        flavor,
        word_count,
        LayoutProvenance {
            structure: structure_source,
            flavor: flavor_source,
            word_count: count_source,
        },
    )
}

/// The platform's value for a guarded constant, converted to the type the
/// kernel call takes. `None` when the local definition is active.
fn declared_constant<T: TryFrom<i64>>(
    arch: Architecture,
    symbol: Symbol,
    flags: &ConflictFlags,
    platform: &dyn PlatformDeclarations,
) -> RegctxResult<Option<T>>
{
    if !flags.is_declared(symbol) {
        return Ok(None);
    }

    let value = platform
        .declared_constant(symbol)
        .ok_or_else(|| RegctxError::malformed(arch, format!("{symbol} negotiated as declared but not provided")))?;

    T::try_from(value)
        .map(Some)
        .map_err(|_| RegctxError::malformed(arch, format!("{symbol} = {value} is out of range")))
}

fn synthesized_struct(arch: Architecture) -> DeclaredStruct
{
    match arch {
        Architecture::X86_64 => x86_64::synthesized(),
        Architecture::Arm64 => arm64::synthesized(),
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::guard::DeclarationTable;

    #[test]
    fn test_duplicate_architectures_collapse()
    {
        let registry = LayoutRegistry::with_architectures(
            &DeclarationTable::new("bare"),
            &[Architecture::Arm64, Architecture::X86_64, Architecture::Arm64],
        )
        .unwrap();

        assert_eq!(registry.architectures().collect::<Vec<_>>(), Architecture::ALL);
    }

    #[test]
    fn test_layout_for_flavor()
    {
        let registry = LayoutRegistry::from_platform(&DeclarationTable::new("bare")).unwrap();
        assert_eq!(registry.layout_for_flavor(4).map(RegisterLayout::architecture), Some(Architecture::X86_64));
        assert_eq!(registry.layout_for_flavor(6).map(RegisterLayout::architecture), Some(Architecture::Arm64));
        assert!(registry.layout_for_flavor(1).is_none());
    }

    #[test]
    fn test_negative_count_is_malformed()
    {
        let table = DeclarationTable::new("broken").with_constant(Symbol::CountConstant(Architecture::Arm64), -68);
        let err = LayoutRegistry::from_platform(&table).unwrap_err();
        assert!(matches!(err, RegctxError::MalformedLayout { architecture: Architecture::Arm64, .. }));
    }
}
