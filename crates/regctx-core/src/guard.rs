//! # Conflict Guard
//!
//! One-time negotiation between the definitions this crate carries and the
//! ones the host platform already declares.
//!
//! For each thread-state [`Symbol`] the guard records whether the platform
//! declares it. The [`LayoutRegistry`](crate::layout::LayoutRegistry) consumes
//! the resulting [`ConflictFlags`]:
//!
//! - Declared: the local definition is suppressed and the platform's is used
//! - Not declared: the local definition is the active one
//!
//! Exactly one definition is active per symbol. Flags for the host are
//! computed on first use and never change afterwards.
//!
//! ## Example
//!
//! ```rust
//! use regctx_core::guard::{ConflictFlags, DeclarationTable, Symbol};
//! use regctx_core::types::Architecture;
//!
//! let platform = DeclarationTable::new("intel sdk").with_constant(Symbol::FlavorConstant(Architecture::X86_64), 4);
//! let flags = ConflictFlags::negotiate(&platform);
//!
//! assert!(flags.is_declared(Symbol::FlavorConstant(Architecture::X86_64)));
//! assert!(!flags.is_declared(Symbol::ThreadStateType(Architecture::Arm64)));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::layout::DeclaredStruct;
use crate::platform::HostDeclarations;
use crate::types::Architecture;

/// A type or constant that both this crate and the platform may define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol
{
    /// The general-register thread-state struct
    ThreadStateType(Architecture),
    /// The general-register thread-state flavor constant
    FlavorConstant(Architecture),
    /// The general-register thread-state word-count constant
    CountConstant(Architecture),
}

impl Symbol
{
    /// Every guarded symbol.
    pub const ALL: [Symbol; 6] = [
        Symbol::ThreadStateType(Architecture::X86_64),
        Symbol::FlavorConstant(Architecture::X86_64),
        Symbol::CountConstant(Architecture::X86_64),
        Symbol::ThreadStateType(Architecture::Arm64),
        Symbol::FlavorConstant(Architecture::Arm64),
        Symbol::CountConstant(Architecture::Arm64),
    ];

    /// Name of the symbol in the platform's C headers.
    #[must_use]
    pub const fn c_name(self) -> &'static str
    {
        match self {
            Symbol::ThreadStateType(Architecture::X86_64) => "x86_thread_state64_t",
            Symbol::FlavorConstant(Architecture::X86_64) => "x86_THREAD_STATE64",
            Symbol::CountConstant(Architecture::X86_64) => "x86_THREAD_STATE64_COUNT",
            Symbol::ThreadStateType(Architecture::Arm64) => "arm_thread_state64_t",
            Symbol::FlavorConstant(Architecture::Arm64) => "ARM_THREAD_STATE64",
            Symbol::CountConstant(Architecture::Arm64) => "ARM_THREAD_STATE64_COUNT",
        }
    }

    #[must_use]
    pub const fn architecture(self) -> Architecture
    {
        match self {
            Symbol::ThreadStateType(arch) | Symbol::FlavorConstant(arch) | Symbol::CountConstant(arch) => arch,
        }
    }

    /// The three symbols describing one architecture's thread state.
    #[must_use]
    pub const fn for_architecture(architecture: Architecture) -> [Symbol; 3]
    {
        [
            Symbol::ThreadStateType(architecture),
            Symbol::FlavorConstant(architecture),
            Symbol::CountConstant(architecture),
        ]
    }
}

impl fmt::Display for Symbol
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.c_name())
    }
}

/// What a platform declares about thread state
///
/// Implemented by [`HostDeclarations`] for the real build target and by
/// [`DeclarationTable`] for any simulated platform.
pub trait PlatformDeclarations
{
    /// Short human-readable description of the platform.
    fn describe(&self) -> String;

    /// The platform's thread-state struct shape for `architecture`, if it declares one.
    fn declared_struct(&self, architecture: Architecture) -> Option<DeclaredStruct>;

    /// The value of a flavor or count constant, if the platform declares it
    ///
    /// Asked only for [`Symbol::FlavorConstant`] and [`Symbol::CountConstant`].
    fn declared_constant(&self, symbol: Symbol) -> Option<i64>;

    /// Whether the platform declares `symbol` at all.
    fn declares(&self, symbol: Symbol) -> bool
    {
        match symbol {
            Symbol::ThreadStateType(arch) => self.declared_struct(arch).is_some(),
            Symbol::FlavorConstant(_) | Symbol::CountConstant(_) => self.declared_constant(symbol).is_some(),
        }
    }
}

/// A platform described by an explicit table of declarations
///
/// Starts out declaring nothing; every `with_*` call adds one declaration.
#[derive(Debug, Clone, Default)]
pub struct DeclarationTable
{
    name: String,
    structs: BTreeMap<Architecture, DeclaredStruct>,
    constants: BTreeMap<Symbol, i64>,
}

impl DeclarationTable
{
    pub fn new(name: impl Into<String>) -> Self
    {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declare the thread-state struct for `architecture`.
    #[must_use]
    pub fn with_struct(mut self, architecture: Architecture, structure: DeclaredStruct) -> Self
    {
        self.structs.insert(architecture, structure);
        self
    }

    /// Declare a flavor or count constant.
    #[must_use]
    pub fn with_constant(mut self, symbol: Symbol, value: i64) -> Self
    {
        self.constants.insert(symbol, value);
        self
    }
}

impl PlatformDeclarations for DeclarationTable
{
    fn describe(&self) -> String
    {
        self.name.clone()
    }

    fn declared_struct(&self, architecture: Architecture) -> Option<DeclaredStruct>
    {
        self.structs.get(&architecture).cloned()
    }

    fn declared_constant(&self, symbol: Symbol) -> Option<i64>
    {
        match symbol {
            Symbol::ThreadStateType(_) => None,
            _ => self.constants.get(&symbol).copied(),
        }
    }
}

/// Outcome of the negotiation: which symbols the platform already declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictFlags
{
    platform: String,
    declared: BTreeSet<Symbol>,
}

static HOST_FLAGS: Lazy<ConflictFlags> = Lazy::new(|| ConflictFlags::negotiate(&HostDeclarations));

impl ConflictFlags
{
    /// Ask `platform` about every guarded symbol.
    pub fn negotiate(platform: &dyn PlatformDeclarations) -> Self
    {
        let platform_name = platform.describe();
        let declared: BTreeSet<Symbol> = Symbol::ALL
            .into_iter()
            .filter(|symbol| {
                let declared = platform.declares(*symbol);
                debug!(
                    platform = %platform_name,
                    symbol = symbol.c_name(),
                    declared,
                    "negotiated thread-state symbol"
                );
                declared
            })
            .collect();

        Self {
            platform: platform_name,
            declared,
        }
    }

    /// Flags for the build target, negotiated once per process.
    #[must_use]
    pub fn host() -> &'static ConflictFlags
    {
        &HOST_FLAGS
    }

    /// Description of the platform the flags were negotiated against.
    #[must_use]
    pub fn platform(&self) -> &str
    {
        &self.platform
    }

    /// True when the platform declares `symbol`, suppressing the local definition.
    #[must_use]
    pub fn is_declared(&self, symbol: Symbol) -> bool
    {
        self.declared.contains(&symbol)
    }

    /// True when the local definition of `symbol` is the active one.
    #[must_use]
    pub fn is_synthesized(&self, symbol: Symbol) -> bool
    {
        !self.is_declared(symbol)
    }

    /// Every guarded symbol with its flag, in [`Symbol::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, bool)> + '_
    {
        Symbol::ALL.into_iter().map(|symbol| (symbol, self.is_declared(symbol)))
    }
}

impl fmt::Display for ConflictFlags
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        writeln!(f, "platform: {}", self.platform)?;
        for (symbol, declared) in self.iter() {
            let source = if declared { "platform" } else { "synthesized" };
            writeln!(f, "{:<26} {source}", symbol.c_name())?;
        }
        Ok(())
    }
}
