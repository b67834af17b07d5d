//! Canonical register snapshot.

use std::fmt;

use smallvec::{smallvec, SmallVec};

use super::registers::{register_index, ARM64_REGISTER_COUNT, X86_64_REGISTER_COUNT};
use super::Architecture;
use crate::constants;
use crate::error::{RegctxError, RegctxResult};

/// Inline capacity covering the largest canonical register set.
const INLINE_REGISTERS: usize = if ARM64_REGISTER_COUNT > X86_64_REGISTER_COUNT {
    ARM64_REGISTER_COUNT
} else {
    X86_64_REGISTER_COUNT
};

/// Architecture-tagged mapping from register name to value
///
/// A snapshot holds one optional value per canonical register of its
/// architecture. Values are raw register contents zero-extended to `u64`;
/// flag and sign bits are never reinterpreted.
///
/// A snapshot produced by [`ThreadContext::read`](crate::ThreadContext::read)
/// is complete. Snapshots built by hand may be partial, but
/// [`ThreadContext::write`](crate::ThreadContext::write) rejects them with
/// `IncompleteSnapshot`: the kernel replaces the whole register file at once.
///
/// ## Example
///
/// ```rust
/// use regctx_core::types::{Architecture, RegisterSnapshot};
///
/// let mut regs = RegisterSnapshot::new(Architecture::Arm64);
/// regs.set("x30", 0x1_0000_4000)?;
/// assert_eq!(regs.get("lr"), Some(0x1_0000_4000));
/// assert!(!regs.is_complete());
/// # Ok::<(), regctx_core::RegctxError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSnapshot
{
    architecture: Architecture,
    values: SmallVec<[Option<u64>; INLINE_REGISTERS]>,
}

impl RegisterSnapshot
{
    /// Create an empty snapshot for `architecture`.
    #[must_use]
    pub fn new(architecture: Architecture) -> Self
    {
        Self {
            architecture,
            values: smallvec![None; architecture.registers().len()],
        }
    }

    /// Create a snapshot with every register set to zero.
    #[must_use]
    pub fn zeroed(architecture: Architecture) -> Self
    {
        Self {
            architecture,
            values: smallvec![Some(0); architecture.registers().len()],
        }
    }

    /// Architecture whose layout this snapshot follows.
    #[must_use]
    pub const fn architecture(&self) -> Architecture
    {
        self.architecture
    }

    /// Value of a register by name or alias.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u64>
    {
        register_index(self.architecture, name).and_then(|idx| self.values[idx])
    }

    /// Set a register by name or alias, returning the previous value
    ///
    /// ## Errors
    ///
    /// - `UnknownRegister`: `name` is not part of this architecture's register set
    /// - `ValueOutOfRange`: `value` does not fit a 32-bit register (`cpsr`, `pad`)
    pub fn set(&mut self, name: &str, value: u64) -> RegctxResult<Option<u64>>
    {
        let idx = self.index_of(name)?;
        self.set_at(idx, value)
    }

    /// Remove a register value, returning it.
    pub fn remove(&mut self, name: &str) -> Option<u64>
    {
        register_index(self.architecture, name).and_then(|idx| self.values[idx].take())
    }

    /// Number of registers holding a value.
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.values.iter().filter(|value| value.is_some()).count()
    }

    /// True when no register holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.values.iter().all(Option::is_none)
    }

    /// True when every canonical register holds a value.
    #[must_use]
    pub fn is_complete(&self) -> bool
    {
        self.values.iter().all(Option::is_some)
    }

    /// Canonical names of registers without a value, in layout order.
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str>
    {
        self.architecture
            .registers()
            .iter()
            .zip(&self.values)
            .filter(|(_, value)| value.is_none())
            .map(|(def, _)| def.name)
            .collect()
    }

    /// Present registers as `(name, value)` pairs, in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u64)> + '_
    {
        self.architecture
            .registers()
            .iter()
            .zip(&self.values)
            .filter_map(|(def, value)| value.map(|value| (def.name, value)))
    }

    /// Value at a canonical index.
    pub(crate) fn value_at(&self, idx: usize) -> Option<u64>
    {
        self.values.get(idx).copied().flatten()
    }

    pub(crate) fn set_at(&mut self, idx: usize, value: u64) -> RegctxResult<Option<u64>>
    {
        let def = &self.architecture.registers()[idx];
        if def.width < 8 && value > constants::U32_MASK {
            return Err(RegctxError::ValueOutOfRange {
                register: def.name,
                width: def.width,
                value,
            });
        }

        Ok(self.values[idx].replace(value))
    }

    pub(crate) fn index_of(&self, name: &str) -> RegctxResult<usize>
    {
        register_index(self.architecture, name).ok_or_else(|| RegctxError::UnknownRegister {
            architecture: self.architecture,
            name: name.to_string(),
        })
    }
}

/// One `name=0x...` line per present register.
impl fmt::Display for RegisterSnapshot
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        for (name, value) in self.iter() {
            writeln!(f, "{name:>6}={value:#018x}")?;
        }
        Ok(())
    }
}
