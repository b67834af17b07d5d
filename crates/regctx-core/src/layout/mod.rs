//! # Register Layouts
//!
//! Binary shape of the general-register thread-state blob for each
//! architecture, and the translation between that blob and a
//! [`RegisterSnapshot`].
//!
//! ## Blob Format
//!
//! The kernel moves thread state as an array of `natural_t` (`u32`) words.
//! Each 64-bit register occupies two words in little-endian order:
//!
//! - Low 32 bits at word `offset / 4`
//! - High 32 bits at word `offset / 4 + 1`
//!
//! 32-bit registers (arm64 `cpsr` and `pad`) occupy a single word.
//!
//! ## Sources
//!
//! A layout's struct shape comes either from the platform's own declaration or
//! from the `#[repr(C)]` definitions in [`x86_64`] and [`arm64`]. Which one is
//! active is decided once by the [conflict guard](crate::guard).

pub mod arm64;
pub mod registry;
pub mod x86_64;

use std::fmt;

use libc::c_int;
use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::constants::{MAX_THREAD_STATE_COUNT, STATE_WORD_SIZE, U32_MASK};
use crate::error::{RegctxError, RegctxResult};
use crate::types::{Architecture, RegisterSnapshot};

pub use registry::LayoutRegistry;

/// Raw thread-state words, sized for the largest supported blob.
pub type StateWords = SmallVec<[u32; MAX_THREAD_STATE_COUNT]>;

/// One register's position inside a thread-state blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterField
{
    /// Canonical register name
    pub name: &'static str,
    /// Byte offset from the start of the blob
    pub offset: usize,
    /// Width in bytes
    pub width: usize,
}

impl RegisterField
{
    #[must_use]
    pub const fn new(name: &'static str, offset: usize, width: usize) -> Self
    {
        Self { name, offset, width }
    }

    /// Offset one past the last byte of the field.
    #[must_use]
    pub const fn end(&self) -> usize
    {
        self.offset + self.width
    }
}

/// A struct shape as declared by some source (the platform or this crate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredStruct
{
    /// Name of the type in its source
    pub type_name: &'static str,
    /// `size_of` the type
    pub size: usize,
    /// Fields in declaration order
    pub fields: Vec<RegisterField>,
}

/// Where one part of a layout came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance
{
    /// Declared by the host platform
    Platform,
    /// Defined locally because the platform does not declare it
    Synthesized,
}

impl fmt::Display for Provenance
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Provenance::Platform => f.write_str("platform"),
            Provenance::Synthesized => f.write_str("synthesized"),
        }
    }
}

/// Provenance of each independently declared part of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutProvenance
{
    /// The struct shape
    pub structure: Provenance,
    /// The flavor constant
    pub flavor: Provenance,
    /// The word-count constant
    pub word_count: Provenance,
}

impl LayoutProvenance
{
    /// Everything defined locally.
    pub const SYNTHESIZED: LayoutProvenance = LayoutProvenance {
        structure: Provenance::Synthesized,
        flavor: Provenance::Synthesized,
        word_count: Provenance::Synthesized,
    };
}

/// Validated general-register layout for one architecture
///
/// Construction checks every invariant the kernel relies on; a value of this
/// type always satisfies:
///
/// - `word_count * 4 == size`, and both match the protocol constants
/// - fields follow the canonical register set in order, naturally aligned,
///   non-overlapping
/// - the last field ends exactly at `size`
/// - `flavor` is the protocol flavor for the architecture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterLayout
{
    architecture: Architecture,
    type_name: &'static str,
    size: usize,
    flavor: c_int,
    word_count: u32,
    fields: Vec<RegisterField>,
    provenance: LayoutProvenance,
}

impl RegisterLayout
{
    /// Validate a struct shape and its constants into a layout
    ///
    /// ## Errors
    ///
    /// - `MalformedLayout`: any invariant listed on [`RegisterLayout`] is violated
    pub fn new(
        architecture: Architecture,
        structure: DeclaredStruct,
        flavor: c_int,
        word_count: u32,
        provenance: LayoutProvenance,
    ) -> RegctxResult<Self>
    {
        let DeclaredStruct { type_name, size, fields } = structure;

        if size % STATE_WORD_SIZE != 0 {
            return Err(RegctxError::malformed(
                architecture,
                format!("{type_name} is {size} bytes, not a multiple of {STATE_WORD_SIZE}"),
            ));
        }
        if word_count as usize * STATE_WORD_SIZE != size {
            return Err(RegctxError::malformed(
                architecture,
                format!("word count {word_count} does not cover {size} bytes"),
            ));
        }
        if word_count != architecture.thread_state_word_count() {
            return Err(RegctxError::malformed(
                architecture,
                format!(
                    "word count {word_count} differs from protocol count {}",
                    architecture.thread_state_word_count()
                ),
            ));
        }
        if flavor != architecture.thread_state_flavor() {
            return Err(RegctxError::malformed(
                architecture,
                format!(
                    "flavor {flavor} differs from protocol flavor {}",
                    architecture.thread_state_flavor()
                ),
            ));
        }

        let canonical = architecture.registers();
        if fields.len() != canonical.len() {
            return Err(RegctxError::malformed(
                architecture,
                format!("{} fields, expected {}", fields.len(), canonical.len()),
            ));
        }

        let mut cursor = 0;
        for (field, def) in fields.iter().zip(canonical) {
            if field.name != def.name || field.width != def.width {
                return Err(RegctxError::malformed(
                    architecture,
                    format!(
                        "field {}:{} where {}:{} was expected",
                        field.name, field.width, def.name, def.width
                    ),
                ));
            }
            if field.offset % field.width != 0 {
                return Err(RegctxError::malformed(
                    architecture,
                    format!("{} at offset {} is misaligned", field.name, field.offset),
                ));
            }
            if field.offset < cursor {
                return Err(RegctxError::malformed(
                    architecture,
                    format!("{} at offset {} overlaps the previous field", field.name, field.offset),
                ));
            }
            cursor = field.end();
        }

        if cursor != size {
            return Err(RegctxError::malformed(
                architecture,
                format!("last field ends at {cursor}, {type_name} is {size} bytes"),
            ));
        }

        Ok(Self {
            architecture,
            type_name,
            size,
            flavor,
            word_count,
            fields,
            provenance,
        })
    }

    #[must_use]
    pub const fn architecture(&self) -> Architecture
    {
        self.architecture
    }

    /// Name of the type the struct shape was taken from.
    #[must_use]
    pub const fn type_name(&self) -> &'static str
    {
        self.type_name
    }

    /// Blob size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize
    {
        self.size
    }

    /// Thread-state flavor passed to the kernel.
    #[must_use]
    pub const fn flavor(&self) -> c_int
    {
        self.flavor
    }

    /// Blob size in 32-bit words, passed to the kernel.
    #[must_use]
    pub const fn word_count(&self) -> u32
    {
        self.word_count
    }

    /// Fields in blob order.
    #[must_use]
    pub fn fields(&self) -> &[RegisterField]
    {
        &self.fields
    }

    #[must_use]
    pub const fn provenance(&self) -> LayoutProvenance
    {
        self.provenance
    }

    /// Look up a field by canonical name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&RegisterField>
    {
        self.fields.iter().find(|field| field.name == name)
    }

    /// A zero-filled blob of `word_count` words.
    #[must_use]
    pub fn empty_state(&self) -> StateWords
    {
        smallvec![0; self.word_count as usize]
    }

    /// Translate a raw blob into a complete snapshot
    ///
    /// ## Errors
    ///
    /// - `MalformedLayout`: `words` is not exactly `word_count` long
    pub fn decode(&self, words: &[u32]) -> RegctxResult<RegisterSnapshot>
    {
        self.check_blob_len(words.len())?;

        let mut snapshot = RegisterSnapshot::new(self.architecture);
        for (idx, field) in self.fields.iter().enumerate() {
            let word = field.offset / STATE_WORD_SIZE;
            let value = if field.width == 8 {
                u64::from(words[word]) | (u64::from(words[word + 1]) << 32)
            } else {
                u64::from(words[word])
            };
            trace!(register = field.name, value, "decoded register");
            snapshot.set_at(idx, value)?;
        }

        Ok(snapshot)
    }

    /// Translate a complete snapshot into a raw blob
    ///
    /// ## Errors
    ///
    /// - `UnsupportedArchitecture`: the snapshot belongs to another architecture
    /// - `IncompleteSnapshot`: any layout field is missing from the snapshot
    pub fn encode(&self, snapshot: &RegisterSnapshot) -> RegctxResult<StateWords>
    {
        if snapshot.architecture() != self.architecture {
            return Err(RegctxError::UnsupportedArchitecture(format!(
                "{} snapshot cannot be encoded with the {} layout",
                snapshot.architecture(),
                self.architecture
            )));
        }

        let missing = snapshot.missing();
        if !missing.is_empty() {
            return Err(RegctxError::IncompleteSnapshot {
                architecture: self.architecture,
                missing,
            });
        }

        let mut words = self.empty_state();
        for (idx, field) in self.fields.iter().enumerate() {
            let value = snapshot.value_at(idx).unwrap_or_default();
            let word = field.offset / STATE_WORD_SIZE;
            words[word] = (value & U32_MASK) as u32;
            if field.width == 8 {
                words[word + 1] = (value >> 32) as u32;
            }
        }

        Ok(words)
    }

    fn check_blob_len(&self, len: usize) -> RegctxResult<()>
    {
        if len == self.word_count as usize {
            Ok(())
        } else {
            Err(RegctxError::malformed(
                self.architecture,
                format!("state blob of {len} words, layout expects {}", self.word_count),
            ))
        }
    }
}
