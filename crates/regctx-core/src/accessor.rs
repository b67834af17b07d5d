//! # Thread Context Accessor
//!
//! Reads and writes a thread's general-purpose registers as a
//! [`RegisterSnapshot`], for either architecture.
//!
//! ## How It Works
//!
//! 1. The snapshot architecture selects a [`RegisterLayout`] from the registry
//! 2. The layout supplies the flavor and word count for the kernel call
//! 3. A [`ThreadStateBackend`] performs `thread_get_state()` / `thread_set_state()`
//! 4. The layout translates between the raw blob and the snapshot
//!
//! ## Preconditions
//!
//! The target thread should be suspended by the caller. State read from a
//! runnable thread is a best-effort snapshot, and concurrent writers on the
//! same thread follow last-writer-wins.
//!
//! ## Translated Threads
//!
//! A thread may run the architecture opposite to the host (an x86-64 binary
//! under translation on an arm64 host). [`ThreadContext::probe_architecture`]
//! asks the kernel which flavor it services, and the [`MismatchPolicy`] decides
//! whether requests for the other architecture are refused up front.

use std::sync::Arc;

use libc::c_int;
use tracing::{debug, warn};

use crate::config::{AccessorConfig, MismatchPolicy};
use crate::error::{RegctxError, RegctxResult};
use crate::kern::{KernClass, KernReturn};
use crate::layout::{LayoutRegistry, RegisterLayout};
use crate::types::{Architecture, RegisterSnapshot, ThreadHandle};

/// The kernel's thread-state interface
///
/// Mirrors `thread_get_state()` and `thread_set_state()`: state moves as
/// `natural_t` (`u32`) words tagged with a flavor.
pub trait ThreadStateBackend
{
    /// Read the state of `flavor` into `state`
    ///
    /// On entry `count` is the capacity of `state` in words; on success it is
    /// the number of words the kernel filled.
    ///
    /// ## Errors
    ///
    /// The raw kernel return code of a failed call.
    fn get_state(&self, thread: ThreadHandle, flavor: c_int, state: &mut [u32], count: &mut u32) -> Result<(), KernReturn>;

    /// Replace the state of `flavor` with `state`
    ///
    /// ## Errors
    ///
    /// The raw kernel return code of a failed call.
    fn set_state(&self, thread: ThreadHandle, flavor: c_int, state: &[u32]) -> Result<(), KernReturn>;
}

impl<B: ThreadStateBackend + ?Sized> ThreadStateBackend for &B
{
    fn get_state(&self, thread: ThreadHandle, flavor: c_int, state: &mut [u32], count: &mut u32) -> Result<(), KernReturn>
    {
        (**self).get_state(thread, flavor, state, count)
    }

    fn set_state(&self, thread: ThreadHandle, flavor: c_int, state: &[u32]) -> Result<(), KernReturn>
    {
        (**self).set_state(thread, flavor, state)
    }
}

impl<B: ThreadStateBackend + ?Sized> ThreadStateBackend for Arc<B>
{
    fn get_state(&self, thread: ThreadHandle, flavor: c_int, state: &mut [u32], count: &mut u32) -> Result<(), KernReturn>
    {
        (**self).get_state(thread, flavor, state, count)
    }

    fn set_state(&self, thread: ThreadHandle, flavor: c_int, state: &[u32]) -> Result<(), KernReturn>
    {
        (**self).set_state(thread, flavor, state)
    }
}

/// Uniform register access for threads of either architecture
///
/// ## Example
///
/// ```rust
/// use regctx_core::platform::SimulatedKernel;
/// use regctx_core::types::Architecture;
/// use regctx_core::ThreadContext;
///
/// let kernel = SimulatedKernel::new();
/// let thread = kernel.spawn(Architecture::Arm64);
/// let context = ThreadContext::new(&kernel)?;
///
/// let mut regs = context.read(thread, Architecture::Arm64)?;
/// regs.set("x0", 42)?;
/// context.write(thread, &regs)?;
///
/// assert_eq!(context.read(thread, Architecture::Arm64)?.get("x0"), Some(42));
/// # Ok::<(), regctx_core::RegctxError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ThreadContext<B>
{
    backend: B,
    registry: Arc<LayoutRegistry>,
    config: AccessorConfig,
}

impl<B: ThreadStateBackend> ThreadContext<B>
{
    /// Accessor over the process-wide registry with the default configuration
    ///
    /// ## Errors
    ///
    /// - `MalformedLayout`: the global registry failed to build
    pub fn new(backend: B) -> RegctxResult<Self>
    {
        Ok(Self::with_registry(backend, LayoutRegistry::global()?, AccessorConfig::default()))
    }

    pub fn with_registry(backend: B, registry: Arc<LayoutRegistry>, config: AccessorConfig) -> Self
    {
        Self {
            backend,
            registry,
            config,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: AccessorConfig) -> Self
    {
        self.config = config;
        self
    }

    pub fn backend(&self) -> &B
    {
        &self.backend
    }

    pub fn registry(&self) -> &LayoutRegistry
    {
        &self.registry
    }

    pub fn config(&self) -> &AccessorConfig
    {
        &self.config
    }

    /// Read the general-purpose registers of `thread` as `architecture`
    ///
    /// The snapshot holds every layout field, with raw register bits
    /// zero-extended to 64 bits.
    ///
    /// ## Errors
    ///
    /// - `UnsupportedArchitecture`: the registry has no layout for `architecture`
    /// - `InvalidThreadHandle`: the thread is unknown or has terminated
    /// - `PermissionDenied`: the caller lacks rights on the thread
    /// - `ArchitectureMismatch`: the thread cannot be read as `architecture`
    /// - `TruncatedState`: the kernel returned fewer words than the layout holds
    /// - `StateCallFailed`: any other kernel failure
    pub fn read(&self, thread: ThreadHandle, architecture: Architecture) -> RegctxResult<RegisterSnapshot>
    {
        let layout = self.registry.layout_for(architecture)?;
        self.enforce_policy(thread, architecture)?;

        let snapshot = self.fetch(thread, layout)?;
        debug!(thread = %thread, architecture = %architecture, "read thread state");
        Ok(snapshot)
    }

    /// Replace the general-purpose registers of `thread` with `snapshot`
    ///
    /// The snapshot's architecture selects the layout. Every register of the
    /// layout must be present; nothing is sent to the kernel otherwise.
    ///
    /// ## Errors
    ///
    /// - `UnsupportedArchitecture`: the registry has no layout for the snapshot
    /// - `IncompleteSnapshot`: a register is missing, the thread is untouched
    /// - `InvalidThreadHandle`: the thread is unknown or has terminated
    /// - `PermissionDenied`: the caller lacks rights on the thread
    /// - `ArchitectureMismatch`: the thread cannot be written as this architecture
    /// - `StateCallFailed`: any other kernel failure
    pub fn write(&self, thread: ThreadHandle, snapshot: &RegisterSnapshot) -> RegctxResult<()>
    {
        let architecture = snapshot.architecture();
        let layout = self.registry.layout_for(architecture)?;
        let words = layout.encode(snapshot)?;
        self.enforce_policy(thread, architecture)?;

        self.backend
            .set_state(thread, layout.flavor(), &words)
            .map_err(|code| state_call_error(code, "thread_set_state", thread, architecture))?;

        debug!(thread = %thread, architecture = %architecture, "wrote thread state");
        Ok(())
    }

    /// Read, let `edit` change the snapshot, and write it back
    ///
    /// Nothing is written when `edit` fails.
    ///
    /// ## Errors
    ///
    /// Any error of [`read`](Self::read), [`write`](Self::write) or `edit`.
    pub fn modify<F>(&self, thread: ThreadHandle, architecture: Architecture, edit: F) -> RegctxResult<RegisterSnapshot>
    where
        F: FnOnce(&mut RegisterSnapshot) -> RegctxResult<()>,
    {
        let mut snapshot = self.read(thread, architecture)?;
        edit(&mut snapshot)?;
        self.write(thread, &snapshot)?;
        Ok(snapshot)
    }

    /// Determine which general-register flavor the kernel services for `thread`
    ///
    /// The host architecture is tried first, then the other one. On a host
    /// that is neither, both are tried in [`Architecture::ALL`] order.
    ///
    /// ## Errors
    ///
    /// - `InvalidThreadHandle` / `PermissionDenied`: as for [`read`](Self::read)
    /// - `ArchitectureMismatch`: the kernel refuses every registered flavor
    pub fn probe_architecture(&self, thread: ThreadHandle) -> RegctxResult<Architecture>
    {
        let order = Architecture::probe_order(Architecture::host().ok());

        for candidate in order {
            let Ok(layout) = self.registry.layout_for(candidate) else {
                continue;
            };

            let mut words = layout.empty_state();
            let mut count = layout.word_count();
            match self.backend.get_state(thread, layout.flavor(), &mut words, &mut count) {
                Ok(()) => {
                    debug!(thread = %thread, architecture = %candidate, "probed thread architecture");
                    return Ok(candidate);
                }
                Err(code) if code.class() == KernClass::FlavorRejected => {
                    debug!(thread = %thread, architecture = %candidate, %code, "flavor not serviced");
                }
                Err(code) => return Err(state_call_error(code, "thread_get_state", thread, candidate)),
            }
        }

        Err(RegctxError::ArchitectureMismatch {
            thread,
            requested: order[0],
            serviced: None,
        })
    }

    fn enforce_policy(&self, thread: ThreadHandle, requested: Architecture) -> RegctxResult<()>
    {
        if self.config.mismatch_policy == MismatchPolicy::BestEffort {
            return Ok(());
        }

        let serviced = match self.probe_architecture(thread) {
            Ok(serviced) => serviced,
            Err(RegctxError::ArchitectureMismatch { .. }) => {
                return Err(RegctxError::ArchitectureMismatch {
                    thread,
                    requested,
                    serviced: None,
                });
            }
            Err(err) => return Err(err),
        };

        if serviced == requested {
            Ok(())
        } else {
            warn!(thread = %thread, %requested, %serviced, "refusing cross-architecture access");
            Err(RegctxError::ArchitectureMismatch {
                thread,
                requested,
                serviced: Some(serviced),
            })
        }
    }

    fn fetch(&self, thread: ThreadHandle, layout: &RegisterLayout) -> RegctxResult<RegisterSnapshot>
    {
        let mut words = layout.empty_state();
        let mut count = layout.word_count();

        self.backend
            .get_state(thread, layout.flavor(), &mut words, &mut count)
            .map_err(|code| state_call_error(code, "thread_get_state", thread, layout.architecture()))?;

        if count != layout.word_count() {
            return Err(RegctxError::TruncatedState {
                thread,
                expected: layout.word_count(),
                actual: count,
            });
        }

        layout.decode(&words)
    }
}

/// Map a failed kernel call onto the error taxonomy.
fn state_call_error(code: KernReturn, operation: &'static str, thread: ThreadHandle, requested: Architecture) -> RegctxError
{
    match code.class() {
        KernClass::InvalidThread => RegctxError::InvalidThreadHandle { thread, code },
        KernClass::PermissionDenied => RegctxError::PermissionDenied { thread, code },
        KernClass::FlavorRejected => {
            warn!(thread = %thread, %requested, %code, "kernel refused thread-state flavor");
            RegctxError::ArchitectureMismatch {
                thread,
                requested,
                serviced: None,
            }
        }
        KernClass::Success | KernClass::Other => RegctxError::StateCallFailed {
            operation,
            thread,
            code,
        },
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::kern::{KERN_FAILURE, KERN_INVALID_ARGUMENT, KERN_NO_ACCESS, KERN_TERMINATED};

    #[test]
    fn test_state_call_error_mapping()
    {
        let thread = ThreadHandle(7);
        let arch = Architecture::X86_64;

        assert!(matches!(
            state_call_error(KernReturn(KERN_TERMINATED), "op", thread, arch),
            RegctxError::InvalidThreadHandle { .. }
        ));
        assert!(matches!(
            state_call_error(KernReturn(KERN_NO_ACCESS), "op", thread, arch),
            RegctxError::PermissionDenied { .. }
        ));
        assert_eq!(
            state_call_error(KernReturn(KERN_INVALID_ARGUMENT), "op", thread, arch),
            RegctxError::ArchitectureMismatch {
                thread,
                requested: arch,
                serviced: None
            }
        );
        assert_eq!(
            state_call_error(KernReturn(KERN_FAILURE), "thread_set_state", thread, arch),
            RegctxError::StateCallFailed {
                operation: "thread_set_state",
                thread,
                code: KernReturn(KERN_FAILURE)
            }
        );
    }
}
