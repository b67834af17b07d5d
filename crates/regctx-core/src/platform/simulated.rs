//! # Simulated Kernel
//!
//! In-memory [`ThreadStateBackend`] that behaves like the Mach thread-state
//! calls for a set of fake threads.
//!
//! Each simulated thread services one or more general-register flavors and
//! holds a blob per flavor. Failure modes are set per thread:
//!
//! - Unknown handle: `MACH_SEND_INVALID_DEST`
//! - [`ThreadAccess::Terminated`]: `KERN_TERMINATED`
//! - [`ThreadAccess::Denied`]: `KERN_PROTECTION_FAILURE`
//! - Flavor not serviced, or a buffer of the wrong size: `KERN_INVALID_ARGUMENT`
//!
//! All state sits behind one mutex, so calls on the same thread are serialised
//! the way the kernel serialises them.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use libc::c_int;
use tracing::trace;

use crate::accessor::ThreadStateBackend;
use crate::kern::{KernReturn, KERN_INVALID_ARGUMENT, KERN_PROTECTION_FAILURE, KERN_TERMINATED, MACH_SEND_INVALID_DEST};
use crate::types::{Architecture, ThreadHandle};

const FIRST_PORT: u32 = 0x1003;
const PORT_STRIDE: u32 = 0x100;

/// How a simulated thread answers state calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThreadAccess
{
    /// Calls succeed
    #[default]
    Open,
    /// Calls fail with `KERN_PROTECTION_FAILURE`
    Denied,
    /// Calls fail with `KERN_TERMINATED`
    Terminated,
}

#[derive(Debug, Default)]
struct SimulatedThread
{
    access: ThreadAccess,
    states: BTreeMap<c_int, Vec<u32>>,
    reply_words: Option<u32>,
}

#[derive(Debug)]
struct KernelState
{
    next_port: u32,
    threads: HashMap<ThreadHandle, SimulatedThread>,
    set_calls: usize,
}

impl Default for KernelState
{
    fn default() -> Self
    {
        Self {
            next_port: FIRST_PORT,
            threads: HashMap::new(),
            set_calls: 0,
        }
    }
}

impl KernelState
{
    /// Next unused port. The counter wraps and skips live threads.
    fn allocate_port(&mut self) -> ThreadHandle
    {
        loop {
            let thread = ThreadHandle(self.next_port);
            self.next_port = self.next_port.wrapping_add(PORT_STRIDE);
            if !self.threads.contains_key(&thread) {
                return thread;
            }
        }
    }
}

/// In-memory thread-state backend
///
/// ## Example
///
/// ```rust
/// use regctx_core::platform::{SimulatedKernel, ThreadAccess};
/// use regctx_core::types::Architecture;
///
/// let kernel = SimulatedKernel::new();
/// let thread = kernel.spawn(Architecture::X86_64);
/// assert_eq!(kernel.raw_state(thread, Architecture::X86_64).map(|words| words.len()), Some(42));
///
/// kernel.set_access(thread, ThreadAccess::Terminated);
/// ```
#[derive(Debug, Default)]
pub struct SimulatedKernel
{
    state: Mutex<KernelState>,
}

impl SimulatedKernel
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Create a thread servicing only `architecture`'s flavor, all registers zero.
    pub fn spawn(&self, architecture: Architecture) -> ThreadHandle
    {
        self.spawn_with_flavors(&[architecture])
    }

    /// Create a thread servicing every flavor in `architectures`
    ///
    /// A translated thread on a real system can answer both general-register
    /// flavors; this models it.
    pub fn spawn_with_flavors(&self, architectures: &[Architecture]) -> ThreadHandle
    {
        let mut state = self.lock();
        let thread = state.allocate_port();

        let states = architectures
            .iter()
            .map(|arch| (arch.thread_state_flavor(), vec![0; arch.thread_state_word_count() as usize]))
            .collect();
        state.threads.insert(
            thread,
            SimulatedThread {
                states,
                ..SimulatedThread::default()
            },
        );

        trace!(thread = %thread, ?architectures, "spawned simulated thread");
        thread
    }

    /// Change how `thread` answers. Returns false for an unknown thread.
    pub fn set_access(&self, thread: ThreadHandle, access: ThreadAccess) -> bool
    {
        self.with_thread(thread, |sim| sim.access = access)
    }

    /// Make reads of `thread` report `words` filled words instead of the full blob.
    pub fn truncate_replies(&self, thread: ThreadHandle, words: Option<u32>) -> bool
    {
        self.with_thread(thread, |sim| sim.reply_words = words)
    }

    /// Current blob of `thread` for `architecture`'s flavor.
    #[must_use]
    pub fn raw_state(&self, thread: ThreadHandle, architecture: Architecture) -> Option<Vec<u32>>
    {
        self.lock()
            .threads
            .get(&thread)
            .and_then(|sim| sim.states.get(&architecture.thread_state_flavor()))
            .cloned()
    }

    /// Overwrite the blob of `thread` for `architecture`'s flavor directly
    ///
    /// Returns false when the thread is unknown, does not service the flavor, or
    /// `words` is not exactly one blob long.
    pub fn load_raw_state(&self, thread: ThreadHandle, architecture: Architecture, words: &[u32]) -> bool
    {
        let mut state = self.lock();
        match state
            .threads
            .get_mut(&thread)
            .and_then(|sim| sim.states.get_mut(&architecture.thread_state_flavor()))
        {
            Some(blob) if blob.len() == words.len() => {
                blob.copy_from_slice(words);
                true
            }
            _ => false,
        }
    }

    /// Number of `set_state` calls received, failed ones included.
    #[must_use]
    pub fn set_state_calls(&self) -> usize
    {
        self.lock().set_calls
    }

    fn with_thread(&self, thread: ThreadHandle, update: impl FnOnce(&mut SimulatedThread)) -> bool
    {
        match self.lock().threads.get_mut(&thread) {
            Some(sim) => {
                update(sim);
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, KernelState>
    {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Find a thread the caller may use, or the return code the kernel would give.
fn open_thread(threads: &mut HashMap<ThreadHandle, SimulatedThread>, thread: ThreadHandle) -> Result<&mut SimulatedThread, KernReturn>
{
    let sim = threads.get_mut(&thread).ok_or(KernReturn(MACH_SEND_INVALID_DEST))?;
    match sim.access {
        ThreadAccess::Open => Ok(sim),
        ThreadAccess::Denied => Err(KernReturn(KERN_PROTECTION_FAILURE)),
        ThreadAccess::Terminated => Err(KernReturn(KERN_TERMINATED)),
    }
}

impl ThreadStateBackend for SimulatedKernel
{
    fn get_state(&self, thread: ThreadHandle, flavor: c_int, state: &mut [u32], count: &mut u32) -> Result<(), KernReturn>
    {
        let mut kernel = self.lock();
        let sim = open_thread(&mut kernel.threads, thread)?;
        let blob = sim.states.get(&flavor).ok_or(KernReturn(KERN_INVALID_ARGUMENT))?;

        let capacity = (*count as usize).min(state.len());
        if capacity < blob.len() {
            return Err(KernReturn(KERN_INVALID_ARGUMENT));
        }

        let filled = sim.reply_words.map_or(blob.len(), |words| (words as usize).min(blob.len()));
        state[..filled].copy_from_slice(&blob[..filled]);
        *count = filled as u32;

        trace!(thread = %thread, flavor, words = filled, "simulated thread_get_state");
        Ok(())
    }

    fn set_state(&self, thread: ThreadHandle, flavor: c_int, state: &[u32]) -> Result<(), KernReturn>
    {
        let mut kernel = self.lock();
        kernel.set_calls += 1;

        let sim = open_thread(&mut kernel.threads, thread)?;
        let blob = sim.states.get_mut(&flavor).ok_or(KernReturn(KERN_INVALID_ARGUMENT))?;
        if blob.len() != state.len() {
            return Err(KernReturn(KERN_INVALID_ARGUMENT));
        }
        blob.copy_from_slice(state);

        trace!(thread = %thread, flavor, words = state.len(), "simulated thread_set_state");
        Ok(())
    }
}
