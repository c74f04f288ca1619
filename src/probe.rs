//! Platform capability probing and backend selection.
//!
//! The probe answers one question: which readiness primitives does the
//! running platform offer? The answer is pure compile-time knowledge and
//! never changes while the process runs, so probing has no side effects and
//! is deterministic for a given target.
//!
//! Selection ranks the primitives by capability:
//! - kernel event queue first,
//! - poll table second,
//! - descriptor-set scan as the fallback that always exists.
//!
//! The absence of a primitive is a normal branch, never an error. The probe
//! runs once, when the multiplexer is constructed; there is no ambient or
//! process-wide selection state.

/// The readiness primitives available to the running process.
///
/// Normally obtained from [`Capabilities::detect`]. Built by hand to force a
/// lesser backend, for instance the scan backend on a platform where a poll
/// table exists; the scan primitive is available everywhere, so an
/// all-`false` set is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// A kernel event queue (`kqueue`) is available.
    pub kernel_queue: bool,

    /// A poll table (`poll(2)`) is available.
    pub poll_table: bool,
}

impl Capabilities {
    /// Probes the readiness primitives of the current platform.
    pub fn detect() -> Self {
        Self {
            kernel_queue: cfg!(target_os = "macos"),
            poll_table: cfg!(unix),
        }
    }
}

/// Identifies the backend variant driving a multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Kernel event queue (`kqueue`/`kevent`).
    KernelQueue,

    /// Poll table (`poll(2)`).
    PollTable,

    /// Descriptor-set scan (`select(2)`).
    FdSetScan,
}

/// Picks the most capable backend for the given capability set.
///
/// Pure and total: every capability set maps to exactly one backend kind.
pub fn select_backend(caps: Capabilities) -> BackendKind {
    if caps.kernel_queue {
        BackendKind::KernelQueue
    } else if caps.poll_table {
        BackendKind::PollTable
    } else {
        BackendKind::FdSetScan
    }
}
