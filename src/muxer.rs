//! The multiplexer facade driven by the supervision loop.

#[cfg(target_os = "macos")]
use crate::poller::kqueue::KqueuePoller;
use crate::poller::Backend;
use crate::poller::poll::PollPoller;
use crate::poller::select::SelectPoller;
use crate::probe::{self, BackendKind, Capabilities};
use crate::readiness::Readiness;

use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

/// I/O readiness multiplexer.
///
/// A `Muxer` watches a set of registered descriptors and answers, via
/// [`poll`](Muxer::poll), which of them are currently readable or writable.
/// At construction it probes the platform's capabilities and instantiates
/// exactly one backend; every call is forwarded to that backend for the
/// lifetime of the instance.
///
/// The multiplexer holds *registrations*, never descriptors: opening and
/// closing the underlying pipes remains the caller's responsibility. One
/// instance is driven by exactly one thread in a loop of poll, handle
/// readiness, adjust registrations, poll again.
///
/// # Examples
///
/// ```rust,ignore
/// use fdmux::Muxer;
/// use std::time::Duration;
///
/// let mut mux = Muxer::new()?;
/// mux.register_readable(child_stdout)?;
/// mux.register_readable(wakeup_pipe)?;
///
/// let ready = mux.poll(Duration::from_millis(500))?;
/// ```
#[derive(Debug)]
pub struct Muxer {
    backend: Backend,
}

impl Muxer {
    /// Creates a multiplexer backed by the most capable readiness primitive
    /// the platform offers.
    ///
    /// Fails only if the chosen backend cannot acquire its kernel resource
    /// (for the kernel-event-queue backend, the queue descriptor).
    pub fn new() -> io::Result<Self> {
        Self::with_capabilities(Capabilities::detect())
    }

    /// Creates a multiplexer for an explicit capability set.
    ///
    /// This is the injection point for forcing a lesser backend, for
    /// instance the descriptor-set scan on a platform whose poll table
    /// would normally win. Forcing a primitive the platform does not
    /// implement fails with [`io::ErrorKind::Unsupported`].
    pub fn with_capabilities(caps: Capabilities) -> io::Result<Self> {
        let backend = match probe::select_backend(caps) {
            #[cfg(target_os = "macos")]
            BackendKind::KernelQueue => Backend::KernelQueue(KqueuePoller::new()?),
            #[cfg(not(target_os = "macos"))]
            BackendKind::KernelQueue => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "no kernel event queue on this platform",
                ));
            }
            BackendKind::PollTable => Backend::PollTable(PollPoller::new()),
            BackendKind::FdSetScan => Backend::FdSetScan(SelectPoller::new()),
        };

        log::debug!("multiplexer using {:?} backend", backend.kind());

        Ok(Self { backend })
    }

    /// Which backend variant was selected at construction.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Marks `fd` of interest for readability.
    ///
    /// Idempotent: registering the same descriptor for the same interest
    /// twice leaves exactly one active registration. Fails if the backend's
    /// OS call rejects the descriptor, e.g. because it is already closed.
    pub fn register_readable(&mut self, fd: RawFd) -> io::Result<()> {
        self.backend.register_readable(fd)
    }

    /// Marks `fd` of interest for writability.
    ///
    /// Symmetric to [`register_readable`](Muxer::register_readable); a
    /// descriptor may carry both interests at once.
    pub fn register_writable(&mut self, fd: RawFd) -> io::Result<()> {
        self.backend.register_writable(fd)
    }

    /// Removes all interest for `fd`.
    ///
    /// On the scan backend this is a no-op for an unknown descriptor. The
    /// poll-table and kernel-event-queue backends mirror the underlying
    /// removal call and fail for a descriptor that is not currently
    /// registered, since a double unregister indicates a caller bug.
    pub fn unregister(&mut self, fd: RawFd) -> io::Result<()> {
        self.backend.unregister(fd)
    }

    /// Blocks up to `timeout` for at least one registered descriptor to
    /// become ready.
    ///
    /// `Duration::ZERO` makes the call non-blocking; there is no infinite
    /// sentinel, a caller that wants to wait forever loops.
    ///
    /// Nothing becoming ready is not an error: an elapsed timeout, a wait
    /// interrupted by a signal, and a wait cut short by a stale-descriptor
    /// purge all yield an empty [`Readiness`]. Any other failure of the
    /// underlying wait call is fatal and propagates.
    pub fn poll(&mut self, timeout: Duration) -> io::Result<Readiness> {
        self.backend.poll(timeout)
    }
}
