//! Readiness backends.
//!
//! This module provides a unified interface over the readiness primitives
//! exposed by the operating system (`kqueue` on macOS, `poll(2)` and
//! `select(2)` elsewhere on Unix).
//!
//! Each backend implements the same contract:
//! - register a descriptor for read or write interest,
//! - remove all interest for a descriptor,
//! - block until a registered descriptor is ready or a timeout elapses.
//!
//! The concrete backend is chosen at multiplexer construction time by the
//! capability probe. Exactly one variant is live per multiplexer and it is
//! never swapped afterwards.

pub(crate) mod poll;
pub(crate) mod select;

#[cfg(target_os = "macos")]
pub(crate) mod kqueue;

use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

use crate::probe::BackendKind;
use crate::readiness::Readiness;

/// The closed set of backend variants.
///
/// Variants that the platform cannot implement are not compiled in; the
/// probe never selects them on such platforms.
#[derive(Debug)]
pub(crate) enum Backend {
    #[cfg(target_os = "macos")]
    KernelQueue(kqueue::KqueuePoller),
    PollTable(poll::PollPoller),
    FdSetScan(select::SelectPoller),
}

impl Backend {
    /// Which variant this is.
    pub(crate) fn kind(&self) -> BackendKind {
        match self {
            #[cfg(target_os = "macos")]
            Backend::KernelQueue(_) => BackendKind::KernelQueue,
            Backend::PollTable(_) => BackendKind::PollTable,
            Backend::FdSetScan(_) => BackendKind::FdSetScan,
        }
    }

    pub(crate) fn register_readable(&mut self, fd: RawFd) -> io::Result<()> {
        match self {
            #[cfg(target_os = "macos")]
            Backend::KernelQueue(p) => p.register_readable(fd),
            Backend::PollTable(p) => p.register_readable(fd),
            Backend::FdSetScan(p) => p.register_readable(fd),
        }
    }

    pub(crate) fn register_writable(&mut self, fd: RawFd) -> io::Result<()> {
        match self {
            #[cfg(target_os = "macos")]
            Backend::KernelQueue(p) => p.register_writable(fd),
            Backend::PollTable(p) => p.register_writable(fd),
            Backend::FdSetScan(p) => p.register_writable(fd),
        }
    }

    pub(crate) fn unregister(&mut self, fd: RawFd) -> io::Result<()> {
        match self {
            #[cfg(target_os = "macos")]
            Backend::KernelQueue(p) => p.unregister(fd),
            Backend::PollTable(p) => p.unregister(fd),
            Backend::FdSetScan(p) => p.unregister(fd),
        }
    }

    pub(crate) fn poll(&mut self, timeout: Duration) -> io::Result<Readiness> {
        match self {
            #[cfg(target_os = "macos")]
            Backend::KernelQueue(p) => p.poll(timeout),
            Backend::PollTable(p) => p.poll(timeout),
            Backend::FdSetScan(p) => p.poll(timeout),
        }
    }
}
