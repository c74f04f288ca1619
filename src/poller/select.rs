//! `select(2)`-based poller implementation.
//!
//! This is the descriptor-set-scan backend, the portable fallback used when
//! neither a kernel event queue nor a poll table is available.
//!
//! Responsibilities:
//! - Keep explicit sets of descriptors with read and write interest
//! - Build the `fd_set`s and scan them with `select(2)` on every wait
//! - Recover from stale descriptors by clearing the whole registration set
//!
//! `select(2)` cannot report *which* descriptor went bad, only that one did
//! (`EBADF`), so recovery here is coarse: every registration is dropped and
//! the owners re-register on their next lifecycle turn. The poll-table
//! backend purges precisely instead.

use crate::readiness::Readiness;

use std::collections::BTreeSet;
use std::io;
use std::mem;
use std::os::unix::io::RawFd;
use std::ptr;
use std::time::Duration;

/// Descriptor-set-scan poller.
///
/// Registrations live in two ordered sets keyed by descriptor value, so
/// registration is naturally idempotent and removal never scans.
#[derive(Debug)]
pub(crate) struct SelectPoller {
    /// Descriptors with read interest.
    readable: BTreeSet<RawFd>,

    /// Descriptors with write interest.
    writable: BTreeSet<RawFd>,
}

impl SelectPoller {
    pub(crate) fn new() -> Self {
        Self {
            readable: BTreeSet::new(),
            writable: BTreeSet::new(),
        }
    }

    /// Marks `fd` as interesting for readability.
    pub(crate) fn register_readable(&mut self, fd: RawFd) -> io::Result<()> {
        check_scan_limit(fd)?;
        self.readable.insert(fd);

        Ok(())
    }

    /// Marks `fd` as interesting for writability.
    pub(crate) fn register_writable(&mut self, fd: RawFd) -> io::Result<()> {
        check_scan_limit(fd)?;
        self.writable.insert(fd);

        Ok(())
    }

    /// Removes all interest for `fd`.
    ///
    /// Safe to call on a descriptor with no current registration.
    pub(crate) fn unregister(&mut self, fd: RawFd) -> io::Result<()> {
        self.readable.remove(&fd);
        self.writable.remove(&fd);

        Ok(())
    }

    /// Drops every registration.
    ///
    /// Used when the scan reports a stale descriptor it cannot identify.
    fn unregister_all(&mut self) {
        self.readable.clear();
        self.writable.clear();
    }

    /// Scans the registered sets, blocking up to `timeout`.
    pub(crate) fn poll(&mut self, timeout: Duration) -> io::Result<Readiness> {
        let mut readfds: libc::fd_set = unsafe { mem::zeroed() };
        let mut writefds: libc::fd_set = unsafe { mem::zeroed() };

        let mut nfds: RawFd = 0;
        unsafe {
            libc::FD_ZERO(&mut readfds);
            libc::FD_ZERO(&mut writefds);

            for &fd in &self.readable {
                libc::FD_SET(fd, &mut readfds);
                nfds = nfds.max(fd + 1);
            }
            for &fd in &self.writable {
                libc::FD_SET(fd, &mut writefds);
                nfds = nfds.max(fd + 1);
            }
        }

        // select() may mutate the timeval on some platforms; it is rebuilt
        // on every call.
        let mut tv = libc::timeval {
            tv_sec: timeout.as_secs() as libc::time_t,
            tv_usec: timeout.subsec_micros() as libc::suseconds_t,
        };

        let rc = unsafe {
            libc::select(
                nfds,
                &mut readfds,
                &mut writefds,
                ptr::null_mut(),
                &mut tv,
            )
        };

        if rc < 0 {
            let err = io::Error::last_os_error();

            if err.kind() == io::ErrorKind::Interrupted {
                log::trace!("EINTR encountered in select(), nothing ready");
                return Ok(Readiness::new());
            }
            if err.raw_os_error() == Some(libc::EBADF) {
                log::trace!("EBADF encountered in select(), clearing all registrations");
                self.unregister_all();
                return Ok(Readiness::new());
            }

            return Err(err);
        }

        let mut ready = Readiness::new();
        unsafe {
            for &fd in &self.readable {
                if libc::FD_ISSET(fd, &readfds) {
                    ready.readable.push(fd);
                }
            }
            for &fd in &self.writable {
                if libc::FD_ISSET(fd, &writefds) {
                    ready.writable.push(fd);
                }
            }
        }

        Ok(ready)
    }
}

/// Rejects descriptors that do not fit in an `fd_set`.
///
/// The scan primitive imposes a hard limit on descriptor values; anything
/// at or beyond `FD_SETSIZE` cannot be watched by this backend.
fn check_scan_limit(fd: RawFd) -> io::Result<()> {
    if fd < 0 || fd as usize >= libc::FD_SETSIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("descriptor {fd} is outside the select() scan limit"),
        ));
    }

    Ok(())
}
