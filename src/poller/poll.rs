//! `poll(2)`-based poller implementation.
//!
//! This is the poll-table backend, used when the platform has no kernel
//! event queue. The kernel scans the submitted table once per call but
//! indexes it internally, so it scales better than the descriptor-set scan.
//!
//! Responsibilities:
//! - Keep a table of descriptors and the interest bits armed for each
//! - Submit the table to `poll(2)` on every wait
//! - Purge individual descriptors the kernel reports as invalid
//!
//! Unlike the scan backend, `poll(2)` names the offending descriptor when
//! one goes stale (`POLLNVAL`), so recovery here is per-descriptor.

use crate::readiness::Readiness;

use std::collections::HashMap;
use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

/// Interest bits armed for readability.
///
/// Hang-up counts as readable: a pipe whose writer exited must be reported
/// so the supervisor can drain it to end-of-file.
const READ_EVENTS: libc::c_short = libc::POLLIN | libc::POLLPRI | libc::POLLHUP;

/// Interest bits armed for writability.
const WRITE_EVENTS: libc::c_short = libc::POLLOUT;

/// Poll-table poller.
#[derive(Debug)]
pub(crate) struct PollPoller {
    /// The poll table: `fd → armed interest bits`.
    table: HashMap<RawFd, libc::c_short>,
}

impl PollPoller {
    pub(crate) fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Arms read interest for `fd`, adding a table entry if needed.
    pub(crate) fn register_readable(&mut self, fd: RawFd) -> io::Result<()> {
        *self.table.entry(fd).or_insert(0) |= READ_EVENTS;

        Ok(())
    }

    /// Arms write interest for `fd`, adding a table entry if needed.
    pub(crate) fn register_writable(&mut self, fd: RawFd) -> io::Result<()> {
        *self.table.entry(fd).or_insert(0) |= WRITE_EVENTS;

        Ok(())
    }

    /// Removes the table entry for `fd`, dropping all interest.
    ///
    /// Fails if `fd` has no entry: unregistering a descriptor that was never
    /// registered (or was already removed) indicates a caller bug.
    pub(crate) fn unregister(&mut self, fd: RawFd) -> io::Result<()> {
        if self.table.remove(&fd).is_none() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("descriptor {fd} is not registered"),
            ));
        }

        Ok(())
    }

    /// Submits the table to `poll(2)`, blocking up to `timeout`.
    pub(crate) fn poll(&mut self, timeout: Duration) -> io::Result<Readiness> {
        let mut fds: Vec<libc::pollfd> = self
            .table
            .iter()
            .map(|(&fd, &events)| libc::pollfd {
                fd,
                events,
                revents: 0,
            })
            .collect();

        // poll(2) takes milliseconds.
        let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

        let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) };

        if rc < 0 {
            let err = io::Error::last_os_error();

            if err.kind() == io::ErrorKind::Interrupted {
                log::trace!("EINTR encountered in poll(), nothing ready");
                return Ok(Readiness::new());
            }

            return Err(err);
        }

        let mut ready = Readiness::new();
        for pfd in &fds {
            let revents = pfd.revents;
            if revents == 0 {
                continue;
            }

            if revents & libc::POLLNVAL != 0 {
                // The owner closed this descriptor while it was still
                // registered. Drop the entry; if the process restarts, its
                // fresh descriptors get registered again.
                log::trace!("POLLNVAL for descriptor {}, dropping registration", pfd.fd);
                self.table.remove(&pfd.fd);
                continue;
            }

            if revents & READ_EVENTS != 0 {
                ready.readable.push(pfd.fd);
            }
            if revents & WRITE_EVENTS != 0 {
                ready.writable.push(pfd.fd);
            }
        }

        Ok(ready)
    }
}
