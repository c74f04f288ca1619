//! macOS `kqueue`-based poller implementation.
//!
//! This is the kernel-event-queue backend, preferred whenever the platform
//! offers it. Interest is registered directly with the kernel queue, so no
//! descriptor bookkeeping lives in user space at all and waits do not
//! rescan the registered set.
//!
//! Responsibilities:
//! - Submit filter changes (`EV_ADD`/`EV_DELETE`) against the kernel queue
//! - Retrieve a bounded batch of ready events per wait
//! - Classify retrieved events by filter into readable/writable results
//!
//! There is no stale-descriptor recovery here: the kernel drops queue
//! entries for closed descriptors on its own, so a wait can never return
//! one.

use crate::readiness::Readiness;

use std::io;
use std::os::unix::io::RawFd;
use std::ptr;
use std::time::Duration;

/// Upper bound on events retrieved by a single wait.
///
/// Caps the per-call allocation and the latency of one loop turn; anything
/// beyond the bound is simply picked up by the next wait.
const MAX_EVENTS: usize = 1000;

/// Kernel-event-queue poller.
///
/// Owns the queue descriptor; registration state lives entirely inside the
/// kernel.
#[derive(Debug)]
pub(crate) struct KqueuePoller {
    /// Kqueue descriptor.
    kq: RawFd,
}

impl KqueuePoller {
    pub(crate) fn new() -> io::Result<Self> {
        let kq = unsafe { libc::kqueue() };
        if kq < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self { kq })
    }

    /// Adds the read filter for `fd` to the kernel queue.
    ///
    /// Adding a filter that is already present re-arms it in place, so the
    /// call is idempotent.
    pub(crate) fn register_readable(&mut self, fd: RawFd) -> io::Result<()> {
        self.submit(fd, libc::EVFILT_READ, libc::EV_ADD)
    }

    /// Adds the write filter for `fd` to the kernel queue.
    pub(crate) fn register_writable(&mut self, fd: RawFd) -> io::Result<()> {
        self.submit(fd, libc::EVFILT_WRITE, libc::EV_ADD)
    }

    /// Deletes both filters for `fd` from the kernel queue.
    ///
    /// Registration state lives only in the kernel, so both filters are
    /// deleted blindly; a missing one is tolerated as long as the other was
    /// present. If neither was present the descriptor was never registered,
    /// which indicates a caller bug and is surfaced.
    pub(crate) fn unregister(&mut self, fd: RawFd) -> io::Result<()> {
        let read = self.delete(fd, libc::EVFILT_READ)?;
        let write = self.delete(fd, libc::EVFILT_WRITE)?;

        if !read && !write {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("descriptor {fd} is not registered"),
            ));
        }

        Ok(())
    }

    /// Retrieves ready events from the kernel queue, blocking up to
    /// `timeout`.
    pub(crate) fn poll(&mut self, timeout: Duration) -> io::Result<Readiness> {
        let ts = libc::timespec {
            tv_sec: timeout.as_secs() as libc::time_t,
            tv_nsec: timeout.subsec_nanos() as libc::c_long,
        };

        let mut events: Vec<libc::kevent> = Vec::with_capacity(MAX_EVENTS);

        let rc = unsafe {
            libc::kevent(
                self.kq,
                ptr::null(),
                0,
                events.as_mut_ptr(),
                MAX_EVENTS as libc::c_int,
                &ts,
            )
        };

        if rc < 0 {
            let err = io::Error::last_os_error();

            if err.kind() == io::ErrorKind::Interrupted {
                log::trace!("EINTR encountered in kevent(), nothing ready");
                return Ok(Readiness::new());
            }

            return Err(err);
        }

        unsafe {
            events.set_len(rc as usize);
        }

        let mut ready = Readiness::new();
        for ev in &events {
            if ev.filter == libc::EVFILT_READ {
                ready.readable.push(ev.ident as RawFd);
            }
            if ev.filter == libc::EVFILT_WRITE {
                ready.writable.push(ev.ident as RawFd);
            }
        }

        Ok(ready)
    }

    /// Submits one change record to the kernel queue.
    fn submit(&self, fd: RawFd, filter: i16, flags: u16) -> io::Result<()> {
        let change = libc::kevent {
            ident: fd as libc::uintptr_t,
            filter,
            flags,
            fflags: 0,
            data: 0,
            udata: ptr::null_mut(),
        };

        let rc = unsafe { libc::kevent(self.kq, &change, 1, ptr::null_mut(), 0, ptr::null()) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(())
    }

    /// Deletes one filter for `fd`, reporting whether it was present.
    fn delete(&self, fd: RawFd, filter: i16) -> io::Result<bool> {
        match self.submit(fd, filter, libc::EV_DELETE) {
            Ok(()) => Ok(true),
            Err(err) if err.raw_os_error() == Some(libc::ENOENT) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

impl Drop for KqueuePoller {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.kq);
        }
    }
}
