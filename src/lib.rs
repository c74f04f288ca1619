//! # fdmux
//!
//! **fdmux** is a portable I/O readiness multiplexer for single-threaded
//! supervision loops.
//!
//! A supervisor that watches the stdout/stderr pipes of its child processes
//! (plus its own wake-up pipe) needs one blocking call that answers "which of
//! these descriptors can I read or write right now?" without spawning a
//! thread per descriptor. fdmux provides exactly that call, delegating to the
//! most capable readiness primitive the platform offers and presenting one
//! uniform contract regardless of which is chosen:
//!
//! - a **kernel event queue** (`kqueue`/`kevent` on macOS),
//! - a **poll table** (`poll(2)` on other Unix platforms),
//! - a **descriptor-set scan** (`select(2)`) as the portable fallback.
//!
//! The backend is chosen once, at construction, by probing the platform's
//! capabilities. It is never swapped afterwards.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fdmux::Muxer;
//! use std::time::Duration;
//!
//! let mut mux = Muxer::new()?;
//!
//! // `child_stdout` is the read end of a pipe owned by the caller.
//! mux.register_readable(child_stdout)?;
//!
//! loop {
//!     let ready = mux.poll(Duration::from_secs(1))?;
//!     for fd in &ready.readable {
//!         // drain child output
//!     }
//! }
//! ```
//!
//! ## Contract
//!
//! - Registration is idempotent: registering a descriptor twice for the same
//!   interest leaves exactly one active registration.
//! - An elapsed timeout yields an empty [`Readiness`], never an error.
//! - A wait interrupted by a signal also yields an empty [`Readiness`]; the
//!   loop simply goes around again.
//! - A registered descriptor whose owner closed it out-of-band is purged from
//!   the registration state during the next wait, without failing the call.
//!
//! Descriptors are never owned by the multiplexer; opening and closing them
//! remains the caller's responsibility. One `Muxer` is driven by exactly one
//! thread.
//!
//! Trace-level diagnostics (interrupted waits, purged descriptors) go through
//! the [`log`] facade; install whatever logger the embedding program uses.

mod muxer;
mod poller;
mod probe;
mod readiness;

pub use muxer::Muxer;
pub use probe::{BackendKind, Capabilities, select_backend};
pub use readiness::Readiness;
