use std::os::unix::io::RawFd;

/// Readiness information produced by one wait call.
///
/// A `Readiness` holds the descriptors the backend reported ready, split by
/// interest. A descriptor registered for both interests can appear in both
/// lists; within one list a descriptor appears at most once. List order is
/// unspecified.
///
/// The result describes a single instant: it is only meaningful for the
/// `poll` call that produced it and is not retained across calls.
#[derive(Debug)]
pub struct Readiness {
    /// Descriptors ready for reading.
    pub readable: Vec<RawFd>,

    /// Descriptors ready for writing.
    pub writable: Vec<RawFd>,
}

impl Readiness {
    /// An empty result: nothing became ready before the timeout elapsed.
    pub(crate) fn new() -> Self {
        Self {
            readable: Vec::new(),
            writable: Vec::new(),
        }
    }

    /// Returns `true` when no descriptor was reported ready.
    pub fn is_empty(&self) -> bool {
        self.readable.is_empty() && self.writable.is_empty()
    }
}
