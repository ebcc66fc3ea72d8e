use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out one id per macro call. Ids are strictly increasing for the
/// whole assembly run, across every file, and the counter can be shared
/// between threads.
#[derive(Debug, Default)]
pub struct InvocationCounter {
    next: AtomicU64,
}

impl InvocationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Allocate the id for one macro call
    pub fn next(&self) -> u64 {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        log::trace!("allocated macro invocation id {}", id);
        id
    }

    /// The id the next call to [`next`](Self::next) will return
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}
