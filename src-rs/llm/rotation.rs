use std::sync::atomic::{AtomicUsize, Ordering};

/// Process-wide round-robin cursor over registry positions.
///
/// `next` ignores health entirely; callers filter what it hands out. The
/// cursor is shared by every request, so concurrent callers interleave but
/// each position is still handed out once per `len` calls.
pub struct ProviderSelector {
    len: usize,
    cursor: AtomicUsize,
}

impl ProviderSelector {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Advance the cursor and return the registry index it landed on.
    pub fn next(&self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        let ticket = self.cursor.fetch_add(1, Ordering::Relaxed);
        Some(ticket % self.len)
    }
}
