//! Id allocation for subjects.
//!
//! Each collection owns one allocator. Restored ids are observed so that
//! freshly created subjects never collide with persisted ones.

/// Monotonically increasing source of subject ids
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
    /// Set once `u64::MAX` has been handed out or observed
    exhausted: bool,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next free id, or None once every id has been used
    pub fn next(&mut self) -> Option<u64> {
        let id = self.peek()?;
        match id.checked_add(1) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }
        Some(id)
    }

    /// Make sure ids handed out later are strictly greater than `id`
    pub fn observe(&mut self, id: u64) {
        match id.checked_add(1) {
            Some(after) => self.next = self.next.max(after),
            None => self.exhausted = true,
        }
    }

    /// The id `next()` would return, without consuming it
    pub fn peek(&self) -> Option<u64> {
        if self.exhausted {
            None
        } else {
            Some(self.next)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_is_sequential() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next(), Some(0));
        assert_eq!(ids.next(), Some(1));
        assert_eq!(ids.next(), Some(2));
    }

    #[test]
    fn test_observe_advances_past_restored_id() {
        let mut ids = IdAllocator::new();
        ids.observe(7);
        assert_eq!(ids.next(), Some(8));
    }

    #[test]
    fn test_observe_never_goes_backwards() {
        let mut ids = IdAllocator::new();
        ids.observe(10);
        ids.observe(3);
        assert_eq!(ids.peek(), Some(11));
    }

    #[test]
    fn test_observing_max_id_exhausts() {
        let mut ids = IdAllocator::new();
        ids.observe(u64::MAX);
        assert_eq!(ids.peek(), None);
        assert_eq!(ids.next(), None);

        // observing smaller ids afterwards does not revive the allocator
        ids.observe(3);
        assert_eq!(ids.next(), None);
    }

    #[test]
    fn test_last_id_is_handed_out_once() {
        let mut ids = IdAllocator::new();
        ids.observe(u64::MAX - 2);
        assert_eq!(ids.next(), Some(u64::MAX - 1));
        assert_eq!(ids.next(), Some(u64::MAX));
        assert_eq!(ids.next(), None);
    }
}
