//! Round-Robin Victim Selection.
//!
//! A single rolling cursor per cache picks the way to evict when the target
//! set is full. The cursor advances on every eviction regardless of which
//! set the eviction happened in.

/// Rolling victim cursor.
pub struct VictimCursor {
    next: usize,
    ways: usize,
}

impl VictimCursor {
    /// Creates a cursor over `ways` ways, starting at way 0.
    pub fn new(ways: usize) -> Self {
        Self { next: 0, ways }
    }

    /// Returns the way to evict and advances the cursor.
    pub fn next_victim(&mut self) -> usize {
        let way = self.next;
        self.next = (self.next + 1) % self.ways;
        way
    }

    /// Way the next eviction will pick.
    pub fn position(&self) -> usize {
        self.next
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}
