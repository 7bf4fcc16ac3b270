//! Fixed two-slot sample history.
//!
//! The control law only ever looks back two samples, so the history is an
//! explicit shift register rather than a queue.

/// Last two samples of a signal: `prev` = [n-1], `prev2` = [n-2].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct History {
    prev: f32,
    prev2: f32,
}

impl History {
    /// Sample [n-1].
    #[inline]
    pub fn prev(&self) -> f32 {
        self.prev
    }

    /// Sample [n-2].
    #[inline]
    pub fn prev2(&self) -> f32 {
        self.prev2
    }

    /// Shift in the current sample; [n-2] is discarded.
    #[inline]
    pub fn push(&mut self, current: f32) {
        self.prev2 = self.prev;
        self.prev = current;
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
