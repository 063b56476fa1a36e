//! Bounded FIFO that overwrites its oldest element when full

use alloc::boxed::Box;
use core::num::NonZeroUsize;

/// Fixed-capacity FIFO queue with overwrite-on-full semantics
///
/// Push never fails: pushing into a full buffer discards exactly one element, the oldest
/// unread one. Storage is allocated once at construction.
#[derive(Debug)]
pub struct RingBuffer<T> {
    slots: Box<[Option<T>]>,
    write: usize,
    read: usize,
    empty: bool,
}

impl<T> RingBuffer<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be positive");
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            write: 0,
            read: 0,
            empty: true,
        }
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self::new(capacity.get())
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn count(&self) -> usize {
        if self.empty {
            0
        } else {
            let capacity = self.capacity();
            (self.write + capacity - self.read - 1) % capacity + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn is_full(&self) -> bool {
        !self.empty && self.write == self.read
    }

    /// Appends `value`, returning the element it displaced if the buffer was full
    pub fn push(&mut self, value: T) -> Option<T> {
        let displaced = if self.is_full() {
            let oldest = self.slots[self.read].take();
            self.read = self.advance(self.read);
            oldest
        } else {
            None
        };

        self.slots[self.write] = Some(value);
        self.write = self.advance(self.write);
        self.empty = false;
        displaced
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.empty {
            return None;
        }

        let value = self.slots[self.read].take();
        self.read = self.advance(self.read);
        self.empty = self.read == self.write;
        debug_assert!(value.is_some());
        value
    }

    pub fn clear(&mut self) {
        while self.pop().is_some() {}
    }

    fn advance(&self, index: usize) -> usize {
        (index + 1) % self.capacity()
    }
}
