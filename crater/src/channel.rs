//! Multi-producer, multi-consumer broadcast channel
//!
//! Every receiver owns a [`RingBuffer`] and sees each message sent after its creation,
//! paced independently of other receivers. A slow receiver loses its oldest messages once
//! its buffer fills up. It never blocks senders or other receivers.
//!
//! Senders share the receiver list, not the buffers: the list keeps weak references, so
//! dropping a receiver frees its buffer and the slot is reused by the next receiver.

use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::ring_buffer::RingBuffer;
use crate::sync::ScopedLock;

type Buffer<M, T> = ScopedLock<M, RingBuffer<T>>;

struct Shared<M: RawMutex, T> {
    receivers: ScopedLock<M, Vec<Weak<Buffer<M, T>>>>,
}

impl<M: RawMutex, T> Shared<M, T> {
    fn new() -> Self {
        Self {
            receivers: ScopedLock::new(Vec::new()),
        }
    }

    fn attach(this: &Arc<Self>, capacity: usize) -> Receiver<M, T> {
        let buffer = Arc::new(ScopedLock::new(RingBuffer::new(capacity)));
        let link = Arc::downgrade(&buffer);

        let mut receivers = this.receivers.lock();
        // Slots are replaced in place, so indices held by an in-flight send stay valid
        match receivers.iter_mut().find(|slot| slot.strong_count() == 0) {
            Some(slot) => *slot = link,
            None => receivers.push(link),
        }
        Receiver {
            buffer,
            shared: Arc::downgrade(this),
        }
    }

    fn receiver_at(&self, index: usize) -> Option<Option<Arc<Buffer<M, T>>>> {
        let receivers = self.receivers.lock();
        receivers.get(index).map(Weak::upgrade)
    }

    fn receiver_count(&self) -> usize {
        let receivers = self.receivers.lock();
        receivers
            .iter()
            .filter(|slot| slot.strong_count() > 0)
            .count()
    }
}

/// Broadcast channel handle, the factory of senders and receivers
pub struct Channel<M: RawMutex, T> {
    shared: Arc<Shared<M, T>>,
}

impl<M: RawMutex, T> Channel<M, T> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::new()),
        }
    }

    pub fn sender(&self) -> Sender<M, T> {
        Sender {
            shared: self.shared.clone(),
        }
    }

    /// Creates a receiver buffering up to `capacity` messages
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn receiver(&self, capacity: usize) -> Receiver<M, T> {
        Shared::attach(&self.shared, capacity)
    }

    /// Number of receivers that have not been dropped
    pub fn receiver_count(&self) -> usize {
        self.shared.receiver_count()
    }
}

impl<M: RawMutex, T> Default for Channel<M, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, T> Clone for Channel<M, T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

/// Sending half of a [`Channel`]
///
/// All senders of a channel are equivalent.
pub struct Sender<M: RawMutex, T> {
    shared: Arc<Shared<M, T>>,
}

impl<M: RawMutex, T> Sender<M, T> {
    /// Creates a receiver on the channel this sender feeds
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn receiver(&self, capacity: usize) -> Receiver<M, T> {
        Shared::attach(&self.shared, capacity)
    }
}

impl<M: RawMutex, T: Clone> Sender<M, T> {
    /// Delivers a copy of `value` to every live receiver
    ///
    /// Receivers are served one at a time in creation order. Only the list lookup and a
    /// single buffer push run under a lock, so delivery is not atomic across receivers.
    pub fn send(&self, value: T) {
        let mut index = 0;
        while let Some(slot) = self.shared.receiver_at(index) {
            if let Some(buffer) = slot {
                buffer.lock().push(value.clone());
            }
            index += 1;
        }
    }
}

impl<M: RawMutex, T> Clone for Sender<M, T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

/// Reason [`Receiver::receive`] returned no message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveError {
    /// Nothing buffered, more may come
    Empty,
    /// Nothing buffered and no channel or sender handle is left to send more
    Closed,
}

/// Receiving half of a [`Channel`]
pub struct Receiver<M: RawMutex, T> {
    buffer: Arc<Buffer<M, T>>,
    shared: Weak<Shared<M, T>>,
}

impl<M: RawMutex, T> Receiver<M, T> {
    /// Pops the oldest buffered message
    pub fn try_receive(&self) -> Option<T> {
        self.buffer.lock().pop()
    }

    /// Pops the oldest buffered message, telling an idle channel from a closed one
    ///
    /// Messages buffered before the last sender went away are still delivered.
    pub fn receive(&self) -> Result<T, ReceiveError> {
        // Checked first: once closed, nothing can be pushed behind the pop
        let closed = self.is_closed();
        match self.try_receive() {
            Some(value) => Ok(value),
            None if closed => Err(ReceiveError::Closed),
            None => Err(ReceiveError::Empty),
        }
    }

    /// `true` once every [`Channel`] and [`Sender`] handle is dropped
    pub fn is_closed(&self) -> bool {
        self.shared.strong_count() == 0
    }

    /// Number of buffered messages
    pub fn count(&self) -> usize {
        self.buffer.lock().count()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.lock().capacity()
    }
}
