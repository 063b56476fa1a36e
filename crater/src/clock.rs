//! Time sources for nodes

use core::cell::Cell;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::core::Timestamp;

pub trait Clock {
    fn timestamp(&self) -> Timestamp;
}

/// Manually driven clock for simulation and tests
pub struct VirtualClock<M: RawMutex> {
    now: Mutex<M, Cell<Timestamp>>,
}

impl<M: RawMutex> VirtualClock<M> {
    pub const fn new(initial: Timestamp) -> Self {
        Self {
            now: Mutex::const_new(M::INIT, Cell::new(initial)),
        }
    }

    pub fn set(&self, timestamp: Timestamp) {
        self.now.lock(|now| now.set(timestamp));
    }

    /// Moves the clock forward by `ns`, saturating at the representable maximum
    pub fn advance_ns(&self, ns: i64) {
        self.now.lock(|now| now.set(now.get().saturating_add_ns(ns)));
    }
}

impl<M: RawMutex> Default for VirtualClock<M> {
    fn default() -> Self {
        Self::new(Timestamp::ZERO)
    }
}

impl<M: RawMutex> Clock for VirtualClock<M> {
    fn timestamp(&self) -> Timestamp {
        self.now.lock(Cell::get)
    }
}

/// Clock backed by the `embassy-time` driver, counting from driver start
#[cfg(feature = "time")]
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbassyClock;

#[cfg(feature = "time")]
impl Clock for EmbassyClock {
    fn timestamp(&self) -> Timestamp {
        let us = embassy_time::Instant::now().as_micros();
        Timestamp::from_us(i64::try_from(us).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn virtual_clock() {
        let clock = VirtualClock::<NoopRawMutex>::new(Timestamp::from_ms(5));
        assert_eq!(clock.timestamp().num_ms(), 5);

        clock.advance_ns(1_500_000);
        assert_eq!(clock.timestamp().num_us(), 6_500);

        clock.set(Timestamp::from_secs(2));
        assert_eq!(clock.timestamp(), Timestamp::from_secs(2));
    }

    #[test]
    fn advance_saturates() {
        let clock = VirtualClock::<NoopRawMutex>::new(Timestamp::from_ns(i64::MAX - 1));
        clock.advance_ns(10);
        assert_eq!(clock.timestamp().num_ns(), i64::MAX);
    }
}
