//! Crater message bus core data types
//!
//! This crate provides the protocol identifiers and time base shared by other Crater crates.
//! Crater users should not depend on this crate directly. Use `crater::core` reexport instead.
#![no_std]

use core::fmt;

/// Largest payload a MAVLink v2 frame can carry
pub const MAX_PAYLOAD_LEN: usize = 255;

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidValue;

/// Message type identifier
///
/// MAVLink v2 carries message IDs as a 24-bit little-endian field, v1 as a single byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MessageId(u32);

impl MessageId {
    pub const MAX_VALUE: u32 = (1 << 24) - 1;
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(Self::MAX_VALUE);

    pub const fn new(value: u32) -> Option<Self> {
        if value <= Self::MAX_VALUE {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn from_truncating(value: u32) -> Self {
        Self(value & Self::MAX_VALUE)
    }

    pub const fn into_u32(self) -> u32 {
        self.0
    }

    /// Wire representation, little-endian
    pub const fn to_le_bytes(self) -> [u8; 3] {
        let bytes = self.0.to_le_bytes();
        [bytes[0], bytes[1], bytes[2]]
    }

    pub const fn from_le_bytes(bytes: [u8; 3]) -> Self {
        Self(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]))
    }
}

impl From<MessageId> for u32 {
    fn from(value: MessageId) -> Self {
        value.into_u32()
    }
}

impl TryFrom<u32> for MessageId {
    type Error = InvalidValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidValue)
    }
}

impl From<u8> for MessageId {
    fn from(value: u8) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the vehicle or ground station emitting a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SystemId(u8);

impl SystemId {
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn into_u8(self) -> u8 {
        self.0
    }
}

impl From<u8> for SystemId {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<SystemId> for u8 {
    fn from(value: SystemId) -> Self {
        value.into_u8()
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a component within a system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ComponentId(u8);

impl ComponentId {
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn into_u8(self) -> u8 {
        self.0
    }
}

impl From<u8> for ComponentId {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<ComponentId> for u8 {
    fn from(value: ComponentId) -> Self {
        value.into_u8()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Routing key of an inbound message
///
/// Keys compare field by field in declaration order, so a sorted table groups
/// bindings by message type first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchKey {
    pub message: MessageId,
    pub system: SystemId,
    pub component: ComponentId,
}

impl DispatchKey {
    pub const fn new(message: MessageId, system: SystemId, component: ComponentId) -> Self {
        Self {
            message,
            system,
            component,
        }
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "msg {} from {}/{}",
            self.message, self.system, self.component
        )
    }
}

const S_TO_NS: i64 = 1_000_000_000;
const MS_TO_NS: i64 = 1_000_000;
const US_TO_NS: i64 = 1_000;

/// Point in time with nanosecond resolution
///
/// The epoch is defined by the clock that produced the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp(i64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub const fn from_ns(ns: i64) -> Self {
        Self(ns)
    }

    /// Values beyond the representable range saturate, as in the other unit constructors
    pub const fn from_us(us: i64) -> Self {
        Self(us.saturating_mul(US_TO_NS))
    }

    pub const fn from_ms(ms: i64) -> Self {
        Self(ms.saturating_mul(MS_TO_NS))
    }

    pub const fn from_secs(s: i64) -> Self {
        Self(s.saturating_mul(S_TO_NS))
    }

    pub const fn num_ns(self) -> i64 {
        self.0
    }

    pub const fn num_us(self) -> i64 {
        self.0 / US_TO_NS
    }

    pub const fn num_ms(self) -> i64 {
        self.0 / MS_TO_NS
    }

    pub const fn num_s(self) -> i64 {
        self.0 / S_TO_NS
    }

    pub fn as_us_f64(self) -> f64 {
        self.as_f64(US_TO_NS)
    }

    pub fn as_ms_f64(self) -> f64 {
        self.as_f64(MS_TO_NS)
    }

    pub fn as_secs_f64(self) -> f64 {
        self.as_f64(S_TO_NS)
    }

    // Split first so large values keep sub-unit precision.
    fn as_f64(self, factor: i64) -> f64 {
        let integral = self.0 / factor;
        let fraction = self.0 % factor;
        integral as f64 + fraction as f64 / factor as f64
    }

    pub const fn checked_add_ns(self, ns: i64) -> Option<Self> {
        match self.0.checked_add(ns) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    pub const fn saturating_add_ns(self, ns: i64) -> Self {
        Self(self.0.saturating_add(ns))
    }
}

impl From<Timestamp> for i64 {
    fn from(value: Timestamp) -> Self {
        value.num_ns()
    }
}
