//! Serialization support for Crater message types
//!
//! Message definitions implement [`Serialize`] and [`Deserialize`] on top of [`DataType`],
//! which carries the static descriptor the frame codec needs: identifier, payload bounds
//! and CRC extra byte.
//!
//! Crater users should not depend on this crate directly. Use `crater::encoding` reexport instead.

#![no_std]

mod crc;
mod cursor;

pub use crater_core::{MAX_PAYLOAD_LEN, MessageId};
pub use crc::{FieldSpec, X25Crc, crc_extra};
pub use cursor::{ReadCursor, WriteCursor};

/// Static description of a message type
pub trait DataType {
    const ID: MessageId;
    const NAME: &'static str;
    /// Length of the base fields. Frames shorter than this are zero-extended on decode.
    const MIN_LENGTH: usize;
    /// Length of the full payload, extension fields included
    const LENGTH: usize;
    const CRC_EXTRA: u8;
}

pub trait Serialize: DataType {
    /// Writes exactly `Self::LENGTH` bytes in wire order
    fn serialize(&self, cursor: &mut WriteCursor<'_>);
}

pub trait Deserialize: DataType + Sized {
    fn deserialize(cursor: &mut ReadCursor<'_>) -> Result<Self, DeserializeError>;
}

/// A message type that can travel over a channel and across the wire
pub trait Message: Serialize + Deserialize + Clone + Send + 'static {}

impl<T: Serialize + Deserialize + Clone + Send + 'static> Message for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeserializeError {
    /// A field holds a value outside its declared domain
    FieldValue,
    /// The payload exceeds the type's declared length
    Length,
}

/// Type-erased [`DataType`] descriptor, used by the frame parser to validate unknown input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MessageInfo {
    pub id: MessageId,
    pub min_length: usize,
    pub max_length: usize,
    pub crc_extra: u8,
}

impl MessageInfo {
    pub const fn of<T: DataType>() -> Self {
        Self {
            id: T::ID,
            min_length: T::MIN_LENGTH,
            max_length: T::LENGTH,
            crc_extra: T::CRC_EXTRA,
        }
    }
}
