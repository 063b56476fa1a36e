//! MAVLink frame encoding and typed decoding

use crate::core::{ComponentId, SystemId};
use crate::encoding::{DeserializeError, Deserialize, ReadCursor, Serialize, WriteCursor};
use crate::format::{
    CHECKSUM_LEN, HEADER_LEN_V2, INCOMPAT_FLAG_SIGNED, MAX_PACKET_LEN, frame_checksum,
    header_len, trimmed_len,
};
use crate::frame::{RawFrame, Version};

/// Serializes `message` into a complete v2 frame and returns the frame length
///
/// Trailing zero bytes of the payload are stripped, keeping at least one byte.
pub fn encode<T: Serialize>(
    buffer: &mut [u8; MAX_PACKET_LEN],
    message: &T,
    system: SystemId,
    component: ComponentId,
    sequence: u8,
) -> usize {
    const { ::core::assert!(T::LENGTH <= crate::encoding::MAX_PAYLOAD_LEN) };

    let payload = &mut buffer[HEADER_LEN_V2..HEADER_LEN_V2 + T::LENGTH];
    message.serialize(&mut WriteCursor::new(payload));
    let payload_len = trimmed_len(payload);

    let id = T::ID.to_le_bytes();
    buffer[..HEADER_LEN_V2].copy_from_slice(&[
        Version::V2.start_marker(),
        payload_len as u8,
        0,
        0,
        sequence,
        system.into_u8(),
        component.into_u8(),
        id[0],
        id[1],
        id[2],
    ]);

    let end = HEADER_LEN_V2 + payload_len;
    let checksum = frame_checksum(&buffer[1..end], T::CRC_EXTRA);
    buffer[end..end + CHECKSUM_LEN].copy_from_slice(&checksum.to_le_bytes());
    end + CHECKSUM_LEN
}

/// Writes an already serialized frame as is and returns the frame length
///
/// The payload is not trimmed. A v2 frame carrying a signature gets the signed flag set.
/// v1 frames only keep the low byte of the message ID and drop flags and signature.
pub fn encode_raw(buffer: &mut [u8; MAX_PACKET_LEN], frame: &RawFrame, crc_extra: u8) -> usize {
    let header_len = header_len(frame.version);
    let payload_len = frame.payload.len();

    let mut header = [0u8; HEADER_LEN_V2];
    header[0] = frame.version.start_marker();
    header[1] = payload_len as u8;
    match frame.version {
        Version::V1 => {
            header[2] = frame.sequence;
            header[3] = frame.system.into_u8();
            header[4] = frame.component.into_u8();
            header[5] = frame.message.to_le_bytes()[0];
        }
        Version::V2 => {
            header[2] = if frame.signature.is_some() {
                frame.incompat_flags | INCOMPAT_FLAG_SIGNED
            } else {
                frame.incompat_flags & !INCOMPAT_FLAG_SIGNED
            };
            header[3] = frame.compat_flags;
            header[4] = frame.sequence;
            header[5] = frame.system.into_u8();
            header[6] = frame.component.into_u8();
            header[7..10].copy_from_slice(&frame.message.to_le_bytes());
        }
    }
    buffer[..header_len].copy_from_slice(&header[..header_len]);

    let end = header_len + payload_len;
    buffer[header_len..end].copy_from_slice(&frame.payload);
    let checksum = frame_checksum(&buffer[1..end], crc_extra);
    buffer[end..end + CHECKSUM_LEN].copy_from_slice(&checksum.to_le_bytes());
    let mut len = end + CHECKSUM_LEN;

    if let (Version::V2, Some(signature)) = (frame.version, &frame.signature) {
        buffer[len..len + signature.len()].copy_from_slice(signature);
        len += signature.len();
    }
    len
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// The frame carries a different message type
    IdMismatch,
    Deserialize(DeserializeError),
}

impl From<DeserializeError> for DecodeError {
    fn from(value: DeserializeError) -> Self {
        DecodeError::Deserialize(value)
    }
}

/// Decodes the frame payload as `T`
///
/// A payload shorter than `T::LENGTH` is zero-extended.
pub fn try_decode<T: Deserialize>(frame: &RawFrame) -> Result<T, DecodeError> {
    if frame.message != T::ID {
        return Err(DecodeError::IdMismatch);
    }
    if frame.payload.len() > T::LENGTH {
        return Err(DeserializeError::Length.into());
    }
    Ok(T::deserialize(&mut ReadCursor::new(&frame.payload))?)
}

/// Decodes the frame payload as `T`, or returns `None` if the frame carries another type
/// or an invalid payload
pub fn decode<T: Deserialize>(frame: &RawFrame) -> Option<T> {
    try_decode(frame).ok()
}
