use crate::encoding::{MAX_PAYLOAD_LEN, X25Crc};
use crate::frame::{SIGNATURE_LEN, Version};

/// Start marker, length, flags, sequence, system, component and 24-bit message ID
pub const HEADER_LEN_V2: usize = 10;
/// Start marker, length, sequence, system, component and 8-bit message ID
pub const HEADER_LEN_V1: usize = 6;
pub const CHECKSUM_LEN: usize = X25Crc::LENGTH;

/// Longest possible frame: v2 header, full payload, checksum and signature
pub const MAX_PACKET_LEN: usize = HEADER_LEN_V2 + MAX_PAYLOAD_LEN + CHECKSUM_LEN + SIGNATURE_LEN;

/// Incompatibility flag marking a signed v2 frame
pub const INCOMPAT_FLAG_SIGNED: u8 = 0x01;
/// Incompatibility flags this implementation understands
pub const SUPPORTED_INCOMPAT_FLAGS: u8 = INCOMPAT_FLAG_SIGNED;

pub const fn header_len(version: Version) -> usize {
    match version {
        Version::V1 => HEADER_LEN_V1,
        Version::V2 => HEADER_LEN_V2,
    }
}

/// Checksum of a frame
///
/// `covered` spans the header without its start marker, followed by the payload.
pub fn frame_checksum(covered: &[u8], crc_extra: u8) -> u16 {
    let mut crc = X25Crc::new();
    crc.add_bytes(covered);
    crc.add(crc_extra);
    crc.get()
}

/// Payload length after stripping trailing zero bytes, never below one byte
pub fn trimmed_len(payload: &[u8]) -> usize {
    let significant = payload
        .iter()
        .rposition(|&byte| byte != 0)
        .map_or(0, |last| last + 1);
    significant.max(1).min(payload.len())
}
