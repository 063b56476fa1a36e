//! Incremental MAVLink frame parser
//!
//! Bytes are pushed one at a time, so frames may be split across arbitrary read chunks.
//! Anything that does not form a valid frame of a known message type is absorbed and counted.
//! A rejected candidate gives up only its start marker: the bytes buffered after it are
//! scanned again, so a stray marker in front of a frame never hides that frame.

use alloc::collections::BTreeMap;

use crate::core::{ComponentId, MessageId, SystemId};
use crate::encoding::MessageInfo;
use crate::format::{
    CHECKSUM_LEN, INCOMPAT_FLAG_SIGNED, MAX_PACKET_LEN, SUPPORTED_INCOMPAT_FLAGS,
    frame_checksum, header_len,
};
use crate::frame::{Payload, RawFrame, SIGNATURE_LEN, Version};

/// Source of message descriptors for checksum and length validation
pub trait MessageLookup {
    fn message_info(&self, id: MessageId) -> Option<MessageInfo>;
}

impl MessageLookup for BTreeMap<MessageId, MessageInfo> {
    fn message_info(&self, id: MessageId) -> Option<MessageInfo> {
        self.get(&id).copied()
    }
}

impl MessageLookup for [MessageInfo] {
    fn message_info(&self, id: MessageId) -> Option<MessageInfo> {
        self.iter().find(|info| info.id == id).copied()
    }
}

impl<L: MessageLookup + ?Sized> MessageLookup for &L {
    fn message_info(&self, id: MessageId) -> Option<MessageInfo> {
        (**self).message_info(id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParserStats {
    /// Frames that passed validation
    pub frames: u32,
    pub bad_checksum: u32,
    /// Candidates of message types missing from the lookup
    pub unknown_message: u32,
    /// Headers with unsupported flags or a length the message type cannot have
    pub malformed: u32,
}

/// Outcome of examining the candidate at the front of the window
enum Scan {
    /// More bytes are needed to decide
    Incomplete,
    Rejected,
    /// A frame of the given length was validated and stored
    Complete(usize),
}

/// Byte-wise frame parser with a fixed-size window
///
/// The window starts at the current candidate's start marker. It never holds more than
/// [`MAX_PACKET_LEN`] bytes: a candidate is decided as soon as its last byte arrives.
pub struct FrameParser {
    window: [u8; MAX_PACKET_LEN],
    len: usize,
    frame: RawFrame,
    stats: ParserStats,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            window: [0; MAX_PACKET_LEN],
            len: 0,
            frame: RawFrame::new(MessageId::MIN, SystemId::new(0), ComponentId::new(0)),
            stats: ParserStats::default(),
        }
    }

    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    /// Drops any partially received frame
    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Feeds one byte and returns the first frame it completes, if any
    ///
    /// After a rejected candidate, the buffered bytes may hold further complete frames.
    /// Collect them with [`Self::poll`] until it returns `None`, or use [`Self::push_bytes`].
    pub fn push_byte<L: MessageLookup + ?Sized>(
        &mut self,
        byte: u8,
        lookup: &L,
    ) -> Option<&RawFrame> {
        // Every call leaves at most one undecided candidate, shorter than a full packet
        debug_assert!(self.len < MAX_PACKET_LEN);
        self.window[self.len] = byte;
        self.len += 1;
        self.poll(lookup)
    }

    /// Returns the next frame already present in the buffered bytes
    pub fn poll<L: MessageLookup + ?Sized>(&mut self, lookup: &L) -> Option<&RawFrame> {
        loop {
            let start = self.window[..self.len]
                .iter()
                .position(|&byte| Version::from_start_marker(byte).is_some())
                .unwrap_or(self.len);
            self.discard(start);
            if self.len == 0 {
                return None;
            }

            match self.scan(lookup) {
                Scan::Incomplete => return None,
                Scan::Rejected => self.discard(1),
                Scan::Complete(frame_len) => {
                    self.discard(frame_len);
                    return Some(&self.frame);
                }
            }
        }
    }

    /// Feeds `bytes` and hands every completed frame to `on_frame`, in stream order
    pub fn push_bytes<L: MessageLookup + ?Sized>(
        &mut self,
        bytes: &[u8],
        lookup: &L,
        mut on_frame: impl FnMut(&RawFrame),
    ) {
        for &byte in bytes {
            if let Some(frame) = self.push_byte(byte, lookup) {
                on_frame(frame);
                while let Some(frame) = self.poll(lookup) {
                    on_frame(frame);
                }
            }
        }
    }

    fn discard(&mut self, count: usize) {
        self.window.copy_within(count..self.len, 0);
        self.len -= count;
    }

    fn scan<L: MessageLookup + ?Sized>(&mut self, lookup: &L) -> Scan {
        let Some(version) = Version::from_start_marker(self.window[0]) else {
            return Scan::Rejected;
        };
        let header_len = header_len(version);
        if self.len < header_len {
            return Scan::Incomplete;
        }

        let header = &self.window[..header_len];
        let payload_len = usize::from(header[1]);
        let (incompat_flags, message) = match version {
            Version::V1 => (0, MessageId::from(header[5])),
            Version::V2 => (
                header[2],
                MessageId::from_le_bytes([header[7], header[8], header[9]]),
            ),
        };

        if incompat_flags & !SUPPORTED_INCOMPAT_FLAGS != 0 {
            self.stats.malformed += 1;
            trace!("unsupported incompat flags {}", incompat_flags);
            return Scan::Rejected;
        }

        let Some(info) = lookup.message_info(message) else {
            self.stats.unknown_message += 1;
            trace!("unknown message {}", message.into_u32());
            return Scan::Rejected;
        };

        let valid_len = match version {
            // v1 has neither extensions nor trimming
            Version::V1 => payload_len == info.min_length,
            Version::V2 => payload_len <= info.max_length,
        };
        if !valid_len {
            self.stats.malformed += 1;
            trace!("bad length {} of message {}", payload_len, message.into_u32());
            return Scan::Rejected;
        }

        let signed = incompat_flags & INCOMPAT_FLAG_SIGNED != 0;
        let end = header_len + payload_len;
        let frame_len = end + CHECKSUM_LEN + if signed { SIGNATURE_LEN } else { 0 };
        if self.len < frame_len {
            return Scan::Incomplete;
        }

        let received = u16::from_le_bytes([self.window[end], self.window[end + 1]]);
        let computed = frame_checksum(&self.window[1..end], info.crc_extra);
        if received != computed {
            self.stats.bad_checksum += 1;
            debug!(
                "checksum mismatch of message {}: {} != {}",
                message.into_u32(),
                received,
                computed
            );
            return Scan::Rejected;
        }

        let header = &self.window[..header_len];
        let (compat_flags, sequence, system, component) = match version {
            Version::V1 => (0, header[2], header[3], header[4]),
            Version::V2 => (header[3], header[4], header[5], header[6]),
        };

        let signature = if signed {
            let start = end + CHECKSUM_LEN;
            let mut signature = [0u8; SIGNATURE_LEN];
            signature.copy_from_slice(&self.window[start..start + SIGNATURE_LEN]);
            Some(signature)
        } else {
            None
        };

        let mut payload = Payload::new();
        // Bounded by the length byte
        unwrap!(payload.extend_from_slice(&self.window[header_len..end]));

        self.frame = RawFrame {
            version,
            incompat_flags,
            compat_flags,
            sequence,
            system: system.into(),
            component: component.into(),
            message,
            payload,
            signature,
        };
        self.stats.frames += 1;
        Scan::Complete(frame_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode, encode_raw};
    use crate::encoding::DataType;
    use crate::format::{HEADER_LEN_V1, HEADER_LEN_V2};
    use crate::messages::{Heartbeat, MavState, Sensor6DofImu, TestMessage};
    use alloc::vec::Vec;

    const SYSTEM: SystemId = SystemId::new(3);
    const COMPONENT: ComponentId = ComponentId::new(7);

    fn known() -> [MessageInfo; 2] {
        [
            MessageInfo::of::<Heartbeat>(),
            MessageInfo::of::<TestMessage>(),
        ]
    }

    fn encoded<T: crate::encoding::Serialize>(message: &T, sequence: u8) -> Vec<u8> {
        let mut buffer = [0u8; MAX_PACKET_LEN];
        let len = encode(&mut buffer, message, SYSTEM, COMPONENT, sequence);
        buffer[..len].to_vec()
    }

    fn parse_all(parser: &mut FrameParser, bytes: &[u8]) -> Vec<RawFrame> {
        let lookup = known();
        let mut frames = Vec::new();
        parser.push_bytes(bytes, &lookup[..], |frame| frames.push(frame.clone()));
        frames
    }

    fn test_message(field1: u32) -> TestMessage {
        TestMessage {
            field1,
            field2: 1.5,
        }
    }

    #[test]
    fn parses_single_frame() {
        let bytes = encoded(&test_message(11), 9);
        let mut parser = FrameParser::new();
        let frames = parse_all(&mut parser, &bytes);

        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame.version, Version::V2);
        assert_eq!(frame.sequence, 9);
        assert_eq!(frame.system, SYSTEM);
        assert_eq!(frame.component, COMPONENT);
        assert_eq!(frame.message, TestMessage::ID);
        assert_eq!(crate::codec::decode(frame), Some(test_message(11)));
        assert_eq!(parser.stats().frames, 1);
    }

    #[test]
    fn skips_leading_garbage() {
        let mut bytes = Vec::from([0x00, 0x13, 0x55, 0xaa]);
        bytes.extend(encoded(&test_message(1), 0));
        let mut parser = FrameParser::new();
        assert_eq!(parse_all(&mut parser, &bytes).len(), 1);
    }

    #[test]
    fn corrupted_frame_does_not_hide_next() {
        let mut corrupted = encoded(&test_message(1), 0);
        corrupted[HEADER_LEN_V2] ^= 0xff;
        let mut bytes = corrupted;
        bytes.extend(encoded(&test_message(2), 1));

        let mut parser = FrameParser::new();
        let frames = parse_all(&mut parser, &bytes);
        assert_eq!(frames.len(), 1);
        assert_eq!(crate::codec::decode(&frames[0]), Some(test_message(2)));
        assert_eq!(parser.stats().bad_checksum, 1);
    }

    #[test]
    fn stray_start_marker_before_frame() {
        for prefix in [&[0xfd][..], &[0xfe], &[0xfd, 0x00, 0x00]] {
            let mut bytes = prefix.to_vec();
            bytes.extend(encoded(&test_message(1), 0));

            let mut parser = FrameParser::new();
            let frames = parse_all(&mut parser, &bytes);
            assert_eq!(frames.len(), 1, "prefix {prefix:02x?}");
            assert_eq!(crate::codec::decode(&frames[0]), Some(test_message(1)));
        }
    }

    #[test]
    fn truncated_frame_before_frame() {
        let next = encoded(&test_message(2), 1);
        let truncated = encoded(&test_message(1), 0);

        for cut in 1..truncated.len() {
            let mut bytes = truncated[..cut].to_vec();
            bytes.extend_from_slice(&next);

            let mut parser = FrameParser::new();
            let frames = parse_all(&mut parser, &bytes);
            assert_eq!(frames.len(), 1, "cut at {cut}");
            assert_eq!(crate::codec::decode(&frames[0]), Some(test_message(2)));
        }

        // The header promises a full payload, so the next frame is read as its tail first
        let mut bytes = truncated[..12].to_vec();
        bytes.extend_from_slice(&next);
        let mut parser = FrameParser::new();
        assert_eq!(parse_all(&mut parser, &bytes).len(), 1);
        assert_eq!(parser.stats().bad_checksum, 1);
        assert_eq!(parser.stats().frames, 1);
    }

    #[test]
    fn poll_drains_buffered_frames() {
        let lookup = [
            MessageInfo::of::<Sensor6DofImu>(),
            MessageInfo::of::<TestMessage>(),
        ];
        // A header whose payload length covers the two frames behind it
        let mut bytes = Vec::from([0xfd, 33, 0, 0, 0, 3, 7]);
        bytes.extend_from_slice(&Sensor6DofImu::ID.to_le_bytes());
        bytes.extend(encoded(&test_message(1), 0));
        bytes.extend(encoded(&TestMessage::default(), 1));
        bytes.extend([0, 0]);
        assert_eq!(bytes.len(), HEADER_LEN_V2 + Sensor6DofImu::LENGTH + CHECKSUM_LEN);

        let (last, rest) = bytes.split_last().unwrap();
        let mut parser = FrameParser::new();
        for &byte in rest {
            assert!(parser.push_byte(byte, &lookup[..]).is_none());
        }

        let first = parser.push_byte(*last, &lookup[..]).cloned().unwrap();
        assert_eq!(first.sequence, 0);
        let second = parser.poll(&lookup[..]).cloned().unwrap();
        assert_eq!(second.sequence, 1);
        assert_eq!(crate::codec::decode(&second), Some(TestMessage::default()));
        assert!(parser.poll(&lookup[..]).is_none());
        assert_eq!(parser.stats().bad_checksum, 1);
    }

    #[test]
    fn unknown_message_dropped() {
        let frame = RawFrame::new(MessageId::from_truncating(77), SYSTEM, COMPONENT)
            .with_payload(&[1, 2, 3])
            .unwrap();
        let mut buffer = [0u8; MAX_PACKET_LEN];
        let len = encode_raw(&mut buffer, &frame, 0);

        let mut bytes = buffer[..len].to_vec();
        bytes.extend(encoded(&test_message(5), 0));

        let mut parser = FrameParser::new();
        let frames = parse_all(&mut parser, &bytes);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].message, TestMessage::ID);
        assert_eq!(parser.stats().unknown_message, 1);
    }

    #[test]
    fn overlong_payload_dropped() {
        let frame = RawFrame::new(TestMessage::ID, SYSTEM, COMPONENT)
            .with_payload(&[1; 12])
            .unwrap();
        let mut buffer = [0u8; MAX_PACKET_LEN];
        let len = encode_raw(&mut buffer, &frame, TestMessage::CRC_EXTRA);

        let mut parser = FrameParser::new();
        assert!(parse_all(&mut parser, &buffer[..len]).is_empty());
        assert_eq!(parser.stats().malformed, 1);
    }

    #[test]
    fn byte_by_byte_across_frames() {
        let heartbeat = Heartbeat {
            system_status: MavState::Active,
            mavlink_version: Heartbeat::MAVLINK_VERSION,
            ..Default::default()
        };
        let mut bytes = encoded(&heartbeat, 0);
        bytes.extend(encoded(&test_message(3), 1));
        bytes.extend(encoded(&heartbeat, 2));

        let mut parser = FrameParser::new();
        let frames = parse_all(&mut parser, &bytes);
        let sequences: Vec<_> = frames.iter().map(|frame| frame.sequence).collect();
        assert_eq!(sequences, [0, 1, 2]);
        assert_eq!(crate::codec::decode(&frames[2]), Some(heartbeat));
    }

    #[test]
    fn signed_frame_keeps_signature() {
        let frame = RawFrame {
            signature: Some([0x5a; SIGNATURE_LEN]),
            sequence: 4,
            ..RawFrame::new(TestMessage::ID, SYSTEM, COMPONENT)
                .with_payload(&[1, 0, 0, 0, 0, 0, 0xc0, 0x3f])
                .unwrap()
        };
        let mut buffer = [0u8; MAX_PACKET_LEN];
        let len = encode_raw(&mut buffer, &frame, TestMessage::CRC_EXTRA);

        let mut parser = FrameParser::new();
        let frames = parse_all(&mut parser, &buffer[..len]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].signature, Some([0x5a; SIGNATURE_LEN]));
        assert_eq!(frames[0].incompat_flags, INCOMPAT_FLAG_SIGNED);
        assert_eq!(crate::codec::decode(&frames[0]), Some(test_message(1)));
    }

    #[test]
    fn unsupported_flags_dropped() {
        let frame = RawFrame {
            incompat_flags: 0x02,
            ..RawFrame::new(TestMessage::ID, SYSTEM, COMPONENT)
                .with_payload(&[1])
                .unwrap()
        };
        let mut buffer = [0u8; MAX_PACKET_LEN];
        let len = encode_raw(&mut buffer, &frame, TestMessage::CRC_EXTRA);

        let mut parser = FrameParser::new();
        assert!(parse_all(&mut parser, &buffer[..len]).is_empty());
        assert_eq!(parser.stats().malformed, 1);
    }

    #[test]
    fn v1_frame() {
        let frame = RawFrame {
            version: Version::V1,
            sequence: 8,
            ..RawFrame::new(Heartbeat::ID, SYSTEM, COMPONENT)
                .with_payload(&[0, 0, 0, 0, 1, 2, 0, 4, 3])
                .unwrap()
        };
        let mut buffer = [0u8; MAX_PACKET_LEN];
        let len = encode_raw(&mut buffer, &frame, Heartbeat::CRC_EXTRA);
        assert_eq!(len, HEADER_LEN_V1 + 9 + CHECKSUM_LEN);

        let mut parser = FrameParser::new();
        let frames = parse_all(&mut parser, &buffer[..len]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].version, Version::V1);
        assert_eq!(frames[0].sequence, 8);
        let heartbeat: Heartbeat = crate::codec::decode(&frames[0]).unwrap();
        assert_eq!(heartbeat.system_status, MavState::Active);
    }

    #[test]
    fn reset_discards_partial_frame() {
        let bytes = encoded(&test_message(6), 0);
        let mut parser = FrameParser::new();
        assert!(parse_all(&mut parser, &bytes[..5]).is_empty());
        parser.reset();
        assert_eq!(parse_all(&mut parser, &bytes).len(), 1);
    }
}
