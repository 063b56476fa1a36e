//! Wire frame object

pub use crater_core::MAX_PAYLOAD_LEN;
use crater_core::{ComponentId, DispatchKey, MessageId, SystemId};

/// Length of the optional MAVLink v2 signature block
pub const SIGNATURE_LEN: usize = 13;

pub type Payload = heapless::Vec<u8, MAX_PAYLOAD_LEN>;

/// Protocol generation of a frame, identified by its start marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Version {
    V1,
    V2,
}

impl Version {
    pub const fn start_marker(self) -> u8 {
        match self {
            Version::V1 => 0xfe,
            Version::V2 => 0xfd,
        }
    }

    pub const fn from_start_marker(byte: u8) -> Option<Self> {
        match byte {
            0xfe => Some(Version::V1),
            0xfd => Some(Version::V2),
            _ => None,
        }
    }
}

#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidLength;

/// A delimited frame that passed checksum validation
///
/// The payload is kept as received: MAVLink v2 senders strip trailing zero bytes,
/// so it may be shorter than the message type's declared length.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawFrame {
    pub version: Version,
    pub incompat_flags: u8,
    pub compat_flags: u8,
    pub sequence: u8,
    pub system: SystemId,
    pub component: ComponentId,
    pub message: MessageId,
    pub payload: Payload,
    /// Signature block, present when the frame was signed. It is carried but not verified.
    pub signature: Option<[u8; SIGNATURE_LEN]>,
}

impl RawFrame {
    pub fn new(message: MessageId, system: SystemId, component: ComponentId) -> Self {
        Self {
            version: Version::V2,
            incompat_flags: 0,
            compat_flags: 0,
            sequence: 0,
            system,
            component,
            message,
            payload: Payload::new(),
            signature: None,
        }
    }

    pub fn with_payload(mut self, payload: &[u8]) -> Result<Self, InvalidLength> {
        self.payload = Payload::from_slice(payload).map_err(|_| InvalidLength)?;
        Ok(self)
    }

    pub fn key(&self) -> DispatchKey {
        DispatchKey::new(self.message, self.system, self.component)
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}
