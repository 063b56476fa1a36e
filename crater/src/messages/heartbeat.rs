use crate::core::{InvalidValue, MessageId};
use crate::encoding::{
    DataType, Deserialize, DeserializeError, FieldSpec, ReadCursor, Serialize, WriteCursor,
    crc_extra,
};

/// System status flag, the `MAV_STATE` enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MavState {
    #[default]
    Uninit = 0,
    Boot = 1,
    Calibrating = 2,
    Standby = 3,
    Active = 4,
    Critical = 5,
    Emergency = 6,
    Poweroff = 7,
    FlightTermination = 8,
}

impl TryFrom<u8> for MavState {
    type Error = InvalidValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MavState::Uninit),
            1 => Ok(MavState::Boot),
            2 => Ok(MavState::Calibrating),
            3 => Ok(MavState::Standby),
            4 => Ok(MavState::Active),
            5 => Ok(MavState::Critical),
            6 => Ok(MavState::Emergency),
            7 => Ok(MavState::Poweroff),
            8 => Ok(MavState::FlightTermination),
            _ => Err(InvalidValue),
        }
    }
}

/// Presence announcement, `HEARTBEAT` from the common dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Heartbeat {
    pub custom_mode: u32,
    pub mav_type: u8,
    pub autopilot: u8,
    pub base_mode: u8,
    pub system_status: MavState,
    pub mavlink_version: u8,
}

impl Heartbeat {
    pub const MAVLINK_VERSION: u8 = 3;
}

impl DataType for Heartbeat {
    const ID: MessageId = MessageId::MIN;
    const NAME: &'static str = "HEARTBEAT";
    const MIN_LENGTH: usize = 9;
    const LENGTH: usize = 9;
    const CRC_EXTRA: u8 = crc_extra(
        Self::NAME,
        &[
            FieldSpec::scalar("uint32_t", "custom_mode"),
            FieldSpec::scalar("uint8_t", "type"),
            FieldSpec::scalar("uint8_t", "autopilot"),
            FieldSpec::scalar("uint8_t", "base_mode"),
            FieldSpec::scalar("uint8_t", "system_status"),
            FieldSpec::scalar("uint8_t", "mavlink_version"),
        ],
    );
}

impl Serialize for Heartbeat {
    fn serialize(&self, cursor: &mut WriteCursor<'_>) {
        cursor.write_u32(self.custom_mode);
        cursor.write_u8(self.mav_type);
        cursor.write_u8(self.autopilot);
        cursor.write_u8(self.base_mode);
        cursor.write_u8(self.system_status as u8);
        cursor.write_u8(self.mavlink_version);
    }
}

impl Deserialize for Heartbeat {
    fn deserialize(cursor: &mut ReadCursor<'_>) -> Result<Self, DeserializeError> {
        let custom_mode = cursor.read_u32();
        let mav_type = cursor.read_u8();
        let autopilot = cursor.read_u8();
        let base_mode = cursor.read_u8();
        let system_status =
            MavState::try_from(cursor.read_u8()).map_err(|_| DeserializeError::FieldValue)?;
        let mavlink_version = cursor.read_u8();

        Ok(Self {
            custom_mode,
            mav_type,
            autopilot,
            base_mode,
            system_status,
            mavlink_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_extra_matches_common_dialect() {
        assert_eq!(Heartbeat::CRC_EXTRA, 50);
    }

    #[test]
    fn rejects_unknown_state() {
        let bytes = [0, 0, 0, 0, 2, 3, 0x51, 9, 3];
        let result = Heartbeat::deserialize(&mut ReadCursor::new(&bytes));
        assert_eq!(result, Err(DeserializeError::FieldValue));
    }
}
