use crate::core::MessageId;
use crate::encoding::{
    DataType, Deserialize, DeserializeError, FieldSpec, ReadCursor, Serialize, WriteCursor,
    crc_extra,
};

/// Commanded deflection of the four fin servos
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoTarget {
    pub timestamp_us: i64,
    pub s1_target_deg: f32,
    pub s2_target_deg: f32,
    pub s3_target_deg: f32,
    pub s4_target_deg: f32,
}

impl DataType for ServoTarget {
    const ID: MessageId = MessageId::from_truncating(9002);
    const NAME: &'static str = "SERVO_TARGET";
    const MIN_LENGTH: usize = 24;
    const LENGTH: usize = 24;
    const CRC_EXTRA: u8 = crc_extra(
        Self::NAME,
        &[
            FieldSpec::scalar("int64_t", "timestamp_us"),
            FieldSpec::scalar("float", "s1_target_deg"),
            FieldSpec::scalar("float", "s2_target_deg"),
            FieldSpec::scalar("float", "s3_target_deg"),
            FieldSpec::scalar("float", "s4_target_deg"),
        ],
    );
}

impl Serialize for ServoTarget {
    fn serialize(&self, cursor: &mut WriteCursor<'_>) {
        cursor.write_i64(self.timestamp_us);
        cursor.write_f32(self.s1_target_deg);
        cursor.write_f32(self.s2_target_deg);
        cursor.write_f32(self.s3_target_deg);
        cursor.write_f32(self.s4_target_deg);
    }
}

impl Deserialize for ServoTarget {
    fn deserialize(cursor: &mut ReadCursor<'_>) -> Result<Self, DeserializeError> {
        Ok(Self {
            timestamp_us: cursor.read_i64(),
            s1_target_deg: cursor.read_f32(),
            s2_target_deg: cursor.read_f32(),
            s3_target_deg: cursor.read_f32(),
            s4_target_deg: cursor.read_f32(),
        })
    }
}
