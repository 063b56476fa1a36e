use crate::core::MessageId;
use crate::encoding::{
    DataType, Deserialize, DeserializeError, FieldSpec, ReadCursor, Serialize, WriteCursor,
    crc_extra,
};

/// A simple (de)serializable type for tests and link checks
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TestMessage {
    pub field1: u32,
    pub field2: f32,
}

impl DataType for TestMessage {
    const ID: MessageId = MessageId::from_truncating(9000);
    const NAME: &'static str = "TEST_MESSAGE";
    const MIN_LENGTH: usize = 8;
    const LENGTH: usize = 8;
    const CRC_EXTRA: u8 = crc_extra(
        Self::NAME,
        &[
            FieldSpec::scalar("uint32_t", "field1"),
            FieldSpec::scalar("float", "field2"),
        ],
    );
}

impl Serialize for TestMessage {
    fn serialize(&self, cursor: &mut WriteCursor<'_>) {
        cursor.write_u32(self.field1);
        cursor.write_f32(self.field2);
    }
}

impl Deserialize for TestMessage {
    fn deserialize(cursor: &mut ReadCursor<'_>) -> Result<Self, DeserializeError> {
        Ok(Self {
            field1: cursor.read_u32(),
            field2: cursor.read_f32(),
        })
    }
}
