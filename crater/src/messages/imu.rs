use crate::core::{InvalidValue, MessageId};
use crate::encoding::{
    DataType, Deserialize, DeserializeError, FieldSpec, ReadCursor, Serialize, WriteCursor,
    crc_extra,
};

/// Physical IMU a sample originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ImuSensorId {
    #[default]
    Imu16G = 0,
    Imu32G = 1,
}

impl TryFrom<u8> for ImuSensorId {
    type Error = InvalidValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ImuSensorId::Imu16G),
            1 => Ok(ImuSensorId::Imu32G),
            _ => Err(InvalidValue),
        }
    }
}

/// Body-frame accelerometer and gyroscope sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sensor6DofImu {
    pub timestamp_us: i64,
    pub imu_id: ImuSensorId,
    pub acc_x_body_m_s2: f32,
    pub acc_y_body_m_s2: f32,
    pub acc_z_body_m_s2: f32,
    pub gyro_x_body_rad_s: f32,
    pub gyro_y_body_rad_s: f32,
    pub gyro_z_body_rad_s: f32,
}

impl DataType for Sensor6DofImu {
    const ID: MessageId = MessageId::from_truncating(9001);
    const NAME: &'static str = "SENSOR_6DOF_IMU";
    const MIN_LENGTH: usize = 33;
    const LENGTH: usize = 33;
    const CRC_EXTRA: u8 = crc_extra(
        Self::NAME,
        &[
            FieldSpec::scalar("int64_t", "timestamp_us"),
            FieldSpec::scalar("float", "acc_x_body_m_s2"),
            FieldSpec::scalar("float", "acc_y_body_m_s2"),
            FieldSpec::scalar("float", "acc_z_body_m_s2"),
            FieldSpec::scalar("float", "gyro_x_body_rad_s"),
            FieldSpec::scalar("float", "gyro_y_body_rad_s"),
            FieldSpec::scalar("float", "gyro_z_body_rad_s"),
            FieldSpec::scalar("uint8_t", "imu_id"),
        ],
    );
}

impl Serialize for Sensor6DofImu {
    fn serialize(&self, cursor: &mut WriteCursor<'_>) {
        cursor.write_i64(self.timestamp_us);
        cursor.write_f32(self.acc_x_body_m_s2);
        cursor.write_f32(self.acc_y_body_m_s2);
        cursor.write_f32(self.acc_z_body_m_s2);
        cursor.write_f32(self.gyro_x_body_rad_s);
        cursor.write_f32(self.gyro_y_body_rad_s);
        cursor.write_f32(self.gyro_z_body_rad_s);
        cursor.write_u8(self.imu_id as u8);
    }
}

impl Deserialize for Sensor6DofImu {
    fn deserialize(cursor: &mut ReadCursor<'_>) -> Result<Self, DeserializeError> {
        let timestamp_us = cursor.read_i64();
        let acc_x_body_m_s2 = cursor.read_f32();
        let acc_y_body_m_s2 = cursor.read_f32();
        let acc_z_body_m_s2 = cursor.read_f32();
        let gyro_x_body_rad_s = cursor.read_f32();
        let gyro_y_body_rad_s = cursor.read_f32();
        let gyro_z_body_rad_s = cursor.read_f32();
        let imu_id =
            ImuSensorId::try_from(cursor.read_u8()).map_err(|_| DeserializeError::FieldValue)?;

        Ok(Self {
            timestamp_us,
            imu_id,
            acc_x_body_m_s2,
            acc_y_body_m_s2,
            acc_z_body_m_s2,
            gyro_x_body_rad_s,
            gyro_y_body_rad_s,
            gyro_z_body_rad_s,
        })
    }
}
