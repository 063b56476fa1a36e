//! Composition stepped through the C ABI

use crater::channel::{Channel, Receiver, Sender};
use crater::core::{DispatchKey, SystemId};
use crater::error::{AnyExpected, Expected};
use crater::exec::Node;
use crater::harness::Harness;
use crater::messages::{Sensor6DofImu, ServoTarget, component};
use crater::reader::InputChannel;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;

/// System ID shared by the flight computer and its host
pub const SYSTEM: SystemId = SystemId::new(0);

const INPUT: InputChannel = InputChannel(0);
const QUEUE_DEPTH: usize = 10;

/// Maps each IMU sample to a servo command
struct ImuToServo {
    imu: Receiver<NoopRawMutex, Sensor6DofImu>,
    servo: Sender<NoopRawMutex, ServoTarget>,
}

impl Node for ImuToServo {
    fn name(&self) -> &str {
        "imu_to_servo"
    }

    fn id(&self) -> u8 {
        1
    }

    fn step(&mut self) -> AnyExpected<()> {
        if let Some(imu) = self.imu.try_receive() {
            self.servo.send(ServoTarget {
                timestamp_us: imu.timestamp_us,
                s1_target_deg: imu.acc_x_body_m_s2,
                s2_target_deg: imu.acc_y_body_m_s2,
                s3_target_deg: imu.gyro_x_body_rad_s,
                s4_target_deg: imu.gyro_y_body_rad_s,
            });
        }
        Ok(())
    }
}

/// Flight software composition exchanged with the host: IMU samples in, servo targets out
pub struct Bridge {
    harness: Harness,
}

impl Bridge {
    /// Wires the reader, the mapping node and the writer together
    pub fn new() -> Expected<Self, DispatchKey> {
        let imu = Channel::<NoopRawMutex, Sensor6DofImu>::new();
        let servo = Channel::<NoopRawMutex, ServoTarget>::new();

        let mut harness = Harness::new(INPUT);
        harness
            .reader_mut()
            .add_binding(imu.sender(), SYSTEM, component::ROCKET)?;
        harness
            .writer_mut()
            .add_channel(servo.receiver(QUEUE_DEPTH), SYSTEM, component::ROCKET);
        harness.executor_mut().add_node(ImuToServo {
            imu: imu.receiver(QUEUE_DEPTH),
            servo: servo.sender(),
        });

        Ok(Self { harness })
    }

    /// Runs one cycle over `input`, returning the encoded servo targets
    pub fn step(&mut self, input: &[u8]) -> &[u8] {
        self.harness.step(input)
    }
}
