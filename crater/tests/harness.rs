use std::sync::Arc;

use crater::MAX_PACKET_LEN;
use crater::channel::{Channel, Receiver, Sender};
use crater::clock::VirtualClock;
use crater::codec::{decode, encode};
use crater::core::{SystemId, Timestamp};
use crater::encoding::{MessageInfo, Serialize};
use crater::error::{Error, ErrorCode};
use crater::exec::{Context, FnNode};
use crater::frame::RawFrame;
use crater::harness::Harness;
use crater::messages::{
    Heartbeat, ImuSensorId, MavState, Sensor6DofImu, ServoTarget, component,
};
use crater::parser::FrameParser;
use crater::reader::InputChannel;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;

const GROUND: SystemId = SystemId::new(0);
const VEHICLE: SystemId = SystemId::new(1);

fn encoded<T: Serialize>(message: &T, sequence: u8) -> Vec<u8> {
    let mut buffer = [0u8; MAX_PACKET_LEN];
    let len = encode(&mut buffer, message, GROUND, component::SIMULATOR, sequence);
    buffer[..len].to_vec()
}

fn parse(bytes: &[u8]) -> Vec<RawFrame> {
    let lookup = [
        MessageInfo::of::<Heartbeat>(),
        MessageInfo::of::<ServoTarget>(),
    ];
    let mut frames = Vec::new();
    FrameParser::new().push_bytes(bytes, &lookup[..], |frame| frames.push(frame.clone()));
    frames
}

fn imu(timestamp_us: i64) -> Sensor6DofImu {
    Sensor6DofImu {
        timestamp_us,
        imu_id: ImuSensorId::Imu32G,
        acc_x_body_m_s2: 1.0,
        acc_y_body_m_s2: 2.0,
        acc_z_body_m_s2: 9.81,
        gyro_x_body_rad_s: 0.1,
        gyro_y_body_rad_s: 0.2,
        gyro_z_body_rad_s: 0.3,
    }
}

struct Rig {
    harness: Harness,
    clock: Arc<VirtualClock<NoopRawMutex>>,
}

fn controller(
    imu_rx: Receiver<NoopRawMutex, Sensor6DofImu>,
    servo_tx: Sender<NoopRawMutex, ServoTarget>,
    heartbeat_tx: Sender<NoopRawMutex, Heartbeat>,
) -> impl FnMut(&Context) -> crater::error::AnyExpected<()> {
    move |ctx| {
        heartbeat_tx.send(Heartbeat {
            custom_mode: ctx.now().num_ms() as u32,
            system_status: MavState::Active,
            mavlink_version: Heartbeat::MAVLINK_VERSION,
            ..Default::default()
        });

        let sample = imu_rx.try_receive().ok_or(Error::new(ErrorCode::NotReady))?;
        servo_tx.send(ServoTarget {
            timestamp_us: sample.timestamp_us,
            s1_target_deg: sample.acc_x_body_m_s2,
            s2_target_deg: sample.acc_y_body_m_s2,
            s3_target_deg: sample.gyro_x_body_rad_s,
            s4_target_deg: sample.gyro_y_body_rad_s,
        });
        Ok(())
    }
}

fn rig() -> Rig {
    let clock = Arc::new(VirtualClock::<NoopRawMutex>::default());
    let mut harness = Harness::new(InputChannel(1));

    let imu = Channel::<NoopRawMutex, Sensor6DofImu>::new();
    let servo = Channel::<NoopRawMutex, ServoTarget>::new();
    let heartbeat = Channel::<NoopRawMutex, Heartbeat>::new();

    harness
        .reader_mut()
        .add_binding(imu.sender(), GROUND, component::SIMULATOR)
        .unwrap();
    harness
        .writer_mut()
        .add_channel(heartbeat.receiver(1), VEHICLE, component::ROCKET);
    harness
        .writer_mut()
        .add_channel(servo.receiver(10), VEHICLE, component::ROCKET);

    let context = Context::new(clock.clone());
    harness.executor_mut().add_node(FnNode::new(
        "controller",
        1,
        context,
        controller(imu.receiver(10), servo.sender(), heartbeat.sender()),
    ));

    Rig { harness, clock }
}

#[test]
fn imu_in_servo_out() {
    let mut rig = rig();

    let output = rig.harness.step(&encoded(&imu(1000), 0)).to_vec();
    let frames = parse(&output);
    assert_eq!(frames.len(), 2);

    let heartbeat: Heartbeat = decode(&frames[0]).unwrap();
    assert_eq!(heartbeat.system_status, MavState::Active);
    assert_eq!(frames[0].system, VEHICLE);
    assert_eq!(frames[0].component, component::ROCKET);

    let servo: ServoTarget = decode(&frames[1]).unwrap();
    assert_eq!(servo.timestamp_us, 1000);
    assert_eq!(servo.s1_target_deg, 1.0);
    assert_eq!(servo.s2_target_deg, 2.0);
    assert_eq!(servo.s3_target_deg, 0.1);
    assert_eq!(servo.s4_target_deg, 0.2);
    assert_eq!(frames[1].sequence, 1);
}

#[test]
fn missing_input_is_reported_not_fatal() {
    let mut rig = rig();

    let output = rig.harness.step(&[]).to_vec();
    let frames = parse(&output);
    assert_eq!(frames.len(), 1);
    assert!(decode::<Heartbeat>(&frames[0]).is_some());
    assert_eq!(rig.harness.executor().fault_count(), 1);

    rig.clock.set(Timestamp::from_ms(40));
    let output = rig.harness.step(&encoded(&imu(2000), 1)).to_vec();
    let frames = parse(&output);
    assert_eq!(frames.len(), 2);
    assert_eq!(decode::<Heartbeat>(&frames[0]).unwrap().custom_mode, 40);
    assert_eq!(rig.harness.executor().fault_count(), 1);
}

#[test]
fn input_split_across_steps() {
    let mut rig = rig();
    let bytes = encoded(&imu(3000), 0);
    let (head, tail) = bytes.split_at(12);

    let frames = parse(&rig.harness.step(head).to_vec());
    assert_eq!(frames.len(), 1);

    let frames = parse(&rig.harness.step(tail).to_vec());
    assert_eq!(frames.len(), 2);
    let servo: ServoTarget = decode(&frames[1]).unwrap();
    assert_eq!(servo.timestamp_us, 3000);
}

#[test]
fn foreign_traffic_ignored() {
    let mut rig = rig();

    let mut input = vec![0x00, 0x42];
    // Same message from an unbound sender
    let mut buffer = [0u8; MAX_PACKET_LEN];
    let len = encode(&mut buffer, &imu(1), VEHICLE, component::GROUND_STATION, 0);
    input.extend_from_slice(&buffer[..len]);
    input.extend(encoded(&imu(2), 1));

    let frames = parse(&rig.harness.step(&input).to_vec());
    let servo: ServoTarget = decode(&frames[1]).unwrap();
    assert_eq!(servo.timestamp_us, 2);

    let stats = rig.harness.reader().stats();
    assert_eq!(stats.unbound, 1);
    assert_eq!(stats.dispatched, 1);
    assert_eq!(rig.harness.writer().stats().frames, 2);
}
