//! (De)serializable Rust representations for the Crater telemetry dialect
//!
//! Includes the common `HEARTBEAT` message plus the sensor and actuator messages exchanged
//! between the flight computer and the simulator.

mod heartbeat;
mod imu;
mod servo;
mod test_message;

pub use heartbeat::{Heartbeat, MavState};
pub use imu::{ImuSensorId, Sensor6DofImu};
pub use servo::ServoTarget;
pub use test_message::TestMessage;

use crate::core::ComponentId;

/// Component identifiers assigned within a Crater vehicle
pub mod component {
    use super::ComponentId;

    pub const ROCKET: ComponentId = ComponentId::new(1);
    pub const GROUND_STATION: ComponentId = ComponentId::new(190);
    pub const SIMULATOR: ComponentId = ComponentId::new(200);
}
