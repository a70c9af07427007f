//! Agent types and their defaults.

pub mod agent;
pub mod air_defence;
pub mod armour;
pub mod group;

pub use agent::{AgentOptions, Placement, RetAgent};
pub use air_defence::{AirDefenceAgent, DEFAULT_JAMMING_RANGE};
pub use armour::{default_ground_sensor, ArmourAgent, ARMOUR_BASE_SPEED};
pub use group::GroupAgent;
