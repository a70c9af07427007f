pub mod perceived_world;
pub mod sensor;

pub use perceived_world::{
    AgentsNear, AliveAgents, FilterChain, FriendlyAgents, HostileAgents, IdentifiedAgents, PerceivedAgent,
    PerceivedAgentFilter, PerceivedWorld, RecentAgents,
};
pub use sensor::{
    ArcOfRegard, Countermeasure, LineOfSightSensor, SenseEnvironment, Sensor, SensorDistanceThresholds,
    SensorSamplingDistance,
};
