// Domain layer: identifiers, enums and coordinates shared by every simulation module, plus ports.

pub mod model;
pub mod ports;

pub use model::{AgentCasualtyState, AgentId, AgentType, Affiliation, Confidence, Coordinate};
