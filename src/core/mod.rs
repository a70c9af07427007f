pub mod agents;
pub mod batch;
pub mod behaviours;
pub mod datacollector;
pub mod feature;
pub mod model;
pub mod orders;
pub mod parameters;
pub mod registry;
pub mod sampling;
pub mod schedule;
pub mod sensing;
pub mod space;
pub mod weapons;

pub use crate::domain::ports::Storage;
pub use crate::utils::error::Result;
pub use model::{EventCategory, LogConfig, ModelOptions, RetModel};
pub use registry::{ModelRegistry, RetModelDefinition};
