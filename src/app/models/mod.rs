//! Models shipped with the crate, selectable by `model_name`.

pub mod armour_engagement;

pub use armour_engagement::ArmourEngagementModel;

use crate::core::registry::{BaseRetModel, ModelRegistry};
use std::sync::Arc;

pub fn builtin_registry() -> ModelRegistry {
    let mut registry = ModelRegistry::new();
    registry.register(Arc::new(BaseRetModel));
    registry.register(Arc::new(ArmourEngagementModel));
    registry
}
