use crate::domain::AgentId;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Order in which agents act within a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Schedule {
    /// Creation order, every step.
    #[default]
    BaseScheduler,
    /// A fresh shuffle every step.
    RandomActivation,
}

impl Schedule {
    pub fn order(&self, mut ids: Vec<AgentId>, rng: &mut StdRng) -> Vec<AgentId> {
        match self {
            Schedule::BaseScheduler => ids.sort(),
            Schedule::RandomActivation => ids.shuffle(rng),
        }
        ids
    }
}
