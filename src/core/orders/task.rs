use super::Order;
use crate::core::agents::RetAgent;
use crate::core::behaviours::{Behaviour, BehaviourKind};
use crate::core::model::RetModel;
use crate::domain::Coordinate;
use chrono::{Duration, NaiveDateTime};

/// Work an order asks for. Each variant is carried out by a behaviour from the agent's pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Move {
        destination: Coordinate,
        tolerance: f64,
    },
    Wait {
        duration: Duration,
        started: Option<NaiveDateTime>,
    },
    Hide,
    Sense {
        direction: Option<f64>,
    },
    Fire {
        location: Option<Coordinate>,
    },
    DeployCountermeasure,
    CommunicateWorldview,
    CommunicateOrders {
        orders: Vec<Order>,
    },
    CommunicateMissionMessage {
        message: String,
    },
    DisableCommunication,
}

impl Task {
    pub fn move_to(destination: impl Into<Coordinate>, tolerance: f64) -> Self {
        Task::Move {
            destination: destination.into(),
            tolerance,
        }
    }

    pub fn wait(duration: Duration) -> Self {
        Task::Wait {
            duration,
            started: None,
        }
    }

    pub fn behaviour_kind(&self) -> BehaviourKind {
        match self {
            Task::Move { .. } => BehaviourKind::Move,
            Task::Wait { .. } => BehaviourKind::Wait,
            Task::Hide => BehaviourKind::Hide,
            Task::Sense { .. } => BehaviourKind::Sense,
            Task::Fire { .. } => BehaviourKind::Fire,
            Task::DeployCountermeasure => BehaviourKind::DeployCountermeasure,
            Task::CommunicateWorldview => BehaviourKind::CommunicateWorldview,
            Task::CommunicateOrders { .. } => BehaviourKind::CommunicateOrders,
            Task::CommunicateMissionMessage { .. } => BehaviourKind::CommunicateMissionMessage,
            Task::DisableCommunication => BehaviourKind::DisableCommunication,
        }
    }

    /// Carry out one step of the task. Returns true once the task is complete.
    pub fn execute(&mut self, agent: &mut RetAgent, model: &mut RetModel) -> bool {
        let kind = self.behaviour_kind();
        let Some(behaviour) = agent.behaviour_pool.satisfy(kind) else {
            tracing::warn!("⚠️ {} has no behaviour for {:?}, task skipped", agent.name, kind);
            return false;
        };

        match (self, behaviour) {
            (Task::Move { destination, tolerance }, Behaviour::Move(b)) => {
                b.step(agent, model, *destination, *tolerance)
            }
            (Task::Wait { duration, started }, Behaviour::Wait(b)) => {
                let now = model.get_time();
                let since = *started.get_or_insert(now);
                b.step(agent, model);
                let done = now + model.time_step() >= since + *duration;
                if done {
                    // 持續命令下次觸發時重新計時
                    *started = None;
                }
                done
            }
            (Task::Hide, Behaviour::Hide(b)) => {
                b.step(agent, model);
                true
            }
            (Task::Sense { direction }, Behaviour::Sense(b)) => {
                b.step(agent, model, *direction);
                true
            }
            (Task::Fire { location }, Behaviour::Fire(b)) => {
                b.step(agent, model, *location);
                true
            }
            (Task::DeployCountermeasure, Behaviour::DeployCountermeasure(b)) => {
                b.step(agent, model);
                true
            }
            (Task::CommunicateWorldview, Behaviour::CommunicateWorldview(b)) => {
                b.step(agent, model);
                true
            }
            (Task::CommunicateOrders { orders }, Behaviour::CommunicateOrders(b)) => {
                b.step(agent, model, orders);
                true
            }
            (Task::CommunicateMissionMessage { message }, Behaviour::CommunicateMissionMessage(b)) => {
                b.step(agent, model, message);
                true
            }
            (Task::DisableCommunication, Behaviour::DisableCommunication(b)) => {
                b.step(agent, model);
                true
            }
            // satisfy() only hands back behaviours of the requested kind
            _ => false,
        }
    }
}
