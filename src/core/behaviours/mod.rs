//! Behaviours: the ways an agent can act. Orders decide when; behaviours decide how.

pub mod communicate;
pub mod fire;
pub mod movement;
pub mod pool;
pub mod sense;

pub use communicate::{
    CommunicateMissionMessageBehaviour, CommunicateOrdersBehaviour, CommunicateWorldviewBehaviour,
    CommunicationReceiver, DisableCommunicationBehaviour, MessageKind,
};
pub use fire::{DefaultHostileTargetResolver, FireBehaviour};
pub use movement::{GradientSpeedModifier, MoveBehaviour, MoveKind};
pub use pool::{AlwaysAdder, BehaviourPool, ListAdder, NeverAdder, ReplaceAdder, STEP_HANDLER};
pub use sense::SenseBehaviour;

use crate::core::agents::RetAgent;
use crate::core::model::{EventCategory, RetModel};
use crate::core::sensing::Countermeasure;
use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviourKind {
    Wait,
    Hide,
    Move,
    GroundBasedMove,
    AircraftMove,
    Sense,
    Fire,
    DeployCountermeasure,
    CommunicateWorldview,
    CommunicateMissionMessage,
    CommunicateOrders,
    DisableCommunication,
}

impl BehaviourKind {
    /// Kinds sharing a category replace each other in a pool.
    pub fn category(self) -> BehaviourKind {
        match self {
            BehaviourKind::GroundBasedMove | BehaviourKind::AircraftMove => BehaviourKind::Move,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WaitBehaviour;

impl WaitBehaviour {
    pub fn step(&self, agent: &mut RetAgent, model: &mut RetModel) {
        model.log_event(
            EventCategory::Behaviour,
            Some(agent.unique_id),
            format!("{} waiting", agent.name),
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HideBehaviour;

impl HideBehaviour {
    pub fn step(&self, agent: &mut RetAgent, model: &mut RetModel) {
        agent.hiding = true;
        model.log_event(
            EventCategory::Behaviour,
            Some(agent.unique_id),
            format!("{} hiding", agent.name),
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeployCountermeasureBehaviour {
    pub radius: f64,
    pub duration: Duration,
}

impl Default for DeployCountermeasureBehaviour {
    fn default() -> Self {
        Self {
            radius: 50.0,
            duration: Duration::minutes(5),
        }
    }
}

impl DeployCountermeasureBehaviour {
    pub fn step(&self, agent: &mut RetAgent, model: &mut RetModel) {
        let now = model.get_time();
        model.countermeasures.push(Countermeasure {
            owner: agent.unique_id,
            centre: agent.pos,
            radius: self.radius,
            deployed_at: now,
            expires_at: now + self.duration,
        });
        model.log_event(
            EventCategory::Behaviour,
            Some(agent.unique_id),
            format!("{} deployed countermeasure at {}", agent.name, agent.pos),
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Behaviour {
    Wait(WaitBehaviour),
    Hide(HideBehaviour),
    Move(MoveBehaviour),
    Sense(SenseBehaviour),
    Fire(FireBehaviour),
    DeployCountermeasure(DeployCountermeasureBehaviour),
    CommunicateWorldview(CommunicateWorldviewBehaviour),
    CommunicateMissionMessage(CommunicateMissionMessageBehaviour),
    CommunicateOrders(CommunicateOrdersBehaviour),
    DisableCommunication(DisableCommunicationBehaviour),
}

impl Behaviour {
    /// Most specific kind of this behaviour.
    pub fn kind(&self) -> BehaviourKind {
        match self {
            Behaviour::Wait(_) => BehaviourKind::Wait,
            Behaviour::Hide(_) => BehaviourKind::Hide,
            Behaviour::Move(m) if m.is_ground_based() => BehaviourKind::GroundBasedMove,
            Behaviour::Move(_) => BehaviourKind::AircraftMove,
            Behaviour::Sense(_) => BehaviourKind::Sense,
            Behaviour::Fire(_) => BehaviourKind::Fire,
            Behaviour::DeployCountermeasure(_) => BehaviourKind::DeployCountermeasure,
            Behaviour::CommunicateWorldview(_) => BehaviourKind::CommunicateWorldview,
            Behaviour::CommunicateMissionMessage(_) => BehaviourKind::CommunicateMissionMessage,
            Behaviour::CommunicateOrders(_) => BehaviourKind::CommunicateOrders,
            Behaviour::DisableCommunication(_) => BehaviourKind::DisableCommunication,
        }
    }

    pub fn is_a(&self, kind: BehaviourKind) -> bool {
        let own = self.kind();
        own == kind || own.category() == kind
    }
}
