//! Triggers decide when an order becomes active.

use crate::core::agents::RetAgent;
use crate::core::feature::{Area, LineFeature};
use crate::core::model::RetModel;
use crate::domain::{AgentId, Coordinate};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
    Immediate,
    ImmediateSensorFusion,
    KilledAgentsAtPosition,
    AliveAgentsAtPosition,
    AgentAtPosition,
    AgentInArea,
    AgentNotInArea,
    AgentCrossedBoundary,
    AgentMovedOutOfArea,
    AgentKilled,
    Time,
    AgentFiredWeapon,
    WeaponFiredNearAgent,
    WeaponFiredNearLocation,
    CompoundAnd,
    CompoundOr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TriggerCondition {
    Immediate,
    /// New perceived information reached the checking agent this step.
    ImmediateSensorFusion,
    KilledAgentsAtPosition {
        position: Coordinate,
        tolerance: f64,
    },
    AliveAgentsAtPosition {
        position: Coordinate,
        tolerance: f64,
    },
    AgentAtPosition {
        agent: AgentId,
        position: Coordinate,
        tolerance: f64,
    },
    AgentInArea {
        agent: AgentId,
        area: Area,
    },
    AgentNotInArea {
        agent: AgentId,
        area: Area,
    },
    AgentCrossedBoundary {
        agent: AgentId,
        boundary: LineFeature,
        last_position: Option<Coordinate>,
    },
    AgentMovedOutOfArea {
        agent: AgentId,
        area: Area,
        was_inside: bool,
    },
    AgentKilled {
        agent: AgentId,
    },
    Time {
        time: NaiveDateTime,
    },
    AgentFiredWeapon {
        agent: AgentId,
    },
    WeaponFiredNearAgent {
        agent: AgentId,
        tolerance: f64,
    },
    WeaponFiredNearLocation {
        position: Coordinate,
        tolerance: f64,
    },
    And(Vec<Trigger>),
    Or(Vec<Trigger>),
}

/// What a trigger can see while being checked.
pub struct TriggerContext<'a> {
    pub model: &'a RetModel,
    /// The agent checking its orders; it is not in the model's agent map while stepping.
    pub checker: &'a RetAgent,
}

impl<'a> TriggerContext<'a> {
    pub fn new(model: &'a RetModel, checker: &'a RetAgent) -> Self {
        Self { model, checker }
    }

    pub fn agent(&self, id: AgentId) -> Option<&'a RetAgent> {
        if id == self.checker.unique_id {
            Some(self.checker)
        } else {
            self.model.agent(id)
        }
    }

    fn agents(&self) -> impl Iterator<Item = &'a RetAgent> + '_ {
        let checker_id = self.checker.unique_id;
        std::iter::once(self.checker).chain(
            self.model
                .agents
                .values()
                .filter(move |a| a.unique_id != checker_id),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    condition: TriggerCondition,
    sticky: bool,
    log: bool,
    invert: bool,
    latched: bool,
}

impl Trigger {
    /// Not sticky, logged, not inverted.
    pub fn new(condition: TriggerCondition) -> Self {
        Self {
            condition,
            sticky: false,
            log: true,
            invert: false,
            latched: false,
        }
    }

    pub fn immediate() -> Self {
        Self::new(TriggerCondition::Immediate)
    }

    pub fn at_time(time: NaiveDateTime) -> Self {
        Self::new(TriggerCondition::Time { time })
    }

    pub fn with_flags(mut self, sticky: bool, log: bool, invert: bool) -> Self {
        self.sticky = sticky;
        self.log = log;
        self.invert = invert;
        self
    }

    pub fn sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    pub fn is_logged(&self) -> bool {
        self.log
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    pub fn condition(&self) -> &TriggerCondition {
        &self.condition
    }

    pub fn trigger_type(&self) -> TriggerType {
        match &self.condition {
            TriggerCondition::Immediate => TriggerType::Immediate,
            TriggerCondition::ImmediateSensorFusion => TriggerType::ImmediateSensorFusion,
            TriggerCondition::KilledAgentsAtPosition { .. } => TriggerType::KilledAgentsAtPosition,
            TriggerCondition::AliveAgentsAtPosition { .. } => TriggerType::AliveAgentsAtPosition,
            TriggerCondition::AgentAtPosition { .. } => TriggerType::AgentAtPosition,
            TriggerCondition::AgentInArea { .. } => TriggerType::AgentInArea,
            TriggerCondition::AgentNotInArea { .. } => TriggerType::AgentNotInArea,
            TriggerCondition::AgentCrossedBoundary { .. } => TriggerType::AgentCrossedBoundary,
            TriggerCondition::AgentMovedOutOfArea { .. } => TriggerType::AgentMovedOutOfArea,
            TriggerCondition::AgentKilled { .. } => TriggerType::AgentKilled,
            TriggerCondition::Time { .. } => TriggerType::Time,
            TriggerCondition::AgentFiredWeapon { .. } => TriggerType::AgentFiredWeapon,
            TriggerCondition::WeaponFiredNearAgent { .. } => TriggerType::WeaponFiredNearAgent,
            TriggerCondition::WeaponFiredNearLocation { .. } => TriggerType::WeaponFiredNearLocation,
            TriggerCondition::And(_) => TriggerType::CompoundAnd,
            TriggerCondition::Or(_) => TriggerType::CompoundOr,
        }
    }

    /// Evaluate, apply inversion, then latch if sticky.
    pub fn check(&mut self, ctx: &TriggerContext<'_>) -> bool {
        if self.sticky && self.latched {
            return true;
        }
        let raw = self.evaluate(ctx);
        let result = raw != self.invert;
        if result && self.sticky {
            self.latched = true;
        }
        result
    }

    fn evaluate(&mut self, ctx: &TriggerContext<'_>) -> bool {
        match &mut self.condition {
            TriggerCondition::Immediate => true,
            TriggerCondition::ImmediateSensorFusion => ctx.checker.new_information,
            TriggerCondition::KilledAgentsAtPosition { position, tolerance } => ctx
                .agents()
                .any(|a| a.killed && a.pos.distance(position) <= *tolerance),
            TriggerCondition::AliveAgentsAtPosition { position, tolerance } => ctx
                .agents()
                .any(|a| !a.killed && a.pos.distance(position) <= *tolerance),
            TriggerCondition::AgentAtPosition {
                agent,
                position,
                tolerance,
            } => ctx
                .agent(*agent)
                .is_some_and(|a| a.pos.distance(position) <= *tolerance),
            TriggerCondition::AgentInArea { agent, area } => {
                ctx.agent(*agent).is_some_and(|a| area.contains(&a.pos))
            }
            TriggerCondition::AgentNotInArea { agent, area } => {
                ctx.agent(*agent).is_some_and(|a| !area.contains(&a.pos))
            }
            TriggerCondition::AgentCrossedBoundary {
                agent,
                boundary,
                last_position,
            } => {
                let Some(current) = ctx.agent(*agent).map(|a| a.pos) else {
                    return false;
                };
                let crossed = last_position
                    .map(|previous| previous != current && boundary.crossed_by(&previous, &current))
                    .unwrap_or(false);
                *last_position = Some(current);
                crossed
            }
            TriggerCondition::AgentMovedOutOfArea {
                agent,
                area,
                was_inside,
            } => {
                let Some(inside) = ctx.agent(*agent).map(|a| area.contains(&a.pos)) else {
                    return false;
                };
                let moved_out = *was_inside && !inside;
                *was_inside = inside;
                moved_out
            }
            TriggerCondition::AgentKilled { agent } => ctx.agent(*agent).is_some_and(|a| a.killed),
            TriggerCondition::Time { time } => ctx.model.get_time() >= *time,
            TriggerCondition::AgentFiredWeapon { agent } => {
                ctx.model.recent_weapon_fire().any(|e| e.firer == *agent)
            }
            TriggerCondition::WeaponFiredNearAgent { agent, tolerance } => {
                let Some(pos) = ctx.agent(*agent).map(|a| a.pos) else {
                    return false;
                };
                ctx.model
                    .recent_weapon_fire()
                    .any(|e| e.location.distance(&pos) <= *tolerance)
            }
            TriggerCondition::WeaponFiredNearLocation { position, tolerance } => ctx
                .model
                .recent_weapon_fire()
                .any(|e| e.location.distance(position) <= *tolerance),
            // every sub-trigger is checked so stateful ones stay current
            TriggerCondition::And(triggers) => triggers
                .iter_mut()
                .map(|t| t.check(ctx))
                .fold(true, |acc, r| acc && r),
            TriggerCondition::Or(triggers) => triggers
                .iter_mut()
                .map(|t| t.check(ctx))
                .fold(false, |acc, r| acc || r),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.trigger_type())?;
        if self.invert {
            write!(f, " (inverted)")?;
        }
        Ok(())
    }
}
