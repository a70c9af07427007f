use crate::core::agents::RetAgent;
use crate::core::model::{EventCategory, RetModel};
use crate::domain::Coordinate;
use std::collections::BTreeMap;

/// Speed multiplier for gradients in `(low, high]`.
pub type GradientSpeedModifier = ((f64, f64), f64);

#[derive(Debug, Clone, PartialEq)]
pub enum MoveKind {
    GroundBased {
        gradient_speed_modifiers: Vec<GradientSpeedModifier>,
        culture_speed_modifiers: BTreeMap<String, f64>,
    },
    Aircraft {
        altitude: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveBehaviour {
    /// Distance units per second before modifiers.
    pub base_speed: f64,
    pub kind: MoveKind,
}

impl MoveBehaviour {
    pub fn ground_based(base_speed: f64, gradient_speed_modifiers: Vec<GradientSpeedModifier>) -> Self {
        Self {
            base_speed,
            kind: MoveKind::GroundBased {
                gradient_speed_modifiers,
                culture_speed_modifiers: BTreeMap::new(),
            },
        }
    }

    pub fn with_culture_speed_modifiers(mut self, modifiers: BTreeMap<String, f64>) -> Self {
        if let MoveKind::GroundBased {
            culture_speed_modifiers,
            ..
        } = &mut self.kind
        {
            *culture_speed_modifiers = modifiers;
        }
        self
    }

    pub fn aircraft(base_speed: f64, altitude: Option<f64>) -> Self {
        Self {
            base_speed,
            kind: MoveKind::Aircraft { altitude },
        }
    }

    pub fn is_ground_based(&self) -> bool {
        matches!(self.kind, MoveKind::GroundBased { .. })
    }

    /// Product of the gradient and culture modifiers for a move from `from` to `to`.
    pub fn speed_modifier(&self, model: &RetModel, from: &Coordinate, to: &Coordinate) -> f64 {
        match &self.kind {
            MoveKind::Aircraft { .. } => 1.0,
            MoveKind::GroundBased {
                gradient_speed_modifiers,
                culture_speed_modifiers,
            } => {
                let gradient = model.space.gradient_between(from, to);
                let gradient_modifier = gradient_speed_modifiers
                    .iter()
                    .find(|((low, high), _)| gradient > *low && gradient <= *high)
                    .map(|(_, m)| *m)
                    .unwrap_or(1.0);
                let culture_modifier = model
                    .space
                    .culture_at(from)
                    .and_then(|c| culture_speed_modifiers.get(&c.name))
                    .copied()
                    .unwrap_or(1.0);
                gradient_modifier * culture_modifier
            }
        }
    }

    /// Move one time step towards `destination`. Returns whether it is within `tolerance`.
    pub fn step(&self, agent: &mut RetAgent, model: &mut RetModel, destination: Coordinate, tolerance: f64) -> bool {
        let destination = model.space.clamp(destination);
        if agent.pos.horizontal_distance(&destination) <= tolerance {
            return true;
        }

        let seconds = model.time_step().num_milliseconds() as f64 / 1000.0;
        let full_step = self.base_speed * seconds;
        let probe = agent.pos.to_2d().step_towards(&destination.to_2d(), full_step);
        let modifier = self.speed_modifier(model, &agent.pos, &probe);
        let distance = full_step * modifier;

        let horizontal = agent.pos.to_2d().step_towards(&destination.to_2d(), distance);
        let new_pos = match &self.kind {
            MoveKind::GroundBased { .. } => model.space.place_on_ground(horizontal),
            MoveKind::Aircraft { altitude } => match (model.space.dimensions, altitude, agent.pos.z()) {
                (3, Some(altitude), _) => horizontal.with_z(*altitude),
                (3, None, Some(z)) => horizontal.with_z(z),
                _ => horizontal,
            },
        };

        agent.hiding = false;
        agent.pos = new_pos;
        model.log_event(
            EventCategory::Behaviour,
            Some(agent.unique_id),
            format!("{} moved to {}", agent.name, new_pos),
        );

        agent.pos.horizontal_distance(&destination) <= tolerance
    }
}
