use super::agent::{AgentOptions, Placement, RetAgent};
use crate::core::behaviours::{
    Behaviour, BehaviourKind, FireBehaviour, HideBehaviour, MoveBehaviour, SenseBehaviour, WaitBehaviour,
};
use crate::core::model::RetModel;
use crate::core::sensing::{LineOfSightSensor, Sensor, SensorDistanceThresholds, SensorSamplingDistance};
use crate::core::weapons::{default_armour_weapon, Weapon};
use crate::domain::{AgentId, AgentType, Affiliation};
use crate::utils::error::Result;
use chrono::Duration;
use std::collections::BTreeMap;
use std::sync::Arc;

pub const ARMOUR_BASE_SPEED: f64 = 0.015;

/// Line of sight sensor fitted to ground vehicles unless the caller supplies sensors.
pub fn default_ground_sensor() -> Result<Arc<dyn Sensor>> {
    Ok(Arc::new(LineOfSightSensor::new(
        SensorDistanceThresholds::new(200_000.0, 150_000.0, 75_000.0)?,
        SensorSamplingDistance {
            sampling_distance: 25_000.0,
        },
    )))
}

/// Every culture in the space at 1.0, unless the caller gave modifiers.
fn culture_speed_modifiers(model: &RetModel, given: Option<BTreeMap<String, f64>>) -> BTreeMap<String, f64> {
    given.unwrap_or_else(|| {
        model
            .space
            .get_cultures()
            .iter()
            .map(|c| (c.name.clone(), 1.0))
            .collect()
    })
}

/// Wait, Hide, ground move, Sense and Fire, each only when nothing of that kind was supplied.
pub(crate) fn add_ground_vehicle_defaults(agent: &mut RetAgent, culture_modifiers: BTreeMap<String, f64>) {
    let pool = &mut agent.behaviour_pool;
    pool.add_default_behaviour(Behaviour::Wait(WaitBehaviour), BehaviourKind::Wait);
    pool.add_default_behaviour(Behaviour::Hide(HideBehaviour), BehaviourKind::Hide);
    pool.add_default_behaviour(
        Behaviour::Move(
            MoveBehaviour::ground_based(
                ARMOUR_BASE_SPEED,
                vec![
                    ((f64::NEG_INFINITY, -1.1), 0.8),
                    ((-1.1, 1.1), 1.0),
                    ((1.1, f64::INFINITY), 0.8),
                ],
            )
            .with_culture_speed_modifiers(culture_modifiers),
        ),
        BehaviourKind::Move,
    );
    pool.add_default_behaviour(
        Behaviour::Sense(SenseBehaviour::new(Duration::seconds(0), Duration::seconds(5))),
        BehaviourKind::Sense,
    );
    pool.add_default_behaviour(Behaviour::Fire(FireBehaviour::default()), BehaviourKind::Fire);
}

pub(crate) fn build_ground_vehicle(
    model: &mut RetModel,
    placement: Placement,
    name: String,
    affiliation: Affiliation,
    agent_type: AgentType,
    mut options: AgentOptions,
    default_weapons: Vec<Weapon>,
) -> Result<RetAgent> {
    if options.sensors.is_none() {
        options.sensors = Some(vec![default_ground_sensor()?]);
    }
    if options.weapons.is_none() {
        options.weapons = Some(default_weapons);
    }
    options.critical_dimension = Some(options.critical_dimension.unwrap_or(2.0));
    options.reflectivity = Some(options.reflectivity.unwrap_or(0.081));
    options.temperature = Some(options.temperature.unwrap_or(20.0));
    let culture_modifiers = culture_speed_modifiers(model, options.culture_speed_modifiers.take());

    let mut agent = RetAgent::build(model, placement, name, affiliation, agent_type, options)?;
    add_ground_vehicle_defaults(&mut agent, culture_modifiers);
    Ok(agent)
}

/// Tracked armour with a long ranged gun.
pub struct ArmourAgent;

impl ArmourAgent {
    pub fn new(
        model: &mut RetModel,
        placement: impl Into<Placement>,
        name: impl Into<String>,
        affiliation: Affiliation,
    ) -> Result<AgentId> {
        Self::with_options(model, placement, name, affiliation, AgentOptions::default())
    }

    pub fn with_options(
        model: &mut RetModel,
        placement: impl Into<Placement>,
        name: impl Into<String>,
        affiliation: Affiliation,
        options: AgentOptions,
    ) -> Result<AgentId> {
        let agent = build_ground_vehicle(
            model,
            placement.into(),
            name.into(),
            affiliation,
            AgentType::Armour,
            options,
            vec![default_armour_weapon()],
        )?;
        Ok(model.add_agent(agent))
    }
}
