use super::agent::{AgentOptions, Placement};
use super::armour::build_ground_vehicle;
use crate::core::behaviours::{Behaviour, BehaviourKind, DisableCommunicationBehaviour};
use crate::core::model::RetModel;
use crate::core::weapons::default_armour_weapon;
use crate::domain::{AgentId, AgentType, Affiliation};
use crate::utils::error::Result;

/// Range of the default jammer carried by air defence units.
pub const DEFAULT_JAMMING_RANGE: f64 = 5000.0;

/// Ground based air defence. Moves like armour and jams hostile communications nearby.
pub struct AirDefenceAgent;

impl AirDefenceAgent {
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
        let mut agent = build_ground_vehicle(
            model,
            placement.into(),
            name.into(),
            affiliation,
            AgentType::AirDefence,
            options,
            vec![default_armour_weapon()],
        )?;
        agent.behaviour_pool.add_default_behaviour(
            Behaviour::DisableCommunication(DisableCommunicationBehaviour::all_hostile_in_range(
                DEFAULT_JAMMING_RANGE,
            )),
            BehaviourKind::DisableCommunication,
        );
        Ok(model.add_agent(agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::behaviours::{
        AlwaysAdder, FireBehaviour, HideBehaviour, MoveBehaviour, SenseBehaviour, WaitBehaviour, STEP_HANDLER,
    };
    use crate::testing::MockModel2d;
    use chrono::Duration;
    use std::sync::Arc;

    fn air_defence(options: AgentOptions) -> (RetModel, AgentId) {
        let mut model = MockModel2d::build();
        let id = AirDefenceAgent::with_options(
            &mut model,
            (0.0, 0.0),
            "Air Defence Agent Under Test",
            Affiliation::Friendly,
            options,
        )
        .unwrap();
        (model, id)
    }

    #[test]
    fn test_init_no_behaviour() {
        let cases = [
            (BehaviourKind::Wait, 1),
            (BehaviourKind::Move, 1),
            (BehaviourKind::GroundBasedMove, 1),
            (BehaviourKind::Fire, 1),
            (BehaviourKind::DeployCountermeasure, 0),
            (BehaviourKind::CommunicateWorldview, 0),
            (BehaviourKind::CommunicateMissionMessage, 0),
            (BehaviourKind::CommunicateOrders, 0),
            (BehaviourKind::DisableCommunication, 1),
            (BehaviourKind::Sense, 1),
            (BehaviourKind::Hide, 1),
        ];
        let (model, id) = air_defence(AgentOptions::default());
        let agent = model.agent(id).unwrap();
        assert_eq!(agent.agent_type, AgentType::AirDefence);

        for (kind, expected) in cases {
            let behaviours = agent.behaviour_pool.expose_behaviour(STEP_HANDLER, kind);
            assert_eq!(behaviours.len(), expected, "{:?}", kind);
        }
    }

    #[test]
    fn test_default_weapon_matches_armour() {
        let (model, id) = air_defence(AgentOptions::default());
        assert_eq!(model.agent(id).unwrap().weapons, vec![default_armour_weapon()]);

        let (model, id) = air_defence(AgentOptions {
            weapons: Some(vec![]),
            ..Default::default()
        });
        assert!(model.agent(id).unwrap().weapons.is_empty());
    }

    fn custom_behaviours() -> Vec<(BehaviourKind, Behaviour)> {
        vec![
            (BehaviourKind::Wait, Behaviour::Wait(WaitBehaviour)),
            (BehaviourKind::Hide, Behaviour::Hide(HideBehaviour)),
            (
                BehaviourKind::GroundBasedMove,
                Behaviour::Move(MoveBehaviour::ground_based(0.0, vec![])),
            ),
            (BehaviourKind::Fire, Behaviour::Fire(FireBehaviour::default())),
            (
                BehaviourKind::DisableCommunication,
                Behaviour::DisableCommunication(DisableCommunicationBehaviour::all_hostile_in_range(1.0)),
            ),
            (
                BehaviourKind::Sense,
                Behaviour::Sense(SenseBehaviour::new(Duration::seconds(0), Duration::seconds(5))),
            ),
        ]
    }

    #[test]
    fn test_init_with_custom_behaviour() {
        for (kind, behaviour) in custom_behaviours() {
            let (model, id) = air_defence(AgentOptions {
                behaviours: vec![behaviour.clone()],
                ..Default::default()
            });
            let agent = model.agent(id).unwrap();
            assert_eq!(
                agent.behaviour_pool.expose_behaviour(STEP_HANDLER, kind),
                vec![&behaviour],
                "{:?}",
                kind
            );
        }
    }

    #[test]
    fn test_adding_behaviours_to_existing_agent() {
        let mut cases = custom_behaviours();
        cases[2] = (
            BehaviourKind::AircraftMove,
            Behaviour::Move(MoveBehaviour::aircraft(0.0, None)),
        );

        for (kind, behaviour) in cases {
            let (mut model, id) = air_defence(AgentOptions {
                behaviours: vec![behaviour.clone()],
                behaviour_adder: Some(Arc::new(AlwaysAdder)),
                ..Default::default()
            });
            let agent = model.agent_mut(id).unwrap();
            assert_eq!(
                agent.behaviour_pool.expose_behaviour(STEP_HANDLER, kind),
                vec![&behaviour]
            );

            agent.behaviour_pool.add_behaviour(behaviour.clone());
            assert_eq!(agent.behaviour_pool.expose_behaviour(STEP_HANDLER, kind).len(), 2);
        }
    }

    #[test]
    fn test_default_jammer_disables_hostile_comms() {
        let mut model = MockModel2d::build();
        let jammer = AirDefenceAgent::new(&mut model, (0.0, 0.0), "Jammer", Affiliation::Friendly).unwrap();
        let near = AirDefenceAgent::new(&mut model, (100.0, 0.0), "Near", Affiliation::Hostile).unwrap();
        let far = AirDefenceAgent::new(&mut model, (9000.0, 0.0), "Far", Affiliation::Hostile).unwrap();

        let mut agent = model.take_agent(jammer).unwrap();
        let Some(Behaviour::DisableCommunication(b)) =
            agent.behaviour_pool.satisfy(BehaviourKind::DisableCommunication)
        else {
            panic!("no jammer");
        };
        assert_eq!(b.step(&mut agent, &mut model), 1);
        model.return_agent(agent);

        assert!(model.agent(near).unwrap().communications_disabled);
        assert!(!model.agent(far).unwrap().communications_disabled);
    }
}
