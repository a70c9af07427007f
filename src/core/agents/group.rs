use super::agent::{centroid, AgentOptions, Placement, RetAgent};
use crate::core::behaviours::{Behaviour, BehaviourKind, CommunicateOrdersBehaviour};
use crate::core::model::RetModel;
use crate::domain::{AgentId, AgentType, Affiliation, Coordinate};
use crate::utils::error::{Result, RetError};

/// A formation of agents. Sits at the centroid of its live members and relays orders to them.
pub struct GroupAgent;

impl GroupAgent {
    pub fn new(
        model: &mut RetModel,
        name: impl Into<String>,
        affiliation: Affiliation,
        critical_dimension: f64,
        subordinates: Vec<AgentId>,
    ) -> Result<AgentId> {
        Self::with_options(
            model,
            name,
            affiliation,
            subordinates,
            AgentOptions {
                critical_dimension: Some(critical_dimension),
                ..Default::default()
            },
        )
    }

    pub fn with_options(
        model: &mut RetModel,
        name: impl Into<String>,
        affiliation: Affiliation,
        subordinates: Vec<AgentId>,
        mut options: AgentOptions,
    ) -> Result<AgentId> {
        let name = name.into();
        let mut positions = Vec::with_capacity(subordinates.len());
        for id in &subordinates {
            let member = model.agent(*id).ok_or_else(|| {
                RetError::config(format!("Group '{}' references unknown agent {}", name, id.0))
            })?;
            positions.push(member.pos);
        }
        let start = if positions.is_empty() {
            Coordinate::D2(0.0, 0.0)
        } else {
            centroid(&positions)
        };

        options.sensors.get_or_insert_with(Vec::new);
        options.weapons.get_or_insert_with(Vec::new);
        let mut agent = RetAgent::build(
            model,
            Placement::At(start),
            name,
            affiliation,
            AgentType::Group,
            options,
        )?;
        agent.behaviour_pool.add_default_behaviour(
            Behaviour::CommunicateOrders(CommunicateOrdersBehaviour),
            BehaviourKind::CommunicateOrders,
        );
        agent.add_to_network(subordinates.iter().copied());
        agent.subordinates = subordinates;
        Ok(model.add_agent(agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agents::ArmourAgent;
    use crate::core::orders::{Order, Task, Trigger};
    use crate::testing::{MockModel2d, MockModel3d};

    #[test]
    fn test_group_relays_orders_and_dies_with_members() {
        let mut model = MockModel2d::build();
        let a = ArmourAgent::new(&mut model, (0.0, 0.0), "A", Affiliation::Friendly).unwrap();
        let b = ArmourAgent::new(&mut model, (10.0, 20.0), "B", Affiliation::Friendly).unwrap();
        let group = GroupAgent::new(&mut model, "Platoon", Affiliation::Friendly, 10.0, vec![a, b]).unwrap();
        assert_eq!(model.agent(group).unwrap().pos, Coordinate::D2(5.0, 10.0));

        let relayed = Order::new(Trigger::immediate(), Task::move_to((50.0, 50.0), 1.0));
        model.agent_mut(group).unwrap().add_orders([Order::new(
            Trigger::immediate(),
            Task::CommunicateOrders {
                orders: vec![relayed],
            },
        )]);
        model.step().unwrap();
        // members step before the group, so the relayed order waits for the next step
        for id in [a, b] {
            assert_eq!(model.agent(id).unwrap().orders.len(), 1);
        }
        assert!(model.agent(group).unwrap().orders.is_empty());

        for id in [a, b] {
            model.agent_mut(id).unwrap().kill();
        }
        model.step().unwrap();
        assert!(model.agent(group).unwrap().killed);
    }

    #[test]
    fn test_unknown_member_is_rejected() {
        let mut model = MockModel2d::build();
        let err = GroupAgent::new(&mut model, "Ghosts", Affiliation::Hostile, 1.0, vec![AgentId(99)]);
        assert!(err.is_err());
    }

    #[test]
    fn test_group_starts_at_member_centroid_in_3d() {
        let mut model = MockModel3d::build();
        let a = ArmourAgent::new(&mut model, (0.0, 0.0), "A", Affiliation::Hostile).unwrap();
        let b = ArmourAgent::new(&mut model, (10.0, 20.0), "B", Affiliation::Hostile).unwrap();
        let group = GroupAgent::new(&mut model, "Section", Affiliation::Hostile, 10.0, vec![a, b]).unwrap();
        assert_eq!(model.agent(group).unwrap().pos, Coordinate::D3(5.0, 10.0, 0.0));
    }
}
