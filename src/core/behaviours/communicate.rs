use crate::core::agents::RetAgent;
use crate::core::model::{EventCategory, RetModel};
use crate::core::orders::Order;
use crate::domain::AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Worldview,
    Orders,
    MissionMessage,
}

/// Which message kinds an agent will act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommunicationReceiver {
    pub worldview: bool,
    pub orders: bool,
    pub mission_messages: bool,
}

impl Default for CommunicationReceiver {
    fn default() -> Self {
        Self {
            worldview: true,
            orders: true,
            mission_messages: true,
        }
    }
}

impl CommunicationReceiver {
    pub fn accepts(&self, kind: MessageKind) -> bool {
        match kind {
            MessageKind::Worldview => self.worldview,
            MessageKind::Orders => self.orders,
            MessageKind::MissionMessage => self.mission_messages,
        }
    }
}

/// Deliver to every reachable recipient in the sender's network.
fn broadcast<F>(sender: &RetAgent, model: &mut RetModel, kind: MessageKind, mut deliver: F) -> usize
where
    F: FnMut(&mut RetAgent),
{
    if sender.communications_disabled {
        model.log_event(
            EventCategory::Communication,
            Some(sender.unique_id),
            format!("{} cannot communicate, communications disabled", sender.name),
        );
        return 0;
    }

    let mut delivered: Vec<AgentId> = Vec::new();
    for recipient_id in &sender.communication_network {
        let Some(recipient) = model.agents.get_mut(recipient_id) else {
            continue;
        };
        if recipient.killed || recipient.communications_disabled {
            continue;
        }
        let accepts = recipient
            .communication_receiver
            .map(|r| r.accepts(kind))
            .unwrap_or(false);
        if !accepts {
            continue;
        }
        deliver(recipient);
        delivered.push(*recipient_id);
    }

    model.log_event(
        EventCategory::Communication,
        Some(sender.unique_id),
        format!("{} sent {:?} to {} recipients", sender.name, kind, delivered.len()),
    );
    delivered.len()
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommunicateWorldviewBehaviour;

impl CommunicateWorldviewBehaviour {
    pub fn step(&self, agent: &mut RetAgent, model: &mut RetModel) -> usize {
        let worldview = agent.perceived_world.get_perceived_agents(None);
        broadcast(agent, model, MessageKind::Worldview, |recipient| {
            if recipient.perceived_world.add_acquisitions(worldview.iter().cloned()) > 0 {
                recipient.new_information = true;
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommunicateOrdersBehaviour;

impl CommunicateOrdersBehaviour {
    pub fn step(&self, agent: &mut RetAgent, model: &mut RetModel, orders: &[Order]) -> usize {
        broadcast(agent, model, MessageKind::Orders, |recipient| {
            recipient.orders.extend(orders.iter().cloned());
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommunicateMissionMessageBehaviour;

impl CommunicateMissionMessageBehaviour {
    pub fn step(&self, agent: &mut RetAgent, model: &mut RetModel, message: &str) -> usize {
        broadcast(agent, model, MessageKind::MissionMessage, |recipient| {
            recipient.mission_messages.push(message.to_string());
        })
    }
}

/// Jams hostile agents within `range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisableCommunicationBehaviour {
    pub range: f64,
}

impl DisableCommunicationBehaviour {
    pub fn all_hostile_in_range(range: f64) -> Self {
        Self { range }
    }

    pub fn step(&self, agent: &mut RetAgent, model: &mut RetModel) -> usize {
        let mut disabled = 0;
        for other in model.agents.values_mut() {
            if other.killed || other.communications_disabled {
                continue;
            }
            if agent.affiliation.is_hostile_to(other.affiliation) && agent.pos.distance(&other.pos) <= self.range {
                other.communications_disabled = true;
                disabled += 1;
            }
        }
        model.log_event(
            EventCategory::Communication,
            Some(agent.unique_id),
            format!("{} disabled communications of {} agents", agent.name, disabled),
        );
        disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agents::AgentOptions;
    use crate::core::sensing::PerceivedAgent;
    use crate::domain::{AgentCasualtyState, AgentType, Affiliation, Confidence, Coordinate};
    use crate::testing::MockModel2d;

    fn agent_at(model: &mut RetModel, x: f64, name: &str, affiliation: Affiliation) -> AgentId {
        RetAgent::new(model, (x, 0.0), name, affiliation, AgentOptions::default()).unwrap()
    }

    #[test]
    fn test_worldview_merges_into_receivers() {
        let mut model = MockModel2d::build();
        let sender = agent_at(&mut model, 0.0, "Sender", Affiliation::Friendly);
        let listener = agent_at(&mut model, 10.0, "Listener", Affiliation::Friendly);
        let deaf = agent_at(&mut model, 20.0, "Deaf", Affiliation::Friendly);
        let target = agent_at(&mut model, 500.0, "Target", Affiliation::Hostile);
        model.agent_mut(deaf).unwrap().communication_receiver = Some(CommunicationReceiver {
            worldview: false,
            ..Default::default()
        });

        let mut agent = model.take_agent(sender).unwrap();
        agent.communication_network = vec![listener, deaf];
        agent.perceived_world.add_acquisitions([PerceivedAgent::new(
            target,
            Coordinate::D2(500.0, 0.0),
            model.get_time(),
            Confidence::Identify,
            Affiliation::Hostile,
            AgentType::Generic,
            AgentCasualtyState::Alive,
        )]);
        assert_eq!(CommunicateWorldviewBehaviour.step(&mut agent, &mut model), 1);
        model.return_agent(agent);

        let listener = model.agent(listener).unwrap();
        assert!(listener.new_information);
        let seen = listener.perceived_world.get_perceived_agents(None);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].unique_id, target);

        let deaf = model.agent(deaf).unwrap();
        assert!(!deaf.new_information);
        assert!(deaf.perceived_world.get_perceived_agents(None).is_empty());
    }

    #[test]
    fn test_mission_message_skips_killed_and_jammed() {
        let mut model = MockModel2d::build();
        let sender = agent_at(&mut model, 0.0, "Sender", Affiliation::Friendly);
        let live = agent_at(&mut model, 10.0, "Live", Affiliation::Friendly);
        let killed = agent_at(&mut model, 20.0, "Killed", Affiliation::Friendly);
        let jammed = agent_at(&mut model, 30.0, "Jammed", Affiliation::Friendly);
        model.agent_mut(killed).unwrap().killed = true;
        model.agent_mut(jammed).unwrap().communications_disabled = true;

        let mut agent = model.take_agent(sender).unwrap();
        agent.communication_network = vec![live, killed, jammed];
        let delivered = CommunicateMissionMessageBehaviour.step(&mut agent, &mut model, "Hold the bridge");
        model.return_agent(agent);

        assert_eq!(delivered, 1);
        assert_eq!(model.agent(live).unwrap().mission_messages, vec!["Hold the bridge".to_string()]);
        assert!(model.agent(killed).unwrap().mission_messages.is_empty());
        assert!(model.agent(jammed).unwrap().mission_messages.is_empty());
    }

    #[test]
    fn test_jammed_sender_delivers_nothing() {
        let mut model = MockModel2d::build();
        let sender = agent_at(&mut model, 0.0, "Sender", Affiliation::Friendly);
        let listener = agent_at(&mut model, 10.0, "Listener", Affiliation::Friendly);

        let mut agent = model.take_agent(sender).unwrap();
        agent.communication_network = vec![listener];
        agent.communications_disabled = true;
        let delivered = CommunicateMissionMessageBehaviour.step(&mut agent, &mut model, "Advance");
        model.return_agent(agent);

        assert_eq!(delivered, 0);
        assert!(model.agent(listener).unwrap().mission_messages.is_empty());
        let last = model.events().last().unwrap();
        assert_eq!(last.category, EventCategory::Communication);
        assert!(last.message.contains("communications disabled"));
    }

    #[test]
    fn test_jamming_hits_only_hostiles_in_range() {
        let mut model = MockModel2d::build();
        let jammer = agent_at(&mut model, 0.0, "Jammer", Affiliation::Friendly);
        let hostile_near = agent_at(&mut model, 100.0, "Hostile Near", Affiliation::Hostile);
        let hostile_far = agent_at(&mut model, 900.0, "Hostile Far", Affiliation::Hostile);
        let friendly_near = agent_at(&mut model, 50.0, "Friendly Near", Affiliation::Friendly);
        let neutral_near = agent_at(&mut model, 60.0, "Neutral Near", Affiliation::Neutral);

        let mut agent = model.take_agent(jammer).unwrap();
        let disabled = DisableCommunicationBehaviour::all_hostile_in_range(500.0).step(&mut agent, &mut model);
        model.return_agent(agent);

        assert_eq!(disabled, 1);
        assert!(model.agent(hostile_near).unwrap().communications_disabled);
        assert!(!model.agent(hostile_far).unwrap().communications_disabled);
        assert!(!model.agent(friendly_near).unwrap().communications_disabled);
        assert!(!model.agent(neutral_near).unwrap().communications_disabled);
        assert!(!model.agent(jammer).unwrap().communications_disabled);
    }
}
