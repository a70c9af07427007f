//! What an agent believes about the other agents in the model.

use crate::domain::{AgentCasualtyState, AgentId, AgentType, Affiliation, Confidence, Coordinate};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceivedAgent {
    pub unique_id: AgentId,
    pub location: Coordinate,
    pub sense_time: NaiveDateTime,
    pub confidence: Confidence,
    pub affiliation: Affiliation,
    pub agent_type: AgentType,
    pub casualty_state: AgentCasualtyState,
}

impl PerceivedAgent {
    pub fn new(
        unique_id: AgentId,
        location: Coordinate,
        sense_time: NaiveDateTime,
        confidence: Confidence,
        affiliation: Affiliation,
        agent_type: AgentType,
        casualty_state: AgentCasualtyState,
    ) -> Self {
        Self {
            unique_id,
            location,
            sense_time,
            confidence,
            affiliation,
            agent_type,
            casualty_state,
        }
    }

    /// Whether `self` should replace `held` for the same agent.
    pub fn supersedes(&self, held: &PerceivedAgent) -> bool {
        self.sense_time > held.sense_time
            || (self.sense_time == held.sense_time && self.confidence > held.confidence)
    }
}

/// Reduces a set of perceived agents.
pub trait PerceivedAgentFilter: Debug + Send + Sync {
    fn run(&self, agents: Vec<PerceivedAgent>) -> Vec<PerceivedAgent>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifiedAgents;

impl PerceivedAgentFilter for IdentifiedAgents {
    fn run(&self, agents: Vec<PerceivedAgent>) -> Vec<PerceivedAgent> {
        agents
            .into_iter()
            .filter(|a| a.confidence == Confidence::Identify)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AliveAgents;

impl PerceivedAgentFilter for AliveAgents {
    fn run(&self, agents: Vec<PerceivedAgent>) -> Vec<PerceivedAgent> {
        agents
            .into_iter()
            .filter(|a| a.casualty_state == AgentCasualtyState::Alive)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HostileAgents;

impl PerceivedAgentFilter for HostileAgents {
    fn run(&self, agents: Vec<PerceivedAgent>) -> Vec<PerceivedAgent> {
        agents
            .into_iter()
            .filter(|a| a.affiliation == Affiliation::Hostile)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FriendlyAgents;

impl PerceivedAgentFilter for FriendlyAgents {
    fn run(&self, agents: Vec<PerceivedAgent>) -> Vec<PerceivedAgent> {
        agents
            .into_iter()
            .filter(|a| a.affiliation == Affiliation::Friendly)
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AgentsNear {
    pub location: Coordinate,
    pub tolerance: f64,
}

impl PerceivedAgentFilter for AgentsNear {
    fn run(&self, agents: Vec<PerceivedAgent>) -> Vec<PerceivedAgent> {
        agents
            .into_iter()
            .filter(|a| a.location.distance(&self.location) <= self.tolerance)
            .collect()
    }
}

/// Drops anything sensed before `since`.
#[derive(Debug, Clone, Copy)]
pub struct RecentAgents {
    pub since: NaiveDateTime,
}

impl PerceivedAgentFilter for RecentAgents {
    fn run(&self, agents: Vec<PerceivedAgent>) -> Vec<PerceivedAgent> {
        agents
            .into_iter()
            .filter(|a| a.sense_time >= self.since)
            .collect()
    }
}

/// Applies filters in order.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    filters: Vec<Arc<dyn PerceivedAgentFilter>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, filter: impl PerceivedAgentFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }
}

impl PerceivedAgentFilter for FilterChain {
    fn run(&self, agents: Vec<PerceivedAgent>) -> Vec<PerceivedAgent> {
        self.filters
            .iter()
            .fold(agents, |acc, filter| filter.run(acc))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PerceivedWorld {
    agents: BTreeMap<AgentId, PerceivedAgent>,
    refresh_technique: Option<Arc<dyn PerceivedAgentFilter>>,
}

impl PerceivedWorld {
    pub fn new(refresh_technique: Option<Arc<dyn PerceivedAgentFilter>>) -> Self {
        Self {
            agents: BTreeMap::new(),
            refresh_technique,
        }
    }

    /// Merge new perceptions; returns how many entries changed.
    pub fn add_acquisitions<I>(&mut self, acquisitions: I) -> usize
    where
        I: IntoIterator<Item = PerceivedAgent>,
    {
        let mut changed = 0;
        for acquisition in acquisitions {
            match self.agents.get(&acquisition.unique_id) {
                Some(held) if !acquisition.supersedes(held) => {}
                _ => {
                    self.agents.insert(acquisition.unique_id, acquisition);
                    changed += 1;
                }
            }
        }
        if changed > 0 {
            self.refresh();
        }
        changed
    }

    fn refresh(&mut self) {
        if let Some(technique) = &self.refresh_technique {
            let kept = technique.run(self.agents.values().cloned().collect());
            self.agents = kept.into_iter().map(|a| (a.unique_id, a)).collect();
        }
    }

    pub fn get_perceived_agents(&self, filter: Option<&dyn PerceivedAgentFilter>) -> Vec<PerceivedAgent> {
        let all: Vec<PerceivedAgent> = self.agents.values().cloned().collect();
        match filter {
            Some(filter) => filter.run(all),
            None => all,
        }
    }

    pub fn get(&self, id: AgentId) -> Option<&PerceivedAgent> {
        self.agents.get(&id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
