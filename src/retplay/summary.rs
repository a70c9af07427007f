use crate::playback::{JsonResults, MapSize};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Headline numbers for a playback file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSummary {
    pub steps: usize,
    pub agents: usize,
    pub map_size: MapSize,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    /// Agents killed by the final step, keyed by affiliation.
    pub killed_by_affiliation: BTreeMap<String, usize>,
}

impl PlaybackSummary {
    pub fn from_results(results: &JsonResults) -> Self {
        let last = results.step_data.last();
        let agents = match last {
            Some(step) if results.initial_data.agents.is_empty() => step.agents.len(),
            _ => results.initial_data.agents.len(),
        };

        let mut killed_by_affiliation = BTreeMap::new();
        for agent in last.map(|s| s.agents.as_slice()).unwrap_or_default() {
            if agent.killed {
                *killed_by_affiliation.entry(agent.affiliation.to_string()).or_insert(0) += 1;
            }
        }

        Self {
            steps: results.step_data.len(),
            agents,
            map_size: results.initial_data.map_size,
            start_time: results.step_data.first().map(|s| s.time),
            end_time: last.map(|s| s.time),
            killed_by_affiliation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AgentId, AgentType, Affiliation, Coordinate};
    use crate::playback::{PlaybackAgent, StepData};
    use chrono::NaiveDate;

    fn agent(id: u64, affiliation: Affiliation, killed: bool) -> PlaybackAgent {
        PlaybackAgent {
            unique_id: AgentId(id),
            name: format!("Agent {}", id),
            pos: Coordinate::D2(0.0, 0.0),
            affiliation,
            agent_type: AgentType::Armour,
            killed,
            icon: String::new(),
        }
    }

    #[test]
    fn test_kills_counted_on_final_step() {
        let time = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let mut results = JsonResults::default();
        results.initial_data.agents = vec![
            agent(0, Affiliation::Friendly, false),
            agent(1, Affiliation::Hostile, false),
            agent(2, Affiliation::Hostile, false),
        ];
        results.step_data.push(StepData {
            step_number: 1,
            time,
            agents: results.initial_data.agents.clone(),
        });
        results.step_data.push(StepData {
            step_number: 2,
            time: time + chrono::Duration::minutes(1),
            agents: vec![
                agent(0, Affiliation::Friendly, false),
                agent(1, Affiliation::Hostile, true),
                agent(2, Affiliation::Hostile, true),
            ],
        });

        let summary = PlaybackSummary::from_results(&results);
        assert_eq!(summary.steps, 2);
        assert_eq!(summary.agents, 3);
        assert_eq!(summary.start_time, Some(time));
        assert_eq!(summary.killed_by_affiliation.get("HOSTILE"), Some(&2));
        assert_eq!(summary.killed_by_affiliation.get("FRIENDLY"), None);
    }

    #[test]
    fn test_empty_playback() {
        let summary = PlaybackSummary::from_results(&JsonResults::default());
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.end_time, None);
    }
}
