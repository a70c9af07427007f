use crate::core::agents::RetAgent;
use crate::core::model::{EventCategory, RetModel};
use crate::core::sensing::SenseEnvironment;
use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SenseBehaviour {
    pub time_before_first_sense: Duration,
    pub time_between_senses: Duration,
}

impl SenseBehaviour {
    pub fn new(time_before_first_sense: Duration, time_between_senses: Duration) -> Self {
        Self {
            time_before_first_sense,
            time_between_senses,
        }
    }

    /// Run every sensor if the sense interval has elapsed. Returns the number of sightings.
    pub fn step(&self, agent: &mut RetAgent, model: &mut RetModel, direction: Option<f64>) -> usize {
        let now = model.get_time();
        let next = *agent
            .next_sense
            .get_or_insert(now + self.time_before_first_sense);
        if now < next {
            return 0;
        }
        agent.next_sense = Some(now + self.time_between_senses);

        if let Some(direction) = direction {
            agent.sense_direction = direction;
        }
        let sector = match &agent.arc_of_regard {
            Some(arc) => arc.choose_sector(agent.sense_direction, &mut model.rng),
            None => None,
        };

        let candidates: Vec<&RetAgent> = model.agents.values().filter(|a| !a.is_group()).collect();
        let environment = SenseEnvironment {
            space: &model.space,
            countermeasures: &model.countermeasures,
            time: now,
            sector,
        };

        let mut acquisitions = Vec::new();
        for sensor in &agent.sensors {
            acquisitions.extend(sensor.sense(agent, &candidates, &environment, &mut model.rng));
        }

        let sightings = acquisitions.len();
        if agent.perceived_world.add_acquisitions(acquisitions) > 0 {
            agent.new_information = true;
        }
        model.log_event(
            EventCategory::Sense,
            Some(agent.unique_id),
            format!("{} sensed {} agents", agent.name, sightings),
        );
        sightings
    }
}
