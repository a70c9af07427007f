use crate::core::agents::RetAgent;
use crate::core::model::{EventCategory, RetModel};
use crate::core::sensing::PerceivedAgent;
use crate::core::weapons::{WeaponFiredEvent, WeaponKind};
use crate::domain::{AgentCasualtyState, AgentId, Affiliation, Confidence, Coordinate};

/// Friendly targets identified hostiles and vice versa; everyone else holds fire.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DefaultHostileTargetResolver;

impl DefaultHostileTargetResolver {
    pub fn run(&self, affiliation: Affiliation, perceived_world: &[PerceivedAgent]) -> Vec<PerceivedAgent> {
        perceived_world
            .iter()
            .filter(|p| p.confidence == Confidence::Identify)
            .filter(|p| p.casualty_state == AgentCasualtyState::Alive)
            .filter(|p| affiliation.is_hostile_to(p.affiliation))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FireBehaviour {
    pub target_resolver: DefaultHostileTargetResolver,
}

impl FireBehaviour {
    /// Fire every ready weapon at the nearest target in its range. Returns rounds fired.
    pub fn step(&self, agent: &mut RetAgent, model: &mut RetModel, location: Option<Coordinate>) -> usize {
        let firer_id = agent.unique_id;
        let firer_pos = agent.pos;
        let now = model.get_time();

        let mut targets: Vec<(Option<AgentId>, Coordinate)> = match location {
            Some(location) => vec![(None, location)],
            None => self
                .target_resolver
                .run(agent.affiliation, &agent.perceived_world.get_perceived_agents(None))
                .into_iter()
                .map(|p| (Some(p.unique_id), p.location))
                .collect(),
        };
        if targets.is_empty() {
            return 0;
        }
        targets.sort_by(|a, b| firer_pos.distance(&a.1).total_cmp(&firer_pos.distance(&b.1)));

        let mut rounds = 0;
        for weapon in agent.weapons.iter_mut() {
            if !weapon.is_ready(now) {
                continue;
            }
            let Some((target_id, target_location)) = targets
                .iter()
                .find(|(_, loc)| weapon.in_range(&firer_pos, loc))
                .copied()
            else {
                continue;
            };

            let impact = weapon.aim_point(&firer_pos, &target_location, &mut model.rng);
            let kills = match (weapon.kind, target_id) {
                (WeaponKind::ShortRanged, Some(target_id)) => model
                    .resolve_direct_hit(target_id, &firer_pos, weapon.radius, weapon.kill_probability_per_round)
                    .into_iter()
                    .collect(),
                _ => model.resolve_area_hit(firer_id, &impact, weapon.kill_probability_per_round),
            };
            weapon.mark_fired(now);

            model.log_event(
                EventCategory::Fire,
                Some(firer_id),
                format!(
                    "{} fired {} at {} ({} killed)",
                    agent.name,
                    weapon.name,
                    impact,
                    kills.len()
                ),
            );
            model.record_weapon_fired(WeaponFiredEvent {
                firer: firer_id,
                weapon_name: weapon.name.clone(),
                time: now,
                location: impact,
                kills,
            });
            rounds += 1;
        }
        rounds
    }
}
