use crate::domain::{AgentId, Coordinate};
use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeaponKind {
    /// Fires at a location; every agent close to the impact may be hit.
    LongRanged,
    /// Engages one agent directly.
    ShortRanged,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub name: String,
    pub radius: f64,
    pub time_before_first_shot: Duration,
    pub time_between_rounds: Duration,
    pub kill_probability_per_round: f64,
    pub max_percentage_inaccuracy: f64,
    pub kind: WeaponKind,
    next_shot: Option<NaiveDateTime>,
}

impl Weapon {
    pub fn basic_long_ranged(
        name: impl Into<String>,
        radius: f64,
        time_before_first_shot: Duration,
        time_between_rounds: Duration,
        kill_probability_per_round: f64,
        max_percentage_inaccuracy: f64,
    ) -> Self {
        Self {
            name: name.into(),
            radius,
            time_before_first_shot,
            time_between_rounds,
            kill_probability_per_round: kill_probability_per_round.clamp(0.0, 1.0),
            max_percentage_inaccuracy: max_percentage_inaccuracy.max(0.0),
            kind: WeaponKind::LongRanged,
            next_shot: None,
        }
    }

    pub fn basic_short_ranged(
        name: impl Into<String>,
        radius: f64,
        time_before_first_shot: Duration,
        time_between_rounds: Duration,
        kill_probability_per_round: f64,
    ) -> Self {
        Self {
            kind: WeaponKind::ShortRanged,
            ..Self::basic_long_ranged(
                name,
                radius,
                time_before_first_shot,
                time_between_rounds,
                kill_probability_per_round,
                0.0,
            )
        }
    }

    /// The first call arms the weapon, starting the first-shot delay.
    pub fn is_ready(&mut self, now: NaiveDateTime) -> bool {
        let next = *self
            .next_shot
            .get_or_insert(now + self.time_before_first_shot);
        now >= next
    }

    pub fn mark_fired(&mut self, now: NaiveDateTime) {
        self.next_shot = Some(now + self.time_between_rounds);
    }

    pub fn in_range(&self, firer: &Coordinate, target: &Coordinate) -> bool {
        firer.distance(target) <= self.radius
    }

    /// Offset from the target by up to the inaccuracy share of the range.
    pub fn aim_point(&self, firer: &Coordinate, target: &Coordinate, rng: &mut StdRng) -> Coordinate {
        if self.kind == WeaponKind::ShortRanged || self.max_percentage_inaccuracy <= 0.0 {
            return *target;
        }
        let max_offset = firer.distance(target) * self.max_percentage_inaccuracy / 100.0;
        let offset = max_offset * rng.random::<f64>();
        let theta = rng.random::<f64>() * std::f64::consts::TAU;
        target.offset(offset * theta.sin(), offset * theta.cos())
    }
}

/// Default weapon fitted to armour and air defence agents.
pub fn default_armour_weapon() -> Weapon {
    Weapon::basic_long_ranged(
        "Default Armour Weapon",
        3000.0,
        Duration::seconds(0),
        Duration::seconds(30),
        0.5,
        0.0,
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponFiredEvent {
    pub firer: AgentId,
    pub weapon_name: String,
    pub time: NaiveDateTime,
    pub location: Coordinate,
    pub kills: Vec<AgentId>,
}
