use crate::core::agents::RetAgent;
use crate::core::sensing::perceived_world::PerceivedAgent;
use crate::core::space::Space;
use crate::domain::{AgentCasualtyState, AgentId, AgentType, Affiliation, Confidence, Coordinate};
use crate::utils::error::{RetError, Result};
use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorDistanceThresholds {
    pub max_detect_dist: f64,
    pub max_recognise_dist: f64,
    pub max_identify_dist: f64,
}

impl SensorDistanceThresholds {
    pub fn new(max_detect_dist: f64, max_recognise_dist: f64, max_identify_dist: f64) -> Result<Self> {
        if !(max_detect_dist >= max_recognise_dist && max_recognise_dist >= max_identify_dist)
            || max_identify_dist < 0.0
        {
            return Err(RetError::InvalidConfigValueError {
                field: "sensor.distance_thresholds".to_string(),
                value: format!("{}/{}/{}", max_detect_dist, max_recognise_dist, max_identify_dist),
                reason: "Thresholds must satisfy detect >= recognise >= identify >= 0".to_string(),
            });
        }
        Ok(Self {
            max_detect_dist,
            max_recognise_dist,
            max_identify_dist,
        })
    }

    pub fn confidence_at(&self, distance: f64) -> Option<Confidence> {
        if distance <= self.max_identify_dist {
            Some(Confidence::Identify)
        } else if distance <= self.max_recognise_dist {
            Some(Confidence::Recognise)
        } else if distance <= self.max_detect_dist {
            Some(Confidence::Detect)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSamplingDistance {
    pub sampling_distance: f64,
}

/// A smoke-like screen that hides anything inside it from sensors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Countermeasure {
    pub owner: AgentId,
    pub centre: Coordinate,
    pub radius: f64,
    pub deployed_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl Countermeasure {
    pub fn is_active(&self, time: NaiveDateTime) -> bool {
        time >= self.deployed_at && time < self.expires_at
    }

    pub fn covers(&self, pos: &Coordinate) -> bool {
        self.centre.horizontal_distance(pos) <= self.radius
    }
}

/// Everything a sensor may look at besides the agents themselves.
pub struct SenseEnvironment<'a> {
    pub space: &'a Space,
    pub countermeasures: &'a [Countermeasure],
    pub time: NaiveDateTime,
    /// Clockwise sector in absolute compass degrees, when an arc of regard applies.
    pub sector: Option<(f64, f64)>,
}

pub trait Sensor: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn sense(
        &self,
        observer: &RetAgent,
        candidates: &[&RetAgent],
        environment: &SenseEnvironment<'_>,
        rng: &mut StdRng,
    ) -> Vec<PerceivedAgent>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineOfSightSensor {
    pub distance_thresholds: SensorDistanceThresholds,
    pub sampling_distance: SensorSamplingDistance,
}

impl LineOfSightSensor {
    pub fn new(distance_thresholds: SensorDistanceThresholds, sampling_distance: SensorSamplingDistance) -> Self {
        Self {
            distance_thresholds,
            sampling_distance,
        }
    }

    /// Samples the obstruction height along the line at the sampling interval.
    pub fn has_line_of_sight(&self, space: &Space, from: &Coordinate, to: &Coordinate) -> bool {
        let from_height = from.z().unwrap_or_else(|| space.terrain_height(from));
        let to_height = to.z().unwrap_or_else(|| space.terrain_height(to));
        let run = from.horizontal_distance(to);
        let spacing = self.sampling_distance.sampling_distance;
        if run == 0.0 || spacing <= 0.0 {
            return true;
        }

        let samples = (run / spacing).ceil() as usize;
        (1..samples).all(|i| {
            let fraction = i as f64 / samples as f64;
            let point = Coordinate::D2(
                from.x() + (to.x() - from.x()) * fraction,
                from.y() + (to.y() - from.y()) * fraction,
            );
            let line_height = from_height + (to_height - from_height) * fraction;
            space.obstruction_height(&point) <= line_height
        })
    }
}

impl Sensor for LineOfSightSensor {
    fn name(&self) -> &str {
        "Line of Sight Sensor"
    }

    fn sense(
        &self,
        observer: &RetAgent,
        candidates: &[&RetAgent],
        environment: &SenseEnvironment<'_>,
        rng: &mut StdRng,
    ) -> Vec<PerceivedAgent> {
        let mut perceived = Vec::new();

        for target in candidates {
            if target.unique_id == observer.unique_id || target.hiding {
                continue;
            }
            if let Some((start, end)) = environment.sector {
                if !bearing_in_sector(observer.pos.bearing_to(&target.pos), start, end) {
                    continue;
                }
            }
            let Some(confidence) = self
                .distance_thresholds
                .confidence_at(observer.pos.distance(&target.pos))
            else {
                continue;
            };
            if environment
                .countermeasures
                .iter()
                .any(|c| c.is_active(environment.time) && c.covers(&target.pos))
            {
                continue;
            }
            if !self.has_line_of_sight(environment.space, &observer.pos, &target.pos) {
                continue;
            }
            let clutter = environment.space.clutter_at(&target.pos);
            if clutter > 0.0 && rng.random::<f64>() < clutter {
                continue;
            }

            perceived.push(reveal(target, confidence, environment.time));
        }

        perceived
    }
}

/// Only what the confidence level allows is passed on.
fn reveal(target: &RetAgent, confidence: Confidence, time: NaiveDateTime) -> PerceivedAgent {
    let agent_type = if confidence >= Confidence::Recognise {
        target.agent_type
    } else {
        AgentType::Unknown
    };
    let (affiliation, casualty_state) = if confidence >= Confidence::Identify {
        let state = if target.killed {
            AgentCasualtyState::Killed
        } else {
            AgentCasualtyState::Alive
        };
        (target.affiliation, state)
    } else {
        (Affiliation::Unknown, AgentCasualtyState::Alive)
    };

    PerceivedAgent::new(
        target.unique_id,
        target.pos,
        time,
        confidence,
        affiliation,
        agent_type,
        casualty_state,
    )
}

/// Clockwise sector test; `start > end` wraps through north.
pub fn bearing_in_sector(bearing: f64, start: f64, end: f64) -> bool {
    let bearing = bearing.rem_euclid(360.0);
    let start = start.rem_euclid(360.0);
    let end = end.rem_euclid(360.0);
    if start <= end {
        bearing >= start && bearing <= end
    } else {
        bearing >= start || bearing <= end
    }
}

/// Weighted sectors relative to the sense direction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArcOfRegard {
    sectors: Vec<((f64, f64), f64)>,
}

impl ArcOfRegard {
    /// Ratios are normalised; sectors with no weight are dropped.
    pub fn new(sectors: Vec<((f64, f64), f64)>) -> Result<Self> {
        let total: f64 = sectors.iter().map(|(_, w)| w.max(0.0)).sum();
        if total <= 0.0 {
            return Err(RetError::config("Arc of regard needs at least one sector with a positive ratio"));
        }
        let sectors = sectors
            .into_iter()
            .filter(|(_, w)| *w > 0.0)
            .map(|(sector, w)| (sector, w / total))
            .collect();
        Ok(Self { sectors })
    }

    pub fn sectors(&self) -> &[((f64, f64), f64)] {
        &self.sectors
    }

    /// Pick a sector and rotate it onto the absolute sense direction.
    pub fn choose_sector(&self, sense_direction: f64, rng: &mut StdRng) -> Option<(f64, f64)> {
        let mut draw = rng.random::<f64>();
        let mut chosen = self.sectors.last().map(|(s, _)| *s);
        for (sector, probability) in &self.sectors {
            if draw < *probability {
                chosen = Some(*sector);
                break;
            }
            draw -= probability;
        }
        chosen.map(|(a, b)| {
            (
                (sense_direction + a).rem_euclid(360.0),
                (sense_direction + b).rem_euclid(360.0),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agents::AgentOptions;
    use crate::core::space::Clutter;
    use crate::testing::{mock_start_time, MockModel2d};
    use chrono::Duration;
    use rand::SeedableRng;

    fn sensor() -> LineOfSightSensor {
        LineOfSightSensor::new(
            SensorDistanceThresholds::new(300.0, 200.0, 100.0).unwrap(),
            SensorSamplingDistance { sampling_distance: 10.0 },
        )
    }

    #[test]
    fn test_thresholds_must_be_ordered() {
        assert!(SensorDistanceThresholds::new(100.0, 200.0, 50.0).is_err());
        assert!(SensorDistanceThresholds::new(200000.0, 150000.0, 75000.0).is_ok());
    }

    #[test]
    fn test_confidence_by_distance() {
        let thresholds = sensor().distance_thresholds;
        assert_eq!(thresholds.confidence_at(50.0), Some(Confidence::Identify));
        assert_eq!(thresholds.confidence_at(150.0), Some(Confidence::Recognise));
        assert_eq!(thresholds.confidence_at(250.0), Some(Confidence::Detect));
        assert_eq!(thresholds.confidence_at(350.0), None);
    }

    #[test]
    fn test_hill_blocks_line_of_sight() {
        let space = Space::new_2d(100.0, 10.0)
            .with_terrain(vec![vec![0.0, 0.0, 50.0, 0.0, 0.0]])
            .unwrap();
        let s = sensor();
        assert!(!s.has_line_of_sight(&space, &Coordinate::D2(5.0, 5.0), &Coordinate::D2(95.0, 5.0)));
        assert!(s.has_line_of_sight(&space, &Coordinate::D3(5.0, 5.0, 100.0), &Coordinate::D3(95.0, 5.0, 100.0)));
        assert!(s.has_line_of_sight(&space, &Coordinate::D2(5.0, 5.0), &Coordinate::D2(30.0, 5.0)));
    }

    #[test]
    fn test_sector_wraps_through_north() {
        assert!(bearing_in_sector(350.0, 300.0, 30.0));
        assert!(bearing_in_sector(10.0, 300.0, 30.0));
        assert!(!bearing_in_sector(90.0, 300.0, 30.0));
        assert!(bearing_in_sector(90.0, 45.0, 135.0));
    }

    #[test]
    fn test_arc_of_regard_normalises_and_rotates() {
        let arc = ArcOfRegard::new(vec![((0.0, 10.0), 3.0), ((90.0, 100.0), 1.0), ((180.0, 190.0), 0.0)]).unwrap();
        assert_eq!(arc.sectors().len(), 2);
        assert!((arc.sectors()[0].1 - 0.75).abs() < 1e-12);

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let (start, _) = arc.choose_sector(90.0, &mut rng).unwrap();
            assert!(start == 90.0 || start == 180.0);
        }
    }

    #[test]
    fn test_arc_of_regard_needs_weight() {
        assert!(ArcOfRegard::new(vec![((0.0, 10.0), 0.0)]).is_err());
    }

    fn observer_and_target() -> (RetAgent, RetAgent) {
        let mut model = MockModel2d::build();
        let observer = RetAgent::build(
            &mut model,
            (0.0, 0.0),
            "Observer",
            Affiliation::Friendly,
            AgentType::Armour,
            AgentOptions::default(),
        )
        .unwrap();
        let target = RetAgent::build(
            &mut model,
            (50.0, 0.0),
            "Target",
            Affiliation::Hostile,
            AgentType::Armour,
            AgentOptions::default(),
        )
        .unwrap();
        (observer, target)
    }

    fn sense_at(
        observer: &RetAgent,
        target: &RetAgent,
        space: &Space,
        countermeasures: &[Countermeasure],
        time: NaiveDateTime,
    ) -> Vec<PerceivedAgent> {
        let environment = SenseEnvironment {
            space,
            countermeasures,
            time,
            sector: None,
        };
        let mut rng = StdRng::seed_from_u64(7);
        sensor().sense(observer, &[target, observer], &environment, &mut rng)
    }

    #[test]
    fn test_clear_view_identifies_target() {
        let (observer, target) = observer_and_target();
        let space = Space::new_2d(1000.0, 1000.0);

        let perceived = sense_at(&observer, &target, &space, &[], mock_start_time());
        assert_eq!(perceived.len(), 1);
        assert_eq!(perceived[0].unique_id, target.unique_id);
        assert_eq!(perceived[0].confidence, Confidence::Identify);
        assert_eq!(perceived[0].affiliation, Affiliation::Hostile);
    }

    #[test]
    fn test_hiding_target_is_not_sensed() {
        let (observer, mut target) = observer_and_target();
        target.hiding = true;
        let space = Space::new_2d(1000.0, 1000.0);

        assert!(sense_at(&observer, &target, &space, &[], mock_start_time()).is_empty());
    }

    #[test]
    fn test_countermeasure_blocks_until_expiry() {
        let (observer, target) = observer_and_target();
        let space = Space::new_2d(1000.0, 1000.0);
        let start = mock_start_time();
        let smoke = Countermeasure {
            owner: target.unique_id,
            centre: target.pos,
            radius: 10.0,
            deployed_at: start,
            expires_at: start + Duration::minutes(5),
        };
        let smoke = [smoke];

        assert!(sense_at(&observer, &target, &space, &smoke, start).is_empty());
        assert!(sense_at(&observer, &target, &space, &smoke, start + Duration::minutes(4)).is_empty());
        assert_eq!(sense_at(&observer, &target, &space, &smoke, start + Duration::minutes(5)).len(), 1);
    }

    #[test]
    fn test_countermeasure_elsewhere_does_not_block() {
        let (observer, target) = observer_and_target();
        let space = Space::new_2d(1000.0, 1000.0);
        let start = mock_start_time();
        let smoke = [Countermeasure {
            owner: target.unique_id,
            centre: Coordinate::D2(500.0, 500.0),
            radius: 10.0,
            deployed_at: start,
            expires_at: start + Duration::minutes(5),
        }];

        assert_eq!(sense_at(&observer, &target, &space, &smoke, start).len(), 1);
    }

    #[test]
    fn test_full_clutter_blocks_detection() {
        let (observer, target) = observer_and_target();
        let space = Space::new_2d(1000.0, 1000.0).with_clutter(Clutter {
            background_level: 1.0,
            ground_clutter_value: 0.0,
            ground_clutter_height: 0.0,
        });

        for minute in 0..10 {
            let time = mock_start_time() + Duration::minutes(minute);
            assert!(sense_at(&observer, &target, &space, &[], time).is_empty());
        }
    }
}
