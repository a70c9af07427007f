use crate::core::behaviours::{Behaviour, BehaviourKind, BehaviourPool, CommunicationReceiver, ListAdder};
use crate::core::feature::Area;
use crate::core::model::{EventCategory, RetModel};
use crate::core::orders::{Order, Trigger, TriggerContext};
use crate::core::sensing::{ArcOfRegard, PerceivedAgentFilter, PerceivedWorld, Sensor};
use crate::core::weapons::Weapon;
use crate::domain::{AgentId, AgentType, Affiliation, Coordinate};
use crate::utils::error::{Result, RetError};
use chrono::NaiveDateTime;
use rand::Rng;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a new agent starts.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    At(Coordinate),
    /// One of these, picked with the model's random generator.
    OneOf(Vec<Coordinate>),
    /// A uniformly random point inside the area.
    InArea(Area),
}

impl Placement {
    pub(crate) fn resolve(&self, model: &mut RetModel) -> Result<Coordinate> {
        let pos = match self {
            Placement::At(pos) => *pos,
            Placement::OneOf(candidates) => {
                if candidates.is_empty() {
                    return Err(RetError::config("Agent placement list is empty"));
                }
                candidates[model.rng.random_range(0..candidates.len())]
            }
            Placement::InArea(area) => area.random_point(&mut model.rng),
        };
        Ok(match pos.z() {
            Some(_) => pos,
            None => model.space.place_on_ground(pos),
        })
    }
}

impl From<Coordinate> for Placement {
    fn from(value: Coordinate) -> Self {
        Placement::At(value)
    }
}

impl From<(f64, f64)> for Placement {
    fn from(value: (f64, f64)) -> Self {
        Placement::At(value.into())
    }
}

impl From<(f64, f64, f64)> for Placement {
    fn from(value: (f64, f64, f64)) -> Self {
        Placement::At(value.into())
    }
}

impl From<Vec<Coordinate>> for Placement {
    fn from(value: Vec<Coordinate>) -> Self {
        Placement::OneOf(value)
    }
}

impl From<Area> for Placement {
    fn from(value: Area) -> Self {
        Placement::InArea(value)
    }
}

/// Optional construction arguments shared by every agent type.
#[derive(Debug, Clone, Default)]
pub struct AgentOptions {
    pub critical_dimension: Option<f64>,
    pub reflectivity: Option<f64>,
    pub temperature: Option<f64>,
    pub temperature_std_dev: f64,
    /// Culture name to speed multiplier for ground movement.
    pub culture_speed_modifiers: Option<BTreeMap<String, f64>>,
    pub icon_path: Option<PathBuf>,
    pub killed_icon_path: Option<PathBuf>,
    pub orders: Vec<Order>,
    pub background_orders: Vec<Order>,
    pub behaviours: Vec<Behaviour>,
    pub behaviour_adder: Option<Arc<dyn ListAdder>>,
    /// `None` uses the agent type's default sensors.
    pub sensors: Option<Vec<Arc<dyn Sensor>>>,
    pub arc_of_regard: Option<ArcOfRegard>,
    pub communication_receiver: Option<CommunicationReceiver>,
    pub refresh_technique: Option<Arc<dyn PerceivedAgentFilter>>,
    /// `None` uses the agent type's default weapons; an empty list means unarmed.
    pub weapons: Option<Vec<Weapon>>,
}

#[derive(Debug, Clone)]
pub struct RetAgent {
    pub unique_id: AgentId,
    pub name: String,
    pub pos: Coordinate,
    pub affiliation: Affiliation,
    pub agent_type: AgentType,
    pub critical_dimension: f64,
    pub reflectivity: f64,
    pub temperature: f64,
    pub temperature_std_dev: f64,
    pub icon_path: Option<PathBuf>,
    pub killed_icon_path: Option<PathBuf>,
    pub killed: bool,
    pub hiding: bool,
    pub orders: Vec<Order>,
    /// Checked and run every step before regular orders.
    pub background_orders: Vec<Order>,
    pub behaviour_pool: BehaviourPool,
    pub sensors: Vec<Arc<dyn Sensor>>,
    pub arc_of_regard: Option<ArcOfRegard>,
    /// Compass bearing, degrees clockwise from north.
    pub sense_direction: f64,
    pub next_sense: Option<NaiveDateTime>,
    pub perceived_world: PerceivedWorld,
    /// Set when the perceived world changed since the agent last checked its orders.
    pub new_information: bool,
    pub communication_network: Vec<AgentId>,
    pub communication_receiver: Option<CommunicationReceiver>,
    pub communications_disabled: bool,
    pub weapons: Vec<Weapon>,
    pub mission_messages: Vec<String>,
    /// Members of a group agent; empty for everything else.
    pub subordinates: Vec<AgentId>,
}

impl RetAgent {
    /// Build an agent without registering it. Agent types add their defaults and then call
    /// [`RetModel::add_agent`].
    pub fn build(
        model: &mut RetModel,
        placement: impl Into<Placement>,
        name: impl Into<String>,
        affiliation: Affiliation,
        agent_type: AgentType,
        options: AgentOptions,
    ) -> Result<Self> {
        let pos = placement.into().resolve(model)?;
        let unique_id = model.next_id();

        Ok(Self {
            unique_id,
            name: name.into(),
            pos,
            affiliation,
            agent_type,
            critical_dimension: options.critical_dimension.unwrap_or(1.0),
            reflectivity: options.reflectivity.unwrap_or(0.1),
            temperature: options.temperature.unwrap_or(20.0),
            temperature_std_dev: options.temperature_std_dev,
            icon_path: options.icon_path,
            killed_icon_path: options.killed_icon_path,
            killed: false,
            hiding: false,
            orders: options.orders,
            background_orders: options.background_orders,
            behaviour_pool: BehaviourPool::with_behaviours(options.behaviours, options.behaviour_adder),
            sensors: options.sensors.unwrap_or_default(),
            arc_of_regard: options.arc_of_regard,
            sense_direction: 0.0,
            next_sense: None,
            perceived_world: PerceivedWorld::new(options.refresh_technique),
            new_information: false,
            communication_network: Vec::new(),
            communication_receiver: Some(options.communication_receiver.unwrap_or_default()),
            communications_disabled: false,
            weapons: options.weapons.unwrap_or_default(),
            mission_messages: Vec::new(),
            subordinates: Vec::new(),
        })
    }

    /// A plain agent with no defaults beyond what `options` gives it.
    pub fn new(
        model: &mut RetModel,
        placement: impl Into<Placement>,
        name: impl Into<String>,
        affiliation: Affiliation,
        options: AgentOptions,
    ) -> Result<AgentId> {
        let agent = Self::build(model, placement, name, affiliation, AgentType::Generic, options)?;
        Ok(model.add_agent(agent))
    }

    pub fn is_group(&self) -> bool {
        self.agent_type == AgentType::Group
    }

    pub fn kill(&mut self) {
        self.killed = true;
        self.hiding = false;
    }

    pub fn add_orders(&mut self, orders: impl IntoIterator<Item = Order>) {
        self.orders.extend(orders);
    }

    pub fn add_to_network(&mut self, ids: impl IntoIterator<Item = AgentId>) {
        for id in ids {
            if id != self.unique_id && !self.communication_network.contains(&id) {
                self.communication_network.push(id);
            }
        }
    }

    /// Icon for playback: the configured path, else one derived from type and affiliation.
    pub fn icon(&self) -> String {
        let configured = if self.killed {
            self.killed_icon_path.as_ref()
        } else {
            self.icon_path.as_ref()
        };
        if let Some(path) = configured {
            return path.display().to_string();
        }

        let stem = self.agent_type.icon_stem();
        let affiliation = self.affiliation.as_str().to_lowercase();
        if self.killed {
            format!("icons/{stem}/killed/{stem}_{affiliation}_killed.svg")
        } else {
            format!("icons/{stem}/{stem}_{affiliation}.svg")
        }
    }

    fn check_trigger(&self, trigger: &mut Trigger, model: &mut RetModel) -> bool {
        let fired = {
            let ctx = TriggerContext::new(model, self);
            trigger.check(&ctx)
        };
        if fired && trigger.is_logged() {
            model.log_event(
                EventCategory::Trigger,
                Some(self.unique_id),
                format!("{} trigger {} fired", self.name, trigger),
            );
        }
        fired
    }

    /// Recompute a group's position from its live members. Returns false once all are dead.
    fn update_group(&mut self, model: &RetModel) -> bool {
        let live: Vec<Coordinate> = self
            .subordinates
            .iter()
            .filter_map(|id| model.agents.get(id))
            .filter(|a| !a.killed)
            .map(|a| a.pos)
            .collect();

        if live.is_empty() {
            if !self.subordinates.is_empty() {
                self.kill();
            }
            return false;
        }
        self.pos = centroid(&live);
        true
    }

    /// Run background orders, then the highest-priority order whose trigger passes.
    pub fn step(&mut self, model: &mut RetModel) {
        if self.killed {
            return;
        }
        if self.is_group() && !self.update_group(model) && self.killed {
            model.log_event(
                EventCategory::Behaviour,
                Some(self.unique_id),
                format!("{} has no surviving members", self.name),
            );
            return;
        }

        let mut background = std::mem::take(&mut self.background_orders);
        let mut orders = std::mem::take(&mut self.orders);

        let background_fired: Vec<bool> = background
            .iter_mut()
            .map(|o| self.check_trigger(&mut o.trigger, model))
            .collect();
        let fired: Vec<bool> = orders
            .iter_mut()
            .map(|o| self.check_trigger(&mut o.trigger, model))
            .collect();
        self.new_information = false;

        for (order, _) in background.iter_mut().zip(&background_fired).filter(|(_, f)| **f) {
            order.task.execute(self, model);
        }

        let mut selected: Option<usize> = None;
        for (i, order) in orders.iter().enumerate() {
            if fired[i] && selected.map_or(true, |s| order.priority > orders[s].priority) {
                selected = Some(i);
            }
        }

        match selected {
            Some(i) => {
                let complete = orders[i].task.execute(self, model);
                if complete && !orders[i].persistent {
                    orders.remove(i);
                }
            }
            None => {
                if let Some(Behaviour::Wait(wait)) = self.behaviour_pool.satisfy(BehaviourKind::Wait) {
                    wait.step(self, model);
                }
            }
        }

        background.append(&mut self.background_orders);
        self.background_orders = background;
        orders.append(&mut self.orders);
        self.orders = orders;
    }
}

/// Heights are averaged only when every point has one.
pub(super) fn centroid(points: &[Coordinate]) -> Coordinate {
    let n = points.len() as f64;
    let x = points.iter().map(Coordinate::x).sum::<f64>() / n;
    let y = points.iter().map(Coordinate::y).sum::<f64>() / n;
    let zs: Option<Vec<f64>> = points.iter().map(Coordinate::z).collect();
    match zs {
        Some(zs) => Coordinate::D3(x, y, zs.iter().sum::<f64>() / n),
        None => Coordinate::D2(x, y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centroid() {
        let c = centroid(&[Coordinate::D2(0.0, 0.0), Coordinate::D2(2.0, 4.0)]);
        assert_eq!(c, Coordinate::D2(1.0, 2.0));

        let mixed = centroid(&[Coordinate::D3(0.0, 0.0, 1.0), Coordinate::D2(2.0, 0.0)]);
        assert_eq!(mixed, Coordinate::D2(1.0, 0.0));
    }
}
