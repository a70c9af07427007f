//! The simulation model: owns space, agents and time, and steps them together.

use crate::config::schema::RetModelSchema;
use crate::core::agents::RetAgent;
use crate::core::datacollector::{DataCollector, ModelSnapshot};
use crate::core::parameters::{ExtractedParameters, FixedParameters, ModelMetadata, ModelParameterSpecification};
use crate::core::registry::extract_parameters;
use crate::core::schedule::Schedule;
use crate::core::sensing::Countermeasure;
use crate::core::space::Space;
use crate::core::weapons::WeaponFiredEvent;
use crate::domain::{AgentId, Coordinate};
use crate::playback::{JsonWriter, PlaybackWriterKind};
use crate::utils::error::{Result, RetError};
use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Behaviour,
    Trigger,
    Fire,
    Sense,
    Communication,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventCategory::Behaviour => "behaviour",
            EventCategory::Trigger => "trigger",
            EventCategory::Fire => "fire",
            EventCategory::Sense => "sense",
            EventCategory::Communication => "communication",
        };
        f.write_str(name)
    }
}

/// Which event categories reach the model's event log. Written as `"all"`, `"none"` or a list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "LogConfigRepr", into = "LogConfigRepr")]
pub enum LogConfig {
    #[default]
    All,
    None,
    Only(Vec<EventCategory>),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum LogConfigRepr {
    Keyword(String),
    Categories(Vec<EventCategory>),
}

impl TryFrom<LogConfigRepr> for LogConfig {
    type Error = String;

    fn try_from(value: LogConfigRepr) -> std::result::Result<Self, Self::Error> {
        match value {
            LogConfigRepr::Keyword(word) => match word.to_ascii_lowercase().as_str() {
                "all" => Ok(LogConfig::All),
                "none" => Ok(LogConfig::None),
                other => Err(format!("unknown log_config '{}', expected 'all', 'none' or a list", other)),
            },
            LogConfigRepr::Categories(categories) => Ok(LogConfig::Only(categories)),
        }
    }
}

impl From<LogConfig> for LogConfigRepr {
    fn from(value: LogConfig) -> Self {
        match value {
            LogConfig::All => LogConfigRepr::Keyword("all".to_string()),
            LogConfig::None => LogConfigRepr::Keyword("none".to_string()),
            LogConfig::Only(categories) => LogConfigRepr::Categories(categories),
        }
    }
}

impl LogConfig {
    pub fn allows(&self, category: EventCategory) -> bool {
        match self {
            LogConfig::All => true,
            LogConfig::None => false,
            LogConfig::Only(categories) => categories.contains(&category),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelEvent {
    pub time: NaiveDateTime,
    pub step: u64,
    pub category: EventCategory,
    pub agent: Option<AgentId>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ModelOptions {
    pub schedule: Schedule,
    pub playback_writer: Option<PlaybackWriterKind>,
    pub output_path: Option<PathBuf>,
    pub agent_reporters: BTreeMap<String, String>,
    pub model_reporters: Option<BTreeMap<String, String>>,
    pub tables: Option<BTreeMap<String, Vec<String>>>,
    pub log_config: LogConfig,
    pub random_state: Option<u64>,
    pub collect_datacollector: bool,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            schedule: Schedule::default(),
            playback_writer: None,
            output_path: None,
            agent_reporters: BTreeMap::new(),
            model_reporters: None,
            tables: None,
            log_config: LogConfig::default(),
            random_state: None,
            collect_datacollector: true,
        }
    }
}

impl ModelOptions {
    /// Record playback into `path` with the JSON writer.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self.playback_writer = Some(PlaybackWriterKind::JsonWriter);
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }
}

#[derive(Debug)]
pub struct RetModel {
    pub space: Space,
    pub schedule: Schedule,
    pub playback_writer: Option<JsonWriter>,
    pub datacollector: Option<DataCollector>,
    pub collect_datacollector: bool,
    pub(crate) agents: BTreeMap<AgentId, RetAgent>,
    pub(crate) rng: StdRng,
    pub(crate) countermeasures: Vec<Countermeasure>,
    start_time: NaiveDateTime,
    time: NaiveDateTime,
    time_step: Duration,
    end_time: NaiveDateTime,
    log_config: LogConfig,
    events: Vec<ModelEvent>,
    recent_fire: Vec<WeaponFiredEvent>,
    shots_fired: usize,
    next_agent_id: u64,
    running: bool,
    step_count: u64,
}

impl RetModel {
    pub fn new(
        start_time: NaiveDateTime,
        time_step: Duration,
        end_time: NaiveDateTime,
        space: Space,
        options: ModelOptions,
    ) -> Result<Self> {
        if time_step <= Duration::zero() {
            return Err(RetError::config("Model time step must be positive"));
        }
        if end_time <= start_time {
            return Err(RetError::config("Model end time must be after start time"));
        }

        let rng = match options.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let datacollector = if options.collect_datacollector {
            Some(DataCollector::new(
                options.model_reporters.as_ref(),
                &options.agent_reporters,
                options.tables.as_ref(),
            )?)
        } else {
            None
        };
        let playback_writer = options.playback_writer.map(|kind| match kind {
            PlaybackWriterKind::JsonWriter => {
                let mut writer = JsonWriter::new(options.output_path.clone());
                writer.model_start(&space);
                writer
            }
        });

        tracing::debug!(
            "Model created: {} to {} every {}s",
            start_time,
            end_time,
            time_step.num_seconds()
        );

        Ok(Self {
            space,
            schedule: options.schedule,
            playback_writer,
            datacollector,
            collect_datacollector: options.collect_datacollector,
            agents: BTreeMap::new(),
            rng,
            countermeasures: Vec::new(),
            start_time,
            time: start_time,
            time_step,
            end_time,
            log_config: options.log_config,
            events: Vec::new(),
            recent_fire: Vec::new(),
            shots_fired: 0,
            next_agent_id: 0,
            running: true,
            step_count: 0,
        })
    }

    /// A model with no agents built from extracted fixed parameters.
    pub fn from_fixed(fixed: &FixedParameters, output_path: Option<PathBuf>) -> Result<Self> {
        let options = ModelOptions {
            schedule: Schedule::default(),
            playback_writer: fixed.playback_writer,
            output_path,
            agent_reporters: fixed.agent_reporters.clone(),
            model_reporters: fixed.model_reporters.clone(),
            tables: fixed.tables.clone(),
            log_config: fixed.log_config.clone(),
            random_state: fixed.random_state,
            collect_datacollector: fixed.collect_datacollector,
        };
        Self::new(
            fixed.start_time,
            fixed.time_step,
            fixed.end_time,
            fixed.space.clone(),
            options,
        )
    }

    /// The base model declares no parameters.
    pub fn get_parameters() -> ModelParameterSpecification {
        ModelParameterSpecification::default()
    }

    pub fn get_scenario_independent_metadata() -> ModelMetadata {
        ModelMetadata {
            header: "Default Ret Model".to_string(),
            subtext: vec![
                "This description can be customised by the custodian of the a Ret Model, by extending \
                 the `get_scenario_independent_metadata()` static method."
                    .to_string(),
                "It should be used to include a description, in the form of markdown components, \
                 of the scenario independent data that is stored in the model."
                    .to_string(),
            ],
        }
    }

    pub fn parameter_getter(schema: &RetModelSchema) -> Result<ExtractedParameters> {
        extract_parameters(&Self::get_parameters(), schema)
    }

    pub(crate) fn next_id(&mut self) -> AgentId {
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;
        id
    }

    pub fn add_agent(&mut self, agent: RetAgent) -> AgentId {
        let id = agent.unique_id;
        tracing::debug!("Agent {} ({}) added at {}", agent.name, agent.agent_type, agent.pos);
        self.agents.insert(id, agent);
        id
    }

    pub fn agent(&self, id: AgentId) -> Option<&RetAgent> {
        self.agents.get(&id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut RetAgent> {
        self.agents.get_mut(&id)
    }

    /// Lift an agent out so it can act on the model. Pair with [`RetModel::return_agent`].
    pub fn take_agent(&mut self, id: AgentId) -> Option<RetAgent> {
        self.agents.remove(&id)
    }

    pub fn return_agent(&mut self, agent: RetAgent) {
        self.agents.insert(agent.unique_id, agent);
    }

    /// Every agent, groups and their members included.
    pub fn get_all_agents(&self) -> Vec<&RetAgent> {
        self.agents.values().collect()
    }

    pub fn get_time(&self) -> NaiveDateTime {
        self.time
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveDateTime {
        self.end_time
    }

    pub fn time_step(&self) -> Duration {
        self.time_step
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn events(&self) -> &[ModelEvent] {
        &self.events
    }

    pub fn shots_fired(&self) -> usize {
        self.shots_fired
    }

    pub fn log_event(&mut self, category: EventCategory, agent: Option<AgentId>, message: String) {
        tracing::debug!(category = %category, time = %self.time, "{}", message);
        if self.log_config.allows(category) {
            self.events.push(ModelEvent {
                time: self.time,
                step: self.step_count,
                category,
                agent,
                message,
            });
        }
    }

    pub(crate) fn record_weapon_fired(&mut self, event: WeaponFiredEvent) {
        self.shots_fired += 1;
        self.recent_fire.push(event);
    }

    /// Shots fired during the current or previous time step.
    pub fn recent_weapon_fire(&self) -> impl Iterator<Item = &WeaponFiredEvent> {
        let horizon = self.time - self.time_step;
        self.recent_fire.iter().filter(move |e| e.time >= horizon)
    }

    fn kill_agent(&mut self, id: AgentId) {
        let Some(agent) = self.agents.get_mut(&id) else {
            return;
        };
        agent.kill();
        let message = format!("{} killed", agent.name);
        tracing::info!("💥 {}", message);
        self.log_event(EventCategory::Fire, Some(id), message);
    }

    /// Each live agent within its critical dimension of `impact` is killed with `kill_probability`.
    pub(crate) fn resolve_area_hit(&mut self, firer: AgentId, impact: &Coordinate, kill_probability: f64) -> Vec<AgentId> {
        let in_blast: Vec<AgentId> = self
            .agents
            .values()
            .filter(|a| a.unique_id != firer && !a.killed && !a.is_group())
            .filter(|a| a.pos.distance(impact) <= a.critical_dimension)
            .map(|a| a.unique_id)
            .collect();

        let mut killed = Vec::new();
        for id in in_blast {
            if self.rng.random::<f64>() < kill_probability {
                self.kill_agent(id);
                killed.push(id);
            }
        }
        killed
    }

    pub(crate) fn resolve_direct_hit(
        &mut self,
        target: AgentId,
        firer_pos: &Coordinate,
        radius: f64,
        kill_probability: f64,
    ) -> Option<AgentId> {
        let reachable = self
            .agents
            .get(&target)
            .is_some_and(|a| !a.killed && a.pos.distance(firer_pos) <= radius);
        if reachable && self.rng.random::<f64>() < kill_probability {
            self.kill_agent(target);
            Some(target)
        } else {
            None
        }
    }

    pub fn snapshot(&self) -> ModelSnapshot {
        let (killed, alive): (Vec<&RetAgent>, Vec<&RetAgent>) = self
            .agents
            .values()
            .filter(|a| !a.is_group())
            .partition(|a| a.killed);
        ModelSnapshot {
            time: self.time,
            step: self.step_count,
            alive_agents: alive.len(),
            killed_agents: killed.len(),
            shots_fired: self.shots_fired,
        }
    }

    /// Advance every live agent once, then time by one step.
    pub fn step(&mut self) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        if self.step_count == 0 {
            if let Some(writer) = &mut self.playback_writer {
                writer.record_initial_agents(self.agents.values());
            }
        }

        let ids: Vec<AgentId> = self.agents.keys().copied().collect();
        let order = self.schedule.order(ids, &mut self.rng);
        for id in order {
            let Some(mut agent) = self.agents.remove(&id) else {
                continue;
            };
            if !agent.killed {
                agent.step(self);
            }
            self.agents.insert(id, agent);
        }

        self.time += self.time_step;
        self.step_count += 1;
        let horizon = self.time - self.time_step;
        self.recent_fire.retain(|e| e.time >= horizon);
        let now = self.time;
        self.countermeasures.retain(|c| c.expires_at > now);

        if self.collect_datacollector {
            let snapshot = self.snapshot();
            if let Some(collector) = &mut self.datacollector {
                collector.collect(&snapshot, self.agents.values());
            }
        }
        if let Some(writer) = &mut self.playback_writer {
            writer.model_step(self.step_count, self.time, self.agents.values());
        }

        if self.time >= self.end_time {
            self.finish()?;
        }
        Ok(())
    }

    /// Stop the run and write any playback. Safe to call more than once.
    pub fn finish(&mut self) -> Result<()> {
        if self.running {
            tracing::info!(
                "🏁 Model finished after {} steps at {} ({} shots fired)",
                self.step_count,
                self.time,
                self.shots_fired
            );
        }
        self.running = false;
        if let Some(writer) = &mut self.playback_writer {
            writer.model_finish()?;
        }
        Ok(())
    }

    pub fn events_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for event in &self.events {
            writer.serialize(event)?;
        }
        writer.into_inner().map_err(|e| RetError::ProcessingError {
            message: format!("CSV buffer error: {}", e),
        })
    }
}
