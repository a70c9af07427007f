use crate::core::agents::RetAgent;
use crate::core::space::Space;
use crate::domain::{AgentId, AgentType, Affiliation, Coordinate};
use crate::utils::error::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const PLAYBACK_FILE_NAME: &str = "playback.json";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapSize {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackAgent {
    pub unique_id: AgentId,
    pub name: String,
    pub pos: Coordinate,
    pub affiliation: Affiliation,
    pub agent_type: AgentType,
    pub killed: bool,
    pub icon: String,
}

impl From<&RetAgent> for PlaybackAgent {
    fn from(agent: &RetAgent) -> Self {
        Self {
            unique_id: agent.unique_id,
            name: agent.name.clone(),
            pos: agent.pos,
            affiliation: agent.affiliation,
            agent_type: agent.agent_type,
            killed: agent.killed,
            icon: agent.icon(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InitialData {
    pub map_size: MapSize,
    pub agents: Vec<PlaybackAgent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepData {
    pub step_number: u64,
    pub time: NaiveDateTime,
    pub agents: Vec<PlaybackAgent>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JsonResults {
    pub initial_data: InitialData,
    pub step_data: Vec<StepData>,
}

impl JsonResults {
    pub fn json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Records the model state every step and writes it out when the run ends.
#[derive(Debug, Clone, Default)]
pub struct JsonWriter {
    pub json_results: JsonResults,
    output_path: Option<PathBuf>,
    finished: bool,
}

impl JsonWriter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self {
            json_results: JsonResults::default(),
            output_path,
            finished: false,
        }
    }

    pub fn output_file(&self) -> Option<PathBuf> {
        self.output_path.as_ref().map(|p| p.join(PLAYBACK_FILE_NAME))
    }

    pub fn model_start(&mut self, space: &Space) {
        self.json_results.initial_data.map_size = MapSize {
            x_min: space.x_min,
            x_max: space.x_max,
            y_min: space.y_min,
            y_max: space.y_max,
        };
    }

    pub fn record_initial_agents<'a>(&mut self, agents: impl IntoIterator<Item = &'a RetAgent>) {
        self.json_results.initial_data.agents = agents.into_iter().map(PlaybackAgent::from).collect();
    }

    pub fn model_step<'a>(
        &mut self,
        step_number: u64,
        time: NaiveDateTime,
        agents: impl IntoIterator<Item = &'a RetAgent>,
    ) {
        self.json_results.step_data.push(StepData {
            step_number,
            time,
            agents: agents.into_iter().map(PlaybackAgent::from).collect(),
        });
    }

    /// Write `playback.json`. Later calls do nothing.
    pub fn model_finish(&mut self) -> Result<Option<PathBuf>> {
        if self.finished {
            return Ok(None);
        }
        self.finished = true;

        let Some(file) = self.output_file() else {
            tracing::warn!("⚠️ Playback writer has no output path, playback not saved");
            return Ok(None);
        };
        write_playback(&file, &self.json_results)?;
        tracing::info!("🎬 Playback written to {}", file.display());
        Ok(Some(file))
    }
}

fn write_playback(file: &Path, results: &JsonResults) -> Result<()> {
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file, results.json()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_map_size_follows_space() {
        let mut writer = JsonWriter::new(None);
        writer.model_start(&Space::with_bounds(-5.0, 10.0, 1.0, 20.0, 2));
        assert_eq!(
            writer.json_results.initial_data.map_size,
            MapSize {
                x_min: -5.0,
                x_max: 10.0,
                y_min: 1.0,
                y_max: 20.0
            }
        );
    }

    #[test]
    fn test_finish_writes_identical_json_once() {
        let temp_dir = TempDir::new().unwrap();
        let mut writer = JsonWriter::new(Some(temp_dir.path().join("run")));
        writer.model_step(1, time(), std::iter::empty());

        let file = writer.model_finish().unwrap().unwrap();
        let written = fs::read_to_string(&file).unwrap();
        assert_eq!(written, writer.json_results.json().unwrap());
        assert_eq!(writer.model_finish().unwrap(), None);

        let parsed = JsonResults::from_json(&written).unwrap();
        assert_eq!(parsed.step_data[0].step_number, 1);
    }
}
