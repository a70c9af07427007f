//! Per-step agent and model data, plus free-form tables, written out as CSV.

use crate::core::agents::RetAgent;
use crate::utils::error::{Result, RetError};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentAttribute {
    UniqueId,
    Name,
    PosX,
    PosY,
    PosZ,
    Affiliation,
    AgentType,
    Killed,
    Hiding,
}

impl FromStr for AgentAttribute {
    type Err = RetError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "unique_id" => AgentAttribute::UniqueId,
            "name" => AgentAttribute::Name,
            "pos_x" => AgentAttribute::PosX,
            "pos_y" => AgentAttribute::PosY,
            "pos_z" => AgentAttribute::PosZ,
            "affiliation" => AgentAttribute::Affiliation,
            "agent_type" => AgentAttribute::AgentType,
            "killed" => AgentAttribute::Killed,
            "hiding" => AgentAttribute::Hiding,
            other => {
                return Err(RetError::InvalidConfigValueError {
                    field: "agent_reporters".to_string(),
                    value: other.to_string(),
                    reason: "Unknown agent attribute".to_string(),
                })
            }
        })
    }
}

impl AgentAttribute {
    pub fn read(&self, agent: &RetAgent) -> String {
        match self {
            AgentAttribute::UniqueId => agent.unique_id.0.to_string(),
            AgentAttribute::Name => agent.name.clone(),
            AgentAttribute::PosX => agent.pos.x().to_string(),
            AgentAttribute::PosY => agent.pos.y().to_string(),
            AgentAttribute::PosZ => agent.pos.z().map(|z| z.to_string()).unwrap_or_default(),
            AgentAttribute::Affiliation => agent.affiliation.to_string(),
            AgentAttribute::AgentType => agent.agent_type.to_string(),
            AgentAttribute::Killed => agent.killed.to_string(),
            AgentAttribute::Hiding => agent.hiding.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelMetric {
    Time,
    Step,
    AliveAgents,
    KilledAgents,
    ShotsFired,
}

impl ModelMetric {
    pub const ALL: [(&'static str, ModelMetric); 5] = [
        ("time", ModelMetric::Time),
        ("step", ModelMetric::Step),
        ("alive_agents", ModelMetric::AliveAgents),
        ("killed_agents", ModelMetric::KilledAgents),
        ("shots_fired", ModelMetric::ShotsFired),
    ];
}

impl FromStr for ModelMetric {
    type Err = RetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, metric)| *metric)
            .ok_or_else(|| RetError::InvalidConfigValueError {
                field: "model_reporters".to_string(),
                value: s.to_string(),
                reason: "Unknown model metric".to_string(),
            })
    }
}

/// Model values read by the collector each step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSnapshot {
    pub time: NaiveDateTime,
    pub step: u64,
    pub alive_agents: usize,
    pub killed_agents: usize,
    pub shots_fired: usize,
}

impl ModelSnapshot {
    fn read(&self, metric: ModelMetric) -> String {
        match metric {
            ModelMetric::Time => self.time.to_string(),
            ModelMetric::Step => self.step.to_string(),
            ModelMetric::AliveAgents => self.alive_agents.to_string(),
            ModelMetric::KilledAgents => self.killed_agents.to_string(),
            ModelMetric::ShotsFired => self.shots_fired.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct DataCollector {
    agent_reporters: Vec<(String, AgentAttribute)>,
    model_reporters: Vec<(String, ModelMetric)>,
    agent_rows: Vec<Vec<String>>,
    model_rows: Vec<Vec<String>>,
    tables: BTreeMap<String, Table>,
}

impl DataCollector {
    /// Reporters map a column name to an attribute or metric name. Without model reporters
    /// every metric is collected.
    pub fn new(
        model_reporters: Option<&BTreeMap<String, String>>,
        agent_reporters: &BTreeMap<String, String>,
        tables: Option<&BTreeMap<String, Vec<String>>>,
    ) -> Result<Self> {
        let agent_reporters = agent_reporters
            .iter()
            .map(|(column, attr)| Ok((column.clone(), attr.parse()?)))
            .collect::<Result<Vec<_>>>()?;
        let model_reporters = match model_reporters {
            Some(reporters) => reporters
                .iter()
                .map(|(column, metric)| Ok((column.clone(), metric.parse()?)))
                .collect::<Result<Vec<_>>>()?,
            None => ModelMetric::ALL
                .iter()
                .map(|(name, metric)| (name.to_string(), *metric))
                .collect(),
        };
        let tables = tables
            .map(|t| {
                t.iter()
                    .map(|(name, columns)| {
                        (
                            name.clone(),
                            Table {
                                columns: columns.clone(),
                                rows: Vec::new(),
                            },
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            agent_reporters,
            model_reporters,
            agent_rows: Vec::new(),
            model_rows: Vec::new(),
            tables,
        })
    }

    pub fn collect<'a>(&mut self, snapshot: &ModelSnapshot, agents: impl IntoIterator<Item = &'a RetAgent>) {
        let mut row = Vec::with_capacity(self.model_reporters.len());
        for (_, metric) in &self.model_reporters {
            row.push(snapshot.read(*metric));
        }
        self.model_rows.push(row);

        if self.agent_reporters.is_empty() {
            return;
        }
        for agent in agents {
            let mut row = Vec::with_capacity(self.agent_reporters.len() + 1);
            row.push(snapshot.step.to_string());
            for (_, attribute) in &self.agent_reporters {
                row.push(attribute.read(agent));
            }
            self.agent_rows.push(row);
        }
    }

    /// Append a row; missing columns are left blank.
    pub fn add_table_row(&mut self, table: &str, row: &BTreeMap<String, String>) -> Result<()> {
        let table_data = self
            .tables
            .get_mut(table)
            .ok_or_else(|| RetError::simulation(format!("Table '{}' is not declared", table)))?;
        if let Some(unknown) = row.keys().find(|k| !table_data.columns.contains(k)) {
            return Err(RetError::simulation(format!(
                "Table '{}' has no column '{}'",
                table, unknown
            )));
        }
        table_data.rows.push(
            table_data
                .columns
                .iter()
                .map(|c| row.get(c).cloned().unwrap_or_default())
                .collect(),
        );
        Ok(())
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn model_row_count(&self) -> usize {
        self.model_rows.len()
    }

    pub fn agent_row_count(&self) -> usize {
        self.agent_rows.len()
    }

    pub fn model_csv(&self) -> Result<Vec<u8>> {
        let header: Vec<&str> = self.model_reporters.iter().map(|(c, _)| c.as_str()).collect();
        to_csv(&header, &self.model_rows)
    }

    pub fn agent_csv(&self) -> Result<Vec<u8>> {
        let mut header = vec!["step"];
        header.extend(self.agent_reporters.iter().map(|(c, _)| c.as_str()));
        to_csv(&header, &self.agent_rows)
    }

    /// File name and CSV content for every table.
    pub fn table_csvs(&self) -> Result<Vec<(String, Vec<u8>)>> {
        self.tables
            .iter()
            .map(|(name, table)| {
                let header: Vec<&str> = table.columns.iter().map(String::as_str).collect();
                Ok((format!("table_{}.csv", name), to_csv(&header, &table.rows)?))
            })
            .collect()
    }
}

fn to_csv(header: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| RetError::ProcessingError {
            message: format!("CSV buffer error: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_reporters_rejected() {
        let mut agent_reporters = BTreeMap::new();
        agent_reporters.insert("id".to_string(), "shoe_size".to_string());
        assert!(DataCollector::new(None, &agent_reporters, None).is_err());

        let mut model_reporters = BTreeMap::new();
        model_reporters.insert("x".to_string(), "weather".to_string());
        assert!(DataCollector::new(Some(&model_reporters), &BTreeMap::new(), None).is_err());
    }

    #[test]
    fn test_default_model_metrics() {
        let mut collector = DataCollector::new(None, &BTreeMap::new(), None).unwrap();
        let snapshot = ModelSnapshot {
            time: chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(0, 1, 0)
                .unwrap(),
            step: 1,
            alive_agents: 3,
            killed_agents: 1,
            shots_fired: 2,
        };
        collector.collect(&snapshot, std::iter::empty());

        let csv = String::from_utf8(collector.model_csv().unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("time,step,alive_agents,killed_agents,shots_fired"));
        assert_eq!(lines.next(), Some("2020-01-01 00:01:00,1,3,1,2"));
    }

    #[test]
    fn test_table_rows() {
        let mut tables = BTreeMap::new();
        tables.insert("kills".to_string(), vec!["killer".to_string(), "victim".to_string()]);
        let mut collector = DataCollector::new(None, &BTreeMap::new(), Some(&tables)).unwrap();

        let mut row = BTreeMap::new();
        row.insert("victim".to_string(), "Tank 2".to_string());
        collector.add_table_row("kills", &row).unwrap();
        assert_eq!(collector.table("kills").unwrap().rows, vec![vec![String::new(), "Tank 2".to_string()]]);

        row.insert("weapon".to_string(), "gun".to_string());
        assert!(collector.add_table_row("kills", &row).is_err());
        assert!(collector.add_table_row("missing", &BTreeMap::new()).is_err());
    }
}
