//! Parameters a model declares, and the values a batch run feeds it.

use crate::core::model::LogConfig;
use crate::core::space::Space;
use crate::playback::PlaybackWriterKind;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericParameterSpecification {
    pub name: String,
    pub min_allowable: f64,
    pub max_allowable: f64,
}

impl NumericParameterSpecification {
    pub fn new(name: impl Into<String>, min_allowable: f64, max_allowable: f64) -> Self {
        Self {
            name: name.into(),
            min_allowable,
            max_allowable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricParameterSpecification {
    pub name: String,
    pub allowable_options: Vec<String>,
}

impl CategoricParameterSpecification {
    pub fn new<S: Into<String>>(name: impl Into<String>, options: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            allowable_options: options.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parameters varied between experiments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExperimentalControls {
    pub numeric_parameters: Vec<NumericParameterSpecification>,
    pub categoric_parameters: Vec<CategoricParameterSpecification>,
}

/// Parameters fixed for a scenario but set by the model file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioDependentData {
    pub numeric_parameters: Vec<NumericParameterSpecification>,
    pub categoric_parameters: Vec<CategoricParameterSpecification>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelParameterSpecification {
    pub experimental_controls: ExperimentalControls,
    pub scenario_dependent_data: ScenarioDependentData,
}

/// Markdown description shown alongside a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub header: String,
    pub subtext: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Number(f64),
    Text(String),
}

impl ParameterValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Number(n) => Some(*n),
            ParameterValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Number(_) => None,
            ParameterValue::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Number(n) => write!(f, "{}", n),
            ParameterValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Uniform over `[min, max]`.
    #[default]
    Range,
    /// Uniform in log space over `[min, max]`.
    Log,
}

/// An experimental control after defaults are applied.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableParameter {
    Numeric {
        min: f64,
        max: f64,
        distribution: Distribution,
    },
    Categoric {
        options: Vec<String>,
    },
}

/// Everything a model run needs that does not change between experiments.
#[derive(Debug, Clone)]
pub struct FixedParameters {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub time_step: Duration,
    pub space: Space,
    pub model_reporters: Option<BTreeMap<String, String>>,
    pub agent_reporters: BTreeMap<String, String>,
    pub tables: Option<BTreeMap<String, Vec<String>>>,
    pub log_config: LogConfig,
    pub playback_writer: Option<PlaybackWriterKind>,
    pub random_state: Option<u64>,
    pub collect_datacollector: bool,
    /// Scenario dependent values, keyed by parameter name.
    pub scenario: BTreeMap<String, ParameterValue>,
}

#[derive(Debug, Clone)]
pub struct ExtractedParameters {
    pub fixed: FixedParameters,
    pub variable: BTreeMap<String, VariableParameter>,
    /// Defaults that had to be filled in, one message each.
    pub warnings: Vec<String>,
}

/// Quoted list used in default warnings, e.g. `['a', 'b']`.
pub(crate) fn quoted_list(options: &[String]) -> String {
    let inner: Vec<String> = options.iter().map(|o| format!("'{}'", o)).collect();
    format!("[{}]", inner.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_list() {
        let options = vec!["Choice 1".to_string(), "Choice 2".to_string()];
        assert_eq!(quoted_list(&options), "['Choice 1', 'Choice 2']");
        assert_eq!(quoted_list(&[]), "[]");
    }

    #[test]
    fn test_parameter_value_untagged() {
        let n: ParameterValue = serde_json::from_str("15").unwrap();
        let s: ParameterValue = serde_json::from_str("\"a\"").unwrap();
        assert_eq!(n.as_f64(), Some(15.0));
        assert_eq!(s.as_str(), Some("a"));
    }
}
