//! Version 2 model file: the scenario a batch run executes.

use crate::core::feature::{Area, LineFeature};
use crate::core::model::{LogConfig, RetModel};
use crate::core::parameters::Distribution;
use crate::core::space::{Clutter, Culture, Space};
use crate::utils::error::{Result, RetError};
use crate::utils::validation::{
    validate_non_empty_string, validate_ordered, validate_path, validate_positive_number, validate_range, Validate,
};
use chrono::{Duration, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// `chrono::Duration` as whole seconds.
mod duration_seconds {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let seconds = i64::deserialize(deserializer)?;
        Ok(Duration::seconds(seconds))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSchema {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Seconds per model step.
    #[serde(with = "duration_seconds")]
    pub time_step: Duration,
}

fn default_dimensions() -> u8 {
    2
}

fn default_height_black() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceSchema {
    #[serde(default = "default_dimensions")]
    pub dimensions: u8,
    #[serde(default)]
    pub x_min: f64,
    pub x_max: f64,
    #[serde(default)]
    pub y_min: f64,
    pub y_max: f64,
    /// Grey-level CSV grid. Image formats are not decoded.
    #[serde(default)]
    pub terrain_image_path: Option<PathBuf>,
    #[serde(default = "default_height_black")]
    pub height_black: f64,
    #[serde(default)]
    pub height_white: f64,
    /// CSV grid of culture names.
    #[serde(default)]
    pub culture_image_path: Option<PathBuf>,
    #[serde(default)]
    pub cultures: Vec<Culture>,
    #[serde(default)]
    pub clutter_background_level: f64,
    #[serde(default)]
    pub ground_clutter_value: f64,
    #[serde(default)]
    pub ground_clutter_height: f64,
    #[serde(default)]
    pub areas: Vec<Area>,
    #[serde(default)]
    pub boundaries: Vec<LineFeature>,
}

impl SpaceSchema {
    pub fn new_2d(x_max: f64, y_max: f64) -> Self {
        Self {
            dimensions: 2,
            x_min: 0.0,
            x_max,
            y_min: 0.0,
            y_max,
            terrain_image_path: None,
            height_black: default_height_black(),
            height_white: 0.0,
            culture_image_path: None,
            cultures: Vec::new(),
            clutter_background_level: 0.0,
            ground_clutter_value: 0.0,
            ground_clutter_height: 0.0,
            areas: Vec::new(),
            boundaries: Vec::new(),
        }
    }

    pub fn to_model(&self) -> Result<Space> {
        let mut space = Space::with_bounds(self.x_min, self.x_max, self.y_min, self.y_max, self.dimensions)
            .with_clutter(Clutter {
                background_level: self.clutter_background_level,
                ground_clutter_value: self.ground_clutter_value,
                ground_clutter_height: self.ground_clutter_height,
            });

        if let Some(path) = &self.terrain_image_path {
            space = space.load_terrain_csv(path, self.height_black, self.height_white)?;
        }
        space = match &self.culture_image_path {
            Some(path) => space.load_culture_csv(path, self.cultures.clone())?,
            None => space.with_declared_cultures(self.cultures.clone()),
        };
        for area in &self.areas {
            space = space.with_area(area.clone());
        }
        for boundary in &self.boundaries {
            space = space.with_boundary(boundary.clone());
        }
        Ok(space)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericParameterSchema {
    pub name: String,
    pub min_val: f64,
    pub max_val: f64,
    #[serde(default)]
    pub distribution: Distribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricParameterSchema {
    pub name: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExperimentalControlsSchema {
    #[serde(default)]
    pub numeric_parameters: BTreeMap<String, NumericParameterSchema>,
    #[serde(default)]
    pub categoric_parameters: BTreeMap<String, CategoricParameterSchema>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioDependentParametersSchema {
    #[serde(default)]
    pub numeric_parameters: BTreeMap<String, f64>,
    #[serde(default)]
    pub categoric_parameters: BTreeMap<String, String>,
}

fn default_playback_writer() -> String {
    "None".to_string()
}

fn default_one() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetModelSchema {
    pub time: TimeSchema,
    pub space: SpaceSchema,
    pub model_name: String,
    #[serde(default = "default_one")]
    pub iterations: u32,
    pub max_steps: u64,
    #[serde(default)]
    pub experimental_controls: ExperimentalControlsSchema,
    #[serde(default)]
    pub scenario_dependent_parameters: ScenarioDependentParametersSchema,
    /// `"JsonWriter"` or `"None"`.
    #[serde(default = "default_playback_writer")]
    pub playback_writer: String,
    #[serde(default = "default_one")]
    pub n_experiments: u32,
    #[serde(default)]
    pub agent_reporters: BTreeMap<String, String>,
    #[serde(default)]
    pub model_reporters: BTreeMap<String, String>,
    #[serde(default)]
    pub tables: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub log_config: LogConfig,
    #[serde(default)]
    pub random_state: Option<u64>,
    #[serde(default = "default_true")]
    pub collect_datacollector: bool,
}

impl RetModelSchema {
    /// Load from `.toml` or `.json`, after `${VAR}` substitution.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(RetError::InvalidConfigValueError {
                field: "model_file".to_string(),
                value: path.display().to_string(),
                reason: "Model files must be .toml or .json".to_string(),
            }),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let substituted = Self::substitute_env_vars(content)?;
        toml::from_str(&substituted).map_err(|e| RetError::config(format!("TOML parsing error: {}", e)))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let substituted = Self::substitute_env_vars(content)?;
        Ok(serde_json::from_str(&substituted)?)
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        // ${VAR_NAME}，找不到就保留原字串
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RetError::config(e.to_string()))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// A base model with this file's time, space and collection settings and no agents.
    pub fn to_model(&self) -> Result<RetModel> {
        let extracted = RetModel::parameter_getter(self)?;
        RetModel::from_fixed(&extracted.fixed, None)
    }
}

impl Validate for RetModelSchema {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("model_name", &self.model_name)?;

        if self.time.end_time <= self.time.start_time {
            return Err(RetError::ConfigValidationError {
                field: "time.end_time".to_string(),
                message: "End time must be after start time".to_string(),
            });
        }
        if self.time.time_step <= Duration::zero() {
            return Err(RetError::InvalidConfigValueError {
                field: "time.time_step".to_string(),
                value: self.time.time_step.num_seconds().to_string(),
                reason: "Time step must be positive".to_string(),
            });
        }

        validate_range("space.dimensions", self.space.dimensions, 2, 3)?;
        validate_ordered("space.x", self.space.x_min, self.space.x_max)?;
        validate_ordered("space.y", self.space.y_min, self.space.y_max)?;
        validate_range("space.clutter_background_level", self.space.clutter_background_level, 0.0, 1.0)?;
        if let Some(path) = &self.space.terrain_image_path {
            validate_path("space.terrain_image_path", &path.to_string_lossy())?;
        }
        if let Some(path) = &self.space.culture_image_path {
            validate_path("space.culture_image_path", &path.to_string_lossy())?;
            if self.space.cultures.is_empty() {
                return Err(RetError::MissingConfigError {
                    field: "space.cultures".to_string(),
                });
            }
        }

        validate_positive_number("iterations", self.iterations as usize, 1)?;
        validate_positive_number("n_experiments", self.n_experiments as usize, 1)?;
        validate_positive_number("max_steps", self.max_steps as usize, 1)?;

        for (key, p) in &self.experimental_controls.numeric_parameters {
            validate_ordered(&format!("experimental_controls.numeric_parameters.{}", key), p.min_val, p.max_val)?;
            if p.distribution == Distribution::Log && p.min_val <= 0.0 {
                return Err(RetError::InvalidConfigValueError {
                    field: format!("experimental_controls.numeric_parameters.{}.min_val", key),
                    value: p.min_val.to_string(),
                    reason: "Log distributions need a positive minimum".to_string(),
                });
            }
        }
        for (key, p) in &self.experimental_controls.categoric_parameters {
            if p.options.is_empty() {
                return Err(RetError::ConfigValidationError {
                    field: format!("experimental_controls.categoric_parameters.{}", key),
                    message: "At least one option is required".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) const BASIC_TOML: &str = r#"
model_name = "RetModel"
iterations = 10
max_steps = 5
n_experiments = 10
playback_writer = "None"
random_state = 100
collect_datacollector = true

[time]
start_time = "2021-01-01T00:00:00"
end_time = "2021-01-02T00:00:00"
time_step = 900

[space]
dimensions = 3
x_max = 100.0
y_max = 100.0
height_black = 1.0
height_white = 0.0
clutter_background_level = 0.5
ground_clutter_value = 0.25
ground_clutter_height = 0.75

[agent_reporters]
id = "unique_id"
"#;

    #[test]
    fn test_parse_basic_schema() {
        let schema = RetModelSchema::from_toml_str(BASIC_TOML).unwrap();

        assert_eq!(schema.model_name, "RetModel");
        assert_eq!(schema.time.time_step, Duration::minutes(15));
        assert_eq!(
            schema.time.start_time,
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(schema.space.dimensions, 3);
        assert_eq!(schema.agent_reporters.get("id").map(String::as_str), Some("unique_id"));
        assert_eq!(schema.log_config, LogConfig::All);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RET_TEST_MODEL_NAME", "ArmourEngagementModel");
        let toml = BASIC_TOML.replace("\"RetModel\"", "\"${RET_TEST_MODEL_NAME}\"");
        let schema = RetModelSchema::from_toml_str(&toml).unwrap();
        assert_eq!(schema.model_name, "ArmourEngagementModel");
        std::env::remove_var("RET_TEST_MODEL_NAME");
    }

    #[test]
    fn test_json_and_toml_agree() {
        let from_toml = RetModelSchema::from_toml_str(BASIC_TOML).unwrap();
        let json = serde_json::to_string(&from_toml).unwrap();
        assert_eq!(RetModelSchema::from_json_str(&json).unwrap(), from_toml);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut schema = RetModelSchema::from_toml_str(BASIC_TOML).unwrap();
        schema.time.end_time = schema.time.start_time;
        assert!(schema.validate().is_err());

        let mut schema = RetModelSchema::from_toml_str(BASIC_TOML).unwrap();
        schema.space.dimensions = 4;
        assert!(schema.validate().is_err());

        let mut schema = RetModelSchema::from_toml_str(BASIC_TOML).unwrap();
        schema.experimental_controls.numeric_parameters.insert(
            "n".to_string(),
            NumericParameterSchema {
                name: "n".to_string(),
                min_val: 0.0,
                max_val: 10.0,
                distribution: Distribution::Log,
            },
        );
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_culture_map_needs_declared_cultures() {
        let mut schema = RetModelSchema::from_toml_str(BASIC_TOML).unwrap();
        schema.space.culture_image_path = Some(PathBuf::from("cultures.csv"));
        let err = schema.validate().unwrap_err();
        assert!(matches!(err, RetError::MissingConfigError { ref field } if field == "space.cultures"));

        schema.space.cultures = vec![Culture::new("forest")];
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_image_terrain_rejected() {
        let mut space = SpaceSchema::new_2d(10.0, 10.0);
        space.terrain_image_path = Some(PathBuf::from("terrain.png"));
        assert!(space.to_model().is_err());
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("model.toml");
        std::fs::write(&toml_path, BASIC_TOML).unwrap();
        assert!(RetModelSchema::from_file(&toml_path).is_ok());

        let yaml_path = dir.path().join("model.yaml");
        std::fs::write(&yaml_path, BASIC_TOML).unwrap();
        assert!(RetModelSchema::from_file(&yaml_path).is_err());
    }
}
