//! Named model definitions the batch runner can build, and the parameter extraction they share.

use crate::config::schema::RetModelSchema;
use crate::core::model::RetModel;
use crate::core::parameters::{
    quoted_list, ExtractedParameters, FixedParameters, ModelMetadata, ModelParameterSpecification, ParameterValue,
    VariableParameter,
};
use crate::playback::PlaybackWriterKind;
use crate::utils::error::{Result, RetError};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// A model the batch runner knows how to parameterise and build.
pub trait RetModelDefinition: Send + Sync {
    fn name(&self) -> &'static str;

    fn get_parameters(&self) -> ModelParameterSpecification {
        RetModel::get_parameters()
    }

    fn get_scenario_independent_metadata(&self) -> ModelMetadata {
        RetModel::get_scenario_independent_metadata()
    }

    fn parameter_getter(&self, schema: &RetModelSchema) -> Result<ExtractedParameters> {
        extract_parameters(&self.get_parameters(), schema)
    }

    /// Build one run. `sample` holds the experimental control values drawn for it.
    fn build(
        &self,
        fixed: &FixedParameters,
        sample: &BTreeMap<String, ParameterValue>,
        output_path: Option<PathBuf>,
    ) -> Result<RetModel>;
}

/// The plain model: space and time, no agents.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseRetModel;

impl RetModelDefinition for BaseRetModel {
    fn name(&self) -> &'static str {
        "RetModel"
    }

    fn build(
        &self,
        fixed: &FixedParameters,
        _sample: &BTreeMap<String, ParameterValue>,
        output_path: Option<PathBuf>,
    ) -> Result<RetModel> {
        RetModel::from_fixed(fixed, output_path)
    }
}

fn warn_default(warnings: &mut Vec<String>, message: String) {
    tracing::warn!("⚠️ {}", message);
    warnings.push(message);
}

/// Split a model file into fixed and variable parameters, defaulting anything the
/// model declares but the file leaves out.
pub fn extract_parameters(declared: &ModelParameterSpecification, schema: &RetModelSchema) -> Result<ExtractedParameters> {
    let mut warnings = Vec::new();
    let mut variable = BTreeMap::new();

    for p in &declared.experimental_controls.numeric_parameters {
        let parameter = match schema.experimental_controls.numeric_parameters.get(&p.name) {
            Some(given) => VariableParameter::Numeric {
                min: given.min_val,
                max: given.max_val,
                distribution: given.distribution,
            },
            None => {
                warn_default(
                    &mut warnings,
                    format!(
                        "'{}' not found in model file. Defaulting to only use '[{}, {}]'",
                        p.name, p.min_allowable, p.max_allowable
                    ),
                );
                VariableParameter::Numeric {
                    min: p.min_allowable,
                    max: p.max_allowable,
                    distribution: Default::default(),
                }
            }
        };
        variable.insert(p.name.clone(), parameter);
    }

    for p in &declared.experimental_controls.categoric_parameters {
        let options = match schema.experimental_controls.categoric_parameters.get(&p.name) {
            Some(given) => given.options.clone(),
            None => {
                warn_default(
                    &mut warnings,
                    format!(
                        "'{}' not found in model file. Defaulting to use '{}'",
                        p.name,
                        quoted_list(&p.allowable_options)
                    ),
                );
                p.allowable_options.clone()
            }
        };
        variable.insert(p.name.clone(), VariableParameter::Categoric { options });
    }

    let mut scenario = BTreeMap::new();
    for p in &declared.scenario_dependent_data.numeric_parameters {
        let value = match schema.scenario_dependent_parameters.numeric_parameters.get(&p.name) {
            Some(value) => *value,
            None => {
                warn_default(
                    &mut warnings,
                    format!(
                        "'{}' not found in model file. Defaulting to min allowable '{}'",
                        p.name, p.min_allowable
                    ),
                );
                p.min_allowable
            }
        };
        scenario.insert(p.name.clone(), ParameterValue::Number(value));
    }

    for p in &declared.scenario_dependent_data.categoric_parameters {
        let value = match schema.scenario_dependent_parameters.categoric_parameters.get(&p.name) {
            Some(value) => value.clone(),
            None => {
                let first = p.allowable_options.first().ok_or_else(|| RetError::ConfigValidationError {
                    field: p.name.clone(),
                    message: "Categoric parameter declares no allowable options".to_string(),
                })?;
                warn_default(
                    &mut warnings,
                    format!("'{}' not found in model file. Defaulting to '{}'", p.name, first),
                );
                first.clone()
            }
        };
        scenario.insert(p.name.clone(), ParameterValue::Text(value));
    }

    let playback_writer = match schema.playback_writer.as_str() {
        "None" => None,
        name => match PlaybackWriterKind::from_name(name) {
            Some(kind) => Some(kind),
            None => {
                warn_default(&mut warnings, format!("'{}' is unregistered. Returning None.", name));
                None
            }
        },
    };

    let fixed = FixedParameters {
        start_time: schema.time.start_time,
        end_time: schema.time.end_time,
        time_step: schema.time.time_step,
        space: schema.space.to_model()?,
        model_reporters: (!schema.model_reporters.is_empty()).then(|| schema.model_reporters.clone()),
        agent_reporters: schema.agent_reporters.clone(),
        tables: (!schema.tables.is_empty()).then(|| schema.tables.clone()),
        log_config: schema.log_config.clone(),
        playback_writer,
        random_state: schema.random_state,
        collect_datacollector: schema.collect_datacollector,
        scenario,
    };

    Ok(ExtractedParameters {
        fixed,
        variable,
        warnings,
    })
}

/// Model definitions by name.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Arc<dyn RetModelDefinition>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: Arc<dyn RetModelDefinition>) {
        tracing::debug!("Registered model {}", definition.name());
        self.models.insert(definition.name().to_string(), definition);
    }

    pub fn names(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn RetModelDefinition>> {
        self.models.get(name).cloned().ok_or_else(|| RetError::InvalidConfigValueError {
            field: "model_name".to_string(),
            value: name.to_string(),
            reason: format!("Unknown model, available models: {}", self.names().join(", ")),
        })
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry").field("models", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::tests::BASIC_TOML;
    use crate::testing::MockParametrisedModel;

    fn param_model_schema() -> RetModelSchema {
        let toml = format!(
            r#"{}
[experimental_controls.numeric_parameters.n1]
name = "n1"
min_val = 5.0
max_val = 50.0

[experimental_controls.numeric_parameters.n2]
name = "n2"
min_val = 0.12
max_val = 0.18
distribution = "log"

[experimental_controls.categoric_parameters.c1]
name = "c1"
options = ["Choice 1", "Choice 3"]

[scenario_dependent_parameters.numeric_parameters]
x1 = 15.0

[scenario_dependent_parameters.categoric_parameters]
y1 = "b"
"#,
            BASIC_TOML
        );
        RetModelSchema::from_toml_str(&toml).unwrap()
    }

    #[test]
    fn test_base_model_has_no_parameters() {
        let schema = RetModelSchema::from_toml_str(BASIC_TOML).unwrap();
        let extracted = BaseRetModel.parameter_getter(&schema).unwrap();

        assert!(extracted.variable.is_empty());
        assert!(extracted.fixed.scenario.is_empty());
        assert!(extracted.warnings.is_empty());
        assert_eq!(extracted.fixed.playback_writer, None);
        assert_eq!(extracted.fixed.model_reporters, None);
        assert_eq!(extracted.fixed.random_state, Some(100));
    }

    #[test]
    fn test_given_parameters_are_used() {
        let extracted = MockParametrisedModel.parameter_getter(&param_model_schema()).unwrap();

        assert!(extracted.warnings.is_empty());
        assert_eq!(
            extracted.variable["n2"],
            VariableParameter::Numeric {
                min: 0.12,
                max: 0.18,
                distribution: crate::core::parameters::Distribution::Log
            }
        );
        assert_eq!(
            extracted.variable["c1"],
            VariableParameter::Categoric {
                options: vec!["Choice 1".to_string(), "Choice 3".to_string()]
            }
        );
        assert_eq!(extracted.fixed.scenario["x1"], ParameterValue::Number(15.0));
        assert_eq!(extracted.fixed.scenario["y1"], ParameterValue::Text("b".to_string()));
    }

    #[test]
    fn test_missing_numeric_parameters_default() {
        let mut schema = param_model_schema();
        schema.experimental_controls.numeric_parameters.clear();
        let extracted = MockParametrisedModel.parameter_getter(&schema).unwrap();

        assert_eq!(
            extracted.warnings,
            vec![
                "'n1' not found in model file. Defaulting to only use '[0, 100]'".to_string(),
                "'n2' not found in model file. Defaulting to only use '[0.1, 0.2]'".to_string(),
            ]
        );
        assert_eq!(
            extracted.variable["n1"],
            VariableParameter::Numeric {
                min: 0.0,
                max: 100.0,
                distribution: Default::default()
            }
        );
    }

    #[test]
    fn test_missing_categoric_and_scenario_parameters_default() {
        let mut schema = param_model_schema();
        schema.experimental_controls.categoric_parameters.clear();
        schema.scenario_dependent_parameters.numeric_parameters.clear();
        schema.scenario_dependent_parameters.categoric_parameters.clear();
        let extracted = MockParametrisedModel.parameter_getter(&schema).unwrap();

        assert_eq!(
            extracted.warnings,
            vec![
                "'c1' not found in model file. Defaulting to use '['Choice 1', 'Choice 2', 'Choice 3']'".to_string(),
                "'x1' not found in model file. Defaulting to min allowable '10'".to_string(),
                "'y1' not found in model file. Defaulting to 'a'".to_string(),
            ]
        );
        assert_eq!(extracted.fixed.scenario["x1"], ParameterValue::Number(10.0));
    }

    #[test]
    fn test_playback_writer_lookup() {
        let mut schema = RetModelSchema::from_toml_str(BASIC_TOML).unwrap();
        schema.playback_writer = "JsonWriter".to_string();
        let extracted = BaseRetModel.parameter_getter(&schema).unwrap();
        assert_eq!(extracted.fixed.playback_writer, Some(PlaybackWriterKind::JsonWriter));

        schema.playback_writer = "VideoWriter".to_string();
        let extracted = BaseRetModel.parameter_getter(&schema).unwrap();
        assert_eq!(extracted.fixed.playback_writer, None);
        assert_eq!(extracted.warnings, vec!["'VideoWriter' is unregistered. Returning None.".to_string()]);
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = ModelRegistry::new();
        registry.register(Arc::new(BaseRetModel));

        assert_eq!(registry.get("RetModel").unwrap().name(), "RetModel");
        let err = registry.get("Nope").err().unwrap().to_string();
        assert!(err.contains("RetModel"));
    }
}
