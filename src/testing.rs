//! Small ready-built models for writing tests against `ret`.
//!
//! This is public test-support API. The crate's own integration tests use it, and so can
//! anyone writing their own [`RetModelDefinition`] who wants a seeded model to place
//! agents in. Nothing in the batch runner or the binaries depends on it.

use crate::core::model::{ModelOptions, RetModel};
use crate::core::parameters::{
    CategoricParameterSpecification, ExperimentalControls, FixedParameters, ModelParameterSpecification,
    NumericParameterSpecification, ParameterValue, ScenarioDependentData,
};
use crate::core::registry::RetModelDefinition;
use crate::core::space::Space;
use crate::utils::error::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub fn mock_start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Flat 1000 x 1000 space, one minute steps, seeded so runs repeat.
pub struct MockModel2d;

impl MockModel2d {
    pub fn build() -> RetModel {
        Self::with_options(ModelOptions::default().with_random_state(0))
    }

    pub fn with_options(options: ModelOptions) -> RetModel {
        let start = mock_start_time();
        RetModel::new(
            start,
            Duration::minutes(1),
            start + Duration::days(365),
            Space::new_2d(1000.0, 1000.0),
            options,
        )
        .unwrap_or_else(|e| panic!("mock model settings are valid: {}", e))
    }
}

/// Flat 3d space for airborne agents.
pub struct MockModel3d;

impl MockModel3d {
    pub fn build() -> RetModel {
        let start = mock_start_time();
        RetModel::new(
            start,
            Duration::minutes(1),
            start + Duration::days(365),
            Space::new_3d(1000.0, 1000.0),
            ModelOptions::default().with_random_state(0),
        )
        .unwrap_or_else(|e| panic!("mock model settings are valid: {}", e))
    }
}

/// A model declaring one parameter of every kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockParametrisedModel;

impl RetModelDefinition for MockParametrisedModel {
    fn name(&self) -> &'static str {
        "MockParametrisedModel"
    }

    fn get_parameters(&self) -> ModelParameterSpecification {
        ModelParameterSpecification {
            experimental_controls: ExperimentalControls {
                numeric_parameters: vec![
                    NumericParameterSpecification::new("n1", 0.0, 100.0),
                    NumericParameterSpecification::new("n2", 0.1, 0.2),
                ],
                categoric_parameters: vec![CategoricParameterSpecification::new(
                    "c1",
                    ["Choice 1", "Choice 2", "Choice 3"],
                )],
            },
            scenario_dependent_data: ScenarioDependentData {
                numeric_parameters: vec![NumericParameterSpecification::new("x1", 10.0, 20.0)],
                categoric_parameters: vec![CategoricParameterSpecification::new("y1", ["a", "b", "c"])],
            },
        }
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
