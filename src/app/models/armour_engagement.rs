//! Blue armour advancing on a red armour position.

use crate::core::agents::{AgentOptions, ArmourAgent, GroupAgent};
use crate::core::model::RetModel;
use crate::core::orders::{Order, Task, Trigger};
use crate::core::parameters::{
    CategoricParameterSpecification, ExperimentalControls, FixedParameters, ModelMetadata,
    ModelParameterSpecification, NumericParameterSpecification, ParameterValue, ScenarioDependentData,
};
use crate::core::registry::RetModelDefinition;
use crate::domain::{Affiliation, AgentId};
use crate::utils::error::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

const RED_TANKS: usize = 3;
const SPACING: f64 = 25.0;

fn sense_and_fire() -> Vec<Order> {
    vec![
        Order::new(Trigger::immediate(), Task::Sense { direction: None }).persistent(true),
        Order::new(Trigger::immediate(), Task::Fire { location: None }).persistent(true),
    ]
}

fn number(values: &BTreeMap<String, ParameterValue>, name: &str, default: f64) -> f64 {
    values.get(name).and_then(ParameterValue::as_f64).unwrap_or(default)
}

fn text<'a>(values: &'a BTreeMap<String, ParameterValue>, name: &str, default: &'a str) -> &'a str {
    values.get(name).and_then(ParameterValue::as_str).unwrap_or(default)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ArmourEngagementModel;

impl RetModelDefinition for ArmourEngagementModel {
    fn name(&self) -> &'static str {
        "ArmourEngagementModel"
    }

    fn get_parameters(&self) -> ModelParameterSpecification {
        ModelParameterSpecification {
            experimental_controls: ExperimentalControls {
                numeric_parameters: vec![NumericParameterSpecification::new("blue_start_x", 0.0, 200.0)],
                categoric_parameters: vec![CategoricParameterSpecification::new(
                    "red_posture",
                    ["hide", "advance"],
                )],
            },
            scenario_dependent_data: ScenarioDependentData {
                numeric_parameters: vec![NumericParameterSpecification::new("blue_tank_count", 1.0, 10.0)],
                categoric_parameters: vec![CategoricParameterSpecification::new(
                    "red_formation",
                    ["line", "column"],
                )],
            },
        }
    }

    fn get_scenario_independent_metadata(&self) -> ModelMetadata {
        ModelMetadata {
            header: "Armour Engagement".to_string(),
            subtext: vec![
                "A blue armour squadron advances across the map towards a red armour position.".to_string(),
                "Red either hides in place or advances to meet it. Both sides sense and fire every step."
                    .to_string(),
            ],
        }
    }

    fn build(
        &self,
        fixed: &FixedParameters,
        sample: &BTreeMap<String, ParameterValue>,
        output_path: Option<PathBuf>,
    ) -> Result<RetModel> {
        let mut model = RetModel::from_fixed(fixed, output_path)?;

        let (x_min, x_max) = (model.space.x_min, model.space.x_max);
        let y_mid = (model.space.y_min + model.space.y_max) / 2.0;
        let red_x = x_min + 0.8 * (x_max - x_min);
        let blue_x = (x_min + number(sample, "blue_start_x", 0.0)).min(x_max);
        let blue_count = number(&fixed.scenario, "blue_tank_count", 1.0).round().max(1.0) as usize;

        let mut blue = Vec::with_capacity(blue_count);
        for i in 0..blue_count {
            let y = y_mid + (i as f64 - (blue_count as f64 - 1.0) / 2.0) * SPACING;
            let id = ArmourAgent::with_options(
                &mut model,
                (blue_x, y),
                format!("Blue Tank {}", i + 1),
                Affiliation::Friendly,
                AgentOptions {
                    background_orders: sense_and_fire(),
                    ..Default::default()
                },
            )?;
            blue.push(id);
        }
        let squadron = GroupAgent::new(&mut model, "Blue Squadron", Affiliation::Friendly, SPACING, blue)?;
        if let Some(group) = model.agent_mut(squadron) {
            group.add_orders([Order::new(
                Trigger::immediate(),
                Task::CommunicateOrders {
                    orders: vec![Order::new(Trigger::immediate(), Task::move_to((red_x, y_mid), 5.0))],
                },
            )]);
        }

        let column = text(&fixed.scenario, "red_formation", "line") == "column";
        let advance = text(sample, "red_posture", "hide") == "advance";
        let mut red: Vec<AgentId> = Vec::with_capacity(RED_TANKS);
        for i in 0..RED_TANKS {
            let offset = (i as f64 - 1.0) * SPACING;
            let pos = if column { (red_x + offset, y_mid) } else { (red_x, y_mid + offset) };
            let task = if advance { Task::move_to((blue_x, pos.1), 5.0) } else { Task::Hide };
            let id = ArmourAgent::with_options(
                &mut model,
                pos,
                format!("Red Tank {}", i + 1),
                Affiliation::Hostile,
                AgentOptions {
                    orders: vec![Order::new(Trigger::immediate(), task)],
                    background_orders: sense_and_fire(),
                    ..Default::default()
                },
            )?;
            red.push(id);
        }

        tracing::info!(
            "🪖 Armour engagement: {} blue tanks from x={:.0}, {} red tanks {} ({})",
            blue_count,
            blue_x,
            red.len(),
            if advance { "advancing" } else { "hiding" },
            if column { "column" } else { "line" }
        );
        Ok(model)
    }
}
