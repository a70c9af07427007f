//! Build many triggers at once from shared or per-trigger arguments.

use super::triggers::{Trigger, TriggerCondition, TriggerType};
use crate::core::feature::{Area, LineFeature};
use crate::domain::{AgentId, Coordinate};
use crate::utils::error::{Result, RetError};
use chrono::NaiveDateTime;

const MISSING_ARGUMENT: &str = "Argument required for selected trigger not given.";
const UNSUPPORTED_TYPE: &str = "Selected Trigger Type does not exist.";

/// One value for every trigger, or one slot per trigger (gaps allowed).
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerArg<T> {
    One(T),
    Each(Vec<Option<T>>),
}

impl<T: Clone> TriggerArg<T> {
    pub fn get(&self, index: usize) -> Option<T> {
        match self {
            TriggerArg::One(value) => Some(value.clone()),
            TriggerArg::Each(values) => values.get(index).cloned().flatten(),
        }
    }
}

impl<T> From<Vec<Option<T>>> for TriggerArg<T> {
    fn from(values: Vec<Option<T>>) -> Self {
        TriggerArg::Each(values)
    }
}

/// Arguments shared by [`create_triggers`]. Anything a trigger type does not use is ignored.
#[derive(Debug, Clone, Default)]
pub struct TriggerArgs {
    pub sticky: Option<TriggerArg<bool>>,
    pub log: Option<TriggerArg<bool>>,
    pub invert: Option<TriggerArg<bool>>,
    pub position: Option<TriggerArg<Coordinate>>,
    pub agent: Option<TriggerArg<AgentId>>,
    pub tolerance: Option<TriggerArg<f64>>,
    pub area: Option<TriggerArg<Area>>,
    pub boundary: Option<TriggerArg<LineFeature>>,
    pub time: Option<TriggerArg<NaiveDateTime>>,
}

fn arg<T: Clone>(value: &Option<TriggerArg<T>>, index: usize) -> Option<T> {
    value.as_ref().and_then(|v| v.get(index))
}

/// Error unless every value is present.
pub fn check_arg_not_none<T>(values: &[Option<T>]) -> Result<()> {
    if values.iter().any(Option::is_none) {
        return Err(RetError::TriggerError {
            message: MISSING_ARGUMENT.to_string(),
        });
    }
    Ok(())
}

/// Fill `sticky`, `log` and `invert` with their defaults (false, true, false).
pub fn check_optional_args(sticky: Option<bool>, log: Option<bool>, invert: Option<bool>) -> [bool; 3] {
    [
        sticky.unwrap_or(false),
        log.unwrap_or(true),
        invert.unwrap_or(false),
    ]
}

fn required<T>(value: Option<T>) -> Result<T> {
    value.ok_or_else(|| RetError::TriggerError {
        message: MISSING_ARGUMENT.to_string(),
    })
}

fn build_condition(trigger_type: TriggerType, args: &TriggerArgs, i: usize) -> Result<TriggerCondition> {
    let condition = match trigger_type {
        TriggerType::Immediate => TriggerCondition::Immediate,
        TriggerType::ImmediateSensorFusion => TriggerCondition::ImmediateSensorFusion,
        TriggerType::KilledAgentsAtPosition => TriggerCondition::KilledAgentsAtPosition {
            position: required(arg(&args.position, i))?,
            tolerance: required(arg(&args.tolerance, i))?,
        },
        TriggerType::AliveAgentsAtPosition => TriggerCondition::AliveAgentsAtPosition {
            position: required(arg(&args.position, i))?,
            tolerance: required(arg(&args.tolerance, i))?,
        },
        TriggerType::AgentAtPosition => TriggerCondition::AgentAtPosition {
            agent: required(arg(&args.agent, i))?,
            position: required(arg(&args.position, i))?,
            tolerance: required(arg(&args.tolerance, i))?,
        },
        TriggerType::AgentInArea => TriggerCondition::AgentInArea {
            agent: required(arg(&args.agent, i))?,
            area: required(arg(&args.area, i))?,
        },
        TriggerType::AgentNotInArea => TriggerCondition::AgentNotInArea {
            agent: required(arg(&args.agent, i))?,
            area: required(arg(&args.area, i))?,
        },
        TriggerType::AgentCrossedBoundary => TriggerCondition::AgentCrossedBoundary {
            agent: required(arg(&args.agent, i))?,
            boundary: required(arg(&args.boundary, i))?,
            last_position: None,
        },
        TriggerType::AgentMovedOutOfArea => TriggerCondition::AgentMovedOutOfArea {
            agent: required(arg(&args.agent, i))?,
            area: required(arg(&args.area, i))?,
            was_inside: false,
        },
        TriggerType::AgentKilled => TriggerCondition::AgentKilled {
            agent: required(arg(&args.agent, i))?,
        },
        TriggerType::Time => TriggerCondition::Time {
            time: required(arg(&args.time, i))?,
        },
        TriggerType::AgentFiredWeapon => TriggerCondition::AgentFiredWeapon {
            agent: required(arg(&args.agent, i))?,
        },
        TriggerType::WeaponFiredNearAgent => TriggerCondition::WeaponFiredNearAgent {
            agent: required(arg(&args.agent, i))?,
            tolerance: required(arg(&args.tolerance, i))?,
        },
        TriggerType::WeaponFiredNearLocation => TriggerCondition::WeaponFiredNearLocation {
            position: required(arg(&args.position, i))?,
            tolerance: required(arg(&args.tolerance, i))?,
        },
        TriggerType::CompoundAnd | TriggerType::CompoundOr => {
            return Err(RetError::TriggerError {
                message: UNSUPPORTED_TYPE.to_string(),
            })
        }
    };
    Ok(condition)
}

/// Create `number` triggers. Compound triggers must be assembled by hand.
pub fn create_triggers(
    number: usize,
    trigger_type: impl Into<TriggerArg<TriggerType>>,
    args: &TriggerArgs,
) -> Result<Vec<Trigger>> {
    let trigger_type = trigger_type.into();
    let mut triggers = Vec::with_capacity(number);

    for i in 0..number {
        let kind = required(trigger_type.get(i))?;
        let condition = build_condition(kind, args, i)?;
        let [sticky, log, invert] = check_optional_args(
            arg(&args.sticky, i),
            arg(&args.log, i),
            arg(&args.invert, i),
        );
        triggers.push(Trigger::new(condition).with_flags(sticky, log, invert));
    }

    tracing::debug!("Created {} triggers", triggers.len());
    Ok(triggers)
}

impl From<TriggerType> for TriggerArg<TriggerType> {
    fn from(value: TriggerType) -> Self {
        TriggerArg::One(value)
    }
}

impl From<Vec<TriggerType>> for TriggerArg<TriggerType> {
    fn from(values: Vec<TriggerType>) -> Self {
        TriggerArg::Each(values.into_iter().map(Some).collect())
    }
}
