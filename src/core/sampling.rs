//! Experiment design: Latin hypercube samples for numeric controls, uniform draws for categoric ones.

use crate::core::parameters::{Distribution, ParameterValue, VariableParameter};
use crate::utils::error::{Result, RetError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

pub type Sample = BTreeMap<String, ParameterValue>;

/// One stratified point in `[0, 1)` per experiment, in random order.
fn latin_hypercube_column(n: usize, rng: &mut StdRng) -> Vec<f64> {
    let mut column: Vec<f64> = (0..n)
        .map(|i| (i as f64 + rng.random::<f64>()) / n as f64)
        .collect();
    column.shuffle(rng);
    column
}

fn scale(unit: f64, min: f64, max: f64, distribution: Distribution) -> f64 {
    match distribution {
        Distribution::Range => min + unit * (max - min),
        Distribution::Log => (min.ln() + unit * (max.ln() - min.ln())).exp(),
    }
}

/// Draw `n` parameter sets. Parameters are visited in name order so a seed always
/// gives the same design.
pub fn sample_experiments(
    variable: &BTreeMap<String, VariableParameter>,
    n: usize,
    rng: &mut StdRng,
) -> Result<Vec<Sample>> {
    let mut samples = vec![Sample::new(); n];
    if n == 0 {
        return Ok(samples);
    }

    for (name, parameter) in variable {
        match parameter {
            VariableParameter::Numeric { min, max, distribution } => {
                if min > max {
                    return Err(RetError::InvalidConfigValueError {
                        field: name.clone(),
                        value: format!("[{}, {}]", min, max),
                        reason: "Minimum is greater than maximum".to_string(),
                    });
                }
                if *distribution == Distribution::Log && *min <= 0.0 {
                    return Err(RetError::InvalidConfigValueError {
                        field: name.clone(),
                        value: min.to_string(),
                        reason: "Log distributions need a positive minimum".to_string(),
                    });
                }
                let column = latin_hypercube_column(n, rng);
                for (sample, unit) in samples.iter_mut().zip(column) {
                    sample.insert(
                        name.clone(),
                        ParameterValue::Number(scale(unit, *min, *max, *distribution)),
                    );
                }
            }
            VariableParameter::Categoric { options } => {
                if options.is_empty() {
                    return Err(RetError::ConfigValidationError {
                        field: name.clone(),
                        message: "At least one option is required".to_string(),
                    });
                }
                for sample in samples.iter_mut() {
                    let choice = &options[rng.random_range(0..options.len())];
                    sample.insert(name.clone(), ParameterValue::Text(choice.clone()));
                }
            }
        }
    }

    tracing::debug!("Sampled {} experiments over {} parameters", n, variable.len());
    Ok(samples)
}

/// `experiments.csv`: one row per experiment, one column per parameter.
pub fn experiments_csv(samples: &[Sample]) -> Result<Vec<u8>> {
    let names: Vec<&String> = samples.first().map(|s| s.keys().collect()).unwrap_or_default();

    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["experiment".to_string()];
    header.extend(names.iter().map(|n| n.to_string()));
    writer.write_record(&header)?;

    for (index, sample) in samples.iter().enumerate() {
        let mut row = vec![index.to_string()];
        row.extend(names.iter().map(|n| sample.get(*n).map(|v| v.to_string()).unwrap_or_default()));
        writer.write_record(&row)?;
    }

    writer.into_inner().map_err(|e| RetError::ProcessingError {
        message: format!("CSV buffer error: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn controls() -> BTreeMap<String, VariableParameter> {
        let mut variable = BTreeMap::new();
        variable.insert(
            "speed".to_string(),
            VariableParameter::Numeric {
                min: 0.0,
                max: 10.0,
                distribution: Distribution::Range,
            },
        );
        variable.insert(
            "range".to_string(),
            VariableParameter::Numeric {
                min: 1.0,
                max: 1000.0,
                distribution: Distribution::Log,
            },
        );
        variable.insert(
            "posture".to_string(),
            VariableParameter::Categoric {
                options: vec!["hide".to_string(), "advance".to_string()],
            },
        );
        variable
    }

    #[test]
    fn test_each_stratum_hit_once() {
        let mut rng = StdRng::seed_from_u64(3);
        let samples = sample_experiments(&controls(), 10, &mut rng).unwrap();

        let mut strata: Vec<usize> = samples
            .iter()
            .map(|s| s["speed"].as_f64().unwrap().floor() as usize)
            .collect();
        strata.sort();
        assert_eq!(strata, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_log_samples_spread_over_decades() {
        let mut rng = StdRng::seed_from_u64(3);
        let samples = sample_experiments(&controls(), 3, &mut rng).unwrap();

        let mut decades: Vec<i32> = samples
            .iter()
            .map(|s| s["range"].as_f64().unwrap().log10().floor() as i32)
            .collect();
        decades.sort();
        assert_eq!(decades, vec![0, 1, 2]);
    }

    #[test]
    fn test_same_seed_same_design() {
        let a = sample_experiments(&controls(), 5, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = sample_experiments(&controls(), 5, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
        assert!(a
            .iter()
            .all(|s| matches!(s["posture"].as_str(), Some("hide") | Some("advance"))));
    }

    #[test]
    fn test_invalid_controls_rejected() {
        let mut variable = BTreeMap::new();
        variable.insert("empty".to_string(), VariableParameter::Categoric { options: vec![] });
        assert!(sample_experiments(&variable, 2, &mut StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn test_experiments_csv_header() {
        let samples = sample_experiments(&controls(), 2, &mut StdRng::seed_from_u64(1)).unwrap();
        let csv = String::from_utf8(experiments_csv(&samples).unwrap()).unwrap();
        assert_eq!(csv.lines().next(), Some("experiment,posture,range,speed"));
        assert_eq!(csv.lines().count(), 3);
    }
}
