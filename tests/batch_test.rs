use anyhow::Result;
use ret::config::schema::RetModelSchema;
use ret::core::batch::{run_folder, ARCHIVE_FILE_NAME};
use ret::domain::ports::Storage;
use ret::utils::validation::Validate;
use ret::{builtin_registry, BatchRunner, LocalStorage};
use std::fs;
use std::io::Read;
use tempfile::TempDir;

const ENGAGEMENT_TOML: &str = r#"
model_name = "ArmourEngagementModel"
iterations = 2
max_steps = 5
n_experiments = 3
playback_writer = "JsonWriter"
random_state = 42

[time]
start_time = "2021-06-01T06:00:00"
end_time = "2021-06-01T07:00:00"
time_step = 60

[space]
dimensions = 2
x_max = 1000.0
y_max = 1000.0

[experimental_controls.numeric_parameters.blue_start_x]
name = "blue_start_x"
min_val = 0.0
max_val = 200.0

[experimental_controls.categoric_parameters.red_posture]
name = "red_posture"
options = ["hide", "advance"]

[scenario_dependent_parameters.numeric_parameters]
blue_tank_count = 4.0

[scenario_dependent_parameters.categoric_parameters]
red_formation = "column"

[model_reporters]
shots = "shots_fired"

[agent_reporters]
id = "unique_id"
"#;

fn write_model_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("engagement.toml");
    fs::write(&path, ENGAGEMENT_TOML).unwrap();
    path
}

#[tokio::test]
async fn test_engagement_batch_end_to_end() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let model_file = write_model_file(&temp_dir);
    let output = temp_dir.path().join("runs");

    let schema = RetModelSchema::from_file(&model_file)?;
    schema.validate()?;
    let definition = builtin_registry().get(&schema.model_name)?;

    let runner = BatchRunner::new(LocalStorage::new(&output), definition, schema)
        .with_jobs(2)
        .with_archive(true);
    assert_eq!(runner.storage().root(), output.as_path());
    let summary = runner.run().await?;

    assert_eq!(summary.experiments, 3);
    assert_eq!(summary.runs, 6);
    assert!(summary.total_steps <= 30);
    assert!(summary.total_steps > 0);

    let experiments = fs::read_to_string(output.join("experiments.csv"))?;
    let mut lines = experiments.lines();
    assert_eq!(lines.next(), Some("experiment,blue_start_x,red_posture"));
    assert_eq!(lines.count(), 3);

    for experiment in 0..3 {
        for iteration in 0..2 {
            let folder = output.join(run_folder(experiment, iteration));
            assert!(folder.join("playback.json").exists(), "missing playback in {}", folder.display());
            assert!(folder.join("events.csv").exists());
        }
    }

    // 壓縮檔應包含每次執行的輸出
    let archive_path = summary.archive.unwrap();
    assert_eq!(archive_path.file_name().unwrap(), ARCHIVE_FILE_NAME);
    let mut archive = zip::ZipArchive::new(fs::File::open(&archive_path)?)?;
    let mut csv_content = String::new();
    archive.by_name("experiments.csv")?.read_to_string(&mut csv_content)?;
    assert_eq!(csv_content, experiments);
    assert!(archive.by_name("experiment_2/iteration_1/playback.json").is_ok());

    Ok(())
}

#[tokio::test]
async fn test_same_seed_same_design() {
    let temp_dir = TempDir::new().unwrap();
    let model_file = write_model_file(&temp_dir);

    let mut designs = Vec::new();
    for name in ["first", "second"] {
        let schema = RetModelSchema::from_file(&model_file).unwrap();
        let definition = builtin_registry().get(&schema.model_name).unwrap();
        let runner = BatchRunner::new(LocalStorage::new(temp_dir.path().join(name)), definition, schema);
        let (_, samples) = runner.plan().unwrap();
        designs.push(samples);
    }

    assert_eq!(designs[0], designs[1]);
    for sample in &designs[0] {
        let x = sample["blue_start_x"].as_f64().unwrap();
        assert!((0.0..=200.0).contains(&x));
        assert!(["hide", "advance"].contains(&sample["red_posture"].as_str().unwrap()));
    }
}

#[test]
fn test_unknown_model_name() {
    let temp_dir = TempDir::new().unwrap();
    let model_file = write_model_file(&temp_dir);
    let mut schema = RetModelSchema::from_file(&model_file).unwrap();
    schema.model_name = "NoSuchModel".to_string();

    let Err(err) = builtin_registry().get(&schema.model_name) else {
        panic!("NoSuchModel should not be registered");
    };
    let message = err.to_string();
    assert!(message.contains("NoSuchModel"));
    assert!(message.contains("ArmourEngagementModel"));
}
