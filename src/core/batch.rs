//! Batch runs: sample experiments, run every iteration on a bounded blocking pool, write outputs.

use crate::config::schema::RetModelSchema;
use crate::core::model::RetModel;
use crate::core::parameters::FixedParameters;
use crate::core::registry::RetModelDefinition;
use crate::core::sampling::{experiments_csv, sample_experiments, Sample};
use crate::domain::ports::Storage;
use crate::playback::PLAYBACK_FILE_NAME;
use crate::utils::error::{Result, RetError};
use crate::utils::monitor::SystemMonitor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use zip::write::{FileOptions, ZipWriter};

pub const ARCHIVE_FILE_NAME: &str = "ret_outputs.zip";

/// Everything one model run produced, ready to hand to storage.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub experiment: usize,
    pub iteration: u32,
    pub steps: u64,
    pub files: Vec<(String, Vec<u8>)>,
    pub playback: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub experiments: usize,
    pub runs: usize,
    pub total_steps: u64,
    pub output_path: PathBuf,
    pub archive: Option<PathBuf>,
}

pub fn run_folder(experiment: usize, iteration: u32) -> String {
    format!("experiment_{}/iteration_{}", experiment, iteration)
}

/// Build and step one model until it stops or `max_steps` is reached.
pub fn run_single(
    definition: &dyn RetModelDefinition,
    fixed: &FixedParameters,
    sample: &Sample,
    output_path: Option<PathBuf>,
    max_steps: u64,
) -> Result<(u64, RetModel)> {
    let mut model = definition.build(fixed, sample, output_path)?;
    let mut steps = 0;
    while model.running() && steps < max_steps {
        model.step()?;
        steps += 1;
    }
    model.finish()?;
    Ok((steps, model))
}

fn collect_outputs(
    definition: &dyn RetModelDefinition,
    fixed: &FixedParameters,
    sample: &Sample,
    output_path: PathBuf,
    max_steps: u64,
    experiment: usize,
    iteration: u32,
) -> Result<RunOutput> {
    let folder = run_folder(experiment, iteration);
    let (steps, model) = run_single(definition, fixed, sample, Some(output_path), max_steps)?;

    let mut files = vec![(format!("{}/events.csv", folder), model.events_csv()?)];
    if let Some(collector) = &model.datacollector {
        files.push((format!("{}/model_data.csv", folder), collector.model_csv()?));
        files.push((format!("{}/agent_data.csv", folder), collector.agent_csv()?));
        for (name, content) in collector.table_csvs()? {
            files.push((format!("{}/{}", folder, name), content));
        }
    }
    let playback = model
        .playback_writer
        .as_ref()
        .and_then(|w| w.output_file())
        .filter(|f| f.exists());

    Ok(RunOutput {
        experiment,
        iteration,
        steps,
        files,
        playback,
    })
}

pub struct BatchRunner<S: Storage> {
    storage: S,
    definition: Arc<dyn RetModelDefinition>,
    schema: RetModelSchema,
    jobs: usize,
    archive: bool,
    monitor: SystemMonitor,
}

impl<S: Storage> BatchRunner<S> {
    pub fn new(storage: S, definition: Arc<dyn RetModelDefinition>, schema: RetModelSchema) -> Self {
        Self {
            storage,
            definition,
            schema,
            jobs: 1,
            archive: false,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_archive(mut self, archive: bool) -> Self {
        self.archive = archive;
        self
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = SystemMonitor::new(enabled);
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Parameter sets for this batch, without running anything.
    pub fn plan(&self) -> Result<(FixedParameters, Vec<Sample>)> {
        let extracted = self.definition.parameter_getter(&self.schema)?;
        let mut rng = match self.schema.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let samples = sample_experiments(&extracted.variable, self.schema.n_experiments as usize, &mut rng)?;
        Ok((extracted.fixed, samples))
    }

    pub async fn run(&self) -> Result<BatchSummary> {
        tracing::info!(
            "🚀 Starting batch: model {} with {} experiments x {} iterations",
            self.definition.name(),
            self.schema.n_experiments,
            self.schema.iterations
        );
        self.monitor.log_stats("Batch start");

        let (fixed, samples) = self.plan()?;
        let mut written = Vec::new();
        self.storage.write_file("experiments.csv", &experiments_csv(&samples)?).await?;
        written.push("experiments.csv".to_string());

        let semaphore = Arc::new(Semaphore::new(self.jobs));
        let iterations = self.schema.iterations;
        let max_steps = self.schema.max_steps;
        let mut handles = Vec::new();

        for (experiment, sample) in samples.iter().enumerate() {
            for iteration in 0..iterations {
                let run_index = experiment as u64 * iterations as u64 + iteration as u64;
                let mut fixed = fixed.clone();
                // 每次執行用不同的種子
                fixed.random_state = fixed.random_state.map(|seed| seed.wrapping_add(run_index));

                let definition = Arc::clone(&self.definition);
                let sample = sample.clone();
                let output_path = self.storage.root().join(run_folder(experiment, iteration));
                let permit = Arc::clone(&semaphore)
                    .acquire_owned()
                    .await
                    .map_err(|e| RetError::simulation(format!("Worker pool closed: {}", e)))?;

                handles.push(tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    collect_outputs(
                        definition.as_ref(),
                        &fixed,
                        &sample,
                        output_path,
                        max_steps,
                        experiment,
                        iteration,
                    )
                }));
            }
        }

        let mut total_steps = 0;
        let mut playbacks = Vec::new();
        let runs = handles.len();
        for (done, handle) in handles.into_iter().enumerate() {
            let output = handle
                .await
                .map_err(|e| RetError::simulation(format!("Model run panicked: {}", e)))??;
            tracing::debug!(
                "Run {}/{} finished after {} steps",
                output.experiment,
                output.iteration,
                output.steps
            );
            self.monitor.log_progress(done + 1, runs);
            total_steps += output.steps;
            for (path, content) in &output.files {
                self.storage.write_file(path, content).await?;
                written.push(path.clone());
            }
            if output.playback.is_some() {
                playbacks.push(format!(
                    "{}/{}",
                    run_folder(output.experiment, output.iteration),
                    PLAYBACK_FILE_NAME
                ));
            }
        }
        self.monitor.log_stats("Runs complete");

        written.extend(playbacks);
        let archive = if self.archive {
            Some(self.write_archive(&written).await?)
        } else {
            None
        };

        tracing::info!("✅ Batch finished: {} runs, {} steps", runs, total_steps);
        self.monitor.log_final_stats();

        Ok(BatchSummary {
            experiments: samples.len(),
            runs,
            total_steps,
            output_path: self.storage.root().to_path_buf(),
            archive,
        })
    }

    async fn write_archive(&self, files: &[String]) -> Result<PathBuf> {
        let mut contents = Vec::with_capacity(files.len());
        for file in files {
            contents.push((file, self.storage.read_file(file).await?));
        }

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (name, data) in contents {
                zip.start_file::<_, ()>(name.as_str(), FileOptions::default())?;
                zip.write_all(&data)?;
            }
            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(ARCHIVE_FILE_NAME, &zip_data).await?;
        Ok(self.storage.root().join(ARCHIVE_FILE_NAME))
    }
}
