pub mod cli;
pub mod schema;

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use super::schema::RetModelSchema;
    use crate::utils::error::Result;
    use crate::utils::save::add_datetime_stamp;
    use crate::utils::validation::{validate_file_extension, validate_positive_number, Validate};
    use clap::Parser;
    use std::path::PathBuf;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "ret_model")]
    #[command(about = "Run batches of RET model experiments")]
    pub struct CliConfig {
        /// Model file (.toml or .json)
        pub model_file: PathBuf,

        /// Folder the run folder is created in
        #[arg(short, long, default_value = "./output")]
        pub output: PathBuf,

        /// Model runs executed at the same time
        #[arg(short, long, default_value_t = 1)]
        pub jobs: usize,

        /// Zip the outputs when the batch finishes
        #[arg(long)]
        pub archive: bool,

        /// Write straight into the output folder instead of a time-stamped sub-folder
        #[arg(long)]
        pub no_timestamp: bool,

        /// Override the model file's experiment count
        #[arg(long)]
        pub n_experiments: Option<u32>,

        /// Override the model file's iteration count
        #[arg(long)]
        pub iterations: Option<u32>,

        /// Override the model file's random seed
        #[arg(long)]
        pub random_state: Option<u64>,

        /// Dry run - show the experiment design without running models
        #[arg(long)]
        pub dry_run: bool,

        /// Log process CPU and memory while running
        #[arg(long)]
        pub monitor: bool,

        /// Enable verbose output
        #[arg(short, long)]
        pub verbose: bool,

        /// Log as JSON lines
        #[arg(long)]
        pub json_logs: bool,
    }

    impl CliConfig {
        pub fn apply_overrides(&self, schema: &mut RetModelSchema) {
            if let Some(n) = self.n_experiments {
                schema.n_experiments = n;
                tracing::info!("🔧 n_experiments overridden to: {}", n);
            }
            if let Some(n) = self.iterations {
                schema.iterations = n;
                tracing::info!("🔧 iterations overridden to: {}", n);
            }
            if let Some(seed) = self.random_state {
                schema.random_state = Some(seed);
                tracing::info!("🔧 random_state overridden to: {}", seed);
            }
        }

        pub fn output_dir(&self) -> PathBuf {
            if self.no_timestamp {
                self.output.clone()
            } else {
                add_datetime_stamp(&self.output)
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_file_extension("model_file", &self.model_file.to_string_lossy(), &["toml", "json"])?;
            validate_positive_number("jobs", self.jobs, 1)?;
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_and_validate() {
            let config = CliConfig::parse_from(["ret_model", "model.toml", "--jobs", "4", "--archive"]);
            assert_eq!(config.jobs, 4);
            assert!(config.archive);
            assert!(config.validate().is_ok());

            let config = CliConfig::parse_from(["ret_model", "model.yaml"]);
            assert!(config.validate().is_err());

            let config = CliConfig::parse_from(["ret_model", "model.toml", "--jobs", "0"]);
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_output_dir_stamping() {
            let config = CliConfig::parse_from(["ret_model", "model.toml", "-o", "runs", "--no-timestamp"]);
            assert_eq!(config.output_dir(), PathBuf::from("runs"));

            let config = CliConfig::parse_from(["ret_model", "model.toml", "-o", "runs"]);
            assert_eq!(config.output_dir().parent(), Some(std::path::Path::new("runs")));
        }
    }
}
