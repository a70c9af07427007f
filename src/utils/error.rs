use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Playback fetch failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Simulation error: {message}")]
    SimulationError { message: String },

    #[error("{message}")]
    TriggerError { message: String },

    #[error("Playback error: {message}")]
    PlaybackError { message: String },

    #[error("Shortcut error: {message}")]
    ShortcutError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Simulation,
    Io,
    Network,
    Data,
    Platform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl RetError {
    pub fn config(message: impl Into<String>) -> Self {
        RetError::ConfigError {
            message: message.into(),
        }
    }

    pub fn simulation(message: impl Into<String>) -> Self {
        RetError::SimulationError {
            message: message.into(),
        }
    }

    pub fn playback(message: impl Into<String>) -> Self {
        RetError::PlaybackError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RetError::ConfigError { .. }
            | RetError::InvalidConfigValueError { .. }
            | RetError::MissingConfigError { .. }
            | RetError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            RetError::SimulationError { .. } | RetError::TriggerError { .. } => {
                ErrorCategory::Simulation
            }
            RetError::IoError(_) | RetError::ZipError(_) => ErrorCategory::Io,
            RetError::HttpError(_) => ErrorCategory::Network,
            RetError::CsvError(_)
            | RetError::SerializationError(_)
            | RetError::PlaybackError { .. }
            | RetError::ProcessingError { .. } => ErrorCategory::Data,
            RetError::ShortcutError { .. } => ErrorCategory::Platform,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data | ErrorCategory::Platform => {
                ErrorSeverity::High
            }
            ErrorCategory::Simulation => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the model file against the v2 schema and fix the reported field"
            }
            ErrorCategory::Simulation => {
                "Check the agents, orders and triggers the model builds for missing arguments"
            }
            ErrorCategory::Io => "Check the output path exists and is writable",
            ErrorCategory::Network => "Check the playback URL is reachable and retry",
            ErrorCategory::Data => "Check the input file is a playback or CSV file produced by ret",
            ErrorCategory::Platform => "Create the shortcut manually on this platform",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            RetError::MissingConfigError { field } => {
                format!("The model file is missing '{}'", field)
            }
            RetError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("'{}' has an invalid value '{}' ({})", field, value, reason),
            RetError::IoError(e) => format!("File system problem: {}", e),
            other => other.to_string(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, RetError>;
