use thiserror::Error;

/// A required attribute on one input row is missing or malformed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row} (employee {employee_id}): field {field} {problem}")]
pub struct DataError {
    pub row: usize,
    pub employee_id: String,
    pub field: &'static str,
    pub problem: DataProblem,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataProblem {
    #[error("is missing")]
    Missing,
    #[error("is not a number: {0:?}")]
    NotNumeric(String),
    #[error("is not finite")]
    NotFinite,
    #[error("is not a boolean: {0:?}")]
    NotBoolean(String),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read employee table: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Reasons a statistical model was skipped for a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelSkip {
    #[error("target has {distinct} distinct class(es); at least two are required")]
    InsufficientClassVariation { distinct: usize },
    #[error("population of {available} record(s) is too small; {required} required")]
    InsufficientPopulation { available: usize, required: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write csv artifact: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to encode json artifact: {0}")]
    Json(#[from] serde_json::Error),
}
