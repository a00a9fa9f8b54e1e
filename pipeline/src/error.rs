use {
    simplefees_schedule::ScheduleError,
    simplefees_types::AccountId,
    thiserror::Error,
};

/// Errors produced while loading or changing the pipeline configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An override produced a document that no longer matches the layout.
    #[error("Failed to apply config override: {0}")]
    Json(#[from] serde_json::Error),

    /// The dotted key names no field.
    #[error("Unknown config key `{key}`")]
    UnknownKey { key: String },

    /// The values parse but cannot be used together.
    #[error("Invalid config: {reason}")]
    Invalid { reason: String },
}

/// Errors produced while assembling a [`FeePipeline`](crate::FeePipeline).
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// A system or node account the pipeline pays into does not exist.
    #[error("Account {account} does not exist in the ledger")]
    MissingAccount { account: AccountId },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
