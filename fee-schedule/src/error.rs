use {
    crate::extra::{Extra, FeeEntry},
    thiserror::Error,
};

/// Errors produced while loading or validating a fee schedule.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// The JSON document does not match the schedule layout.
    #[error("Failed to parse fee schedule: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read fee schedule {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A service entry appears more than once.
    #[error("Duplicate fee schedule entry {entry}")]
    DuplicateEntry { entry: FeeEntry },

    /// An extra is listed twice within one node or service entry.
    #[error("Duplicate extra {extra} in {context}")]
    DuplicateExtra { extra: Extra, context: String },

    /// Both sides of an exchange rate must be positive.
    #[error("Invalid exchange rate {hbar_equiv} HBAR = {cent_equiv} cents")]
    InvalidExchangeRate { hbar_equiv: u32, cent_equiv: u32 },

    /// The schedule is structurally valid JSON but semantically unusable.
    #[error("Invalid fee schedule: {reason}")]
    Invalid { reason: String },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
