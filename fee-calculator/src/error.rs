use {
    simplefees_schedule::FeeEntry,
    simplefees_types::Functionality,
    thiserror::Error,
};

/// Errors produced while pricing a transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeCalculationError {
    /// No service calculator is registered for the transaction kind.
    #[error("No fee calculator registered for {functionality}")]
    UnsupportedFunctionality { functionality: Functionality },

    /// The schedule lacks an entry the transaction kind is priced with.
    #[error("Fee schedule has no entry for {entry}")]
    MissingEntry { entry: FeeEntry },

    /// The signed transaction could not be measured.
    #[error("Failed to measure transaction size: {reason}")]
    Encoding { reason: String },
}

pub type Result<T> = std::result::Result<T, FeeCalculationError>;
