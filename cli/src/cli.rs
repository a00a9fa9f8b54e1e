use {
    crate::{
        calculate::{process_calculate_command, CalculateCliCommand},
        schedule::{process_schedule_command, ScheduleCliCommand},
    },
    clap::ArgMatches,
    simplefees_calculator::FeeCalculationError,
    simplefees_schedule::{FeeSchedule, ScheduleError},
    std::str::FromStr,
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Bad parameter: {0}")]
    BadParameter(String),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("Fee calculation failed: {0}")]
    FeeCalculation(#[from] FeeCalculationError),
    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ProcessResult = Result<String, CliError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Display,
    Json,
    JsonCompact,
}

impl OutputFormat {
    /// Reads `--output` from whichever subcommand level it was given at.
    pub fn from_matches(matches: &ArgMatches<'_>) -> Self {
        let mut level = Some(matches);
        let mut value = None;
        while let Some(matches) = level {
            value = matches.value_of("output_format").or(value);
            level = matches.subcommand().1;
        }
        match value {
            Some("json") => Self::Json,
            Some("json-compact") => Self::JsonCompact,
            _ => Self::Display,
        }
    }

    pub fn formatted_string<T>(self, item: &T) -> ProcessResult
    where
        T: serde::Serialize + std::fmt::Display,
    {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(item)?),
            Self::JsonCompact => Ok(serde_json::to_string(item)?),
            Self::Display => Ok(item.to_string()),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum CliCommand {
    Calculate(CalculateCliCommand),
    Schedule(ScheduleCliCommand),
}

pub fn parse_command(matches: &ArgMatches<'_>) -> Result<CliCommand, CliError> {
    match matches.subcommand() {
        ("calculate", Some(matches)) => {
            crate::calculate::parse_calculate_command(matches).map(CliCommand::Calculate)
        }
        ("schedule", Some(matches)) => {
            crate::schedule::parse_schedule_command(matches).map(CliCommand::Schedule)
        }
        (name, _) => Err(CliError::BadParameter(format!("unknown command `{name}`"))),
    }
}

pub fn process_command(command: &CliCommand, output_format: OutputFormat) -> ProcessResult {
    match command {
        CliCommand::Calculate(command) => process_calculate_command(command, output_format),
        CliCommand::Schedule(command) => process_schedule_command(command, output_format),
    }
}

/// Loads `path`, or the canonical schedule when no path is given.
pub fn load_schedule(path: Option<&str>) -> Result<FeeSchedule, CliError> {
    match path {
        Some(path) => {
            log::debug!("loading fee schedule from {path}");
            Ok(FeeSchedule::from_file(path)?)
        }
        None => Ok(FeeSchedule::canonical()),
    }
}

pub(crate) fn parse_value<T: FromStr>(
    matches: &ArgMatches<'_>,
    name: &str,
) -> Result<Option<T>, CliError> {
    matches
        .value_of(name)
        .map(|value| {
            value
                .parse()
                .map_err(|_| CliError::BadParameter(format!("invalid value `{value}` for --{name}")))
        })
        .transpose()
}
