use {
    crate::cli::{load_schedule, CliError, OutputFormat, ProcessResult},
    clap::{App, AppSettings, Arg, ArgMatches, SubCommand},
    serde::Serialize,
    simplefees_schedule::{FeeSchedule, ServiceFee},
    std::fmt,
};

#[derive(Debug, PartialEq)]
pub enum ScheduleCliCommand {
    Show { schedule_path: Option<String> },
    Validate { path: String },
}

/// Serializes as the distributed JSON layout.
#[derive(Serialize, Debug)]
#[serde(transparent)]
pub struct CliFeeSchedule(pub FeeSchedule);

fn write_included(f: &mut fmt::Formatter<'_>, fee: &ServiceFee) -> fmt::Result {
    for (extra, count) in &fee.included {
        write!(f, " {extra}<={count}")?;
    }
    Ok(())
}

impl fmt::Display for CliFeeSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let schedule = &self.0;
        writeln!(f, "Simple Fee Schedule (tinycents)")?;
        writeln!(f, "  Node base fee:      {}", schedule.node.base_fee)?;
        for (extra, count) in &schedule.node.included {
            writeln!(f, "    included {extra}: {count}")?;
        }
        writeln!(f, "  Network multiplier: {}", schedule.network.multiplier)?;
        writeln!(f, "  Extras:")?;
        for (extra, price) in &schedule.extras {
            writeln!(f, "    {:<28}{price}", format!("{extra}:"))?;
        }
        writeln!(f, "  Services:")?;
        for (entry, fee) in &schedule.services {
            write!(
                f,
                "    {:<44}{}",
                format!("{}/{entry}:", entry.service()),
                fee.base_fee
            )?;
            write_included(f, fee)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliScheduleValidation {
    pub path: String,
    pub services: usize,
    pub extras: usize,
    pub network_multiplier: u64,
}

impl fmt::Display for CliScheduleValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} is a valid fee schedule ({} services, {} priced extras, network x{})",
            self.path, self.services, self.extras, self.network_multiplier
        )
    }
}

pub trait ScheduleSubCommands {
    fn schedule_subcommands(self) -> Self;
}

impl ScheduleSubCommands for App<'_, '_> {
    fn schedule_subcommands(self) -> Self {
        self.subcommand(
            SubCommand::with_name("schedule")
                .about("Fee schedule inspection commands")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("show")
                        .about("Print a fee schedule")
                        .arg(
                            Arg::with_name("schedule")
                                .long("schedule")
                                .value_name("FILE")
                                .takes_value(true)
                                .help("Fee schedule JSON file [default: built-in schedule]"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("validate")
                        .about("Check that a fee schedule file loads")
                        .arg(
                            Arg::with_name("path")
                                .index(1)
                                .value_name("FILE")
                                .takes_value(true)
                                .required(true)
                                .help("Fee schedule JSON file"),
                        ),
                ),
        )
    }
}

pub fn parse_schedule_command(matches: &ArgMatches<'_>) -> Result<ScheduleCliCommand, CliError> {
    match matches.subcommand() {
        ("show", Some(matches)) => Ok(ScheduleCliCommand::Show {
            schedule_path: matches.value_of("schedule").map(str::to_string),
        }),
        ("validate", Some(matches)) => {
            let path = matches
                .value_of("path")
                .ok_or_else(|| CliError::BadParameter("missing schedule file".into()))?;
            Ok(ScheduleCliCommand::Validate {
                path: path.to_string(),
            })
        }
        (name, _) => Err(CliError::BadParameter(format!(
            "unknown schedule command `{name}`"
        ))),
    }
}

pub fn process_schedule_command(
    command: &ScheduleCliCommand,
    output_format: OutputFormat,
) -> ProcessResult {
    match command {
        ScheduleCliCommand::Show { schedule_path } => {
            let schedule = load_schedule(schedule_path.as_deref())?;
            output_format.formatted_string(&CliFeeSchedule(schedule))
        }
        ScheduleCliCommand::Validate { path } => {
            let schedule = FeeSchedule::from_file(path)?;
            log::info!("fee schedule {path} is valid");
            output_format.formatted_string(&CliScheduleValidation {
                path: path.clone(),
                services: schedule.services.len(),
                extras: schedule.extras.len(),
                network_multiplier: schedule.network.multiplier,
            })
        }
    }
}
