use {
    crate::cli::{load_schedule, parse_value, CliError, OutputFormat, ProcessResult},
    clap::{App, Arg, ArgMatches, SubCommand},
    serde::Serialize,
    simplefees_calculator::{ExtraCounts, SimpleFeeCalculator},
    simplefees_schedule::{tinycents_to_usd, ExchangeRate, Extra, FeeEntry},
    simplefees_types::Timestamp,
    std::{fmt, str::FromStr},
};

const DEFAULT_HBAR_EQUIV: u32 = 1;
const DEFAULT_CENT_EQUIV: u32 = 12;

#[derive(Debug, PartialEq)]
pub struct CalculateCliCommand {
    pub entries: Vec<FeeEntry>,
    pub extras: ExtraCounts,
    pub schedule_path: Option<String>,
    pub hbar_equiv: u32,
    pub cent_equiv: u32,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CliFeeEstimate {
    pub entries: Vec<String>,
    pub extras: ExtraCounts,
    pub node_tinycents: u64,
    pub network_tinycents: u64,
    pub service_tinycents: u64,
    pub total_tinycents: u64,
    pub total_usd: f64,
    pub hbar_equiv: u32,
    pub cent_equiv: u32,
    pub node_tinybars: u64,
    pub network_tinybars: u64,
    pub service_tinybars: u64,
    pub total_tinybars: u64,
}

impl fmt::Display for CliFeeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fee estimate for {}", self.entries.join(" + "))?;
        for (extra, count) in self.extras.iter() {
            writeln!(f, "  {:<28}{}", format!("{extra}:"), count)?;
        }
        writeln!(
            f,
            "  Node:     {:>16} tinycents {:>14} tinybars",
            self.node_tinycents, self.node_tinybars
        )?;
        writeln!(
            f,
            "  Network:  {:>16} tinycents {:>14} tinybars",
            self.network_tinycents, self.network_tinybars
        )?;
        writeln!(
            f,
            "  Service:  {:>16} tinycents {:>14} tinybars",
            self.service_tinycents, self.service_tinybars
        )?;
        writeln!(
            f,
            "  Total:    {:>16} tinycents {:>14} tinybars",
            self.total_tinycents, self.total_tinybars
        )?;
        writeln!(f, "  Total USD: ${:.6}", self.total_usd)?;
        writeln!(
            f,
            "  Rate:      {} HBAR = {} cents",
            self.hbar_equiv, self.cent_equiv
        )?;
        Ok(())
    }
}

pub trait CalculateSubCommands {
    fn calculate_subcommands(self) -> Self;
}

impl CalculateSubCommands for App<'_, '_> {
    fn calculate_subcommands(self) -> Self {
        self.subcommand(
            SubCommand::with_name("calculate")
                .about("Price explicit extra counts against one or more fee entries")
                .arg(
                    Arg::with_name("entry")
                        .long("entry")
                        .value_name("FEE_ENTRY")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1)
                        .required(true)
                        .help("Schedule entry to charge, e.g. CryptoTransfer"),
                )
                .arg(
                    Arg::with_name("extra")
                        .long("extra")
                        .value_name("NAME=COUNT")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1)
                        .help("Count of a billable extra, e.g. ACCOUNTS=4"),
                )
                .arg(
                    Arg::with_name("signatures")
                        .long("signatures")
                        .value_name("COUNT")
                        .takes_value(true)
                        .help("Signatures on the transaction [default: 1]"),
                )
                .arg(
                    Arg::with_name("bytes")
                        .long("bytes")
                        .value_name("COUNT")
                        .takes_value(true)
                        .help("Serialized transaction size [default: 0]"),
                )
                .arg(
                    Arg::with_name("schedule")
                        .long("schedule")
                        .value_name("FILE")
                        .takes_value(true)
                        .help("Fee schedule JSON file [default: built-in schedule]"),
                )
                .arg(
                    Arg::with_name("hbar-equiv")
                        .long("hbar-equiv")
                        .value_name("HBAR")
                        .takes_value(true)
                        .help("Exchange rate numerator [default: 1]"),
                )
                .arg(
                    Arg::with_name("cent-equiv")
                        .long("cent-equiv")
                        .value_name("CENTS")
                        .takes_value(true)
                        .help("Exchange rate denominator [default: 12]"),
                ),
        )
    }
}

fn parse_extra(value: &str) -> Result<(Extra, u64), CliError> {
    let (name, count) = value
        .split_once('=')
        .ok_or_else(|| CliError::BadParameter(format!("expected NAME=COUNT, got `{value}`")))?;
    let extra = Extra::from_str(&name.trim().to_ascii_uppercase())
        .map_err(|_| CliError::BadParameter(format!("unknown extra `{name}`")))?;
    let count = count
        .trim()
        .parse()
        .map_err(|_| CliError::BadParameter(format!("invalid count `{count}` for {extra}")))?;
    Ok((extra, count))
}

pub fn parse_calculate_command(matches: &ArgMatches<'_>) -> Result<CalculateCliCommand, CliError> {
    let entries = matches
        .values_of("entry")
        .into_iter()
        .flatten()
        .map(|name| {
            FeeEntry::from_str(name)
                .map_err(|_| CliError::BadParameter(format!("unknown fee entry `{name}`")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if entries.is_empty() {
        return Err(CliError::BadParameter("at least one --entry is required".into()));
    }

    let mut extras = matches
        .values_of("extra")
        .into_iter()
        .flatten()
        .map(parse_extra)
        .collect::<Result<ExtraCounts, _>>()?;
    if let Some(signatures) = parse_value(matches, "signatures")? {
        extras.set(Extra::Signatures, signatures);
    } else if extras.get(Extra::Signatures) == 0 {
        extras.set(Extra::Signatures, 1);
    }
    if let Some(bytes) = parse_value(matches, "bytes")? {
        extras.set(Extra::ProcessingBytes, bytes);
    }

    let hbar_equiv = parse_value(matches, "hbar-equiv")?.unwrap_or(DEFAULT_HBAR_EQUIV);
    let cent_equiv = parse_value(matches, "cent-equiv")?.unwrap_or(DEFAULT_CENT_EQUIV);
    if hbar_equiv == 0 || cent_equiv == 0 {
        return Err(CliError::BadParameter(
            "exchange rate components must be positive".into(),
        ));
    }

    Ok(CalculateCliCommand {
        entries,
        extras,
        schedule_path: matches.value_of("schedule").map(str::to_string),
        hbar_equiv,
        cent_equiv,
    })
}

pub fn calculate(command: &CalculateCliCommand) -> Result<CliFeeEstimate, CliError> {
    let schedule = load_schedule(command.schedule_path.as_deref())?;
    let calculator = SimpleFeeCalculator::new(schedule);
    let fees = calculator.calculate_for_entries(&command.entries, &command.extras)?;
    let rate = ExchangeRate::new(
        command.hbar_equiv,
        command.cent_equiv,
        Timestamp::from_secs(i64::MAX),
    );
    let tinybars = fees.to_tinybars(&rate);
    log::debug!("calculated {fees:?} ({tinybars:?} tinybars)");

    Ok(CliFeeEstimate {
        entries: command.entries.iter().map(ToString::to_string).collect(),
        extras: command.extras.clone(),
        node_tinycents: fees.node,
        network_tinycents: fees.network,
        service_tinycents: fees.service,
        total_tinycents: fees.total(),
        total_usd: tinycents_to_usd(fees.total()),
        hbar_equiv: command.hbar_equiv,
        cent_equiv: command.cent_equiv,
        node_tinybars: tinybars.node,
        network_tinybars: tinybars.network,
        service_tinybars: tinybars.service,
        total_tinybars: tinybars.total(),
    })
}

pub fn process_calculate_command(
    command: &CalculateCliCommand,
    output_format: OutputFormat,
) -> ProcessResult {
    let estimate = calculate(command)?;
    output_format.formatted_string(&estimate)
}
