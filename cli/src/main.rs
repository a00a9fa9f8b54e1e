use {
    clap::{crate_description, crate_name, crate_version, ArgMatches},
    simplefees_cli::{
        clap_app::get_clap_app,
        cli::{parse_command, process_command, CliError, OutputFormat},
    },
    std::process::exit,
};

fn run(matches: &ArgMatches<'_>) -> Result<(), CliError> {
    let command = parse_command(matches)?;
    let output_format = OutputFormat::from_matches(matches);
    let output = process_command(&command, output_format)?;
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = get_clap_app(crate_name!(), crate_description!(), crate_version!()).get_matches();
    if let Err(err) = run(&matches) {
        eprintln!("Error: {err}");
        exit(1);
    }
}
