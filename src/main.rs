use clap::{Arg, Command};
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    let matches = Command::new("minicoin")
        .about("Minicoin UTXO ledger simulator.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log filter used when RUST_LOG is not set, e.g. debug or minicoin_lib=info.")
                .takes_value(true)
                .value_parser(clap::value_parser!(String))
                .default_value("warn"),
        )
        .subcommand(minicoin_lib::commands::simulate_command())
        .subcommand(minicoin_lib::commands::scenarios_command())
        .subcommand(minicoin_lib::commands::audit_command())
        .get_matches();

    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or("warn");
    set_up_logging(log_level);

    match matches.subcommand() {
        Some(("simulate", matches)) => minicoin_lib::commands::run_simulate_command(matches),
        Some(("scenarios", matches)) => minicoin_lib::commands::run_scenarios_command(matches),
        Some(("audit", matches)) => minicoin_lib::commands::run_audit_command(matches),
        _ => unreachable!("Should report help."),
    }
}

fn set_up_logging(default_level: &str) {
    // Logs go to stderr, stdout belongs to the interactive menu.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
