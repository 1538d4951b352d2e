use crate::commands::scenarios_command::report_outcomes;
use crate::scenarios::run_security_audit;
use crate::SimulatorConfig;
use clap::{ArgMatches, Command};
use std::error::Error;

pub fn audit_command() -> Command<'static> {
    Command::new("audit")
        .version("0.1")
        .about("Runs the security and integrity audit against a fresh ledger.")
}

pub fn run_audit_command(_matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    println!("--- Starting Security & Integrity Audit ---");
    report_outcomes(&run_security_audit(&SimulatorConfig::default()))
}
