use crate::scenarios::{run_scenarios, ScenarioOutcome};
use crate::SimulatorConfig;
use clap::{ArgMatches, Command};
use std::error::Error;

pub fn scenarios_command() -> Command<'static> {
    Command::new("scenarios")
        .version("0.1")
        .about("Runs the mempool test scenarios on a fresh genesis ledger.")
}

pub fn run_scenarios_command(_matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    println!("--- Running Test Scenarios ---");
    report_outcomes(&run_scenarios(&SimulatorConfig::default()))
}

/// Prints every outcome and fails if any check failed.
pub(crate) fn report_outcomes(outcomes: &[ScenarioOutcome]) -> Result<(), Box<dyn Error>> {
    for outcome in outcomes {
        println!("{}", outcome);
    }
    let failed = outcomes.iter().filter(|outcome| !outcome.passed).count();
    if failed == 0 {
        Ok(())
    } else {
        Err(format!("{} of {} checks failed", failed, outcomes.len()).into())
    }
}
