use crate::commands::Menu;
use crate::{CommitterConfig, PoolConfig, SimulatorConfig};
use clap::{Arg, ArgMatches, Command};
use std::error::Error;
use std::io;

struct SimulateCliOptions {
    capacity: usize,
    block_size: usize,
}

impl SimulateCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            capacity: *matches
                .get_one::<usize>("capacity")
                .ok_or("Missing mempool capacity")?,
            block_size: *matches
                .get_one::<usize>("block-size")
                .ok_or("Missing block size")?,
        })
    }

    fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            pool: PoolConfig {
                capacity: self.capacity,
            },
            committer: CommitterConfig {
                max_block_transactions: self.block_size,
            },
        }
    }
}

pub fn simulate_command() -> Command<'static> {
    Command::new("simulate")
        .version("0.1")
        .about("Interactive simulator: create transactions, inspect the UTXO set and mine blocks.")
        .arg(
            Arg::new("capacity")
                .long("capacity")
                .value_name("N")
                .help("Maximum number of transactions the mempool accepts.")
                .takes_value(true)
                .value_parser(clap::value_parser!(usize))
                .default_value("50"),
        )
        .arg(
            Arg::new("block-size")
                .long("block-size")
                .value_name("N")
                .help("Number of top-fee transactions mined when none are picked explicitly.")
                .takes_value(true)
                .value_parser(clap::value_parser!(usize))
                .default_value("5"),
        )
}

pub fn run_simulate_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = SimulateCliOptions::parse(matches)?;
    let stdin = io::stdin();
    let mut menu = Menu::new(options.simulator_config(), stdin.lock(), io::stdout());
    menu.run()?;
    Ok(())
}
