use crate::scenarios::run_scenarios;
use crate::{Amount, Owner, Simulator, SimulatorConfig, TransactionId};
use std::io::{self, BufRead, Write};

/// The interactive menu on top of a `Simulator`.
///
/// Reads commands line by line from `input` and writes everything to `output`, so it runs
/// the same against a terminal or a scripted buffer. End of input exits the menu.
pub struct Menu<R, W> {
    simulator: Simulator,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(config: SimulatorConfig, input: R, output: W) -> Self {
        Self {
            simulator: Simulator::with_genesis(config),
            input,
            output,
        }
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "Initial UTXOs (Genesis Block):")?;
        self.print_utxo_set()?;

        loop {
            writeln!(self.output, "\n=== Minicoin Transaction Simulator ===")?;
            writeln!(self.output, "Main Menu:")?;
            writeln!(self.output, "1. Create new transaction")?;
            writeln!(self.output, "2. View UTXO set")?;
            writeln!(self.output, "3. View mempool")?;
            writeln!(self.output, "4. Mine block")?;
            writeln!(self.output, "5. Run test scenarios")?;
            writeln!(self.output, "6. Exit")?;

            let choice = match self.prompt("Enter choice: ")? {
                Some(choice) => choice,
                None => return Ok(()),
            };
            match choice.as_str() {
                "1" => self.create_transaction()?,
                "2" => {
                    writeln!(self.output, "\n--- Current UTXO Set ---")?;
                    self.print_utxo_set()?;
                }
                "3" => self.view_mempool()?,
                "4" => self.mine_block()?,
                "5" => self.run_test_scenarios()?,
                "6" => {
                    writeln!(self.output, "Exiting.")?;
                    return Ok(());
                }
                _ => writeln!(self.output, "Invalid choice.")?,
            }
        }
    }

    /// Returns the trimmed line, or None at the end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn create_transaction(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- Create New Transaction ---")?;
        let Some(sender) = self.prompt("Enter sender: ")? else {
            return Ok(());
        };
        let sender = Owner::new(sender);
        if self.simulator.ledger().outputs_of(&sender).is_empty() {
            return writeln!(self.output, "Error: Sender has no UTXOs/Funds.");
        }
        match self.simulator.balance_of(&sender) {
            Some(balance) => writeln!(self.output, "Available balance: {}", balance)?,
            None => writeln!(self.output, "Available balance: too large to display")?,
        }

        let Some(recipient) = self.prompt("Enter recipient: ")? else {
            return Ok(());
        };
        let Some(amount) = self.prompt("Enter amount to send: ")? else {
            return Ok(());
        };
        let Some(fee) = self.prompt("Enter mining fee (optional, default 0): ")? else {
            return Ok(());
        };
        let amount = match amount.parse::<Amount>() {
            Ok(amount) => amount,
            Err(e) => return writeln!(self.output, "{}", e),
        };
        let fee = if fee.is_empty() {
            Amount::ZERO
        } else {
            match fee.parse::<Amount>() {
                Ok(fee) => fee,
                Err(e) => return writeln!(self.output, "{}", e),
            }
        };

        match self.simulator.send(&sender, &Owner::new(recipient), amount, fee) {
            Ok((id, fee)) => {
                writeln!(self.output, "Transaction created! ID: {}", id)?;
                writeln!(self.output, "Transaction added. Fee: {}", fee)
            }
            Err(e) => writeln!(self.output, "Transaction failed: {}", e),
        }
    }

    fn print_utxo_set(&mut self) -> io::Result<()> {
        for (output_ref, utxo) in self.simulator.ledger().entries() {
            writeln!(
                self.output,
                "Tx: {} [{}] -> {} ({})",
                output_ref.transaction_id(),
                output_ref.output_index(),
                utxo.amount(),
                utxo.owner()
            )?;
        }
        Ok(())
    }

    fn view_mempool(&mut self) -> io::Result<()> {
        let summaries = self.simulator.pool().summaries();
        writeln!(self.output, "\n--- Mempool ({} txs) ---", summaries.len())?;
        for summary in summaries {
            writeln!(
                self.output,
                "ID: {} | Fee: {} | Inputs: {}",
                summary.id, summary.fee, summary.input_count
            )?;
        }
        Ok(())
    }

    fn mine_block(&mut self) -> io::Result<()> {
        if self.simulator.pool().is_empty() {
            return writeln!(self.output, "Mempool is empty. Create a transaction first.");
        }
        let Some(miner) = self.prompt("Enter miner name: ")? else {
            return Ok(());
        };

        writeln!(self.output, "\n--- Pending Transactions in Mempool ---")?;
        let pending = self
            .simulator
            .pool()
            .entries()
            .iter()
            .map(|entry| {
                let sender = entry
                    .transaction()
                    .inputs()
                    .first()
                    .map(|input| input.owner().to_string())
                    .unwrap_or_else(|| "Unknown".to_string());
                (entry.id().clone(), entry.fee(), sender)
            })
            .collect::<Vec<(TransactionId, Amount, String)>>();
        for (position, (id, fee, sender)) in pending.iter().enumerate() {
            writeln!(
                self.output,
                "[{}] ID: {} | Fee: {} | Sender: {}",
                position + 1,
                id,
                fee,
                sender
            )?;
        }
        writeln!(self.output, "\nOptions:")?;
        writeln!(self.output, " - Press ENTER to mine the top transactions by fee")?;
        writeln!(
            self.output,
            " - Type numbers separated by comma (e.g. 1, 3) to mine specific ones"
        )?;
        let Some(selection) = self.prompt("Selection: ")? else {
            return Ok(());
        };

        let selection = if selection.is_empty() {
            None
        } else {
            let positions = match selection
                .split(',')
                .map(|part| part.trim().parse::<usize>())
                .collect::<Result<Vec<usize>, _>>()
            {
                Ok(positions) => positions,
                Err(_) => {
                    return writeln!(self.output, "Invalid input. Please enter numbers like 1, 2.")
                }
            };
            let mut selected = vec![];
            for position in positions {
                match position
                    .checked_sub(1)
                    .and_then(|index| pending.get(index))
                {
                    Some((id, _, _)) => selected.push(id.clone()),
                    None => writeln!(
                        self.output,
                        "Warning: Transaction #{} does not exist. Skipping.",
                        position
                    )?,
                }
            }
            if selected.is_empty() {
                return writeln!(self.output, "No valid transactions selected. Aborting mining.");
            }
            Some(selected)
        };

        match self.simulator.mine(&Owner::new(miner), selection.as_deref()) {
            Ok(block) => {
                writeln!(
                    self.output,
                    "Block mined! Miner {} earned {}.",
                    block.miner, block.reward
                )?;
                writeln!(
                    self.output,
                    "Transactions confirmed: {}",
                    block
                        .committed
                        .iter()
                        .map(TransactionId::to_string)
                        .collect::<Vec<String>>()
                        .join(", ")
                )
            }
            Err(e) => writeln!(self.output, "Mining failed: {}", e),
        }
    }

    fn run_test_scenarios(&mut self) -> io::Result<()> {
        // Scenarios run on their own default simulator, the interactive state and the
        // command line limits are left out.
        writeln!(self.output, "\n--- Running Test Scenarios ---")?;
        for outcome in run_scenarios(&SimulatorConfig::default()) {
            writeln!(self.output, "{}", outcome)?;
        }
        writeln!(self.output, "--- Tests Completed ---")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommitterConfig, PoolConfig};
    use std::io::Cursor;

    fn run_script(script: &str) -> (Menu<Cursor<Vec<u8>>, Vec<u8>>, String) {
        let mut menu = Menu::new(
            SimulatorConfig::default(),
            Cursor::new(script.as_bytes().to_vec()),
            vec![],
        );
        menu.run().unwrap();
        let output = String::from_utf8(menu.output.clone()).unwrap();
        (menu, output)
    }

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[test]
    fn create_and_mine_transaction() {
        let (menu, output) = run_script("1\nAlice\nBob\n10\n0.1\n3\n4\nMiner\n\n2\n6\n");

        assert!(output.contains("Transaction added. Fee: 0.10000000"));
        assert!(output.contains("--- Mempool (1 txs) ---"));
        assert!(output.contains("Block mined! Miner Miner earned 0.10000000."));
        assert!(output.ends_with("Exiting.\n"));

        let simulator = menu.simulator();
        assert_eq!(simulator.balance_of(&Owner::from("Miner")), Some(amount("0.1")));
        assert_eq!(simulator.balance_of(&Owner::from("Bob")), Some(amount("40")));
        assert_eq!(simulator.balance_of(&Owner::from("Alice")), Some(amount("39.9")));
        assert!(simulator.pool().is_empty());
    }

    #[test]
    fn mine_explicit_selection() {
        let (menu, output) = run_script(
            "1\nAlice\nBob\n10\n0.1\n1\nBob\nCharlie\n5\n1\n4\nMiner\n2, 9\n",
        );

        assert!(output.contains("Warning: Transaction #9 does not exist. Skipping."));
        assert!(output.contains("Block mined! Miner Miner earned 1.00000000."));
        let simulator = menu.simulator();
        assert_eq!(simulator.pool().len(), 1);
        assert_eq!(simulator.balance_of(&Owner::from("Charlie")), Some(amount("25")));
    }

    #[test]
    fn rejected_inputs_are_reported() {
        let (menu, output) =
            run_script("1\nNobody\n1\nAlice\nBob\n100\n\n1\nAlice\nBob\nten\n\n4\n7\n");

        assert!(output.contains("Error: Sender has no UTXOs/Funds."));
        assert!(output.contains("Transaction failed: Insufficient funds."));
        assert!(output.contains("Invalid amount: 'ten'"));
        assert!(output.contains("Mempool is empty. Create a transaction first."));
        assert!(output.contains("Invalid choice."));
        assert!(menu.simulator().pool().is_empty());
    }

    #[test]
    fn invalid_selection_aborts_mining() {
        let (menu, output) = run_script("1\nAlice\nBob\n10\n\n4\nMiner\n3\n4\nMiner\none\n");

        assert!(output.contains("No valid transactions selected. Aborting mining."));
        assert!(output.contains("Invalid input. Please enter numbers like 1, 2."));
        assert_eq!(menu.simulator().pool().len(), 1);
        assert_eq!(menu.simulator().height(), 0);
    }

    #[test]
    fn scenarios_do_not_touch_interactive_state() {
        let (menu, output) = run_script("5\n6\n");
        assert!(!output.contains("FAIL"));
        assert!(output.contains("PASS | Race attack (first seen wins)"));
        assert_eq!(
            menu.simulator().ledger().total_value(),
            Some(Amount::from_coins(115))
        );
    }

    #[test]
    fn scenarios_ignore_command_line_limits() {
        let config = SimulatorConfig {
            pool: PoolConfig { capacity: 1 },
            committer: CommitterConfig {
                max_block_transactions: 0,
            },
        };
        let mut menu = Menu::new(config, Cursor::new(b"5\n6\n".to_vec()), vec![]);
        menu.run().unwrap();
        let output = String::from_utf8(menu.output).unwrap();

        assert!(!output.contains("FAIL"), "{}", output);
        assert!(output.contains("PASS | Double spend of a pending input"));
        assert_eq!(menu.simulator.pool().capacity(), 1);
    }
}
