//! Canned end-to-end checks run against a fresh ledger.
//!
//! `run_scenarios` walks through the everyday rules of the mempool, `run_security_audit`
//! replays the usual attacks on a UTXO ledger. Every check expects one specific outcome,
//! a rejection has to carry the expected reason to pass.

use crate::{
    initialize_genesis_with, AdmissionError, Amount, OutputIndex, OutputRef, Owner, Simulator,
    SimulatorConfig, TransactionId, TransactionInput, TransactionOutput, ValidationError,
};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl Display for ScenarioOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.passed {
            write!(f, "PASS | {}", self.name)
        } else {
            write!(f, "FAIL | {}\n   Reason: {}", self.name, self.detail)
        }
    }
}

type Submission = Result<(TransactionId, Amount), AdmissionError>;

fn expect_admitted(name: &'static str, result: &Submission) -> ScenarioOutcome {
    match result {
        Ok((id, fee)) => ScenarioOutcome {
            name,
            passed: true,
            detail: format!("Transaction {} admitted. Fee: {}", id, fee),
        },
        Err(e) => ScenarioOutcome {
            name,
            passed: false,
            detail: format!("Expected admission, got: {}", e),
        },
    }
}

fn expect_rejected(
    name: &'static str,
    result: &Submission,
    expected: fn(&AdmissionError) -> bool,
) -> ScenarioOutcome {
    match result {
        Err(e) if expected(e) => ScenarioOutcome {
            name,
            passed: true,
            detail: e.to_string(),
        },
        Err(e) => ScenarioOutcome {
            name,
            passed: false,
            detail: format!("Rejected for the wrong reason: {}", e),
        },
        Ok((id, _)) => ScenarioOutcome {
            name,
            passed: false,
            detail: format!("Transaction {} was admitted", id),
        },
    }
}

fn coins(value: &str) -> Amount {
    // Only called with well-formed decimal literals.
    value.parse().unwrap_or(Amount::ZERO)
}

fn input(index: u32, owner: &str) -> TransactionInput {
    TransactionInput::new(OutputRef::genesis(index), Owner::from(owner))
}

fn output(value: &str, owner: &str) -> TransactionOutput {
    TransactionOutput::new(coins(value), Owner::from(owner))
}

fn is_pool_conflict(e: &AdmissionError) -> bool {
    matches!(e, AdmissionError::Invalid(ValidationError::PoolConflict(_)))
}

/// Everyday mempool rules, run on a fresh genesis ledger.
pub fn run_scenarios(config: &SimulatorConfig) -> Vec<ScenarioOutcome> {
    let mut simulator = Simulator::with_genesis(config.clone());
    let mut outcomes = vec![];

    // Alice has 50 at genesis:0: 10 to Bob, 39.999 change, 0.001 fee.
    let basic = simulator.submit(
        vec![input(0, "Alice")],
        vec![output("10", "Bob"), output("39.999", "Alice")],
    );
    outcomes.push(expect_admitted("Basic valid transaction", &basic));

    let double_spend = simulator.submit(vec![input(0, "Alice")], vec![output("50", "Charlie")]);
    outcomes.push(expect_rejected(
        "Double spend of a pending input",
        &double_spend,
        is_pool_conflict,
    ));

    // Bob has 30 at genesis:1.
    let broke = simulator.submit(vec![input(1, "Bob")], vec![output("35", "Charlie")]);
    outcomes.push(expect_rejected("Insufficient funds", &broke, |e| {
        matches!(
            e,
            AdmissionError::Invalid(ValidationError::InsufficientInputValue { .. })
        )
    }));

    let negative = simulator.submit(vec![input(2, "Charlie")], vec![output("-5", "Bob")]);
    outcomes.push(expect_rejected("Negative output", &negative, |e| {
        matches!(
            e,
            AdmissionError::Invalid(ValidationError::NegativeOutput { .. })
        )
    }));

    // First-seen rule: a low fee transaction reserves the input, a later higher fee
    // transaction spending the same input is rejected.
    simulator.clear_pool();
    let low_fee = simulator.submit(
        vec![input(0, "Alice")],
        vec![output("10", "Bob"), output("39.999", "Alice")],
    );
    let high_fee = simulator.submit(
        vec![input(0, "Alice")],
        vec![output("10", "Bob"), output("39", "Alice")],
    );
    outcomes.push(match low_fee {
        Ok(_) => expect_rejected("Race attack (first seen wins)", &high_fee, is_pool_conflict),
        Err(_) => expect_admitted("Race attack (first seen wins)", &low_fee),
    });

    simulator.clear_pool();
    outcomes
}

/// Attacks against the ledger: money printing, inflation, spoofed ownership, double
/// spending, replaying a mined spend and spending outputs that never existed.
pub fn run_security_audit(config: &SimulatorConfig) -> Vec<ScenarioOutcome> {
    let mut simulator = Simulator::new(config.clone());
    let seeded = initialize_genesis_with(
        simulator.ledger_mut(),
        &[
            (Owner::from("Alice"), Amount::from_coins(50)),
            (Owner::from("Bob"), Amount::from_coins(30)),
        ],
    );
    if let Err(e) = seeded {
        return vec![ScenarioOutcome {
            name: "Seed audit ledger",
            passed: false,
            detail: e.to_string(),
        }];
    }
    let mut outcomes = vec![];

    let negative = simulator.submit(
        vec![input(0, "Alice")],
        vec![output("-100", "Bob"), output("150", "Alice")],
    );
    outcomes.push(expect_rejected("Detect negative outputs", &negative, |e| {
        matches!(
            e,
            AdmissionError::Invalid(ValidationError::NegativeOutput { .. })
        )
    }));

    let inflation = simulator.submit(vec![input(0, "Alice")], vec![output("100", "Bob")]);
    outcomes.push(expect_rejected(
        "Detect inflation (inputs < outputs)",
        &inflation,
        |e| {
            matches!(
                e,
                AdmissionError::Invalid(ValidationError::InsufficientInputValue { .. })
            )
        },
    ));

    let theft = simulator.submit(vec![input(0, "Eve")], vec![output("50", "Eve")]);
    outcomes.push(expect_rejected("Detect ownership spoofing", &theft, |e| {
        matches!(
            e,
            AdmissionError::Invalid(ValidationError::OwnershipMismatch { .. })
        )
    }));

    let valid = simulator.create_transaction(vec![input(0, "Alice")], vec![output("50", "Bob")]);
    let valid_id = valid.id().clone();
    let admitted = simulator
        .submit_transaction(valid.clone())
        .map(|fee| (valid_id, fee));
    outcomes.push(expect_admitted("Admit honest payment", &admitted));

    let double_spend = simulator.submit(vec![input(0, "Alice")], vec![output("50", "Eve")]);
    outcomes.push(expect_rejected(
        "Prevent mempool double spend",
        &double_spend,
        is_pool_conflict,
    ));

    let mined = simulator.mine(&Owner::from("Miner1"), None);
    let replay_id = valid.id().clone();
    let replay = simulator
        .submit_transaction(valid)
        .map(|fee| (replay_id, fee));
    outcomes.push(match mined {
        Ok(_) => expect_rejected("Prevent replay of a mined spend", &replay, |e| {
            matches!(e, AdmissionError::Invalid(ValidationError::UnknownInput(_)))
        }),
        Err(e) => ScenarioOutcome {
            name: "Prevent replay of a mined spend",
            passed: false,
            detail: format!("Mining failed: {}", e),
        },
    });

    let fake = simulator.submit(
        vec![TransactionInput::new(
            OutputRef::new(TransactionId::new("fake_tx_id"), OutputIndex::new(0)),
            Owner::from("Alice"),
        )],
        vec![output("10", "Bob")],
    );
    outcomes.push(expect_rejected("Detect non-existent input", &fake, |e| {
        matches!(e, AdmissionError::Invalid(ValidationError::UnknownInput(_)))
    }));

    outcomes
}
