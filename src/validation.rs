use crate::{Amount, LedgerState, OutputIndex, OutputRef, Owner, PendingPool, Transaction};
use std::collections::HashSet;
use thiserror::Error;

/// Reasons a transaction may not enter the pending pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Input {0} does not exist in the UTXO set")]
    UnknownInput(OutputRef),
    #[error("Input {0} is spent more than once within the transaction")]
    InternalDoubleSpend(OutputRef),
    #[error("Input {0} is already spent by a pending transaction")]
    PoolConflict(OutputRef),
    #[error("Owner mismatch: {claimed} cannot spend {output_ref} owned by {owner}")]
    OwnershipMismatch {
        output_ref: OutputRef,
        claimed: Owner,
        owner: Owner,
    },
    #[error("Output {index} has a negative amount: {amount}")]
    NegativeOutput { index: OutputIndex, amount: Amount },
    #[error("Input values add up to more than an amount can hold")]
    InputValueOverflow,
    #[error("Insufficient input value: inputs {inputs} < outputs {outputs}")]
    InsufficientInputValue { inputs: Amount, outputs: Amount },
}

/// Decides whether a transaction may be admitted, given the confirmed ledger and
/// the outputs already reserved by pending transactions.
///
/// Checks run in a fixed order and stop at the first failure, so the same transaction
/// is always rejected for the same reason:
///   1. every input exists in the ledger,
///   2. no input is repeated within the transaction,
///   3. no input is reserved by the pending pool,
///   4. the claimed owner of every input matches the ledger,
///   5. no output is negative,
///   6. the input sum is representable and outputs do not exceed it.
/// Checks 1-4 are applied input by input, in input order.
pub struct TransactionValidator {}

impl TransactionValidator {
    /// Returns the fee (inputs minus outputs) of a valid transaction.
    pub fn validate(
        transaction: &Transaction,
        ledger: &LedgerState,
        pool: &PendingPool,
    ) -> Result<Amount, ValidationError> {
        let input_sum = Self::validate_inputs(transaction, ledger, pool)?;
        let output_sum = Self::validate_outputs(transaction)?;
        Self::validate_inputs_cover_outputs(input_sum, output_sum)
    }

    fn validate_inputs(
        transaction: &Transaction,
        ledger: &LedgerState,
        pool: &PendingPool,
    ) -> Result<Option<Amount>, ValidationError> {
        let mut seen = HashSet::new();
        let mut input_values = Vec::with_capacity(transaction.inputs().len());
        for input in transaction.inputs() {
            let output_ref = input.output_ref();
            let utxo = ledger
                .get(output_ref)
                .ok_or_else(|| ValidationError::UnknownInput(output_ref.clone()))?;
            if !seen.insert(output_ref) {
                return Err(ValidationError::InternalDoubleSpend(output_ref.clone()));
            }
            if pool.is_reserved(output_ref) {
                return Err(ValidationError::PoolConflict(output_ref.clone()));
            }
            if utxo.owner() != input.owner() {
                return Err(ValidationError::OwnershipMismatch {
                    output_ref: output_ref.clone(),
                    claimed: input.owner().clone(),
                    owner: utxo.owner().clone(),
                });
            }
            input_values.push(utxo.amount());
        }
        // Summed after the loop so an overflow never hides a failing check on a later input.
        Ok(Amount::checked_sum(input_values))
    }

    /// Returns the output sum, or None in place of a sum too large to represent.
    fn validate_outputs(transaction: &Transaction) -> Result<Option<Amount>, ValidationError> {
        for (index, output) in transaction.outputs().iter().enumerate() {
            if output.amount().is_negative() {
                return Err(ValidationError::NegativeOutput {
                    index: OutputIndex::new(index as u32),
                    amount: output.amount(),
                });
            }
        }
        Ok(Amount::checked_sum(
            transaction.outputs().iter().map(|output| output.amount()),
        ))
    }

    fn validate_inputs_cover_outputs(
        input_sum: Option<Amount>,
        output_sum: Option<Amount>,
    ) -> Result<Amount, ValidationError> {
        let input_sum = input_sum.ok_or(ValidationError::InputValueOverflow)?;
        match output_sum {
            Some(output_sum) if output_sum <= input_sum => Ok(input_sum - output_sum),
            _ => Err(ValidationError::InsufficientInputValue {
                inputs: input_sum,
                outputs: output_sum.unwrap_or(Amount::MAX),
            }),
        }
    }
}
