use crate::{
    Amount, LedgerState, Owner, Sha256, Transaction, TransactionId, TransactionInput,
    TransactionOutput,
};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Payment amount and fee must not be negative")]
    NegativeAmount,
    #[error("{0} has no unspent outputs")]
    NoFunds(Owner),
    #[error("Insufficient funds. Have {have}, need {need}")]
    InsufficientFunds { have: Amount, need: Amount },
    #[error("Payment amount plus fee is too large")]
    AmountOverflow,
    #[error("Selected outputs add up to more than an amount can hold")]
    InputValueOverflow,
}

// The data hashed into a transaction identifier.
#[derive(Serialize)]
struct TransactionPreimage<'a> {
    nonce: u64,
    created_at_millis: i64,
    inputs: &'a [TransactionInput],
    outputs: &'a [TransactionOutput],
}

/// Builds transactions and hands out transaction identifiers.
///
/// Two transactions with identical inputs and outputs still get different identifiers,
/// because every identifier mixes in a nonce that only grows.
#[derive(Debug, Default)]
pub struct TransactionFactory {
    next_nonce: u64,
}

impl TransactionFactory {
    pub fn new() -> Self {
        Self { next_nonce: 0 }
    }

    pub fn create_transaction(
        &mut self,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Transaction {
        let id = self.hash_transaction_data(&inputs, &outputs);
        Transaction::new(id, inputs, outputs)
    }

    /// A fresh identifier that belongs to no transaction record, e.g. for a block reward.
    pub fn generate_id(&mut self) -> TransactionId {
        self.hash_transaction_data(&[], &[])
    }

    /// Assembles a payment from `sender` to `recipient` using first-fit coin selection:
    /// the sender's outputs are taken in ledger order until they cover `amount + fee`,
    /// and whatever is left over goes back to the sender as change.
    ///
    /// The result is not validated; admission into the pool decides that.
    pub fn create_payment(
        &mut self,
        ledger: &LedgerState,
        sender: &Owner,
        recipient: &Owner,
        amount: Amount,
        fee: Amount,
    ) -> Result<Transaction, PaymentError> {
        if amount.is_negative() || fee.is_negative() {
            return Err(PaymentError::NegativeAmount);
        }
        let available = ledger.outputs_of(sender);
        if available.is_empty() {
            return Err(PaymentError::NoFunds(sender.clone()));
        }
        let need = amount
            .checked_add(fee)
            .ok_or(PaymentError::AmountOverflow)?;

        let mut inputs = vec![];
        let mut input_sum = Amount::ZERO;
        for (output_ref, value) in available.iter() {
            if input_sum >= need {
                break;
            }
            inputs.push(TransactionInput::new(output_ref.clone(), sender.clone()));
            input_sum = input_sum
                .checked_add(*value)
                .ok_or(PaymentError::InputValueOverflow)?;
        }
        if input_sum < need {
            return Err(PaymentError::InsufficientFunds {
                have: input_sum,
                need,
            });
        }

        let mut outputs = vec![TransactionOutput::new(amount, recipient.clone())];
        let change = input_sum - need;
        if change.is_positive() {
            outputs.push(TransactionOutput::new(change, sender.clone()));
        }
        Ok(self.create_transaction(inputs, outputs))
    }

    fn hash_transaction_data(
        &mut self,
        inputs: &[TransactionInput],
        outputs: &[TransactionOutput],
    ) -> TransactionId {
        let preimage = TransactionPreimage {
            nonce: self.next_nonce,
            created_at_millis: Utc::now().timestamp_millis(),
            inputs,
            outputs,
        };
        self.next_nonce += 1;
        let data = bincode::serialize(&preimage).expect("transaction data is serializable");
        TransactionId::new(Sha256::double_digest(&data).to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputRef;
    use std::collections::HashSet;

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    fn ledger() -> LedgerState {
        let mut ledger = LedgerState::new();
        ledger.put(OutputRef::genesis(0), amount("50"), Owner::from("Alice"));
        ledger.put(OutputRef::genesis(1), amount("30"), Owner::from("Bob"));
        ledger.put(OutputRef::genesis(2), amount("5"), Owner::from("Alice"));
        ledger
    }

    #[test]
    fn identical_transactions_get_unique_ids() {
        let mut factory = TransactionFactory::new();
        let mut ids = HashSet::new();
        for _ in 0..100 {
            ids.insert(factory.create_transaction(vec![], vec![]).id().clone());
        }
        for _ in 0..100 {
            ids.insert(factory.generate_id());
        }
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn ids_are_hex_encoded_sha256() {
        let id = TransactionFactory::new().generate_id();
        assert_eq!(id.as_str().len(), 64);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn payment_with_change() {
        let ledger = ledger();
        let alice = Owner::from("Alice");
        let bob = Owner::from("Bob");
        let payment = TransactionFactory::new()
            .create_payment(&ledger, &alice, &bob, amount("10"), amount("0.1"))
            .unwrap();

        assert_eq!(
            payment.inputs(),
            &vec![TransactionInput::new(OutputRef::genesis(0), alice.clone())]
        );
        assert_eq!(
            payment.outputs(),
            &vec![
                TransactionOutput::new(amount("10"), bob),
                TransactionOutput::new(amount("39.9"), alice),
            ]
        );
    }

    #[test]
    fn payment_spends_several_outputs() {
        let ledger = ledger();
        let alice = Owner::from("Alice");
        let payment = TransactionFactory::new()
            .create_payment(&ledger, &alice, &Owner::from("Bob"), amount("55"), Amount::ZERO)
            .unwrap();
        assert_eq!(payment.inputs().len(), 2);
        // Exact amount, so no change output.
        assert_eq!(payment.outputs().len(), 1);
    }

    #[test]
    fn payment_without_funds() {
        let ledger = ledger();
        let mut factory = TransactionFactory::new();
        let carol = Owner::from("Carol");
        assert_eq!(
            factory.create_payment(&ledger, &carol, &Owner::from("Bob"), amount("1"), amount("0")),
            Err(PaymentError::NoFunds(carol))
        );
        assert_eq!(
            factory.create_payment(
                &ledger,
                &Owner::from("Bob"),
                &Owner::from("Alice"),
                amount("30"),
                amount("0.5")
            ),
            Err(PaymentError::InsufficientFunds {
                have: amount("30"),
                need: amount("30.5"),
            })
        );
    }

    #[test]
    fn payment_reports_overflowing_selection() {
        let mut ledger = LedgerState::new();
        let alice = Owner::from("Alice");
        ledger.put(OutputRef::genesis(0), Amount::from_coins(60_000_000_000), alice.clone());
        ledger.put(OutputRef::genesis(1), Amount::from_coins(60_000_000_000), alice.clone());
        assert_eq!(
            TransactionFactory::new().create_payment(
                &ledger,
                &alice,
                &Owner::from("Bob"),
                amount("90000000000"),
                Amount::ZERO
            ),
            Err(PaymentError::InputValueOverflow)
        );
    }

    #[test]
    fn payment_rejects_negative_amounts() {
        let ledger = ledger();
        assert_eq!(
            TransactionFactory::new().create_payment(
                &ledger,
                &Owner::from("Alice"),
                &Owner::from("Bob"),
                amount("-1"),
                amount("0")
            ),
            Err(PaymentError::NegativeAmount)
        );
    }
}
