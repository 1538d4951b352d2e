use crate::{Amount, OutputRef, Owner};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A confirmed output that has not been consumed yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnspentOutput {
    amount: Amount,
    owner: Owner,
}

impl UnspentOutput {
    pub fn new(amount: Amount, owner: Owner) -> Self {
        Self { amount, owner }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }
}

/// The authoritative set of unspent transaction outputs.
///
/// A missing key means the output was either spent or never existed. The ledger keeps no
/// tombstones, so the two cases cannot be told apart.
#[derive(Debug, Clone, Default)]
pub struct LedgerState {
    // Ordered so that every view of the ledger enumerates outputs deterministically.
    utxos: BTreeMap<OutputRef, UnspentOutput>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self {
            utxos: BTreeMap::new(),
        }
    }

    /// Inserts the record, overwriting any record already stored under `output_ref`.
    pub fn put(&mut self, output_ref: OutputRef, amount: Amount, owner: Owner) {
        self.utxos.insert(output_ref, UnspentOutput::new(amount, owner));
    }

    /// Removes the record if present. Removing an absent reference does nothing.
    pub fn remove(&mut self, output_ref: &OutputRef) -> Option<UnspentOutput> {
        self.utxos.remove(output_ref)
    }

    pub fn exists(&self, output_ref: &OutputRef) -> bool {
        self.utxos.contains_key(output_ref)
    }

    pub fn get(&self, output_ref: &OutputRef) -> Option<&UnspentOutput> {
        self.utxos.get(output_ref)
    }

    /// Total value owned by `owner`, or None if it does not fit in an `Amount`.
    pub fn balance_of(&self, owner: &Owner) -> Option<Amount> {
        Amount::checked_sum(
            self.utxos
                .values()
                .filter(|utxo| utxo.owner() == owner)
                .map(UnspentOutput::amount),
        )
    }

    pub fn outputs_of(&self, owner: &Owner) -> Vec<(OutputRef, Amount)> {
        self.utxos
            .iter()
            .filter(|(_, utxo)| utxo.owner() == owner)
            .map(|(output_ref, utxo)| (output_ref.clone(), utxo.amount()))
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&OutputRef, &UnspentOutput)> {
        self.utxos.iter()
    }

    /// Total value of all records, or None if it does not fit in an `Amount`.
    pub fn total_value(&self) -> Option<Amount> {
        Amount::checked_sum(self.utxos.values().map(UnspentOutput::amount))
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OutputIndex, TransactionId};

    fn ledger() -> LedgerState {
        let mut ledger = LedgerState::new();
        ledger.put(OutputRef::genesis(0), Amount::from_coins(50), Owner::from("Alice"));
        ledger.put(OutputRef::genesis(1), Amount::from_coins(30), Owner::from("Bob"));
        ledger.put(OutputRef::genesis(2), Amount::from_coins(5), Owner::from("Alice"));
        ledger
    }

    #[test]
    fn put_and_get() {
        let ledger = ledger();
        assert!(ledger.exists(&OutputRef::genesis(1)));
        assert_eq!(
            ledger.get(&OutputRef::genesis(1)),
            Some(&UnspentOutput::new(Amount::from_coins(30), Owner::from("Bob")))
        );
        assert_eq!(ledger.get(&OutputRef::genesis(7)), None);
    }

    #[test]
    fn put_overwrites_existing_record() {
        let mut ledger = ledger();
        ledger.put(OutputRef::genesis(1), Amount::from_coins(1), Owner::from("Carol"));
        assert_eq!(ledger.len(), 3);
        assert_eq!(
            ledger.get(&OutputRef::genesis(1)).map(UnspentOutput::owner),
            Some(&Owner::from("Carol"))
        );
    }

    #[test]
    fn remove_is_idempotent() {
        let mut ledger = ledger();
        assert!(ledger.remove(&OutputRef::genesis(0)).is_some());
        let after_first = ledger.entries().map(|(k, _)| k.clone()).collect::<Vec<_>>();
        assert!(ledger.remove(&OutputRef::genesis(0)).is_none());
        let after_second = ledger.entries().map(|(k, _)| k.clone()).collect::<Vec<_>>();
        assert_eq!(after_first, after_second);
        assert!(!ledger.exists(&OutputRef::genesis(0)));
    }

    #[test]
    fn balance_and_outputs_of_owner() {
        let ledger = ledger();
        let alice = Owner::from("Alice");
        assert_eq!(ledger.balance_of(&alice), Some(Amount::from_coins(55)));
        assert_eq!(ledger.balance_of(&Owner::from("Nobody")), Some(Amount::ZERO));
        assert_eq!(
            ledger.outputs_of(&alice),
            vec![
                (OutputRef::genesis(0), Amount::from_coins(50)),
                (OutputRef::genesis(2), Amount::from_coins(5)),
            ]
        );
    }

    #[test]
    fn total_value_sums_all_records() {
        let mut ledger = ledger();
        assert_eq!(ledger.total_value(), Some(Amount::from_coins(85)));
        ledger.put(
            OutputRef::new(TransactionId::new("tx"), OutputIndex::new(0)),
            Amount::from_base_units(1),
            Owner::from("Bob"),
        );
        assert_eq!(
            ledger.total_value(),
            Some(Amount::from_base_units(8_500_000_001))
        );
    }

    #[test]
    fn sums_past_the_amount_range_are_reported() {
        let mut ledger = LedgerState::new();
        let alice = Owner::from("Alice");
        ledger.put(OutputRef::genesis(0), Amount::from_coins(60_000_000_000), alice.clone());
        ledger.put(OutputRef::genesis(1), Amount::from_coins(60_000_000_000), alice.clone());
        ledger.put(OutputRef::genesis(2), Amount::from_coins(5), Owner::from("Bob"));

        assert_eq!(ledger.balance_of(&alice), None);
        assert_eq!(ledger.total_value(), None);
        assert_eq!(ledger.balance_of(&Owner::from("Bob")), Some(Amount::from_coins(5)));
    }
}
