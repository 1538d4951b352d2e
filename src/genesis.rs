use crate::{Amount, LedgerState, OutputRef, Owner};
use thiserror::Error;

/// The initial allocation: (owner, amount in whole coins).
pub const GENESIS_ALLOCATIONS: [(&str, i64); 5] = [
    ("Alice", 50),
    ("Bob", 30),
    ("Charlie", 20),
    ("David", 10),
    ("Eve", 5),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenesisError {
    #[error("Genesis allocation {index} to {owner} is negative: {amount}")]
    NegativeAllocation {
        index: usize,
        owner: Owner,
        amount: Amount,
    },
    #[error("Genesis allocations add up to more than an amount can hold")]
    SupplyOverflow,
}

/// Seeds the ledger with the fixed genesis outputs `genesis:0` through `genesis:4`.
pub fn initialize_genesis(ledger: &mut LedgerState) {
    for (index, (owner, coins)) in GENESIS_ALLOCATIONS.iter().enumerate() {
        ledger.put(
            OutputRef::genesis(index as u32),
            Amount::from_coins(*coins),
            Owner::from(*owner),
        );
    }
}

/// Seeds the ledger with one genesis output per allocation, indexed in order.
///
/// The allocations together with whatever the ledger already holds must fit in an `Amount`,
/// which bounds the supply: committing only moves value around, so no later sum can
/// overflow. Nothing is written if an allocation is rejected.
pub fn initialize_genesis_with(
    ledger: &mut LedgerState,
    allocations: &[(Owner, Amount)],
) -> Result<(), GenesisError> {
    for (index, (owner, amount)) in allocations.iter().enumerate() {
        if amount.is_negative() {
            return Err(GenesisError::NegativeAllocation {
                index,
                owner: owner.clone(),
                amount: *amount,
            });
        }
    }
    let supply = ledger.total_value().ok_or(GenesisError::SupplyOverflow)?;
    Amount::checked_sum(
        std::iter::once(supply).chain(allocations.iter().map(|(_, amount)| *amount)),
    )
    .ok_or(GenesisError::SupplyOverflow)?;

    for (index, (owner, amount)) in allocations.iter().enumerate() {
        ledger.put(OutputRef::genesis(index as u32), *amount, owner.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_outputs() {
        let mut ledger = LedgerState::new();
        initialize_genesis(&mut ledger);
        assert_eq!(ledger.len(), 5);
        assert_eq!(ledger.total_value(), Some(Amount::from_coins(115)));
        assert_eq!(
            ledger.get(&OutputRef::genesis(0)).map(|utxo| utxo.owner().as_str()),
            Some("Alice")
        );
        assert_eq!(ledger.balance_of(&Owner::from("Eve")), Some(Amount::from_coins(5)));
    }

    #[test]
    fn custom_allocations() {
        let mut ledger = LedgerState::new();
        initialize_genesis_with(
            &mut ledger,
            &[
                (Owner::from("Alice"), Amount::from_coins(7)),
                (Owner::from("Bob"), Amount::ZERO),
            ],
        )
        .unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.balance_of(&Owner::from("Alice")), Some(Amount::from_coins(7)));
    }

    #[test]
    fn oversized_supply_is_rejected() {
        let mut ledger = LedgerState::new();
        let alice = Owner::from("Alice");
        let huge = Amount::from_coins(60_000_000_000);
        assert_eq!(
            initialize_genesis_with(&mut ledger, &[(alice.clone(), huge), (alice, huge)]),
            Err(GenesisError::SupplyOverflow)
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn negative_allocation_is_rejected() {
        let mut ledger = LedgerState::new();
        assert_eq!(
            initialize_genesis_with(
                &mut ledger,
                &[
                    (Owner::from("Alice"), Amount::from_coins(1)),
                    (Owner::from("Bob"), Amount::from_coins(-1)),
                ],
            ),
            Err(GenesisError::NegativeAllocation {
                index: 1,
                owner: Owner::from("Bob"),
                amount: Amount::from_coins(-1),
            })
        );
        assert!(ledger.is_empty());
    }
}
