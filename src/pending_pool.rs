use crate::{
    Amount, LedgerState, OutputRef, Transaction, TransactionId, TransactionValidator,
    ValidationError,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Default maximum number of pending transactions.
pub const DEFAULT_POOL_CAPACITY: usize = 50;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    // Admission is refused once the pool holds this many transactions.
    pub capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("Mempool is full: {capacity} transactions")]
    PoolFull { capacity: usize },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// An admitted transaction waiting to be committed.
#[derive(Debug, Clone)]
pub struct PoolEntry {
    transaction: Transaction,
    fee: Amount,
    // Admission order, breaks ties between equal fees.
    sequence: u64,
    admitted_at: DateTime<Utc>,
}

impl PoolEntry {
    pub fn id(&self) -> &TransactionId {
        self.transaction.id()
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn fee(&self) -> Amount {
        self.fee
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn admitted_at(&self) -> &DateTime<Utc> {
        &self.admitted_at
    }

    pub fn summary(&self) -> PoolEntrySummary {
        PoolEntrySummary {
            id: self.id().clone(),
            fee: self.fee,
            input_count: self.transaction.inputs().len(),
        }
    }
}

/// A read-only view of a pool entry for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolEntrySummary {
    pub id: TransactionId,
    pub fee: Amount,
    pub input_count: usize,
}

/// Transactions that passed validation but are not committed yet (the mempool).
///
/// Every input of a pooled transaction is reserved: a later transaction spending the same
/// output is rejected no matter what fee it offers, until the first one is dropped or
/// committed. The reservation set is always exactly the union of the inputs of the pooled
/// transactions.
#[derive(Debug)]
pub struct PendingPool {
    config: PoolConfig,
    // Kept in admission order.
    entries: Vec<PoolEntry>,
    reserved: HashSet<OutputRef>,
    next_sequence: u64,
}

impl PendingPool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            entries: vec![],
            reserved: HashSet::new(),
            next_sequence: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(PoolConfig::default())
    }

    /// Validates the transaction against the ledger and the current reservations and,
    /// if it is valid, adds it to the pool and reserves its inputs. Returns the fee.
    ///
    /// A rejected transaction leaves the pool untouched.
    #[instrument(skip_all, fields(tx_id = %transaction.id()))]
    pub fn admit(
        &mut self,
        transaction: Transaction,
        ledger: &LedgerState,
    ) -> Result<Amount, AdmissionError> {
        if self.entries.len() >= self.config.capacity {
            debug!(capacity = self.config.capacity, "Rejected, mempool is full");
            return Err(AdmissionError::PoolFull {
                capacity: self.config.capacity,
            });
        }

        let fee = TransactionValidator::validate(&transaction, ledger, self).map_err(|e| {
            debug!(reason = %e, "Rejected transaction");
            e
        })?;

        for input in transaction.inputs() {
            self.reserved.insert(input.output_ref().clone());
        }
        self.entries.push(PoolEntry {
            transaction,
            fee,
            sequence: self.next_sequence,
            admitted_at: Utc::now(),
        });
        self.next_sequence += 1;
        debug!(%fee, pool_size = self.entries.len(), "Admitted transaction");
        Ok(fee)
    }

    /// Removes the transaction and releases its reservations. Does nothing if it is absent.
    pub fn drop(&mut self, id: &TransactionId) -> Option<PoolEntry> {
        let index = self.entries.iter().position(|entry| entry.id() == id)?;
        let entry = self.entries.remove(index);
        for input in entry.transaction().inputs() {
            self.reserved.remove(input.output_ref());
        }
        Some(entry)
    }

    /// Drops every entry that spends an output no longer present in the ledger.
    pub fn drop_stale(&mut self, ledger: &LedgerState) -> Vec<TransactionId> {
        let stale = self
            .entries
            .iter()
            .filter(|entry| {
                entry
                    .transaction()
                    .inputs()
                    .iter()
                    .any(|input| !ledger.exists(input.output_ref()))
            })
            .map(|entry| entry.id().clone())
            .collect::<Vec<TransactionId>>();
        for id in &stale {
            warn!(tx_id = %id, "Dropping stale transaction");
            self.drop(id);
        }
        stale
    }

    /// Up to `n` entries, highest fee first. Equal fees keep admission order.
    pub fn top_by_fee(&self, n: usize) -> Vec<&PoolEntry> {
        let mut entries = self.entries.iter().collect::<Vec<&PoolEntry>>();
        entries.sort_by(|lhs, rhs| {
            rhs.fee
                .cmp(&lhs.fee)
                .then_with(|| lhs.sequence.cmp(&rhs.sequence))
        });
        entries.truncate(n);
        entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.reserved.clear();
    }

    pub fn get(&self, id: &TransactionId) -> Option<&PoolEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.get(id).is_some()
    }

    /// Entries in admission order.
    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    pub fn summaries(&self) -> Vec<PoolEntrySummary> {
        self.entries.iter().map(PoolEntry::summary).collect()
    }

    pub fn is_reserved(&self, output_ref: &OutputRef) -> bool {
        self.reserved.contains(output_ref)
    }

    pub fn reservations(&self) -> &HashSet<OutputRef> {
        &self.reserved
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
