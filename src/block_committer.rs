use crate::{
    Amount, LedgerState, OutputIndex, OutputRef, Owner, PendingPool, PoolEntry,
    TransactionFactory, TransactionId,
};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{info, instrument};

/// Default number of transactions committed per block when the caller doesn't pick them.
pub const DEFAULT_MAX_BLOCK_TRANSACTIONS: usize = 5;

#[derive(Debug, Clone)]
pub struct CommitterConfig {
    // Size of the default `top_by_fee` selection.
    pub max_block_transactions: usize,
}

impl Default for CommitterConfig {
    fn default() -> Self {
        Self {
            max_block_transactions: DEFAULT_MAX_BLOCK_TRANSACTIONS,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    #[error("No transactions selected")]
    EmptySelection,
    #[error("Transaction {0} is not in the mempool")]
    NotInPool(TransactionId),
    #[error("Transaction {0} is selected more than once")]
    DuplicateSelection(TransactionId),
    #[error("Selected fees add up to more than an amount can hold")]
    RewardOverflow,
}

/// The outcome of a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    // Number of non-empty blocks committed so far, including this one.
    pub height: u64,
    pub miner: Owner,
    pub reward: Amount,
    // None when nothing was committed.
    pub reward_output: Option<OutputRef>,
    pub committed: Vec<TransactionId>,
    pub mined_at: DateTime<Utc>,
}

impl BlockSummary {
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }
}

/// Commits pending transactions into the ledger ("mines a block").
///
/// A commit either applies all of its candidates or, when the selection is rejected,
/// nothing at all: every check happens before the ledger or the pool is touched.
#[derive(Debug)]
pub struct BlockCommitter {
    config: CommitterConfig,
    height: u64,
}

impl BlockCommitter {
    pub fn new(config: CommitterConfig) -> Self {
        Self { config, height: 0 }
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    /// Applies the candidates to the ledger, mints a reward output worth their total fee to
    /// `miner` and removes them from the pool.
    ///
    /// Candidates are `selection` in the given order, or the pool's top transactions by fee
    /// when no selection is given. An empty pool commits nothing and mints no reward.
    #[instrument(skip_all, fields(miner = %miner))]
    pub fn commit(
        &mut self,
        miner: &Owner,
        pool: &mut PendingPool,
        ledger: &mut LedgerState,
        factory: &mut TransactionFactory,
        selection: Option<&[TransactionId]>,
    ) -> Result<BlockSummary, CommitError> {
        if pool.is_empty() {
            info!("Mempool is empty. Nothing to commit");
            return Ok(self.empty_block(miner));
        }

        let candidates = match selection {
            Some(ids) => Self::check_selection(ids, pool)?,
            None => pool
                .top_by_fee(self.config.max_block_transactions)
                .into_iter()
                .map(|entry| entry.id().clone())
                .collect(),
        };
        let total_fee = Amount::checked_sum(
            candidates
                .iter()
                .filter_map(|id| pool.get(id))
                .map(PoolEntry::fee),
        )
        .ok_or(CommitError::RewardOverflow)?;
        // Every candidate was resolved against the pool above, so each one is taken.
        let entries = candidates
            .iter()
            .filter_map(|id| pool.drop(id))
            .collect::<Vec<PoolEntry>>();
        if entries.is_empty() {
            return Ok(self.empty_block(miner));
        }

        for entry in &entries {
            let transaction = entry.transaction();
            for input in transaction.inputs() {
                ledger.remove(input.output_ref());
            }
            for (index, output) in transaction.outputs().iter().enumerate() {
                ledger.put(
                    transaction.output_ref(index),
                    output.amount(),
                    output.owner().clone(),
                );
            }
        }

        // The reward has no transaction record, it only exists as a ledger entry.
        let reward_output = OutputRef::new(factory.generate_id(), OutputIndex::new(0));
        ledger.put(reward_output.clone(), total_fee, miner.clone());
        self.height += 1;

        let committed = entries
            .iter()
            .map(|entry| entry.id().clone())
            .collect::<Vec<TransactionId>>();
        info!(
            height = self.height,
            reward = %total_fee,
            transactions = committed.len(),
            "Block committed"
        );
        Ok(BlockSummary {
            height: self.height,
            miner: miner.clone(),
            reward: total_fee,
            reward_output: Some(reward_output),
            committed,
            mined_at: Utc::now(),
        })
    }

    fn check_selection(
        ids: &[TransactionId],
        pool: &PendingPool,
    ) -> Result<Vec<TransactionId>, CommitError> {
        if ids.is_empty() {
            return Err(CommitError::EmptySelection);
        }
        let mut seen = HashSet::new();
        for id in ids {
            if !pool.contains(id) {
                return Err(CommitError::NotInPool(id.clone()));
            }
            if !seen.insert(id) {
                return Err(CommitError::DuplicateSelection(id.clone()));
            }
        }
        Ok(ids.to_vec())
    }

    fn empty_block(&self, miner: &Owner) -> BlockSummary {
        BlockSummary {
            height: self.height,
            miner: miner.clone(),
            reward: Amount::ZERO,
            reward_output: None,
            committed: vec![],
            mined_at: Utc::now(),
        }
    }
}

impl Default for BlockCommitter {
    fn default() -> Self {
        Self::new(CommitterConfig::default())
    }
}
