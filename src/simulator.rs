use crate::{
    initialize_genesis, AdmissionError, Amount, BlockCommitter, BlockSummary, CommitError,
    CommitterConfig, LedgerState, Owner, PaymentError, PendingPool, PoolConfig, Transaction,
    TransactionFactory, TransactionId, TransactionInput, TransactionOutput,
};
use thiserror::Error;

#[derive(Debug, Clone, Default)]
pub struct SimulatorConfig {
    pub pool: PoolConfig,
    pub committer: CommitterConfig,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Admission(#[from] AdmissionError),
}

/// Owns the ledger and the mempool and is the only one that mutates them.
///
/// Admission and commit each run to completion before the next call, so a reservation
/// check and the reservation that follows it can never interleave with another writer.
#[derive(Debug)]
pub struct Simulator {
    ledger: LedgerState,
    pool: PendingPool,
    factory: TransactionFactory,
    committer: BlockCommitter,
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            ledger: LedgerState::new(),
            pool: PendingPool::new(config.pool),
            factory: TransactionFactory::new(),
            committer: BlockCommitter::new(config.committer),
        }
    }

    /// A simulator whose ledger starts from the fixed genesis allocation.
    pub fn with_genesis(config: SimulatorConfig) -> Self {
        let mut simulator = Self::new(config);
        initialize_genesis(&mut simulator.ledger);
        simulator
    }

    pub fn ledger(&self) -> &LedgerState {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut LedgerState {
        &mut self.ledger
    }

    pub fn pool(&self) -> &PendingPool {
        &self.pool
    }

    pub fn height(&self) -> u64 {
        self.committer.height()
    }

    pub fn balance_of(&self, owner: &Owner) -> Option<Amount> {
        self.ledger.balance_of(owner)
    }

    pub fn create_transaction(
        &mut self,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Transaction {
        self.factory.create_transaction(inputs, outputs)
    }

    /// Offers an already built transaction to the mempool and returns its fee.
    pub fn submit_transaction(
        &mut self,
        transaction: Transaction,
    ) -> Result<Amount, AdmissionError> {
        self.pool.admit(transaction, &self.ledger)
    }

    /// Builds a transaction from `inputs` and `outputs` and offers it to the mempool.
    pub fn submit(
        &mut self,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Result<(TransactionId, Amount), AdmissionError> {
        let transaction = self.factory.create_transaction(inputs, outputs);
        let id = transaction.id().clone();
        let fee = self.submit_transaction(transaction)?;
        Ok((id, fee))
    }

    /// Pays `amount` from `sender` to `recipient`, selecting the sender's outputs automatically.
    pub fn send(
        &mut self,
        sender: &Owner,
        recipient: &Owner,
        amount: Amount,
        fee: Amount,
    ) -> Result<(TransactionId, Amount), SendError> {
        let transaction = self
            .factory
            .create_payment(&self.ledger, sender, recipient, amount, fee)?;
        let id = transaction.id().clone();
        let fee = self.submit_transaction(transaction)?;
        Ok((id, fee))
    }

    pub fn mine(
        &mut self,
        miner: &Owner,
        selection: Option<&[TransactionId]>,
    ) -> Result<BlockSummary, CommitError> {
        self.committer.commit(
            miner,
            &mut self.pool,
            &mut self.ledger,
            &mut self.factory,
            selection,
        )
    }

    /// Removes a pending transaction. Returns false if it was not in the mempool.
    pub fn drop_transaction(&mut self, id: &TransactionId) -> bool {
        self.pool.drop(id).is_some()
    }

    pub fn drop_stale_transactions(&mut self) -> Vec<TransactionId> {
        self.pool.drop_stale(&self.ledger)
    }

    pub fn clear_pool(&mut self) {
        self.pool.clear()
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}
