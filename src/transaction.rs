use crate::{Amount, Owner};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifier of the transaction that seeds the initial ledger state.
pub const GENESIS_TRANSACTION_ID: &str = "genesis";

/// Identifies a transaction. Generated identifiers are hex-encoded double SHA-256 digests.
#[derive(Debug, Clone, Hash, Ord, PartialOrd, Eq, PartialEq, Serialize, Deserialize)]
pub struct TransactionId(String);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn genesis() -> Self {
        Self::new(GENESIS_TRANSACTION_ID)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The index of the transaction output, the first one is 0.
#[derive(Debug, Copy, Clone, Hash, Ord, PartialOrd, Eq, PartialEq, Serialize, Deserialize)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

/// Points at exactly one output: the transaction that created it and its position there.
#[derive(Debug, Clone, Hash, Ord, PartialOrd, Eq, PartialEq, Serialize, Deserialize)]
pub struct OutputRef {
    transaction_id: TransactionId,
    output_index: OutputIndex,
}

impl Display for OutputRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

impl OutputRef {
    pub fn new(transaction_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            transaction_id,
            output_index,
        }
    }

    pub fn genesis(index: u32) -> Self {
        Self::new(TransactionId::genesis(), OutputIndex::new(index))
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn output_index(&self) -> OutputIndex {
        self.output_index
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    // The unspent output being consumed.
    output_ref: OutputRef,
    // Must equal the owner recorded in the ledger for `output_ref`.
    owner: Owner,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.output_ref, self.owner)
    }
}

impl TransactionInput {
    pub fn new(output_ref: OutputRef, owner: Owner) -> Self {
        Self { output_ref, owner }
    }

    pub fn output_ref(&self) -> &OutputRef {
        &self.output_ref
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    amount: Amount,
    owner: Owner,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.amount, self.owner)
    }
}

impl TransactionOutput {
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

/// A proposal to consume some unspent outputs and create new ones.
///
/// Transactions are built by the `TransactionFactory`, which assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub(crate) fn new(
        id: TransactionId,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Self {
        Self {
            id,
            inputs,
            outputs,
        }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &Vec<TransactionInput> {
        &self.inputs
    }

    pub fn outputs(&self) -> &Vec<TransactionOutput> {
        &self.outputs
    }

    /// The reference under which the output at `index` is stored once the transaction commits.
    pub fn output_ref(&self, index: usize) -> OutputRef {
        OutputRef::new(self.id.clone(), OutputIndex::new(index as u32))
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] => [{}]",
            self.id,
            self.inputs
                .iter()
                .map(TransactionInput::to_string)
                .collect::<Vec<String>>()
                .join(", "),
            self.outputs
                .iter()
                .map(TransactionOutput::to_string)
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}
