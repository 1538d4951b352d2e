pub mod amount;
pub mod block_committer;
pub mod commands;
pub mod genesis;
pub mod hash;
pub mod ledger;
pub mod owner;
pub mod pending_pool;
pub mod scenarios;
pub mod simulator;
pub mod transaction;
pub mod transaction_factory;
pub mod validation;

pub use self::{
    amount::*, block_committer::*, genesis::*, hash::*, ledger::*, owner::*, pending_pool::*,
    simulator::*, transaction::*, transaction_factory::*, validation::*,
};
