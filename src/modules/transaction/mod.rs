//! Transaction/SCR reconciler: groups pool records per miniblock, attaches smart contract results
//! to their transactions and derives final statuses and fees.

mod builder;
mod checkers;
pub mod datafield;
pub mod fee;
mod grouper;
pub mod operations;
mod processor;
pub mod schemas;
mod scrs;
mod scrs_to_txs;

pub use operations::OperationsProcessor;
pub use processor::{hashes_for_remove, TransactionsProcessor};
pub(crate) use checkers::{
    is_cross_shard_on_source_shard, is_nft_or_multi_transfer_tx, is_simple_esdt_transfer,
    is_simple_esdt_transfer_cross_shard_on_destination,
};
