//! Turns per-block outport payloads into search-engine documents.
//!
//! The crate is a family of pure functions over one block: the transaction reconciler derives
//! statuses and fees, the event pipeline interprets logs into side tables, the account splitter
//! projects state diffs, and the document assembler turns all of it into index instructions.

pub mod config;
pub mod errors;
pub mod indexer;
pub mod modules;
pub mod outport_models;
pub mod types;
mod utils;

pub use indexer::{BlockIndexer, BlockOutput};

pub type Result<T> = std::result::Result<T, errors::Error>;

/// Shard id of the coordinator chain.
pub const METACHAIN_SHARD_ID: u32 = u32::MAX;
