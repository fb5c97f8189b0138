//! Account diff splitter: altered accounts become regular, per-token and history records.

mod processor;
pub mod schemas;

pub use processor::{esdt_key, AccountsProcessor, BlockStamp};
