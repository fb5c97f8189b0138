//! Document Assembler: renders everything one block produced as index instructions, resolving
//! token types against documents written by earlier blocks.

mod accounts;
mod assembler;
mod logs;
pub mod schemas;
mod store;
mod tokens;
mod transactions;

pub use assembler::DocumentAssembler;
pub use schemas::{Action, Document, PreparedBlock, UpdateScript};
pub use store::{NoopTokenStore, TokenStore};
