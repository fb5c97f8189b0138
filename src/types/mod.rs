pub mod address;
pub mod hash;
pub mod numeric;
pub mod vector;

pub use address::{PubkeyConverter, ShardCoordinator};
pub use numeric::BalanceConverter;
pub use vector::{Base64VecU8, HexVecU8};
