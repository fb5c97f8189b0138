use crate::modules::tokens::schemas::ResponseTokens;

/// Read access to documents already written, used to resolve the type and owner of tokens
/// that were issued in earlier blocks.
pub trait TokenStore: Send + Sync {
    /// Looks `ids` up in `index`. Missing documents come back with `found` unset.
    fn multi_get(&self, ids: &[String], index: &str) -> crate::Result<ResponseTokens>;
}

/// Store of an empty index: nothing is ever found.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTokenStore;

impl TokenStore for NoopTokenStore {
    fn multi_get(&self, _ids: &[String], _index: &str) -> crate::Result<ResponseTokens> {
        Ok(ResponseTokens::default())
    }
}
