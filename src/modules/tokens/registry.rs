use std::collections::{BTreeMap, HashMap};

use crate::modules::accounts::schemas::AccountInfo;
use crate::modules::tokens::{self, schemas};
use crate::outport_models::AlteredAccount;

/// Per-block token registry. Keeps insertion order; a later entry with the same key replaces the
/// earlier one in place.
#[derive(Debug, Clone, Default)]
pub struct TokensHandler {
    tokens: Vec<schemas::TokenInfo>,
    positions: HashMap<String, usize>,
}

impl TokensHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, token_info: schemas::TokenInfo) {
        let key = token_info.key().to_string();
        match self.positions.get(&key) {
            Some(position) => self.tokens[*position] = token_info,
            None => {
                self.positions.insert(key, self.tokens.len());
                self.tokens.push(token_info);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get_all(&self) -> &[schemas::TokenInfo] {
        &self.tokens
    }

    /// Collection names, one per entry.
    pub fn get_all_tokens(&self) -> Vec<String> {
        self.tokens.iter().map(|token| token.token.clone()).collect()
    }

    /// Entries that get their own document in the tokens index. Meta ESDT items only live in
    /// holders' accounts.
    pub fn get_all_without_meta_esdt(&self) -> Vec<schemas::TokenInfo> {
        self.tokens
            .iter()
            .filter(|token| token.token_type != tokens::META_ESDT)
            .cloned()
            .collect()
    }

    /// Fills type and current owner of every entry the store knows about.
    pub fn add_type_and_owner_from_response(&mut self, response: &schemas::ResponseTokens) {
        for doc in response.docs.iter().filter(|doc| doc.found) {
            for token in self
                .tokens
                .iter_mut()
                .filter(|token| token.key() == doc.id || token.token == doc.id)
            {
                token.token_type = doc.source.token_type.clone();
                token.current_owner = doc.source.current_owner.clone();
            }
        }
    }

    /// Copies the resolved type and owner onto the token accounts of the same collection.
    /// Fungible accounts keep their type when the store has none.
    pub fn put_type_and_owner_in_accounts_esdt(
        &self,
        accounts: &mut BTreeMap<String, AccountInfo>,
    ) {
        for account in accounts.values_mut() {
            let Some(token) = self.tokens.iter().find(|token| token.token == account.token_name)
            else {
                continue;
            };

            if !token.token_type.is_empty() {
                account.token_type = token.token_type.clone();
            }
            account.current_owner = token.current_owner.clone();
        }
    }

    /// Attaches metadata to NFT entries that have none, taken from the block's altered accounts.
    pub fn put_token_metadata_in_tokens(
        &mut self,
        altered_accounts: &HashMap<String, AlteredAccount>,
    ) {
        for token_info in self
            .tokens
            .iter_mut()
            .filter(|token| token.data.is_none() && token.nonce != 0)
        {
            let metadata = altered_accounts
                .values()
                .flat_map(|account| account.tokens.iter())
                .find(|token| {
                    token.identifier == token_info.token && token.nonce == token_info.nonce
                })
                .and_then(|token| token.meta_data.as_ref());

            match metadata {
                Some(metadata) => token_info.data = Some(tokens::prepare_token_metadata(metadata)),
                None => tracing::warn!(
                    target: "outport_indexer::tokens",
                    identifier = %token_info.identifier,
                    nonce = token_info.nonce,
                    "cannot load token metadata"
                ),
            }
        }
    }
}
