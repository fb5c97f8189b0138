use std::collections::{BTreeMap, HashMap};

use crate::modules::accounts::BlockStamp;
use crate::modules::logs_events::schemas::{
    Delegator, NftDataUpdate, PreparedLogsResults, ScDeployInfo,
};
use crate::modules::logs_events::status_info::TxHashStatusInfo;
use crate::modules::tokens::schemas::{OwnerData, TokenInfo};
use crate::modules::tokens::{TokenRolesAndProperties, TokensHandler};
use crate::modules::transaction::schemas::{ScResult, Transaction};

/// Block-scoped accumulator the interpreters write into. Owns the side tables and borrows the
/// block's transactions and results so their flags can be set in place.
pub(crate) struct LogsData<'a> {
    pub stamp: BlockStamp,
    txs: &'a mut [Transaction],
    tx_positions: HashMap<String, usize>,
    scrs: &'a mut [ScResult],
    scr_positions: HashMap<String, usize>,
    pub tokens: TokensHandler,
    pub tokens_supply: TokensHandler,
    pub tokens_info: Vec<TokenInfo>,
    pub sc_deploys: BTreeMap<String, ScDeployInfo>,
    pub change_owner_operations: BTreeMap<String, OwnerData>,
    pub delegators: BTreeMap<String, Delegator>,
    pub nfts_data_updates: Vec<NftDataUpdate>,
    pub token_roles_and_properties: TokenRolesAndProperties,
    pub tx_hash_status_info: TxHashStatusInfo,
}

impl<'a> LogsData<'a> {
    pub fn new(stamp: BlockStamp, txs: &'a mut [Transaction], scrs: &'a mut [ScResult]) -> Self {
        let tx_positions = txs
            .iter()
            .enumerate()
            .map(|(position, tx)| (tx.hash.clone(), position))
            .collect();
        let scr_positions = scrs
            .iter()
            .enumerate()
            .map(|(position, scr)| (scr.hash.clone(), position))
            .collect();

        Self {
            stamp,
            txs,
            tx_positions,
            scrs,
            scr_positions,
            tokens: TokensHandler::new(),
            tokens_supply: TokensHandler::new(),
            tokens_info: vec![],
            sc_deploys: BTreeMap::new(),
            change_owner_operations: BTreeMap::new(),
            delegators: BTreeMap::new(),
            nfts_data_updates: vec![],
            token_roles_and_properties: TokenRolesAndProperties::new(),
            tx_hash_status_info: TxHashStatusInfo::default(),
        }
    }

    pub fn tx_mut(&mut self, hash: &str) -> Option<&mut Transaction> {
        let position = *self.tx_positions.get(hash)?;
        self.txs.get_mut(position)
    }

    pub fn scr(&self, hash: &str) -> Option<&ScResult> {
        let position = *self.scr_positions.get(hash)?;
        self.scrs.get(position)
    }

    fn scr_mut(&mut self, hash: &str) -> Option<&mut ScResult> {
        let position = *self.scr_positions.get(hash)?;
        self.scrs.get_mut(position)
    }

    /// Flags the transaction, or failing that the result, behind `hash` as having operations.
    pub fn mark_has_operations(&mut self, hash: &str) {
        if let Some(tx) = self.tx_mut(hash) {
            tx.has_operations = true;
        } else if let Some(scr) = self.scr_mut(hash) {
            scr.has_operations = true;
        }
    }

    pub fn mark_has_logs(&mut self, hash: &str) {
        if let Some(tx) = self.tx_mut(hash) {
            tx.has_logs = true;
        } else if let Some(scr) = self.scr_mut(hash) {
            scr.has_logs = true;
        }
    }

    pub fn into_results(self) -> PreparedLogsResults {
        PreparedLogsResults {
            tokens: self.tokens,
            tokens_supply: self.tokens_supply,
            tokens_info: self.tokens_info,
            sc_deploys: self.sc_deploys,
            change_owner_operations: self.change_owner_operations,
            delegators: self.delegators,
            nfts_data_updates: self.nfts_data_updates,
            token_roles_and_properties: self.token_roles_and_properties,
            tx_hash_status_info: self.tx_hash_status_info.into_records(),
        }
    }
}
