use std::collections::BTreeMap;

use crate::modules::tokens::schemas::{OwnerData, TokenInfo};
use crate::modules::tokens::{TokenRolesAndProperties, TokensHandler};
use crate::modules::transaction::schemas::TxStatus;
use crate::types::Base64VecU8;
use crate::utils;

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScDeployInfo {
    #[serde(rename = "deployTxHash")]
    pub tx_hash: String,
    #[serde(rename = "deployer")]
    pub creator: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_owner: String,
    #[serde(rename = "initialCodeHash", default, skip_serializing_if = "Base64VecU8::is_empty")]
    pub code_hash: Base64VecU8,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub timestamp_ms: u64,
    #[serde(default)]
    pub upgrades: Vec<Upgrade>,
    #[serde(rename = "owners", default)]
    pub owners_history: Vec<OwnerData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upgrade {
    #[serde(rename = "upgradeTxHash")]
    pub tx_hash: String,
    pub upgrader: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub timestamp_ms: u64,
    #[serde(default, skip_serializing_if = "Base64VecU8::is_empty")]
    pub code_hash: Base64VecU8,
}

impl From<&ScDeployInfo> for Upgrade {
    fn from(deploy: &ScDeployInfo) -> Self {
        Self {
            tx_hash: deploy.tx_hash.clone(),
            upgrader: deploy.creator.clone(),
            timestamp: deploy.timestamp,
            timestamp_ms: deploy.timestamp_ms,
            code_hash: deploy.code_hash.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegator {
    pub address: String,
    pub contract: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub timestamp_ms: u64,
    pub active_stake: String,
    pub active_stake_num: f64,
    #[serde(skip)]
    pub should_delete: bool,
    #[serde(skip)]
    pub un_delegate_info: Option<UnDelegate>,
    #[serde(skip)]
    pub withdraw_fund_ids: Option<Vec<String>>,
}

impl Delegator {
    /// Accumulator key; one record per delegator and staking contract.
    pub fn key(&self) -> String {
        format!("{}{}", self.address, self.contract)
    }
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnDelegate {
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub timestamp_ms: u64,
    pub id: String,
    pub value: String,
    pub value_num: f64,
}

/// A change applied to an existing NFT or to every NFT of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NftChange {
    UpdateAttributes(Base64VecU8),
    AddUris(Vec<Base64VecU8>),
    /// Freeze (`true`) or unfreeze of one holder's balance.
    Freeze(bool),
    /// Pause (`true`) or unpause of a whole collection.
    Pause(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftDataUpdate {
    /// Token identifier, or the collection for pause changes.
    pub identifier: String,
    /// Holder affected by the change; the caller for attribute and URI updates.
    pub address: String,
    pub change: NftChange,
}

/// Status facts learned from the logs of smart contract results, keyed by original tx hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TxStatus>,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub error_event: bool,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub completed_event: bool,
}

/// One document of the logs index.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logs {
    #[serde(skip)]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub original_tx_hash: String,
    pub address: String,
    pub events: Vec<Event>,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub address: String,
    pub identifier: String,
    pub topics: Vec<Base64VecU8>,
    #[serde(default, skip_serializing_if = "Base64VecU8::is_empty")]
    pub data: Base64VecU8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_data: Vec<Base64VecU8>,
    pub order: usize,
}

/// One document of the events index: a single event, hex encoded.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    #[serde(skip)]
    pub id: String,
    pub tx_hash: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub original_tx_hash: String,
    pub log_address: String,
    pub address: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_data: Vec<String>,
    pub topics: Vec<String>,
    pub order: usize,
    pub tx_order: i64,
    #[serde(rename = "shardID")]
    pub shard_id: u32,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub timestamp_ms: u64,
}

/// Everything the interpreters learned from one block's logs.
#[derive(Debug, Clone, Default)]
pub struct PreparedLogsResults {
    /// NFTs created in this block.
    pub tokens: TokensHandler,
    /// NFTs burnt or wiped in this block.
    pub tokens_supply: TokensHandler,
    /// Issued tokens and ownership/type changes, in event order.
    pub tokens_info: Vec<TokenInfo>,
    pub sc_deploys: BTreeMap<String, ScDeployInfo>,
    pub change_owner_operations: BTreeMap<String, OwnerData>,
    pub delegators: BTreeMap<String, Delegator>,
    pub nfts_data_updates: Vec<NftDataUpdate>,
    pub token_roles_and_properties: TokenRolesAndProperties,
    pub tx_hash_status_info: BTreeMap<String, StatusInfo>,
}
