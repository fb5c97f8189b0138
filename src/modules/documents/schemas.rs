use std::collections::BTreeMap;

use crate::modules::accounts::schemas::{AccountBalanceHistory, AccountInfo};
use crate::modules::accounts::BlockStamp;
use crate::modules::logs_events::schemas::{
    LogEvent, Logs, PreparedLogsResults, StatusInfo, UnDelegate, Upgrade,
};
use crate::modules::tokens::schemas::OwnerData;
use crate::modules::tokens::{TagsCount, TokensHandler};
use crate::modules::transaction::schemas::{PreparedResults, ScResult, Transaction};
use crate::types::Base64VecU8;

/// One write instruction against an index.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Document {
    pub index: String,
    pub id: String,
    #[serde(flatten)]
    pub action: Action,
}

impl Document {
    pub fn new_index<T: serde::Serialize>(index: &str, id: &str, body: &T) -> crate::Result<Self> {
        Ok(Self {
            index: index.to_string(),
            id: id.to_string(),
            action: Action::Index(serde_json::to_value(body)?),
        })
    }

    pub fn new_update<T: serde::Serialize>(
        index: &str,
        id: &str,
        script: UpdateScript,
        upsert: &T,
    ) -> crate::Result<Self> {
        Ok(Self {
            index: index.to_string(),
            id: id.to_string(),
            action: Action::Update {
                script,
                upsert: serde_json::to_value(upsert)?,
            },
        })
    }

    /// Update that creates an empty document when the target is missing.
    pub fn new_script(index: &str, id: &str, script: UpdateScript) -> Self {
        Self {
            index: index.to_string(),
            id: id.to_string(),
            action: Action::Update {
                script,
                upsert: serde_json::Value::Object(serde_json::Map::new()),
            },
        }
    }

    pub fn new_delete(index: &str, id: &str) -> Self {
        Self {
            index: index.to_string(),
            id: id.to_string(),
            action: Action::Delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "action", content = "body", rename_all = "camelCase")]
pub enum Action {
    /// Create or fully replace the document.
    Index(serde_json::Value),
    /// Apply `script` to the stored document. `upsert` is what gets created when the document is
    /// missing, and is empty for scripts that do nothing on creation.
    Update {
        script: UpdateScript,
        upsert: serde_json::Value,
    },
    Delete,
}

/// Partial update contracts. Each variant names how the stored document changes; its params
/// are the values the change needs.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "script", content = "params", rename_all = "camelCase")]
pub enum UpdateScript {
    /// Insert the upsert when missing, never touch an existing document.
    KeepExisting,
    /// Insert the upsert when missing, otherwise only overwrite the fee fields.
    #[serde(rename_all = "camelCase")]
    UpdateFeeFields {
        gas_used: u64,
        fee: String,
        fee_num: f64,
    },
    /// Replace with the upsert but keep the stored values of `fields`.
    ReplaceKeeping { fields: Vec<String> },
    /// Replace with the upsert unless the stored document is newer.
    ReplaceIfNewer { timestamp: u64 },
    MergeStatusInfo(StatusInfo),
    /// Overwrite the fee; nothing happens when the transaction is not stored yet.
    #[serde(rename_all = "camelCase")]
    SetFee {
        fee: String,
        fee_num: f64,
        gas_used: u64,
    },
    /// Subtract a refund from the paid fee; nothing happens when the transaction is not stored
    /// yet.
    #[serde(rename_all = "camelCase")]
    SubtractRefund {
        fee: String,
        fee_num: f64,
        gas_refunded: u64,
    },
    /// Replace with the upsert, keeping the stored roles.
    ReplaceKeepingRoles,
    TransferOwnership { elem: OwnerData, owner: String },
    ChangeToDynamic {
        #[serde(rename = "type")]
        token_type: String,
        timestamp: u64,
    },
    /// Add `address` to the holders of `role`, or remove it.
    SetRole {
        role: String,
        address: String,
        set: bool,
    },
    SetProperties { properties: BTreeMap<String, bool> },
    UpdateAttributes {
        attributes: Base64VecU8,
        tags: Vec<String>,
        metadata: String,
    },
    /// Append the URIs not stored yet.
    AddUris { uris: Vec<Base64VecU8> },
    Freeze { frozen: bool },
    Pause { paused: bool },
    AppendUpgrade(Upgrade),
    /// Set the current owner and append to the owners; nothing happens when the contract is not
    /// stored yet.
    ChangeOwner(OwnerData),
    /// Take stake and timestamp from the upsert.
    #[serde(rename_all = "camelCase")]
    UpsertDelegator {
        active_stake: String,
        active_stake_num: f64,
        timestamp: u64,
    },
    /// [`UpdateScript::UpsertDelegator`] plus a pending unDelegation.
    #[serde(rename_all = "camelCase")]
    AppendUnDelegate {
        active_stake: String,
        active_stake_num: f64,
        timestamp: u64,
        un_delegate: UnDelegate,
    },
    /// [`UpdateScript::UpsertDelegator`] plus dropping the withdrawn unDelegations.
    #[serde(rename_all = "camelCase")]
    RemoveWithdrawn {
        active_stake: String,
        active_stake_num: f64,
        timestamp: u64,
        withdraw_ids: Vec<String>,
    },
    IncrementTag { count: u64 },
}

/// Everything the core components produced for one block, ready to be written.
#[derive(Debug, Clone, Default)]
pub struct PreparedBlock {
    pub stamp: BlockStamp,
    pub results: PreparedResults,
    pub operations_txs: Vec<Transaction>,
    pub operations_scrs: Vec<ScResult>,
    pub logs_results: PreparedLogsResults,
    pub logs: Vec<Logs>,
    pub events: Vec<LogEvent>,
    pub accounts: BTreeMap<String, AccountInfo>,
    pub accounts_history: BTreeMap<String, AccountBalanceHistory>,
    pub accounts_esdt: BTreeMap<String, AccountInfo>,
    pub accounts_esdt_history: BTreeMap<String, AccountBalanceHistory>,
    /// Collections held by the block's token accounts, to be resolved against the store.
    pub esdt_tokens: TokensHandler,
    pub tags: TagsCount,
}
