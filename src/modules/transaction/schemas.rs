use crate::types::Base64VecU8;
use crate::utils;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TxStatus {
    #[default]
    Success,
    Pending,
    Fail,
    Invalid,
}

/// Transaction document. Built by the reconciler, enriched by the event pipeline.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(skip)]
    pub hash: String,
    #[serde(rename = "miniBlockHash")]
    pub mb_hash: String,
    pub nonce: u64,
    pub round: u64,
    pub value: String,
    pub value_num: f64,
    pub receiver: String,
    pub sender: String,
    pub receiver_shard: u32,
    pub sender_shard: u32,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub fee: String,
    pub fee_num: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub initial_paid_fee: String,
    pub data: Base64VecU8,
    pub signature: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub timestamp_ms: u64,
    pub status: TxStatus,
    pub search_order: u32,
    #[serde(default, skip_serializing_if = "Base64VecU8::is_empty")]
    pub sender_user_name: Base64VecU8,
    #[serde(default, skip_serializing_if = "Base64VecU8::is_empty")]
    pub receiver_user_name: Base64VecU8,
    #[serde(default, rename = "hasScResults", skip_serializing_if = "utils::is_false")]
    pub has_scr: bool,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub is_sc_call: bool,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub has_operations: bool,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub has_logs: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub esdt_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub esdt_values_num: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub receivers: Vec<String>,
    #[serde(default, rename = "receiversShardIDs", skip_serializing_if = "Vec::is_empty")]
    pub receivers_shard_ids: Vec<u32>,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub tx_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub operation: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function: String,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub is_relayed: bool,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub error_event: bool,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub completed_event: bool,
    #[serde(skip)]
    pub smart_contract_results: Vec<ScResult>,
    #[serde(skip)]
    pub receiver_address_bytes: Vec<u8>,
    #[serde(skip)]
    pub execution_order: u32,
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

/// Smart contract result document.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScResult {
    #[serde(skip)]
    pub hash: String,
    #[serde(default, rename = "miniBlockHash", skip_serializing_if = "String::is_empty")]
    pub mb_hash: String,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u64,
    pub value: String,
    pub value_num: f64,
    pub sender: String,
    pub receiver: String,
    pub sender_shard: u32,
    pub receiver_shard: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub relayer_addr: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub relayed_value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(default, skip_serializing_if = "Base64VecU8::is_empty")]
    pub data: Base64VecU8,
    pub prev_tx_hash: String,
    pub original_tx_hash: String,
    pub call_type: String,
    #[serde(default, rename = "codeMetaData", skip_serializing_if = "Base64VecU8::is_empty")]
    pub code_metadata: Base64VecU8,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub return_message: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub timestamp_ms: u64,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub has_operations: bool,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub has_logs: bool,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub scr_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TxStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub esdt_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub esdt_values_num: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub receivers: Vec<String>,
    #[serde(default, rename = "receiversShardIDs", skip_serializing_if = "Vec::is_empty")]
    pub receivers_shard_ids: Vec<u32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub operation: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function: String,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub is_relayed: bool,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub can_be_ignored: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub original_sender: String,
    #[serde(skip)]
    pub sender_address_bytes: Vec<u8>,
    #[serde(skip)]
    pub initial_tx_fee: String,
    #[serde(skip)]
    pub initial_tx_gas_used: u64,
    #[serde(skip)]
    pub gas_refunded: u64,
    #[serde(skip)]
    pub execution_order: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(skip)]
    pub hash: String,
    pub value: String,
    pub sender: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    pub tx_hash: String,
    pub timestamp: u64,
}

/// Fee correction for a transaction indexed by another shard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeeData {
    pub fee: String,
    pub fee_num: f64,
    pub gas_used: u64,
    pub receiver: String,
    pub gas_refunded: u64,
}

/// Output of one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct PreparedResults {
    pub transactions: Vec<Transaction>,
    pub sc_results: Vec<ScResult>,
    pub receipts: Vec<Receipt>,
    /// Status overrides for transactions outside this block's working set, keyed by hex hash.
    pub tx_hash_status: std::collections::BTreeMap<String, TxStatus>,
    /// Fee corrections keyed by the hex hash of the original transaction.
    pub tx_hash_fee: std::collections::BTreeMap<String, FeeData>,
}
