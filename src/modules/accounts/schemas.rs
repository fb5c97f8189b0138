use crate::modules::tokens::schemas::TokenMetaData;
use crate::outport_models::AlteredAccount;
use crate::types::Base64VecU8;
use crate::utils;

/// An altered account selected for the regular accounts index.
#[derive(Debug, Clone, Copy)]
pub struct Account<'a> {
    pub user_account: &'a AlteredAccount,
    pub is_sender: bool,
}

/// One token entry of an altered account.
#[derive(Debug, Clone, Copy)]
pub struct AccountEsdt<'a> {
    pub account: &'a AlteredAccount,
    pub token_identifier: &'a str,
    pub nft_nonce: u64,
    pub is_sender: bool,
    pub is_nft_create: bool,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub address: String,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub nonce: u64,
    pub balance: String,
    pub balance_num: f64,
    #[serde(default, rename = "token", skip_serializing_if = "String::is_empty")]
    pub token_name: String,
    #[serde(default, rename = "identifier", skip_serializing_if = "String::is_empty")]
    pub token_identifier: String,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub token_nonce: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub properties: String,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub frozen: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub developer_rewards: String,
    #[serde(default, skip_serializing_if = "utils::is_zero_f64")]
    pub developer_rewards_num: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TokenMetaData>,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub timestamp_ms: u64,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_owner: String,
    #[serde(rename = "shardID")]
    pub shard_id: u32,
    #[serde(default, skip_serializing_if = "Base64VecU8::is_empty")]
    pub root_hash: Base64VecU8,
    #[serde(default, skip_serializing_if = "Base64VecU8::is_empty")]
    pub code_hash: Base64VecU8,
    #[serde(default, skip_serializing_if = "Base64VecU8::is_empty")]
    pub code_metadata: Base64VecU8,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub is_sender: bool,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub is_smart_contract: bool,
}

/// One balance snapshot per account per block.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalanceHistory {
    pub address: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub timestamp_ms: u64,
    pub balance: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub identifier: String,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub token_nonce: u64,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub is_sender: bool,
    #[serde(default, skip_serializing_if = "utils::is_false")]
    pub is_smart_contract: bool,
    #[serde(rename = "shardID")]
    pub shard_id: u32,
}
