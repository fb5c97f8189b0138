use std::collections::BTreeMap;

use crate::types::Base64VecU8;
use crate::utils;

/// NFT/SFT metadata as stored in token and account documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetaData {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub creator: String,
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub royalties: u32,
    #[serde(default, skip_serializing_if = "Base64VecU8::is_empty")]
    pub hash: Base64VecU8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uris: Vec<Base64VecU8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Base64VecU8::is_empty")]
    pub attributes: Base64VecU8,
    #[serde(default, rename = "metadata", skip_serializing_if = "String::is_empty")]
    pub metadata: String,
    #[serde(default, rename = "nonEmptyURIs")]
    pub non_empty_uris: bool,
    #[serde(default)]
    pub white_listed_storage: bool,
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerData {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tx_hash: String,
    pub address: String,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub timestamp_ms: u64,
}

/// Token-level flags. All false until an `upgradeProperties` event says otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenProperties {
    pub can_mint: bool,
    pub can_burn: bool,
    pub can_upgrade: bool,
    pub can_transfer_nft_create_role: bool,
    pub can_add_special_roles: bool,
    pub can_pause: bool,
    pub can_freeze: bool,
    pub can_wipe: bool,
    pub can_change_owner: bool,
    pub can_create_multi_shard: bool,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ticker: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub identifier: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub issuer: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub current_owner: String,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub nonce: u64,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub num_decimals: u64,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "utils::is_zero_u64")]
    pub timestamp_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TokenMetaData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owners_history: Vec<OwnerData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<TokenProperties>,
    #[serde(skip)]
    pub transfer_ownership: bool,
    #[serde(skip)]
    pub change_to_dynamic: bool,
}

impl TokenInfo {
    /// Registry key: the full identifier when known, the collection otherwise.
    pub fn key(&self) -> &str {
        if self.identifier.is_empty() {
            &self.token
        } else {
            &self.identifier
        }
    }
}

/// Multi-get response used to resolve token types from the store.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ResponseTokens {
    #[serde(default)]
    pub docs: Vec<ResponseTokenDb>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ResponseTokenDb {
    #[serde(default)]
    pub found: bool,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: SourceToken,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceToken {
    #[serde(rename = "type", default)]
    pub token_type: String,
    #[serde(default)]
    pub current_owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleData {
    pub token: String,
    pub address: String,
    pub set: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertiesData {
    pub token: String,
    pub properties: BTreeMap<String, bool>,
}
