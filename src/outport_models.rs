//! Raw per-block payload as emitted by the node's outport driver.
//!
//! Byte fields that identify things (hashes, addresses, topics) are hex encoded, free-form byte
//! fields (data, attributes, uris, user names) are base64 encoded. Pool maps are keyed by the hex
//! encoded hash of the record.

use std::collections::HashMap;

use crate::types::{Base64VecU8, HexVecU8};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutportBlock {
    pub shard_id: u32,
    pub header: Option<Header>,
    #[serde(default)]
    pub body: Body,
    pub transaction_pool: Option<TransactionPool>,
    #[serde(default)]
    pub altered_accounts: HashMap<String, AlteredAccount>,
}

impl OutportBlock {
    pub fn timestamp(&self) -> u64 {
        self.header.as_ref().map_or(0, |header| header.timestamp)
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.header.as_ref().map_or(0, |header| header.timestamp_ms)
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub shard_id: u32,
    pub round: u64,
    pub epoch: u32,
    /// Seconds.
    pub timestamp: u64,
    #[serde(default)]
    pub timestamp_ms: u64,
    #[serde(default)]
    pub mini_block_headers: Vec<MiniBlockHeader>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniBlockHeader {
    #[serde(default)]
    pub processing_type: ProcessingType,
    #[serde(default)]
    pub construction_state: ConstructionState,
    #[serde(default)]
    pub index_of_first_tx_processed: i32,
    #[serde(default = "default_index_of_last_tx_processed")]
    pub index_of_last_tx_processed: i32,
}

impl Default for MiniBlockHeader {
    fn default() -> Self {
        Self {
            processing_type: ProcessingType::default(),
            construction_state: ConstructionState::default(),
            index_of_first_tx_processed: 0,
            index_of_last_tx_processed: default_index_of_last_tx_processed(),
        }
    }
}

fn default_index_of_last_tx_processed() -> i32 {
    i32::MAX
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ProcessingType {
    #[default]
    Normal,
    Scheduled,
    Processed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ConstructionState {
    Proposed,
    #[default]
    Final,
    PartialExecuted,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[serde(default)]
    pub mini_blocks: Vec<MiniBlock>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum MiniBlockType {
    TxBlock,
    StateBlock,
    PeerBlock,
    SmartContractResultBlock,
    InvalidBlock,
    ReceiptBlock,
    RewardsBlock,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiniBlock {
    #[serde(rename = "type")]
    pub mb_type: MiniBlockType,
    pub sender_shard_id: u32,
    pub receiver_shard_id: u32,
    #[serde(default)]
    pub tx_hashes: Vec<HexVecU8>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionPool {
    pub transactions: HashMap<String, TxInfo>,
    pub smart_contract_results: HashMap<String, ScrInfo>,
    pub rewards: HashMap<String, RewardInfo>,
    pub receipts: HashMap<String, ReceiptInfo>,
    pub invalid_txs: HashMap<String, TxInfo>,
    pub logs: Vec<LogData>,
}

/// A pool entry resolved through the type of the miniblock that lists it.
#[derive(Debug, Clone, Copy)]
pub enum PoolRecord<'a> {
    Normal(&'a TxInfo),
    Reward(&'a RewardInfo),
    Invalid(&'a TxInfo),
    SmartContractResult(&'a ScrInfo),
    Receipt(&'a ReceiptInfo),
}

impl TransactionPool {
    pub fn classify(&self, mb_type: MiniBlockType, hash_hex: &str) -> Option<PoolRecord<'_>> {
        match mb_type {
            MiniBlockType::TxBlock => self.transactions.get(hash_hex).map(PoolRecord::Normal),
            MiniBlockType::RewardsBlock => self.rewards.get(hash_hex).map(PoolRecord::Reward),
            MiniBlockType::InvalidBlock => self.invalid_txs.get(hash_hex).map(PoolRecord::Invalid),
            MiniBlockType::SmartContractResultBlock => self
                .smart_contract_results
                .get(hash_hex)
                .map(PoolRecord::SmartContractResult),
            MiniBlockType::ReceiptBlock => self.receipts.get(hash_hex).map(PoolRecord::Receipt),
            MiniBlockType::StateBlock | MiniBlockType::PeerBlock => None,
        }
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeInfo {
    pub gas_used: u64,
    pub fee: String,
    pub initial_paid_fee: String,
    #[serde(default)]
    pub gas_refunded: u64,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxInfo {
    pub transaction: RawTransaction,
    pub fee_info: Option<FeeInfo>,
    #[serde(default)]
    pub execution_order: u32,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTransaction {
    pub nonce: u64,
    pub value: String,
    pub rcv_addr: HexVecU8,
    pub rcv_user_name: Base64VecU8,
    pub snd_addr: HexVecU8,
    pub snd_user_name: Base64VecU8,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub data: Base64VecU8,
    pub signature: HexVecU8,
    pub version: u32,
    pub relayer_addr: HexVecU8,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrInfo {
    pub result: SmartContractResult,
    pub fee_info: Option<FeeInfo>,
    #[serde(default)]
    pub execution_order: u32,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SmartContractResult {
    pub nonce: u64,
    pub value: String,
    pub rcv_addr: HexVecU8,
    pub snd_addr: HexVecU8,
    pub relayer_addr: HexVecU8,
    pub relayed_value: Option<String>,
    pub code: Base64VecU8,
    pub data: Base64VecU8,
    pub prev_tx_hash: HexVecU8,
    pub original_tx_hash: HexVecU8,
    pub gas_limit: u64,
    pub gas_price: u64,
    pub call_type: i32,
    pub code_metadata: Base64VecU8,
    pub return_message: Base64VecU8,
    pub original_sender: HexVecU8,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardInfo {
    pub reward: RewardTx,
    #[serde(default)]
    pub execution_order: u32,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardTx {
    pub round: u64,
    pub epoch: u32,
    pub value: String,
    pub rcv_addr: HexVecU8,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiptInfo {
    pub value: String,
    pub snd_addr: HexVecU8,
    pub data: Base64VecU8,
    pub tx_hash: HexVecU8,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogData {
    /// Hex encoded hash of the transaction or smart contract result that produced the log.
    pub tx_hash: String,
    pub log: Log,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Log {
    pub address: HexVecU8,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    pub address: HexVecU8,
    pub identifier: String,
    pub topics: Vec<HexVecU8>,
    pub data: Base64VecU8,
    pub additional_data: Vec<Base64VecU8>,
}

impl Event {
    pub fn topic(&self, index: usize) -> &[u8] {
        self.topics
            .get(index)
            .map(|topic| topic.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlteredAccount {
    pub address: String,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub balance: String,
    #[serde(default)]
    pub tokens: Vec<AccountTokenData>,
    pub additional_data: Option<AdditionalAccountData>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdditionalAccountData {
    pub is_sender: bool,
    pub balance_changed: bool,
    pub current_owner: String,
    pub user_name: String,
    pub developer_rewards: String,
    pub code_hash: Base64VecU8,
    pub root_hash: Base64VecU8,
    pub code_metadata: Base64VecU8,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTokenData {
    #[serde(default)]
    pub nonce: u64,
    pub identifier: String,
    #[serde(default)]
    pub balance: String,
    #[serde(default)]
    pub properties: String,
    pub meta_data: Option<RawTokenMetaData>,
    pub additional_data: Option<AdditionalAccountTokenData>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdditionalAccountTokenData {
    #[serde(rename = "isNFTCreate")]
    pub is_nft_create: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTokenMetaData {
    pub nonce: u64,
    pub name: String,
    /// Already encoded address.
    pub creator: String,
    pub royalties: u32,
    pub hash: Base64VecU8,
    pub uris: Vec<Base64VecU8>,
    pub attributes: Base64VecU8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_block() {
        let block: OutportBlock = serde_json::from_str(
            r#"{
                "shardId": 1,
                "header": {"shardId": 1, "round": 10, "epoch": 2, "timestamp": 5000},
                "body": {"miniBlocks": [
                    {"type": "TxBlock", "senderShardId": 1, "receiverShardId": 0,
                     "txHashes": ["aa"]}
                ]},
                "transactionPool": {
                    "transactions": {
                        "aa": {"transaction": {"nonce": 1, "value": "10", "data": "dGVzdA=="}}
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(block.timestamp(), 5000);
        assert_eq!(block.body.mini_blocks[0].tx_hashes[0].as_slice(), &[0xaa]);

        let pool = block.transaction_pool.unwrap();
        match pool.classify(MiniBlockType::TxBlock, "aa") {
            Some(PoolRecord::Normal(info)) => {
                assert_eq!(info.transaction.data.as_slice(), b"test")
            }
            other => panic!("unexpected record {:?}", other),
        }
        assert!(pool.classify(MiniBlockType::InvalidBlock, "aa").is_none());
    }

    #[test]
    fn test_event_topic_out_of_range_is_empty() {
        let event = Event {
            topics: vec![HexVecU8(vec![1])],
            ..Event::default()
        };
        assert_eq!(event.topic(0), &[1]);
        assert!(event.topic(5).is_empty());
    }
}
