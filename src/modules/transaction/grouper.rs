use std::collections::{BTreeMap, HashMap};

use crate::modules::transaction::builder::{Placement, TransactionBuilder};
use crate::modules::transaction::schemas::{Receipt, Transaction, TxStatus};
use crate::outport_models::{Header, MiniBlock, PoolRecord, ReceiptInfo, TransactionPool};
use crate::types::{hash, HexVecU8};

const TARGET: &str = "outport_indexer::transactions";

/// Groups the records listed by the miniblocks of a block, keyed by hex hash.
#[derive(Debug, Clone)]
pub(crate) struct TxsGrouper {
    builder: TransactionBuilder,
}

impl TxsGrouper {
    pub fn new(builder: TransactionBuilder) -> Self {
        Self { builder }
    }

    pub fn builder(&self) -> &TransactionBuilder {
        &self.builder
    }

    pub fn group_normal_txs(
        &self,
        mb_index: usize,
        mini_block: &MiniBlock,
        header: &Header,
        pool: &TransactionPool,
        import_db: bool,
    ) -> crate::Result<BTreeMap<String, Transaction>> {
        let mb_hash = hex::encode(hash::calculate_hash(mini_block)?);
        let status = compute_status(header.shard_id, mini_block.receiver_shard_id);
        let placement = Placement::of(&mb_hash, mini_block);

        let mut transactions = BTreeMap::new();
        if !should_index(mini_block.receiver_shard_id, import_db, header.shard_id) {
            return Ok(transactions);
        }

        for tx_hash in extract_executed_tx_hashes(mb_index, &mini_block.tx_hashes, header) {
            let tx_hash = tx_hash.to_hex();
            let Some(PoolRecord::Normal(tx_info)) = pool.classify(mini_block.mb_type, &tx_hash)
            else {
                tracing::debug!(target: TARGET, hash = %tx_hash, "transaction not found in pool");
                continue;
            };

            let transaction =
                self.builder
                    .prepare_transaction(tx_info, &tx_hash, placement, header, status);
            transactions.insert(tx_hash, transaction);
        }

        Ok(transactions)
    }

    pub fn group_rewards_txs(
        &self,
        mb_index: usize,
        mini_block: &MiniBlock,
        header: &Header,
        pool: &TransactionPool,
        import_db: bool,
    ) -> crate::Result<BTreeMap<String, Transaction>> {
        let mb_hash = hex::encode(hash::calculate_hash(mini_block)?);
        let status = compute_status(header.shard_id, mini_block.receiver_shard_id);
        let placement = Placement::of(&mb_hash, mini_block);

        let mut rewards = BTreeMap::new();
        if !should_index(mini_block.receiver_shard_id, import_db, header.shard_id) {
            return Ok(rewards);
        }

        for tx_hash in extract_executed_tx_hashes(mb_index, &mini_block.tx_hashes, header) {
            let tx_hash = tx_hash.to_hex();
            let Some(PoolRecord::Reward(reward)) = pool.classify(mini_block.mb_type, &tx_hash)
            else {
                tracing::debug!(target: TARGET, hash = %tx_hash, "reward not found in pool");
                continue;
            };

            let transaction =
                self.builder
                    .prepare_reward_transaction(reward, &tx_hash, placement, header, status);
            rewards.insert(tx_hash, transaction);
        }

        Ok(rewards)
    }

    /// Invalid transactions are indexed on every shard, import or not.
    pub fn group_invalid_txs(
        &self,
        mb_index: usize,
        mini_block: &MiniBlock,
        header: &Header,
        pool: &TransactionPool,
    ) -> crate::Result<BTreeMap<String, Transaction>> {
        let mb_hash = hex::encode(hash::calculate_hash(mini_block)?);
        let placement = Placement::of(&mb_hash, mini_block);

        let mut transactions = BTreeMap::new();
        for tx_hash in extract_executed_tx_hashes(mb_index, &mini_block.tx_hashes, header) {
            let tx_hash = tx_hash.to_hex();
            let Some(PoolRecord::Invalid(tx_info)) = pool.classify(mini_block.mb_type, &tx_hash)
            else {
                tracing::debug!(
                    target: TARGET,
                    hash = %tx_hash,
                    "invalid transaction not found in pool"
                );
                continue;
            };

            let transaction = self.builder.prepare_transaction(
                tx_info,
                &tx_hash,
                placement,
                header,
                TxStatus::Invalid,
            );
            transactions.insert(tx_hash, transaction);
        }

        Ok(transactions)
    }

    /// Every receipt of the pool, in hash order.
    pub fn group_receipts(
        &self,
        header: &Header,
        receipts: &HashMap<String, ReceiptInfo>,
    ) -> Vec<Receipt> {
        let sorted: BTreeMap<&String, &ReceiptInfo> = receipts.iter().collect();
        sorted
            .into_iter()
            .map(|(hash, receipt)| self.builder.prepare_receipt(hash, receipt, header))
            .collect()
    }
}

/// Hashes between the first and last processed index of the miniblock header, all of them
/// when the header does not describe this miniblock.
pub(crate) fn extract_executed_tx_hashes<'a>(
    mb_index: usize,
    tx_hashes: &'a [HexVecU8],
    header: &Header,
) -> Vec<&'a HexVecU8> {
    let Some(mb_header) = header.mini_block_headers.get(mb_index) else {
        return tx_hashes.iter().collect();
    };

    let first = i64::from(mb_header.index_of_first_tx_processed);
    let last = i64::from(mb_header.index_of_last_tx_processed);
    tx_hashes
        .iter()
        .enumerate()
        .filter(|(index, _)| {
            let index = *index as i64;
            index >= first && index <= last
        })
        .map(|(_, hash)| hash)
        .collect()
}

pub(crate) fn compute_status(self_shard: u32, receiver_shard: u32) -> TxStatus {
    if self_shard == receiver_shard {
        TxStatus::Success
    } else {
        TxStatus::Pending
    }
}

fn should_index(receiver_shard: u32, import_db: bool, self_shard: u32) -> bool {
    !import_db || receiver_shard == self_shard
}
