use std::collections::BTreeMap;

use crate::config::Config;
use crate::modules::transaction::builder::TransactionBuilder;
use crate::modules::transaction::datafield::DataFieldParser;
use crate::modules::transaction::fee::FeeComputer;
use crate::modules::transaction::grouper::TxsGrouper;
use crate::modules::transaction::schemas::{PreparedResults, Transaction};
use crate::modules::transaction::scrs;
use crate::modules::transaction::scrs_to_txs::ScrsDataToTransactions;
use crate::outport_models::{Body, Header, MiniBlock, MiniBlockType, OutportBlock, ProcessingType};
use crate::types::{BalanceConverter, PubkeyConverter, ShardCoordinator};

const TARGET: &str = "outport_indexer::transactions";

/// Reconciles the transactions, rewards, results and receipts of one block.
#[derive(Debug, Clone)]
pub struct TransactionsProcessor {
    grouper: TxsGrouper,
    scrs_data_to_txs: ScrsDataToTransactions,
}

impl TransactionsProcessor {
    pub fn new(config: &Config) -> crate::Result<Self> {
        let pubkey_converter = PubkeyConverter::new(&config.address)?;
        let balance_converter = BalanceConverter::new(config.denomination)?;
        let shard_coordinator = ShardCoordinator::new(config.num_of_shards)?;
        let fee_computer = FeeComputer::new(&config.economics)?;

        let parser = DataFieldParser::new(pubkey_converter.clone(), shard_coordinator);
        let builder = TransactionBuilder::new(pubkey_converter, balance_converter, parser);

        Ok(Self {
            grouper: TxsGrouper::new(builder),
            scrs_data_to_txs: ScrsDataToTransactions::new(fee_computer, balance_converter),
        })
    }

    /// Empty results, never partial ones, when the block has no header or no pool.
    pub fn prepare_transactions_for_database(
        &self,
        block: &OutportBlock,
        import_db: bool,
    ) -> PreparedResults {
        let (Some(header), Some(pool)) = (&block.header, &block.transaction_pool) else {
            tracing::warn!(
                target: TARGET,
                shard_id = block.shard_id,
                has_header = block.header.is_some(),
                has_pool = block.transaction_pool.is_some(),
                "cannot prepare transactions for database"
            );
            return PreparedResults::default();
        };

        let mut normal_txs = BTreeMap::new();
        let mut rewards_txs = BTreeMap::new();
        for (mb_index, mini_block) in block.body.mini_blocks.iter().enumerate() {
            let grouped = match mini_block.mb_type {
                MiniBlockType::TxBlock => {
                    if should_ignore_processed_mb_scheduled(header, mb_index) {
                        continue;
                    }
                    self.grouper
                        .group_normal_txs(mb_index, mini_block, header, pool, import_db)
                        .map(|txs| normal_txs.extend(txs))
                }
                MiniBlockType::RewardsBlock => self
                    .grouper
                    .group_rewards_txs(mb_index, mini_block, header, pool, import_db)
                    .map(|txs| rewards_txs.extend(txs)),
                MiniBlockType::InvalidBlock => self
                    .grouper
                    .group_invalid_txs(mb_index, mini_block, header, pool)
                    .map(|txs| normal_txs.extend(txs)),
                _ => continue,
            };

            if let Err(err) = grouped {
                tracing::warn!(
                    target: TARGET,
                    mb_type = %mini_block.mb_type,
                    error = %err,
                    "cannot group miniblock transactions"
                );
            }
        }

        set_transaction_search_order(&mut normal_txs);
        let receipts = self.grouper.group_receipts(header, &pool.receipts);
        let sc_results = scrs::process_scrs(
            self.grouper.builder(),
            &block.body.mini_blocks,
            header,
            &pool.smart_contract_results,
        );

        let scrs_without_tx = self
            .scrs_data_to_txs
            .attach_scrs_to_transactions_and_return_scrs_without_tx(&mut normal_txs, &sc_results);
        self.scrs_data_to_txs
            .process_transactions_after_scrs_were_attached(&mut normal_txs);
        let tx_hash_fee = self.scrs_data_to_txs.process_scrs_without_tx(&scrs_without_tx);
        let tx_hash_status = self
            .scrs_data_to_txs
            .status_overrides_for_scrs_without_tx(&scrs_without_tx);

        let transactions = normal_txs
            .into_values()
            .chain(rewards_txs.into_values())
            .collect();

        PreparedResults {
            transactions,
            sc_results,
            receipts,
            tx_hash_status,
            tx_hash_fee,
        }
    }
}

/// Hex hashes of the transactions and of the results a block wrote, for rollback.
/// `None` when there is nothing to remove.
pub fn hashes_for_remove(
    header: Option<&Header>,
    body: &Body,
) -> Option<(Vec<String>, Vec<String>)> {
    let header = header?;
    if header.mini_block_headers.is_empty() {
        return None;
    }

    let mut txs_hashes = vec![];
    let mut scrs_hashes = vec![];
    for (mb_index, mini_block) in body.mini_blocks.iter().enumerate() {
        if should_ignore_processed_mb_scheduled(header, mb_index)
            || is_cross_shard_at_source_normal_tx(header.shard_id, mini_block)
        {
            continue;
        }

        let hashes = mini_block.tx_hashes.iter().map(|hash| hash.to_hex());
        if mini_block.mb_type == MiniBlockType::SmartContractResultBlock {
            scrs_hashes.extend(hashes);
        } else {
            txs_hashes.extend(hashes);
        }
    }

    Some((txs_hashes, scrs_hashes))
}

fn set_transaction_search_order(transactions: &mut BTreeMap<String, Transaction>) {
    for (order, tx) in transactions.values_mut().enumerate() {
        tx.search_order = order as u32;
    }
}

fn should_ignore_processed_mb_scheduled(header: &Header, mb_index: usize) -> bool {
    header
        .mini_block_headers
        .get(mb_index)
        .map_or(false, |mb_header| mb_header.processing_type == ProcessingType::Processed)
}

fn is_cross_shard_at_source_normal_tx(self_shard: u32, mini_block: &MiniBlock) -> bool {
    mini_block.sender_shard_id != mini_block.receiver_shard_id
        && mini_block.sender_shard_id == self_shard
        && mini_block.mb_type == MiniBlockType::TxBlock
}
