use std::collections::BTreeMap;

use crate::modules::documents::schemas::{Document, UpdateScript};
use crate::modules::logs_events::schemas::StatusInfo;
use crate::modules::transaction::schemas::{FeeData, Receipt, ScResult, Transaction, TxStatus};
use crate::modules::transaction::{
    is_cross_shard_on_source_shard, is_nft_or_multi_transfer_tx, is_simple_esdt_transfer,
    is_simple_esdt_transfer_cross_shard_on_destination,
};

/// Fields the destination shard settles for NFT and multi transfers.
const STATUS_FIELDS: [&str; 3] = ["status", "errorEvent", "completedEvent"];
/// Fields the source shard settles for simple ESDT transfers.
const FEE_FIELDS: [&str; 3] = ["gasUsed", "fee", "feeNum"];

pub(super) fn serialize_transactions(
    index: &str,
    txs: &[Transaction],
    status_info: &BTreeMap<String, StatusInfo>,
    self_shard: u32,
    docs: &mut Vec<Document>,
) -> crate::Result<()> {
    for tx in txs {
        docs.push(transaction_document(index, tx, self_shard)?);
    }

    for (hash, info) in status_info {
        docs.push(Document::new_update(
            index,
            hash,
            UpdateScript::MergeStatusInfo(info.clone()),
            info,
        )?);
    }

    Ok(())
}

/// The shard that writes a transaction first must not lose what the other shard already wrote.
fn transaction_document(index: &str, tx: &Transaction, self_shard: u32) -> crate::Result<Document> {
    if is_cross_shard_on_source_shard(tx, self_shard) {
        let script = if is_simple_esdt_transfer(tx) {
            UpdateScript::UpdateFeeFields {
                gas_used: tx.gas_used,
                fee: tx.fee.clone(),
                fee_num: tx.fee_num,
            }
        } else {
            UpdateScript::KeepExisting
        };
        return Document::new_update(index, &tx.hash, script, tx);
    }

    if is_nft_or_multi_transfer_tx(tx) {
        return Document::new_update(index, &tx.hash, replace_keeping(&STATUS_FIELDS), tx);
    }

    if is_simple_esdt_transfer_cross_shard_on_destination(tx, self_shard) {
        return Document::new_update(index, &tx.hash, replace_keeping(&FEE_FIELDS), tx);
    }

    Document::new_index(index, &tx.hash, tx)
}

fn replace_keeping(fields: &[&str]) -> UpdateScript {
    UpdateScript::ReplaceKeeping {
        fields: fields.iter().map(|field| field.to_string()).collect(),
    }
}

/// Fee corrections for transactions written by another block.
pub(super) fn serialize_fee_data(
    index: &str,
    fees: &BTreeMap<String, FeeData>,
    docs: &mut Vec<Document>,
) {
    for (hash, fee_data) in fees {
        let script = if fee_data.gas_refunded != 0 {
            UpdateScript::SubtractRefund {
                fee: fee_data.fee.clone(),
                fee_num: fee_data.fee_num,
                gas_refunded: fee_data.gas_refunded,
            }
        } else {
            UpdateScript::SetFee {
                fee: fee_data.fee.clone(),
                fee_num: fee_data.fee_num,
                gas_used: fee_data.gas_used,
            }
        };
        docs.push(Document::new_script(index, hash, script));
    }
}

pub(super) fn serialize_scrs(
    index: &str,
    scrs: &[ScResult],
    docs: &mut Vec<Document>,
) -> crate::Result<()> {
    for scr in scrs {
        docs.push(Document::new_index(index, &scr.hash, scr)?);
    }
    Ok(())
}

pub(super) fn serialize_receipts(
    index: &str,
    receipts: &[Receipt],
    docs: &mut Vec<Document>,
) -> crate::Result<()> {
    for receipt in receipts {
        docs.push(Document::new_index(index, &receipt.hash, receipt)?);
    }
    Ok(())
}

/// Folds the reconciler's overrides into the statuses learned from the logs. A `fail` from
/// either side wins.
pub(super) fn merge_status_overrides(
    overrides: &BTreeMap<String, TxStatus>,
    status_info: &mut BTreeMap<String, StatusInfo>,
) {
    for (hash, status) in overrides {
        let stored = status_info.entry(hash.clone()).or_default();
        if stored.status != Some(TxStatus::Fail) {
            stored.status = Some(*status);
        }
    }
}
