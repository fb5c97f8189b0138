//! Return-data heuristics over historical VM behaviour. The markers are compatibility strings.

use crate::modules::transaction::datafield::{
    ESDT_NFT_TRANSFER, ESDT_TRANSFER, MULTI_ESDT_NFT_TRANSFER, RELAYED_TX, RELAYED_TX_V2,
};
use crate::modules::transaction::schemas::Transaction;

pub(crate) const AT_SEPARATOR: char = '@';
pub(crate) const GAS_REFUND_FOR_RELAYER_MESSAGE: &str = "gas refund for relayer";

const OK_HEX_ENCODED: &str = "@6f6b";
const OK_PLAIN: &str = "@ok";
const USER_ERROR_HEX_ENCODED: &str = "75736572206572726f72";
const MIN_NUM_OF_ARGUMENTS_NFT_TRANSFER_OR_MULTI_TRANSFER: usize = 4;

/// Return codes of the VM other than `ok`. Failed results carry one as `@<hex code>` in their
/// data or as their return message.
const VM_ERROR_CODES: [&str; 12] = [
    "function not found",
    "wrong signature",
    "contract not found",
    "user error",
    "out of gas",
    "account collision",
    "out of funds",
    "call stack overflow",
    "contract invalid",
    "execution failed",
    "upgrade failed",
    "simulate failed",
];

pub(crate) fn is_sc_result_successful(data: &[u8]) -> bool {
    contains(data, OK_HEX_ENCODED.as_bytes()) || contains(data, OK_PLAIN.as_bytes())
}

pub(crate) fn is_sc_result_failed(data: &[u8], return_message: &str) -> bool {
    VM_ERROR_CODES.iter().any(|code| {
        let marker = format!("{}{}", AT_SEPARATOR, hex::encode(code));
        return_message == *code || contains(data, marker.as_bytes())
    })
}

/// Return data starting with the `ok` marker.
pub(crate) fn is_data_ok(data: &[u8]) -> bool {
    data.starts_with(OK_HEX_ENCODED.as_bytes())
}

pub(crate) fn is_relayed_tx(tx: &Transaction) -> bool {
    let data = tx.data.as_slice();
    let is_relayed =
        data.starts_with(RELAYED_TX.as_bytes()) || data.starts_with(RELAYED_TX_V2.as_bytes());
    is_relayed && !tx.smart_contract_results.is_empty()
}

pub(crate) fn is_nft_or_multi_transfer(function: &str) -> bool {
    function == ESDT_NFT_TRANSFER || function == MULTI_ESDT_NFT_TRANSFER
}

pub(crate) fn is_esdt_nft_transfer_with_user_error(data: &str) -> bool {
    let split: Vec<&str> = data.split(AT_SEPARATOR).collect();
    if !is_nft_or_multi_transfer(split[0])
        || split.len() < MIN_NUM_OF_ARGUMENTS_NFT_TRANSFER_OR_MULTI_TRANSFER
    {
        return false;
    }

    split.last() == Some(&USER_ERROR_HEX_ENCODED)
}

pub(crate) fn is_cross_shard_on_source_shard(tx: &Transaction, self_shard: u32) -> bool {
    tx.sender_shard != tx.receiver_shard && tx.sender_shard == self_shard
}

/// Intra-shard NFT or multi transfer, whose status may already have been settled by the logs.
pub(crate) fn is_nft_or_multi_transfer_tx(tx: &Transaction) -> bool {
    if tx.sender_shard != tx.receiver_shard {
        return false;
    }

    let data = String::from_utf8_lossy(tx.data.as_slice());
    let split: Vec<&str> = data.split(AT_SEPARATOR).collect();
    split.len() >= MIN_NUM_OF_ARGUMENTS_NFT_TRANSFER_OR_MULTI_TRANSFER
        && is_nft_or_multi_transfer(split[0])
}

/// A plain `ESDTTransfer` that calls no function on the receiver.
pub(crate) fn is_simple_esdt_transfer(tx: &Transaction) -> bool {
    tx.operation == ESDT_TRANSFER && tx.function.is_empty()
}

pub(crate) fn is_simple_esdt_transfer_cross_shard_on_destination(
    tx: &Transaction,
    self_shard: u32,
) -> bool {
    let is_cross_on_destination =
        tx.sender_shard != tx.receiver_shard && tx.receiver_shard == self_shard;
    is_simple_esdt_transfer(tx) && is_cross_on_destination
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}
