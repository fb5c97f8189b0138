use crate::modules::transaction::datafield::{DataFieldParser, ResponseParseData};
use crate::modules::transaction::schemas::{Receipt, ScResult, Transaction, TxStatus};
use crate::outport_models::{FeeInfo, Header, MiniBlock, ReceiptInfo, RewardInfo, ScrInfo, TxInfo};
use crate::types::numeric::{self, MAX_ESDT_VALUE_LENGTH};
use crate::types::{address, BalanceConverter, PubkeyConverter};

const TARGET: &str = "outport_indexer::transactions";
pub(crate) const REWARDS_OPERATION: &str = "reward";

/// Where a record was found: miniblock hash and the shard pair it travels between.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placement<'a> {
    pub mb_hash: &'a str,
    pub sender_shard: u32,
    pub receiver_shard: u32,
}

impl<'a> Placement<'a> {
    pub fn of(mb_hash: &'a str, mini_block: &MiniBlock) -> Self {
        Self {
            mb_hash,
            sender_shard: mini_block.sender_shard_id,
            receiver_shard: mini_block.receiver_shard_id,
        }
    }
}

/// Projects raw pool records into documents.
#[derive(Debug, Clone)]
pub(crate) struct TransactionBuilder {
    pubkey_converter: PubkeyConverter,
    balance_converter: BalanceConverter,
    parser: DataFieldParser,
}

impl TransactionBuilder {
    pub fn new(
        pubkey_converter: PubkeyConverter,
        balance_converter: BalanceConverter,
        parser: DataFieldParser,
    ) -> Self {
        Self {
            pubkey_converter,
            balance_converter,
            parser,
        }
    }

    pub fn prepare_transaction(
        &self,
        tx_info: &TxInfo,
        hash: &str,
        placement: Placement<'_>,
        header: &Header,
        status: TxStatus,
    ) -> Transaction {
        let tx = &tx_info.transaction;
        let fee_info = tx_info.fee_info.clone().unwrap_or_else(zero_fee_info);
        let parsed = self
            .parser
            .parse(tx.data.as_slice(), tx.snd_addr.as_slice(), tx.rcv_addr.as_slice());
        let esdt_values_num = self.esdt_values_as_float(&parsed.esdt_values, hash);

        let mut transaction = Transaction {
            hash: hash.to_string(),
            mb_hash: placement.mb_hash.to_string(),
            nonce: tx.nonce,
            round: header.round,
            value: tx.value.clone(),
            value_num: self.big_value_as_float(&tx.value, hash, "value"),
            receiver: self.pubkey_converter.silent_encode(tx.rcv_addr.as_slice()),
            sender: self.pubkey_converter.silent_encode(tx.snd_addr.as_slice()),
            receiver_shard: placement.receiver_shard,
            sender_shard: placement.sender_shard,
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            gas_used: fee_info.gas_used,
            fee_num: self.big_value_as_float(&fee_info.fee, hash, "fee"),
            fee: fee_info.fee,
            initial_paid_fee: fee_info.initial_paid_fee,
            data: tx.data.clone(),
            signature: tx.signature.to_hex(),
            timestamp: header.timestamp,
            timestamp_ms: header.timestamp_ms,
            status,
            sender_user_name: tx.snd_user_name.clone(),
            receiver_user_name: tx.rcv_user_name.clone(),
            is_sc_call: address::is_smart_contract_address(tx.rcv_addr.as_slice()),
            version: tx.version,
            receiver_address_bytes: tx.rcv_addr.0.clone(),
            execution_order: tx_info.execution_order,
            ..Transaction::default()
        };
        apply_parsed_data(&mut transaction, parsed, esdt_values_num);

        transaction
    }

    pub fn prepare_reward_transaction(
        &self,
        reward_info: &RewardInfo,
        hash: &str,
        placement: Placement<'_>,
        header: &Header,
        status: TxStatus,
    ) -> Transaction {
        let reward = &reward_info.reward;
        Transaction {
            hash: hash.to_string(),
            mb_hash: placement.mb_hash.to_string(),
            nonce: 0,
            round: reward.round,
            value: reward.value.clone(),
            value_num: self.big_value_as_float(&reward.value, hash, "value"),
            receiver: self.pubkey_converter.silent_encode(reward.rcv_addr.as_slice()),
            sender: crate::METACHAIN_SHARD_ID.to_string(),
            receiver_shard: placement.receiver_shard,
            sender_shard: placement.sender_shard,
            fee: "0".to_string(),
            timestamp: header.timestamp,
            timestamp_ms: header.timestamp_ms,
            status,
            operation: REWARDS_OPERATION.to_string(),
            receiver_address_bytes: reward.rcv_addr.0.clone(),
            execution_order: reward_info.execution_order,
            ..Transaction::default()
        }
    }

    pub fn prepare_receipt(&self, hash: &str, receipt: &ReceiptInfo, header: &Header) -> Receipt {
        Receipt {
            hash: hash.to_string(),
            value: receipt.value.clone(),
            sender: self.pubkey_converter.silent_encode(receipt.snd_addr.as_slice()),
            data: receipt.data.as_string_lossy(),
            tx_hash: receipt.tx_hash.to_hex(),
            timestamp: header.timestamp,
        }
    }

    pub fn prepare_sc_result(
        &self,
        scr_info: &ScrInfo,
        hash: &str,
        placement: Placement<'_>,
        header: &Header,
    ) -> ScResult {
        let scr = &scr_info.result;
        let fee_info = scr_info.fee_info.clone().unwrap_or_else(zero_fee_info);
        let parsed = self
            .parser
            .parse(scr.data.as_slice(), scr.snd_addr.as_slice(), scr.rcv_addr.as_slice());
        let esdt_values_num = self.esdt_values_as_float(&parsed.esdt_values, hash);
        let esdt_values = if are_esdt_values_ok(&parsed.esdt_values) {
            parsed.esdt_values
        } else {
            vec![]
        };

        let relayer_addr = if scr.relayer_addr.is_empty() {
            String::new()
        } else {
            self.pubkey_converter.silent_encode(scr.relayer_addr.as_slice())
        };
        let original_sender = if scr.original_sender.is_empty() {
            String::new()
        } else {
            self.pubkey_converter.silent_encode(scr.original_sender.as_slice())
        };

        ScResult {
            hash: hash.to_string(),
            mb_hash: placement.mb_hash.to_string(),
            nonce: scr.nonce,
            gas_limit: scr.gas_limit,
            gas_price: scr.gas_price,
            value: scr.value.clone(),
            value_num: self.big_value_as_float(&scr.value, hash, "value"),
            sender: self.pubkey_converter.silent_encode(scr.snd_addr.as_slice()),
            receiver: self.pubkey_converter.silent_encode(scr.rcv_addr.as_slice()),
            sender_shard: placement.sender_shard,
            receiver_shard: placement.receiver_shard,
            relayer_addr,
            relayed_value: scr.relayed_value.clone().unwrap_or_default(),
            code: scr.code.as_string_lossy(),
            data: scr.data.clone(),
            prev_tx_hash: scr.prev_tx_hash.to_hex(),
            original_tx_hash: scr.original_tx_hash.to_hex(),
            call_type: scr.call_type.to_string(),
            code_metadata: scr.code_metadata.clone(),
            return_message: scr.return_message.as_string_lossy(),
            timestamp: header.timestamp,
            timestamp_ms: header.timestamp_ms,
            tokens: parsed.tokens,
            esdt_values,
            esdt_values_num,
            receivers: parsed.receivers,
            receivers_shard_ids: parsed.receivers_shard_ids,
            operation: parsed.operation,
            function: crate::utils::truncate_field(&parsed.function),
            is_relayed: parsed.is_relayed,
            original_sender,
            sender_address_bytes: scr.snd_addr.0.clone(),
            initial_tx_fee: fee_info.fee,
            initial_tx_gas_used: fee_info.gas_used,
            gas_refunded: fee_info.gas_refunded,
            execution_order: scr_info.execution_order,
            ..ScResult::default()
        }
    }

    fn big_value_as_float(&self, value: &str, hash: &str, field: &str) -> f64 {
        let converted = numeric::parse_big_int(value)
            .and_then(|value| self.balance_converter.convert_big_value_to_float(&value));
        match converted {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    target: TARGET,
                    hash = %hash,
                    field = %field,
                    value = %value,
                    error = %err,
                    "cannot compute value as num"
                );
                0.0
            }
        }
    }

    fn esdt_values_as_float(&self, values: &[String], hash: &str) -> Vec<f64> {
        match self.balance_converter.compute_slice_of_strings_as_float(values) {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(
                    target: TARGET,
                    hash = %hash,
                    error = %err,
                    "cannot compute esdt values as num"
                );
                vec![]
            }
        }
    }
}

fn zero_fee_info() -> FeeInfo {
    FeeInfo {
        gas_used: 0,
        fee: "0".to_string(),
        initial_paid_fee: "0".to_string(),
        gas_refunded: 0,
    }
}

pub(crate) fn are_esdt_values_ok(values: &[String]) -> bool {
    values.iter().all(|value| value.len() <= MAX_ESDT_VALUE_LENGTH)
}

fn apply_parsed_data(
    transaction: &mut Transaction,
    parsed: ResponseParseData,
    esdt_values_num: Vec<f64>,
) {
    transaction.operation = parsed.operation;
    transaction.function = crate::utils::truncate_field(&parsed.function);
    transaction.tokens = crate::utils::truncate_fields(parsed.tokens);
    transaction.receivers = parsed.receivers;
    transaction.receivers_shard_ids = parsed.receivers_shard_ids;
    transaction.is_relayed = parsed.is_relayed;
    transaction.esdt_values_num = esdt_values_num;
    if are_esdt_values_ok(&parsed.esdt_values) {
        transaction.esdt_values = parsed.esdt_values;
    }
}
