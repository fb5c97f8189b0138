use std::collections::BTreeMap;

use crate::modules::transaction::checkers;
use crate::modules::transaction::fee::FeeComputer;
use crate::modules::transaction::schemas::{FeeData, ScResult, Transaction, TxStatus};
use crate::types::{numeric, BalanceConverter};

const TARGET: &str = "outport_indexer::transactions";

/// Folds smart contract results into the transactions that produced them.
#[derive(Debug, Clone)]
pub(crate) struct ScrsDataToTransactions {
    fee_computer: FeeComputer,
    balance_converter: BalanceConverter,
}

impl ScrsDataToTransactions {
    pub fn new(fee_computer: FeeComputer, balance_converter: BalanceConverter) -> Self {
        Self {
            fee_computer,
            balance_converter,
        }
    }

    /// Appends every result to its original transaction and returns the ones whose transaction
    /// is not part of this block.
    pub fn attach_scrs_to_transactions_and_return_scrs_without_tx<'a>(
        &self,
        txs: &mut BTreeMap<String, Transaction>,
        scrs: &'a [ScResult],
    ) -> Vec<&'a ScResult> {
        let mut scrs_without_tx = vec![];
        for scr in scrs {
            match txs.get_mut(&scr.original_tx_hash) {
                Some(tx) => tx.smart_contract_results.push(scr.clone()),
                None => scrs_without_tx.push(scr),
            }
        }

        scrs_without_tx
    }

    pub fn process_transactions_after_scrs_were_attached(
        &self,
        txs: &mut BTreeMap<String, Transaction>,
    ) {
        for tx in txs.values_mut() {
            if tx.smart_contract_results.is_empty() {
                continue;
            }
            self.fill_tx_with_scrs_fields(tx);
        }
    }

    pub fn fill_tx_with_scrs_fields(&self, tx: &mut Transaction) {
        tx.has_scr = true;

        if checkers::is_relayed_tx(tx) || tx.status == TxStatus::Invalid {
            return;
        }

        if tx
            .smart_contract_results
            .iter()
            .any(|scr| checkers::is_sc_result_successful(scr.data.as_slice()))
        {
            return;
        }

        tx.gas_used = tx.gas_limit;
        let fee = self
            .fee_computer
            .compute_tx_fee_based_on_gas_used(tx.gas_price, tx.gas_used, tx.data.as_slice());
        tx.fee = fee.to_string();
        tx.fee_num = match self.balance_converter.convert_big_value_to_float(&fee) {
            Ok(fee_num) => fee_num,
            Err(err) => {
                tracing::warn!(
                    target: TARGET,
                    hash = %tx.hash,
                    fee = %fee,
                    error = %err,
                    "cannot compute fee as num"
                );
                0.0
            }
        };

        if has_cross_shard_pending_transfer(&tx.smart_contract_results) {
            return;
        }

        let has_failed_scr = tx
            .smart_contract_results
            .iter()
            .any(|scr| checkers::is_sc_result_failed(scr.data.as_slice(), &scr.return_message));
        if has_failed_scr {
            tx.status = TxStatus::Fail;
        }
    }

    /// Fee corrections keyed by the original transaction hash.
    pub fn process_scrs_without_tx(&self, scrs: &[&ScResult]) -> BTreeMap<String, FeeData> {
        let mut tx_hash_fee = BTreeMap::new();
        for scr in scrs {
            if (scr.initial_tx_gas_used == 0 || scr.original_tx_hash.is_empty())
                && scr.gas_refunded == 0
            {
                continue;
            }

            let fee_num = match numeric::parse_big_int(&scr.initial_tx_fee)
                .and_then(|fee| self.balance_converter.convert_big_value_to_float(&fee))
            {
                Ok(fee_num) => fee_num,
                Err(err) => {
                    tracing::warn!(
                        target: TARGET,
                        hash = %scr.original_tx_hash,
                        initial_tx_fee = %scr.initial_tx_fee,
                        error = %err,
                        "cannot compute fee as num"
                    );
                    0.0
                }
            };

            tx_hash_fee.insert(
                scr.original_tx_hash.clone(),
                FeeData {
                    fee: scr.initial_tx_fee.clone(),
                    fee_num,
                    gas_used: scr.initial_tx_gas_used,
                    receiver: scr.receiver.clone(),
                    gas_refunded: scr.gas_refunded,
                },
            );
        }

        tx_hash_fee
    }

    /// Failed NFT transfers whose original transaction lives in another block.
    pub fn status_overrides_for_scrs_without_tx(
        &self,
        scrs: &[&ScResult],
    ) -> BTreeMap<String, TxStatus> {
        scrs.iter()
            .filter(|scr| {
                checkers::is_esdt_nft_transfer_with_user_error(&scr.data.as_string_lossy())
            })
            .map(|scr| (scr.original_tx_hash.clone(), TxStatus::Fail))
            .collect()
    }
}

fn has_cross_shard_pending_transfer(scrs: &[ScResult]) -> bool {
    scrs.iter().any(|scr| {
        let data = scr.data.as_string_lossy();
        let split: Vec<&str> = data.split(checkers::AT_SEPARATOR).collect();
        split.len() >= 2
            && checkers::is_nft_or_multi_transfer(split[0])
            && scr.sender_shard != scr.receiver_shard
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EconomicsConfig;
    use crate::types::Base64VecU8;

    fn processor() -> ScrsDataToTransactions {
        ScrsDataToTransactions::new(
            FeeComputer::new(&EconomicsConfig::default()).unwrap(),
            BalanceConverter::new(18).unwrap(),
        )
    }

    fn tx(hash: &str) -> Transaction {
        Transaction {
            hash: hash.to_string(),
            gas_limit: 100_000,
            gas_price: 1_000_000_000,
            gas_used: 60_000,
            fee: "60000000000000".to_string(),
            status: TxStatus::Success,
            ..Transaction::default()
        }
    }

    fn scr(hash: &str, original: &str, data: &str) -> ScResult {
        ScResult {
            hash: hash.to_string(),
            original_tx_hash: original.to_string(),
            data: Base64VecU8(data.as_bytes().to_vec()),
            ..ScResult::default()
        }
    }

    #[test]
    fn test_attach_returns_orphans() {
        let mut txs = BTreeMap::from([("aa".to_string(), tx("aa"))]);
        let scrs = vec![scr("s1", "aa", "@6f6b"), scr("s2", "bb", "@6f6b")];

        let orphans =
            processor().attach_scrs_to_transactions_and_return_scrs_without_tx(&mut txs, &scrs);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].hash, "s2");
        assert_eq!(txs["aa"].smart_contract_results.len(), 1);
    }

    #[test]
    fn test_successful_scr_keeps_status() {
        let mut tx = tx("aa");
        tx.smart_contract_results = vec![scr("s1", "aa", "@6f6b")];
        processor().fill_tx_with_scrs_fields(&mut tx);
        assert!(tx.has_scr);
        assert_eq!(tx.status, TxStatus::Success);
        assert_eq!(tx.gas_used, 60_000);
    }

    #[test]
    fn test_failed_scr_fails_tx_and_consumes_gas_limit() {
        let mut tx = tx("aa");
        tx.smart_contract_results = vec![scr("s1", "aa", "@75736572206572726f72")];
        processor().fill_tx_with_scrs_fields(&mut tx);
        assert_eq!(tx.status, TxStatus::Fail);
        assert_eq!(tx.gas_used, 100_000);
        // 50000 at full price plus 50000 at a hundredth of it
        assert_eq!(tx.fee, "50500000000000");
        assert_eq!(tx.fee_num, 0.0000505);
    }

    #[test]
    fn test_return_message_error_fails_tx() {
        let mut tx = tx("aa");
        let mut failed = scr("s1", "aa", "");
        failed.return_message = "user error".to_string();
        tx.smart_contract_results = vec![failed];

        processor().fill_tx_with_scrs_fields(&mut tx);
        assert_eq!(tx.status, TxStatus::Fail);
    }

    #[test]
    fn test_scr_without_ok_or_error_keeps_status() {
        let mut tx = tx("aa");
        tx.smart_contract_results = vec![scr("s1", "aa", "ESDTTransfer@544b4e@0a")];

        processor().fill_tx_with_scrs_fields(&mut tx);
        assert_eq!(tx.status, TxStatus::Success);
        assert_eq!(tx.gas_used, 100_000);
    }

    #[test]
    fn test_status_is_independent_of_scr_order() {
        let scrs = vec![
            scr("s1", "aa", "@75736572206572726f72"),
            scr("s2", "aa", "@ok"),
        ];
        let mut forward = tx("aa");
        forward.smart_contract_results = scrs.clone();
        let mut backward = tx("aa");
        backward.smart_contract_results = scrs.into_iter().rev().collect();

        processor().fill_tx_with_scrs_fields(&mut forward);
        processor().fill_tx_with_scrs_fields(&mut backward);
        assert_eq!(forward.status, backward.status);
        assert_eq!(forward.status, TxStatus::Success);
    }

    #[test]
    fn test_cross_shard_nft_transfer_stays_pending() {
        let mut tx = tx("aa");
        tx.status = TxStatus::Pending;
        let mut transfer = scr("s1", "aa", "ESDTNFTTransfer@4e4654@01@01");
        transfer.sender_shard = 0;
        transfer.receiver_shard = 1;
        tx.smart_contract_results = vec![transfer];

        processor().fill_tx_with_scrs_fields(&mut tx);
        assert_eq!(tx.status, TxStatus::Pending);
        assert_eq!(tx.gas_used, 100_000);
    }

    #[test]
    fn test_relayed_and_invalid_are_untouched() {
        let mut relayed = tx("aa");
        relayed.data = Base64VecU8(b"relayedTx@7b7d".to_vec());
        relayed.smart_contract_results = vec![scr("s1", "aa", "@75736572206572726f72")];
        processor().fill_tx_with_scrs_fields(&mut relayed);
        assert_eq!(relayed.status, TxStatus::Success);
        assert!(relayed.has_scr);

        let mut invalid = tx("bb");
        invalid.status = TxStatus::Invalid;
        invalid.smart_contract_results = vec![scr("s2", "bb", "@75736572206572726f72")];
        processor().fill_tx_with_scrs_fields(&mut invalid);
        assert_eq!(invalid.status, TxStatus::Invalid);
        assert_eq!(invalid.gas_used, 60_000);
    }

    #[test]
    fn test_scrs_without_tx() {
        let mut with_gas = scr("s1", "aa", "");
        with_gas.initial_tx_gas_used = 500;
        with_gas.initial_tx_fee = "1000000000000000000".to_string();
        with_gas.receiver = "rcv".to_string();
        let mut refund_only = scr("s2", "", "");
        refund_only.gas_refunded = 10;
        refund_only.initial_tx_fee = "0".to_string();
        let skipped = scr("s3", "cc", "");
        let user_error = scr(
            "s4",
            "dd",
            "MultiESDTNFTTransfer@01@4e4654@01@75736572206572726f72",
        );

        let orphans = vec![&with_gas, &refund_only, &skipped, &user_error];
        let processor = processor();
        let fees = processor.process_scrs_without_tx(&orphans);
        assert_eq!(fees.len(), 2);
        assert_eq!(fees["aa"].fee_num, 1.0);
        assert_eq!(fees["aa"].gas_used, 500);
        assert_eq!(fees["aa"].receiver, "rcv");
        assert_eq!(fees[""].gas_refunded, 10);

        let statuses = processor.status_overrides_for_scrs_without_tx(&orphans);
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses["dd"], TxStatus::Fail);
    }
}
