use crate::modules::transaction::checkers;
use crate::modules::transaction::schemas::{ScResult, Transaction, TxStatus};
use crate::types::address;

pub const TX_TYPE_NORMAL: &str = "normal";
pub const TX_TYPE_UNSIGNED: &str = "unsigned";

/// Builds the records of the operations index: transactions and smart contract results side by
/// side, typed, without the embedded results.
#[derive(Debug, Clone, Copy)]
pub struct OperationsProcessor {
    import_db: bool,
    self_shard: u32,
}

impl OperationsProcessor {
    pub fn new(import_db: bool, self_shard: u32) -> Self {
        Self {
            import_db,
            self_shard,
        }
    }

    pub fn process_transactions_and_scrs(
        &self,
        txs: &[Transaction],
        scrs: &[ScResult],
    ) -> (Vec<Transaction>, Vec<ScResult>) {
        let operations_txs = txs
            .iter()
            .filter(|tx| self.should_index(tx.receiver_shard))
            .map(|tx| Transaction {
                smart_contract_results: vec![],
                tx_type: TX_TYPE_NORMAL.to_string(),
                ..tx.clone()
            })
            .collect();

        let operations_scrs = scrs
            .iter()
            .filter(|scr| self.should_index(scr.receiver_shard))
            .map(|scr| {
                let mut scr = scr.clone();
                scr.scr_type = TX_TYPE_UNSIGNED.to_string();
                scr.can_be_ignored = can_be_ignored(&scr);
                scr.status = Some(if scr.receiver_shard == self.self_shard {
                    TxStatus::Success
                } else {
                    TxStatus::Pending
                });
                scr
            })
            .collect();

        (operations_txs, operations_scrs)
    }

    fn should_index(&self, destination_shard: u32) -> bool {
        !self.import_db || destination_shard == self.self_shard
    }
}

/// A result that only repeats what its transaction already says.
fn can_be_ignored(scr: &ScResult) -> bool {
    let data = scr.data.as_slice();
    let is_refund_for_relayed =
        scr.return_message == checkers::GAS_REFUND_FOR_RELAYER_MESSAGE && data.is_empty();
    if checkers::is_data_ok(data) || is_refund_for_relayed {
        return true;
    }

    checkers::is_nft_or_multi_transfer(&scr.operation)
        && !address::is_smart_contract_address(&scr.sender_address_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::tests::*;
    use crate::types::Base64VecU8;

    #[test]
    fn test_import_db_keeps_own_destination_only() {
        let processor = OperationsProcessor::new(true, 0);
        let txs = vec![
            Transaction::default(),
            Transaction {
                receiver_shard: 1,
                ..Transaction::default()
            },
        ];
        let (txs, _) = processor.process_transactions_and_scrs(&txs, &[]);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].tx_type, TX_TYPE_NORMAL);
    }

    #[test]
    fn test_scr_type_status_and_ignore_flag() {
        let processor = OperationsProcessor::new(false, 0);
        let scrs = vec![
            ScResult {
                hash: "ok".to_string(),
                data: Base64VecU8(b"@6f6b".to_vec()),
                ..ScResult::default()
            },
            ScResult {
                hash: "refund".to_string(),
                return_message: "gas refund for relayer".to_string(),
                receiver_shard: 1,
                ..ScResult::default()
            },
            ScResult {
                hash: "user-nft".to_string(),
                operation: "ESDTNFTTransfer".to_string(),
                sender_address_bytes: address(0),
                ..ScResult::default()
            },
            ScResult {
                hash: "contract-nft".to_string(),
                operation: "ESDTNFTTransfer".to_string(),
                sender_address_bytes: sc_address(0),
                ..ScResult::default()
            },
        ];

        let (_, scrs) = processor.process_transactions_and_scrs(&[], &scrs);
        let ignored: Vec<bool> = scrs.iter().map(|scr| scr.can_be_ignored).collect();
        assert_eq!(ignored, vec![true, true, true, false]);
        assert!(scrs.iter().all(|scr| scr.scr_type == TX_TYPE_UNSIGNED));
        assert_eq!(scrs[0].status, Some(TxStatus::Success));
        assert_eq!(scrs[1].status, Some(TxStatus::Pending));
    }
}
