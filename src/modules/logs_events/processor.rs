use std::collections::HashMap;

use crate::modules::accounts::BlockStamp;
use crate::modules::logs_events::interpreters::{self, Dispatch, EventArgs, Interpreter};
use crate::modules::logs_events::logs_data::LogsData;
use crate::modules::logs_events::schemas::{self, LogEvent, Logs, PreparedLogsResults};
use crate::modules::transaction::schemas::{ScResult, Transaction};
use crate::outport_models::{Log, LogData};
use crate::types::{BalanceConverter, PubkeyConverter, ShardCoordinator};

const TARGET: &str = "outport_indexer::logs_events";

/// Runs every event of a block through the interpreter chain and renders logs for the
/// logs and events indices.
#[derive(Debug, Clone)]
pub struct LogsAndEventsProcessor {
    pubkey_converter: PubkeyConverter,
    interpreters: Vec<Interpreter>,
}

impl LogsAndEventsProcessor {
    pub fn new(
        pubkey_converter: PubkeyConverter,
        balance_converter: BalanceConverter,
        shard_coordinator: ShardCoordinator,
    ) -> Self {
        let interpreters =
            interpreters::interpreters(&pubkey_converter, &balance_converter, &shard_coordinator);
        Self {
            pubkey_converter,
            interpreters,
        }
    }

    /// Interprets the block's events in order. Flags on `txs` and `scrs` are set in place, every
    /// other finding is returned.
    pub fn extract_data_from_logs(
        &self,
        logs: &[LogData],
        txs: &mut [Transaction],
        scrs: &mut [ScResult],
        stamp: BlockStamp,
    ) -> PreparedLogsResults {
        let mut logs_data = LogsData::new(stamp, txs, scrs);
        for log_data in logs {
            for event in &log_data.log.events {
                let args = EventArgs {
                    tx_hash: &log_data.tx_hash,
                    log_address: log_data.log.address.as_slice(),
                    event,
                    self_shard: stamp.shard_id,
                };
                self.dispatch(&args, &mut logs_data);
                logs_data.mark_has_operations(&log_data.tx_hash);
            }
            logs_data.mark_has_logs(&log_data.tx_hash);
        }

        logs_data.into_results()
    }

    fn dispatch(&self, args: &EventArgs<'_>, logs_data: &mut LogsData<'_>) {
        let identifier = args.event.identifier.as_str();
        for interpreter in &self.interpreters {
            if !interpreter.identifiers().iter().any(|known| *known == identifier) {
                continue;
            }
            if interpreter.process_event(args, logs_data) == Dispatch::Processed {
                return;
            }
        }
    }

    /// One logs document per log and one events document per event.
    pub fn prepare_logs_for_db(
        &self,
        logs: &[LogData],
        txs: &[Transaction],
        scrs: &[ScResult],
        stamp: BlockStamp,
    ) -> (Vec<Logs>, Vec<LogEvent>) {
        let tx_orders: HashMap<&str, u32> = txs
            .iter()
            .map(|tx| (tx.hash.as_str(), tx.execution_order))
            .collect();
        let scrs_by_hash: HashMap<&str, &ScResult> =
            scrs.iter().map(|scr| (scr.hash.as_str(), scr)).collect();

        let mut db_logs = Vec::with_capacity(logs.len());
        let mut db_events = vec![];
        for log_data in logs {
            let scr = scrs_by_hash.get(log_data.tx_hash.as_str());
            let tx_order = match (tx_orders.get(log_data.tx_hash.as_str()), scr) {
                (Some(order), _) => i64::from(*order),
                (None, Some(scr)) => i64::from(scr.execution_order),
                (None, None) => {
                    tracing::warn!(
                        target: TARGET,
                        hash = %log_data.tx_hash,
                        "cannot find hash in the txs or scrs"
                    );
                    -1
                }
            };
            let original_tx_hash = scr
                .map(|scr| scr.original_tx_hash.clone())
                .unwrap_or_default();

            let db_log =
                self.prepare_log(&log_data.tx_hash, &log_data.log, original_tx_hash, stamp);
            db_events.extend(
                db_log
                    .events
                    .iter()
                    .map(|event| prepare_log_event(&db_log, event, tx_order, stamp.shard_id)),
            );
            db_logs.push(db_log);
        }

        (db_logs, db_events)
    }

    fn prepare_log(
        &self,
        tx_hash: &str,
        log: &Log,
        original_tx_hash: String,
        stamp: BlockStamp,
    ) -> Logs {
        let events = log
            .events
            .iter()
            .enumerate()
            .map(|(order, event)| schemas::Event {
                address: self.pubkey_converter.silent_encode(event.address.as_slice()),
                identifier: event.identifier.clone(),
                topics: event.topics.iter().map(|topic| topic.as_slice().into()).collect(),
                data: event.data.clone(),
                additional_data: event.additional_data.clone(),
                order,
            })
            .collect();

        Logs {
            id: tx_hash.to_string(),
            original_tx_hash,
            address: self.pubkey_converter.silent_encode(log.address.as_slice()),
            events,
            timestamp: stamp.timestamp,
            timestamp_ms: stamp.timestamp_ms,
        }
    }
}

fn prepare_log_event(
    log: &Logs,
    event: &schemas::Event,
    tx_order: i64,
    shard_id: u32,
) -> LogEvent {
    LogEvent {
        id: format!("{}-{}-{}", log.id, shard_id, event.order),
        tx_hash: log.id.clone(),
        original_tx_hash: log.original_tx_hash.clone(),
        log_address: log.address.clone(),
        address: event.address.clone(),
        identifier: event.identifier.clone(),
        data: event.data.to_hex(),
        additional_data: event
            .additional_data
            .iter()
            .map(|data| data.to_hex())
            .collect(),
        topics: event.topics.iter().map(|topic| topic.to_hex()).collect(),
        order: event.order,
        tx_order,
        shard_id,
        timestamp: log.timestamp,
        timestamp_ms: log.timestamp_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::logs_events::schemas::StatusInfo;
    use crate::modules::tests::*;
    use crate::modules::transaction::schemas::TxStatus;
    use crate::outport_models::Event;

    fn processor() -> LogsAndEventsProcessor {
        let config = init_config();
        LogsAndEventsProcessor::new(
            PubkeyConverter::new(&config.address).unwrap(),
            BalanceConverter::new(config.denomination).unwrap(),
            ShardCoordinator::new(config.num_of_shards).unwrap(),
        )
    }

    fn stamp() -> BlockStamp {
        BlockStamp {
            shard_id: 0,
            timestamp: 1000,
            timestamp_ms: 1_000_000,
        }
    }

    fn log_data(tx_hash: &str, address: Vec<u8>, events: Vec<Event>) -> LogData {
        LogData {
            tx_hash: tx_hash.to_string(),
            log: Log {
                address: address.into(),
                events,
            },
        }
    }

    #[test]
    fn test_extract_sets_flags_and_collects_findings() {
        let mut txs = vec![Transaction {
            hash: "aa".to_string(),
            status: TxStatus::Success,
            ..Transaction::default()
        }];
        let mut scrs = vec![ScResult {
            hash: "bb".to_string(),
            original_tx_hash: "cc".to_string(),
            ..ScResult::default()
        }];
        let deploy = event("SCDeploy", sc_address(0), vec![sc_address(0), address(0)]);
        let signal_error = event("signalError", address(0), vec![]);
        let logs = vec![
            log_data("aa", sc_address(0), vec![deploy]),
            log_data("bb", address(0), vec![signal_error]),
            log_data("unknown", address(0), vec![]),
        ];

        let results = processor().extract_data_from_logs(&logs, &mut txs, &mut scrs, stamp());

        assert!(txs[0].has_logs && txs[0].has_operations);
        assert!(scrs[0].has_logs && scrs[0].has_operations);
        assert_eq!(txs[0].status, TxStatus::Success);
        assert_eq!(
            results.sc_deploys[&hex::encode(sc_address(0))].creator,
            encoded_address(0)
        );
        assert_eq!(
            results.tx_hash_status_info["cc"],
            StatusInfo {
                status: Some(TxStatus::Fail),
                error_event: true,
                completed_event: false,
            }
        );
    }

    #[test]
    fn test_unknown_identifiers_still_mark_operations() {
        let mut txs = vec![Transaction {
            hash: "aa".to_string(),
            ..Transaction::default()
        }];
        let logs = vec![log_data(
            "aa",
            address(0),
            vec![event("ESDTTransfer", address(0), vec![b"TKN-abcd".to_vec()])],
        )];

        let results = processor().extract_data_from_logs(&logs, &mut txs, &mut [], stamp());

        assert!(txs[0].has_operations);
        assert!(results.tokens.is_empty() && results.tokens_info.is_empty());
    }

    #[test]
    fn test_prepare_logs_for_db() {
        let txs = vec![Transaction {
            hash: "aa".to_string(),
            execution_order: 3,
            ..Transaction::default()
        }];
        let scrs = vec![ScResult {
            hash: "bb".to_string(),
            original_tx_hash: "aa".to_string(),
            execution_order: 5,
            ..ScResult::default()
        }];
        let mut transfer = event("ESDTTransfer", address(0), vec![b"TKN".to_vec(), vec![0x01]]);
        transfer.data = b"data".to_vec().into();
        transfer.additional_data = vec![b"more".to_vec().into()];
        let logs = vec![
            log_data(
                "aa",
                address(0),
                vec![transfer.clone(), event("writeLog", address(0), vec![])],
            ),
            log_data("bb", address(1), vec![transfer]),
            log_data("dd", address(1), vec![event("writeLog", address(1), vec![])]),
        ];

        let (db_logs, db_events) = processor().prepare_logs_for_db(&logs, &txs, &scrs, stamp());

        assert_eq!(db_logs.len(), 3);
        assert_eq!(db_logs[0].id, "aa");
        assert_eq!(db_logs[0].address, encoded_address(0));
        assert_eq!(db_logs[0].events[1].order, 1);
        assert_eq!(db_logs[1].original_tx_hash, "aa");

        let ids: Vec<&str> = db_events.iter().map(|event| event.id.as_str()).collect();
        assert_eq!(ids, vec!["aa-0-0", "aa-0-1", "bb-0-0", "dd-0-0"]);
        let orders: Vec<i64> = db_events.iter().map(|event| event.tx_order).collect();
        assert_eq!(orders, vec![3, 3, 5, -1]);

        let first = &db_events[0];
        assert_eq!(first.topics, vec![hex::encode("TKN"), "01".to_string()]);
        assert_eq!(first.data, hex::encode("data"));
        assert_eq!(first.additional_data, vec![hex::encode("more")]);
        assert_eq!(
            serde_json::to_value(first).unwrap()["additionalData"],
            serde_json::json!(["6d6f7265"])
        );
        assert_eq!(first.log_address, encoded_address(0));
        assert_eq!(first.timestamp_ms, 1_000_000);
        assert_eq!(db_events[2].original_tx_hash, "aa");
    }
}
