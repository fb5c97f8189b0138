use crate::modules::logs_events::interpreters::{Dispatch, EventArgs, EventInterpreter};
use crate::modules::logs_events::logs_data::LogsData;
use crate::modules::logs_events::schemas::StatusInfo;
use crate::modules::transaction::schemas::TxStatus;

const WRITE_LOG: &str = "writeLog";
const SIGNAL_ERROR: &str = "signalError";
const COMPLETED_TX_EVENT: &str = "completedTxEvent";
const INTERNAL_VM_ERRORS: &str = "internalVMErrors";

/// Events that only report how execution ended.
#[derive(Debug, Clone)]
pub(crate) struct InformativeInterpreter;

impl EventInterpreter for InformativeInterpreter {
    fn identifiers(&self) -> &'static [&'static str] {
        &[WRITE_LOG, SIGNAL_ERROR, COMPLETED_TX_EVENT, INTERNAL_VM_ERRORS]
    }

    fn process_event(&self, args: &EventArgs<'_>, logs_data: &mut LogsData<'_>) -> Dispatch {
        let identifier = args.event.identifier.as_str();
        let Some(tx) = logs_data.tx_mut(args.tx_hash) else {
            record_for_original_tx(identifier, args.tx_hash, logs_data);
            return Dispatch::Processed;
        };

        match identifier {
            COMPLETED_TX_EVENT => tx.completed_event = true,
            WRITE_LOG => tx.status = TxStatus::Success,
            _ => {
                tx.status = TxStatus::Fail;
                tx.error_event = true;
            }
        }

        Dispatch::Processed
    }
}

/// The log belongs to a result; its outcome is kept against the transaction that started it.
fn record_for_original_tx(identifier: &str, hash: &str, logs_data: &mut LogsData<'_>) {
    let Some(original_tx_hash) = logs_data
        .scr(hash)
        .map(|scr| scr.original_tx_hash.clone())
        .filter(|original_tx_hash| !original_tx_hash.is_empty())
    else {
        return;
    };

    let record = match identifier {
        COMPLETED_TX_EVENT => StatusInfo {
            completed_event: true,
            ..StatusInfo::default()
        },
        SIGNAL_ERROR | INTERNAL_VM_ERRORS => StatusInfo {
            status: Some(TxStatus::Fail),
            error_event: true,
            ..StatusInfo::default()
        },
        _ => return,
    };
    logs_data
        .tx_hash_status_info
        .add_record(&original_tx_hash, record);
}
