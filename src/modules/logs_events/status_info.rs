use std::collections::BTreeMap;

use crate::modules::logs_events::schemas::StatusInfo;
use crate::modules::transaction::schemas::TxStatus;

/// Merges the status facts reported for transactions outside the block's working set.
#[derive(Debug, Clone, Default)]
pub(crate) struct TxHashStatusInfo {
    records: BTreeMap<String, StatusInfo>,
}

impl TxHashStatusInfo {
    /// A stored `fail` is final; the event flags only ever turn on.
    pub fn add_record(&mut self, hash: &str, status_info: StatusInfo) {
        let Some(stored) = self.records.get_mut(hash) else {
            self.records.insert(hash.to_string(), status_info);
            return;
        };

        if stored.status != Some(TxStatus::Fail) {
            stored.status = status_info.status;
        }
        stored.error_event |= status_info.error_event;
        stored.completed_event |= status_info.completed_event;
    }

    pub fn into_records(self) -> BTreeMap<String, StatusInfo> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_is_never_overwritten() {
        let mut status_info = TxHashStatusInfo::default();
        status_info.add_record(
            "aa",
            StatusInfo {
                status: Some(TxStatus::Fail),
                error_event: true,
                ..StatusInfo::default()
            },
        );
        status_info.add_record(
            "aa",
            StatusInfo {
                completed_event: true,
                ..StatusInfo::default()
            },
        );

        let records = status_info.into_records();
        assert_eq!(
            records["aa"],
            StatusInfo {
                status: Some(TxStatus::Fail),
                error_event: true,
                completed_event: true,
            }
        );
    }

    #[test]
    fn test_later_status_replaces_non_fail() {
        let mut status_info = TxHashStatusInfo::default();
        status_info.add_record(
            "aa",
            StatusInfo {
                completed_event: true,
                ..StatusInfo::default()
            },
        );
        status_info.add_record(
            "aa",
            StatusInfo {
                status: Some(TxStatus::Fail),
                error_event: true,
                ..StatusInfo::default()
            },
        );

        let records = status_info.into_records();
        assert_eq!(records["aa"].status, Some(TxStatus::Fail));
        assert!(records["aa"].completed_event);
        assert!(records["aa"].error_event);
    }
}
