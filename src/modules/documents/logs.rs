use std::collections::BTreeMap;

use crate::modules::documents::schemas::{Document, UpdateScript};
use crate::modules::logs_events::schemas::{Delegator, LogEvent, Logs, ScDeployInfo, Upgrade};
use crate::modules::tokens::schemas::OwnerData;
use crate::types::{hash, vector};

/// Logs of a re-processed block never replace the ones written by a newer block.
pub(super) fn serialize_logs(
    index: &str,
    logs: &[Logs],
    docs: &mut Vec<Document>,
) -> crate::Result<()> {
    for log in logs {
        let script = UpdateScript::ReplaceIfNewer {
            timestamp: log.timestamp,
        };
        docs.push(Document::new_update(index, &log.id, script, log)?);
    }
    Ok(())
}

pub(super) fn serialize_events(
    index: &str,
    events: &[LogEvent],
    docs: &mut Vec<Document>,
) -> crate::Result<()> {
    for event in events {
        let script = UpdateScript::ReplaceIfNewer {
            timestamp: event.timestamp,
        };
        docs.push(Document::new_update(index, &event.id, script, event)?);
    }
    Ok(())
}

pub(super) fn serialize_delegators(
    index: &str,
    delegators: &BTreeMap<String, Delegator>,
    docs: &mut Vec<Document>,
) -> crate::Result<()> {
    for delegator in delegators.values() {
        let id = delegator_id(delegator);
        if delegator.should_delete {
            docs.push(Document::new_delete(index, &id));
            continue;
        }

        let active_stake = delegator.active_stake.clone();
        let active_stake_num = delegator.active_stake_num;
        let timestamp = delegator.timestamp;
        let script = match (&delegator.un_delegate_info, &delegator.withdraw_fund_ids) {
            (Some(un_delegate), _) => UpdateScript::AppendUnDelegate {
                active_stake,
                active_stake_num,
                timestamp,
                un_delegate: un_delegate.clone(),
            },
            (None, Some(withdraw_ids)) => UpdateScript::RemoveWithdrawn {
                active_stake,
                active_stake_num,
                timestamp,
                withdraw_ids: withdraw_ids.clone(),
            },
            (None, None) => UpdateScript::UpsertDelegator {
                active_stake,
                active_stake_num,
                timestamp,
            },
        };
        docs.push(Document::new_update(index, &id, script, delegator)?);
    }
    Ok(())
}

/// One document per delegator and staking contract.
fn delegator_id(delegator: &Delegator) -> String {
    let key = format!("{}{}", delegator.address, delegator.contract);
    vector::encode_base64_str(&hash::compute(key.as_bytes()))
}

/// Deploys are keyed by contract address. Re-deploying appends to the upgrades of the stored
/// contract.
pub(super) fn serialize_sc_deploys(
    index: &str,
    deploys: &BTreeMap<String, ScDeployInfo>,
    docs: &mut Vec<Document>,
) -> crate::Result<()> {
    for (contract, deploy) in deploys {
        let upgrade = Upgrade::from(deploy);
        let upsert = ScDeployInfo {
            upgrades: vec![],
            owners_history: vec![],
            ..deploy.clone()
        };
        let script = UpdateScript::AppendUpgrade(upgrade);
        docs.push(Document::new_update(index, contract, script, &upsert)?);
    }
    Ok(())
}

pub(super) fn serialize_change_owner_operations(
    index: &str,
    operations: &BTreeMap<String, OwnerData>,
    docs: &mut Vec<Document>,
) {
    for (contract, owner_data) in operations {
        let script = UpdateScript::ChangeOwner(owner_data.clone());
        docs.push(Document::new_script(index, contract, script));
    }
}
