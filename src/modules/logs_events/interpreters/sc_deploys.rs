use crate::modules::logs_events::interpreters::{Dispatch, EventArgs, EventInterpreter};
use crate::modules::logs_events::logs_data::LogsData;
use crate::modules::logs_events::schemas::ScDeployInfo;
use crate::modules::tokens::schemas::OwnerData;
use crate::types::{Base64VecU8, PubkeyConverter};

const SC_DEPLOY: &str = "SCDeploy";
const SC_UPGRADE: &str = "SCUpgrade";
const CHANGE_OWNER_ADDRESS: &str = "ChangeOwnerAddress";

const MIN_TOPICS_DEPLOY: usize = 2;
const CODE_HASH_TOPIC: usize = 2;

/// Contract deployments, upgrades and ownership changes.
#[derive(Debug, Clone)]
pub(crate) struct ScDeploysInterpreter {
    pubkey_converter: PubkeyConverter,
}

impl ScDeploysInterpreter {
    pub fn new(pubkey_converter: PubkeyConverter) -> Self {
        Self { pubkey_converter }
    }

    fn process_change_owner(&self, args: &EventArgs<'_>, logs_data: &mut LogsData<'_>) -> Dispatch {
        if args.event.topics.is_empty() {
            return Dispatch::Processed;
        }

        let sc_address = self.pubkey_converter.silent_encode(args.event.address.as_slice());
        logs_data.change_owner_operations.insert(
            sc_address,
            OwnerData {
                tx_hash: args.tx_hash.to_string(),
                address: self.pubkey_converter.silent_encode(args.event.topic(0)),
                timestamp: logs_data.stamp.timestamp,
                timestamp_ms: logs_data.stamp.timestamp_ms,
            },
        );

        Dispatch::Processed
    }
}

impl EventInterpreter for ScDeploysInterpreter {
    fn identifiers(&self) -> &'static [&'static str] {
        &[SC_DEPLOY, SC_UPGRADE, CHANGE_OWNER_ADDRESS]
    }

    fn process_event(&self, args: &EventArgs<'_>, logs_data: &mut LogsData<'_>) -> Dispatch {
        let event = args.event;
        if event.identifier == CHANGE_OWNER_ADDRESS {
            return self.process_change_owner(args, logs_data);
        }

        if event.topics.len() < MIN_TOPICS_DEPLOY {
            return Dispatch::Processed;
        }

        let sc_address = self.pubkey_converter.silent_encode(event.topic(0));
        let creator = self.pubkey_converter.silent_encode(event.topic(1));
        logs_data.sc_deploys.insert(
            sc_address,
            ScDeployInfo {
                tx_hash: args.tx_hash.to_string(),
                current_owner: creator.clone(),
                creator,
                code_hash: Base64VecU8::from(event.topic(CODE_HASH_TOPIC)),
                timestamp: logs_data.stamp.timestamp,
                timestamp_ms: logs_data.stamp.timestamp_ms,
                ..ScDeployInfo::default()
            },
        );

        Dispatch::Processed
    }
}
