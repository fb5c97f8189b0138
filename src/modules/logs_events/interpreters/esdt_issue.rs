use crate::modules::logs_events::interpreters::{Dispatch, EventArgs, EventInterpreter};
use crate::modules::logs_events::logs_data::LogsData;
use crate::modules::tokens::schemas::{OwnerData, TokenInfo, TokenProperties};
use crate::types::{numeric, PubkeyConverter};

const ISSUE_FUNGIBLE: &str = "issue";
const ISSUE_SEMI_FUNGIBLE: &str = "issueSemiFungible";
const ISSUE_NON_FUNGIBLE: &str = "issueNonFungible";
const REGISTER_META_ESDT: &str = "registerMetaESDT";
const CHANGE_SFT_TO_META_ESDT: &str = "changeSFTToMetaESDT";
const TRANSFER_OWNERSHIP: &str = "transferOwnership";
const REGISTER_AND_SET_ALL_ROLES: &str = "registerAndSetAllRoles";
const REGISTER_DYNAMIC: &str = "registerDynamic";
const REGISTER_AND_SET_ALL_ROLES_DYNAMIC: &str = "registerAndSetAllRolesDynamic";
const CHANGE_TO_DYNAMIC: &str = "changeToDynamic";

const NUM_ISSUE_LOG_TOPICS: usize = 4;
/// Decimals for issues, the new owner for ownership transfers.
const EXTRA_TOPIC: usize = 4;

/// Token issuance, registration and the system calls that rewrite a token's identity.
#[derive(Debug, Clone)]
pub(crate) struct EsdtIssueInterpreter {
    pubkey_converter: PubkeyConverter,
}

impl EsdtIssueInterpreter {
    pub fn new(pubkey_converter: PubkeyConverter) -> Self {
        Self { pubkey_converter }
    }
}

impl EventInterpreter for EsdtIssueInterpreter {
    fn identifiers(&self) -> &'static [&'static str] {
        &[
            ISSUE_FUNGIBLE,
            ISSUE_SEMI_FUNGIBLE,
            ISSUE_NON_FUNGIBLE,
            REGISTER_META_ESDT,
            CHANGE_SFT_TO_META_ESDT,
            TRANSFER_OWNERSHIP,
            REGISTER_AND_SET_ALL_ROLES,
            REGISTER_DYNAMIC,
            REGISTER_AND_SET_ALL_ROLES_DYNAMIC,
            CHANGE_TO_DYNAMIC,
        ]
    }

    fn process_event(&self, args: &EventArgs<'_>, logs_data: &mut LogsData<'_>) -> Dispatch {
        let event = args.event;
        let identifier = event.identifier.as_str();
        let topics = &event.topics;
        if topics.len() < NUM_ISSUE_LOG_TOPICS || topics[0].is_empty() {
            return Dispatch::Processed;
        }

        let has_decimals =
            topics.len() == NUM_ISSUE_LOG_TOPICS + 1 && identifier != TRANSFER_OWNERSHIP;
        let num_decimals = if has_decimals {
            numeric::bytes_to_u64(event.topic(EXTRA_TOPIC))
        } else {
            0
        };

        let stamp = logs_data.stamp;
        let encoded_address = self.pubkey_converter.silent_encode(event.address.as_slice());
        let mut token_info = TokenInfo {
            token: String::from_utf8_lossy(event.topic(0)).into_owned(),
            name: String::from_utf8_lossy(event.topic(1)).into_owned(),
            ticker: String::from_utf8_lossy(event.topic(2)).into_owned(),
            token_type: String::from_utf8_lossy(event.topic(3)).into_owned(),
            num_decimals,
            issuer: encoded_address.clone(),
            current_owner: encoded_address.clone(),
            timestamp: stamp.timestamp,
            timestamp_ms: stamp.timestamp_ms,
            owners_history: vec![OwnerData {
                address: encoded_address,
                timestamp: stamp.timestamp,
                timestamp_ms: stamp.timestamp_ms,
                ..OwnerData::default()
            }],
            properties: Some(TokenProperties::default()),
            change_to_dynamic: identifier == CHANGE_TO_DYNAMIC,
            ..TokenInfo::default()
        };

        if identifier == TRANSFER_OWNERSHIP && topics.len() > EXTRA_TOPIC {
            let new_owner = self.pubkey_converter.silent_encode(event.topic(EXTRA_TOPIC));
            token_info.transfer_ownership = true;
            token_info.current_owner = new_owner.clone();
            token_info.owners_history[0].address = new_owner;
        }

        logs_data.tokens_info.push(token_info);
        Dispatch::Processed
    }
}
