use std::collections::BTreeMap;

use crate::modules::logs_events::interpreters::{
    bytes_to_bool, Dispatch, EventArgs, EventInterpreter,
};
use crate::modules::logs_events::logs_data::LogsData;
use crate::types::PubkeyConverter;

const ESDT_SET_ROLE: &str = "ESDTSetRole";
const ESDT_UNSET_ROLE: &str = "ESDTUnSetRole";
const ESDT_NFT_CREATE_ROLE_TRANSFER: &str = "ESDTNFTCreateRoleTransfer";
const UPGRADE_PROPERTIES: &str = "upgradeProperties";
const ESDT_SET_BURN_ROLE_FOR_ALL: &str = "ESDTSetBurnRoleForAll";
const ESDT_UNSET_BURN_ROLE_FOR_ALL: &str = "ESDTUnSetBurnRoleForAll";

const ESDT_ROLE_NFT_CREATE: &str = "ESDTRoleNFTCreate";
const ESDT_ROLE_BURN_FOR_ALL: &str = "ESDTRoleBurnForAll";

const MIN_TOPICS_PROPERTIES_AND_ROLES: usize = 4;
const TOKEN_TOPIC: usize = 0;
const PROPERTIES_START_TOPIC: usize = 2;
const ROLES_START_TOPIC: usize = 3;

/// Role grants and token property changes.
#[derive(Debug, Clone)]
pub(crate) struct EsdtPropertiesInterpreter {
    pubkey_converter: PubkeyConverter,
}

impl EsdtPropertiesInterpreter {
    pub fn new(pubkey_converter: PubkeyConverter) -> Self {
        Self { pubkey_converter }
    }
}

impl EventInterpreter for EsdtPropertiesInterpreter {
    fn identifiers(&self) -> &'static [&'static str] {
        &[
            ESDT_SET_ROLE,
            ESDT_UNSET_ROLE,
            ESDT_NFT_CREATE_ROLE_TRANSFER,
            UPGRADE_PROPERTIES,
            ESDT_SET_BURN_ROLE_FOR_ALL,
            ESDT_UNSET_BURN_ROLE_FOR_ALL,
        ]
    }

    fn process_event(&self, args: &EventArgs<'_>, logs_data: &mut LogsData<'_>) -> Dispatch {
        let event = args.event;
        if event.topics.len() < MIN_TOPICS_PROPERTIES_AND_ROLES {
            return Dispatch::Processed;
        }

        let token = String::from_utf8_lossy(event.topic(TOKEN_TOPIC)).into_owned();
        let roles_and_properties = &mut logs_data.token_roles_and_properties;
        match event.identifier.as_str() {
            UPGRADE_PROPERTIES => {
                let properties: BTreeMap<String, bool> = event.topics[PROPERTIES_START_TOPIC..]
                    .chunks_exact(2)
                    .map(|pair| {
                        (
                            String::from_utf8_lossy(pair[0].as_slice()).into_owned(),
                            bytes_to_bool(pair[1].as_slice()),
                        )
                    })
                    .collect();
                roles_and_properties.add_properties(&token, properties);
            }
            ESDT_NFT_CREATE_ROLE_TRANSFER => {
                let address = self.pubkey_converter.silent_encode(event.address.as_slice());
                let set = bytes_to_bool(event.topic(ROLES_START_TOPIC));
                roles_and_properties.add_role(&token, &address, ESDT_ROLE_NFT_CREATE, set);
            }
            identifier => {
                let roles: Vec<String> = event.topics[ROLES_START_TOPIC..]
                    .iter()
                    .map(|role| String::from_utf8_lossy(role.as_slice()).into_owned())
                    .collect();
                if !roles.iter().all(|role| role.chars().all(char::is_alphabetic)) {
                    return Dispatch::Processed;
                }

                let set = identifier == ESDT_SET_ROLE || identifier == ESDT_SET_BURN_ROLE_FOR_ALL;
                let address = self.pubkey_converter.silent_encode(event.address.as_slice());
                for role in roles {
                    // burning for everyone is not tied to an address
                    let role_address = if role == ESDT_ROLE_BURN_FOR_ALL {
                        ""
                    } else {
                        address.as_str()
                    };
                    roles_and_properties.add_role(&token, role_address, &role, set);
                }
            }
        }

        Dispatch::Processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::accounts::BlockStamp;
    use crate::modules::logs_events::interpreters::event_args;
    use crate::modules::tests::*;
    use crate::modules::tokens::schemas::RoleData;

    fn interpreter() -> EsdtPropertiesInterpreter {
        EsdtPropertiesInterpreter::new(PubkeyConverter::new(&init_config().address).unwrap())
    }

    #[test]
    fn test_set_and_unset_roles() {
        let set = event(
            ESDT_SET_ROLE,
            address(0),
            vec![
                b"MYTOKEN-abcd".to_vec(),
                vec![],
                vec![],
                b"ESDTRoleLocalMint".to_vec(),
                b"ESDTRoleBurnForAll".to_vec(),
            ],
        );
        let unset = event(
            ESDT_UNSET_ROLE,
            address(1),
            vec![b"MYTOKEN-abcd".to_vec(), vec![], vec![], b"ESDTRoleLocalMint".to_vec()],
        );
        let mut logs_data = LogsData::new(BlockStamp::default(), &mut [], &mut []);
        interpreter().process_event(&event_args("h1", &set), &mut logs_data);
        interpreter().process_event(&event_args("h1", &unset), &mut logs_data);

        let roles = logs_data.token_roles_and_properties.roles();
        assert_eq!(
            roles["ESDTRoleLocalMint"],
            vec![
                RoleData {
                    token: "MYTOKEN-abcd".to_string(),
                    address: encoded_address(0),
                    set: true,
                },
                RoleData {
                    token: "MYTOKEN-abcd".to_string(),
                    address: encoded_address(1),
                    set: false,
                },
            ]
        );
        assert_eq!(roles["ESDTRoleBurnForAll"][0].address, "");
    }

    #[test]
    fn test_roles_must_be_letters() {
        let set = event(
            ESDT_SET_ROLE,
            address(0),
            vec![b"MYTOKEN-abcd".to_vec(), vec![], vec![], b"ESDTRole-1".to_vec()],
        );
        let mut logs_data = LogsData::new(BlockStamp::default(), &mut [], &mut []);
        let dispatch = interpreter().process_event(&event_args("h1", &set), &mut logs_data);

        assert_eq!(dispatch, Dispatch::Processed);
        assert!(logs_data.token_roles_and_properties.is_empty());
    }

    #[test]
    fn test_nft_create_role_transfer() {
        let transfer = event(
            ESDT_NFT_CREATE_ROLE_TRANSFER,
            address(2),
            vec![b"NFT-abcd".to_vec(), vec![], vec![], b"false".to_vec()],
        );
        let mut logs_data = LogsData::new(BlockStamp::default(), &mut [], &mut []);
        interpreter().process_event(&event_args("h1", &transfer), &mut logs_data);

        let role = &logs_data.token_roles_and_properties.roles()[ESDT_ROLE_NFT_CREATE][0];
        assert_eq!(role.address, encoded_address(2));
        assert!(!role.set);
    }

    #[test]
    fn test_upgrade_properties_reads_pairs() {
        let upgrade = event(
            UPGRADE_PROPERTIES,
            address(0),
            vec![
                b"MYTOKEN-abcd".to_vec(),
                vec![],
                b"canMint".to_vec(),
                b"true".to_vec(),
                b"canBurn".to_vec(),
                b"false".to_vec(),
            ],
        );
        let mut logs_data = LogsData::new(BlockStamp::default(), &mut [], &mut []);
        interpreter().process_event(&event_args("h1", &upgrade), &mut logs_data);

        let properties = logs_data.token_roles_and_properties.all_tokens_with_properties();
        assert_eq!(properties[0].token, "MYTOKEN-abcd");
        assert_eq!(
            properties[0].properties,
            BTreeMap::from([("canBurn".to_string(), false), ("canMint".to_string(), true)])
        );
    }
}
