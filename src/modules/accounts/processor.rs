use std::collections::{BTreeMap, HashMap};

use num_bigint::BigInt;

use crate::modules::accounts::schemas;
use crate::modules::tokens::{self, TagsCount, TokensHandler};
use crate::outport_models::AlteredAccount;
use crate::types::{address, numeric, BalanceConverter, PubkeyConverter};

const TARGET: &str = "outport_indexer::accounts";

/// Splits altered accounts into regular and per-token records and projects them for indexing.
#[derive(Debug, Clone)]
pub struct AccountsProcessor {
    pubkey_converter: PubkeyConverter,
    balance_converter: BalanceConverter,
}

/// Block coordinates stamped on every produced record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockStamp {
    pub shard_id: u32,
    pub timestamp: u64,
    pub timestamp_ms: u64,
}

impl AccountsProcessor {
    pub fn new(pubkey_converter: PubkeyConverter, balance_converter: BalanceConverter) -> Self {
        Self {
            pubkey_converter,
            balance_converter,
        }
    }

    /// Regular accounts and token accounts, addresses in lexicographic order.
    pub fn get_accounts<'a>(
        &self,
        altered_accounts: &'a HashMap<String, AlteredAccount>,
    ) -> (Vec<schemas::Account<'a>>, Vec<schemas::AccountEsdt<'a>>) {
        let mut sorted: Vec<&AlteredAccount> = altered_accounts.values().collect();
        sorted.sort_by(|a, b| a.address.cmp(&b.address));

        let mut regular_accounts = vec![];
        let mut esdt_accounts = vec![];
        for account in sorted {
            let (regular, esdt) = split_altered_account(account);
            regular_accounts.extend(regular);
            esdt_accounts.extend(esdt);
        }

        (regular_accounts, esdt_accounts)
    }

    pub fn prepare_regular_accounts_map(
        &self,
        accounts: &[schemas::Account<'_>],
        stamp: BlockStamp,
    ) -> BTreeMap<String, schemas::AccountInfo> {
        let mut accounts_map = BTreeMap::new();
        for account in accounts {
            let user_account = account.user_account;
            let address = &user_account.address;
            let address_bytes = match self.pubkey_converter.decode(address) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::warn!(
                        target: TARGET,
                        address = %address,
                        error = %err,
                        "cannot decode address"
                    );
                    continue;
                }
            };
            let balance = match numeric::parse_big_int(&user_account.balance) {
                Ok(balance) => balance,
                Err(err) => {
                    tracing::warn!(
                        target: TARGET,
                        address = %address,
                        value = %user_account.balance,
                        error = %err,
                        "cannot cast account balance to big int"
                    );
                    continue;
                }
            };
            let balance_num = self.balance_as_float(&balance, address);

            let mut info = schemas::AccountInfo {
                address: address.clone(),
                nonce: user_account.nonce,
                balance: numeric::big_int_to_string(Some(&balance)),
                balance_num,
                is_sender: account.is_sender,
                is_smart_contract: address::is_smart_contract_address(&address_bytes),
                timestamp: stamp.timestamp,
                timestamp_ms: stamp.timestamp_ms,
                shard_id: stamp.shard_id,
                ..schemas::AccountInfo::default()
            };
            self.add_additional_data(user_account, &mut info);

            accounts_map.insert(address.clone(), info);
        }

        accounts_map
    }

    fn add_additional_data(&self, account: &AlteredAccount, info: &mut schemas::AccountInfo) {
        let Some(additional_data) = &account.additional_data else {
            return;
        };

        info.user_name = additional_data.user_name.clone();
        info.current_owner = additional_data.current_owner.clone();
        info.root_hash = additional_data.root_hash.clone();
        info.code_hash = additional_data.code_hash.clone();
        info.code_metadata = additional_data.code_metadata.clone();

        if additional_data.developer_rewards.is_empty() {
            return;
        }
        // an unparsable value leaves both fields unset
        match numeric::parse_big_int(&additional_data.developer_rewards) {
            Ok(rewards) => {
                info.developer_rewards = additional_data.developer_rewards.clone();
                info.developer_rewards_num = self.balance_as_float(&rewards, &info.address);
            }
            Err(_) => tracing::warn!(
                target: TARGET,
                address = %info.address,
                value = %additional_data.developer_rewards,
                "cannot convert developer rewards in number"
            ),
        }
    }

    /// Token accounts keyed by `address-token-nonce`, plus the registry of tokens with a
    /// non-zero balance.
    pub fn prepare_accounts_map_esdt(
        &self,
        accounts: &[schemas::AccountEsdt<'_>],
        tags_count: &mut TagsCount,
        stamp: BlockStamp,
    ) -> (BTreeMap<String, schemas::AccountInfo>, TokensHandler) {
        let mut tokens_data = TokensHandler::new();
        let mut accounts_map = BTreeMap::new();

        for account_esdt in accounts {
            let address = &account_esdt.account.address;
            let address_bytes = match self.pubkey_converter.decode(address) {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::warn!(
                        target: TARGET,
                        address = %address,
                        error = %err,
                        "cannot decode address"
                    );
                    continue;
                }
            };

            let (balance, properties, metadata) = esdt_info(account_esdt);
            if let Some(metadata) = &metadata {
                if account_esdt.is_nft_create {
                    tags_count.parse_tags(&metadata.tags);
                }
            }

            let token_identifier = tokens::compute_token_identifier(
                account_esdt.token_identifier,
                account_esdt.nft_nonce,
            );
            let balance_num = match self.balance_converter.convert_big_value_to_float(&balance) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(
                        target: TARGET,
                        address = %address,
                        token = %token_identifier,
                        balance = %balance,
                        error = %err,
                        "cannot compute esdt balance as num"
                    );
                    0.0
                }
            };

            let info = schemas::AccountInfo {
                address: address.clone(),
                token_name: account_esdt.token_identifier.to_string(),
                token_identifier: token_identifier.clone(),
                token_nonce: account_esdt.nft_nonce,
                balance: balance.to_string(),
                balance_num,
                frozen: is_frozen(&properties),
                properties,
                is_sender: account_esdt.is_sender,
                is_smart_contract: address::is_smart_contract_address(&address_bytes),
                data: metadata,
                timestamp: stamp.timestamp,
                timestamp_ms: stamp.timestamp_ms,
                shard_id: stamp.shard_id,
                token_type: if account_esdt.nft_nonce == 0 {
                    tokens::FUNGIBLE_ESDT.to_string()
                } else {
                    String::new()
                },
                ..schemas::AccountInfo::default()
            };

            let key = esdt_key(address, account_esdt.token_identifier, account_esdt.nft_nonce);
            let has_balance = !info.balance.is_empty() && info.balance != "0";
            accounts_map.insert(key, info);

            if has_balance {
                tokens_data.add(tokens::schemas::TokenInfo {
                    token: account_esdt.token_identifier.to_string(),
                    identifier: token_identifier,
                    ..tokens::schemas::TokenInfo::default()
                });
            }
        }

        (accounts_map, tokens_data)
    }

    pub fn prepare_accounts_history(
        &self,
        accounts: &BTreeMap<String, schemas::AccountInfo>,
        stamp: BlockStamp,
    ) -> BTreeMap<String, schemas::AccountBalanceHistory> {
        accounts
            .values()
            .map(|account| {
                let history = schemas::AccountBalanceHistory {
                    address: account.address.clone(),
                    balance: account.balance.clone(),
                    timestamp: stamp.timestamp,
                    timestamp_ms: stamp.timestamp_ms,
                    token: account.token_name.clone(),
                    token_nonce: account.token_nonce,
                    is_sender: account.is_sender,
                    is_smart_contract: account.is_smart_contract,
                    identifier: tokens::compute_token_identifier(
                        &account.token_name,
                        account.token_nonce,
                    ),
                    shard_id: stamp.shard_id,
                };
                (
                    esdt_key(&history.address, &history.token, history.token_nonce),
                    history,
                )
            })
            .collect()
    }

    fn balance_as_float(&self, value: &BigInt, address: &str) -> f64 {
        match self.balance_converter.compute_balance_as_float(value) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    target: TARGET,
                    address = %address,
                    value = %value,
                    error = %err,
                    "cannot compute balance as num"
                );
                0.0
            }
        }
    }
}

fn split_altered_account(
    account: &AlteredAccount,
) -> (Option<schemas::Account<'_>>, Vec<schemas::AccountEsdt<'_>>) {
    let (is_sender, balance_changed) = match &account.additional_data {
        Some(data) => (data.is_sender, data.balance_changed),
        None => {
            tracing::debug!(target: TARGET, address = %account.address, "nil additional data");
            (false, false)
        }
    };

    // a receiver with an untouched non-zero balance was already indexed
    let ignore_address = !balance_changed && not_zero_balance(&account.balance) && !is_sender;
    let regular = (!ignore_address).then_some(schemas::Account {
        user_account: account,
        is_sender,
    });

    let esdt = account
        .tokens
        .iter()
        .map(|token| schemas::AccountEsdt {
            account,
            token_identifier: &token.identifier,
            nft_nonce: token.nonce,
            is_sender,
            is_nft_create: token
                .additional_data
                .as_ref()
                .map_or(false, |data| data.is_nft_create),
        })
        .collect();

    (regular, esdt)
}

fn not_zero_balance(balance: &str) -> bool {
    !balance.is_empty() && balance != "0"
}

/// Balance, hex properties and metadata of the token entry matching identifier and nonce.
fn esdt_info(
    account_esdt: &schemas::AccountEsdt<'_>,
) -> (BigInt, String, Option<tokens::schemas::TokenMetaData>) {
    if account_esdt.token_identifier.is_empty() {
        return (BigInt::default(), String::new(), None);
    }

    let Some(token_data) = account_esdt.account.tokens.iter().rev().find(|token| {
        token.identifier == account_esdt.token_identifier && token.nonce == account_esdt.nft_nonce
    }) else {
        return (BigInt::default(), String::new(), None);
    };

    let Ok(balance) = numeric::parse_big_int(&token_data.balance) else {
        return (BigInt::default(), String::new(), None);
    };

    let metadata = token_data
        .meta_data
        .as_ref()
        .map(tokens::prepare_token_metadata);
    (balance, token_data.properties.clone(), metadata)
}

pub fn esdt_key(address: &str, token: &str, nonce: u64) -> String {
    format!("{}-{}-{}", address, token, nonce)
}

fn is_frozen(properties: &str) -> bool {
    match hex::decode(properties) {
        Ok(decoded) => decoded.first().map_or(false, |byte| byte & 1 != 0),
        Err(err) => {
            tracing::debug!(target: TARGET, error = %err, "cannot decode token properties");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::tests::*;
    use crate::outport_models::{
        AccountTokenData, AdditionalAccountData, AdditionalAccountTokenData, RawTokenMetaData,
    };
    use crate::types::Base64VecU8;

    fn processor() -> AccountsProcessor {
        let config = init_config();
        AccountsProcessor::new(
            PubkeyConverter::new(&config.address).unwrap(),
            BalanceConverter::new(config.denomination).unwrap(),
        )
    }

    fn stamp() -> BlockStamp {
        BlockStamp {
            shard_id: 1,
            timestamp: 100,
            timestamp_ms: 100_000,
        }
    }

    fn altered(
        address: &str,
        balance: &str,
        is_sender: bool,
        balance_changed: bool,
    ) -> AlteredAccount {
        AlteredAccount {
            address: address.to_string(),
            nonce: 3,
            balance: balance.to_string(),
            tokens: vec![],
            additional_data: Some(AdditionalAccountData {
                is_sender,
                balance_changed,
                ..AdditionalAccountData::default()
            }),
        }
    }

    #[test]
    fn test_untouched_receiver_is_excluded_but_keeps_tokens() {
        let address = encoded_address(1);
        let mut account = altered(&address, "1000", false, false);
        account.tokens.push(AccountTokenData {
            identifier: "AAA-000001".to_string(),
            balance: "5".to_string(),
            ..AccountTokenData::default()
        });
        let accounts = HashMap::from([(address.clone(), account)]);

        let (regular, esdt) = processor().get_accounts(&accounts);
        assert!(regular.is_empty());
        assert_eq!(esdt.len(), 1);
        assert_eq!(esdt[0].token_identifier, "AAA-000001");
    }

    #[test]
    fn test_zero_balance_non_sender_is_included() {
        let address = encoded_address(1);
        let accounts = HashMap::from([(address.clone(), altered(&address, "0", false, false))]);

        let (regular, esdt) = processor().get_accounts(&accounts);
        assert_eq!(regular.len(), 1);
        assert!(esdt.is_empty());
    }

    #[test]
    fn test_prepare_regular_accounts_map() {
        let user = encoded_address(1);
        let contract = hex::encode(sc_address(2));
        let mut with_rewards = altered(&contract, "2000000000000000000", true, true);
        if let Some(data) = with_rewards.additional_data.as_mut() {
            data.developer_rewards = "500000000000000000".to_string();
            data.user_name = "alice.elrond".to_string();
            data.code_hash = Base64VecU8(vec![1, 2]);
        }
        let accounts = HashMap::from([
            (user.clone(), altered(&user, "1000000000000000000", true, true)),
            (contract.clone(), with_rewards),
            ("bad".to_string(), altered("bad", "1", true, true)),
        ]);

        let processor = processor();
        let (regular, _) = processor.get_accounts(&accounts);
        let map = processor.prepare_regular_accounts_map(&regular, stamp());

        assert_eq!(map.len(), 2);
        let info = &map[&user];
        assert_eq!(info.balance_num, 1.0);
        assert!(!info.is_smart_contract);
        assert_eq!(info.shard_id, 1);

        let info = &map[&contract];
        assert!(info.is_smart_contract);
        assert_eq!(info.developer_rewards, "500000000000000000");
        assert_eq!(info.developer_rewards_num, 0.5);
        assert_eq!(info.user_name, "alice.elrond");
    }

    #[test]
    fn test_bad_developer_rewards_stay_unset() {
        let user = encoded_address(1);
        let mut account = altered(&user, "1", true, true);
        if let Some(data) = account.additional_data.as_mut() {
            data.developer_rewards = "not-a-number".to_string();
        }
        let accounts = HashMap::from([(user.clone(), account)]);

        let processor = processor();
        let (regular, _) = processor.get_accounts(&accounts);
        let map = processor.prepare_regular_accounts_map(&regular, stamp());
        assert_eq!(map[&user].developer_rewards, "");
        assert_eq!(map[&user].developer_rewards_num, 0.0);
    }

    #[test]
    fn test_prepare_accounts_map_esdt() {
        let user = encoded_address(1);
        let mut account = altered(&user, "0", true, true);
        account.tokens = vec![
            AccountTokenData {
                identifier: "AAA-000001".to_string(),
                balance: "1000000000000000000".to_string(),
                properties: "01".to_string(),
                ..AccountTokenData::default()
            },
            AccountTokenData {
                nonce: 19,
                identifier: "NFT-000002".to_string(),
                balance: "1".to_string(),
                properties: "02".to_string(),
                meta_data: Some(RawTokenMetaData {
                    nonce: 19,
                    attributes: Base64VecU8(b"tags:Art,Music".to_vec()),
                    ..RawTokenMetaData::default()
                }),
                additional_data: Some(AdditionalAccountTokenData {
                    is_nft_create: true,
                }),
            },
            AccountTokenData {
                identifier: "BBB-000003".to_string(),
                balance: "0".to_string(),
                ..AccountTokenData::default()
            },
        ];
        let accounts = HashMap::from([(user.clone(), account)]);

        let processor = processor();
        let (_, esdt) = processor.get_accounts(&accounts);
        let mut tags = TagsCount::new();
        let (map, tokens) = processor.prepare_accounts_map_esdt(&esdt, &mut tags, stamp());

        assert_eq!(map.len(), 3);
        let fungible = &map[&format!("{}-AAA-000001-0", user)];
        assert!(fungible.frozen);
        assert_eq!(fungible.token_type, "FungibleESDT");
        assert_eq!(fungible.balance_num, 1.0);

        let nft = &map[&format!("{}-NFT-000002-19", user)];
        assert!(!nft.frozen);
        assert_eq!(nft.token_identifier, "NFT-000002-13");
        assert_eq!(nft.token_type, "");
        assert_eq!(nft.data.as_ref().map(|data| data.tags.len()), Some(2));

        assert_eq!(tags.get_tags(), vec!["art".to_string(), "music".to_string()]);
        assert_eq!(
            tokens.get_all_tokens(),
            vec!["AAA-000001".to_string(), "NFT-000002".to_string()]
        );

        let history = processor.prepare_accounts_history(&map, stamp());
        let entry = &history[&format!("{}-NFT-000002-19", user)];
        assert_eq!(entry.identifier, "NFT-000002-13");
        assert_eq!(entry.balance, "1");
        assert!(entry.is_sender);
    }

    #[test]
    fn test_is_frozen() {
        assert!(is_frozen("01"));
        assert!(is_frozen("0300"));
        assert!(!is_frozen("02"));
        assert!(!is_frozen(""));
        assert!(!is_frozen("zz"));
    }
}
