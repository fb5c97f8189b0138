use std::collections::BTreeMap;

use crate::modules::accounts::schemas::{AccountBalanceHistory, AccountInfo};
use crate::modules::documents::schemas::{Document, UpdateScript};
use crate::modules::logs_events::schemas::{NftChange, NftDataUpdate};
use crate::modules::tokens;

pub(super) fn serialize_accounts(
    index: &str,
    accounts: &BTreeMap<String, AccountInfo>,
    docs: &mut Vec<Document>,
) -> crate::Result<()> {
    for account in accounts.values() {
        docs.push(Document::new_index(index, &account.address, account)?);
    }
    Ok(())
}

/// Token accounts whose balance went to zero are removed.
pub(super) fn serialize_accounts_esdt(
    index: &str,
    accounts: &BTreeMap<String, AccountInfo>,
    docs: &mut Vec<Document>,
) -> crate::Result<()> {
    for account in accounts.values() {
        let id = format!(
            "{}-{}-{}",
            account.address,
            account.token_name,
            encode_nonce_to_hex(account.token_nonce)
        );
        if account.balance.is_empty() || account.balance == "0" {
            docs.push(Document::new_delete(index, &id));
        } else {
            docs.push(Document::new_index(index, &id, account)?);
        }
    }
    Ok(())
}

pub(super) fn serialize_accounts_history(
    index: &str,
    history: &BTreeMap<String, AccountBalanceHistory>,
    docs: &mut Vec<Document>,
) -> crate::Result<()> {
    for record in history.values() {
        let id = if record.token.is_empty() {
            format!("{}-{}", record.address, record.timestamp)
        } else {
            format!(
                "{}-{}-{}-{}",
                record.address,
                record.token,
                encode_nonce_to_hex(record.token_nonce),
                record.timestamp
            )
        };
        docs.push(Document::new_index(index, &id, record)?);
    }
    Ok(())
}

/// Metadata changes of the NFTs held by accounts, addressed as `holder-identifier`.
pub(super) fn serialize_nft_updates_in_accounts(
    index: &str,
    updates: &[NftDataUpdate],
    docs: &mut Vec<Document>,
) {
    for update in updates {
        // pauses apply to whole collections
        if matches!(update.change, NftChange::Pause(_)) {
            continue;
        }

        let id = format!("{}-{}", update.address, update.identifier);
        docs.push(Document::new_script(index, &id, nft_script(&update.change)));
    }
}

pub(super) fn nft_script(change: &NftChange) -> UpdateScript {
    match change {
        NftChange::UpdateAttributes(attributes) => UpdateScript::UpdateAttributes {
            attributes: attributes.clone(),
            tags: tokens::extract_tags_from_attributes(attributes.as_slice()),
            metadata: tokens::extract_metadata_from_attributes(attributes.as_slice()),
        },
        NftChange::AddUris(uris) => UpdateScript::AddUris { uris: uris.clone() },
        NftChange::Freeze(frozen) => UpdateScript::Freeze { frozen: *frozen },
        NftChange::Pause(paused) => UpdateScript::Pause { paused: *paused },
    }
}

/// Minimal big-endian hex of the nonce, `00` for fungible tokens.
fn encode_nonce_to_hex(nonce: u64) -> String {
    if nonce == 0 {
        return "00".to_string();
    }

    let bytes = nonce.to_be_bytes();
    let first_non_zero = bytes
        .iter()
        .position(|byte| *byte != 0)
        .unwrap_or(bytes.len());
    hex::encode(&bytes[first_non_zero..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::documents::schemas::Action;
    use crate::types::Base64VecU8;

    fn esdt_account(address: &str, token: &str, nonce: u64, balance: &str) -> AccountInfo {
        AccountInfo {
            address: address.to_string(),
            token_name: token.to_string(),
            token_identifier: tokens::compute_token_identifier(token, nonce),
            token_nonce: nonce,
            balance: balance.to_string(),
            ..AccountInfo::default()
        }
    }

    #[test]
    fn test_encode_nonce_to_hex() {
        assert_eq!(encode_nonce_to_hex(0), "00");
        assert_eq!(encode_nonce_to_hex(5), "05");
        assert_eq!(encode_nonce_to_hex(256), "0100");
    }

    #[test]
    fn test_zero_balance_token_accounts_are_deleted() {
        let mut accounts = BTreeMap::new();
        accounts.insert("a".to_string(), esdt_account("addr1", "TKN-abcd", 0, "0"));
        accounts.insert("b".to_string(), esdt_account("addr1", "NFT-0001", 5, "1"));
        accounts.insert("c".to_string(), esdt_account("addr2", "TKN-abcd", 0, ""));

        let mut docs = vec![];
        serialize_accounts_esdt("accountsesdt", &accounts, &mut docs).unwrap();

        let ids: Vec<&str> = docs.iter().map(|doc| doc.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["addr1-TKN-abcd-00", "addr1-NFT-0001-05", "addr2-TKN-abcd-00"]
        );
        assert_eq!(docs[0].action, Action::Delete);
        assert!(matches!(docs[1].action, Action::Index(_)));
        assert_eq!(docs[2].action, Action::Delete);
    }

    #[test]
    fn test_history_ids_carry_the_timestamp() {
        let mut history = BTreeMap::new();
        history.insert(
            "a".to_string(),
            AccountBalanceHistory {
                address: "addr1".to_string(),
                timestamp: 1000,
                balance: "5".to_string(),
                ..AccountBalanceHistory::default()
            },
        );
        history.insert(
            "b".to_string(),
            AccountBalanceHistory {
                address: "addr1".to_string(),
                timestamp: 1000,
                balance: "1".to_string(),
                token: "NFT-0001".to_string(),
                token_nonce: 10,
                ..AccountBalanceHistory::default()
            },
        );

        let mut docs = vec![];
        serialize_accounts_history("accountshistory", &history, &mut docs).unwrap();

        assert_eq!(docs[0].id, "addr1-1000");
        assert_eq!(docs[1].id, "addr1-NFT-0001-0a-1000");
    }

    #[test]
    fn test_nft_updates_in_accounts() {
        let updates = vec![
            NftDataUpdate {
                identifier: "NFT-abcd-01".to_string(),
                address: "addr1".to_string(),
                change: NftChange::UpdateAttributes(Base64VecU8(
                    b"tags:Art;metadata:QmHash".to_vec(),
                )),
            },
            NftDataUpdate {
                identifier: "NFT-abcd".to_string(),
                address: String::new(),
                change: NftChange::Pause(true),
            },
            NftDataUpdate {
                identifier: "NFT-abcd-02".to_string(),
                address: "addr2".to_string(),
                change: NftChange::Freeze(true),
            },
        ];

        let mut docs = vec![];
        serialize_nft_updates_in_accounts("accountsesdt", &updates, &mut docs);

        insta::assert_json_snapshot!(docs, @r###"
        [
          {
            "index": "accountsesdt",
            "id": "addr1-NFT-abcd-01",
            "action": "update",
            "body": {
              "script": {
                "script": "updateAttributes",
                "params": {
                  "attributes": "dGFnczpBcnQ7bWV0YWRhdGE6UW1IYXNo",
                  "tags": [
                    "art"
                  ],
                  "metadata": "QmHash"
                }
              },
              "upsert": {}
            }
          },
          {
            "index": "accountsesdt",
            "id": "addr2-NFT-abcd-02",
            "action": "update",
            "body": {
              "script": {
                "script": "freeze",
                "params": {
                  "frozen": true
                }
              },
              "upsert": {}
            }
          }
        ]
        "###);
    }
}
