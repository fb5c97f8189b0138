use crate::modules::documents::accounts::nft_script;
use crate::modules::documents::schemas::{Document, UpdateScript};
use crate::modules::logs_events::schemas::{NftChange, NftDataUpdate};
use crate::modules::tokens::schemas::TokenInfo;
use crate::modules::tokens::{self, TagsCount, TokenRolesAndProperties, TokensHandler};
use crate::types::vector;
use crate::utils;

/// NFTs created in this block, one document per item.
pub(super) fn serialize_nft_create_info(
    index: &str,
    created: &[TokenInfo],
    docs: &mut Vec<Document>,
) -> crate::Result<()> {
    for token in created {
        docs.push(Document::new_index(index, &token.identifier, token)?);
    }
    Ok(())
}

/// Issued tokens keyed by collection, then the NFT changes keyed by identifier.
pub(super) fn serialize_tokens(
    index: &str,
    tokens_info: &[TokenInfo],
    updates: &[NftDataUpdate],
    docs: &mut Vec<Document>,
) -> crate::Result<()> {
    for token in tokens_info {
        docs.push(token_document(index, token)?);
    }

    for update in updates {
        // holder-level changes only touch accounts
        if matches!(update.change, NftChange::Freeze(_)) {
            continue;
        }
        docs.push(Document::new_script(
            index,
            &update.identifier,
            nft_script(&update.change),
        ));
    }

    Ok(())
}

fn token_document(index: &str, token: &TokenInfo) -> crate::Result<Document> {
    if token.transfer_ownership {
        let script = UpdateScript::TransferOwnership {
            elem: token.owners_history.first().cloned().unwrap_or_default(),
            owner: token.current_owner.clone(),
        };
        return Document::new_update(index, &token.token, script, token);
    }

    if token.change_to_dynamic {
        let script = UpdateScript::ChangeToDynamic {
            token_type: token.token_type.clone(),
            timestamp: token.timestamp,
        };
        return Ok(Document::new_script(index, &token.token, script));
    }

    Document::new_update(index, &token.token, UpdateScript::ReplaceKeepingRoles, token)
}

/// Burnt or wiped items of non-fungible collections disappear from the tokens index.
pub(super) fn serialize_supply_data(
    index: &str,
    tokens_supply: &TokensHandler,
    docs: &mut Vec<Document>,
) {
    docs.extend(
        tokens_supply
            .get_all()
            .iter()
            .filter(|token| tokens::is_non_fungible_type(&token.token_type))
            .map(|token| Document::new_delete(index, &token.identifier)),
    );
}

pub(super) fn serialize_roles_and_properties(
    index: &str,
    roles_and_properties: &TokenRolesAndProperties,
    docs: &mut Vec<Document>,
) -> crate::Result<()> {
    for (role, roles_data) in roles_and_properties.roles() {
        for role_data in roles_data {
            let script = UpdateScript::SetRole {
                role: role.clone(),
                address: role_data.address.clone(),
                set: role_data.set,
            };
            let doc = if role_data.set {
                let upsert = serde_json::json!({ "roles": { role: [role_data.address] } });
                Document::new_update(index, &role_data.token, script, &upsert)?
            } else {
                Document::new_script(index, &role_data.token, script)
            };
            docs.push(doc);
        }
    }

    for properties_data in roles_and_properties.all_tokens_with_properties() {
        let script = UpdateScript::SetProperties {
            properties: properties_data.properties.clone(),
        };
        docs.push(Document::new_script(index, &properties_data.token, script));
    }

    Ok(())
}

/// Tag counters, keyed by the base64 form of the tag.
pub(super) fn serialize_tags(
    index: &str,
    tags: &TagsCount,
    docs: &mut Vec<Document>,
) -> crate::Result<()> {
    for (tag, count) in tags.iter() {
        let id = vector::encode_base64_str(utils::truncate_to(tag, utils::MAX_ID_SIZE).as_bytes());
        let script = UpdateScript::IncrementTag { count: *count };
        docs.push(Document::new_update(
            index,
            &id,
            script,
            &serde_json::json!({ "count": count }),
        )?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::documents::schemas::Action;
    use crate::modules::tokens::schemas::OwnerData;
    use crate::types::Base64VecU8;

    #[test]
    fn test_token_documents_by_kind() {
        let issued = TokenInfo {
            token: "TKN-abcd".to_string(),
            issuer: "addr1".to_string(),
            current_owner: "addr1".to_string(),
            token_type: tokens::FUNGIBLE_ESDT.to_string(),
            timestamp: 1000,
            ..TokenInfo::default()
        };
        let transferred = TokenInfo {
            transfer_ownership: true,
            current_owner: "addr2".to_string(),
            owners_history: vec![OwnerData {
                address: "addr2".to_string(),
                timestamp: 1000,
                ..OwnerData::default()
            }],
            ..issued.clone()
        };
        let dynamic = TokenInfo {
            change_to_dynamic: true,
            token_type: tokens::DYNAMIC_NON_FUNGIBLE_ESDT.to_string(),
            ..issued.clone()
        };

        let mut docs = vec![];
        serialize_tokens("esdts", &[issued, transferred, dynamic], &[], &mut docs).unwrap();

        assert!(docs.iter().all(|doc| doc.id == "TKN-abcd"));
        insta::assert_json_snapshot!(docs[1], @r###"
        {
          "index": "esdts",
          "id": "TKN-abcd",
          "action": "update",
          "body": {
            "script": {
              "script": "transferOwnership",
              "params": {
                "elem": {
                  "address": "addr2",
                  "timestamp": 1000
                },
                "owner": "addr2"
              }
            },
            "upsert": {
              "currentOwner": "addr2",
              "issuer": "addr1",
              "ownersHistory": [
                {
                  "address": "addr2",
                  "timestamp": 1000
                }
              ],
              "timestamp": 1000,
              "token": "TKN-abcd",
              "type": "FungibleESDT"
            }
          }
        }
        "###);
        assert_eq!(
            serde_json::to_value(&docs[2]).unwrap()["body"],
            serde_json::json!({
                "script": {
                    "script": "changeToDynamic",
                    "params": {"type": "DynamicNonFungibleESDT", "timestamp": 1000}
                },
                "upsert": {}
            })
        );
        let Action::Update { script, .. } = &docs[0].action else {
            panic!("expected an update");
        };
        assert_eq!(script, &UpdateScript::ReplaceKeepingRoles);
    }

    #[test]
    fn test_nft_updates_on_tokens_skip_freezes() {
        let updates = vec![
            NftDataUpdate {
                identifier: "NFT-abcd-01".to_string(),
                address: "addr1".to_string(),
                change: NftChange::AddUris(vec![Base64VecU8(b"uri".to_vec())]),
            },
            NftDataUpdate {
                identifier: "NFT-abcd-01".to_string(),
                address: "addr1".to_string(),
                change: NftChange::Freeze(true),
            },
            NftDataUpdate {
                identifier: "NFT-abcd".to_string(),
                address: String::new(),
                change: NftChange::Pause(true),
            },
        ];

        let mut docs = vec![];
        serialize_tokens("tokens", &[], &updates, &mut docs).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "NFT-abcd-01");
        assert_eq!(
            docs[1],
            Document::new_script("tokens", "NFT-abcd", UpdateScript::Pause { paused: true })
        );
    }

    #[test]
    fn test_supply_deletes_only_non_fungible_items() {
        let mut supply = TokensHandler::new();
        supply.add(TokenInfo {
            token: "NFT-abcd".to_string(),
            identifier: "NFT-abcd-01".to_string(),
            token_type: tokens::NON_FUNGIBLE_ESDT.to_string(),
            ..TokenInfo::default()
        });
        supply.add(TokenInfo {
            token: "SFT-abcd".to_string(),
            identifier: "SFT-abcd-01".to_string(),
            token_type: "SemiFungibleESDT".to_string(),
            ..TokenInfo::default()
        });

        let mut docs = vec![];
        serialize_supply_data("tokens", &supply, &mut docs);

        assert_eq!(docs, vec![Document::new_delete("tokens", "NFT-abcd-01")]);
    }

    #[test]
    fn test_roles_and_properties() {
        let mut roles = TokenRolesAndProperties::new();
        roles.add_role("TKN-abcd", "addr1", "ESDTRoleLocalMint", true);
        roles.add_role("TKN-abcd", "addr2", "ESDTRoleLocalMint", false);
        roles.add_properties(
            "TKN-abcd",
            [("canMint".to_string(), true)].into_iter().collect(),
        );

        let mut docs = vec![];
        serialize_roles_and_properties("tokens", &roles, &mut docs).unwrap();

        assert_eq!(
            serde_json::to_value(&docs).unwrap(),
            serde_json::json!([
                {
                    "index": "tokens",
                    "id": "TKN-abcd",
                    "action": "update",
                    "body": {
                        "script": {
                            "script": "setRole",
                            "params": {
                                "role": "ESDTRoleLocalMint",
                                "address": "addr1",
                                "set": true
                            }
                        },
                        "upsert": {"roles": {"ESDTRoleLocalMint": ["addr1"]}}
                    }
                },
                {
                    "index": "tokens",
                    "id": "TKN-abcd",
                    "action": "update",
                    "body": {
                        "script": {
                            "script": "setRole",
                            "params": {
                                "role": "ESDTRoleLocalMint",
                                "address": "addr2",
                                "set": false
                            }
                        },
                        "upsert": {}
                    }
                },
                {
                    "index": "tokens",
                    "id": "TKN-abcd",
                    "action": "update",
                    "body": {
                        "script": {
                            "script": "setProperties",
                            "params": {"properties": {"canMint": true}}
                        },
                        "upsert": {}
                    }
                }
            ])
        );
    }

    #[test]
    fn test_tags_increment_counters() {
        let mut tags = TagsCount::new();
        tags.parse_tags(&["art".to_string(), "music".to_string()]);
        tags.parse_tags(&["art".to_string(), "art".to_string()]);

        let mut docs = vec![];
        serialize_tags("tags", &tags, &mut docs).unwrap();

        insta::assert_json_snapshot!(docs, @r###"
        [
          {
            "index": "tags",
            "id": "YXJ0",
            "action": "update",
            "body": {
              "script": {
                "script": "incrementTag",
                "params": {
                  "count": 2
                }
              },
              "upsert": {
                "count": 2
              }
            }
          },
          {
            "index": "tags",
            "id": "bXVzaWM=",
            "action": "update",
            "body": {
              "script": {
                "script": "incrementTag",
                "params": {
                  "count": 1
                }
              },
              "upsert": {
                "count": 1
              }
            }
          }
        ]
        "###);
    }
}
