use crate::modules::logs_events::interpreters::{Dispatch, EventArgs, EventInterpreter, TARGET};
use crate::modules::logs_events::logs_data::LogsData;
use crate::modules::tokens::{self, schemas::TokenInfo};
use crate::outport_models::{Event, RawTokenMetaData};
use crate::types::{numeric, Base64VecU8, PubkeyConverter, ShardCoordinator};

const ESDT_NFT_BURN: &str = "ESDTNFTBurn";
const ESDT_NFT_CREATE: &str = "ESDTNFTCreate";
const ESDT_WIPE: &str = "ESDTWipe";

const MIN_TOPICS_NFT: usize = 2;
const NUM_TOPICS_WITH_RECEIVER_ADDRESS: usize = 4;
/// Created token blob for creations, the wiped holder for wipes.
const PAYLOAD_TOPIC: usize = 3;

/// Token blob carried by `ESDTNFTCreate`: the node's JSON encoding of the token, PascalCase keys
/// and base64 byte fields.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct EsdtToken {
    #[serde(alias = "tokenMetaData")]
    token_meta_data: Option<EsdtMetaData>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct EsdtMetaData {
    #[serde(alias = "nonce")]
    nonce: u64,
    #[serde(alias = "name")]
    name: Base64VecU8,
    #[serde(alias = "creator")]
    creator: Base64VecU8,
    #[serde(alias = "royalties")]
    royalties: u32,
    #[serde(alias = "hash")]
    hash: Base64VecU8,
    #[serde(rename = "URIs", alias = "uris")]
    uris: Option<Vec<Base64VecU8>>,
    #[serde(alias = "attributes")]
    attributes: Base64VecU8,
}

/// NFT creation, burning and wiping.
#[derive(Debug, Clone)]
pub(crate) struct NftsInterpreter {
    pubkey_converter: PubkeyConverter,
    shard_coordinator: ShardCoordinator,
}

impl NftsInterpreter {
    pub fn new(pubkey_converter: PubkeyConverter, shard_coordinator: ShardCoordinator) -> Self {
        Self {
            pubkey_converter,
            shard_coordinator,
        }
    }

    /// Supply changes and creation metadata, recorded by the shard of the account that acted.
    fn process_on_sender(
        &self,
        event: &Event,
        token: &str,
        nonce: u64,
        logs_data: &mut LogsData<'_>,
    ) {
        let identifier = tokens::compute_token_identifier(token, nonce);
        let stamp = logs_data.stamp;
        if event.identifier == ESDT_NFT_BURN || event.identifier == ESDT_WIPE {
            logs_data.tokens_supply.add(TokenInfo {
                token: token.to_string(),
                identifier: identifier.clone(),
                nonce,
                timestamp: stamp.timestamp,
                timestamp_ms: stamp.timestamp_ms,
                ..TokenInfo::default()
            });
        }

        let is_nft_create = event.identifier == ESDT_NFT_CREATE;
        if !is_nft_create || event.topics.len() < NUM_TOPICS_WITH_RECEIVER_ADDRESS {
            return;
        }

        let esdt_token: EsdtToken = match serde_json::from_slice(event.topic(PAYLOAD_TOPIC)) {
            Ok(esdt_token) => esdt_token,
            Err(err) => {
                tracing::warn!(
                    target: TARGET,
                    identifier = %identifier,
                    error = %err,
                    "cannot unmarshal created token"
                );
                return;
            }
        };

        logs_data.tokens.add(TokenInfo {
            token: token.to_string(),
            identifier,
            nonce,
            timestamp: stamp.timestamp,
            timestamp_ms: stamp.timestamp_ms,
            data: esdt_token
                .token_meta_data
                .map(|metadata| tokens::prepare_token_metadata(&self.convert_metadata(metadata))),
            ..TokenInfo::default()
        });
    }

    fn convert_metadata(&self, metadata: EsdtMetaData) -> RawTokenMetaData {
        RawTokenMetaData {
            nonce: metadata.nonce,
            name: metadata.name.as_string_lossy(),
            creator: self.pubkey_converter.silent_encode(metadata.creator.as_slice()),
            royalties: metadata.royalties,
            hash: metadata.hash,
            uris: metadata.uris.unwrap_or_default(),
            attributes: metadata.attributes,
        }
    }
}

impl EventInterpreter for NftsInterpreter {
    fn identifiers(&self) -> &'static [&'static str] {
        &[ESDT_NFT_BURN, ESDT_NFT_CREATE, ESDT_WIPE]
    }

    fn process_event(&self, args: &EventArgs<'_>, logs_data: &mut LogsData<'_>) -> Dispatch {
        let event = args.event;
        if event.topics.len() < MIN_TOPICS_NFT {
            return Dispatch::Processed;
        }

        let nonce = numeric::bytes_to_u64(event.topic(1));
        if nonce == 0 {
            return Dispatch::Declined;
        }

        let token = String::from_utf8_lossy(event.topic(0)).into_owned();
        let sender_shard = self.shard_coordinator.compute_id(event.address.as_slice());
        if sender_shard == args.self_shard {
            self.process_on_sender(event, &token, nonce, logs_data);
        }

        let has_receiver =
            event.identifier == ESDT_WIPE && event.topics.len() >= NUM_TOPICS_WITH_RECEIVER_ADDRESS;
        if !has_receiver {
            return Dispatch::Processed;
        }

        let receiver_shard = self.shard_coordinator.compute_id(event.topic(PAYLOAD_TOPIC));
        if receiver_shard != args.self_shard {
            return Dispatch::Processed;
        }

        let stamp = logs_data.stamp;
        logs_data.tokens_supply.add(TokenInfo {
            identifier: tokens::compute_token_identifier(&token, nonce),
            token,
            nonce,
            timestamp: stamp.timestamp,
            timestamp_ms: stamp.timestamp_ms,
            ..TokenInfo::default()
        });

        Dispatch::Processed
    }
}
