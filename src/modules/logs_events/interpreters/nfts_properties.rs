use crate::modules::logs_events::interpreters::{Dispatch, EventArgs, EventInterpreter};
use crate::modules::logs_events::logs_data::LogsData;
use crate::modules::logs_events::schemas::{NftChange, NftDataUpdate};
use crate::modules::tokens;
use crate::types::{numeric, Base64VecU8, PubkeyConverter};

const ESDT_NFT_ADD_URI: &str = "ESDTNFTAddURI";
const ESDT_NFT_UPDATE_ATTRIBUTES: &str = "ESDTNFTUpdateAttributes";
const ESDT_FREEZE: &str = "ESDTFreeze";
const ESDT_UNFREEZE: &str = "ESDTUnFreeze";
const ESDT_PAUSE: &str = "ESDTPause";
const ESDT_UNPAUSE: &str = "ESDTUnPause";

const MIN_TOPICS_UPDATE: usize = 4;
const PAYLOAD_TOPIC: usize = 3;

/// Changes to NFTs that already exist: attributes, URIs, freezing and pausing.
#[derive(Debug, Clone)]
pub(crate) struct NftsPropertiesInterpreter {
    pubkey_converter: PubkeyConverter,
}

impl NftsPropertiesInterpreter {
    pub fn new(pubkey_converter: PubkeyConverter) -> Self {
        Self { pubkey_converter }
    }
}

impl EventInterpreter for NftsPropertiesInterpreter {
    fn identifiers(&self) -> &'static [&'static str] {
        &[
            ESDT_NFT_ADD_URI,
            ESDT_NFT_UPDATE_ATTRIBUTES,
            ESDT_FREEZE,
            ESDT_UNFREEZE,
            ESDT_PAUSE,
            ESDT_UNPAUSE,
        ]
    }

    fn process_event(&self, args: &EventArgs<'_>, logs_data: &mut LogsData<'_>) -> Dispatch {
        let event = args.event;
        let identifier = event.identifier.as_str();
        if matches!(identifier, ESDT_PAUSE | ESDT_UNPAUSE) {
            if event.topics.len() == 1 {
                logs_data.nfts_data_updates.push(NftDataUpdate {
                    identifier: String::from_utf8_lossy(event.topic(0)).into_owned(),
                    address: String::new(),
                    change: NftChange::Pause(identifier == ESDT_PAUSE),
                });
            }
            return Dispatch::Processed;
        }

        if event.topics.len() < MIN_TOPICS_UPDATE {
            return Dispatch::Processed;
        }

        let caller = self.pubkey_converter.silent_encode(event.address.as_slice());
        if caller.is_empty() {
            return Dispatch::Processed;
        }

        // fungible tokens go through the ESDT paths
        let nonce = numeric::bytes_to_u64(event.topic(1));
        if nonce == 0 {
            return Dispatch::Declined;
        }

        let token = String::from_utf8_lossy(event.topic(0));
        let (address, change) = match identifier {
            ESDT_NFT_UPDATE_ATTRIBUTES => (
                caller,
                NftChange::UpdateAttributes(Base64VecU8::from(event.topic(PAYLOAD_TOPIC))),
            ),
            ESDT_NFT_ADD_URI => (
                caller,
                NftChange::AddUris(
                    event.topics[PAYLOAD_TOPIC..]
                        .iter()
                        .map(|uri| Base64VecU8::from(uri.as_slice()))
                        .collect(),
                ),
            ),
            _ => (
                self.pubkey_converter.silent_encode(event.topic(PAYLOAD_TOPIC)),
                NftChange::Freeze(identifier == ESDT_FREEZE),
            ),
        };

        logs_data.nfts_data_updates.push(NftDataUpdate {
            identifier: tokens::compute_token_identifier(&token, nonce),
            address,
            change,
        });

        Dispatch::Processed
    }
}
