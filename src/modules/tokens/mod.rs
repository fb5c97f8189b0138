//! Token identity, metadata normalisation and the per-block token side tables.

use crate::outport_models::RawTokenMetaData;
use crate::utils;

pub mod registry;
pub mod roles;
pub mod schemas;
pub mod tags;

pub use registry::TokensHandler;
pub use roles::TokenRolesAndProperties;
pub use tags::TagsCount;

pub const FUNGIBLE_ESDT: &str = "FungibleESDT";
pub const NON_FUNGIBLE_ESDT: &str = "NonFungibleESDT";
pub const NON_FUNGIBLE_ESDT_V2: &str = "NonFungibleESDTv2";
pub const DYNAMIC_NON_FUNGIBLE_ESDT: &str = "DynamicNonFungibleESDT";
pub const META_ESDT: &str = "MetaESDT";

const ATTRIBUTES_SEPARATOR: char = ';';
const KEY_VALUES_SEPARATOR: char = ':';
const VALUES_SEPARATOR: char = ',';
const TAGS_KEY: &str = "tags";
const METADATA_KEY: &str = "metadata";

const IPFS_URL: &str = "https://ipfs.io/ipfs/";
const IPFS_NO_SECURE_PREFIX: &str = "ipfs://";
const DWEB_PREFIX_URL: &str = "https://dweb.link/ipfs";
const PINATA_CLOUD: &str = ".pinata.cloud/ipfs";
const SECURE_URL: &str = "https://";

/// `token` for fungible tokens, `token-<hex nonce>` for NFTs and SFTs.
pub fn compute_token_identifier(token: &str, nonce: u64) -> String {
    if nonce == 0 {
        return token.to_string();
    }

    let bytes = nonce.to_be_bytes();
    let first_non_zero = bytes
        .iter()
        .position(|byte| *byte != 0)
        .unwrap_or(bytes.len());
    format!("{}-{}", token, hex::encode(&bytes[first_non_zero..]))
}

pub fn extract_tags_from_attributes(attributes: &[u8]) -> Vec<String> {
    extract_from_attributes(attributes, TAGS_KEY)
}

pub fn extract_metadata_from_attributes(attributes: &[u8]) -> String {
    extract_from_attributes(attributes, METADATA_KEY)
        .first()
        .map(|metadata| utils::truncate_field(metadata))
        .unwrap_or_default()
}

fn extract_from_attributes(attributes: &[u8], key: &str) -> Vec<String> {
    if attributes.is_empty() {
        return vec![];
    }

    let attributes = String::from_utf8_lossy(attributes);
    for key_values_pair in attributes.split(ATTRIBUTES_SEPARATOR) {
        let split_pair: Vec<&str> = key_values_pair.split(KEY_VALUES_SEPARATOR).collect();
        if split_pair.len() < 2 || split_pair[0] != key {
            continue;
        }

        return split_pair[1]
            .split(VALUES_SEPARATOR)
            .filter(|value| !value.is_empty())
            .map(|value| {
                if key == TAGS_KEY {
                    value.to_lowercase()
                } else {
                    value.to_string()
                }
            })
            .collect();
    }

    vec![]
}

/// Normalises raw NFT metadata for indexing.
pub fn prepare_token_metadata(metadata: &RawTokenMetaData) -> schemas::TokenMetaData {
    let uris: Vec<Vec<u8>> = metadata.uris.iter().map(|uri| uri.0.clone()).collect();

    schemas::TokenMetaData {
        name: metadata.name.clone(),
        creator: metadata.creator.clone(),
        royalties: metadata.royalties,
        hash: metadata.hash.clone(),
        uris: metadata.uris.clone(),
        tags: extract_tags_from_attributes(metadata.attributes.as_slice()),
        attributes: metadata.attributes.clone(),
        metadata: extract_metadata_from_attributes(metadata.attributes.as_slice()),
        non_empty_uris: uris.iter().any(|uri| !uri.is_empty()),
        white_listed_storage: white_listed_storage(&uris),
    }
}

fn white_listed_storage(uris: &[Vec<u8>]) -> bool {
    let Some(first) = uris.first() else {
        return false;
    };

    let uri = String::from_utf8_lossy(first);
    uri.starts_with(IPFS_URL)
        || uri.starts_with(IPFS_NO_SECURE_PREFIX)
        || uri.starts_with(DWEB_PREFIX_URL)
        || (uri.contains(PINATA_CLOUD) && uri.starts_with(SECURE_URL))
}

/// Token types whose supply documents are dropped when an item is burnt or wiped.
pub fn is_non_fungible_type(token_type: &str) -> bool {
    matches!(
        token_type,
        NON_FUNGIBLE_ESDT | NON_FUNGIBLE_ESDT_V2 | DYNAMIC_NON_FUNGIBLE_ESDT
    )
}
