use bech32::{FromBase32, ToBase32, Variant};

use crate::config::{AddressConfig, AddressEncoding};
use crate::errors;

/// Leading zero bytes that mark a smart contract address.
const NUM_ZERO_BYTES_FOR_SC_ADDRESS: usize = 8;
const VM_TYPE_LENGTH: usize = 2;

/// Encodes raw public keys the way they appear in documents.
#[derive(Debug, Clone)]
pub struct PubkeyConverter {
    encoding: AddressEncoding,
    hrp: String,
    length: usize,
}

impl PubkeyConverter {
    pub fn new(config: &AddressConfig) -> crate::Result<Self> {
        if config.length == 0 {
            return Err(errors::ErrorKind::InvalidConfig(
                "address length should be greater than 0".to_string(),
            )
            .into());
        }

        Ok(Self {
            encoding: config.encoding,
            hrp: config.hrp.clone(),
            length: config.length,
        })
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn encode(&self, pubkey: &[u8]) -> crate::Result<String> {
        if pubkey.len() != self.length {
            return Err(errors::ErrorKind::InvalidInput(format!(
                "wrong size of public key: expected {}, got {}",
                self.length,
                pubkey.len()
            ))
            .into());
        }

        match self.encoding {
            AddressEncoding::Hex => Ok(hex::encode(pubkey)),
            AddressEncoding::Bech32 => {
                Ok(bech32::encode(&self.hrp, pubkey.to_base32(), Variant::Bech32)?)
            }
        }
    }

    /// Encodes and logs instead of failing; invalid keys become an empty string.
    pub fn silent_encode(&self, pubkey: &[u8]) -> String {
        match self.encode(pubkey) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!(
                    target: "outport_indexer::address",
                    pubkey = %hex::encode(pubkey),
                    error = %err,
                    "cannot encode public key"
                );
                String::new()
            }
        }
    }

    pub fn encode_slice(&self, pubkeys: &[Vec<u8>]) -> Vec<String> {
        pubkeys
            .iter()
            .map(|pubkey| self.silent_encode(pubkey))
            .collect()
    }

    pub fn decode(&self, address: &str) -> crate::Result<Vec<u8>> {
        let bytes = match self.encoding {
            AddressEncoding::Hex => hex::decode(address)?,
            AddressEncoding::Bech32 => {
                let (hrp, data, _) = bech32::decode(address)?;
                if hrp != self.hrp {
                    return Err(errors::ErrorKind::InvalidInput(format!(
                        "unexpected address prefix {}",
                        hrp
                    ))
                    .into());
                }
                Vec::<u8>::from_base32(&data)?
            }
        };

        if bytes.len() != self.length {
            return Err(errors::ErrorKind::InvalidInput(format!(
                "decoded address {} has {} bytes, expected {}",
                address,
                bytes.len(),
                self.length
            ))
            .into());
        }

        Ok(bytes)
    }

    pub fn is_empty_address(&self, pubkey: &[u8]) -> bool {
        pubkey.len() == self.length && pubkey.iter().all(|byte| *byte == 0)
    }
}

pub fn is_smart_contract_address(address: &[u8]) -> bool {
    if address.len() <= NUM_ZERO_BYTES_FOR_SC_ADDRESS + VM_TYPE_LENGTH {
        return false;
    }

    address[..NUM_ZERO_BYTES_FOR_SC_ADDRESS]
        .iter()
        .all(|byte| *byte == 0)
}

fn is_smart_contract_on_metachain(identifier: &[u8], address: &[u8]) -> bool {
    is_smart_contract_address(address) && identifier == [u8::MAX]
}

/// Maps addresses to shards by their trailing bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardCoordinator {
    num_of_shards: u32,
    mask_high: u32,
    mask_low: u32,
}

impl ShardCoordinator {
    pub fn new(num_of_shards: u32) -> crate::Result<Self> {
        if num_of_shards == 0 {
            return Err(errors::ErrorKind::InvalidConfig(
                "number of shards should be greater than 0".to_string(),
            )
            .into());
        }

        let bits = u32::BITS - (num_of_shards - 1).leading_zeros();
        let mask_high = (1u32 << bits) - 1;
        let mask_low = if bits == 0 { 0 } else { (1u32 << (bits - 1)) - 1 };

        Ok(Self {
            num_of_shards,
            mask_high,
            mask_low,
        })
    }

    pub fn num_of_shards(&self) -> u32 {
        self.num_of_shards
    }

    pub fn compute_id(&self, address: &[u8]) -> u32 {
        let bytes_needed = match self.num_of_shards {
            n if n <= 256 => 1,
            n if n <= 65536 => 2,
            n if n <= 16777216 => 3,
            _ => 4,
        };

        let starting_index = address.len().saturating_sub(bytes_needed);
        let buff_needed = &address[starting_index..];
        if is_smart_contract_on_metachain(buff_needed, address) {
            return crate::METACHAIN_SHARD_ID;
        }

        let addr = buff_needed
            .iter()
            .fold(0u32, |acc, byte| (acc << 8) + u32::from(*byte));

        let shard = addr & self.mask_high;
        if shard > self.num_of_shards - 1 {
            return addr & self.mask_low;
        }

        shard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_converter() -> PubkeyConverter {
        PubkeyConverter::new(&AddressConfig {
            encoding: AddressEncoding::Hex,
            hrp: String::new(),
            length: 32,
        })
        .unwrap()
    }

    #[test]
    fn test_bech32_round_trip_and_prefix() {
        let converter = PubkeyConverter::new(&AddressConfig::default()).unwrap();
        let pubkey = [7u8; 32];
        let encoded = converter.encode(&pubkey).unwrap();
        assert!(encoded.starts_with("erd1"));
        assert_eq!(converter.decode(&encoded).unwrap(), pubkey.to_vec());
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let converter = hex_converter();
        assert!(converter.decode("abcd").is_err());
        assert!(converter.decode("not hex").is_err());
        assert_eq!(converter.silent_encode(&[1, 2, 3]), "");
    }

    #[test]
    fn test_is_smart_contract_address() {
        let mut sc = [0u8; 32];
        sc[31] = 1;
        assert!(is_smart_contract_address(&sc));

        let user = [1u8; 32];
        assert!(!is_smart_contract_address(&user));
        assert!(!is_smart_contract_address(&[0u8; 10]));
    }

    #[test]
    fn test_compute_shard_id() {
        let coordinator = ShardCoordinator::new(3).unwrap();
        let mut address = [1u8; 32];

        address[31] = 0;
        assert_eq!(coordinator.compute_id(&address), 0);
        address[31] = 1;
        assert_eq!(coordinator.compute_id(&address), 1);
        address[31] = 2;
        assert_eq!(coordinator.compute_id(&address), 2);
        // 3 & 0b11 = 3 is out of range so the low mask applies
        address[31] = 3;
        assert_eq!(coordinator.compute_id(&address), 1);
    }

    #[test]
    fn test_system_contract_is_on_metachain() {
        let coordinator = ShardCoordinator::new(3).unwrap();
        let mut address = [0u8; 32];
        address[31] = 0xff;
        assert_eq!(coordinator.compute_id(&address), crate::METACHAIN_SHARD_ID);
    }

    #[test]
    fn test_single_shard() {
        let coordinator = ShardCoordinator::new(1).unwrap();
        assert_eq!(coordinator.compute_id(&[9u8; 32]), 0);
    }
}
