pub mod accounts;
pub mod documents;
pub mod logs_events;
pub mod tokens;
pub mod transaction;

#[cfg(test)]
pub(crate) mod tests {
    use crate::config::{AddressEncoding, Config};
    use crate::outport_models::Event;
    use crate::types::HexVecU8;

    /// Hex addresses keep expectations readable.
    pub(crate) fn init_config() -> Config {
        let mut config = Config::default();
        config.address.encoding = AddressEncoding::Hex;
        config
    }

    /// A user address living in shard `shard` of a 3-shard network.
    pub(crate) fn address(shard: u8) -> Vec<u8> {
        let mut address = vec![0x11; 32];
        address[31] = shard;
        address
    }

    pub(crate) fn encoded_address(shard: u8) -> String {
        hex::encode(address(shard))
    }

    pub(crate) fn sc_address(shard: u8) -> Vec<u8> {
        let mut address = vec![0; 32];
        address[10] = 0x05;
        address[31] = shard;
        address
    }

    pub(crate) fn metachain_sc_address() -> Vec<u8> {
        let mut address = vec![0; 32];
        address[31] = 0xff;
        address
    }

    pub(crate) fn event(identifier: &str, address: Vec<u8>, topics: Vec<Vec<u8>>) -> Event {
        Event {
            address: HexVecU8(address),
            identifier: identifier.to_string(),
            topics: topics.into_iter().map(HexVecU8).collect(),
            ..Event::default()
        }
    }
}
