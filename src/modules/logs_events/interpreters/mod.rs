//! Event interpreters, one per family of event identifiers. An event is offered to them in
//! priority order and the first one that claims it is the only one that sees it.

use crate::modules::logs_events::logs_data::LogsData;
use crate::outport_models::Event;
use crate::types::{BalanceConverter, PubkeyConverter, ShardCoordinator};

mod delegators;
mod esdt_issue;
mod esdt_properties;
mod informative;
mod nfts;
mod nfts_properties;
mod sc_deploys;

pub(crate) use delegators::DelegatorsInterpreter;
pub(crate) use esdt_issue::EsdtIssueInterpreter;
pub(crate) use esdt_properties::EsdtPropertiesInterpreter;
pub(crate) use informative::InformativeInterpreter;
pub(crate) use nfts::NftsInterpreter;
pub(crate) use nfts_properties::NftsPropertiesInterpreter;
pub(crate) use sc_deploys::ScDeploysInterpreter;

const TARGET: &str = "outport_indexer::logs_events";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dispatch {
    /// Not this interpreter's event; offer it to the next one.
    Declined,
    /// Claimed, whether or not it produced anything.
    Processed,
}

/// What an interpreter sees of one event.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EventArgs<'a> {
    /// Hex hash of the transaction or result that emitted the log.
    pub tx_hash: &'a str,
    pub log_address: &'a [u8],
    pub event: &'a Event,
    pub self_shard: u32,
}

pub(crate) trait EventInterpreter {
    fn identifiers(&self) -> &'static [&'static str];

    /// Called only with events whose identifier is one of [`Self::identifiers`].
    fn process_event(&self, args: &EventArgs<'_>, logs_data: &mut LogsData<'_>) -> Dispatch;
}

/// One link of the interpreter chain.
#[derive(Debug, Clone)]
pub(crate) enum Interpreter {
    ScDeploys(ScDeploysInterpreter),
    Informative(InformativeInterpreter),
    NftsProperties(NftsPropertiesInterpreter),
    EsdtProperties(EsdtPropertiesInterpreter),
    EsdtIssue(EsdtIssueInterpreter),
    Delegators(DelegatorsInterpreter),
    Nfts(NftsInterpreter),
}

impl Interpreter {
    fn inner(&self) -> &dyn EventInterpreter {
        match self {
            Self::ScDeploys(interpreter) => interpreter,
            Self::Informative(interpreter) => interpreter,
            Self::NftsProperties(interpreter) => interpreter,
            Self::EsdtProperties(interpreter) => interpreter,
            Self::EsdtIssue(interpreter) => interpreter,
            Self::Delegators(interpreter) => interpreter,
            Self::Nfts(interpreter) => interpreter,
        }
    }

    pub fn identifiers(&self) -> &'static [&'static str] {
        self.inner().identifiers()
    }

    pub fn process_event(&self, args: &EventArgs<'_>, logs_data: &mut LogsData<'_>) -> Dispatch {
        self.inner().process_event(args, logs_data)
    }
}

/// The interpreter chain, highest priority first: deploys, informative, NFT properties, ESDT
/// properties, issuance, delegation, NFT lifecycle.
pub(crate) fn interpreters(
    pubkey_converter: &PubkeyConverter,
    balance_converter: &BalanceConverter,
    shard_coordinator: &ShardCoordinator,
) -> Vec<Interpreter> {
    vec![
        Interpreter::ScDeploys(ScDeploysInterpreter::new(pubkey_converter.clone())),
        Interpreter::Informative(InformativeInterpreter),
        Interpreter::NftsProperties(NftsPropertiesInterpreter::new(pubkey_converter.clone())),
        Interpreter::EsdtProperties(EsdtPropertiesInterpreter::new(pubkey_converter.clone())),
        Interpreter::EsdtIssue(EsdtIssueInterpreter::new(pubkey_converter.clone())),
        Interpreter::Delegators(DelegatorsInterpreter::new(
            pubkey_converter.clone(),
            *balance_converter,
        )),
        Interpreter::Nfts(NftsInterpreter::new(pubkey_converter.clone(), *shard_coordinator)),
    ]
}

/// Boolean topics use the textual spellings `1 t T TRUE true True` and `0 f F FALSE false False`.
pub(crate) fn bytes_to_bool(bytes: &[u8]) -> bool {
    match bytes {
        b"1" | b"t" | b"T" | b"TRUE" | b"true" | b"True" => true,
        b"0" | b"f" | b"F" | b"FALSE" | b"false" | b"False" => false,
        _ => {
            tracing::warn!(
                target: TARGET,
                value = %String::from_utf8_lossy(bytes),
                "cannot parse bool topic"
            );
            false
        }
    }
}

#[cfg(test)]
pub(crate) fn event_args<'a>(tx_hash: &'a str, event: &'a Event) -> EventArgs<'a> {
    EventArgs {
        tx_hash,
        log_address: event.address.as_slice(),
        event,
        self_shard: 0,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::modules::tests::*;

    #[test]
    fn test_every_identifier_has_a_single_interpreter() {
        let config = init_config();
        let pubkey_converter = PubkeyConverter::new(&config.address).unwrap();
        let chain = interpreters(
            &pubkey_converter,
            &BalanceConverter::new(config.denomination).unwrap(),
            &ShardCoordinator::new(config.num_of_shards).unwrap(),
        );

        let mut owners: HashMap<&str, usize> = HashMap::new();
        for (position, interpreter) in chain.iter().enumerate() {
            for identifier in interpreter.identifiers() {
                let previous = owners.insert(*identifier, position);
                assert_eq!(previous, None, "{} is claimed twice", identifier);
            }
        }
        assert_eq!(owners.len(), 37);
        assert_eq!(owners["SCDeploy"], 0);
        assert_eq!(owners["ESDTNFTCreate"], 6);
        assert!(matches!(chain[0], Interpreter::ScDeploys(_)));
        assert!(matches!(chain[6], Interpreter::Nfts(_)));
    }

    #[test]
    fn test_bytes_to_bool() {
        assert!(bytes_to_bool(b"true"));
        assert!(bytes_to_bool(b"1"));
        assert!(!bytes_to_bool(b"False"));
        assert!(!bytes_to_bool(b"yes"));
        assert!(!bytes_to_bool(b""));
    }
}
