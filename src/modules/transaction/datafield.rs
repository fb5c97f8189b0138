//! Interprets the data field of a transaction or smart contract result.

use crate::modules::tokens::compute_token_identifier;
use crate::types::{address, numeric, Base64VecU8, PubkeyConverter, ShardCoordinator};

pub const OPERATION_TRANSFER: &str = "transfer";
pub const OPERATION_DEPLOY: &str = "scDeploy";

pub const ESDT_TRANSFER: &str = "ESDTTransfer";
pub const ESDT_NFT_TRANSFER: &str = "ESDTNFTTransfer";
pub const MULTI_ESDT_NFT_TRANSFER: &str = "MultiESDTNFTTransfer";
pub const ESDT_LOCAL_BURN: &str = "ESDTLocalBurn";
pub const ESDT_LOCAL_MINT: &str = "ESDTLocalMint";
pub const ESDT_WIPE: &str = "ESDTWipe";
pub const ESDT_FREEZE: &str = "ESDTFreeze";
pub const ESDT_UNFREEZE: &str = "ESDTUnFreeze";
pub const ESDT_NFT_CREATE: &str = "ESDTNFTCreate";
pub const ESDT_NFT_BURN: &str = "ESDTNFTBurn";
pub const ESDT_NFT_ADD_QUANTITY: &str = "ESDTNFTAddQuantity";
pub const RELAYED_TX: &str = "relayedTx";
pub const RELAYED_TX_V2: &str = "relayedTxV2";

const ARGS_SEPARATOR: char = '@';
const ESDT_IDENTIFIER_SEPARATOR: u8 = b'-';
const ESDT_RANDOM_SEQUENCE_LENGTH: usize = 6;
const MIN_ARGS_ESDT_TRANSFER: usize = 2;
const MIN_ARGS_QUANTITY_OPERATION_ESDT: usize = 2;
const MIN_ARGS_QUANTITY_OPERATION_NFT: usize = 3;
const NUM_ARGS_RELAYED_V2: usize = 4;

const BUILT_IN_FUNCTIONS: &[&str] = &[
    "ClaimDeveloperRewards",
    "ChangeOwnerAddress",
    "SetUserName",
    "SaveKeyValue",
    "ESDTBurn",
    "ESDTPause",
    "ESDTUnPause",
    "ESDTSetRole",
    "ESDTUnSetRole",
    "ESDTSetLimitedTransfer",
    "ESDTUnSetLimitedTransfer",
    "ESDTNFTCreateRoleTransfer",
    "ESDTNFTAddURI",
    "ESDTNFTUpdateAttributes",
    "SetGuardian",
    "GuardAccount",
    "UnGuardAccount",
    "ESDTSetTokenType",
    "ESDTModifyRoyalties",
    "ESDTSetNewURIs",
    "ESDTModifyCreator",
    "ESDTMetaDataRecreate",
    "ESDTMetaDataUpdate",
    "MigrateDataTrie",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseParseData {
    pub operation: String,
    pub function: String,
    pub esdt_values: Vec<String>,
    pub tokens: Vec<String>,
    pub receivers: Vec<String>,
    pub receivers_shard_ids: Vec<u32>,
    pub is_relayed: bool,
}

impl ResponseParseData {
    fn with_operation(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            ..Self::default()
        }
    }

    fn relayed() -> Self {
        Self {
            is_relayed: true,
            ..Self::default()
        }
    }
}

/// Inner transaction of a `relayedTx` call, JSON encoded in its first argument.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct InnerTransaction {
    #[serde(rename = "receiver")]
    rcv_addr: Base64VecU8,
    #[serde(rename = "sender")]
    snd_addr: Base64VecU8,
    data: Base64VecU8,
}

/// Token transfers described by the arguments of a builtin transfer function.
#[derive(Debug, Default)]
struct ParsedTransfers {
    rcv_addr: Vec<u8>,
    call_function: String,
    transfers: Vec<TokenTransfer>,
}

#[derive(Debug)]
struct TokenTransfer {
    token: Vec<u8>,
    nonce: u64,
    value: String,
}

#[derive(Debug, Clone)]
pub struct DataFieldParser {
    pubkey_converter: PubkeyConverter,
    shard_coordinator: ShardCoordinator,
}

impl DataFieldParser {
    pub fn new(pubkey_converter: PubkeyConverter, shard_coordinator: ShardCoordinator) -> Self {
        Self {
            pubkey_converter,
            shard_coordinator,
        }
    }

    pub fn parse(&self, data: &[u8], sender: &[u8], receiver: &[u8]) -> ResponseParseData {
        self.parse_inner(data, sender, receiver, false)
    }

    fn parse_inner(
        &self,
        data: &[u8],
        sender: &[u8],
        receiver: &[u8],
        ignore_relayed: bool,
    ) -> ResponseParseData {
        let mut response = ResponseParseData::with_operation(OPERATION_TRANSFER);

        if !data.is_empty() && self.pubkey_converter.is_empty_address(receiver) {
            response.operation = OPERATION_DEPLOY.to_string();
            return response;
        }

        let Some((function, args)) = parse_call_data(data) else {
            return response;
        };

        match function.as_str() {
            ESDT_TRANSFER => return self.parse_esdt_transfer(&args, receiver),
            ESDT_NFT_TRANSFER => return self.parse_esdt_nft_transfer(&args, sender, receiver),
            MULTI_ESDT_NFT_TRANSFER => {
                return self.parse_multi_esdt_nft_transfer(&args, sender, receiver)
            }
            ESDT_LOCAL_BURN | ESDT_LOCAL_MINT => {
                return parse_quantity_operation_esdt(&args, &function)
            }
            ESDT_WIPE | ESDT_FREEZE | ESDT_UNFREEZE => {
                return parse_blocking_operation_esdt(&args, &function)
            }
            ESDT_NFT_CREATE | ESDT_NFT_BURN | ESDT_NFT_ADD_QUANTITY => {
                return parse_quantity_operation_nft(&args, &function)
            }
            RELAYED_TX | RELAYED_TX_V2 => {
                if ignore_relayed {
                    return ResponseParseData::relayed();
                }
                return self.parse_relayed(&function, &args, receiver);
            }
            _ => {}
        }

        if BUILT_IN_FUNCTIONS.contains(&function.as_str()) {
            response.operation = function;
            return response;
        }

        if address::is_smart_contract_address(receiver) && function.is_ascii() {
            response.function = function;
        }

        response
    }

    fn parse_esdt_transfer(&self, args: &[Vec<u8>], receiver: &[u8]) -> ResponseParseData {
        let mut response = ResponseParseData::with_operation(ESDT_TRANSFER);
        if args.len() < MIN_ARGS_ESDT_TRANSFER || !args[0].is_ascii() {
            return response;
        }

        if address::is_smart_contract_address(receiver) {
            response.function = args
                .get(2)
                .map(|function| String::from_utf8_lossy(function).into_owned())
                .unwrap_or_default();
        }
        response.tokens.push(String::from_utf8_lossy(&args[0]).into_owned());
        response.esdt_values.push(big_value(&args[1]));

        response
    }

    fn parse_esdt_nft_transfer(
        &self,
        args: &[Vec<u8>],
        sender: &[u8],
        receiver: &[u8],
    ) -> ResponseParseData {
        let mut response = ResponseParseData::with_operation(ESDT_NFT_TRANSFER);
        let Some(parsed) = parse_nft_transfer_args(args, sender, receiver) else {
            return response;
        };
        let Some(transfer) = parsed.transfers.first() else {
            return response;
        };
        if !transfer.token.is_ascii() {
            return response;
        }

        if address::is_smart_contract_address(&parsed.rcv_addr) && parsed.call_function.is_ascii() {
            response.function = parsed.call_function.clone();
        }

        let token = String::from_utf8_lossy(&transfer.token);
        response
            .tokens
            .push(compute_token_identifier(&token, transfer.nonce));
        response.esdt_values.push(transfer.value.clone());
        response
            .receivers
            .push(self.pubkey_converter.silent_encode(&parsed.rcv_addr));
        response
            .receivers_shard_ids
            .push(self.shard_coordinator.compute_id(&parsed.rcv_addr));

        response
    }

    fn parse_multi_esdt_nft_transfer(
        &self,
        args: &[Vec<u8>],
        sender: &[u8],
        receiver: &[u8],
    ) -> ResponseParseData {
        let mut response = ResponseParseData::with_operation(MULTI_ESDT_NFT_TRANSFER);
        let Some(parsed) = parse_multi_transfer_args(args, sender, receiver) else {
            return response;
        };

        if address::is_smart_contract_address(&parsed.rcv_addr) {
            response.function = parsed.call_function.clone();
        }

        let receiver_encoded = self.pubkey_converter.silent_encode(&parsed.rcv_addr);
        let receiver_shard = self.shard_coordinator.compute_id(&parsed.rcv_addr);
        for transfer in parsed.transfers {
            let token = String::from_utf8_lossy(&transfer.token);
            response
                .tokens
                .push(compute_token_identifier(&token, transfer.nonce));
            response.esdt_values.push(transfer.value);
            response.receivers.push(receiver_encoded.clone());
            response.receivers_shard_ids.push(receiver_shard);
        }

        response
    }

    fn parse_relayed(
        &self,
        function: &str,
        args: &[Vec<u8>],
        receiver: &[u8],
    ) -> ResponseParseData {
        let Some(inner) = extract_inner_tx(function, args, receiver) else {
            return ResponseParseData::relayed();
        };

        let result = self.parse_inner(
            inner.data.as_slice(),
            inner.snd_addr.as_slice(),
            inner.rcv_addr.as_slice(),
            true,
        );
        if result.is_relayed {
            return ResponseParseData::relayed();
        }

        let is_nft_transfer = result.operation == ESDT_NFT_TRANSFER
            || result.operation == MULTI_ESDT_NFT_TRANSFER;
        let (receivers, receivers_shard_ids) = if is_nft_transfer {
            (result.receivers, result.receivers_shard_ids)
        } else {
            (
                vec![self.pubkey_converter.silent_encode(inner.rcv_addr.as_slice())],
                vec![self.shard_coordinator.compute_id(inner.rcv_addr.as_slice())],
            )
        };

        ResponseParseData {
            operation: result.operation,
            function: result.function,
            esdt_values: result.esdt_values,
            tokens: result.tokens,
            receivers,
            receivers_shard_ids,
            is_relayed: true,
        }
    }
}

/// Splits `function@arg1@arg2...` and hex decodes the arguments.
fn parse_call_data(data: &[u8]) -> Option<(String, Vec<Vec<u8>>)> {
    let data = std::str::from_utf8(data).ok()?;
    let mut tokens = data.split(ARGS_SEPARATOR);
    let function = tokens.next().filter(|function| !function.is_empty())?;
    let args = tokens
        .map(hex::decode)
        .collect::<Result<Vec<_>, _>>()
        .ok()?;

    Some((function.to_string(), args))
}

fn big_value(bytes: &[u8]) -> String {
    numeric::bytes_to_big_int(bytes).to_string()
}

fn parse_nft_transfer_args(
    args: &[Vec<u8>],
    sender: &[u8],
    receiver: &[u8],
) -> Option<ParsedTransfers> {
    // sent by the owner the destination is an argument, received by a contract it is the receiver
    let (rcv_addr, function_index) = if sender == receiver {
        (args.get(3)?.clone(), 4)
    } else {
        if args.len() < 3 {
            return None;
        }
        (receiver.to_vec(), 3)
    };

    Some(ParsedTransfers {
        rcv_addr,
        call_function: args
            .get(function_index)
            .map(|function| String::from_utf8_lossy(function).into_owned())
            .unwrap_or_default(),
        transfers: vec![TokenTransfer {
            token: args[0].clone(),
            nonce: numeric::bytes_to_u64(&args[1]),
            value: big_value(&args[2]),
        }],
    })
}

fn parse_multi_transfer_args(
    args: &[Vec<u8>],
    sender: &[u8],
    receiver: &[u8],
) -> Option<ParsedTransfers> {
    let (rcv_addr, count_index) = if sender == receiver {
        (args.first()?.clone(), 1)
    } else {
        (receiver.to_vec(), 0)
    };

    let count = usize::try_from(numeric::bytes_to_u64(args.get(count_index)?)).ok()?;
    let start = count_index + 1;
    let end = count.checked_mul(3)?.checked_add(start)?;
    if count == 0 || args.len() < end {
        return None;
    }

    let transfers = args[start..end]
        .chunks_exact(3)
        .map(|triple| TokenTransfer {
            token: triple[0].clone(),
            nonce: numeric::bytes_to_u64(&triple[1]),
            value: big_value(&triple[2]),
        })
        .collect();

    Some(ParsedTransfers {
        rcv_addr,
        call_function: args
            .get(end)
            .map(|function| String::from_utf8_lossy(function).into_owned())
            .unwrap_or_default(),
        transfers,
    })
}

fn extract_inner_tx(function: &str, args: &[Vec<u8>], receiver: &[u8]) -> Option<InnerTransaction> {
    if function == RELAYED_TX {
        return serde_json::from_slice(args.first()?).ok();
    }

    if args.len() != NUM_ARGS_RELAYED_V2 {
        return None;
    }

    // the relayed v2 receiver is the inner sender
    Some(InnerTransaction {
        rcv_addr: Base64VecU8(args[0].clone()),
        snd_addr: Base64VecU8(receiver.to_vec()),
        data: Base64VecU8(args[2].clone()),
    })
}

fn parse_quantity_operation_esdt(args: &[Vec<u8>], function: &str) -> ResponseParseData {
    let mut response = ResponseParseData::with_operation(function);
    if args.len() < MIN_ARGS_QUANTITY_OPERATION_ESDT || !args[0].is_ascii() {
        return response;
    }

    response.tokens.push(String::from_utf8_lossy(&args[0]).into_owned());
    response.esdt_values.push(big_value(&args[1]));
    response
}

fn parse_blocking_operation_esdt(args: &[Vec<u8>], function: &str) -> ResponseParseData {
    let mut response = ResponseParseData::with_operation(function);
    let Some(first) = args.first() else {
        return response;
    };

    let (token, nonce) = extract_token_identifier_and_nonce(first);
    if !token.is_ascii() {
        return response;
    }

    response.tokens.push(compute_token_identifier(&token, nonce));
    response
}

fn parse_quantity_operation_nft(args: &[Vec<u8>], function: &str) -> ResponseParseData {
    let mut response = ResponseParseData::with_operation(function);
    if args.len() < MIN_ARGS_QUANTITY_OPERATION_NFT || !args[0].is_ascii() {
        return response;
    }

    let token = String::from_utf8_lossy(&args[0]);
    let nonce = numeric::bytes_to_u64(&args[1]);
    response.tokens.push(compute_token_identifier(&token, nonce));
    response.esdt_values.push(big_value(&args[2]));
    response
}

/// `TICKER-abcdef<nonce bytes>` becomes (`TICKER-abcdef`, nonce).
fn extract_token_identifier_and_nonce(arg: &[u8]) -> (String, u64) {
    let as_string = String::from_utf8_lossy(arg).into_owned();
    let mut split = arg.splitn(2, |byte| *byte == ESDT_IDENTIFIER_SEPARATOR);
    let (Some(ticker), Some(rest)) = (split.next(), split.next()) else {
        return (as_string, 0);
    };
    if rest.len() <= ESDT_RANDOM_SEQUENCE_LENGTH {
        return (as_string, 0);
    }

    let identifier = format!(
        "{}-{}",
        String::from_utf8_lossy(ticker),
        String::from_utf8_lossy(&rest[..ESDT_RANDOM_SEQUENCE_LENGTH])
    );
    (identifier, numeric::bytes_to_u64(&rest[ESDT_RANDOM_SEQUENCE_LENGTH..]))
}
