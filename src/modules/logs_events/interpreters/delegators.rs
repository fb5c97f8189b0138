use num_bigint::BigInt;

use crate::modules::logs_events::interpreters::{
    bytes_to_bool, Dispatch, EventArgs, EventInterpreter, TARGET,
};
use crate::modules::logs_events::logs_data::LogsData;
use crate::modules::logs_events::schemas::{Delegator, UnDelegate};
use crate::types::{numeric, BalanceConverter, PubkeyConverter};

const DELEGATE: &str = "delegate";
const UN_DELEGATE: &str = "unDelegate";
const WITHDRAW: &str = "withdraw";
const RE_DELEGATE_REWARDS: &str = "reDelegateRewards";
const CLAIM_REWARDS: &str = "claimRewards";

const MIN_NUM_TOPICS_DELEGATORS: usize = 4;
const MIN_NUM_TOPICS_CLAIM_REWARDS: usize = 2;
const ACTIVE_STAKE_TOPIC: usize = 1;
/// Contract for delegations, the delete flag for withdrawals, the fund id for unDelegations.
const EXTRA_TOPIC: usize = 4;
const WITHDRAW_FUND_IDS_START_TOPIC: usize = 5;

/// Delegation positions. Staking contracts live on the metachain, so other shards decline.
#[derive(Debug, Clone)]
pub(crate) struct DelegatorsInterpreter {
    pubkey_converter: PubkeyConverter,
    balance_converter: BalanceConverter,
}

impl DelegatorsInterpreter {
    pub fn new(pubkey_converter: PubkeyConverter, balance_converter: BalanceConverter) -> Self {
        Self {
            pubkey_converter,
            balance_converter,
        }
    }

    fn balance_as_float(&self, value: &BigInt) -> f64 {
        self.balance_converter
            .compute_balance_as_float(value)
            .unwrap_or_else(|err| {
                tracing::warn!(
                    target: TARGET,
                    value = %value,
                    error = %err,
                    "cannot compute stake as num"
                );
                0.0
            })
    }

    /// Only a claim that empties the position produces a record, and that record is a deletion.
    fn delegator_from_claim_rewards(&self, args: &EventArgs<'_>) -> Option<Delegator> {
        let event = args.event;
        if event.topics.len() < MIN_NUM_TOPICS_CLAIM_REWARDS || !bytes_to_bool(event.topic(1)) {
            return None;
        }

        Some(Delegator {
            address: self.pubkey_converter.silent_encode(event.address.as_slice()),
            contract: self.pubkey_converter.silent_encode(args.log_address),
            should_delete: true,
            ..Delegator::default()
        })
    }
}

impl EventInterpreter for DelegatorsInterpreter {
    fn identifiers(&self) -> &'static [&'static str] {
        &[DELEGATE, UN_DELEGATE, WITHDRAW, RE_DELEGATE_REWARDS, CLAIM_REWARDS]
    }

    fn process_event(&self, args: &EventArgs<'_>, logs_data: &mut LogsData<'_>) -> Dispatch {
        if args.self_shard != crate::METACHAIN_SHARD_ID {
            return Dispatch::Declined;
        }

        let event = args.event;
        let identifier = event.identifier.as_str();
        if identifier == CLAIM_REWARDS {
            if let Some(delegator) = self.delegator_from_claim_rewards(args) {
                logs_data.delegators.insert(delegator.key(), delegator);
            }
            return Dispatch::Processed;
        }

        let topics = &event.topics;
        if topics.len() < MIN_NUM_TOPICS_DELEGATORS {
            return Dispatch::Processed;
        }

        let has_extra_topic = topics.len() > EXTRA_TOPIC;
        let contract = if identifier == DELEGATE && has_extra_topic {
            self.pubkey_converter.silent_encode(event.topic(EXTRA_TOPIC))
        } else {
            self.pubkey_converter.silent_encode(args.log_address)
        };

        let stamp = logs_data.stamp;
        let active_stake = numeric::bytes_to_big_int(event.topic(ACTIVE_STAKE_TOPIC));
        let mut delegator = Delegator {
            address: self.pubkey_converter.silent_encode(event.address.as_slice()),
            contract,
            timestamp: stamp.timestamp,
            timestamp_ms: stamp.timestamp_ms,
            active_stake_num: self.balance_as_float(&active_stake),
            active_stake: active_stake.to_string(),
            ..Delegator::default()
        };

        if identifier == WITHDRAW && has_extra_topic {
            delegator.should_delete = bytes_to_bool(event.topic(EXTRA_TOPIC));
            delegator.withdraw_fund_ids = Some(
                topics
                    .iter()
                    .skip(WITHDRAW_FUND_IDS_START_TOPIC)
                    .map(|id| id.to_hex())
                    .collect(),
            );
            if delegator.should_delete {
                delegator.active_stake = String::new();
                delegator.active_stake_num = 0.0;
            }
        }

        if identifier == UN_DELEGATE && has_extra_topic {
            let value = numeric::bytes_to_big_int(event.topic(0));
            delegator.un_delegate_info = Some(UnDelegate {
                timestamp: stamp.timestamp,
                timestamp_ms: stamp.timestamp_ms,
                id: hex::encode(event.topic(EXTRA_TOPIC)),
                value_num: self.balance_as_float(&value),
                value: value.to_string(),
            });
        }

        logs_data.delegators.insert(delegator.key(), delegator);
        Dispatch::Processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::accounts::BlockStamp;
    use crate::modules::logs_events::interpreters::event_args;
    use crate::modules::tests::*;
    use crate::outport_models::Event;

    fn interpreter() -> DelegatorsInterpreter {
        let config = init_config();
        DelegatorsInterpreter::new(
            PubkeyConverter::new(&config.address).unwrap(),
            BalanceConverter::new(config.denomination).unwrap(),
        )
    }

    fn on_metachain<'a>(hash: &'a str, event: &'a Event, contract: &'a [u8]) -> EventArgs<'a> {
        EventArgs {
            log_address: contract,
            self_shard: crate::METACHAIN_SHARD_ID,
            ..event_args(hash, event)
        }
    }

    fn one_egld() -> Vec<u8> {
        BigInt::from(10u64.pow(18)).to_bytes_be().1
    }

    #[test]
    fn test_declined_outside_metachain() {
        let delegate = event(DELEGATE, address(0), vec![vec![], one_egld(), vec![], vec![]]);
        let mut logs_data = LogsData::new(BlockStamp::default(), &mut [], &mut []);

        let dispatch = interpreter().process_event(&event_args("h1", &delegate), &mut logs_data);
        assert_eq!(dispatch, Dispatch::Declined);
        assert!(logs_data.delegators.is_empty());
    }

    #[test]
    fn test_delegate_records_active_stake() {
        let delegate = event(DELEGATE, address(0), vec![vec![], one_egld(), vec![], vec![]]);
        let contract = metachain_sc_address();
        let mut logs_data = LogsData::new(BlockStamp::default(), &mut [], &mut []);

        interpreter().process_event(&on_metachain("h1", &delegate, &contract), &mut logs_data);

        let delegator = logs_data.delegators.values().next().unwrap();
        assert_eq!(delegator.address, encoded_address(0));
        assert_eq!(delegator.contract, hex::encode(&contract));
        assert_eq!(delegator.active_stake, "1000000000000000000");
        assert_eq!(delegator.active_stake_num, 1.0);
        assert_eq!(
            logs_data.delegators.keys().next().unwrap(),
            &format!("{}{}", encoded_address(0), hex::encode(&contract))
        );
    }

    #[test]
    fn test_withdraw_with_delete_flag_has_no_stake() {
        let withdraw = event(
            WITHDRAW,
            address(0),
            vec![one_egld(), vec![], vec![], vec![], b"true".to_vec(), vec![0x01], vec![0x02]],
        );
        let contract = metachain_sc_address();
        let mut logs_data = LogsData::new(BlockStamp::default(), &mut [], &mut []);

        interpreter().process_event(&on_metachain("h1", &withdraw, &contract), &mut logs_data);

        let delegator = logs_data.delegators.values().next().unwrap();
        assert!(delegator.should_delete);
        assert_eq!(delegator.active_stake, "");
        assert_eq!(delegator.active_stake_num, 0.0);
        assert_eq!(
            delegator.withdraw_fund_ids,
            Some(vec!["01".to_string(), "02".to_string()])
        );
    }

    #[test]
    fn test_un_delegate_carries_fund() {
        let un_delegate = event(
            UN_DELEGATE,
            address(0),
            vec![one_egld(), vec![], vec![], vec![], vec![0x0a]],
        );
        let contract = metachain_sc_address();
        let mut logs_data = LogsData::new(BlockStamp::default(), &mut [], &mut []);

        interpreter().process_event(&on_metachain("h1", &un_delegate, &contract), &mut logs_data);

        let info = logs_data.delegators.values().next().unwrap().un_delegate_info.clone().unwrap();
        assert_eq!(info.id, "0a");
        assert_eq!(info.value, "1000000000000000000");
        assert_eq!(info.value_num, 1.0);
    }

    #[test]
    fn test_claim_rewards_only_records_deletions() {
        let keep = event(CLAIM_REWARDS, address(0), vec![vec![0x01], b"false".to_vec()]);
        let delete = event(CLAIM_REWARDS, address(1), vec![vec![0x01], b"true".to_vec()]);
        let contract = metachain_sc_address();
        let mut logs_data = LogsData::new(BlockStamp::default(), &mut [], &mut []);

        for event in [&keep, &delete] {
            let args = on_metachain("h1", event, &contract);
            let dispatch = interpreter().process_event(&args, &mut logs_data);
            assert_eq!(dispatch, Dispatch::Processed);
        }

        assert_eq!(logs_data.delegators.len(), 1);
        let delegator = logs_data.delegators.values().next().unwrap();
        assert_eq!(delegator.address, encoded_address(1));
        assert!(delegator.should_delete);
    }
}
