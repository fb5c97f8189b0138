use crate::config::Config;
use crate::modules::accounts::{AccountsProcessor, BlockStamp};
use crate::modules::documents::{Document, DocumentAssembler, PreparedBlock, TokenStore};
use crate::modules::logs_events::LogsAndEventsProcessor;
use crate::modules::tokens::TagsCount;
use crate::modules::transaction::{self, OperationsProcessor, TransactionsProcessor};
use crate::outport_models::OutportBlock;
use crate::types::{BalanceConverter, PubkeyConverter, ShardCoordinator};

const TARGET: &str = "outport_indexer::indexer";

/// Documents of one block, in write order.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct BlockOutput {
    pub shard_id: u32,
    pub documents: Vec<Document>,
}

/// Runs every component over one block. Holds no state between blocks.
#[derive(Debug)]
pub struct BlockIndexer {
    import_db: bool,
    transactions: TransactionsProcessor,
    logs_and_events: LogsAndEventsProcessor,
    accounts: AccountsProcessor,
    assembler: DocumentAssembler,
}

impl BlockIndexer {
    pub fn new(config: Config) -> crate::Result<Self> {
        config.validate()?;
        let pubkey_converter = PubkeyConverter::new(&config.address)?;
        let balance_converter = BalanceConverter::new(config.denomination)?;
        let shard_coordinator = ShardCoordinator::new(config.num_of_shards)?;

        Ok(Self {
            import_db: config.import_db,
            transactions: TransactionsProcessor::new(&config)?,
            logs_and_events: LogsAndEventsProcessor::new(
                pubkey_converter.clone(),
                balance_converter,
                shard_coordinator,
            ),
            accounts: AccountsProcessor::new(pubkey_converter, balance_converter),
            assembler: DocumentAssembler::new(config.indices),
        })
    }

    /// Resolves token types against `store` instead of assuming an empty index.
    pub fn with_store(mut self, store: Box<dyn TokenStore>) -> Self {
        let indices = self.assembler.indices().clone();
        self.assembler = DocumentAssembler::with_store(indices, store);
        self
    }

    pub fn process_block(&self, block: &OutportBlock) -> crate::Result<BlockOutput> {
        let stamp = BlockStamp {
            shard_id: block.shard_id,
            timestamp: block.timestamp(),
            timestamp_ms: block.timestamp_ms(),
        };
        let logs = block
            .transaction_pool
            .as_ref()
            .map(|pool| pool.logs.as_slice())
            .unwrap_or_default();

        let mut results = self
            .transactions
            .prepare_transactions_for_database(block, self.import_db);
        let mut logs_results = self.logs_and_events.extract_data_from_logs(
            logs,
            &mut results.transactions,
            &mut results.sc_results,
            stamp,
        );
        let (db_logs, db_events) = self.logs_and_events.prepare_logs_for_db(
            logs,
            &results.transactions,
            &results.sc_results,
            stamp,
        );
        let (operations_txs, operations_scrs) =
            OperationsProcessor::new(self.import_db, stamp.shard_id)
                .process_transactions_and_scrs(&results.transactions, &results.sc_results);

        let (regular_accounts, esdt_accounts) =
            self.accounts.get_accounts(&block.altered_accounts);
        let accounts = self
            .accounts
            .prepare_regular_accounts_map(&regular_accounts, stamp);
        let accounts_history = self.accounts.prepare_accounts_history(&accounts, stamp);
        let mut tags = TagsCount::new();
        let (accounts_esdt, esdt_tokens) =
            self.accounts
                .prepare_accounts_map_esdt(&esdt_accounts, &mut tags, stamp);
        let accounts_esdt_history = self
            .accounts
            .prepare_accounts_history(&accounts_esdt, stamp);
        logs_results
            .tokens
            .put_token_metadata_in_tokens(&block.altered_accounts);

        tracing::info!(
            target: TARGET,
            shard_id = stamp.shard_id,
            timestamp = stamp.timestamp,
            transactions = results.transactions.len(),
            scrs = results.sc_results.len(),
            receipts = results.receipts.len(),
            logs = db_logs.len(),
            accounts = accounts.len(),
            accounts_esdt = accounts_esdt.len(),
            "prepared block"
        );

        let documents = self.assembler.assemble(PreparedBlock {
            stamp,
            results,
            operations_txs,
            operations_scrs,
            logs_results,
            logs: db_logs,
            events: db_events,
            accounts,
            accounts_history,
            accounts_esdt,
            accounts_esdt_history,
            esdt_tokens,
            tags,
        })?;

        Ok(BlockOutput {
            shard_id: stamp.shard_id,
            documents,
        })
    }

    /// Hex hashes of the transactions and results a block wrote, for a rollback.
    pub fn hashes_for_remove(&self, block: &OutportBlock) -> Option<(Vec<String>, Vec<String>)> {
        transaction::hashes_for_remove(block.header.as_ref(), &block.body)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::modules::documents::Action;
    use crate::modules::tests::*;
    use crate::outport_models::{
        AccountTokenData, AdditionalAccountData, AlteredAccount, Body, Header,
    };

    fn block(altered_accounts: HashMap<String, AlteredAccount>) -> OutportBlock {
        OutportBlock {
            shard_id: 0,
            header: Some(Header {
                shard_id: 0,
                round: 10,
                timestamp: 1000,
                ..Header::default()
            }),
            body: Body::default(),
            transaction_pool: None,
            altered_accounts,
        }
    }

    fn altered_account(token_balance: &str) -> AlteredAccount {
        AlteredAccount {
            address: encoded_address(0),
            nonce: 3,
            balance: "100".to_string(),
            tokens: vec![AccountTokenData {
                identifier: "TKN-abcd".to_string(),
                balance: token_balance.to_string(),
                ..AccountTokenData::default()
            }],
            additional_data: Some(AdditionalAccountData {
                balance_changed: true,
                ..AdditionalAccountData::default()
            }),
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = Config {
            num_of_shards: 0,
            ..init_config()
        };
        assert!(BlockIndexer::new(config).is_err());
    }

    #[test]
    fn test_empty_block_has_no_documents() {
        let indexer = BlockIndexer::new(init_config()).unwrap();
        let output = indexer.process_block(&block(HashMap::new())).unwrap();
        assert_eq!(output, BlockOutput::default());
    }

    #[test]
    fn test_altered_accounts_become_documents() {
        let indexer = BlockIndexer::new(init_config()).unwrap();
        let account = altered_account("5");
        let altered = HashMap::from([(account.address.clone(), account)]);

        let output = indexer.process_block(&block(altered)).unwrap();

        let address = encoded_address(0);
        let targets: Vec<(String, String)> = output
            .documents
            .iter()
            .map(|doc| (doc.index.clone(), doc.id.clone()))
            .collect();
        assert_eq!(
            targets,
            vec![
                ("accounts".to_string(), address.clone()),
                ("accountshistory".to_string(), format!("{}-1000", address)),
                ("accountsesdt".to_string(), format!("{}-TKN-abcd-00", address)),
                (
                    "accountsesdthistory".to_string(),
                    format!("{}-TKN-abcd-00-1000", address)
                ),
            ]
        );
        let Action::Index(body) = &output.documents[2].action else {
            panic!("expected an index");
        };
        assert_eq!(body["balance"], "5");
        assert_eq!(body["type"], "FungibleESDT");
    }

    #[test]
    fn test_emptied_token_account_is_deleted() {
        let indexer = BlockIndexer::new(init_config()).unwrap();
        let account = altered_account("0");
        let altered = HashMap::from([(account.address.clone(), account)]);

        let output = indexer.process_block(&block(altered)).unwrap();

        let deleted: Vec<&str> = output
            .documents
            .iter()
            .filter(|doc| doc.action == Action::Delete)
            .map(|doc| doc.index.as_str())
            .collect();
        assert_eq!(deleted, vec!["accountsesdt"]);
    }

    #[test]
    fn test_nothing_to_remove_without_header() {
        let indexer = BlockIndexer::new(init_config()).unwrap();
        let block = OutportBlock {
            header: None,
            ..block(HashMap::new())
        };
        assert_eq!(indexer.hashes_for_remove(&block), None);
    }
}
