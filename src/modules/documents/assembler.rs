use crate::config::IndicesConfig;
use crate::modules::documents::schemas::{Document, PreparedBlock};
use crate::modules::documents::store::{NoopTokenStore, TokenStore};
use crate::modules::documents::{accounts, logs, tokens, transactions};
use crate::modules::tokens::TokensHandler;

const TARGET: &str = "outport_indexer::documents";

/// Turns a prepared block into the ordered list of index instructions.
pub struct DocumentAssembler {
    indices: IndicesConfig,
    store: Box<dyn TokenStore>,
}

impl std::fmt::Debug for DocumentAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentAssembler")
            .field("indices", &self.indices)
            .finish()
    }
}

impl DocumentAssembler {
    /// An assembler that knows nothing about earlier blocks.
    pub fn new(indices: IndicesConfig) -> Self {
        Self::with_store(indices, Box::new(NoopTokenStore))
    }

    pub fn with_store(indices: IndicesConfig, store: Box<dyn TokenStore>) -> Self {
        Self { indices, store }
    }

    pub fn indices(&self) -> &IndicesConfig {
        &self.indices
    }

    /// Documents come out in write order: a later instruction for the same id must be applied
    /// after an earlier one.
    pub fn assemble(&self, block: PreparedBlock) -> crate::Result<Vec<Document>> {
        let PreparedBlock {
            stamp,
            results,
            operations_txs,
            operations_scrs,
            mut logs_results,
            logs,
            events,
            accounts,
            accounts_history,
            mut accounts_esdt,
            accounts_esdt_history,
            mut esdt_tokens,
            tags,
        } = block;
        let indices = &self.indices;
        let mut docs = vec![];

        transactions::merge_status_overrides(
            &results.tx_hash_status,
            &mut logs_results.tx_hash_status_info,
        );
        let status_info = &logs_results.tx_hash_status_info;
        transactions::serialize_transactions(
            &indices.transactions,
            &results.transactions,
            status_info,
            stamp.shard_id,
            &mut docs,
        )?;
        transactions::serialize_transactions(
            &indices.operations,
            &operations_txs,
            status_info,
            stamp.shard_id,
            &mut docs,
        )?;
        transactions::serialize_scrs(&indices.operations, &operations_scrs, &mut docs)?;
        transactions::serialize_fee_data(&indices.transactions, &results.tx_hash_fee, &mut docs);
        transactions::serialize_fee_data(&indices.operations, &results.tx_hash_fee, &mut docs);

        self.resolve_types(&mut logs_results.tokens)?;
        tokens::serialize_nft_create_info(
            &indices.tokens,
            &logs_results.tokens.get_all_without_meta_esdt(),
            &mut docs,
        )?;

        logs::serialize_logs(&indices.logs, &logs, &mut docs)?;
        logs::serialize_events(&indices.events, &events, &mut docs)?;
        transactions::serialize_scrs(&indices.scresults, &results.sc_results, &mut docs)?;
        transactions::serialize_receipts(&indices.receipts, &results.receipts, &mut docs)?;

        accounts::serialize_accounts(&indices.accounts, &accounts, &mut docs)?;
        accounts::serialize_accounts_history(
            &indices.accounts_history,
            &accounts_history,
            &mut docs,
        )?;

        self.resolve_types(&mut esdt_tokens)?;
        esdt_tokens.put_type_and_owner_in_accounts_esdt(&mut accounts_esdt);
        accounts::serialize_accounts_esdt(&indices.accounts_esdt, &accounts_esdt, &mut docs)?;
        accounts::serialize_nft_updates_in_accounts(
            &indices.accounts_esdt,
            &logs_results.nfts_data_updates,
            &mut docs,
        );
        accounts::serialize_accounts_history(
            &indices.accounts_esdt_history,
            &accounts_esdt_history,
            &mut docs,
        )?;

        tokens::serialize_tags(&indices.tags, &tags, &mut docs)?;
        for index in [&indices.esdts, &indices.tokens] {
            tokens::serialize_tokens(
                index,
                &logs_results.tokens_info,
                &logs_results.nfts_data_updates,
                &mut docs,
            )?;
        }

        logs::serialize_delegators(&indices.delegators, &logs_results.delegators, &mut docs)?;

        self.resolve_types(&mut logs_results.tokens_supply)?;
        tokens::serialize_supply_data(&indices.tokens, &logs_results.tokens_supply, &mut docs);

        for index in [&indices.tokens, &indices.esdts] {
            tokens::serialize_roles_and_properties(
                index,
                &logs_results.token_roles_and_properties,
                &mut docs,
            )?;
        }

        logs::serialize_sc_deploys(&indices.scdeploys, &logs_results.sc_deploys, &mut docs)?;
        logs::serialize_change_owner_operations(
            &indices.scdeploys,
            &logs_results.change_owner_operations,
            &mut docs,
        );

        tracing::debug!(
            target: TARGET,
            shard_id = stamp.shard_id,
            documents = docs.len(),
            "assembled block documents"
        );
        Ok(docs)
    }

    /// Type and owner of the registry's collections, as stored by earlier blocks.
    fn resolve_types(&self, tokens_handler: &mut TokensHandler) -> crate::Result<()> {
        if tokens_handler.is_empty() {
            return Ok(());
        }

        let response = self
            .store
            .multi_get(&tokens_handler.get_all_tokens(), &self.indices.tokens)?;
        tokens_handler.add_type_and_owner_from_response(&response);
        Ok(())
    }
}
