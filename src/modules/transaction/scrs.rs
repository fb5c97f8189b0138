use std::collections::{BTreeMap, HashMap};

use crate::modules::transaction::builder::{Placement, TransactionBuilder};
use crate::modules::transaction::schemas::ScResult;
use crate::outport_models::{Header, MiniBlock, MiniBlockType, ScrInfo};
use crate::types::hash;

const TARGET: &str = "outport_indexer::transactions";

/// Smart contract results listed by the block's SCR miniblocks, followed by the pool entries
/// no miniblock mentions (those are attributed to the self shard).
pub(crate) fn process_scrs(
    builder: &TransactionBuilder,
    mini_blocks: &[MiniBlock],
    header: &Header,
    scrs: &HashMap<String, ScrInfo>,
) -> Vec<ScResult> {
    let mut working: BTreeMap<&str, &ScrInfo> = scrs
        .iter()
        .map(|(hash, scr)| (hash.as_str(), scr))
        .collect();

    let mut all_scrs = Vec::with_capacity(scrs.len());
    for mini_block in mini_blocks
        .iter()
        .filter(|mini_block| mini_block.mb_type == MiniBlockType::SmartContractResultBlock)
    {
        all_scrs.extend(process_scrs_from_mini_block(builder, header, mini_block, &mut working));
    }

    let no_mini_block = Placement {
        mb_hash: "",
        sender_shard: header.shard_id,
        receiver_shard: header.shard_id,
    };
    for (scr_hash, scr) in working {
        all_scrs.push(builder.prepare_sc_result(scr, scr_hash, no_mini_block, header));
    }

    all_scrs
}

fn process_scrs_from_mini_block(
    builder: &TransactionBuilder,
    header: &Header,
    mini_block: &MiniBlock,
    working: &mut BTreeMap<&str, &ScrInfo>,
) -> Vec<ScResult> {
    let mb_hash = match hash::calculate_hash(mini_block) {
        Ok(mb_hash) => hex::encode(mb_hash),
        Err(err) => {
            tracing::warn!(target: TARGET, error = %err, "cannot calculate miniblock hash");
            return vec![];
        }
    };
    let placement = Placement::of(&mb_hash, mini_block);

    let mut results = Vec::with_capacity(mini_block.tx_hashes.len());
    for scr_hash in &mini_block.tx_hashes {
        let scr_hash = scr_hash.to_hex();
        let Some(scr) = working.remove(scr_hash.as_str()) else {
            tracing::warn!(target: TARGET, hash = %scr_hash, "scr not found in map");
            continue;
        };

        results.push(builder.prepare_sc_result(scr, &scr_hash, placement, header));
    }

    results
}
