use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use bitcoin::{BlockHash, Txid};

use crate::node::traits::NodeClient;
use crate::types::{RawBlock, RawTransaction, ScriptPubKey, TxInput, TxOutput};

/// In-memory stand-in for a full node. Counts every round-trip so tests can
/// assert how many were issued.
#[derive(Default)]
pub(crate) struct MockNode {
    pub tip: Option<BlockHash>,
    pub heights: HashMap<i64, BlockHash>,
    pub blocks: HashMap<BlockHash, RawBlock>,
    pub transactions: HashMap<Txid, RawTransaction>,
    calls: AtomicUsize,
}

impl MockNode {
    pub fn with_tip(mut self, tip: BlockHash) -> Self {
        self.tip = Some(tip);
        self
    }

    pub fn with_height(mut self, height: i64, hash: BlockHash) -> Self {
        self.heights.insert(height, hash);
        self
    }

    pub fn with_block(mut self, block: RawBlock) -> Self {
        self.blocks.insert(block.hash, block);
        self
    }

    pub fn with_transaction(mut self, tx: RawTransaction) -> Self {
        self.transactions.insert(tx.txid, tx);
        self
    }

    pub fn fetches(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn best_block_hash(&self) -> anyhow::Result<BlockHash> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tip.ok_or_else(|| anyhow!("no tip configured"))
    }

    async fn block_hash_at_height(&self, height: i64) -> anyhow::Result<BlockHash> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.heights
            .get(&height)
            .copied()
            .ok_or_else(|| anyhow!("block height {height} out of range"))
    }

    async fn block_by_hash(&self, hash: &BlockHash) -> anyhow::Result<RawBlock> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.blocks
            .get(hash)
            .cloned()
            .ok_or_else(|| anyhow!("block {hash} not found"))
    }

    async fn transaction_by_hash(&self, txid: &Txid) -> anyhow::Result<RawTransaction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.transactions
            .get(txid)
            .cloned()
            .ok_or_else(|| anyhow!("transaction {txid} not found"))
    }
}

pub(crate) fn test_txid(n: u8) -> Txid {
    Txid::from_str(&format!("{n:064x}")).unwrap()
}

pub(crate) fn test_block_hash(n: u8) -> BlockHash {
    BlockHash::from_str(&format!("{n:064x}")).unwrap()
}

pub(crate) fn coinbase_input() -> TxInput {
    TxInput {
        txid: None,
        vout: None,
        script_sig: None,
        txinwitness: None,
        sequence: 0xffff_ffff,
        coinbase: Some("04ffff001d0104".to_string()),
    }
}

pub(crate) fn spending_input(txid: Txid, vout: u32) -> TxInput {
    TxInput {
        txid: Some(txid),
        vout: Some(vout),
        script_sig: None,
        txinwitness: None,
        sequence: 0xffff_ffff,
        coinbase: None,
    }
}

pub(crate) fn output(n: u32, value: f64, addresses: &[&str]) -> TxOutput {
    TxOutput {
        value,
        n,
        script_pub_key: ScriptPubKey {
            asm: String::new(),
            hex: String::new(),
            script_type: "pubkeyhash".to_string(),
            address: None,
            addresses: Some(addresses.iter().map(|a| a.to_string()).collect()),
        },
    }
}

pub(crate) fn raw_transaction(txid: Txid, vin: Vec<TxInput>, vout: Vec<TxOutput>) -> RawTransaction {
    RawTransaction {
        txid,
        hash: None,
        hex: None,
        version: 2,
        size: None,
        vsize: None,
        weight: None,
        locktime: 0,
        vin,
        vout,
        blockhash: None,
        confirmations: None,
        time: None,
        blocktime: None,
    }
}

pub(crate) fn raw_block(hash: BlockHash, height: i64, tx: Vec<RawTransaction>) -> RawBlock {
    RawBlock {
        hash,
        confirmations: 1,
        size: 285,
        height,
        version: 1,
        merkleroot: String::new(),
        n_tx: tx.len() as u32,
        tx,
        time: 1_231_006_505,
        mediantime: None,
        nonce: 2_083_236_893,
        bits: "1d00ffff".to_string(),
        difficulty: 1.0,
        previousblockhash: None,
        nextblockhash: None,
    }
}
