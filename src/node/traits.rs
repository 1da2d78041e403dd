use async_trait::async_trait;
use bitcoin::{BlockHash, Txid};

use crate::types::{RawBlock, RawTransaction};

/// Capability surface the gateway needs from a full node. Implementations
/// must be safe for concurrent use; the builder issues parallel calls.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Hash of the best-chain tip.
    async fn best_block_hash(&self) -> anyhow::Result<BlockHash>;

    /// Hash of the best-chain block at the given height.
    async fn block_hash_at_height(&self, height: i64) -> anyhow::Result<BlockHash>;

    /// Verbose block, embedded transactions included.
    async fn block_by_hash(&self, hash: &BlockHash) -> anyhow::Result<RawBlock>;

    /// Verbose transaction, input/output script analysis included.
    async fn transaction_by_hash(&self, txid: &Txid) -> anyhow::Result<RawTransaction>;
}
