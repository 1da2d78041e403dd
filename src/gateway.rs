use std::str::FromStr;
use std::sync::Arc;

use bitcoin::{BlockHash, Txid};
use tracing::debug;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::node::{BitcoindClient, NodeClient};
use crate::types::{RawBlock, RawTransaction};

/// Reference token naming the best-chain tip.
const CURRENT_TIP: &str = "current";
/// Length of a hex-encoded 256-bit hash without prefix.
const HASH_HEX_LEN: usize = 64;

pub(crate) const DEFAULT_MAX_PARALLEL_FETCHES: usize = 8;

/// Stateless data-access layer over a full node. Resolves heterogeneous
/// block references, fetches verbose blocks and transactions, and
/// reconstructs the outputs a transaction's inputs spend.
pub struct Gateway {
    pub(crate) node: Arc<dyn NodeClient>,
    pub(crate) max_parallel_fetches: usize,
}

impl Gateway {
    pub fn new(node: Arc<dyn NodeClient>) -> Self {
        Self {
            node,
            max_parallel_fetches: DEFAULT_MAX_PARALLEL_FETCHES,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(Arc::new(BitcoindClient::from_config(&config.node)))
            .with_max_parallel_fetches(config.core.max_parallel_fetches)
    }

    pub fn with_max_parallel_fetches(mut self, max: usize) -> Self {
        // A bound of zero would stall the fetch stream.
        self.max_parallel_fetches = max.max(1);
        self
    }

    /// Resolves a raw block reference into a canonical block hash.
    ///
    /// Recognized forms, tried in order: the literal `current` (best tip),
    /// a `0x`-prefixed 64-character hex hash, a bare 64-character hex hash,
    /// and a base-10 block height. Anything else is an invalid reference.
    pub async fn resolve_reference(&self, block_ref: &str) -> Result<BlockHash, GatewayError> {
        debug!(block_ref, "resolving block reference");

        if block_ref == CURRENT_TIP {
            return Ok(self.node.best_block_hash().await?);
        }

        if let Some(stripped) = block_ref.strip_prefix("0x") {
            return parse_block_hash(stripped);
        }

        if block_ref.len() == HASH_HEX_LEN {
            return parse_block_hash(block_ref);
        }

        // Either an i64 block height, or garbage input.
        match block_ref.parse::<i64>() {
            Ok(height) => Ok(self.node.block_hash_at_height(height).await?),
            Err(_) => Err(GatewayError::InvalidReference(block_ref.to_string())),
        }
    }

    /// Fetches the verbose block with the given hash. One round-trip, no
    /// retries; node failures surface unchanged.
    pub async fn block_by_hash(&self, hash: &BlockHash) -> Result<RawBlock, GatewayError> {
        Ok(self.node.block_by_hash(hash).await?)
    }

    /// Resolves a block reference and fetches the block it names.
    pub async fn block_by_reference(&self, block_ref: &str) -> Result<RawBlock, GatewayError> {
        let hash = self.resolve_reference(block_ref).await?;
        self.block_by_hash(&hash).await
    }

    /// Fetches the verbose transaction with the given hash. Accepts hashes
    /// with or without a `0x` prefix.
    pub async fn transaction_by_hash(&self, tx_hash: &str) -> Result<RawTransaction, GatewayError> {
        let raw = tx_hash.strip_prefix("0x").unwrap_or(tx_hash);
        let txid =
            Txid::from_str(raw).map_err(|_| GatewayError::InvalidHash(raw.to_string()))?;
        Ok(self.node.transaction_by_hash(&txid).await?)
    }
}

fn parse_block_hash(raw: &str) -> Result<BlockHash, GatewayError> {
    BlockHash::from_str(raw).map_err(|_| GatewayError::InvalidHash(raw.to_string()))
}
