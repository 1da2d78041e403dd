use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use bitcoin::{BlockHash, Txid};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use crate::node::traits::NodeClient;
use crate::types::{RawBlock, RawTransaction};

/// JSON-RPC client for a Bitcoin Core compatible node.
pub struct BitcoindClient {
    client: reqwest::Client,
    url: String,
    auth: Option<(String, String)>,
    next_id: AtomicU64,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl BitcoindClient {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            auth: None,
            next_id: AtomicU64::new(0),
        }
    }

    pub fn with_auth(mut self, user: String, password: String) -> Self {
        self.auth = Some((user, password));
        self
    }

    pub fn from_config(config: &crate::config::Node) -> Self {
        let client = Self::new(config.rpc_url.clone());
        match (&config.rpc_user, &config.rpc_password) {
            (Some(user), Some(password)) => client.with_auth(user.clone(), password.clone()),
            _ => client,
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> anyhow::Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "issuing node rpc");

        let mut request = self.client.post(&self.url).json(&json!({
            "jsonrpc": "1.0",
            "id": id,
            "method": method,
            "params": params,
        }));
        if let Some((user, password)) = &self.auth {
            request = request.basic_auth(user, Some(password));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        // The node reports RPC failures with a non-2xx status and an error
        // object in the body; prefer the error object when it parses.
        let envelope: RpcResponse<T> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(anyhow!("node returned {status} for '{method}'"));
            }
            Err(e) => return Err(anyhow!("malformed node response for '{method}': {e}")),
        };

        if let Some(error) = envelope.error {
            return Err(anyhow!(
                "node error {} for '{method}': {}",
                error.code,
                error.message
            ));
        }

        envelope
            .result
            .ok_or_else(|| anyhow!("node returned no result for '{method}'"))
    }
}

#[async_trait]
impl NodeClient for BitcoindClient {
    async fn best_block_hash(&self) -> anyhow::Result<BlockHash> {
        self.call("getbestblockhash", json!([])).await
    }

    async fn block_hash_at_height(&self, height: i64) -> anyhow::Result<BlockHash> {
        self.call("getblockhash", json!([height])).await
    }

    async fn block_by_hash(&self, hash: &BlockHash) -> anyhow::Result<RawBlock> {
        // Verbosity 2 embeds full transaction data.
        self.call("getblock", json!([hash.to_string(), 2])).await
    }

    async fn transaction_by_hash(&self, txid: &Txid) -> anyhow::Result<RawTransaction> {
        self.call("getrawtransaction", json!([txid.to_string(), true]))
            .await
    }
}
