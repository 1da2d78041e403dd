use bitcoin::{Amount, Txid};
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::types::{AddressCandidates, TxInput, TxOutput, Utxo, UtxoMap};

impl Gateway {
    /// Reconstructs the outputs spent by the given input list.
    ///
    /// Coinbase inputs are skipped; every other input costs one node
    /// round-trip to its source transaction, issued with bounded
    /// concurrency. All or nothing: the first failure aborts the build and
    /// no partial map is returned.
    pub async fn build_utxo_map(&self, vin: &[TxInput]) -> Result<UtxoMap, GatewayError> {
        let outpoints: Vec<(Txid, u32)> = vin.iter().filter_map(TxInput::outpoint).collect();

        debug!(
            inputs = vin.len(),
            spending = outpoints.len(),
            "building utxo map"
        );

        let resolved: Vec<(Txid, u32, Utxo)> = stream::iter(outpoints)
            .map(|(txid, vout)| self.resolve_spent_output(txid, vout))
            .buffered(self.max_parallel_fetches)
            .try_collect()
            .await?;

        let mut utxo_map = UtxoMap::new();
        for (txid, vout, utxo) in resolved {
            utxo_map.entry(txid).or_default().insert(vout, utxo);
        }
        Ok(utxo_map)
    }

    async fn resolve_spent_output(
        &self,
        txid: Txid,
        vout: u32,
    ) -> Result<(Txid, u32, Utxo), GatewayError> {
        let source = self.node.transaction_by_hash(&txid).await?;
        let output = source
            .vout
            .get(vout as usize)
            .ok_or(GatewayError::MissingOutput { txid, vout })?;

        Ok((txid, vout, resolve_utxo(&txid, vout, output)?))
    }
}

fn resolve_utxo(txid: &Txid, vout: u32, output: &TxOutput) -> Result<Utxo, GatewayError> {
    let address = match output.script_pub_key.candidates() {
        AddressCandidates::Single(address) => Some(address),
        AddressCandidates::None => {
            warn!(
                %txid,
                vout,
                script_type = %output.script_pub_key.script_type,
                "source output reports no owning address"
            );
            None
        }
        AddressCandidates::Multiple(addresses) => {
            warn!(
                %txid,
                vout,
                candidates = addresses.len(),
                "source output reports multiple owning addresses, omitting address"
            );
            None
        }
    };

    Ok(Utxo {
        value: parse_satoshi(output.value)?,
        address,
    })
}

/// Converts a node-reported BTC value into satoshis. Malformed values are an
/// error, never a panic; one bad upstream amount must not take the caller
/// down.
fn parse_satoshi(value: f64) -> Result<u64, GatewayError> {
    Amount::from_btc(value)
        .map(Amount::to_sat)
        .map_err(|source| GatewayError::MonetaryParse { value, source })
}
