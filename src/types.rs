use std::collections::HashMap;

use bitcoin::{BlockHash, Txid};
use serde::{Deserialize, Serialize};

/// Verbose block as reported by the node, embedded transactions included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBlock {
    pub hash: BlockHash,
    pub confirmations: i64,
    pub size: u32,
    pub height: i64,
    pub version: i32,
    pub merkleroot: String,
    pub tx: Vec<RawTransaction>,
    pub time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mediantime: Option<u32>,
    pub nonce: u32,
    pub bits: String,
    pub difficulty: f64,
    #[serde(rename = "nTx")]
    pub n_tx: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previousblockhash: Option<BlockHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nextblockhash: Option<BlockHash>,
}

/// Verbose transaction as reported by the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    pub txid: Txid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<Txid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
    pub version: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vsize: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    pub locktime: u32,
    pub vin: Vec<TxInput>,
    pub vout: Vec<TxOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockhash: Option<BlockHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocktime: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txid: Option<Txid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vout: Option<u32>,
    #[serde(rename = "scriptSig", skip_serializing_if = "Option::is_none")]
    pub script_sig: Option<ScriptSig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txinwitness: Option<Vec<String>>,
    pub sequence: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coinbase: Option<String>,
}

impl TxInput {
    pub fn is_coinbase(&self) -> bool {
        self.coinbase.is_some()
    }

    /// The `(source txid, output index)` pair consumed by a spending input.
    /// Coinbase inputs have no prior output and yield `None`.
    pub fn outpoint(&self) -> Option<(Txid, u32)> {
        if self.is_coinbase() {
            return None;
        }
        match (self.txid, self.vout) {
            (Some(txid), Some(vout)) => Some((txid, vout)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptSig {
    pub asm: String,
    pub hex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxOutput {
    /// Value in BTC, exactly as the node reports it.
    pub value: f64,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptPubKey {
    pub asm: String,
    pub hex: String,
    #[serde(rename = "type")]
    pub script_type: String,
    /// Single owning address, reported by Bitcoin Core 22 and later.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Candidate address list, reported by older nodes and address-indexing forks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<String>>,
}

impl ScriptPubKey {
    /// Folds both address report formats into one case analysis. The legacy
    /// list wins when present since it can carry the multi-party case.
    pub fn candidates(&self) -> AddressCandidates {
        if let Some(addresses) = &self.addresses {
            return AddressCandidates::from_list(addresses.clone());
        }
        match &self.address {
            Some(address) => AddressCandidates::Single(address.clone()),
            None => AddressCandidates::None,
        }
    }
}

/// Owning-address report of a script, by candidate count. Scripts the node
/// cannot attribute (non-standard) yield `None`; multi-party scripts yield
/// `Multiple`, which a single-address field cannot represent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressCandidates {
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl AddressCandidates {
    pub fn from_list(mut addresses: Vec<String>) -> Self {
        match addresses.len() {
            0 => Self::None,
            1 => Self::Single(addresses.remove(0)),
            _ => Self::Multiple(addresses),
        }
    }

    /// The unambiguous owning address, if there is exactly one.
    pub fn into_single(self) -> Option<String> {
        match self {
            Self::Single(address) => Some(address),
            _ => None,
        }
    }
}

/// A spent output reconstructed from its source transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Value in satoshis.
    pub value: u64,
    /// Omitted from serialized output when the owner is unknown or ambiguous.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Spent outputs keyed by source transaction, then by output index.
pub type UtxoMap = HashMap<Txid, HashMap<u32, Utxo>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn utxo_serialization_omits_unknown_address() {
        let utxo = Utxo {
            value: 5000,
            address: None,
        };
        assert_eq!(serde_json::to_value(&utxo).unwrap(), json!({"value": 5000}));

        let utxo = Utxo {
            value: 5000,
            address: Some("addr1".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&utxo).unwrap(),
            json!({"value": 5000, "address": "addr1"})
        );
    }

    #[test]
    fn candidates_prefer_legacy_list() {
        let script = ScriptPubKey {
            asm: String::new(),
            hex: String::new(),
            script_type: "multisig".to_string(),
            address: Some("modern".to_string()),
            addresses: Some(vec!["a".to_string(), "b".to_string()]),
        };
        assert_eq!(
            script.candidates(),
            AddressCandidates::Multiple(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn candidates_fall_back_to_single_address_field() {
        let script = ScriptPubKey {
            asm: String::new(),
            hex: String::new(),
            script_type: "witness_v0_keyhash".to_string(),
            address: Some("bc1qexample".to_string()),
            addresses: None,
        };
        assert_eq!(
            script.candidates().into_single(),
            Some("bc1qexample".to_string())
        );
    }

    #[test]
    fn candidates_from_list_cases() {
        assert_eq!(AddressCandidates::from_list(vec![]), AddressCandidates::None);
        assert_eq!(
            AddressCandidates::from_list(vec!["a".to_string()]),
            AddressCandidates::Single("a".to_string())
        );
        assert!(matches!(
            AddressCandidates::from_list(vec!["a".to_string(), "b".to_string()]),
            AddressCandidates::Multiple(_)
        ));
    }

    #[test]
    fn deserializes_coinbase_input() {
        let input: TxInput = serde_json::from_value(json!({
            "coinbase": "04ffff001d0104",
            "sequence": 4294967295u32
        }))
        .unwrap();

        assert!(input.is_coinbase());
        assert_eq!(input.outpoint(), None);
    }

    #[test]
    fn deserializes_spending_input() {
        let input: TxInput = serde_json::from_value(json!({
            "txid": "5a4ebf66822b0b2d56bd9dc64ece0bc38ee7844a23ff1d7320a88c5fdb2ad3e2",
            "vout": 1,
            "scriptSig": {"asm": "", "hex": ""},
            "sequence": 4294967295u32
        }))
        .unwrap();

        assert!(!input.is_coinbase());
        let (txid, vout) = input.outpoint().unwrap();
        assert_eq!(
            txid.to_string(),
            "5a4ebf66822b0b2d56bd9dc64ece0bc38ee7844a23ff1d7320a88c5fdb2ad3e2"
        );
        assert_eq!(vout, 1);
    }

    #[test]
    fn deserializes_verbose_output() {
        let output: TxOutput = serde_json::from_value(json!({
            "value": 0.00005,
            "n": 0,
            "scriptPubKey": {
                "asm": "OP_DUP OP_HASH160 ...",
                "hex": "76a914...",
                "type": "pubkeyhash",
                "addresses": ["addr1"]
            }
        }))
        .unwrap();

        assert_eq!(output.value, 0.00005);
        assert_eq!(
            output.script_pub_key.candidates(),
            AddressCandidates::Single("addr1".to_string())
        );
    }
}
