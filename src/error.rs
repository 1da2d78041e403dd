use bitcoin::Txid;
use bitcoin::amount::ParseAmountError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid block reference '{0}'")]
    InvalidReference(String),

    #[error("invalid hash '{0}'")]
    InvalidHash(String),

    #[error("transaction {txid} has no output at index {vout}")]
    MissingOutput { txid: Txid, vout: u32 },

    #[error("malformed monetary value {value}")]
    MonetaryParse {
        value: f64,
        #[source]
        source: ParseAmountError,
    },

    #[error(transparent)]
    Node(#[from] anyhow::Error),
}
