use crate::scanner::BlockRange;
use thiserror::Error;

/// A hex field on the wire that could not be parsed into a `u64`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed hex value {0:?}")]
pub struct MalformedHex(pub String);

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("transport error on {method}: {reason}")]
    Transport { method: &'static str, reason: String },

    #[error("{method} returned JSON-RPC error {code}: {message}")]
    Protocol {
        method: &'static str,
        code: i64,
        message: String,
    },

    #[error("failed to decode {method} response: {reason}")]
    Decode { method: &'static str, reason: String },

    #[error(transparent)]
    MalformedHex(#[from] MalformedHex),
}

impl RpcError {
    /// Only transport failures are worth retrying; everything else is deterministic.
    pub fn is_transport(&self) -> bool {
        matches!(self, RpcError::Transport { .. })
    }
}

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("failed to discover chain height: {0}")]
    Height(#[source] RpcError),

    #[error("scan of blocks {range} failed: {source}")]
    Chunk {
        range: BlockRange,
        #[source]
        source: RpcError,
    },

    #[error("record store failed: {0:#}")]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RpcError>;
