use crate::error::{Result, RpcError};
use crate::hex::hex_to_int;
use crate::repository::OwnerRecord;
use crate::retry::RetryPolicy;
use crate::rpc::{LogEntry, RpcClient, RpcMethod, Transport};
use std::fmt;

/// Topic slot of `newOwner` in `OwnerSet(address indexed oldOwner, address indexed newOwner)`.
pub const NEW_OWNER_TOPIC_INDEX: usize = 2;

/// An address is 20 bytes left-padded into a 32-byte topic: 24 hex zeros, then 40 hex chars.
const ADDRESS_PADDING: &str = "000000000000000000000000";

pub fn extract_new_owner(topic: &str) -> Result<String> {
    let malformed = |reason: &str| RpcError::Decode {
        method: RpcMethod::GetFilterLogs.name(),
        reason: format!("owner topic {topic:?} {reason}"),
    };

    let word = topic
        .strip_prefix("0x")
        .ok_or_else(|| malformed("is missing the 0x prefix"))?;
    if word.len() != 64 || !word.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(malformed("is not a 32-byte hex word"));
    }
    let address = word
        .strip_prefix(ADDRESS_PADDING)
        .ok_or_else(|| malformed("does not hold a left-padded address"))?;

    Ok(format!("0x{address}"))
}

/// A log entry that could not be turned into a record. The scan carries on without it.
#[derive(Debug)]
pub struct EntryFailure {
    pub block_number: String,
    pub transaction_hash: String,
    pub error: RpcError,
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "log in tx {} (block {}): {}",
            self.transaction_hash, self.block_number, self.error
        )
    }
}

pub struct EventReconstructor<'a, T> {
    client: &'a RpcClient<T>,
    retry: RetryPolicy,
}

impl<'a, T: Transport> EventReconstructor<'a, T> {
    pub fn new(client: &'a RpcClient<T>, retry: RetryPolicy) -> Self {
        EventReconstructor { client, retry }
    }

    pub async fn reconstruct(
        &self,
        log: &LogEntry,
    ) -> std::result::Result<OwnerRecord, EntryFailure> {
        self.try_reconstruct(log).await.map_err(|error| EntryFailure {
            block_number: log.block_number.clone(),
            transaction_hash: log.transaction_hash.clone(),
            error,
        })
    }

    async fn try_reconstruct(&self, log: &LogEntry) -> Result<OwnerRecord> {
        let topic = log
            .topics
            .get(NEW_OWNER_TOPIC_INDEX)
            .ok_or_else(|| RpcError::Decode {
                method: RpcMethod::GetFilterLogs.name(),
                reason: format!("log has {} topics, new owner missing", log.topics.len()),
            })?;
        let new_owner_address = extract_new_owner(topic)?;

        let client = self.client;
        let block_number = log.block_number.as_str();
        let header = self
            .retry
            .run(RpcMethod::GetBlockByNumber, move || client.get_block_by_number(block_number))
            .await?;
        let timestamp = hex_to_int(&header.timestamp)?;

        Ok(OwnerRecord {
            new_owner_address,
            timestamp: timestamp.to_string(),
            transaction_hash: log.transaction_hash.clone(),
            block_number: log.block_number.clone(),
        })
    }
}
