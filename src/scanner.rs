use crate::error::RefreshError;
use crate::events::{EntryFailure, EventReconstructor};
use crate::hex::int_to_hex;
use crate::repository::OwnerRecord;
use crate::retry::RetryPolicy;
use crate::rpc::{RpcClient, RpcMethod, Transport};
use std::fmt;
use std::num::NonZeroU64;
use tracing::{debug, info, warn};

/// Public endpoints reject filters spanning more than this many blocks.
pub const DEFAULT_CHUNK_SIZE: NonZeroU64 = match NonZeroU64::new(5000) {
    Some(size) => size,
    None => unreachable!(),
};

/// Inclusive block interval covered by one filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub from: u64,
    pub to: u64,
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}

/// Ascending, contiguous chunks covering `[start, latest]`.
#[derive(Debug, Clone)]
pub struct BlockChunks {
    next: Option<u64>,
    latest: u64,
    width: NonZeroU64,
}

impl BlockChunks {
    pub fn new(start: u64, latest: u64, width: NonZeroU64) -> Self {
        BlockChunks {
            next: Some(start),
            latest,
            width,
        }
    }
}

impl Iterator for BlockChunks {
    type Item = BlockRange;

    fn next(&mut self) -> Option<BlockRange> {
        let from = self.next.filter(|from| *from <= self.latest)?;
        let to = from.saturating_add(self.width.get() - 1).min(self.latest);
        self.next = to.checked_add(1);
        Some(BlockRange { from, to })
    }
}

#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub chunks_scanned: usize,
    pub records: Vec<OwnerRecord>,
    pub failures: Vec<EntryFailure>,
}

pub struct RangeScanner<'a, T> {
    client: &'a RpcClient<T>,
    reconstructor: EventReconstructor<'a, T>,
    contract_address: String,
    topic: String,
    chunk_size: NonZeroU64,
    retry: RetryPolicy,
}

impl<'a, T: Transport> RangeScanner<'a, T> {
    pub fn new(
        client: &'a RpcClient<T>,
        contract_address: String,
        topic: String,
        chunk_size: NonZeroU64,
        retry: RetryPolicy,
    ) -> Self {
        RangeScanner {
            client,
            reconstructor: EventReconstructor::new(client, retry),
            contract_address,
            topic,
            chunk_size,
            retry,
        }
    }

    pub async fn scan(&self, start: u64, latest: u64) -> Result<ScanOutcome, RefreshError> {
        let mut outcome = ScanOutcome::default();

        for range in BlockChunks::new(start, latest, self.chunk_size) {
            self.scan_chunk(range, &mut outcome).await?;
            outcome.chunks_scanned += 1;
        }

        Ok(outcome)
    }

    async fn scan_chunk(
        &self,
        range: BlockRange,
        outcome: &mut ScanOutcome,
    ) -> Result<(), RefreshError> {
        let chunk_err = |source| RefreshError::Chunk { range, source };
        let client = self.client;
        let from_block = int_to_hex(range.from);
        let to_block = int_to_hex(range.to);
        let (from, to) = (from_block.as_str(), to_block.as_str());
        let (address, topic) = (self.contract_address.as_str(), self.topic.as_str());

        debug!("Creating filter for blocks {}", range);
        let filter_id = self
            .retry
            .run(RpcMethod::NewFilter, move || client.new_filter(from, to, address, topic))
            .await
            .map_err(chunk_err)?;

        let filter = filter_id.as_str();
        let logs = self
            .retry
            .run(RpcMethod::GetFilterLogs, move || client.get_filter_logs(filter))
            .await
            .map_err(chunk_err)?;

        info!("Received {} logs for blocks {}", logs.len(), range);

        for log in &logs {
            match self.reconstructor.reconstruct(log).await {
                Ok(record) => {
                    debug!(
                        "New owner {} at block {} (tx {})",
                        record.new_owner_address, record.block_number, record.transaction_hash
                    );
                    outcome.records.push(record);
                }
                Err(failure) => {
                    warn!("Skipping {}", failure);
                    outcome.failures.push(failure);
                }
            }
        }

        Ok(())
    }
}
