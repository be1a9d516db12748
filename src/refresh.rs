//! End-to-end refresh: chain height, full-history scan, atomic replace of the stored owners.

use crate::config::Config;
use crate::error::{RefreshError, RpcError};
use crate::events::EntryFailure;
use crate::hex::hex_to_int;
use crate::repository::{Database, OwnerRepository};
use crate::rpc::{RpcClient, RpcMethod, Transport};
use crate::scanner::RangeScanner;
use std::time::Instant;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Scanning,
    Failed,
}

#[derive(Debug)]
pub struct RefreshReport {
    pub latest_block: u64,
    pub chunks_scanned: usize,
    pub records_written: usize,
    /// Entries skipped because their record could not be rebuilt.
    pub failures: Vec<EntryFailure>,
}

pub struct Refresher<T> {
    config: Config,
    client: RpcClient<T>,
    state: RefreshState,
}

impl<T: Transport> Refresher<T> {
    pub fn new(config: Config, transport: T) -> Self {
        Refresher {
            config,
            client: RpcClient::new(transport),
            state: RefreshState::Idle,
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Rescans the whole history from the deploy block and replaces the stored owners.
    ///
    /// Every call is an independent full pass. On failure the previously stored set is
    /// left untouched and the state becomes [`RefreshState::Failed`].
    pub async fn refresh(&mut self, db: &Database) -> Result<RefreshReport, RefreshError> {
        self.state = RefreshState::Scanning;

        match self.run(db).await {
            Ok(report) => {
                self.state = RefreshState::Idle;
                Ok(report)
            }
            Err(e) => {
                error!("Refresh failed: {}", e);
                self.state = RefreshState::Failed;
                Err(e)
            }
        }
    }

    async fn run(&self, db: &Database) -> Result<RefreshReport, RefreshError> {
        let started = Instant::now();
        let client = &self.client;

        let latest_block = self
            .config
            .retry
            .run(RpcMethod::BlockNumber, move || client.block_number())
            .await
            .and_then(|height| hex_to_int(&height).map_err(RpcError::from))
            .map_err(RefreshError::Height)?;

        info!(
            "Scanning blocks {} to {} for owner changes",
            self.config.deploy_block, latest_block
        );

        let scanner = RangeScanner::new(
            client,
            format!("{:?}", self.config.contract_address),
            format!("{:?}", self.config.owner_change_topic),
            self.config.chunk_size,
            self.config.retry,
        );
        let outcome = scanner.scan(self.config.deploy_block, latest_block).await?;

        let repo = OwnerRepository::new(&db.conn);
        let records_written = repo.replace_all(&outcome.records)?;

        if !outcome.failures.is_empty() {
            warn!(
                "{} log entries could not be reconstructed and were skipped",
                outcome.failures.len()
            );
        }
        info!(
            "Stored {} owner records from {} chunks in {:?}",
            records_written,
            outcome.chunks_scanned,
            started.elapsed()
        );

        Ok(RefreshReport {
            latest_block,
            chunks_scanned: outcome.chunks_scanned,
            records_written,
            failures: outcome.failures,
        })
    }
}
