use crate::error::{Result, RpcError};
use crate::rpc::RpcMethod;
use std::future::Future;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::warn;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Bounded backoff applied by the refresh pipeline around individual RPC calls.
///
/// Only [`RpcError::Transport`] failures are retried. A JSON-RPC error object or an
/// undecodable body would come back the same way on every attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    fn strategy(&self) -> impl Iterator<Item = Duration> {
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        // delay is current * factor and current doubles, so attempts wait base, 2*base, 4*base..
        ExponentialBackoff::from_millis(2)
            .factor((base_ms / 2).max(1))
            .max_delay(MAX_RETRY_DELAY)
            .map(jitter)
            .take(self.max_retries)
    }

    pub async fn run<T, F, Fut>(&self, method: RpcMethod, action: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        RetryIf::start(self.strategy(), action, |e: &RpcError| {
            let retry = e.is_transport();
            if retry {
                warn!("{} failed, retrying: {}", method.name(), e);
            }
            retry
        })
        .await
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}
