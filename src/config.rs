use crate::retry::RetryPolicy;
use crate::scanner::DEFAULT_CHUNK_SIZE;
use alloy_primitives::{Address, B256, address, b256};
use anyhow::{Context, Result};
use std::num::NonZeroU64;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_RPC_URL: &str = "https://data-seed-prebsc-1-s1.binance.org:8545/";
pub const DEFAULT_CONTRACT_ADDRESS: Address =
    address!("0x98b3f2219a2b7a047B6234c19926673ad4aac83A");
/// `OwnerSet(address,address)`
pub const DEFAULT_OWNER_CHANGE_TOPIC: B256 =
    b256!("0x342827c97908e5e2f71151c08502a66d44b6f758e3ac2f1de95f02eb95f0a735");
pub const DEFAULT_DEPLOY_BLOCK: u64 = 14_599_911;

#[derive(Debug, Clone)]
pub struct Config {
    pub json_rpc_url: String,
    pub contract_address: Address,
    pub owner_change_topic: B256,
    pub deploy_block: u64,
    pub chunk_size: NonZeroU64,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let json_rpc_url = std::env::var("JSON_RPC_URL")
            .unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());

        let contract_address = match std::env::var("CONTRACT_ADDRESS") {
            Ok(value) => {
                Address::from_str(&value).context("Invalid CONTRACT_ADDRESS format")?
            }
            Err(_) => DEFAULT_CONTRACT_ADDRESS,
        };

        let owner_change_topic = match std::env::var("OWNER_CHANGE_TOPIC") {
            Ok(value) => B256::from_str(&value).context("Invalid OWNER_CHANGE_TOPIC format")?,
            Err(_) => DEFAULT_OWNER_CHANGE_TOPIC,
        };

        let deploy_block = parse_var("DEPLOY_BLOCK", DEFAULT_DEPLOY_BLOCK)?;

        let chunk_size = NonZeroU64::new(parse_var("CHUNK_SIZE", DEFAULT_CHUNK_SIZE.get())?)
            .context("CHUNK_SIZE must be greater than zero")?;

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_retries: parse_var("RPC_MAX_RETRIES", defaults.max_retries)?,
            base_delay: Duration::from_millis(parse_var(
                "RPC_RETRY_BASE_MS",
                u64::try_from(defaults.base_delay.as_millis())?,
            )?),
        };

        let request_timeout = Duration::from_secs(parse_var("RPC_TIMEOUT_SECS", 30)?);

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./collector.sqlite".to_string());

        Ok(Config {
            json_rpc_url,
            contract_address,
            owner_change_topic,
            deploy_block,
            chunk_size,
            retry,
            request_timeout,
            database_url,
        })
    }

    /// Defaults for everything except where the data lives.
    pub fn new(json_rpc_url: &str, database_url: &str) -> Self {
        Config {
            json_rpc_url: json_rpc_url.to_string(),
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            owner_change_topic: DEFAULT_OWNER_CHANGE_TOPIC,
            deploy_block: DEFAULT_DEPLOY_BLOCK,
            chunk_size: DEFAULT_CHUNK_SIZE,
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
            database_url: database_url.to_string(),
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("Invalid {name}: {value:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_owner_contract() {
        let config = Config::new(DEFAULT_RPC_URL, "sqlite::memory:");
        assert_eq!(config.deploy_block, 14_599_911);
        assert_eq!(config.chunk_size.get(), 5000);
        assert_eq!(
            format!("{:?}", config.contract_address),
            "0x98b3f2219a2b7a047b6234c19926673ad4aac83a"
        );
        assert_eq!(
            format!("{:?}", config.owner_change_topic),
            "0x342827c97908e5e2f71151c08502a66d44b6f758e3ac2f1de95f02eb95f0a735"
        );
    }
}
