#![allow(dead_code)]

use owner_collector::config::Config;
use owner_collector::hex::{hex_to_int, int_to_hex};
use owner_collector::retry::RetryPolicy;
use owner_collector::rpc::Transport;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const DEPLOY_BLOCK: u64 = 14_599_911;
pub const GENESIS_TIME: u64 = 1_649_846_400;
pub const OWNER_SET_TOPIC: &str =
    "0x342827c97908e5e2f71151c08502a66d44b6f758e3ac2f1de95f02eb95f0a735";

#[derive(Debug, Clone)]
pub struct MockLog {
    pub block: u64,
    pub tx: String,
    pub owner: String,
}

pub fn owner_address(n: u64) -> String {
    format!("0x{n:040x}")
}

pub fn log_at(block: u64, n: u64) -> MockLog {
    MockLog {
        block,
        tx: format!("0x{n:064x}"),
        owner: owner_address(n),
    }
}

pub fn block_time(block: u64) -> u64 {
    GENESIS_TIME + (block - DEPLOY_BLOCK) * 3
}

pub fn test_config() -> Config {
    let mut config = Config::new("http://localhost:8545", "sqlite::memory:");
    config.retry = RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(1),
    };
    config
}

/// In-process JSON-RPC endpoint serving a fixed set of owner-change logs.
#[derive(Default)]
pub struct MockChain {
    height: u64,
    logs: Vec<MockLog>,
    failing_blocks: HashSet<u64>,
    bad_timestamps: HashSet<u64>,
    failing_method: Mutex<Option<&'static str>>,
    transport_failures: AtomicUsize,
    filters: Mutex<HashMap<String, (u64, u64)>>,
    requests: Mutex<Vec<Value>>,
}

impl MockChain {
    pub fn new(height: u64, logs: Vec<MockLog>) -> Self {
        MockChain {
            height,
            logs,
            ..Default::default()
        }
    }

    /// `eth_getBlockByNumber` for this block answers with a JSON-RPC error.
    pub fn with_failing_block(mut self, block: u64) -> Self {
        self.failing_blocks.insert(block);
        self
    }

    pub fn with_bad_timestamp(mut self, block: u64) -> Self {
        self.bad_timestamps.insert(block);
        self
    }

    pub fn with_transport_failures(self, count: usize) -> Self {
        self.transport_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn fail_method(&self, method: Option<&'static str>) {
        *self.failing_method.lock().unwrap() = method;
    }

    pub fn methods(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r["method"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    pub fn requests_for(&self, method: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r["method"] == method)
            .cloned()
            .collect()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn answer(&self, method: &str, params: &Value) -> Result<Value, (i64, String)> {
        match method {
            "eth_blockNumber" => Ok(json!(int_to_hex(self.height))),
            "eth_newFilter" => {
                let from = hex_to_int(params[0]["fromBlock"].as_str().unwrap()).unwrap();
                let to = hex_to_int(params[0]["toBlock"].as_str().unwrap()).unwrap();
                let mut filters = self.filters.lock().unwrap();
                let id = int_to_hex(filters.len() as u64 + 1);
                filters.insert(id.clone(), (from, to));
                Ok(json!(id))
            }
            "eth_getFilterLogs" => {
                let id = params[0].as_str().unwrap();
                let Some((from, to)) = self.filters.lock().unwrap().get(id).copied() else {
                    return Err((-32000, "filter not found".to_string()));
                };
                let logs: Vec<Value> = self
                    .logs
                    .iter()
                    .filter(|log| log.block >= from && log.block <= to)
                    .map(|log| {
                        json!({
                            "address": "0x98b3f2219a2b7a047b6234c19926673ad4aac83a",
                            "blockNumber": int_to_hex(log.block),
                            "transactionHash": log.tx,
                            "logIndex": "0x0",
                            "removed": false,
                            "data": "0x",
                            "topics": [
                                OWNER_SET_TOPIC,
                                format!("0x{:0>64}", "0"),
                                format!("0x{:0>64}", log.owner.trim_start_matches("0x")),
                            ],
                        })
                    })
                    .collect();
                Ok(json!(logs))
            }
            "eth_getBlockByNumber" => {
                let block = hex_to_int(params[0].as_str().unwrap()).unwrap();
                if self.failing_blocks.contains(&block) {
                    return Err((-32000, "header not found".to_string()));
                }
                let timestamp = if self.bad_timestamps.contains(&block) {
                    "0xnothex".to_string()
                } else {
                    int_to_hex(block_time(block))
                };
                Ok(json!({
                    "number": int_to_hex(block),
                    "hash": format!("0x{block:064x}"),
                    "timestamp": timestamp,
                }))
            }
            other => Err((-32601, format!("method {other} not found"))),
        }
    }
}

impl Transport for MockChain {
    async fn post(&self, body: String) -> anyhow::Result<String> {
        let request: Value = serde_json::from_str(&body)?;
        self.requests.lock().unwrap().push(request.clone());

        let pending = self.transport_failures.load(Ordering::SeqCst);
        if pending > 0 {
            self.transport_failures.store(pending - 1, Ordering::SeqCst);
            anyhow::bail!("connection refused");
        }

        let method = request["method"].as_str().unwrap_or_default();
        let forced = *self.failing_method.lock().unwrap();
        let answer = if forced == Some(method) {
            Err((-32005, "limit exceeded".to_string()))
        } else {
            self.answer(method, &request["params"])
        };

        let response = match answer {
            Ok(result) => json!({"jsonrpc": "2.0", "id": request["id"], "result": result}),
            Err((code, message)) => json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "error": {"code": code, "message": message},
            }),
        };
        Ok(response.to_string())
    }
}
