use crate::error::{Result, RpcError};
use anyhow::Context;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Moves one serialized JSON-RPC request to the endpoint and returns the raw response body.
pub trait Transport {
    fn post(&self, body: String) -> impl Future<Output = anyhow::Result<String>> + Send;
}

impl<T: Transport + Sync + ?Sized> Transport for &T {
    fn post(&self, body: String) -> impl Future<Output = anyhow::Result<String>> + Send {
        (**self).post(body)
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: &str, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpTransport {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    async fn post(&self, body: String) -> anyhow::Result<String> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", self.url))?
            .error_for_status()?;

        response
            .text()
            .await
            .context("Failed to read response body")
    }
}

/// The `result` field varies by method, so every method declares which shape it expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Scalar,
    Logs,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcMethod {
    BlockNumber,
    NewFilter,
    GetFilterLogs,
    GetBlockByNumber,
}

impl RpcMethod {
    pub fn name(self) -> &'static str {
        match self {
            RpcMethod::BlockNumber => "eth_blockNumber",
            RpcMethod::NewFilter => "eth_newFilter",
            RpcMethod::GetFilterLogs => "eth_getFilterLogs",
            RpcMethod::GetBlockByNumber => "eth_getBlockByNumber",
        }
    }

    pub fn shape(self) -> ResponseShape {
        match self {
            RpcMethod::BlockNumber | RpcMethod::NewFilter => ResponseShape::Scalar,
            RpcMethod::GetFilterLogs => ResponseShape::Logs,
            RpcMethod::GetBlockByNumber => ResponseShape::Block,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub block_number: String,
    pub transaction_hash: String,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockHeader {
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcResult {
    Scalar(String),
    Logs(Vec<LogEntry>),
    Block(BlockHeader),
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: &'a Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

/// Decodes a raw response body against the shape `method` expects.
pub fn decode_response(method: RpcMethod, body: &str) -> Result<RpcResult> {
    let name = method.name();
    let decode_err = |reason: String| RpcError::Decode {
        method: name,
        reason,
    };

    let response: RpcResponse =
        serde_json::from_str(body).map_err(|e| decode_err(format!("invalid JSON: {e}")))?;

    if let Some(RpcErrorObject {
        code: Some(code),
        message,
    }) = response.error
    {
        return Err(RpcError::Protocol {
            method: name,
            code,
            message,
        });
    }

    let result = match response.result {
        Some(Value::Null) | None => return Err(decode_err("missing result".to_string())),
        Some(result) => result,
    };

    let decoded = match method.shape() {
        ResponseShape::Scalar => match result {
            Value::String(s) => RpcResult::Scalar(s),
            other => return Err(decode_err(format!("expected a string result, got {other}"))),
        },
        ResponseShape::Logs => RpcResult::Logs(
            serde_json::from_value(result).map_err(|e| decode_err(format!("bad log list: {e}")))?,
        ),
        ResponseShape::Block => RpcResult::Block(
            serde_json::from_value(result)
                .map_err(|e| decode_err(format!("bad block header: {e}")))?,
        ),
    };

    Ok(decoded)
}

pub struct RpcClient<T> {
    transport: T,
    next_id: AtomicU64,
}

impl<T: Transport> RpcClient<T> {
    pub fn new(transport: T) -> Self {
        RpcClient {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn call(&self, method: RpcMethod, params: Value) -> Result<RpcResult> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: method.name(),
            params: &params,
        };
        let body = serde_json::to_string(&request).map_err(|e| RpcError::Decode {
            method: method.name(),
            reason: format!("cannot encode request: {e}"),
        })?;

        debug!("-> {} {}", method.name(), params);

        let response = self
            .transport
            .post(body)
            .await
            .map_err(|e| RpcError::Transport {
                method: method.name(),
                reason: format!("{e:#}"),
            })?;

        decode_response(method, &response)
    }

    pub async fn block_number(&self) -> Result<String> {
        match self.call(RpcMethod::BlockNumber, json!([])).await? {
            RpcResult::Scalar(height) => Ok(height),
            other => Err(unexpected(RpcMethod::BlockNumber, &other)),
        }
    }

    pub async fn new_filter(
        &self,
        from_block: &str,
        to_block: &str,
        address: &str,
        topic: &str,
    ) -> Result<String> {
        let params = json!([{
            "fromBlock": from_block,
            "toBlock": to_block,
            "address": address,
            "topics": [topic],
        }]);

        match self.call(RpcMethod::NewFilter, params).await? {
            RpcResult::Scalar(filter_id) => Ok(filter_id),
            other => Err(unexpected(RpcMethod::NewFilter, &other)),
        }
    }

    pub async fn get_filter_logs(&self, filter_id: &str) -> Result<Vec<LogEntry>> {
        match self.call(RpcMethod::GetFilterLogs, json!([filter_id])).await? {
            RpcResult::Logs(logs) => Ok(logs),
            other => Err(unexpected(RpcMethod::GetFilterLogs, &other)),
        }
    }

    pub async fn get_block_by_number(&self, block_number: &str) -> Result<BlockHeader> {
        let params = json!([block_number, false]);
        match self.call(RpcMethod::GetBlockByNumber, params).await? {
            RpcResult::Block(header) => Ok(header),
            other => Err(unexpected(RpcMethod::GetBlockByNumber, &other)),
        }
    }
}

fn unexpected(method: RpcMethod, result: &RpcResult) -> RpcError {
    RpcError::Decode {
        method: method.name(),
        reason: format!("unexpected result shape {result:?}"),
    }
}
