//! JSON-RPC 2.0 plumbing.
//!
//! Requests are always `{"jsonrpc":"2.0","id":1,"method":<name>,"params":[]}`.
//! Responses are accepted as `{"result": ...}` or `{"error": {"message": ...}}`.
//! The [`RpcTransport`] trait is the seam between the resolver and the network
//! so the strategy chain can be exercised against in-memory transports.

use crate::error::StrategyError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// RPC method listing cluster nodes.
pub const METHOD_GET_CLUSTER_NODES: &str = "getClusterNodes";

/// RPC method returning cluster info with a nested node list.
pub const METHOD_GET_CLUSTER_INFO: &str = "getClusterInfo";

/// A JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Protocol version, always "2.0"
    pub jsonrpc: String,
    /// Request id, always 1
    pub id: u64,
    /// Method name
    pub method: String,
    /// Positional parameters, always empty here
    pub params: Vec<Value>,
}

impl RpcRequest {
    /// Parameterless request for `method`.
    #[must_use]
    pub fn new(method: &str) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: 1,
            method: method.to_string(),
            params: Vec::new(),
        }
    }
}

/// Extract `result` from a response envelope.
///
/// An `error` member wins over `result`. A missing or null `result` is
/// reported as [`StrategyError::MissingResult`].
pub fn into_result(body: Value) -> Result<Value, StrategyError> {
    let Value::Object(mut envelope) = body else {
        return Err(StrategyError::UnexpectedShape("JSON-RPC envelope object"));
    };

    match envelope.remove("error") {
        None | Some(Value::Null) => {}
        Some(error) => return Err(rpc_error(&error)),
    }

    match envelope.remove("result") {
        None | Some(Value::Null) => Err(StrategyError::MissingResult),
        Some(result) => Ok(result),
    }
}

fn rpc_error(error: &Value) -> StrategyError {
    let code = error.get("code").and_then(Value::as_i64);
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .filter(|m| !m.is_empty())
        .unwrap_or("RPC error")
        .to_string();
    StrategyError::Rpc { code, message }
}

/// Sends one JSON-RPC request and returns the decoded response body.
///
/// Implementations report transport, HTTP status and JSON decoding failures.
/// Interpreting the envelope is left to the caller, and so is the time budget:
/// the resolver cancels the returned future when it expires.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// POST `request` to `endpoint`.
    async fn call(&self, endpoint: &str, request: &RpcRequest) -> Result<Value, StrategyError>;
}

/// [`RpcTransport`] over HTTP(S) using reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with its own connection pool.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pnode-status/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, endpoint: &str, request: &RpcRequest) -> Result<Value, StrategyError> {
        debug!(endpoint, method = %request.method, "sending JSON-RPC request");

        let response = self
            .client
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| StrategyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StrategyError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StrategyError::Transport(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| StrategyError::Decode(e.to_string()))
    }
}
