//! JSON-RPC over HTTP transport.

use crate::ports::outbound::ChainTransport;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{Amount, BackendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

/// JSON-RPC response structure.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    /// Error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Structured detail, if the node sent any.
    #[serde(default)]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Convert into the local error vocabulary.
    ///
    /// An insufficient-funds error carries `required` and `available` in
    /// `data` when the node provides them.
    pub fn into_backend_error(self) -> BackendError {
        let err = BackendError::from_rpc(self.code, self.message);
        match (err, self.data) {
            (BackendError::InsufficientFunds { .. }, Some(data)) => {
                let amount = |key: &str| {
                    data.get(key)
                        .and_then(Value::as_str)
                        .and_then(|s| Amount::from_minor_str(s).ok())
                        .unwrap_or_default()
                };
                BackendError::InsufficientFunds {
                    required: amount("required"),
                    available: amount("available"),
                }
            }
            (err, _) => err,
        }
    }
}

/// `ChainTransport` speaking JSON-RPC 2.0 over HTTP POST.
pub struct HttpJsonRpcTransport {
    http_client: reqwest::Client,
    endpoint: String,
    auth_token: Option<String>,
    request_id: AtomicU64,
}

impl HttpJsonRpcTransport {
    /// Create a transport for `endpoint`.
    ///
    /// `request_timeout` bounds the HTTP exchange; the caller's retry policy
    /// applies its own per-call deadline on top.
    pub fn new(
        endpoint: impl Into<String>,
        auth_token: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| BackendError::Transport(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            auth_token,
            request_id: AtomicU64::new(1),
        })
    }

    /// Node URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Decode a JSON-RPC response body.
fn decode_response(method: &str, response: JsonRpcResponse) -> Result<Value, BackendError> {
    if let Some(error) = response.error {
        return Err(error.into_backend_error());
    }
    response
        .result
        .ok_or_else(|| BackendError::Transport(format!("{}: response missing result", method)))
}

#[async_trait]
impl ChainTransport for HttpJsonRpcTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, BackendError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };
        debug!("[fh-backend] -> {} #{}", method, id);

        let mut builder = self.http_client.post(&self.endpoint).json(&request);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::Transport(format!("{}: {}", method, e)))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(BackendError::Transport(format!("{}: HTTP {}", method, status)));
        }

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Transport(format!("{}: bad response: {}", method, e)))?;
        decode_response(method, body)
    }
}
