use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{json, Value};

/// EIP-1193 error code returned by `wallet_switchEthereumChain` for a chain the wallet does not know.
pub const UNRECOGNIZED_CHAIN: i64 = 4902;
/// EIP-1193 error code for a request the user declined.
pub const USER_REJECTED: i64 = 4001;
/// JSON-RPC internal error, used for transport failures.
pub const INTERNAL_ERROR: i64 = -32603;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Deserialize)]
#[error("{message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }
}

/// The wallet as the page sees it: a single `request` entry point.
///
/// Account access, chain switching and transaction signing all happen on the wallet side,
/// possibly behind a prompt to the user.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;
}

pub type SharedProvider = Arc<dyn WalletProvider>;

/// Looks for a wallet endpoint. `None` is the equivalent of no injected provider.
pub fn detect_provider(rpc_url: Option<&str>) -> Option<SharedProvider> {
    let rpc_url = rpc_url.map(str::trim).filter(|url| !url.is_empty())?;

    match HttpWalletProvider::new(rpc_url) {
        Ok(provider) => {
            tracing::info!(url = rpc_url, "wallet provider detected");
            Some(Arc::new(provider))
        }
        Err(e) => {
            tracing::warn!(url = rpc_url, "ignoring wallet provider with invalid url: {e}");
            None
        }
    }
}

/// Wallet reachable through JSON-RPC 2.0 over HTTP.
pub struct HttpWalletProvider {
    client: Client,
    url: Url,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ProviderError>,
}

impl HttpWalletProvider {
    pub fn new(url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            client: Client::new(),
            url: Url::parse(url)?,
            next_id: AtomicU64::new(1),
        })
    }
}

#[async_trait]
impl WalletProvider for HttpWalletProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(id, method, "wallet request");

        let response = self
            .client
            .post(self.url.clone())
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::internal(e.to_string()))?;

        let status = response.status();
        let body = response
            .json::<RpcResponse>()
            .await
            .map_err(|e| ProviderError::internal(format!("invalid wallet response ({status}): {e}")))?;

        match body {
            RpcResponse { error: Some(error), .. } => Err(error),
            RpcResponse { result, .. } => Ok(result.unwrap_or(Value::Null)),
        }
    }
}
