use serde::Serialize;
use serde_json::{json, Value};

use super::{
    provider::{WalletProvider, UNRECOGNIZED_CHAIN},
    Error, Result,
};

#[derive(Debug, Clone, Serialize)]
pub struct NativeCurrency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

/// Descriptor of the single network the application mints on.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub chain_name: &'static str,
    pub native_currency: NativeCurrency,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
}

pub static EDU_CHAIN: NetworkConfig = NetworkConfig {
    chain_id: 656476,
    chain_name: "EDU Chain Testnet",
    native_currency: NativeCurrency {
        name: "EDU",
        symbol: "EDU",
        decimals: 18,
    },
    rpc_url: "https://rpc.edu.eluv.io",
    explorer_url: "https://testnet.eduscan.io",
};

impl NetworkConfig {
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }

    /// Parameter of `wallet_addEthereumChain`.
    pub fn add_chain_params(&self) -> Value {
        json!({
            "chainId": self.chain_id_hex(),
            "chainName": self.chain_name,
            "nativeCurrency": self.native_currency,
            "rpcUrls": [self.rpc_url],
            "blockExplorerUrls": [self.explorer_url],
        })
    }
}

/// Chain the wallet is currently attached to.
pub async fn current_chain_id(provider: &dyn WalletProvider) -> Result<u64> {
    let value = provider
        .request("eth_chainId", json!([]))
        .await
        .map_err(|e| Error::NetworkSwitch(format!("Could not read the current network: {e}")))?;

    parse_quantity(&value).ok_or_else(|| Error::NetworkSwitch(format!("Unexpected chain id: {value}")))
}

/// Attaches the wallet to `network`, registering the chain first if the wallet does not
/// know it. A wallet already on the network is left alone.
pub async fn ensure_network(provider: &dyn WalletProvider, network: &NetworkConfig) -> Result<()> {
    if let Ok(chain_id) = current_chain_id(provider).await {
        if chain_id == network.chain_id {
            tracing::debug!(chain_id, "wallet already on target network");
            return Ok(());
        }
    }

    tracing::info!(chain = network.chain_name, "switching wallet network");
    let switched = provider
        .request(
            "wallet_switchEthereumChain",
            json!([{ "chainId": network.chain_id_hex() }]),
        )
        .await;

    match switched {
        Ok(_) => Ok(()),
        Err(e) if e.code == UNRECOGNIZED_CHAIN => {
            tracing::info!(chain = network.chain_name, "registering network with wallet");
            provider
                .request("wallet_addEthereumChain", json!([network.add_chain_params()]))
                .await
                .map(|_| ())
                .map_err(|e| Error::NetworkSwitch(format!("Could not add {} network: {e}", network.chain_name)))
        }
        Err(e) => Err(Error::NetworkSwitch(format!("Could not switch network: {e}"))),
    }
}

/// Reads a JSON-RPC quantity, either a `0x` hex string or a plain number.
pub fn parse_quantity(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16).ok(),
            None => s.parse().ok(),
        },
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}
