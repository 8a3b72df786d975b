use std::{fmt, str::FromStr};

use alloy::primitives::Address;
use serde::Serialize;
use serde_json::{json, Value};

use super::{
    network::{current_chain_id, ensure_network, NetworkConfig},
    provider::SharedProvider,
    Error, Result,
};

/// A connected account together with the wallet that signs for it.
#[derive(Clone)]
pub struct WalletSession {
    address: Address,
    provider: SharedProvider,
}

impl WalletSession {
    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 checksum form of the account address.
    pub fn checksum_address(&self) -> String {
        self.address.to_checksum(None)
    }

    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }
}

impl fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletSession")
            .field("address", &self.checksum_address())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
pub struct ConnectedWallet {
    pub address: String,
}

impl From<&WalletSession> for ConnectedWallet {
    fn from(session: &WalletSession) -> Self {
        Self {
            address: session.checksum_address(),
        }
    }
}

/// Requests account access and attaches the wallet to `network`.
///
/// The chain id is read back after the switch: some wallets accept the switch request
/// without actually changing networks.
pub async fn connect(provider: Option<SharedProvider>, network: &NetworkConfig) -> Result<WalletSession> {
    let provider = provider.ok_or(Error::ProviderMissing)?;

    let accounts = provider
        .request("eth_requestAccounts", json!([]))
        .await
        .map_err(|e| Error::AccountRequest(e.message))?;

    ensure_network(provider.as_ref(), network).await?;

    let chain_id = current_chain_id(provider.as_ref()).await?;
    if chain_id != network.chain_id {
        tracing::warn!(chain_id, expected = network.chain_id, "wallet stayed on another network");
        return Err(Error::WrongNetwork(network.chain_name.to_string()));
    }

    let address = primary_account(&accounts)?;
    tracing::info!(address = %address, "wallet connected");

    Ok(WalletSession { address, provider })
}

fn primary_account(accounts: &Value) -> Result<Address> {
    let account = accounts
        .as_array()
        .and_then(|accounts| accounts.first())
        .and_then(Value::as_str)
        .ok_or_else(|| Error::AccountRequest("No accounts available in the wallet".into()))?;

    Address::from_str(account).map_err(|e| Error::AccountRequest(format!("Invalid account address {account}: {e}")))
}
