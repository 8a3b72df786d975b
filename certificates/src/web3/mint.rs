//! Turning a rendered note into an NFT.

use std::{sync::Arc, time::Duration};

use alloy::{
    primitives::{address, hex, Address, B256, U256},
    sol,
    sol_types::{SolCall, SolEvent},
};
use serde::Serialize;
use serde_json::{json, Value};

use super::{
    cancel::CancelToken,
    network::{current_chain_id, ensure_network, parse_quantity, NetworkConfig},
    pinning::ContentPinner,
    wallet::WalletSession,
    Error, Outcome, Result, SentTransaction,
};
use crate::{capture::ImageData, notes::Note};

/// Deployed note NFT contract on the EDU Chain testnet.
pub const NOTE_CONTRACT: Address = address!("eB6731aE55120A03E90aB1C008a4e421c10C6464");

sol! {
    function mintNote(address recipient, string tokenURI) returns (uint256);

    event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MintStep {
    Session,
    Network,
    Pin,
    Submit,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintFailure {
    pub step: MintStep,
    pub error: Error,
    pub transaction: Option<SentTransaction>,
}

impl MintFailure {
    fn sent(mut self, transaction: &SentTransaction) -> Self {
        self.transaction = Some(transaction.clone());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    pub transaction_hash: String,
    #[serde(rename = "tokenURI")]
    pub token_uri: String,
    pub explorer_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

pub type MintOutcome = Outcome<MintReceipt, MintStep>;

impl From<std::result::Result<MintReceipt, MintFailure>> for MintOutcome {
    fn from(result: std::result::Result<MintReceipt, MintFailure>) -> Self {
        match result {
            Ok(receipt) => Outcome::ok(receipt),
            Err(MintFailure {
                step,
                error,
                transaction,
            }) => Outcome::failed(&error, Some(step)).with_transaction(transaction),
        }
    }
}

trait AtStep<T> {
    fn at(self, step: MintStep) -> std::result::Result<T, MintFailure>;
}

impl<T> AtStep<T> for Result<T> {
    fn at(self, step: MintStep) -> std::result::Result<T, MintFailure> {
        self.map_err(|error| MintFailure {
            step,
            error,
            transaction: None,
        })
    }
}

/// Runs the mint sequence. Steps run strictly one after another and the first failure
/// ends the attempt; nothing is rolled back or retried.
pub struct Minter {
    pinner: Arc<dyn ContentPinner>,
    network: &'static NetworkConfig,
    contract: Address,
    poll_interval: Duration,
}

impl Minter {
    pub fn new(pinner: Arc<dyn ContentPinner>, network: &'static NetworkConfig, poll_interval: Duration) -> Self {
        Self {
            pinner,
            network,
            contract: NOTE_CONTRACT,
            poll_interval,
        }
    }

    pub fn network(&self) -> &'static NetworkConfig {
        self.network
    }

    pub async fn mint(
        &self,
        session: Option<&WalletSession>,
        note: &Note,
        image: &ImageData,
        cancel: &CancelToken,
    ) -> std::result::Result<MintReceipt, MintFailure> {
        let session = session.ok_or(Error::NotConnected).at(MintStep::Session)?;
        tracing::info!(note_id = note.id, account = %session.address(), "minting note");

        guarded(cancel, self.verify_network(session)).await.at(MintStep::Network)?;

        let token_uri = guarded(cancel, self.pinner.pin_image(image)).await.at(MintStep::Pin)?;

        // Cancellation is honoured only before the wallet is asked to sign.
        if cancel.is_cancelled() {
            return Err(Error::Cancelled).at(MintStep::Submit);
        }
        let tx_hash = self.submit(session, &token_uri).await.at(MintStep::Submit)?;
        tracing::info!(tx_hash = %tx_hash, "mint transaction submitted");

        let sent = SentTransaction {
            explorer_url: self.network.explorer_tx_url(&tx_hash),
            transaction_hash: tx_hash,
        };

        let receipt = guarded(cancel, self.wait_for_receipt(session, &sent.transaction_hash))
            .await
            .at(MintStep::Confirm)
            .map_err(|failure| failure.sent(&sent))?;

        let receipt = MintReceipt {
            transaction_hash: sent.transaction_hash,
            explorer_url: sent.explorer_url,
            token_uri,
            token_id: self.minted_token_id(&receipt).map(|id| id.to_string()),
            block_number: parse_quantity(&receipt["blockNumber"]),
        };
        tracing::info!(explorer_url = %receipt.explorer_url, "note minted");

        Ok(receipt)
    }

    /// Checked again here even though `connect` already did: the user may have switched
    /// networks in the wallet since.
    async fn verify_network(&self, session: &WalletSession) -> Result<()> {
        let provider = session.provider().as_ref();
        match current_chain_id(provider).await {
            Ok(chain_id) if chain_id == self.network.chain_id => Ok(()),
            _ => ensure_network(provider, self.network).await,
        }
    }

    async fn submit(&self, session: &WalletSession, token_uri: &str) -> Result<String> {
        let call = mintNoteCall {
            recipient: session.address(),
            tokenURI: token_uri.to_owned(),
        };

        let tx = json!({
            "from": session.checksum_address(),
            "to": self.contract.to_checksum(None),
            "data": hex::encode_prefixed(call.abi_encode()),
        });

        let hash = session
            .provider()
            .request("eth_sendTransaction", json!([tx]))
            .await
            .map_err(|e| Error::Contract(e.message))?;

        hash.as_str()
            .map(str::to_owned)
            .ok_or_else(|| Error::Contract(format!("Unexpected transaction hash: {hash}")))
    }

    /// Polls until the transaction has one confirmation. There is no deadline; the
    /// cancellation token is the only way out of a transaction that never lands.
    async fn wait_for_receipt(&self, session: &WalletSession, tx_hash: &str) -> Result<Value> {
        loop {
            let receipt = session
                .provider()
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await
                .map_err(|e| Error::Contract(e.message))?;

            if !receipt.is_null() {
                return match parse_quantity(&receipt["status"]) {
                    Some(0) => Err(Error::Contract("Transaction reverted".into())),
                    _ => Ok(receipt),
                };
            }

            tracing::debug!(tx_hash, "waiting for confirmation");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Token id from the ERC-721 `Transfer` log emitted by the contract, if any.
    fn minted_token_id(&self, receipt: &Value) -> Option<U256> {
        receipt["logs"].as_array()?.iter().find_map(|log| {
            let emitter = log["address"].as_str()?.parse::<Address>().ok()?;
            if emitter != self.contract {
                return None;
            }

            let topics = log["topics"]
                .as_array()?
                .iter()
                .map(|topic| topic.as_str()?.parse::<B256>().ok())
                .collect::<Option<Vec<_>>>()?;

            match topics.as_slice() {
                [signature, _, _, token_id] if *signature == Transfer::SIGNATURE_HASH => {
                    Some(U256::from_be_slice(token_id.as_slice()))
                }
                _ => None,
            }
        })
    }
}

async fn guarded<T>(cancel: &CancelToken, step: impl std::future::Future<Output = Result<T>>) -> Result<T> {
    cancel.run(step).await.unwrap_or(Err(Error::Cancelled))
}
