//! Scriptable wallet and pinning doubles.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{
    network::parse_quantity,
    pinning::ContentPinner,
    provider::{ProviderError, WalletProvider, UNRECOGNIZED_CHAIN},
    Error, Result,
};
use crate::capture::ImageData;

pub const ACCOUNT: &str = "0x8ba1f109551bd432803012645ac136ddd64dba72";
pub const ACCOUNT_CHECKSUM: &str = "0x8ba1f109551bD432803012645Ac136ddd64DBA72";

/// In-memory wallet. Unknown chains must be added before they can be switched to.
pub struct MockProvider {
    chain_id: Mutex<u64>,
    known_chains: Mutex<HashSet<u64>>,
    accounts: Vec<String>,
    failures: HashMap<String, ProviderError>,
    ignore_switch: bool,
    tx_hash: String,
    pending_polls: usize,
    receipt_status: &'static str,
    receipt_logs: Vec<Value>,

    polls: AtomicUsize,
    calls: Mutex<Vec<String>>,
    added_chains: Mutex<Vec<Value>>,
    transactions: Mutex<Vec<Value>>,
}

impl MockProvider {
    pub fn on_chain(chain_id: u64) -> Self {
        Self {
            chain_id: Mutex::new(chain_id),
            known_chains: Mutex::new(HashSet::from([chain_id])),
            accounts: vec![ACCOUNT.to_string()],
            failures: HashMap::new(),
            ignore_switch: false,
            tx_hash: "0xdead".to_string(),
            pending_polls: 0,
            receipt_status: "0x1",
            receipt_logs: Vec::new(),
            polls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            added_chains: Mutex::new(Vec::new()),
            transactions: Mutex::new(Vec::new()),
        }
    }

    pub fn knowing(self, chain_id: u64) -> Self {
        self.known_chains.lock().unwrap().insert(chain_id);
        self
    }

    pub fn failing(mut self, method: &str, code: i64, message: &str) -> Self {
        self.failures.insert(method.to_string(), ProviderError::new(code, message));
        self
    }

    pub fn with_accounts(mut self, accounts: &[&str]) -> Self {
        self.accounts = accounts.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Accepts switch requests without changing the chain.
    pub fn ignoring_switch(mut self) -> Self {
        self.ignore_switch = true;
        self
    }

    pub fn with_tx_hash(mut self, hash: &str) -> Self {
        self.tx_hash = hash.to_string();
        self
    }

    /// Number of receipt polls answered with `null` before the receipt shows up.
    pub fn pending_for(mut self, polls: usize) -> Self {
        self.pending_polls = polls;
        self
    }

    pub fn reverting(mut self) -> Self {
        self.receipt_status = "0x0";
        self
    }

    pub fn with_receipt_logs(mut self, logs: Vec<Value>) -> Self {
        self.receipt_logs = logs;
        self
    }

    pub fn chain_id(&self) -> u64 {
        *self.chain_id.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn added_chains(&self) -> Vec<Value> {
        self.added_chains.lock().unwrap().clone()
    }

    pub fn transactions(&self) -> Vec<Value> {
        self.transactions.lock().unwrap().clone()
    }

    fn requested_chain(params: &Value) -> Option<u64> {
        parse_quantity(&params[0]["chainId"])
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> std::result::Result<Value, ProviderError> {
        self.calls.lock().unwrap().push(method.to_string());

        if let Some(error) = self.failures.get(method) {
            return Err(error.clone());
        }

        match method {
            "eth_chainId" => Ok(json!(format!("{:#x}", self.chain_id()))),
            "eth_requestAccounts" => Ok(json!(self.accounts)),
            "wallet_switchEthereumChain" => {
                if self.ignore_switch {
                    return Ok(Value::Null);
                }
                let requested = Self::requested_chain(&params).ok_or_else(|| ProviderError::new(-32602, "bad chainId"))?;
                if !self.known_chains.lock().unwrap().contains(&requested) {
                    return Err(ProviderError::new(UNRECOGNIZED_CHAIN, "Unrecognized chain ID"));
                }
                *self.chain_id.lock().unwrap() = requested;
                Ok(Value::Null)
            }
            "wallet_addEthereumChain" => {
                let requested = Self::requested_chain(&params).ok_or_else(|| ProviderError::new(-32602, "bad chainId"))?;
                self.added_chains.lock().unwrap().push(params[0].clone());
                self.known_chains.lock().unwrap().insert(requested);
                *self.chain_id.lock().unwrap() = requested;
                Ok(Value::Null)
            }
            "eth_sendTransaction" => {
                self.transactions.lock().unwrap().push(params[0].clone());
                Ok(json!(self.tx_hash))
            }
            "eth_getTransactionReceipt" => {
                let poll = self.polls.fetch_add(1, Ordering::SeqCst);
                if poll < self.pending_polls {
                    return Ok(Value::Null);
                }
                Ok(json!({
                    "transactionHash": self.tx_hash,
                    "status": self.receipt_status,
                    "blockNumber": "0x10",
                    "logs": self.receipt_logs,
                }))
            }
            _ => Err(ProviderError::new(-32601, format!("method {method} not supported"))),
        }
    }
}

/// Pinning service double that records what it was asked to pin.
pub struct MockPinner {
    result: Result<String>,
    pinned: Mutex<Vec<ImageData>>,
}

impl MockPinner {
    pub fn returning(hash: &str) -> Self {
        Self {
            result: Ok(format!("ipfs://{hash}")),
            pinned: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(Error::Upload(message.to_string())),
            pinned: Mutex::new(Vec::new()),
        }
    }

    pub fn pinned(&self) -> Vec<ImageData> {
        self.pinned.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentPinner for MockPinner {
    async fn pin_image(&self, image: &ImageData) -> Result<String> {
        self.pinned.lock().unwrap().push(image.clone());
        self.result.clone()
    }
}
