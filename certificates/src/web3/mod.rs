//! Wallet, network, pinning and minting.
//!
//! Failures here are part of the normal answer: routes report them as an [`Outcome`]
//! with `success: false` and a typed [`ErrorKind`] instead of an HTTP error.

pub mod cancel;
pub mod mint;
pub mod network;
pub mod pinning;
pub mod provider;
mod routes;
#[cfg(test)]
pub mod testing;
pub mod wallet;

use serde::Serialize;

pub use routes::router;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("No wallet provider is installed")]
    ProviderMissing,
    #[error("{0}")]
    AccountRequest(String),
    #[error("Please switch to {0} network!")]
    WrongNetwork(String),
    #[error("{0}")]
    NetworkSwitch(String),
    #[error("Could not upload image to IPFS: {0}")]
    Upload(String),
    #[error("{0}")]
    Contract(String),
    #[error("You must connect your wallet first")]
    NotConnected,
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Operation was cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ProviderMissing,
    AccountRequest,
    WrongNetwork,
    NetworkSwitch,
    Upload,
    Contract,
    NotConnected,
    InvalidImage,
    Cancelled,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ProviderMissing => ErrorKind::ProviderMissing,
            Error::AccountRequest(_) => ErrorKind::AccountRequest,
            Error::WrongNetwork(_) => ErrorKind::WrongNetwork,
            Error::NetworkSwitch(_) => ErrorKind::NetworkSwitch,
            Error::Upload(_) => ErrorKind::Upload,
            Error::Contract(_) => ErrorKind::Contract,
            Error::NotConnected => ErrorKind::NotConnected,
            Error::InvalidImage(_) => ErrorKind::InvalidImage,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl From<crate::capture::Error> for Error {
    fn from(error: crate::capture::Error) -> Self {
        Self::InvalidImage(error.to_string())
    }
}

/// Uniform result of a web3 operation as seen by the page.
///
/// Serializes to `{"success": true, ...value}` or
/// `{"success": false, "kind": .., "error": .., "step": ..}`.
#[derive(Debug, Serialize)]
pub struct Outcome<T, S = ()> {
    pub success: bool,
    #[serde(flatten)]
    pub value: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<S>,
    /// Present on a failure that happened after the wallet broadcast a transaction.
    #[serde(flatten)]
    pub transaction: Option<SentTransaction>,
}

/// A transaction the wallet has already broadcast. It may still be mined after the
/// operation that sent it failed or was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentTransaction {
    pub transaction_hash: String,
    pub explorer_url: String,
}

impl<T, S> Outcome<T, S> {
    pub fn ok(value: T) -> Self {
        Self {
            success: true,
            value: Some(value),
            kind: None,
            error: None,
            step: None,
            transaction: None,
        }
    }

    pub fn failed(error: &Error, step: Option<S>) -> Self {
        Self {
            success: false,
            value: None,
            kind: Some(error.kind()),
            error: Some(error.to_string()),
            step,
            transaction: None,
        }
    }

    pub fn with_transaction(mut self, transaction: Option<SentTransaction>) -> Self {
        self.transaction = transaction;
        self
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(error) => Self::failed(&error, None),
        }
    }
}
