use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use tokio::sync::RwLock;

use crate::{
    notes::NoteStore,
    web3::{cancel::CancelToken, mint::Minter, provider::SharedProvider, wallet::WalletSession},
};

#[derive(FromRef, Clone)]
pub struct AppState {
    pub notes: NoteStore,
    pub wallet: WalletState,
}

#[derive(Clone)]
pub struct WalletState {
    /// `None` when no wallet endpoint is configured.
    pub provider: Option<SharedProvider>,
    /// The single connected account, kept until the process restarts.
    pub session: Arc<RwLock<Option<WalletSession>>>,
    pub minter: Arc<Minter>,
    /// Shared by every mint started since the last cancel request.
    pub cancel: Arc<Mutex<CancelToken>>,
}

impl WalletState {
    pub fn new(provider: Option<SharedProvider>, minter: Minter) -> Self {
        Self {
            provider,
            session: Arc::new(RwLock::new(None)),
            minter: Arc::new(minter),
            cancel: Arc::new(Mutex::new(CancelToken::new())),
        }
    }

    pub async fn session(&self) -> Option<WalletSession> {
        self.session.read().await.clone()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Cancels the mints in flight and hands out a fresh token to the next ones.
    pub fn cancel_mints(&self) {
        let mut cancel = self.cancel.lock().unwrap_or_else(|e| e.into_inner());
        cancel.cancel();
        *cancel = CancelToken::new();
    }
}
