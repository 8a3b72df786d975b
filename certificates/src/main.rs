mod config;

mod app;
mod capture;
mod errors;
mod extract;
mod logging;
mod notes;
mod state;
mod storage;
mod web3;

use std::{net::SocketAddr, sync::Arc};

pub use config::config;
pub use errors::{Error, Result};
use notes::NoteStore;
use state::{AppState, WalletState};
use storage::{init_db, KvStore};
use tokio::net::TcpListener;
use web3::{mint::Minter, network::EDU_CHAIN, pinning::PinataClient, provider::detect_provider};

#[tokio::main]
async fn main() -> errors::Result<()> {
    let config = config();

    logging::setup_tracing(config.log_json);

    let conn = init_db().await?;
    let notes = NoteStore::load(KvStore::new(conn)).await?;

    let provider = detect_provider(config.wallet_rpc_url.as_deref());
    if provider.is_none() {
        tracing::warn!("no wallet provider configured, wallet features are unavailable");
    }

    let pinner = PinataClient::new(
        &config.pinata_api_url,
        &config.pinata_api_key,
        &config.pinata_secret_api_key,
    );
    let minter = Minter::new(Arc::new(pinner), &EDU_CHAIN, config.receipt_poll_interval());

    let app = app::create(AppState {
        notes,
        wallet: WalletState::new(provider, minter),
    });

    let port = config.port;
    let listener = TcpListener::bind(format!("127.0.0.1:{port}"))
        .await
        .map_err(|e| Error::Unexpected(format!("could not bind port {port}: {e}")))?;

    let addr = listener
        .local_addr()
        .map_err(|e| Error::Unexpected(e.to_string()))?;
    tracing::info!("listening on http://{addr}");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| Error::Unexpected(e.to_string()))?;

    Ok(())
}
