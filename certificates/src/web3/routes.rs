use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Serialize;

use super::{
    mint::MintOutcome,
    wallet::{self, ConnectedWallet},
    Outcome,
};
use crate::{
    capture::ImageData,
    extract::{Json, Path},
    notes::{NoteIdPath, RenderedNote},
    state::{AppState, WalletState},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/wallet", get(wallet_status))
        .route("/api/v1/wallet/connect", post(connect_wallet))
        .route("/api/v1/notes/{note_id}/mint", post(mint_note))
        .route("/api/v1/mints/cancel", post(cancel_mints))
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WalletStatus {
    installed: bool,
    address: Option<String>,
    network: &'static str,
    chain_id: String,
}

async fn wallet_status(State(wallet): State<WalletState>) -> Json<WalletStatus> {
    let network = wallet.minter.network();

    Json(WalletStatus {
        installed: wallet.provider.is_some(),
        address: wallet.session().await.map(|s| s.checksum_address()),
        network: network.chain_name,
        chain_id: network.chain_id_hex(),
    })
}

async fn connect_wallet(State(wallet): State<WalletState>) -> Json<Outcome<ConnectedWallet>> {
    let result = match wallet::connect(wallet.provider.clone(), wallet.minter.network()).await {
        Ok(session) => {
            let connected = ConnectedWallet::from(&session);
            *wallet.session.write().await = Some(session);
            Ok(connected)
        }
        Err(error) => {
            tracing::warn!(kind = ?error.kind(), "wallet connection failed: {error}");
            Err(error)
        }
    };

    Json(result.into())
}

/// Pins the rendered note and mints it to the connected account.
///
/// A missing note is an HTTP error; everything that goes wrong after that is reported in
/// the outcome.
async fn mint_note(
    State(state): State<AppState>,
    Path(NoteIdPath { note_id }): Path<NoteIdPath>,
    Json(rendered): Json<RenderedNote>,
) -> crate::Result<Json<MintOutcome>> {
    let note = state.notes.get_note(note_id).await?;

    let image = match ImageData::from_data_uri(&rendered.image).and_then(ImageData::require_png) {
        Ok(image) => image,
        Err(error) => return Ok(Json(Outcome::failed(&error.into(), None))),
    };

    let session = state.wallet.session().await;
    let cancel = state.wallet.cancel_token();

    let result = state
        .wallet
        .minter
        .mint(session.as_ref(), &note, &image, &cancel)
        .await;

    if let Err(failure) = &result {
        tracing::warn!(note_id, step = ?failure.step, "mint failed: {}", failure.error);
    }

    Ok(Json(result.into()))
}

async fn cancel_mints(State(wallet): State<WalletState>) -> StatusCode {
    wallet.cancel_mints();
    tracing::info!("pending mints cancelled");
    StatusCode::NO_CONTENT
}
