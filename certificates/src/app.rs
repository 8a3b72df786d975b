use axum::{middleware, response::IntoResponse, routing::get, Json, Router};
use rand::Rng;
use serde_json::json;

use crate::{config, errors::on_error, logging, notes, state::AppState, web3};

pub fn create(state: AppState) -> Router {
    let app = Router::new()
        .route("/__version__", get(version))
        .route("/__heartbeat__", get(heartbeat))
        .route("/__lbheartbeat__", get(lbheartbeat))
        .merge(notes::router(state.clone()))
        .merge(web3::router(state))
        .layer(middleware::from_fn(on_error));

    logging::add_tracing_layer(app)
}

async fn version() -> impl IntoResponse {
    let config = &config();
    Json(json!({
        "source" : config.source,
        "version": config.version,
        "commit" : config.git_commit,
        "build"  : config.pipeline_id
    }))
}

async fn heartbeat() -> impl IntoResponse {
    let mut rng = rand::thread_rng();
    let random: u32 = rng.gen_range(0..=10000);

    Json(json!({
        "status" : "ok",
        "random": random,
    }))
}

async fn lbheartbeat() -> impl IntoResponse {
    ""
}
