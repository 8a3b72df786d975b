use std::{sync::OnceLock, time::Duration};

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default)]
    pub log_json: bool,

    // web3
    /// JSON-RPC endpoint of the wallet. Unset means no wallet provider is available.
    pub wallet_rpc_url: Option<String>,
    #[serde(default = "default_pinata_api_url")]
    pub pinata_api_url: String,
    #[serde(default)]
    pub pinata_api_key: String,
    #[serde(default)]
    pub pinata_secret_api_key: String,
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,

    // build
    #[serde(default = "default_local")]
    pub source: String,
    #[serde(default = "default_local")]
    pub git_commit: String,
    #[serde(default = "default_local")]
    pub pipeline_id: String,
    #[serde(default = "default_local")]
    pub version: String,
}

fn default_port() -> u16 {
    4000
}

fn default_database_url() -> String {
    "certificates.db".into()
}

fn default_pinata_api_url() -> String {
    "https://api.pinata.cloud".into()
}

fn default_receipt_poll_interval_ms() -> u64 {
    2000
}

fn default_local() -> String {
    "local".into()
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<Self>()
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| Config::from_env().unwrap_or_else(|e| panic!("invalid configuration: {e}")))
}
