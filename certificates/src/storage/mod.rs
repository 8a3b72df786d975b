mod kv;
mod migrations;

pub use kv::KvStore;
pub use tokio_rusqlite;

use tokio_rusqlite::Connection;

use crate::config::config;

use migrations::MIGRATIONS;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    TokioRusqlite(tokio_rusqlite::Error),
    #[error(transparent)]
    Rusqlite(#[from] rusqlite::Error),
    #[error("corrupted value under key `{key}`: {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<tokio_rusqlite::Error> for Error {
    fn from(error: tokio_rusqlite::Error) -> Self {
        match error {
            tokio_rusqlite::Error::Rusqlite(error) => Self::Rusqlite(error),
            error => Self::TokioRusqlite(error),
        }
    }
}

pub type DB = Connection;

pub async fn init_db() -> Result<DB> {
    let conn = Connection::open(&config().database_url).await?;

    conn.call(|conn| {
        migrate(conn)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(())
    })
    .await?;

    Ok(conn)
}

#[cfg(test)]
pub async fn init_test_db() -> Result<DB> {
    let conn = Connection::open_in_memory().await?;

    conn.call(|conn| migrate(conn)).await?;

    Ok(conn)
}

fn migrate(conn: &mut rusqlite::Connection) -> tokio_rusqlite::Result<()> {
    MIGRATIONS
        .to_latest(conn)
        .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))
}
