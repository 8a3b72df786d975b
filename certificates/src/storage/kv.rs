use rusqlite::{params, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

use super::{Error, Result, DB};

/// String values under fixed logical keys, one row per key.
#[derive(Clone)]
pub struct KvStore {
    conn: DB,
}

impl KvStore {
    pub fn new(conn: DB) -> Self {
        Self { conn }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_owned();
        self.conn
            .call(move |conn| {
                conn.query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| row.get(0))
                    .optional()
                    .map_err(|e| e.into())
            })
            .await
            .map_err(Error::from)
    }

    pub async fn set(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_owned();
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO kv (key, value) VALUES (?1, ?2)
                    ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP"#,
                    params![key, value],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|source| Error::Corrupted {
                key: key.to_owned(),
                source,
            }),
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|source| Error::Corrupted {
            key: key.to_owned(),
            source,
        })?;
        self.set(key, raw).await
    }
}
