//! Read and overwrite the last rendered document.

use super::connection::RenderLogDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// The most recently persisted rendered document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastRender {
    pub url: String,
    pub document: String,
    /// RFC 3339 capture time.
    pub captured_at: String,
}

impl RenderLogDb {
    /// Persist `document` as the last render, replacing whatever was stored.
    pub async fn write_last_render(&self, url: &str, document: &str) -> Result<(), Error> {
        let url = url.to_string();
        let document = document.to_string();
        let captured_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO render_log (slot, url, document, captured_at)
                     VALUES (1, ?1, ?2, ?3)
                     ON CONFLICT(slot) DO UPDATE SET
                        url = excluded.url,
                        document = excluded.document,
                        captured_at = excluded.captured_at",
                    params![url, document, captured_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get the last persisted render.
    ///
    /// Returns None if nothing has been written yet.
    pub async fn last_render(&self) -> Result<Option<LastRender>, Error> {
        self.conn
            .call(|conn| -> Result<Option<LastRender>, Error> {
                let result = conn.query_row(
                    "SELECT url, document, captured_at FROM render_log WHERE slot = 1",
                    [],
                    |row| Ok(LastRender { url: row.get(0)?, document: row.get(1)?, captured_at: row.get(2)? }),
                );

                match result {
                    Ok(last) => Ok(Some(last)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }
}
