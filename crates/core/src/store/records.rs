//! Response record operations over named stores.
//!
//! A named store is a namespace inside the single SQLite database. The
//! operations here mirror the capability the strategies consume: open a
//! store by name, put/match/delete records, enumerate store names and keys.

use super::connection::StoreDb;
use crate::Error;
use crate::types::{RequestDescriptor, ResponseRecord};
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;
use tokio_rusqlite::rusqlite::types::Type;

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ResponseRecord> {
    let headers_json: String = row.get(2)?;
    let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    let body: Vec<u8> = row.get(3)?;
    Ok(ResponseRecord { status: row.get(0)?, status_text: row.get(1)?, headers, body: Bytes::from(body) })
}

impl StoreDb {
    /// Open (create if absent) a named store.
    pub async fn open_store(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or replace the record for a request in a named store.
    ///
    /// Uses UPSERT semantics: the whole record is replaced atomically, so
    /// concurrent writers to the same key resolve to last-write-wins.
    pub async fn put_response(
        &self, store_name: &str, request: &RequestDescriptor, response: &ResponseRecord,
    ) -> Result<(), Error> {
        let store_name = store_name.to_string();
        let cache_key = request.cache_key();
        let method = request.method.to_ascii_uppercase();
        let url = request.url.to_string();
        let response = response.clone();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let headers_json = serde_json::to_string(&response.headers)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                conn.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![store_name, now],
                )?;
                conn.execute(
                    "INSERT INTO responses (
                        store_name, cache_key, method, url,
                        status, status_text, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(store_name, cache_key) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        status = excluded.status,
                        status_text = excluded.status_text,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![
                        store_name,
                        cache_key,
                        method,
                        url,
                        response.status,
                        response.status_text,
                        headers_json,
                        response.body.as_ref(),
                        now,
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a key in one named store.
    ///
    /// Returns None if the store or the key is absent.
    pub async fn match_in_store(&self, store_name: &str, cache_key: &str) -> Result<Option<ResponseRecord>, Error> {
        let store_name = store_name.to_string();
        let cache_key = cache_key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<ResponseRecord>, Error> {
                let result = conn.query_row(
                    "SELECT status, status_text, headers_json, body
                     FROM responses WHERE store_name = ?1 AND cache_key = ?2",
                    params![store_name, cache_key],
                    row_to_record,
                );
                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a key across every store, oldest-opened store first.
    ///
    /// This is the store-agnostic match the fallback chains use: the static
    /// store is opened at install time and therefore wins over the dynamic
    /// one when both hold the key.
    pub async fn match_any(&self, cache_key: &str) -> Result<Option<ResponseRecord>, Error> {
        let cache_key = cache_key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<ResponseRecord>, Error> {
                let result = conn.query_row(
                    "SELECT r.status, r.status_text, r.headers_json, r.body
                     FROM responses r JOIN stores s ON s.name = r.store_name
                     WHERE r.cache_key = ?1
                     ORDER BY s.rowid ASC
                     LIMIT 1",
                    params![cache_key],
                    row_to_record,
                );
                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Delete one record from a named store.
    ///
    /// Returns true if a record was removed.
    pub async fn delete_entry(&self, store_name: &str, cache_key: &str) -> Result<bool, Error> {
        let store_name = store_name.to_string();
        let cache_key = cache_key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let removed = conn.execute(
                    "DELETE FROM responses WHERE store_name = ?1 AND cache_key = ?2",
                    params![store_name, cache_key],
                )?;
                Ok(removed > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a whole named store and every record in it.
    ///
    /// Returns the number of records removed.
    pub async fn delete_store(&self, name: &str) -> Result<u64, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let removed = conn.execute("DELETE FROM responses WHERE store_name = ?1", params![name])?;
                conn.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                Ok(removed as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all stores, in creation order.
    pub async fn list_store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Enumerate the `(method, url)` keys held by a named store.
    pub async fn store_keys(&self, store_name: &str) -> Result<Vec<(String, String)>, Error> {
        let store_name = store_name.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<(String, String)>, Error> {
                let mut stmt =
                    conn.prepare("SELECT method, url FROM responses WHERE store_name = ?1 ORDER BY rowid ASC")?;
                let keys = stmt
                    .query_map(params![store_name], |row| Ok((row.get(0)?, row.get(1)?)))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of records held by a named store.
    pub async fn count_entries(&self, store_name: &str) -> Result<u64, Error> {
        let store_name = store_name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM responses WHERE store_name = ?1",
                    params![store_name],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn make_request(url: &str) -> RequestDescriptor {
        RequestDescriptor::get(Url::parse(url).unwrap())
    }

    fn make_response(body: &str) -> ResponseRecord {
        ResponseRecord::with_content_type(200, "OK", "text/html", body.to_string())
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let req = make_request("https://app.example/index.html");
        let resp = make_response("<html>home</html>");

        db.put_response("dynamic-v1", &req, &resp).await.unwrap();

        let stored = db.match_in_store("dynamic-v1", &req.cache_key()).await.unwrap().unwrap();
        assert_eq!(stored, resp);
        assert_eq!(stored.content_type(), Some("text/html"));
    }

    #[tokio::test]
    async fn test_match_missing() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let req = make_request("https://app.example/missing");
        assert!(db.match_in_store("dynamic-v1", &req.cache_key()).await.unwrap().is_none());
        assert!(db.match_any(&req.cache_key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_whole_record() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let req = make_request("https://app.example/page");

        db.put_response("dynamic-v1", &req, &make_response("old")).await.unwrap();
        db.put_response("dynamic-v1", &req, &make_response("new")).await.unwrap();

        let stored = db.match_in_store("dynamic-v1", &req.cache_key()).await.unwrap().unwrap();
        assert_eq!(stored.body.as_ref(), b"new");
        assert_eq!(db.count_entries("dynamic-v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_match_any_prefers_oldest_store() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let req = make_request("https://app.example/app.css");

        db.open_store("static-v1").await.unwrap();
        db.open_store("dynamic-v1").await.unwrap();
        db.put_response("dynamic-v1", &req, &make_response("dynamic copy")).await.unwrap();
        db.put_response("static-v1", &req, &make_response("static copy")).await.unwrap();

        let stored = db.match_any(&req.cache_key()).await.unwrap().unwrap();
        assert_eq!(stored.body.as_ref(), b"static copy");
    }

    #[tokio::test]
    async fn test_open_store_is_listed_while_empty() {
        let db = StoreDb::open_in_memory().await.unwrap();
        db.open_store("static-v1").await.unwrap();
        db.open_store("static-v1").await.unwrap();

        assert_eq!(db.list_store_names().await.unwrap(), vec!["static-v1".to_string()]);
        assert_eq!(db.count_entries("static-v1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_store_removes_records_and_name() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let req = make_request("https://app.example/old");
        db.put_response("static-v0", &req, &make_response("stale")).await.unwrap();
        db.put_response("static-v1", &req, &make_response("fresh")).await.unwrap();

        let removed = db.delete_store("static-v0").await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(db.list_store_names().await.unwrap(), vec!["static-v1".to_string()]);
        assert!(db.match_in_store("static-v0", &req.cache_key()).await.unwrap().is_none());
        assert!(db.match_any(&req.cache_key()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let req = make_request("https://app.example/page");
        db.put_response("dynamic-v1", &req, &make_response("body")).await.unwrap();

        assert!(db.delete_entry("dynamic-v1", &req.cache_key()).await.unwrap());
        assert!(!db.delete_entry("dynamic-v1", &req.cache_key()).await.unwrap());
    }

    #[tokio::test]
    async fn test_store_keys() {
        let db = StoreDb::open_in_memory().await.unwrap();
        db.put_response("static-v1", &make_request("https://app.example/index.html"), &make_response("a"))
            .await
            .unwrap();
        db.put_response("static-v1", &make_request("https://app.example/manifest.json"), &make_response("b"))
            .await
            .unwrap();

        let keys = db.store_keys("static-v1").await.unwrap();
        assert_eq!(
            keys,
            vec![
                ("GET".to_string(), "https://app.example/index.html".to_string()),
                ("GET".to_string(), "https://app.example/manifest.json".to_string()),
            ]
        );
    }
}
