use bharti_core::{BhartiError, BhartiResult, CategoryRecord};
use async_trait::async_trait;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Read-only access to the relational catalog.
///
/// The catalog is owned by an external ingestion process; this layer only
/// reads rows by id (for context building) or in full (for embedding
/// ingestion).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch the full rows for the given ids. Missing ids are skipped.
    async fn fetch_by_ids(&self, ids: &[i64]) -> BhartiResult<Vec<CategoryRecord>>;

    /// Fetch every row, ordered by id.
    async fn fetch_all(&self) -> BhartiResult<Vec<CategoryRecord>>;
}

/// SQLite-backed catalog store.
///
/// `rusqlite` connections are synchronous, so queries run on the blocking
/// thread pool behind a connection mutex.
pub struct SqliteCatalog {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalog {
    /// Open a catalog database file.
    pub fn open(path: impl AsRef<Path>) -> BhartiResult<Self> {
        let conn = Connection::open(path).map_err(|e| BhartiError::Catalog(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory catalog (tests and local experiments).
    pub fn open_in_memory() -> BhartiResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| BhartiError::Catalog(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create the catalog table and insert rows. Used by tests and the
    /// ingestion path; the production table is created by the external
    /// ingestion job with the same schema.
    pub fn seed(&self, records: &[CategoryRecord]) -> BhartiResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| BhartiError::Catalog("catalog lock poisoned".to_string()))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS catalog (
                id INTEGER PRIMARY KEY,
                category TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL DEFAULT 'NA'
            )",
            [],
        )
        .map_err(|e| BhartiError::Catalog(e.to_string()))?;
        for record in records {
            conn.execute(
                "INSERT OR REPLACE INTO catalog (id, category, title, description, url)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    record.id,
                    record.category,
                    record.title,
                    record.description,
                    record.url
                ],
            )
            .map_err(|e| BhartiError::Catalog(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn fetch_by_ids(&self, ids: &[i64]) -> BhartiResult<Vec<CategoryRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.conn.clone();
        let ids = ids.to_vec();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| BhartiError::Catalog("catalog lock poisoned".to_string()))?;
            let placeholders = vec!["?"; ids.len()].join(",");
            let sql = format!(
                "SELECT id, category, title, description, url
                 FROM catalog WHERE id IN ({placeholders}) ORDER BY id"
            );
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| BhartiError::Catalog(e.to_string()))?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(ids.iter()), row_to_record)
                .map_err(|e| BhartiError::Catalog(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| BhartiError::Catalog(e.to_string()))
        })
        .await
        .map_err(|e| BhartiError::Catalog(format!("catalog task failed: {e}")))?
    }

    async fn fetch_all(&self) -> BhartiResult<Vec<CategoryRecord>> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| BhartiError::Catalog("catalog lock poisoned".to_string()))?;
            let mut stmt = conn
                .prepare("SELECT id, category, title, description, url FROM catalog ORDER BY id")
                .map_err(|e| BhartiError::Catalog(e.to_string()))?;
            let rows = stmt
                .query_map([], row_to_record)
                .map_err(|e| BhartiError::Catalog(e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| BhartiError::Catalog(e.to_string()))
        })
        .await
        .map_err(|e| BhartiError::Catalog(format!("catalog task failed: {e}")))?
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<CategoryRecord> {
    Ok(CategoryRecord {
        id: row.get(0)?,
        category: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        url: row.get(4)?,
    })
}
