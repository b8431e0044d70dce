use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite, SqliteConnection};
use taskboard_core::{TaskboardError, TaskboardResult};

use crate::backend::StorageBackend;
use crate::query::{document_id, Filter, Update};

const SCHEMA: &str = include_str!("../schema.sql");

fn db_error(e: sqlx::Error) -> TaskboardError {
    TaskboardError::Storage(e.to_string())
}

/// SQLite backend storing one JSON body per row.
///
/// Rows keep insertion order through `seq`. Filters run in Rust over the
/// collection's rows; an `_id` equality narrows the scan to one row.
pub struct SqliteBackend {
    path: PathBuf,
    pool: tokio::sync::OnceCell<Pool<Sqlite>>,
}

impl SqliteBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pool: tokio::sync::OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn get_pool(&self) -> TaskboardResult<&Pool<Sqlite>> {
        self.pool
            .get_or_try_init(|| async {
                if let Some(parent) = self.path.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
                let options = SqliteConnectOptions::from_str(&format!(
                    "sqlite://{}?mode=rwc",
                    self.path.display()
                ))
                .map_err(|e| TaskboardError::Connection(e.to_string()))?
                .create_if_missing(true)
                .busy_timeout(Duration::from_secs(5));

                let pool = SqlitePoolOptions::new()
                    .max_connections(5)
                    .connect_with(options)
                    .await
                    .map_err(|e| TaskboardError::Connection(e.to_string()))?;

                sqlx::raw_sql(SCHEMA)
                    .execute(&pool)
                    .await
                    .map_err(|e| TaskboardError::Connection(e.to_string()))?;

                tracing::info!("Opened SQLite store at {}", self.path.display());
                Ok(pool)
            })
            .await
    }
}

/// Matching rows of a collection as `(seq, document)`, in insertion order.
async fn select_matching(
    conn: &mut SqliteConnection,
    collection: &str,
    filter: &Filter,
) -> TaskboardResult<Vec<(i64, Value)>> {
    let rows = match filter.pinned_id() {
        Some(id) => {
            sqlx::query("SELECT seq, body FROM documents WHERE collection = ? AND id = ?")
                .bind(collection)
                .bind(id)
                .fetch_all(&mut *conn)
                .await
        }
        None => {
            sqlx::query("SELECT seq, body FROM documents WHERE collection = ? ORDER BY seq")
                .bind(collection)
                .fetch_all(&mut *conn)
                .await
        }
    }
    .map_err(db_error)?;

    let mut matched = Vec::new();
    for row in rows {
        let seq: i64 = row.try_get("seq").map_err(db_error)?;
        let body: String = row.try_get("body").map_err(db_error)?;
        let doc: Value = serde_json::from_str(&body)?;
        if filter.matches(&doc) {
            matched.push((seq, doc));
        }
    }
    Ok(matched)
}

async fn write_body(conn: &mut SqliteConnection, seq: i64, doc: &Value) -> TaskboardResult<()> {
    let body = serde_json::to_string(doc)?;
    sqlx::query("UPDATE documents SET body = ? WHERE seq = ?")
        .bind(body)
        .bind(seq)
        .execute(&mut *conn)
        .await
        .map_err(db_error)?;
    Ok(())
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    async fn insert_one(&self, collection: &str, doc: Value) -> TaskboardResult<()> {
        let pool = self.get_pool().await?;
        let id = document_id(&doc)?.to_string();
        let body = serde_json::to_string(&doc)?;

        let result = sqlx::query("INSERT INTO documents (collection, id, body) VALUES (?, ?, ?)")
            .bind(collection)
            .bind(&id)
            .bind(body)
            .execute(pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(
                TaskboardError::Conflict(format!("{collection} already holds a document with _id {id}")),
            ),
            Err(e) => Err(db_error(e)),
        }
    }

    async fn find(&self, collection: &str, filter: &Filter) -> TaskboardResult<Vec<Value>> {
        let pool = self.get_pool().await?;
        let mut conn = pool.acquire().await.map_err(db_error)?;
        let matched = select_matching(&mut conn, collection, filter).await?;
        Ok(matched.into_iter().map(|(_, doc)| doc).collect())
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> TaskboardResult<Option<Value>> {
        let pool = self.get_pool().await?;
        let mut tx = pool.begin().await.map_err(db_error)?;

        let Some((seq, mut doc)) = select_matching(&mut tx, collection, filter)
            .await?
            .into_iter()
            .next()
        else {
            return Ok(None);
        };
        update.apply(&mut doc)?;
        write_body(&mut tx, seq, &doc).await?;

        tx.commit().await.map_err(db_error)?;
        Ok(Some(doc))
    }

    async fn update_many(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> TaskboardResult<u64> {
        let pool = self.get_pool().await?;
        let mut tx = pool.begin().await.map_err(db_error)?;

        let matched = select_matching(&mut tx, collection, filter).await?;
        let count = matched.len() as u64;
        for (seq, mut doc) in matched {
            update.apply(&mut doc)?;
            write_body(&mut tx, seq, &doc).await?;
        }

        tx.commit().await.map_err(db_error)?;
        Ok(count)
    }

    async fn ping(&self) -> TaskboardResult<()> {
        let pool = self.get_pool().await?;
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map_err(|e| TaskboardError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) -> TaskboardResult<()> {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            tracing::debug!("Closed SQLite store at {}", self.path.display());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
