use std::time::Duration;

use async_trait::async_trait;
use sqlx::FromRow;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::store::{
    DocumentStore, StoredDocument, WriteBatch, check_batch_limit, format_timestamp, within_deadline,
};

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    collection: String,
    data: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<DocumentRow> for StoredDocument {
    type Error = AppError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let data = serde_json::from_str(&row.data).map_err(AppError::Serialization)?;
        Ok(StoredDocument {
            id: row.id,
            collection: row.collection,
            data,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct SqliteDocumentStore {
    db: SqlitePool,
    batch_limit: Option<usize>,
}

impl SqliteDocumentStore {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            batch_limit: None,
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn with_batch_limit(mut self, limit: Option<usize>) -> Self {
        self.batch_limit = limit;
        self
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn commit(
        &self,
        batch: WriteBatch,
        staging_timeout: Option<Duration>,
    ) -> Result<Vec<String>, AppError> {
        check_batch_limit(batch.len(), self.batch_limit)?;
        if batch.is_empty() {
            debug!("Empty batch, nothing to commit");
            return Ok(Vec::new());
        }

        let size = batch.len();

        // A timeout or error here drops `tx`, which rolls the whole batch back.
        let (tx, ids) = within_deadline(staging_timeout, async {
            let mut tx = self.db.begin().await?;
            let mut ids = Vec::with_capacity(size);

            for write in batch.into_writes() {
                let id = Uuid::new_v4().to_string();
                let data = serde_json::to_string(&write.data).map_err(AppError::Serialization)?;

                sqlx::query(
                    "INSERT INTO documents (id, collection, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?)"
                )
                .bind(&id)
                .bind(&write.collection)
                .bind(data)
                .bind(format_timestamp(write.created_at))
                .bind(format_timestamp(write.updated_at))
                .execute(&mut *tx)
                .await?;

                ids.push(id);
            }

            Ok::<_, AppError>((tx, ids))
        })
        .await?;

        // Never cancelled: once COMMIT is sent its outcome is the batch's outcome.
        tx.commit().await?;
        info!("Committed batch of {} documents", size);
        Ok(ids)
    }

    async fn count(&self, collection: &str) -> Result<u64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.db)
            .await?;
        Ok(count as u64)
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<StoredDocument>, AppError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, collection, data, created_at, updated_at FROM documents WHERE collection = ? ORDER BY rowid"
        )
        .bind(collection)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StoredDocument::try_from).collect()
    }
}
