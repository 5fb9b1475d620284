pub mod memory;
pub mod sqlite;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

/// Backing document store. A commit is all-or-nothing.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Writes every queued document under a store-generated id and returns
    /// the ids in queue order. On error nothing from the batch is persisted.
    ///
    /// `staging_timeout` bounds only the work done before the final commit.
    /// Once the commit itself is issued it runs to completion.
    async fn commit(
        &self,
        batch: WriteBatch,
        staging_timeout: Option<Duration>,
    ) -> Result<Vec<String>, AppError>;

    async fn count(&self, collection: &str) -> Result<u64, AppError>;

    async fn fetch_all(&self, collection: &str) -> Result<Vec<StoredDocument>, AppError>;
}

/// A queued "create new document" operation.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub collection: String,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct WriteBatch {
    writes: Vec<PendingWrite>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        collection: &str,
        data: Value,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) {
        self.writes.push(PendingWrite {
            collection: collection.to_string(),
            data,
            created_at,
            updated_at,
        });
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn writes(&self) -> &[PendingWrite] {
        &self.writes
    }

    pub fn into_writes(self) -> Vec<PendingWrite> {
        self.writes
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredDocument {
    pub id: String,
    pub collection: String,
    pub data: Value,
    pub created_at: String,
    pub updated_at: String,
}

/// RFC 3339 with a `Z` suffix, the same text serde writes for `DateTime<Utc>`.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Runs `staging` under the optional deadline. Dropping the future on expiry
/// must leave nothing written.
pub(crate) async fn within_deadline<T, F>(deadline: Option<Duration>, staging: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, staging)
            .await
            .map_err(|_| AppError::CommitTimeout(limit))?,
        None => staging.await,
    }
}

pub(crate) fn check_batch_limit(size: usize, limit: Option<usize>) -> Result<(), AppError> {
    match limit {
        Some(limit) if size > limit => Err(AppError::BatchTooLarge { size, limit }),
        _ => Ok(()),
    }
}
