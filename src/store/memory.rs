use std::collections::HashMap;
use std::sync::Mutex;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::store::{
    DocumentStore, StoredDocument, WriteBatch, check_batch_limit, format_timestamp, within_deadline,
};

/// In-process store with the same all-or-nothing commit.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, Vec<StoredDocument>>>,
    batch_limit: Option<usize>,
    #[cfg(test)]
    fail_commits: AtomicBool,
    #[cfg(test)]
    commit_delay: Option<Duration>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = Some(limit);
        self
    }

    /// Simulates a slow round-trip before the batch lands.
    #[cfg(test)]
    pub fn with_commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay = Some(delay);
        self
    }

    /// While set, every commit is rejected and nothing is written.
    #[cfg(test)]
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<StoredDocument>>>, AppError> {
        self.collections
            .lock()
            .map_err(|_| AppError::CommitFailed("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn commit(
        &self,
        batch: WriteBatch,
        staging_timeout: Option<Duration>,
    ) -> Result<Vec<String>, AppError> {
        check_batch_limit(batch.len(), self.batch_limit)?;

        let staged = within_deadline(staging_timeout, async {
            #[cfg(test)]
            if let Some(delay) = self.commit_delay {
                tokio::time::sleep(delay).await;
            }
            #[cfg(test)]
            if self.fail_commits.load(Ordering::SeqCst) {
                return Err(AppError::CommitFailed("store unavailable".to_string()));
            }

            let staged: Vec<StoredDocument> = batch
                .into_writes()
                .into_iter()
                .map(|write| StoredDocument {
                    id: Uuid::new_v4().to_string(),
                    collection: write.collection,
                    data: write.data,
                    created_at: format_timestamp(write.created_at),
                    updated_at: format_timestamp(write.updated_at),
                })
                .collect();
            Ok::<_, AppError>(staged)
        })
        .await?;

        let ids = staged.iter().map(|doc| doc.id.clone()).collect();
        let mut collections = self.lock()?;
        for doc in staged {
            collections.entry(doc.collection.clone()).or_default().push(doc);
        }

        Ok(ids)
    }

    async fn count(&self, collection: &str) -> Result<u64, AppError> {
        let collections = self.lock()?;
        Ok(collections.get(collection).map_or(0, |docs| docs.len() as u64))
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<StoredDocument>, AppError> {
        let collections = self.lock()?;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }
}
