use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::models::{CourseDocument, RecordGroup};
use crate::store::{DocumentStore, WriteBatch};

/// Writes record groups into one collection as a single atomic batch.
pub struct BulkLoader {
    store: Arc<dyn DocumentStore>,
    collection: String,
    commit_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordEntry {
    pub code: String,
    pub division: String,
    pub name: String,
    /// `None` until the batch is committed.
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub label: String,
    pub count: usize,
    pub records: Vec<RecordEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub collection: String,
    pub written_at: DateTime<Utc>,
    pub committed: bool,
    pub groups: Vec<GroupReport>,
}

impl LoadReport {
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }
}

impl BulkLoader {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Result<Self, AppError> {
        let collection = collection.into();
        check_collection(&collection)?;
        Ok(Self {
            store,
            collection,
            commit_timeout: None,
        })
    }

    pub fn with_commit_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.commit_timeout = timeout;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Queues every record and commits them together. Either all records are
    /// written or the error is returned and none are.
    pub async fn load(&self, groups: &[RecordGroup]) -> Result<LoadReport, AppError> {
        let (batch, mut report) = prepare(&self.collection, groups)?;
        info!(
            "Committing {} documents to '{}' ({} groups)",
            batch.len(),
            self.collection,
            report.groups.len()
        );

        // The timeout covers staging only; a commit that has been issued is
        // never abandoned, so an error always means nothing was written.
        let ids = self.store.commit(batch, self.commit_timeout).await?;

        let mut ids = ids.into_iter();
        for entry in report.groups.iter_mut().flat_map(|g| g.records.iter_mut()) {
            entry.document_id = ids.next();
        }
        report.committed = true;

        info!("Import completed: {} documents", report.total());
        Ok(report)
    }
}

/// Same traversal as `BulkLoader::load` with no store involved. Used for dry runs.
pub fn plan(collection: &str, groups: &[RecordGroup]) -> Result<LoadReport, AppError> {
    check_collection(collection)?;
    let (_, report) = prepare(collection, groups)?;
    Ok(report)
}

fn check_collection(collection: &str) -> Result<(), AppError> {
    if collection.trim().is_empty() {
        return Err(AppError::InvalidInput("collection name must not be empty".to_string()));
    }
    Ok(())
}

fn prepare(collection: &str, groups: &[RecordGroup]) -> Result<(WriteBatch, LoadReport), AppError> {
    let now = Utc::now();
    let mut batch = WriteBatch::new();
    let mut group_reports = Vec::with_capacity(groups.len());
    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();

    for group in groups {
        let mut entries = Vec::with_capacity(group.records.len());

        for record in &group.records {
            if !record.has_well_formed_schedule() {
                warn!(
                    "Course {}-{} ({}) has a malformed schedule, writing as-is",
                    record.code, record.division, record.name
                );
            }
            *seen
                .entry((record.code.as_str(), record.division.as_str()))
                .or_default() += 1;

            let document = CourseDocument::stamp(record.clone(), now);
            let data = serde_json::to_value(&document).map_err(AppError::Serialization)?;
            batch.create(collection, data, now, now);
            debug!("Queued {}-{} {}", record.code, record.division, record.name);

            entries.push(RecordEntry {
                code: record.code.clone(),
                division: record.division.clone(),
                name: record.name.clone(),
                document_id: None,
            });
        }

        group_reports.push(GroupReport {
            label: group.label.clone(),
            count: entries.len(),
            records: entries,
        });
    }

    let repeated = seen.values().filter(|&&n| n > 1).count();
    if repeated > 0 {
        info!("{} code/division pairs appear more than once, keeping every copy", repeated);
    }

    let report = LoadReport {
        collection: collection.to_string(),
        written_at: now,
        committed: false,
        groups: group_reports,
    };
    Ok((batch, report))
}
