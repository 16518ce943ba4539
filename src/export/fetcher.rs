//! Fetcher
//!
//! Lists every enabled resource kind from a [`RecordSource`] and turns the
//! records into [`RawItem`]s. Kinds are fetched concurrently on a bounded pool
//! of blocking tasks; the results are always returned in the order the kinds
//! were requested, and each kind's records keep the order the source produced.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Semaphore;

use super::error::ExportResult;
use super::item::RawItem;
use super::registry::ResourceKind;

/// Capability that lists the raw records of one resource kind.
///
/// Authentication, pagination and transport concerns belong to the
/// implementation. The fetcher calls `list_records` exactly once per kind.
pub trait RecordSource: Send + Sync {
    fn list_records(&self, kind: ResourceKind) -> ExportResult<Vec<Value>>;
}

/// Result of fetching a single resource kind
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// The kind that was fetched
    pub kind: ResourceKind,

    /// Items in source order (empty when the fetch failed)
    pub items: Vec<RawItem>,

    /// Records that carried no extractable identifier, in source order
    pub unidentified: Vec<Value>,

    /// Error message if the fetch failed
    pub error: Option<String>,
}

impl FetchOutcome {
    /// Create a successful outcome
    pub fn success(kind: ResourceKind, items: Vec<RawItem>, unidentified: Vec<Value>) -> Self {
        Self {
            kind,
            items,
            unidentified,
            error: None,
        }
    }

    /// Create a failed outcome
    pub fn failure(kind: ResourceKind, error: String) -> Self {
        Self {
            kind,
            items: Vec::new(),
            unidentified: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Records left out of the document for lack of an identifier
    pub fn skipped(&self) -> usize {
        self.unidentified.len()
    }
}

/// Fetch one kind synchronously
pub fn fetch_kind(source: &dyn RecordSource, kind: ResourceKind) -> FetchOutcome {
    match source.list_records(kind) {
        Ok(records) => {
            let mut items = Vec::with_capacity(records.len());
            let mut unidentified = Vec::new();

            for record in records {
                match RawItem::from_record(record) {
                    Ok(item) => items.push(item),
                    Err(record) => unidentified.push(record),
                }
            }

            FetchOutcome::success(kind, items, unidentified)
        }
        Err(e) => FetchOutcome::failure(kind, e.to_string()),
    }
}

/// Fetch every kind with at most `max_concurrent` requests in flight.
///
/// # Returns
/// One outcome per requested kind, in the same order as `kinds`
pub async fn fetch_all(
    source: &Arc<dyn RecordSource>,
    kinds: &[ResourceKind],
    max_concurrent: usize,
) -> Vec<FetchOutcome> {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));

    let mut handles = Vec::new();

    for &kind in kinds {
        let semaphore = semaphore.clone();
        let source = Arc::clone(source);

        let handle = tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return FetchOutcome::failure(kind, "Worker pool closed".to_string());
            };

            // The record source performs blocking HTTP calls
            tokio::task::spawn_blocking(move || fetch_kind(source.as_ref(), kind))
                .await
                .unwrap_or_else(|e| FetchOutcome::failure(kind, format!("Task panicked: {}", e)))
        });

        handles.push((kind, handle));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (kind, handle) in handles {
        let outcome = handle
            .await
            .unwrap_or_else(|e| FetchOutcome::failure(kind, format!("Task panicked: {}", e)));
        results.push(outcome);
    }

    results
}
