//! Test helpers for stubbing the Jamf Pro record source

#![cfg(test)]

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::export::error::{ExportError, ExportResult};
use crate::export::fetcher::RecordSource;
use crate::export::registry::ResourceKind;

/// In-memory record source with canned responses per kind
#[derive(Default)]
pub struct StubSource {
    responses: HashMap<ResourceKind, Result<Vec<Value>, String>>,
    calls: Mutex<HashMap<ResourceKind, usize>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `kind` with these records
    pub fn with_records(mut self, kind: ResourceKind, records: Vec<Value>) -> Self {
        self.responses.insert(kind, Ok(records));
        self
    }

    /// Fail every fetch of `kind`
    pub fn with_failure(mut self, kind: ResourceKind, message: &str) -> Self {
        self.responses.insert(kind, Err(message.to_string()));
        self
    }

    /// Number of times `kind` was listed
    pub fn calls(&self, kind: ResourceKind) -> usize {
        self.calls.lock().unwrap().get(&kind).copied().unwrap_or(0)
    }
}

impl RecordSource for StubSource {
    fn list_records(&self, kind: ResourceKind) -> ExportResult<Vec<Value>> {
        *self.calls.lock().unwrap().entry(kind).or_insert(0) += 1;

        match self.responses.get(&kind) {
            Some(Ok(records)) => Ok(records.clone()),
            Some(Err(message)) => Err(ExportError::ProviderApi {
                path: format!("/stub/{}", kind),
                status: 500,
                message: message.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}
