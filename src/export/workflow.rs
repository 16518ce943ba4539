use std::path::PathBuf;
use std::sync::Arc;

use super::dump::{DEFAULT_DUMP_LIMIT, dump_outcomes};
use super::error::{ExportError, ExportResult};
use super::fetcher::{RecordSource, fetch_all};
use super::naming::derive_all;
use super::registry::ResourceKind;
use super::renderer::{render_document, write_document};
use super::summary::RunSummary;
use crate::traits::{FileSystem, Output};

/// Default import document path
pub const DEFAULT_OUTPUT_PATH: &str = "imports.hcl";

/// Default number of kinds fetched at once
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Options for the export workflow
#[derive(Debug, Clone)]
pub struct ExportWorkflowOptions {
    /// Where the import document is written
    pub output_path: PathBuf,
    /// Optional JSON-lines sample of raw records
    pub dump_path: Option<PathBuf>,
    /// Records per kind in the dump
    pub dump_limit: usize,
    /// Maximum kinds fetched concurrently
    pub concurrency: usize,
}

impl Default for ExportWorkflowOptions {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            dump_path: None,
            dump_limit: DEFAULT_DUMP_LIMIT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Orchestrates fetch, naming and rendering for one run
pub struct ExportWorkflow<'a> {
    options: ExportWorkflowOptions,
    output: &'a dyn Output,
    fs: &'a dyn FileSystem,
}

impl<'a> ExportWorkflow<'a> {
    /// Create a new export workflow
    pub fn new(
        options: ExportWorkflowOptions,
        output: &'a dyn Output,
        fs: &'a dyn FileSystem,
    ) -> Self {
        Self {
            options,
            output,
            fs,
        }
    }

    /// Execute the export workflow.
    ///
    /// `connect` is only invoked when at least one kind is enabled, so an empty
    /// selection never needs tenant credentials.
    pub fn execute<F>(&self, kinds: &[ResourceKind], connect: F) -> ExportResult<RunSummary>
    where
        F: FnOnce() -> ExportResult<Arc<dyn RecordSource>>,
    {
        self.output.section("Jamf Pro Export");

        // Step 1: Fetch every enabled kind
        let outcomes = if kinds.is_empty() {
            self.output
                .info("No resource kinds enabled; writing an empty document");
            Vec::new()
        } else {
            let source = connect()?;
            self.output.info(&format!(
                "Fetching {} resource kind(s) with up to {} concurrent request(s)...",
                kinds.len(),
                self.options.concurrency.max(1)
            ));

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(fetch_all(&source, kinds, self.options.concurrency))
        };

        for outcome in &outcomes {
            match &outcome.error {
                None => self.output.success(&format!(
                    "{}: {} item(s)",
                    outcome.kind,
                    outcome.items.len()
                )),
                Some(error) => self.output.error(&format!("{}: {}", outcome.kind, error)),
            }
        }

        // Step 2: Optional debug dump, never fatal
        if let Some(path) = &self.options.dump_path {
            match dump_outcomes(self.fs, path, self.options.dump_limit, &outcomes) {
                Ok(count) => self.output.dimmed(&format!(
                    "Wrote {} sample record(s) to {}",
                    count,
                    path.display()
                )),
                Err(e) => self.output.warning(&format!("Debug dump failed: {}", e)),
            }
        }

        // Step 3: Derive identifiers
        let derived = derive_all(&outcomes);
        let summary = RunSummary::new(&outcomes, &derived);

        if !outcomes.is_empty() && summary.succeeded_count() == 0 {
            summary.display(self.output);
            return Err(ExportError::NothingFetched {
                failures: summary.failures(),
            });
        }

        // Step 4: Render and replace the document
        let document = render_document(&derived);
        write_document(self.fs, &self.options.output_path, &document)?;

        summary.display(self.output);
        self.output.success(&format!(
            "Wrote {} import block(s) to {}",
            summary.block_count(),
            self.options.output_path.display()
        ));

        Ok(summary)
    }
}
