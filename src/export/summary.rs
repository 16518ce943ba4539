use super::fetcher::FetchOutcome;
use super::naming::DerivedKind;
use super::registry::ResourceKind;
use crate::traits::Output;

/// Per-kind counters reported at the end of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindSummary {
    pub kind: ResourceKind,
    /// Items that produced an import block
    pub fetched: usize,
    /// Records without an identifier
    pub skipped: usize,
    /// Items named through the fallback policy
    pub anomalies: usize,
    /// Fetch error, if the whole kind failed
    pub error: Option<String>,
}

/// Summary of one export run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub kinds: Vec<KindSummary>,
}

impl RunSummary {
    /// Combine fetch outcomes with the identifiers derived from them
    pub fn new(outcomes: &[FetchOutcome], derived: &[DerivedKind]) -> Self {
        let kinds = outcomes
            .iter()
            .map(|outcome| {
                let anomalies = derived
                    .iter()
                    .find(|d| d.kind == outcome.kind)
                    .map(|d| d.anomalies)
                    .unwrap_or(0);

                KindSummary {
                    kind: outcome.kind,
                    fetched: outcome.items.len(),
                    skipped: outcome.skipped(),
                    anomalies,
                    error: outcome.error.clone(),
                }
            })
            .collect();

        Self { kinds }
    }

    pub fn failed_count(&self) -> usize {
        self.kinds.iter().filter(|k| k.error.is_some()).count()
    }

    pub fn succeeded_count(&self) -> usize {
        self.kinds.len() - self.failed_count()
    }

    /// Number of import blocks in the document
    pub fn block_count(&self) -> usize {
        self.kinds.iter().map(|k| k.fetched).sum()
    }

    pub fn anomaly_count(&self) -> usize {
        self.kinds.iter().map(|k| k.anomalies).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.kinds.iter().map(|k| k.skipped).sum()
    }

    /// `(kind, error)` for every failed kind
    pub fn failures(&self) -> Vec<(String, String)> {
        self.kinds
            .iter()
            .filter_map(|k| {
                k.error
                    .as_ref()
                    .map(|e| (k.kind.selection_key().to_string(), e.clone()))
            })
            .collect()
    }

    /// Print the summary section
    pub fn display(&self, output: &dyn Output) {
        output.section("Export Summary");

        for kind in &self.kinds {
            match &kind.error {
                Some(error) => {
                    output.error(&format!("{}: FAILED - {}", kind.kind, error));
                }
                None => {
                    output.key_value(
                        kind.kind.selection_key(),
                        &format!(
                            "{} fetched, {} skipped, {} anomalies",
                            kind.fetched, kind.skipped, kind.anomalies
                        ),
                    );
                }
            }
        }

        output.blank();
        output.key_value("Import blocks", &self.block_count().to_string());
        output.key_value(
            "Kinds",
            &format!(
                "{} succeeded, {} failed",
                self.succeeded_count(),
                self.failed_count()
            ),
        );

        if self.skipped_count() > 0 {
            output.warning(&format!(
                "{} record(s) had no identifier and were not exported",
                self.skipped_count()
            ));
        }

        if self.anomaly_count() > 0 {
            output.warning(&format!(
                "{} item(s) had no usable name and were named from their id",
                self.anomaly_count()
            ));
        }
    }
}
