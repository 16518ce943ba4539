//! Identifier Deriver
//!
//! Turns display names into OpenTofu resource names. Identifiers only contain
//! `[a-z0-9_]`, never start with a digit and are unique within their kind.
//! Derivation is order sensitive: when two items collide, the one fetched
//! first keeps the bare name and later ones get `_2`, `_3`, ...

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use super::fetcher::FetchOutcome;
use super::item::{NormalizedItem, RawItem};
use super::registry::ResourceKind;

lazy_static! {
    static ref INVALID_RUN: Regex = Regex::new(r"[^a-z0-9_]+").unwrap();
}

/// Lowercase, collapse invalid runs to `_` and trim underscores
pub fn sanitize(text: &str) -> String {
    let lowered = text.to_lowercase();
    INVALID_RUN
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// Candidate identifier for an item before collision handling.
///
/// Returns the candidate and whether the fallback policy had to be applied
/// because the display name carried nothing usable.
pub fn candidate_identifier(kind: ResourceKind, item: &RawItem) -> (String, bool) {
    let base = sanitize(&item.display_name);

    if base.is_empty() {
        let id = sanitize(&item.remote_id);
        let fallback = if id.is_empty() {
            format!("{}_item", kind.selection_key())
        } else {
            format!("{}_item_{}", kind.selection_key(), id)
        };
        return (fallback, true);
    }

    if base.starts_with(|c: char| c.is_ascii_digit()) {
        return (format!("{}_{}", kind.selection_key(), base), false);
    }

    (base, false)
}

/// Per-kind accumulator of identifiers already handed out
#[derive(Debug, Default)]
pub struct IdentifierAllocator {
    seen: HashSet<String>,
}

impl IdentifierAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `candidate`, or the first free `candidate_N` (N >= 2)
    pub fn allocate(&mut self, candidate: String) -> String {
        if self.seen.insert(candidate.clone()) {
            return candidate;
        }

        let mut suffix = 2;
        loop {
            let attempt = format!("{}_{}", candidate, suffix);
            if self.seen.insert(attempt.clone()) {
                return attempt;
            }
            suffix += 1;
        }
    }
}

/// Identifiers derived for one kind
#[derive(Debug, Clone)]
pub struct DerivedKind {
    pub kind: ResourceKind,
    pub items: Vec<NormalizedItem>,
    /// Items that needed the empty-name fallback
    pub anomalies: usize,
}

/// Assign identifiers to one kind's items, in order
pub fn derive_kind(kind: ResourceKind, items: Vec<RawItem>) -> DerivedKind {
    let mut allocator = IdentifierAllocator::new();
    let mut anomalies = 0;

    let items = items
        .into_iter()
        .map(|item| {
            let (candidate, fallback) = candidate_identifier(kind, &item);
            if fallback {
                anomalies += 1;
            }

            NormalizedItem {
                kind,
                local_identifier: allocator.allocate(candidate),
                item,
            }
        })
        .collect();

    DerivedKind {
        kind,
        items,
        anomalies,
    }
}

/// Derive identifiers for every successfully fetched kind, keeping outcome order
pub fn derive_all(outcomes: &[FetchOutcome]) -> Vec<DerivedKind> {
    outcomes
        .iter()
        .filter(|outcome| outcome.is_success())
        .map(|outcome| derive_kind(outcome.kind, outcome.items.clone()))
        .collect()
}
