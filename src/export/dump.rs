//! Debug Dumper
//!
//! Writes a bounded sample of raw records per kind as JSON lines, for
//! troubleshooting unexpected API shapes. Records without an identifier come
//! first, with a null `remoteId`, since they are the ones the import document
//! cannot show. Never influences the import document.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::error::{ExportError, ExportResult};
use super::fetcher::FetchOutcome;
use super::item::record_name;
use super::registry::ResourceKind;
use crate::traits::FileSystem;

/// Default number of records sampled per kind
pub const DEFAULT_DUMP_LIMIT: usize = 5;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DumpRecord<'a> {
    resource_kind: ResourceKind,
    remote_id: Option<&'a str>,
    display_name: &'a str,
    payload: &'a Value,
}

/// Line-delimited JSON buffer of raw records
pub struct DebugDumper {
    buffer: String,
    limit: usize,
    written: usize,
}

impl DebugDumper {
    pub fn new(limit: usize) -> Self {
        Self {
            buffer: String::new(),
            limit,
            written: 0,
        }
    }

    /// Append up to `limit` records of a successful fetch
    pub fn dump(&mut self, outcome: &FetchOutcome) -> ExportResult<()> {
        let mut remaining = self.limit;

        for record in outcome.unidentified.iter().take(remaining) {
            let name = record_name(record).unwrap_or_default();
            self.push(&DumpRecord {
                resource_kind: outcome.kind,
                remote_id: None,
                display_name: &name,
                payload: record,
            })?;
            remaining -= 1;
        }

        for item in outcome.items.iter().take(remaining) {
            self.push(&DumpRecord {
                resource_kind: outcome.kind,
                remote_id: Some(&item.remote_id),
                display_name: &item.display_name,
                payload: &item.payload,
            })?;
        }

        Ok(())
    }

    fn push(&mut self, record: &DumpRecord<'_>) -> ExportResult<()> {
        self.buffer.push_str(&serde_json::to_string(record)?);
        self.buffer.push('\n');
        self.written += 1;
        Ok(())
    }

    /// Number of records buffered so far
    #[cfg(test)]
    pub fn written(&self) -> usize {
        self.written
    }

    /// Replace `path` with the buffered lines and return the record count
    pub fn write_to(self, fs: &dyn FileSystem, path: &Path) -> ExportResult<usize> {
        fs.write(path, &self.buffer).map_err(|e| {
            ExportError::FileSystem(format!("cannot write {}: {:#}", path.display(), e))
        })?;
        Ok(self.written)
    }
}

/// Dump the sample for every successful outcome.
///
/// Returns the number of records written.
pub fn dump_outcomes(
    fs: &dyn FileSystem,
    path: &Path,
    limit: usize,
    outcomes: &[FetchOutcome],
) -> ExportResult<usize> {
    let mut dumper = DebugDumper::new(limit);
    for outcome in outcomes.iter().filter(|o| o.is_success()) {
        dumper.dump(outcome)?;
    }
    dumper.write_to(fs, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::item::RawItem;
    use crate::traits::MockFileSystem;
    use serde_json::json;

    fn outcome(kind: ResourceKind, count: usize) -> FetchOutcome {
        let items = (0..count)
            .map(|i| {
                RawItem::new(i.to_string(), format!("item {}", i))
                    .with_payload(json!({"id": i, "extra": true}))
            })
            .collect();
        FetchOutcome::success(kind, items, Vec::new())
    }

    fn lines(text: &str) -> Vec<Value> {
        text.lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_dump_is_bounded_per_kind() {
        let mut dumper = DebugDumper::new(5);
        dumper.dump(&outcome(ResourceKind::Script, 12)).unwrap();
        dumper.dump(&outcome(ResourceKind::Policy, 2)).unwrap();
        assert_eq!(dumper.written(), 7);

        let fs = MockFileSystem::new();
        let path = Path::new("/tmp/dump.jsonl");
        dumper.write_to(&fs, path).unwrap();

        let records = lines(&fs.get_file_contents(path).unwrap());
        assert_eq!(records.len(), 7);
        assert_eq!(records[0]["resourceKind"], "script");
        assert_eq!(records[0]["remoteId"], "0");
        assert_eq!(records[0]["displayName"], "item 0");
        assert_eq!(records[0]["payload"]["extra"], true);
        assert_eq!(records[6]["resourceKind"], "policy");
    }

    #[test]
    fn test_records_without_id_are_dumped_first() {
        let outcome = FetchOutcome::success(
            ResourceKind::Script,
            vec![RawItem::new("1", "a").with_payload(json!({"id": 1, "name": "a"}))],
            vec![json!({"scriptId": 7, "name": "odd shape"})],
        );

        let mut dumper = DebugDumper::new(5);
        dumper.dump(&outcome).unwrap();
        let fs = MockFileSystem::new();
        let path = Path::new("/tmp/dump.jsonl");
        assert_eq!(dumper.write_to(&fs, path).unwrap(), 2);

        let records = lines(&fs.get_file_contents(path).unwrap());
        assert_eq!(records[0]["remoteId"], Value::Null);
        assert_eq!(records[0]["displayName"], "odd shape");
        assert_eq!(records[0]["payload"]["scriptId"], 7);
        assert_eq!(records[1]["remoteId"], "1");
    }

    #[test]
    fn test_limit_covers_records_without_id() {
        let outcome = FetchOutcome::success(
            ResourceKind::Category,
            vec![RawItem::new("1", "a"), RawItem::new("2", "b")],
            vec![json!("not an object"), json!({"name": "x"})],
        );

        let mut dumper = DebugDumper::new(3);
        dumper.dump(&outcome).unwrap();

        assert_eq!(dumper.written(), 3);
    }

    #[test]
    fn test_dump_outcomes_skips_failures() {
        let fs = MockFileSystem::new();
        let path = Path::new("/out/dump.jsonl");
        let outcomes = vec![
            FetchOutcome::failure(ResourceKind::Category, "denied".to_string()),
            outcome(ResourceKind::MacosConfigurationProfilePlist, 3),
        ];

        let written = dump_outcomes(&fs, path, DEFAULT_DUMP_LIMIT, &outcomes).unwrap();
        assert_eq!(written, 3);

        let text = fs.get_file_contents(path).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("\"resourceKind\":\"macos_configuration_profile_plist\""));
    }

    #[test]
    fn test_dump_outcomes_replaces_previous_dump() {
        let fs = MockFileSystem::new();
        let path = Path::new("/out/dump.jsonl");
        fs.write(path, "stale\nstale\nstale\n").unwrap();

        dump_outcomes(&fs, path, 1, &[outcome(ResourceKind::Script, 4)]).unwrap();

        let text = fs.get_file_contents(path).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(!text.contains("stale"));
    }

    #[test]
    fn test_dump_outcomes_unwritable_path() {
        let fs = MockFileSystem::new().failing_writes();

        let err = dump_outcomes(&fs, Path::new("/ro/dump.jsonl"), 5, &[]).unwrap_err();
        assert!(matches!(err, ExportError::FileSystem(_)));
    }
}
