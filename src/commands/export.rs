use crate::context::Context;
use crate::export::dump::DEFAULT_DUMP_LIMIT;
use crate::export::workflow::{DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_PATH};
use crate::export::{
    ExportError, ExportResult, ExportWorkflow, ExportWorkflowOptions, JamfClient, JamfConfig,
    RecordSource, Selection, enabled_kinds,
};
use anyhow::{Context as _, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Selection document mapping resource kinds to true/false
    #[arg(short, long)]
    pub config: PathBuf,

    /// Where to write the Terraform import blocks
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    pub out: PathBuf,

    /// Write a JSON-lines sample of raw records to this path
    #[arg(long)]
    pub dump: Option<PathBuf>,

    /// Records per resource kind written to the dump
    #[arg(long, default_value_t = DEFAULT_DUMP_LIMIT)]
    pub dump_limit: usize,

    /// Maximum number of resource kinds fetched at once
    #[arg(
        long,
        default_value_t = DEFAULT_CONCURRENCY,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub concurrency: usize,

    /// Jamf Pro tenant URL
    #[arg(long, env = "JAMF_URL")]
    pub url: Option<String>,

    /// OAuth client id
    #[arg(long, env = "JAMF_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "JAMF_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
}

pub struct ExportCommand;

impl ExportCommand {
    /// Execute the export command
    pub fn execute(ctx: &Context, args: &ExportArgs) -> Result<()> {
        let selection = Selection::load(ctx.fs.as_ref(), &args.config)
            .context("Failed to load selection document")?;

        let selected = enabled_kinds(&selection);
        for key in &selected.unknown_keys {
            ctx.output
                .warning(&format!("Ignoring unknown resource kind '{}'", key));
        }

        let options = ExportWorkflowOptions {
            output_path: args.out.clone(),
            dump_path: args.dump.clone(),
            dump_limit: args.dump_limit,
            concurrency: args.concurrency,
        };
        let workflow = ExportWorkflow::new(options, ctx.output.as_ref(), ctx.fs.as_ref());

        let summary = workflow
            .execute(&selected.kinds, || Self::connect(args))
            .context("Export failed")?;

        if summary.failed_count() > 0 {
            ctx.output.warning(&format!(
                "Partial export: {} of {} resource kind(s) failed and were left out",
                summary.failed_count(),
                summary.kinds.len()
            ));
        }

        Ok(())
    }

    /// Build the tenant client from flags or environment
    fn connect(args: &ExportArgs) -> ExportResult<Arc<dyn RecordSource>> {
        let url = Self::required(args.url.as_deref(), "--url", "JAMF_URL")?;
        let client_id = Self::required(args.client_id.as_deref(), "--client-id", "JAMF_CLIENT_ID")?;
        let client_secret = Self::required(
            args.client_secret.as_deref(),
            "--client-secret",
            "JAMF_CLIENT_SECRET",
        )?;

        let config = JamfConfig::new(url, client_id, client_secret)?;
        Ok(Arc::new(JamfClient::new(config)?))
    }

    fn required<'a>(value: Option<&'a str>, flag: &str, env: &str) -> ExportResult<&'a str> {
        match value {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ExportError::InvalidInput(format!(
                "missing {} (set {} or pass {})",
                env.trim_start_matches("JAMF_").to_lowercase().replace('_', " "),
                env,
                flag
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{FileSystem, MockFileSystem, MockOutput};
    use std::path::Path;

    fn args(config: &str) -> ExportArgs {
        ExportArgs {
            config: PathBuf::from(config),
            out: PathBuf::from("/work/imports.hcl"),
            dump: None,
            dump_limit: DEFAULT_DUMP_LIMIT,
            concurrency: DEFAULT_CONCURRENCY,
            url: None,
            client_id: None,
            client_secret: None,
        }
    }

    fn context_with_selection(selection: &str) -> (Context, Arc<MockFileSystem>, Arc<MockOutput>) {
        let fs = Arc::new(MockFileSystem::new());
        fs.write(Path::new("/work/selection.json"), selection).unwrap();
        let output = Arc::new(MockOutput::new());
        let ctx = Context::test_with(fs.clone(), output.clone());
        (ctx, fs, output)
    }

    #[test]
    fn test_empty_selection_needs_no_credentials() {
        let (ctx, fs, _output) = context_with_selection(r#"{"policy": false}"#);

        ExportCommand::execute(&ctx, &args("/work/selection.json")).unwrap();

        assert_eq!(
            fs.get_file_contents(Path::new("/work/imports.hcl")),
            Some(String::new())
        );
    }

    #[test]
    fn test_unknown_keys_are_warned_about() {
        let (ctx, _fs, output) = context_with_selection(r#"{"printer": true, "script": false}"#);

        ExportCommand::execute(&ctx, &args("/work/selection.json")).unwrap();

        assert!(
            output
                .get_warnings()
                .iter()
                .any(|w| w.contains("'printer'"))
        );
    }

    #[test]
    fn test_missing_url_is_reported_before_fetching() {
        let (ctx, fs, _output) = context_with_selection(r#"{"script": true}"#);

        let err = ExportCommand::execute(&ctx, &args("/work/selection.json")).unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("Export failed"));
        assert!(message.contains("JAMF_URL"));
        assert!(!fs.has_file(Path::new("/work/imports.hcl")));
    }

    #[test]
    fn test_blank_secret_counts_as_missing() {
        let (ctx, _fs, _output) = context_with_selection(r#"{"script": true}"#);
        let args = ExportArgs {
            url: Some("https://tenant.jamfcloud.com".to_string()),
            client_id: Some("client".to_string()),
            client_secret: Some("  ".to_string()),
            ..args("/work/selection.json")
        };

        let err = ExportCommand::execute(&ctx, &args).unwrap_err();

        assert!(format!("{:#}", err).contains("JAMF_CLIENT_SECRET"));
    }

    #[test]
    fn test_missing_selection_document_fails() {
        let (ctx, _fs, _output) = context_with_selection("{}");

        let err = ExportCommand::execute(&ctx, &args("/work/other.json")).unwrap_err();

        assert!(err.to_string().contains("Failed to load selection document"));
    }

    #[test]
    fn test_malformed_selection_fails() {
        let (ctx, fs, _output) = context_with_selection(r#"{"script": "yes"}"#);

        let err = ExportCommand::execute(&ctx, &args("/work/selection.json")).unwrap_err();

        assert!(format!("{:#}", err).contains("selection.json"));
        assert!(!fs.has_file(Path::new("/work/imports.hcl")));
    }
}
