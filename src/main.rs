mod commands;
mod context;
mod export;
mod output;
#[cfg(test)]
mod test_helpers;
mod traits;

use anyhow::Result;
use clap::Parser;
use commands::{ExportArgs, ExportCommand};
use context::Context;

#[derive(Parser)]
#[command(name = "jamftf")]
#[command(about = "Export Jamf Pro objects as Terraform import blocks for the jamfpro provider", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    export: ExportArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::new();

    ExportCommand::execute(&ctx, &cli.export)?;

    Ok(())
}
