//! schemagen - generate dbt schema-test YAML.
//!
//! The main entry point for the `schemagen` binary.

use anyhow::{Context, Result};
use clap::Parser;

use schemagen_cli::{Cli, normalize_args};
use schemagen_core::{SchemaGenerator, init_logging};

fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    init_logging(cli.log_format());

    let config = cli.config();
    let project_dir = config.project_dir.display().to_string();
    let summary = SchemaGenerator::new(config)
        .run()
        .with_context(|| format!("schema generation failed for {project_dir}"))?;

    tracing::info!(
        processed = summary.processed(),
        "---- Schema Builder finished ----"
    );
    Ok(())
}
