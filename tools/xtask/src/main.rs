//! Workspace automation tasks.
//!
//! Run with: `cargo xtask <command>`

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

const CRATE_PREFIX: &str = "schemagen-";

#[derive(Parser)]
#[command(name = "xtask", about = "schemagen workspace automation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run formatting, clippy, tests and docs like CI does
    Ci,
    /// Validate crate naming and layout
    Lint,
    /// Generate schemas for a dbt project with a debug build
    Generate {
        /// dbt project root
        #[arg(long, default_value = ".")]
        project_dir: String,
        /// Overwrite existing schema files
        #[arg(short, long)]
        update: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci => run_ci(),
        Commands::Lint => run_lint(Path::new("crates")),
        Commands::Generate {
            project_dir,
            update,
        } => run_generate(&project_dir, update),
    }
}

fn run_ci() -> Result<()> {
    println!("Running CI checks...\n");

    run_cmd("cargo", &["fmt", "--check"])?;
    run_cmd("cargo", &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?;
    run_cmd("cargo", &["test", "--workspace"])?;
    run_cmd("cargo", &["doc", "--workspace", "--no-deps"])?;

    println!("\nAll CI checks passed!");
    Ok(())
}

fn run_lint(crates_dir: &Path) -> Result<()> {
    println!("Validating workspace conventions...\n");

    for entry in std::fs::read_dir(crates_dir)
        .with_context(|| format!("Failed to read {}", crates_dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(CRATE_PREFIX) {
            anyhow::bail!("Crate '{name}' does not follow {CRATE_PREFIX}* naming");
        }
        let path = entry.path();
        if !path.join("Cargo.toml").is_file() {
            anyhow::bail!("Crate '{name}' has no Cargo.toml");
        }
        if !path.join("src/lib.rs").is_file() {
            anyhow::bail!("Crate '{name}' has no src/lib.rs");
        }
    }

    println!("All conventions validated!");
    Ok(())
}

fn run_generate(project_dir: &str, update: bool) -> Result<()> {
    let mut args = vec!["run", "-p", "schemagen-cli", "--", "--project-dir", project_dir];
    if update {
        args.push("--update");
    }
    run_cmd("cargo", &args)
}

fn run_cmd(cmd: &str, args: &[&str]) -> Result<()> {
    println!("$ {} {}", cmd, args.join(" "));
    let status = Command::new(cmd)
        .args(args)
        .status()
        .with_context(|| format!("Failed to run: {} {}", cmd, args.join(" ")))?;

    if !status.success() {
        anyhow::bail!("Command failed: {} {}", cmd, args.join(" "));
    }
    Ok(())
}
