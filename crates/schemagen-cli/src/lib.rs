//! # schemagen-cli
//!
//! Command-line interface for the dbt schema-test generator.
//!
//! ## Usage
//!
//! ```text
//! schemagen --project-dir /app/dbt_transform --model company -u
//! ```
//!
//! ## Configuration
//!
//! All settings come from flags. `RUST_LOG` controls log verbosity only.
//! The project directory also accepts the older single-dash `-pd` spelling
//! (see [`normalize_args`]).

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use schemagen_core::{GeneratorConfig, LogFormat, PathSource};

/// Generate dbt schema-test YAML from a project's catalog.
#[derive(Debug, Parser)]
#[command(name = "schemagen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory of the dbt project.
    #[arg(short = 'p', long, visible_alias = "pd", default_value = ".")]
    pub project_dir: PathBuf,

    /// Only generate the model with this name (case-insensitive).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Overwrite schema files that already exist.
    #[arg(short, long)]
    pub update: bool,

    /// Catalog file (default: `<project-dir>/target/catalog.json`).
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Manifest file (default: `<project-dir>/target/manifest.json`).
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// How model files are located.
    #[arg(long, value_enum, default_value_t = PathSourceArg::Scan)]
    pub path_source: PathSourceArg,

    /// Directory scanned for model files (default: the project dir).
    #[arg(long)]
    pub search_root: Option<PathBuf>,

    /// Declare a `unique` test on every column.
    #[arg(long)]
    pub unique_tests: bool,

    /// Reuse the previous model's path when a model file cannot be found.
    #[arg(long)]
    pub fallback_on_miss: bool,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,
}

impl Cli {
    /// Generator settings for the parsed flags.
    #[must_use]
    pub fn config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::new(&self.project_dir);
        if let Some(catalog) = &self.catalog {
            config.catalog_path.clone_from(catalog);
        }
        if let Some(manifest) = &self.manifest {
            config.manifest_path.clone_from(manifest);
        }
        if let Some(search_root) = &self.search_root {
            config.search_root.clone_from(search_root);
        }
        config.path_source = self.path_source.into();
        config.model_filter.clone_from(&self.model);
        config.update = self.update;
        config.unique_tests = self.unique_tests;
        config.fallback_on_miss = self.fallback_on_miss;
        config
    }

    /// Log format for the parsed flags.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.into()
    }
}

/// Rewrites the legacy `-pd` flag to `--pd`.
///
/// clap would otherwise read `-pd` as `-p d`. Only whole arguments are
/// rewritten (`-pd`, `-pd=<dir>`); everything after `--` is left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            let arg: OsString = arg.into();
            if passthrough {
                return arg;
            }
            let rewritten = match arg.to_str() {
                Some("--") => {
                    passthrough = true;
                    None
                }
                Some("-pd") => Some(OsString::from("--pd")),
                Some(text) => text
                    .strip_prefix("-pd=")
                    .map(|dir| OsString::from(format!("--pd={dir}"))),
                None => None,
            };
            rewritten.unwrap_or(arg)
        })
        .collect()
}

/// Model path source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PathSourceArg {
    /// Walk the project tree.
    #[default]
    Scan,
    /// Read paths from `manifest.json`.
    Manifest,
}

impl From<PathSourceArg> for PathSource {
    fn from(arg: PathSourceArg) -> Self {
        match arg {
            PathSourceArg::Scan => Self::Scan,
            PathSourceArg::Manifest => Self::Manifest,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}
