//! End-to-end generator run: locate, load, select, transform, write.
//!
//! Every selected entry ends in exactly one [`ModelOutcome`]. A bad entry or a
//! failed write is recorded and the run moves on; only a malformed input
//! document stops the run.

use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, CatalogEntry, load_catalog};
use crate::document::SchemaDocument;
use crate::error::{CatalogError, GeneratorError};
use crate::manifest::ManifestIndex;
use crate::observability::{generator_span, model_span};
use crate::path_index::{ModelLocator, PathIndex};
use crate::transform::{TransformOptions, transform};
use crate::writer::{SchemaWriter, WriteResult};

/// Directory dbt compiles into, relative to the project.
pub const TARGET_DIR: &str = "target";
/// Catalog file name inside the target directory.
pub const CATALOG_FILE: &str = "catalog.json";
/// Manifest file name inside the target directory.
pub const MANIFEST_FILE: &str = "manifest.json";
/// Directories never scanned for model files.
pub const DEFAULT_EXCLUDED_DIRS: [&str; 2] = [TARGET_DIR, "dbt_packages"];

/// Where model source paths come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathSource {
    /// Walk the project tree.
    #[default]
    Scan,
    /// Read `original_file_path` from the manifest.
    Manifest,
}

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Root of the dbt project.
    pub project_dir: PathBuf,
    /// Catalog document to read.
    pub catalog_path: PathBuf,
    /// Manifest document, used with [`PathSource::Manifest`].
    pub manifest_path: PathBuf,
    /// How model files are located.
    pub path_source: PathSource,
    /// Directory walked with [`PathSource::Scan`].
    pub search_root: PathBuf,
    /// Directory names pruned from the walk.
    pub excluded_dirs: Vec<String>,
    /// Only generate for models with this name (any case).
    pub model_filter: Option<String>,
    /// Overwrite existing schema files.
    pub update: bool,
    /// Declare `unique` tests on columns.
    pub unique_tests: bool,
    /// Reuse the previous model's path when a model cannot be located.
    pub fallback_on_miss: bool,
}

impl GeneratorConfig {
    /// Defaults for a project rooted at `project_dir`.
    #[must_use]
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let target = project_dir.join(TARGET_DIR);
        Self {
            catalog_path: target.join(CATALOG_FILE),
            manifest_path: target.join(MANIFEST_FILE),
            path_source: PathSource::Scan,
            search_root: project_dir.clone(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(ToString::to_string).collect(),
            model_filter: None,
            update: false,
            unique_tests: false,
            fallback_on_miss: false,
            project_dir,
        }
    }

    /// Options handed to the transformer.
    #[must_use]
    pub const fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            unique_tests: self.unique_tests,
            fallback_on_miss: self.fallback_on_miss,
        }
    }
}

/// What happened to one selected catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// The entry could not be turned into a document.
    TransformFailed {
        /// Why the transform failed.
        reason: String,
    },
    /// The document reached the writer.
    Write(WriteResult),
}

/// Per-entry record in a [`RunSummary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOutcome {
    /// Catalog identifier of the entry.
    pub unique_id: String,
    /// Model name, empty if the entry had none.
    pub model: String,
    /// Result for this entry.
    pub status: OutcomeStatus,
}

/// Counts and outcomes of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries selected from the catalog.
    pub selected: usize,
    /// Entries dropped during transformation.
    pub transform_failed: usize,
    /// Files written.
    pub written: usize,
    /// Files left untouched.
    pub skipped: usize,
    /// Documents that could not be written.
    pub failed: usize,
    /// One outcome per selected entry, in catalog order.
    pub outcomes: Vec<ModelOutcome>,
}

impl RunSummary {
    /// Documents that reached the writer.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.written + self.skipped + self.failed
    }

    fn record(&mut self, outcome: ModelOutcome) {
        match &outcome.status {
            OutcomeStatus::TransformFailed { .. } => self.transform_failed += 1,
            OutcomeStatus::Write(WriteResult::Written { .. }) => self.written += 1,
            OutcomeStatus::Write(WriteResult::Skipped { .. }) => self.skipped += 1,
            OutcomeStatus::Write(WriteResult::Failed { .. }) => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }
}

/// Runs the generator for one project.
#[derive(Debug, Clone)]
pub struct SchemaGenerator {
    config: GeneratorConfig,
}

impl SchemaGenerator {
    /// Creates a generator for `config`.
    #[must_use]
    pub const fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// The generator's configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates schema files for every selected model.
    ///
    /// A missing catalog or manifest is logged and yields an empty or
    /// unlocated run.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Catalog`] if an input document exists but
    /// cannot be read or parsed.
    pub fn run(&self) -> Result<RunSummary, GeneratorError> {
        let config = &self.config;
        let span = generator_span(&config.project_dir);
        let _guard = span.enter();
        tracing::info!("---- schemagen started ----");

        let mut locator = self.locator()?;
        let catalog = match load_catalog(&config.catalog_path) {
            Ok(catalog) => catalog,
            Err(CatalogError::NotFound { path }) => {
                tracing::error!(
                    path = %path.display(),
                    "catalog.json not found; run `dbt docs generate` first"
                );
                Catalog::default()
            }
            Err(error) => return Err(error.into()),
        };

        let selected = catalog.select_models(config.model_filter.as_deref());
        let names: Vec<&str> = selected.iter().filter_map(|entry| entry.name()).collect();
        tracing::info!("...Processing {} models...", selected.len());
        if !names.is_empty() {
            tracing::info!("{names:?}");
        }

        let summary = generate(&selected, locator.as_mut(), config);
        tracing::info!(
            selected = summary.selected,
            written = summary.written,
            skipped = summary.skipped,
            failed = summary.failed,
            transform_failed = summary.transform_failed,
            "---- schemagen finished ----"
        );
        Ok(summary)
    }

    fn locator(&self) -> Result<Box<dyn ModelLocator>, GeneratorError> {
        let config = &self.config;
        match config.path_source {
            PathSource::Scan => Ok(Box::new(PathIndex::build_excluding(
                &config.search_root,
                &config.excluded_dirs,
            ))),
            PathSource::Manifest => {
                let project_dir = canonical(&config.project_dir);
                match ManifestIndex::load(&config.manifest_path, &project_dir) {
                    Ok(index) => Ok(Box::new(index)),
                    Err(CatalogError::NotFound { path }) => {
                        tracing::error!(path = %path.display(), "manifest.json not found");
                        Ok(Box::new(ManifestIndex::default()))
                    }
                    Err(error) => Err(error.into()),
                }
            }
        }
    }
}

/// Transforms and writes `entries`, one outcome per entry.
///
/// All documents are built before any is written, so the locator's fallback
/// cache only ever reflects catalog order.
pub fn generate<L>(entries: &[&CatalogEntry], locator: &mut L, config: &GeneratorConfig) -> RunSummary
where
    L: ModelLocator + ?Sized,
{
    let options = config.transform_options();
    let mut summary = RunSummary {
        selected: entries.len(),
        ..RunSummary::default()
    };

    let mut documents: Vec<(&CatalogEntry, SchemaDocument)> = Vec::with_capacity(entries.len());
    for &entry in entries {
        let span = model_span(entry.display_id());
        let _guard = span.enter();
        match transform(entry, locator, options) {
            Ok(document) => documents.push((entry, document)),
            Err(error) => {
                tracing::error!(unique_id = entry.display_id(), %error, "Error building model object");
                summary.record(ModelOutcome {
                    unique_id: entry.display_id().to_string(),
                    model: entry.name().unwrap_or_default().to_string(),
                    status: OutcomeStatus::TransformFailed {
                        reason: error.to_string(),
                    },
                });
            }
        }
    }

    let mut writer = SchemaWriter::new(config.update);
    for (entry, document) in documents {
        let model = document.model_name().to_string();
        let result = writer.write(document);
        match &result {
            WriteResult::Written { .. } => tracing::info!("Successfully processed {model}"),
            WriteResult::Skipped { .. } => tracing::warn!(
                "Skipped model {model}. Add -u flag to update all the existing models."
            ),
            WriteResult::Failed { reason } => {
                tracing::error!("Error processing {model} | '{reason}'");
            }
        }
        summary.record(ModelOutcome {
            unique_id: entry.display_id().to_string(),
            model,
            status: OutcomeStatus::Write(result),
        });
    }

    summary
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
