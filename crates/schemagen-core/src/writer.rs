//! Writing schema documents next to their model files.
//!
//! The output file sits beside the model source with its extension replaced
//! by `yml` (`models/orders.sql` -> `models/orders.yml`). Existing files are
//! left alone unless the writer was created with `update`, and no path is
//! written twice in one run.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::document::SchemaDocument;
use crate::render::to_yaml_string;

/// Extension given to generated files.
pub const OUTPUT_EXTENSION: &str = "yml";

/// Outcome of writing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// The file was created or overwritten.
    Written {
        /// Path that was written.
        path: PathBuf,
    },
    /// The file was left untouched.
    Skipped {
        /// Path that already existed.
        path: PathBuf,
    },
    /// Nothing could be written.
    Failed {
        /// Why the write failed.
        reason: String,
    },
}

impl WriteResult {
    /// Whether the file was written.
    #[must_use]
    pub const fn is_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

impl fmt::Display for WriteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Written { path } => write!(f, "written to {}", path.display()),
            Self::Skipped { path } => write!(f, "skipped, {} exists", path.display()),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Output path for a model source path, or `None` if the model was not located.
#[must_use]
pub fn output_path_for(original_file_path: &str) -> Option<PathBuf> {
    if original_file_path.is_empty() {
        return None;
    }
    Some(Path::new(original_file_path).with_extension(OUTPUT_EXTENSION))
}

/// Writes documents for one run.
#[derive(Debug, Default)]
pub struct SchemaWriter {
    update: bool,
    written: HashSet<PathBuf>,
}

impl SchemaWriter {
    /// Creates a writer; `update` allows overwriting existing files.
    #[must_use]
    pub fn new(update: bool) -> Self {
        Self {
            update,
            written: HashSet::new(),
        }
    }

    /// Writes `document` to the path derived from its `original_file_path`.
    ///
    /// Never panics or returns an error: every failure is folded into
    /// [`WriteResult::Failed`].
    pub fn write(&mut self, document: SchemaDocument) -> WriteResult {
        let model_name = document.model_name().to_string();
        let Some(path) = output_path_for(document.original_file_path()) else {
            return WriteResult::Failed {
                reason: format!("no source file found for model {model_name}"),
            };
        };

        if self.written.contains(&path) {
            tracing::warn!(
                model = %model_name,
                path = %path.display(),
                "output path already written in this run"
            );
            return WriteResult::Skipped { path };
        }
        if path.exists() && !self.update {
            return WriteResult::Skipped { path };
        }

        tracing::info!("...Writing {model_name}");
        let document = document.stamped();
        let yaml = match to_yaml_string(&document) {
            Ok(yaml) => yaml,
            Err(error) => {
                return WriteResult::Failed {
                    reason: error.to_string(),
                };
            }
        };
        tracing::debug!(model = %model_name, "rendered document:\n{yaml}");

        match std::fs::write(&path, yaml) {
            Ok(()) => {
                self.written.insert(path.clone());
                WriteResult::Written { path }
            }
            Err(error) => WriteResult::Failed {
                reason: format!("failed to write {}: {error}", path.display()),
            },
        }
    }
}
