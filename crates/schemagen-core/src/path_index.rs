//! Locating model source files on disk.
//!
//! The index maps a lower-cased file base-name (everything before the first
//! `.`) to the file's path. It is built with a single walk over the project
//! tree. When two files share a base-name, the one visited last wins; the walk
//! is sorted by file name so the winner is stable between runs. Schema files
//! (`.yml`/`.yaml`) are never indexed: they share their model's base-name and
//! would otherwise shadow it once a schema has been generated.
//!
//! Lookups can optionally fall back to the most recent successful resolution.
//! This is off unless a caller asks for it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::writer::OUTPUT_EXTENSION;

/// Extensions of files that describe models rather than define them.
pub const SCHEMA_EXTENSIONS: [&str; 2] = [OUTPUT_EXTENSION, "yaml"];

/// Something that can turn a bare model identifier into a source file path.
pub trait ModelLocator {
    /// Resolves `model_identifier` to a path.
    ///
    /// With `fallback_on_miss`, an unknown identifier yields the last path this
    /// locator successfully resolved, if any.
    fn locate(&mut self, model_identifier: &str, fallback_on_miss: bool) -> Option<PathBuf>;
}

/// Base-name to path index over a directory tree.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    paths: HashMap<String, PathBuf>,
    last_resolved: Option<PathBuf>,
}

impl PathIndex {
    /// Walks `root` and indexes every file below it.
    #[must_use]
    pub fn build(root: impl AsRef<Path>) -> Self {
        Self::build_excluding::<&str>(root, &[])
    }

    /// Walks `root`, pruning any directory whose name is in `excluded_dirs`.
    ///
    /// Unreadable entries are skipped.
    #[must_use]
    pub fn build_excluding<S: AsRef<str>>(root: impl AsRef<Path>, excluded_dirs: &[S]) -> Self {
        let root = root.as_ref();
        let mut paths = HashMap::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !excluded_dirs
                        .iter()
                        .any(|name| entry.file_name() == name.as_ref())
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::debug!(%error, "skipping unreadable path during index walk");
                    continue;
                }
            };
            if !entry.file_type().is_file() || is_schema_file(entry.path()) {
                continue;
            }
            let Some(key) = index_key(entry.file_name().to_string_lossy().as_ref()) else {
                continue;
            };
            paths.insert(key, entry.into_path());
        }

        tracing::debug!(root = %root.display(), files = paths.len(), "built path index");
        Self {
            paths,
            last_resolved: None,
        }
    }

    /// Builds an index from explicit `(base-name, path)` pairs.
    ///
    /// Keys are lower-cased; later pairs overwrite earlier ones.
    pub fn from_entries<K, P>(entries: impl IntoIterator<Item = (K, P)>) -> Self
    where
        K: AsRef<str>,
        P: Into<PathBuf>,
    {
        let paths = entries
            .into_iter()
            .map(|(key, path)| (key.as_ref().to_lowercase(), path.into()))
            .collect();
        Self {
            paths,
            last_resolved: None,
        }
    }

    /// Number of indexed base-names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Plain lookup. Does not touch the fallback cache.
    #[must_use]
    pub fn get(&self, model_identifier: &str) -> Option<&Path> {
        self.paths
            .get(&model_identifier.to_lowercase())
            .map(PathBuf::as_path)
    }

    /// The path recorded by the most recent successful [`resolve`](Self::resolve).
    #[must_use]
    pub fn last_resolved(&self) -> Option<&Path> {
        self.last_resolved.as_deref()
    }

    /// Resolves `model_identifier`, recording hits for later fallback.
    pub fn resolve(&mut self, model_identifier: &str, fallback_on_miss: bool) -> Option<PathBuf> {
        let hit = if model_identifier.is_empty() {
            None
        } else {
            self.paths.get(&model_identifier.to_lowercase()).cloned()
        };

        match hit {
            Some(path) => {
                self.last_resolved = Some(path.clone());
                Some(path)
            }
            None if fallback_on_miss => self.last_resolved.clone(),
            None => None,
        }
    }

    /// Like [`resolve`](Self::resolve) but renders a miss as an empty string.
    pub fn resolve_or_empty(&mut self, model_identifier: &str, fallback_on_miss: bool) -> String {
        self.resolve(model_identifier, fallback_on_miss)
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl ModelLocator for PathIndex {
    fn locate(&mut self, model_identifier: &str, fallback_on_miss: bool) -> Option<PathBuf> {
        self.resolve(model_identifier, fallback_on_miss)
    }
}

fn is_schema_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        SCHEMA_EXTENSIONS
            .iter()
            .any(|schema| ext.eq_ignore_ascii_case(schema))
    })
}

/// Lower-cased text before the first `.` of a file name.
fn index_key(file_name: &str) -> Option<String> {
    file_name
        .split('.')
        .next()
        .filter(|stem| !stem.is_empty())
        .map(str::to_lowercase)
}
