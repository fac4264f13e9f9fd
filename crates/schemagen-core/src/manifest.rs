//! Model locations from a compiled `manifest.json`.
//!
//! Older projects located models through the manifest rather than by walking
//! the tree. Each `model.*` node carries its `root_path` and the model file's
//! `original_file_path` relative to it. Only nodes belonging to the project
//! itself (matching `root_path` directory name) are indexed, so models pulled
//! in from packages are ignored.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{CatalogError, Result};
use crate::path_index::ModelLocator;

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    nodes: Option<IndexMap<String, ManifestNode>>,
}

#[derive(Debug, Deserialize)]
struct ManifestNode {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    root_path: Option<String>,
    #[serde(default)]
    original_file_path: Option<String>,
}

/// Model name to source path, read from a manifest.
#[derive(Debug, Clone, Default)]
pub struct ManifestIndex {
    paths: HashMap<String, PathBuf>,
    last_resolved: Option<PathBuf>,
}

impl ManifestIndex {
    /// Parses manifest JSON text, keeping models rooted at `project_dir`.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `json` is not a manifest document.
    pub fn from_json_str(
        json: &str,
        project_dir: impl AsRef<Path>,
    ) -> std::result::Result<Self, serde_json::Error> {
        let raw: RawManifest = serde_json::from_str(json)?;
        let project_name = dir_name(project_dir.as_ref());

        let mut paths = HashMap::new();
        for (key, node) in raw.nodes.unwrap_or_default() {
            if !key.starts_with("model") {
                continue;
            }
            let (Some(name), Some(root_path), Some(original_file_path)) =
                (node.name, node.root_path, node.original_file_path)
            else {
                tracing::debug!(%key, "manifest node lacks location fields");
                continue;
            };
            let root_path = PathBuf::from(root_path);
            if dir_name(&root_path) != project_name {
                continue;
            }
            paths.insert(name.to_lowercase(), root_path.join(original_file_path));
        }

        Ok(Self {
            paths,
            last_resolved: None,
        })
    }

    /// Loads the manifest at `path`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the file is missing, `Io` for other read failures and
    /// `Parse` if the content is not a manifest document.
    pub fn load(path: impl AsRef<Path>, project_dir: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::from_io(path, e))?;
        let index =
            Self::from_json_str(&content, project_dir).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!(path = %path.display(), models = index.len(), "loaded manifest");
        Ok(index)
    }

    /// Number of indexed models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no models were indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Plain lookup by model name.
    #[must_use]
    pub fn get(&self, model_name: &str) -> Option<&Path> {
        self.paths.get(&model_name.to_lowercase()).map(PathBuf::as_path)
    }
}

impl ModelLocator for ManifestIndex {
    fn locate(&mut self, model_identifier: &str, fallback_on_miss: bool) -> Option<PathBuf> {
        match self.paths.get(&model_identifier.to_lowercase()) {
            Some(path) => {
                self.last_resolved = Some(path.clone());
                Some(path.clone())
            }
            None if fallback_on_miss => self.last_resolved.clone(),
            None => None,
        }
    }
}

// trailing separators are ignored, as for `/app/dbt_transform/`
fn dir_name(path: &Path) -> Option<String> {
    path.components()
        .next_back()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
}
