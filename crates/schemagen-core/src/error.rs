//! Error types and result aliases for schemagen.
//!
//! Errors are split by how far they reach: catalog and manifest failures are
//! fatal for a run, transform and render failures only cost the entry they
//! belong to.

use std::path::PathBuf;

/// The result type used by the loading stages.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised while loading an input document (catalog or manifest).
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The input document does not exist.
    #[error("not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The input document exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// The underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// The input document is not valid JSON, or lacks the expected shape.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Path of the malformed document.
        path: PathBuf,
        /// The underlying cause.
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    /// Maps an I/O error on `path` to `NotFound` or `Io`.
    #[must_use]
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}

/// Errors projecting a single catalog entry into a schema document.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// A field the template needs is missing from the entry.
    #[error("entry {unique_id} is missing field `{field}`")]
    MissingField {
        /// Identifier of the offending entry.
        unique_id: String,
        /// Dotted path of the missing field.
        field: String,
    },

    /// The entry does not have the shape of a catalog node.
    #[error("invalid catalog entry {key}: {message}")]
    InvalidEntry {
        /// Catalog key of the entry.
        key: String,
        /// Description of what was wrong.
        message: String,
    },
}

/// Errors rendering a schema document to YAML.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The document could not be converted into a YAML value.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A mapping key that cannot be written on a single line.
    #[error("unsupported mapping key: {0}")]
    UnsupportedKey(String),
}

/// Fatal errors for a generator run.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// An input document could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
