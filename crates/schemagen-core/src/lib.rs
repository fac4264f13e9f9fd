//! # schemagen-core
//!
//! Generates dbt schema-test YAML scaffolding from a project's compiled
//! `catalog.json`.
//!
//! A run goes through four stages:
//!
//! - **Path index**: walk the project once and map model base-names to files
//! - **Catalog**: merge the catalog's `sources` and `nodes`, select models
//! - **Transform**: project each entry onto the fixed schema-test template
//! - **Writer**: render YAML beside the model file, honoring the update flag
//!
//! ## Example
//!
//! ```rust,no_run
//! use schemagen_core::prelude::*;
//!
//! let mut config = GeneratorConfig::new("/app/dbt_transform");
//! config.model_filter = Some("company".to_string());
//!
//! let summary = SchemaGenerator::new(config).run()?;
//! println!("{} written, {} skipped", summary.written, summary.skipped);
//! # Ok::<(), schemagen_core::GeneratorError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod document;
pub mod error;
pub mod manifest;
pub mod observability;
pub mod path_index;
pub mod pipeline;
pub mod render;
pub mod transform;
pub mod writer;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::catalog::{Catalog, CatalogEntry, ColumnEntry, load_catalog};
    pub use crate::document::{ColumnDocument, ModelDocument, SchemaDocument};
    pub use crate::error::{CatalogError, GeneratorError, RenderError, TransformError};
    pub use crate::manifest::ManifestIndex;
    pub use crate::path_index::{ModelLocator, PathIndex};
    pub use crate::pipeline::{GeneratorConfig, PathSource, RunSummary, SchemaGenerator};
    pub use crate::transform::{TransformOptions, transform, transform_columns};
    pub use crate::writer::{SchemaWriter, WriteResult};
}

pub use catalog::{Catalog, CatalogEntry, load_catalog};
pub use document::SchemaDocument;
pub use error::{CatalogError, GeneratorError, RenderError, TransformError};
pub use observability::{LogFormat, init_logging};
pub use path_index::{ModelLocator, PathIndex};
pub use pipeline::{GeneratorConfig, ModelOutcome, OutcomeStatus, PathSource, RunSummary, SchemaGenerator};
pub use writer::{SchemaWriter, WriteResult};
