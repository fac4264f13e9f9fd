//! Shared test utilities for schemagen tests.
//!
//! This crate provides:
//! - [`CatalogBuilder`]: catalog documents shaped like dbt's `catalog.json`
//! - [`TestProject`]: a temporary project tree with a `target/` directory
//! - Custom assertion helpers for run summaries and generated YAML
//!
//! # Example
//!
//! ```rust,ignore
//! use schemagen_test_utils::{TestProject, company_catalog, assert_all_written};
//!
//! let project = TestProject::new();
//! project.add_model("models/icims/COMPANY.sql");
//! project.write_catalog(&company_catalog());
//! let summary = SchemaGenerator::new(project.config()).run().unwrap();
//! assert_all_written(&summary);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
// Test utilities use expect/unwrap for cleaner test code - panics are acceptable in tests
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;

/// Initialize test logging (call once per test module).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("schemagen_core=debug".parse().expect("valid directive")),
        )
        .with_test_writer()
        .try_init();
}
