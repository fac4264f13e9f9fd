//! Pre-built test fixtures for common test scenarios.
//!
//! Provides builders for catalog/manifest documents and a temporary dbt
//! project tree to run the generator against.

use std::fs;
use std::path::{Path, PathBuf};

use schemagen_core::GeneratorConfig;
use serde_json::{Map, Value, json};
use tempfile::TempDir;

/// Builder for `catalog.json` documents.
///
/// Entries keep insertion order, like the catalog files dbt writes.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    sources: Map<String, Value>,
    nodes: Map<String, Value>,
}

impl CatalogBuilder {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source table `source.<project>.<source>.<name>`.
    #[must_use]
    pub fn source(
        mut self,
        unique_id: &str,
        name: &str,
        comment: Option<&str>,
        columns: &[(&str, &str)],
    ) -> Self {
        self.sources
            .insert(unique_id.to_string(), entry(unique_id, name, comment, columns));
        self
    }

    /// Adds a model `model.<project>.<name>`.
    #[must_use]
    pub fn model(
        mut self,
        unique_id: &str,
        name: &str,
        comment: Option<&str>,
        columns: &[(&str, &str)],
    ) -> Self {
        self.nodes
            .insert(unique_id.to_string(), entry(unique_id, name, comment, columns));
        self
    }

    /// Adds an arbitrary value under `nodes`.
    #[must_use]
    pub fn raw_node(mut self, key: &str, value: Value) -> Self {
        self.nodes.insert(key.to_string(), value);
        self
    }

    /// The catalog document.
    #[must_use]
    pub fn build(&self) -> Value {
        json!({
            "metadata": {"dbt_schema_version": "https://schemas.getdbt.com/dbt/catalog/v1.json"},
            "nodes": self.nodes,
            "sources": self.sources,
            "errors": null
        })
    }
}

fn entry(unique_id: &str, name: &str, comment: Option<&str>, columns: &[(&str, &str)]) -> Value {
    let columns: Map<String, Value> = columns
        .iter()
        .enumerate()
        .map(|(index, (column, data_type))| {
            (
                (*column).to_string(),
                json!({
                    "type": data_type,
                    "index": index + 1,
                    "name": column,
                    "comment": null
                }),
            )
        })
        .collect();

    json!({
        "metadata": {
            "type": "BASE TABLE",
            "schema": "RAW",
            "name": name,
            "database": "ANALYTICS",
            "comment": comment,
            "owner": "TRANSFORMER"
        },
        "columns": columns,
        "stats": {},
        "unique_id": unique_id
    })
}

/// The ICIMS `COMPANY` source used across the generator tests.
#[must_use]
pub fn company_catalog() -> CatalogBuilder {
    CatalogBuilder::new().source(
        "source.dbt_ingest.icims.COMPANY",
        "COMPANY",
        Some("RAW TABLE FOR ICIMS COMPANY"),
        &[
            ("RAW_DATA", "VARIANT"),
            ("RAW_INSERTED_TIMESTAMP", "TIMESTAMP_NTZ"),
            ("RAW_FILENAME", "VARCHAR"),
        ],
    )
}

/// A dbt project in a temporary directory.
///
/// The directory is removed when the project is dropped.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// Creates an empty project.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp project"),
        }
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `relative` inside the project.
    #[must_use]
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Writes a model SQL file at `relative` and returns its path.
    pub fn add_model(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().expect("model path has a parent"))
            .expect("create model directory");
        fs::write(&path, "select * from {{ source('icims', 'COMPANY') }}\n")
            .expect("write model file");
        path
    }

    /// Writes `target/catalog.json`.
    pub fn write_catalog(&self, catalog: &CatalogBuilder) {
        self.write_target("catalog.json", &catalog.build());
    }

    /// Writes `target/manifest.json`.
    pub fn write_manifest(&self, manifest: &Value) {
        self.write_target("manifest.json", manifest);
    }

    fn write_target(&self, file_name: &str, value: &Value) {
        let target = self.path("target");
        fs::create_dir_all(&target).expect("create target directory");
        fs::write(
            target.join(file_name),
            serde_json::to_string_pretty(value).expect("serialize fixture"),
        )
        .expect("write target file");
    }

    /// Generator settings for this project.
    #[must_use]
    pub fn config(&self) -> GeneratorConfig {
        GeneratorConfig::new(self.root())
    }

    /// Reads the file at `relative`.
    #[must_use]
    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("read project file")
    }

    /// Parses the YAML file at `relative`.
    #[must_use]
    pub fn read_yaml(&self, relative: &str) -> serde_yaml::Value {
        serde_yaml::from_str(&self.read(relative)).expect("parse generated yaml")
    }

    /// All files below `relative` with the given extension, sorted.
    #[must_use]
    pub fn files_with_extension(&self, relative: &str, extension: &str) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let mut pending = vec![self.path(relative)];
        while let Some(dir) = pending.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    pending.push(path);
                } else if path.extension().is_some_and(|ext| ext == extension) {
                    found.push(path);
                }
            }
        }
        found.sort();
        found
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
