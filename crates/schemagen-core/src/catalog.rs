//! Reading the compiled `catalog.json`.
//!
//! The catalog has two top-level sections, `sources` and `nodes`, each a map
//! from node key (`source.<project>.<source>.<table>`,
//! `model.<project>.<model>`, ...) to an entry describing the relation and
//! its columns. Both sections are merged into one ordered map; a key present
//! in both keeps its first position and takes the `nodes` value.
//!
//! Entries are read one at a time. An entry that does not have the expected
//! shape is kept with the reason attached, so it fails on its own during
//! transformation instead of failing the whole load.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{CatalogError, Result};

/// Key prefixes of catalog entries that get a schema document.
pub const SELECTABLE_PREFIXES: [&str; 2] = ["source", "model"];

/// One relation described by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    /// Catalog key this entry was stored under.
    #[serde(skip)]
    pub key: String,
    /// Dot-delimited identifier; the last segment is the bare model name.
    #[serde(default)]
    pub unique_id: Option<String>,
    /// Relation metadata.
    #[serde(default)]
    pub metadata: Option<EntryMetadata>,
    /// Columns keyed by column name, in document order.
    #[serde(default)]
    pub columns: Option<IndexMap<String, ColumnEntry>>,
    /// Why the entry could not be read, if it could not.
    #[serde(skip)]
    pub invalid: Option<String>,
}

/// The `metadata` block of a catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntryMetadata {
    /// Relation name, case as reported by the warehouse.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text relation comment.
    #[serde(default)]
    pub comment: Option<String>,
}

/// A column as described by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ColumnEntry {
    /// Column name.
    #[serde(default)]
    pub name: Option<String>,
    /// Declared warehouse type.
    #[serde(default, rename = "type")]
    pub data_type: Option<String>,
    /// Free-text column comment.
    #[serde(default)]
    pub comment: Option<String>,
}

impl CatalogEntry {
    /// Reads the entry stored under `key`.
    ///
    /// A value that does not match the entry shape still yields an entry:
    /// `unique_id` and `metadata.name` are kept when they are strings and
    /// [`invalid`](Self::invalid) carries the parser message.
    #[must_use]
    pub fn from_value(key: impl Into<String>, value: &Value) -> Self {
        let key = key.into();
        match Self::deserialize(value) {
            Ok(entry) => Self { key, ..entry },
            Err(error) => {
                tracing::warn!(%key, %error, "catalog entry has an unexpected shape");
                let text = |pointer: &str| {
                    value
                        .pointer(pointer)
                        .and_then(Value::as_str)
                        .map(str::to_owned)
                };
                Self {
                    unique_id: text("/unique_id"),
                    metadata: Some(EntryMetadata {
                        name: text("/metadata/name"),
                        comment: None,
                    }),
                    columns: None,
                    invalid: Some(error.to_string()),
                    key,
                }
            }
        }
    }

    /// The entry's `metadata.name`, if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref()?.name.as_deref()
    }

    /// The entry's `metadata.comment`, if present.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.metadata.as_ref()?.comment.as_deref()
    }

    /// Last dot-delimited segment of `unique_id`.
    #[must_use]
    pub fn model_identifier(&self) -> Option<&str> {
        self.unique_id.as_deref()?.rsplit('.').next()
    }

    /// Identifier to use in log lines: `unique_id`, falling back to the key.
    #[must_use]
    pub fn display_id(&self) -> &str {
        self.unique_id.as_deref().unwrap_or(&self.key)
    }

    /// Whether the catalog key marks a source or a model.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        SELECTABLE_PREFIXES
            .iter()
            .any(|prefix| self.key.starts_with(prefix))
    }

    /// Case-insensitive exact match against `metadata.name`.
    #[must_use]
    pub fn matches_name(&self, model_filter: &str) -> bool {
        self.name()
            .is_some_and(|name| name.to_lowercase() == model_filter.to_lowercase())
    }
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    sources: Option<IndexMap<String, Value>>,
    #[serde(default)]
    nodes: Option<IndexMap<String, Value>>,
}

/// Merged view over a catalog's `sources` and `nodes`.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: IndexMap<String, CatalogEntry>,
}

impl Catalog {
    /// Parses catalog JSON text.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `json` is not a catalog document.
    pub fn from_json_str(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        Ok(Self::merge(raw))
    }

    fn merge(raw: RawCatalog) -> Self {
        let mut values = raw.sources.unwrap_or_default();
        values.extend(raw.nodes.unwrap_or_default());
        let entries = values
            .iter()
            .map(|(key, value)| (key.clone(), CatalogEntry::from_value(key, value)))
            .collect();
        Self { entries }
    }

    /// Number of merged entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    /// All entries in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Entries that should get a schema document.
    ///
    /// Only `source*`/`model*` keys are considered. A non-empty `model_filter`
    /// further restricts the result to entries whose `metadata.name` equals it,
    /// ignoring case.
    #[must_use]
    pub fn select_models(&self, model_filter: Option<&str>) -> Vec<&CatalogEntry> {
        let model_filter = model_filter.filter(|filter| !filter.is_empty());
        self.entries
            .values()
            .filter(|entry| entry.is_selectable())
            .filter(|entry| model_filter.is_none_or(|filter| entry.matches_name(filter)))
            .collect()
    }
}

/// Loads and merges the catalog document at `path`.
///
/// # Errors
///
/// `NotFound` if the file is missing, `Io` for other read failures and
/// `Parse` if the content is not a catalog document.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| CatalogError::from_io(path, e))?;
    let catalog = Catalog::from_json_str(&content).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), entries = catalog.len(), "loaded catalog");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Catalog {
        let doc = json!({
            "metadata": {"dbt_version": "1.7.4"},
            "sources": {
                "source.ingest.icims.COMPANY": {
                    "unique_id": "source.ingest.icims.COMPANY",
                    "metadata": {"name": "COMPANY", "comment": "RAW TABLE FOR ICIMS COMPANY"},
                    "columns": {}
                }
            },
            "nodes": {
                "model.ingest.orders": {
                    "unique_id": "model.ingest.orders",
                    "metadata": {"name": "ORDERS", "comment": null},
                    "columns": {
                        "ID": {"name": "ID", "type": "NUMBER", "comment": null}
                    }
                },
                "seed.ingest.country_codes": {
                    "unique_id": "seed.ingest.country_codes",
                    "metadata": {"name": "COUNTRY_CODES"}
                },
                "model.ingest.company_history": {
                    "unique_id": "model.ingest.company_history",
                    "metadata": {"name": "company"}
                }
            }
        });
        Catalog::from_json_str(&doc.to_string()).unwrap()
    }

    #[test]
    fn test_merge_keeps_sources_then_nodes() {
        let catalog = sample();
        let keys: Vec<_> = catalog.entries().map(|e| e.key.as_str()).collect();
        assert_eq!(
            keys,
            [
                "source.ingest.icims.COMPANY",
                "model.ingest.orders",
                "seed.ingest.country_codes",
                "model.ingest.company_history",
            ]
        );
    }

    #[test]
    fn test_key_collision_prefers_nodes() {
        let doc = json!({
            "sources": {"model.x.a": {"metadata": {"name": "from_sources"}}},
            "nodes": {"model.x.a": {"metadata": {"name": "from_nodes"}}}
        });
        let catalog = Catalog::from_json_str(&doc.to_string()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("model.x.a").unwrap().name(), Some("from_nodes"));
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let catalog = Catalog::from_json_str(r#"{"nodes": null}"#).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_select_without_filter_uses_key_prefix() {
        let catalog = sample();
        let selected: Vec<_> = catalog
            .select_models(None)
            .iter()
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(
            selected,
            [
                "source.ingest.icims.COMPANY",
                "model.ingest.orders",
                "model.ingest.company_history",
            ]
        );
        assert_eq!(catalog.select_models(Some("")).len(), 3);
    }

    #[test]
    fn test_select_filter_is_case_insensitive_and_not_unique() {
        let catalog = sample();
        let lower = catalog.select_models(Some("company"));
        let upper = catalog.select_models(Some("COMPANY"));
        assert_eq!(lower, upper);
        assert_eq!(lower.len(), 2);
        assert!(catalog.select_models(Some("comp")).is_empty());
    }

    #[test]
    fn test_model_identifier_is_last_segment() {
        let catalog = sample();
        let entry = catalog.get("source.ingest.icims.COMPANY").unwrap();
        assert_eq!(entry.model_identifier(), Some("COMPANY"));
        assert_eq!(entry.comment(), Some("RAW TABLE FOR ICIMS COMPANY"));
    }

    #[test]
    fn test_columns_keep_document_order() {
        let json = r#"{"nodes": {"model.p.m": {"columns": {
            "C": {"name": "C", "type": "INT"},
            "A": {"name": "A", "type": "INT"},
            "B": {"name": "B", "type": "INT"}
        }}}}"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        let columns = catalog.get("model.p.m").unwrap().columns.as_ref().unwrap();
        let names: Vec<_> = columns.keys().map(String::as_str).collect();
        assert_eq!(names, ["C", "A", "B"]);
    }

    #[test]
    fn test_mistyped_entry_is_kept_as_invalid() {
        let doc = json!({
            "nodes": {
                "model.p.bad": {
                    "unique_id": "model.p.bad",
                    "metadata": {"name": "BAD", "comment": 42}
                },
                "model.p.good": {
                    "unique_id": "model.p.good",
                    "metadata": {"name": "GOOD"}
                },
                "model.p.scalar": 7
            }
        });
        let catalog = Catalog::from_json_str(&doc.to_string()).unwrap();
        assert_eq!(catalog.len(), 3);

        let bad = catalog.get("model.p.bad").unwrap();
        assert!(bad.invalid.as_deref().unwrap().contains("invalid type"));
        assert_eq!(bad.name(), Some("BAD"));
        assert_eq!(bad.display_id(), "model.p.bad");
        assert!(catalog.get("model.p.good").unwrap().invalid.is_none());

        let scalar = catalog.get("model.p.scalar").unwrap();
        assert!(scalar.invalid.is_some());
        assert_eq!(scalar.display_id(), "model.p.scalar");
        assert_eq!(catalog.select_models(Some("bad")).len(), 1);
    }

    #[test]
    fn test_load_catalog_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_catalog(dir.path().join("catalog.json")).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
    }

    #[test]
    fn test_load_catalog_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_catalog(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }
}
