//! The generated schema-test document.
//!
//! Everything not taken from the catalog is a constant or an empty
//! placeholder meant for manual curation. The placeholders live in the
//! `Default` impls below; [`ModelDocument::from_template`] and
//! [`ColumnDocument::from_template`] layer the per-entry values on top.
//!
//! Serialized field order follows declaration order.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Schema file format version understood by dbt.
pub const SCHEMA_VERSION: u32 = 2;

/// Severity shared by every generated test.
pub const DEFAULT_SEVERITY: &str = "warn";

/// Top-level YAML document: `version` plus a single-model `models` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDocument {
    /// Schema file format version.
    pub version: u32,
    /// Always exactly one model.
    pub models: Vec<ModelDocument>,
}

impl SchemaDocument {
    /// Wraps a single model.
    #[must_use]
    pub fn new(model: ModelDocument) -> Self {
        Self {
            version: SCHEMA_VERSION,
            models: vec![model],
        }
    }

    /// The document's model.
    #[must_use]
    pub fn model(&self) -> Option<&ModelDocument> {
        self.models.first()
    }

    /// Name of the document's model, empty if there is none.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.model().map_or("", |model| model.name.as_str())
    }

    /// Resolved source path of the document's model, empty if unresolved.
    #[must_use]
    pub fn original_file_path(&self) -> &str {
        self.model()
            .map_or("", |model| model.original_file_path.as_str())
    }

    /// Returns the document with `version` reset to [`SCHEMA_VERSION`].
    #[must_use]
    pub fn stamped(mut self) -> Self {
        self.version = SCHEMA_VERSION;
        self
    }
}

/// One model entry under `models`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDocument {
    /// Relation name, case preserved.
    pub name: String,
    /// Relation comment from the catalog.
    pub description: Option<String>,
    /// Source file the document was generated for.
    pub original_file_path: String,
    /// Model-level test declarations. Older schema files call this key `test`.
    pub tests: Vec<ModelTestGroup>,
    /// Metadata placeholders.
    pub meta: ModelMeta,
    /// Column documents; omitted when the model has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<ColumnDocument>>,
}

impl ModelDocument {
    /// Builds a model document from the constant template.
    ///
    /// An empty `columns` list leaves the `columns` key out entirely.
    #[must_use]
    pub fn from_template(
        name: impl Into<String>,
        description: Option<String>,
        original_file_path: impl Into<String>,
        columns: Vec<ColumnDocument>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            original_file_path: original_file_path.into(),
            tests: vec![ModelTestGroup::default()],
            meta: ModelMeta::default(),
            columns: (!columns.is_empty()).then_some(columns),
        }
    }
}

/// The model-level test group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelTestGroup {
    /// Freshness check.
    #[serde(rename = "dbt_utils.recency")]
    pub recency: RecencyTest,
    /// Row-count completeness check against another model.
    #[serde(rename = "dbt_expectations.expect_column_distinct_count_to_equal_other_table")]
    pub distinct_count: DistinctCountTest,
}

/// `dbt_utils.recency` parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecencyTest {
    /// Unit of `interval` (`day`, `hour`, ...), filled in by hand.
    pub datepart: Option<String>,
    /// Timestamp column to check.
    pub field: Option<String>,
    /// Allowed age in `datepart` units.
    pub interval: u32,
    /// Test tag.
    pub tags: String,
    /// Test severity.
    pub severity: String,
}

impl Default for RecencyTest {
    fn default() -> Self {
        Self {
            datepart: None,
            field: None,
            interval: 1,
            tags: "timeliness".to_string(),
            severity: DEFAULT_SEVERITY.to_string(),
        }
    }
}

/// `dbt_expectations.expect_column_distinct_count_to_equal_other_table` parameters.
///
/// Compares the distinct count of `column_name` in this model with
/// `compare_column_name` in `compare_model`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistinctCountTest {
    /// Column counted in this model.
    pub column_name: Option<String>,
    /// Filter applied to this model.
    pub row_condition: Option<String>,
    /// Model compared against.
    pub compare_model: Option<String>,
    /// Column counted in `compare_model`.
    pub compare_column_name: Option<String>,
    /// Whether `compare_model` is filtered too.
    pub compare_row_condition: bool,
    /// Test tag.
    pub tags: String,
    /// Test severity.
    pub severity: String,
}

impl Default for DistinctCountTest {
    fn default() -> Self {
        Self {
            column_name: None,
            row_condition: None,
            compare_model: None,
            compare_column_name: None,
            compare_row_condition: true,
            tags: "completeness".to_string(),
            severity: DEFAULT_SEVERITY.to_string(),
        }
    }
}

/// Model `meta` block. All sections are placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelMeta {
    /// Delivery commitments.
    pub slo: SloMeta,
    /// Who owns and approves the model.
    pub ownership: OwnershipMeta,
    /// Grain and classification.
    pub detailed_description: DetailedDescriptionMeta,
    /// Links to code and design.
    pub build_requirements: BuildRequirementsMeta,
    /// Refresh cadence.
    pub origination: OriginationMeta,
    /// Known caveats for consumers.
    pub filters_and_limitations: FiltersAndLimitationsMeta,
    /// Access control notes.
    pub data_access: DataAccessMeta,
    /// Health check reference.
    pub data_quality: DataQualityMeta,
}

/// `meta.slo`: when the model is expected to land and who to call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SloMeta {
    /// Whether the model is covered by the SLO.
    pub included: bool,
    /// Delivery time, US Central.
    pub delivery_time_ct: Option<String>,
    /// Allowed delay past the delivery time.
    pub offset: Option<String>,
    /// Whether the data ever changes.
    pub is_static: Option<String>,
    /// Escalation contact.
    pub contact: Option<String>,
    /// SLO tag.
    pub tag: Option<String>,
}

// the only non-null placeholder in the template
impl Default for SloMeta {
    fn default() -> Self {
        Self {
            included: true,
            delivery_time_ct: None,
            offset: None,
            is_static: None,
            contact: None,
            tag: None,
        }
    }
}

/// `meta.ownership`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OwnershipMeta {
    /// Owning team.
    pub team_id: Option<String>,
    /// Data owner delegate.
    pub ddo_delegate: Option<String>,
    /// LDAP handle of `ddo_delegate`.
    pub ddo_delegate_ldap: Option<String>,
    /// Subject matter expert.
    pub subject_matter_expert: Option<String>,
    /// LDAP handle of `subject_matter_expert`.
    pub subject_matter_expert_ldap: Option<String>,
    /// Approver for changes.
    pub approver: Option<String>,
    /// LDAP handle of `approver`.
    pub approver_ldap: Option<String>,
    /// Role the approver acts in.
    pub approver_role: Option<String>,
}

/// `meta.detailed_description`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailedDescriptionMeta {
    /// What one row represents.
    pub dataset_granularity: Option<String>,
    /// Data classification level.
    pub classification: Option<String>,
    /// Why that level applies.
    pub classification_rationale: Option<String>,
    /// Whether the model holds sensitive data.
    pub sensitive: Option<String>,
    /// Whether the model is known to be degraded.
    pub is_degraded: Option<String>,
    /// Free text.
    pub comments: Option<String>,
}

/// `meta.build_requirements`: links only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildRequirementsMeta {
    /// Repository path of the model code.
    pub link_to_builder_code: Option<String>,
    /// Job or DAG that builds the model.
    pub link_to_orchestration_tool: Option<String>,
    /// Design document.
    pub link_to_design_document: Option<String>,
}

/// `meta.origination`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OriginationMeta {
    /// How often the model refreshes (`daily`, ...).
    pub refresh_cadence: Option<String>,
    /// Schedule expression behind the cadence.
    pub refresh_schedule: Option<String>,
}

/// `meta.filters_and_limitations`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FiltersAndLimitationsMeta {
    /// Filters consumers should always apply.
    pub standard_filters_at_consumption: Option<String>,
    /// Known limitations.
    pub general_limitations: Option<String>,
    /// Breaks or irregularities in field history.
    pub field_discontinuities_irregularities: Option<String>,
    /// Known gaps.
    pub missing_data: Option<String>,
}

/// `meta.data_access`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataAccessMeta {
    /// Who may read the model.
    pub access_controls: Option<String>,
    /// When access was last reviewed.
    pub access_controls_review: Option<String>,
}

/// `meta.data_quality`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataQualityMeta {
    /// Link to the health check.
    pub health_check: Option<String>,
}

/// One entry under a model's `columns`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDocument {
    /// Column name, case preserved.
    pub name: String,
    /// Always empty in generated output.
    pub description: Option<String>,
    /// `not_null`, then `unique` when requested.
    pub tests: Vec<ColumnTest>,
    /// Column metadata.
    pub meta: ColumnMeta,
}

impl ColumnDocument {
    /// Builds a column document: `not_null` always, `unique` on request.
    #[must_use]
    pub fn from_template(
        name: impl Into<String>,
        data_type: impl Into<String>,
        comment: Option<String>,
        unique_test: bool,
    ) -> Self {
        let mut tests = vec![ColumnTest::not_null()];
        if unique_test {
            tests.push(ColumnTest::unique());
        }
        Self {
            name: name.into(),
            description: None,
            tests,
            meta: ColumnMeta {
                data_type: data_type.into(),
                comments: comment,
                ..ColumnMeta::default()
            },
        }
    }

    /// Whether a test of the given kind is declared.
    #[must_use]
    pub fn has_test(&self, kind: ColumnTestKind) -> bool {
        self.tests.iter().any(|test| test.kind() == kind)
    }
}

/// Kinds of column test the template can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnTestKind {
    /// `not_null`
    NotNull,
    /// `unique`
    Unique,
}

impl ColumnTestKind {
    /// Test name as written in schema files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotNull => "not_null",
            Self::Unique => "unique",
        }
    }
}

/// A column test, serialized as `{<kind>: {tags, severity}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnTest {
    /// Column must never be null.
    NotNull(TestConfig),
    /// Column values must be distinct.
    Unique(TestConfig),
}

impl ColumnTest {
    /// `not_null`, tagged `validity`.
    #[must_use]
    pub fn not_null() -> Self {
        Self::NotNull(TestConfig::new("validity"))
    }

    /// `unique`, tagged `uniqueness`.
    #[must_use]
    pub fn unique() -> Self {
        Self::Unique(TestConfig::new("uniqueness"))
    }

    /// Which test this is.
    #[must_use]
    pub const fn kind(&self) -> ColumnTestKind {
        match self {
            Self::NotNull(_) => ColumnTestKind::NotNull,
            Self::Unique(_) => ColumnTestKind::Unique,
        }
    }

    /// Tag and severity of the test.
    #[must_use]
    pub const fn config(&self) -> &TestConfig {
        match self {
            Self::NotNull(config) | Self::Unique(config) => config,
        }
    }
}

// serde_yaml writes enum variants as `!tag` values, so spell the map out
impl Serialize for ColumnTest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.kind().as_str(), self.config())?;
        map.end()
    }
}

/// Settings shared by column tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestConfig {
    /// Test tag.
    pub tags: String,
    /// Test severity.
    pub severity: String,
}

impl TestConfig {
    fn new(tags: &str) -> Self {
        Self {
            tags: tags.to_string(),
            severity: DEFAULT_SEVERITY.to_string(),
        }
    }
}

/// Column `meta` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnMeta {
    /// Warehouse type from the catalog.
    #[serde(rename = "type")]
    pub data_type: String,
    /// Privacy level, filled in by hand.
    pub privacy_classification: Option<String>,
    /// Logical data model entity.
    pub ldm_model: Option<String>,
    /// Logical data model attribute.
    pub ldm_attribute: Option<String>,
    /// Upstream system.
    pub datasource: Option<String>,
    /// Field name in the upstream system.
    pub field: Option<String>,
    /// Column comment from the catalog.
    pub comments: Option<String>,
}
