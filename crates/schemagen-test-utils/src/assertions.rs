//! Custom assertion helpers for generator tests.

use schemagen_core::{OutcomeStatus, RunSummary, WriteResult};
use serde_yaml::Value;

/// Asserts that every selected entry was written.
///
/// # Panics
///
/// Panics if any entry was skipped, failed, or dropped during transformation.
pub fn assert_all_written(summary: &RunSummary) {
    assert_eq!(
        summary.written, summary.selected,
        "Expected all {} models written, got {:?}",
        summary.selected, summary.outcomes
    );
}

/// Asserts that every selected entry was skipped.
///
/// # Panics
///
/// Panics if any entry was written or failed.
pub fn assert_all_skipped(summary: &RunSummary) {
    assert_eq!(
        summary.skipped, summary.selected,
        "Expected all {} models skipped, got {:?}",
        summary.selected, summary.outcomes
    );
}

/// Returns the write result recorded for `model`.
///
/// # Panics
///
/// Panics if the model has no write outcome.
pub fn write_result_for<'a>(summary: &'a RunSummary, model: &str) -> &'a WriteResult {
    summary
        .outcomes
        .iter()
        .find_map(|outcome| match &outcome.status {
            OutcomeStatus::Write(result) if outcome.model == model => Some(result),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no write outcome for model {model}: {:?}", summary.outcomes))
}

/// Asserts the generated document carries the full model template.
///
/// # Panics
///
/// Panics if the version, test group, or any `meta` section is missing.
pub fn assert_model_template(document: &Value) {
    assert_eq!(document["version"], Value::Number(2.into()), "version must be 2");
    let model = &document["models"][0];
    let group = &model["tests"][0];
    assert!(
        group["dbt_utils.recency"].is_mapping(),
        "missing dbt_utils.recency in {model:?}"
    );
    assert!(
        group["dbt_expectations.expect_column_distinct_count_to_equal_other_table"].is_mapping(),
        "missing distinct count test in {model:?}"
    );
    for section in [
        "slo",
        "ownership",
        "detailed_description",
        "build_requirements",
        "origination",
        "filters_and_limitations",
        "data_access",
        "data_quality",
    ] {
        assert!(
            model["meta"][section].is_mapping(),
            "missing meta.{section} in {model:?}"
        );
    }
}

/// Column names of the generated document, in order.
#[must_use]
pub fn column_names(document: &Value) -> Vec<String> {
    document["models"][0]["columns"]
        .as_sequence()
        .map(|columns| {
            columns
                .iter()
                .filter_map(|column| column["name"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}
