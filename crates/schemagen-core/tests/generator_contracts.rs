//! End-to-end generator runs against temporary dbt projects.

#![allow(clippy::unwrap_used)]

use std::fs;

use schemagen_core::{OutcomeStatus, PathSource, SchemaGenerator, WriteResult};
use schemagen_test_utils::{
    CatalogBuilder, TestProject, assert_all_skipped, assert_all_written, assert_model_template,
    column_names, company_catalog, init_test_logging, write_result_for,
};
use serde_json::json;

const COMPANY_SQL: &str = "models/icims/COMPANY.sql";
const COMPANY_YML: &str = "models/icims/COMPANY.yml";

fn company_project() -> TestProject {
    init_test_logging();
    let project = TestProject::new();
    project.add_model(COMPANY_SQL);
    project.write_catalog(&company_catalog());
    project
}

#[test]
fn generates_schema_beside_model_file() {
    let project = company_project();

    let summary = SchemaGenerator::new(project.config()).run().unwrap();
    assert_all_written(&summary);
    assert_eq!(summary.selected, 1);

    let doc = project.read_yaml(COMPANY_YML);
    assert_model_template(&doc);
    let model = &doc["models"][0];
    assert_eq!(model["name"], "COMPANY");
    assert_eq!(model["description"], "RAW TABLE FOR ICIMS COMPANY");
    assert_eq!(
        model["original_file_path"].as_str().unwrap(),
        project.path(COMPANY_SQL).to_string_lossy()
    );
    assert_eq!(
        column_names(&doc),
        ["RAW_DATA", "RAW_INSERTED_TIMESTAMP", "RAW_FILENAME"]
    );

    let column = &model["columns"][0];
    assert!(column["description"].is_null());
    assert_eq!(column["tests"][0]["not_null"]["severity"], "warn");
    assert_eq!(column["meta"]["type"], "VARIANT");
}

#[test]
fn rendered_layout_is_block_style() {
    let project = company_project();
    SchemaGenerator::new(project.config()).run().unwrap();

    let yaml = project.read(COMPANY_YML);
    assert!(yaml.starts_with("version: 2\nmodels:\n  - name: COMPANY\n"));
    assert!(yaml.contains("\n    columns:\n      - name: RAW_DATA\n        description:\n"));
}

#[test]
fn one_document_per_selected_entry() {
    init_test_logging();
    let project = TestProject::new();
    project.add_model("models/a/ORDERS.sql");
    project.add_model("models/b/CUSTOMERS.sql");
    project.write_catalog(
        &CatalogBuilder::new()
            .source("source.p.raw.ORDERS", "ORDERS", None, &[("ID", "NUMBER")])
            .model("model.p.CUSTOMERS", "CUSTOMERS", None, &[("ID", "NUMBER")])
            .raw_node("test.p.not_null_orders_id", json!({"metadata": {"name": "x"}})),
    );

    let summary = SchemaGenerator::new(project.config()).run().unwrap();
    assert_eq!(summary.selected, 2);
    assert_all_written(&summary);
    assert_eq!(project.files_with_extension("models", "yml").len(), 2);
}

#[test]
fn model_filter_ignores_case() {
    init_test_logging();
    let project = TestProject::new();
    project.add_model(COMPANY_SQL);
    project.add_model("models/icims/JOB.sql");
    project.write_catalog(&company_catalog().source(
        "source.dbt_ingest.icims.JOB",
        "JOB",
        None,
        &[("ID", "NUMBER")],
    ));

    let mut config = project.config();
    config.model_filter = Some("company".to_string());
    let summary = SchemaGenerator::new(config).run().unwrap();

    assert_eq!(summary.selected, 1);
    assert!(project.path(COMPANY_YML).exists());
    assert!(!project.path("models/icims/JOB.yml").exists());
}

#[test]
fn second_run_skips_existing_files() {
    let project = company_project();
    SchemaGenerator::new(project.config()).run().unwrap();
    fs::write(project.path(COMPANY_YML), "version: 2\n# edited\n").unwrap();

    let summary = SchemaGenerator::new(project.config()).run().unwrap();
    assert_all_skipped(&summary);
    assert_eq!(project.read(COMPANY_YML), "version: 2\n# edited\n");
}

#[test]
fn update_rewrites_existing_files() {
    let project = company_project();
    fs::write(project.path(COMPANY_YML), "version: 2\n# edited\n").unwrap();

    let mut config = project.config();
    config.update = true;
    let summary = SchemaGenerator::new(config).run().unwrap();

    assert_all_written(&summary);
    assert_model_template(&project.read_yaml(COMPANY_YML));
}

#[test]
fn update_reruns_keep_pointing_at_the_model_source() {
    let project = company_project();
    let mut config = project.config();
    config.update = true;

    let first = SchemaGenerator::new(config.clone()).run().unwrap();
    let first_path = project.read_yaml(COMPANY_YML)["models"][0]["original_file_path"].clone();
    let second = SchemaGenerator::new(config).run().unwrap();
    let second_path = project.read_yaml(COMPANY_YML)["models"][0]["original_file_path"].clone();

    assert_all_written(&first);
    assert_all_written(&second);
    assert_eq!(first_path, second_path);
    assert_eq!(
        second_path.as_str().unwrap(),
        project.path(COMPANY_SQL).to_string_lossy()
    );
    assert_eq!(project.files_with_extension("models", "yml").len(), 1);
}

#[test]
fn model_without_columns_has_no_columns_key() {
    init_test_logging();
    let project = TestProject::new();
    project.add_model("models/EMPTY.sql");
    project.write_catalog(&CatalogBuilder::new().model("model.p.EMPTY", "EMPTY", None, &[]));

    SchemaGenerator::new(project.config()).run().unwrap();
    let yaml = project.read("models/EMPTY.yml");
    assert!(!yaml.contains("columns:"));
}

#[test]
fn unique_tests_are_opt_in() {
    let project = company_project();
    let mut config = project.config();
    config.unique_tests = true;
    SchemaGenerator::new(config).run().unwrap();

    let doc = project.read_yaml(COMPANY_YML);
    let tests = &doc["models"][0]["columns"][0]["tests"];
    assert_eq!(tests[1]["unique"]["tags"], "uniqueness");
}

#[test]
fn unlocated_model_is_reported_as_failed() {
    init_test_logging();
    let project = TestProject::new();
    project.write_catalog(&company_catalog());

    let summary = SchemaGenerator::new(project.config()).run().unwrap();
    assert_eq!(summary.failed, 1);
    assert!(matches!(
        write_result_for(&summary, "COMPANY"),
        WriteResult::Failed { .. }
    ));
}

#[test]
fn fallback_reuses_previous_location() {
    init_test_logging();
    let project = TestProject::new();
    project.add_model(COMPANY_SQL);
    project.write_catalog(&company_catalog().source(
        "source.dbt_ingest.icims.GHOST",
        "GHOST",
        None,
        &[("ID", "NUMBER")],
    ));

    let mut config = project.config();
    config.fallback_on_miss = true;
    let summary = SchemaGenerator::new(config).run().unwrap();

    assert!(write_result_for(&summary, "COMPANY").is_written());
    assert!(matches!(
        write_result_for(&summary, "GHOST"),
        WriteResult::Skipped { .. }
    ));
}

#[test]
fn bad_entry_does_not_stop_the_run() {
    init_test_logging();
    let project = TestProject::new();
    project.add_model(COMPANY_SQL);
    project.write_catalog(
        &company_catalog().raw_node("model.p.BROKEN", json!({"unique_id": "model.p.BROKEN"})),
    );

    let summary = SchemaGenerator::new(project.config()).run().unwrap();
    assert_eq!(summary.transform_failed, 1);
    assert_eq!(summary.written, 1);
    assert!(summary.outcomes.iter().any(|outcome| matches!(
        outcome.status,
        OutcomeStatus::TransformFailed { .. }
    )));
}

#[test]
fn mistyped_entry_does_not_stop_the_run() {
    init_test_logging();
    let project = TestProject::new();
    project.add_model(COMPANY_SQL);
    project.add_model("models/BAD.sql");
    project.write_catalog(&company_catalog().raw_node(
        "model.p.BAD",
        json!({"unique_id": "model.p.BAD", "metadata": {"name": "BAD", "comment": 42}}),
    ));

    let summary = SchemaGenerator::new(project.config()).run().unwrap();
    assert_eq!(summary.selected, 2);
    assert_eq!(summary.transform_failed, 1);
    assert!(write_result_for(&summary, "COMPANY").is_written());
    assert!(!project.path("models/BAD.yml").exists());

    let failed = summary
        .outcomes
        .iter()
        .find(|outcome| outcome.unique_id == "model.p.BAD")
        .unwrap();
    assert!(matches!(
        &failed.status,
        OutcomeStatus::TransformFailed { reason } if reason.contains("invalid catalog entry")
    ));
}

#[test]
fn compiled_target_copies_are_not_indexed() {
    let project = company_project();
    project.add_model("target/compiled/p/models/icims/COMPANY.sql");

    SchemaGenerator::new(project.config()).run().unwrap();
    assert!(project.path(COMPANY_YML).exists());
    assert!(!project.path("target/compiled/p/models/icims/COMPANY.yml").exists());
}

#[test]
fn manifest_path_source_uses_original_file_path() {
    let project = company_project();
    let root = fs::canonicalize(project.root()).unwrap();
    project.write_manifest(&json!({
        "nodes": {
            "model.dbt_ingest.COMPANY": {
                "name": "COMPANY",
                "root_path": root.to_string_lossy(),
                "original_file_path": COMPANY_SQL
            }
        }
    }));

    let mut config = project.config();
    config.path_source = PathSource::Manifest;
    let summary = SchemaGenerator::new(config).run().unwrap();

    assert_all_written(&summary);
    assert!(project.path(COMPANY_YML).exists());
}

#[test]
fn missing_manifest_leaves_models_unlocated() {
    let project = company_project();
    let mut config = project.config();
    config.path_source = PathSource::Manifest;

    let summary = SchemaGenerator::new(config).run().unwrap();
    assert_eq!(summary.failed, 1);
}
