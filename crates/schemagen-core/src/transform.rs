//! Projecting catalog entries onto the schema document template.

use crate::catalog::CatalogEntry;
use crate::document::{ColumnDocument, ModelDocument, SchemaDocument};
use crate::error::TransformError;
use crate::path_index::ModelLocator;

/// Knobs that change the generated document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    /// Declare a `unique` test on every column.
    pub unique_tests: bool,
    /// Reuse the last resolved path when a model cannot be located.
    pub fallback_on_miss: bool,
}

/// Builds the schema document for one catalog entry.
///
/// The model file is located by the last segment of the entry's `unique_id`.
/// A model that cannot be located gets an empty `original_file_path`.
///
/// # Errors
///
/// Returns [`TransformError::InvalidEntry`] when the catalog entry could not
/// be read, and [`TransformError::MissingField`] when it lacks its name, its
/// `unique_id`, or a column's `name`/`type`.
pub fn transform<L>(
    entry: &CatalogEntry,
    locator: &mut L,
    options: TransformOptions,
) -> Result<SchemaDocument, TransformError>
where
    L: ModelLocator + ?Sized,
{
    if let Some(message) = &entry.invalid {
        return Err(TransformError::InvalidEntry {
            key: entry.key.clone(),
            message: message.clone(),
        });
    }
    let name = entry
        .name()
        .ok_or_else(|| missing(entry, "metadata.name"))?;
    let identifier = entry
        .model_identifier()
        .ok_or_else(|| missing(entry, "unique_id"))?;
    let columns = transform_columns(entry, options)?;

    let original_file_path = match locator.locate(identifier, options.fallback_on_miss) {
        Some(path) => path.to_string_lossy().into_owned(),
        None => {
            tracing::debug!(model = name, identifier, "model file not found in project tree");
            String::new()
        }
    };

    let model = ModelDocument::from_template(
        name,
        entry.comment().map(str::to_owned),
        original_file_path,
        columns,
    );
    tracing::debug!(model = name, "model document built");
    Ok(SchemaDocument::new(model))
}

/// Builds the column documents for one entry, in catalog order.
///
/// An entry without columns yields an empty list.
///
/// # Errors
///
/// Returns [`TransformError::MissingField`] for a column without `name` or
/// `type`.
pub fn transform_columns(
    entry: &CatalogEntry,
    options: TransformOptions,
) -> Result<Vec<ColumnDocument>, TransformError> {
    let Some(columns) = &entry.columns else {
        return Ok(Vec::new());
    };

    columns
        .iter()
        .map(|(key, column)| {
            let name = column
                .name
                .as_deref()
                .ok_or_else(|| missing(entry, &format!("columns.{key}.name")))?;
            let data_type = column
                .data_type
                .as_deref()
                .ok_or_else(|| missing(entry, &format!("columns.{key}.type")))?;
            Ok(ColumnDocument::from_template(
                name,
                data_type,
                column.comment.clone(),
                options.unique_tests,
            ))
        })
        .collect()
}

fn missing(entry: &CatalogEntry, field: &str) -> TransformError {
    TransformError::MissingField {
        unique_id: entry.display_id().to_string(),
        field: field.to_string(),
    }
}
