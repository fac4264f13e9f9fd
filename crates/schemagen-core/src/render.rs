//! YAML text for schema documents.
//!
//! Documents go through [`serde_yaml::Value`] and are laid out in block style:
//! mappings indent by 2, sequences indent by 4 with the dash offset by 2, so
//! list items sit under their key the way dbt projects usually format them:
//!
//! ```text
//! models:
//!   - name: orders
//!     columns:
//!       - name: id
//! ```
//!
//! Scalars (and keys) are quoted by `serde_yaml`. Nulls under a key are left
//! empty (`datepart:`).

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::error::RenderError;

/// Indentation of a nested mapping relative to its key.
pub const MAPPING_INDENT: usize = 2;
/// Indentation of sequence item content relative to its key.
pub const SEQUENCE_INDENT: usize = 4;
/// Indentation of the sequence dash relative to its key.
pub const SEQUENCE_DASH_OFFSET: usize = 2;

const DASH: &str = "- ";

/// Renders `value` as a block-style YAML document ending in a newline.
///
/// # Errors
///
/// Returns [`RenderError::Yaml`] if `value` cannot be represented as YAML.
pub fn to_yaml_string<T: Serialize + ?Sized>(value: &T) -> Result<String, RenderError> {
    let value = serde_yaml::to_value(value)?;
    let mut lines = Vec::new();
    match &value {
        Value::Mapping(map) if !map.is_empty() => push_mapping(map, 0, &mut lines)?,
        Value::Sequence(items) if !items.is_empty() => push_sequence(items, 0, &mut lines)?,
        other => lines.extend(scalar_lines(other)?),
    }

    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

fn push_mapping(map: &Mapping, indent: usize, out: &mut Vec<String>) -> Result<(), RenderError> {
    let pad = " ".repeat(indent);
    for (key, value) in map {
        let key = key_text(key)?;
        match value {
            Value::Mapping(inner) if !inner.is_empty() => {
                out.push(format!("{pad}{key}:"));
                push_mapping(inner, indent + MAPPING_INDENT, out)?;
            }
            Value::Sequence(items) if !items.is_empty() => {
                out.push(format!("{pad}{key}:"));
                push_sequence(items, indent + SEQUENCE_DASH_OFFSET, out)?;
            }
            Value::Null => out.push(format!("{pad}{key}:")),
            scalar => {
                let mut lines = scalar_lines(scalar)?.into_iter();
                let first = lines.next().unwrap_or_default();
                out.push(format!("{pad}{key}: {first}"));
                out.extend(lines.map(|line| continuation(&pad, &line)));
            }
        }
    }
    Ok(())
}

fn push_sequence(
    items: &[Value],
    dash_indent: usize,
    out: &mut Vec<String>,
) -> Result<(), RenderError> {
    let content_indent = dash_indent + SEQUENCE_INDENT - SEQUENCE_DASH_OFFSET;
    let pad = " ".repeat(content_indent);
    for item in items {
        let first = out.len();
        match item {
            Value::Mapping(inner) if !inner.is_empty() => {
                push_mapping(inner, content_indent, out)?;
            }
            Value::Sequence(inner) if !inner.is_empty() => {
                push_sequence(inner, content_indent, out)?;
            }
            scalar => {
                let mut lines = scalar_lines(scalar)?.into_iter();
                let head = lines.next().unwrap_or_default();
                out.push(format!("{pad}{head}"));
                out.extend(lines.map(|line| continuation(&pad, &line)));
            }
        }
        // the item's first line starts at content_indent; put the dash before it
        out[first].replace_range(dash_indent..content_indent, DASH);
    }
    Ok(())
}

fn scalar_lines(value: &Value) -> Result<Vec<String>, RenderError> {
    let text = serde_yaml::to_string(value)?;
    Ok(text
        .trim_end_matches('\n')
        .lines()
        .map(str::to_owned)
        .collect())
}

fn key_text(key: &Value) -> Result<String, RenderError> {
    let lines = scalar_lines(key)?;
    match lines.as_slice() {
        [single] => Ok(single.clone()),
        _ => Err(RenderError::UnsupportedKey(format!("{key:?}"))),
    }
}

// block scalar bodies arrive indented relative to column 0
fn continuation(pad: &str, line: &str) -> String {
    if line.is_empty() {
        String::new()
    } else {
        format!("{pad}{line}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Column {
        name: &'static str,
        description: Option<&'static str>,
        tests: Vec<BTreeMap<&'static str, Check>>,
    }

    #[derive(Serialize)]
    struct Check {
        severity: &'static str,
    }

    #[derive(Serialize)]
    struct Model {
        name: &'static str,
        tags: Vec<&'static str>,
        empty: Vec<&'static str>,
        columns: Vec<Column>,
    }

    #[derive(Serialize)]
    struct Doc {
        version: u32,
        models: Vec<Model>,
    }

    #[test]
    fn test_block_layout() {
        let doc = Doc {
            version: 2,
            models: vec![Model {
                name: "orders",
                tags: vec!["daily", "finance"],
                empty: Vec::new(),
                columns: vec![
                    Column {
                        name: "id",
                        description: None,
                        tests: vec![BTreeMap::from([("not_null", Check { severity: "warn" })])],
                    },
                    Column {
                        name: "amount",
                        description: Some("order total"),
                        tests: Vec::new(),
                    },
                ],
            }],
        };

        let expected = "\
version: 2
models:
  - name: orders
    tags:
      - daily
      - finance
    empty: []
    columns:
      - name: id
        description:
        tests:
          - not_null:
              severity: warn
      - name: amount
        description: order total
        tests: []
";
        assert_eq!(to_yaml_string(&doc).unwrap(), expected);
    }

    #[test]
    fn test_ambiguous_strings_are_quoted() {
        #[derive(Serialize)]
        struct Row {
            a: &'static str,
            b: &'static str,
            c: bool,
        }
        let yaml = to_yaml_string(&Row {
            a: "true",
            b: "",
            c: true,
        })
        .unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["a"], Value::String("true".into()));
        assert_eq!(parsed["b"], Value::String(String::new()));
        assert_eq!(parsed["c"], Value::Bool(true));
    }

    #[test]
    fn test_multiline_strings_round_trip() {
        #[derive(Serialize)]
        struct Outer {
            items: Vec<Inner>,
        }
        #[derive(Serialize)]
        struct Inner {
            comment: &'static str,
            after: u32,
        }
        let outer = Outer {
            items: vec![Inner {
                comment: "first line\nsecond line",
                after: 1,
            }],
        };
        let yaml = to_yaml_string(&outer).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(
            parsed["items"][0]["comment"],
            Value::String("first line\nsecond line".into())
        );
        assert_eq!(parsed["items"][0]["after"], Value::Number(1.into()));
    }

    #[test]
    fn test_nested_sequences_share_a_line() {
        let yaml = to_yaml_string(&vec![vec![1, 2], vec![3]]).unwrap();
        assert_eq!(yaml, "- - 1\n  - 2\n- - 3\n");
    }
}
