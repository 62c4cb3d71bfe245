//! Field extraction: rows → markup batch
//!
//! The field-name sequence is taken once, from the first row, and every row's
//! markup is built from that sequence by name. A row that lacks one of the
//! fields gets an empty element; a row carrying translatable fields outside the
//! sequence is reported as drifted and those extra fields are left out.

use crate::markup::to_markup;
use crate::row::{Row, RowId, RowSchema};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("row at position {position} has no usable id")]
    MissingId { position: usize },
}

/// Parallel sequences handed to the batcher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedRows {
    /// Translatable field names, in the first row's column order
    pub field_names: Vec<String>,
    /// One markup string per row
    pub markups: Vec<String>,
    /// One id per row, same order as `markups`
    pub ids: Vec<RowId>,
    /// Rows whose translatable columns differ from `field_names`
    pub drifted: Vec<RowId>,
}

impl ExtractedRows {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Field names with underscores replaced by spaces, ready for translation
    pub fn humanized_field_names(&self) -> Vec<String> {
        self.field_names.iter().map(|f| humanize(f)).collect()
    }
}

/// Split rows into translatable markup and ids
pub fn extract_rows(rows: &[Row], schema: &RowSchema) -> Result<ExtractedRows, ExtractError> {
    let Some(first) = rows.first() else {
        return Ok(ExtractedRows::default());
    };

    let field_names: Vec<String> = schema
        .translatable_fields(first)
        .map(str::to_string)
        .collect();

    let mut extracted = ExtractedRows {
        field_names,
        ..Default::default()
    };

    for (position, row) in rows.iter().enumerate() {
        let id = RowId::from_row(row).ok_or(ExtractError::MissingId { position })?;

        let values: Vec<String> = extracted
            .field_names
            .iter()
            .map(|field| row.get(field).map(value_text).unwrap_or_default())
            .collect();
        let markup = to_markup(
            extracted
                .field_names
                .iter()
                .map(String::as_str)
                .zip(values.iter().map(String::as_str)),
        );

        let translatable = schema.translatable_fields(row).count();
        let known = extracted
            .field_names
            .iter()
            .filter(|f| row.contains_key(f.as_str()))
            .count();
        if translatable != known || known != extracted.field_names.len() {
            extracted.drifted.push(id.clone());
        }

        extracted.markups.push(markup);
        extracted.ids.push(id);
    }

    Ok(extracted)
}

/// Text sent for a column value
///
/// Null becomes empty, strings are taken as-is, everything else uses its
/// compact JSON form.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `oil_field_name` → `oil field name`
pub fn humanize(field: &str) -> String {
    field.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::NON_TRANSLATABLE_FIELDS;
    use serde_json::json;

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_extract_empty_input() {
        let extracted = extract_rows(&[], &RowSchema::default()).unwrap();
        assert!(extracted.is_empty());
        assert!(extracted.field_names.is_empty());
    }

    #[test]
    fn test_extract_captures_fields_from_first_row() {
        let input = rows(vec![
            json!({"id": 1, "name": "Plant A", "year": 1990, "operator": "Petro"}),
            json!({"id": 2, "name": "Plant B", "year": 2001, "operator": "Gas Co"}),
        ]);
        let extracted = extract_rows(&input, &RowSchema::default()).unwrap();

        assert_eq!(extracted.field_names, vec!["name", "operator"]);
        assert_eq!(extracted.ids, vec![RowId::new("1"), RowId::new("2")]);
        assert_eq!(
            extracted.markups[1],
            r#"<e k="name">Plant B</e><e k="operator">Gas Co</e>"#
        );
        assert!(extracted.drifted.is_empty());
    }

    #[test]
    fn test_extract_never_emits_excluded_fields() {
        let mut row = serde_json::Map::new();
        for field in NON_TRANSLATABLE_FIELDS {
            row.insert(field.to_string(), json!(format!("secret-{field}")));
        }
        row.insert("id".to_string(), json!(7));
        row.insert("translations".to_string(), Value::Null);
        row.insert("label".to_string(), json!("visible"));

        let extracted = extract_rows(&[row], &RowSchema::default()).unwrap();
        assert_eq!(extracted.field_names, vec!["label"]);
        for field in NON_TRANSLATABLE_FIELDS {
            assert!(!extracted.markups[0].contains(&format!("k=\"{field}\"")));
        }
        assert!(!extracted.markups[0].contains("secret-"));
    }

    #[test]
    fn test_extract_null_and_numbers() {
        let input = rows(vec![json!({"id": "x", "note": null, "capacity": 12.5})]);
        let extracted = extract_rows(&input, &RowSchema::default()).unwrap();
        assert_eq!(
            extracted.markups[0],
            r#"<e k="note"></e><e k="capacity">12.5</e>"#
        );
    }

    #[test]
    fn test_extract_flags_drifted_rows() {
        let input = rows(vec![
            json!({"id": 1, "name": "A", "status": "open"}),
            json!({"id": 2, "name": "B"}),
            json!({"id": 3, "name": "C", "status": "closed", "extra": "x"}),
        ]);
        let extracted = extract_rows(&input, &RowSchema::default()).unwrap();

        assert_eq!(extracted.drifted, vec![RowId::new("2"), RowId::new("3")]);
        // Missing field becomes an empty element, extra field is left out
        assert_eq!(
            extracted.markups[1],
            r#"<e k="name">B</e><e k="status"></e>"#
        );
        assert!(!extracted.markups[2].contains("extra"));
    }

    #[test]
    fn test_extract_missing_id() {
        let input = rows(vec![json!({"id": 1, "name": "A"}), json!({"name": "B"})]);
        assert_eq!(
            extract_rows(&input, &RowSchema::default()),
            Err(ExtractError::MissingId { position: 1 })
        );
    }

    #[test]
    fn test_humanized_field_names() {
        let input = rows(vec![json!({"id": 1, "field_name": "A", "oil_type": "B"})]);
        let extracted = extract_rows(&input, &RowSchema::default()).unwrap();
        assert_eq!(
            extracted.humanized_field_names(),
            vec!["field name", "oil type"]
        );
    }
}
